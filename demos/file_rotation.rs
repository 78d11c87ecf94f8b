//! File rotation walkthrough
//!
//! Writes enough data to roll the log file several times under a small size
//! cap and a retention limit, then lists what remains on disk.
//!
//! Run with: cargo run --example file_rotation

use duolog::prelude::*;

fn main() -> duolog::Result<()> {
    let mut logger = Logger::builder()
        .name("rotation-demo")
        .log_to_stdout(false)
        .file_basename("rotation_demo")
        .max_file_size_mb(0.01) // ~10 KiB per file
        .file_roll_limit(3)
        .build()?;

    println!("active file: {}", logger.log_file_name().display());

    let filler = "x".repeat(512);
    let mut last = logger.log_file_name().to_path_buf();
    for i in 0..100 {
        logger.log("info", &format!("record {:03} {}", i, filler))?;
        let current = logger.log_file_name();
        if current != last {
            println!("rolled over to: {}", current.display());
            last = current.to_path_buf();
        }
    }
    logger.close();

    println!("\nfiles remaining on disk (at most 3):");
    for entry in std::fs::read_dir(".").expect("read current directory").flatten() {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with("rotation_demo") {
            println!("  {}", name.to_string_lossy());
        }
    }
    Ok(())
}

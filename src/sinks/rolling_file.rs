//! Rolling file sink
//!
//! Log files are named `<basename>.<ext>` or `<basename>_<N>.<ext>` with
//! ascending numeric suffixes. The sink tracks the single active file name,
//! re-resolving it whenever the naming policy changes or the active file
//! reaches the size cap. The file handle is opened lazily in append mode and
//! owned exclusively; it is closed with a best-effort flush and sync on every
//! transition and on drop.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::error::{LoggerError, Result};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Rotation policy knobs.
///
/// `max_size_mb` unset (or non-positive) lets the file grow unbounded.
/// `first_number` seeds the suffix when no log file exists yet; unset starts
/// with the unsuffixed name. `roll_limit` caps how many matching files are
/// retained on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollPolicy {
    pub max_size_mb: Option<f64>,
    pub first_number: Option<u64>,
    pub roll_limit: Option<usize>,
}

impl Default for RollPolicy {
    fn default() -> Self {
        Self {
            max_size_mb: Some(10.0),
            first_number: None,
            roll_limit: None,
        }
    }
}

/// The file side of the logger.
pub struct RollingFileSink {
    dir: PathBuf,
    stem: String,
    extension: String,
    max_size_mb: Option<f64>,
    first_number: Option<u64>,
    roll_limit: Option<usize>,
    current_path: PathBuf,
    writer: Option<BufWriter<File>>,
    current_size: u64,
}

impl RollingFileSink {
    /// Create a sink and resolve its active file name.
    ///
    /// The basename may carry directory components; missing directories are
    /// created here. Under a roll limit, resolution may delete stale files.
    pub fn new(
        basename: impl AsRef<Path>,
        extension: &str,
        policy: RollPolicy,
    ) -> Result<Self> {
        let mut sink = Self {
            dir: PathBuf::new(),
            stem: String::new(),
            extension: normalize_extension(extension)?,
            max_size_mb: check_max_size(policy.max_size_mb)?,
            first_number: policy.first_number,
            roll_limit: check_roll_limit(policy.roll_limit)?,
            current_path: PathBuf::new(),
            writer: None,
            current_size: 0,
        };
        sink.assign_basename(basename)?;
        sink.resolve_current_file()?;
        Ok(sink)
    }

    /// Create a sink from a full file path, splitting basename and extension
    /// at the last dot.
    pub fn from_full_path(path: impl AsRef<Path>, policy: RollPolicy) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                LoggerError::invalid_argument(
                    "log file path",
                    format!("'{}' must end with an extension", path.display()),
                )
            })?
            .to_string();
        Self::new(path.with_extension(""), &extension, policy)
    }

    fn assign_basename(&mut self, basename: impl AsRef<Path>) -> Result<()> {
        let path = basename.as_ref();
        let stem = path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                LoggerError::invalid_argument(
                    "file basename",
                    format!("'{}' must end with a file name", path.display()),
                )
            })?;
        self.stem = stem.to_string();
        self.dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(())
    }

    /// Directory and stem joined back into the configured basename.
    #[must_use]
    pub fn basename(&self) -> PathBuf {
        self.dir.join(&self.stem)
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub fn max_size_mb(&self) -> Option<f64> {
        self.max_size_mb
    }

    #[must_use]
    pub fn first_number(&self) -> Option<u64> {
        self.first_number
    }

    #[must_use]
    pub fn roll_limit(&self) -> Option<usize> {
        self.roll_limit
    }

    /// The resolved active file name.
    #[must_use]
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Bytes written to the active file, mirroring the handle's offset.
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Change the basename and re-resolve the active file.
    pub fn set_basename(&mut self, basename: impl AsRef<Path>) -> Result<()> {
        self.assign_basename(basename)?;
        self.resolve_current_file()
    }

    /// Change the extension (leading/trailing dots stripped) and re-resolve.
    pub fn set_extension(&mut self, extension: &str) -> Result<()> {
        self.extension = normalize_extension(extension)?;
        self.resolve_current_file()
    }

    /// Replace basename and extension from a full path and re-resolve.
    pub fn set_full_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                LoggerError::invalid_argument(
                    "log file path",
                    format!("'{}' must end with an extension", path.display()),
                )
            })?
            .to_string();
        self.extension = normalize_extension(&extension)?;
        self.assign_basename(path.with_extension(""))?;
        self.resolve_current_file()
    }

    /// Change the size cap and re-resolve.
    pub fn set_max_size_mb(&mut self, max_size_mb: Option<f64>) -> Result<()> {
        self.max_size_mb = check_max_size(max_size_mb)?;
        self.resolve_current_file()
    }

    /// Change the first suffix number and re-resolve.
    pub fn set_first_number(&mut self, first_number: Option<u64>) -> Result<()> {
        self.first_number = first_number;
        self.resolve_current_file()
    }

    /// Change the retained-file cap and re-resolve.
    pub fn set_roll_limit(&mut self, roll_limit: Option<usize>) -> Result<()> {
        self.roll_limit = check_roll_limit(roll_limit)?;
        self.resolve_current_file()
    }

    fn max_size_bytes(&self) -> Option<u64> {
        self.max_size_mb.map(|mb| (mb * BYTES_PER_MB) as u64)
    }

    fn path_for(&self, number: Option<u64>) -> PathBuf {
        let name = match number {
            Some(n) => format!("{}_{}.{}", self.stem, n, self.extension),
            None => format!("{}.{}", self.stem, self.extension),
        };
        self.dir.join(name)
    }

    /// Resolve the active file name from what is on disk.
    ///
    /// Scans for `<stem>(_<N>)?.<ext>` siblings, trims to the roll limit
    /// (oldest first), rolls the candidate number forward when the newest
    /// retained file is already full, then probes sizes until the first
    /// non-full candidate. Any open handle is discarded; reopening happens
    /// lazily on the next write.
    pub fn resolve_current_file(&mut self) -> Result<()> {
        if !self.dir.as_os_str().is_empty() && !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .map_err(|e| LoggerError::io_operation("creating log directory", &self.dir, e))?;
        }
        let mut ordered = self.scan_matching_files()?;

        // candidate before trimming: newest existing suffix, else the policy seed
        let mut candidate: Option<u64> = match ordered.back() {
            Some((number, _)) => *number,
            None => self.first_number,
        };

        if let Some(limit) = self.roll_limit {
            while ordered.len() > limit {
                if let Some((_, path)) = ordered.pop_front() {
                    fs::remove_file(&path).map_err(|e| {
                        LoggerError::io_operation("removing rolled log file", &path, e)
                    })?;
                }
            }
            // newest retained file already full: make room now and advance the
            // counter so suffixes stay strictly increasing under deletion
            if ordered.len() == limit {
                if let (Some(cap), Some((_, newest))) = (self.max_size_bytes(), ordered.back()) {
                    let full = fs::metadata(newest).map(|m| m.len() >= cap).unwrap_or(false);
                    if full {
                        if let Some((_, path)) = ordered.pop_front() {
                            fs::remove_file(&path).map_err(|e| {
                                LoggerError::io_operation("removing rolled log file", &path, e)
                            })?;
                        }
                        candidate = candidate.map(|n| n + 1);
                    }
                }
            }
        }

        let mut path = self.path_for(candidate);
        if let Some(cap) = self.max_size_bytes() {
            loop {
                match fs::metadata(&path) {
                    Ok(meta) if meta.len() >= cap => {
                        candidate = Some(candidate.map_or(0, |n| n + 1));
                        path = self.path_for(candidate);
                    }
                    _ => break,
                }
            }
        }

        self.close();
        self.current_path = path;
        self.current_size = 0;
        Ok(())
    }

    /// Matching siblings ordered for rotation: the unsuffixed file first,
    /// then ascending numeric suffixes.
    fn scan_matching_files(&self) -> Result<VecDeque<(Option<u64>, PathBuf)>> {
        let pattern = format!(
            "^{}(?:_(\\d+))?\\.{}$",
            regex::escape(&self.stem),
            regex::escape(&self.extension)
        );
        let matcher = Regex::new(&pattern).map_err(|e| {
            LoggerError::invalid_argument("log file pattern", e.to_string())
        })?;
        let scan_dir: &Path = if self.dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            &self.dir
        };
        let mut unsuffixed: Option<PathBuf> = None;
        let mut numbered: Vec<(u64, PathBuf)> = Vec::new();
        let entries = fs::read_dir(scan_dir)
            .map_err(|e| LoggerError::io_operation("scanning log directory", scan_dir, e))?;
        for entry in entries {
            let entry = entry
                .map_err(|e| LoggerError::io_operation("scanning log directory", scan_dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(caps) = matcher.captures(name) {
                match caps.get(1) {
                    Some(n) => {
                        if let Ok(number) = n.as_str().parse::<u64>() {
                            numbered.push((number, path));
                        }
                    }
                    None => unsuffixed = Some(path),
                }
            }
        }
        numbered.sort_by_key(|(n, _)| *n);
        let mut ordered = VecDeque::with_capacity(numbered.len() + 1);
        if let Some(path) = unsuffixed {
            ordered.push_back((None, path));
        }
        ordered.extend(numbered.into_iter().map(|(n, p)| (Some(n), p)));
        Ok(ordered)
    }

    fn open_current(&mut self) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.current_path)
            .map_err(|e| LoggerError::io_operation("opening log file", &self.current_path, e))?;
        self.current_size = file
            .metadata()
            .map_err(|e| {
                LoggerError::io_operation("reading log file metadata", &self.current_path, e)
            })?
            .len();
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    /// Append text to the active file, rotating first when it is at the cap.
    pub fn write(&mut self, text: &str) -> Result<()> {
        if self.writer.is_none() {
            self.open_current()?;
        } else if let Some(cap) = self.max_size_bytes() {
            if self.current_size >= cap {
                self.resolve_current_file()?;
                self.open_current()?;
            }
        }
        if let Some(writer) = self.writer.as_mut() {
            writer
                .write_all(text.as_bytes())
                .map_err(|e| LoggerError::io_operation("writing log file", &self.current_path, e))?;
            self.current_size += text.len() as u64;
        }
        Ok(())
    }

    /// Best-effort flush and durability sync; failures are swallowed since
    /// the write itself already succeeded.
    pub fn sync(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.flush();
            let _ = writer.get_ref().sync_all();
        }
    }

    /// Flush, sync and drop the handle.
    pub fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
            let _ = writer.get_ref().sync_all();
        }
    }
}

impl Drop for RollingFileSink {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for RollingFileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollingFileSink")
            .field("basename", &self.basename())
            .field("extension", &self.extension)
            .field("max_size_mb", &self.max_size_mb)
            .field("first_number", &self.first_number)
            .field("roll_limit", &self.roll_limit)
            .field("current_path", &self.current_path)
            .field("current_size", &self.current_size)
            .finish()
    }
}

fn normalize_extension(extension: &str) -> Result<String> {
    let mut ext = extension;
    if let Some(stripped) = ext.strip_prefix('.') {
        ext = stripped;
    }
    if let Some(stripped) = ext.strip_suffix('.') {
        ext = stripped;
    }
    if ext.is_empty() {
        return Err(LoggerError::invalid_argument(
            "file extension",
            "must not be empty or only dots",
        ));
    }
    Ok(ext.to_string())
}

fn check_max_size(max_size_mb: Option<f64>) -> Result<Option<f64>> {
    match max_size_mb {
        Some(mb) if mb.is_nan() => Err(LoggerError::invalid_argument(
            "max file size",
            "must be a number",
        )),
        // non-positive means unbounded growth
        Some(mb) if mb <= 0.0 => Ok(None),
        other => Ok(other),
    }
}

fn check_roll_limit(roll_limit: Option<usize>) -> Result<Option<usize>> {
    if roll_limit == Some(0) {
        return Err(LoggerError::invalid_argument(
            "roll limit",
            "must be greater than zero",
        ));
    }
    Ok(roll_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn policy(max_size_mb: Option<f64>) -> RollPolicy {
        RollPolicy {
            max_size_mb,
            first_number: None,
            roll_limit: None,
        }
    }

    #[test]
    fn test_extension_normalization() {
        assert_eq!(normalize_extension(".log").unwrap(), "log");
        assert_eq!(normalize_extension("log.").unwrap(), "log");
        assert_eq!(normalize_extension("log").unwrap(), "log");
        assert!(normalize_extension(".").is_err());
        assert!(normalize_extension("").is_err());
    }

    #[test]
    fn test_fresh_sink_uses_unsuffixed_name() {
        let dir = tempdir().unwrap();
        let sink = RollingFileSink::new(dir.path().join("app"), "log", policy(Some(1.0))).unwrap();
        assert_eq!(sink.current_path(), dir.path().join("app.log"));
        // resolution never pre-opens the handle
        assert!(!dir.path().join("app.log").exists());
    }

    #[test]
    fn test_first_number_seeds_suffix() {
        let dir = tempdir().unwrap();
        let sink = RollingFileSink::new(
            dir.path().join("app"),
            "log",
            RollPolicy {
                max_size_mb: Some(1.0),
                first_number: Some(3),
                roll_limit: None,
            },
        )
        .unwrap();
        assert_eq!(sink.current_path(), dir.path().join("app_3.log"));
    }

    #[test]
    fn test_from_full_path_splits_at_last_dot() {
        let dir = tempdir().unwrap();
        let sink = RollingFileSink::from_full_path(
            dir.path().join("nested/app.txt"),
            RollPolicy::default(),
        )
        .unwrap();
        assert_eq!(sink.extension(), "txt");
        assert_eq!(sink.basename(), dir.path().join("nested/app"));
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_resolution_skips_full_files() {
        let dir = tempdir().unwrap();
        // cap is 1 KB; app.log and app_0.log are already full, app_1.log is not
        let cap_mb = 1.0 / 1024.0;
        fs::write(dir.path().join("app.log"), vec![b'x'; 1024]).unwrap();
        fs::write(dir.path().join("app_0.log"), vec![b'x'; 2048]).unwrap();
        fs::write(dir.path().join("app_1.log"), b"short").unwrap();
        let sink =
            RollingFileSink::new(dir.path().join("app"), "log", policy(Some(cap_mb))).unwrap();
        assert_eq!(sink.current_path(), dir.path().join("app_1.log"));
    }

    #[test]
    fn test_resolution_advances_past_full_newest() {
        let dir = tempdir().unwrap();
        let cap_mb = 1.0 / 1024.0;
        fs::write(dir.path().join("app_4.log"), vec![b'x'; 1024]).unwrap();
        let sink =
            RollingFileSink::new(dir.path().join("app"), "log", policy(Some(cap_mb))).unwrap();
        assert_eq!(sink.current_path(), dir.path().join("app_5.log"));
    }

    #[test]
    fn test_write_rotates_at_cap() {
        let dir = tempdir().unwrap();
        let cap_mb = 1.0 / 1024.0; // 1 KB
        let mut sink =
            RollingFileSink::new(dir.path().join("app"), "log", policy(Some(cap_mb))).unwrap();
        let line = "x".repeat(256);
        let mut names = vec![sink.current_path().to_path_buf()];
        for _ in 0..12 {
            sink.write(&line).unwrap();
            let current = sink.current_path().to_path_buf();
            if names.last() != Some(&current) {
                names.push(current);
            }
        }
        sink.close();
        // 12 * 256 bytes under a 1 KB cap crosses twice: app.log, app_0, app_1
        assert_eq!(
            names,
            vec![
                dir.path().join("app.log"),
                dir.path().join("app_0.log"),
                dir.path().join("app_1.log"),
            ]
        );
        assert!(dir.path().join("app_0.log").exists());
    }

    #[test]
    fn test_roll_limit_trims_oldest() {
        let dir = tempdir().unwrap();
        let cap_mb = 1.0 / 1024.0;
        let mut sink = RollingFileSink::new(
            dir.path().join("app"),
            "log",
            RollPolicy {
                max_size_mb: Some(cap_mb),
                first_number: None,
                roll_limit: Some(2),
            },
        )
        .unwrap();
        let line = "x".repeat(512);
        // enough writes for three distinct rotation events
        for _ in 0..8 {
            sink.write(&line).unwrap();
        }
        sink.close();
        let mut remaining: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        remaining.sort();
        assert_eq!(remaining.len(), 2, "roll limit must keep exactly 2 files");
        // the oldest (unsuffixed) file is gone, suffixes kept increasing
        assert!(!remaining.contains(&"app.log".to_string()));
    }

    #[test]
    fn test_roll_forward_advances_counter() {
        let dir = tempdir().unwrap();
        let cap_mb = 1.0 / 1024.0;
        // two retained files, newest full: resolution deletes the oldest and
        // skips number 2 entirely
        fs::write(dir.path().join("app_1.log"), vec![b'x'; 1024]).unwrap();
        fs::write(dir.path().join("app_2.log"), vec![b'x'; 1024]).unwrap();
        let sink = RollingFileSink::new(
            dir.path().join("app"),
            "log",
            RollPolicy {
                max_size_mb: Some(cap_mb),
                first_number: None,
                roll_limit: Some(2),
            },
        )
        .unwrap();
        assert_eq!(sink.current_path(), dir.path().join("app_3.log"));
        assert!(!dir.path().join("app_1.log").exists());
        assert!(dir.path().join("app_2.log").exists());
    }

    #[test]
    fn test_unbounded_growth_without_cap() {
        let dir = tempdir().unwrap();
        let mut sink = RollingFileSink::new(dir.path().join("app"), "log", policy(None)).unwrap();
        for _ in 0..100 {
            sink.write(&"x".repeat(100)).unwrap();
        }
        sink.close();
        assert_eq!(sink.current_path(), dir.path().join("app.log"));
        assert_eq!(
            fs::metadata(dir.path().join("app.log")).unwrap().len(),
            10_000
        );
    }

    #[test]
    fn test_append_to_existing_non_full_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app.log"), b"old\n").unwrap();
        let mut sink =
            RollingFileSink::new(dir.path().join("app"), "log", policy(Some(1.0))).unwrap();
        sink.write("new\n").unwrap();
        sink.close();
        assert_eq!(
            fs::read_to_string(dir.path().join("app.log")).unwrap(),
            "old\nnew\n"
        );
    }

    #[test]
    fn test_zero_roll_limit_rejected() {
        let dir = tempdir().unwrap();
        let err = RollingFileSink::new(
            dir.path().join("app"),
            "log",
            RollPolicy {
                max_size_mb: None,
                first_number: None,
                roll_limit: Some(0),
            },
        )
        .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidArgument { .. }));
    }

    #[test]
    fn test_non_positive_cap_means_unbounded() {
        let dir = tempdir().unwrap();
        let sink =
            RollingFileSink::new(dir.path().join("app"), "log", policy(Some(-5.0))).unwrap();
        assert_eq!(sink.max_size_mb(), None);
    }

    #[test]
    fn test_set_basename_switches_active_file() {
        let dir = tempdir().unwrap();
        let mut sink =
            RollingFileSink::new(dir.path().join("app"), "log", policy(Some(1.0))).unwrap();
        sink.write("a\n").unwrap();
        sink.set_basename(dir.path().join("other")).unwrap();
        assert_eq!(sink.current_path(), dir.path().join("other.log"));
        sink.write("b\n").unwrap();
        sink.close();
        assert_eq!(fs::read_to_string(dir.path().join("app.log")).unwrap(), "a\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("other.log")).unwrap(),
            "b\n"
        );
    }

    #[test]
    fn test_unrelated_files_ignored_by_scan() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app2.log"), b"x").unwrap();
        fs::write(dir.path().join("app_x.log"), b"x").unwrap();
        fs::write(dir.path().join("app_1.txt"), b"x").unwrap();
        let sink = RollingFileSink::new(dir.path().join("app"), "log", policy(Some(1.0))).unwrap();
        assert_eq!(sink.current_path(), dir.path().join("app.log"));
    }
}

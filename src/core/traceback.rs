//! Traceback rendering
//!
//! A log call may attach either preformatted traceback text or a structured
//! sequence of stack frames. Frames render as two lines each: the location
//! line and, when a source line is known, that line stripped and indented.

/// One captured stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub file: String,
    pub line: u32,
    pub function: String,
    pub source: Option<String>,
}

impl StackFrame {
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
            source: None,
        }
    }

    /// Attach the source line the frame points at.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Traceback payload attached to a log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Traceback {
    /// Preformatted text, appended verbatim on a new line.
    Text(String),
    /// Structured frames, rendered one location line each.
    Frames(Vec<StackFrame>),
}

impl Traceback {
    /// Render the traceback block, including its leading newline.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Traceback::Text(text) => format!("\n{}", text),
            Traceback::Frames(frames) => {
                let mut out = String::new();
                for frame in frames {
                    out.push_str(&format!(
                        "\n  File \"{}\", line {}, in {}",
                        frame.file, frame.line, frame.function
                    ));
                    if let Some(source) = &frame.source {
                        let source = source.trim();
                        if !source.is_empty() {
                            out.push_str(&format!("\n    {}", source));
                        }
                    }
                }
                out
            }
        }
    }
}

impl From<String> for Traceback {
    fn from(text: String) -> Self {
        Traceback::Text(text)
    }
}

impl From<&str> for Traceback {
    fn from(text: &str) -> Self {
        Traceback::Text(text.to_string())
    }
}

impl From<Vec<StackFrame>> for Traceback {
    fn from(frames: Vec<StackFrame>) -> Self {
        Traceback::Frames(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_renders_verbatim() {
        let tb = Traceback::from("boom\nat line 3");
        assert_eq!(tb.render(), "\nboom\nat line 3");
    }

    #[test]
    fn test_frames_render_two_lines() {
        let tb = Traceback::Frames(vec![
            StackFrame::new("src/main.rs", 42, "main").with_source("  run()?;  "),
            StackFrame::new("src/run.rs", 7, "run"),
        ]);
        assert_eq!(
            tb.render(),
            "\n  File \"src/main.rs\", line 42, in main\n    run()?;\n  File \"src/run.rs\", line 7, in run"
        );
    }

    #[test]
    fn test_blank_source_line_skipped() {
        let tb = Traceback::Frames(vec![
            StackFrame::new("lib.rs", 1, "start").with_source("   "),
        ]);
        assert_eq!(tb.render(), "\n  File \"lib.rs\", line 1, in start");
    }
}

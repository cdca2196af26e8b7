use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineLevel {
    Info,
    Warn,
    Error,
}

/// One human-readable step of a sync pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub level: LineLevel,
    /// Display name of the partition the step concerns, if any.
    pub partition: Option<String>,
    pub message: String,
}

impl fmt::Display for TranscriptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            LineLevel::Info => {}
            LineLevel::Warn => f.write_str("warning: ")?,
            LineLevel::Error => f.write_str("error: ")?,
        }
        if let Some(p) = &self.partition {
            write!(f, "[{p}] ")?;
        }
        f.write_str(&self.message)
    }
}

/// Ordered log of a sync pass, surfaced to the user.
///
/// Every line is mirrored to `tracing` at the matching level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    lines: Vec<TranscriptLine>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, partition: Option<&str>, message: impl Into<String>) {
        self.push(LineLevel::Info, partition, message.into());
    }

    pub fn warn(&mut self, partition: Option<&str>, message: impl Into<String>) {
        self.push(LineLevel::Warn, partition, message.into());
    }

    pub fn error(&mut self, partition: Option<&str>, message: impl Into<String>) {
        self.push(LineLevel::Error, partition, message.into());
    }

    fn push(&mut self, level: LineLevel, partition: Option<&str>, message: String) {
        let p = partition.unwrap_or("-");
        match level {
            LineLevel::Info => tracing::debug!(partition = p, "{message}"),
            LineLevel::Warn => tracing::warn!(partition = p, "{message}"),
            LineLevel::Error => tracing::error!(partition = p, "{message}"),
        }
        self.lines.push(TranscriptLine {
            level,
            partition: partition.map(str::to_string),
            message,
        });
    }

    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether any line contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.message.contains(needle))
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

// src/report.rs

//! Change reports: the structured output of a detection cycle.

use std::fmt::Write as _;

use chrono::{DateTime, Local};

use crate::source::SourceId;

/// Whether an entry appeared or disappeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Removed,
}

impl ChangeKind {
    pub fn marker(self) -> &'static str {
        match self {
            ChangeKind::Added => "[+]",
            ChangeKind::Removed => "[-]",
        }
    }
}

/// One added or removed line (line mode) or reference (set mode).
///
/// In line mode `line` is the 1-based position in the snapshot the text comes
/// from: the previous snapshot for `Removed`, the new one for `Added`. In set
/// mode `text` is the reference itself and `line` is the first line of the
/// page it was found on, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    pub kind: ChangeKind,
    pub line: Option<usize>,
    pub text: String,
}

impl ChangeEntry {
    pub fn added(line: usize, text: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Added,
            line: Some(line),
            text: text.into(),
        }
    }

    pub fn removed(line: usize, text: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Removed,
            line: Some(line),
            text: text.into(),
        }
    }

    pub fn added_ref(reference: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            kind: ChangeKind::Added,
            line,
            text: reference.into(),
        }
    }

    pub fn removed_ref(reference: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            kind: ChangeKind::Removed,
            line,
            text: reference.into(),
        }
    }

    pub fn render(&self) -> String {
        match self.line {
            Some(line) => format!("{} line {}: {}", self.kind.marker(), line, self.text),
            None => format!("{} {}", self.kind.marker(), self.text),
        }
    }
}

/// Everything that changed in one source between two observations.
///
/// Never empty: [`ChangeReport::new`] refuses to build a report without
/// entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeReport {
    source: SourceId,
    timestamp: DateTime<Local>,
    entries: Vec<ChangeEntry>,
}

impl ChangeReport {
    pub fn new(
        source: SourceId,
        timestamp: DateTime<Local>,
        entries: Vec<ChangeEntry>,
    ) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        Some(Self {
            source,
            timestamp,
            entries,
        })
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    pub fn added(&self) -> usize {
        self.count(ChangeKind::Added)
    }

    pub fn removed(&self) -> usize {
        self.count(ChangeKind::Removed)
    }

    fn count(&self, kind: ChangeKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Render the report in the plain-text log format:
    ///
    /// ```text
    /// 2024-05-01 10:00:00 https://example.com/
    /// [-] line 2: b
    /// [+] line 2: x
    ///
    /// [!] Finished
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.source
        );
        for entry in &self.entries {
            let _ = writeln!(out, "{}", entry.render());
        }
        out.push_str("\n[!] Finished\n");
        out
    }
}

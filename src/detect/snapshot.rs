// src/detect/snapshot.rs

use crate::detect::fingerprint::{fingerprint, Fingerprint};
use crate::fetch::{Content, ScriptSet};

/// Last successfully observed state of a source.
///
/// Snapshots are immutable; a newer observation replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Lines {
        lines: Vec<String>,
        fingerprint: Fingerprint,
    },
    Scripts {
        scripts: ScriptSet,
        fingerprint: Fingerprint,
    },
}

impl Snapshot {
    /// Capture content, computing its fingerprint.
    pub fn capture(content: Content) -> Self {
        let fp = fingerprint(&content);
        Self::with_fingerprint(content, fp)
    }

    /// Capture content whose fingerprint the caller already computed.
    pub(crate) fn with_fingerprint(content: Content, fingerprint: Fingerprint) -> Self {
        match content {
            Content::Lines(lines) => Snapshot::Lines { lines, fingerprint },
            Content::Scripts(scripts) => Snapshot::Scripts {
                scripts,
                fingerprint,
            },
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        match self {
            Snapshot::Lines { fingerprint, .. } | Snapshot::Scripts { fingerprint, .. } => {
                *fingerprint
            }
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Snapshot::Lines { .. } => "lines",
            Snapshot::Scripts { .. } => "scripts",
        }
    }

    /// Number of lines or references held.
    pub fn len(&self) -> usize {
        match self {
            Snapshot::Lines { lines, .. } => lines.len(),
            Snapshot::Scripts { scripts, .. } => scripts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// src/fetch/content.rs

use std::collections::HashSet;

/// What a successful fetch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Ordered text lines (files and remote documents).
    Lines(Vec<String>),
    /// References extracted from a page (script-set sources).
    Scripts(ScriptSet),
}

impl Content {
    /// Split text into lines. `\n` and `\r\n` endings are both accepted, and a
    /// trailing newline does not produce an extra empty line.
    pub fn from_text(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Content::Lines(text.lines().map(str::to_string).collect())
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Content::Lines(_) => "lines",
            Content::Scripts(_) => "scripts",
        }
    }
}

/// One reference found in a page, with the first line it appeared on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRef {
    pub reference: String,
    pub line: Option<usize>,
}

/// Set of references that remembers first-discovery order.
///
/// Membership is what matters for diffing; the order is only kept so reports
/// list scripts in the order they appear in the page.
#[derive(Debug, Clone, Default)]
pub struct ScriptSet {
    refs: Vec<ScriptRef>,
    seen: HashSet<String>,
}

impl ScriptSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from bare references (no line information).
    pub fn from_references<I, S>(refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for r in refs {
            set.insert(r, None);
        }
        set
    }

    /// Insert a reference; returns `false` if it was already present, in
    /// which case its original position and line are kept.
    pub fn insert(&mut self, reference: impl Into<String>, line: Option<usize>) -> bool {
        let reference = reference.into();
        if self.seen.contains(&reference) {
            return false;
        }
        self.seen.insert(reference.clone());
        self.refs.push(ScriptRef { reference, line });
        true
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.seen.contains(reference)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScriptRef> {
        self.refs.iter()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

impl PartialEq for ScriptSet {
    fn eq(&self, other: &Self) -> bool {
        self.refs == other.refs
    }
}

impl Eq for ScriptSet {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_split_into_lines() {
        let content = Content::from_text("\u{feff}a\r\nb\nc\n");
        assert_eq!(
            content,
            Content::Lines(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(Content::from_text(""), Content::Lines(vec![]));
    }

    #[test]
    fn script_set_keeps_first_discovery() {
        let mut set = ScriptSet::new();
        assert!(set.insert("/b.js", Some(3)));
        assert!(set.insert("/a.js", Some(5)));
        assert!(!set.insert("/b.js", Some(9)));

        let refs: Vec<_> = set.iter().map(|r| (r.reference.as_str(), r.line)).collect();
        assert_eq!(refs, vec![("/b.js", Some(3)), ("/a.js", Some(5))]);
        assert!(set.contains("/a.js"));
        assert_eq!(set.len(), 2);
    }
}

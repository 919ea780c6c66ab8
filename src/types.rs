use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// What kind of content a source produces.
///
/// - `File`: a local file, compared line by line.
/// - `Document`: a remote document fetched over HTTP(S), compared line by line.
/// - `Scripts`: a remote HTML page reduced to the set of `.js` references it
///   mentions, compared as a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    File,
    Document,
    Scripts,
}

impl SourceKind {
    /// Line-mode sources are diffed positionally; the rest are diffed as sets.
    pub fn is_line_mode(self) -> bool {
        matches!(self, SourceKind::File | SourceKind::Document)
    }

    pub fn is_remote(self) -> bool {
        matches!(self, SourceKind::Document | SourceKind::Scripts)
    }

    /// Infer a kind from a configured location.
    ///
    /// URLs become `Document` (or `Scripts` when `extract_scripts` is set);
    /// everything else is treated as a local path.
    pub fn infer(location: &str, extract_scripts: bool) -> Self {
        if is_http_url(location) {
            if extract_scripts {
                SourceKind::Scripts
            } else {
                SourceKind::Document
            }
        } else {
            SourceKind::File
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::File => "file",
            SourceKind::Document => "document",
            SourceKind::Scripts => "scripts",
        };
        f.write_str(s)
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(SourceKind::File),
            "document" => Ok(SourceKind::Document),
            "scripts" => Ok(SourceKind::Scripts),
            other => Err(format!(
                "invalid source kind: {other} (expected \"file\", \"document\" or \"scripts\")"
            )),
        }
    }
}

pub fn is_http_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Parse a duration such as `"500ms"`, `"10s"`, `"5m"` or `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: '{}'", s))
}

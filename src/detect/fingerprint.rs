// src/detect/fingerprint.rs

use std::fmt;

use blake3::Hasher;

use crate::fetch::Content;

/// BLAKE3 digest of a source's content.
///
/// Stable across runs and processes, so equal content always compares equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

/// Fingerprint raw bytes.
pub fn fingerprint_bytes(bytes: &[u8]) -> Fingerprint {
    Fingerprint(*blake3::hash(bytes).as_bytes())
}

/// Fingerprint fetched content.
///
/// Every line (or reference) is fed followed by `\n`, after a tag for the
/// content kind, so `["ab"]`, `["a", "b"]` and a script set `{"ab"}` all
/// differ.
pub fn fingerprint(content: &Content) -> Fingerprint {
    let mut hasher = Hasher::new();
    match content {
        Content::Lines(lines) => {
            hasher.update(b"lines\0");
            for line in lines {
                hasher.update(line.as_bytes());
                hasher.update(b"\n");
            }
        }
        Content::Scripts(set) => {
            hasher.update(b"scripts\0");
            for script in set.iter() {
                hasher.update(script.reference.as_bytes());
                hasher.update(b"\n");
            }
        }
    }
    Fingerprint(*hasher.finalize().as_bytes())
}

//! Identifier types: match IDs and content digests for ledger snapshots.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Identifier of an uploaded match, repeated on every row of its file.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A file-system safe rendering, used to name archived match files.
    ///
    /// IDs that needed characters replaced get a short digest of the original
    /// appended, so two IDs never share a stem.
    pub fn file_stem(&self) -> String {
        let safe: String = self
            .0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if safe == self.0 {
            return safe;
        }
        let digest = SnapshotDigest::generate([self.0.as_str()]);
        format!("{}-{}", safe, &digest.as_str()[..8])
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MatchId({})", self.0)
    }
}

impl From<String> for MatchId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Content hash of a ledger, used to tell snapshots apart.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotDigest(String);

impl SnapshotDigest {
    /// Hash the given fields with SHA256, keeping the first 16 hex characters.
    pub fn generate<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        let mut hasher = Sha256::new();
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(field.as_bytes());
        }
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SnapshotDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotDigest({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_id_trims_whitespace() {
        let id = MatchId::from("  M1 ");
        assert_eq!(id.as_str(), "M1");
        assert_eq!(id, MatchId::from("M1"));
    }

    #[test]
    fn test_match_id_file_stem() {
        assert_eq!(MatchId::from("M-01").file_stem(), "M-01");
        assert_eq!(MatchId::from("M_1").file_stem(), "M_1");

        let stem = MatchId::from("Round 3/Final").file_stem();
        assert!(stem.starts_with("Round_3_Final-"));
        assert_eq!(stem.len(), "Round_3_Final-".len() + 8);
        assert!(!MatchId::from("../etc").file_stem().contains('/'));
    }

    #[test]
    fn test_file_stem_keeps_sanitized_ids_apart() {
        let spaced = MatchId::from("M 1").file_stem();
        let underscored = MatchId::from("M_1").file_stem();
        let slashed = MatchId::from("M/1").file_stem();
        assert_ne!(spaced, underscored);
        assert_ne!(spaced, slashed);
        assert_ne!(slashed, underscored);
    }

    #[test]
    fn test_match_id_serializes_as_string() {
        let json = serde_json::to_string(&MatchId::from("M7")).unwrap();
        assert_eq!(json, "\"M7\"");
        let back: MatchId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "M7");
    }

    #[test]
    fn test_digest_deterministic() {
        let a = SnapshotDigest::generate(["1", "R1", "Alice", "7"]);
        let b = SnapshotDigest::generate(["1", "R1", "Alice", "7"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_separates_fields() {
        let a = SnapshotDigest::generate(["ab", "c"]);
        let b = SnapshotDigest::generate(["a", "bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_length_and_format() {
        let d = SnapshotDigest::generate(["x"]);
        assert_eq!(d.as_str().len(), 16);
        assert!(d.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}

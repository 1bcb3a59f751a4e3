//! Identifier generation.
//!
//! Identifiers are a kind prefix plus a zero-padded sequence number
//! (`P001`, `D014`, ...). The next number is one past the largest suffix
//! already in the collection. Nothing coordinates two writers scanning the
//! same collection at once; they can produce the same identifier. Kinds that
//! need to avoid that use [`IdPolicy::RemoteAssigned`].

use serde::{Deserialize, Serialize};

/// Who assigns identifiers for newly created records of a kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// Generated locally by scanning the existing collection.
    #[default]
    ClientGenerated,
    /// Left to the remote store; falls back to client generation offline.
    RemoteAssigned,
}

impl IdPolicy {
    pub fn client_generates_id(&self) -> bool {
        matches!(self, IdPolicy::ClientGenerated)
    }
}

/// Numeric suffix of `id` when it is `prefix` followed only by digits.
pub fn parse_suffix(prefix: char, id: &str) -> Option<u64> {
    let digits = id.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Returns the identifier that follows every identifier in `existing`.
///
/// A suffix with no successor in `u64` is ignored like any other
/// unparsable id.
pub fn next_id<'a, I>(prefix: char, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let next = existing
        .into_iter()
        .filter_map(|id| parse_suffix(prefix, id))
        .filter_map(|n| n.checked_add(1))
        .max()
        .unwrap_or(1);
    format!("{}{:03}", prefix, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collection_starts_at_one() {
        assert_eq!(next_id('P', []), "P001");
        assert_eq!(next_id('R', Vec::<&str>::new()), "R001");
    }

    #[test]
    fn test_next_after_sequence() {
        assert_eq!(next_id('P', ["P001", "P002", "P003", "P004"]), "P005");
    }

    #[test]
    fn test_uses_maximum_not_count() {
        assert_eq!(next_id('A', ["A007", "A002"]), "A008");
    }

    #[test]
    fn test_ignores_unparsable_ids() {
        let existing = ["D002", "9f1c2d3e-0000-4000-8000-000000000001", "D", "DX7", ""];
        assert_eq!(next_id('D', existing), "D003");
        assert_eq!(next_id('D', ["doctor", ""]), "D001");
    }

    #[test]
    fn test_ignores_other_prefixes() {
        assert_eq!(next_id('P', ["A050", "P002"]), "P003");
    }

    #[test]
    fn test_grows_past_three_digits() {
        assert_eq!(next_id('P', ["P999"]), "P1000");
    }

    #[test]
    fn test_largest_suffix_does_not_overflow() {
        assert_eq!(next_id('P', ["P18446744073709551615"]), "P001");
        assert_eq!(
            next_id('P', ["P004", "P18446744073709551615"]),
            "P005"
        );
        assert_eq!(
            next_id('P', ["P18446744073709551614"]),
            "P18446744073709551615"
        );
    }

    #[test]
    fn test_parse_suffix() {
        assert_eq!(parse_suffix('P', "P010"), Some(10));
        assert_eq!(parse_suffix('P', "P"), None);
        assert_eq!(parse_suffix('P', "R010"), None);
    }

    #[test]
    fn test_policy_flag() {
        assert!(IdPolicy::default().client_generates_id());
        assert!(!IdPolicy::RemoteAssigned.client_generates_id());
    }
}

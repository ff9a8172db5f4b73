use std::fmt::{Debug, Formatter};

use sha2::{Digest, Sha256};

/// Content identity of one input: the SHA-256 of its text. Two snapshots
/// with equal keys are interchangeable for every derived computation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey([u8; 32]);

impl ContentKey {
    pub fn of_text(text: &str) -> Self {
        Self::of_bytes(text.as_bytes())
    }

    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }

    /// Combined key over a set of `(id, key)` members. Entries are sorted
    /// by id before hashing, so only membership and member content drive
    /// the result, never the order items arrived in.
    pub fn combine<'a>(members: impl IntoIterator<Item = (&'a str, ContentKey)>) -> Self {
        let mut members: Vec<(&str, ContentKey)> = members.into_iter().collect();
        members.sort_by(|a, b| a.0.cmp(b.0));

        let mut hasher = Sha256::new();
        for (id, key) in members {
            hasher.update((id.len() as u64).to_le_bytes());
            hasher.update(id.as_bytes());
            hasher.update(key.0);
        }
        Self(hasher.finalize().into())
    }

    /// Pairwise key for joins: one side changing invalidates exactly the
    /// pairs it participates in.
    pub fn pair(self, other: ContentKey) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(self.0);
        hasher.update(other.0);
        Self(hasher.finalize().into())
    }
}

impl Debug for ContentKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0[..6] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_keys_track_content() {
        assert_eq!(ContentKey::of_text("abc"), ContentKey::of_text("abc"));
        assert_ne!(ContentKey::of_text("abc"), ContentKey::of_text("abd"));
    }

    #[test]
    fn combine_is_order_independent() {
        let a = ("a.tscn", ContentKey::of_text("a"));
        let b = ("b.tscn", ContentKey::of_text("b"));
        assert_eq!(
            ContentKey::combine([a, b]),
            ContentKey::combine([b, a]),
        );
    }

    #[test]
    fn combine_tracks_membership() {
        let a = ("a.tscn", ContentKey::of_text("a"));
        let b = ("b.tscn", ContentKey::of_text("b"));
        assert_ne!(ContentKey::combine([a]), ContentKey::combine([a, b]));
        // Same member content under a different id is a different set.
        let renamed = ("c.tscn", ContentKey::of_text("a"));
        assert_ne!(ContentKey::combine([a]), ContentKey::combine([renamed]));
    }
}

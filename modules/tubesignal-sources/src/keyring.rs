use std::sync::Mutex;

/// Process-wide ad-network API key rotation.
///
/// A single shared index selects the active key. On quota exhaustion a
/// caller advances the ring from the index it observed failing; the caller
/// gives up once rotation returns to where it started.
pub struct KeyRing {
    keys: Vec<String>,
    index: Mutex<usize>,
}

impl KeyRing {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            keys,
            index: Mutex::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The active (index, key) pair, or `None` when no keys are configured.
    pub fn current(&self) -> Option<(usize, String)> {
        if self.keys.is_empty() {
            return None;
        }
        let index = *self.index.lock().expect("key ring lock poisoned");
        Some((index, self.keys[index].clone()))
    }

    /// Advance past `observed` (the index the caller saw fail) and return the
    /// new pair. Concurrent callers that already rotated are not rotated
    /// again: advancing is a no-op when the shared index has moved on.
    pub fn advance_from(&self, observed: usize) -> Option<(usize, String)> {
        if self.keys.is_empty() {
            return None;
        }
        let mut index = self.index.lock().expect("key ring lock poisoned");
        if *index == observed {
            *index = (*index + 1) % self.keys.len();
        }
        Some((*index, self.keys[*index].clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_and_detects_exhaustion() {
        let ring = KeyRing::new(vec!["a".into(), "b".into(), "c".into()]);
        let (start, key) = ring.current().unwrap();
        assert_eq!((start, key.as_str()), (0, "a"));

        let (i, key) = ring.advance_from(0).unwrap();
        assert_eq!((i, key.as_str()), (1, "b"));
        let (i, _) = ring.advance_from(1).unwrap();
        assert_eq!(i, 2);
        let (i, _) = ring.advance_from(2).unwrap();
        // Back at the starting index: the caller treats this as exhausted.
        assert_eq!(i, start);
    }

    #[test]
    fn concurrent_rotation_is_not_double_counted() {
        let ring = KeyRing::new(vec!["a".into(), "b".into()]);
        // Two callers both observed index 0 failing; only one rotation happens.
        let (i1, _) = ring.advance_from(0).unwrap();
        let (i2, _) = ring.advance_from(0).unwrap();
        assert_eq!(i1, 1);
        assert_eq!(i2, 1);
    }

    #[test]
    fn empty_ring_has_no_current_key() {
        let ring = KeyRing::new(Vec::new());
        assert!(ring.current().is_none());
    }
}

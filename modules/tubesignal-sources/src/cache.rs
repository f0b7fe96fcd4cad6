use chrono::{DateTime, Duration, Utc};

/// One cached value with its fetch timestamp. The freshness rule is shared
/// by every per-source actor: valid iff `now − cached_at < ttl`, where a
/// missing TTL means process-lifetime validity.
#[derive(Debug)]
pub struct TtlCell<T> {
    slot: Option<(T, DateTime<Utc>)>,
}

impl<T> Default for TtlCell<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T: Clone> TtlCell<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ttl: Option<Duration>, now: DateTime<Utc>) -> Option<T> {
        let (value, cached_at) = self.slot.as_ref()?;
        let fresh = match ttl {
            None => true,
            Some(ttl) => now - *cached_at < ttl,
        };
        fresh.then(|| value.clone())
    }

    pub fn put(&mut self, value: T, now: DateTime<Utc>) {
        self.slot = Some((value, now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_value_is_returned() {
        let mut cell = TtlCell::new();
        let now = Utc::now();
        cell.put(7u32, now);
        assert_eq!(cell.get(Some(Duration::minutes(10)), now), Some(7));
    }

    #[test]
    fn stale_value_is_withheld() {
        let mut cell = TtlCell::new();
        let now = Utc::now();
        cell.put(7u32, now - Duration::minutes(11));
        assert_eq!(cell.get(Some(Duration::minutes(10)), now), None);
    }

    #[test]
    fn missing_ttl_means_process_lifetime() {
        let mut cell = TtlCell::new();
        let now = Utc::now();
        cell.put(7u32, now - Duration::days(400));
        assert_eq!(cell.get(None, now), Some(7));
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use tracing::{info, warn};

use crate::engine::Engine;

/// Cancellation-check granularity while sleeping.
const SLEEP_SLICE: Duration = Duration::from_secs(30);
/// Back-off after a failed warm-up round.
const RETRY_DELAY_SECS: u64 = 3600;

/// Background worker that warms every configured region's trending digest
/// at process start and again at a fixed UTC hour each day.
pub struct WarmupWorker {
    engine: Engine,
    regions: Vec<String>,
    warmup_hour_utc: u32,
    cancelled: Arc<AtomicBool>,
}

impl WarmupWorker {
    pub fn new(
        engine: Engine,
        regions: Vec<String>,
        warmup_hour_utc: u32,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            engine,
            regions,
            warmup_hour_utc: warmup_hour_utc.min(23),
            cancelled,
        }
    }

    pub async fn run(self) {
        info!(regions = ?self.regions, hour = self.warmup_hour_utc, "warm-up worker started");
        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                break;
            }
            match self.warm_all_regions().await {
                Ok(()) => {
                    let wait = seconds_until_hour(self.warmup_hour_utc, Utc::now());
                    info!(next_run_in_secs = wait, "warm-up round complete");
                    if !self.sleep_cancellable(wait).await {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "warm-up round failed, retrying in an hour");
                    if !self.sleep_cancellable(RETRY_DELAY_SECS).await {
                        break;
                    }
                }
            }
        }
        info!("warm-up worker stopped");
    }

    async fn warm_all_regions(&self) -> anyhow::Result<()> {
        for region in &self.regions {
            self.engine.warm_up_trending(region).await?;
        }
        Ok(())
    }

    /// Sleep in short slices so shutdown is prompt. Returns false when
    /// cancelled.
    async fn sleep_cancellable(&self, seconds: u64) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(seconds);
        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                return false;
            }
            let now = tokio::time::Instant::now();
            if now >= deadline {
                return true;
            }
            let remaining = deadline - now;
            tokio::time::sleep(remaining.min(SLEEP_SLICE)).await;
        }
    }
}

/// Seconds until the next occurrence of `hour`:00 UTC, strictly in the
/// future.
pub fn seconds_until_hour(hour: u32, now: DateTime<Utc>) -> u64 {
    let today_run = Utc
        .with_ymd_and_hms(now.year(), now.month(), now.day(), hour, 0, 0)
        .single()
        .unwrap_or(now);
    let next = if today_run > now {
        today_run
    } else {
        today_run + chrono::Duration::days(1)
    };
    (next - now).num_seconds().max(1) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_run_is_later_today_when_before_the_hour() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 4, 0, 0).unwrap();
        assert_eq!(seconds_until_hour(6, now), 2 * 3600);
    }

    #[test]
    fn next_run_rolls_to_tomorrow_after_the_hour() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 7, 30, 0).unwrap();
        assert_eq!(seconds_until_hour(6, now), 22 * 3600 + 30 * 60);
    }

    #[test]
    fn exact_hour_schedules_a_full_day_ahead() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 6, 0, 0).unwrap();
        assert_eq!(seconds_until_hour(6, now), 24 * 3600);
    }
}

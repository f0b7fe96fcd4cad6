use chrono::{DateTime, Duration, Utc};

use tubesignal_common::{
    ActivityLevel, CompetitionTier, ContentSupply, EnrichedVideo, KeywordMetrics,
};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score the supply side of a keyword: how much content exists, how fast it
/// is being produced, and how big the demand/supply gap is.
///
/// `total_results` is the platform's total hit count for the query;
/// `videos` are the enriched top results used for averages and velocity.
pub fn score_content_gap(
    videos: &[EnrichedVideo],
    metrics: Option<&KeywordMetrics>,
    total_results: u64,
    now: DateTime<Utc>,
) -> ContentSupply {
    let volume = metrics.map(|m| m.monthly_searches).unwrap_or(0);

    let avg_views = if videos.is_empty() {
        0.0
    } else {
        videos.iter().map(|v| v.video.view_count as f64).sum::<f64>() / videos.len() as f64
    };
    let avg_subscribers = if videos.is_empty() {
        0.0
    } else {
        videos
            .iter()
            .map(|v| {
                v.channel
                    .as_ref()
                    .map(|c| c.subscriber_count as f64)
                    .unwrap_or(0.0)
            })
            .sum::<f64>()
            / videos.len() as f64
    };

    let uploaded_within = |days: i64| -> u32 {
        let cutoff = now - Duration::days(days);
        videos
            .iter()
            .filter(|v| v.video.published_at.map(|at| at >= cutoff).unwrap_or(false))
            .count() as u32
    };
    let uploads_today = uploaded_within(1);
    let uploads_last_3_days = uploaded_within(3);
    let uploads_last_week = uploaded_within(7);
    let uploads_last_month = uploaded_within(30);
    let uploads_last_year = uploaded_within(365);

    let content_gap_score = gap_score(volume, total_results, avg_subscribers);

    let activity = if uploads_last_week >= 3 {
        ActivityLevel::Hot
    } else if uploads_last_week >= 1 {
        ActivityLevel::Active
    } else if uploads_last_month >= 1 {
        ActivityLevel::Moderate
    } else if total_results > 0 {
        ActivityLevel::Slow
    } else {
        ActivityLevel::Dormant
    };

    let competition = if content_gap_score > 1.0 {
        CompetitionTier::Low
    } else if avg_subscribers > 500_000.0 || avg_views > 1_000_000.0 {
        CompetitionTier::High
    } else if avg_subscribers > 100_000.0 || avg_views > 100_000.0 {
        CompetitionTier::Medium
    } else {
        CompetitionTier::Low
    };

    let dormant_niche = (volume >= 5_000 && uploads_last_month == 0)
        || (volume >= 2_000 && uploads_last_week == 0 && uploads_last_month <= 2)
        || (volume >= 1_000 && uploads_last_week == 0 && total_results > 0);

    ContentSupply {
        video_count: total_results,
        avg_views: round2(avg_views),
        avg_subscribers: round2(avg_subscribers),
        uploads_today,
        uploads_last_3_days,
        uploads_last_week,
        uploads_last_month,
        uploads_last_year,
        content_gap_score,
        activity,
        competition,
        dormant_niche,
    }
}

/// Demand normalised by supply and competitor authority. >1 means demand
/// outstrips supply.
fn gap_score(volume: u64, video_count: u64, avg_subscribers: f64) -> f64 {
    if volume == 0 {
        return 0.0;
    }
    if video_count == 0 {
        return 2.0;
    }
    let demand = (volume as f64 / 10_000.0).min(1.0);
    let saturation = (video_count as f64 / 50.0).min(1.0) + 0.1;
    let authority = (avg_subscribers / 1_000_000.0).min(1.0) + 0.1;
    round2(demand / (saturation * authority)).clamp(0.0, 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubesignal_common::{Channel, Video};

    fn enriched(views: u64, subscribers: u64, published_days_ago: i64) -> EnrichedVideo {
        let mut video = Video {
            id: "v".to_string(),
            view_count: views,
            published_at: Some(Utc::now() - Duration::days(published_days_ago)),
            ..Video::default()
        };
        video.channel_id = "c".to_string();
        EnrichedVideo {
            channel: Some(Channel {
                id: "c".to_string(),
                subscriber_count: subscribers,
                ..Channel::default()
            }),
            ..EnrichedVideo::bare(video)
        }
    }

    fn metrics(volume: u64) -> KeywordMetrics {
        KeywordMetrics {
            monthly_searches: volume,
            ..KeywordMetrics::default()
        }
    }

    #[test]
    fn zero_volume_means_zero_gap_and_low_competition() {
        let supply = score_content_gap(&[], None, 0, Utc::now());
        assert_eq!(supply.content_gap_score, 0.0);
        assert_eq!(supply.competition, CompetitionTier::Low);
        assert_eq!(supply.activity, ActivityLevel::Dormant);
    }

    #[test]
    fn demand_without_any_supply_maxes_the_gap() {
        let supply = score_content_gap(&[], Some(&metrics(8_000)), 0, Utc::now());
        assert_eq!(supply.content_gap_score, 2.0);
    }

    #[test]
    fn gap_stays_within_bounds_across_extremes() {
        for volume in [0u64, 1, 500, 10_000, 5_000_000] {
            for count in [0u64, 1, 50, 100_000] {
                for subs in [0.0, 5_000.0, 2_000_000.0] {
                    let gap = gap_score(volume, count, subs);
                    assert!((0.0..=2.0).contains(&gap), "gap {gap} out of bounds");
                }
            }
        }
    }

    #[test]
    fn gap_formula_matches_hand_computation() {
        // demand 0.8, saturation 0.3+0.1, authority 0.05+0.1 → 0.8/0.06 → clamped
        assert_eq!(gap_score(8_000, 15, 50_000.0), 2.0);
        // demand 0.5, saturation 1.1, authority 1.1 → 0.41
        assert_eq!(gap_score(5_000, 500, 5_000_000.0), 0.41);
    }

    #[test]
    fn velocity_buckets_use_strict_cutoffs() {
        let videos = vec![
            enriched(100, 0, 0),   // today
            enriched(100, 0, 2),   // ≤3d
            enriched(100, 0, 6),   // ≤7d
            enriched(100, 0, 20),  // ≤30d
            enriched(100, 0, 200), // ≤365d
            enriched(100, 0, 400), // outside all buckets
        ];
        let supply = score_content_gap(&videos, None, 6, Utc::now());
        assert_eq!(supply.uploads_today, 1);
        assert_eq!(supply.uploads_last_3_days, 2);
        assert_eq!(supply.uploads_last_week, 3);
        assert_eq!(supply.uploads_last_month, 4);
        assert_eq!(supply.uploads_last_year, 5);
        assert_eq!(supply.activity, ActivityLevel::Hot);
    }

    #[test]
    fn averages_default_missing_channels_to_zero() {
        let mut no_channel = enriched(3_000, 0, 10);
        no_channel.channel = None;
        let videos = vec![no_channel, enriched(1_000, 400_000, 10)];
        let supply = score_content_gap(&videos, None, 2, Utc::now());
        assert_eq!(supply.avg_views, 2_000.0);
        assert_eq!(supply.avg_subscribers, 200_000.0);
        assert_eq!(supply.competition, CompetitionTier::Medium);
    }

    #[test]
    fn heavyweight_competitors_rate_high() {
        let videos = vec![enriched(2_000_000, 2_000_000, 10)];
        let supply = score_content_gap(&videos, Some(&metrics(1_000)), 400, Utc::now());
        assert_eq!(supply.competition, CompetitionTier::High);
    }

    #[test]
    fn dormant_niche_detection() {
        // Strong demand, nothing uploaded in a month.
        let old = vec![enriched(500, 1_000, 90)];
        let supply = score_content_gap(&old, Some(&metrics(6_000)), 40, Utc::now());
        assert!(supply.dormant_niche);

        // Modest demand, quiet week, some catalog.
        let supply = score_content_gap(&old, Some(&metrics(1_200)), 40, Utc::now());
        assert!(supply.dormant_niche);

        // Active week clears the flag.
        let fresh = vec![enriched(500, 1_000, 2)];
        let supply = score_content_gap(&fresh, Some(&metrics(6_000)), 40, Utc::now());
        assert!(!supply.dormant_niche);
    }
}

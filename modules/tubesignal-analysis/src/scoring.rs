use chrono::{DateTime, Datelike, Utc};

use tubesignal_common::{
    ChannelAuthoritySummary, CompetitionTier, ContentSupply, Grade, Scores, SearchDemand,
    TrendType,
};

use crate::demand::month_number;

/// Opportunity and difficulty on 0–100 scales, then the letter grade from
/// their net.
pub fn calculate_scores(
    demand: &SearchDemand,
    supply: &ContentSupply,
    authority: &ChannelAuthoritySummary,
    now: DateTime<Utc>,
) -> Scores {
    let opportunity = (volume_points(demand.monthly_searches)
        + gap_points(supply.content_gap_score)
        + momentum_points(demand, now)
        + rankability_points(authority, supply))
    .clamp(0, 100) as u8;

    let difficulty = (authority_points(supply.avg_subscribers)
        + saturation_points(supply.video_count)
        + view_competition_points(supply.avg_views)
        + channel_requirement_points(authority))
    .clamp(0, 100) as u8;

    let grade = grade_for(opportunity, difficulty);

    Scores {
        opportunity,
        difficulty,
        grade,
    }
}

pub fn grade_for(opportunity: u8, difficulty: u8) -> Grade {
    let net = i32::from(opportunity) - i32::from(difficulty);
    if net > 40 {
        Grade::A
    } else if net > 20 {
        Grade::B
    } else if net > 0 {
        Grade::C
    } else if net > -20 {
        Grade::D
    } else {
        Grade::F
    }
}

fn volume_points(volume: u64) -> i32 {
    if volume > 100_000 {
        25
    } else if volume > 50_000 {
        22
    } else if volume > 10_000 {
        18
    } else if volume > 1_000 {
        12
    } else if volume > 100 {
        6
    } else {
        3
    }
}

fn gap_points(gap: f64) -> i32 {
    if gap > 1.5 {
        30
    } else if gap > 1.0 {
        25
    } else if gap > 0.5 {
        15
    } else {
        5
    }
}

fn momentum_points(demand: &SearchDemand, now: DateTime<Utc>) -> i32 {
    match demand.trend_type {
        TrendType::Trending => 20,
        TrendType::Seasonal => {
            let in_season = demand
                .seasonal_peak_month
                .as_deref()
                .and_then(month_number)
                .map(|peak| peak == now.month())
                .unwrap_or(false);
            if in_season {
                18
            } else {
                8
            }
        }
        TrendType::Declining => 3,
        // A genuinely steady keyword earns 15; "consistent" by lack of any
        // trend signal earns the neutral 10.
        TrendType::Consistent => {
            if demand.momentum > 0 {
                15
            } else {
                10
            }
        }
    }
}

fn rankability_points(authority: &ChannelAuthoritySummary, supply: &ContentSupply) -> i32 {
    let mut points = if authority.needs_established_channel {
        5
    } else {
        25
    };
    if supply.competition == CompetitionTier::Low {
        points += 5;
    }
    points.min(25)
}

fn authority_points(avg_subscribers: f64) -> i32 {
    if avg_subscribers > 1_000_000.0 {
        30
    } else if avg_subscribers > 500_000.0 {
        25
    } else if avg_subscribers > 100_000.0 {
        18
    } else if avg_subscribers > 10_000.0 {
        10
    } else {
        5
    }
}

fn saturation_points(video_count: u64) -> i32 {
    if video_count > 100 {
        25
    } else if video_count > 50 {
        20
    } else if video_count > 20 {
        12
    } else if video_count > 10 {
        6
    } else {
        3
    }
}

fn view_competition_points(avg_views: f64) -> i32 {
    if avg_views > 1_000_000.0 {
        25
    } else if avg_views > 500_000.0 {
        20
    } else if avg_views > 100_000.0 {
        15
    } else if avg_views > 10_000.0 {
        8
    } else {
        3
    }
}

fn channel_requirement_points(authority: &ChannelAuthoritySummary) -> i32 {
    let mut points = if authority.needs_established_channel {
        20
    } else {
        5
    };
    if authority.estimated_min_subscribers > 50_000 {
        points += 5;
    }
    points.min(20)
}

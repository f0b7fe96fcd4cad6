use tubesignal_common::{KeywordMetrics, SearchDemand, TrendData, TrendDirection, TrendType};

/// Seasonal phrase → peak month. Matching is case-insensitive substring
/// containment against the keyword.
const SEASONAL_PEAKS: &[(&[&str], &str)] = &[
    (&["christmas", "holiday", "gift"], "December"),
    (&["halloween", "costume", "scary"], "October"),
    (&["summer", "beach", "vacation"], "July"),
    (&["back to school", "school supplies"], "August"),
    (&["tax", "taxes", "tax return"], "April"),
    (&["valentine", "romantic"], "February"),
    (&["thanksgiving", "turkey"], "November"),
    (&["new year", "resolution"], "January"),
];

pub fn month_number(name: &str) -> Option<u32> {
    match name {
        "January" => Some(1),
        "February" => Some(2),
        "March" => Some(3),
        "April" => Some(4),
        "May" => Some(5),
        "June" => Some(6),
        "July" => Some(7),
        "August" => Some(8),
        "September" => Some(9),
        "October" => Some(10),
        "November" => Some(11),
        "December" => Some(12),
        _ => None,
    }
}

fn seasonal_peak(keyword: &str) -> Option<&'static str> {
    let keyword = keyword.to_lowercase();
    for (phrases, month) in SEASONAL_PEAKS {
        if phrases.iter().any(|phrase| keyword.contains(phrase)) {
            return Some(month);
        }
    }
    None
}

/// Momentum from the trend's direction crossed with its interest level.
fn momentum_for(trend: Option<&TrendData>) -> i32 {
    let Some(trend) = trend else { return 0 };
    let high_interest = trend.interest_score > 50;
    match (trend.direction, high_interest) {
        (TrendDirection::Rising, true) => 50,
        (TrendDirection::Rising, false) => 25,
        (TrendDirection::Stable, _) => 0,
        (TrendDirection::Falling, true) => -25,
        (TrendDirection::Falling, false) => -50,
        (TrendDirection::Unknown, _) => 0,
    }
}

/// Classify search demand for a keyword from its trend data and ad-network
/// metrics. Both inputs degrade to neutral when absent.
pub fn classify_search_demand(
    keyword: &str,
    trend: Option<&TrendData>,
    metrics: Option<&KeywordMetrics>,
) -> SearchDemand {
    let monthly_searches = metrics.map(|m| m.monthly_searches).unwrap_or(0);
    let momentum = momentum_for(trend).clamp(-100, 100);

    let seasonal = seasonal_peak(keyword);
    let trend_type = if seasonal.is_some() {
        TrendType::Seasonal
    } else if momentum > 30 {
        TrendType::Trending
    } else if momentum < -30 {
        TrendType::Declining
    } else if rising_contains(trend, keyword) {
        TrendType::Trending
    } else {
        TrendType::Consistent
    };

    SearchDemand {
        monthly_searches,
        trend_type,
        momentum,
        seasonal_peak_month: seasonal.map(|m| m.to_string()),
    }
}

fn rising_contains(trend: Option<&TrendData>, keyword: &str) -> bool {
    let Some(trend) = trend else { return false };
    let keyword = keyword.to_lowercase();
    trend
        .rising_queries
        .iter()
        .any(|query| query.to_lowercase() == keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend(direction: TrendDirection, interest: u8) -> TrendData {
        TrendData {
            keyword: "k".to_string(),
            interest_score: interest,
            direction,
            related_queries: Vec::new(),
            rising_queries: Vec::new(),
        }
    }

    #[test]
    fn momentum_follows_direction_and_interest() {
        assert_eq!(momentum_for(Some(&trend(TrendDirection::Rising, 80))), 50);
        assert_eq!(momentum_for(Some(&trend(TrendDirection::Rising, 40))), 25);
        assert_eq!(momentum_for(Some(&trend(TrendDirection::Stable, 90))), 0);
        assert_eq!(momentum_for(Some(&trend(TrendDirection::Falling, 80))), -25);
        assert_eq!(momentum_for(Some(&trend(TrendDirection::Falling, 20))), -50);
        assert_eq!(momentum_for(Some(&trend(TrendDirection::Unknown, 99))), 0);
        assert_eq!(momentum_for(None), 0);
    }

    #[test]
    fn absent_trend_data_is_neutral() {
        let demand = classify_search_demand("mechanical keyboards", None, None);
        assert_eq!(demand.momentum, 0);
        assert_eq!(demand.trend_type, TrendType::Consistent);
        assert_eq!(demand.monthly_searches, 0);
        assert!(demand.seasonal_peak_month.is_none());
    }

    #[test]
    fn seasonal_keyword_wins_even_without_trend_data() {
        let demand = classify_search_demand("christmas gift ideas", None, None);
        assert_eq!(demand.trend_type, TrendType::Seasonal);
        assert_eq!(demand.seasonal_peak_month.as_deref(), Some("December"));
    }

    #[test]
    fn seasonal_matching_is_case_insensitive() {
        let demand = classify_search_demand("HALLOWEEN Makeup", None, None);
        assert_eq!(demand.seasonal_peak_month.as_deref(), Some("October"));
        assert_eq!(
            classify_search_demand("Tax Return Walkthrough", None, None)
                .seasonal_peak_month
                .as_deref(),
            Some("April")
        );
    }

    #[test]
    fn strong_rising_momentum_is_trending() {
        let demand =
            classify_search_demand("ai agents", Some(&trend(TrendDirection::Rising, 80)), None);
        assert_eq!(demand.trend_type, TrendType::Trending);
        assert_eq!(demand.momentum, 50);
    }

    #[test]
    fn strong_falling_momentum_is_declining() {
        let demand =
            classify_search_demand("fidget spinner", Some(&trend(TrendDirection::Falling, 10)), None);
        assert_eq!(demand.trend_type, TrendType::Declining);
    }

    #[test]
    fn rising_query_membership_promotes_to_trending() {
        let mut data = trend(TrendDirection::Stable, 40);
        data.rising_queries = vec!["Mechanical Keyboards".to_string()];
        let demand = classify_search_demand("mechanical keyboards", Some(&data), None);
        assert_eq!(demand.trend_type, TrendType::Trending);
        assert_eq!(demand.momentum, 0);
    }

    #[test]
    fn volume_comes_from_metrics() {
        let metrics = KeywordMetrics {
            keyword: "k".to_string(),
            monthly_searches: 12_000,
            ..KeywordMetrics::default()
        };
        let demand = classify_search_demand("k", None, Some(&metrics));
        assert_eq!(demand.monthly_searches, 12_000);
    }

    #[test]
    fn month_numbers_resolve() {
        assert_eq!(month_number("December"), Some(12));
        assert_eq!(month_number("Smarch"), None);
    }
}

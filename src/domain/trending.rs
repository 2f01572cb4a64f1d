//! Trending projections
//!
//! Pure read-side rankings computed from recent activity. Nothing here is
//! persisted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Default number of trending categories
pub const DEFAULT_TRENDING_CATEGORIES_LIMIT: usize = 6;

/// Default number of trending searches
pub const DEFAULT_TRENDING_SEARCHES_LIMIT: usize = 10;

/// `now - length`, clamped to the earliest representable instant
pub fn instant_before(now: DateTime<Utc>, length: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(length).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Closed time interval `[start, end]` activity is counted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window covering the last `length` up to `now`
    pub fn trailing(length: Duration, now: DateTime<Utc>) -> Self {
        Self {
            start: instant_before(now, length),
            end: now,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }

    /// Whole days between `at` and the end of the window
    pub fn age_days(&self, at: DateTime<Utc>) -> i64 {
        (self.end - at).num_days().max(0)
    }
}

/// Occurrences of one normalized query inside a window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCount {
    pub query: String,
    pub count: i64,
    pub last_searched_at: DateTime<Utc>,
}

/// Trending search as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingSearch {
    pub query: String,
    pub count: i64,
}

/// Rank searches by count, then most recent occurrence, then text
pub fn rank_searches(mut counts: Vec<SearchCount>, limit: usize) -> Vec<TrendingSearch> {
    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.last_searched_at.cmp(&a.last_searched_at))
            .then_with(|| a.query.cmp(&b.query))
    });

    counts
        .into_iter()
        .take(limit)
        .map(|c| TrendingSearch {
            query: c.query,
            count: c.count,
        })
        .collect()
}

/// Activity of one category on one day of the window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryActivity {
    pub category_id: Uuid,
    pub name: String,
    pub slug: String,
    pub icon: String,
    pub sort_order: i32,
    /// Whole days before the end of the window
    pub age_days: i64,
    /// Listings posted that day
    pub listings: i64,
    /// Searches that day mentioning the category name
    pub searches: i64,
}

/// Trending category as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingCategory {
    pub category_id: Uuid,
    pub name: String,
    pub slug: String,
    pub icon: String,
    pub score: f64,
    pub listing_count: i64,
    pub search_count: i64,
}

/// Weights of the recency-decayed category score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendingWeights {
    /// Days after which an event counts half
    pub half_life_days: f64,
    pub listing_weight: f64,
    pub search_weight: f64,
}

impl TrendingWeights {
    fn decay(&self, age_days: i64) -> f64 {
        if self.half_life_days <= 0.0 {
            return 1.0;
        }
        0.5_f64.powf(age_days as f64 / self.half_life_days)
    }
}

impl Default for TrendingWeights {
    fn default() -> Self {
        Self {
            half_life_days: 3.0,
            listing_weight: 1.0,
            search_weight: 0.5,
        }
    }
}

/// Aggregate daily activity into scored categories and keep the top `limit`.
///
/// score = Σ (listings·listing_weight + searches·search_weight) · 0.5^(age/half_life),
/// rounded to 2 decimals. Ties go to raw activity, then `sort_order`, then name.
pub fn rank_categories(
    activity: Vec<CategoryActivity>,
    weights: &TrendingWeights,
    limit: usize,
) -> Vec<TrendingCategory> {
    let mut by_category: HashMap<Uuid, (TrendingCategory, i32)> = HashMap::new();

    for day in activity {
        let weighted = (day.listings as f64 * weights.listing_weight
            + day.searches as f64 * weights.search_weight)
            * weights.decay(day.age_days);

        let (entry, _) = by_category.entry(day.category_id).or_insert_with(|| {
            (
                TrendingCategory {
                    category_id: day.category_id,
                    name: day.name.clone(),
                    slug: day.slug.clone(),
                    icon: day.icon.clone(),
                    score: 0.0,
                    listing_count: 0,
                    search_count: 0,
                },
                day.sort_order,
            )
        });
        entry.score += weighted;
        entry.listing_count += day.listings;
        entry.search_count += day.searches;
    }

    let mut ranked: Vec<(TrendingCategory, i32)> = by_category
        .into_values()
        .map(|(mut category, sort_order)| {
            category.score = (category.score * 100.0).round() / 100.0;
            (category, sort_order)
        })
        .filter(|(category, _)| category.listing_count + category.search_count > 0)
        .collect();

    ranked.sort_by(|(a, order_a), (b, order_b)| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| {
                (b.listing_count + b.search_count).cmp(&(a.listing_count + a.search_count))
            })
            .then_with(|| order_a.cmp(order_b))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.category_id.cmp(&b.category_id))
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|(category, _)| category)
        .collect()
}

/// Whether a normalized search mentions a category name
pub fn search_mentions_category(normalized_query: &str, category_name: &str) -> bool {
    let name = category_name.to_lowercase();
    !name.is_empty() && normalized_query.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(name: &str, sort_order: i32, age_days: i64, listings: i64, searches: i64) -> CategoryActivity {
        CategoryActivity {
            category_id: Uuid::from_u128(sort_order as u128 + 1),
            name: name.to_string(),
            slug: name.to_lowercase(),
            icon: "tag".to_string(),
            sort_order,
            age_days,
            listings,
            searches,
        }
    }

    #[test]
    fn test_time_window() {
        let now = Utc::now();
        let window = TimeWindow::trailing(Duration::days(7), now);

        assert!(window.contains(now - Duration::days(6)));
        assert!(!window.contains(now - Duration::days(8)));
        assert_eq!(window.age_days(now - Duration::hours(30)), 1);

        let unbounded = TimeWindow::trailing(Duration::days(100_000_000), now);
        assert_eq!(unbounded.start, DateTime::<Utc>::MIN_UTC);
        assert!(unbounded.contains(now - Duration::days(36_500)));
        assert_eq!(window.age_days(now + Duration::hours(1)), 0);
    }

    #[test]
    fn test_rank_searches_count_then_recency() {
        let now = Utc::now();
        let counts = vec![
            SearchCount { query: "lamp".into(), count: 2, last_searched_at: now },
            SearchCount { query: "chair".into(), count: 3, last_searched_at: now - Duration::days(1) },
            SearchCount { query: "desk".into(), count: 2, last_searched_at: now - Duration::hours(1) },
        ];

        let ranked = rank_searches(counts, 10);
        let queries: Vec<_> = ranked.iter().map(|t| t.query.as_str()).collect();
        assert_eq!(queries, vec!["chair", "lamp", "desk"]);
        assert_eq!(ranked[0].count, 3);
    }

    #[test]
    fn test_rank_searches_respects_limit() {
        let now = Utc::now();
        let counts = (0..5)
            .map(|i| SearchCount { query: format!("q{i}"), count: i, last_searched_at: now })
            .collect();

        assert_eq!(rank_searches(counts, 3).len(), 3);
    }

    #[test]
    fn test_rank_categories_decays_old_activity() {
        let activity = vec![
            // 4 listings today
            day("Phones", 0, 0, 4, 0),
            // 6 listings six days ago: 6 * 0.25 = 1.5
            day("Vehicles", 1, 6, 6, 0),
        ];

        let ranked = rank_categories(activity, &TrendingWeights::default(), 6);
        assert_eq!(ranked[0].name, "Phones");
        assert_eq!(ranked[0].score, 4.0);
        assert_eq!(ranked[1].score, 1.5);
        assert_eq!(ranked[1].listing_count, 6);
    }

    #[test]
    fn test_rank_categories_sums_days_and_searches() {
        let activity = vec![
            day("Home", 0, 0, 1, 2),
            day("Home", 0, 3, 2, 0),
        ];

        let ranked = rank_categories(activity, &TrendingWeights::default(), 6);
        assert_eq!(ranked.len(), 1);
        // (1 + 2*0.5) + 2*0.5 = 3.0
        assert_eq!(ranked[0].score, 3.0);
        assert_eq!(ranked[0].listing_count, 3);
        assert_eq!(ranked[0].search_count, 2);
    }

    #[test]
    fn test_rank_categories_limit_and_ties() {
        let activity = vec![
            day("B", 2, 0, 1, 0),
            day("A", 1, 0, 1, 0),
            day("C", 3, 0, 1, 0),
            day("D", 4, 0, 0, 0),
        ];

        let ranked = rank_categories(activity, &TrendingWeights::default(), 3);
        let names: Vec<_> = ranked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_search_mentions_category() {
        assert!(search_mentions_category("iphone phones used", "Phones"));
        assert!(!search_mentions_category("sofa", "Phones"));
        assert!(!search_mentions_category("sofa", ""));
    }
}

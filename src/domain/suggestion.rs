//! Search suggestions
//!
//! Candidates come from the store; ranking happens here so every store
//! backend yields the same deterministic order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use uuid::Uuid;

/// Default number of suggestions returned
pub const DEFAULT_SUGGESTION_LIMIT: usize = 8;

/// Where a suggestion comes from.
///
/// Declaration order is the ranking priority among equally good matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Category,
    Subcategory,
    Search,
    Listing,
}

/// Raw match returned by a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionCandidate {
    pub text: String,
    pub kind: SuggestionKind,
    pub slug: Option<String>,
    pub listing_id: Option<Uuid>,
    /// Listing post date or last time the query was searched
    pub last_seen: Option<DateTime<Utc>>,
}

impl SuggestionCandidate {
    pub fn category(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            text: name.into(),
            kind: SuggestionKind::Category,
            slug: Some(slug.into()),
            listing_id: None,
            last_seen: None,
        }
    }

    pub fn subcategory(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            kind: SuggestionKind::Subcategory,
            ..Self::category(name, slug)
        }
    }

    pub fn search(query: impl Into<String>, last_seen: DateTime<Utc>) -> Self {
        Self {
            text: query.into(),
            kind: SuggestionKind::Search,
            slug: None,
            listing_id: None,
            last_seen: Some(last_seen),
        }
    }

    pub fn listing(title: impl Into<String>, id: Uuid, posted_at: DateTime<Utc>) -> Self {
        Self {
            text: title.into(),
            kind: SuggestionKind::Listing,
            slug: None,
            listing_id: Some(id),
            last_seen: Some(posted_at),
        }
    }
}

/// Suggestion as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub text: String,
    pub kind: SuggestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<Uuid>,
}

impl From<SuggestionCandidate> for Suggestion {
    fn from(candidate: SuggestionCandidate) -> Self {
        Self {
            text: candidate.text,
            kind: candidate.kind,
            slug: candidate.slug,
            listing_id: candidate.listing_id,
        }
    }
}

/// How a suggestion was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    /// Query too short, nothing looked up
    None,
    /// Looked up in the store
    Database,
    /// Store failed and the failure was masked
    Fallback,
}

/// Suggestions plus their provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionSet {
    pub suggestions: Vec<Suggestion>,
    pub source: SuggestionSource,
}

impl SuggestionSet {
    pub fn empty(source: SuggestionSource) -> Self {
        Self {
            suggestions: Vec::new(),
            source,
        }
    }
}

/// Match quality, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    Exact,
    Prefix,
    WordPrefix,
    Substring,
}

impl MatchTier {
    /// Classify `text` against an already-lowercased query
    pub fn classify(text: &str, normalized_query: &str) -> Option<Self> {
        let haystack = text.to_lowercase();

        if haystack == normalized_query {
            Some(MatchTier::Exact)
        } else if haystack.starts_with(normalized_query) {
            Some(MatchTier::Prefix)
        } else if haystack
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| !word.is_empty() && word.starts_with(normalized_query))
        {
            Some(MatchTier::WordPrefix)
        } else if haystack.contains(normalized_query) {
            Some(MatchTier::Substring)
        } else {
            None
        }
    }
}

/// Rank candidates and keep at most `limit`.
///
/// Order: match tier, kind, recency (undated last), then text
/// case-insensitively. Case-insensitive duplicates keep their best entry and
/// candidates that do not contain the query are dropped.
pub fn rank_suggestions(
    candidates: Vec<SuggestionCandidate>,
    normalized_query: &str,
    limit: usize,
) -> Vec<Suggestion> {
    let mut scored: Vec<(MatchTier, String, SuggestionCandidate)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let tier = MatchTier::classify(&candidate.text, normalized_query)?;
            Some((tier, candidate.text.to_lowercase(), candidate))
        })
        .collect();

    scored.sort_by(|(tier_a, key_a, a), (tier_b, key_b, b)| {
        tier_a
            .cmp(tier_b)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| newest_first(a.last_seen, b.last_seen))
            .then_with(|| key_a.cmp(key_b))
            .then_with(|| a.text.cmp(&b.text))
    });

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .filter(|(_, key, _)| seen.insert(key.clone()))
        .take(limit)
        .map(|(_, _, candidate)| candidate.into())
        .collect()
}

fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_match_tiers() {
        assert_eq!(MatchTier::classify("Sofa", "sofa"), Some(MatchTier::Exact));
        assert_eq!(MatchTier::classify("Sofa bed", "sofa"), Some(MatchTier::Prefix));
        assert_eq!(MatchTier::classify("Red sofa", "sofa"), Some(MatchTier::WordPrefix));
        assert_eq!(MatchTier::classify("Minisofa", "sofa"), Some(MatchTier::Substring));
        assert_eq!(MatchTier::classify("Chair", "sofa"), None);
    }

    #[test]
    fn test_rank_orders_by_tier_then_kind() {
        let now = Utc::now();
        let candidates = vec![
            SuggestionCandidate::listing("Old sofa", Uuid::new_v4(), now),
            SuggestionCandidate::search("sofa", now),
            SuggestionCandidate::category("Sofas", "sofas"),
        ];

        let ranked = rank_suggestions(candidates, "sofa", 8);
        let texts: Vec<_> = ranked.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["sofa", "Sofas", "Old sofa"]);
    }

    #[test]
    fn test_rank_prefers_recent_then_alphabetical() {
        let now = Utc::now();
        let candidates = vec![
            SuggestionCandidate::listing("Sofa B", Uuid::new_v4(), now - Duration::days(2)),
            SuggestionCandidate::listing("Sofa C", Uuid::new_v4(), now),
            SuggestionCandidate::listing("Sofa A", Uuid::new_v4(), now - Duration::days(2)),
        ];

        let ranked = rank_suggestions(candidates, "sofa", 8);
        let texts: Vec<_> = ranked.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Sofa C", "Sofa A", "Sofa B"]);
    }

    #[test]
    fn test_rank_dedups_case_insensitively_and_limits() {
        let now = Utc::now();
        let candidates = vec![
            SuggestionCandidate::search("sofa bed", now),
            SuggestionCandidate::listing("Sofa Bed", Uuid::new_v4(), now),
            SuggestionCandidate::search("sofa cheap", now),
            SuggestionCandidate::search("sofa red", now),
            SuggestionCandidate::search("unrelated", now),
        ];

        let ranked = rank_suggestions(candidates, "sofa", 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].text, "sofa bed");
        assert_eq!(ranked[0].kind, SuggestionKind::Search);
        assert_eq!(ranked[1].text, "sofa cheap");
    }

    #[test]
    fn test_suggestion_json_shape() {
        let suggestion: Suggestion = SuggestionCandidate::category("Home", "home").into();
        let json = serde_json::to_value(&suggestion).unwrap();

        assert_eq!(json["kind"], "category");
        assert_eq!(json["slug"], "home");
        assert!(json.get("listingId").is_none());
    }
}

//! # Ranking Module
//!
//! ## Purpose
//! Heuristic scoring operations layered over the catalog: weighted relevance
//! search, anchored recommendations, and autocomplete suggestions. These are
//! deterministic rule tables, not learned models; the weights below are the
//! whole "AI".
//!
//! ## Input/Output Specification
//! - **Input**: Free-text query or anchor product id, plus the catalog
//! - **Output**: Scored/ordered product lists, suggestion lists
//! - **Determinism**: Stable descending sorts; ties preserve catalog order

use crate::catalog::{Category, Product};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Relevance search returns at most this many products
const SMART_SEARCH_LIMIT: usize = 20;

/// Recommendation lists return at most this many products
const RECOMMENDATION_LIMIT: usize = 6;

/// Suggestion lists return at most this many entries
const SUGGESTION_LIMIT: usize = 8;

/// General recommendations only consider products rated at least this highly
const RECOMMENDATION_MIN_RATING: f32 = 4.0;

// Fixed containment weights for relevance scoring
const NAME_WEIGHT: u32 = 10;
const CATEGORY_WEIGHT: u32 = 7;
const DESCRIPTION_WEIGHT: u32 = 5;
const TAG_WEIGHT: u32 = 3;

/// A product decorated with its computed relevance score
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredProduct {
    #[serde(flatten)]
    pub product: Product,
    pub relevance_score: f32,
}

/// Where an autocomplete suggestion came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Product,
    Category,
    Tag,
}

/// A single autocomplete suggestion
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub category: String,
}

/// Cumulative containment score for one product against a lowercased query.
/// Zero means no field matched at all.
fn match_score(product: &Product, needle: &str) -> u32 {
    let mut score = 0;

    if product.name.to_lowercase().contains(needle) {
        score += NAME_WEIGHT;
    }
    if product.description.to_lowercase().contains(needle) {
        score += DESCRIPTION_WEIGHT;
    }
    if product.category.as_str().contains(needle) {
        score += CATEGORY_WEIGHT;
    }
    // Additive per matching tag, no cap
    for tag in &product.tags {
        if tag.to_lowercase().contains(needle) {
            score += TAG_WEIGHT;
        }
    }

    score
}

/// Weighted relevance search over the catalog.
///
/// Products with no containment match are excluded outright; survivors get
/// their rating added as a tie-breaking boost, then sort descending by score
/// (ties keep catalog order) and truncate to 20. An empty query yields an
/// empty result, not the full catalog.
pub fn relevance_search(products: &[Product], query: &str) -> Vec<ScoredProduct> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredProduct> = products
        .iter()
        .filter_map(|product| {
            let base = match_score(product, &needle);
            if base == 0 {
                return None;
            }
            Some(ScoredProduct {
                product: product.clone(),
                relevance_score: base as f32 + product.rating,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
    });
    scored.truncate(SMART_SEARCH_LIMIT);
    scored
}

/// Product recommendations, optionally anchored on a product id.
///
/// A resolvable anchor yields up to 6 other products from its category, best
/// rated first. An absent or unresolvable anchor silently falls back to the
/// general branch: products rated >= 4.0, ordered by `rating * review_count`
/// as a popularity proxy. Never an error.
pub fn recommend(products: &[Product], anchor_id: Option<&str>) -> Vec<Product> {
    let anchor = anchor_id.and_then(|id| products.iter().find(|p| p.id == id));

    let mut result: Vec<Product> = match anchor {
        Some(anchor) => {
            let mut same_category: Vec<Product> = products
                .iter()
                .filter(|p| p.id != anchor.id && p.category == anchor.category)
                .cloned()
                .collect();
            same_category.sort_by(|a, b| {
                b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal)
            });
            same_category
        }
        None => {
            let mut popular: Vec<Product> = products
                .iter()
                .filter(|p| p.rating >= RECOMMENDATION_MIN_RATING)
                .cloned()
                .collect();
            popular.sort_by(|a, b| {
                let a_weight = a.rating * a.review_count as f32;
                let b_weight = b.rating * b.review_count as f32;
                b_weight.partial_cmp(&a_weight).unwrap_or(Ordering::Equal)
            });
            popular
        }
    };

    result.truncate(RECOMMENDATION_LIMIT);
    result
}

/// Autocomplete suggestions for a free-text prefix.
///
/// Sources in fixed precedence: product names, then the category
/// enumeration, then distinct catalog tags in first-encounter order.
/// Deduplicated by text (first occurrence wins), truncated to 8. A blank
/// prefix yields nothing.
pub fn suggest(products: &[Product], prefix: &str) -> Vec<Suggestion> {
    let needle = prefix.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut suggestions = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut push = |suggestions: &mut Vec<Suggestion>, text: String, kind, category: String| {
        if seen.insert(text.clone()) {
            suggestions.push(Suggestion {
                text,
                kind,
                category,
            });
        }
    };

    for product in products {
        if product.name.to_lowercase().contains(&needle) {
            push(
                &mut suggestions,
                product.name.clone(),
                SuggestionKind::Product,
                product.category.to_string(),
            );
        }
    }

    for category in Category::ALL {
        if category.as_str().contains(&needle) {
            push(
                &mut suggestions,
                category.as_str().to_string(),
                SuggestionKind::Category,
                category.to_string(),
            );
        }
    }

    for product in products {
        for tag in &product.tags {
            if tag.to_lowercase().contains(&needle) {
                push(
                    &mut suggestions,
                    tag.clone(),
                    SuggestionKind::Tag,
                    "general".to_string(),
                );
            }
        }
    }

    suggestions.truncate(SUGGESTION_LIMIT);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::catalog::CatalogSource;
    use crate::config::CatalogConfig;

    fn reference_products() -> Vec<Product> {
        StaticCatalog::load(&CatalogConfig::default())
            .unwrap()
            .all()
            .to_vec()
    }

    #[test]
    fn test_empty_query_yields_nothing() {
        let products = reference_products();
        assert!(relevance_search(&products, "").is_empty());
        assert!(relevance_search(&products, "   ").is_empty());
        assert!(suggest(&products, "").is_empty());
        assert!(suggest(&products, "  ").is_empty());
    }

    #[test]
    fn test_zero_score_products_are_excluded() {
        let products = reference_products();
        let results = relevance_search(&products, "smartwatch");
        assert!(!results.is_empty());
        // The rating boost alone must never admit a non-matching product
        for scored in &results {
            assert!(scored.relevance_score > scored.product.rating);
        }

        assert!(relevance_search(&products, "zzzzz").is_empty());
    }

    #[test]
    fn test_relevance_weights_accumulate() {
        let products = reference_products();

        // "camera" hits the Professional Camera on name (+10), description
        // (+5), and one tag (+3), plus its 4.8 rating
        let results = relevance_search(&products, "camera");
        let camera = results
            .iter()
            .find(|s| s.product.id == "product9")
            .expect("camera should match");
        assert!((camera.relevance_score - (18.0 + 4.8)).abs() < 1e-4);

        // A category-only match scores weight 7 + rating
        let results = relevance_search(&products, "electronics");
        assert!(!results.is_empty());
        for scored in &results {
            assert_eq!(scored.product.category, Category::Electronics);
            assert!((scored.relevance_score - (7.0 + scored.product.rating)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_relevance_results_sorted_and_capped() {
        let products = reference_products();
        let results = relevance_search(&products, "p");
        assert!(results.len() <= 20);
        assert!(results
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score));
    }

    #[test]
    fn test_recommend_with_anchor_stays_in_category() {
        let products = reference_products();
        let recs = recommend(&products, Some("product3"));
        assert!(!recs.is_empty());
        assert!(recs.len() <= 6);
        assert!(recs
            .iter()
            .all(|p| p.category == Category::Electronics && p.id != "product3"));
        assert!(recs.windows(2).all(|w| w[0].rating >= w[1].rating));
    }

    #[test]
    fn test_recommend_unknown_anchor_falls_back() {
        let products = reference_products();
        let general = recommend(&products, None);
        let fallback = recommend(&products, Some("no-such-product"));

        let ids = |list: &[Product]| list.iter().map(|p| p.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&general), ids(&fallback));

        assert!(general.iter().all(|p| p.rating >= 4.0));
        assert!(general.windows(2).all(|w| {
            w[0].rating * w[0].review_count as f32 >= w[1].rating * w[1].review_count as f32
        }));
    }

    #[test]
    fn test_suggest_precedence_and_dedupe() {
        let products = reference_products();

        // Product-name suggestions precede tag suggestions for "head"
        let suggestions = suggest(&products, "head");
        assert!(!suggestions.is_empty());
        assert_eq!(suggestions[0].text, "Wireless Headphones");
        assert_eq!(suggestions[0].kind, SuggestionKind::Product);
        let tag_pos = suggestions
            .iter()
            .position(|s| s.kind == SuggestionKind::Tag)
            .expect("the headphones tag should also match");
        assert!(tag_pos > 0);

        // Category suggestions surface for category substrings
        let suggestions = suggest(&products, "elec");
        assert!(suggestions
            .iter()
            .any(|s| s.kind == SuggestionKind::Category && s.text == "electronics"));

        // Tags shared by several products appear once
        let suggestions = suggest(&products, "casual");
        let casual_count = suggestions.iter().filter(|s| s.text == "casual").count();
        assert_eq!(casual_count, 1);
    }

    #[test]
    fn test_suggest_truncates_to_eight() {
        let products = reference_products();
        // Very common letter to force lots of candidates
        let suggestions = suggest(&products, "a");
        assert!(suggestions.len() <= 8);
    }
}

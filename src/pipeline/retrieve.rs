//! Candidate retrieval: persona hard filter plus lexical similarity.
//!
//! The query is built from the customer's concerns, recent searches, recently
//! viewed items, and weather/season context. Each eligible product is scored
//! by Jaccard overlap between query and document token sets, and the top 5
//! survive. Ties keep catalog order, so retrieval is fully deterministic.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::data::{Catalog, CustomerSignal, Product};
use crate::pipeline::persona::Persona;

/// Retrieval returns at most this many candidates.
pub const MAX_CANDIDATES: usize = 5;

/// Everything outside Latin alphanumerics, Hangul syllables, and whitespace
/// is noise.
static NON_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Za-z가-힣\s]").expect("valid token regex"));

/// A product that survived persona filtering, with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub product: Product,
    /// Jaccard similarity in [0, 1] between query and document tokens.
    pub similarity: f64,
}

/// Lower-cased token set of a text blob.
pub fn tokenize(text: &str) -> HashSet<String> {
    NON_TOKEN
        .replace_all(text, " ")
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity between two texts' token sets. 0.0 when either side
/// tokenizes to nothing.
pub fn similarity(query: &str, doc: &str) -> f64 {
    let q = tokenize(query);
    let d = tokenize(doc);
    if q.is_empty() || d.is_empty() {
        return 0.0;
    }
    let intersection = q.intersection(&d).count();
    let union = q.union(&d).count();
    intersection as f64 / union as f64
}

/// Assemble the retrieval query from user signals.
fn build_query(signal: &CustomerSignal) -> String {
    [
        signal.profile.concerns.join(" "),
        signal.logs.recent_search.join(" "),
        signal.logs.recent_viewed.join(" "),
        signal.context.weather.clone(),
        signal.context.season.clone(),
    ]
    .join(" ")
}

/// Searchable document for one product: name, summary, keywords, and review
/// bullets. Catalog-sourced fields only.
fn build_document(product: &Product) -> String {
    [
        product.name.clone(),
        product.summary.clone(),
        product.keywords.join(" "),
        product.review_summary_bullets.join(" "),
    ]
    .join(" ")
}

/// Retrieve the top candidates for a persona.
///
/// Hard-filters the catalog by persona eligibility, scores the rest, and
/// returns at most [`MAX_CANDIDATES`] in descending similarity. The sort is
/// stable: equal scores keep catalog order.
pub fn retrieve(catalog: &Catalog, persona: Persona, signal: &CustomerSignal) -> Vec<Candidate> {
    let query = build_query(signal);

    let mut candidates: Vec<Candidate> = catalog
        .products()
        .iter()
        .filter(|p| p.target_personas.contains(&persona))
        .map(|p| Candidate {
            similarity: similarity(&query, &build_document(p)),
            product: p.clone(),
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(MAX_CANDIDATES);

    tracing::debug!(
        persona = %persona,
        candidates = candidates.len(),
        "retrieval complete"
    );
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BehaviorLog, Context, CustomerProfile};

    fn product(id: &str, name: &str, keywords: &[&str], personas: &[Persona]) -> Product {
        Product {
            product_id: id.to_string(),
            brand_id: "B01".to_string(),
            name: name.to_string(),
            summary: String::new(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            efficacy: Vec::new(),
            ingredients: Vec::new(),
            usage: String::new(),
            review_summary_bullets: Vec::new(),
            season_tags: Vec::new(),
            target_personas: personas.to_vec(),
        }
    }

    fn signal(concerns: &[&str], searches: &[&str]) -> CustomerSignal {
        CustomerSignal {
            profile: CustomerProfile {
                age: 30,
                skin_type: "건성".to_string(),
                concerns: concerns.iter().map(|s| s.to_string()).collect(),
            },
            logs: BehaviorLog {
                recent_search: searches.iter().map(|s| s.to_string()).collect(),
                recent_viewed: Vec::new(),
                cart: Vec::new(),
            },
            context: Context {
                weather: "건조".to_string(),
                season: "겨울".to_string(),
            },
        }
    }

    #[test]
    fn tokenize_strips_punctuation_and_lowercases() {
        let tokens = tokenize("수분! 크림, SPF50+ (진정)");
        assert!(tokens.contains("수분"));
        assert!(tokens.contains("크림"));
        assert!(tokens.contains("spf50"));
        assert!(tokens.contains("진정"));
        assert!(!tokens.iter().any(|t| t.contains('!')));
    }

    #[test]
    fn similarity_is_bounded_and_reflexive() {
        let s = similarity("수분 크림 보습", "수분 크림 보습");
        assert!((s - 1.0).abs() < f64::EPSILON);

        let s = similarity("수분 크림", "탄력 앰플");
        assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn similarity_empty_side_is_zero() {
        assert_eq!(similarity("", "수분 크림"), 0.0);
        assert_eq!(similarity("수분 크림", ""), 0.0);
        assert_eq!(similarity("!!!", "수분"), 0.0);
    }

    #[test]
    fn retrieve_filters_by_persona_eligibility() {
        let catalog = Catalog::new(vec![
            product("P001", "수분 크림", &["수분"], &[Persona::Hydration]),
            product("P002", "진정 앰플", &["진정"], &[Persona::NaturalHealing]),
        ]);
        let candidates = retrieve(&catalog, Persona::Hydration, &signal(&["수분"], &[]));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].product.product_id, "P001");
    }

    #[test]
    fn retrieve_caps_at_five() {
        let products: Vec<Product> = (0..8)
            .map(|i| {
                product(
                    &format!("P{i:03}"),
                    &format!("수분 크림 {i}"),
                    &["수분"],
                    &[Persona::Hydration],
                )
            })
            .collect();
        let catalog = Catalog::new(products);
        let candidates = retrieve(&catalog, Persona::Hydration, &signal(&["수분"], &[]));
        assert_eq!(candidates.len(), MAX_CANDIDATES);
    }

    #[test]
    fn ties_keep_catalog_order() {
        // Identical documents score identically; catalog order must hold.
        let catalog = Catalog::new(vec![
            product("P001", "수분 크림", &[], &[Persona::Hydration]),
            product("P002", "수분 크림", &[], &[Persona::Hydration]),
            product("P003", "수분 크림", &[], &[Persona::Hydration]),
        ]);
        let candidates = retrieve(&catalog, Persona::Hydration, &signal(&["수분"], &[]));
        let ids: Vec<&str> = candidates
            .iter()
            .map(|c| c.product.product_id.as_str())
            .collect();
        assert_eq!(ids, vec!["P001", "P002", "P003"]);
    }

    #[test]
    fn higher_overlap_ranks_first() {
        let catalog = Catalog::new(vec![
            product("P001", "앰플", &["탄력"], &[Persona::Hydration]),
            product("P002", "수분 크림", &["수분", "보습", "건조"], &[Persona::Hydration]),
        ]);
        let candidates = retrieve(
            &catalog,
            Persona::Hydration,
            &signal(&["수분", "보습"], &["수분크림"]),
        );
        assert_eq!(candidates[0].product.product_id, "P002");
        assert!(candidates[0].similarity > candidates[1].similarity);
    }
}

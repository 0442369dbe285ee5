//! Weighted ranking and final product selection.
//!
//! Combines three normalized signals per candidate:
//!
//! - `sim`: lexical similarity from retrieval, weight 0.50
//! - `action`: recent-behavior bonus (viewed/cart), weight 0.30
//! - `ctx`: season/weather fit against `season_tags`, weight 0.20
//!
//! The raw action component is unbounded above: a product both viewed and
//! carted earns 0.6 + 0.8 before weighting. The season/weather check is a
//! substring match against the joined, lower-cased tag list.

use serde::{Deserialize, Serialize};

use crate::data::{BehaviorLog, Context, Product};
use crate::error::PipelineError;
use crate::pipeline::persona::Persona;
use crate::pipeline::retrieve::Candidate;

const SIM_WEIGHT: f64 = 0.50;
const ACTION_WEIGHT: f64 = 0.30;
const CONTEXT_WEIGHT: f64 = 0.20;

const VIEWED_BONUS: f64 = 0.6;
const CART_BONUS: f64 = 0.8;
const SEASON_BONUS: f64 = 0.6;
const WEATHER_BONUS: f64 = 0.4;

const DECISION_REASON: &str =
    "니즈 적합도(유사도) + 최근 행동 + 시즌/날씨 적합도를 종합해 선정했습니다.";

/// Itemized sub-scores justifying a selection. Rounded to 4 decimal places
/// for observability; `total` is the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub sim: f64,
    pub action: f64,
    pub ctx: f64,
    pub total: f64,
}

/// The chosen product with its score breakdown and rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    pub product: Product,
    pub score_breakdown: ScoreBreakdown,
    pub decision_reason: String,
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

fn score(candidate: &Candidate, logs: &BehaviorLog, context: &Context) -> ScoreBreakdown {
    let sim = candidate.similarity * SIM_WEIGHT;

    let name = &candidate.product.name;
    let mut action_raw = 0.0;
    if logs.recent_viewed.contains(name) {
        action_raw += VIEWED_BONUS;
    }
    if logs.cart.contains(name) {
        action_raw += CART_BONUS;
    }
    let action = action_raw * ACTION_WEIGHT;

    let tags = candidate.product.season_tags.join(" ").to_lowercase();
    let season = context.season.to_lowercase();
    let weather = context.weather.to_lowercase();
    let mut ctx_raw = 0.0;
    if !season.is_empty() && tags.contains(&season) {
        ctx_raw += SEASON_BONUS;
    }
    if !weather.is_empty() && tags.contains(&weather) {
        ctx_raw += WEATHER_BONUS;
    }
    let ctx = ctx_raw * CONTEXT_WEIGHT;

    ScoreBreakdown {
        sim: round4(sim),
        action: round4(action),
        ctx: round4(ctx),
        total: round4(sim + action + ctx),
    }
}

/// Score every candidate and select the top one.
///
/// The sort is stable, so equal totals keep the candidate (catalog) order.
/// An empty candidate list is the only failure: there is nothing to
/// recommend for this persona.
pub fn select(
    persona: Persona,
    candidates: &[Candidate],
    logs: &BehaviorLog,
    context: &Context,
) -> Result<Selection, PipelineError> {
    let mut scored: Vec<(ScoreBreakdown, &Candidate)> = candidates
        .iter()
        .map(|c| (score(c, logs, context), c))
        .collect();
    scored.sort_by(|a, b| {
        b.0.total
            .partial_cmp(&a.0.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let (score_breakdown, best) =
        scored
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::NoEligibleProducts {
                persona: persona.to_string(),
            })?;

    tracing::info!(
        product = %best.product.product_id,
        total = score_breakdown.total,
        "ranking selected product"
    );

    Ok(Selection {
        product: best.product.clone(),
        score_breakdown,
        decision_reason: DECISION_REASON.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, name: &str, similarity: f64, season_tags: &[&str]) -> Candidate {
        Candidate {
            product: Product {
                product_id: id.to_string(),
                brand_id: "B01".to_string(),
                name: name.to_string(),
                summary: String::new(),
                keywords: Vec::new(),
                efficacy: Vec::new(),
                ingredients: Vec::new(),
                usage: String::new(),
                review_summary_bullets: Vec::new(),
                season_tags: season_tags.iter().map(|s| s.to_string()).collect(),
                target_personas: vec![Persona::Hydration],
            },
            similarity,
        }
    }

    fn empty_logs() -> BehaviorLog {
        BehaviorLog::default()
    }

    fn context(weather: &str, season: &str) -> Context {
        Context {
            weather: weather.to_string(),
            season: season.to_string(),
        }
    }

    #[test]
    fn empty_candidates_is_an_explicit_error() {
        let err = select(Persona::Clearing, &[], &empty_logs(), &context("건조", "겨울"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoEligibleProducts { .. }));
        assert!(err.to_string().contains("CLEARING"));
    }

    #[test]
    fn similarity_only_when_no_behavior_or_season_match() {
        let candidates = vec![candidate("P001", "수분 크림", 0.4, &[])];
        let selection = select(
            Persona::Hydration,
            &candidates,
            &empty_logs(),
            &context("건조", "겨울"),
        )
        .unwrap();

        let b = selection.score_breakdown;
        assert_eq!(b.sim, 0.2);
        assert_eq!(b.action, 0.0);
        assert_eq!(b.ctx, 0.0);
        assert_eq!(b.total, 0.2);
    }

    #[test]
    fn viewed_and_cart_both_count() {
        let candidates = vec![candidate("P001", "수분 크림", 0.0, &[])];
        let logs = BehaviorLog {
            recent_search: Vec::new(),
            recent_viewed: vec!["수분 크림".to_string()],
            cart: vec!["수분 크림".to_string()],
        };
        let selection =
            select(Persona::Hydration, &candidates, &logs, &context("", "")).unwrap();

        // (0.6 + 0.8) * 0.30
        assert_eq!(selection.score_breakdown.action, 0.42);
        assert_eq!(selection.score_breakdown.total, 0.42);
    }

    #[test]
    fn season_and_weather_match_tags_as_substrings() {
        let candidates = vec![candidate("P001", "수분 크림", 0.0, &["겨울", "건조한 날씨"])];
        let selection = select(
            Persona::Hydration,
            &candidates,
            &empty_logs(),
            &context("건조", "겨울"),
        )
        .unwrap();

        // (0.6 + 0.4) * 0.20
        assert_eq!(selection.score_breakdown.ctx, 0.2);
    }

    #[test]
    fn empty_context_earns_no_bonus() {
        let candidates = vec![candidate("P001", "수분 크림", 0.0, &["겨울"])];
        let selection =
            select(Persona::Hydration, &candidates, &empty_logs(), &context("", "")).unwrap();
        assert_eq!(selection.score_breakdown.ctx, 0.0);
    }

    #[test]
    fn highest_total_wins_and_ties_keep_order() {
        let candidates = vec![
            candidate("P001", "a", 0.3, &[]),
            candidate("P002", "b", 0.8, &[]),
            candidate("P003", "c", 0.8, &[]),
        ];
        let selection = select(
            Persona::Hydration,
            &candidates,
            &empty_logs(),
            &context("", ""),
        )
        .unwrap();
        // P002 and P003 tie; the earlier candidate wins.
        assert_eq!(selection.product.product_id, "P002");
    }

    #[test]
    fn scoring_is_deterministic() {
        let candidates = vec![
            candidate("P001", "수분 크림", 0.3333, &["겨울"]),
            candidate("P002", "보습 앰플", 0.25, &[]),
        ];
        let logs = BehaviorLog {
            recent_search: Vec::new(),
            recent_viewed: vec!["수분 크림".to_string()],
            cart: Vec::new(),
        };
        let ctx = context("건조", "겨울");

        let first = select(Persona::Hydration, &candidates, &logs, &ctx).unwrap();
        let second = select(Persona::Hydration, &candidates, &logs, &ctx).unwrap();
        assert_eq!(first.score_breakdown, second.score_breakdown);
    }
}

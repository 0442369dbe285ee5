//! Copy brief assembly.
//!
//! Builds the single instruction block handed to the copywriter: brand tone,
//! a fact sheet restricted to catalog-sourced fields, the hard constraints,
//! and the recommendation rationale. The copywriter must not introduce any
//! product fact that is not in this block.

use serde::{Deserialize, Serialize};

use crate::data::{BrandBook, BrandRule};
use crate::pipeline::rank::Selection;

/// Catalog-sourced facts the generated copy may draw on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactSheet {
    pub product_name: String,
    pub efficacy: Vec<String>,
    pub ingredients: Vec<String>,
    pub usage: String,
    pub review_summary: Vec<String>,
}

/// The complete generation contract for one run: instruction text plus the
/// rule the guardian will validate against.
#[derive(Debug, Clone)]
pub struct CopyBrief {
    pub rule: BrandRule,
    pub fact_sheet: FactSheet,
    pub instruction: String,
}

/// Build the copy brief for a selected product.
///
/// Unknown brands fall back to the default rule (40/350 char limits, empty
/// word lists), so this never fails.
pub fn build(brands: &BrandBook, selection: &Selection) -> CopyBrief {
    let rule = brands.rule_for(&selection.product.brand_id);
    let product = &selection.product;

    let fact_sheet = FactSheet {
        product_name: product.name.clone(),
        efficacy: product.efficacy.clone(),
        ingredients: product.ingredients.clone(),
        usage: product.usage.clone(),
        review_summary: product.review_summary_bullets.clone(),
    };

    let instruction = format!(
        "너는 화장품 브랜드의 마케팅 카피라이터다.\n\
         [브랜드 톤]\n{tone}\n\n\
         [제품 팩트(팩트만 사용)]\n\
         - 제품명: {name}\n\
         - 효능: {efficacy}\n\
         - 성분: {ingredients}\n\
         - 사용법: {usage}\n\
         - 리뷰 요약: {reviews}\n\n\
         [제약]\n\
         - 제목 {title_max}자 이내\n\
         - 본문 {body_max}자 이내\n\
         - 금기어: {forbidden}\n\
         - 필수 문구: {required}\n\n\
         [추천 근거]\n{reason}\n",
        tone = rule.tone_guide,
        name = fact_sheet.product_name,
        efficacy = fact_sheet.efficacy.join(", "),
        ingredients = fact_sheet.ingredients.join(", "),
        usage = fact_sheet.usage,
        reviews = fact_sheet.review_summary.join(", "),
        title_max = rule.constraints.title_max,
        body_max = rule.constraints.body_max,
        forbidden = rule.forbidden_words.join(", "),
        required = rule.required_phrases.join(", "),
        reason = selection.decision_reason,
    );

    CopyBrief {
        rule,
        fact_sheet,
        instruction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BrandRule, Constraints, Product};
    use crate::pipeline::persona::Persona;
    use crate::pipeline::rank::ScoreBreakdown;

    fn selection(brand_id: &str) -> Selection {
        Selection {
            product: Product {
                product_id: "P001".to_string(),
                brand_id: brand_id.to_string(),
                name: "워터뱅크 수분 크림".to_string(),
                summary: "수분 장벽 강화 크림".to_string(),
                keywords: vec!["수분".to_string()],
                efficacy: vec!["보습".to_string(), "진정".to_string()],
                ingredients: vec!["히알루론산".to_string()],
                usage: "아침저녁 마지막 단계에 바릅니다.".to_string(),
                review_summary_bullets: vec!["촉촉해요".to_string()],
                season_tags: vec!["겨울".to_string()],
                target_personas: vec![Persona::Hydration],
            },
            score_breakdown: ScoreBreakdown {
                sim: 0.2,
                action: 0.0,
                ctx: 0.0,
                total: 0.2,
            },
            decision_reason: "니즈 적합도 기준 선정".to_string(),
        }
    }

    #[test]
    fn brief_embeds_facts_constraints_and_rationale() {
        let mut rules = std::collections::HashMap::new();
        rules.insert(
            "B01".to_string(),
            BrandRule {
                tone_guide: "정중하고 담백한 톤".to_string(),
                constraints: Constraints {
                    title_max: 30,
                    body_max: 200,
                },
                forbidden_words: vec!["100%".to_string()],
                required_phrases: vec!["개인차가 있을 수 있습니다".to_string()],
            },
        );
        let brands = BrandBook::new(rules);

        let brief = build(&brands, &selection("B01"));
        assert!(brief.instruction.contains("정중하고 담백한 톤"));
        assert!(brief.instruction.contains("워터뱅크 수분 크림"));
        assert!(brief.instruction.contains("히알루론산"));
        assert!(brief.instruction.contains("제목 30자 이내"));
        assert!(brief.instruction.contains("본문 200자 이내"));
        assert!(brief.instruction.contains("100%"));
        assert!(brief.instruction.contains("개인차가 있을 수 있습니다"));
        assert!(brief.instruction.contains("니즈 적합도 기준 선정"));
        assert_eq!(brief.rule.constraints.title_max, 30);
    }

    #[test]
    fn unknown_brand_uses_default_rule() {
        let brands = BrandBook::default();
        let brief = build(&brands, &selection("B99"));
        assert_eq!(brief.rule.constraints.title_max, 40);
        assert_eq!(brief.rule.constraints.body_max, 350);
        assert!(brief.rule.forbidden_words.is_empty());
        assert!(brief.instruction.contains("제목 40자 이내"));
    }

    #[test]
    fn fact_sheet_is_catalog_sourced_only() {
        let brands = BrandBook::default();
        let brief = build(&brands, &selection("B01"));
        assert_eq!(brief.fact_sheet.product_name, "워터뱅크 수분 크림");
        assert_eq!(brief.fact_sheet.efficacy, vec!["보습", "진정"]);
        assert_eq!(brief.fact_sheet.review_summary, vec!["촉촉해요"]);
    }
}

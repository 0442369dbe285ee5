//! Copy generation: one model call per attempt, with a deterministic
//! template fallback.
//!
//! Each attempt asks the generator for exactly three strategy variants as a
//! single JSON payload. Transport errors and malformed payloads are absorbed
//! here: the attempt degrades to templates built from the fact sheet, which
//! still pass through the guardian like any other draft.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::Constraints;
use crate::error::GenerationError;
use crate::llm::TextGenerator;
use crate::pipeline::prompt::{CopyBrief, FactSheet};

/// Messaging strategy of one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    /// Efficacy and facts first.
    TechSpec,
    /// Empathize with the situation, address the concern.
    Empathy,
    /// Practical routine and usage tips.
    BenefitTip,
}

/// One generated marketing message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub title: String,
    pub body: String,
}

/// Expected payload shape from the generator.
#[derive(Debug, Deserialize)]
struct GenerationPayload {
    messages: Vec<CopyMessage>,
}

/// Drafts message sets against an optional generator. `None` means offline:
/// every attempt uses the fallback templates.
pub struct Copywriter {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Copywriter {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    /// Produce one draft attempt. Never fails: generation or parse errors
    /// degrade to the deterministic fallback.
    pub async fn draft(&self, brief: &CopyBrief, feedback: Option<&str>) -> Vec<CopyMessage> {
        let Some(generator) = self.generator.as_ref() else {
            tracing::debug!("no generator configured, using fallback templates");
            return fallback(&brief.fact_sheet, &brief.rule.constraints);
        };

        let request = build_request(brief, feedback);
        match generator.generate(&request).await {
            Ok(raw) => match parse_payload(&raw) {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::warn!("generation payload rejected: {e}, using fallback templates");
                    fallback(&brief.fact_sheet, &brief.rule.constraints)
                }
            },
            Err(e) => {
                tracing::warn!("generation failed: {e}, using fallback templates");
                fallback(&brief.fact_sheet, &brief.rule.constraints)
            }
        }
    }
}

/// Full request prompt: the brief's instruction block, the three-strategy
/// directive, prior feedback verbatim, and the output format.
fn build_request(brief: &CopyBrief, feedback: Option<&str>) -> String {
    format!(
        "{instruction}\n\
         [추가 지시]\n\
         - 아래 3가지 전략 메시지를 각각 1개씩 만들어라.\n\
           1) TECH_SPEC: 효능/팩트 중심\n\
           2) EMPATHY: 상황 공감/고민 해결 중심\n\
           3) BENEFIT_TIP: 실용/루틴/사용 팁 중심\n\
         - 반드시 '제품 팩트' 범위에서만 말할 것(없는 효능/성분 만들지 말 것)\n\
         - 피드백이 있으면 반영: {feedback}\n\n\
         [출력은 JSON만]\n\
         형식:\n\
         {{\n\
           \"messages\": [\n\
             {{\"type\":\"TECH_SPEC\",\"title\":\"...\",\"body\":\"...\"}},\n\
             {{\"type\":\"EMPATHY\",\"title\":\"...\",\"body\":\"...\"}},\n\
             {{\"type\":\"BENEFIT_TIP\",\"title\":\"...\",\"body\":\"...\"}}\n\
           ]\n\
         }}\n",
        instruction = brief.instruction,
        feedback = feedback.unwrap_or(""),
    )
}

/// Parse the generator's raw text into messages.
///
/// Strips enclosing code fences, then requires a JSON object with a
/// non-empty `messages` array of well-formed entries. Anything else is a
/// payload error and the caller falls back.
fn parse_payload(raw: &str) -> Result<Vec<CopyMessage>, GenerationError> {
    let cleaned = strip_code_fences(raw);
    let payload: GenerationPayload =
        serde_json::from_str(cleaned).map_err(|e| GenerationError::InvalidPayload {
            reason: e.to_string(),
        })?;
    if payload.messages.is_empty() {
        return Err(GenerationError::InvalidPayload {
            reason: "messages array is empty".to_string(),
        });
    }
    Ok(payload.messages)
}

/// Strip an enclosing Markdown code fence (``` or ```json) if present.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") up to the first newline.
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Deterministic three-message template set built from the fact sheet.
///
/// Titles and bodies are truncated to the brand limits so the fallback
/// never trips the length checks on its own; required phrases and forbidden
/// words remain the guardian's call.
fn fallback(fact: &FactSheet, constraints: &Constraints) -> Vec<CopyMessage> {
    let top_efficacy = fact
        .efficacy
        .iter()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    let drafts = [
        (
            MessageKind::TechSpec,
            format!("{} 핵심 케어", fact.product_name),
            format!("{} 중심. {}", top_efficacy, fact.usage),
        ),
        (
            MessageKind::Empathy,
            "요즘 피부 컨디션".to_string(),
            format!("흔들릴 때 부담 없이 루틴에. {}", fact.usage),
        ),
        (
            MessageKind::BenefitTip,
            "오늘 루틴 팁".to_string(),
            format!("토너 다음 단계로 간단히. {}", fact.usage),
        ),
    ];

    drafts
        .into_iter()
        .map(|(kind, title, body)| CopyMessage {
            kind,
            title: truncate_chars(&title, constraints.title_max),
            body: truncate_chars(&body, constraints.body_max),
        })
        .collect()
}

/// Truncate to at most `max` chars. Char-based, not byte-based: the copy is
/// Korean and a byte cut could split a syllable.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    s.chars().take(max).collect()
}

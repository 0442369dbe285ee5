//! Brand compliance gate.
//!
//! Scans a full draft against the brand rule and aggregates every violation
//! across every message; nothing short-circuits. A failed verdict is normal
//! control flow for the retry loop, not an error.

use crate::data::BrandRule;
use crate::pipeline::copywriter::CopyMessage;

/// Appended to the violation list so the next attempt knows what to fix.
const REMEDIATION_HINT: &str = "-> 제목/본문 줄이고, 금기어 제거, 필수 문구 추가";

/// Feedback sentinel for a clean verdict.
pub const PASS: &str = "PASS";

/// One brand-rule violation in one message. Lengths are counted in chars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    TitleTooLong {
        index: usize,
        len: usize,
        max: usize,
    },
    BodyTooLong {
        index: usize,
        len: usize,
        max: usize,
    },
    ForbiddenWord {
        index: usize,
        word: String,
    },
    MissingPhrase {
        index: usize,
        phrase: String,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::TitleTooLong { index, len, max } => {
                write!(f, "[{index}] 제목 길이 초과({len}/{max})")
            }
            Violation::BodyTooLong { index, len, max } => {
                write!(f, "[{index}] 본문 길이 초과({len}/{max})")
            }
            Violation::ForbiddenWord { index, word } => {
                write!(f, "[{index}] 금기어 포함: {word}")
            }
            Violation::MissingPhrase { index, phrase } => {
                write!(f, "[{index}] 필수 문구 누락: {phrase}")
            }
        }
    }
}

/// Outcome of one compliance review.
#[derive(Debug, Clone, Default)]
pub struct Verdict {
    pub violations: Vec<Violation>,
}

impl Verdict {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Human-readable feedback: the PASS sentinel, or every violation joined
    /// with a fixed remediation hint.
    pub fn feedback(&self) -> String {
        if self.is_clean() {
            return PASS.to_string();
        }
        let listed = self
            .violations
            .iter()
            .map(Violation::to_string)
            .collect::<Vec<_>>()
            .join(" / ");
        format!("{listed} {REMEDIATION_HINT}")
    }
}

/// Review a draft against a brand rule.
pub fn review(messages: &[CopyMessage], rule: &BrandRule) -> Verdict {
    let mut violations = Vec::new();

    for (index, message) in messages.iter().enumerate() {
        let title_len = message.title.chars().count();
        if title_len > rule.constraints.title_max {
            violations.push(Violation::TitleTooLong {
                index,
                len: title_len,
                max: rule.constraints.title_max,
            });
        }

        let body_len = message.body.chars().count();
        if body_len > rule.constraints.body_max {
            violations.push(Violation::BodyTooLong {
                index,
                len: body_len,
                max: rule.constraints.body_max,
            });
        }

        for word in &rule.forbidden_words {
            if !word.is_empty() && (message.title.contains(word) || message.body.contains(word)) {
                violations.push(Violation::ForbiddenWord {
                    index,
                    word: word.clone(),
                });
            }
        }

        for phrase in &rule.required_phrases {
            if !phrase.is_empty() && !message.body.contains(phrase) {
                violations.push(Violation::MissingPhrase {
                    index,
                    phrase: phrase.clone(),
                });
            }
        }
    }

    Verdict { violations }
}

//! Rule-based persona classification.
//!
//! Maps a customer's skin type, stated concerns, and recent searches onto one
//! of six fixed personas via keyword matching. Buckets are tested in a fixed
//! priority order and the first hit wins; anything unmatched lands on
//! [`Persona::DailyBasic`]. There is no failure path.

use serde::{Deserialize, Serialize};

use crate::data::CustomerSignal;

/// A customer's inferred primary skincare need. Gates product eligibility
/// during retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Persona {
    NaturalHealing,
    LuxuryCare,
    Hydration,
    Brightening,
    Clearing,
    DailyBasic,
}

impl Persona {
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::NaturalHealing => "NATURAL_HEALING",
            Persona::LuxuryCare => "LUXURY_CARE",
            Persona::Hydration => "HYDRATION",
            Persona::Brightening => "BRIGHTENING",
            Persona::Clearing => "CLEARING",
            Persona::DailyBasic => "DAILY_BASIC",
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier output: the persona plus the fixed rationale for the branch
/// that fired. Carried verbatim into the final bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaDecision {
    pub persona: Persona,
    pub reason: String,
}

/// Keyword buckets in priority order. First bucket with any keyword present
/// in the blob wins.
const BUCKETS: [(&[&str], Persona, &str); 5] = [
    (
        &["민감", "자극", "트러블", "진정", "붉은기"],
        Persona::NaturalHealing,
        "민감/진정 니즈가 강하고 자극을 피하려는 탐색이 보입니다.",
    ),
    (
        &["탄력", "주름", "윤기", "안티에이징", "리프팅"],
        Persona::LuxuryCare,
        "탄력/윤기 중심의 고기능 케어 니즈가 확인됩니다.",
    ),
    (
        &["수분", "건조", "보습", "속당김"],
        Persona::Hydration,
        "건조/보습 탐색이 많아 수분 우선 페르소나로 분류됩니다.",
    ),
    (
        &["톤업", "잡티", "미백", "기미"],
        Persona::Brightening,
        "톤/잡티 개선 니즈가 두드러집니다.",
    ),
    (
        &["각질", "피지", "모공", "블랙헤드"],
        Persona::Clearing,
        "피지/모공/각질 관련 관심도가 높습니다.",
    ),
];

const DEFAULT_REASON: &str = "특정 고민보다 데일리 기본 케어 성향이 우세합니다.";

/// Classify a customer into a persona.
///
/// Pure function of the lower-cased concatenation of skin type, concerns,
/// and recent searches.
pub fn classify(signal: &CustomerSignal) -> PersonaDecision {
    let blob = format!(
        "{} {} {}",
        signal.profile.skin_type,
        signal.profile.concerns.join(" "),
        signal.logs.recent_search.join(" "),
    )
    .to_lowercase();

    for (keywords, persona, reason) in BUCKETS {
        if keywords.iter().any(|k| blob.contains(k)) {
            return PersonaDecision {
                persona,
                reason: reason.to_string(),
            };
        }
    }

    PersonaDecision {
        persona: Persona::DailyBasic,
        reason: DEFAULT_REASON.to_string(),
    }
}

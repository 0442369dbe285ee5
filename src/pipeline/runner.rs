//! Pipeline runner: the retry loop and final bundle assembly.
//!
//! One `Pipeline` serves any number of runs; reference data is shared
//! immutably and each run owns its state on the stack. Stages execute
//! strictly in sequence:
//!
//! persona → retrieve → rank → prompt → generate → guard → (retry | final)
//!
//! Every failed validation increments `retry_count`. The loop re-enters
//! generation while the consumed retries stay within budget, so a run makes
//! at most `max_retries + 1` generation attempts. The final
//! bundle is assembled whether or not validation ever passed; callers check
//! `is_valid`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::{BrandBook, Catalog, CustomerSignal};
use crate::error::Result;
use crate::llm::TextGenerator;
use crate::pipeline::copywriter::{CopyMessage, Copywriter};
use crate::pipeline::guardian;
use crate::pipeline::persona::{self, Persona};
use crate::pipeline::prompt;
use crate::pipeline::rank::{self, ScoreBreakdown, Selection};
use crate::pipeline::retrieve::{self, Candidate};

/// Selected product summary for the final bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedProduct {
    pub product_id: String,
    pub brand_id: String,
    pub name: String,
    pub score_breakdown: ScoreBreakdown,
    pub decision_reason: String,
}

impl From<&Selection> for SelectedProduct {
    fn from(selection: &Selection) -> Self {
        Self {
            product_id: selection.product.product_id.clone(),
            brand_id: selection.product.brand_id.clone(),
            name: selection.product.name.clone(),
            score_breakdown: selection.score_breakdown,
            decision_reason: selection.decision_reason.clone(),
        }
    }
}

/// A retrieved candidate, summarized for observability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub product_id: String,
    pub brand_id: String,
    pub name: String,
    pub similarity: f64,
}

impl From<&Candidate> for CandidateSummary {
    fn from(candidate: &Candidate) -> Self {
        Self {
            product_id: candidate.product.product_id.clone(),
            brand_id: candidate.product.brand_id.clone(),
            name: candidate.product.name.clone(),
            similarity: candidate.similarity,
        }
    }
}

/// The externally visible result bundle. Plain data, fully serializable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalOutput {
    pub persona: Persona,
    pub persona_reason: String,
    pub selected_product: SelectedProduct,
    pub messages: Vec<CopyMessage>,
    pub retry_count: u32,
    pub is_valid: bool,
    pub feedback: String,
}

/// Final bundle plus the scored candidate list for observability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub candidates: Vec<CandidateSummary>,
    pub output: FinalOutput,
}

/// The assembled pipeline. Cheap to share; runs are independent.
pub struct Pipeline {
    catalog: Arc<Catalog>,
    brands: Arc<BrandBook>,
    copywriter: Copywriter,
    max_retries: u32,
}

impl Pipeline {
    pub fn new(
        catalog: Arc<Catalog>,
        brands: Arc<BrandBook>,
        generator: Option<Arc<dyn TextGenerator>>,
        max_retries: u32,
    ) -> Self {
        Self {
            catalog,
            brands,
            copywriter: Copywriter::new(generator),
            max_retries,
        }
    }

    /// Execute one pipeline run.
    ///
    /// Fatal outcomes are invalid input and an empty candidate set; every
    /// other failure is absorbed by its owning stage.
    pub async fn run(&self, signal: &CustomerSignal) -> Result<RunReport> {
        signal.validate()?;

        let decision = persona::classify(signal);
        tracing::info!(persona = %decision.persona, "persona classified");

        let candidates = retrieve::retrieve(&self.catalog, decision.persona, signal);
        let selection = rank::select(
            decision.persona,
            &candidates,
            &signal.logs,
            &signal.context,
        )?;
        let brief = prompt::build(&self.brands, &selection);

        let mut retry_count: u32 = 0;
        let mut prior_feedback: Option<String> = None;

        let (messages, is_valid, feedback) = loop {
            tracing::info!(
                attempt = retry_count + 1,
                product = %selection.product.product_id,
                "drafting copy"
            );
            let draft = self
                .copywriter
                .draft(&brief, prior_feedback.as_deref())
                .await;
            let verdict = guardian::review(&draft, &brief.rule);

            if verdict.is_clean() {
                break (draft, true, verdict.feedback());
            }

            retry_count += 1;
            let notes = verdict.feedback();
            tracing::info!(
                retry_count,
                violations = verdict.violations.len(),
                "draft rejected by guardian"
            );

            if retry_count > self.max_retries {
                break (draft, false, notes);
            }
            prior_feedback = Some(notes);
        };

        Ok(RunReport {
            candidates: candidates.iter().map(CandidateSummary::from).collect(),
            output: FinalOutput {
                persona: decision.persona,
                persona_reason: decision.reason,
                selected_product: SelectedProduct::from(&selection),
                messages,
                retry_count,
                is_valid,
                feedback,
            },
        })
    }
}

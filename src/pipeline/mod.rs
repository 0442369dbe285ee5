//! The personalization pipeline.
//!
//! Stage order is fixed: persona classification, candidate retrieval,
//! weighted ranking, brief assembly, copy generation, compliance review,
//! then either a retry of generation or the terminal bundle. Each stage is
//! a plain function with explicit inputs and outputs; the runner owns all
//! mutable run state.

pub mod copywriter;
pub mod guardian;
pub mod persona;
pub mod prompt;
pub mod rank;
pub mod retrieve;
pub mod runner;

pub use copywriter::{CopyMessage, Copywriter, MessageKind};
pub use guardian::{Verdict, Violation};
pub use persona::{Persona, PersonaDecision};
pub use prompt::{CopyBrief, FactSheet};
pub use rank::{ScoreBreakdown, Selection};
pub use retrieve::Candidate;
pub use runner::{CandidateSummary, FinalOutput, Pipeline, RunReport, SelectedProduct};

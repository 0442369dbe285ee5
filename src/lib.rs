//! Copysmith: persona-driven marketing copy with a brand compliance gate.
//!
//! Turns a customer signal (profile, behavior logs, weather/season context)
//! into a compliant marketing message set: classify a persona, retrieve and
//! rank eligible products, brief a text generator, and validate the copy
//! against brand rules, retrying with feedback until it passes or the
//! budget runs out.
//!
//! The text generator is injected behind [`llm::TextGenerator`], so the
//! whole pipeline runs deterministically (and offline) in tests.

pub mod config;
pub mod data;
pub mod error;
pub mod llm;
pub mod pipeline;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{FinalOutput, Pipeline, RunReport};

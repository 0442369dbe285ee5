//! Reference data and run input types.
//!
//! The catalog, brand rule table, and customer roster are loaded once from
//! flat JSON files into immutable snapshots. Concurrent runs may share them
//! behind `Arc` without locking; nothing here mutates after load.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, PipelineError};
use crate::pipeline::persona::Persona;

/// A catalog product. Read-only after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub brand_id: String,
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub efficacy: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub review_summary_bullets: Vec<String>,
    #[serde(default)]
    pub season_tags: Vec<String>,
    #[serde(default)]
    pub target_personas: Vec<Persona>,
}

/// Immutable product catalog snapshot, in file order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Load the catalog from a JSON array of products.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let products = read_json(path)?;
        Ok(Self { products })
    }

    /// Products in original catalog order. Retrieval relies on this order
    /// for deterministic tie-breaking.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Per-brand copy constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraints {
    /// Maximum title length, counted in chars.
    #[serde(default = "default_title_max")]
    pub title_max: usize,
    /// Maximum body length, counted in chars.
    #[serde(default = "default_body_max")]
    pub body_max: usize,
}

fn default_title_max() -> usize {
    40
}

fn default_body_max() -> usize {
    350
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            title_max: default_title_max(),
            body_max: default_body_max(),
        }
    }
}

/// Brand-safety rules for one brand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandRule {
    #[serde(default)]
    pub tone_guide: String,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub forbidden_words: Vec<String>,
    #[serde(default)]
    pub required_phrases: Vec<String>,
}

/// Brand rule table keyed by brand id.
#[derive(Debug, Clone, Default)]
pub struct BrandBook {
    rules: HashMap<String, BrandRule>,
}

impl BrandBook {
    pub fn new(rules: HashMap<String, BrandRule>) -> Self {
        Self { rules }
    }

    /// Load the brand rule table from a JSON object keyed by brand id.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let rules = read_json(path)?;
        Ok(Self { rules })
    }

    /// Rule for a brand. Unknown brands get the default rule: 40/350 char
    /// limits and empty word lists. Never fails.
    pub fn rule_for(&self, brand_id: &str) -> BrandRule {
        self.rules.get(brand_id).cloned().unwrap_or_default()
    }
}

/// Customer profile fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
    #[serde(default)]
    pub age: u32,
    pub skin_type: String,
    #[serde(default)]
    pub concerns: Vec<String>,
}

/// Behavioral logs: ordered, most recent first as recorded upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorLog {
    #[serde(default)]
    pub recent_search: Vec<String>,
    #[serde(default)]
    pub recent_viewed: Vec<String>,
    #[serde(default)]
    pub cart: Vec<String>,
}

/// Environmental context for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub weather: String,
    pub season: String,
}

/// Immutable input to one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSignal {
    pub profile: CustomerProfile,
    #[serde(default)]
    pub logs: BehaviorLog,
    pub context: Context,
}

impl CustomerSignal {
    /// Reject inputs missing required identity fields. Concerns, logs, and
    /// cart may legitimately be empty; skin type and context may not.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (field, value) in [
            ("profile.skin_type", &self.profile.skin_type),
            ("context.weather", &self.context.weather),
            ("context.season", &self.context.season),
        ] {
            if value.trim().is_empty() {
                return Err(PipelineError::InvalidInput {
                    field: field.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// A roster entry: customer id plus the run input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: String,
    #[serde(flatten)]
    pub signal: CustomerSignal,
}

/// Load the customer roster. Accepts either a JSON array of records or a
/// single record object.
pub fn load_customers(path: &Path) -> Result<Vec<CustomerRecord>, DataError> {
    let value: serde_json::Value = read_json(path)?;
    let records = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|one: CustomerRecord| vec![one])
    };
    records.map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Find one customer by id.
pub fn find_customer(records: &[CustomerRecord], id: &str) -> Result<CustomerRecord, DataError> {
    records
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .ok_or_else(|| DataError::CustomerNotFound { id: id.to_string() })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DataError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_signal() -> CustomerSignal {
        CustomerSignal {
            profile: CustomerProfile {
                age: 23,
                skin_type: "건성".to_string(),
                concerns: vec!["수분".to_string()],
            },
            logs: BehaviorLog::default(),
            context: Context {
                weather: "건조".to_string(),
                season: "겨울".to_string(),
            },
        }
    }

    #[test]
    fn validate_accepts_complete_signal() {
        assert!(sample_signal().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_identity_fields() {
        let mut s = sample_signal();
        s.profile.skin_type = String::new();
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("profile.skin_type"));

        let mut s = sample_signal();
        s.context.season = "  ".to_string();
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("context.season"));
    }

    #[test]
    fn brand_book_defaults_for_unknown_brand() {
        let book = BrandBook::default();
        let rule = book.rule_for("no-such-brand");
        assert_eq!(rule.constraints.title_max, 40);
        assert_eq!(rule.constraints.body_max, 350);
        assert!(rule.forbidden_words.is_empty());
        assert!(rule.required_phrases.is_empty());
    }

    #[test]
    fn product_deserializes_with_defaults() {
        let product: Product = serde_json::from_str(
            r#"{"product_id": "P001", "brand_id": "B01", "name": "수분 크림"}"#,
        )
        .unwrap();
        assert!(product.keywords.is_empty());
        assert!(product.target_personas.is_empty());
        assert!(product.usage.is_empty());
    }

    #[test]
    fn customers_load_list_or_single_object() {
        let dir = tempfile::tempdir().unwrap();

        let list_path = dir.path().join("customers.json");
        std::fs::write(
            &list_path,
            r#"[{"id": "C001",
                 "profile": {"age": 23, "skin_type": "건성", "concerns": ["수분"]},
                 "logs": {"recent_search": ["수분크림"]},
                 "context": {"weather": "건조", "season": "겨울"}}]"#,
        )
        .unwrap();
        let records = load_customers(&list_path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "C001");
        assert_eq!(records[0].signal.logs.recent_search, vec!["수분크림"]);

        let single_path = dir.path().join("customer.json");
        std::fs::write(
            &single_path,
            r#"{"id": "C002",
                "profile": {"age": 31, "skin_type": "지성"},
                "context": {"weather": "습함", "season": "여름"}}"#,
        )
        .unwrap();
        let records = load_customers(&single_path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "C002");
    }

    #[test]
    fn find_customer_reports_unknown_id() {
        let err = find_customer(&[], "C404").unwrap_err();
        assert!(err.to_string().contains("C404"));
    }
}

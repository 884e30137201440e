//! Codebook artifacts - consolidated codes and their higher-order groupings

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One consolidated code with its application guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodebookEntry {
    /// The code label, unique within a codebook
    pub code: String,

    /// Working definition of the code
    pub definition: String,

    /// When to apply the code
    #[serde(default)]
    pub include: Vec<String>,

    /// When not to apply the code
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Example passages the code applies to
    #[serde(default)]
    pub positive_examples: Vec<String>,

    /// Boundary cases that look similar but do not qualify
    #[serde(default)]
    pub near_miss: Vec<String>,

    /// Alternate labels the model merged into this code
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// The consolidated codebook produced from the open-coding stream.
///
/// Codes referenced by `second_order_themes` may be absent from
/// `entries`; consumers must tolerate dangling references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Codebook {
    /// Consolidated code entries
    #[serde(default)]
    pub entries: Vec<CodebookEntry>,

    /// Theme name → codes grouped under it
    #[serde(default)]
    pub second_order_themes: BTreeMap<String, Vec<String>>,

    /// Aggregate dimension name → themes grouped under it
    #[serde(default)]
    pub aggregate_dimensions: BTreeMap<String, Vec<String>>,
}

/// Gioia-style summary of the codebook's three analytic levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GioiaView {
    /// First-order concepts (the entry codes)
    pub first_order: Vec<String>,

    /// Second-order theme names
    pub second_order: Vec<String>,

    /// Aggregate dimension names
    pub aggregate_dimensions: Vec<String>,
}

impl From<&Codebook> for GioiaView {
    fn from(codebook: &Codebook) -> Self {
        Self {
            first_order: codebook.entries.iter().map(|e| e.code.clone()).collect(),
            second_order: codebook.second_order_themes.keys().cloned().collect(),
            aggregate_dimensions: codebook.aggregate_dimensions.keys().cloned().collect(),
        }
    }
}

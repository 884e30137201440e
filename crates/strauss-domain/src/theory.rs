//! Axial and selective coding artifacts

use serde::{Deserialize, Serialize};

/// A condition→action→result relationship linking codebook concepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxialTriple {
    /// The condition under which the action occurs
    pub condition: String,

    /// The action or strategy taken
    pub action: String,

    /// The observed result
    pub result: String,

    /// Segment ids supporting the triple
    #[serde(default)]
    pub evidence: Vec<String>,
}

/// The selective-coding synthesis: one theory per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theory {
    /// The core category the triples converge on
    pub core_category: String,

    /// Why this category is central
    #[serde(default)]
    pub rationale: Option<String>,

    /// Narrative storyline connecting the categories
    pub storyline: String,
}

/// A segment flagged as contradicting the theory's storyline.
///
/// Everything except the segment reference is optional; malformed
/// records are dropped during normalization rather than failing the
/// stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegativeCase {
    /// The contradicting segment
    pub seg_id: String,

    /// Kind of conflict the model identified
    #[serde(default)]
    pub conflict_type: Option<String>,

    /// Why the segment contradicts the storyline
    #[serde(default)]
    pub explanation: Option<String>,

    /// Boundary condition under which the theory still holds
    #[serde(default)]
    pub boundary_condition: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_requires_all_three_parts() {
        assert!(serde_json::from_str::<AxialTriple>(
            r#"{"condition":"c","action":"a","result":"r"}"#
        )
        .is_ok());
        assert!(serde_json::from_str::<AxialTriple>(r#"{"condition":"c","action":"a"}"#).is_err());
    }

    #[test]
    fn test_theory_requires_category_and_storyline() {
        assert!(serde_json::from_str::<Theory>(
            r#"{"core_category":"cc","storyline":"s"}"#
        )
        .is_ok());
        assert!(serde_json::from_str::<Theory>(r#"{"core_category":"cc"}"#).is_err());
    }

    #[test]
    fn test_negative_case_optional_fields() {
        let case: NegativeCase = serde_json::from_str(r#"{"seg_id":"0003"}"#).unwrap();
        assert!(case.conflict_type.is_none());
        assert!(case.boundary_condition.is_none());
    }
}

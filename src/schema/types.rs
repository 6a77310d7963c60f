use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which composite record a crawl builds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaType {
    /// Plain content extraction only
    #[default]
    None,
    PharmaProduct,
    ClinicalTrial,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::PharmaProduct => "pharma-product",
            Self::ClinicalTrial => "clinical-trial",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SchemaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "none" => Ok(Self::None),
            "pharma-product" | "pharma" => Ok(Self::PharmaProduct),
            "clinical-trial" | "trial" => Ok(Self::ClinicalTrial),
            other => Err(format!(
                "unknown schema type '{}' (expected none, pharma-product or clinical-trial)",
                other
            )),
        }
    }
}

/// A pharmaceutical product profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmaProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_class: Option<String>,
    pub indications: Vec<String>,
    pub side_effects: Vec<String>,
    pub dosage_forms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanism_of_action: Option<String>,
    pub clinical_trials: Vec<String>,
    pub patient_resources: Vec<String>,
    pub contraindications: Vec<String>,
    pub warnings: Vec<String>,
    pub interactions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_insert_url: Option<String>,
    pub source_urls: Vec<String>,
}

/// A clinical-trial summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalTrial {
    #[serde(rename = "nctId", skip_serializing_if = "Option::is_none")]
    pub nct_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<String>,
    pub conditions: Vec<String>,
    pub interventions: Vec<String>,
    pub eligibility_criteria: Vec<String>,
    pub source_urls: Vec<String>,
}

/// Schema findings from a single page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "schemaType", rename_all = "kebab-case")]
pub enum SchemaFragment {
    PharmaProduct(PharmaProduct),
    ClinicalTrial(ClinicalTrial),
}

impl SchemaFragment {
    pub fn schema_type(&self) -> SchemaType {
        match self {
            Self::PharmaProduct(_) => SchemaType::PharmaProduct,
            Self::ClinicalTrial(_) => SchemaType::ClinicalTrial,
        }
    }
}

/// All fragments of a crawl folded into one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeSchema {
    /// Number of fragments folded in
    pub fragment_count: usize,
    #[serde(flatten)]
    pub record: SchemaFragment,
}

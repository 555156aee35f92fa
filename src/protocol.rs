//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DivinationResult, Inputs, Section};
use crate::generators::astrology::Chart;
use crate::mbti::Question;
use crate::methods::{Family, InputField, MethodProfile, ReadingSource};
use crate::parser::Strategy;
use crate::repair::RepairState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOut {
    pub ok: bool,
    pub completion_enabled: bool,
    pub methods: usize,
}

/// DTO for the method catalogue.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodOut {
    pub id: String,
    pub name: String,
    pub description: String,
    pub family: Family,
    pub source: ReadingSource,
    pub fields: Vec<InputField>,
    pub sections: Vec<String>,
    pub timeout_secs: u64,
}

/// Convert a registry profile (internal) to the public DTO.
pub fn to_method_out(p: &MethodProfile) -> MethodOut {
    MethodOut {
        id: p.id.to_string(),
        name: p.name.to_string(),
        description: p.description.to_string(),
        family: p.family,
        source: p.source,
        fields: p.fields.to_vec(),
        sections: p.sections.iter().map(|s| s.to_string()).collect(),
        timeout_secs: p.timeout.as_secs(),
    }
}

#[derive(Debug, Deserialize)]
pub struct DivineIn {
    #[serde(alias = "methodId")]
    pub method: String,
    #[serde(default, alias = "inputData")]
    pub inputs: Inputs,
}

#[derive(Serialize)]
pub struct PromptOut {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct ParseIn {
    pub text: String,
    /// Use the method's markers (and chart normalization for astrology).
    #[serde(default, alias = "methodId")]
    pub method: Option<String>,
}

#[derive(Serialize)]
pub struct ParseOut {
    pub strategy: Option<Strategy>,
    pub sections: Vec<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<Chart>,
}

#[derive(Debug, Deserialize)]
pub struct AlmanacQuery {
    pub date: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummaryOut {
    pub id: String,
    pub method_id: String,
    pub created_at: DateTime<Utc>,
    pub sections: usize,
    pub repair: RepairState,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultOut {
    #[serde(flatten)]
    pub result: DivinationResult,
    pub repair: RepairState,
    /// At most ten sections, with a note when more were cut.
    pub display_sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceSectionsIn {
    pub sections: Vec<Section>,
}

#[derive(Serialize)]
pub struct ShareOut {
    pub text: String,
}

/// Questionnaire bank for clients that render the test.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBankOut {
    pub version: &'static str,
    pub answer_min: i8,
    pub answer_max: i8,
    pub questions: &'static [Question],
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: &'static str,
    pub message: String,
}

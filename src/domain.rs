//! Domain models: a divination result and its titled sections.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Method id stored on results that could not be read back at all.
pub const UNKNOWN_METHOD: &str = "unknown";

/// Free-form inputs keyed by field id (`birthDate`, `question`, ...).
pub type Inputs = BTreeMap<String, String>;

/// Non-blank, trimmed value of an input field.
pub fn input<'a>(inputs: &'a Inputs, key: &str) -> Option<&'a str> {
  inputs.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// A titled block of generated text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
  pub title: String,
  pub content: String,
  /// 0-100; older records used -1 for "no score".
  #[serde(default, deserialize_with = "score_from_any", skip_serializing_if = "Option::is_none")]
  pub score: Option<u8>,
}

impl Section {
  pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
    Self { title: title.into(), content: content.into(), score: None }
  }

  pub fn with_score(mut self, score: u8) -> Self {
    self.score = Some(score.min(100));
    self
  }

  /// Non-empty title and non-blank content.
  pub fn is_valid(&self) -> bool {
    !self.title.trim().is_empty() && !self.content.trim().is_empty()
  }
}

fn score_from_any<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<i64> = Option::deserialize(deserializer)?;
  Ok(raw.and_then(|v| u8::try_from(v).ok()).filter(|v| *v <= 100))
}

/// One reading, as produced by the assembler and persisted by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivinationResult {
  pub id: String,
  pub method_id: String,
  pub created_at: DateTime<Utc>,
  #[serde(default, alias = "inputData")]
  pub inputs: Inputs,
  #[serde(default, alias = "resultSections")]
  pub sections: Vec<Section>,
}

impl DivinationResult {
  pub fn new(method_id: &str, inputs: Inputs, sections: Vec<Section>) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      method_id: method_id.to_string(),
      created_at: Utc::now(),
      inputs,
      sections,
    }
  }

  /// At least one section with a title and non-blank content.
  pub fn has_valid_content(&self) -> bool {
    self.sections.iter().any(Section::is_valid)
  }

  /// The only sanctioned mutation: swap the section list, keep identity.
  pub fn replace_sections(&self, sections: Vec<Section>) -> Self {
    Self { sections, ..self.clone() }
  }

  pub fn section(&self, title: &str) -> Option<&Section> {
    self.sections.iter().find(|s| s.title == title)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn section_validity() {
    assert!(Section::new("总论", "内容").is_valid());
    assert!(!Section::new("总论", "  \n").is_valid());
    assert!(!Section::new(" ", "内容").is_valid());
  }

  #[test]
  fn legacy_field_names_and_scores() {
    let json = r#"{
      "id": "r1",
      "methodId": "bazi",
      "createdAt": "2024-03-15T08:00:00Z",
      "inputData": {"birthDate": "1990-01-01"},
      "resultSections": [
        {"title": "总论", "content": "A", "score": -1},
        {"title": "事业", "content": "B", "score": 88}
      ]
    }"#;
    let r: DivinationResult = serde_json::from_str(json).unwrap();
    assert_eq!(r.inputs.get("birthDate").map(String::as_str), Some("1990-01-01"));
    assert_eq!(r.sections[0].score, None);
    assert_eq!(r.sections[1].score, Some(88));
  }

  #[test]
  fn replace_sections_keeps_identity() {
    let r = DivinationResult::new("tarot", BTreeMap::new(), vec![Section::new("a", "b")]);
    let edited = r.replace_sections(vec![Section::new("c", "d")]);
    assert_eq!(edited.id, r.id);
    assert_eq!(edited.created_at, r.created_at);
    assert_eq!(edited.sections[0].title, "c");
  }
}

//! Repair for persisted results.
//!
//! Three states, decided once per load:
//! - `Valid`: at least one section with a title and non-blank content; returned as is.
//! - `EmptyOrBlank`: readable but contentless; sections are replaced with a
//!   recovery notice plus generic sections about the method, identity kept.
//! - `Unparseable`: bytes are not a result at all; a minimal "data corrupted"
//!   result is synthesized under the requested id with method `unknown`.
//!
//! Repairing a repaired result is a no-op, since every repair yields `Valid`.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{DivinationResult, Inputs, Section, UNKNOWN_METHOD};
use crate::methods::MethodRegistry;
use crate::seeds::{corrupt_notice, method_overview, recovery_notice, DISCLAIMER_TITLE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RepairState {
  Valid,
  EmptyOrBlank,
  Unparseable,
}

pub fn classify(result: &DivinationResult) -> RepairState {
  if result.has_valid_content() {
    RepairState::Valid
  } else {
    RepairState::EmptyOrBlank
  }
}

/// Fills a contentless result with recovery sections. Valid results pass through.
pub fn repair_result(result: DivinationResult, registry: &MethodRegistry) -> DivinationResult {
  if classify(&result) == RepairState::Valid {
    return result;
  }
  let (name, description) = match registry.lookup(&result.method_id) {
    Ok(p) => (p.name, p.description),
    Err(_) => ("占卜", "记录的占卜方式无法识别"),
  };
  warn!(target: "repair", id = %result.id, method = %result.method_id, "empty result; synthesizing recovery sections");
  let mut sections = vec![Section::new(DISCLAIMER_TITLE, recovery_notice(name))];
  sections.extend(method_overview(name, description).into_iter().map(|(t, c)| Section::new(t, c)));
  result.replace_sections(sections)
}

/// Result stored under `id` as raw bytes, whatever state they are in.
pub fn repair_bytes(id: &str, bytes: &[u8], registry: &MethodRegistry) -> (RepairState, DivinationResult) {
  match serde_json::from_slice::<DivinationResult>(bytes) {
    Ok(result) => {
      let state = classify(&result);
      (state, repair_result(result, registry))
    }
    Err(e) => {
      warn!(target: "repair", %id, bytes = bytes.len(), error = %e, "stored result unreadable");
      (RepairState::Unparseable, corrupt_result(id, &e.to_string()))
    }
  }
}

fn corrupt_result(id: &str, detail: &str) -> DivinationResult {
  let sections = vec![
    Section::new(DISCLAIMER_TITLE, corrupt_notice()),
    Section::new("错误详情", format!("读取失败：{detail}")),
    Section::new("建议", "请删除该记录后重新进行一次解读。"),
  ];
  info!(target: "repair", %id, "synthesized corrupt-data result");
  DivinationResult {
    id: id.to_string(),
    method_id: UNKNOWN_METHOD.to_string(),
    created_at: Utc::now(),
    inputs: Inputs::new(),
    sections,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stored(method: &str, sections: Vec<Section>) -> DivinationResult {
    let mut inputs = Inputs::new();
    inputs.insert("question".into(), "事业".into());
    DivinationResult::new(method, inputs, sections)
  }

  #[test]
  fn valid_result_is_untouched() {
    let reg = MethodRegistry::default();
    let r = stored("tarot", vec![Section::new("总论", "好")]);
    assert_eq!(repair_result(r.clone(), &reg), r);
  }

  #[test]
  fn empty_sections_get_recovery_content() {
    let reg = MethodRegistry::default();
    let r = stored("zhouyi", vec![]);
    let fixed = repair_result(r.clone(), &reg);
    assert!(fixed.sections.len() >= 2);
    assert_eq!(fixed.id, r.id);
    assert_eq!(fixed.method_id, "zhouyi");
    assert_eq!(fixed.inputs, r.inputs);
    assert_eq!(fixed.created_at, r.created_at);
    assert!(fixed.sections[0].content.contains("周易卦象"));
  }

  #[test]
  fn blank_sections_count_as_empty() {
    let reg = MethodRegistry::default();
    let r = stored("bazi", vec![Section::new("总论", "   "), Section::new("", "x")]);
    assert_eq!(classify(&r), RepairState::EmptyOrBlank);
    assert_eq!(classify(&repair_result(r, &reg)), RepairState::Valid);
  }

  #[test]
  fn garbage_bytes_become_a_corrupt_result() {
    let reg = MethodRegistry::default();
    let (state, r) = repair_bytes("abc", b"\x00\x01not json", &reg);
    assert_eq!(state, RepairState::Unparseable);
    assert_eq!(r.id, "abc");
    assert_eq!(r.method_id, UNKNOWN_METHOD);
    assert!(r.sections.len() >= 2);
  }

  #[test]
  fn repair_is_idempotent() {
    let reg = MethodRegistry::default();
    let (_, once) = repair_bytes("abc", b"{", &reg);
    let bytes = serde_json::to_vec(&once).unwrap();
    let (state, twice) = repair_bytes("abc", &bytes, &reg);
    assert_eq!(state, RepairState::Valid);
    assert_eq!(twice, once);

    let empty = stored("unknown-method", vec![]);
    let a = repair_result(empty, &reg);
    assert_eq!(repair_result(a.clone(), &reg), a);
  }
}

//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Running a reading and persisting it
//!   - Prompt preview and free-text parsing for external tools
//!   - The almanac day view
//!   - Result history: list, load (with repair), delete, replace sections, share

use chrono::NaiveDate;
use tracing::{error, info, instrument, warn};

use crate::assembler::assemble;
use crate::calendar::parse_date;
use crate::domain::{DivinationResult, Inputs, Section};
use crate::error::DivinationError;
use crate::generators::almanac::AlmanacDay;
use crate::methods::{build_prompt, MethodId};
use crate::protocol::{ParseOut, ResultOut, ResultSummaryOut};
use crate::render::{limit_sections, DISPLAY_LIMIT};
use crate::repair::{repair_bytes, RepairState};
use crate::state::AppState;

#[instrument(level = "info", skip(state, inputs), fields(%method, inputs = inputs.len()))]
pub async fn divine(state: &AppState, method: &str, inputs: Inputs) -> Result<DivinationResult, DivinationError> {
  let result = assemble(state.assembly(), method, inputs).await?;
  // the reading is still returned when it cannot be persisted
  if let Err(e) = state.store.save(&result).await {
    error!(target: "storage", id = %result.id, error = %e, "Failed to persist result");
  }
  Ok(result)
}

pub fn prompt_for(state: &AppState, method: &str, inputs: &Inputs) -> Result<String, DivinationError> {
  let profile = state.registry.lookup(method)?;
  Ok(build_prompt(profile, inputs, &state.config.prompts))
}

/// Generic cascade, or the method-tuned one when `method` is given.
#[instrument(level = "info", skip(state, text), fields(text_len = text.len(), ?method))]
pub fn parse_text(state: &AppState, text: &str, method: Option<&str>) -> Result<ParseOut, DivinationError> {
  let Some(method) = method else {
    let (strategy, sections) = state.parser.parse_traced(text);
    let strategy = (!sections.is_empty()).then_some(strategy);
    return Ok(ParseOut { strategy, sections, chart: None });
  };
  let profile = state.registry.lookup(method)?;
  if profile.id == MethodId::Astrology {
    let normalized = state.parser.chart().normalize(text);
    let chart = state.parser.chart().parse(&normalized);
    let sections = state.parser.parse_for_method(&normalized, profile.sections);
    return Ok(ParseOut { strategy: None, sections, chart: Some(chart) });
  }
  Ok(ParseOut { strategy: None, sections: state.parser.parse_for_method(text, profile.sections), chart: None })
}

/// Almanac facts for `date`, today when absent.
pub fn almanac_for(date: Option<&str>, today: NaiveDate) -> Result<AlmanacDay, DivinationError> {
  let day = match date.map(str::trim).filter(|d| !d.is_empty()) {
    Some(raw) => parse_date("date", raw)?,
    None => today,
  };
  Ok(AlmanacDay::for_date(day))
}

async fn load_repaired(state: &AppState, id: &str) -> Result<(RepairState, DivinationResult), DivinationError> {
  let bytes = state.store.load(id).await?.ok_or_else(|| DivinationError::NotFound { id: id.to_string() })?;
  let (repair, result) = repair_bytes(id, &bytes, &state.registry);
  if repair != RepairState::Valid {
    warn!(target: "repair", %id, ?repair, "Served a repaired result");
  }
  Ok((repair, result))
}

#[instrument(level = "info", skip(state))]
pub async fn load_result(state: &AppState, id: &str) -> Result<ResultOut, DivinationError> {
  let (repair, result) = load_repaired(state, id).await?;
  let display_sections = limit_sections(&result, DISPLAY_LIMIT);
  Ok(ResultOut { result, repair, display_sections })
}

#[instrument(level = "info", skip(state))]
pub async fn list_results(state: &AppState) -> Result<Vec<ResultSummaryOut>, DivinationError> {
  let ids = state.store.list_ids().await?;
  let mut out = Vec::with_capacity(ids.len());
  for id in ids {
    match load_repaired(state, &id).await {
      Ok((repair, r)) => out.push(ResultSummaryOut {
        id: r.id,
        method_id: r.method_id,
        created_at: r.created_at,
        sections: r.sections.len(),
        repair,
      }),
      // listed in the index but gone from disk
      Err(DivinationError::NotFound { .. }) => warn!(target: "storage", %id, "Indexed result missing"),
      Err(e) => return Err(e),
    }
  }
  info!(target: "divination", count = out.len(), "Listed results");
  Ok(out)
}

#[instrument(level = "info", skip(state))]
pub async fn delete_result(state: &AppState, id: &str) -> Result<(), DivinationError> {
  if state.store.delete(id).await? {
    Ok(())
  } else {
    Err(DivinationError::NotFound { id: id.to_string() })
  }
}

/// Swaps in user-edited sections, keeping id, method, time and inputs.
#[instrument(level = "info", skip(state, sections), fields(sections = sections.len()))]
pub async fn replace_sections(state: &AppState, id: &str, sections: Vec<Section>) -> Result<DivinationResult, DivinationError> {
  let sections: Vec<Section> = sections.into_iter().filter(Section::is_valid).collect();
  if sections.is_empty() {
    return Err(DivinationError::invalid_input("sections", ""));
  }
  let (_, current) = load_repaired(state, id).await?;
  let updated = current.replace_sections(sections);
  state.store.save(&updated).await?;
  Ok(updated)
}

pub async fn share_text(state: &AppState, id: &str) -> Result<String, DivinationError> {
  let (_, result) = load_repaired(state, id).await?;
  Ok(state.share.share_text(&result, &state.registry))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn inputs(pairs: &[(&str, &str)]) -> Inputs {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  #[tokio::test]
  async fn divine_persists_and_history_round_trips() {
    let state = AppState::local().unwrap();
    let r = divine(&state, "dream", inputs(&[("dreamContent", "梦见蛇")])).await.unwrap();
    let listed = list_results(&state).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, r.id);
    let loaded = load_result(&state, &r.id).await.unwrap();
    assert_eq!(loaded.result, r);
    assert_eq!(loaded.repair, RepairState::Valid);
    delete_result(&state, &r.id).await.unwrap();
    assert!(matches!(load_result(&state, &r.id).await, Err(DivinationError::NotFound { .. })));
  }

  #[tokio::test]
  async fn replace_sections_keeps_identity() {
    let state = AppState::local().unwrap();
    let r = divine(&state, "tarot", inputs(&[("question", "感情")])).await.unwrap();
    let updated = replace_sections(&state, &r.id, vec![Section::new("修订", "新内容"), Section::new("空", "")]).await.unwrap();
    assert_eq!(updated.id, r.id);
    assert_eq!(updated.sections, vec![Section::new("修订", "新内容")]);
    assert!(replace_sections(&state, &r.id, vec![]).await.is_err());
  }

  #[test]
  fn almanac_defaults_to_today() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    assert_eq!(almanac_for(None, today).unwrap(), AlmanacDay::for_date(today));
    assert!(almanac_for(Some("2024-13-40"), today).is_err());
  }

  #[test]
  fn parse_with_astrology_extracts_chart() {
    let state = AppState::local().unwrap();
    let out = parse_text(&state, "【星盘描述】\n太阳在白羊座，15度\n\n【建议】稳", Some("astrology")).unwrap();
    let chart = out.chart.unwrap();
    assert_eq!(chart.positions.len(), 1);
    assert_eq!(chart.positions[0].sign, "白羊");
    assert_eq!(out.sections.len(), 2);
  }
}

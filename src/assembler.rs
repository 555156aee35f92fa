//! Builds a complete reading for one request.
//!
//! The external completion is tried first. Its outcome is an explicit
//! `Result<String, DivinationError>`; any failure, timeout, blank reply or
//! unparseable reply switches to the method's local generator and puts a
//! disclaimer section in front. Traditional methods also get a poem section.
//! Final section order: disclaimer, poem, content. Locally computed methods
//! skip the completion and carry neither.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::completion::Completion;
use crate::config::PromptConfig;
use crate::domain::{DivinationResult, Inputs, Section};
use crate::error::DivinationError;
use crate::generators::{almanac, generate_or_static, poem};
use crate::methods::{build_prompt, validate_inputs, MethodId, MethodProfile, MethodRegistry};
use crate::parser::keywords::extract_keywords;
use crate::parser::SectionParser;
use crate::rng::GenerationSeed;
use crate::seeds::{simulation_notice, DISCLAIMER_TITLE};

pub const POEM_TITLE: &str = "灵签诗";

const POEM_KEYWORDS: usize = 2;

/// Almanac section that carries the day score.
const ALMANAC_SUMMARY: &str = "总结";

/// Borrowed view of what one assembly needs.
#[derive(Clone, Copy)]
pub struct AssemblyContext<'a> {
  pub registry: &'a MethodRegistry,
  pub parser: &'a SectionParser,
  pub completion: Option<&'a dyn Completion>,
  pub prompts: &'a PromptConfig,
  pub today: NaiveDate,
}

/// Runs `completion` under `limit`. A late reply is dropped with the future.
pub async fn complete_within(
  completion: &dyn Completion,
  method: MethodId,
  prompt: &str,
  limit: Duration,
) -> Result<String, DivinationError> {
  match tokio::time::timeout(limit, completion.complete(prompt)).await {
    Ok(outcome) => outcome,
    Err(_) => Err(DivinationError::Timeout { method: method.to_string(), timeout_ms: limit.as_millis() as u64 }),
  }
}

/// Full pipeline for a method id and raw inputs.
#[instrument(level = "info", skip(ctx, inputs), fields(method = %method, inputs = inputs.len()))]
pub async fn assemble(ctx: AssemblyContext<'_>, method: &str, inputs: Inputs) -> Result<DivinationResult, DivinationError> {
  let profile = ctx.registry.lookup(method)?;
  validate_inputs(profile, &inputs)?;

  if profile.is_local() {
    let seed = profile.seed_for(&inputs, ctx.today)?;
    let sections = simulate(ctx.parser, profile, seed, &inputs);
    let result = DivinationResult::new(profile.id.as_str(), inputs, sections);
    info!(target: "divination", id = %result.id, sections = result.sections.len(), "local reading computed");
    return Ok(result);
  }

  let start = Instant::now();
  let external = match ctx.completion {
    Some(completion) => {
      let prompt = build_prompt(profile, &inputs, ctx.prompts);
      complete_within(completion, profile.id, &prompt, profile.timeout).await
    }
    None => Err(DivinationError::external("未配置外部服务")),
  };
  if let Err(e) = &external {
    warn!(target: "divination", method = %profile.id, error = %e, elapsed = ?start.elapsed(), "external completion unavailable");
  }

  let sections = assemble_sections(ctx.parser, profile, &inputs, ctx.today, external)?;
  let result = DivinationResult::new(profile.id.as_str(), inputs, sections);
  info!(target: "divination", id = %result.id, sections = result.sections.len(), "reading assembled");
  Ok(result)
}

/// Turns an external outcome into the final section list. Never returns an
/// empty list; the only error is a seed that cannot be derived from `inputs`.
pub fn assemble_sections(
  parser: &SectionParser,
  profile: &MethodProfile,
  inputs: &Inputs,
  today: NaiveDate,
  external: Result<String, DivinationError>,
) -> Result<Vec<Section>, DivinationError> {
  let parsed = external.and_then(|text| parse_external(parser, profile, &text));
  let (disclaimer, content) = match parsed {
    Ok(sections) => (None, sections),
    Err(reason) => {
      let seed = profile.seed_for(inputs, today)?;
      let notice = Section::new(DISCLAIMER_TITLE, simulation_notice(&reason.to_string()));
      (Some(notice), simulate(parser, profile, seed, inputs))
    }
  };

  let mut out = Vec::with_capacity(content.len() + 2);
  out.extend(disclaimer);
  if profile.is_traditional() {
    out.push(poem_section(profile, &content, today));
  }
  out.extend(content);
  Ok(out)
}

fn parse_external(parser: &SectionParser, profile: &MethodProfile, text: &str) -> Result<Vec<Section>, DivinationError> {
  if text.trim().is_empty() {
    return Err(DivinationError::external("外部服务返回空内容"));
  }
  let text = if profile.id == MethodId::Astrology { parser.chart().normalize(text) } else { text.to_string() };
  let sections: Vec<Section> =
    parser.parse_for_method(&text, profile.sections).into_iter().filter(Section::is_valid).collect();
  if sections.is_empty() {
    return Err(DivinationError::ParseProducedNothing);
  }
  Ok(sections)
}

fn simulate(parser: &SectionParser, profile: &MethodProfile, seed: GenerationSeed, inputs: &Inputs) -> Vec<Section> {
  let text = generate_or_static(profile.generator, seed, inputs);
  let sections: Vec<Section> =
    parser.parse_for_method(&text, profile.sections).into_iter().filter(Section::is_valid).collect();
  if sections.is_empty() {
    // generator text without any title
    return vec![Section::new(profile.name, text)];
  }
  if profile.id == MethodId::Almanac {
    if let Ok(day) = almanac::day_for(seed, inputs) {
      return sections
        .into_iter()
        .map(|s| if s.title == ALMANAC_SUMMARY { s.with_score(day.score) } else { s })
        .collect();
    }
  }
  sections
}

fn poem_section(profile: &MethodProfile, content: &[Section], today: NaiveDate) -> Section {
  let keywords = extract_keywords(content, POEM_KEYWORDS);
  let theme = if keywords.is_empty() { profile.name.to_string() } else { keywords.join("·") };
  let seed = GenerationSeed::from_text(profile.id.as_str(), &theme, today);
  Section::new(POEM_TITLE, poem::compose(seed, &theme))
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;

  struct Scripted(Result<String, DivinationError>);

  #[async_trait]
  impl Completion for Scripted {
    async fn complete(&self, _prompt: &str) -> Result<String, DivinationError> {
      self.0.clone()
    }
  }

  struct Slow;

  #[async_trait]
  impl Completion for Slow {
    async fn complete(&self, _prompt: &str) -> Result<String, DivinationError> {
      tokio::time::sleep(Duration::from_secs(5)).await;
      Ok("【总论】迟到的回复".into())
    }
  }

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
  }

  fn inputs(pairs: &[(&str, &str)]) -> Inputs {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  fn titles(sections: &[Section]) -> Vec<&str> {
    sections.iter().map(|s| s.title.as_str()).collect()
  }

  #[tokio::test]
  async fn external_text_is_parsed_without_disclaimer() {
    let registry = MethodRegistry::default();
    let parser = SectionParser::new().unwrap();
    let prompts = PromptConfig::default();
    let completion = Scripted(Ok("【牌阵】愚者\n\n【建议】勇敢前行".into()));
    let ctx = AssemblyContext { registry: &registry, parser: &parser, completion: Some(&completion), prompts: &prompts, today: today() };
    let r = assemble(ctx, "tarot", inputs(&[("question", "工作")])).await.unwrap();
    assert_eq!(titles(&r.sections), vec!["牌阵", "建议"]);
    assert_eq!(r.method_id, "tarot");
  }

  #[tokio::test]
  async fn traditional_methods_get_a_poem_after_the_disclaimer() {
    let registry = MethodRegistry::default();
    let parser = SectionParser::new().unwrap();
    let prompts = PromptConfig::default();
    let ctx = AssemblyContext { registry: &registry, parser: &parser, completion: None, prompts: &prompts, today: today() };
    let r = assemble(ctx, "almanac", inputs(&[("date", "2024-03-15")])).await.unwrap();
    assert_eq!(r.sections[0].title, DISCLAIMER_TITLE);
    assert_eq!(r.sections[1].title, POEM_TITLE);
    assert!(r.sections.len() > 3);
    assert!(r.has_valid_content());
    let summary = r.section("总结").unwrap();
    assert!(summary.score.is_some_and(|s| (30..=100).contains(&s)));
  }

  #[tokio::test]
  async fn failed_call_falls_back_once() {
    let registry = MethodRegistry::default();
    let parser = SectionParser::new().unwrap();
    let prompts = PromptConfig::default();
    let completion = Scripted(Err(DivinationError::external("HTTP 401: Invalid API key")));
    let ctx = AssemblyContext { registry: &registry, parser: &parser, completion: Some(&completion), prompts: &prompts, today: today() };
    let r = assemble(ctx, "numerology", inputs(&[("fullName", "Ada"), ("birthDate", "1990-05-20")])).await.unwrap();
    let disclaimers = r.sections.iter().filter(|s| s.title == DISCLAIMER_TITLE).count();
    assert_eq!(disclaimers, 1);
    assert!(r.sections[0].content.contains("Invalid API key"));
    assert!(r.section(POEM_TITLE).is_none());
  }

  #[tokio::test]
  async fn blank_reply_is_treated_as_failure() {
    let registry = MethodRegistry::default();
    let parser = SectionParser::new().unwrap();
    let prompts = PromptConfig::default();
    let completion = Scripted(Ok("   \n".into()));
    let ctx = AssemblyContext { registry: &registry, parser: &parser, completion: Some(&completion), prompts: &prompts, today: today() };
    let r = assemble(ctx, "dream", inputs(&[("dreamContent", "梦见大海")])).await.unwrap();
    assert_eq!(r.sections[0].title, DISCLAIMER_TITLE);
  }

  #[tokio::test]
  async fn timeout_is_reported_as_such() {
    let err = complete_within(&Slow, MethodId::Tarot, "p", Duration::from_millis(20)).await.unwrap_err();
    assert_eq!(err, DivinationError::Timeout { method: "tarot".into(), timeout_ms: 20 });
  }

  #[test]
  fn timeout_outcome_yields_one_simulated_reading() {
    let registry = MethodRegistry::default();
    let parser = SectionParser::new().unwrap();
    let profile = registry.get(MethodId::Dream);
    let i = inputs(&[("dreamContent", "梦见飞翔")]);
    let outcome = Err(DivinationError::Timeout { method: "dream".into(), timeout_ms: 80_000 });
    let sections = assemble_sections(&parser, profile, &i, today(), outcome).unwrap();
    assert_eq!(sections.iter().filter(|s| s.title == DISCLAIMER_TITLE).count(), 1);
    assert!(sections[0].content.contains("80000ms"));
    assert_eq!(sections[1].title, POEM_TITLE);
  }

  #[test]
  fn astrology_reply_is_normalized_before_parsing() {
    let registry = MethodRegistry::default();
    let parser = SectionParser::new().unwrap();
    let profile = registry.get(MethodId::Astrology);
    let reply = "【星盘描述】\n太阳在白羊座，15度\n太阳与木星构成三分相，约120度\n\n【建议】顺势而为";
    let sections = assemble_sections(&parser, profile, &Inputs::new(), today(), Ok(reply.into())).unwrap();
    assert_eq!(sections[0].content, "太阳位于白羊座15度\n太阳和木星形成三分相(120度)");
  }

  struct Counting(std::sync::atomic::AtomicUsize);

  #[async_trait]
  impl Completion for Counting {
    async fn complete(&self, _prompt: &str) -> Result<String, DivinationError> {
      self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
      Ok("【总论】外部回复".into())
    }
  }

  #[tokio::test]
  async fn questionnaire_is_scored_locally_without_disclaimer() {
    let registry = MethodRegistry::default();
    let parser = SectionParser::new().unwrap();
    let prompts = PromptConfig::default();
    let completion = Counting(Default::default());
    let ctx = AssemblyContext { registry: &registry, parser: &parser, completion: Some(&completion), prompts: &prompts, today: today() };
    let answers = vec!["-3"; 60].join(",");
    let r = assemble(ctx, "mbti", inputs(&[("answers", answers.as_str())])).await.unwrap();
    assert_eq!(completion.0.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(titles(&r.sections), crate::mbti::PROFILE_SECTIONS);
    // agreeing statements outnumber the reversed ones by one per dimension
    assert!(r.sections[0].content.starts_with("ISTJ · 物流师"));
    assert!(r.section(DISCLAIMER_TITLE).is_none());
    assert!(r.section(POEM_TITLE).is_none());

    let err = assemble(ctx, "mbti", inputs(&[("answers", "1,2,3")])).await.unwrap_err();
    assert_eq!(err, DivinationError::invalid_input("answers", "1,2,3"));
  }

  #[tokio::test]
  async fn invalid_and_unknown_requests_propagate() {
    let registry = MethodRegistry::default();
    let parser = SectionParser::new().unwrap();
    let prompts = PromptConfig::default();
    let ctx = AssemblyContext { registry: &registry, parser: &parser, completion: None, prompts: &prompts, today: today() };
    let err = assemble(ctx, "almanac", inputs(&[("date", "yesterday")])).await.unwrap_err();
    assert_eq!(err, DivinationError::invalid_input("date", "yesterday"));
    let err = assemble(ctx, "ouija", Inputs::new()).await.unwrap_err();
    assert!(matches!(err, DivinationError::UnknownMethod { .. }));
  }
}

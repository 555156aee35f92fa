//! Plain-text presentation of results: share text and display limiting.

use regex::Regex;

use crate::domain::{DivinationResult, Section};
use crate::error::DivinationError;
use crate::methods::MethodRegistry;

pub const DISPLAY_LIMIT: usize = 10;
pub const TRUNCATED_TITLE: &str = "注意";
const TRUNCATED_NOTE: &str = "内容过长，已省略部分内容";
const ATTRIBUTION: &str = "来自智能占卜服务";

/// First `limit` sections; when anything was cut, a note section is appended.
pub fn limit_sections(result: &DivinationResult, limit: usize) -> Vec<Section> {
  if result.sections.len() <= limit {
    return result.sections.clone();
  }
  let mut out: Vec<Section> = result.sections.iter().take(limit).cloned().collect();
  out.push(Section::new(TRUNCATED_TITLE, TRUNCATED_NOTE));
  out
}

/// Rewrites markdown decoration into plain symbols for chat apps.
#[derive(Clone, Debug)]
pub struct ShareFormatter {
  heading: Regex,
  rule: Regex,
  numbered: Regex,
  bullet: Regex,
  bold: Regex,
  italic: Regex,
  blank_runs: Regex,
}

fn compile(pattern: &str) -> Result<Regex, DivinationError> {
  Regex::new(pattern).map_err(|e| DivinationError::Config { message: format!("bad share pattern: {e}") })
}

impl ShareFormatter {
  pub fn new() -> Result<Self, DivinationError> {
    Ok(Self {
      heading: compile(r"(?m)^[ \t]*#{1,6}[ \t]+(.+?)[ \t]*$")?,
      rule: compile(r"(?m)^[ \t]*-{3,}[ \t]*$")?,
      numbered: compile(r"(?m)^[ \t]*(\d+)\.[ \t]+(.+)$")?,
      bullet: compile(r"(?m)^[ \t]*[-*][ \t]+(.+)$")?,
      bold: compile(r"\*\*(.+?)\*\*")?,
      italic: compile(r"\*([^*\n]+?)\*")?,
      blank_runs: compile(r"\n{3,}")?,
    })
  }

  pub fn format_content(&self, content: &str) -> String {
    let s = self.heading.replace_all(content, "◆ $1");
    let s = self.rule.replace_all(&s, "---------------------");
    let s = self.numbered.replace_all(&s, "  $1. $2");
    let s = self.bullet.replace_all(&s, "  • $1");
    let s = self.bold.replace_all(&s, "★$1★");
    let s = self.italic.replace_all(&s, "『$1』");
    self.blank_runs.replace_all(&s, "\n\n").trim().to_string()
  }

  /// `【<method>结果分享】`, then `▶ title` and formatted content per section.
  pub fn share_text(&self, result: &DivinationResult, registry: &MethodRegistry) -> String {
    let name = registry.lookup(&result.method_id).map_or("占卜", |p| p.name);
    let mut out = format!("【{name}结果分享】\n\n");
    for section in result.sections.iter().filter(|s| s.is_valid()) {
      out.push_str(&format!("▶ {}\n{}\n\n", section.title, self.format_content(&section.content)));
    }
    out.push_str(ATTRIBUTION);
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Inputs;

  fn result_with(n: usize) -> DivinationResult {
    let sections = (0..n).map(|i| Section::new(format!("第{i}部分"), "内容")).collect();
    DivinationResult::new("tarot", Inputs::new(), sections)
  }

  #[test]
  fn short_results_are_not_limited() {
    let r = result_with(10);
    assert_eq!(limit_sections(&r, DISPLAY_LIMIT), r.sections);
  }

  #[test]
  fn long_results_get_a_truncation_note() {
    let r = result_with(14);
    let shown = limit_sections(&r, DISPLAY_LIMIT);
    assert_eq!(shown.len(), 11);
    assert_eq!(shown[10].title, TRUNCATED_TITLE);
  }

  #[test]
  fn markdown_becomes_plain_symbols() {
    let f = ShareFormatter::new().unwrap();
    let out = f.format_content("## 卦象\n**乾卦**象征*刚健*\n---\n1. 守正\n- 勿躁\n\n\n\n结束");
    assert_eq!(out, "◆ 卦象\n★乾卦★象征『刚健』\n---------------------\n  1. 守正\n  • 勿躁\n\n结束");
  }

  #[test]
  fn share_text_layout() {
    let f = ShareFormatter::new().unwrap();
    let reg = MethodRegistry::default();
    let r = DivinationResult::new("tarot", Inputs::new(), vec![Section::new("牌阵", "愚者"), Section::new("空", " ")]);
    let text = f.share_text(&r, &reg);
    assert!(text.starts_with("【塔罗牌结果分享】\n\n▶ 牌阵\n愚者\n\n"));
    assert!(!text.contains("▶ 空"));
    assert!(text.ends_with(ATTRIBUTION));
  }
}

//! Turns free text into an ordered list of titled sections.
//!
//! Strategies are tried in order and the first that yields anything wins:
//! bracketed titles, colon titles, blank-line paragraphs, then the whole text
//! as one section. For non-blank input the result is never empty.

pub mod chart;
pub mod keywords;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::domain::Section;
use crate::error::DivinationError;
use crate::util::char_len;

pub use chart::ChartGrammar;

pub const OVERVIEW: &str = "总论";
pub const DETAIL: &str = "详细解读";
pub const ADVICE: &str = "建议";
pub const DEFAULT_TITLE: &str = "分析结果";

const TITLE_MAX: usize = 12;
const SHORT_LINE: usize = 20;
const RESUBDIVIDE_OVER: usize = 600;

const SENTENCE_PUNCT: &[char] = &['。', '，', '！', '？', '；', '、', ',', '.', '!', '?', ';'];
const SENTENCE_END: &[char] = &['。', '！', '？', '.', '!', '?', '…'];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
  Bracket,
  Marker,
  Colon,
  Paragraph,
  Degenerate,
}

/// Compiled patterns, built once per process and shared through the app state.
#[derive(Clone, Debug)]
pub struct SectionParser {
  bracket_full: Regex,
  bracket_ascii: Regex,
  colon_line: Regex,
  blank_run: Regex,
  heading: Regex,
  chart: ChartGrammar,
}

fn compile(pattern: &str) -> Result<Regex, DivinationError> {
  Regex::new(pattern).map_err(|e| DivinationError::Config { message: format!("bad pattern {pattern:?}: {e}") })
}

impl SectionParser {
  pub fn new() -> Result<Self, DivinationError> {
    Ok(Self {
      bracket_full: compile(r"【([^【】\n]*)】")?,
      bracket_ascii: compile(r"(?m)^[ \t]*\[([^\[\]\n]*)\]")?,
      colon_line: compile(r"^\s*([^:：\n]{1,24})[:：]\s*(.*)$")?,
      blank_run: compile(r"\r?\n(?:[ \t]*\r?\n)+")?,
      heading: compile(r"^\s*(#{1,6}\s*|\*\*)?\s*(.+?)\s*(?:\*\*)?\s*[:：]?\s*$")?,
      chart: ChartGrammar::new()?,
    })
  }

  pub fn chart(&self) -> &ChartGrammar {
    &self.chart
  }

  /// Generic cascade.
  pub fn parse(&self, text: &str) -> Vec<Section> {
    self.parse_traced(text).1
  }

  /// Generic cascade, also reporting which strategy produced the sections.
  pub fn parse_traced(&self, text: &str) -> (Strategy, Vec<Section>) {
    let text = text.trim();
    if text.is_empty() {
      return (Strategy::Degenerate, Vec::new());
    }
    let attempts: [(Strategy, fn(&Self, &str) -> Vec<Section>); 4] = [
      (Strategy::Bracket, Self::bracket_sections),
      (Strategy::Colon, Self::colon_sections),
      (Strategy::Paragraph, Self::paragraph_sections),
      (Strategy::Degenerate, |_, t| degenerate(t)),
    ];
    for (strategy, run) in attempts {
      let sections = run(self, text);
      if !sections.is_empty() {
        debug!(target: "parser", ?strategy, sections = sections.len(), chars = char_len(text), "parsed");
        return (strategy, sections);
      }
    }
    (Strategy::Degenerate, degenerate(text))
  }

  /// Method-tuned variant: bracket titles, then headings that use the
  /// method's markers, then the generic cascade. A single over-long section is
  /// split once more by colon titles or paragraphs, keeping its own title.
  pub fn parse_for_method(&self, text: &str, markers: &[&str]) -> Vec<Section> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
      return Vec::new();
    }
    let mut sections = self.bracket_sections(trimmed);
    if sections.is_empty() {
      sections = self.marker_sections(trimmed, markers);
      if !sections.is_empty() {
        debug!(target: "parser", strategy = ?Strategy::Marker, sections = sections.len(), "parsed");
      }
    }
    if sections.is_empty() {
      sections = self.parse(trimmed);
    }
    self.resubdivide(sections)
  }

  fn resubdivide(&self, sections: Vec<Section>) -> Vec<Section> {
    if sections.len() != 1 || char_len(&sections[0].content) <= RESUBDIVIDE_OVER {
      return sections;
    }
    let parent = &sections[0];
    let mut sub = self.colon_sections(&parent.content);
    if sub.len() < 2 {
      sub = self.paragraph_sections(&parent.content);
    }
    if sub.len() < 2 {
      return sections;
    }
    debug!(target: "parser", parts = sub.len(), "split over-long section");
    let first = &mut sub[0];
    if matches!(first.title.as_str(), OVERVIEW | DETAIL | ADVICE) {
      first.title = parent.title.clone();
    } else if first.title != parent.title {
      first.title = format!("{}·{}", parent.title, first.title);
    }
    sub
  }

  fn bracket_sections(&self, text: &str) -> Vec<Section> {
    let mut marks: Vec<(usize, usize, &str)> = self
      .bracket_full
      .captures_iter(text)
      .filter_map(|c| Some((c.get(0)?.start(), c.get(0)?.end(), c.get(1)?.as_str())))
      .collect();
    marks.extend(
      self
        .bracket_ascii
        .captures_iter(text)
        .filter_map(|c| Some((c.get(0)?.start(), c.get(0)?.end(), c.get(1)?.as_str())))
        // markdown links are not titles
        .filter(|(_, end, _)| !text[*end..].starts_with('(')),
    );
    if marks.is_empty() {
      return Vec::new();
    }
    marks.sort_by_key(|m| m.0);
    // `[【x】]` matches both patterns; keep the outer one
    let mut covered = 0;
    marks.retain(|m| {
      let keep = m.0 >= covered;
      if keep {
        covered = m.1;
      }
      keep
    });

    let mut out = Vec::new();
    for (i, (_, end, raw_title)) in marks.iter().enumerate() {
      let next = marks.get(i + 1).map_or(text.len(), |m| m.0);
      let body = bracket_body(&text[*end..next]);
      let title = raw_title.trim_matches(|c: char| c.is_whitespace() || matches!(c, '【' | '】' | '[' | ']'));
      if !title.is_empty() && !body.is_empty() {
        out.push(Section::new(title, body));
      }
    }
    if !out.is_empty() {
      let preamble = text[..marks[0].0].trim();
      if !preamble.is_empty() {
        out.insert(0, Section::new(OVERVIEW, preamble));
      }
    }
    out
  }

  fn colon_title<'a>(&self, line: &'a str) -> Option<(String, &'a str)> {
    let caps = self.colon_line.captures(line)?;
    let title = clean_title(caps.get(1)?.as_str());
    let rest = caps.get(2).map_or("", |m| m.as_str().trim());
    if title.is_empty() || char_len(&title) > TITLE_MAX || title.contains(SENTENCE_PUNCT) {
      return None;
    }
    if looks_like_url(&title, rest) || title.chars().all(|c| c.is_ascii_digit()) {
      return None;
    }
    Some((title, rest))
  }

  fn colon_sections(&self, text: &str) -> Vec<Section> {
    let mut blocks = TitledBlocks::default();
    for line in text.lines() {
      match self.colon_title(line) {
        Some((title, rest)) => blocks.start(title, line, rest),
        None => blocks.push_line(line),
      }
    }
    blocks.finish()
  }

  fn marker_heading(&self, line: &str, markers: &[&str]) -> Option<String> {
    let caps = self.heading.captures(line)?;
    let decorated = caps.get(1).is_some();
    let title = clean_title(caps.get(2)?.as_str());
    if title.is_empty()
      || char_len(&title) > TITLE_MAX
      || title.contains(SENTENCE_PUNCT)
      || title.contains([':', '：'])
    {
      return None;
    }
    // undecorated lines must be a marker and nothing else
    let marked = markers.iter().any(|m| title == *m);
    (decorated || marked).then_some(title)
  }

  fn marker_sections(&self, text: &str, markers: &[&str]) -> Vec<Section> {
    let mut blocks = TitledBlocks::default();
    for line in text.lines() {
      match self.marker_heading(line, markers) {
        Some(title) => blocks.start(title, line, ""),
        None => blocks.push_line(line),
      }
    }
    blocks.finish()
  }

  fn paragraph_sections(&self, text: &str) -> Vec<Section> {
    let paras: Vec<&str> = self.blank_run.split(text.trim()).map(str::trim).filter(|p| !p.is_empty()).collect();
    if paras.len() < 2 {
      return Vec::new();
    }
    let n = paras.len();
    // (section, labelled by position)
    let mut out: Vec<(Section, bool)> = Vec::new();
    let mut pending_title: Option<String> = None;

    for (i, para) in paras.iter().enumerate() {
      if let Some(title) = pending_title.take() {
        out.push((Section::new(title, *para), false));
        continue;
      }
      let (first, rest) = match para.split_once('\n') {
        Some((f, r)) => (f.trim(), r.trim()),
        None => (para.trim(), ""),
      };
      let heading_like = char_len(first) < SHORT_LINE && !first.ends_with(SENTENCE_END) && !clean_title(first).is_empty();
      if heading_like && !rest.is_empty() {
        out.push((Section::new(clean_title(first), rest), false));
        continue;
      }
      if heading_like && i + 1 < n {
        pending_title = Some(clean_title(first));
        continue;
      }
      let label = positional_label(i, n);
      match out.last_mut() {
        Some((last, true)) if last.title == label => {
          last.content.push_str("\n\n");
          last.content.push_str(para);
        }
        _ => out.push((Section::new(label, *para), true)),
      }
    }
    out.into_iter().map(|(s, _)| s).collect()
  }
}

/// Accumulates `title -> body lines`; text before the first title becomes the overview.
#[derive(Default)]
struct TitledBlocks {
  preamble: Vec<String>,
  current: Option<OpenBlock>,
  done: Vec<Section>,
}

struct OpenBlock {
  title: String,
  /// The heading line as written.
  heading: String,
  body: Vec<String>,
}

impl TitledBlocks {
  fn start(&mut self, title: String, heading: &str, first_line: &str) {
    self.flush();
    let body = if first_line.is_empty() { Vec::new() } else { vec![first_line.to_string()] };
    self.current = Some(OpenBlock { title, heading: heading.trim().to_string(), body });
  }

  fn push_line(&mut self, line: &str) {
    match self.current.as_mut() {
      Some(block) => block.body.push(line.to_string()),
      None => self.preamble.push(line.to_string()),
    }
  }

  /// A heading with nothing under it stays in the text it interrupted.
  fn flush(&mut self) {
    let Some(block) = self.current.take() else {
      return;
    };
    let content = block.body.join("\n").trim().to_string();
    if !content.is_empty() {
      self.done.push(Section::new(block.title, content));
      return;
    }
    match self.done.last_mut() {
      Some(last) => {
        last.content.push('\n');
        last.content.push_str(&block.heading);
      }
      None => self.preamble.push(block.heading),
    }
  }

  fn finish(mut self) -> Vec<Section> {
    self.flush();
    let preamble = self.preamble.join("\n").trim().to_string();
    if !self.done.is_empty() && !preamble.is_empty() {
      self.done.insert(0, Section::new(OVERVIEW, preamble));
    }
    self.done
  }
}

fn positional_label(index: usize, total: usize) -> &'static str {
  match index * 3 / total.max(1) {
    0 => OVERVIEW,
    1 => DETAIL,
    _ => ADVICE,
  }
}

/// Whole text as one section.
fn degenerate(text: &str) -> Vec<Section> {
  let t = text.trim();
  if t.is_empty() {
    return Vec::new();
  }
  let first = t.lines().next().unwrap_or("").trim();
  let candidate = clean_title(first);
  let title = if !candidate.is_empty() && char_len(first) <= SHORT_LINE { candidate } else { DEFAULT_TITLE.to_string() };
  vec![Section::new(title, t)]
}

/// Body of a bracketed section. Blank lines after the title are dropped; the
/// first content line keeps its indentation.
fn bracket_body(raw: &str) -> &str {
  let raw = raw.trim_end();
  let mut rest = raw;
  let mut skipped = false;
  while let Some((line, tail)) = rest.split_once('\n') {
    if !line.trim().is_empty() {
      break;
    }
    rest = tail;
    skipped = true;
  }
  if skipped {
    rest
  } else {
    rest.trim_start()
  }
}

/// Strips markdown decoration, brackets and a trailing colon.
pub fn clean_title(raw: &str) -> String {
  raw
    .trim_matches(|c: char| c.is_whitespace() || matches!(c, '#' | '*' | '【' | '】' | '[' | ']'))
    .trim_end_matches([':', '：'])
    .trim()
    .to_string()
}

fn looks_like_url(title: &str, rest: &str) -> bool {
  let lower = title.to_ascii_lowercase();
  rest.starts_with("//") || lower.ends_with("http") || lower.ends_with("https") || lower.ends_with("ftp")
}

/// `【title】\ncontent\n\n` per section; the inverse of the bracket strategy.
pub fn render_sections(sections: &[Section]) -> String {
  let mut out = String::new();
  for s in sections {
    out.push('【');
    out.push_str(&s.title);
    out.push_str("】\n");
    out.push_str(&s.content);
    out.push_str("\n\n");
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parser() -> SectionParser {
    SectionParser::new().unwrap()
  }

  fn pairs(sections: &[Section]) -> Vec<(&str, &str)> {
    sections.iter().map(|s| (s.title.as_str(), s.content.as_str())).collect()
  }

  #[test]
  fn bracket_titles() {
    let p = parser();
    let s = p.parse("【总论】A\n\n【事业】B");
    assert_eq!(pairs(&s), vec![("总论", "A"), ("事业", "B")]);
  }

  #[test]
  fn empty_bracket_regions_are_skipped() {
    let p = parser();
    let s = p.parse("【总论】\n\n【事业】B\n【】C");
    assert_eq!(pairs(&s), vec![("事业", "B")]);
  }

  #[test]
  fn preamble_becomes_overview() {
    let p = parser();
    let s = p.parse("开场白\n【事业】B");
    assert_eq!(pairs(&s), vec![("总论", "开场白"), ("事业", "B")]);
  }

  #[test]
  fn ascii_brackets_only_at_line_start() {
    let p = parser();
    let s = p.parse("[Career]\ngood\n[Love]\nfine, see [note] inline");
    assert_eq!(pairs(&s), vec![("Career", "good"), ("Love", "fine, see [note] inline")]);
    let (strategy, _) = p.parse_traced("see [link](http://x) here\nand more");
    assert_eq!(strategy, Strategy::Degenerate);
  }

  #[test]
  fn nested_bracket_styles_do_not_overlap() {
    let s = parser().parse("[【甲】]\n内容");
    assert_eq!(pairs(&s), vec![("甲", "内容")]);
  }

  #[test]
  fn colon_titles() {
    let p = parser();
    let s = p.parse("事业：今年不错\n继续努力\n财运: 平稳");
    assert_eq!(pairs(&s), vec![("事业", "今年不错\n继续努力"), ("财运", "平稳")]);
  }

  #[test]
  fn colon_rejects_urls_sentences_and_long_titles() {
    let p = parser();
    let (strategy, _) = p.parse_traced("see https://example.com for details");
    assert_eq!(strategy, Strategy::Degenerate);
    let (strategy, _) = p.parse_traced("这是一个很长很长很长的句子标题：内容");
    assert_eq!(strategy, Strategy::Degenerate);
    let (strategy, _) = p.parse_traced("好的，我们开始：内容");
    assert_eq!(strategy, Strategy::Degenerate);
  }

  #[test]
  fn paragraphs_with_short_first_lines_become_titles() {
    let p = parser();
    let s = p.parse("事业运势\n今年有贵人相助。\n\n感情运势\n宜多沟通。");
    assert_eq!(pairs(&s), vec![("事业运势", "今年有贵人相助。"), ("感情运势", "宜多沟通。")]);
  }

  #[test]
  fn long_paragraphs_are_labelled_by_position() {
    let p = parser();
    let a = "今年整体运势平稳，上半年略有波动，下半年逐渐好转，贵人运较强。";
    let b = "事业方面需要稳扎稳打，不宜冒进，财运方面以正财为主，偏财不稳。";
    let c = "建议保持规律作息，多与朋友交流，遇事冷静思考后再做决定为好。";
    let s = p.parse(&format!("{a}\n\n{b}\n\n{c}"));
    assert_eq!(pairs(&s), vec![(OVERVIEW, a), (DETAIL, b), (ADVICE, c)]);
  }

  #[test]
  fn adjacent_positional_labels_merge() {
    let p = parser();
    let long = "这是一段足够长的段落内容，用来测试相邻段落的合并行为是否正确。";
    let text = [long; 6].join("\n\n");
    let s = p.parse(&text);
    assert_eq!(s.len(), 3);
    assert_eq!(s[0].content, format!("{long}\n\n{long}"));
  }

  #[test]
  fn single_paragraph_is_one_section() {
    let p = parser();
    let s = p.parse("Just one paragraph, no markers.");
    assert_eq!(s.len(), 1);
    assert_eq!(s[0].title, DEFAULT_TITLE);
    assert_eq!(s[0].content, "Just one paragraph, no markers.");
  }

  #[test]
  fn short_single_line_titles_itself() {
    let s = parser().parse("大吉");
    assert_eq!(pairs(&s), vec![("大吉", "大吉")]);
  }

  #[test]
  fn blank_input_yields_nothing() {
    assert!(parser().parse(" \n\t ").is_empty());
    assert!(parser().parse_for_method("", &["卦象"]).is_empty());
  }

  #[test]
  fn method_markers_and_markdown_headings() {
    let p = parser();
    let text = "## 卦象\n乾为天\n**卦辞**\n元亨利贞\n爻辞\n初九，潜龙勿用";
    let s = p.parse_for_method(text, &["卦象", "卦辞", "爻辞"]);
    assert_eq!(pairs(&s), vec![("卦象", "乾为天"), ("卦辞", "元亨利贞"), ("爻辞", "初九，潜龙勿用")]);
  }

  const ZHOUYI: &[&str] = &["卦象", "卦辞", "爻辞", "断语", "建议"];

  #[test]
  fn lines_that_merely_start_with_a_marker_stay_in_the_body() {
    let s = parser().parse_for_method("卦象\n乾为天\n建议多休息", ZHOUYI);
    assert_eq!(pairs(&s), vec![("卦象", "乾为天\n建议多休息")]);
  }

  #[test]
  fn bare_marker_with_nothing_under_it_is_kept_as_text() {
    let p = parser();
    let s = p.parse_for_method("卦象\n乾为天\n建议", ZHOUYI);
    assert_eq!(pairs(&s), vec![("卦象", "乾为天\n建议")]);
    let s = p.parse_for_method("卦象\n乾为天\n建议：\n多休息", ZHOUYI);
    assert_eq!(pairs(&s), vec![("卦象", "乾为天"), ("建议", "多休息")]);
  }

  #[test]
  fn over_long_single_section_is_split() {
    let p = parser();
    let para = "运势".repeat(160);
    let text = format!("【总论】\n{para}\n\n{para}\n\n{para}");
    let s = p.parse_for_method(&text, &[]);
    assert_eq!(s.len(), 3);
    assert_eq!(s[0].title, OVERVIEW);
  }

  #[test]
  fn split_keeps_the_original_title() {
    let p = parser();
    let para = "运势".repeat(160);
    let text = format!("【事业】\n{para}\n\n{para}\n\n{para}");
    let titles: Vec<String> = p.parse_for_method(&text, &[]).into_iter().map(|s| s.title).collect();
    assert_eq!(titles, vec!["事业", DETAIL, ADVICE]);

    let long = "稳步发展".repeat(80);
    let text = format!("【事业】\n上半年：{long}\n下半年：{long}");
    let s = p.parse_for_method(&text, &[]);
    assert_eq!(s.len(), 2);
    assert_eq!(s[0].title, "事业·上半年");
    assert_eq!(s[1].title, "下半年");
    assert_eq!(s[1].content, long);
  }

  #[test]
  fn render_then_parse_round_trips() {
    let p = parser();
    let sections = vec![Section::new("总论", "第一段\n第二行"), Section::new("建议", "多休息")];
    assert_eq!(p.parse(&render_sections(&sections)), sections);
  }

  #[test]
  fn bracket_titles_and_indentation_survive_the_round_trip() {
    let sections = vec![Section::new("#运势", "平稳"), Section::new("建议", "  缩进内容")];
    assert_eq!(parser().parse(&render_sections(&sections)), sections);
  }

  #[test]
  fn clean_title_strips_decoration() {
    assert_eq!(clean_title("## **事业：**"), "事业");
    assert_eq!(clean_title(" 【总论】 "), "总论");
  }
}

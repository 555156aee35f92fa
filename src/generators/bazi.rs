//! Four Pillars (八字) reading with simplified stem/branch arithmetic.

use std::fmt::Write as _;

use chrono::Datelike;

use crate::calendar::{
  branch_element, hour_branch, parse_date, parse_hour, stem_element, CalendarFacts, EARTHLY_BRANCHES, FIVE_ELEMENTS,
  HEAVENLY_STEMS,
};
use crate::domain::{input, Inputs};
use crate::error::DivinationError;
use crate::rng::{GenerationSeed, SeededSequence};

const PERSONALITY: [&str; 7] = [
  "您性格温和，处事稳重，善于思考，不急不躁。",
  "您天生具有领导才能，做事果断，容易获得他人信任。",
  "您思维灵活，善于创新，能够从不同角度看待问题。",
  "您处事谨慎，注重细节，做事有计划性和条理性。",
  "您性格开朗，人缘极佳，善于社交和沟通。",
  "您具有强烈的责任感和使命感，对自己要求严格。",
  "您心思细腻，情感丰富，对周围事物敏感度高。",
];

const CAREER: [&str; 5] = [
  "您适合从事需要创造力和想象力的工作，如设计、艺术或研发领域。",
  "您的组织和管理能力突出，适合担任管理岗位或创业。",
  "您适合需要细致和耐心的工作，如技术研究、数据分析或品质控制。",
  "您的沟通和表达能力强，适合市场、销售或教育培训工作。",
  "您的分析能力强，适合财务、咨询或研究类工作。",
];

const CAREER_TRENDS: [&str; 4] = [
  "近期事业发展较为顺利，可能有良好机会出现。",
  "未来一年是事业发展的关键期，需要把握机会，勇于突破。",
  "事业上遇到一些挑战，需要耐心应对，调整策略。",
  "当前处于积累阶段，为未来发展打下基础。",
];

const WEALTH: [&str; 5] = [
  "您的财运较为稳定，收入来源主要通过个人努力获得。",
  "您有一定的理财天赋，适合进行稳健型投资。",
  "您的财运起伏较大，需要做好财务规划和风险控制。",
  "您的正财运较强，通过主业能获得不错的收入。",
  "您的偏财运较好，可能通过额外渠道获得收益。",
];

const LOVE: [&str; 5] = [
  "您在感情中注重稳定和安全感，追求长久和谐的关系。",
  "您在感情中较为理性，会慎重考虑对方是否合适。",
  "您重视情感交流，期待与伴侣建立深层次的精神连接。",
  "您有自己的爱情理想，不会轻易妥协或将就。",
  "您在感情中重视真诚和忠诚，不善于掩饰自己的感受。",
];

const HEALTH: [&str; 4] = [
  "总体健康状况良好，但需要注意劳逸结合。",
  "体质较弱，需要加强锻炼，增强免疫力。",
  "精力充沛，但容易透支，应注意休息。",
  "容易受季节变化影响，需要及时调整作息。",
];

const WEAK_POINTS: [&str; 5] = ["消化系统", "呼吸系统", "心脑血管", "颈椎和腰椎", "免疫系统"];

/// Organ system traditionally tied to each element, in `FIVE_ELEMENTS` order.
const ELEMENT_ORGANS: [&str; 5] = ["肺与呼吸", "肝胆", "肾与泌尿", "心血管", "脾胃"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pillar {
  pub stem: usize,
  pub branch: usize,
}

impl Pillar {
  pub fn label(&self) -> String {
    format!("{}{}", HEAVENLY_STEMS[self.stem % 10], EARTHLY_BRANCHES[self.branch % 12])
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FourPillars {
  pub year: Pillar,
  pub month: Pillar,
  pub day: Pillar,
  /// Absent when the birth hour is unknown.
  pub hour: Option<Pillar>,
}

impl FourPillars {
  pub fn derive(facts: &CalendarFacts, hour: Option<u32>) -> Self {
    let cycle = (facts.year - 4).rem_euclid(60) as usize;
    let year = Pillar { stem: cycle % 10, branch: cycle % 12 };
    let month = Pillar {
      stem: (year.stem * 2 + facts.month as usize) % 10,
      branch: (facts.month as usize + 1) % 12,
    };
    let day = Pillar { stem: facts.stem_index(), branch: facts.branch_index() };
    let hour = hour.map(|h| {
      let branch = hour_branch(h);
      Pillar { stem: (day.stem * 2 + branch) % 10, branch }
    });
    Self { year, month, day, hour }
  }

  pub fn pillars(&self) -> Vec<Pillar> {
    let mut v = vec![self.year, self.month, self.day];
    v.extend(self.hour);
    v
  }

  /// Count per element, in `FIVE_ELEMENTS` order.
  pub fn element_histogram(&self) -> [u8; 5] {
    let mut counts = [0u8; 5];
    for p in self.pillars() {
      counts[stem_element(p.stem)] += 1;
      counts[branch_element(p.branch)] += 1;
    }
    counts
  }

  pub fn day_master_element(&self) -> usize {
    stem_element(self.day.stem)
  }
}

pub fn generate(seed: GenerationSeed, inputs: &Inputs) -> Result<String, DivinationError> {
  let raw = input(inputs, "birthDate").ok_or_else(|| DivinationError::invalid_input("birthDate", ""))?;
  let date = parse_date("birthDate", raw)?;
  let facts = CalendarFacts::from_date(date);
  let hour = input(inputs, "birthTime").and_then(parse_hour);
  let pillars = FourPillars::derive(&facts, hour);
  let mut seq = seed.sequence();
  Ok(render(&pillars, &facts, input(inputs, "gender"), &mut seq))
}

fn render(pillars: &FourPillars, facts: &CalendarFacts, gender: Option<&str>, seq: &mut SeededSequence) -> String {
  let mut out = String::new();
  let hist = pillars.element_histogram();
  let master = pillars.day_master_element();

  out.push_str("【八字命盘】\n");
  let _ = write!(
    out,
    "出生：{}年{}月{}日",
    facts.date.year(),
    facts.date.month(),
    facts.date.day()
  );
  if let Some(g) = gender {
    let _ = write!(out, "（{g}命）");
  }
  out.push('\n');
  let _ = write!(
    out,
    "年柱：{}  月柱：{}  日柱：{}  时柱：{}\n",
    pillars.year.label(),
    pillars.month.label(),
    pillars.day.label(),
    pillars.hour.map(|p| p.label()).unwrap_or_else(|| "时辰未知".to_string()),
  );
  let _ = write!(out, "日主：{}（五行属{}）\n\n", HEAVENLY_STEMS[pillars.day.stem], FIVE_ELEMENTS[master]);

  out.push_str("【五行分析】\n");
  for (i, el) in FIVE_ELEMENTS.iter().enumerate() {
    let filled = "●".repeat(hist[i] as usize);
    let empty = "○".repeat(4usize.saturating_sub(hist[i] as usize));
    let _ = writeln!(out, "{el}：{filled}{empty} {}", hist[i]);
  }
  let strongest = argmax(&hist);
  let missing: Vec<&str> = FIVE_ELEMENTS.iter().zip(hist.iter()).filter(|(_, c)| **c == 0).map(|(e, _)| *e).collect();
  let _ = write!(out, "五行以{}最旺", FIVE_ELEMENTS[strongest]);
  if missing.is_empty() {
    out.push_str("，五行俱全，格局较为平衡。");
  } else {
    let _ = write!(out, "，命中缺{}，可在生活中适当补益。", missing.join("、"));
  }
  let strength = if hist[master] >= 3 { "偏强" } else if hist[master] == 2 { "中和" } else { "偏弱" };
  let _ = write!(out, "日主{}。\n\n", strength);

  out.push_str("【性格分析】\n");
  for line in seq.sample_strs(&PERSONALITY, 3) {
    let _ = write!(out, "{line}\n");
  }
  out.push('\n');

  out.push_str("【事业分析】\n");
  let _ = write!(
    out,
    "{}\n{}\n建议：\n1. 发挥自身优势，选择适合的发展方向\n2. 持续学习，提升专业技能\n3. 培养良好的职场人际关系\n4. 保持耐心，不急于求成\n\n",
    seq.pick_str(&CAREER),
    seq.pick_str(&CAREER_TRENDS),
  );

  out.push_str("【财运分析】\n");
  let _ = write!(
    out,
    "{}\n近期财运走势：{}。\n\n",
    seq.pick_str(&WEALTH),
    if seq.chance(50) { "上升" } else { "平稳" },
  );

  out.push_str("【感情分析】\n");
  let trend = if seq.chance(50) {
    "近期感情运势较好，单身者有机会遇到心仪对象，已有伴侣的关系将更加稳定和谐。"
  } else {
    "近期感情可能遇到一些挑战，需要耐心沟通，增进理解。"
  };
  let _ = write!(out, "{}\n感情运势：{}\n\n", seq.pick_str(&LOVE), trend);

  out.push_str("【健康分析】\n");
  let weakest = argmin(&hist);
  let _ = write!(
    out,
    "{}\n需要关注的健康问题：{}可能是您的健康薄弱环节，五行{}偏弱，亦需留意{}。\n\n",
    seq.pick_str(&HEALTH),
    seq.pick_str(&WEAK_POINTS),
    FIVE_ELEMENTS[weakest],
    ELEMENT_ORGANS[weakest],
  );

  out.push_str("【总结】\n");
  let strength_phrase = seq.pick_str(&PERSONALITY).trim_start_matches('您');
  let _ = write!(
    out,
    "综合分析您的八字，您的人生总体发展{}。您的优势在于{}八字命理只是参考，真正的命运掌握在自己手中。\n",
    if seq.chance(50) { "平稳有序" } else { "起伏有度" },
    strength_phrase,
  );
  out
}

fn argmax(hist: &[u8; 5]) -> usize {
  let mut best = 0;
  for i in 1..hist.len() {
    if hist[i] > hist[best] {
      best = i;
    }
  }
  best
}

fn argmin(hist: &[u8; 5]) -> usize {
  let mut best = 0;
  for i in 1..hist.len() {
    if hist[i] < hist[best] {
      best = i;
    }
  }
  best
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  fn facts(y: i32, m: u32, d: u32) -> CalendarFacts {
    CalendarFacts::from_date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
  }

  #[test]
  fn histogram_counts_two_per_pillar() {
    let with_hour = FourPillars::derive(&facts(1990, 5, 20), Some(8));
    assert_eq!(with_hour.element_histogram().iter().map(|c| *c as u32).sum::<u32>(), 8);
    let without = FourPillars::derive(&facts(1990, 5, 20), None);
    assert_eq!(without.element_histogram().iter().map(|c| *c as u32).sum::<u32>(), 6);
  }

  #[test]
  fn year_pillar_follows_sexagenary_cycle() {
    assert_eq!(FourPillars::derive(&facts(1984, 6, 1), None).year.label(), "甲子");
    assert_eq!(FourPillars::derive(&facts(2024, 6, 1), None).year.label(), "甲辰");
  }

  #[test]
  fn needs_a_birth_date() {
    let mut inputs = Inputs::new();
    assert!(generate(GenerationSeed(1), &inputs).is_err());
    inputs.insert("birthDate".into(), "1990-05-20".into());
    let text = generate(GenerationSeed(1), &inputs).unwrap();
    assert!(text.contains("时辰未知"));
    assert!(text.starts_with("【八字命盘】"));
  }
}

//! Natal chart text.
//!
//! The chart lines are consumed by chart renderers, so their grammar is fixed:
//! `<planet>位于<sign>座<degree>度` and `<planetA>和<planetB>形成<relation>(<degree>度)`.

use std::fmt::Write as _;

use chrono::Datelike;
use serde::Serialize;

use crate::calendar::parse_date;
use crate::domain::{input, Inputs};
use crate::rng::{GenerationSeed, SeededSequence};

/// Bodies that take part in aspects.
pub const PLANETS: [&str; 10] = ["太阳", "月亮", "水星", "金星", "火星", "木星", "土星", "天王星", "海王星", "冥王星"];

/// Every point listed in the positions block, in output order.
pub const CHART_POINTS: [&str; 12] = [
  "太阳", "月亮", "水星", "金星", "火星", "木星", "土星", "天王星", "海王星", "冥王星", "上升点", "中天点",
];

/// Sign names without the trailing `座`.
pub const SIGNS: [&str; 12] = ["白羊", "金牛", "双子", "巨蟹", "狮子", "处女", "天秤", "天蝎", "射手", "摩羯", "水瓶", "双鱼"];

/// Relation name and its exact angle.
pub const ASPECTS: [(&str, u16); 5] = [("合相", 0), ("六分相", 60), ("四分相", 90), ("三分相", 120), ("对分相", 180)];

const SIGN_TRAITS: [&str; 12] = [
  "行动力强，敢于开拓", "踏实稳重，重视安全感", "思维敏捷，好奇心旺盛", "情感细腻，重视家庭",
  "自信大方，富有表现力", "注重细节，追求完美", "追求平衡，善于协调", "洞察深刻，意志坚定",
  "乐观豁达，热爱自由", "务实进取，责任心强", "独立创新，思想前卫", "富有同理心，想象力丰富",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetPosition {
  pub planet: String,
  pub sign: String,
  pub degree: u16,
}

impl PlanetPosition {
  pub fn line(&self) -> String {
    format!("{}位于{}座{}度", self.planet, self.sign, self.degree)
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aspect {
  pub first: String,
  pub second: String,
  pub relation: String,
  pub degree: u16,
}

impl Aspect {
  pub fn line(&self) -> String {
    format!("{}和{}形成{}({}度)", self.first, self.second, self.relation, self.degree)
  }

  /// Order-independent identity of the planet pair.
  pub fn pair_key(&self) -> (String, String) {
    if self.first <= self.second {
      (self.first.clone(), self.second.clone())
    } else {
      (self.second.clone(), self.first.clone())
    }
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
  pub positions: Vec<PlanetPosition>,
  pub aspects: Vec<Aspect>,
}

impl Chart {
  pub fn render(&self) -> String {
    let mut out = String::new();
    for p in &self.positions {
      out.push_str(&p.line());
      out.push('\n');
    }
    for a in &self.aspects {
      out.push_str(&a.line());
      out.push('\n');
    }
    out
  }

  pub fn sign_of(&self, planet: &str) -> Option<&str> {
    self.positions.iter().find(|p| p.planet == planet).map(|p| p.sign.as_str())
  }
}

/// Index into `SIGNS` of the tropical sun sign for a month/day.
pub fn sun_sign(month: u32, day: u32) -> usize {
  // Day of each month on which the next sign begins.
  const CUSPS: [u32; 12] = [20, 19, 21, 20, 21, 22, 23, 23, 23, 24, 22, 22];
  let m = month.clamp(1, 12) as usize;
  let before_cusp = day < CUSPS[m - 1];
  // January before the 20th is 摩羯 (index 9); from the cusp on it is 水瓶 (10).
  let start = (m + 8) % 12;
  if before_cusp {
    start
  } else {
    (start + 1) % 12
  }
}

/// Twelve positions plus 5-7 aspects over distinct planet pairs.
pub fn build_chart(seq: &mut SeededSequence, sun: Option<usize>) -> Chart {
  let positions = CHART_POINTS
    .iter()
    .map(|p| {
      let sign = match (*p, sun) {
        ("太阳", Some(s)) => SIGNS[s % 12],
        _ => seq.pick_str(&SIGNS),
      };
      PlanetPosition { planet: p.to_string(), sign: sign.to_string(), degree: seq.range(0, 29) as u16 }
    })
    .collect();

  let pairs = planet_pairs();
  let count = seq.range(5, 7) as usize;
  let aspects = seq
    .distinct_indices(pairs.len(), count)
    .into_iter()
    .map(|i| {
      let (a, b) = pairs[i];
      let (relation, degree) = ASPECTS[seq.below(ASPECTS.len())];
      Aspect { first: a.to_string(), second: b.to_string(), relation: relation.to_string(), degree }
    })
    .collect();

  Chart { positions, aspects }
}

/// All 45 unordered pairs of the ten planets.
fn planet_pairs() -> Vec<(&'static str, &'static str)> {
  let mut pairs = Vec::with_capacity(45);
  for (i, a) in PLANETS.iter().enumerate() {
    for b in &PLANETS[i + 1..] {
      pairs.push((*a, *b));
    }
  }
  pairs
}

pub fn generate(seed: GenerationSeed, inputs: &Inputs) -> String {
  let mut seq = seed.sequence();
  let birth = input(inputs, "birthDate").and_then(|raw| parse_date("birthDate", raw).ok());
  let sun = birth.map(|d| sun_sign(d.month(), d.day()));
  let chart = build_chart(&mut seq, sun);
  let mut out = String::new();

  out.push_str("【星盘描述】\n");
  if let Some(place) = input(inputs, "birthPlace") {
    let _ = writeln!(out, "出生地点：{place}");
  }
  out.push_str(&chart.render());
  out.push('\n');

  let sign_traits = |planet: &str| -> (&'static str, &'static str) {
    let sign = chart.sign_of(planet).unwrap_or(SIGNS[0]);
    let idx = SIGNS.iter().position(|s| *s == sign).unwrap_or(0);
    (SIGNS[idx], SIGN_TRAITS[idx])
  };

  out.push_str("【太阳月亮上升】\n");
  for (planet, label) in [("太阳", "太阳星座"), ("月亮", "月亮星座"), ("上升点", "上升星座")] {
    let (sign, traits) = sign_traits(planet);
    let _ = writeln!(out, "{label}：{sign}座，{traits}。");
  }
  out.push('\n');

  out.push_str("【相位分析】\n");
  for a in &chart.aspects {
    let tone = match a.degree {
      60 | 120 => "和谐相位，能量互相支持",
      90 | 180 => "紧张相位，带来挑战与成长动力",
      _ => "能量融合，影响集中而强烈",
    };
    let _ = writeln!(out, "{}和{}{}：{}。", a.first, a.second, a.relation, tone);
  }
  out.push('\n');

  let (mars, mars_traits) = sign_traits("火星");
  let (venus, venus_traits) = sign_traits("金星");
  out.push_str("【事业发展】\n");
  let _ = write!(
    out,
    "火星落在{mars}座，{mars_traits}，增强了您的执行力。土星提示您需要注重基础工作，打牢专业根基，切勿急功近利。\n\n"
  );
  out.push_str("【人际关系】\n");
  let _ = write!(
    out,
    "金星落在{venus}座，{venus_traits}，为您带来良好的人际吸引力。注意水星的位置可能带来沟通上的挑战，建议提升表达能力。\n\n"
  );

  out.push_str("【建议】\n");
  out.push_str("1. 把握有利相位带来的时机，勇于表现自己\n2. 在关系中提升沟通质量，表达真实需求\n3. 保持冥想或静心练习，增强心理平衡\n");
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn chart_shape_holds_for_many_seeds() {
    for s in 0..500u32 {
      let chart = build_chart(&mut GenerationSeed(s).sequence(), None);
      assert_eq!(chart.positions.len(), 12);
      assert!((5..=7).contains(&chart.aspects.len()), "seed {s}");
      let pairs: HashSet<(String, String)> = chart.aspects.iter().map(Aspect::pair_key).collect();
      assert_eq!(pairs.len(), chart.aspects.len(), "seed {s}");
      assert!(chart.aspects.iter().all(|a| a.first != a.second));
    }
  }

  #[test]
  fn sun_sign_boundaries() {
    assert_eq!(SIGNS[sun_sign(1, 1)], "摩羯");
    assert_eq!(SIGNS[sun_sign(1, 20)], "水瓶");
    assert_eq!(SIGNS[sun_sign(3, 21)], "白羊");
    assert_eq!(SIGNS[sun_sign(4, 19)], "白羊");
    assert_eq!(SIGNS[sun_sign(12, 25)], "摩羯");
  }

  #[test]
  fn birth_date_fixes_the_sun_sign() {
    let mut inputs = Inputs::new();
    inputs.insert("birthDate".into(), "1990-04-01".into());
    let text = generate(GenerationSeed(11), &inputs);
    assert!(text.contains("太阳位于白羊座"));
  }
}

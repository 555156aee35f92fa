//! Almanac (老黄历) day view.
//!
//! All choices come from a `SeededSequence` started at the day's date hash, so a
//! given date always yields the same activities, directions and hour lucks.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::{parse_date, CalendarFacts, EARTHLY_BRANCHES, HOUR_PERIODS, LUNAR_MANSIONS, ZODIAC_ANIMALS};
use crate::domain::{input, Inputs};
use crate::error::DivinationError;
use crate::rng::{GenerationSeed, SeededSequence};

pub const GOOD_ACTIVITIES: [&str; 30] = [
  "祭祀", "祈福", "求嗣", "开光", "嫁娶", "会亲友", "开市", "交易", "入学", "习艺",
  "纳财", "纳畜", "牧养", "安床", "动土", "上梁", "修造", "起基", "竖柱", "安门",
  "栽种", "纳采", "订盟", "冠笄", "裁衣", "合帐", "经络", "安葬", "修坟", "破土",
];

pub const BAD_ACTIVITIES: [&str; 20] = [
  "诉讼", "安葬", "修坟", "开市", "动土", "祭祀", "出行", "赴任", "嫁娶", "开张",
  "搬迁", "入宅", "安床", "交易", "栽种", "开仓", "纳财", "修造", "动工", "竖柱",
];

pub const DIRECTIONS: [&str; 8] = ["东", "南", "西", "北", "东北", "东南", "西南", "西北"];

const DEITIES: [&str; 5] = ["喜神", "财神", "福神", "阳贵", "阴贵"];

const FETAL_SPIRITS: [&str; 10] = [
  "占门碓外东南", "碓磨厕外东南", "厨灶炉外正南", "占门床外正南", "占门栖外正南",
  "碓磨床外正南", "厨灶厕外西南", "仓库炉外西南", "房床门外西南", "门鸡栖外西南",
];

const SHA_DIRECTIONS: [&str; 4] = ["东", "南", "西", "北"];

const DUTY_GODS: [&str; 12] = ["建", "除", "满", "平", "定", "执", "破", "危", "成", "收", "开", "闭"];

const HOUR_ACTIVITIES: [&str; 8] = ["祈福", "出行", "会友", "交易", "求财", "嫁娶", "修造", "祭祀"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionLuck {
  pub direction: &'static str,
  pub auspicious: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourLuck {
  pub period: &'static str,
  pub auspicious: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub suitable: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlmanacDay {
  pub date: NaiveDate,
  pub solar_label: String,
  pub weekday: &'static str,
  pub lunar_label: String,
  pub zodiac: &'static str,
  pub year_stem_branch: String,
  pub day_stem_branch: String,
  pub duty_god: &'static str,
  pub good_activities: Vec<&'static str>,
  pub bad_activities: Vec<&'static str>,
  pub directions: Vec<DirectionLuck>,
  pub deity_directions: Vec<(&'static str, &'static str)>,
  pub hour_lucks: Vec<HourLuck>,
  pub fetal_spirit: &'static str,
  pub clash: String,
  pub clash_branch: &'static str,
  pub year_star: &'static str,
  pub day_star: &'static str,
  pub five_element: &'static str,
  pub score: u8,
}

impl AlmanacDay {
  /// The canonical view for a date: seeded with the date hash.
  pub fn for_date(date: NaiveDate) -> Self {
    let facts = CalendarFacts::from_date(date);
    Self::compute(&facts, GenerationSeed(facts.date_hash))
  }

  pub fn compute(facts: &CalendarFacts, seed: GenerationSeed) -> Self {
    let mut seq = seed.sequence();

    let good_count = seq.range(3, 5) as usize;
    let good_activities = seq.sample_strs(&GOOD_ACTIVITIES, good_count);
    let bad_activities = pick_bad(&mut seq, &good_activities);

    let directions: Vec<DirectionLuck> = DIRECTIONS
      .iter()
      .map(|d| DirectionLuck { direction: d, auspicious: seq.chance(50) })
      .collect();
    let deity_directions = DEITIES.iter().map(|g| (*g, seq.pick_str(&DIRECTIONS))).collect();

    let hour_lucks: Vec<HourLuck> = HOUR_PERIODS
      .iter()
      .map(|p| {
        let auspicious = seq.chance(60);
        let suitable = auspicious.then(|| seq.pick_str(&HOUR_ACTIVITIES));
        HourLuck { period: p, auspicious, suitable }
      })
      .collect();

    let fetal_spirit = seq.pick_str(&FETAL_SPIRITS);
    let clash = format!(
      "冲{}煞{}",
      seq.pick_str(&ZODIAC_ANIMALS),
      seq.pick_str(&SHA_DIRECTIONS)
    );
    let day_star = seq.pick_str(&LUNAR_MANSIONS);
    let duty_god = seq.pick_str(&DUTY_GODS);

    let good_dirs = directions.iter().filter(|d| d.auspicious).count();
    let good_hours = hour_lucks.iter().filter(|h| h.auspicious).count();
    let score = (30 + good_dirs * 5 + good_hours * 3).min(100) as u8;

    Self {
      date: facts.date,
      solar_label: facts.display(),
      weekday: facts.weekday_label(),
      lunar_label: facts.lunar_label(),
      zodiac: facts.zodiac(),
      year_stem_branch: facts.year_stem_branch(),
      day_stem_branch: facts.day_stem_branch(),
      duty_god,
      good_activities,
      bad_activities,
      directions,
      deity_directions,
      hour_lucks,
      fetal_spirit,
      clash,
      clash_branch: opposite_branch(facts),
      year_star: facts.year_star(),
      day_star,
      five_element: facts.day_element(),
      score,
    }
  }

  pub fn auspicious_directions(&self) -> usize {
    self.directions.iter().filter(|d| d.auspicious).count()
  }

  /// Titled text in the bracket format the parser expects.
  pub fn render(&self) -> String {
    let mut out = String::new();
    out.push_str("【今日概览】\n");
    out.push_str(&format!("公历：{} {}\n", self.solar_label, self.weekday));
    out.push_str(&format!("农历：{}（简化推算）\n", self.lunar_label));
    out.push_str(&format!("生肖：{}年  年柱：{}  日柱：{}\n", self.zodiac, self.year_stem_branch, self.day_stem_branch));
    out.push_str(&format!("值神：{}日  综合评分：{}\n\n", self.duty_god, self.score));

    out.push_str(&format!("【宜】\n{}\n\n", self.good_activities.join("、")));
    out.push_str(&format!("【忌】\n{}\n\n", self.bad_activities.join("、")));

    out.push_str("【吉凶方位】\n");
    let dirs: Vec<String> = self
      .directions
      .iter()
      .map(|d| format!("{}：{}", d.direction, if d.auspicious { "吉" } else { "凶" }))
      .collect();
    out.push_str(&dirs.join("  "));
    out.push('\n');
    let deities: Vec<String> = self.deity_directions.iter().map(|(g, d)| format!("{g}：{d}")).collect();
    out.push_str(&deities.join("  "));
    out.push_str("\n\n");

    out.push_str("【时辰吉凶】\n");
    for h in &self.hour_lucks {
      match h.suitable {
        Some(act) => out.push_str(&format!("{}：吉，宜{}\n", h.period, act)),
        None => out.push_str(&format!("{}：凶\n", h.period)),
      }
    }
    out.push('\n');

    out.push_str(&format!("【胎神冲煞】\n胎神：{}\n冲煞：{}\n日冲：{}\n\n", self.fetal_spirit, self.clash, self.clash_branch));
    out.push_str(&format!(
      "【星宿五行】\n值年星：{}\n值日星宿：{}\n五行：{}\n\n",
      self.year_star, self.day_star, self.five_element
    ));

    out.push_str("【总结】\n");
    out.push_str(&self.summary());
    out.push('\n');
    out
  }

  fn summary(&self) -> String {
    let good = self.auspicious_directions();
    let top_good: Vec<&str> = self.good_activities.iter().take(2).copied().collect();
    let top_bad: Vec<&str> = self.bad_activities.iter().take(2).copied().collect();
    if good >= 6 {
      "今天是个非常好的日子，多数方位都很吉利，适合进行重要活动。".to_string()
    } else if good >= 4 {
      format!("今天整体运势不错，特别适合{}。如果您有重要决定要做，今天是个好日子。", top_good.join("、"))
    } else {
      format!("今天运势一般，建议谨慎行事，特别避免{}等活动。", top_bad.join("、"))
    }
  }
}

/// 3-5 inauspicious activities, never overlapping the auspicious ones.
fn pick_bad(seq: &mut SeededSequence, good: &[&'static str]) -> Vec<&'static str> {
  let candidates: Vec<&'static str> = BAD_ACTIVITIES.iter().copied().filter(|b| !good.contains(b)).collect();
  let count = seq.range(3, 5) as usize;
  let mut bad: Vec<&'static str> = seq
    .distinct_indices(candidates.len(), count)
    .into_iter()
    .filter_map(|i| candidates.get(i).copied())
    .collect();
  bad.retain(|b| !good.contains(b));
  bad
}

/// Branch six places from the day branch.
pub fn opposite_branch(facts: &CalendarFacts) -> &'static str {
  EARTHLY_BRANCHES[(facts.branch_index() + 6) % 12]
}

/// The day the generator would render for `inputs` under `seed`.
pub fn day_for(seed: GenerationSeed, inputs: &Inputs) -> Result<AlmanacDay, DivinationError> {
  let raw = input(inputs, "date").ok_or_else(|| DivinationError::invalid_input("date", ""))?;
  let date = parse_date("date", raw)?;
  let facts = CalendarFacts::from_date(date);
  Ok(AlmanacDay::compute(&facts, seed))
}

pub fn generate(seed: GenerationSeed, inputs: &Inputs) -> Result<String, DivinationError> {
  day_for(seed, inputs).map(|day| day.render())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn same_date_same_lists() {
    let a = AlmanacDay::for_date(day(2024, 3, 15));
    let b = AlmanacDay::for_date(day(2024, 3, 15));
    assert_eq!(a.good_activities, b.good_activities);
    assert_eq!(a.bad_activities, b.bad_activities);
    assert_eq!(a.render(), b.render());
  }

  #[test]
  fn counts_and_disjointness_over_a_year() {
    let mut date = day(2024, 1, 1);
    for _ in 0..366 {
      let a = AlmanacDay::for_date(date);
      assert!((3..=5).contains(&a.good_activities.len()), "{date}");
      assert!((3..=5).contains(&a.bad_activities.len()), "{date}");
      for b in &a.bad_activities {
        assert!(!a.good_activities.contains(b), "{date}: {b} in both lists");
      }
      let mut g = a.good_activities.clone();
      g.sort_unstable();
      g.dedup();
      assert_eq!(g.len(), a.good_activities.len());
      assert_eq!(a.directions.len(), 8);
      assert_eq!(a.hour_lucks.len(), 12);
      date = date.succ_opt().unwrap();
    }
  }

  #[test]
  fn generate_requires_a_date() {
    let inputs = Inputs::new();
    assert!(matches!(
      generate(GenerationSeed(1), &inputs),
      Err(DivinationError::InvalidSeedInput { .. })
    ));
  }

  #[test]
  fn rendered_text_has_bracketed_titles() {
    let mut inputs = Inputs::new();
    inputs.insert("date".into(), "2024-03-15".into());
    let text = generate(GenerationSeed::from_date(day(2024, 3, 15)), &inputs).unwrap();
    for title in ["【今日概览】", "【宜】", "【忌】", "【吉凶方位】", "【时辰吉凶】", "【总结】"] {
      assert!(text.contains(title), "missing {title}");
    }
  }

  #[test]
  fn opposite_branch_is_six_away() {
    let facts = CalendarFacts::from_date(day(2024, 3, 15));
    let i = facts.branch_index();
    assert_eq!(opposite_branch(&facts), EARTHLY_BRANCHES[(i + 6) % 12]);
  }
}

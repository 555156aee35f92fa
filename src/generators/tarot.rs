//! Tarot spreads drawn without replacement from the 78-card deck.

use std::fmt::Write as _;

use crate::domain::{input, Inputs};
use crate::rng::GenerationSeed;

pub const MAJOR_ARCANA: [&str; 22] = [
  "愚者", "魔术师", "女祭司", "女皇", "皇帝", "教皇", "恋人", "战车", "力量", "隐者", "命运之轮",
  "正义", "倒吊人", "死神", "节制", "恶魔", "高塔", "星星", "月亮", "太阳", "审判", "世界",
];

const MAJOR_MEANINGS: [&str; 22] = [
  "象征新的开始和无限可能",
  "代表权力、意志和创造力",
  "暗示直觉、智慧和内在知识",
  "象征富足、创造和滋养",
  "代表掌控、权威和稳定",
  "暗示精神指引和传统",
  "象征爱情、和谐与选择",
  "代表决心、意志力与成功",
  "暗示勇气、力量和信心",
  "象征反思、寻求真理和孤独",
  "代表命运、变化与机遇",
  "暗示平衡、公正与真理",
  "象征牺牲、让步和新视角",
  "代表结束、变革和重生",
  "暗示中庸、平衡与和谐",
  "象征诱惑、执着与束缚",
  "代表突然变化、混乱与释放",
  "暗示希望、启示与灵感",
  "象征幻觉、直觉与潜意识",
  "代表成功、喜悦与活力",
  "暗示重生、更新与决定",
  "象征完成、成就与圆满",
];

pub const SUITS: [&str; 4] = ["权杖", "圣杯", "宝剑", "星币"];
const SUIT_THEMES: [&str; 4] = ["行动与热情", "情感与关系", "思想与冲突", "物质与财务"];

pub const RANKS: [&str; 14] = ["一", "二", "三", "四", "五", "六", "七", "八", "九", "十", "侍从", "骑士", "王后", "国王"];
const RANK_NUANCE: [&str; 14] = [
  "新的开端正在萌芽",
  "需要在两者之间取得平衡",
  "合作带来初步成果",
  "稳定之中略显停滞",
  "短暂的失落与考验",
  "和谐与互助的时期",
  "需要坚持自己的立场",
  "变化加速，行动迅速",
  "接近圆满，仍需守护",
  "一个阶段走到尽头",
  "好奇而开放的学习心态",
  "果敢推进，追逐目标",
  "以成熟与包容掌握局面",
  "以权威和经验主导方向",
];

pub const DECK_SIZE: usize = MAJOR_ARCANA.len() + SUITS.len() * RANKS.len();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Spread {
  ThreeCard,
  FiveCard,
  SixCard,
  CelticCross,
}

impl Spread {
  /// Reads the free-text `spread` input; anything unrecognised is the three-card spread.
  pub fn from_input(raw: Option<&str>) -> Self {
    let Some(s) = raw else { return Spread::ThreeCard };
    if s.contains("凯尔特") || s.contains("十字") || s.contains("10") || s.contains('十') {
      Spread::CelticCross
    } else if s.contains('六') || s.contains('6') {
      Spread::SixCard
    } else if s.contains('五') || s.contains('5') {
      Spread::FiveCard
    } else {
      Spread::ThreeCard
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Spread::ThreeCard => "三张牌阵",
      Spread::FiveCard => "五张牌阵",
      Spread::SixCard => "六芒星牌阵",
      Spread::CelticCross => "凯尔特十字牌阵",
    }
  }

  pub fn positions(self) -> &'static [&'static str] {
    match self {
      Spread::ThreeCard => &["过去", "现在", "未来"],
      Spread::FiveCard => &["现状", "挑战", "过去", "未来", "结果"],
      Spread::SixCard => &["过去", "现在", "未来", "对策", "环境", "结果"],
      Spread::CelticCross => &[
        "现状", "阻碍", "基础", "过去", "目标", "近未来", "自我", "环境", "希望与恐惧", "最终结果",
      ],
    }
  }

  pub fn size(self) -> usize {
    self.positions().len()
  }
}

/// Index into the deck: majors first, then suit-major order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card(pub usize);

impl Card {
  pub fn name(self) -> String {
    if self.0 < MAJOR_ARCANA.len() {
      return MAJOR_ARCANA[self.0].to_string();
    }
    let minor = self.0 - MAJOR_ARCANA.len();
    format!("{}{}", SUITS[(minor / RANKS.len()) % SUITS.len()], RANKS[minor % RANKS.len()])
  }

  pub fn is_major(self) -> bool {
    self.0 < MAJOR_ARCANA.len()
  }

  pub fn suit(self) -> Option<usize> {
    (!self.is_major()).then(|| (self.0 - MAJOR_ARCANA.len()) / RANKS.len())
  }

  pub fn meaning(self) -> String {
    if self.is_major() {
      return MAJOR_MEANINGS[self.0].to_string();
    }
    let minor = self.0 - MAJOR_ARCANA.len();
    let suit = (minor / RANKS.len()) % SUITS.len();
    format!("关乎{}，{}", SUIT_THEMES[suit], RANK_NUANCE[minor % RANKS.len()])
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawnCard {
  pub card: Card,
  pub reversed: bool,
}

impl DrawnCard {
  pub fn label(&self) -> String {
    format!("{}（{}）", self.card.name(), if self.reversed { "逆位" } else { "正位" })
  }
}

/// Draw `spread.size()` distinct cards with an orientation each.
pub fn draw(seed: GenerationSeed, spread: Spread) -> Vec<DrawnCard> {
  let mut seq = seed.sequence();
  let picks = seq.distinct_indices(DECK_SIZE, spread.size());
  picks
    .into_iter()
    .map(|i| DrawnCard { card: Card(i), reversed: seq.chance(30) })
    .collect()
}

pub fn generate(seed: GenerationSeed, inputs: &Inputs) -> String {
  let spread = Spread::from_input(input(inputs, "spread"));
  let question = input(inputs, "question").unwrap_or("当前的处境");
  let cards = draw(seed, spread);
  let mut out = String::new();

  out.push_str("【牌阵】\n");
  let _ = writeln!(out, "咨询问题：{question}");
  let _ = writeln!(out, "牌阵：{}", spread.name());
  let labels: Vec<String> = cards.iter().map(DrawnCard::label).collect();
  let _ = write!(out, "抽到的牌：{}\n\n", labels.join("、"));

  out.push_str("【牌面解读】\n");
  for (pos, drawn) in spread.positions().iter().zip(cards.iter()) {
    let _ = write!(out, "{}位：{}\n{}", pos, drawn.label(), drawn.card.meaning());
    if drawn.reversed {
      out.push_str("。逆位时这股能量受阻或内化，需要先处理内在的犹豫。\n\n");
    } else {
      out.push_str("。正位时能量顺畅，可以积极借力。\n\n");
    }
  }

  out.push_str("【综合解读】\n");
  let majors = cards.iter().filter(|c| c.card.is_major()).count();
  let reversed = cards.iter().filter(|c| c.reversed).count();
  if majors * 2 >= cards.len() {
    out.push_str("大阿卡纳占据多数，说明此事牵涉人生层面的重要课题，外在力量的影响较大。");
  } else {
    out.push_str("小阿卡纳居多，说明局面更多取决于日常的选择与行动，主动权在您手中。");
  }
  if let Some(suit) = dominant_suit(&cards) {
    let _ = write!(out, "{}牌较为突出，焦点落在{}上。", SUITS[suit], SUIT_THEMES[suit]);
  }
  if reversed * 2 > cards.len() {
    out.push_str("逆位牌较多，近期宜放慢节奏，先理清思路再行动。\n\n");
  } else {
    out.push_str("整体牌面顺畅，保持开放的心态，机会会逐步显现。\n\n");
  }

  out.push_str("【建议】\n");
  out.push_str("1. 保持开放的心态，接纳新的机会和观点\n");
  out.push_str("2. 多听取他人意见，但最终决策应遵循内心指引\n");
  out.push_str("3. 不要急于做出重大决定，给自己足够的思考空间\n");
  out
}

fn dominant_suit(cards: &[DrawnCard]) -> Option<usize> {
  let mut counts = [0usize; 4];
  for c in cards {
    if let Some(s) = c.card.suit() {
      counts[s] += 1;
    }
  }
  let (best, n) = counts.iter().enumerate().max_by_key(|(_, n)| **n)?;
  (*n >= 2).then_some(best)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn deck_has_78_distinct_names() {
    let names: HashSet<String> = (0..DECK_SIZE).map(|i| Card(i).name()).collect();
    assert_eq!(DECK_SIZE, 78);
    assert_eq!(names.len(), 78);
    assert!(names.contains("高塔"));
    assert!(names.contains("星币国王"));
  }

  #[test]
  fn spread_sizes() {
    assert_eq!(Spread::from_input(None).size(), 3);
    assert_eq!(Spread::from_input(Some("五张牌阵")).size(), 5);
    assert_eq!(Spread::from_input(Some("六芒星")).size(), 6);
    assert_eq!(Spread::from_input(Some("凯尔特十字")).size(), 10);
    assert_eq!(Spread::from_input(Some("随便")).size(), 3);
  }

  #[test]
  fn draws_never_repeat_a_card() {
    for s in 0..500u32 {
      let cards = draw(GenerationSeed(s), Spread::CelticCross);
      let unique: HashSet<usize> = cards.iter().map(|c| c.card.0).collect();
      assert_eq!(unique.len(), 10, "seed {s}");
    }
  }

  #[test]
  fn output_lists_every_position() {
    let mut inputs = Inputs::new();
    inputs.insert("spread".into(), "五张牌阵".into());
    let text = generate(GenerationSeed(9), &inputs);
    for pos in Spread::FiveCard.positions() {
      assert!(text.contains(&format!("{pos}位：")), "{pos}");
    }
  }
}

//! ZhouYi hexagram casting.

use std::fmt::Write as _;

use crate::domain::{input, Inputs};
use crate::rng::GenerationSeed;

/// King Wen order: (name, keyword).
pub const HEXAGRAMS: [(&str, &str); 64] = [
  ("乾为天", "刚健自强"), ("坤为地", "厚德载物"), ("水雷屯", "万事起头难"), ("山水蒙", "启蒙求教"),
  ("水天需", "等待时机"), ("天水讼", "慎防争讼"), ("地水师", "统众用兵"), ("水地比", "亲近辅助"),
  ("风天小畜", "蓄养待进"), ("天泽履", "谨慎行事"), ("地天泰", "通泰安和"), ("天地否", "闭塞不通"),
  ("天火同人", "和同于人"), ("火天大有", "大有收获"), ("地山谦", "谦逊受益"), ("雷地豫", "安乐预备"),
  ("泽雷随", "随时而动"), ("山风蛊", "整治积弊"), ("地泽临", "居高临下"), ("风地观", "观察省思"),
  ("火雷噬嗑", "明断除障"), ("山火贲", "文饰修养"), ("山地剥", "剥落衰退"), ("地雷复", "一阳来复"),
  ("天雷无妄", "真实无妄"), ("山天大畜", "厚积薄发"), ("山雷颐", "颐养正道"), ("泽风大过", "过犹不及"),
  ("坎为水", "重重险难"), ("离为火", "附丽光明"), ("泽山咸", "感应相通"), ("雷风恒", "恒久不变"),
  ("天山遁", "退避保全"), ("雷天大壮", "壮盛勿骄"), ("火地晋", "晋升进取"), ("地火明夷", "韬光养晦"),
  ("风火家人", "家道和顺"), ("火泽睽", "异中求同"), ("水山蹇", "艰难险阻"), ("雷水解", "解除困境"),
  ("山泽损", "损下益上"), ("风雷益", "增益进取"), ("泽天夬", "果断决策"), ("天风姤", "不期而遇"),
  ("泽地萃", "荟萃聚集"), ("地风升", "积小成大"), ("泽水困", "困境守正"), ("水风井", "修德养民"),
  ("泽火革", "顺天革新"), ("火风鼎", "稳重图变"), ("震为雷", "临危不乱"), ("艮为山", "动静适时"),
  ("风山渐", "循序渐进"), ("雷泽归妹", "立家兴业"), ("雷火丰", "盛极防衰"), ("火山旅", "旅途谨慎"),
  ("巽为风", "谦逊受益"), ("兑为泽", "喜悦沟通"), ("风水涣", "拯救涣散"), ("水泽节", "节制有度"),
  ("风泽中孚", "诚信立身"), ("雷山小过", "行动宜小"), ("水火既济", "成功守成"), ("火水未济", "事业未竟"),
];

const LINE_NAMES: [&str; 6] = ["初爻", "二爻", "三爻", "四爻", "五爻", "上爻"];

const LINE_TEXTS: [&str; 6] = [
  "始而谨之，有大吉也。",
  "顺而止之，厚积薄发。",
  "观望为宜，静待时机。",
  "进退得宜，无往不利。",
  "刚柔相济，和而不同。",
  "物极必反，慎防变故。",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionTopic {
  Career,
  Relationship,
  Wealth,
  General,
}

impl QuestionTopic {
  pub fn classify(question: &str) -> Self {
    const CAREER: [&str; 6] = ["工作", "事业", "职业", "升职", "面试", "考试"];
    const LOVE: [&str; 6] = ["感情", "爱情", "婚姻", "恋爱", "对象", "复合"];
    const MONEY: [&str; 5] = ["财", "钱", "投资", "收入", "生意"];
    if CAREER.iter().any(|k| question.contains(k)) {
      QuestionTopic::Career
    } else if LOVE.iter().any(|k| question.contains(k)) {
      QuestionTopic::Relationship
    } else if MONEY.iter().any(|k| question.contains(k)) {
      QuestionTopic::Wealth
    } else {
      QuestionTopic::General
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Casting {
  /// 0-based King Wen index.
  pub hexagram: usize,
  /// 1-based changing lines, ascending, at most two.
  pub changing_lines: Vec<u8>,
}

impl Casting {
  pub fn name(&self) -> &'static str {
    HEXAGRAMS[self.hexagram % 64].0
  }

  pub fn keyword(&self) -> &'static str {
    HEXAGRAMS[self.hexagram % 64].1
  }
}

pub fn cast(seed: GenerationSeed) -> Casting {
  let mut seq = seed.sequence();
  let hexagram = seq.below(HEXAGRAMS.len());
  let count = seq.range(0, 2) as usize;
  let mut changing_lines: Vec<u8> = seq.distinct_indices(6, count).into_iter().map(|i| i as u8 + 1).collect();
  changing_lines.sort_unstable();
  Casting { hexagram, changing_lines }
}

pub fn generate(seed: GenerationSeed, inputs: &Inputs) -> String {
  let question = input(inputs, "question").unwrap_or("近期运势");
  let casting = cast(seed);
  let topic = QuestionTopic::classify(question);
  let mut out = String::new();

  out.push_str("【卦象】\n");
  let _ = writeln!(out, "所问：{question}");
  let _ = write!(out, "得第{}卦 {}，主{}。\n\n", casting.hexagram + 1, casting.name(), casting.keyword());

  out.push_str("【卦辞】\n");
  let _ = write!(
    out,
    "{}：{}之象。君子观此卦，当明{}之理，顺势而为，守正则吉。\n\n",
    casting.name(),
    casting.keyword(),
    casting.keyword()
  );

  out.push_str("【爻辞】\n");
  if casting.changing_lines.is_empty() {
    out.push_str("六爻安静，无动爻，以本卦卦辞为断，事态将按现有轨迹发展。\n\n");
  } else {
    for line in &casting.changing_lines {
      let i = usize::from(*line - 1);
      let _ = writeln!(out, "{}动：{}", LINE_NAMES[i], LINE_TEXTS[i]);
    }
    out.push_str("有动爻则事有变数，宜参看动爻之辞。\n\n");
  }

  out.push_str("【断语】\n");
  out.push_str(match topic {
    QuestionTopic::Career => "就事业而言，此卦提示稳中求进。眼下宜夯实基础，待时机成熟再谋突破，不宜贸然跳槽或冒进。",
    QuestionTopic::Relationship => "就感情而言，此卦重在真诚与沟通。彼此坦诚相待，关系可望稳步加深；若有误会，宜主动化解。",
    QuestionTopic::Wealth => "就财运而言，此卦宜守不宜攻。正财可期，偏财需慎，投资理财以稳健为先，避免孤注一掷。",
    QuestionTopic::General => "整体而言，此卦提示形势尚在变化之中，宜保持耐心，观察局势，顺势而为自然逢凶化吉。",
  });
  out.push_str("\n\n");

  out.push_str("【建议】\n");
  out.push_str("1. 保持耐心，等待适当时机再行动\n2. 多听取他人建议，集思广益\n3. 适当调整计划，灵活应对变化\n");
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn castings_are_in_range() {
    for s in 0..1000 {
      let c = cast(GenerationSeed(s));
      assert!(c.hexagram < 64);
      assert!(c.changing_lines.len() <= 2);
      assert!(c.changing_lines.iter().all(|l| (1..=6).contains(l)));
      if c.changing_lines.len() == 2 {
        assert_ne!(c.changing_lines[0], c.changing_lines[1]);
      }
    }
  }

  #[test]
  fn topic_classification() {
    assert_eq!(QuestionTopic::classify("明年换工作好吗"), QuestionTopic::Career);
    assert_eq!(QuestionTopic::classify("我们的感情"), QuestionTopic::Relationship);
    assert_eq!(QuestionTopic::classify("这笔投资"), QuestionTopic::Wealth);
    assert_eq!(QuestionTopic::classify("随便问问"), QuestionTopic::General);
  }

  #[test]
  fn career_question_gets_career_reading() {
    let mut inputs = Inputs::new();
    inputs.insert("question".into(), "工作前景".into());
    assert!(generate(GenerationSeed(5), &inputs).contains("就事业而言"));
  }
}

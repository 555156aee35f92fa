//! Generic fortune reading used by methods without a dedicated generator.

use std::fmt::Write as _;

use crate::domain::{input, Inputs};
use crate::rng::{GenerationSeed, SeededSequence};

const TRAITS: [&str; 10] = ["创造力", "领导力", "直觉", "耐心", "细心", "热情", "冷静", "理性", "感性", "随和"];
const ELEMENTS: [&str; 5] = ["金", "木", "水", "火", "土"];
const TRENDS: [&str; 5] = ["稳步上升", "波动起伏", "缓慢提升", "先抑后扬", "保持平稳"];

const CAREER_FIELDS: [&str; 10] = ["管理", "教育", "艺术", "科技", "医疗", "金融", "服务", "制造", "传媒", "法律"];
const CAREER_STAGES: [&str; 5] = ["起步", "成长", "稳定", "转型", "辉煌"];
const CAREER_ADVICE: [&str; 5] = [
  "建议持续学习新技能，提升专业能力",
  "适合大胆创新，尝试新的领域",
  "宜稳健发展，避免冒险",
  "可以寻求合作伙伴，共同发展",
  "应该加强人脉拓展，寻求贵人相助",
];

const WEALTH_LEVELS: [&str; 5] = ["较好", "波动较大", "稳步增长", "需要谨慎规划", "潜力巨大"];
const WEALTH_SOURCES: [&str; 4] = ["主要来自固定收入", "可通过投资获得额外收益", "有意外之财的可能", "需要勤劳积累"];
const WEALTH_ADVICE: [&str; 5] = [
  "适合投资理财",
  "宜稳健理财，避免风险投资",
  "可适当进行房产投资",
  "应优先偿还债务，稳固财务基础",
  "建议增加被动收入来源",
];

const LOVE_STATES: [&str; 5] = [
  "感情线条清晰但曲折",
  "感情发展较为平稳",
  "感情经历波折但最终圆满",
  "需要主动追求才能获得理想感情",
  "容易吸引异性但需谨慎选择",
];
const LOVE_TRAITS: [&str; 5] = [
  "您在感情中较为理想化",
  "您在感情中注重精神交流",
  "您在感情中渴望安全感",
  "您在感情中追求刺激与新鲜感",
  "您在感情中重视忠诚与信任",
];
const LOVE_ADVICE: [&str; 5] = [
  "需要找到理解您独立精神的伴侣",
  "适合与性格互补的人建立关系",
  "应该提高沟通能力，避免误解",
  "宜放下戒备，敞开心扉接受真爱",
  "建议多关注对方需求，增进感情和谐",
];

const HEALTH_STATES: [&str; 5] = ["总体良好", "需要注意保养", "有潜在隐患", "较为稳定", "需定期检查"];
const BODY_PARTS: [&str; 6] = ["呼吸系统", "消化系统", "神经系统", "心血管系统", "肌肉骨骼", "免疫系统"];
const HEALTH_ADVICE: [&str; 5] = [
  "建议保持规律作息，避免熬夜",
  "适当增加有氧运动，增强体质",
  "注意饮食均衡，少食多餐",
  "建议定期体检，预防疾病",
  "可尝试冥想或瑜伽，缓解压力",
];

const QUESTION_ADVICE: [&str; 5] = [
  "建议您保持耐心，时机尚未成熟",
  "目前情况对您有利，可以积极行动",
  "需要谨慎考虑各方面因素，不宜操之过急",
  "有贵人相助的迹象，可以寻求他人支持",
  "时机已到，可以果断决策",
];

pub const GENERAL_ADVICE: [&str; 10] = [
  "培养耐心和持续力，不要因短期困难放弃长远目标",
  "加强情绪管理，避免冲动决策",
  "建立健康的生活习惯，包括饮食、运动和休息",
  "学习财务规划，合理配置资产",
  "在人际关系中保持真诚，但也要有适当边界",
  "定期反思与调整，使人生方向与内心期望一致",
  "多与积极向上的人交往，远离负能量",
  "培养一项终身爱好，丰富精神世界",
  "学会感恩，保持积极乐观的心态",
  "关注精神成长，提升内在修养",
];

/// Base year for the "opportunity window" phrases.
const BASE_YEAR: u32 = 2024;

pub fn generate(seed: GenerationSeed, inputs: &Inputs) -> String {
  let mut seq = seed.sequence();
  let mut out = String::new();

  let name = input(inputs, "fullName");
  let birth = input(inputs, "birthDate");
  let time = input(inputs, "birthTime");
  let question = input(inputs, "question");
  let mentions = |words: &[&str]| inputs.values().any(|v| words.iter().any(|w| v.contains(w)));

  out.push_str("【总论】\n");
  if let Some(n) = name {
    let _ = write!(out, "{n}，");
  }
  match (birth, time) {
    (Some(b), Some(t)) => {
      let _ = write!(out, "根据您{b} {t}的出生信息，");
    }
    (Some(b), None) => {
      let _ = write!(out, "根据您{b}的出生信息，");
    }
    _ => out.push_str("根据分析，"),
  }
  let trait_count = seq.range(2, 4) as usize;
  let traits = seq.sample_strs(&TRAITS, trait_count);
  let strong = seq.below(ELEMENTS.len());
  let weak = (strong + 1 + seq.below(ELEMENTS.len() - 1)) % ELEMENTS.len();
  let _ = write!(
    out,
    "您的命盘显示较强的{}。五行中{}较旺，{}较弱。总体命运呈现{}的趋势，尤其在{}岁和{}岁将有重要转折。\n\n",
    traits.join("和"),
    ELEMENTS[strong],
    ELEMENTS[weak],
    seq.pick_str(&TRENDS),
    seq.range(25, 35),
    seq.range(40, 50),
  );

  out.push_str("【事业】\n");
  if mentions(&["事业", "职业", "工作"]) {
    let count = seq.range(2, 4) as usize;
    let _ = write!(out, "您适合从事{}等领域的工作。", seq.sample_strs(&CAREER_FIELDS, count).join("、"));
  } else {
    out.push_str("在事业发展上，");
  }
  let y1 = BASE_YEAR + seq.range(0, 3);
  let y2 = y1 + seq.range(1, 3);
  let _ = write!(
    out,
    "当前处于{}阶段，「{}年到{}年」有重要机遇，可能带来职业上的重要突破。{}。\n\n",
    seq.pick_str(&CAREER_STAGES),
    y1,
    y2,
    seq.pick_str(&CAREER_ADVICE),
  );

  out.push_str("【财运】\n");
  let _ = write!(
    out,
    "财运整体{}，{}。「{}年」财运较为旺盛，{}。\n\n",
    seq.pick_str(&WEALTH_LEVELS),
    seq.pick_str(&WEALTH_SOURCES),
    BASE_YEAR + seq.range(0, 2),
    seq.pick_str(&WEALTH_ADVICE),
  );

  out.push_str("【感情】\n");
  if mentions(&["感情", "爱情", "婚姻"]) || input(inputs, "gender").is_some() {
    let _ = write!(out, "{}，一生中可能经历{}段重要感情。", seq.pick_str(&LOVE_STATES), seq.range(1, 4));
  }
  let _ = write!(out, "{}，{}。\n\n", seq.pick_str(&LOVE_TRAITS), seq.pick_str(&LOVE_ADVICE));

  out.push_str("【健康】\n");
  let _ = write!(
    out,
    "健康状况{}，需特别关注{}的保养。{}。\n\n",
    seq.pick_str(&HEALTH_STATES),
    seq.pick_str(&BODY_PARTS),
    seq.pick_str(&HEALTH_ADVICE),
  );

  out.push_str("【建议】\n");
  if let Some(q) = question {
    let _ = write!(out, "关于“{}”的问题，{}。\n", q, seq.pick_str(&QUESTION_ADVICE));
  }
  out.push_str(&numbered_advice(&mut seq, 4, 6));
  out
}

/// Numbered list of `lo..=hi` distinct general advice lines.
pub fn numbered_advice(seq: &mut SeededSequence, lo: u32, hi: u32) -> String {
  let count = seq.range(lo, hi) as usize;
  seq
    .sample_strs(&GENERAL_ADVICE, count)
    .iter()
    .enumerate()
    .map(|(i, a)| format!("{}. {}\n", i + 1, a))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn has_six_titled_blocks() {
    let text = generate(GenerationSeed(77), &Inputs::new());
    for t in ["【总论】", "【事业】", "【财运】", "【感情】", "【健康】", "【建议】"] {
      assert!(text.contains(t), "missing {t}");
    }
    assert_eq!(text.matches('【').count(), 6);
  }

  #[test]
  fn question_is_echoed_in_advice() {
    let mut inputs = Inputs::new();
    inputs.insert("question".into(), "换工作".into());
    let text = generate(GenerationSeed(3), &inputs);
    assert!(text.contains("关于“换工作”的问题"));
    assert!(text.contains("您适合从事"));
  }

  #[test]
  fn strong_and_weak_elements_differ() {
    for s in 0..200 {
      let text = generate(GenerationSeed(s), &Inputs::new());
      let strong = text.split("五行中").nth(1).and_then(|t| t.chars().next());
      let weak = text.split("较旺，").nth(1).and_then(|t| t.chars().next());
      assert_ne!(strong, weak, "seed {s}");
    }
  }
}

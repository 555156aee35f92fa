//! Keyword-table readings: dreams, numerology, qimen, face and palm.
//!
//! Each matches the free-text input against a fixed symbol table and falls back
//! to a generic interpretation when nothing matches.

use std::fmt::Write as _;

use chrono::Datelike;

use crate::calendar::parse_date;
use crate::domain::{input, Inputs};
use crate::generators::fortune::numbered_advice;
use crate::generators::hexagram::QuestionTopic;
use crate::rng::{GenerationSeed, SeededSequence};

/// (keywords, interpretation)
type SymbolTable = [(&'static [&'static str], &'static str)];

const DREAM_SYMBOLS: &SymbolTable = &[
  (&["水", "海", "河", "湖", "游泳"], "水在梦中通常象征情感和潜意识。平静的水代表心灵的平和，汹涌的水则暗示情绪的动荡。"),
  (&["飞", "天空", "翅膀"], "飞翔的梦境常与自由、超越限制有关，反映您渴望摆脱现实约束，追求更高目标。"),
  (&["追", "跑", "逃"], "被追赶的梦通常反映现实中的压力或回避某些问题，潜意识在提醒您直面困难。"),
  (&["蛇"], "蛇象征蜕变与隐秘的力量，也可能预示财运或需要警惕身边的小人。"),
  (&["牙", "掉牙"], "梦见掉牙多与焦虑、失去掌控感有关，提示您关注身体状况与家人关系。"),
  (&["考试", "考场"], "考试梦反映对评价与表现的担忧，说明您正面临某种需要证明自己的处境。"),
  (&["钱", "金子", "财"], "梦见钱财象征自我价值与资源，提示近期对物质安全感的关注。"),
  (&["火", "燃烧"], "火象征热情与转变，也可能代表压抑的怒气需要找到出口。"),
  (&["坠", "掉下", "摔"], "坠落的梦常见于缺乏安全感或对局面失控的担心。"),
  (&["房子", "家", "屋"], "房屋象征自我与内心结构，不同房间代表人格的不同侧面。"),
  (&["婴儿", "孩子"], "婴儿象征新的开始、新计划或内心纯真的一面。"),
  (&["死", "去世"], "梦见死亡多数并非凶兆，而是象征旧阶段的结束与新阶段的开始。"),
];

const DREAM_PSYCHE: [&str; 4] = [
  "这个梦可能与近期生活变化有关，或者反映了长期积累的情绪需要释放。",
  "梦境作为潜意识的窗口，提示您关注被忽视的内心需求。",
  "梦中的情绪感受往往比情节更能揭示您当下的心理状态。",
  "这类梦常在压力较大时出现，说明身心需要适当放松。",
];

pub fn dream(seed: GenerationSeed, inputs: &Inputs) -> String {
  let content = input(inputs, "dreamContent").or_else(|| input(inputs, "content")).unwrap_or("您的梦境");
  let mut seq = seed.sequence();
  let matched = match_symbols(DREAM_SYMBOLS, content, 3);
  let mut out = String::new();

  out.push_str("【梦境解析】\n");
  let _ = writeln!(out, "梦境内容：{content}");
  if matched.is_empty() {
    out.push_str("您的梦境内容包含多层次象征意义，梦中出现的人物、场景和情境都是内心世界的反映，值得深入探索。\n\n");
  } else {
    for m in &matched {
      out.push_str(m);
      out.push('\n');
    }
    out.push('\n');
  }

  out.push_str("【传统解读】\n");
  out.push_str("在中国传统解梦学中，梦境被视为预兆和警示。《周公解梦》认为梦是阴阳二气交感的结果，不同的梦境象征着不同的吉凶预示。\n\n");

  out.push_str("【心理分析】\n");
  out.push_str(seq.pick_str(&DREAM_PSYCHE));
  out.push_str("\n\n");

  out.push_str("【建议】\n");
  out.push_str("1. 保持梦境日记，记录并观察模式\n2. 关注梦境中的情绪，而非仅关注内容\n3. 尝试冥想或放松练习，减轻潜在压力\n");
  out
}

const NUMBER_MEANINGS: [(u32, &str); 11] = [
  (1, "独立、开创与领导"),
  (2, "合作、敏感与协调"),
  (3, "表达、创意与乐观"),
  (4, "稳定、秩序与务实"),
  (5, "自由、变化与冒险"),
  (6, "责任、关爱与家庭"),
  (7, "思考、探索与灵性"),
  (8, "力量、成就与财富"),
  (9, "博爱、理想与奉献"),
  (11, "直觉、启发与精神引领"),
  (22, "宏大愿景与实干建设"),
];

/// Digit sum reduced to 1-9, keeping the master numbers 11 and 22.
pub fn reduce_number(mut n: u32) -> u32 {
  while n > 9 && n != 11 && n != 22 {
    n = digit_sum(n);
  }
  n
}

fn digit_sum(mut n: u32) -> u32 {
  let mut s = 0;
  while n > 0 {
    s += n % 10;
    n /= 10;
  }
  s
}

/// Pythagorean letter value; CJK and other characters fold their code point.
fn letter_value(ch: char) -> u32 {
  if ch.is_ascii_alphabetic() {
    (ch.to_ascii_lowercase() as u32 - 'a' as u32) % 9 + 1
  } else {
    (ch as u32) % 9 + 1
  }
}

fn is_vowel(ch: char) -> bool {
  matches!(ch.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

fn number_meaning(n: u32) -> &'static str {
  NUMBER_MEANINGS.iter().find(|(k, _)| *k == n).map(|(_, m)| *m).unwrap_or("平衡与成长")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoreNumbers {
  pub life_path: Option<u32>,
  pub expression: Option<u32>,
  pub soul_urge: Option<u32>,
}

pub fn core_numbers(name: Option<&str>, birth: Option<chrono::NaiveDate>) -> CoreNumbers {
  let life_path = birth.map(|d| reduce_number(digit_sum(d.year().unsigned_abs()) + digit_sum(d.month()) + digit_sum(d.day())));
  let letters: Vec<char> = name.map(|n| n.chars().filter(|c| !c.is_whitespace()).collect()).unwrap_or_default();
  let expression = (!letters.is_empty()).then(|| reduce_number(letters.iter().map(|c| letter_value(*c)).sum()));
  let vowels: u32 = letters.iter().filter(|c| is_vowel(**c)).map(|c| letter_value(*c)).sum();
  let soul_urge = (vowels > 0).then(|| reduce_number(vowels));
  CoreNumbers { life_path, expression, soul_urge }
}

pub fn numerology(seed: GenerationSeed, inputs: &Inputs) -> String {
  let mut seq = seed.sequence();
  let name = input(inputs, "fullName");
  let birth = input(inputs, "birthDate").and_then(|raw| parse_date("birthDate", raw).ok());
  let numbers = core_numbers(name, birth);
  let mut out = String::new();

  out.push_str("【核心数字】\n");
  if let Some(n) = name {
    let _ = writeln!(out, "姓名：{n}");
  }
  let show = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_else(|| "—".to_string());
  let _ = write!(
    out,
    "生命灵数：{}  表达数：{}  灵魂数：{}\n\n",
    show(numbers.life_path),
    show(numbers.expression),
    show(numbers.soul_urge)
  );

  out.push_str("【生命灵数】\n");
  match numbers.life_path {
    Some(n) => {
      let _ = write!(out, "您的生命灵数为{}，代表{}。这是您此生最核心的课题与天赋方向。\n\n", n, number_meaning(n));
    }
    None => out.push_str("未提供有效的出生日期，生命灵数暂以整体能量解读：当前处于积累与调整的周期。\n\n"),
  }

  out.push_str("【表达与灵魂】\n");
  if let Some(n) = numbers.expression {
    let _ = writeln!(out, "表达数{}：外在表现为{}。", n, number_meaning(n));
  }
  match numbers.soul_urge {
    Some(n) => {
      let _ = writeln!(out, "灵魂数{}：内心渴望{}。", n, number_meaning(n));
    }
    None => out.push_str("灵魂数需要拉丁字母拼写的元音计算，可补充拼音全名以获得更完整的解读。\n"),
  }
  out.push('\n');

  out.push_str("【建议】\n");
  out.push_str(&numbered_advice(&mut seq, 3, 4));
  out
}

const GATES: [(&str, &str); 8] = [
  ("休门", "吉"), ("生门", "吉"), ("伤门", "凶"), ("杜门", "凶"),
  ("景门", "平"), ("死门", "凶"), ("惊门", "凶"), ("开门", "吉"),
];
const STARS: [&str; 9] = ["天蓬", "天芮", "天冲", "天辅", "天禽", "天心", "天柱", "天任", "天英"];
const SPIRITS: [&str; 8] = ["值符", "腾蛇", "太阴", "六合", "白虎", "玄武", "九地", "九天"];

pub fn qimen(seed: GenerationSeed, inputs: &Inputs) -> String {
  let mut seq = seed.sequence();
  let question = input(inputs, "question").unwrap_or("近期运势");
  let when = input(inputs, "date").and_then(|raw| parse_date("date", raw).ok());
  let yang = when.map(|d| !(6..=11).contains(&d.month())).unwrap_or_else(|| seq.chance(50));
  let ju = seq.range(1, 9);
  let (gate, luck) = GATES[seq.below(GATES.len())];
  let star = seq.pick_str(&STARS);
  let spirit = seq.pick_str(&SPIRITS);
  let mut out = String::new();

  out.push_str("【起局】\n");
  let _ = writeln!(out, "所问：{question}");
  let _ = write!(out, "{}遁{}局，值使落{}，值符{}，临{}。\n\n", if yang { "阳" } else { "阴" }, ju, gate, star, spirit);

  out.push_str("【门星神】\n");
  let _ = write!(out, "{gate}为{luck}门。");
  out.push_str(match luck {
    "吉" => "门吉则事易成，宜主动出击。",
    "凶" => "门凶则多阻滞，宜守不宜攻。",
    _ => "门平则成败参半，关键在于时机。",
  });
  let _ = write!(out, "{star}星主事，{spirit}护佑，");
  out.push_str(if matches!(spirit, "白虎" | "玄武" | "腾蛇") { "需防口舌是非与意外变数。\n\n" } else { "贵人暗助，可借外力。\n\n" });

  out.push_str("【断事】\n");
  out.push_str(match QuestionTopic::classify(question) {
    QuestionTopic::Career => "所问事业，宜看开门与值符。当前格局提示先稳住阵脚，再寻突破口，贵人多在东南方向。",
    QuestionTopic::Relationship => "所问感情，宜看六合。彼此需要更多耐心与包容，主动沟通可化解隔阂。",
    QuestionTopic::Wealth => "所问财运，宜看生门。求财宜正不宜偏，合作生财胜于单打独斗。",
    QuestionTopic::General => "综观全局，吉凶参半。顺势而为，避开凶方，择吉时行事则可趋吉避凶。",
  });
  out.push_str("\n\n");

  out.push_str("【建议】\n");
  out.push_str(&numbered_advice(&mut seq, 3, 4));
  out
}

const FACE_FEATURES: &SymbolTable = &[
  (&["额头", "天庭"], "额头饱满开阔，主聪明才智，早年运势较好，思维清晰。"),
  (&["眉"], "眉毛清晰有力，主决断力强，重情义，兄弟朋友缘佳。"),
  (&["眼", "目"], "眼神明亮有神，主心思敏锐，洞察力强，做事专注。"),
  (&["鼻"], "鼻梁挺直，主中年财运稳健，自尊心强，有主见。"),
  (&["嘴", "唇"], "唇形端正，主言语得体，人缘好，晚年有福。"),
  (&["耳"], "耳廓厚实，主福泽深厚，性格稳重，少年得志。"),
  (&["下巴", "下颌"], "下巴圆润，主晚运安稳，家庭和睦，执行力强。"),
];

const PALM_LINES: &SymbolTable = &[
  (&["生命线"], "生命线长而清晰，主体魄强健、精力充沛。"),
  (&["智慧线", "头脑线"], "智慧线平直延伸，主思维理性、善于分析。"),
  (&["感情线"], "感情线深长，主重情重义，在感情中注重稳定和忠诚。"),
  (&["事业线", "命运线"], "事业线明显，主事业有成，中年后发展更佳。"),
  (&["婚姻线"], "婚姻线清晰，主姻缘稳定，伴侣关系和谐。"),
  (&["手掌", "掌"], "掌形厚实，主财运稳固，为人踏实可靠。"),
];

const FACE_DEFAULTS: [&str; 3] = [
  "面相整体协调，五官端正，主性格稳重、处事得体。",
  "气色明润，主近期运势平顺，宜把握机会。",
  "面部轮廓分明，主意志坚定，有较强的领导潜质。",
];

const PALM_DEFAULTS: [&str; 3] = [
  "掌纹整体清晰，主身体健康、精力旺盛。",
  "三大主线分布均衡，主人生发展平稳，少有大起大落。",
  "掌中纹路细密，主心思细腻、感受力强。",
];

pub fn face(seed: GenerationSeed, inputs: &Inputs) -> String {
  feature_reading(seed, inputs, "面相解读", FACE_FEATURES, &FACE_DEFAULTS, "面相")
}

pub fn palmistry(seed: GenerationSeed, inputs: &Inputs) -> String {
  feature_reading(seed, inputs, "手相解读", PALM_LINES, &PALM_DEFAULTS, "手相")
}

fn feature_reading(
  seed: GenerationSeed,
  inputs: &Inputs,
  heading: &str,
  table: &SymbolTable,
  defaults: &[&'static str],
  subject: &str,
) -> String {
  let mut seq = seed.sequence();
  let description = input(inputs, "description").unwrap_or("");
  let mut matched = match_symbols(table, description, 4);
  if matched.is_empty() {
    matched = seq.sample_strs(defaults, 2);
  }
  let mut out = String::new();

  let _ = writeln!(out, "【{heading}】");
  if !description.is_empty() {
    let _ = writeln!(out, "您的描述：{description}");
  }
  for m in &matched {
    out.push_str(m);
    out.push('\n');
  }
  out.push('\n');

  out.push_str("【性格分析】\n");
  let _ = write!(out, "从{subject}来看，{}\n\n", trait_summary(&mut seq));

  out.push_str("【建议】\n");
  out.push_str(&numbered_advice(&mut seq, 3, 4));
  out
}

fn trait_summary(seq: &mut SeededSequence) -> &'static str {
  const TRAITS: [&str; 4] = [
    "您性格坚毅果断，有较强的领导能力和责任感。",
    "您为人温和，善解人意，人际关系融洽。",
    "您思维活跃，富有创意，适合开拓新领域。",
    "您踏实稳重，做事有条理，值得信赖。",
  ];
  seq.pick_str(&TRAITS)
}

/// Interpretations whose keywords occur in `text`, in table order, at most `limit`.
fn match_symbols(table: &SymbolTable, text: &str, limit: usize) -> Vec<&'static str> {
  table
    .iter()
    .filter(|(keys, _)| keys.iter().any(|k| text.contains(k)))
    .map(|(_, meaning)| *meaning)
    .take(limit)
    .collect()
}

//! Method registry: one profile per divination method, looked up by id.
//!
//! A profile carries everything that varies per method (input fields, seed
//! policy, generator, timeout, prompt text, expected section titles) so no
//! other module needs to branch on a method id string.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{parse_date, parse_hour};
use crate::config::{PromptConfig, TimeoutConfig};
use crate::domain::{input, Inputs};
use crate::error::DivinationError;
use crate::generators::GeneratorKind;
use crate::mbti;
use crate::rng::GenerationSeed;
use crate::util::fill_template;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodId {
  Bazi,
  Almanac,
  Ziwei,
  Zhouyi,
  Qimen,
  Dream,
  Face,
  Palmistry,
  Tarot,
  Astrology,
  Numerology,
  Mbti,
}

impl MethodId {
  pub const ALL: [MethodId; 12] = [
    MethodId::Bazi,
    MethodId::Almanac,
    MethodId::Ziwei,
    MethodId::Zhouyi,
    MethodId::Qimen,
    MethodId::Dream,
    MethodId::Face,
    MethodId::Palmistry,
    MethodId::Tarot,
    MethodId::Astrology,
    MethodId::Numerology,
    MethodId::Mbti,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      MethodId::Bazi => "bazi",
      MethodId::Almanac => "almanac",
      MethodId::Ziwei => "ziwei",
      MethodId::Zhouyi => "zhouyi",
      MethodId::Qimen => "qimen",
      MethodId::Dream => "dream",
      MethodId::Face => "face",
      MethodId::Palmistry => "palmistry",
      MethodId::Tarot => "tarot",
      MethodId::Astrology => "astrology",
      MethodId::Numerology => "numerology",
      MethodId::Mbti => "mbti",
    }
  }
}

impl fmt::Display for MethodId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for MethodId {
  type Err = DivinationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim().to_ascii_lowercase();
    MethodId::ALL
      .into_iter()
      .find(|m| m.as_str() == wanted)
      .ok_or_else(|| DivinationError::UnknownMethod { id: s.to_string() })
  }
}

/// Traditional methods get a poem section in front of their reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
  Traditional,
  Western,
  Psychological,
}

/// Where a method's reading comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingSource {
  /// External completion first, local generator as the fallback.
  Completion,
  /// Computed locally; never simulated, never disclaimed.
  Local,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
  Text,
  Date,
  Time,
  Choice,
  /// Questionnaire answers, one integer per question.
  Answers,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct InputField {
  pub id: &'static str,
  pub label: &'static str,
  pub kind: FieldKind,
  pub required: bool,
  pub options: &'static [&'static str],
}

impl InputField {
  const fn new(id: &'static str, label: &'static str, kind: FieldKind, required: bool) -> Self {
    Self { id, label, kind, required, options: &[] }
  }

  const fn choice(id: &'static str, label: &'static str, required: bool, options: &'static [&'static str]) -> Self {
    Self { id, label, kind: FieldKind::Choice, required, options }
  }
}

/// Where a method's generation seed comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedPolicy {
  /// Date hash of the named date field.
  Date(&'static str),
  /// Method id plus all inputs, stable for one calendar day.
  Text,
  /// Fresh per request.
  Clock,
}

impl SeedPolicy {
  pub fn derive(self, method: MethodId, inputs: &Inputs, today: NaiveDate) -> Result<GenerationSeed, DivinationError> {
    match self {
      SeedPolicy::Date(field) => {
        let raw = input(inputs, field).ok_or_else(|| DivinationError::invalid_input(field, ""))?;
        Ok(GenerationSeed::from_date(parse_date(field, raw)?))
      }
      SeedPolicy::Text => {
        let joined = inputs.values().map(|v| v.trim()).collect::<Vec<_>>().join("|");
        Ok(GenerationSeed::from_text(method.as_str(), &joined, today))
      }
      SeedPolicy::Clock => Ok(GenerationSeed::from_clock()),
    }
  }
}

#[derive(Clone, Debug)]
pub struct MethodProfile {
  pub id: MethodId,
  pub name: &'static str,
  pub description: &'static str,
  pub family: Family,
  pub source: ReadingSource,
  pub fields: &'static [InputField],
  pub seed: SeedPolicy,
  pub generator: GeneratorKind,
  pub timeout: Duration,
  pub prompt_intro: &'static str,
  /// Expected section titles, in order. Also the parser's heading markers.
  pub sections: &'static [&'static str],
}

impl MethodProfile {
  pub fn is_traditional(&self) -> bool {
    self.family == Family::Traditional
  }

  pub fn is_local(&self) -> bool {
    self.source == ReadingSource::Local
  }

  pub fn seed_for(&self, inputs: &Inputs, today: NaiveDate) -> Result<GenerationSeed, DivinationError> {
    self.seed.derive(self.id, inputs, today)
  }
}

const GENDERS: &[&str] = &["男", "女"];

const BIRTH_HOURS: &[&str] = &[
  "子时(23:00-01:00)",
  "丑时(01:00-03:00)",
  "寅时(03:00-05:00)",
  "卯时(05:00-07:00)",
  "辰时(07:00-09:00)",
  "巳时(09:00-11:00)",
  "午时(11:00-13:00)",
  "未时(13:00-15:00)",
  "申时(15:00-17:00)",
  "酉时(17:00-19:00)",
  "戌时(19:00-21:00)",
  "亥时(21:00-23:00)",
];

const SPREADS: &[&str] = &["三张牌阵", "五张牌阵", "六芒星牌阵", "凯尔特十字牌阵"];

const BAZI_FIELDS: &[InputField] = &[
  InputField::new("birthDate", "出生日期", FieldKind::Date, true),
  InputField::new("birthTime", "出生时间", FieldKind::Time, false),
  InputField::choice("gender", "性别", true, GENDERS),
];
const ALMANAC_FIELDS: &[InputField] = &[InputField::new("date", "查询日期", FieldKind::Date, true)];
const ZIWEI_FIELDS: &[InputField] = &[
  InputField::new("birthDate", "出生日期", FieldKind::Date, true),
  InputField::choice("birthTime", "出生时辰", true, BIRTH_HOURS),
  InputField::choice("gender", "性别", true, GENDERS),
];
const ZHOUYI_FIELDS: &[InputField] = &[InputField::new("question", "所问之事", FieldKind::Text, true)];
const QIMEN_FIELDS: &[InputField] = &[
  InputField::new("question", "所问之事", FieldKind::Text, true),
  InputField::new("date", "起局日期", FieldKind::Date, false),
];
const DREAM_FIELDS: &[InputField] = &[InputField::new("dreamContent", "梦境内容", FieldKind::Text, true)];
const FACE_FIELDS: &[InputField] = &[InputField::new("description", "面部特征描述", FieldKind::Text, true)];
const PALM_FIELDS: &[InputField] = &[InputField::new("description", "手掌纹路描述", FieldKind::Text, true)];
const TAROT_FIELDS: &[InputField] = &[
  InputField::new("question", "您的问题", FieldKind::Text, true),
  InputField::choice("spread", "牌阵", false, SPREADS),
];
const ASTROLOGY_FIELDS: &[InputField] = &[
  InputField::new("birthDate", "出生日期", FieldKind::Date, true),
  InputField::new("birthTime", "出生时间", FieldKind::Time, false),
  InputField::new("birthPlace", "出生地点", FieldKind::Text, false),
];
const MBTI_FIELDS: &[InputField] = &[InputField::new(mbti::ANSWERS_FIELD, "答题结果", FieldKind::Answers, true)];
const NUMEROLOGY_FIELDS: &[InputField] = &[
  InputField::new("fullName", "姓名", FieldKind::Text, true),
  InputField::new("birthDate", "出生日期", FieldKind::Date, true),
];

const FORTUNE_SECTIONS: &[&str] = &["总论", "事业", "财运", "感情", "健康", "建议"];
const BAZI_SECTIONS: &[&str] = &["八字命盘", "五行分析", "性格分析", "事业分析", "财运分析", "感情分析", "健康分析", "总结"];
const ALMANAC_SECTIONS: &[&str] = &["今日概览", "宜", "忌", "吉凶方位", "时辰吉凶", "胎神冲煞", "星宿五行", "总结"];
const ZHOUYI_SECTIONS: &[&str] = &["卦象", "卦辞", "爻辞", "断语", "建议"];
const QIMEN_SECTIONS: &[&str] = &["起局", "门星神", "断事", "建议"];
const DREAM_SECTIONS: &[&str] = &["梦境解析", "传统解读", "心理分析", "建议"];
const FACE_SECTIONS: &[&str] = &["面相解读", "性格分析", "建议"];
const PALM_SECTIONS: &[&str] = &["手相解读", "性格分析", "建议"];
const TAROT_SECTIONS: &[&str] = &["牌阵", "牌面解读", "综合解读", "建议"];
const ASTROLOGY_SECTIONS: &[&str] = &["星盘描述", "太阳月亮上升", "相位分析", "事业发展", "人际关系", "建议"];
const NUMEROLOGY_SECTIONS: &[&str] = &["核心数字", "生命灵数", "表达与灵魂", "建议"];

fn builtin(id: MethodId) -> MethodProfile {
  let secs = Duration::from_secs;
  let (name, description, family, fields, seed, generator, timeout, prompt_intro, sections) = match id {
    MethodId::Bazi => (
      "八字命理",
      "根据出生年月日时推算命运",
      Family::Traditional,
      BAZI_FIELDS,
      SeedPolicy::Text,
      GeneratorKind::Bazi,
      secs(120),
      "请根据以下出生信息排出四柱八字，分析五行强弱，并解读性格、事业、财运、感情与健康：",
      BAZI_SECTIONS,
    ),
    MethodId::Almanac => (
      "老黄历",
      "查询每日宜忌、吉凶方位和时辰信息",
      Family::Traditional,
      ALMANAC_FIELDS,
      SeedPolicy::Date("date"),
      GeneratorKind::Almanac,
      secs(90),
      "请给出以下日期的黄历信息，包括农历、宜忌、吉凶方位、时辰吉凶、胎神与冲煞：",
      ALMANAC_SECTIONS,
    ),
    MethodId::Ziwei => (
      "紫微斗数",
      "通过星盘分析人生运势",
      Family::Traditional,
      ZIWEI_FIELDS,
      SeedPolicy::Text,
      GeneratorKind::Fortune,
      secs(90),
      "请根据以下信息排出紫微命盘，解读命宫主星与各宫位运势：",
      FORTUNE_SECTIONS,
    ),
    MethodId::Zhouyi => (
      "周易卦象",
      "易经六十四卦预测",
      Family::Traditional,
      ZHOUYI_FIELDS,
      SeedPolicy::Clock,
      GeneratorKind::Hexagram,
      secs(90),
      "请为以下问题起卦，给出本卦、变爻、卦辞与爻辞，并结合问题给出断语：",
      ZHOUYI_SECTIONS,
    ),
    MethodId::Qimen => (
      "奇门遁甲",
      "以九宫八门推演时机与方位",
      Family::Traditional,
      QIMEN_FIELDS,
      SeedPolicy::Text,
      GeneratorKind::Qimen,
      secs(90),
      "请为以下问题起一局奇门，分析值符值使、八门九星与吉凶方位：",
      QIMEN_SECTIONS,
    ),
    MethodId::Dream => (
      "周公解梦",
      "解析梦境寓意与预示",
      Family::Traditional,
      DREAM_FIELDS,
      SeedPolicy::Text,
      GeneratorKind::Dream,
      secs(80),
      "请解析以下梦境，说明其中的象征意义与可能的预示：",
      DREAM_SECTIONS,
    ),
    MethodId::Face => (
      "面相分析",
      "从五官与气色解读性格和运势",
      Family::Traditional,
      FACE_FIELDS,
      SeedPolicy::Text,
      GeneratorKind::Face,
      secs(70),
      "请根据以下面部特征描述进行面相分析：",
      FACE_SECTIONS,
    ),
    MethodId::Palmistry => (
      "手相分析",
      "从掌纹与掌形解读性格和运势",
      Family::Traditional,
      PALM_FIELDS,
      SeedPolicy::Text,
      GeneratorKind::Palmistry,
      secs(70),
      "请根据以下手掌纹路描述进行手相分析：",
      PALM_SECTIONS,
    ),
    MethodId::Tarot => (
      "塔罗牌",
      "通过塔罗牌阵解读命运",
      Family::Western,
      TAROT_FIELDS,
      SeedPolicy::Clock,
      GeneratorKind::Tarot,
      secs(80),
      "请为以下问题抽取塔罗牌，说明每张牌的位置含义与正逆位，并给出综合解读：",
      TAROT_SECTIONS,
    ),
    MethodId::Astrology => (
      "占星学",
      "星盘解读与行星运势",
      Family::Western,
      ASTROLOGY_FIELDS,
      SeedPolicy::Text,
      GeneratorKind::Astrology,
      secs(80),
      "请根据以下出生信息绘制本命星盘，并解读行星落座与相位：",
      ASTROLOGY_SECTIONS,
    ),
    MethodId::Numerology => (
      "数字命理学",
      "通过数字揭示命运密码",
      Family::Western,
      NUMEROLOGY_FIELDS,
      SeedPolicy::Text,
      GeneratorKind::Numerology,
      secs(90),
      "请根据以下姓名与生日计算生命灵数、表达数与灵魂数，并逐一解读：",
      NUMEROLOGY_SECTIONS,
    ),
    MethodId::Mbti => (
      "MBTI人格测试",
      "通过60道问题分析你的16型人格",
      Family::Psychological,
      MBTI_FIELDS,
      SeedPolicy::Text,
      GeneratorKind::Mbti,
      secs(30),
      "请根据以下60道题的答题结果（-3至3分）分析人格类型：",
      mbti::PROFILE_SECTIONS,
    ),
  };
  let source = match generator {
    GeneratorKind::Mbti => ReadingSource::Local,
    _ => ReadingSource::Completion,
  };
  MethodProfile { id, name, description, family, source, fields, seed, generator, timeout, prompt_intro, sections }
}

/// All method profiles, built once at startup.
#[derive(Clone, Debug)]
pub struct MethodRegistry {
  profiles: Vec<MethodProfile>,
}

impl Default for MethodRegistry {
  fn default() -> Self {
    Self::new(&TimeoutConfig::default())
  }
}

impl MethodRegistry {
  pub fn new(timeouts: &TimeoutConfig) -> Self {
    let profiles = MethodId::ALL
      .into_iter()
      .map(|id| {
        let mut p = builtin(id);
        p.timeout = timeouts.resolve(id.as_str(), p.timeout);
        p
      })
      .collect();
    Self { profiles }
  }

  pub fn get(&self, id: MethodId) -> &MethodProfile {
    // profiles are built from MethodId::ALL in order
    &self.profiles[MethodId::ALL.iter().position(|m| *m == id).unwrap_or(0)]
  }

  pub fn lookup(&self, raw: &str) -> Result<&MethodProfile, DivinationError> {
    Ok(self.get(raw.parse()?))
  }

  pub fn iter(&self) -> impl Iterator<Item = &MethodProfile> {
    self.profiles.iter()
  }
}

/// Required fields must be present; dates, times and choices must be readable.
pub fn validate_inputs(profile: &MethodProfile, inputs: &Inputs) -> Result<(), DivinationError> {
  for field in profile.fields {
    let Some(value) = input(inputs, field.id) else {
      if field.required {
        return Err(DivinationError::invalid_input(field.id, inputs.get(field.id).map_or("", String::as_str)));
      }
      continue;
    };
    match field.kind {
      FieldKind::Date => {
        parse_date(field.id, value)?;
      }
      FieldKind::Time if parse_hour(value).is_none() => return Err(DivinationError::invalid_input(field.id, value)),
      FieldKind::Choice if !field.options.is_empty() && !field.options.contains(&value) => {
        return Err(DivinationError::invalid_input(field.id, value))
      }
      FieldKind::Answers => {
        mbti::parse_answers(value)?;
      }
      _ => {}
    }
  }
  Ok(())
}

const CHART_INSTRUCTIONS: &str = "【星盘描述】部分必须逐行列出12个星体位置和5到7个相位，格式严格如下：\n\
太阳位于白羊座15度\n\
太阳和木星形成三分相(120度)\n\
相位只能是合相、六分相、四分相、三分相、对分相之一，同一对行星只写一次。\n";

/// Prompt text for the completion endpoint. A configured template for the
/// method replaces the built-in instructions; the output format block is
/// always appended so the reply stays parseable.
pub fn build_prompt(profile: &MethodProfile, inputs: &Inputs, prompts: &PromptConfig) -> String {
  let mut out = match prompts.templates.get(profile.id.as_str()) {
    Some(tpl) => {
      let mut pairs: Vec<(&str, &str)> = inputs.iter().map(|(k, v)| (k.as_str(), v.trim())).collect();
      pairs.push(("method", profile.name));
      let mut s = fill_template(tpl, &pairs);
      s.push('\n');
      s
    }
    None => {
      let mut s = format!("请作为一个专业的{}分析师，{}\n", profile.name, profile.prompt_intro);
      for field in profile.fields {
        if let Some(value) = input(inputs, field.id) {
          s.push_str(&format!("{}：{}\n", field.label, value));
        }
      }
      s
    }
  };
  out.push('\n');
  if profile.id == MethodId::Astrology {
    out.push_str(CHART_INSTRUCTIONS);
  }
  out.push_str("请按以下格式输出，每个部分以【标题】开头：\n");
  for title in profile.sections {
    out.push_str(&format!("【{title}】\n"));
  }
  out
}

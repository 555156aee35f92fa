//! Personality questionnaire: a fixed question bank and a deterministic scorer.
//!
//! Each answer is an integer in `-3..=3` (strongly disagree .. strongly agree),
//! multiplied by its question's direction and summed per dimension. A positive
//! sum selects the first pole (E, N, F, P), zero or below the second
//! (I, S, T, J). No randomness is involved.

use serde::Serialize;

use crate::domain::{input, Inputs, Section};
use crate::error::DivinationError;
use crate::parser::render_sections;

pub const BANK_VERSION: &str = "1.0.0";
pub const ANSWERS_FIELD: &str = "answers";
pub const ANSWER_MIN: i8 = -3;
pub const ANSWER_MAX: i8 = 3;

pub const TYPE_TITLE: &str = "人格类型";
pub const DIMENSIONS_TITLE: &str = "维度倾向";
pub const PROFILE_SECTIONS: &[&str] = &[TYPE_TITLE, DIMENSIONS_TITLE, "优势", "劣势", "适合职业", "人际关系", "成长建议"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Dimension {
  Ei,
  Sn,
  Tf,
  Jp,
}

/// One end of a dimension: type letter and label.
type Pole = (char, &'static str);

impl Dimension {
  pub const ALL: [Dimension; 4] = [Dimension::Ei, Dimension::Sn, Dimension::Tf, Dimension::Jp];

  pub fn label(self) -> &'static str {
    match self {
      Dimension::Ei => "外向/内向",
      Dimension::Sn => "感觉/直觉",
      Dimension::Tf => "思考/情感",
      Dimension::Jp => "判断/感知",
    }
  }

  /// (pole for a positive score, pole otherwise)
  fn poles(self) -> (Pole, Pole) {
    match self {
      Dimension::Ei => (('E', "外向"), ('I', "内向")),
      Dimension::Sn => (('N', "直觉"), ('S', "感觉")),
      Dimension::Tf => (('F', "情感"), ('T', "思考")),
      Dimension::Jp => (('P', "感知"), ('J', "判断")),
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Question {
  pub id: u16,
  pub text: &'static str,
  pub dimension: Dimension,
  /// `1` when agreeing moves toward the first pole, `-1` otherwise.
  pub direction: i8,
}

const fn q(id: u16, text: &'static str, dimension: Dimension, direction: i8) -> Question {
  Question { id, text, dimension, direction }
}

use Dimension::{Ei, Jp, Sn, Tf};

pub const QUESTIONS: [Question; 60] = [
  q(1, "在聚会上我通常会主动结识新朋友。", Ei, 1),
  q(2, "独处一段时间后我才能恢复精力。", Ei, -1),
  q(3, "我喜欢在团队中边讨论边思考。", Ei, 1),
  q(4, "我更愿意通过文字而不是电话沟通。", Ei, -1),
  q(5, "成为众人关注的焦点让我感到自在。", Ei, 1),
  q(6, "周末我更想待在家里而不是出门社交。", Ei, -1),
  q(7, "我很容易和陌生人聊起来。", Ei, 1),
  q(8, "在发言之前我习惯先在心里想清楚。", Ei, -1),
  q(9, "热闹的环境让我充满活力。", Ei, 1),
  q(10, "我的朋友圈子小而亲密。", Ei, -1),
  q(11, "遇到问题时我喜欢马上找人商量。", Ei, 1),
  q(12, "长时间社交之后我会感到疲惫。", Ei, -1),
  q(13, "我乐于在公开场合表达自己的观点。", Ei, 1),
  q(14, "我常常被人形容为安静、内敛。", Ei, -1),
  q(15, "结束一天的工作后，我更想约朋友聚一聚。", Ei, 1),
  q(16, "我更关注事物背后的可能性而不是眼前的细节。", Sn, 1),
  q(17, "我信任亲身经历胜过直觉预感。", Sn, -1),
  q(18, "我喜欢思考抽象的理论和概念。", Sn, 1),
  q(19, "做事时我习惯按照已验证的方法一步步来。", Sn, -1),
  q(20, "我经常想象未来会是什么样子。", Sn, 1),
  q(21, "我对具体的数字和事实记得很清楚。", Sn, -1),
  q(22, "比喻和象征比直白的描述更能打动我。", Sn, 1),
  q(23, "我更喜欢实用的技能而不是新奇的点子。", Sn, -1),
  q(24, "我常常在看似无关的事物之间发现联系。", Sn, 1),
  q(25, "阅读说明书时我会逐条仔细看完。", Sn, -1),
  q(26, "我容易对重复性的工作感到厌倦。", Sn, 1),
  q(27, "我更相信眼见为实。", Sn, -1),
  q(28, "我喜欢尝试前所未有的做法。", Sn, 1),
  q(29, "描述一件事时我会先讲清楚具体经过。", Sn, -1),
  q(30, "我常常沉浸在自己的想法和灵感中。", Sn, 1),
  q(31, "做决定时我会优先考虑他人的感受。", Tf, 1),
  q(32, "我认为公平比照顾情面更重要。", Tf, -1),
  q(33, "别人的情绪很容易影响到我。", Tf, 1),
  q(34, "讨论问题时我更看重逻辑是否严密。", Tf, -1),
  q(35, "我宁可委婉一些也不愿让别人难堪。", Tf, 1),
  q(36, "发现别人的错误时我会直接指出。", Tf, -1),
  q(37, "和谐的氛围对我来说非常重要。", Tf, 1),
  q(38, "我常用利弊分析来做选择。", Tf, -1),
  q(39, "我容易被感人的故事打动。", Tf, 1),
  q(40, "我觉得规则应该对所有人一视同仁。", Tf, -1),
  q(41, "朋友遇到困难时，我首先想到的是安慰而不是给出方案。", Tf, 1),
  q(42, "争论时我更在意谁对谁错。", Tf, -1),
  q(43, "我做事常常以价值观和信念为出发点。", Tf, 1),
  q(44, "我能够在做艰难决定时保持冷静客观。", Tf, -1),
  q(45, "看到别人受委屈我会感同身受。", Tf, 1),
  q(46, "我喜欢保持选择的开放，而不是过早定下计划。", Jp, 1),
  q(47, "我习惯提前安排好日程。", Jp, -1),
  q(48, "临时改变计划并不会让我不安。", Jp, 1),
  q(49, "任务没完成之前我很难放松下来。", Jp, -1),
  q(50, "我常常在截止日期前才集中精力完成工作。", Jp, 1),
  q(51, "我的房间和桌面通常整洁有序。", Jp, -1),
  q(52, "我喜欢随性而为的旅行。", Jp, 1),
  q(53, "我会列清单来管理待办事项。", Jp, -1),
  q(54, "规矩太多会让我感到束缚。", Jp, 1),
  q(55, "我喜欢事情尽快有个明确的结论。", Jp, -1),
  q(56, "我常常同时开始好几件事。", Jp, 1),
  q(57, "按时完成是我做事的基本原则。", Jp, -1),
  q(58, "我更享受过程而不是结果。", Jp, 1),
  q(59, "没有计划的一天会让我感到焦虑。", Jp, -1),
  q(60, "我能很快适应突如其来的变化。", Jp, 1),
];

/// Answers in question order, comma or whitespace separated, one per question.
pub fn parse_answers(raw: &str) -> Result<Vec<i8>, DivinationError> {
  let invalid = || DivinationError::invalid_input(ANSWERS_FIELD, raw);
  let answers = raw
    .split(|c: char| c == ',' || c == '，' || c.is_whitespace())
    .filter(|t| !t.is_empty())
    .map(|t| t.parse::<i8>().ok().filter(|v| (ANSWER_MIN..=ANSWER_MAX).contains(v)))
    .collect::<Option<Vec<i8>>>()
    .ok_or_else(invalid)?;
  if answers.len() != QUESTIONS.len() {
    return Err(invalid());
  }
  Ok(answers)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Scores {
  pub ei: i32,
  pub sn: i32,
  pub tf: i32,
  pub jp: i32,
}

impl Scores {
  pub fn get(&self, dim: Dimension) -> i32 {
    match dim {
      Dimension::Ei => self.ei,
      Dimension::Sn => self.sn,
      Dimension::Tf => self.tf,
      Dimension::Jp => self.jp,
    }
  }

  fn slot(&mut self, dim: Dimension) -> &mut i32 {
    match dim {
      Dimension::Ei => &mut self.ei,
      Dimension::Sn => &mut self.sn,
      Dimension::Tf => &mut self.tf,
      Dimension::Jp => &mut self.jp,
    }
  }

  pub fn type_code(&self) -> String {
    Dimension::ALL
      .iter()
      .map(|d| {
        let (first, second) = d.poles();
        if self.get(*d) > 0 { first.0 } else { second.0 }
      })
      .collect()
  }

  /// Lean toward the first pole, 0-100.
  pub fn percentage(&self, dim: Dimension) -> u8 {
    let max = dimension_max(dim);
    if max == 0 {
      return 50;
    }
    ((self.get(dim) + max) * 100 / (2 * max)).clamp(0, 100) as u8
  }

  /// e.g. `67% 外向 (E)`; the named pole always matches the type letter.
  pub fn label(&self, dim: Dimension) -> String {
    let pct = self.percentage(dim);
    let (first, second) = dim.poles();
    if self.get(dim) > 0 {
      format!("{pct}% {} ({})", first.1, first.0)
    } else {
      format!("{}% {} ({})", 100 - pct, second.1, second.0)
    }
  }
}

fn dimension_max(dim: Dimension) -> i32 {
  QUESTIONS.iter().filter(|q| q.dimension == dim).count() as i32 * i32::from(ANSWER_MAX)
}

/// Sums `answer * direction` per dimension. Answers beyond the bank are ignored.
pub fn score(answers: &[i8]) -> Scores {
  let mut scores = Scores::default();
  for (question, answer) in QUESTIONS.iter().zip(answers) {
    *scores.slot(question.dimension) += i32::from(*answer) * i32::from(question.direction);
  }
  scores
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Analyst,
  Diplomat,
  Sentinel,
  Explorer,
}

impl Role {
  pub fn label(self) -> &'static str {
    match self {
      Role::Analyst => "分析师",
      Role::Diplomat => "外交官",
      Role::Sentinel => "守护者",
      Role::Explorer => "探险家",
    }
  }

  /// NT analysts, NF diplomats, SJ sentinels, SP explorers.
  pub fn for_code(code: &str) -> Role {
    let letters: Vec<char> = code.chars().collect();
    match letters.as_slice() {
      [_, 'N', 'T', _] => Role::Analyst,
      [_, 'N', _, _] => Role::Diplomat,
      [_, _, _, 'J'] => Role::Sentinel,
      _ => Role::Explorer,
    }
  }
}

#[derive(Clone, Copy, Debug)]
pub struct PersonalityType {
  pub code: &'static str,
  pub name: &'static str,
  pub description: &'static str,
  pub strengths: &'static [&'static str],
  pub weaknesses: &'static [&'static str],
  pub careers: &'static [&'static str],
  pub relationships: &'static str,
  pub growth: &'static str,
}

impl PersonalityType {
  pub fn role(&self) -> Role {
    Role::for_code(self.code)
  }
}

pub const TYPES: [PersonalityType; 16] = [
  PersonalityType {
    code: "INTJ",
    name: "建筑师",
    description: "独立而富有远见的战略家，习惯先构建全局蓝图再逐步落实，对知识和能力有持续的追求。",
    strengths: &["逻辑清晰，善于长远规划", "独立自主，意志坚定", "学习能力强，追求专业深度"],
    weaknesses: &["容易忽视他人情绪", "标准过高，难以妥协", "对重复执行缺乏耐心"],
    careers: &["战略规划", "系统架构", "科学研究", "投资分析"],
    relationships: "重视关系的深度而非广度，表达情感较含蓄，但对认定的人十分忠诚，需要对方尊重其独处空间。",
    growth: "在决策中多考虑人的因素，适当放低对自己和他人的要求，学会享受过程。",
  },
  PersonalityType {
    code: "INTP",
    name: "逻辑学家",
    description: "好奇心旺盛的思考者，喜欢拆解问题、探究原理，常在抽象概念中找到乐趣。",
    strengths: &["分析能力出众", "思维开放，富有创见", "客观冷静，不易受情绪左右"],
    weaknesses: &["过度分析，迟迟难以决断", "对日常琐事缺乏耐心", "不擅长表达感受"],
    careers: &["软件开发", "数据分析", "理论研究", "技术写作"],
    relationships: "珍视能激发思考的交流，亲密关系中看似疏离，实际上非常在意对方。",
    growth: "给想法设定落地的期限，把理论转化为行动，同时多关注身边人的情绪需求。",
  },
  PersonalityType {
    code: "ENTJ",
    name: "指挥官",
    description: "果断自信的领导者，擅长组织资源、设定目标并推动团队达成结果。",
    strengths: &["决策果断，执行力强", "善于统筹与激励他人", "目标明确，效率至上"],
    weaknesses: &["容易显得强势", "对低效缺乏包容", "忽略团队的情感状态"],
    careers: &["企业管理", "创业", "管理咨询", "项目统筹"],
    relationships: "在关系中坦率直接，期待共同成长，需要学会在亲密关系里放下主导角色。",
    growth: "多倾听不同意见，放慢节奏体察他人感受，把耐心当作领导力的一部分。",
  },
  PersonalityType {
    code: "ENTP",
    name: "辩论家",
    description: "机敏灵活的创新者，热爱挑战既有观念，总能从新角度提出可能性。",
    strengths: &["思维敏捷，点子丰富", "善于辩论与说服", "适应变化能力强"],
    weaknesses: &["兴趣转移快，难以坚持", "容易忽略细节", "争辩时可能伤人"],
    careers: &["产品创新", "市场策划", "创业", "法律"],
    relationships: "喜欢充满新鲜感和思想碰撞的关系，需要伴侣能跟上其跳跃的思路。",
    growth: "选定少数方向深耕到底，在辩论之外学会体贴地表达。",
  },
  PersonalityType {
    code: "INFJ",
    name: "提倡者",
    description: "安静而理想主义的引导者，洞察人心，愿意为信念和他人的成长默默付出。",
    strengths: &["洞察力强，善解人意", "有原则，有使命感", "富有创造力"],
    weaknesses: &["对自己要求过严", "容易情绪透支", "不愿表露真实需求"],
    careers: &["心理咨询", "教育", "写作", "公益组织"],
    relationships: "追求真诚深入的连接，对伴侣投入很多，也需要被理解和回应。",
    growth: "学会设立边界，照顾自己的感受，接受理想与现实之间的差距。",
  },
  PersonalityType {
    code: "INFP",
    name: "调停者",
    description: "温和而富有想象力的理想主义者，以内在价值观为指引，追求真实的自我表达。",
    strengths: &["共情能力强", "价值观坚定", "富有创意和想象力"],
    weaknesses: &["容易过度理想化", "面对冲突倾向回避", "行动力有时不足"],
    careers: &["文学创作", "设计", "心理辅导", "社会工作"],
    relationships: "重视灵魂层面的契合，温柔体贴，但需要对方给予足够的安全感。",
    growth: "把理想拆成可执行的小步骤，练习直面分歧并表达真实想法。",
  },
  PersonalityType {
    code: "ENFJ",
    name: "主人公",
    description: "热情而有感染力的引领者，善于凝聚人心，乐于帮助他人发挥潜能。",
    strengths: &["沟通与激励能力强", "责任心重", "善于协调人际关系"],
    weaknesses: &["过于在意他人评价", "容易忽视自身需求", "有时替别人做决定"],
    careers: &["培训讲师", "人力资源", "公共关系", "团队管理"],
    relationships: "全心投入、体贴周到，期待关系中有相互的付出与肯定。",
    growth: "允许别人按自己的节奏成长，也给自己留出休息和独处的时间。",
  },
  PersonalityType {
    code: "ENFP",
    name: "竞选者",
    description: "热情奔放、充满好奇的探索者，能在生活的各个角落发现意义和乐趣。",
    strengths: &["热情乐观，感染力强", "想象力丰富", "善于建立人际连接"],
    weaknesses: &["注意力容易分散", "不喜欢例行事务", "情绪起伏较大"],
    careers: &["品牌营销", "媒体传播", "咨询顾问", "创意策划"],
    relationships: "真诚热烈，喜欢与伴侣一起探索新事物，需要关系中的自由与新鲜感。",
    growth: "为热情配上计划与收尾，学会在兴致减退时依然把事情做完。",
  },
  PersonalityType {
    code: "ISTJ",
    name: "物流师",
    description: "踏实可靠的执行者，尊重规则和事实，做事有条理，言出必行。",
    strengths: &["责任心强，值得信赖", "注重细节，条理分明", "坚持不懈"],
    weaknesses: &["不太适应突发变化", "表达情感较少", "对新方法持保留态度"],
    careers: &["财务审计", "行政管理", "工程技术", "法务"],
    relationships: "以实际行动表达关心，稳定忠诚，欣赏同样守信的伴侣。",
    growth: "尝试接纳不同的做事方式，多用语言表达自己的感受。",
  },
  PersonalityType {
    code: "ISFJ",
    name: "守卫者",
    description: "温和细心的守护者，默默照顾身边的人，重视传统与稳定。",
    strengths: &["体贴周到", "勤恳可靠", "记忆力好，注重细节"],
    weaknesses: &["不善拒绝", "容易压抑不满", "对变化感到不安"],
    careers: &["医疗护理", "教育", "行政支持", "客户服务"],
    relationships: "以照顾和陪伴表达爱意，需要对方看见并珍惜这些付出。",
    growth: "练习说出自己的需求，把对别人的体贴也分一些给自己。",
  },
  PersonalityType {
    code: "ESTJ",
    name: "总经理",
    description: "务实高效的组织者，善于建立秩序，重视规则、效率和结果。",
    strengths: &["组织能力强", "执行力出色", "坦率直接，立场清晰"],
    weaknesses: &["可能显得固执", "不擅长处理情绪问题", "对不同意见缺乏耐心"],
    careers: &["运营管理", "项目管理", "公务管理", "银行金融"],
    relationships: "可靠负责，重视承诺与家庭，需要学习在关系中多一些柔软。",
    growth: "在坚持标准的同时倾听他人的理由，给灵活性留出空间。",
  },
  PersonalityType {
    code: "ESFJ",
    name: "执政官",
    description: "热心合群的照顾者，善于营造和谐氛围，乐于为集体付出。",
    strengths: &["热情友善", "善于合作", "责任感强"],
    weaknesses: &["过分在意他人看法", "回避冲突", "难以接受批评"],
    careers: &["人力资源", "教育", "医疗服务", "活动组织"],
    relationships: "体贴而投入，喜欢稳定温暖的关系，需要伴侣的肯定与回应。",
    growth: "建立不依赖外界认可的自我评价，学会坦然面对分歧。",
  },
  PersonalityType {
    code: "ISTP",
    name: "鉴赏家",
    description: "冷静务实的动手派，喜欢弄清事物如何运作，面对突发状况反应敏捷。",
    strengths: &["动手能力强", "临危不乱", "善于解决实际问题"],
    weaknesses: &["不喜欢长期承诺", "情感表达较少", "容易对规则不耐烦"],
    careers: &["机械工程", "技术维修", "应急救援", "运动相关"],
    relationships: "尊重彼此的独立，用行动而非言语表达关心。",
    growth: "为长期目标做一些规划，尝试更主动地分享内心感受。",
  },
  PersonalityType {
    code: "ISFP",
    name: "探险家",
    description: "温柔而敏感的艺术家，活在当下，用自己的方式感受和表达美。",
    strengths: &["审美敏锐", "温和包容", "适应力强"],
    weaknesses: &["不擅长长远规划", "回避冲突", "容易自我怀疑"],
    careers: &["艺术设计", "摄影", "园艺", "康复理疗"],
    relationships: "真诚温柔，重视彼此的感受与自由，不喜欢被控制。",
    growth: "为自己的热爱设定方向，勇敢表达立场而不只是退让。",
  },
  PersonalityType {
    code: "ESTP",
    name: "企业家",
    description: "精力充沛的行动派，善于把握眼前机会，在变化和挑战中如鱼得水。",
    strengths: &["行动迅速", "观察敏锐", "善于随机应变"],
    weaknesses: &["容易冲动", "缺乏长期耐心", "忽视潜在风险"],
    careers: &["销售", "创业", "体育", "危机处理"],
    relationships: "风趣直接，喜欢一起行动和冒险，需要学会经营长期的稳定。",
    growth: "行动前多想一步后果，培养对长期目标的耐心。",
  },
  PersonalityType {
    code: "ESFP",
    name: "表演者",
    description: "活泼开朗的乐天派，享受当下，善于带动气氛，让身边的人感到快乐。",
    strengths: &["乐观热情", "人缘好", "善于观察他人需要"],
    weaknesses: &["容易分心", "不喜欢规划", "回避严肃话题"],
    careers: &["演艺", "旅游服务", "活动策划", "销售"],
    relationships: "热情慷慨，喜欢分享生活的乐趣，需要在关系中也面对严肃议题。",
    growth: "为未来做一些准备，在快乐之外也学会处理压力和冲突。",
  },
];

pub fn personality(code: &str) -> Option<&'static PersonalityType> {
  TYPES.iter().find(|t| t.code == code)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
  pub type_code: String,
  pub scores: Scores,
}

pub fn assess(answers: &[i8]) -> Assessment {
  let scores = score(answers);
  Assessment { type_code: scores.type_code(), scores }
}

fn bullets(items: &[&str]) -> String {
  items.iter().map(|s| format!("• {s}")).collect::<Vec<_>>().join("\n")
}

/// Profile sections in [`PROFILE_SECTIONS`] order.
pub fn profile_sections(assessment: &Assessment) -> Vec<Section> {
  let dims = Dimension::ALL
    .iter()
    .map(|d| format!("{}：{}", d.label(), assessment.scores.label(*d)))
    .collect::<Vec<_>>()
    .join("\n");
  let Some(t) = personality(&assessment.type_code) else {
    return vec![Section::new(TYPE_TITLE, assessment.type_code.clone()), Section::new(DIMENSIONS_TITLE, dims)];
  };
  vec![
    Section::new(TYPE_TITLE, format!("{} · {}（{}）\n{}", t.code, t.name, t.role().label(), t.description)),
    Section::new(DIMENSIONS_TITLE, dims),
    Section::new("优势", bullets(t.strengths)),
    Section::new("劣势", bullets(t.weaknesses)),
    Section::new("适合职业", t.careers.join("、")),
    Section::new("人际关系", t.relationships),
    Section::new("成长建议", t.growth),
  ]
}

/// Scores the `answers` input and renders the profile in the bracket layout.
pub fn generate(inputs: &Inputs) -> Result<String, DivinationError> {
  let raw = input(inputs, ANSWERS_FIELD).ok_or_else(|| DivinationError::invalid_input(ANSWERS_FIELD, ""))?;
  let answers = parse_answers(raw)?;
  Ok(render_sections(&profile_sections(&assess(&answers))))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  fn leaning(sign: i8) -> Vec<i8> {
    QUESTIONS.iter().map(|q| 3 * q.direction * sign).collect()
  }

  #[test]
  fn bank_is_balanced() {
    for dim in Dimension::ALL {
      let qs: Vec<_> = QUESTIONS.iter().filter(|q| q.dimension == dim).collect();
      assert_eq!(qs.len(), 15, "{dim:?}");
      assert!(qs.iter().any(|q| q.direction == 1) && qs.iter().any(|q| q.direction == -1));
    }
    let ids: HashSet<u16> = QUESTIONS.iter().map(|q| q.id).collect();
    assert_eq!(ids.len(), QUESTIONS.len());
  }

  #[test]
  fn full_agreement_with_each_first_pole() {
    let a = assess(&leaning(1));
    assert_eq!(a.type_code, "ENFP");
    assert_eq!(a.scores, Scores { ei: 45, sn: 45, tf: 45, jp: 45 });
    assert_eq!(a.scores.percentage(Dimension::Ei), 100);
    assert_eq!(a.scores.label(Dimension::Ei), "100% 外向 (E)");
  }

  #[test]
  fn full_agreement_with_each_second_pole() {
    let a = assess(&leaning(-1));
    assert_eq!(a.type_code, "ISTJ");
    assert_eq!(a.scores.percentage(Dimension::Jp), 0);
    assert_eq!(a.scores.label(Dimension::Jp), "100% 判断 (J)");
  }

  #[test]
  fn neutral_answers_fall_to_second_pole() {
    let a = assess(&[0; 60]);
    assert_eq!(a.type_code, "ISTJ");
    assert_eq!(a.scores.percentage(Dimension::Tf), 50);
    assert_eq!(a.scores.label(Dimension::Tf), "50% 思考 (T)");
  }

  #[test]
  fn answers_are_parsed_strictly() {
    let ok = vec!["1"; 60].join(",");
    assert_eq!(parse_answers(&ok).unwrap(), vec![1; 60]);
    let spaced = vec!["-2"; 60].join(" ");
    assert_eq!(parse_answers(&spaced).unwrap().len(), 60);
    assert!(parse_answers(&vec!["1"; 59].join(",")).is_err());
    assert!(parse_answers(&vec!["4"; 60].join(",")).is_err());
    assert!(parse_answers("a,b").is_err());
  }

  #[test]
  fn every_type_code_has_a_profile_and_role() {
    let codes: HashSet<&str> = TYPES.iter().map(|t| t.code).collect();
    assert_eq!(codes.len(), 16);
    assert_eq!(personality("INTJ").unwrap().role(), Role::Analyst);
    assert_eq!(personality("ENFP").unwrap().role(), Role::Diplomat);
    assert_eq!(personality("ESTJ").unwrap().role(), Role::Sentinel);
    assert_eq!(personality("ISFP").unwrap().role(), Role::Explorer);
  }

  #[test]
  fn profile_follows_section_order() {
    let sections = profile_sections(&assess(&leaning(1)));
    let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, PROFILE_SECTIONS);
    assert!(sections[0].content.starts_with("ENFP · 竞选者（外交官）"));
    assert!(sections.iter().all(Section::is_valid));
  }

  #[test]
  fn generate_is_deterministic() {
    let mut inputs = Inputs::new();
    inputs.insert(ANSWERS_FIELD.into(), vec!["2"; 60].join(","));
    assert_eq!(generate(&inputs).unwrap(), generate(&inputs).unwrap());
    assert!(generate(&Inputs::new()).is_err());
  }
}

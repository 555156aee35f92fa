//! Built-in static content: last-resort templates and disclaimer text.
//!
//! These guarantee a readable result even when no generator can run and no
//! external service is configured.

use crate::generators::GeneratorKind;
use crate::util::fill_template;

/// Title of the section that marks locally simulated output.
pub const DISCLAIMER_TITLE: &str = "提示";

const SIMULATION_NOTICE: &str = "此结果由本地算法生成，并非外部服务输出。外部调用未成功，原因：{reason}\n\
可能原因：\n1. 网络连接不稳定\n2. API密钥未设置或无效\n3. 服务器暂时不可用\n\n\
建议：检查网络连接并配置有效的API密钥以获取更准确的解读结果。";

const RECOVERY_NOTICE: &str = "该{method}记录的内容已丢失或为空，以下为系统自动恢复的通用说明。\
原始的记录编号、创建时间与输入信息均已保留，您可以使用相同信息重新进行一次解读。";

const CORRUPT_NOTICE: &str = "该记录的数据已损坏，无法读取原始内容。记录编号已保留以便删除或重新生成。";

/// Disclaimer prepended to simulated readings.
pub fn simulation_notice(reason: &str) -> String {
  fill_template(SIMULATION_NOTICE, &[("reason", reason)])
}

pub fn recovery_notice(method_name: &str) -> String {
  fill_template(RECOVERY_NOTICE, &[("method", method_name)])
}

pub fn corrupt_notice() -> &'static str {
  CORRUPT_NOTICE
}

/// Generic explanatory sections about a method, used when a stored result
/// has lost its content.
pub fn method_overview(method_name: &str, description: &str) -> Vec<(String, String)> {
  vec![
    (format!("关于{method_name}"), format!("{method_name}：{description}。")),
    (
      "使用说明".to_string(),
      "解读结果基于您提供的信息生成，仅供娱乐与参考。输入越完整，解读越具体。".to_string(),
    ),
    (
      "建议".to_string(),
      "1. 确认输入信息准确无误\n2. 重新发起一次解读以获得完整内容\n3. 理性看待结果，命运掌握在自己手中".to_string(),
    ),
  ]
}

/// Simplest fixed text per generator, in the bracket layout.
pub fn static_fallback(kind: GeneratorKind) -> String {
  let body = match kind {
    GeneratorKind::Almanac => concat!(
      "【今日运势】\n普通日，宜守成，不宜冒进。\n\n",
      "【宜忌提示】\n宜：祭祀、出行、安床\n忌：动土、诉讼、开仓\n\n",
      "【总结】\n今天运势一般，建议谨慎行事，按部就班即可。\n",
    ),
    GeneratorKind::Bazi => concat!(
      "【八字分析】\n根据您的八字信息，您具有较强的领导能力和创造力。\n\n",
      "【总结】\n近期运势较为平稳，建议把握机会，稳步发展。\n",
    ),
    GeneratorKind::Hexagram => concat!(
      "【卦象解析】\n您所得卦象显示当前形势变化多端，宜谨慎行事。\n\n",
      "【爻辞解读】\n初爻：始而谨之，有大吉也。\n上爻：物极必反，慎防变故。\n\n",
      "【建议】\n保持耐心，等待适当时机再行动。\n",
    ),
    GeneratorKind::Astrology => concat!(
      "【星盘分析】\n近期木星进入有利位置，与您的事业宫形成良好相位。\n\n",
      "【建议】\n把握有利时机，感情中多沟通，财务上量入为出。\n",
    ),
    GeneratorKind::Tarot => concat!(
      "【塔罗牌阵】\n您抽到的塔罗牌为：愚者、星星、世界。这组牌面展示了新的开始与圆满的可能。\n\n",
      "【建议】\n保持开放的心态，接纳新的机会和观点。\n",
    ),
    GeneratorKind::Dream => concat!(
      "【梦境解析】\n梦境是潜意识的表达，反映了内心深处的愿望与担忧。\n\n",
      "【建议】\n保持梦境日记，关注梦中的情绪感受。\n",
    ),
    GeneratorKind::Numerology => concat!(
      "【数字能量】\n您的生命数字暗示着您具有领导能力和创造力。\n\n",
      "【建议】\n发挥自身优势，把握发展机会。\n",
    ),
    GeneratorKind::Qimen => concat!(
      "【起局】\n当前局势吉凶参半，宜顺势而为。\n\n",
      "【建议】\n择吉时行事，避开凶方。\n",
    ),
    GeneratorKind::Face => concat!(
      "【面相解读】\n额头饱满，代表聪明才智；眉毛清晰有力，暗示决断力强。\n\n",
      "【建议】\n发挥领导才能，注意情绪管理。\n",
    ),
    GeneratorKind::Palmistry => concat!(
      "【手相解读】\n生命线长而清晰，预示健康长寿；事业线明显，暗示事业有成。\n\n",
      "【建议】\n保持健康生活方式，在事业上继续努力。\n",
    ),
    GeneratorKind::Mbti => concat!(
      "【人格类型】\n答题结果不完整，暂时无法判定人格类型。\n\n",
      "【成长建议】\n请完整回答全部题目后重新提交。\n",
    ),
    GeneratorKind::Fortune => concat!(
      "【分析结果】\n根据您提供的信息，此次解读暂时无法完成。请稍后再试。\n\n",
      "【建议】\n请稍后再尝试，或者尝试其他解读方式。\n",
    ),
  };
  body.to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn notices_fill_placeholders() {
    assert!(simulation_notice("timeout").contains("原因：timeout"));
    assert!(recovery_notice("塔罗牌").starts_with("该塔罗牌记录"));
  }

  #[test]
  fn overview_has_three_sections() {
    let v = method_overview("周易卦象", "以六十四卦推演吉凶");
    assert_eq!(v.len(), 3);
    assert!(v.iter().all(|(t, c)| !t.is_empty() && !c.trim().is_empty()));
  }
}

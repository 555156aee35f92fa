//! Pre-written eight-line verses used as the opening section of traditional readings.

use crate::rng::GenerationSeed;

pub const POEMS: [[&str; 8]; 6] = [
  [
    "天地玄黄运自长", "一轮明月照八方", "春风化雨滋万物", "秋实累累满庭香",
    "莫道前路多险阻", "心怀正气自安康", "守得云开见日出", "福泽绵延岁月长",
  ],
  [
    "山高水远路漫漫", "步步为营不畏难", "紫气东来添祥瑞", "金鳞化龙跃深潭",
    "知进知退明大义", "宜静宜动守心安", "贵人相助逢佳运", "花开富贵满家园",
  ],
  [
    "星移斗转自有时", "万事随缘莫强持", "竹报平安家和睦", "梅开五福喜相知",
    "勤耕方得千钟粟", "厚德能承百福枝", "今朝若问前程事", "柳暗花明正此时",
  ],
  [
    "晨钟暮鼓韵悠扬", "心若止水意自长", "云中白鹤寻仙路", "江上轻舟渡夕阳",
    "莫因小利失大道", "当以诚心换吉祥", "时来运转终有日", "一片丹心照四方",
  ],
  [
    "乾坤朗朗日月明", "四时有序万象新", "龙腾沧海风云会", "凤鸣高岗瑞气临",
    "事业如松根底固", "情缘似水润无声", "财源广进随缘至", "福寿安康伴此身",
  ],
  [
    "静观花落又花开", "得失从容莫挂怀", "一念清明通古今", "千般际遇自安排",
    "青山不老常相伴", "绿水长流福运来", "但守初心行正道", "前程似锦展襟怀",
  ],
];

/// Pick a verse for `theme`; the seed decides which.
pub fn compose(seed: GenerationSeed, theme: &str) -> String {
  let mut seq = seed.sequence();
  let lines = POEMS[seq.below(POEMS.len())];
  let mut out = String::new();
  for pair in lines.chunks(2) {
    out.push_str(&pair.join("，"));
    out.push_str("。\n");
  }
  if !theme.trim().is_empty() {
    out.push_str(&format!("（题：{}）", theme.trim()));
  }
  out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn verse_has_eight_lines_in_four_couplets() {
    let text = compose(GenerationSeed(12), "事业 财运");
    let couplets: Vec<&str> = text.lines().filter(|l| l.ends_with('。')).collect();
    assert_eq!(couplets.len(), 4);
    assert_eq!(couplets.iter().map(|c| c.matches('，').count()).sum::<usize>(), 4);
    assert!(text.ends_with("（题：事业 财运）"));
  }

  #[test]
  fn seed_selects_deterministically() {
    assert_eq!(compose(GenerationSeed(5), "x"), compose(GenerationSeed(5), "x"));
  }
}

//! Theme keywords for the poem section: most frequent CJK bigrams, minus stopwords.

use std::collections::HashMap;

use crate::domain::Section;
use crate::util::is_cjk;

const STOP_CHARS: &[char] = &[
  '的', '了', '是', '在', '您', '你', '我', '和', '有', '也', '就', '都', '而', '及', '与', '着', '或', '一',
  '个', '这', '那', '为', '以', '之', '其', '于', '将', '会', '能', '可', '要', '不', '中', '上', '下', '时',
];

const STOP_WORDS: &[&str] = &[
  "可能", "需要", "建议", "注意", "适合", "进行", "我们", "自己", "因为", "所以", "如果", "但是", "以及",
  "方面", "近期", "总体", "整体", "分析", "结果", "保持", "避免",
];

/// Up to `limit` two-character tokens, most frequent first; ties keep first occurrence.
pub fn extract_keywords(sections: &[Section], limit: usize) -> Vec<String> {
  let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
  let mut order = 0usize;
  for s in sections {
    for run in s.content.split(|c: char| !is_cjk(c)).filter(|r| !r.is_empty()) {
      let chars: Vec<char> = run.chars().collect();
      for pair in chars.windows(2) {
        if pair.iter().any(|c| STOP_CHARS.contains(c)) {
          continue;
        }
        let token: String = pair.iter().collect();
        if STOP_WORDS.contains(&token.as_str()) {
          continue;
        }
        let entry = counts.entry(token).or_insert((0, order));
        entry.0 += 1;
        order += 1;
      }
    }
  }
  let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
  ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
  ranked.into_iter().take(limit).map(|(t, _)| t).collect()
}

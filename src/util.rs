//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// True if unicode char belongs to CJK ranges.
pub fn is_cjk(ch: char) -> bool {
  ('\u{4E00}'..='\u{9FFF}').contains(&ch)
    || ('\u{3400}'..='\u{4DBF}').contains(&ch)
    || ('\u{20000}'..='\u{2A6DF}').contains(&ch)
    || ('\u{2A700}'..='\u{2B73F}').contains(&ch)
    || ('\u{2B740}'..='\u{2B81F}').contains(&ch)
    || ('\u{2B820}'..='\u{2CEAF}').contains(&ch)
    || ('\u{F900}'..='\u{FAFF}').contains(&ch)
}

/// Character count (not bytes). Titles and paragraphs are measured this way.
pub fn char_len(s: &str) -> usize {
  s.chars().count()
}

/// First `n` characters of `s`, never splitting a code point.
pub fn take_chars(s: &str, n: usize) -> String {
  s.chars().take(n).collect()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if char_len(s) <= max {
    s.to_string()
  } else {
    format!("{}… ({} bytes total)", take_chars(s, max), s.len())
  }
}

/// 32-bit FNV-1a. Stable across platforms and toolchains, unlike `DefaultHasher`.
pub fn fnv1a(bytes: &[u8]) -> u32 {
  let mut hash: u32 = 0x811c_9dc5;
  for b in bytes {
    hash ^= u32::from(*b);
    hash = hash.wrapping_mul(0x0100_0193);
  }
  hash
}

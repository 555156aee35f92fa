//! Seeded pseudo-random sequence and generation seeds.
//!
//! Every generator threads its own `SeededSequence`; there is no shared RNG.
//! For a fixed starting state the draws are identical on every platform.

use chrono::{Datelike, NaiveDate};

use crate::calendar::CalendarFacts;
use crate::util::fnv1a;

pub const MULTIPLIER: u64 = 48_271;
pub const INCREMENT: u64 = 12_345;
/// 2^31 - 1
pub const MODULUS: u64 = 2_147_483_647;

/// One LCG step: `state' = (state * A + C) mod M`. Returns `(value, new_state)`.
pub fn next(state: u32) -> (u32, u32) {
  let s = (u64::from(state) * MULTIPLIER + INCREMENT) % MODULUS;
  let s = s as u32;
  (s, s)
}

/// `abs(state) mod n`; `n == 0` yields 0.
pub fn pick_index(state: u32, n: usize) -> usize {
  if n == 0 {
    return 0;
  }
  (state as usize) % n
}

/// Owned cursor over the LCG. Cheap to copy so callers can fork a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeededSequence {
  state: u32,
}

impl SeededSequence {
  pub fn new(seed: u32) -> Self {
    Self { state: (u64::from(seed) % MODULUS) as u32 }
  }

  pub fn state(&self) -> u32 {
    self.state
  }

  pub fn next_value(&mut self) -> u32 {
    let (value, state) = next(self.state);
    self.state = state;
    value
  }

  /// Uniform-ish index in `[0, n)`.
  pub fn below(&mut self, n: usize) -> usize {
    let v = self.next_value();
    pick_index(v, n)
  }

  /// Inclusive range `[lo, hi]`.
  pub fn range(&mut self, lo: u32, hi: u32) -> u32 {
    if hi <= lo {
      return lo;
    }
    lo + self.below((hi - lo + 1) as usize) as u32
  }

  /// True with roughly `percent`% probability.
  pub fn chance(&mut self, percent: u32) -> bool {
    (self.below(100) as u32) < percent
  }

  pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
      return None;
    }
    let i = self.below(items.len());
    items.get(i)
  }

  /// Convenience for the static word tables.
  pub fn pick_str(&mut self, items: &[&'static str]) -> &'static str {
    self.pick(items).copied().unwrap_or("")
  }

  /// `k` distinct indices from `[0, n)`, in draw order. Repeats are rejected;
  /// after a bounded number of rejections the remaining slots are filled by a
  /// linear scan so the call always terminates.
  pub fn distinct_indices(&mut self, n: usize, k: usize) -> Vec<usize> {
    let k = k.min(n);
    let mut out: Vec<usize> = Vec::with_capacity(k);
    let mut attempts = 0usize;
    while out.len() < k && attempts < k * 16 {
      attempts += 1;
      let i = self.below(n);
      if !out.contains(&i) {
        out.push(i);
      }
    }
    let mut cursor = self.below(n.max(1));
    while out.len() < k {
      if !out.contains(&cursor) {
        out.push(cursor);
      }
      cursor = (cursor + 1) % n;
    }
    out
  }

  /// `k` distinct items from a static table.
  pub fn sample_strs(&mut self, items: &[&'static str], k: usize) -> Vec<&'static str> {
    self
      .distinct_indices(items.len(), k)
      .into_iter()
      .filter_map(|i| items.get(i).copied())
      .collect()
  }
}

/// How a generator's seed is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationSeed(pub u32);

impl GenerationSeed {
  /// Almanac family: the per-day date hash.
  pub fn from_date(date: NaiveDate) -> Self {
    GenerationSeed(CalendarFacts::from_date(date).date_hash)
  }

  /// Poem/astrology/tarot family: method + free text + coarse day timestamp.
  pub fn from_text(method: &str, input: &str, day: NaiveDate) -> Self {
    let key = format!("{}|{}|{}", method, input, day.num_days_from_ce());
    GenerationSeed(fnv1a(key.as_bytes()) & 0x7FFF_FFFF)
  }

  /// Per-request entropy where reproducibility is not wanted.
  pub fn from_clock() -> Self {
    GenerationSeed(rand::random::<u32>() & 0x7FFF_FFFF)
  }

  pub fn sequence(self) -> SeededSequence {
    SeededSequence::new(self.0)
  }
}

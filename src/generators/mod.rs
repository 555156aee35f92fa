//! Deterministic local content generators.
//!
//! Every generator is a pure function of `(seed, inputs)` and returns titled
//! text in the `【title】\nbody` layout so the section parser reads it back the
//! same way it reads an external response.

pub mod almanac;
pub mod astrology;
pub mod bazi;
pub mod fortune;
pub mod hexagram;
pub mod poem;
pub mod symbolic;
pub mod tarot;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::Inputs;
use crate::error::DivinationError;
use crate::rng::GenerationSeed;
use crate::seeds::static_fallback;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GeneratorKind {
  Almanac,
  Bazi,
  Hexagram,
  Astrology,
  Tarot,
  Dream,
  Numerology,
  Qimen,
  Face,
  Palmistry,
  Fortune,
  Mbti,
}

/// Run one generator. Errors only on inputs it cannot seed from. The
/// questionnaire scorer ignores the seed.
pub fn generate(kind: GeneratorKind, seed: GenerationSeed, inputs: &Inputs) -> Result<String, DivinationError> {
  let text = match kind {
    GeneratorKind::Almanac => almanac::generate(seed, inputs)?,
    GeneratorKind::Bazi => bazi::generate(seed, inputs)?,
    GeneratorKind::Hexagram => hexagram::generate(seed, inputs),
    GeneratorKind::Astrology => astrology::generate(seed, inputs),
    GeneratorKind::Tarot => tarot::generate(seed, inputs),
    GeneratorKind::Dream => symbolic::dream(seed, inputs),
    GeneratorKind::Numerology => symbolic::numerology(seed, inputs),
    GeneratorKind::Qimen => symbolic::qimen(seed, inputs),
    GeneratorKind::Face => symbolic::face(seed, inputs),
    GeneratorKind::Palmistry => symbolic::palmistry(seed, inputs),
    GeneratorKind::Fortune => fortune::generate(seed, inputs),
    GeneratorKind::Mbti => crate::mbti::generate(inputs)?,
  };
  if text.trim().is_empty() {
    return Err(DivinationError::ParseProducedNothing);
  }
  Ok(text)
}

/// Like [`generate`], but never fails: a generator that cannot run falls back
/// to the static template for its kind.
pub fn generate_or_static(kind: GeneratorKind, seed: GenerationSeed, inputs: &Inputs) -> String {
  match generate(kind, seed, inputs) {
    Ok(text) => {
      debug!(target: "generator", ?kind, seed = seed.0, chars = text.chars().count(), "local generator ok");
      text
    }
    Err(e) => {
      warn!(target: "generator", ?kind, error = %e, "generator failed; using static template");
      static_fallback(kind)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ALL: [GeneratorKind; 11] = [
    GeneratorKind::Almanac,
    GeneratorKind::Bazi,
    GeneratorKind::Hexagram,
    GeneratorKind::Astrology,
    GeneratorKind::Tarot,
    GeneratorKind::Dream,
    GeneratorKind::Numerology,
    GeneratorKind::Qimen,
    GeneratorKind::Face,
    GeneratorKind::Palmistry,
    GeneratorKind::Fortune,
  ];

  fn sample_inputs() -> Inputs {
    let mut m = Inputs::new();
    m.insert("birthDate".into(), "1990-05-20".into());
    m.insert("birthTime".into(), "08:30".into());
    m.insert("gender".into(), "女".into());
    m.insert("date".into(), "2024-03-15".into());
    m.insert("question".into(), "今年的工作会顺利吗".into());
    m.insert("dreamContent".into(), "梦见在海里游泳".into());
    m.insert("fullName".into(), "Li Ming".into());
    m.insert("description".into(), "额头饱满，生命线长".into());
    m
  }

  #[test]
  fn every_generator_is_deterministic() {
    let inputs = sample_inputs();
    for kind in ALL {
      let a = generate(kind, GenerationSeed(4242), &inputs).unwrap();
      let b = generate(kind, GenerationSeed(4242), &inputs).unwrap();
      assert_eq!(a, b, "{kind:?}");
      assert!(a.contains('【'), "{kind:?} output has no titles");
    }
  }

  #[test]
  fn missing_seed_input_falls_back_to_static_text() {
    let text = generate_or_static(GeneratorKind::Almanac, GenerationSeed(1), &Inputs::new());
    assert_eq!(text, static_fallback(GeneratorKind::Almanac));
  }
}

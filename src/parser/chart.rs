//! Chart line grammar: rewrite loose phrasings into canonical lines and read
//! canonical lines back into structured positions and aspects.

use std::collections::HashSet;

use regex::{Captures, Regex};

use crate::error::DivinationError;
use crate::generators::astrology::{Aspect, Chart, PlanetPosition, ASPECTS};

/// Degree assumed for a position line that omits it.
pub const DEFAULT_DEGREE: u16 = 15;

const POINT_ALT: &str = "太阳|月亮|水星|金星|火星|木星|土星|天王星|海王星|冥王星|上升点?|中天点?";
const PLANET_ALT: &str = "太阳|月亮|水星|金星|火星|木星|土星|天王星|海王星|冥王星";
const SIGN_ALT: &str = "白羊|金牛|双子|巨蟹|狮子|处女|天秤|天蝎|射手|摩羯|水瓶|双鱼";
const RELATION_ALT: &str = "合相|六分相|四分相|三分相|对分相";

#[derive(Clone, Debug)]
pub struct ChartGrammar {
  loose_position: Regex,
  loose_aspect: Regex,
  position: Regex,
  aspect: Regex,
}

fn compile(pattern: &str) -> Result<Regex, DivinationError> {
  Regex::new(pattern).map_err(|e| DivinationError::Config { message: format!("bad chart pattern: {e}") })
}

/// `上升` and `中天` are written with a trailing `点` in canonical lines.
fn canonical_point(raw: &str) -> String {
  match raw {
    "上升" => "上升点".to_string(),
    "中天" => "中天点".to_string(),
    other => other.to_string(),
  }
}

fn relation_angle(relation: &str) -> u16 {
  ASPECTS.iter().find(|(r, _)| *r == relation).map_or(0, |(_, d)| *d)
}

impl ChartGrammar {
  pub fn new() -> Result<Self, DivinationError> {
    let loose_position = format!(
      r"({POINT_ALT})\s*(?:位于|在|落在|落入|处于)\s*({SIGN_ALT})座?(?:[，,、\s]*(?:约|大约)?\s*(\d{{1,2}})\s*(?:度|°))?"
    );
    let loose_aspect = format!(
      r"({PLANET_ALT})\s*(?:和|与|跟)\s*({PLANET_ALT})\s*(?:形成|构成|呈|成)\s*({RELATION_ALT})(?:[，,、\s]*[\(（]?\s*(?:约|大约)?\s*(\d{{1,3}})\s*(?:度|°)\s*[\)）]?)?"
    );
    let position = format!(r"({POINT_ALT})位于({SIGN_ALT})座(?:(\d{{1,2}})度)?");
    let aspect = format!(r"({PLANET_ALT})和({PLANET_ALT})形成({RELATION_ALT})(?:\((\d{{1,3}})度\))?");
    Ok(Self {
      loose_position: compile(&loose_position)?,
      loose_aspect: compile(&loose_aspect)?,
      position: compile(&position)?,
      aspect: compile(&aspect)?,
    })
  }

  /// Rewrites loose planet/aspect phrasings into the canonical line grammar.
  /// Canonical input passes through unchanged.
  pub fn normalize(&self, text: &str) -> String {
    let text = self.loose_aspect.replace_all(text, |c: &Captures| {
      let relation = &c[3];
      let degree = c.get(4).map_or_else(|| relation_angle(relation).to_string(), |m| m.as_str().to_string());
      format!("{}和{}形成{}({}度)", &c[1], &c[2], relation, degree)
    });
    self
      .loose_position
      .replace_all(&text, |c: &Captures| {
        let point = canonical_point(&c[1]);
        match c.get(3) {
          Some(d) => format!("{}位于{}座{}度", point, &c[2], d.as_str()),
          None => format!("{}位于{}座", point, &c[2]),
        }
      })
      .into_owned()
  }

  /// Reads canonical lines; the first mention of each point or pair wins.
  pub fn parse(&self, text: &str) -> Chart {
    let mut chart = Chart::default();
    let mut seen_points = HashSet::new();
    for c in self.position.captures_iter(text) {
      let planet = canonical_point(&c[1]);
      if !seen_points.insert(planet.clone()) {
        continue;
      }
      let degree = c.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(DEFAULT_DEGREE);
      chart.positions.push(PlanetPosition { planet, sign: c[2].to_string(), degree });
    }
    let mut seen_pairs = HashSet::new();
    for c in self.aspect.captures_iter(text) {
      if c[1] == c[2] {
        continue;
      }
      let relation = c[3].to_string();
      let degree = c.get(4).and_then(|m| m.as_str().parse().ok()).unwrap_or_else(|| relation_angle(&relation));
      let aspect = Aspect { first: c[1].to_string(), second: c[2].to_string(), relation, degree };
      if seen_pairs.insert(aspect.pair_key()) {
        chart.aspects.push(aspect);
      }
    }
    chart
  }
}

//! Calendar facts and the static tables derived from them.
//!
//! The lunar label and the stem/branch indices are simplified modular
//! arithmetic, not a real lunisolar conversion.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use crate::error::DivinationError;

pub const HEAVENLY_STEMS: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];

pub const EARTHLY_BRANCHES: [&str; 12] =
  ["子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥"];

pub const ZODIAC_ANIMALS: [&str; 12] =
  ["鼠", "牛", "虎", "兔", "龙", "蛇", "马", "羊", "猴", "鸡", "狗", "猪"];

pub const LUNAR_MANSIONS: [&str; 28] = [
  "角木蛟", "亢金龙", "氐土貉", "房日兔", "心月狐", "尾火虎", "箕水豹",
  "斗木獬", "牛金牛", "女土蝠", "虚日鼠", "危月燕", "室火猪", "壁水貐",
  "奎木狼", "娄金狗", "胃土雉", "昴日鸡", "毕月乌", "觜火猴", "参水猿",
  "井木犴", "鬼金羊", "柳土獐", "星日马", "张月鹿", "翼火蛇", "轸水蚓",
];

pub const LUNAR_MONTHS: [&str; 12] =
  ["正月", "二月", "三月", "四月", "五月", "六月", "七月", "八月", "九月", "十月", "冬月", "腊月"];

pub const LUNAR_DAYS: [&str; 30] = [
  "初一", "初二", "初三", "初四", "初五", "初六", "初七", "初八", "初九", "初十",
  "十一", "十二", "十三", "十四", "十五", "十六", "十七", "十八", "十九", "二十",
  "廿一", "廿二", "廿三", "廿四", "廿五", "廿六", "廿七", "廿八", "廿九", "三十",
];

pub const YEAR_STARS: [&str; 9] = ["贪狼", "巨门", "禄存", "文曲", "廉贞", "武曲", "破军", "左辅", "右弼"];

/// Order used by the elemental histogram.
pub const FIVE_ELEMENTS: [&str; 5] = ["金", "木", "水", "火", "土"];

pub const HOUR_PERIODS: [&str; 12] = [
  "子时(23-01)", "丑时(01-03)", "寅时(03-05)", "卯时(05-07)", "辰时(07-09)", "巳时(09-11)",
  "午时(11-13)", "未时(13-15)", "申时(15-17)", "酉时(17-19)", "戌时(19-21)", "亥时(21-23)",
];

pub const WEEKDAYS: [&str; 7] = ["星期一", "星期二", "星期三", "星期四", "星期五", "星期六", "星期日"];

/// Element of a heavenly stem, as an index into `FIVE_ELEMENTS`.
pub fn stem_element(stem: usize) -> usize {
  match stem % 10 {
    0 | 1 => 1, // 木
    2 | 3 => 3, // 火
    4 | 5 => 4, // 土
    6 | 7 => 0, // 金
    _ => 2,     // 水
  }
}

/// Element of an earthly branch, as an index into `FIVE_ELEMENTS`.
pub fn branch_element(branch: usize) -> usize {
  match branch % 12 {
    0 | 11 => 2,         // 子亥 水
    2 | 3 => 1,          // 寅卯 木
    5 | 6 => 3,          // 巳午 火
    8 | 9 => 0,          // 申酉 金
    _ => 4,              // 丑辰未戌 土
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarFacts {
  pub date: NaiveDate,
  pub year: i32,
  pub month: u32,
  pub day: u32,
  pub day_of_year: u32,
  /// 0 = Monday
  pub day_of_week: u32,
  pub date_hash: u32,
}

impl CalendarFacts {
  pub fn from_date(date: NaiveDate) -> Self {
    let year = date.year();
    let month = date.month();
    let day = date.day();
    let day_of_year = date.ordinal();
    Self {
      date,
      year,
      month,
      day,
      day_of_year,
      day_of_week: date.weekday().num_days_from_monday(),
      date_hash: date_hash(year, month, day, day_of_year),
    }
  }

  pub fn zodiac_index(&self) -> usize {
    (self.year - 4).rem_euclid(12) as usize
  }

  pub fn stem_index(&self) -> usize {
    (self.day_of_year as i32 + self.year).rem_euclid(10) as usize
  }

  pub fn branch_index(&self) -> usize {
    (self.day_of_year as i32 + self.year).rem_euclid(12) as usize
  }

  pub fn zodiac(&self) -> &'static str {
    ZODIAC_ANIMALS[self.zodiac_index()]
  }

  pub fn day_stem_branch(&self) -> String {
    format!("{}{}", HEAVENLY_STEMS[self.stem_index()], EARTHLY_BRANCHES[self.branch_index()])
  }

  pub fn year_stem_branch(&self) -> String {
    let i = (self.year - 4).rem_euclid(60) as usize;
    format!("{}{}", HEAVENLY_STEMS[i % 10], EARTHLY_BRANCHES[i % 12])
  }

  /// Simplified lunar label (solar month shifted by ten, day folded to 30).
  pub fn lunar_label(&self) -> String {
    let m = (self.month as usize - 1 + 10) % 12;
    let d = (self.day as usize - 1) % 30;
    format!("{}{}", LUNAR_MONTHS[m], LUNAR_DAYS[d])
  }

  pub fn weekday_label(&self) -> &'static str {
    WEEKDAYS[self.day_of_week as usize % 7]
  }

  pub fn day_mansion(&self) -> &'static str {
    LUNAR_MANSIONS[self.day_of_year as usize % LUNAR_MANSIONS.len()]
  }

  pub fn year_star(&self) -> &'static str {
    YEAR_STARS[self.year.rem_euclid(YEAR_STARS.len() as i32) as usize]
  }

  pub fn day_element(&self) -> &'static str {
    FIVE_ELEMENTS[self.day_of_year as usize % FIVE_ELEMENTS.len()]
  }

  pub fn display(&self) -> String {
    format!("{}年{:02}月{:02}日", self.year, self.month, self.day)
  }
}

/// `rotl(year*10007 + month*1009 + day*101 + dayOfYear, 5) & 0x7FFFFFFF`.
pub fn date_hash(year: i32, month: u32, day: u32, day_of_year: u32) -> u32 {
  let raw = year
    .wrapping_mul(10_007)
    .wrapping_add(month as i32 * 1_009)
    .wrapping_add(day as i32 * 101)
    .wrapping_add(day_of_year as i32);
  (raw as u32).rotate_left(5) & 0x7FFF_FFFF
}

/// Accepts `2024-03-15`, `2024/3/15`, `2024.03.15` and `2024年3月15日`,
/// optionally followed by a time part which is ignored.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, DivinationError> {
  let trimmed = raw.trim();
  let head = trimmed.split_whitespace().next().unwrap_or("");
  let head = head.split('T').next().unwrap_or(head);
  for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日"] {
    if let Ok(d) = NaiveDate::parse_from_str(head, fmt) {
      return Ok(d);
    }
  }
  Err(DivinationError::invalid_input(field, raw))
}

/// Hour of day from `HH:MM`, `HH` or a branch label such as `午时(11:00-13:00)`.
pub fn parse_hour(raw: &str) -> Option<u32> {
  let t = raw.trim();
  if t.is_empty() {
    return None;
  }
  if let Ok(time) = NaiveTime::parse_from_str(t, "%H:%M") {
    return Some(time.hour());
  }
  if let Ok(h) = t.parse::<u32>() {
    return (h < 24).then_some(h);
  }
  EARTHLY_BRANCHES
    .iter()
    .position(|b| t.starts_with(b))
    .map(|i| ((i * 2 + 23) % 24) as u32)
}

/// Branch index of the two-hour period containing `hour`.
pub fn hour_branch(hour: u32) -> usize {
  (((hour + 1) / 2) % 12) as usize
}

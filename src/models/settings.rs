use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Weekday;

/// 時限長のオーバーライド。
///
/// ワイヤ形式はキーが "3"（全曜日）または "Mon-3"（曜日指定）の分数マップ。
/// 内部では二段階の構造化マップとして持ち、曜日指定 > 全曜日 > 既定値の
/// 優先順位で解決する。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DurationOverrides {
    per_day: HashMap<(Weekday, i32), i64>,
    global: HashMap<i32, i64>,
}

impl DurationOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_global(&mut self, period: i32, minutes: i64) {
        self.global.insert(period, minutes);
    }

    pub fn set_for_day(&mut self, day: Weekday, period: i32, minutes: i64) {
        self.per_day.insert((day, period), minutes);
    }

    pub fn is_empty(&self) -> bool {
        self.per_day.is_empty() && self.global.is_empty()
    }

    /// 時限長を解決する。day が無い場合は全曜日オーバーライドのみ見る。
    pub fn resolve(&self, day: Option<Weekday>, period: i32, default_minutes: i64) -> i64 {
        if let Some(day) = day {
            if let Some(&m) = self.per_day.get(&(day, period)) {
                return m;
            }
        }
        self.global.get(&period).copied().unwrap_or(default_minutes)
    }
}

impl Serialize for DurationOverrides {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map: HashMap<String, i64> = HashMap::new();
        for (period, minutes) in &self.global {
            map.insert(period.to_string(), *minutes);
        }
        for ((day, period), minutes) in &self.per_day {
            map.insert(format!("{}-{}", day.as_str(), period), *minutes);
        }
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DurationOverrides {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: HashMap<String, i64> = HashMap::deserialize(deserializer)?;
        let mut overrides = DurationOverrides::new();
        for (key, minutes) in raw {
            match key.split_once('-') {
                Some((day, period)) => {
                    let day = Weekday::from_english(day).ok_or_else(|| {
                        serde::de::Error::custom(format!("unknown weekday in override key: {}", key))
                    })?;
                    let period: i32 = period.parse().map_err(|_| {
                        serde::de::Error::custom(format!("bad period in override key: {}", key))
                    })?;
                    overrides.set_for_day(day, period, minutes);
                }
                None => {
                    let period: i32 = key.parse().map_err(|_| {
                        serde::de::Error::custom(format!("bad override key: {}", key))
                    })?;
                    overrides.set_global(period, minutes);
                }
            }
        }
        Ok(overrides)
    }
}

/// 時間計算の入力設定。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableSettings {
    /// 1 限の開始時刻 "HH:MM"
    pub first_period_start: String,
    /// 3 限の開始時刻。設定されていれば 3 限で時計をリセットする。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third_period_start: Option<String>,
    /// 1 コマの長さ（分）
    pub period_minutes: i64,
    /// 休み時間（分）
    pub break_minutes: i64,
    #[serde(default, skip_serializing_if = "DurationOverrides::is_empty")]
    pub overrides: DurationOverrides,
}

impl TimetableSettings {
    pub fn new(first_period_start: &str, period_minutes: i64, break_minutes: i64) -> Self {
        Self {
            first_period_start: first_period_start.to_string(),
            third_period_start: None,
            period_minutes,
            break_minutes,
            overrides: DurationOverrides::new(),
        }
    }
}

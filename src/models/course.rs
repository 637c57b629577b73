use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// 月〜土の 6 曜日。日曜は時間割に出ない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    pub const ALL: [Weekday; 6] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    /// Share payload index (0 = Monday .. 5 = Saturday).
    pub fn index(self) -> u8 {
        match self {
            Weekday::Mon => 0,
            Weekday::Tue => 1,
            Weekday::Wed => 2,
            Weekday::Thu => 3,
            Weekday::Fri => 4,
            Weekday::Sat => 5,
        }
    }

    pub fn from_index(i: u8) -> Option<Weekday> {
        Weekday::ALL.get(i as usize).copied()
    }

    pub fn kanji(self) -> char {
        match self {
            Weekday::Mon => '月',
            Weekday::Tue => '火',
            Weekday::Wed => '水',
            Weekday::Thu => '木',
            Weekday::Fri => '金',
            Weekday::Sat => '土',
        }
    }

    pub fn from_kanji(c: char) -> Option<Weekday> {
        match c {
            '月' => Some(Weekday::Mon),
            '火' => Some(Weekday::Tue),
            '水' => Some(Weekday::Wed),
            '木' => Some(Weekday::Thu),
            '金' => Some(Weekday::Fri),
            '土' => Some(Weekday::Sat),
            _ => None,
        }
    }

    pub fn from_english(s: &str) -> Option<Weekday> {
        match s.to_ascii_lowercase().as_str() {
            "mon" | "monday" => Some(Weekday::Mon),
            "tue" | "tuesday" => Some(Weekday::Tue),
            "wed" | "wednesday" => Some(Weekday::Wed),
            "thu" | "thursday" => Some(Weekday::Thu),
            "fri" | "friday" => Some(Weekday::Fri),
            "sat" | "saturday" => Some(Weekday::Sat),
            _ => None,
        }
    }

    /// 翌曜日。土曜で止まる（グリッド読みは右端で折り返さない）。
    pub fn succ(self) -> Weekday {
        match self {
            Weekday::Mon => Weekday::Tue,
            Weekday::Tue => Weekday::Wed,
            Weekday::Wed => Weekday::Thu,
            Weekday::Thu => Weekday::Fri,
            Weekday::Fri => Weekday::Sat,
            Weekday::Sat => Weekday::Sat,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor: Option<String>,
    pub day: Weekday,
    pub period: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syllabus_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignments: Vec<Assignment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendance: Vec<AttendanceRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// この時刻まで通知を抑制する (RFC3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mute_until: Option<String>,
}

impl Course {
    /// 候補コースの最小形。day と period が確定したものだけが生成される。
    pub fn candidate(id: String, name: String, day: Weekday, period: i32) -> Self {
        Self {
            id,
            name,
            code: None,
            room: None,
            professor: None,
            day,
            period,
            color: None,
            term: None,
            syllabus_url: None,
            note: None,
            assignments: Vec::new(),
            attendance: Vec::new(),
            images: Vec::new(),
            mute_until: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Assignment {
    /// 締切文字列を防御的にパースする。"M/D"・"M/D HH:MM"・ISO 風を受け付け、
    /// 解釈できなければ None。
    pub fn parse_deadline(&self, year: i32) -> Option<NaiveDateTime> {
        let raw = self.deadline.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }

        for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y/%m/%d %H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(dt);
            }
        }
        for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
            if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
                return d.and_hms_opt(23, 59, 0);
            }
        }

        // "M/D" または "M/D HH:MM"
        let (date_part, time_part) = match raw.split_once(' ') {
            Some((d, t)) => (d, Some(t)),
            None => (raw, None),
        };
        let (m, d) = date_part.split_once('/')?;
        let month: u32 = m.trim().parse().ok()?;
        let day: u32 = d.trim().parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;

        let time = match time_part {
            Some(t) => NaiveTime::parse_from_str(t.trim(), "%H:%M").ok()?,
            None => NaiveTime::from_hms_opt(23, 59, 0)?,
        };
        Some(date.and_time(time))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: String,
    pub status: AttendanceStatus,
}

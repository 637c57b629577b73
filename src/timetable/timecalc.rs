use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{TimetableSettings, Weekday};

/// 1 コマ分の開始・終了時刻。
/// minutes は深夜 0 時からの経過分で、文字列表現のみ 24 時間で折り返す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTime {
    pub start: String,
    pub end: String,
    pub start_minutes: i64,
    pub end_minutes: i64,
}

fn format_hhmm(minutes: i64) -> String {
    let hour = (minutes / 60) % 24;
    let minute = minutes % 60;
    format!("{:02}:{:02}", hour, minute)
}

fn parse_hhmm(s: &str) -> Result<i64, AppError> {
    let (h, m) = s
        .split_once(':')
        .ok_or_else(|| AppError::BadRequest(format!("Invalid time: {}", s)))?;
    let hour: i64 = h
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid time: {}", s)))?;
    let minute: i64 = m
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid time: {}", s)))?;
    if !(0..24).contains(&hour) || !(0..60).contains(&minute) {
        return Err(AppError::BadRequest(format!("Invalid time: {}", s)));
    }
    Ok(hour * 60 + minute)
}

/// 指定時限の開始・終了時刻を計算する。
///
/// 1 限から順に時計を進める。3 限開始時刻が設定されていれば 3 限で時計を
/// そこへリセットする（昼休みの長さを 1・2 限から導かないため）。各時限の
/// 長さは 曜日指定オーバーライド > 全曜日オーバーライド > 既定値 の順で決まる。
/// period が 1 未満なら入力エラー。
pub fn period_time(
    period: i32,
    day: Option<Weekday>,
    settings: &TimetableSettings,
) -> Result<PeriodTime, AppError> {
    if period < 1 {
        return Err(AppError::BadRequest(format!(
            "Period must be 1 or greater, got {}",
            period
        )));
    }

    let break_minutes = settings.break_minutes;
    let mut clock = parse_hhmm(&settings.first_period_start)?;

    for p in 1..=period {
        if p == 3 {
            if let Some(third) = &settings.third_period_start {
                clock = parse_hhmm(third)?;
            }
        }
        if p == period {
            break;
        }
        let used = settings.overrides.resolve(day, p, settings.period_minutes);
        clock += used + break_minutes;
    }

    let used = settings
        .overrides
        .resolve(day, period, settings.period_minutes);
    let start = clock;
    let end = clock + used;

    Ok(PeriodTime {
        start: format_hhmm(start),
        end: format_hhmm(end),
        start_minutes: start,
        end_minutes: end,
    })
}

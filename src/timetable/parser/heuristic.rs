use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Course, Weekday};
use crate::timetable::normalize::clean_course_name;

use super::{PALETTE_SIZE, non_empty_lines};

/// 括弧か空白に挟まれた曜日: "(月)" "【火曜】" " 水 " など。
static WRAPPED_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s(（\[【]([月火水木金土])曜?[\s)）\]】]").expect("wrapped day regex")
});

/// 素の曜日漢字（フォールバック）。
static BARE_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([月火水木金土])曜?").expect("bare day regex"));

/// 英語 3 文字の曜日（最後のフォールバック）。
static ENGLISH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(mon|tue|wed|thu|fri|sat)\b").expect("english day regex")
});

/// "3限" 形式の時限。
static KEN_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([1-6])限").expect("ken period regex"));

/// 括弧で囲まれた 1 桁の時限: "(1)" "[2]" など。
static WRAPPED_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[(（\[【]\s*([1-9])\s*[)）\]】]").expect("wrapped period regex"));

/// 素の 1 桁（前後に数字が無いもの）。曜日が既に見つかった行でのみ使う。
static BARE_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])([1-9])(?:[^0-9]|$)").expect("bare period regex"));

fn detect_day(line: &str) -> Option<(Weekday, Range<usize>)> {
    if let Some(caps) = WRAPPED_DAY.captures(line) {
        let kanji = caps.get(1)?;
        let day = Weekday::from_kanji(kanji.as_str().chars().next()?)?;
        return Some((day, caps.get(0)?.range()));
    }
    if let Some(caps) = BARE_DAY.captures(line) {
        let kanji = caps.get(1)?;
        let day = Weekday::from_kanji(kanji.as_str().chars().next()?)?;
        return Some((day, caps.get(0)?.range()));
    }
    if let Some(caps) = ENGLISH_DAY.captures(line) {
        let word = caps.get(1)?;
        let day = Weekday::from_english(word.as_str())?;
        return Some((day, word.range()));
    }
    None
}

fn detect_period(line: &str, day_found: bool) -> Option<(i32, Range<usize>)> {
    if let Some(caps) = KEN_PERIOD.captures(line) {
        let period = caps.get(1)?.as_str().parse().ok()?;
        return Some((period, caps.get(0)?.range()));
    }
    if let Some(caps) = WRAPPED_PERIOD.captures(line) {
        let period = caps.get(1)?.as_str().parse().ok()?;
        return Some((period, caps.get(0)?.range()));
    }
    if day_found {
        if let Some(caps) = BARE_PERIOD.captures(line) {
            let digit = caps.get(1)?;
            let period = digit.as_str().parse().ok()?;
            return Some((period, digit.range()));
        }
    }
    None
}

fn remove_ranges(line: &str, mut ranges: Vec<Range<usize>>) -> String {
    ranges.sort_by_key(|r| r.start);
    let mut out = String::with_capacity(line.len());
    let mut pos = 0;
    for range in ranges {
        if range.start >= pos {
            out.push_str(&line[pos..range.start]);
            pos = range.end;
        }
    }
    out.push_str(&line[pos..]);
    out
}

/// 残った空括弧を落とす。
static EMPTY_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[(（\[【]\s*[)）\]】]").expect("empty bracket regex"));

/// 行単位ヒューリスティックパーサ。
///
/// 各行を独立に見て曜日と時限の両方が取れた行だけをコースにする。
/// 名前はトークンを取り除いた残りを正規化したもので、1 文字以下はノイズとして
/// 捨てる。色はランダムな開始位置から巡回する。
pub(super) fn parse(text: &str, ids: &mut dyn FnMut() -> String, color_start: u32) -> Vec<Course> {
    let mut courses: Vec<Course> = Vec::new();

    for line in non_empty_lines(text) {
        let day = detect_day(line);
        let period = detect_period(line, day.is_some());
        let (Some((day, day_range)), Some((period, period_range))) = (day, period) else {
            continue;
        };

        let stripped = remove_ranges(line, vec![day_range, period_range]);
        let stripped = EMPTY_BRACKETS.replace_all(&stripped, " ");
        let name = clean_course_name(&stripped);
        if name.chars().count() <= 1 {
            continue;
        }

        let color = (color_start + courses.len() as u32) % PALETTE_SIZE;
        let mut course = Course::candidate(ids(), name, day, period);
        course.color = Some(color);
        courses.push(course);
    }

    courses
}

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Course, Weekday};
use crate::timetable::normalize::clean_course_name;

use super::{PALETTE_SIZE, non_empty_lines, split_blocks};

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4,})\s*[:：]\s*(.+)$").expect("header regex"));

/// 教室付きスロット: 曜日 + 時限 + 区切り + 教室（次のスラッシュ・括弧まで）。
static ROOM_SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([月火水木金土])曜?\s*([1-9])[限時]?\s*[:：・]\s*([^/／\[【(（]+)")
        .expect("room slot regex")
});

/// スロットのみ: 教室情報が無い開講コマも拾う広い方のスキャン。
static BARE_SLOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([月火水木金土])曜?\s*([1-9])").expect("bare slot regex"));

fn slot_of(caps: &regex::Captures) -> Option<(Weekday, i32)> {
    let day = caps
        .get(1)
        .and_then(|m| m.as_str().chars().next())
        .and_then(Weekday::from_kanji)?;
    let period: i32 = caps.get(2)?.as_str().parse().ok()?;
    Some((day, period))
}

/// ブロック形式パーサ。
///
/// 見出し行からコードと科目名を取り、本文を 2 回スキャンして
/// (曜日, 時限) → 教室 の対応と開講コマの一覧を作る。教員名は数字を含まず
/// 「セメスター」「年度」も含まない行（最後のもの）。色はブロック単位で共有。
pub(super) fn parse(text: &str, ids: &mut dyn FnMut() -> String) -> Vec<Course> {
    let lines = non_empty_lines(text);
    let blocks = split_blocks(&lines);
    let mut courses: Vec<Course> = Vec::new();
    let mut block_index: u32 = 0;

    for block in blocks {
        let Some(header) = block.first().and_then(|l| HEADER.captures(l)) else {
            continue;
        };
        let code = header[1].to_string();
        let name = clean_course_name(&header[2]);
        let color = block_index % PALETTE_SIZE;
        block_index += 1;

        let mut rooms: HashMap<(Weekday, i32), String> = HashMap::new();
        let mut slots: Vec<(Weekday, i32)> = Vec::new();
        let mut professor: Option<String> = None;

        for &line in &block[1..] {
            for caps in ROOM_SLOT.captures_iter(line) {
                if let Some(slot) = slot_of(&caps) {
                    let room = caps[3]
                        .trim()
                        .trim_end_matches(|c: char| !c.is_alphanumeric())
                        .to_string();
                    if !room.is_empty() {
                        rooms.insert(slot, room);
                    }
                }
            }
            for caps in BARE_SLOT.captures_iter(line) {
                if let Some(slot) = slot_of(&caps) {
                    if !slots.contains(&slot) {
                        slots.push(slot);
                    }
                }
            }
            let has_digit = line.chars().any(|c| c.is_numeric());
            if !has_digit && !line.contains("セメスター") && !line.contains("年度") {
                professor = Some(line.to_string());
            }
        }

        for (day, period) in slots {
            let mut course = Course::candidate(ids(), name.clone(), day, period);
            course.code = Some(code.clone());
            course.color = Some(color);
            course.professor = professor.clone();
            course.room = rooms.get(&(day, period)).cloned();
            courses.push(course);
        }
    }

    courses
}

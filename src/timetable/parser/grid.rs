use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Course, Weekday};
use crate::timetable::normalize::clean_course_name;

use super::{PALETTE_SIZE, non_empty_lines};

/// 時限マーカー行: "3" または "3限"。新しい行（= 月曜から読み直し）の合図。
static PERIOD_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([1-6])限?$").expect("period marker regex"));

/// コード行: 7 桁コード + 任意の区切りと後続テキスト。
static CODE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{7})([^0-9].*)?$").expect("code line regex"));

/// 括弧で囲まれたクォーター表記だけの行: "(Q2)" "[3Q]" など。
static QUARTER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[(\[（【]\s*(?i:[QX][1-4]|[1-4][QX])\s*[)\]）】]$").expect("quarter line regex")
});

/// マーカー行の判定。先読みで名前・教室・教員として消費してはいけない行。
/// すべての先読み分岐がこの述語を共有する。
fn is_marker_line(line: &str) -> bool {
    PERIOD_MARKER.is_match(line) || CODE_LINE.is_match(line)
}

fn strip_separator(s: &str) -> &str {
    s.trim_matches(|c: char| matches!(c, ':' | '：' | '・') || c.is_whitespace())
}

/// グリッド転写パーサ。
///
/// (曜日, 時限) のカーソルを (月, 1) から進める。時限マーカーで行が変わり
/// 曜日は月曜に戻る。コース 1 件を読むたびに曜日がひとつ進む（土曜で停止）。
pub(super) fn parse(text: &str, ids: &mut dyn FnMut() -> String) -> Vec<Course> {
    let lines = non_empty_lines(text);
    let mut day = Weekday::Mon;
    let mut period: i32 = 1;
    let mut courses: Vec<Course> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if let Some(caps) = PERIOD_MARKER.captures(line) {
            period = caps[1].parse().unwrap_or(1);
            day = Weekday::Mon;
            i += 1;
            continue;
        }

        let Some(caps) = CODE_LINE.captures(line) else {
            // グリッドに属さない行は読み飛ばす
            i += 1;
            continue;
        };

        let code = caps[1].to_string();
        let mut name_raw = caps
            .get(2)
            .map(|m| strip_separator(m.as_str()).to_string())
            .unwrap_or_default();
        i += 1;

        // コードと同じ行に名前が無ければ次行を名前として消費する
        if name_raw.is_empty() {
            if let Some(&next) = lines.get(i) {
                if !is_marker_line(next) {
                    name_raw = next.to_string();
                    i += 1;
                }
            }
        }

        // クォーター表記だけの行は名前に取り込む（正規化で [Qn] に変換される）
        if let Some(&next) = lines.get(i) {
            if QUARTER_LINE.is_match(next) {
                name_raw.push(' ');
                name_raw.push_str(next);
                i += 1;
            }
        }

        let mut room: Option<String> = None;
        if let Some(&next) = lines.get(i) {
            if !is_marker_line(next) {
                room = Some(next.to_string());
                i += 1;
            }
        }

        let mut professor: Option<String> = None;
        if let Some(&next) = lines.get(i) {
            if !is_marker_line(next) {
                professor = Some(next.to_string());
                i += 1;
            }
        }

        let name = clean_course_name(&name_raw);
        let color = (courses.len() as u32) % PALETTE_SIZE;
        let mut course = Course::candidate(ids(), name, day, period);
        course.code = Some(code);
        course.room = room;
        course.professor = professor;
        course.color = Some(color);
        courses.push(course);

        // 行内を左から右へ読むので次のコースは翌曜日
        day = day.succ();
    }

    courses
}

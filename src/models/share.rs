use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

use super::{Course, Weekday};

/// QR 共有用の圧縮形式 (v2)。曜日は enum 名ではなく 0=月 .. 5=土 の添字。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactCourse {
    pub n: String,
    #[serde(default)]
    pub r: String,
    #[serde(default)]
    pub t: String,
    pub d: u8,
    pub p: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePayloadV2 {
    pub v: u8,
    pub data: Vec<CompactCourse>,
}

/// 受け付ける共有ペイロード。v2 圧縮形式と旧形式 {courses: [...]} の両方。
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SharePayload {
    V2(SharePayloadV2),
    Legacy { courses: Vec<Course> },
}

/// コース一覧を v2 形式にエンコードする。QR に収めるためシラバス URL は落とす。
pub fn encode_share(courses: &[Course]) -> SharePayloadV2 {
    let data = courses
        .iter()
        .map(|c| CompactCourse {
            n: c.name.clone(),
            r: c.room.clone().unwrap_or_default(),
            t: c.professor.clone().unwrap_or_default(),
            d: c.day.index(),
            p: c.period,
            c: c.color,
            s: None,
            code: c.code.clone(),
            term: c.term.clone(),
        })
        .collect();
    SharePayloadV2 { v: 2, data }
}

/// 共有ペイロードをコース一覧に復元する。形式不明・0 件は失敗として報告する。
pub fn decode_share(json: &str) -> Result<Vec<Course>, AppError> {
    let payload: SharePayload = serde_json::from_str(json)
        .map_err(|e| AppError::BadRequest(format!("Unrecognized share payload: {}", e)))?;
    courses_from_payload(payload)
}

/// パース済みペイロードをコース一覧へ。旧形式はそのまま受け入れる。
pub fn courses_from_payload(payload: SharePayload) -> Result<Vec<Course>, AppError> {
    let courses = match payload {
        SharePayload::Legacy { courses } => courses,
        SharePayload::V2(payload) => {
            let mut courses = Vec::with_capacity(payload.data.len());
            for entry in payload.data {
                let day = Weekday::from_index(entry.d).ok_or_else(|| {
                    AppError::BadRequest(format!("Invalid weekday index: {}", entry.d))
                })?;
                if entry.p < 1 {
                    return Err(AppError::BadRequest(format!("Invalid period: {}", entry.p)));
                }
                let mut course =
                    Course::candidate(Uuid::new_v4().to_string(), entry.n, day, entry.p);
                course.room = (!entry.r.is_empty()).then_some(entry.r);
                course.professor = (!entry.t.is_empty()).then_some(entry.t);
                course.color = entry.c;
                course.syllabus_url = entry.s;
                course.code = entry.code;
                course.term = entry.term;
                courses.push(course);
            }
            courses
        }
    };

    if courses.is_empty() {
        return Err(AppError::BadRequest(
            "Share payload contains no courses".to_string(),
        ));
    }
    Ok(courses)
}

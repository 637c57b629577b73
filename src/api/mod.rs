use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::*;
use crate::services::{CommitOutcome, ConflictPolicy, bulk_commit, commit_course, unify_colors};
use crate::state::AppState;
use crate::timetable::{PeriodTime, parse_raw_text, period_time};
use crate::vision::candidates_from_recognized;

#[derive(Deserialize)]
struct CourseQueryParams {
    #[serde(default)]
    term: Option<String>,
}

#[derive(Deserialize)]
struct CreateCourseRequest {
    course: Course,
    #[serde(default)]
    policy: Option<ConflictPolicy>,
}

#[derive(Deserialize)]
struct UpdateCourseRequest {
    name: Option<String>,
    code: Option<String>,
    room: Option<String>,
    professor: Option<String>,
    day: Option<Weekday>,
    period: Option<i32>,
    color: Option<u32>,
    term: Option<String>,
    syllabus_url: Option<String>,
    note: Option<String>,
    mute_until: Option<String>,
}

#[derive(Deserialize)]
struct ScanTextRequest {
    text: String,
}

#[derive(Deserialize)]
struct ScanImageRequest {
    image_b64: String,
}

#[derive(Serialize)]
struct ImportResponse {
    imported: usize,
    max_period: i32,
}

#[derive(Deserialize)]
struct PeriodTimeRequest {
    #[serde(default)]
    day: Option<Weekday>,
    settings: TimetableSettings,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", patch(update_course).delete(delete_course))
        .route("/courses/import", post(import_courses))
        .route("/scan/text", post(scan_text))
        .route("/scan/image", post(scan_image))
        .route("/share", get(encode_share_handler).post(decode_share_handler))
        .route("/periods/{period}/time", post(period_time_handler))
        .route("/terms", get(list_terms))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseQueryParams>,
) -> Result<Json<Vec<Course>>, AppError> {
    let mut courses = state.store.list();
    if let Some(term) = params.term {
        courses.retain(|c| c.term.as_deref() == Some(term.as_str()));
    }
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CommitOutcome>), AppError> {
    let mut course = req.course;
    if course.period < 1 {
        return Err(AppError::BadRequest(format!(
            "Period must be 1 or greater, got {}",
            course.period
        )));
    }
    if course.id.is_empty() {
        course.id = Uuid::new_v4().to_string();
    }

    let outcome = commit_course(&state.store, course, req.policy);
    let status = match &outcome {
        CommitOutcome::Conflict { .. } => StatusCode::CONFLICT,
        _ => StatusCode::OK,
    };
    Ok((status, Json(outcome)))
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    let mut course = state.store.get(&id).ok_or(AppError::NotFound)?;

    if let Some(name) = req.name {
        course.name = name;
    }
    if let Some(code) = req.code {
        course.code = Some(code);
    }
    if let Some(room) = req.room {
        course.room = Some(room);
    }
    if let Some(professor) = req.professor {
        course.professor = Some(professor);
    }
    if let Some(day) = req.day {
        course.day = day;
    }
    if let Some(period) = req.period {
        if period < 1 {
            return Err(AppError::BadRequest(format!(
                "Period must be 1 or greater, got {}",
                period
            )));
        }
        course.period = period;
    }
    if let Some(color) = req.color {
        course.color = Some(color);
    }
    if let Some(term) = req.term {
        course.term = Some(term);
    }
    if let Some(url) = req.syllabus_url {
        course.syllabus_url = Some(url);
    }
    if let Some(note) = req.note {
        course.note = Some(note);
    }
    if let Some(mute_until) = req.mute_until {
        course.mute_until = Some(mute_until);
    }

    // 同 id の編集は衝突判定なしでその場で置き換える
    state.store.upsert(course.clone());
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    match state.store.remove(&id) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AppError::NotFound),
    }
}

/// OCR テキストから候補コースを抽出する。確定はしない。
async fn scan_text(
    State(state): State<AppState>,
    Json(req): Json<ScanTextRequest>,
) -> Result<Json<Vec<Course>>, AppError> {
    let mut candidates = parse_raw_text(&req.text);
    if candidates.is_empty() {
        return Err(AppError::BadRequest(
            "No courses recognized in text".to_string(),
        ));
    }
    unify_colors(&mut candidates, &state.store.list());
    info!("scan/text recognized {} candidate(s)", candidates.len());
    Ok(Json(candidates))
}

/// 画像を AI で読み取る。排他ゲートで同時実行は 1 件まで。
async fn scan_image(
    State(state): State<AppState>,
    Json(req): Json<ScanImageRequest>,
) -> Result<Json<Vec<Course>>, AppError> {
    BASE64
        .decode(req.image_b64.as_bytes())
        .map_err(|_| AppError::BadRequest("image_b64 is not valid base64".to_string()))?;

    // 許可証は drop で解放されるので、どの経路で抜けてもロックは残らない
    let _permit = state.gate.try_acquire().ok_or(AppError::Busy)?;

    let recognized = state.vision.recognize(&req.image_b64).await?;
    let mut ids = || Uuid::new_v4().to_string();
    let mut candidates = candidates_from_recognized(recognized, &mut ids);
    if candidates.is_empty() {
        return Err(AppError::BadRequest(
            "No courses recognized in image".to_string(),
        ));
    }
    unify_colors(&mut candidates, &state.store.list());
    info!("scan/image recognized {} candidate(s)", candidates.len());
    Ok(Json(candidates))
}

/// 一括確定。コマ衝突は検査せず、同 id だけ置き換える。
async fn import_courses(
    State(state): State<AppState>,
    Json(payload): Json<SharePayload>,
) -> Result<Json<ImportResponse>, AppError> {
    let courses = courses_from_payload(payload)?;
    let imported = bulk_commit(&state.store, courses);
    Ok(Json(ImportResponse {
        imported,
        max_period: state.store.max_period(),
    }))
}

async fn encode_share_handler(
    State(state): State<AppState>,
    Query(params): Query<CourseQueryParams>,
) -> Result<Json<SharePayloadV2>, AppError> {
    let mut courses = state.store.list();
    if let Some(term) = params.term {
        courses.retain(|c| c.term.as_deref() == Some(term.as_str()));
    }
    if courses.is_empty() {
        return Err(AppError::BadRequest("No courses to share".to_string()));
    }
    Ok(Json(encode_share(&courses)))
}

async fn decode_share_handler(
    Json(payload): Json<SharePayload>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = courses_from_payload(payload)?;
    Ok(Json(courses))
}

async fn period_time_handler(
    Path(period): Path<i32>,
    Json(req): Json<PeriodTimeRequest>,
) -> Result<Json<PeriodTime>, AppError> {
    let time = period_time(period, req.day, &req.settings)?;
    Ok(Json(time))
}

async fn list_terms(State(state): State<AppState>) -> Result<Json<Vec<Term>>, AppError> {
    let mut terms = state.store.terms();
    sort_terms_for_display(&mut terms);
    Ok(Json(terms))
}

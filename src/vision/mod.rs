pub mod dto;
pub mod gate;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use tracing::warn;

use crate::error::AppError;
use crate::models::{Course, Weekday};
use crate::timetable::parser::PALETTE_SIZE;

pub use dto::RecognizedCourse;
pub use gate::{VisionGate, VisionPermit};

/// 429 / 503 に対するリトライ回数。
const MAX_RETRIES: u32 = 3;

/// リトライしてよいステータスか。レート制限と一時的な過負荷のみ。
/// それ以外の非 2xx は即座に失敗させる。
pub fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
}

/// ジッタを足す前の基本待ち時間。attempt 0 → 1 秒, 1 → 2 秒, 2 → 4 秒。
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt)
}

const PROMPT: &str = "この画像は大学の時間割です。読み取れた科目を JSON 配列だけで返してください。\
各要素は {\"code\": 履修コード, \"name\": 科目名, \"day\": \"Mon\"〜\"Sat\", \
\"period\": 時限(1〜10), \"room\": 教室, \"professor\": 教員名} です。\
不明なフィールドは null にしてください。";

#[derive(Clone, Debug)]
pub struct VisionConfig {
    pub api_key: String,
    pub api_url: String,
}

impl VisionConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let api_key = env::var("VISION_API_KEY")
            .map_err(|_| AppError::BadRequest("VISION_API_KEY is not set".to_string()))?;
        let api_url = env::var("VISION_API_URL").unwrap_or_else(|_| {
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
                .to_string()
        });
        Ok(Self { api_key, api_url })
    }
}

#[async_trait]
pub trait VisionClient: Send + Sync {
    /// base64 エンコード済み画像を時間割として読み取る。
    async fn recognize(&self, image_b64: &str) -> Result<Vec<RecognizedCourse>, AppError>;
}

pub struct HttpVisionClient {
    client: Client,
    config: VisionConfig,
}

impl HttpVisionClient {
    pub fn new(config: VisionConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::BadRequest(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn build_request(&self, image_b64: &str) -> dto::GenerateContentRequest {
        dto::GenerateContentRequest {
            contents: vec![dto::Content {
                parts: vec![
                    dto::Part::Text {
                        text: PROMPT.to_string(),
                    },
                    dto::Part::InlineData {
                        inline_data: dto::InlineData {
                            mime_type: "image/jpeg".to_string(),
                            data: image_b64.to_string(),
                        },
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl VisionClient for HttpVisionClient {
    async fn recognize(&self, image_b64: &str) -> Result<Vec<RecognizedCourse>, AppError> {
        let request_body = self.build_request(image_b64);
        let mut attempt: u32 = 0;

        let text = loop {
            let response = self
                .client
                .post(&self.config.api_url)
                .query(&[("key", self.config.api_key.as_str())])
                .json(&request_body)
                .send()
                .await
                .map_err(|e| AppError::Provider(format!("Request failed: {}", e)))?;

            let status = response.status();
            if is_transient(status) {
                if attempt >= MAX_RETRIES {
                    return Err(AppError::Provider(format!(
                        "Provider still unavailable after {} retries ({})",
                        MAX_RETRIES, status
                    )));
                }
                // 基本待ち時間 + 0〜1 秒のジッタ。イベントループは塞がない。
                let jitter_ms: u64 = rand::rng().random_range(0..1000);
                let delay = backoff_delay(attempt) + Duration::from_millis(jitter_ms);
                warn!("vision provider returned {}, retrying in {:?}", status, delay);
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::Provider(format!(
                    "Provider error {}: {}",
                    status, body
                )));
            }

            let parsed: dto::GenerateContentResponse = response
                .json()
                .await
                .map_err(|e| AppError::Provider(format!("Failed to parse response: {}", e)))?;

            let text = parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .and_then(|c| c.parts.into_iter().next())
                .and_then(|p| p.text);

            match text {
                Some(t) => break t,
                None => return Err(AppError::Provider("Missing response text".to_string())),
            }
        };

        let array = extract_json_array(&text)
            .ok_or_else(|| AppError::Provider("No JSON array in response".to_string()))?;

        serde_json::from_str::<Vec<RecognizedCourse>>(array)
            .map_err(|e| AppError::Provider(format!("Malformed course array: {}", e)))
    }
}

/// テスト用・API キー未設定時のダミークライアント。
pub struct NoopVisionClient;

#[async_trait]
impl VisionClient for NoopVisionClient {
    async fn recognize(&self, _image_b64: &str) -> Result<Vec<RecognizedCourse>, AppError> {
        Ok(Vec::new())
    }
}

/// 自由文から最初の釣り合った JSON 配列リテラルを取り出す。
/// 文字列リテラル内の括弧とエスケープは数えない。
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn weekday_from_any(s: &str) -> Option<Weekday> {
    let trimmed = s.trim();
    if let Some(day) = Weekday::from_english(trimmed) {
        return Some(day);
    }
    trimmed.chars().next().and_then(Weekday::from_kanji)
}

/// 認識結果を候補コースに写す。day か period が欠けたものは warn を出して捨てる。
/// レイアウト分類は通らない（モデルが構造化フィールドを返すため）。
pub fn candidates_from_recognized(
    recognized: Vec<RecognizedCourse>,
    ids: &mut dyn FnMut() -> String,
) -> Vec<Course> {
    let mut courses = Vec::new();
    for entry in recognized {
        let day = entry.day.as_deref().and_then(weekday_from_any);
        let period = entry.period.filter(|&p| p >= 1);
        let (Some(day), Some(period)) = (day, period) else {
            warn!("dropping recognized course without day/period: {}", entry.name);
            continue;
        };
        let color = (courses.len() as u32) % PALETTE_SIZE;
        let mut course = Course::candidate(ids(), entry.name, day, period);
        course.code = entry.code;
        course.room = entry.room.filter(|r| !r.is_empty());
        course.professor = entry.professor.filter(|p| !p.is_empty());
        course.color = Some(color);
        courses.push(course);
    }
    courses
}

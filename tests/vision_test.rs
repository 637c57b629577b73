use std::time::Duration;

use reqwest::StatusCode;

use jikanwari::models::Weekday;
use jikanwari::vision::{
    NoopVisionClient, RecognizedCourse, VisionClient, VisionGate, backoff_delay,
    candidates_from_recognized, extract_json_array, is_transient,
};

#[test]
fn test_gate_admits_only_one_request() {
    let gate = VisionGate::new();

    let permit = gate.try_acquire();
    assert!(permit.is_some());
    // 保持中の 2 件目は拒否される
    assert!(gate.try_acquire().is_none());
    assert!(gate.is_busy());

    drop(permit);
    // 解放後は再び取得できる
    assert!(gate.try_acquire().is_some());
}

#[test]
fn test_gate_releases_on_error_paths() {
    let gate = VisionGate::new();

    fn failing_request(gate: &VisionGate) -> Result<(), String> {
        let _permit = gate.try_acquire().ok_or("busy")?;
        Err("provider exploded".to_string())
    }

    assert!(failing_request(&gate).is_err());
    // エラーで抜けてもロックは残らない
    assert!(!gate.is_busy());
}

#[tokio::test]
async fn test_gate_is_shared_across_clones() {
    let gate = VisionGate::new();
    let clone = gate.clone();

    let permit = gate.try_acquire();
    assert!(permit.is_some());

    let handle = tokio::spawn(async move { clone.try_acquire().is_none() });
    assert!(handle.await.expect("task"));
}

#[test]
fn test_only_rate_limit_and_overload_are_transient() {
    assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
    assert!(is_transient(StatusCode::SERVICE_UNAVAILABLE));

    // それ以外の失敗は再試行せず即座に報告する
    assert!(!is_transient(StatusCode::BAD_REQUEST));
    assert!(!is_transient(StatusCode::UNAUTHORIZED));
    assert!(!is_transient(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(!is_transient(StatusCode::BAD_GATEWAY));
    assert!(!is_transient(StatusCode::OK));
}

#[test]
fn test_backoff_doubles_per_attempt() {
    assert_eq!(backoff_delay(0), Duration::from_secs(1));
    assert_eq!(backoff_delay(1), Duration::from_secs(2));
    assert_eq!(backoff_delay(2), Duration::from_secs(4));
}

#[test]
fn test_extract_json_array_finds_first_balanced_array() {
    let text = "読み取り結果です:\n```json\n[{\"name\": \"数学\"}]\n```\nその他";
    assert_eq!(extract_json_array(text), Some("[{\"name\": \"数学\"}]"));

    let nested = "x [1, [2, 3], 4] y [5]";
    assert_eq!(extract_json_array(nested), Some("[1, [2, 3], 4]"));
}

#[test]
fn test_extract_json_array_ignores_brackets_in_strings() {
    let text = r#"[{"name": "数学[発展]", "room": "A]1"}]"#;
    assert_eq!(extract_json_array(text), Some(text));
}

#[test]
fn test_extract_json_array_returns_none_without_array() {
    assert_eq!(extract_json_array("コースが見つかりません"), None);
    assert_eq!(extract_json_array("[1, 2"), None);
}

#[test]
fn test_recognized_courses_without_day_or_period_are_dropped() {
    let recognized = vec![
        RecognizedCourse {
            code: Some("2100010".to_string()),
            name: "データベース".to_string(),
            day: Some("Wed".to_string()),
            period: Some(3),
            room: Some("A-301".to_string()),
            professor: None,
        },
        RecognizedCourse {
            code: None,
            name: "曜日不明".to_string(),
            day: None,
            period: Some(1),
            room: None,
            professor: None,
        },
        RecognizedCourse {
            code: None,
            name: "時限不明".to_string(),
            day: Some("Mon".to_string()),
            period: None,
            room: None,
            professor: None,
        },
    ];

    let mut n = 0;
    let mut ids = move || {
        n += 1;
        format!("v{}", n)
    };
    let courses = candidates_from_recognized(recognized, &mut ids);

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].name, "データベース");
    assert_eq!(courses[0].day, Weekday::Wed);
    assert_eq!(courses[0].period, 3);
    assert_eq!(courses[0].color, Some(0));
}

#[test]
fn test_recognized_day_accepts_kanji() {
    let recognized = vec![RecognizedCourse {
        code: None,
        name: "英語".to_string(),
        day: Some("金".to_string()),
        period: Some(2),
        room: None,
        professor: None,
    }];
    let mut ids = || "v1".to_string();
    let courses = candidates_from_recognized(recognized, &mut ids);
    assert_eq!(courses[0].day, Weekday::Fri);
}

#[tokio::test]
async fn test_noop_client_returns_no_courses() {
    let client = NoopVisionClient;
    let result = client.recognize("aGVsbG8=").await.expect("noop");
    assert!(result.is_empty());
}

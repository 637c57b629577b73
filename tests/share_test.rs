use jikanwari::models::{
    Course, Term, Weekday, decode_share, encode_share, sort_terms_for_display,
};

fn sample_course() -> Course {
    let mut c = Course::candidate("id-1".to_string(), "データベース".to_string(), Weekday::Wed, 3);
    c.code = Some("2100010".to_string());
    c.room = Some("A-301".to_string());
    c.professor = Some("田中".to_string());
    c.color = Some(4);
    c.term = Some("2025-Spring".to_string());
    c.syllabus_url = Some("https://example.ac.jp/syllabus/2100010".to_string());
    c
}

#[test]
fn test_share_round_trip_preserves_fields() {
    let original = sample_course();
    let payload = encode_share(std::slice::from_ref(&original));
    assert_eq!(payload.v, 2);

    let json = serde_json::to_string(&payload).expect("serialize");
    let decoded = decode_share(&json).expect("decode");
    assert_eq!(decoded.len(), 1);

    let c = &decoded[0];
    assert_eq!(c.name, original.name);
    assert_eq!(c.room, original.room);
    assert_eq!(c.professor, original.professor);
    assert_eq!(c.day, original.day);
    assert_eq!(c.period, original.period);
    assert_eq!(c.color, original.color);
    assert_eq!(c.code, original.code);
    assert_eq!(c.term, original.term);
    // QR 圧縮のためシラバス URL は意図的に落ちる
    assert_eq!(c.syllabus_url, None);
}

#[test]
fn test_day_is_encoded_as_index() {
    let payload = encode_share(&[sample_course()]);
    assert_eq!(payload.data[0].d, 2); // 0=月 なので水曜は 2
}

#[test]
fn test_legacy_payload_is_accepted_verbatim() {
    let json = serde_json::json!({
        "courses": [{
            "id": "legacy-1",
            "name": "英語",
            "day": "Fri",
            "period": 2
        }]
    })
    .to_string();

    let decoded = decode_share(&json).expect("legacy decode");
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].id, "legacy-1");
    assert_eq!(decoded[0].day, Weekday::Fri);
}

#[test]
fn test_malformed_payloads_are_rejected() {
    assert!(decode_share("not json").is_err());
    assert!(decode_share("{\"something\": 1}").is_err());
    // 曜日添字の範囲外
    let bad_day = r#"{"v":2,"data":[{"n":"英語","d":6,"p":1}]}"#;
    assert!(decode_share(bad_day).is_err());
    // 0 件は失敗として報告する
    assert!(decode_share(r#"{"v":2,"data":[]}"#).is_err());
}

#[test]
fn test_terms_sort_by_year_then_season_desc() {
    let mut terms = vec![
        Term { id: "2024-Fall".into(), label: "2024 Fall".into() },
        Term { id: "2025-Spring".into(), label: "2025 Spring".into() },
        Term { id: "2024-Spring".into(), label: "2024 Spring".into() },
        Term { id: "2025-Fall".into(), label: "2025 Fall".into() },
        Term { id: "2024-Winter".into(), label: "2024 Winter".into() },
    ];
    sort_terms_for_display(&mut terms);

    let ids: Vec<&str> = terms.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["2025-Fall", "2025-Spring", "2024-Winter", "2024-Fall", "2024-Spring"]
    );
}

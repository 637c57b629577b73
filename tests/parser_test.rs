use jikanwari::models::Weekday;
use jikanwari::timetable::{Layout, classify, parse_raw_text_with};

/// テストでは決定的な id を使う
fn seq_ids() -> impl FnMut() -> String {
    let mut n = 0;
    move || {
        n += 1;
        format!("c{}", n)
    }
}

#[test]
fn test_classify_seven_digit_run_selects_grid() {
    assert_eq!(classify("1\n2100010 Database\n"), Layout::GridWithCodes);
    // 8 桁の並びは「ちょうど 7 桁」ではない
    assert_ne!(classify("21000105 Database\n"), Layout::GridWithCodes);
}

#[test]
fn test_classify_code_header_selects_block() {
    let text = "12345: データベース基礎\n月曜3限: A-301\n";
    assert_eq!(classify(text), Layout::BlockHeader);
}

#[test]
fn test_classify_falls_back_to_heuristic() {
    assert_eq!(classify("英語(月)(1)\n"), Layout::HeuristicLine);
}

#[test]
fn test_grid_round_trip_fixture() {
    let text = "1\n2100010 Database\n2161\n田中\n2\n2100020: Network\n";
    let mut ids = seq_ids();
    let courses = parse_raw_text_with(text, &mut ids, 0);

    assert_eq!(courses.len(), 2);

    let db = &courses[0];
    assert_eq!(db.id, "c1");
    assert_eq!(db.name, "Database");
    assert_eq!(db.code.as_deref(), Some("2100010"));
    assert_eq!(db.room.as_deref(), Some("2161"));
    assert_eq!(db.professor.as_deref(), Some("田中"));
    assert_eq!(db.day, Weekday::Mon);
    assert_eq!(db.period, 1);

    let net = &courses[1];
    assert_eq!(net.name, "Network");
    assert_eq!(net.code.as_deref(), Some("2100020"));
    assert_eq!(net.room, None);
    assert_eq!(net.professor, None);
    assert_eq!(net.day, Weekday::Mon);
    assert_eq!(net.period, 2);
}

#[test]
fn test_grid_name_on_next_line_and_quarter_absorption() {
    let text = "3限\n2100030\nアルゴリズム\n(Q2)\n301\n佐藤\n";
    let mut ids = seq_ids();
    let courses = parse_raw_text_with(text, &mut ids, 0);

    assert_eq!(courses.len(), 1);
    let c = &courses[0];
    assert_eq!(c.name, "[Q2] アルゴリズム");
    assert_eq!(c.room.as_deref(), Some("301"));
    assert_eq!(c.professor.as_deref(), Some("佐藤"));
    assert_eq!(c.period, 3);
    assert_eq!(c.day, Weekday::Mon);
}

#[test]
fn test_grid_marker_lines_are_never_consumed_as_fields() {
    // 2 つ目のコード行が最初のコースの名前・教室に化けてはいけない
    let text = "1\n2100010\n2100020 Network\n";
    let mut ids = seq_ids();
    let courses = parse_raw_text_with(text, &mut ids, 0);

    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0].name, "");
    assert_eq!(courses[0].room, None);
    assert_eq!(courses[0].day, Weekday::Mon);
    assert_eq!(courses[1].name, "Network");
    assert_eq!(courses[1].day, Weekday::Tue);
}

#[test]
fn test_grid_day_advances_and_caps_at_saturday() {
    let mut text = String::from("1\n");
    for i in 0..8 {
        text.push_str(&format!("210001{} 科目{}\n", i, i));
    }
    let mut ids = seq_ids();
    let courses = parse_raw_text_with(&text, &mut ids, 0);

    assert_eq!(courses.len(), 8);
    assert_eq!(courses[0].day, Weekday::Mon);
    assert_eq!(courses[5].day, Weekday::Sat);
    // 土曜から先へは進まない（日曜・月曜へ折り返さない）
    assert_eq!(courses[6].day, Weekday::Sat);
    assert_eq!(courses[7].day, Weekday::Sat);
}

#[test]
fn test_grid_colors_cycle_in_emission_order() {
    let text = "1\n2100010 A科目\n2100020 B科目\n";
    let mut ids = seq_ids();
    let courses = parse_raw_text_with(text, &mut ids, 0);
    assert_eq!(courses[0].color, Some(0));
    assert_eq!(courses[1].color, Some(1));
}

#[test]
fn test_block_parser_emits_one_course_per_slot() {
    let text = "12345: データベース基礎\n2025年度 前期セメスター\n月曜3限: A-301 / 木曜3限\n山田太郎\n";
    let mut ids = seq_ids();
    let courses = parse_raw_text_with(text, &mut ids, 0);

    assert_eq!(courses.len(), 2);
    for c in &courses {
        assert_eq!(c.name, "データベース基礎");
        assert_eq!(c.code.as_deref(), Some("12345"));
        assert_eq!(c.professor.as_deref(), Some("山田太郎"));
        assert_eq!(c.color, Some(0));
    }
    assert_eq!(courses[0].day, Weekday::Mon);
    assert_eq!(courses[0].period, 3);
    assert_eq!(courses[0].room.as_deref(), Some("A-301"));
    assert_eq!(courses[1].day, Weekday::Thu);
    assert_eq!(courses[1].period, 3);
    assert_eq!(courses[1].room, None);
}

#[test]
fn test_block_parser_shares_color_per_block_not_per_slot() {
    let text = "\
12345: データベース基礎\n月曜3限 / 木曜3限\n67890: ネットワーク工学\n火曜2限\n";
    let mut ids = seq_ids();
    let courses = parse_raw_text_with(text, &mut ids, 0);

    assert_eq!(courses.len(), 3);
    assert_eq!(courses[0].color, Some(0));
    assert_eq!(courses[1].color, Some(0));
    assert_eq!(courses[2].color, Some(1));
}

#[test]
fn test_heuristic_requires_both_day_and_period() {
    let text = "英語(月)(1)\n英語(月)\n";
    let mut ids = seq_ids();
    let courses = parse_raw_text_with(text, &mut ids, 0);

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].name, "英語");
    assert_eq!(courses[0].day, Weekday::Mon);
    assert_eq!(courses[0].period, 1);
}

#[test]
fn test_heuristic_accepts_kanji_day_and_ken_period() {
    let text = "数学 火 2限\n";
    let mut ids = seq_ids();
    let courses = parse_raw_text_with(text, &mut ids, 0);

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].name, "数学");
    assert_eq!(courses[0].day, Weekday::Tue);
    assert_eq!(courses[0].period, 2);
}

#[test]
fn test_heuristic_accepts_english_day_with_bare_digit() {
    let text = "Mon 2 English Conversation\n";
    let mut ids = seq_ids();
    let courses = parse_raw_text_with(text, &mut ids, 0);

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].name, "English Conversation");
    assert_eq!(courses[0].day, Weekday::Mon);
    assert_eq!(courses[0].period, 2);
}

#[test]
fn test_heuristic_discards_single_char_names() {
    let text = "英(月)(1)\n";
    let mut ids = seq_ids();
    let courses = parse_raw_text_with(text, &mut ids, 0);
    assert!(courses.is_empty());
}

#[test]
fn test_heuristic_colors_cycle_from_injected_start() {
    let text = "英語(月)(1)\n数学(火)(2)\n";
    let mut ids = seq_ids();
    let courses = parse_raw_text_with(text, &mut ids, 5);
    assert_eq!(courses[0].color, Some(5));
    assert_eq!(courses[1].color, Some(6));
}

#[test]
fn test_parsers_never_assign_terms() {
    let grid = parse_raw_text_with("1\n2100010 Database\n", &mut seq_ids(), 0);
    let heuristic = parse_raw_text_with("英語(月)(1)\n", &mut seq_ids(), 0);
    assert!(grid.iter().all(|c| c.term.is_none()));
    assert!(heuristic.iter().all(|c| c.term.is_none()));
}

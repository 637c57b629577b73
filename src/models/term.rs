use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// 学期。id は慣習的に "{year}-{Season}" 形式。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: String,
    pub label: String,
}

fn season_rank(season: &str) -> u8 {
    match season.to_ascii_lowercase().as_str() {
        "spring" => 1,
        "summer" => 2,
        "fall" | "autumn" => 3,
        "winter" => 4,
        _ => 0,
    }
}

fn split_term_id(id: &str) -> (i32, u8) {
    match id.split_once('-') {
        Some((year, season)) => (year.parse().unwrap_or(0), season_rank(season)),
        None => (0, 0),
    }
}

/// 表示順に並べ替える。年の降順 → 季節の降順（冬が先頭）→ id の辞書順。
pub fn sort_terms_for_display(terms: &mut [Term]) {
    terms.sort_by(|a, b| {
        let (ya, sa) = split_term_id(&a.id);
        let (yb, sb) = split_term_id(&b.id);
        match yb.cmp(&ya) {
            Ordering::Equal => match sb.cmp(&sa) {
                Ordering::Equal => a.id.cmp(&b.id),
                other => other,
            },
            other => other,
        }
    });
}

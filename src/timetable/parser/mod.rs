mod block;
mod grid;
mod heuristic;

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use uuid::Uuid;

use crate::models::Course;

/// 配色パレットのスワッチ数。色はこの範囲の添字で巡回割り当てされる。
pub const PALETTE_SIZE: u32 = 12;

/// ちょうど 7 桁の数字列（履修コード）。8 桁以上の並びには一致しない。
static SEVEN_DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])[0-9]{7}(?:[^0-9]|$)").expect("seven digit regex"));

/// ブロック見出し: 4 桁以上のコード + コロン + 科目名。
static BLOCK_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4,}\s*[:：]\s*\S").expect("block header regex"));

/// OCR テキストのレイアウト種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// 7 桁コード入りのグリッド転写
    GridWithCodes,
    /// コード見出し + 開講情報行のブロック形式
    BlockHeader,
    /// 行単位の曜日・時限ヒューリスティック
    HeuristicLine,
}

pub(crate) fn is_block_header(line: &str) -> bool {
    BLOCK_HEADER.is_match(line)
}

/// 空行を除いたトリム済みの行に分割する。
pub(crate) fn non_empty_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

/// 連続行をブロックにまとめる。見出し行が出るたびに新しいブロックを始める。
pub(crate) fn split_blocks<'a>(lines: &[&'a str]) -> Vec<Vec<&'a str>> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for &line in lines {
        if is_block_header(line) || blocks.is_empty() {
            blocks.push(vec![line]);
        } else if let Some(last) = blocks.last_mut() {
            last.push(line);
        }
    }
    blocks
}

/// どのパーサを使うかを決める純粋な分類器。
pub fn classify(text: &str) -> Layout {
    if SEVEN_DIGIT_RUN.is_match(text) {
        return Layout::GridWithCodes;
    }
    let lines = non_empty_lines(text);
    let blocks = split_blocks(&lines);
    if blocks.iter().any(|b| b.first().is_some_and(|l| is_block_header(l))) {
        return Layout::BlockHeader;
    }
    Layout::HeuristicLine
}

/// OCR テキストから候補コースを抽出する。id は uuid v4、ヒューリスティックの
/// 配色開始位置はランダム。
pub fn parse_raw_text(text: &str) -> Vec<Course> {
    let mut ids = || Uuid::new_v4().to_string();
    let color_start = rand::rng().random_range(0..PALETTE_SIZE);
    parse_raw_text_with(text, &mut ids, color_start)
}

/// id 生成と配色開始位置を注入できる版。テストは決定的な id を渡す。
pub fn parse_raw_text_with(
    text: &str,
    ids: &mut dyn FnMut() -> String,
    heuristic_color_start: u32,
) -> Vec<Course> {
    match classify(text) {
        Layout::GridWithCodes => grid::parse(text, ids),
        Layout::BlockHeader => block::parse(text, ids),
        Layout::HeuristicLine => heuristic::parse(text, ids, heuristic_color_start),
    }
}

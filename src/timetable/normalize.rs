use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// クォーター表記 (Q2 / 2Q / X3 など)。空白か括弧で区切られた単独トークンのみ。
static QUARTER_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[\s()\[\]【】〔〕])(?:[QX]([1-4])|([1-4])[QX])(?:$|[\s()\[\]【】〔〕])")
        .expect("quarter tag regex")
});

/// 数字・ローマ数字の直後の B / 8 は「β」の誤読。後続の UO / 00 等のノイズごと回収する。
static BETA_MISREAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9IVX])\s*[B8](?:\s*(?:UO|U0|OO|00|O|0))*").expect("beta regex")
});

/// 既知の OCR 誤読の置換表。学校固有の誤読はここに足す。
static KNOWN_MISREADS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"\bOUC\b").expect("misread regex"), "JC"),
        (Regex::new(r"F3\s*E").expect("misread regex"), "英語"),
    ]
});

fn is_noise_symbol(c: char) -> bool {
    matches!(c, '!' | '_' | '>' | '¥')
}

fn is_edge_separator(c: char) -> bool {
    matches!(c, ':' | '：' | ';' | '；' | '.' | '。' | '-' | '=' | '＝') || c.is_whitespace()
}

/// 非ラテン文字の並びの内側かどうか。OCR はかな・漢字の間に空白を差し込むことが
/// 多いので、この集合に挟まれた空白だけを除去する。ラテン単語間の空白は残す。
fn is_contiguous_script(c: char) -> bool {
    matches!(c,
        '\u{3041}'..='\u{309F}'            // ひらがな
        | '\u{30A0}'..='\u{30FF}'          // カタカナ
        | '\u{31F0}'..='\u{31FF}'
        | '\u{3400}'..='\u{4DBF}'          // CJK 統合漢字
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{0370}'..='\u{03FF}'          // ギリシャ文字
        | '\u{2160}'..='\u{217F}'          // ローマ数字
        | '(' | ')' | '（' | '）'
        | 'I' | 'V' | 'X'
        | '0'..='9'
    )
}

fn collapse_script_whitespace(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            let prev = out.chars().last();
            let next = chars.get(j).copied();
            let squeeze = matches!((prev, next), (Some(p), Some(n))
                if is_contiguous_script(p) && is_contiguous_script(n));
            if !squeeze && prev.is_some() && next.is_some() {
                out.push(' ');
            }
            i = j;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// OCR が吐いた科目名を正規化する。
///
/// 全半角の統一、クォーター表記の抽出、パイプ → I、β の復元、記号ノイズの
/// 除去、非ラテン文字間の空白潰し、既知誤読の置換を順に適用する。
/// クォーター表記が見つかった場合は "[Qn] " を先頭に付け直す。
pub fn clean_course_name(raw: &str) -> String {
    let mut s: String = raw.nfkc().collect();

    let mut quarter: Option<char> = None;
    let tag = QUARTER_TAG.captures(&s).and_then(|caps| {
        let digit = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().chars().next())?;
        Some((digit, caps.get(0)?.range()))
    });
    if let Some((digit, range)) = tag {
        quarter = Some(digit);
        s.replace_range(range, " ");
    }

    let s = s.replace('|', "I");
    let s = BETA_MISREAD.replace_all(&s, "${1}β").into_owned();
    let s: String = s.chars().filter(|&c| !is_noise_symbol(c)).collect();
    let s = s.trim_matches(is_edge_separator);
    let mut s = collapse_script_whitespace(s);

    for (pattern, replacement) in KNOWN_MISREADS.iter() {
        s = pattern.replace_all(&s, *replacement).into_owned();
    }

    let body = s.trim().to_string();
    match quarter {
        Some(d) => format!("[Q{}] {}", d, body),
        None => body,
    }
}

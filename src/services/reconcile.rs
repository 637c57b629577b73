use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::Course;
use crate::store::CourseStore;

/// コマ衝突時の解決方法。
/// Append はクォーター制など同一コマ複数コースを許す運用向け。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    Append,
    Overwrite,
    Cancel,
}

/// 単一コース確定の結果。
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommitOutcome {
    Committed { course: Course },
    Cancelled,
    /// 方針未指定で衝突した。衝突相手を添えて呼び出し側に選ばせる。
    Conflict { conflicts: Vec<Course> },
}

/// 候補の色を既存コースと揃える。
///
/// 名前が一致する既存コースがあればその色を強制し、無ければ候補自身の色を
/// 以後その名前の色として使う。リスト順に名前 → 色の対応を育てる。
pub fn unify_colors(candidates: &mut [Course], stored: &[Course]) {
    let mut by_name: HashMap<String, u32> = stored
        .iter()
        .filter_map(|c| c.color.map(|color| (c.name.clone(), color)))
        .collect();

    for candidate in candidates {
        match by_name.get(&candidate.name) {
            Some(&color) => candidate.color = Some(color),
            None => {
                if let Some(color) = candidate.color {
                    by_name.insert(candidate.name.clone(), color);
                }
            }
        }
    }
}

/// 手動追加・編集の確定。
///
/// 同 id の編集は衝突判定なしで置き換える。別 id で同じ学期・曜日・時限が
/// 埋まっている場合は方針に従う。Cancel はストアに触れない。
pub fn commit_course(
    store: &CourseStore,
    course: Course,
    policy: Option<ConflictPolicy>,
) -> CommitOutcome {
    if store.contains(&course.id) {
        store.upsert(course.clone());
        return CommitOutcome::Committed { course };
    }

    let conflicts = store.slot_conflicts(&course);
    if conflicts.is_empty() {
        store.upsert(course.clone());
        return CommitOutcome::Committed { course };
    }

    match policy {
        None => CommitOutcome::Conflict { conflicts },
        Some(ConflictPolicy::Cancel) => CommitOutcome::Cancelled,
        Some(ConflictPolicy::Append) => {
            store.upsert(course.clone());
            CommitOutcome::Committed { course }
        }
        Some(ConflictPolicy::Overwrite) => {
            let removed = store.remove_slot(&course.term, course.day, course.period);
            info!("overwrote {} course(s) in slot {:?}-{}", removed, course.day, course.period);
            store.upsert(course.clone());
            CommitOutcome::Committed { course }
        }
    }
}

/// スキャン選択・共有インポートの一括確定。
///
/// コマ衝突は検査しない（クォーター制では同一コマの併存が正当）。
/// 同 id の再投入だけ置き換えになる。
pub fn bulk_commit(store: &CourseStore, candidates: Vec<Course>) -> usize {
    let count = candidates.len();
    for course in candidates {
        store.upsert(course);
    }
    count
}

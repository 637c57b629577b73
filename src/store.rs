use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::models::{Course, Term, Weekday};

/// 表示可能な時限数の上限。自動拡張してもここで止まる。
pub const MAX_PERIOD_CEILING: i32 = 10;

const DEFAULT_MAX_PERIOD: i32 = 6;

/// コースのインメモリストア。
/// 永続化はホスト側の関心事で、コアは不透明な key-value 置き場としてだけ扱う。
pub struct CourseStore {
    courses: RwLock<HashMap<String, Course>>,
    max_period: AtomicI32,
}

impl Default for CourseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CourseStore {
    pub fn new() -> Self {
        Self {
            courses: RwLock::new(HashMap::new()),
            max_period: AtomicI32::new(DEFAULT_MAX_PERIOD),
        }
    }

    pub fn list(&self) -> Vec<Course> {
        let mut courses: Vec<Course> = self
            .courses
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        courses.sort_by(|a, b| (a.day, a.period, a.name.clone()).cmp(&(b.day, b.period, b.name.clone())));
        courses
    }

    pub fn get(&self, id: &str) -> Option<Course> {
        self.courses
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.courses
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
    }

    /// 同 id は置き換え。挿入後に最大時限を追従させる。
    pub fn upsert(&self, course: Course) {
        self.note_period(course.period);
        self.courses
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(course.id.clone(), course);
    }

    pub fn remove(&self, id: &str) -> Option<Course> {
        self.courses
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
    }

    /// 同じ学期・曜日・時限のコース（id が異なるもの）を返す。
    pub fn slot_conflicts(&self, course: &Course) -> Vec<Course> {
        self.courses
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|c| {
                c.id != course.id
                    && c.term == course.term
                    && c.day == course.day
                    && c.period == course.period
            })
            .cloned()
            .collect()
    }

    pub fn remove_slot(&self, term: &Option<String>, day: Weekday, period: i32) -> usize {
        let mut courses = self.courses.write().unwrap_or_else(|e| e.into_inner());
        let ids: Vec<String> = courses
            .values()
            .filter(|c| c.term == *term && c.day == day && c.period == period)
            .map(|c| c.id.clone())
            .collect();
        for id in &ids {
            courses.remove(id);
        }
        ids.len()
    }

    /// ストアに現れる学期の一覧（id 昇順、重複なし）。
    pub fn terms(&self) -> Vec<Term> {
        let courses = self.courses.read().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = courses.values().filter_map(|c| c.term.clone()).collect();
        ids.sort();
        ids.dedup();
        ids.into_iter()
            .map(|id| Term { label: id.clone(), id })
            .collect()
    }

    pub fn max_period(&self) -> i32 {
        self.max_period.load(Ordering::Relaxed)
    }

    /// 新しく入ったコースの時限が表示上限を超えていたら上限を広げる（10 で頭打ち）。
    fn note_period(&self, period: i32) {
        let capped = period.min(MAX_PERIOD_CEILING);
        self.max_period.fetch_max(capped, Ordering::Relaxed);
    }
}

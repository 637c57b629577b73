use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 画像認識の排他ゲート。
///
/// ローカル OCR とリモート AI の両経路を通じて同時に 1 リクエストだけを許す。
/// 取得できなければ None（呼び出し側が「実行中」として扱う）。待ち行列は作らない。
#[derive(Clone, Default)]
pub struct VisionGate {
    busy: Arc<AtomicBool>,
}

impl VisionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 空いていれば許可証を返す。許可証が drop されるまで他の取得は失敗する。
    pub fn try_acquire(&self) -> Option<VisionPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| VisionPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

/// 取得済みの許可証。drop で必ず解放されるので、途中でエラーになっても
/// ロックが残らない。
pub struct VisionPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for VisionPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

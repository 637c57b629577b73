use std::sync::Arc;

use crate::store::CourseStore;
use crate::vision::{VisionClient, VisionGate};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CourseStore>,
    pub vision: Arc<dyn VisionClient>,
    pub gate: VisionGate,
}

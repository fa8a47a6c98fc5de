use serde::{Deserialize, Serialize};

use crate::logic::analysis_loop::{LoopState, LoopStatsSnapshot};
use crate::logic::events::DetectionEvent;
use crate::logic::model::ClassCount;
use crate::logic::response::AlertState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub app: String,
    pub version: String,

    pub loop_state: LoopState,
    pub detected: bool,
    pub last_event: Option<DetectionEvent>,
    pub last_error: Option<String>,

    pub model: ModelStatus,
    pub stats: LoopStatsSnapshot,
    pub alert: AlertState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub safe_label: String,
    pub alarm_label: String,
    pub threshold: f32,
    pub dimension: Option<usize>,
    pub total_examples: usize,
    pub classes: Vec<ClassCount>,
}

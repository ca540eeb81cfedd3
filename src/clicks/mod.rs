pub mod analytics;
pub mod recorder;

pub use analytics::{recent_activity, summarize, ClickStats};
pub use recorder::{ClickRecorder, ClickSink};

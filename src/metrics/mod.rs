pub mod events;
pub mod swing;

pub use events::{detect_top_of_swing, ImpactDetector};
pub use swing::{downswing_sequence, SwingMetrics, SwingMetricsResult, TrajectoryPoint};

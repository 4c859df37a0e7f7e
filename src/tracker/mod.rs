pub mod smooth;
pub mod swing_path;

pub use smooth::{smooth, smooth_centered, RollingSmoother, Sample};
pub use swing_path::SwingPathTracker;

//! Swing event detection over a completed trajectory.
//!
//! Both detectors are batch functions: they see the whole recording and
//! return a frame index into it.

use serde::{Deserialize, Serialize};

use crate::body_frame::NormalizedFrame;
use crate::geometry::safe_normal;
use crate::metrics::swing::{point, TrajectoryPoint};
use crate::pose::LandmarkIndex;

/// Address noise: frames before this are never a velocity anchor.
pub const IGNORE_START_FRAMES: usize = 15;

/// Shoulder turn beyond this is treated as follow-through.
pub const FOLLOW_THROUGH_LIMIT_DEG: f32 = 140.0;

/// Anchor velocity must exceed this to bound the top-of-swing search.
pub const VELOCITY_ANCHOR_THRESHOLD: f32 = 5.0;

/// Top of swing: maximum shoulder turn before the downswing velocity peak.
pub fn detect_top_of_swing(trajectory: &[TrajectoryPoint]) -> usize {
    let mut anchor_frame = 0;
    let mut anchor_velocity = 0.0;
    for (i, pt) in trajectory.iter().enumerate().skip(IGNORE_START_FRAMES) {
        let v = pt.wrist_velocity.abs();
        if v > anchor_velocity && pt.shoulder_rotation.abs() < FOLLOW_THROUGH_LIMIT_DEG {
            anchor_velocity = v;
            anchor_frame = i;
        }
    }

    // slow movement: search the whole recording
    let limit = if anchor_velocity > VELOCITY_ANCHOR_THRESHOLD {
        anchor_frame
    } else {
        trajectory.len()
    };

    let mut best_frame = 0;
    let mut best_rotation = 0.0;
    for (i, pt) in trajectory[..limit].iter().enumerate() {
        let rotation = pt.shoulder_rotation.abs();
        if rotation > best_rotation {
            best_rotation = rotation;
            best_frame = i;
        }
    }
    best_frame
}

/// Impact detection strategy.
///
/// `ZeroCrossing` is the default. The others are kept as alternatives and are
/// selected from config (`[metrics.impact] strategy = "..."`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ImpactDetector {
    /// First frame at or after the downswing velocity peak where forward
    /// wrist velocity drops to zero or below.
    ZeroCrossing,
    /// Lowest point of a club-head proxy (wrist extended along the lead
    /// shoulder→wrist line) within `window_padding` frames after the
    /// peak |velocity|.
    LowestClubHead {
        #[serde(default = "default_club_extension")]
        extension: f32,
        #[serde(default = "default_window_padding")]
        window_padding: usize,
    },
    /// The downswing velocity peak itself.
    PeakVelocity,
}

fn default_club_extension() -> f32 { 0.8 }
fn default_window_padding() -> usize { 20 }

impl Default for ImpactDetector {
    fn default() -> Self {
        ImpactDetector::ZeroCrossing
    }
}

impl ImpactDetector {
    pub fn name(&self) -> &'static str {
        match self {
            ImpactDetector::ZeroCrossing => "zero_crossing",
            ImpactDetector::LowestClubHead { .. } => "lowest_club_head",
            ImpactDetector::PeakVelocity => "peak_velocity",
        }
    }

    /// Returns an index in `[0, trajectory.len() - 1]`, or 0 for an empty
    /// trajectory. `frames` is only read by `LowestClubHead`.
    pub fn detect(
        &self,
        trajectory: &[TrajectoryPoint],
        frames: &[NormalizedFrame],
        top_of_swing: usize,
    ) -> usize {
        if trajectory.is_empty() {
            return 0;
        }
        let start = top_of_swing.min(trajectory.len() - 1);

        match *self {
            ImpactDetector::ZeroCrossing => {
                let peak = peak_signed_velocity(trajectory, start);
                trajectory[peak..]
                    .iter()
                    .position(|pt| pt.wrist_velocity <= 0.0)
                    .map(|offset| peak + offset)
                    .unwrap_or(peak)
            }
            ImpactDetector::LowestClubHead {
                extension,
                window_padding,
            } => lowest_club_head(trajectory, frames, start, extension, window_padding),
            ImpactDetector::PeakVelocity => peak_signed_velocity(trajectory, start),
        }
    }
}

fn peak_signed_velocity(trajectory: &[TrajectoryPoint], start: usize) -> usize {
    let mut peak = start;
    for (i, pt) in trajectory.iter().enumerate().skip(start + 1) {
        if pt.wrist_velocity > trajectory[peak].wrist_velocity {
            peak = i;
        }
    }
    peak
}

fn lowest_club_head(
    trajectory: &[TrajectoryPoint],
    frames: &[NormalizedFrame],
    start: usize,
    extension: f32,
    window_padding: usize,
) -> usize {
    let mut peak = start;
    let mut peak_velocity = 0.0;
    for (i, pt) in trajectory.iter().enumerate().skip(start) {
        let v = pt.wrist_velocity.abs();
        if v > peak_velocity {
            peak_velocity = v;
            peak = i;
        }
    }

    let end = trajectory.len().min(peak + window_padding);
    let mut impact = peak;
    let mut lowest = f32::INFINITY;
    for i in start..end {
        let Some(frame) = frames.get(i) else { break };
        let (Some(shoulder), Some(wrist)) = (
            point(frame, LandmarkIndex::LeftShoulder),
            point(frame, LandmarkIndex::LeftWrist),
        ) else {
            continue;
        };
        let club_head = wrist + safe_normal(&(wrist - shoulder)) * extension;
        if club_head.z < lowest {
            lowest = club_head.z;
            impact = i;
        }
    }
    impact
}

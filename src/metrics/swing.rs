use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::body_frame::NormalizedFrame;
use crate::config::MetricsConfig;
use crate::geometry::{horizontal, round_half_up, signed_angle};
use crate::metrics::events::{detect_top_of_swing, ImpactDetector};
use crate::pose::LandmarkIndex;
use crate::tracker::smooth::smooth_centered;

/// 手首速度のスケール係数（1フレーム = 単位時間）
const VELOCITY_SCALE: f32 = 100.0;

/// 速度平滑化の片側フレーム数（前後2フレーム）
const VELOCITY_SMOOTHING_RADIUS: usize = 2;

/// ダウンスイング中間フレームの位置（TOS→インパクト間の比率）
const DOWNSWING_SAMPLES: [f32; 2] = [0.33, 0.66];

/// 1フレーム分の回転・速度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub frame_index: usize,
    /// アドレスからの肩回転（度, 符号付き）
    pub shoulder_rotation: f32,
    /// アドレスからの腰回転（度, 符号付き）
    pub hip_rotation: f32,
    /// |肩回転 - 腰回転|（度）
    pub x_factor: f32,
    /// 左手首の前後方向速度
    pub wrist_velocity: f32,
}

/// スイング解析結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwingMetricsResult {
    pub shoulder_rotation: i32,
    pub hip_rotation: i32,
    pub x_factor: i32,
    /// アドレス時の足ラインに対する肩ラインの角度（度）
    pub address_shoulder_angle: i32,
    pub top_of_swing_frame: usize,
    pub impact_frame: usize,
    /// 可視化用: [中間1, 中間2, インパクト]（中間は条件を満たす場合のみ）
    pub downswing_sequence: Vec<usize>,
    pub trajectory: Vec<TrajectoryPoint>,
}

impl SwingMetricsResult {
    /// フレーム不足時の結果（全て0、軌跡は空）
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }
}

/// 正規化フレームから指定ランドマークを取得
pub(crate) fn point(frame: &NormalizedFrame, index: LandmarkIndex) -> Option<Vector3<f32>> {
    frame.get(index as usize).copied().flatten()
}

fn horizontal_pair(
    frame: &NormalizedFrame,
    left: LandmarkIndex,
    right: LandmarkIndex,
) -> Option<Vector3<f32>> {
    Some(horizontal(&point(frame, left)?, &point(frame, right)?))
}

/// スイング指標エンジン
///
/// 録画1本分の正規化フレーム履歴から一括で計算する。内部状態は持たない。
///
/// 欠損ランドマークの扱い:
/// - アドレス（先頭）フレームはヒップ・肩・かかとが必須。欠けていれば空の結果
/// - 以降のフレームでヒップ・肩のペアや左手首が欠けていれば直前の値を保持
#[derive(Debug, Clone)]
pub struct SwingMetrics {
    min_frames: usize,
    impact: ImpactDetector,
}

impl SwingMetrics {
    pub fn new(min_frames: usize, impact: ImpactDetector) -> Self {
        Self { min_frames, impact }
    }

    pub fn from_config(config: &MetricsConfig) -> Self {
        Self::new(config.min_frames, config.impact)
    }

    pub fn impact_detector(&self) -> ImpactDetector {
        self.impact
    }

    pub fn calculate(&self, frames: &[NormalizedFrame]) -> SwingMetricsResult {
        if frames.is_empty() || frames.len() < self.min_frames {
            tracing::warn!(
                "Not enough frames for swing metrics: {} (need {})",
                frames.len(),
                self.min_frames
            );
            return SwingMetricsResult::empty();
        }

        let address = &frames[0];
        let baselines = (
            horizontal_pair(address, LandmarkIndex::LeftHip, LandmarkIndex::RightHip),
            horizontal_pair(address, LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder),
            horizontal_pair(address, LandmarkIndex::LeftHeel, LandmarkIndex::RightHeel),
        );
        let (address_hip, address_shoulder, address_foot) = match baselines {
            (Some(hip), Some(shoulder), Some(foot)) => (hip, shoulder, foot),
            _ => {
                tracing::warn!("Address frame is missing hip, shoulder or heel landmarks");
                return SwingMetricsResult::empty();
            }
        };

        let address_shoulder_angle = signed_angle(&address_foot, &address_shoulder).to_degrees();

        let mut trajectory = self.trajectory(frames, address_hip, address_shoulder);

        let velocities: Vec<f32> = trajectory.iter().map(|pt| pt.wrist_velocity).collect();
        for (pt, v) in trajectory
            .iter_mut()
            .zip(smooth_centered(&velocities, VELOCITY_SMOOTHING_RADIUS))
        {
            pt.wrist_velocity = v;
        }

        let top_of_swing_frame = detect_top_of_swing(&trajectory);
        let impact_frame = self.impact.detect(&trajectory, frames, top_of_swing_frame);
        tracing::debug!(
            top_of_swing_frame,
            impact_frame,
            strategy = self.impact.name(),
            "swing events detected"
        );

        let tos = trajectory[top_of_swing_frame];

        SwingMetricsResult {
            shoulder_rotation: round_half_up(tos.shoulder_rotation.abs()),
            hip_rotation: round_half_up(tos.hip_rotation.abs()),
            x_factor: round_half_up(tos.x_factor),
            address_shoulder_angle: round_half_up(address_shoulder_angle),
            top_of_swing_frame,
            impact_frame,
            downswing_sequence: downswing_sequence(top_of_swing_frame, impact_frame),
            trajectory,
        }
    }

    /// 1フレームずつ回転と手首速度を求める（速度は平滑化前）
    fn trajectory(
        &self,
        frames: &[NormalizedFrame],
        address_hip: Vector3<f32>,
        address_shoulder: Vector3<f32>,
    ) -> Vec<TrajectoryPoint> {
        let mut hip_vec = address_hip;
        let mut shoulder_vec = address_shoulder;
        let mut prev_wrist_y = point(&frames[0], LandmarkIndex::LeftWrist).map(|w| w.y);

        frames
            .iter()
            .enumerate()
            .map(|(frame_index, frame)| {
                if let Some(v) = horizontal_pair(frame, LandmarkIndex::LeftHip, LandmarkIndex::RightHip) {
                    hip_vec = v;
                }
                if let Some(v) =
                    horizontal_pair(frame, LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder)
                {
                    shoulder_vec = v;
                }

                let hip_rotation = signed_angle(&address_hip, &hip_vec).to_degrees();
                let shoulder_rotation = signed_angle(&address_shoulder, &shoulder_vec).to_degrees();

                // +Y が前方
                let wrist_y = point(frame, LandmarkIndex::LeftWrist).map(|w| w.y);
                let wrist_velocity = match (wrist_y, prev_wrist_y) {
                    (Some(y), Some(prev)) => (y - prev) * VELOCITY_SCALE,
                    _ => 0.0,
                };
                if wrist_y.is_some() {
                    prev_wrist_y = wrist_y;
                }

                TrajectoryPoint {
                    frame_index,
                    shoulder_rotation,
                    hip_rotation,
                    x_factor: (shoulder_rotation - hip_rotation).abs(),
                    wrist_velocity,
                }
            })
            .collect()
    }
}

impl Default for SwingMetrics {
    fn default() -> Self {
        Self::from_config(&MetricsConfig::default())
    }
}

/// TOS とインパクトの間から可視化用フレームを抜き出す
pub fn downswing_sequence(top_of_swing: usize, impact: usize) -> Vec<usize> {
    if top_of_swing >= impact {
        return vec![impact];
    }

    let range = (impact - top_of_swing) as f32;
    let mut sequence = Vec::with_capacity(DOWNSWING_SAMPLES.len() + 1);
    for ratio in DOWNSWING_SAMPLES {
        let candidate = round_half_up(top_of_swing as f32 + ratio * range) as usize;
        let after_last = sequence.last().map_or(true, |&last| candidate > last);
        if after_last && candidate > top_of_swing && candidate < impact {
            sequence.push(candidate);
        }
    }
    sequence.push(impact);
    sequence
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq_f32(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    /// z軸回りに回転したラインを持つフレーム
    fn make_frame(shoulder_deg: f32, hip_deg: f32, foot_deg: f32, wrist_y: f32) -> NormalizedFrame {
        let line = |deg: f32, half: f32, z: f32| {
            let (s, c) = deg.to_radians().sin_cos();
            (
                Vector3::new(-c * half, -s * half, z),
                Vector3::new(c * half, s * half, z),
            )
        };
        let mut frame: NormalizedFrame = vec![None; LandmarkIndex::COUNT];
        let (ls, rs) = line(shoulder_deg, 0.2, 0.5);
        let (lh, rh) = line(hip_deg, 0.15, 0.0);
        let (lf, rf) = line(foot_deg, 0.2, -0.9);
        frame[LandmarkIndex::LeftShoulder as usize] = Some(ls);
        frame[LandmarkIndex::RightShoulder as usize] = Some(rs);
        frame[LandmarkIndex::LeftHip as usize] = Some(lh);
        frame[LandmarkIndex::RightHip as usize] = Some(rh);
        frame[LandmarkIndex::LeftHeel as usize] = Some(lf);
        frame[LandmarkIndex::RightHeel as usize] = Some(rf);
        frame[LandmarkIndex::LeftWrist as usize] = Some(Vector3::new(-0.1, wrist_y, 0.1));
        frame
    }

    #[test]
    fn test_too_few_frames() {
        let frames: Vec<NormalizedFrame> = (0..5).map(|_| make_frame(0.0, 0.0, 0.0, 0.0)).collect();
        let result = SwingMetrics::default().calculate(&frames);
        assert_eq!(result, SwingMetricsResult::empty());
        assert_eq!(result.shoulder_rotation, 0);
        assert_eq!(result.top_of_swing_frame, 0);
        assert_eq!(result.impact_frame, 0);
        assert!(result.trajectory.is_empty());
    }

    #[test]
    fn test_address_missing_heels() {
        let mut frames: Vec<NormalizedFrame> =
            (0..20).map(|_| make_frame(0.0, 0.0, 0.0, 0.0)).collect();
        frames[0][LandmarkIndex::LeftHeel as usize] = None;
        assert!(SwingMetrics::default().calculate(&frames).is_empty());
    }

    #[test]
    fn test_address_shoulder_angle_sign() {
        let frames: Vec<NormalizedFrame> = (0..12).map(|_| make_frame(8.0, 0.0, 0.0, 0.0)).collect();
        assert_eq!(SwingMetrics::default().calculate(&frames).address_shoulder_angle, 8);
        let frames: Vec<NormalizedFrame> = (0..12).map(|_| make_frame(-8.0, 0.0, 0.0, 0.0)).collect();
        assert_eq!(SwingMetrics::default().calculate(&frames).address_shoulder_angle, -8);
    }

    #[test]
    fn test_trajectory_rotations() {
        let frames: Vec<NormalizedFrame> = (0..12)
            .map(|i| make_frame(-5.0 * i as f32, -2.0 * i as f32, 0.0, 0.0))
            .collect();
        let result = SwingMetrics::default().calculate(&frames);
        assert_eq!(result.trajectory.len(), 12);
        let pt = result.trajectory[10];
        assert_eq!(pt.frame_index, 10);
        assert!(approx_eq_f32(pt.shoulder_rotation, -50.0, 1e-2));
        assert!(approx_eq_f32(pt.hip_rotation, -20.0, 1e-2));
        assert!(approx_eq_f32(pt.x_factor, 30.0, 1e-2));
        for pt in &result.trajectory {
            assert!(pt.x_factor >= 0.0);
        }
        // 速度なし → 全体の最大回転
        assert_eq!(result.top_of_swing_frame, 11);
        assert_eq!(result.shoulder_rotation, 55);
        assert_eq!(result.hip_rotation, 22);
        assert_eq!(result.x_factor, 33);
    }

    #[test]
    fn test_wrist_velocity_smoothed() {
        // 手首が frame 5 で 0.1 だけ前に出る → 生速度は frame5 のみ 10
        let frames: Vec<NormalizedFrame> = (0..12)
            .map(|i| make_frame(0.0, 0.0, 0.0, if i >= 5 { 0.1 } else { 0.0 }))
            .collect();
        let result = SwingMetrics::default().calculate(&frames);
        let v: Vec<f32> = result.trajectory.iter().map(|pt| pt.wrist_velocity).collect();
        assert!(approx_eq_f32(v[0], 0.0, 1e-4));
        assert!(approx_eq_f32(v[3], 2.0, 1e-4));
        assert!(approx_eq_f32(v[5], 2.0, 1e-4));
        assert!(approx_eq_f32(v[8], 0.0, 1e-4));
    }

    #[test]
    fn test_missing_wrist_holds_position() {
        let mut frames: Vec<NormalizedFrame> = (0..12)
            .map(|i| make_frame(0.0, 0.0, 0.0, 0.01 * i as f32))
            .collect();
        frames[6][LandmarkIndex::LeftWrist as usize] = None;
        frames[7][LandmarkIndex::LeftShoulder as usize] = None;
        let metrics = SwingMetrics::new(10, ImpactDetector::ZeroCrossing);
        let trajectory = metrics.trajectory(&frames, Vector3::x(), Vector3::x());
        assert_eq!(trajectory.len(), 12);
        assert!(approx_eq_f32(trajectory[6].wrist_velocity, 0.0, 1e-4));
        // frame 7 は frame 5 からの差分
        assert!(approx_eq_f32(trajectory[7].wrist_velocity, 2.0, 1e-3));
        assert!(approx_eq_f32(trajectory[7].shoulder_rotation, 0.0, 1e-3));
    }

    #[test]
    fn test_downswing_sequence() {
        assert_eq!(downswing_sequence(20, 30), vec![23, 27, 30]);
        assert_eq!(downswing_sequence(20, 22), vec![21, 22]);
        assert_eq!(downswing_sequence(20, 21), vec![21]);
        assert_eq!(downswing_sequence(30, 30), vec![30]);
        assert_eq!(downswing_sequence(30, 12), vec![12]);
    }

    #[test]
    fn test_result_json_shape() {
        let json = serde_json::to_value(SwingMetricsResult::empty()).unwrap();
        assert_eq!(json["top_of_swing_frame"], 0);
        assert!(json["trajectory"].as_array().unwrap().is_empty());
    }
}

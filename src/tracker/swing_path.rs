use nalgebra::{Rotation3, Unit, Vector3};

use crate::config::PathConfig;
use crate::geometry::safe_normal;
use crate::pose::{landmark_at, LandmarkIndex, PoseFrame};
use crate::tracker::smooth::RollingSmoother;

/// 手の向き補正の回転角（度）
const HAND_ROTATION_DEG: f32 = 40.0;

/// 回転軸として採用する外積の最小長さ二乗
const MIN_AXIS_LENGTH_SQ: f32 = 1e-4;

/// クラブヘッド推定点の軌跡トラッカー
///
/// 右前腕（肘→手首）を親指方向で補正し、手首から延長した点を
/// 平滑化して軌跡に積む。入力は正規化前の生ランドマーク。
pub struct SwingPathTracker {
    extension_factor: f32,
    initial_capacity: usize,
    smoother: RollingSmoother<Vector3<f32>>,
    trail: Vec<Vector3<f32>>,
    /// xyz を詰めた描画用バッファ（capacity * 3 要素を確保済み）
    positions: Vec<f32>,
    capacity: usize,
}

impl SwingPathTracker {
    pub fn new(extension_factor: f32, smoothing_window: usize, initial_capacity: usize) -> Self {
        let initial_capacity = initial_capacity.max(1);
        Self {
            extension_factor,
            initial_capacity,
            smoother: RollingSmoother::new(smoothing_window),
            trail: Vec::new(),
            positions: vec![0.0; initial_capacity * 3],
            capacity: initial_capacity,
        }
    }

    pub fn from_config(config: &PathConfig) -> Self {
        Self::new(
            config.extension_factor,
            config.smoothing_window,
            config.initial_capacity,
        )
    }

    /// 1フレーム分の生ランドマークで更新
    ///
    /// 肘か手首が欠損していれば何もしない。軌跡に点を追加したら true。
    pub fn update(&mut self, frame: &PoseFrame) -> bool {
        let (elbow, wrist) = match (
            landmark_at(frame, LandmarkIndex::RightElbow),
            landmark_at(frame, LandmarkIndex::RightWrist),
        ) {
            (Some(elbow), Some(wrist)) => (elbow.position(), wrist.position()),
            _ => return false,
        };

        let mut direction = safe_normal(&(wrist - elbow));

        // 親指側を基準に手の平面を決め、尺屈方向へ回す
        if let Some(thumb) = landmark_at(frame, LandmarkIndex::RightThumb) {
            let thumb_vector = thumb.position() - wrist;
            let axis = direction.cross(&thumb_vector);
            if axis.norm_squared() > MIN_AXIS_LENGTH_SQ {
                let rotation =
                    Rotation3::from_axis_angle(&Unit::new_normalize(axis), HAND_ROTATION_DEG.to_radians());
                direction = rotation * direction;
            }
        }

        let tip = wrist + direction * self.extension_factor;
        let smoothed = self.smoother.apply(tip);
        self.push(smoothed);
        true
    }

    fn push(&mut self, point: Vector3<f32>) {
        if self.trail.len() + 1 > self.capacity {
            self.grow();
        }
        let offset = self.trail.len() * 3;
        self.positions[offset] = point.x;
        self.positions[offset + 1] = point.y;
        self.positions[offset + 2] = point.z;
        self.trail.push(point);
    }

    /// 容量を倍にして書き込み済み部分をコピー
    fn grow(&mut self) {
        let new_capacity = self.capacity * 2;
        let mut positions = vec![0.0; new_capacity * 3];
        let written = self.trail.len() * 3;
        positions[..written].copy_from_slice(&self.positions[..written]);
        self.positions = positions;
        self.capacity = new_capacity;
    }

    /// 軌跡・平滑化履歴・バッファを初期状態に戻す
    pub fn clear(&mut self) {
        self.trail.clear();
        self.smoother.reset();
        self.positions = vec![0.0; self.initial_capacity * 3];
        self.capacity = self.initial_capacity;
    }

    pub fn trail(&self) -> &[Vector3<f32>] {
        &self.trail
    }

    /// 書き込み済みの 3×N 要素のみ
    pub fn buffer(&self) -> &[f32] {
        &self.positions[..self.trail.len() * 3]
    }

    /// 現在の点容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.trail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }
}

impl Default for SwingPathTracker {
    fn default() -> Self {
        Self::from_config(&PathConfig::default())
    }
}

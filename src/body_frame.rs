use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::geometry::safe_normal;
use crate::pose::{landmark_at, LandmarkIndex, PoseFrame};

/// 身体座標系で表した1フレーム分のランドマーク。欠損は None のまま保持
pub type NormalizedFrame = Vec<Option<Vector3<f32>>>;

/// 録画ごとの身体基準座標系
///
/// - X: 右 (+) / 左 (-)
/// - Y: 前 (+) / 後 (-)
/// - Z: 上 (+) / 下 (-)
///
/// 原点は基準フレームの左右ヒップ中点。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyFrame {
    pub origin: Vector3<f32>,
    pub x_axis: Vector3<f32>,
    pub y_axis: Vector3<f32>,
    pub z_axis: Vector3<f32>,
}

impl BodyFrame {
    /// 1フレームのランドマークから座標系を構築する
    ///
    /// ヒップ・肩が欠損している、または軸が退化する（平行・長さゼロ）場合は None。
    pub fn build(frame: &PoseFrame) -> Option<Self> {
        if frame.len() <= LandmarkIndex::RightHip as usize {
            return None;
        }

        let left_hip = landmark_at(frame, LandmarkIndex::LeftHip)?.position();
        let right_hip = landmark_at(frame, LandmarkIndex::RightHip)?.position();
        let left_shoulder = landmark_at(frame, LandmarkIndex::LeftShoulder)?.position();
        let right_shoulder = landmark_at(frame, LandmarkIndex::RightShoulder)?.position();

        let origin = (left_hip + right_hip) * 0.5;

        // 上方向: ヒップ中点 → 肩中点
        let mid_shoulder = (left_shoulder + right_shoulder) * 0.5;
        let z_axis = non_degenerate(safe_normal(&(mid_shoulder - origin)))?;

        // 右方向: ヒップベクトルを上方向に対して直交化
        let hip_vector = right_hip - left_hip;
        let y_temp = z_axis.cross(&hip_vector);
        let x_axis = non_degenerate(safe_normal(&y_temp.cross(&z_axis)))?;

        let y_axis = non_degenerate(safe_normal(&z_axis.cross(&x_axis)))?;

        Some(Self {
            origin,
            x_axis,
            y_axis,
            z_axis,
        })
    }

    /// ワールド座標の点を身体座標系へ射影
    pub fn to_local(&self, point: &Vector3<f32>) -> Vector3<f32> {
        let v = point - self.origin;
        Vector3::new(v.dot(&self.x_axis), v.dot(&self.y_axis), v.dot(&self.z_axis))
    }

    /// 身体座標系の点をワールド座標へ戻す
    pub fn to_world(&self, local: &Vector3<f32>) -> Vector3<f32> {
        self.origin + self.x_axis * local.x + self.y_axis * local.y + self.z_axis * local.z
    }

    /// フレーム全体を身体座標系へ変換（欠損はそのまま）
    pub fn normalize(&self, frame: &PoseFrame) -> NormalizedFrame {
        frame
            .iter()
            .map(|lm| lm.as_ref().map(|lm| self.to_local(&lm.position())))
            .collect()
    }
}

fn non_degenerate(v: Vector3<f32>) -> Option<Vector3<f32>> {
    if v.norm_squared() == 0.0 {
        None
    } else {
        Some(v)
    }
}

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// BlazePose の 33 ランドマークインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;

    const ALL: [LandmarkIndex; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }
}

/// 単一ランドマーク（ワールド座標）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// 可視性スコア (0.0〜1.0)。推定器が出さない場合は None
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn position(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<Vector3<f32>> for Landmark {
    fn from(v: Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// 1フレーム分のランドマーク列。欠損は None
pub type PoseFrame = [Option<Landmark>];

/// インデックスでランドマークを取得（配列が短い場合も None）
pub fn landmark_at(frame: &PoseFrame, index: LandmarkIndex) -> Option<&Landmark> {
    frame.get(index as usize).and_then(|lm| lm.as_ref())
}

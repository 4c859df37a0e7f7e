use serde::{Deserialize, Serialize};

use crate::body_frame::{BodyFrame, NormalizedFrame};
use crate::config::Config;
use crate::metrics::{SwingMetrics, SwingMetricsResult};
use crate::pose::PoseFrame;
use crate::tracker::SwingPathTracker;

/// 録画1本分の解析結果とサムネイル取得時刻
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub metrics: SwingMetricsResult,
    pub body_frame: BodyFrame,
    /// 入力ストリーム上のアドレスフレーム番号
    pub address_frame: usize,
    pub address_time_secs: f32,
    pub top_of_swing_time_secs: f32,
    pub impact_time_secs: f32,
}

/// 録画セッション
///
/// 最初に座標系を構築できたフレームをアドレスとし、以降のフレームを
/// 身体座標系で蓄積する。軌跡トラッカーは生ランドマークで並行して更新する。
/// 呼び出しは1セッションにつき直列であること。
pub struct SwingSession {
    fps: f32,
    metrics: SwingMetrics,
    path: SwingPathTracker,
    body_frame: Option<BodyFrame>,
    history: Vec<NormalizedFrame>,
    /// history の各要素の入力フレーム番号
    frame_numbers: Vec<usize>,
    frames_seen: usize,
}

impl SwingSession {
    pub fn new(fps: f32, metrics: SwingMetrics, path: SwingPathTracker) -> Self {
        Self {
            fps,
            metrics,
            path,
            body_frame: None,
            history: Vec::new(),
            frame_numbers: Vec::new(),
            frames_seen: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.capture.fps,
            SwingMetrics::from_config(&config.metrics),
            SwingPathTracker::from_config(&config.path),
        )
    }

    /// 1フレーム分の生ランドマークを取り込む
    ///
    /// 座標系がまだ無く、このフレームでも構築できなければ None。
    pub fn push_frame(&mut self, frame: &PoseFrame) -> Option<&NormalizedFrame> {
        let frame_number = self.frames_seen;
        self.frames_seen += 1;

        if frame.iter().all(Option::is_none) {
            return None;
        }

        self.path.update(frame);

        let body_frame = match self.body_frame {
            Some(bf) => bf,
            None => {
                let bf = BodyFrame::build(frame)?;
                tracing::debug!(frame_number, origin = ?bf.origin, "body frame established");
                self.body_frame = Some(bf);
                bf
            }
        };

        self.history.push(body_frame.normalize(frame));
        self.frame_numbers.push(frame_number);
        self.history.last()
    }

    /// 録画終了時の一括解析
    ///
    /// 座標系が作れなかった、またはフレーム不足なら None。
    pub fn finish(&self) -> Option<SessionReport> {
        let Some(body_frame) = self.body_frame else {
            tracing::warn!(
                "No usable frame to build a body frame ({} frames seen)",
                self.frames_seen
            );
            return None;
        };

        let metrics = self.metrics.calculate(&self.history);
        if metrics.is_empty() {
            return None;
        }

        let address_time_secs = self.capture_time(0)?;
        let top_of_swing_time_secs = self.capture_time(metrics.top_of_swing_frame)?;
        let impact_time_secs = self.capture_time(metrics.impact_frame)?;

        Some(SessionReport {
            address_frame: self.frame_numbers[0],
            address_time_secs,
            top_of_swing_time_secs,
            impact_time_secs,
            body_frame,
            metrics,
        })
    }

    /// history のインデックスを入力ストリーム上の時刻（秒）に変換
    pub fn capture_time(&self, history_index: usize) -> Option<f32> {
        self.frame_numbers
            .get(history_index)
            .map(|&n| n as f32 / self.fps)
    }

    /// 次の録画のために全状態を破棄
    pub fn reset(&mut self) {
        self.body_frame = None;
        self.history.clear();
        self.frame_numbers.clear();
        self.frames_seen = 0;
        self.path.clear();
    }

    pub fn body_frame(&self) -> Option<&BodyFrame> {
        self.body_frame.as_ref()
    }

    pub fn history(&self) -> &[NormalizedFrame] {
        &self.history
    }

    pub fn path(&self) -> &SwingPathTracker {
        &self.path
    }

    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }
}

impl Default for SwingSession {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

use std::ops::{Add, Div};

/// 移動平均できるサンプル型（f32, Vector3<f32> など）
pub trait Sample: Copy + Add<Output = Self> + Div<f32, Output = Self> {}

impl<T> Sample for T where T: Copy + Add<Output = T> + Div<f32, Output = T> {}

/// 後ろ向き移動平均
///
/// `history` の末尾 `window - 1` 件と `sample` の平均を返す。
/// `window <= 1` または履歴が空なら `sample` をそのまま返す。
pub fn smooth<T: Sample>(history: &[T], sample: T, window: usize) -> T {
    if window <= 1 || history.is_empty() {
        return sample;
    }

    let take = (window - 1).min(history.len());
    let recent = &history[history.len() - take..];
    let sum = recent.iter().fold(sample, |acc, &s| acc + s);
    sum / (take + 1) as f32
}

/// 中心移動平均（前後 `radius` 件、端は切り詰め）
pub fn smooth_centered<T: Sample>(values: &[T], radius: usize) -> Vec<T> {
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(radius);
            let end = (i + radius + 1).min(values.len());
            let window = &values[start..end];
            let sum = window[1..].iter().fold(window[0], |acc, &s| acc + s);
            sum / window.len() as f32
        })
        .collect()
}

/// 固定長の履歴を持つローリング平滑化
pub struct RollingSmoother<T: Sample> {
    window: usize,
    history: Vec<T>,
}

impl<T: Sample> RollingSmoother<T> {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            history: Vec::with_capacity(window + 1),
        }
    }

    /// 平滑化した値を返し、履歴に積む
    pub fn apply(&mut self, sample: T) -> T {
        let smoothed = smooth(&self.history, sample, self.window);
        self.history.push(smoothed);
        if self.history.len() > self.window {
            self.history.remove(0);
        }
        smoothed
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::metrics::ImpactDetector;

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub path: PathConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// スイング軌跡の設定
#[derive(Debug, Deserialize, Clone)]
pub struct PathConfig {
    /// 手首からクラブヘッド推定点までの延長係数
    #[serde(default = "default_extension_factor")]
    pub extension_factor: f32,
    /// 移動平均の窓幅（フレーム）
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,
    /// 描画バッファの初期点容量
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
}

/// スイング指標の設定
#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    /// 指標計算に必要な最小フレーム数
    #[serde(default = "default_min_frames")]
    pub min_frames: usize,
    /// インパクト検出方式
    #[serde(default)]
    pub impact: ImpactDetector,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaptureConfig {
    /// 録画のフレームレート（フレーム番号→秒の換算のみに使う）
    #[serde(default = "default_fps")]
    pub fps: f32,
}

fn default_extension_factor() -> f32 { 1.2 }
fn default_smoothing_window() -> usize { 6 }
fn default_initial_capacity() -> usize { 1000 }
fn default_min_frames() -> usize { 10 }
fn default_fps() -> f32 { 30.0 }

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            extension_factor: default_extension_factor(),
            smoothing_window: default_smoothing_window(),
            initial_capacity: default_initial_capacity(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            min_frames: default_min_frames(),
            impact: ImpactDetector::default(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { fps: default_fps() }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// 読めなければデフォルト値
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }
}

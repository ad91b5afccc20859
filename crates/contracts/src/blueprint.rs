//! RelayBlueprint - Config Loader 输出
//!
//! 描述完整的中继配置：聚合窗口、来源标注、源端限制、转码暂存、输出路由。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的中继配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 聚合与标注设置
    #[serde(default)]
    pub relay: RelayOptions,

    /// 源平台设置
    #[serde(default)]
    pub source: SourceOptions,

    /// 转码器设置
    #[serde(default)]
    pub converter: ConverterOptions,

    /// 输出路由配置
    pub sinks: Vec<SinkSpec>,
}

/// 聚合与标注设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayOptions {
    /// 组内首个事件之后的静默窗口（毫秒），窗口结束后整组刷出
    #[serde(default = "default_quiet_window_ms")]
    pub quiet_window_ms: u64,

    /// 标注转发来源时拼在名称前的模板文本
    #[serde(default = "default_origin_template")]
    pub origin_template: String,
}

impl RelayOptions {
    /// 以 `Duration` 表示的静默窗口。
    pub fn quiet_window(&self) -> Duration {
        Duration::from_millis(self.quiet_window_ms)
    }
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            quiet_window_ms: default_quiet_window_ms(),
            origin_template: default_origin_template(),
        }
    }
}

fn default_quiet_window_ms() -> u64 {
    5000
}

fn default_origin_template() -> String {
    "Forwarded from ".to_string()
}

/// 源平台设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceOptions {
    /// 源端接受的最大资源大小（字节）
    #[serde(default = "default_max_asset_bytes")]
    pub max_asset_bytes: u64,

    /// 文件型资源引用的根目录（回放模式）
    #[serde(default)]
    pub assets_root: Option<PathBuf>,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            max_asset_bytes: default_max_asset_bytes(),
            assets_root: None,
        }
    }
}

fn default_max_asset_bytes() -> u64 {
    20 * 1024 * 1024
}

/// 转码器设置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConverterOptions {
    /// 转码临时文件目录；默认使用系统临时目录
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// 显式 ffmpeg 路径；默认取 PATH 中的 `ffmpeg`
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// HTTP webhook 端点
    Webhook,
    /// 仅日志输出，用于调试与 dry-run
    Log,
}

/// 单个投递目标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkSpec {
    /// Sink 名称（用于日志/指标）
    pub name: String,

    /// Sink 类型
    pub kind: SinkKind,

    /// Webhook 端点 URL（`kind = "webhook"` 时必填）
    #[serde(default)]
    pub url: Option<String>,

    /// 可接受的最大载荷（字节）；超限载荷直接排除，绝不截断
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: u64,

    /// 投递时抑制通知
    #[serde(default)]
    pub silent: bool,
}

fn default_max_payload_bytes() -> u64 {
    10 * 1024 * 1024
}

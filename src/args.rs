// 该文件是 Huxing （户型识别） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{Args, Parser};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::{
  frame::RGB_CHANNELS,
  model::{EngineConfig, EngineError, EngineLoader, ResizeMode, loader_from_url},
  server::ServerOptions,
};

/// 检测引擎参数
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
  /// 检测引擎地址，例如 replay:///srv/huxing/record.json
  #[arg(long, env = "HUXING_MODEL", value_name = "MODEL")]
  pub model: Url,

  /// 类别数量（背景 + 墙 + 窗 + 门）
  #[arg(long, env = "HUXING_NUM_CLASSES", default_value = "4", value_name = "COUNT")]
  pub num_classes: usize,

  /// 均值像素 (R,G,B)
  #[arg(
    long,
    env = "HUXING_MEAN_PIXEL",
    default_value = "123.7,116.8,103.9",
    value_parser = parse_mean_pixel,
    value_name = "R,G,B"
  )]
  pub mean_pixel: [f32; RGB_CHANNELS],

  /// 引擎缩放方式: square, pad64, crop, none
  #[arg(long, env = "HUXING_RESIZE_MODE", default_value = "square", value_name = "MODE")]
  pub resize_mode: ResizeMode,

  /// 上传图像宽或高的像素上限
  #[arg(long, env = "HUXING_MAX_IMAGE_SIDE", default_value = "4096", value_name = "PIXELS")]
  pub max_image_side: u32,

  /// 等待检测引擎的最长时间（秒）
  #[arg(long, env = "HUXING_LOCK_TIMEOUT_SECS", default_value = "30", value_name = "SECONDS")]
  pub lock_timeout_secs: u64,
}

impl EngineArgs {
  pub fn engine_config(&self) -> EngineConfig {
    EngineConfig {
      num_classes: self.num_classes,
      mean_pixel: self.mean_pixel,
      resize_mode: self.resize_mode,
    }
  }

  pub fn lock_timeout(&self) -> Duration {
    Duration::from_secs(self.lock_timeout_secs)
  }

  pub fn loader(&self) -> Result<Arc<dyn EngineLoader>, EngineError> {
    loader_from_url(&self.model, self.engine_config())
  }
}

/// Huxing 服务参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct ServeArgs {
  /// 监听地址
  #[arg(long, env = "HUXING_BIND", default_value = "0.0.0.0:5001", value_name = "ADDR")]
  pub bind: String,

  #[command(flatten)]
  pub engine: EngineArgs,

  /// 启动时立即初始化检测引擎
  #[arg(long, env = "HUXING_EAGER")]
  pub eager: bool,

  /// 首页与静态资源目录
  #[arg(long, env = "HUXING_STATIC_DIR", default_value = "static", value_name = "DIR")]
  pub static_dir: PathBuf,

  /// 上传文件大小上限（MB）
  #[arg(long, env = "HUXING_MAX_UPLOAD_MB", default_value = "16", value_name = "MB")]
  pub max_upload_mb: usize,
}

impl ServeArgs {
  pub fn server_options(&self) -> ServerOptions {
    ServerOptions {
      static_dir: self.static_dir.clone(),
      max_upload_bytes: self.max_upload_mb * 1024 * 1024,
    }
  }
}

pub const DEFAULT_LOG_FILTER: &str = "info";

/// 日志过滤规则，未设置或无法解析时使用 info
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
  directives
    .and_then(|d| EnvFilter::try_new(d).ok())
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// 按 RUST_LOG 初始化日志输出
pub fn init_tracing() {
  let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
  tracing_subscriber::fmt()
    .with_env_filter(log_filter(directives.as_deref()))
    .init();
}

fn parse_mean_pixel(s: &str) -> Result<[f32; RGB_CHANNELS], String> {
  let values = s
    .split(',')
    .map(|v| v.trim().parse::<f32>().map_err(|e| format!("{}: {}", v, e)))
    .collect::<Result<Vec<_>, _>>()?;

  values
    .try_into()
    .map_err(|v: Vec<f32>| format!("均值像素需要 {} 个值, 实际为 {}", RGB_CHANNELS, v.len()))
}

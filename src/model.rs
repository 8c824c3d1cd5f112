// 该文件是 Huxing （户型识别） 项目的一部分。
// src/model.rs - 检测模型
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

use std::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

use crate::frame::{MoldedTensor, RGB_CHANNELS};

/// 户型图中的构件类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloorPlanLabel {
  Wall,
  Window,
  Door,
}

pub trait WithLabel: Sized + fmt::Debug {
  fn to_label_str(&self) -> &'static str;
  fn to_label_id(&self) -> u32;
  /// 表外的类别编号返回 None
  fn from_label_id(id: u32) -> Option<Self>;
}

impl WithLabel for FloorPlanLabel {
  fn to_label_str(&self) -> &'static str {
    match self {
      FloorPlanLabel::Wall => "wall",
      FloorPlanLabel::Window => "window",
      FloorPlanLabel::Door => "door",
    }
  }

  fn to_label_id(&self) -> u32 {
    match self {
      FloorPlanLabel::Wall => 1,
      FloorPlanLabel::Window => 2,
      FloorPlanLabel::Door => 3,
    }
  }

  fn from_label_id(id: u32) -> Option<Self> {
    match id {
      1 => Some(FloorPlanLabel::Wall),
      2 => Some(FloorPlanLabel::Window),
      3 => Some(FloorPlanLabel::Door),
      _ => None,
    }
  }
}

impl fmt::Display for FloorPlanLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.to_label_str())
  }
}

/// 实例分割掩码，按行优先排列
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DetectionMask {
  pub height: usize,
  pub width: usize,
  pub data: Vec<bool>,
}

/// 引擎输出的单个检测结果
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Detection {
  pub class_id: u32,
  pub roi: [i32; 4], // [top, left, bottom, right]
  #[serde(default)]
  pub score: f32,
  #[serde(default)]
  pub mask: Option<DetectionMask>,
}

impl Detection {
  pub fn new(class_id: u32, roi: [i32; 4], score: f32) -> Self {
    Self {
      class_id,
      roi,
      score,
      mask: None,
    }
  }

  pub fn label(&self) -> Option<FloorPlanLabel> {
    FloorPlanLabel::from_label_id(self.class_id)
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectResult {
  pub items: Box<[Detection]>,
}

impl DetectResult {
  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}

impl From<Vec<Detection>> for DetectResult {
  fn from(items: Vec<Detection>) -> Self {
    Self {
      items: items.into_boxed_slice(),
    }
  }
}

/// 引擎自身的缩放方式，仅透传给引擎
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
  #[default]
  Square,
  Pad64,
  Crop,
  None,
}

impl FromStr for ResizeMode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "square" => Ok(ResizeMode::Square),
      "pad64" => Ok(ResizeMode::Pad64),
      "crop" => Ok(ResizeMode::Crop),
      "none" => Ok(ResizeMode::None),
      other => Err(format!("未知的缩放方式: {}", other)),
    }
  }
}

/// 检测引擎配置
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
  /// 类别数量（含背景）
  pub num_classes: usize,
  /// 训练时的均值像素
  pub mean_pixel: [f32; RGB_CHANNELS],
  pub resize_mode: ResizeMode,
}

pub const DEFAULT_NUM_CLASSES: usize = 1 + 3;
pub const DEFAULT_MEAN_PIXEL: [f32; RGB_CHANNELS] = [123.7, 116.8, 103.9];

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      num_classes: DEFAULT_NUM_CLASSES,
      mean_pixel: DEFAULT_MEAN_PIXEL,
      resize_mode: ResizeMode::default(),
    }
  }
}

#[derive(Error, Debug)]
pub enum EngineError {
  #[error("权重文件读取错误: {0}")]
  WeightsIo(#[from] std::io::Error),
  #[error("模型文件格式错误: {0}")]
  Malformed(String),
  #[error("模型结构不匹配: 期望 {expected} 个类别, 实际为 {found}")]
  ArchitectureMismatch { expected: usize, found: usize },
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
  #[error("推理失败: {0}")]
  Inference(String),
}

/// 不可重入的检测引擎，调用方必须保证同一时刻只有一个推理
pub trait DetectionEngine: Send {
  fn detect(&mut self, input: &MoldedTensor) -> Result<DetectResult, EngineError>;
}

/// 负责构建检测引擎，可能被多次调用直到成功
pub trait EngineLoader: Send + Sync {
  fn config(&self) -> &EngineConfig;
  fn load(&self) -> Result<Box<dyn DetectionEngine>, EngineError>;
}

mod guard;
mod replay;
pub use self::guard::{DetectionEngineGuard, GuardError};
pub use self::replay::{ReplayEngine, ReplayEngineBuilder};

/// 按 URL 方案选择检测引擎
pub fn loader_from_url(
  url: &url::Url,
  config: EngineConfig,
) -> Result<std::sync::Arc<dyn EngineLoader>, EngineError> {
  use crate::{FromUrl, FromUrlWithScheme};

  match url.scheme() {
    ReplayEngineBuilder::SCHEME => {
      let builder = ReplayEngineBuilder::from_url(url)?.with_config(config);
      Ok(std::sync::Arc::new(builder))
    }
    other => Err(EngineError::ModelPathError(format!(
      "不支持的模型方案: {}",
      other
    ))),
  }
}

// 该文件是 Huxing （户型识别） 项目的一部分。
// src/model/replay.rs - 回放检测引擎
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

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::MoldedTensor,
  model::{DetectResult, Detection, DetectionEngine, EngineConfig, EngineError, EngineLoader},
};

/// 记录文件格式
#[derive(Debug, Deserialize)]
struct ReplayRecord {
  num_classes: usize,
  detections: Vec<Detection>,
}

/// 从记录文件回放固定检测结果的引擎
///
/// 记录只在初始化时读取一次，之后每次推理都返回同一份结果。
pub struct ReplayEngine {
  detections: DetectResult,
  runs: u64,
}

impl ReplayEngine {
  pub fn runs(&self) -> u64 {
    self.runs
  }
}

impl DetectionEngine for ReplayEngine {
  fn detect(&mut self, input: &MoldedTensor) -> Result<DetectResult, EngineError> {
    let shape = input.shape();
    debug!("回放引擎输入形状: {:?}", shape);
    if shape.contains(&0) {
      return Err(EngineError::Inference(format!(
        "输入张量为空: {:?}",
        shape
      )));
    }

    self.runs += 1;
    debug!("第 {} 次回放, 检测到 {} 个物体", self.runs, self.detections.len());
    Ok(self.detections.clone())
  }
}

pub struct ReplayEngineBuilder {
  record_path: PathBuf,
  config: EngineConfig,
}

impl FromUrlWithScheme for ReplayEngineBuilder {
  const SCHEME: &'static str = "replay";
}

impl FromUrl for ReplayEngineBuilder {
  type Error = EngineError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(EngineError::ModelPathError(format!(
        "模型路径必须使用 {} 方案, 实际为 {}",
        Self::SCHEME,
        url.scheme()
      )));
    }

    let path = url.path();
    if path.is_empty() || path == "/" {
      return Err(EngineError::ModelPathError("模型路径为空".to_string()));
    }

    Ok(ReplayEngineBuilder::new(path))
  }
}

impl ReplayEngineBuilder {
  pub fn new(record_path: impl AsRef<Path>) -> Self {
    Self {
      record_path: record_path.as_ref().to_path_buf(),
      config: EngineConfig::default(),
    }
  }

  pub fn with_config(mut self, config: EngineConfig) -> Self {
    self.config = config;
    self
  }

  pub fn build(&self) -> Result<ReplayEngine, EngineError> {
    info!("加载记录文件: {}", self.record_path.display());
    let data = std::fs::read(&self.record_path)?;
    debug!("记录文件大小: {:.2} KB", data.len() as f64 / 1024.0);

    let record: ReplayRecord =
      serde_json::from_slice(&data).map_err(|e| EngineError::Malformed(e.to_string()))?;

    if record.num_classes != self.config.num_classes {
      error!(
        "预期模型类别数量为 {}, 实际为 {}",
        self.config.num_classes, record.num_classes
      );
      return Err(EngineError::ArchitectureMismatch {
        expected: self.config.num_classes,
        found: record.num_classes,
      });
    }

    info!("回放引擎加载完成, 共 {} 条检测记录", record.detections.len());
    Ok(ReplayEngine {
      detections: record.detections.into(),
      runs: 0,
    })
  }
}

impl EngineLoader for ReplayEngineBuilder {
  fn config(&self) -> &EngineConfig {
    &self.config
  }

  fn load(&self) -> Result<Box<dyn DetectionEngine>, EngineError> {
    Ok(Box::new(self.build()?))
  }
}

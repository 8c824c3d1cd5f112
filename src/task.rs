// 该文件是 Huxing （户型识别） 项目的一部分。
// src/task.rs - 户型图分析任务
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

use std::{sync::Arc, time::Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::{
  frame::MoldedTensor,
  input::{DEFAULT_MAX_IMAGE_SIDE, NormalizeError, normalize},
  model::{Detection, DetectionEngineGuard, GuardError},
  output::{AnalysisSummary, ConsistencyError, assemble, average_door_span, project},
};

#[derive(Error, Debug)]
pub enum AnalysisError {
  #[error("图像无效: {0}")]
  InvalidImage(#[from] NormalizeError),
  #[error(transparent)]
  Engine(#[from] GuardError),
  #[error("内部一致性错误: {0}")]
  Consistency(#[from] ConsistencyError),
  #[error("预处理任务异常退出: {0}")]
  Aborted(String),
}

/// 解码、推理与后处理的完整流程
///
/// 只有推理这一步在守卫内串行，其余步骤按请求并行。
#[derive(Clone)]
pub struct AnalysisTask {
  guard: Arc<DetectionEngineGuard>,
  max_image_side: u32,
}

impl AnalysisTask {
  pub fn new(guard: Arc<DetectionEngineGuard>) -> Self {
    Self {
      guard,
      max_image_side: DEFAULT_MAX_IMAGE_SIDE,
    }
  }

  /// 上传图像的单边像素上限
  pub fn with_max_image_side(mut self, max_image_side: u32) -> Self {
    self.max_image_side = max_image_side;
    self
  }

  pub async fn run(&self, bytes: Vec<u8>) -> Result<AnalysisSummary, AnalysisError> {
    info!("开始分析, 输入大小: {} 字节", bytes.len());
    let now = Instant::now();

    let mean_pixel = self.guard.config().mean_pixel;
    let max_side = self.max_image_side;
    let (tensor, width, height) = tokio::task::spawn_blocking(move || {
      let (frame, width, height) = normalize(&bytes, max_side)?;
      Ok::<_, NormalizeError>((MoldedTensor::mold(frame, &mean_pixel), width, height))
    })
    .await
    .map_err(|e| AnalysisError::Aborted(e.to_string()))??;
    debug!("输入张量形状: {:?}", tensor.shape());
    let preprocessed = now.elapsed();
    info!("预处理完成 ({}x{})，耗时: {:.2?}", width, height, preprocessed);

    let result = self.guard.detect(tensor).await?;
    let inferred = now.elapsed();
    info!(
      "推理完成，检测到 {} 个物体，耗时: {:.2?}",
      result.len(),
      inferred - preprocessed
    );

    let summary = summarize(&result.items, width, height)?;
    info!("分析完成，总耗时: {:.2?}", now.elapsed());
    Ok(summary)
  }
}

/// 从同一组检测结果派生构件列表与平均门宽
pub fn summarize(
  detections: &[Detection],
  width: u32,
  height: u32,
) -> Result<AnalysisSummary, ConsistencyError> {
  let (features, labels) = project(detections);
  let average_door = average_door_span(detections);
  assemble(features, &labels, width, height, average_door)
}

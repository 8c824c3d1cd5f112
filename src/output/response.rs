// 该文件是 Huxing （户型识别） 项目的一部分。
// src/output/response.rs - 分析结果组装
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

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::{
  model::{FloorPlanLabel, WithLabel},
  output::{FeatureBox, SemanticFeature},
};

#[derive(Error, Debug, PartialEq)]
pub enum ConsistencyError {
  #[error("后处理结果长度不一致: {features} 个构件, {labels} 个类别")]
  LengthMismatch { features: usize, labels: usize },
  #[error("第 {index} 个构件类别不一致: {feature} / {label}")]
  LabelMismatch {
    index: usize,
    feature: FloorPlanLabel,
    label: FloorPlanLabel,
  },
  #[error("平均门宽不是有限值: {0}")]
  NonFiniteMetric(f64),
}

/// 单张户型图的分析结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "PredictionBody")]
pub struct AnalysisSummary {
  pub features: Vec<SemanticFeature>,
  pub width: u32,
  pub height: u32,
  pub average_door_span: f64,
}

/// 返回给客户端的 JSON 结构，`points` 与 `classes` 按位置一一对应
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionBody {
  pub points: Vec<FeatureBox>,
  pub classes: Vec<&'static str>,
  #[serde(rename = "Width")]
  pub width: u32,
  #[serde(rename = "Height")]
  pub height: u32,
  #[serde(rename = "averageDoor")]
  pub average_door: f64,
}

impl From<AnalysisSummary> for PredictionBody {
  fn from(summary: AnalysisSummary) -> Self {
    let (points, classes) = summary
      .features
      .iter()
      .map(|f| (f.bbox, f.label.to_label_str()))
      .unzip();

    Self {
      points,
      classes,
      width: summary.width,
      height: summary.height,
      average_door: summary.average_door_span,
    }
  }
}

pub fn assemble(
  features: Vec<SemanticFeature>,
  labels: &[FloorPlanLabel],
  width: u32,
  height: u32,
  average_door_span: f64,
) -> Result<AnalysisSummary, ConsistencyError> {
  if features.len() != labels.len() {
    let err = ConsistencyError::LengthMismatch {
      features: features.len(),
      labels: labels.len(),
    };
    error!("结果组装失败: {}", err);
    return Err(err);
  }

  if let Some((index, (feature, &label))) = features
    .iter()
    .zip(labels)
    .enumerate()
    .find(|(_, (feature, label))| feature.label != **label)
  {
    let err = ConsistencyError::LabelMismatch {
      index,
      feature: feature.label,
      label,
    };
    error!("结果组装失败: {}", err);
    return Err(err);
  }

  if !average_door_span.is_finite() {
    error!("结果组装失败: 平均门宽为 {}", average_door_span);
    return Err(ConsistencyError::NonFiniteMetric(average_door_span));
  }

  Ok(AnalysisSummary {
    features,
    width,
    height,
    average_door_span,
  })
}

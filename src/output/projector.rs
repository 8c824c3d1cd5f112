// 该文件是 Huxing （户型识别） 项目的一部分。
// src/output/projector.rs - 检测框到客户端坐标的投影
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
use tracing::{debug, warn};

use crate::model::{Detection, FloorPlanLabel};

/// 客户端坐标系下的框，(x1, y1) 为左上角，(x2, y2) 为右下角
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureBox {
  pub x1: i32,
  pub y1: i32,
  pub x2: i32,
  pub y2: i32,
}

impl From<[i32; 4]> for FeatureBox {
  /// 只做字段重命名，数值不变
  fn from([top, left, bottom, right]: [i32; 4]) -> Self {
    Self {
      x1: left,
      y1: top,
      x2: right,
      y2: bottom,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticFeature {
  pub label: FloorPlanLabel,
  pub bbox: FeatureBox,
}

/// 将检测结果转换为语义构件，保持引擎输出顺序
///
/// 类别表之外的检测会被丢弃。
pub fn project(detections: &[Detection]) -> (Vec<SemanticFeature>, Vec<FloorPlanLabel>) {
  let mut features = Vec::with_capacity(detections.len());
  let mut labels = Vec::with_capacity(detections.len());

  for (index, detection) in detections.iter().enumerate() {
    let Some(label) = detection.label() else {
      warn!(
        "丢弃第 {} 个检测: 未知类别 {}, 框 {:?}",
        index, detection.class_id, detection.roi
      );
      continue;
    };

    features.push(SemanticFeature {
      label,
      bbox: FeatureBox::from(detection.roi),
    });
    labels.push(label);
  }

  debug!("投影完成: {} / {} 个检测", features.len(), detections.len());
  (features, labels)
}

// 该文件是 Huxing （户型识别） 项目的一部分。
// src/output/door.rs - 平均门宽
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

use tracing::debug;

use crate::model::{Detection, FloorPlanLabel};

/// 没有检测到门时使用的平均门宽
pub const DOOR_SPAN_FALLBACK: f64 = 1.0;

fn diagonal([top, left, bottom, right]: [i32; 4]) -> f64 {
  let dx = f64::from(right) - f64::from(left);
  let dy = f64::from(bottom) - f64::from(top);
  dx.hypot(dy)
}

/// 所有门的检测框对角线长度的平均值
pub fn average_door_span(detections: &[Detection]) -> f64 {
  let (count, total) = detections
    .iter()
    .filter(|d| d.label() == Some(FloorPlanLabel::Door))
    .fold((0usize, 0.0f64), |(count, total), d| {
      (count + 1, total + diagonal(d.roi))
    });

  if count == 0 {
    debug!("未检测到门，使用默认门宽 {}", DOOR_SPAN_FALLBACK);
    return DOOR_SPAN_FALLBACK;
  }

  let average = total / count as f64;
  debug!("检测到 {} 扇门，平均门宽 {:.2}", count, average);
  average
}

// 该文件是 Huxing （户型识别） 项目的一部分。
// src/frame.rs - NHWC 帧与模型输入张量定义
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

pub const RGB_CHANNELS: usize = 3;

/// 按 (H, W, 3) 排列的 RGB 像素帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbNhwcFrame {
  data: Box<[u8]>,
  height: usize,
  width: usize,
}

impl RgbNhwcFrame {
  /// 从已按 NHWC 排列的数据构建，长度不匹配时返回 None
  pub fn from_raw(height: usize, width: usize, data: Vec<u8>) -> Option<Self> {
    if data.len() != RGB_CHANNELS * height * width {
      return None;
    }
    Some(Self {
      data: data.into_boxed_slice(),
      height,
      width,
    })
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  pub fn as_nhwc(&self) -> &[u8] {
    &self.data
  }
}

/// 减去均值像素后的模型输入，形状为 (1, H, W, 3)
#[derive(Debug, Clone, PartialEq)]
pub struct MoldedTensor {
  data: Box<[f32]>,
  height: usize,
  width: usize,
}

impl MoldedTensor {
  /// 按通道减去均值像素，消耗原始帧
  pub fn mold(frame: RgbNhwcFrame, mean_pixel: &[f32; RGB_CHANNELS]) -> Self {
    let (height, width) = (frame.height, frame.width);
    let data = frame
      .data
      .chunks_exact(RGB_CHANNELS)
      .flat_map(|px| {
        px.iter()
          .zip(mean_pixel)
          .map(|(&value, &mean)| value as f32 - mean)
      })
      .collect::<Vec<_>>()
      .into_boxed_slice();

    Self {
      data,
      height,
      width,
    }
  }

  pub fn shape(&self) -> [usize; 4] {
    [1, self.height, self.width, RGB_CHANNELS]
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.data
  }
}

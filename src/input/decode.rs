// 该文件是 Huxing （户型识别） 项目的一部分。
// src/input/decode.rs - 图像解码与通道归一化
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

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageError, ImageReader, Limits};
use thiserror::Error;
use tracing::debug;

use crate::frame::{RGB_CHANNELS, RgbNhwcFrame};

#[derive(Error, Debug)]
pub enum NormalizeError {
  #[error("Image decoding error: {0}")]
  Decode(#[from] ImageError),
  #[error("Image format detection error: {0}")]
  Format(#[from] std::io::Error),
  #[error("Image exceeds {0} pixels per side")]
  TooLarge(u32),
  #[error("Image has zero size: {0}x{1}")]
  EmptyImage(u32, u32),
  #[error("Unsupported channel count: {0}")]
  UnsupportedChannels(u8),
}

/// 上传图像单边像素上限的缺省值
pub const DEFAULT_MAX_IMAGE_SIDE: u32 = 4096;

/// 解码上传字节并归一化为三通道 RGB 帧，返回 (帧, 宽, 高)
///
/// 宽或高超过 `max_side` 的图像在分配像素缓冲之前被拒绝。
/// 不做缩放，缩放策略由检测引擎自身的配置决定。
pub fn normalize(
  bytes: &[u8],
  max_side: u32,
) -> Result<(RgbNhwcFrame, u32, u32), NormalizeError> {
  let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;

  let mut limits = Limits::default();
  limits.max_image_width = Some(max_side);
  limits.max_image_height = Some(max_side);
  reader.limits(limits);

  let image = reader.decode().map_err(|e| match e {
    ImageError::Limits(_) => NormalizeError::TooLarge(max_side),
    e => NormalizeError::Decode(e),
  })?;
  normalize_image(&image)
}

pub fn normalize_image(image: &DynamicImage) -> Result<(RgbNhwcFrame, u32, u32), NormalizeError> {
  let (width, height) = image.dimensions();
  if width == 0 || height == 0 {
    return Err(NormalizeError::EmptyImage(width, height));
  }

  let channels = image.color().channel_count();
  debug!("解码图像: {}x{}, 通道数 {}", width, height, channels);

  let data = match channels {
    // 灰度（含带透明度的灰度）复制到三个通道
    1 | 2 => image
      .to_luma8()
      .into_raw()
      .into_iter()
      .flat_map(|v| [v; RGB_CHANNELS])
      .collect(),
    3 => image.to_rgb8().into_raw(),
    // 丢弃第四个通道，前三个通道原样保留
    4 => image
      .to_rgba8()
      .into_raw()
      .chunks_exact(4)
      .flat_map(|px| [px[0], px[1], px[2]])
      .collect(),
    n => return Err(NormalizeError::UnsupportedChannels(n)),
  };

  let frame = RgbNhwcFrame::from_raw(height as usize, width as usize, data)
    .ok_or(NormalizeError::UnsupportedChannels(channels))?;

  Ok((frame, width, height))
}

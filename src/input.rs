// 该文件是 Huxing （户型识别） 项目的一部分。
// src/input.rs - 上传图像输入
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

mod decode;

pub use self::decode::{DEFAULT_MAX_IMAGE_SIDE, NormalizeError, normalize, normalize_image};

/// 上传的原始图像，附带客户端声明的内容类型
#[derive(Debug, Clone)]
pub struct UploadedImage {
  pub bytes: Vec<u8>,
  pub content_type: Option<String>,
}

impl UploadedImage {
  pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
    Self {
      bytes,
      content_type,
    }
  }

  /// 内容类型是否声明为 image/*
  pub fn is_image(&self) -> bool {
    self
      .content_type
      .as_deref()
      .map(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
      .unwrap_or(false)
  }
}

// 该文件是 Huxing （户型识别） 项目的一部分。
// src/server/routes.rs - 预测路由
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

use std::sync::Arc;

use axum::{
  Json,
  extract::{Multipart, State, multipart::MultipartRejection},
};
use tracing::debug;

use crate::{input::UploadedImage, output::AnalysisSummary, server::{ApiError, AppState}};

const IMAGE_FIELD: &str = "image";

/// POST /predict - multipart 表单中 `image` 字段为户型图
pub async fn predict(
  State(state): State<Arc<AppState>>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisSummary>, ApiError> {
  let mut multipart =
    multipart.map_err(|e| ApiError::BadRequest(format!("请求不是 multipart 表单: {}", e)))?;

  let upload = read_image_field(&mut multipart).await?;
  if !upload.is_image() {
    return Err(ApiError::BadRequest(format!(
      "上传文件不是图像类型: {}",
      upload.content_type.as_deref().unwrap_or("未声明")
    )));
  }

  let summary = state.task.run(upload.bytes).await?;
  Ok(Json(summary))
}

async fn read_image_field(multipart: &mut Multipart) -> Result<UploadedImage, ApiError> {
  while let Some(field) = multipart.next_field().await? {
    if field.name() != Some(IMAGE_FIELD) {
      debug!("忽略表单字段: {:?}", field.name());
      continue;
    }

    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await?;
    debug!("收到图像: {} 字节, 类型 {:?}", bytes.len(), content_type);
    return Ok(UploadedImage::new(bytes.to_vec(), content_type));
  }

  Err(ApiError::BadRequest("请求中没有 image 字段".to_string()))
}

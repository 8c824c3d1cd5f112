// 该文件是 Huxing （户型识别） 项目的一部分。
// src/server/error.rs - HTTP 错误响应
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

use axum::{
  Json,
  extract::multipart::MultipartError,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::{model::GuardError, task::AnalysisError};

#[derive(Error, Debug)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),
  #[error("上传读取失败: {}", .0.body_text())]
  Multipart(#[from] MultipartError),
  #[error(transparent)]
  Analysis(#[from] AnalysisError),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Multipart(e) => e.status(),
      ApiError::Analysis(AnalysisError::InvalidImage(_)) => StatusCode::BAD_REQUEST,
      ApiError::Analysis(AnalysisError::Engine(GuardError::Timeout(_))) => {
        StatusCode::SERVICE_UNAVAILABLE
      }
      ApiError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = self.to_string();
    if status.is_server_error() {
      error!("请求处理失败 ({}): {}", status, message);
    } else {
      warn!("请求被拒绝 ({}): {}", status, message);
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}

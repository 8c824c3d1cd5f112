// 该文件是 Huxing （户型识别） 项目的一部分。
// tests/common/mod.rs - 集成测试辅助
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

#![allow(dead_code)]

use std::{
  io::Cursor,
  path::Path,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use axum::{
  Router,
  body::Body,
  http::{Request, Response, header},
};
use huxing::{
  frame::MoldedTensor,
  input::DEFAULT_MAX_IMAGE_SIDE,
  model::{
    DetectResult, DetectionEngine, DetectionEngineGuard, EngineConfig, EngineError, EngineLoader,
    ReplayEngineBuilder,
  },
  server::{self, AppState, ServerOptions},
  task::AnalysisTask,
};
use image::{DynamicImage, ImageFormat};
use serde_json::Value;
use tower::ServiceExt;

pub const BOUNDARY: &str = "huxing-test-boundary";

/// 统计初始化与推理次数的回放引擎
pub struct CountingLoader {
  inner: ReplayEngineBuilder,
  pub loads: Arc<AtomicUsize>,
  pub runs: Arc<AtomicUsize>,
}

impl CountingLoader {
  pub fn new(record: impl AsRef<Path>) -> Arc<Self> {
    Arc::new(Self {
      inner: ReplayEngineBuilder::new(record),
      loads: Arc::new(AtomicUsize::new(0)),
      runs: Arc::new(AtomicUsize::new(0)),
    })
  }

  pub fn loads(&self) -> usize {
    self.loads.load(Ordering::SeqCst)
  }

  pub fn runs(&self) -> usize {
    self.runs.load(Ordering::SeqCst)
  }
}

struct CountingEngine {
  inner: Box<dyn DetectionEngine>,
  runs: Arc<AtomicUsize>,
}

impl DetectionEngine for CountingEngine {
  fn detect(&mut self, input: &MoldedTensor) -> Result<DetectResult, EngineError> {
    self.runs.fetch_add(1, Ordering::SeqCst);
    self.inner.detect(input)
  }
}

impl EngineLoader for CountingLoader {
  fn config(&self) -> &EngineConfig {
    self.inner.config()
  }

  fn load(&self) -> Result<Box<dyn DetectionEngine>, EngineError> {
    self.loads.fetch_add(1, Ordering::SeqCst);
    Ok(Box::new(CountingEngine {
      inner: self.inner.load()?,
      runs: Arc::clone(&self.runs),
    }))
  }
}

pub fn write_record(path: &Path, detections: &str) {
  let record = format!(r#"{{"num_classes": 4, "detections": {}}}"#, detections);
  std::fs::write(path, record).unwrap();
}

pub fn app(loader: Arc<dyn EngineLoader>, static_dir: &Path) -> Router {
  app_with_max_side(loader, static_dir, DEFAULT_MAX_IMAGE_SIDE)
}

pub fn app_with_max_side(
  loader: Arc<dyn EngineLoader>,
  static_dir: &Path,
  max_image_side: u32,
) -> Router {
  let guard = Arc::new(DetectionEngineGuard::new(loader, Duration::from_secs(5)));
  let task = AnalysisTask::new(guard).with_max_image_side(max_image_side);
  let options = ServerOptions {
    static_dir: static_dir.to_path_buf(),
    ..ServerOptions::default()
  };
  server::router(AppState::new(task), &options)
}

pub fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
  let mut buf = Cursor::new(Vec::new());
  image.write_to(&mut buf, format).unwrap();
  buf.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
  encode(
    DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
      width,
      height,
      image::Rgb([240, 240, 240]),
    )),
    ImageFormat::Png,
  )
}

pub fn multipart_body(field: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
  let mut body = Vec::new();
  body.extend_from_slice(
    format!(
      "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"plan\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .as_bytes(),
  );
  body.extend_from_slice(data);
  body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
  body
}

pub fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri(uri)
    .header(
      header::CONTENT_TYPE,
      format!("multipart/form-data; boundary={BOUNDARY}"),
    )
    .body(Body::from(body))
    .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
  app.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

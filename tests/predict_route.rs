// 该文件是 Huxing （户型识别） 项目的一部分。
// tests/predict_route.rs - 预测路由集成测试
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

mod common;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use common::*;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use serde_json::json;

const WALL_AND_DOOR: &str = r#"[
  {"class_id": 1, "roi": [0, 0, 10, 10], "score": 0.99},
  {"class_id": 3, "roi": [0, 0, 3, 4], "score": 0.95}
]"#;

#[tokio::test]
async fn predict_returns_projected_features() {
  let dir = tempfile::tempdir().unwrap();
  let record = dir.path().join("record.json");
  write_record(&record, WALL_AND_DOOR);
  let loader = CountingLoader::new(&record);
  let app = app(loader.clone(), dir.path());

  let body = multipart_body("image", "image/png", &png(32, 24));
  let response = send(&app, upload_request("/predict", body)).await;

  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(
    json_body(response).await,
    json!({
      "points": [
        {"x1": 0, "y1": 0, "x2": 10, "y2": 10},
        {"x1": 0, "y1": 0, "x2": 4, "y2": 3}
      ],
      "classes": ["wall", "door"],
      "Width": 32,
      "Height": 24,
      "averageDoor": 5.0
    })
  );
  assert_eq!(loader.loads(), 1);
  assert_eq!(loader.runs(), 1);
}

#[tokio::test]
async fn root_post_is_an_alias_for_predict() {
  let dir = tempfile::tempdir().unwrap();
  let record = dir.path().join("record.json");
  write_record(&record, "[]");
  let app = app(CountingLoader::new(&record), dir.path());

  let body = multipart_body("image", "image/png", &png(5, 7));
  let response = send(&app, upload_request("/", body)).await;

  assert_eq!(response.status(), StatusCode::OK);
  let body = json_body(response).await;
  assert_eq!(body["points"], json!([]));
  assert_eq!(body["classes"], json!([]));
  assert_eq!(body["Width"], 5);
  assert_eq!(body["Height"], 7);
  assert_eq!(body["averageDoor"], 1.0);
}

#[tokio::test]
async fn grayscale_upload_is_accepted() {
  let dir = tempfile::tempdir().unwrap();
  let record = dir.path().join("record.json");
  write_record(&record, WALL_AND_DOOR);
  let app = app(CountingLoader::new(&record), dir.path());

  let gray = GrayImage::from_pixel(9, 4, Luma([128]));
  let bytes = encode(DynamicImage::ImageLuma8(gray), ImageFormat::Png);
  let response = send(
    &app,
    upload_request("/predict", multipart_body("image", "image/png", &bytes)),
  )
  .await;

  assert_eq!(response.status(), StatusCode::OK);
  let body = json_body(response).await;
  assert_eq!(body["Width"], 9);
  assert_eq!(body["Height"], 4);
}

#[tokio::test]
async fn non_image_payload_never_reaches_the_engine() {
  let dir = tempfile::tempdir().unwrap();
  let record = dir.path().join("record.json");
  write_record(&record, WALL_AND_DOOR);
  let loader = CountingLoader::new(&record);
  let app = app(loader.clone(), dir.path());

  let body = multipart_body("image", "text/plain", b"walls: 4, doors: 1");
  let response = send(&app, upload_request("/predict", body)).await;
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(response).await["error"].is_string());

  let body = multipart_body("image", "image/png", b"this is not a png");
  let response = send(&app, upload_request("/predict", body)).await;
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(response).await["error"].is_string());

  assert_eq!(loader.loads(), 0);
  assert_eq!(loader.runs(), 0);
}

#[tokio::test]
async fn oversized_image_is_rejected_without_inference() {
  let dir = tempfile::tempdir().unwrap();
  let record = dir.path().join("record.json");
  write_record(&record, WALL_AND_DOOR);
  let loader = CountingLoader::new(&record);
  let app = app_with_max_side(loader.clone(), dir.path(), 64);

  let body = multipart_body("image", "image/png", &png(65, 8));
  let response = send(&app, upload_request("/predict", body)).await;
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(response).await["error"].is_string());
  assert_eq!(loader.loads(), 0);

  let body = multipart_body("image", "image/png", &png(64, 8));
  let response = send(&app, upload_request("/predict", body)).await;
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(loader.runs(), 1);
}

#[tokio::test]
async fn missing_image_field_is_rejected() {
  let dir = tempfile::tempdir().unwrap();
  let app = app(CountingLoader::new(dir.path().join("record.json")), dir.path());

  let body = multipart_body("file", "image/png", &png(2, 2));
  let response = send(&app, upload_request("/predict", body)).await;

  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn non_multipart_request_is_rejected() {
  let dir = tempfile::tempdir().unwrap();
  let app = app(CountingLoader::new(dir.path().join("record.json")), dir.path());

  let request = Request::builder()
    .method("POST")
    .uri("/predict")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(r#"{"image": "plan.png"}"#))
    .unwrap();
  let response = send(&app, request).await;

  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn engine_initialization_is_retried_after_failure() {
  let dir = tempfile::tempdir().unwrap();
  let record = dir.path().join("record.json");
  let loader = CountingLoader::new(&record);
  let app = app(loader.clone(), dir.path());

  let body = multipart_body("image", "image/png", &png(4, 4));
  let response = send(&app, upload_request("/predict", body.clone())).await;
  assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let error = json_body(response).await;
  assert!(error["error"].is_string());
  assert!(error.get("points").is_none());

  write_record(&record, WALL_AND_DOOR);
  let response = send(&app, upload_request("/predict", body)).await;
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(json_body(response).await["classes"], json!(["wall", "door"]));

  assert_eq!(loader.loads(), 2);
  assert_eq!(loader.runs(), 1);
}

#[tokio::test]
async fn landing_page_is_served() {
  let dir = tempfile::tempdir().unwrap();
  std::fs::write(dir.path().join("index.html"), "<h1>huxing</h1>").unwrap();
  let app = app(CountingLoader::new(dir.path().join("record.json")), dir.path());

  let request = Request::builder().uri("/").body(Body::empty()).unwrap();
  let response = send(&app, request).await;

  assert_eq!(response.status(), StatusCode::OK);
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  assert_eq!(&bytes[..], b"<h1>huxing</h1>");
}

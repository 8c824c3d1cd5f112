// 该文件是 Huxing （户型识别） 项目的一部分。
// src/server.rs - HTTP 服务
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

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get_service, post},
};
use tokio::net::TcpListener;
use tower_http::{
  cors::CorsLayer,
  services::{ServeDir, ServeFile},
};
use tracing::{info, warn};

use crate::task::AnalysisTask;

mod error;
mod routes;

pub use self::error::ApiError;

pub struct AppState {
  pub task: AnalysisTask,
}

impl AppState {
  pub fn new(task: AnalysisTask) -> Arc<Self> {
    Arc::new(Self { task })
  }
}

#[derive(Debug, Clone)]
pub struct ServerOptions {
  pub static_dir: PathBuf,
  pub max_upload_bytes: usize,
}

impl Default for ServerOptions {
  fn default() -> Self {
    Self {
      static_dir: PathBuf::from("static"),
      max_upload_bytes: 16 * 1024 * 1024,
    }
  }
}

pub fn router(state: Arc<AppState>, options: &ServerOptions) -> Router {
  let index = options.static_dir.join("index.html");

  Router::new()
    .route(
      "/",
      get_service(ServeFile::new(index)).post(routes::predict),
    )
    .route("/predict", post(routes::predict))
    .nest_service("/static", ServeDir::new(&options.static_dir))
    .layer(DefaultBodyLimit::max(options.max_upload_bytes))
    .layer(CorsLayer::permissive())
    .with_state(state)
}

pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
  if let Ok(addr) = listener.local_addr() {
    info!("服务已启动: http://{}", addr);
  }
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!("服务已退出");
  Ok(())
}

async fn shutdown_signal() {
  match tokio::signal::ctrl_c().await {
    Ok(()) => info!("收到中断信号，准备退出..."),
    Err(e) => warn!("无法监听中断信号: {}", e),
  }
}

// 该文件是 Huxing （户型识别） 项目的一部分。
// src/main.rs - 户型识别服务主程序
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

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use huxing::{
  args::{ServeArgs, init_tracing},
  model::DetectionEngineGuard,
  server::{self, AppState},
  task::AnalysisTask,
};

#[tokio::main]
async fn main() -> Result<()> {
  init_tracing();

  let args = ServeArgs::parse();

  info!("Huxing 户型识别服务");
  info!("检测引擎: {}", args.engine.model);
  info!("类别数量: {}", args.engine.num_classes);
  info!("均值像素: {:?}", args.engine.mean_pixel);
  info!("缩放方式: {:?}", args.engine.resize_mode);
  info!("引擎等待上限: {:.2?}", args.engine.lock_timeout());
  info!("图像单边上限: {} 像素", args.engine.max_image_side);
  info!("静态资源目录: {}", args.static_dir.display());

  let loader = args
    .engine
    .loader()
    .with_context(|| format!("无法创建检测引擎: {}", args.engine.model))?;
  let guard = Arc::new(DetectionEngineGuard::new(loader, args.engine.lock_timeout()));

  if args.eager {
    // 失败时不退出，首次请求会重新初始化
    if let Err(e) = guard.initialize().await {
      warn!("启动时初始化检测引擎失败: {}", e);
    }
  }

  let task = AnalysisTask::new(guard).with_max_image_side(args.engine.max_image_side);
  let state = AppState::new(task);
  let app = server::router(state, &args.server_options());

  let listener = TcpListener::bind(&args.bind)
    .await
    .with_context(|| format!("无法监听地址: {}", args.bind))?;
  server::serve(listener, app).await.context("服务运行失败")?;

  Ok(())
}

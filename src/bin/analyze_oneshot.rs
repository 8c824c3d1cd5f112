// 该文件是 Huxing （户型识别） 项目的一部分。
// src/bin/analyze_oneshot.rs - 单张户型图分析
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

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use huxing::{
  args::{EngineArgs, init_tracing},
  model::DetectionEngineGuard,
  task::AnalysisTask,
};

/// 不经 HTTP 分析单张户型图
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  #[command(flatten)]
  pub engine: EngineArgs,
  /// 输入图像文件
  #[arg(long, value_name = "FILE")]
  pub input: PathBuf,
  /// 输出 JSON 文件，缺省时打印到标准输出
  #[arg(long, value_name = "FILE")]
  pub output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  init_tracing();

  let args = Args::parse();

  info!("检测引擎: {}", args.engine.model);
  info!("输入图像: {}", args.input.display());

  let bytes = std::fs::read(&args.input)
    .with_context(|| format!("无法读取图像文件: {}", args.input.display()))?;

  let loader = args.engine.loader()?;
  let guard = Arc::new(DetectionEngineGuard::new(loader, args.engine.lock_timeout()));
  let task = AnalysisTask::new(guard).with_max_image_side(args.engine.max_image_side);

  let summary = task.run(bytes).await?;
  let json = serde_json::to_string_pretty(&summary)?;

  match &args.output {
    Some(path) => {
      std::fs::write(path, json)
        .with_context(|| format!("无法写入结果文件: {}", path.display()))?;
      info!("结果已写入: {}", path.display());
    }
    None => println!("{}", json),
  }

  Ok(())
}

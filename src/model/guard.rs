// 该文件是 Huxing （户型识别） 项目的一部分。
// src/model/guard.rs - 检测引擎守卫
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

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, error, info, warn};

use crate::{
  frame::MoldedTensor,
  model::{DetectResult, DetectionEngine, EngineConfig, EngineError, EngineLoader},
};

type SharedEngine = Arc<Mutex<Box<dyn DetectionEngine>>>;

#[derive(Error, Debug)]
pub enum GuardError {
  #[error("检测引擎初始化失败: {0}")]
  Initialization(#[source] EngineError),
  #[error("{0}")]
  Inference(#[source] EngineError),
  #[error("等待检测引擎超时 ({0:.2?})")]
  Timeout(Duration),
  #[error("推理任务异常退出: {0}")]
  Aborted(String),
}

/// 持有进程内唯一的检测引擎
///
/// 引擎在第一次使用（或显式调用 [`DetectionEngineGuard::initialize`]）时构建，
/// 构建失败不会留下永久状态，下一次请求会重新尝试。
/// 所有推理都在同一把锁下串行执行，等待锁的时间受 `lock_timeout` 限制。
pub struct DetectionEngineGuard {
  loader: Arc<dyn EngineLoader>,
  engine: OnceCell<SharedEngine>,
  lock_timeout: Duration,
}

impl DetectionEngineGuard {
  pub fn new(loader: Arc<dyn EngineLoader>, lock_timeout: Duration) -> Self {
    Self {
      loader,
      engine: OnceCell::new(),
      lock_timeout,
    }
  }

  pub fn config(&self) -> &EngineConfig {
    self.loader.config()
  }

  pub fn is_initialized(&self) -> bool {
    self.engine.initialized()
  }

  pub async fn initialize(&self) -> Result<(), GuardError> {
    self.shared_engine().await.map(|_| ())
  }

  async fn shared_engine(&self) -> Result<SharedEngine, GuardError> {
    // 并发的首次请求只会有一个执行构建，其余等待其结果
    let engine = self
      .engine
      .get_or_try_init(|| async {
        info!("初始化检测引擎...");
        let now = Instant::now();
        let loader = Arc::clone(&self.loader);
        let engine = tokio::task::spawn_blocking(move || loader.load())
          .await
          .map_err(|e| GuardError::Aborted(e.to_string()))?
          .map_err(|e| {
            error!("检测引擎初始化失败: {}", e);
            GuardError::Initialization(e)
          })?;
        info!("检测引擎初始化完成，耗时: {:.2?}", now.elapsed());
        Ok::<_, GuardError>(Arc::new(Mutex::new(engine)))
      })
      .await?;

    Ok(Arc::clone(engine))
  }

  pub async fn detect(&self, tensor: MoldedTensor) -> Result<DetectResult, GuardError> {
    let engine = self.shared_engine().await?;

    let now = Instant::now();
    let mut engine = tokio::time::timeout(self.lock_timeout, engine.lock_owned())
      .await
      .map_err(|_| {
        warn!("等待检测引擎超过 {:.2?}，放弃本次推理", self.lock_timeout);
        GuardError::Timeout(self.lock_timeout)
      })?;
    debug!("获得检测引擎锁，等待: {:.2?}", now.elapsed());

    // 锁随任务一起移动，推理结束后才释放
    let result = tokio::task::spawn_blocking(move || engine.detect(&tensor))
      .await
      .map_err(|e| {
        error!("推理任务异常退出: {}", e);
        GuardError::Aborted(e.to_string())
      })?;

    result.map_err(|e| {
      error!("推理失败: {}", e);
      GuardError::Inference(e)
    })
  }
}

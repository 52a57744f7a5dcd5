// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/task.rs - 逐帧定位任务循环
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

use std::{thread, time::Duration};
use tracing::{info, warn};

use crate::{
  calibration::ScaleFactor,
  depth::DepthPort,
  detect::DetectionPort,
  frame::{InputFrame, RgbFrame},
  geometry::Intrinsics,
  output::Report,
  pipeline::{Localization, RuntimePipeline},
};

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskSummary {
  pub frames: usize,
  pub localized: usize,
  pub skipped: usize,
}

/// 连续逐帧定位。
///
/// 目标缺失一类的单帧失败会被记录并跳过，其余错误终止任务。
#[derive(Debug)]
pub struct LocalizeTask {
  scale: ScaleFactor,
  intrinsics: Intrinsics,
  frame_number: Option<usize>,
  handle_interrupt: bool,
}

impl LocalizeTask {
  pub fn new(scale: ScaleFactor, intrinsics: Intrinsics) -> Self {
    Self {
      scale,
      intrinsics,
      frame_number: None,
      handle_interrupt: false,
    }
  }

  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  /// 安装 Ctrl-C 处理；一个进程只能安装一次
  pub fn with_interrupt(mut self, handle_interrupt: bool) -> Self {
    self.handle_interrupt = handle_interrupt;
    self
  }
}

impl<E, I, D, P, O> Task<I, RuntimePipeline<D, P>, O> for LocalizeTask
where
  E: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = Result<InputFrame, E>>,
  D: DetectionPort<RgbFrame>,
  P: DepthPort<RgbFrame>,
  O: Report<InputFrame, Localization>,
  O::Error: std::error::Error + Sync + Send + 'static,
{
  type Output = TaskSummary;
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: I,
    pipeline: RuntimePipeline<D, P>,
    output: O,
  ) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let (tx, rx) = std::sync::mpsc::channel();

    if self.handle_interrupt {
      ctrlc::set_handler(move || {
        info!("收到中断信号，准备退出...");
        let _ = tx.send(());
        thread::spawn(|| {
          thread::sleep(Duration::from_secs(30));
          warn!("强制退出程序");
          std::process::exit(1);
        });
      })?;
    }

    let mut summary = TaskSummary::default();
    for frame in input {
      let frame = frame?;
      summary.frames += 1;
      info!("处理第 {} 帧图像: {}", frame.index, frame.source);

      let now = std::time::Instant::now();
      match pipeline.localize_detailed(&frame.image, &self.scale, &self.intrinsics) {
        Ok(localization) => {
          output.report_result(&frame, &localization)?;
          summary.localized += 1;
          info!("定位完成，耗时: {:.2?}", now.elapsed());
        }
        Err(e) if e.is_frame_local() => {
          warn!("跳过第 {} 帧: {}", frame.index, e);
          summary.skipped += 1;
        }
        Err(e) => return Err(e.into()),
      }

      if self.frame_number.is_some_and(|n| summary.frames >= n) {
        info!("达到指定帧数 {}, 退出任务循环", summary.frames);
        break;
      }
      if rx.try_recv().is_ok() {
        warn!("中断信号接收，退出任务循环");
        break;
      }
    }

    info!(
      "任务完成，共 {} 帧，定位 {} 帧，跳过 {} 帧",
      summary.frames, summary.localized, summary.skipped
    );
    Ok(summary)
  }
}

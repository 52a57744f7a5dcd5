// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/pipeline/runtime.rs - 运行时模式（推理）
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

use serde::Serialize;
use tracing::debug;

use crate::{
  calibration::ScaleFactor,
  depth::DepthPort,
  detect::{Detection, DetectionPort},
  error::LocalizeError,
  frame::ImageShape,
  geometry::{Intrinsics, Position3D, back_project},
  pipeline::observe,
};

/// 单帧定位的完整中间结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Localization {
  pub detection: Detection,
  pub relative_depth: f64,
  pub metric_depth: f64,
  pub position: Position3D,
}

/// 运行时流水线：单帧图像 + 已标定的尺度因子 + 相机内参 -> 相机坐标系三维位置。
///
/// 不保存跨帧状态，失败原样返回给调用方，由外部循环决定重试或跳帧。
pub struct RuntimePipeline<D, P> {
  detector: D,
  depth: P,
}

impl<D, P> RuntimePipeline<D, P> {
  pub fn new(detector: D, depth: P) -> Self {
    Self { detector, depth }
  }

  pub fn into_parts(self) -> (D, P) {
    (self.detector, self.depth)
  }

  pub fn localize<I>(
    &self,
    image: &I,
    scale: &ScaleFactor,
    intrinsics: &Intrinsics,
  ) -> Result<Position3D, LocalizeError>
  where
    I: ImageShape + ?Sized,
    D: DetectionPort<I>,
    P: DepthPort<I>,
  {
    self
      .localize_detailed(image, scale, intrinsics)
      .map(|l| l.position)
  }

  pub fn localize_detailed<I>(
    &self,
    image: &I,
    scale: &ScaleFactor,
    intrinsics: &Intrinsics,
  ) -> Result<Localization, LocalizeError>
  where
    I: ImageShape + ?Sized,
    D: DetectionPort<I>,
    P: DepthPort<I>,
  {
    let (detection, relative_depth) = observe(&self.detector, &self.depth, image)?;
    let metric_depth = scale.apply(relative_depth);
    let position = back_project(detection.x_pixel, detection.y_pixel, metric_depth, intrinsics)?;
    debug!(
      "Z_hat = {:.3} m, 位置 ({:.3}, {:.3}, {:.3})",
      metric_depth, position.x, position.y, position.z
    );

    Ok(Localization {
      detection,
      relative_depth,
      metric_depth,
      position,
    })
  }
}

// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/pipeline.rs - 标定与运行时流水线
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

use tracing::debug;

use crate::{
  depth::{DepthPort, extract_relative_depth},
  detect::{Detection, DetectionPort},
  error::LocalizeError,
  frame::ImageShape,
};

mod calibration;
mod runtime;

pub use self::calibration::CalibrationPipeline;
pub use self::runtime::{Localization, RuntimePipeline};

/// 检测 -> 深度估计 -> 框内相对深度，两条流水线共用
fn observe<I, D, P>(detector: &D, depth: &P, image: &I) -> Result<(Detection, f64), LocalizeError>
where
  I: ImageShape + ?Sized,
  D: DetectionPort<I> + ?Sized,
  P: DepthPort<I> + ?Sized,
{
  let detection = detector.detect(image).map_err(Into::into)?;
  debug!("检测结果: {:?}", detection);

  let depth_map = depth.estimate(image).map_err(Into::into)?;
  let expected = (image.height(), image.width());
  if depth_map.shape() != expected {
    return Err(LocalizeError::DepthShapeMismatch {
      expected,
      actual: depth_map.shape(),
    });
  }

  let relative_depth = extract_relative_depth(&depth_map, &detection.bbox)?;
  debug!("目标相对深度: {}", relative_depth);
  Ok((detection, relative_depth))
}

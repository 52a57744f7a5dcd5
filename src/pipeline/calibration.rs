// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/pipeline/calibration.rs - 标定模式（离线）
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

use tracing::{debug, error, info};

use crate::{
  calibration::{ScaleFactor, estimate_scale},
  depth::DepthPort,
  detect::DetectionPort,
  error::LocalizeError,
  frame::ImageShape,
  pipeline::observe,
};

/// 标定流水线：对一批 (图像, 真值距离) 提取目标相对深度并拟合尺度因子
pub struct CalibrationPipeline<D, P> {
  detector: D,
  depth: P,
}

impl<D, P> CalibrationPipeline<D, P> {
  pub fn new(detector: D, depth: P) -> Self {
    Self { detector, depth }
  }

  pub fn into_parts(self) -> (D, P) {
    (self.detector, self.depth)
  }
}

impl<D, P> CalibrationPipeline<D, P> {
  /// 单张图像的目标相对深度，供调用方逐样本隔离失败
  pub fn relative_depth<I>(&self, image: &I) -> Result<f64, LocalizeError>
  where
    I: ImageShape + ?Sized,
    D: DetectionPort<I>,
    P: DepthPort<I>,
  {
    observe(&self.detector, &self.depth, image).map(|(_, d)| d)
  }

  /// 按输入顺序处理全部样本后拟合尺度因子，任一样本失败即整体失败
  pub fn calibrate<I>(&self, images: &[I], true_distances: &[f64]) -> Result<ScaleFactor, LocalizeError>
  where
    I: ImageShape,
    D: DetectionPort<I>,
    P: DepthPort<I>,
  {
    if images.is_empty() || true_distances.is_empty() {
      return Err(LocalizeError::EmptyCalibrationSet);
    }
    if images.len() != true_distances.len() {
      return Err(LocalizeError::MismatchedLengths {
        relative: images.len(),
        truth: true_distances.len(),
      });
    }
    if let Some(&bad) = true_distances.iter().find(|z| !(z.is_finite() && **z > 0.0)) {
      return Err(LocalizeError::InvalidGroundTruth(bad));
    }

    info!("开始标定，共 {} 个样本", images.len());
    let mut relative_depths = Vec::with_capacity(images.len());
    for (index, (image, z_true)) in images.iter().zip(true_distances).enumerate() {
      let d_rel = self.relative_depth(image).inspect_err(|e| {
        error!("样本 {} 处理失败: {}", index, e);
      })?;
      debug!("样本 {}: d_rel = {:.6}, z_true = {:.3} m", index, d_rel, z_true);
      relative_depths.push(d_rel);
    }

    let scale = estimate_scale(&relative_depths, true_distances)?;
    info!("标定完成，尺度因子 s = {}", scale);
    Ok(scale)
  }
}

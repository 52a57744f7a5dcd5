// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/calibration/scale.rs - 过原点最小二乘尺度拟合
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

use std::fmt;

use crate::error::LocalizeError;

/// 相对深度到米制深度的乘性尺度 `z ≈ s * d_rel`。
///
/// 只对拟合时使用的检测器与深度模型组合有效，更换任一模型后需要重新标定。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
  pub fn new(value: f64) -> Result<Self, LocalizeError> {
    if !value.is_finite() {
      return Err(LocalizeError::InvalidScaleFactor(value));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> f64 {
    self.0
  }

  /// 相对深度换算为米制深度
  pub fn apply(&self, relative_depth: f64) -> f64 {
    self.0 * relative_depth
  }
}

impl fmt::Display for ScaleFactor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// 拟合 `z ≈ s * d`（无截距）：`s = Σ(d·z) / Σ(d²)`。
///
/// 按输入顺序依次累加，相同输入得到逐位相同的结果。
pub fn estimate_scale(relative_depths: &[f64], true_distances: &[f64]) -> Result<ScaleFactor, LocalizeError> {
  if relative_depths.is_empty() || true_distances.is_empty() {
    return Err(LocalizeError::EmptyCalibrationSet);
  }
  if relative_depths.len() != true_distances.len() {
    return Err(LocalizeError::MismatchedLengths {
      relative: relative_depths.len(),
      truth: true_distances.len(),
    });
  }

  let (numerator, denominator) = relative_depths
    .iter()
    .zip(true_distances)
    .fold((0.0f64, 0.0f64), |(num, den), (d, z)| (num + d * z, den + d * d));

  if denominator == 0.0 {
    return Err(LocalizeError::DegenerateCalibrationData);
  }

  ScaleFactor::new(numerator / denominator)
}

// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/depth/patch.rs - 目标区域相对深度提取
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

use crate::{depth::DepthMap, error::LocalizeError, geometry::BoundingBox};

/// 取边界框下深度值的中位数作为目标的相对深度。
///
/// 边界框先按深度图尺寸裁剪；偶数个样本时取中间两个值的均值。
pub fn extract_relative_depth(depth_map: &DepthMap, bbox: &BoundingBox) -> Result<f64, LocalizeError> {
  let rect = bbox.clamp(depth_map.height(), depth_map.width())?;
  let mut values = depth_map.region(&rect);
  if values.is_empty() {
    return Err(LocalizeError::EmptyDepthRegion);
  }
  Ok(median(&mut values))
}

fn median(values: &mut [f32]) -> f64 {
  let n = values.len();
  let mid = n / 2;
  let (lower, upper, _) = values.select_nth_unstable_by(mid, f32::total_cmp);
  let upper = *upper as f64;
  if n % 2 == 1 {
    return upper;
  }
  // 偶数个：左半部分的最大值即为第 mid-1 小
  let lower = lower.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
  (lower + upper) / 2.0
}

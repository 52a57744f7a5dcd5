// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/depth/synthetic.rs - 合成深度图（演示与测试用）
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
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  depth::{DepthMap, DepthPort},
  error::LocalizeError,
  frame::{ImageShape, RgbFrame},
  query_param,
};

const DEFAULT_NEAR: f32 = 0.5;
const DEFAULT_FAR: f32 = 2.5;

fn depth_range(url: &Url) -> Result<(f32, f32), LocalizeError> {
  let near = query_param::<f32>(url, "near")?.unwrap_or(DEFAULT_NEAR);
  let far = query_param::<f32>(url, "far")?.unwrap_or(DEFAULT_FAR);
  if !(near.is_finite() && far.is_finite() && near >= 0.0 && far >= 0.0) {
    return Err(LocalizeError::InvalidUrl(format!(
      "深度范围无效: near={}, far={}",
      near, far
    )));
  }
  Ok((near, far))
}

/// 与图像内容无关的线性渐变深度：`near..=far` 按行优先均匀铺满整幅图像
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientDepth {
  pub near: f32,
  pub far: f32,
}

impl Default for GradientDepth {
  fn default() -> Self {
    Self {
      near: DEFAULT_NEAR,
      far: DEFAULT_FAR,
    }
  }
}

impl FromUrlWithScheme for GradientDepth {
  const SCHEME: &'static str = "gradient";
}

impl FromUrl for GradientDepth {
  type Error = LocalizeError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LocalizeError::scheme_mismatch(Self::SCHEME, url.scheme()));
    }
    let (near, far) = depth_range(url)?;
    Ok(Self { near, far })
  }
}

impl<I: ImageShape + ?Sized> DepthPort<I> for GradientDepth {
  type Error = LocalizeError;

  fn estimate(&self, image: &I) -> Result<DepthMap, Self::Error> {
    let (height, width) = (image.height(), image.width());
    let n = height * width;
    let step = if n > 1 {
      (self.far as f64 - self.near as f64) / (n - 1) as f64
    } else {
      0.0
    };
    debug!("生成渐变深度图 {}x{}", width, height);
    let data = (0..n)
      .map(|k| (self.near as f64 + step * k as f64) as f32)
      .collect();
    DepthMap::new(height, width, data)
  }
}

/// 以像素亮度作为相对深度：`near + (far - near) * luma / 255`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuminanceDepth {
  pub near: f32,
  pub far: f32,
}

impl Default for LuminanceDepth {
  fn default() -> Self {
    Self {
      near: DEFAULT_NEAR,
      far: DEFAULT_FAR,
    }
  }
}

impl LuminanceDepth {
  /// 亮度为 `luma` 的像素对应的相对深度
  pub fn depth_of(&self, luma: f32) -> f32 {
    self.near + (self.far - self.near) * luma / 255.0
  }
}

/// Rec.601 亮度
fn luma([r, g, b]: [u8; 3]) -> f32 {
  0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

impl FromUrlWithScheme for LuminanceDepth {
  const SCHEME: &'static str = "luminance";
}

impl FromUrl for LuminanceDepth {
  type Error = LocalizeError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LocalizeError::scheme_mismatch(Self::SCHEME, url.scheme()));
    }
    let (near, far) = depth_range(url)?;
    Ok(Self { near, far })
  }
}

impl DepthPort<RgbFrame> for LuminanceDepth {
  type Error = LocalizeError;

  fn estimate(&self, image: &RgbFrame) -> Result<DepthMap, Self::Error> {
    debug!("生成亮度深度图 {}x{}", image.width(), image.height());
    let data = image
      .pixels()
      .map(|p| self.depth_of(luma(p)).max(0.0))
      .collect();
    DepthMap::new(image.height(), image.width(), data)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;

  #[test]
  fn gradient_spans_near_to_far_row_major() {
    let frame = RgbFrame::with_shape(3, 4);
    let map = GradientDepth::default().estimate(&frame).unwrap();
    assert_eq!(map.shape(), (3, 4));
    assert_eq!(map.get(0, 0), 0.5);
    assert_relative_eq!(map.get(2, 3), 2.5, epsilon = 1e-6);
    assert!(map.as_slice().windows(2).all(|w| w[0] < w[1]));
  }

  #[test]
  fn gradient_single_pixel_is_near() {
    let frame = RgbFrame::with_shape(1, 1);
    let map = GradientDepth::default().estimate(&frame).unwrap();
    assert_eq!(map.as_slice(), &[0.5]);
  }

  #[test]
  fn luminance_follows_brightness() {
    let depth = LuminanceDepth { near: 1.0, far: 3.0 };
    let dark = depth.estimate(&RgbFrame::filled(2, 2, [0, 0, 0])).unwrap();
    let bright = depth.estimate(&RgbFrame::filled(2, 2, [255, 255, 255])).unwrap();
    assert!(dark.as_slice().iter().all(|v| *v == 1.0));
    assert!(bright.as_slice().iter().all(|v| (*v - 3.0).abs() < 1e-5));
  }

  #[test]
  fn range_from_url() {
    let url = Url::parse("luminance://?near=1&far=4").unwrap();
    assert_eq!(LuminanceDepth::from_url(&url).unwrap(), LuminanceDepth { near: 1.0, far: 4.0 });

    let url = Url::parse("gradient://").unwrap();
    assert_eq!(GradientDepth::from_url(&url).unwrap(), GradientDepth::default());

    let url = Url::parse("gradient://?near=-1").unwrap();
    assert!(GradientDepth::from_url(&url).is_err());
  }
}

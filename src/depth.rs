// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/depth.rs - 相对深度
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

use url::Url;

use crate::{FromUrl, FromUrlWithScheme, error::LocalizeError, frame::RgbFrame};

/// 单目深度估计能力：输入图像，输出与图像同尺寸的相对深度图
pub trait DepthPort<I: ?Sized> {
  type Error: Into<LocalizeError>;

  fn estimate(&self, image: &I) -> Result<DepthMap, Self::Error>;
}

impl<I: ?Sized, P: DepthPort<I> + ?Sized> DepthPort<I> for &P {
  type Error = P::Error;

  fn estimate(&self, image: &I) -> Result<DepthMap, Self::Error> {
    (**self).estimate(image)
  }
}

mod map;
mod patch;
mod synthetic;

pub use self::map::DepthMap;
pub use self::patch::extract_relative_depth;
pub use self::synthetic::{GradientDepth, LuminanceDepth};

#[cfg(feature = "model_rknn")]
mod depth_anything;
#[cfg(feature = "model_rknn")]
pub use self::depth_anything::{DepthAnything, DepthAnythingBuilder, DepthAnythingError};

/// 运行时按 URL 方案选定的深度估计策略
pub enum DepthWrapper {
  Gradient(GradientDepth),
  Luminance(LuminanceDepth),
  #[cfg(feature = "model_rknn")]
  DepthAnything(DepthAnything),
}

impl FromUrl for DepthWrapper {
  type Error = LocalizeError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      GradientDepth::SCHEME => Ok(DepthWrapper::Gradient(GradientDepth::from_url(url)?)),
      LuminanceDepth::SCHEME => Ok(DepthWrapper::Luminance(LuminanceDepth::from_url(url)?)),
      #[cfg(feature = "model_rknn")]
      DepthAnythingBuilder::SCHEME => {
        let model = DepthAnythingBuilder::from_url(url)?.build()?;
        Ok(DepthWrapper::DepthAnything(model))
      }
      other => Err(LocalizeError::scheme_mismatch("gradient|luminance|depth-anything", other)),
    }
  }
}

impl DepthPort<RgbFrame> for DepthWrapper {
  type Error = LocalizeError;

  fn estimate(&self, image: &RgbFrame) -> Result<DepthMap, Self::Error> {
    match self {
      DepthWrapper::Gradient(depth) => depth.estimate(image),
      DepthWrapper::Luminance(depth) => depth.estimate(image),
      #[cfg(feature = "model_rknn")]
      DepthWrapper::DepthAnything(depth) => depth.estimate(image).map_err(LocalizeError::from),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn wrapper(url: &str) -> Result<DepthWrapper, LocalizeError> {
    DepthWrapper::from_url(&Url::parse(url).unwrap())
  }

  #[test]
  fn scheme_selects_the_depth_model() {
    let frame = RgbFrame::filled(48, 64, [90, 120, 30]);

    let depth = wrapper("gradient:").unwrap();
    assert!(matches!(depth, DepthWrapper::Gradient(_)));
    let map = depth.estimate(&frame).unwrap();
    assert_eq!(map.shape(), (48, 64));
    assert_eq!(map, GradientDepth::default().estimate(&frame).unwrap());

    let depth = wrapper("luminance:?near=1&far=3").unwrap();
    assert!(matches!(depth, DepthWrapper::Luminance(_)));
    let expected = LuminanceDepth { near: 1.0, far: 3.0 };
    assert_eq!(depth.estimate(&frame).unwrap(), expected.estimate(&frame).unwrap());
  }

  #[test]
  fn unknown_scheme_is_rejected() {
    assert!(matches!(
      wrapper("nope:"),
      Err(LocalizeError::SchemeMismatch { .. })
    ));
  }
}

// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/detect.rs - 无人机检测
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

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, error::LocalizeError, frame::RgbFrame, geometry::BoundingBox};

/// 单个检测结果，`x_pixel`/`y_pixel` 为目标参考点（通常是框中心）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
  pub bbox: BoundingBox,
  pub x_pixel: f64,
  pub y_pixel: f64,
  pub confidence: f32,
}

impl Detection {
  /// 以框中心为参考点构造检测结果
  pub fn from_bbox(bbox: BoundingBox, confidence: f32) -> Self {
    let (x, y) = bbox.center();
    Self {
      bbox,
      x_pixel: x as f64,
      y_pixel: y as f64,
      confidence,
    }
  }
}

/// 检测能力：返回置信度最高的一个目标，没有目标时返回 [`LocalizeError::NoDetection`]
pub trait DetectionPort<I: ?Sized> {
  type Error: Into<LocalizeError>;

  fn detect(&self, image: &I) -> Result<Detection, Self::Error>;
}

impl<I: ?Sized, P: DetectionPort<I> + ?Sized> DetectionPort<I> for &P {
  type Error = P::Error;

  fn detect(&self, image: &I) -> Result<Detection, Self::Error> {
    (**self).detect(image)
  }
}

mod fixed;
mod synthetic;

pub use self::fixed::FixedDetector;
pub use self::synthetic::SyntheticDetector;

#[cfg(feature = "model_rknn")]
mod yolo26;
#[cfg(feature = "model_rknn")]
pub use self::yolo26::{Yolo26, Yolo26Builder, Yolo26Error};

/// 运行时按 URL 方案选定的检测策略
pub enum DetectorWrapper {
  Synthetic(SyntheticDetector),
  Fixed(FixedDetector),
  #[cfg(feature = "model_rknn")]
  Yolo26(Yolo26),
}

impl FromUrl for DetectorWrapper {
  type Error = LocalizeError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      SyntheticDetector::<StdRng>::SCHEME => {
        Ok(DetectorWrapper::Synthetic(SyntheticDetector::from_url(url)?))
      }
      FixedDetector::SCHEME => Ok(DetectorWrapper::Fixed(FixedDetector::from_url(url)?)),
      #[cfg(feature = "model_rknn")]
      Yolo26Builder::SCHEME => {
        let model = Yolo26Builder::from_url(url)?.build()?;
        Ok(DetectorWrapper::Yolo26(model))
      }
      other => Err(LocalizeError::scheme_mismatch("synthetic|fixed|yolo26", other)),
    }
  }
}

impl DetectionPort<RgbFrame> for DetectorWrapper {
  type Error = LocalizeError;

  fn detect(&self, image: &RgbFrame) -> Result<Detection, Self::Error> {
    match self {
      DetectorWrapper::Synthetic(detector) => detector.detect(image),
      DetectorWrapper::Fixed(detector) => detector.detect(image),
      #[cfg(feature = "model_rknn")]
      DetectorWrapper::Yolo26(detector) => detector.detect(image).map_err(LocalizeError::from),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn wrapper(url: &str) -> Result<DetectorWrapper, LocalizeError> {
    DetectorWrapper::from_url(&Url::parse(url).unwrap())
  }

  #[test]
  fn scheme_selects_the_detector() {
    let frame = RgbFrame::with_shape(480, 640);

    let detector = wrapper("synthetic:?seed=1").unwrap();
    assert!(matches!(detector, DetectorWrapper::Synthetic(_)));
    assert_eq!(
      detector.detect(&frame).unwrap(),
      SyntheticDetector::seeded(1).detect(&frame).unwrap()
    );

    let detector = wrapper("fixed:?x1=10&y1=20&x2=30&y2=60").unwrap();
    assert!(matches!(detector, DetectorWrapper::Fixed(_)));
    let expected = FixedDetector::from_bbox(BoundingBox::new(10.0, 20.0, 30.0, 60.0));
    assert_eq!(detector.detect(&frame).unwrap(), expected.detect(&frame).unwrap());
  }

  #[test]
  fn unknown_scheme_is_rejected() {
    assert!(matches!(
      wrapper("nope:"),
      Err(LocalizeError::SchemeMismatch { .. })
    ));
  }
}

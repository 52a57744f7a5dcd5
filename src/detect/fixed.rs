// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/detect/fixed.rs - 固定检测框
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

use crate::{
  FromUrl, FromUrlWithScheme,
  detect::{Detection, DetectionPort},
  error::LocalizeError,
  frame::ImageShape,
  geometry::BoundingBox,
  query_param,
};

/// 每帧都返回同一个检测结果，适合已知目标位置的标定场景
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDetector {
  detection: Detection,
}

impl FixedDetector {
  pub fn new(detection: Detection) -> Self {
    Self { detection }
  }

  pub fn from_bbox(bbox: BoundingBox) -> Self {
    Self::new(Detection::from_bbox(bbox, 1.0))
  }
}

impl FromUrlWithScheme for FixedDetector {
  const SCHEME: &'static str = "fixed";
}

impl FromUrl for FixedDetector {
  type Error = LocalizeError;

  /// `fixed://?x1=..&y1=..&x2=..&y2=..`
  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LocalizeError::scheme_mismatch(Self::SCHEME, url.scheme()));
    }

    let required = |key: &str| -> Result<f32, LocalizeError> {
      query_param::<f32>(url, key)?
        .ok_or_else(|| LocalizeError::InvalidUrl(format!("缺少边界框参数 {}", key)))
    };
    let bbox = BoundingBox::new(required("x1")?, required("y1")?, required("x2")?, required("y2")?);
    Ok(Self::from_bbox(bbox))
  }
}

impl<I: ImageShape + ?Sized> DetectionPort<I> for FixedDetector {
  type Error = LocalizeError;

  /// 框完全落在画面外时视为未检测到
  fn detect(&self, image: &I) -> Result<Detection, Self::Error> {
    self
      .detection
      .bbox
      .clamp(image.height(), image.width())
      .map_err(|_| LocalizeError::NoDetection)?;
    Ok(self.detection)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::RgbFrame;

  #[test]
  fn reference_point_is_box_center() {
    let url = Url::parse("fixed://?x1=10&y1=20&x2=30&y2=60").unwrap();
    let det = FixedDetector::from_url(&url)
      .unwrap()
      .detect(&RgbFrame::with_shape(100, 100))
      .unwrap();
    assert_eq!((det.x_pixel, det.y_pixel), (20.0, 40.0));
  }

  #[test]
  fn box_outside_frame_is_no_detection() {
    let detector = FixedDetector::from_bbox(BoundingBox::new(200.0, 0.0, 220.0, 10.0));
    assert!(matches!(
      detector.detect(&RgbFrame::with_shape(100, 100)),
      Err(LocalizeError::NoDetection)
    ));
  }
}

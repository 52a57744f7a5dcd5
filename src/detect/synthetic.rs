// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/detect/synthetic.rs - 合成检测器（演示与测试用）
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

use std::sync::{Mutex, PoisonError};

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  detect::{Detection, DetectionPort},
  error::LocalizeError,
  frame::ImageShape,
  geometry::BoundingBox,
  query_param,
};

// 远场无人机在画面中的典型尺寸与位置（相对图像宽高）
const BOX_WIDTH: (f64, f64) = (0.04, 0.12);
const BOX_HEIGHT: (f64, f64) = (0.03, 0.10);
const CENTER_X: (f64, f64) = (0.25, 0.75);
const CENTER_Y: (f64, f64) = (0.20, 0.60);
const DEFAULT_CONFIDENCE: f32 = 0.9;

/// 随机生成合理检测框的检测器，随机数发生器由调用方注入
pub struct SyntheticDetector<R = StdRng> {
  rng: Mutex<R>,
  confidence: f32,
}

impl SyntheticDetector<StdRng> {
  pub fn seeded(seed: u64) -> Self {
    Self::with_rng(StdRng::seed_from_u64(seed))
  }
}

impl<R: Rng> SyntheticDetector<R> {
  pub fn with_rng(rng: R) -> Self {
    Self {
      rng: Mutex::new(rng),
      confidence: DEFAULT_CONFIDENCE,
    }
  }

  pub fn with_confidence(mut self, confidence: f32) -> Self {
    self.confidence = confidence;
    self
  }
}

impl FromUrlWithScheme for SyntheticDetector {
  const SCHEME: &'static str = "synthetic";
}

impl FromUrl for SyntheticDetector {
  type Error = LocalizeError;

  /// `synthetic://?seed=42&confidence=0.9`，未给出 seed 时从系统熵源取种子
  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LocalizeError::scheme_mismatch(Self::SCHEME, url.scheme()));
    }

    let detector = match query_param::<u64>(url, "seed")? {
      Some(seed) => Self::seeded(seed),
      None => Self::with_rng(StdRng::from_os_rng()),
    };
    let confidence = query_param::<f32>(url, "confidence")?.unwrap_or(DEFAULT_CONFIDENCE);
    Ok(detector.with_confidence(confidence))
  }
}

impl<I: ImageShape + ?Sized, R: Rng> DetectionPort<I> for SyntheticDetector<R> {
  type Error = LocalizeError;

  fn detect(&self, image: &I) -> Result<Detection, Self::Error> {
    let (width, height) = (image.width() as f64, image.height() as f64);
    if width == 0.0 || height == 0.0 {
      return Err(LocalizeError::NoDetection);
    }

    let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
    let box_width = rng.random_range(BOX_WIDTH.0..BOX_WIDTH.1) * width;
    let box_height = rng.random_range(BOX_HEIGHT.0..BOX_HEIGHT.1) * height;
    let center_x = rng.random_range(CENTER_X.0..CENTER_X.1) * width;
    let center_y = rng.random_range(CENTER_Y.0..CENTER_Y.1) * height;

    let bbox = BoundingBox::new(
      (center_x - box_width / 2.0).max(0.0) as f32,
      (center_y - box_height / 2.0).max(0.0) as f32,
      (center_x + box_width / 2.0).min(width) as f32,
      (center_y + box_height / 2.0).min(height) as f32,
    );
    debug!("合成检测框: {:?}", bbox);

    Ok(Detection {
      bbox,
      x_pixel: center_x,
      y_pixel: center_y,
      confidence: self.confidence,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::RgbFrame;

  #[test]
  fn same_seed_same_detections() {
    let frame = RgbFrame::with_shape(480, 640);
    let a = SyntheticDetector::seeded(7);
    let b = SyntheticDetector::seeded(7);
    for _ in 0..5 {
      assert_eq!(a.detect(&frame).unwrap(), b.detect(&frame).unwrap());
    }
  }

  #[test]
  fn detections_stay_in_expected_region() {
    let frame = RgbFrame::with_shape(480, 640);
    let detector = SyntheticDetector::seeded(1234);
    for _ in 0..200 {
      let det = detector.detect(&frame).unwrap();
      assert!(det.x_pixel >= 0.25 * 640.0 && det.x_pixel < 0.75 * 640.0);
      assert!(det.y_pixel >= 0.20 * 480.0 && det.y_pixel < 0.60 * 480.0);
      let rect = det.bbox.clamp(480, 640).unwrap();
      assert!(rect.width() >= 1 && rect.width() as f64 <= 0.12 * 640.0 + 2.0);
      assert!(rect.height() >= 1 && rect.height() as f64 <= 0.10 * 480.0 + 2.0);
    }
  }

  #[test]
  fn empty_image_has_no_detection() {
    let frame = RgbFrame::with_shape(0, 0);
    assert!(matches!(
      SyntheticDetector::seeded(0).detect(&frame),
      Err(LocalizeError::NoDetection)
    ));
  }

  #[test]
  fn from_url_reads_seed_and_confidence() {
    let frame = RgbFrame::with_shape(120, 160);
    let url = Url::parse("synthetic://?seed=99&confidence=0.5").unwrap();
    let det = SyntheticDetector::from_url(&url).unwrap().detect(&frame).unwrap();
    assert_eq!(det.confidence, 0.5);
    assert_eq!(det, SyntheticDetector::seeded(99).with_confidence(0.5).detect(&frame).unwrap());
  }
}

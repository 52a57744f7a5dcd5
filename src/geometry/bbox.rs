// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/geometry/bbox.rs - 边界框裁剪
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

use serde::{Deserialize, Serialize};

use crate::error::LocalizeError;

/// 像素坐标下的边界框，未裁剪前允许越界或顺序颠倒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
  pub x1: f32,
  pub y1: f32,
  pub x2: f32,
  pub y2: f32,
}

/// 裁剪后的整数像素矩形，半开区间 `[x1, x2) x [y1, y2)`，保证 `x1 < x2`、`y1 < y2`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
  pub x1: usize,
  pub y1: usize,
  pub x2: usize,
  pub y2: usize,
}

impl BoundingBox {
  pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
    Self { x1, y1, x2, y2 }
  }

  pub fn center(&self) -> (f32, f32) {
    ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
  }

  /// 将边界框裁剪到 `height x width` 的图像范围内。
  ///
  /// 左上角向下取整，右下角向上取整；裁剪后若宽或高为零则返回
  /// [`LocalizeError::InvalidBoundingBox`]。
  pub fn clamp(&self, height: usize, width: usize) -> Result<PixelRect, LocalizeError> {
    let invalid = || LocalizeError::InvalidBoundingBox {
      x1: self.x1,
      y1: self.y1,
      x2: self.x2,
      y2: self.y2,
      width,
      height,
    };

    if height == 0 || width == 0 {
      return Err(invalid());
    }
    if ![self.x1, self.y1, self.x2, self.y2]
      .iter()
      .all(|v| v.is_finite())
    {
      return Err(invalid());
    }

    let (w, h) = (width as i64, height as i64);
    let (x1, y1) = (self.x1.floor() as i64, self.y1.floor() as i64);
    // 完全位于右侧或下方的框在裁剪到 W-1 / H-1 后会退化成边缘的一个像素
    if x1 >= w || y1 >= h {
      return Err(invalid());
    }

    let x1 = x1.clamp(0, w - 1);
    let x2 = (self.x2.ceil() as i64).clamp(0, w);
    let y1 = y1.clamp(0, h - 1);
    let y2 = (self.y2.ceil() as i64).clamp(0, h);

    if x2 <= x1 || y2 <= y1 {
      return Err(invalid());
    }

    Ok(PixelRect {
      x1: x1 as usize,
      y1: y1 as usize,
      x2: x2 as usize,
      y2: y2 as usize,
    })
  }
}

impl PixelRect {
  pub fn width(&self) -> usize {
    self.x2 - self.x1
  }

  pub fn height(&self) -> usize {
    self.y2 - self.y1
  }

  pub fn area(&self) -> usize {
    self.width() * self.height()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn box_inside_frame_is_floored_and_ceiled() {
    let rect = BoundingBox::new(10.7, 20.2, 30.1, 40.9).clamp(480, 640).unwrap();
    assert_eq!(
      rect,
      PixelRect {
        x1: 10,
        y1: 20,
        x2: 31,
        y2: 41
      }
    );
    assert_eq!(rect.area(), 21 * 21);
  }

  #[test]
  fn box_partially_outside_is_clamped() {
    let rect = BoundingBox::new(-15.0, -3.5, 700.0, 500.0)
      .clamp(480, 640)
      .unwrap();
    assert_eq!((rect.x1, rect.y1, rect.x2, rect.y2), (0, 0, 640, 480));
  }

  #[test]
  fn box_fully_right_of_frame_is_rejected() {
    let (h, w) = (480usize, 640usize);
    let x = (w + 5) as f32;
    let err = BoundingBox::new(x, 10.0, x, 50.0).clamp(h, w).unwrap_err();
    assert!(matches!(err, LocalizeError::InvalidBoundingBox { .. }));
  }

  #[test]
  fn box_fully_above_frame_is_rejected() {
    let err = BoundingBox::new(10.0, -40.0, 50.0, -10.0)
      .clamp(480, 640)
      .unwrap_err();
    assert!(matches!(err, LocalizeError::InvalidBoundingBox { .. }));
  }

  #[test]
  fn inverted_box_is_rejected() {
    assert!(BoundingBox::new(50.0, 10.0, 20.0, 40.0).clamp(480, 640).is_err());
    assert!(BoundingBox::new(10.0, 40.0, 20.0, 10.0).clamp(480, 640).is_err());
  }

  #[test]
  fn non_finite_box_is_rejected() {
    assert!(BoundingBox::new(f32::NAN, 0.0, 10.0, 10.0).clamp(480, 640).is_err());
    assert!(BoundingBox::new(0.0, 0.0, f32::INFINITY, 10.0).clamp(480, 640).is_err());
  }

  #[test]
  fn single_pixel_frame() {
    let rect = BoundingBox::new(0.0, 0.0, 0.5, 0.5).clamp(1, 1).unwrap();
    assert_eq!(rect.area(), 1);
  }

  #[test]
  fn center_is_midpoint() {
    assert_eq!(BoundingBox::new(10.0, 20.0, 30.0, 60.0).center(), (20.0, 40.0));
  }
}

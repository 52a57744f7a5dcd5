// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/depth/map.rs - 相对深度图
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

use crate::{error::LocalizeError, geometry::PixelRect};

/// 行优先存储的 H x W 相对深度图，值非负、无量纲
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
  height: usize,
  width: usize,
  data: Box<[f32]>,
}

impl DepthMap {
  pub fn new(height: usize, width: usize, data: Vec<f32>) -> Result<Self, LocalizeError> {
    if data.len() != height * width {
      return Err(LocalizeError::InvalidDepthMap(format!(
        "数据长度不匹配: 期望长度 {}, 实际长度 {}",
        height * width,
        data.len()
      )));
    }
    if let Some(bad) = data.iter().find(|v| !v.is_finite() || **v < 0.0) {
      return Err(LocalizeError::InvalidDepthMap(format!(
        "相对深度必须为非负有限值, 实际为 {}",
        bad
      )));
    }

    Ok(Self {
      height,
      width,
      data: data.into_boxed_slice(),
    })
  }

  pub fn from_fn(
    height: usize,
    width: usize,
    f: impl Fn(usize, usize) -> f32,
  ) -> Result<Self, LocalizeError> {
    let mut data = Vec::with_capacity(height * width);
    for y in 0..height {
      for x in 0..width {
        data.push(f(y, x));
      }
    }
    Self::new(height, width, data)
  }

  pub fn uniform(height: usize, width: usize, value: f32) -> Result<Self, LocalizeError> {
    Self::new(height, width, vec![value; height * width])
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn width(&self) -> usize {
    self.width
  }

  /// `(height, width)`
  pub fn shape(&self) -> (usize, usize) {
    (self.height, self.width)
  }

  pub fn get(&self, y: usize, x: usize) -> f32 {
    self.data[y * self.width + x]
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.data
  }

  /// 取出矩形区域内的全部深度值，按行展开
  pub fn region(&self, rect: &PixelRect) -> Vec<f32> {
    let mut values = Vec::with_capacity(rect.area());
    for y in rect.y1..rect.y2 {
      let row = y * self.width;
      values.extend_from_slice(&self.data[row + rect.x1..row + rect.x2]);
    }
    values
  }

  /// 双线性插值缩放到 `height x width`，像素中心对齐
  pub fn resize_bilinear(&self, height: usize, width: usize) -> Result<Self, LocalizeError> {
    if (height, width) == self.shape() {
      return Ok(self.clone());
    }
    if self.height == 0 || self.width == 0 {
      return Err(LocalizeError::InvalidDepthMap("无法缩放空深度图".to_string()));
    }

    let scale_y = self.height as f32 / height as f32;
    let scale_x = self.width as f32 / width as f32;
    let max_y = (self.height - 1) as f32;
    let max_x = (self.width - 1) as f32;

    Self::from_fn(height, width, |y, x| {
      let sy = ((y as f32 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
      let sx = ((x as f32 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
      let (y0, x0) = (sy.floor() as usize, sx.floor() as usize);
      let (y1, x1) = ((y0 + 1).min(self.height - 1), (x0 + 1).min(self.width - 1));
      let (fy, fx) = (sy - y0 as f32, sx - x0 as f32);

      let top = self.get(y0, x0) * (1.0 - fx) + self.get(y0, x1) * fx;
      let bottom = self.get(y1, x0) * (1.0 - fx) + self.get(y1, x1) * fx;
      top * (1.0 - fy) + bottom * fy
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_wrong_length_and_bad_values() {
    assert!(matches!(
      DepthMap::new(2, 3, vec![1.0; 5]),
      Err(LocalizeError::InvalidDepthMap(_))
    ));
    assert!(DepthMap::new(1, 2, vec![1.0, -0.5]).is_err());
    assert!(DepthMap::new(1, 2, vec![1.0, f32::NAN]).is_err());
    assert!(DepthMap::new(1, 2, vec![0.0, 2.0]).is_ok());
  }

  #[test]
  fn region_is_row_major() {
    let map = DepthMap::from_fn(3, 4, |y, x| (y * 4 + x) as f32).unwrap();
    let rect = PixelRect {
      x1: 1,
      y1: 1,
      x2: 3,
      y2: 3,
    };
    assert_eq!(map.region(&rect), vec![5.0, 6.0, 9.0, 10.0]);
  }

  #[test]
  fn resize_keeps_uniform_values() {
    let map = DepthMap::uniform(4, 4, 2.5).unwrap();
    let resized = map.resize_bilinear(9, 7).unwrap();
    assert_eq!(resized.shape(), (9, 7));
    assert!(resized.as_slice().iter().all(|v| (*v - 2.5).abs() < 1e-6));
  }

  #[test]
  fn resize_interpolates_between_columns() {
    let map = DepthMap::new(1, 2, vec![0.0, 1.0]).unwrap();
    let resized = map.resize_bilinear(1, 4).unwrap();
    let values = resized.as_slice();
    assert_eq!(values[0], 0.0);
    assert_eq!(values[3], 1.0);
    assert!(values[1] > 0.0 && values[1] < values[2] && values[2] < 1.0);
  }
}

// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/frame.rs - RGB 帧定义
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

use crate::error::LocalizeError;

const RGB_CHANNELS: usize = 3;

/// 检测器与深度模型所需的最小图像能力：已知的高和宽
pub trait ImageShape {
  fn height(&self) -> usize;
  fn width(&self) -> usize;
}

pub trait AsNhwcFrame {
  fn as_nhwc(&self) -> &[u8];
}

/// 交错存储（HWC）的 RGB 帧
#[derive(Debug, Clone, PartialEq)]
pub struct RgbFrame {
  height: usize,
  width: usize,
  data: Box<[u8]>,
}

/// 输入源产生的一帧及其来源
#[derive(Debug, Clone)]
pub struct InputFrame {
  pub image: RgbFrame,
  pub index: u64,
  pub source: String,
}

impl RgbFrame {
  pub fn with_shape(height: usize, width: usize) -> Self {
    let data = vec![0u8; RGB_CHANNELS * height * width].into_boxed_slice();
    Self {
      height,
      width,
      data,
    }
  }

  pub fn from_raw(height: usize, width: usize, data: Vec<u8>) -> Result<Self, LocalizeError> {
    if data.len() != RGB_CHANNELS * height * width {
      return Err(LocalizeError::InvalidFrame(format!(
        "数据长度不匹配: 期望长度 {}, 实际长度 {}",
        RGB_CHANNELS * height * width,
        data.len()
      )));
    }

    Ok(Self {
      height,
      width,
      data: data.into_boxed_slice(),
    })
  }

  /// 整帧填充同一颜色
  pub fn filled(height: usize, width: usize, rgb: [u8; 3]) -> Self {
    let mut frame = Self::with_shape(height, width);
    for pixel in frame.data.chunks_exact_mut(RGB_CHANNELS) {
      pixel.copy_from_slice(&rgb);
    }
    frame
  }

  pub fn pixel(&self, y: usize, x: usize) -> [u8; 3] {
    let index = (y * self.width + x) * RGB_CHANNELS;
    [self.data[index], self.data[index + 1], self.data[index + 2]]
  }

  /// 最近邻缩放，用于对齐模型的固定输入尺寸
  pub fn resize_nearest(&self, height: usize, width: usize) -> Self {
    if (height, width) == (self.height, self.width) {
      return self.clone();
    }

    let mut frame = Self::with_shape(height, width);
    if self.height == 0 || self.width == 0 {
      return frame;
    }
    let slice = frame.as_mut();
    for y in 0..height {
      let sy = (y * self.height / height).min(self.height - 1);
      for x in 0..width {
        let sx = (x * self.width / width).min(self.width - 1);
        let index = (y * width + x) * RGB_CHANNELS;
        slice[index..index + RGB_CHANNELS].copy_from_slice(&self.pixel(sy, sx));
      }
    }
    frame
  }

  pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
    self
      .data
      .chunks_exact(RGB_CHANNELS)
      .map(|p| [p[0], p[1], p[2]])
  }
}

impl ImageShape for RgbFrame {
  fn height(&self) -> usize {
    self.height
  }

  fn width(&self) -> usize {
    self.width
  }
}

impl AsMut<[u8]> for RgbFrame {
  fn as_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }
}

impl AsNhwcFrame for RgbFrame {
  fn as_nhwc(&self) -> &[u8] {
    &self.data
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn filled_frame_has_uniform_pixels() {
    let frame = RgbFrame::filled(4, 6, [10, 20, 30]);
    assert_eq!(frame.height(), 4);
    assert_eq!(frame.width(), 6);
    assert_eq!(frame.pixels().count(), 24);
    assert!(frame.pixels().all(|p| p == [10, 20, 30]));
    assert_eq!(frame.pixel(3, 5), [10, 20, 30]);
  }

  #[test]
  fn resize_nearest_picks_source_pixels() {
    let mut data = Vec::new();
    for v in [0u8, 100, 200, 250] {
      data.extend_from_slice(&[v, v, v]);
    }
    let frame = RgbFrame::from_raw(2, 2, data).unwrap();
    let resized = frame.resize_nearest(4, 4);
    assert_eq!(resized.height(), 4);
    assert_eq!(resized.pixel(0, 0), [0, 0, 0]);
    assert_eq!(resized.pixel(1, 3), [100, 100, 100]);
    assert_eq!(resized.pixel(3, 0), [200, 200, 200]);
    assert_eq!(resized.pixel(3, 3), [250, 250, 250]);
  }

  #[test]
  fn from_raw_rejects_wrong_length() {
    assert!(RgbFrame::from_raw(2, 2, vec![0; 11]).is_err());
    assert!(RgbFrame::from_raw(2, 2, vec![0; 12]).is_ok());
  }
}

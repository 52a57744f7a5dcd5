// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use std::path::Path;

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{InputFrame, RgbFrame},
  url_file_path,
};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("Invalid file path: {0}")]
  InvalidPath(String),
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
}

impl From<RgbImage> for RgbFrame {
  fn from(image: RgbImage) -> Self {
    let (width, height) = image.dimensions();
    let mut frame = RgbFrame::with_shape(height as usize, width as usize);
    // RgbImage 的原始布局即为 HWC
    frame.as_mut().copy_from_slice(image.as_raw());
    frame
  }
}

/// 读取并解码图像文件为 RGB 帧
pub fn load_rgb_frame(path: impl AsRef<Path>) -> Result<RgbFrame, ImageFileInputError> {
  let path = path.as_ref();
  debug!("读取图像文件: {}", path.display());
  let image = ImageReader::open(path)?.decode()?;
  Ok(RgbFrame::from(image.to_rgb8()))
}

pub struct ImageFileInput {
  frame: Option<InputFrame>,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let path =
      url_file_path(url).map_err(|e| ImageFileInputError::InvalidPath(e.to_string()))?;
    let image = load_rgb_frame(&path)?;

    Ok(ImageFileInput {
      frame: Some(InputFrame {
        image,
        index: 0,
        source: path.display().to_string(),
      }),
    })
  }
}

impl Iterator for ImageFileInput {
  type Item = InputFrame;

  fn next(&mut self) -> Option<Self::Item> {
    self.frame.take()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::ImageShape;

  #[test]
  fn single_image_yields_one_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drone.png");
    RgbImage::from_pixel(8, 6, image::Rgb([1, 2, 3])).save(&path).unwrap();

    let url = Url::parse(&format!("image://{}", path.display())).unwrap();
    let mut input = ImageFileInput::from_url(&url).unwrap();
    let frame = input.next().unwrap();
    assert_eq!((frame.image.height(), frame.image.width()), (6, 8));
    assert_eq!(frame.image.pixel(5, 7), [1, 2, 3]);
    assert!(input.next().is_none());
  }

  #[test]
  fn wrong_scheme_is_rejected() {
    let url = Url::parse("video:///tmp/a.mp4").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(ImageFileInputError::SchemaMismatch)
    ));
  }
}

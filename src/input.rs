// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/input.rs - 图像输入
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

use thiserror::Error;

use crate::{FromUrl, FromUrlWithScheme};

mod directory;
mod read_image_file;

pub use self::directory::DirectoryInput;
pub use self::read_image_file::{ImageFileInput, ImageFileInputError, load_rgb_frame};
pub use crate::frame::InputFrame;

#[derive(Error, Debug)]
pub enum InputError {
  #[error("Image file input error: {0}")]
  ImageFileInputError(#[from] ImageFileInputError),
  #[error("URI scheme mismatch: {0}")]
  SchemeMismatch(String),
}

pub enum InputWrapper {
  ReadImageFile(ImageFileInput),
  Directory(DirectoryInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      ImageFileInput::SCHEME => Ok(InputWrapper::ReadImageFile(ImageFileInput::from_url(url)?)),
      DirectoryInput::SCHEME => Ok(InputWrapper::Directory(DirectoryInput::from_url(url)?)),
      other => Err(InputError::SchemeMismatch(other.to_string())),
    }
  }
}

impl Iterator for InputWrapper {
  type Item = Result<InputFrame, InputError>;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      InputWrapper::ReadImageFile(input) => input.next().map(Ok),
      InputWrapper::Directory(input) => input.next().map(|r| r.map_err(InputError::from)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};
  use url::Url;

  #[test]
  fn scheme_selects_the_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    RgbImage::from_pixel(4, 3, Rgb([5, 6, 7])).save(&path).unwrap();

    let url = Url::parse(&format!("image://{}", path.display())).unwrap();
    let input = InputWrapper::from_url(&url).unwrap();
    assert!(matches!(input, InputWrapper::ReadImageFile(_)));
    assert_eq!(input.count(), 1);

    let url = Url::parse(&format!("folder://{}", dir.path().display())).unwrap();
    let input = InputWrapper::from_url(&url).unwrap();
    assert!(matches!(input, InputWrapper::Directory(_)));
    let frames: Vec<_> = input.collect::<Result<_, _>>().unwrap();
    assert_eq!(frames[0].image.pixel(2, 3), [5, 6, 7]);

    let url = Url::parse("v4l2:///dev/video0").unwrap();
    assert!(matches!(
      InputWrapper::from_url(&url),
      Err(InputError::SchemeMismatch(s)) if s == "v4l2"
    ));
  }
}

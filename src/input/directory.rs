// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/input/directory.rs - 目录图像序列输入
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

use std::path::PathBuf;

use tracing::{error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::InputFrame,
  input::{ImageFileInputError, load_rgb_frame},
  url_file_path,
};

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// 按文件名顺序逐帧读取目录中的图像
pub struct DirectoryInput {
  files: std::vec::IntoIter<PathBuf>,
  index: u64,
}

impl FromUrlWithScheme for DirectoryInput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryInput {
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

    let dir =
      url_file_path(url).map_err(|e| ImageFileInputError::InvalidPath(e.to_string()))?;
    let mut files = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
      let path = entry?.path();
      let is_image = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
      if path.is_file() && is_image {
        files.push(path);
      }
    }
    files.sort();
    info!("目录 {} 中共有 {} 张图像", dir.display(), files.len());

    Ok(DirectoryInput {
      files: files.into_iter(),
      index: 0,
    })
  }
}

impl Iterator for DirectoryInput {
  type Item = Result<InputFrame, ImageFileInputError>;

  fn next(&mut self) -> Option<Self::Item> {
    let path = self.files.next()?;
    let index = self.index;
    self.index += 1;
    Some(load_rgb_frame(&path).map(|image| InputFrame {
      image,
      index,
      source: path.display().to_string(),
    }))
  }
}

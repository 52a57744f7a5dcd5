// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/lib.rs - 库主文件
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

//! 单目无人机定位。
//!
//! 检测框 + 相对深度 + 一次性尺度标定 + 针孔反投影，
//! 从单帧 RGB 图像估计目标在相机坐标系下的米制位置。

pub mod calibration;
pub mod depth;
pub mod detect;
pub mod error;
pub mod frame;
pub mod geometry;
#[cfg(feature = "read_image_file")]
pub mod input;
pub mod output;
pub mod pipeline;
pub mod task;

pub use crate::calibration::{ScaleFactor, estimate_scale};
pub use crate::depth::{DepthMap, DepthPort, extract_relative_depth};
pub use crate::detect::{Detection, DetectionPort};
pub use crate::error::LocalizeError;
pub use crate::frame::{ImageShape, RgbFrame};
pub use crate::geometry::{BoundingBox, Intrinsics, PixelRect, Position3D, back_project};
pub use crate::pipeline::{CalibrationPipeline, Localization, RuntimePipeline};

pub trait FromUrl {
  type Error;
  fn from_url(url: &url::Url) -> Result<Self, Self::Error>
  where
    Self: Sized;
}

pub trait FromUrlWithScheme: FromUrl {
  const SCHEME: &'static str;
}

/// 读取 URL 查询参数并解析为指定类型，缺省时返回 `None`
pub(crate) fn query_param<T: std::str::FromStr>(
  url: &url::Url,
  key: &str,
) -> Result<Option<T>, LocalizeError> {
  match url.query_pairs().find(|(k, _)| k == key) {
    Some((_, v)) => v
      .parse::<T>()
      .map(Some)
      .map_err(|_| LocalizeError::InvalidUrl(format!("参数 {} 的值无效: {}", key, v))),
    None => Ok(None),
  }
}

/// URL 路径解码为本地文件路径，`%20` 等转义会被还原
pub(crate) fn url_file_path(url: &url::Url) -> Result<std::path::PathBuf, LocalizeError> {
  url::Url::parse(&format!("file://{}", url.path()))
    .ok()
    .and_then(|file| file.to_file_path().ok())
    .ok_or_else(|| LocalizeError::InvalidUrl(format!("无法解析文件路径: {}", url)))
}

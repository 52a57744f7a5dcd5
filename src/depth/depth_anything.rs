// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/depth/depth_anything.rs - Depth Anything 单目深度模型（RKNN）
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

use rknpu::{Context, InitFlags, TensorType};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  depth::{DepthMap, DepthPort},
  error::LocalizeError,
  frame::{AsNhwcFrame, ImageShape, RgbFrame},
  query_param, url_file_path,
};

const DEPTH_ANYTHING_NUM_INPUTS: u32 = 1;
const DEPTH_ANYTHING_NUM_OUTPUTS: u32 = 1;
const DEPTH_ANYTHING_DEFAULT_INPUT: usize = 518;

pub struct DepthAnything {
  context: Context,
  input_size: usize,
}

#[derive(Error, Debug)]
pub enum DepthAnythingError {
  #[error("模型加载错误: {0}")]
  ModelLoadError(#[from] std::io::Error),
  #[error("模型无效: {0}, 错误: {1}")]
  ModelInvalid(String, rknpu::Error),
  #[error("RKNN 错误: {0}")]
  RknnError(#[from] rknpu::Error),
  #[error("模型输出大小不匹配: 期望 {expected}, 实际 {actual}")]
  OutputSize { expected: usize, actual: usize },
  #[error("深度图无效: {0}")]
  DepthMap(String),
}

impl From<DepthAnythingError> for LocalizeError {
  fn from(err: DepthAnythingError) -> Self {
    LocalizeError::DepthModel(Box::new(err))
  }
}

pub struct DepthAnythingBuilder {
  model_path: PathBuf,
  input_size: usize,
  flags: InitFlags,
}

impl FromUrlWithScheme for DepthAnythingBuilder {
  const SCHEME: &'static str = "depth-anything";
}

impl FromUrl for DepthAnythingBuilder {
  type Error = LocalizeError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LocalizeError::scheme_mismatch(Self::SCHEME, url.scheme()));
    }

    Ok(DepthAnythingBuilder {
      model_path: url_file_path(url)?,
      input_size: query_param(url, "input")?.unwrap_or(DEPTH_ANYTHING_DEFAULT_INPUT),
      flags: InitFlags::default(),
    })
  }
}

impl DepthAnythingBuilder {
  pub fn flags(mut self, flags: InitFlags) -> Self {
    self.flags = flags;
    self
  }

  pub fn build(self) -> Result<DepthAnything, DepthAnythingError> {
    info!("加载深度模型文件: {}", self.model_path.display());
    let model_data = std::fs::read(&self.model_path)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    let context = Context::new(&model_data, self.flags)?;

    let num_inputs = context
      .num_inputs()
      .map_err(|e| DepthAnythingError::ModelInvalid("无法获取输入数量".to_string(), e))?;
    let num_outputs = context
      .num_outputs()
      .map_err(|e| DepthAnythingError::ModelInvalid("无法获取输出数量".to_string(), e))?;

    if num_inputs != DEPTH_ANYTHING_NUM_INPUTS || num_outputs != DEPTH_ANYTHING_NUM_OUTPUTS {
      error!(
        "预期模型输入/输出数量为 {}/{}, 实际为 {}/{}",
        DEPTH_ANYTHING_NUM_INPUTS, DEPTH_ANYTHING_NUM_OUTPUTS, num_inputs, num_outputs
      );
      return Err(DepthAnythingError::ModelInvalid(
        format!("输入/输出数量为 {}/{}", num_inputs, num_outputs),
        rknpu::Error::InvalidModel,
      ));
    }

    info!("深度模型加载完成，输入尺寸 {0}x{0}", self.input_size);
    Ok(DepthAnything {
      context,
      input_size: self.input_size,
    })
  }
}

impl DepthPort<RgbFrame> for DepthAnything {
  type Error = DepthAnythingError;

  fn estimate(&self, image: &RgbFrame) -> Result<DepthMap, Self::Error> {
    let size = self.input_size;
    let input = image.resize_nearest(size, size);

    debug!("设置深度模型输入");
    self.context.set_input(
      0,
      input.as_nhwc(),
      rknpu::TensorFormat::NHWC,
      TensorType::UInt8,
    )?;

    debug!("执行深度模型推理");
    self.context.run()?;

    let output = self.context.get_outputs()?;
    let values = output.get_f32(0)?.to_vec();
    if values.len() != size * size {
      return Err(DepthAnythingError::OutputSize {
        expected: size * size,
        actual: values.len(),
      });
    }

    // 网络输出可能出现极小的负值
    let values = values.into_iter().map(|v| v.max(0.0)).collect();
    DepthMap::new(size, size, values)
      .and_then(|map| map.resize_bilinear(image.height(), image.width()))
      .map_err(|e| DepthAnythingError::DepthMap(e.to_string()))
  }
}

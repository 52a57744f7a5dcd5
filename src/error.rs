// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/error.rs - 错误定义
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

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum LocalizeError {
  #[error("边界框无效: ({x1}, {y1}, {x2}, {y2})，图像尺寸 {width}x{height}")]
  InvalidBoundingBox {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    width: usize,
    height: usize,
  },
  #[error("边界框内没有深度值")]
  EmptyDepthRegion,
  #[error("标定数据为空")]
  EmptyCalibrationSet,
  #[error("标定数据长度不一致: 相对深度 {relative}, 真值距离 {truth}")]
  MismatchedLengths { relative: usize, truth: usize },
  #[error("相对深度全为零，无法拟合尺度")]
  DegenerateCalibrationData,
  #[error("真值距离无效: {0}")]
  InvalidGroundTruth(f64),
  #[error("相机内参无效: fx={fx}, fy={fy}")]
  InvalidIntrinsics { fx: f64, fy: f64 },
  #[error("未检测到无人机")]
  NoDetection,
  #[error("图像帧无效: {0}")]
  InvalidFrame(String),
  #[error("深度图无效: {0}")]
  InvalidDepthMap(String),
  #[error("深度图尺寸 {actual:?} 与图像尺寸 {expected:?} 不一致")]
  DepthShapeMismatch {
    expected: (usize, usize),
    actual: (usize, usize),
  },
  #[error("尺度因子无效: {0}")]
  InvalidScaleFactor(f64),
  #[error("尺度因子格式错误: {0}")]
  ScaleFormat(String),
  #[error("检测器错误: {0}")]
  Detector(#[source] BoxError),
  #[error("深度模型错误: {0}")]
  DepthModel(#[source] BoxError),
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  Json(#[from] serde_json::Error),
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{actual}'")]
  SchemeMismatch { expected: String, actual: String },
  #[error("URL 无效: {0}")]
  InvalidUrl(String),
}

impl LocalizeError {
  pub fn scheme_mismatch(expected: &str, actual: &str) -> Self {
    LocalizeError::SchemeMismatch {
      expected: expected.to_string(),
      actual: actual.to_string(),
    }
  }

  /// 单帧内可跳过的失败（目标缺失或目标落在画面外），其余错误应终止处理
  pub fn is_frame_local(&self) -> bool {
    matches!(
      self,
      LocalizeError::NoDetection
        | LocalizeError::InvalidBoundingBox { .. }
        | LocalizeError::EmptyDepthRegion
    )
  }
}

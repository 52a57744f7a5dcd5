// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/detect/yolo26.rs - YOLO26 无人机检测模型（RKNN）
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
  detect::{Detection, DetectionPort},
  error::LocalizeError,
  frame::{AsNhwcFrame, ImageShape, RgbFrame},
  geometry::BoundingBox,
  query_param, url_file_path,
};

const YOLO26_NUM_INPUTS: u32 = 1;
const YOLO26_NUM_OUTPUTS: u32 = 6;
const YOLO26_INPUT_SIZE: usize = 640;
const YOLO26_INPUT_W: f32 = 640.0;
const YOLO26_INPUT_H: f32 = 640.0;
const YOLO26_HEAD_SIZES: [(usize, usize); 3] = [(80, 80), (40, 40), (20, 20)];
const YOLO26_STRIDES: [f32; 3] = [8.0, 16.0, 32.0];
const YOLO26_DEFAULT_CONFIDENCE: f32 = 0.25;

pub struct Yolo26 {
  context: Context,
  num_classes: usize,
  confidence_threshold: f32,
  class_filter: Option<u32>,
}

#[derive(Error, Debug)]
pub enum Yolo26Error {
  #[error("模型加载错误: {0}")]
  ModelLoadError(#[from] std::io::Error),
  #[error("模型无效: {0}, 错误: {1}")]
  ModelInvalid(String, rknpu::Error),
  #[error("RKNN 错误: {0}")]
  RknnError(#[from] rknpu::Error),
  #[error("未检测到无人机")]
  NoDetection,
}

impl Yolo26Error {
  pub fn invalid(msg: &str, e: rknpu::Error) -> Self {
    Yolo26Error::ModelInvalid(msg.to_string(), e)
  }
}

impl From<Yolo26Error> for LocalizeError {
  fn from(err: Yolo26Error) -> Self {
    match err {
      Yolo26Error::NoDetection => LocalizeError::NoDetection,
      other => LocalizeError::Detector(Box::new(other)),
    }
  }
}

pub struct Yolo26Builder {
  model_path: PathBuf,
  flags: InitFlags,
  num_classes: usize,
  confidence_threshold: f32,
  class_filter: Option<u32>,
}

impl FromUrlWithScheme for Yolo26Builder {
  const SCHEME: &'static str = "yolo26";
}

impl FromUrl for Yolo26Builder {
  type Error = LocalizeError;

  /// `yolo26:///path/model.rknn?confidence=0.25&classes=1&class=0`
  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LocalizeError::scheme_mismatch(Self::SCHEME, url.scheme()));
    }

    Ok(Yolo26Builder {
      model_path: url_file_path(url)?,
      flags: InitFlags::default(),
      num_classes: query_param(url, "classes")?.unwrap_or(1),
      confidence_threshold: query_param(url, "confidence")?.unwrap_or(YOLO26_DEFAULT_CONFIDENCE),
      class_filter: query_param(url, "class")?,
    })
  }
}

impl Yolo26Builder {
  pub fn flags(mut self, flags: InitFlags) -> Self {
    self.flags = flags;
    self
  }

  pub fn confidence_threshold(mut self, threshold: f32) -> Self {
    self.confidence_threshold = threshold;
    self
  }

  pub fn build(self) -> Result<Yolo26, Yolo26Error> {
    info!("加载模型文件: {}", self.model_path.display());
    let model_data = std::fs::read(&self.model_path)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    info!("创建 RKNN 推理上下文");
    let context = Context::new(&model_data, self.flags)?;

    match context.sdk_version() {
      Ok(version) => {
        if let Ok(api_ver) = version.api_version() {
          debug!("模型 API 版本: {}", api_ver);
        }
        if let Ok(drv_ver) = version.driver_version() {
          debug!("模型驱动版本: {}", drv_ver);
        }
      }
      Err(e) => {
        error!(" 查询 SDK 版本失败: {}", e);
        return Err(Yolo26Error::invalid("无法查询 SDK 版本", e));
      }
    }

    let num_inputs = context
      .num_inputs()
      .map_err(|e| Yolo26Error::invalid("无法获取输入数量", e))?;
    let num_outputs = context
      .num_outputs()
      .map_err(|e| Yolo26Error::invalid("无法获取输出数量", e))?;

    if num_inputs != YOLO26_NUM_INPUTS || num_outputs != YOLO26_NUM_OUTPUTS {
      let msg = format!(
        "预期模型输入/输出数量为 {}/{}, 实际为 {}/{}",
        YOLO26_NUM_INPUTS, YOLO26_NUM_OUTPUTS, num_inputs, num_outputs
      );
      error!("{}", msg);
      return Err(Yolo26Error::invalid(&msg, rknpu::Error::InvalidModel));
    }

    info!(
      "模型加载完成，类别数 {}，置信度阈值 {}",
      self.num_classes, self.confidence_threshold
    );
    Ok(Yolo26 {
      context,
      num_classes: self.num_classes,
      confidence_threshold: self.confidence_threshold,
      class_filter: self.class_filter,
    })
  }
}

/// 根据张量大小匹配回归和分类输出，返回 (reg, cls)
fn match_reg_cls_tensors<'a>(
  tensor1: &'a [f32],
  tensor2: &'a [f32],
  reg_expected: usize,
  cls_expected: usize,
) -> Option<(&'a [f32], &'a [f32])> {
  if tensor1.len() == reg_expected && tensor2.len() == cls_expected {
    Some((tensor1, tensor2))
  } else if tensor1.len() == cls_expected && tensor2.len() == reg_expected {
    Some((tensor2, tensor1))
  } else {
    None
  }
}

/// 候选框，bbox 为模型输入尺度上的归一化坐标
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
  score: f32,
  bbox: [f32; 4],
}

/// 取置信度最高者；分数相同时保留先出现的候选
fn best_candidate(candidates: impl IntoIterator<Item = Candidate>) -> Option<Candidate> {
  candidates
    .into_iter()
    .fold(None, |best: Option<Candidate>, c| match best {
      Some(b) if b.score >= c.score => Some(b),
      _ => Some(c),
    })
}

impl Yolo26 {
  fn postprocess(&self, output: &rknpu::Output) -> Vec<Candidate> {
    let mut items = Vec::new();

    for (head_idx, (&(map_h, map_w), stride)) in
      YOLO26_HEAD_SIZES.iter().zip(YOLO26_STRIDES).enumerate()
    {
      let spatial = map_h * map_w;
      let reg_expected = 4 * spatial;
      let cls_expected = self.num_classes * spatial;

      // RKNN 输出顺序不固定，按张量大小区分回归与分类
      let (idx1, idx2) = (head_idx * 2, head_idx * 2 + 1);
      let (tensor1, tensor2) = match (output.get_f32(idx1), output.get_f32(idx2)) {
        (Ok(t1), Ok(t2)) => (t1, t2),
        (Err(e), _) | (_, Err(e)) => {
          error!("获取检测头 {} 的输出失败: {}", head_idx, e);
          continue;
        }
      };

      let Some((reg, cls)) = match_reg_cls_tensors(&tensor1, &tensor2, reg_expected, cls_expected)
      else {
        error!(
          "检测头 {}: 输出大小不匹配 - 张量1: {}, 张量2: {}, 期望回归: {}, 期望分类: {}",
          head_idx,
          tensor1.len(),
          tensor2.len(),
          reg_expected,
          cls_expected
        );
        continue;
      };

      for h in 0..map_h {
        for w in 0..map_w {
          let idx = h * map_w + w;

          let score = class_score(cls, spatial, idx, self.num_classes, self.class_filter);

          if score < self.confidence_threshold {
            continue;
          }

          let grid_x = (w as f32) + 0.5;
          let grid_y = (h as f32) + 0.5;
          let xmin = ((grid_x - reg[idx]) * stride).clamp(0.0, YOLO26_INPUT_W);
          let ymin = ((grid_y - reg[spatial + idx]) * stride).clamp(0.0, YOLO26_INPUT_H);
          let xmax = ((grid_x + reg[2 * spatial + idx]) * stride).clamp(0.0, YOLO26_INPUT_W);
          let ymax = ((grid_y + reg[3 * spatial + idx]) * stride).clamp(0.0, YOLO26_INPUT_H);

          items.push(Candidate {
            score,
            bbox: [
              xmin / YOLO26_INPUT_W,
              ymin / YOLO26_INPUT_H,
              xmax / YOLO26_INPUT_W,
              ymax / YOLO26_INPUT_H,
            ],
          });
        }
      }
    }

    debug!("检测到 {} 个候选", items.len());
    items
  }
}

impl DetectionPort<RgbFrame> for Yolo26 {
  type Error = Yolo26Error;

  fn detect(&self, image: &RgbFrame) -> Result<Detection, Self::Error> {
    let input = image.resize_nearest(YOLO26_INPUT_SIZE, YOLO26_INPUT_SIZE);

    debug!("设置模型输入");
    self.context.set_input(
      0,
      input.as_nhwc(),
      rknpu::TensorFormat::NHWC,
      TensorType::UInt8,
    )?;

    debug!("执行模型推理");
    self.context.run()?;

    let output = self.context.get_outputs()?;
    let best = best_candidate(self.postprocess(&output)).ok_or(Yolo26Error::NoDetection)?;
    debug!("最佳候选: {:?}", best);

    let (w, h) = (image.width() as f32, image.height() as f32);
    let bbox = BoundingBox::new(
      best.bbox[0] * w,
      best.bbox[1] * h,
      best.bbox[2] * w,
      best.bbox[3] * h,
    );
    Ok(Detection::from_bbox(bbox, best.score))
  }
}

/// 网格位置 `idx` 上允许类别的最高置信度
fn class_score(
  cls: &[f32],
  spatial: usize,
  idx: usize,
  num_classes: usize,
  filter: Option<u32>,
) -> f32 {
  let max_logit = (0..num_classes)
    .filter(|&c| filter.is_none_or(|f| f as usize == c))
    .map(|c| cls[c * spatial + idx])
    .fold(f32::MIN, f32::max);
  sigmoid(max_logit)
}

fn sigmoid(x: f32) -> f32 {
  1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn candidate(score: f32, x: f32) -> Candidate {
    Candidate {
      score,
      bbox: [x, 0.0, x + 0.1, 0.1],
    }
  }

  #[test]
  fn best_candidate_prefers_highest_score_then_first_seen() {
    let best = best_candidate([candidate(0.3, 0.1), candidate(0.8, 0.2), candidate(0.8, 0.3)]);
    assert_eq!(best, Some(candidate(0.8, 0.2)));
    assert_eq!(best_candidate(Vec::new()), None);
  }

  #[test]
  fn class_filter_limits_the_score() {
    // 两个类别、两个网格位置，按类别优先排列
    let cls = [2.0f32, -1.0, 0.0, 3.0];
    assert_eq!(class_score(&cls, 2, 0, 2, None), sigmoid(2.0));
    assert_eq!(class_score(&cls, 2, 1, 2, None), sigmoid(3.0));
    assert_eq!(class_score(&cls, 2, 1, 2, Some(0)), sigmoid(-1.0));
    assert_eq!(class_score(&cls, 2, 0, 2, Some(1)), sigmoid(0.0));
  }

  #[test]
  fn reg_cls_order_is_detected_by_size() {
    let reg = [0.0f32; 8];
    let cls = [0.0f32; 4];
    assert!(match_reg_cls_tensors(&reg, &cls, 8, 4).is_some());
    let (r, c) = match_reg_cls_tensors(&cls, &reg, 8, 4).unwrap();
    assert_eq!((r.len(), c.len()), (8, 4));
    assert!(match_reg_cls_tensors(&reg, &reg, 8, 4).is_none());
  }
}

// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/bin/calibrate.rs - 尺度标定程序
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

use anyhow::{Result, bail};
use clap::Parser;
use url::Url;

use liaowang::{
  CalibrationPipeline, FromUrl, RgbFrame, depth::DepthWrapper, detect::DetectorWrapper,
  input::load_rgb_frame,
};
use tracing::info;

/// 瞭望尺度标定参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 检测器
  #[arg(long, value_name = "DETECTOR", default_value = "synthetic:")]
  pub detector: Url,
  /// 深度模型
  #[arg(long, value_name = "DEPTH", default_value = "gradient:")]
  pub depth: Url,
  /// 标定图像，可重复，与 --distance 一一对应
  #[arg(long, value_name = "IMAGE")]
  pub image: Vec<PathBuf>,
  /// 目标真值距离（米）
  #[arg(long, value_name = "METERS")]
  pub distance: Vec<f64>,
  /// 演示模式：使用 N 张空白帧，真值距离为 20, 25, 30, ... 米
  #[arg(long, value_name = "N", conflicts_with_all = ["image", "distance"])]
  pub demo: Option<usize>,
  /// 尺度因子保存路径（.json 或纯文本）
  #[arg(long, value_name = "SCALE", default_value = "scale.txt")]
  pub scale: PathBuf,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("检测器: {}", args.detector);
  info!("深度模型: {}", args.depth);
  info!("尺度因子保存路径: {}", args.scale.display());

  let (images, distances) = match args.demo {
    Some(n) => {
      let images = vec![RgbFrame::with_shape(480, 640); n];
      let distances = (0..n).map(|i| 20.0 + 5.0 * i as f64).collect();
      (images, distances)
    }
    None => {
      if args.image.len() != args.distance.len() {
        bail!(
          "图像数量 {} 与距离数量 {} 不一致",
          args.image.len(),
          args.distance.len()
        );
      }
      let images = args
        .image
        .iter()
        .map(load_rgb_frame)
        .collect::<Result<Vec<_>, _>>()?;
      (images, args.distance)
    }
  };

  let detector = DetectorWrapper::from_url(&args.detector)?;
  let depth = DepthWrapper::from_url(&args.depth)?;
  let pipeline = CalibrationPipeline::new(detector, depth);

  let now = std::time::Instant::now();
  let scale = pipeline.calibrate(&images, &distances)?;
  info!("标定完成，耗时: {:.2?}", now.elapsed());

  scale.save(&args.scale)?;
  println!("{}", scale);

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn demo_excludes_explicit_samples() {
    assert!(Args::try_parse_from(["calibrate", "--demo", "10"]).is_ok());
    assert!(Args::try_parse_from(["calibrate", "--demo", "10", "--distance", "20"]).is_err());
    assert!(Args::try_parse_from(["calibrate", "--demo", "10", "--image", "a.png"]).is_err());

    let args = Args::try_parse_from([
      "calibrate",
      "--image",
      "a.png",
      "--distance",
      "20",
      "--image",
      "b.png",
      "--distance",
      "25",
    ])
    .unwrap();
    assert_eq!(args.image.len(), 2);
    assert_eq!(args.distance, vec![20.0, 25.0]);
    assert_eq!(args.depth.scheme(), "gradient");
  }
}

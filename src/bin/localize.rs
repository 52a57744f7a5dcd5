// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/bin/localize.rs - 逐帧定位程序
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use liaowang::{
  FromUrl, Intrinsics, RuntimePipeline, ScaleFactor,
  depth::DepthWrapper,
  detect::DetectorWrapper,
  input::InputWrapper,
  output::OutputWrapper,
  task::{LocalizeTask, Task},
};
use tracing::info;

/// 瞭望定位参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 检测器
  #[arg(long, value_name = "DETECTOR", default_value = "synthetic:")]
  pub detector: Url,
  /// 深度模型
  #[arg(long, value_name = "DEPTH", default_value = "gradient:")]
  pub depth: Url,
  /// 相机内参，如 pinhole:?fx=800&fy=800&cx=320&cy=240
  #[arg(long, value_name = "INTRINSICS")]
  pub intrinsics: Url,
  /// 标定得到的尺度因子文件
  #[arg(long, value_name = "SCALE")]
  pub scale: PathBuf,
  /// 输入来源
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径
  #[arg(long, value_name = "OUTPUT", default_value = "log:")]
  pub output: Url,

  #[arg(long, value_name = "FRAME_NUMBER")]
  pub frame_number: Option<usize>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("检测器: {}", args.detector);
  info!("深度模型: {}", args.depth);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let scale = ScaleFactor::load(&args.scale)?;
  let intrinsics = Intrinsics::from_url(&args.intrinsics)?;
  let input = InputWrapper::from_url(&args.input)?;
  let detector = DetectorWrapper::from_url(&args.detector)?;
  let depth = DepthWrapper::from_url(&args.depth)?;
  let output = OutputWrapper::from_url(&args.output)?;

  let summary = LocalizeTask::new(scale, intrinsics)
    .with_frame_number(args.frame_number)
    .with_interrupt(true)
    .run_task(input, RuntimePipeline::new(detector, depth), output)?;
  info!("{:?}", summary);

  Ok(())
}

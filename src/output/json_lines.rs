// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/output/json_lines.rs - JSON Lines 记录输出
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

use std::{
  fs::File,
  io::{BufWriter, Write},
  path::Path,
  sync::{Mutex, PoisonError},
};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, frame::InputFrame, output::Report, pipeline::Localization,
  url_file_path,
};

#[derive(Error, Debug)]
pub enum JsonLinesOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("文件路径无效: {0}")]
  InvalidPath(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct LocalizationRecord<'a> {
  timestamp: String,
  index: u64,
  source: &'a str,
  #[serde(flatten)]
  localization: &'a Localization,
}

/// 每帧一行 JSON 追加写入文件
pub struct JsonLinesOutput {
  writer: Mutex<BufWriter<File>>,
}

impl FromUrlWithScheme for JsonLinesOutput {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for JsonLinesOutput {
  type Error = JsonLinesOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(JsonLinesOutputError::SchemeMismatch);
    }
    let path =
      url_file_path(uri).map_err(|e| JsonLinesOutputError::InvalidPath(e.to_string()))?;
    Self::create(path)
  }
}

impl JsonLinesOutput {
  pub fn create(path: impl AsRef<Path>) -> Result<Self, JsonLinesOutputError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let file = File::options().create(true).append(true).open(path)?;
    info!("定位记录写入: {}", path.display());
    Ok(Self {
      writer: Mutex::new(BufWriter::new(file)),
    })
  }
}

impl Report<InputFrame, Localization> for JsonLinesOutput {
  type Error = JsonLinesOutputError;

  fn report_result(&self, frame: &InputFrame, result: &Localization) -> Result<(), Self::Error> {
    let record = LocalizationRecord {
      timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
      index: frame.index,
      source: &frame.source,
      localization: result,
    };

    let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
    serde_json::to_writer(&mut *writer, &record)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
  }
}

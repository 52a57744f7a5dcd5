// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/output.rs - 定位结果输出
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
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::InputFrame, pipeline::Localization};

pub trait Report<Frame, Output>: Sized {
  type Error;
  fn report_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error>;
}

mod json_lines;
mod log_output;

pub use self::json_lines::{JsonLinesOutput, JsonLinesOutputError};
pub use self::log_output::LogOutput;

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("JSON Lines 输出错误: {0}")]
  JsonLinesOutputError(#[from] JsonLinesOutputError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

pub enum OutputWrapper {
  Log(LogOutput),
  JsonLines(JsonLinesOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      LogOutput::SCHEME => Ok(OutputWrapper::Log(LogOutput)),
      JsonLinesOutput::SCHEME => Ok(OutputWrapper::JsonLines(JsonLinesOutput::from_url(url)?)),
      other => Err(OutputError::SchemeMismatch(other.to_string())),
    }
  }
}

impl Report<InputFrame, Localization> for OutputWrapper {
  type Error = OutputError;

  fn report_result(&self, frame: &InputFrame, result: &Localization) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::Log(output) => match output.report_result(frame, result) {
        Ok(()) => Ok(()),
        Err(never) => match never {},
      },
      OutputWrapper::JsonLines(output) => output
        .report_result(frame, result)
        .map_err(OutputError::from),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scheme_selects_the_output() {
    let url = Url::parse("log:").unwrap();
    assert!(matches!(OutputWrapper::from_url(&url), Ok(OutputWrapper::Log(_))));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("positions.jsonl");
    let url = Url::parse(&format!("jsonl://{}", path.display())).unwrap();
    assert!(matches!(OutputWrapper::from_url(&url), Ok(OutputWrapper::JsonLines(_))));
    assert!(path.exists());

    let url = Url::parse("rtsp://camera/stream").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url),
      Err(OutputError::SchemeMismatch(s)) if s == "rtsp"
    ));
  }
}

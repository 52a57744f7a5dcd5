// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/calibration/store.rs - 尺度因子的持久化
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

use std::{path::Path, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::info;

use crate::{calibration::ScaleFactor, error::LocalizeError};

#[derive(Serialize, Deserialize)]
struct ScaleRecord {
  scale_factor: f64,
}

impl Serialize for ScaleFactor {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    ScaleRecord {
      scale_factor: self.value(),
    }
    .serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for ScaleFactor {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let record = ScaleRecord::deserialize(deserializer)?;
    ScaleFactor::new(record.scale_factor).map_err(serde::de::Error::custom)
  }
}

impl FromStr for ScaleFactor {
  type Err = LocalizeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let value = s
      .trim()
      .parse::<f64>()
      .map_err(|e| LocalizeError::ScaleFormat(format!("{}: {:?}", e, s.trim())))?;
    ScaleFactor::new(value)
  }
}

fn is_json(path: &Path) -> bool {
  path
    .extension()
    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

impl ScaleFactor {
  /// 保存尺度因子；`.json` 文件写入 `{"scale_factor": s}`，其余写纯文本
  pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LocalizeError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let text = if is_json(path) {
      serde_json::to_string_pretty(self)?
    } else {
      format!("{}\n", self)
    };
    std::fs::write(path, text)?;

    info!("尺度因子 {} 已保存到 {}", self, path.display());
    Ok(())
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, LocalizeError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let scale = if is_json(path) {
      serde_json::from_str(&text)?
    } else {
      text.parse()?
    };
    info!("从 {} 读取尺度因子 {}", path.display(), scale);
    Ok(scale)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_text_round_trip_is_exact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scale.txt");
    let scale = ScaleFactor::new(26.666666666666668).unwrap();
    scale.save(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "26.666666666666668");
    assert_eq!(ScaleFactor::load(&path).unwrap(), scale);
  }

  #[test]
  fn json_record_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("scale.json");
    let scale = ScaleFactor::new(0.1 + 0.2).unwrap();
    scale.save(&path).unwrap();

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["scale_factor"].as_f64(), Some(0.1 + 0.2));
    assert_eq!(ScaleFactor::load(&path).unwrap(), scale);
  }

  #[test]
  fn malformed_text_is_rejected() {
    assert!(matches!(
      "twelve".parse::<ScaleFactor>(),
      Err(LocalizeError::ScaleFormat(_))
    ));
    assert!(matches!(
      "inf".parse::<ScaleFactor>(),
      Err(LocalizeError::InvalidScaleFactor(_))
    ));
    assert_eq!(" 3.5\n".parse::<ScaleFactor>().unwrap().value(), 3.5);
  }

  #[test]
  fn json_with_non_finite_or_missing_field_is_rejected() {
    assert!(serde_json::from_str::<ScaleFactor>(r#"{"scale": 1.0}"#).is_err());
    assert!(serde_json::from_str::<ScaleFactor>(r#"{"scale_factor": 2.0}"#).is_ok());
  }
}

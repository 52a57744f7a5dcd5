// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/geometry/pinhole.rs - 针孔相机反投影
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

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, error::LocalizeError, query_param, url_file_path};

/// 针孔相机内参，焦距与主点均以像素为单位
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
  pub fx: f64,
  pub fy: f64,
  pub cx: f64,
  pub cy: f64,
}

/// 相机坐标系下的位置（米），Z 沿光轴
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position3D {
  pub x: f64,
  pub y: f64,
  pub z: f64,
}

impl Intrinsics {
  pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Result<Self, LocalizeError> {
    let intrinsics = Self { fx, fy, cx, cy };
    intrinsics.validate()?;
    Ok(intrinsics)
  }

  /// 焦距必须非零且有限，否则反投影无定义
  pub fn validate(&self) -> Result<(), LocalizeError> {
    let focal_ok = |f: f64| f != 0.0 && f.is_finite();
    if !focal_ok(self.fx) || !focal_ok(self.fy) || !self.cx.is_finite() || !self.cy.is_finite() {
      return Err(LocalizeError::InvalidIntrinsics {
        fx: self.fx,
        fy: self.fy,
      });
    }
    Ok(())
  }

  pub fn load_json(path: impl AsRef<std::path::Path>) -> Result<Self, LocalizeError> {
    let text = std::fs::read_to_string(path)?;
    let intrinsics: Intrinsics = serde_json::from_str(&text)?;
    intrinsics.validate()?;
    Ok(intrinsics)
  }
}

/// 反投影：`X = (u - cx) z / fx`，`Y = (v - cy) z / fy`，`Z = z`
pub fn back_project(
  x_pixel: f64,
  y_pixel: f64,
  z: f64,
  intrinsics: &Intrinsics,
) -> Result<Position3D, LocalizeError> {
  if intrinsics.fx == 0.0 || intrinsics.fy == 0.0 {
    return Err(LocalizeError::InvalidIntrinsics {
      fx: intrinsics.fx,
      fy: intrinsics.fy,
    });
  }

  Ok(Position3D {
    x: (x_pixel - intrinsics.cx) * z / intrinsics.fx,
    y: (y_pixel - intrinsics.cy) * z / intrinsics.fy,
    z,
  })
}

impl FromUrlWithScheme for Intrinsics {
  const SCHEME: &'static str = "pinhole";
}

impl FromUrl for Intrinsics {
  type Error = LocalizeError;

  /// `pinhole://?fx=..&fy=..&cx=..&cy=..` 或 `pinhole:///path/camera.json`
  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LocalizeError::scheme_mismatch(Self::SCHEME, url.scheme()));
    }

    if url.query().is_none() && !url.path().is_empty() && url.path() != "/" {
      return Self::load_json(url_file_path(url)?);
    }

    let required = |key: &str| -> Result<f64, LocalizeError> {
      query_param::<f64>(url, key)?
        .ok_or_else(|| LocalizeError::InvalidUrl(format!("缺少相机内参 {}", key)))
    };

    Self::new(
      required("fx")?,
      required("fy")?,
      required("cx")?,
      required("cy")?,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;

  fn camera() -> Intrinsics {
    Intrinsics {
      fx: 100.0,
      fy: 100.0,
      cx: 320.0,
      cy: 240.0,
    }
  }

  #[test]
  fn principal_point_maps_to_optical_axis() {
    let p = back_project(320.0, 240.0, 10.0, &camera()).unwrap();
    assert_eq!(p, Position3D { x: 0.0, y: 0.0, z: 10.0 });
  }

  #[test]
  fn off_axis_pixel_scales_with_depth() {
    let p = back_project(420.0, 190.0, 20.0, &camera()).unwrap();
    assert_relative_eq!(p.x, 20.0);
    assert_relative_eq!(p.y, -10.0);
    assert_relative_eq!(p.z, 20.0);
  }

  #[test]
  fn anisotropic_focal_lengths() {
    let intrinsics = Intrinsics {
      fx: 500.0,
      fy: 250.0,
      cx: 0.0,
      cy: 0.0,
    };
    let p = back_project(50.0, 50.0, 4.0, &intrinsics).unwrap();
    assert_relative_eq!(p.x, 0.4);
    assert_relative_eq!(p.y, 0.8);
  }

  #[test]
  fn zero_focal_length_is_rejected() {
    let mut intrinsics = camera();
    intrinsics.fx = 0.0;
    assert!(matches!(
      back_project(1.0, 1.0, 1.0, &intrinsics),
      Err(LocalizeError::InvalidIntrinsics { .. })
    ));

    let mut intrinsics = camera();
    intrinsics.fy = 0.0;
    assert!(matches!(
      back_project(1.0, 1.0, 1.0, &intrinsics),
      Err(LocalizeError::InvalidIntrinsics { .. })
    ));
    assert!(Intrinsics::new(0.0, 1.0, 0.0, 0.0).is_err());
  }

  #[test]
  fn intrinsics_from_query_url() {
    let url = Url::parse("pinhole://?fx=600&fy=610.5&cx=320&cy=240").unwrap();
    let intrinsics = Intrinsics::from_url(&url).unwrap();
    assert_eq!(intrinsics, Intrinsics::new(600.0, 610.5, 320.0, 240.0).unwrap());

    let url = Url::parse("pinhole://?fx=600&fy=610.5&cx=320").unwrap();
    assert!(matches!(
      Intrinsics::from_url(&url),
      Err(LocalizeError::InvalidUrl(_))
    ));

    let url = Url::parse("camera://?fx=600&fy=610.5&cx=320&cy=240").unwrap();
    assert!(matches!(
      Intrinsics::from_url(&url),
      Err(LocalizeError::SchemeMismatch { .. })
    ));
  }

  #[test]
  fn intrinsics_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("camera.json");
    std::fs::write(&path, r#"{"fx": 594.21, "fy": 591.04, "cx": 339.5, "cy": 242.7}"#).unwrap();

    let url = Url::from_file_path(&path).unwrap();
    let url = Url::parse(&format!("pinhole://{}", url.path())).unwrap();
    let intrinsics = Intrinsics::from_url(&url).unwrap();
    assert_relative_eq!(intrinsics.fx, 594.21);
    assert_relative_eq!(intrinsics.cy, 242.7);
  }

  #[test]
  fn json_path_with_escaped_characters() {
    let dir = tempfile::tempdir().unwrap();
    let cam_dir = dir.path().join("my cam").join("相机");
    std::fs::create_dir_all(&cam_dir).unwrap();
    let path = cam_dir.join("camera.json");
    std::fs::write(&path, r#"{"fx": 1.0, "fy": 2.0, "cx": 3.0, "cy": 4.0}"#).unwrap();

    let url = Url::parse(&format!("pinhole://{}", path.display())).unwrap();
    assert!(url.path().contains("my%20cam"));
    let intrinsics = Intrinsics::from_url(&url).unwrap();
    assert_eq!(intrinsics, Intrinsics::new(1.0, 2.0, 3.0, 4.0).unwrap());
  }
}

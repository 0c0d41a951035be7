// crates/mk_physics/src/params.rs

//! Modified Kostiakov-Lewis (MK) 入渗参数
//!
//! MK 方程描述充分供水条件下的累计入渗深度：
//! ```text
//! Z = k·T^a + f0·T + C
//! ```
//!
//! 其中 a（无量纲）与 k（mm/h^a）为经验系数，f0（mm/h）为稳定入渗率，
//! C（mm）为瞬时吸附与裂隙填充项（适用于开裂土壤，
//! Austin & Prendergast, 1997）。
//!
//! 用户以习惯单位（mm、小时）录入参数；构造模型时一次性换算为
//! 内部使用的 SI 单位（m、秒），此后不再换算。

use crate::error::{InfiltrationError, InfiltrationResult};
use mk_foundation::error::MkError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// MK 入渗参数（用户录入单位）
///
/// 序列化格式与参数文件一致，字段 `C` 保持大写以匹配文献记法。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KostiakovParams {
    /// 无量纲指数 a
    pub a: f64,
    /// 入渗系数 k [mm/h^a]
    pub k: f64,
    /// 稳定入渗率 f0 [mm/h]
    pub f0: f64,
    /// 瞬时裂隙填充深度 C [mm]
    #[serde(rename = "C")]
    pub c: f64,
}

/// MK 入渗参数（内部 SI 单位，构造后不可变）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiKostiakovParams {
    /// 无量纲指数 a
    pub a: f64,
    /// 入渗系数 k [m/s^a]
    pub k: f64,
    /// 稳定入渗率 f0 [m/s]
    pub f0: f64,
    /// 瞬时裂隙填充深度 C [m]
    pub c: f64,
}

impl Default for KostiakovParams {
    /// 默认使用开裂黏土参数
    fn default() -> Self {
        Self::cracking_clay()
    }
}

impl KostiakovParams {
    /// 四参数之和低于此阈值时视为"无入渗"配置
    pub const ZERO_EPSILON: f64 = 1e-6;

    /// 开裂黏土典型参数
    pub fn cracking_clay() -> Self {
        Self {
            a: 0.5,
            k: 40.0,
            f0: 0.05,
            c: 10.0,
        }
    }

    /// 验证参数物理有效性
    ///
    /// 负参数换算后物理上无意义，立即拒绝。
    pub fn validate(&self) -> InfiltrationResult<()> {
        for (field, value) in [("a", self.a), ("k", self.k), ("f0", self.f0), ("C", self.c)] {
            if !value.is_finite() || value < 0.0 {
                return Err(InfiltrationError::InvalidParameters { field, value });
            }
        }
        Ok(())
    }

    /// 四个参数是否全部为零（数值意义上）
    ///
    /// 全零配置等价于"无入渗"，调用方应跳过模型构造。
    /// 本方法只提供判定，决策属于调用方。
    pub fn is_effectively_zero(&self) -> bool {
        self.a + self.k + self.f0 + self.c < Self::ZERO_EPSILON
    }

    /// 换算为内部 SI 单位
    ///
    /// - k: mm/h^a -> m/s^a，即 `k · 0.001 / 3600^a`
    /// - f0: mm/h -> m/s，即 `f0 · 0.001 / 3600`
    /// - C: mm -> m，即 `C · 0.001`
    pub fn to_si(&self) -> SiKostiakovParams {
        SiKostiakovParams {
            a: self.a,
            k: self.k * 0.001 / 3600f64.powf(self.a),
            f0: self.f0 * 0.001 / 3600.0,
            c: self.c * 0.001,
        }
    }

    /// 从 JSON 文件加载参数
    pub fn from_file<P: AsRef<Path>>(path: P) -> InfiltrationResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MkError::file_not_found(path).into());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            MkError::io_with_source(format!("读取参数文件失败: {}", path.display()), e)
        })?;
        let params: Self = serde_json::from_str(&content)
            .map_err(|e| MkError::serialization(format!("解析参数文件失败: {}", e)))?;
        params.validate()?;
        Ok(params)
    }

    /// 保存参数到 JSON 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> InfiltrationResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| MkError::serialization(format!("序列化参数失败: {}", e)))?;
        std::fs::write(path.as_ref(), content).map_err(|e| {
            MkError::io_with_source(format!("写入参数文件失败: {}", path.as_ref().display()), e)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversion_exact() {
        let params = KostiakovParams::cracking_clay();
        let si = params.to_si();

        // k_internal = k_input * 0.001 / 3600^a
        assert!((si.k - 40.0 * 0.001 / 3600f64.powf(0.5)).abs() < 1e-12);
        assert!((si.f0 - 0.05 * 0.001 / 3600.0).abs() < 1e-12);
        assert!((si.c - 0.01).abs() < 1e-12);
        assert_eq!(si.a, 0.5);
    }

    #[test]
    fn test_validate_rejects_negative() {
        let params = KostiakovParams {
            k: -1.0,
            ..KostiakovParams::cracking_clay()
        };
        let err = params.validate().unwrap_err();
        assert!(matches!(
            err,
            InfiltrationError::InvalidParameters { field: "k", .. }
        ));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let params = KostiakovParams {
            f0: f64::NAN,
            ..KostiakovParams::cracking_clay()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_effectively_zero() {
        let zero = KostiakovParams {
            a: 0.0,
            k: 0.0,
            f0: 0.0,
            c: 0.0,
        };
        assert!(zero.is_effectively_zero());
        assert!(!KostiakovParams::cracking_clay().is_effectively_zero());
    }

    #[test]
    fn test_json_round_trip() {
        let params = KostiakovParams::cracking_clay();
        let json = serde_json::to_string(&params).unwrap();
        // 字段 C 保持大写
        assert!(json.contains("\"C\""));
        let parsed: KostiakovParams = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, params);
    }

    #[test]
    fn test_file_round_trip() {
        let params = KostiakovParams::cracking_clay();
        let path = std::env::temp_dir().join("mk_params_round_trip.json");
        params.save_to_file(&path).unwrap();
        let loaded = KostiakovParams::from_file(&path).unwrap();
        assert_eq!(loaded, params);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_from_file_missing() {
        let err = KostiakovParams::from_file("/no/such/mk_params.json").unwrap_err();
        assert!(matches!(
            err,
            InfiltrationError::Foundation(MkError::FileNotFound { .. })
        ));
    }
}

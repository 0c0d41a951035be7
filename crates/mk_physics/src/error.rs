// crates/mk_physics/src/error.rs

//! 入渗计算错误类型
//!
//! 所有错误都是局部前置条件失败：在调用边界立即检测并返回，
//! 不存在瞬态失败模式，因此没有重试与恢复路径。
//! 状态损坏（如调用方单位错误导致的非法水深）视为契约误用，
//! 报告单元索引与越界值，绝不静默截断。

use mk_foundation::error::MkError;
use thiserror::Error;

/// 入渗计算结果类型
pub type InfiltrationResult<T> = Result<T, InfiltrationError>;

/// 入渗计算错误
#[derive(Debug, Error)]
pub enum InfiltrationError {
    /// 时间步长非正（含 NaN）
    #[error("无效时间步长: dt={dt}, 要求 dt > 0")]
    InvalidTimestep {
        /// 传入的时间步长 [s]
        dt: f64,
    },

    /// 参数物理上无意义（换算后为负）
    #[error("无效入渗参数: {field}={value}, 要求非负有限值")]
    InvalidParameters {
        /// 参数名
        field: &'static str,
        /// 实际值
        value: f64,
    },

    /// 诊断数据不可用（未启用或无记录）
    #[error("诊断数据不可用: {reason}")]
    DiagnosticsUnavailable {
        /// 不可用原因
        reason: &'static str,
    },

    /// 单元状态损坏（调用方契约违规，不可恢复）
    #[error("入渗状态损坏: 单元{cell} {field}={value}")]
    StateCorruption {
        /// 单元索引
        cell: usize,
        /// 损坏字段名
        field: &'static str,
        /// 越界值
        value: f64,
    },

    /// 基础层错误（IO、尺寸、配置等）
    #[error(transparent)]
    Foundation(#[from] MkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_timestep_display() {
        let err = InfiltrationError::InvalidTimestep { dt: -0.5 };
        assert!(err.to_string().contains("-0.5"));
    }

    #[test]
    fn test_state_corruption_carries_context() {
        let err = InfiltrationError::StateCorruption {
            cell: 42,
            field: "potential_depth",
            value: -1e-3,
        };
        let msg = err.to_string();
        assert!(msg.contains("42"));
        assert!(msg.contains("potential_depth"));
    }

    #[test]
    fn test_foundation_error_transparent() {
        let err: InfiltrationError = MkError::size_mismatch("water_depth", 10, 5).into();
        assert!(err.to_string().contains("water_depth"));
    }
}

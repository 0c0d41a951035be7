// crates/mk_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `MkError` 枚举和 `MkResult` 类型别名。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，入渗计算相关错误在 mk_physics 中定义
//! 2. **易用性**: 提供便捷的构造方法
//! 3. **可追溯**: 支持错误链
//!
//! # 示例
//!
//! ```
//! use mk_foundation::error::{MkError, MkResult};
//!
//! fn read_params() -> MkResult<()> {
//!     Err(MkError::config("参数文件格式错误"))
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type MkResult<T> = Result<T, MkError>;

/// 核心错误类型
///
/// 物理计算相关的错误应在 `mk_physics` 中扩展。
#[derive(Error, Debug)]
pub enum MkError {
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 未找到的路径
        path: PathBuf,
    },

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数据超出范围
    #[error("数据超出范围: {field}={value}, 期望范围=[{min}, {max}]")]
    OutOfRange {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl MkError {
    /// 从IO错误创建
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 从IO错误创建（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 文件不存在
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数据超出范围
    pub fn out_of_range(field: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl MkError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> MkResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查值是否在范围内
    #[inline]
    pub fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> MkResult<()> {
        if value < min || value > max {
            Err(Self::out_of_range(field, value, min, max))
        } else {
            Ok(())
        }
    }
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for MkError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 测试
// ========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MkError::config("测试配置错误");
        assert!(err.to_string().contains("配置错误"));
    }

    #[test]
    fn test_io_error() {
        let err = MkError::io("读取失败");
        assert!(err.to_string().contains("IO错误"));
    }

    #[test]
    fn test_file_not_found() {
        let err = MkError::file_not_found("/path/to/file");
        assert!(err.to_string().contains("/path/to/file"));
    }

    #[test]
    fn test_check_size() {
        assert!(MkError::check_size("test", 10, 10).is_ok());
        assert!(MkError::check_size("test", 10, 5).is_err());
    }

    #[test]
    fn test_check_range() {
        assert!(MkError::check_range("value", 5.0, 0.0, 10.0).is_ok());
        assert!(MkError::check_range("value", -1.0, 0.0, 10.0).is_err());
        assert!(MkError::check_range("value", 11.0, 0.0, 10.0).is_err());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let mk_err: MkError = io_err.into();
        assert!(matches!(mk_err, MkError::Io { .. }));
    }

    #[test]
    fn test_ensure_macro() {
        fn check(value: i32) -> MkResult<()> {
            crate::ensure!(value > 0, MkError::invalid_input("value 必须为正"));
            Ok(())
        }

        assert!(check(1).is_ok());
        assert!(check(-1).is_err());
    }

    #[test]
    fn test_require_macro() {
        fn get_value(opt: Option<i32>) -> MkResult<i32> {
            let v = crate::require!(opt, MkError::invalid_input("缺少值"));
            Ok(v)
        }

        assert_eq!(get_value(Some(42)).unwrap(), 42);
        assert!(get_value(None).is_err());
    }
}

// crates/mk_foundation/src/lib.rs

//! 基础层 (Layer 1)
//!
//! 提供整个项目共用的错误类型与校验宏。
//! 物理计算相关的错误应在 `mk_physics` 中扩展，本层只定义核心错误。
//!
//! # 模块概览
//!
//! - [`error`]: `MkError` 枚举与 `MkResult` 类型别名
//!
//! # 校验宏
//!
//! - [`ensure!`]: 条件不满足时提前返回错误
//! - [`require!`]: 从 `Option` 中取值，`None` 时提前返回错误

pub mod error;

pub use error::{MkError, MkResult};

/// 条件校验宏
///
/// 条件为假时以 `$err` 提前返回。错误表达式经过 `.into()` 转换，
/// 因此可以在返回更具体错误类型的函数中使用基础错误。
///
/// # 示例
///
/// ```
/// use mk_foundation::{ensure, MkError, MkResult};
///
/// fn check(value: f64) -> MkResult<()> {
///     ensure!(value > 0.0, MkError::invalid_input("value 必须为正"));
///     Ok(())
/// }
///
/// assert!(check(1.0).is_ok());
/// assert!(check(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

/// Option 取值宏
///
/// `Some(v)` 时求值为 `v`，`None` 时以 `$err` 提前返回。
///
/// # 示例
///
/// ```
/// use mk_foundation::{require, MkError, MkResult};
///
/// fn first(values: &[f64]) -> MkResult<f64> {
///     let v = require!(values.first(), MkError::invalid_input("空序列"));
///     Ok(*v)
/// }
///
/// assert_eq!(first(&[42.0]).unwrap(), 42.0);
/// assert!(first(&[]).is_err());
/// ```
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr) => {
        match $opt {
            Some(v) => v,
            None => return Err($err.into()),
        }
    };
}

// crates/mk_physics/src/state.rs

//! 逐单元入渗状态管理
//!
//! 采用 SoA (Structure of Arrays) 布局，所有数组按单元索引对齐：
//! ```text
//! elevation:        [z_0,   z_1,   z_2,   ...]
//! opportunity_time: [t_0,   t_1,   t_2,   ...]
//! potential_depth:  [p_0,   p_1,   p_2,   ...]
//! ...
//! ```
//!
//! 全部数组在构造时一次分配并零初始化，此后只由
//! [`KostiakovModel::advance`](crate::model::KostiakovModel::advance)
//! 原地修改，每个时间步一次。状态由单个模型实例独占持有，
//! 没有进程级全局量。
//!
//! # 不变量
//!
//! - `potential_depth >= 0`
//! - `cumulative_depth` 单调不减
//! - `rate >= 0`
//! - `opportunity_time == 0` 的单元必有 `potential_depth == 0`（未触碰状态）

use crate::error::{InfiltrationError, InfiltrationResult};
use serde::{Deserialize, Serialize};

/// 逐单元入渗状态（SoA 布局）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfiltrationState {
    /// 单元数量
    n_cells: usize,

    /// 底床高程快照 [m]（构造时固定，此后只读）
    pub elevation: Vec<f64>,
    /// 入渗机会时间 [s]：当前入渗过程自开始以来的累计时长
    pub opportunity_time: Vec<f64>,
    /// `opportunity_time^a` 缓存，避免每步重复求幂
    pub opportunity_time_pow: Vec<f64>,
    /// 已累积但尚未被实际入渗满足的潜力深度 [m]
    pub potential_depth: Vec<f64>,
    /// 累计入渗深度 [m]
    pub cumulative_depth: Vec<f64>,
    /// 本步入渗速率 [m/s]（每次调用完全重算）
    pub rate: Vec<f64>,
}

impl InfiltrationState {
    /// 从高程快照创建零初始化状态
    pub fn new(elevation: Vec<f64>) -> Self {
        let n_cells = elevation.len();
        Self {
            n_cells,
            elevation,
            opportunity_time: vec![0.0; n_cells],
            opportunity_time_pow: vec![0.0; n_cells],
            potential_depth: vec![0.0; n_cells],
            cumulative_depth: vec![0.0; n_cells],
            rate: vec![0.0; n_cells],
        }
    }

    /// 单元数量
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// 检查状态不变量
    ///
    /// 违规视为调用方契约误用（例如单位错误），报告首个越界的
    /// 单元索引与字段值，不做任何截断修复。
    pub fn validate(&self) -> InfiltrationResult<()> {
        for cell in 0..self.n_cells {
            let checks = [
                ("opportunity_time", self.opportunity_time[cell]),
                ("potential_depth", self.potential_depth[cell]),
                ("cumulative_depth", self.cumulative_depth[cell]),
                ("rate", self.rate[cell]),
            ];
            for (field, value) in checks {
                if !value.is_finite() || value < 0.0 {
                    return Err(InfiltrationError::StateCorruption { cell, field, value });
                }
            }
            // 未触碰单元不应持有潜力
            if self.opportunity_time[cell] == 0.0 && self.potential_depth[cell] != 0.0 {
                return Err(InfiltrationError::StateCorruption {
                    cell,
                    field: "potential_depth",
                    value: self.potential_depth[cell],
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_zero_initialized() {
        let state = InfiltrationState::new(vec![0.0, -0.1, -0.2]);
        assert_eq!(state.n_cells(), 3);
        assert!(state.opportunity_time.iter().all(|&t| t == 0.0));
        assert!(state.potential_depth.iter().all(|&p| p == 0.0));
        assert!(state.cumulative_depth.iter().all(|&c| c == 0.0));
        assert!(state.rate.iter().all(|&r| r == 0.0));
        assert_eq!(state.elevation[1], -0.1);
    }

    #[test]
    fn test_validate_fresh_state() {
        let state = InfiltrationState::new(vec![0.0; 10]);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_validate_detects_negative_potential() {
        let mut state = InfiltrationState::new(vec![0.0; 4]);
        state.opportunity_time[2] = 1.0;
        state.potential_depth[2] = -1e-6;
        let err = state.validate().unwrap_err();
        assert!(matches!(
            err,
            InfiltrationError::StateCorruption {
                cell: 2,
                field: "potential_depth",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_untouched_invariant() {
        let mut state = InfiltrationState::new(vec![0.0; 2]);
        // opportunity_time == 0 但 potential_depth != 0 属于损坏
        state.potential_depth[1] = 0.01;
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut state = InfiltrationState::new(vec![0.0, -0.5]);
        state.opportunity_time[0] = 0.2;
        state.potential_depth[0] = 0.01;
        let json = serde_json::to_string(&state).unwrap();
        let parsed: InfiltrationState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.n_cells(), 2);
        assert_eq!(parsed.opportunity_time[0], 0.2);
        assert_eq!(parsed.elevation[1], -0.5);
    }
}

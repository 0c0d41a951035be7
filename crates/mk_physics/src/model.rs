// crates/mk_physics/src/model.rs

//! MK 入渗模型推进器
//!
//! 每个时间步对全部单元做一次顺序推进：
//!
//! 1. 新湿单元（水深达阈值且机会时间为零）开始入渗过程，
//!    潜力一次性记入 `k·dt^a + f0·dt + C`；
//! 2. 潜力已被满足且仍湿的单元延续过程，按机会时间增量
//!    记入边际潜力 `k·(T^a - T_prev^a) + f0·dt`；
//! 3. 潜力小于可用水深的单元按潜力限速，潜力清零；
//! 4. 其余湿单元按水深限速，潜力扣减水深，机会时间不推进
//!    （供水不足的时段不计入充分供水的机会时间）。
//!
//! 四遍依次作用于同一状态，后一遍读到前一遍写入的结果。
//! 单元干涸只是暂停：机会时间与潜力原样保留，复湿后从第 2 遍
//! 续走同一过程，绝不重新开始。

use crate::error::{InfiltrationError, InfiltrationResult};
use crate::params::{KostiakovParams, SiKostiakovParams};
use crate::probe::{DomainExtent, InfiltrationProbe};
use crate::state::InfiltrationState;
use glam::DVec2;
use mk_foundation::ensure;
use mk_foundation::error::MkError;
use std::path::{Path, PathBuf};

/// MK 入渗模型
///
/// 独占持有逐单元状态；参数在构造时换算为 SI 单位并固定。
#[derive(Debug, Clone)]
pub struct KostiakovModel {
    /// SI 单位参数（构造后不可变）
    params: SiKostiakovParams,
    /// 湿单元判定阈值 [m]
    min_water_depth: f64,
    /// 逐单元状态
    state: InfiltrationState,
    /// 可选诊断探针
    probe: Option<InfiltrationProbe>,
}

impl KostiakovModel {
    /// 创建模型
    ///
    /// `elevation` 为底床高程快照 [m]，`min_water_depth` 为湿单元
    /// 判定阈值 [m]。参数在此处验证并换算为 SI 单位。
    pub fn new(
        params: KostiakovParams,
        elevation: Vec<f64>,
        min_water_depth: f64,
    ) -> InfiltrationResult<Self> {
        params.validate()?;
        ensure!(
            min_water_depth.is_finite(),
            MkError::out_of_range("min_water_depth", min_water_depth, 0.0, f64::MAX)
        );
        MkError::check_range("min_water_depth", min_water_depth, 0.0, f64::MAX)?;

        Ok(Self {
            params: params.to_si(),
            min_water_depth,
            state: InfiltrationState::new(elevation),
            probe: None,
        })
    }

    /// 启用诊断探针
    ///
    /// `centers` 为与状态数组对齐的单元质心集合。
    pub fn with_probe(mut self, centers: &[DVec2], extent: DomainExtent) -> InfiltrationResult<Self> {
        MkError::check_size("centers", self.state.n_cells(), centers.len())?;
        let probe = InfiltrationProbe::locate(centers, extent)?;
        tracing::info!(
            cell = probe.cell(),
            x = probe.position().x,
            y = probe.position().y,
            "诊断探针已定位"
        );
        self.probe = Some(probe);
        Ok(self)
    }

    /// SI 单位参数
    #[inline]
    pub fn params(&self) -> &SiKostiakovParams {
        &self.params
    }

    /// 湿单元判定阈值 [m]
    #[inline]
    pub fn min_water_depth(&self) -> f64 {
        self.min_water_depth
    }

    /// 单元数量
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.state.n_cells()
    }

    /// 逐单元状态（只读）
    #[inline]
    pub fn state(&self) -> &InfiltrationState {
        &self.state
    }

    /// 单个单元的本步入渗速率 [m/s]（非负）
    #[inline]
    pub fn rate(&self, cell: usize) -> f64 {
        self.state.rate[cell]
    }

    /// 全部单元的本步入渗速率 [m/s]（非负）
    #[inline]
    pub fn rates(&self) -> &[f64] {
        &self.state.rate
    }

    /// 推进一个时间步
    ///
    /// `water_depth` 为调用方给出的当前水深 [m]，按单元索引
    /// 与状态数组对齐；`time` 仅用于诊断记录。
    /// 返回本步入渗速率数组 [m/s]（非负，由调用方取负作汇项）。
    pub fn advance(
        &mut self,
        water_depth: &[f64],
        dt: f64,
        time: f64,
    ) -> InfiltrationResult<&[f64]> {
        ensure!(dt > 0.0, InfiltrationError::InvalidTimestep { dt });
        let n = self.state.n_cells();
        MkError::check_size("water_depth", n, water_depth.len())?;
        if let Some(cell) = water_depth.iter().position(|w| !w.is_finite()) {
            return Err(InfiltrationError::StateCorruption {
                cell,
                field: "water_depth",
                value: water_depth[cell],
            });
        }

        let p = self.params;
        let mwd = self.min_water_depth;
        let state = &mut self.state;

        // 第一遍：新湿单元开始入渗过程
        for i in 0..n {
            if water_depth[i] >= mwd && state.opportunity_time[i] == 0.0 {
                state.opportunity_time[i] = dt;
                state.opportunity_time_pow[i] = dt.powf(p.a);
                state.potential_depth[i] = p.k * state.opportunity_time_pow[i] + p.f0 * dt + p.c;
            }
        }

        // 第二遍：潜力已满足且仍湿的单元延续过程
        // 第一遍刚激活的单元潜力非零，不会在此重复累积
        for i in 0..n {
            if water_depth[i] >= mwd && state.potential_depth[i] == 0.0 {
                let prev_pow = state.opportunity_time_pow[i];
                state.opportunity_time[i] += dt;
                state.opportunity_time_pow[i] = state.opportunity_time[i].powf(p.a);
                state.potential_depth[i] =
                    p.k * (state.opportunity_time_pow[i] - prev_pow) + p.f0 * dt;
            }
        }

        // 第三、四遍：速率确定与累计
        for i in 0..n {
            let w = water_depth[i];
            state.rate[i] = 0.0;
            if w >= mwd {
                if state.potential_depth[i] < w {
                    // 潜力限速：全部潜力在本步兑现
                    state.rate[i] = state.potential_depth[i] / dt;
                    state.potential_depth[i] = 0.0;
                } else {
                    // 水深限速：潜力结转，机会时间不推进
                    state.rate[i] = w / dt;
                    state.potential_depth[i] -= w;
                }
            }
            state.cumulative_depth[i] += state.rate[i] * dt;
        }

        if let Some(probe) = &mut self.probe {
            let c = probe.cell();
            probe.record(
                time,
                state.opportunity_time[c],
                state.cumulative_depth[c],
                state.potential_depth[c],
                water_depth[c],
            );
        }

        Ok(&self.state.rate)
    }

    /// 导出探针历史到 `dir`
    pub fn export_probe(&self, dir: &Path) -> InfiltrationResult<PathBuf> {
        let probe = self
            .probe
            .as_ref()
            .ok_or(InfiltrationError::DiagnosticsUnavailable {
                reason: "未启用诊断探针",
            })?;
        probe.export(dir)
    }
}

// crates/mk_physics/src/source.rs

//! 速率源/汇抽象
//!
//! 宿主求解器按统一接口向连续性方程注入源汇项：每个时间步构造
//! [`RateContext`]，依次调用各源的 [`RateSource::accumulate`]，
//! 把逐单元速率累加进水深方程右端项。源汇之间互不感知。
//!
//! 符号约定：正值加水（降雨、入流），负值失水（蒸发、入渗）。

use crate::error::InfiltrationResult;
use crate::model::KostiakovModel;
use mk_foundation::error::MkError;
use std::path::{Path, PathBuf};

/// 单个时间步的源汇计算上下文
#[derive(Debug, Clone, Copy)]
pub struct RateContext<'a> {
    /// 当前模型时间 [s]
    pub time: f64,
    /// 时间步长 [s]
    pub dt: f64,
    /// 逐单元自由水面高程 [m]
    pub stage: &'a [f64],
}

/// 水深方程的逐单元速率源
pub trait RateSource {
    /// 源名称（用于日志）
    fn name(&self) -> &'static str;

    /// 是否参与本步计算
    fn is_enabled(&self) -> bool {
        true
    }

    /// 计算本步逐单元速率 [m/s]
    ///
    /// 返回的切片按单元索引与 `ctx.stage` 对齐。
    fn compute(&mut self, ctx: &RateContext<'_>) -> InfiltrationResult<&[f64]>;

    /// 把本步速率累加进右端项
    fn accumulate(&mut self, ctx: &RateContext<'_>, rhs_h: &mut [f64]) -> InfiltrationResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        let rates = self.compute(ctx)?;
        MkError::check_size("rhs_h", rates.len(), rhs_h.len())?;
        for (rhs, rate) in rhs_h.iter_mut().zip(rates) {
            *rhs += rate;
        }
        Ok(())
    }
}

/// MK 入渗汇项适配器
///
/// 持有入渗模型，负责水面高程到水深的换算与符号取反：
/// 模型给出非负入渗速率，汇项以负值移出水体。
#[derive(Debug)]
pub struct InfiltrationSink {
    model: KostiakovModel,
    /// 水深工作数组 [m]（每步由 stage - elevation 重算）
    depth: Vec<f64>,
    /// 本步汇项速率 [m/s]（非正）
    sink_rate: Vec<f64>,
}

impl InfiltrationSink {
    /// 包装入渗模型为汇项
    pub fn new(model: KostiakovModel) -> Self {
        let n = model.n_cells();
        Self {
            model,
            depth: vec![0.0; n],
            sink_rate: vec![0.0; n],
        }
    }

    /// 内部模型（只读）
    #[inline]
    pub fn model(&self) -> &KostiakovModel {
        &self.model
    }

    /// 取回内部模型
    pub fn into_model(self) -> KostiakovModel {
        self.model
    }

    /// 导出探针历史到 `dir`
    pub fn export_probe(&self, dir: &Path) -> InfiltrationResult<PathBuf> {
        self.model.export_probe(dir)
    }
}

impl RateSource for InfiltrationSink {
    fn name(&self) -> &'static str {
        "KostiakovInfiltration"
    }

    fn compute(&mut self, ctx: &RateContext<'_>) -> InfiltrationResult<&[f64]> {
        let n = self.model.n_cells();
        MkError::check_size("stage", n, ctx.stage.len())?;

        // 水深 = 自由水面高程 - 底床高程，干单元截为零
        for i in 0..n {
            self.depth[i] = (ctx.stage[i] - self.model.state().elevation[i]).max(0.0);
        }

        self.model.advance(&self.depth, ctx.dt, ctx.time)?;
        for i in 0..n {
            self.sink_rate[i] = -self.model.rate(i);
        }
        Ok(&self.sink_rate)
    }
}

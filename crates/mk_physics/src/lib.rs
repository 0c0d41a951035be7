// crates/mk_physics/src/lib.rs

//! # mk_physics - Modified Kostiakov-Lewis 入渗核心
//!
//! 为二维地表漫流求解器提供逐单元、逐时间步的土壤入渗汇项。
//!
//! ## 模块组织
//!
//! - [`params`]: MK 参数录入、验证与 SI 单位换算
//! - [`state`]: 逐单元状态数组（SoA 布局）
//! - [`model`]: 时间步推进器（四遍顺序更新）
//! - [`probe`]: 单元诊断探针与 CSV 导出
//! - [`source`]: 宿主求解器的速率源/汇接口
//! - [`error`]: 错误类型
//!
//! ## 典型用法
//!
//! ```no_run
//! use glam::DVec2;
//! use mk_physics::{
//!     DomainExtent, InfiltrationSink, KostiakovModel, KostiakovParams, RateContext, RateSource,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let elevation = vec![0.0; 100];
//! let centers: Vec<DVec2> = (0..100)
//!     .map(|i| DVec2::new((i % 10) as f64 + 0.5, (i / 10) as f64 + 0.5))
//!     .collect();
//! let extent = DomainExtent::from_points(&centers)?;
//!
//! let model = KostiakovModel::new(KostiakovParams::cracking_clay(), elevation, 1e-3)?
//!     .with_probe(&centers, extent)?;
//! let mut sink = InfiltrationSink::new(model);
//!
//! let stage = vec![0.05; 100];
//! let mut rhs_h = vec![0.0; 100];
//! let ctx = RateContext { time: 0.0, dt: 0.2, stage: &stage };
//! sink.accumulate(&ctx, &mut rhs_h)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod model;
pub mod params;
pub mod probe;
pub mod source;
pub mod state;

pub use error::{InfiltrationError, InfiltrationResult};
pub use model::KostiakovModel;
pub use params::{KostiakovParams, SiKostiakovParams};
pub use probe::{DomainExtent, InfiltrationProbe};
pub use source::{InfiltrationSink, RateContext, RateSource};
pub use state::InfiltrationState;

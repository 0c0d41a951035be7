// apps/mk_cli/src/commands/run.rs

//! 积水消退演示命令
//!
//! 在一块缓坡矩形场地上铺一层初始积水，只启用 MK 入渗汇项，
//! 静水推进到结束时间，输出质量平衡与探针轨迹。

use anyhow::{Context, Result};
use clap::Args;
use glam::DVec2;
use mk_physics::{
    DomainExtent, InfiltrationSink, KostiakovModel, KostiakovParams, RateContext, RateSource,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// MK 参数文件路径（缺省使用开裂黏土参数）
    #[arg(short, long)]
    pub params: Option<PathBuf>,

    /// 输出目录
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// x 方向单元数
    #[arg(long, default_value = "40")]
    pub nx: usize,

    /// y 方向单元数
    #[arg(long, default_value = "20")]
    pub ny: usize,

    /// 单元边长 [m]
    #[arg(long, default_value = "1.0")]
    pub cell_size: f64,

    /// 初始积水深度 [m]
    #[arg(long, default_value = "0.05")]
    pub initial_depth: f64,

    /// 时间步长 [秒]
    #[arg(long, default_value = "0.2")]
    pub dt: f64,

    /// 模拟结束时间 [秒]
    #[arg(short = 't', long, default_value = "40.0")]
    pub end_time: f64,

    /// 湿单元判定阈值 [m]
    #[arg(long, default_value = "1e-3")]
    pub min_water_depth: f64,

    /// 日志输出间隔 [秒]
    #[arg(long, default_value = "5.0")]
    pub log_interval: f64,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== MK 入渗演示启动 ===");

    // 加载参数
    let params = match &args.params {
        Some(path) => {
            let p = KostiakovParams::from_file(path)
                .with_context(|| format!("加载参数文件失败: {}", path.display()))?;
            info!("参数文件: {}", path.display());
            p
        }
        None => {
            info!("使用默认开裂黏土参数");
            KostiakovParams::cracking_clay()
        }
    };
    info!(
        "参数: a={}, k={} mm/h^a, f0={} mm/h, C={} mm",
        params.a, params.k, params.f0, params.c
    );

    if params.is_effectively_zero() {
        warn!("四个参数全为零，入渗无效，跳过模拟");
        return Ok(());
    }

    // 构建缓坡场地：高程沿 x 方向以 1/10 坡度下降
    let n_cells = args.nx * args.ny;
    let mut elevation = Vec::with_capacity(n_cells);
    let mut centers = Vec::with_capacity(n_cells);
    for j in 0..args.ny {
        for i in 0..args.nx {
            let x = (i as f64 + 0.5) * args.cell_size;
            let y = (j as f64 + 0.5) * args.cell_size;
            elevation.push(-x / 10.0);
            centers.push(DVec2::new(x, y));
        }
    }
    info!(
        "场地: {}x{} 单元, 单元边长 {} m",
        args.nx, args.ny, args.cell_size
    );

    let extent = DomainExtent::from_points(&centers).context("推导计算域范围失败")?;
    let model = KostiakovModel::new(params, elevation.clone(), args.min_water_depth)
        .context("构建入渗模型失败")?
        .with_probe(&centers, extent)
        .context("定位诊断探针失败")?;
    let mut sink = InfiltrationSink::new(model);

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("创建输出目录失败: {}", args.output.display()))?;

    // 静水推进循环：水深方程右端项只有入渗汇项
    let initial_volume: f64 = args.initial_depth * n_cells as f64;
    let mut depth = vec![args.initial_depth; n_cells];
    let mut rhs = vec![0.0; n_cells];
    let mut time = 0.0;
    let mut last_log_time = 0.0;
    let start = Instant::now();

    info!(
        "开始模拟: 结束时间={} s, 时间步长={} s, 初始水深={} m",
        args.end_time, args.dt, args.initial_depth
    );

    while time < args.end_time {
        rhs.iter_mut().for_each(|r| *r = 0.0);
        let stage: Vec<f64> = depth
            .iter()
            .zip(&elevation)
            .map(|(h, z)| z + h)
            .collect();

        let ctx = RateContext {
            time,
            dt: args.dt,
            stage: &stage,
        };
        sink.accumulate(&ctx, &mut rhs)
            .context("入渗汇项计算失败")?;

        for (h, r) in depth.iter_mut().zip(&rhs) {
            *h = (*h + r * args.dt).max(0.0);
        }
        time += args.dt;

        if time - last_log_time >= args.log_interval {
            let state = sink.model().state();
            let h_max = depth.iter().cloned().fold(0.0_f64, f64::max);
            let wet = depth
                .iter()
                .filter(|&&h| h >= args.min_water_depth)
                .count();
            let infil_total: f64 = state.cumulative_depth.iter().sum();
            info!(
                "t={:.1} s: h_max={:.4} m, 湿单元={}/{}, 累计入渗={:.4} m·cell",
                time, h_max, wet, n_cells, infil_total
            );
            last_log_time = time;
        }
    }

    let elapsed = start.elapsed();
    let state = sink.model().state();
    let remaining: f64 = depth.iter().sum();
    let infiltrated: f64 = state.cumulative_depth.iter().sum();

    info!("=== 模拟完成 ===");
    info!("计算时间: {:.2} s", elapsed.as_secs_f64());
    info!(
        "质量平衡: 初始={:.6}, 剩余={:.6}, 入渗={:.6}, 误差={:.3e} [m·cell]",
        initial_volume,
        remaining,
        infiltrated,
        (initial_volume - remaining - infiltrated).abs()
    );

    let csv_path = sink
        .export_probe(&args.output)
        .context("导出探针历史失败")?;
    info!("探针轨迹: {}", csv_path.display());

    Ok(())
}

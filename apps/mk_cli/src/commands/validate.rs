// apps/mk_cli/src/commands/validate.rs

//! 参数文件验证命令
//!
//! 检查 MK 参数文件的格式与物理有效性，并打印 SI 单位换算结果。

use anyhow::{bail, Context, Result};
use clap::Args;
use mk_physics::KostiakovParams;
use std::path::PathBuf;
use tracing::{info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 参数文件路径
    #[arg(short, long)]
    pub params: PathBuf,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== MK 参数验证 ===");
    println!("\n检查参数文件: {}", args.params.display());

    if !args.params.exists() {
        bail!("参数文件不存在: {}", args.params.display());
    }

    // 先做格式级解析，给出字段级错误
    let content = std::fs::read_to_string(&args.params).context("无法读取参数文件")?;
    let json: serde_json::Value =
        serde_json::from_str(&content).context("JSON 解析错误")?;
    for field in ["a", "k", "f0", "C"] {
        if json.get(field).is_none() {
            bail!("缺少必需字段: {}", field);
        }
    }

    // 再做物理级验证（from_file 内部调用 validate）
    let params = KostiakovParams::from_file(&args.params).context("参数验证失败")?;
    println!("  ✓ 格式有效，参数物理上可用");

    println!("\n录入单位:");
    println!("  a  = {} [-]", params.a);
    println!("  k  = {} [mm/h^a]", params.k);
    println!("  f0 = {} [mm/h]", params.f0);
    println!("  C  = {} [mm]", params.c);

    let si = params.to_si();
    println!("\nSI 单位换算:");
    println!("  k  = {:e} [m/s^a]", si.k);
    println!("  f0 = {:e} [m/s]", si.f0);
    println!("  C  = {:e} [m]", si.c);

    if params.is_effectively_zero() {
        warn!("四个参数全为零：该配置等价于无入渗，运行时将跳过模型");
        println!("\n⚠ 全零参数，入渗无效");
    } else {
        println!("\n✓ 验证通过");
    }

    Ok(())
}

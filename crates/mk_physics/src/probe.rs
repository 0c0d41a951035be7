// crates/mk_physics/src/probe.rs

//! 单元诊断探针
//!
//! 可选组件：跟踪一个指定单元的入渗轨迹，用于外部验证。
//! 探针只在 [`advance`](crate::model::KostiakovModel::advance)
//! 完全返回后读取被跟踪单元的字段，不参与任何计算。
//!
//! # 单元选取
//!
//! 取计算域 x 方向中点、y 方向四分点处的目标点，
//! 按单元索引升序扫描质心，选取欧氏距离最小的单元；
//! 距离相同取先遇到者（first-wins，扫描顺序稳定）。
//!
//! # 导出格式
//!
//! 每次运行一个逗号分隔文件 `cell_infilt{index}.csv`：
//! 表头行依次为五个字段名，其后在同一行追加被跟踪单元的
//! 索引与坐标；随后每个记录步一行，五个数值列。

use crate::error::{InfiltrationError, InfiltrationResult};
use glam::DVec2;
use mk_foundation::error::MkError;
use mk_foundation::{ensure, require};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 计算域范围
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainExtent {
    /// x 最小值 [m]
    pub x_min: f64,
    /// x 最大值 [m]
    pub x_max: f64,
    /// y 最小值 [m]
    pub y_min: f64,
    /// y 最大值 [m]
    pub y_max: f64,
}

impl DomainExtent {
    /// 创建计算域范围
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// 从质心集合推导包围范围
    pub fn from_points(points: &[DVec2]) -> InfiltrationResult<Self> {
        let first = require!(points.first(), MkError::config("空的单元质心集合"));
        let mut extent = Self::new(first.x, first.x, first.y, first.y);
        for p in &points[1..] {
            extent.x_min = extent.x_min.min(p.x);
            extent.x_max = extent.x_max.max(p.x);
            extent.y_min = extent.y_min.min(p.y);
            extent.y_max = extent.y_max.max(p.y);
        }
        Ok(extent)
    }

    /// 探针目标点：x 中点、y 四分点
    #[inline]
    pub(crate) fn probe_target(&self) -> DVec2 {
        DVec2::new(
            self.x_min + 0.5 * (self.x_max - self.x_min),
            self.y_min + 0.25 * (self.y_max - self.y_min),
        )
    }
}

/// 入渗诊断探针
///
/// 持有被跟踪单元的索引、质心坐标与五条历史序列。
#[derive(Debug, Clone)]
pub struct InfiltrationProbe {
    /// 被跟踪单元索引
    cell: usize,
    /// 被跟踪单元质心坐标
    position: DVec2,
    /// 模型时间 [s]
    model_time: Vec<f64>,
    /// 入渗机会时间 [s]
    opportunity_time: Vec<f64>,
    /// 累计入渗深度 [m]
    infiltration: Vec<f64>,
    /// 未满足的潜力深度 [m]
    infiltration_potential: Vec<f64>,
    /// 水深 [m]
    water_depth: Vec<f64>,
}

impl InfiltrationProbe {
    /// 在质心集合中定位被跟踪单元
    pub fn locate(centers: &[DVec2], extent: DomainExtent) -> InfiltrationResult<Self> {
        ensure!(!centers.is_empty(), MkError::config("空的单元质心集合"));

        let target = extent.probe_target();
        let mut best = 0usize;
        let mut best_distance = f64::INFINITY;
        for (i, center) in centers.iter().enumerate() {
            let d = center.distance(target);
            // 严格小于：距离相同取先遇到的单元
            if d < best_distance {
                best = i;
                best_distance = d;
            }
        }

        Ok(Self {
            cell: best,
            position: centers[best],
            model_time: Vec::new(),
            opportunity_time: Vec::new(),
            infiltration: Vec::new(),
            infiltration_potential: Vec::new(),
            water_depth: Vec::new(),
        })
    }

    /// 被跟踪单元索引
    #[inline]
    pub fn cell(&self) -> usize {
        self.cell
    }

    /// 被跟踪单元质心坐标
    #[inline]
    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// 已记录的时间步数
    #[inline]
    pub fn len(&self) -> usize {
        self.model_time.len()
    }

    /// 是否尚无记录
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.model_time.is_empty()
    }

    /// 模型时间序列 [s]
    pub fn model_time(&self) -> &[f64] {
        &self.model_time
    }

    /// 机会时间序列 [s]
    pub fn opportunity_time(&self) -> &[f64] {
        &self.opportunity_time
    }

    /// 累计入渗序列 [m]
    pub fn infiltration(&self) -> &[f64] {
        &self.infiltration
    }

    /// 潜力深度序列 [m]
    pub fn infiltration_potential(&self) -> &[f64] {
        &self.infiltration_potential
    }

    /// 水深序列 [m]
    pub fn water_depth(&self) -> &[f64] {
        &self.water_depth
    }

    /// 追加一个时间步的记录
    pub(crate) fn record(
        &mut self,
        time: f64,
        opportunity_time: f64,
        infiltration: f64,
        potential: f64,
        water_depth: f64,
    ) {
        self.model_time.push(time);
        self.opportunity_time.push(opportunity_time);
        self.infiltration.push(infiltration);
        self.infiltration_potential.push(potential);
        self.water_depth.push(water_depth);
    }

    /// 导出历史到 `dir/cell_infilt{index}.csv`
    ///
    /// 纯序列化，无聚合计算。返回写出的文件路径。
    pub fn export(&self, dir: &Path) -> InfiltrationResult<PathBuf> {
        ensure!(
            !self.is_empty(),
            InfiltrationError::DiagnosticsUnavailable {
                reason: "未记录任何时间步"
            }
        );

        std::fs::create_dir_all(dir)
            .map_err(|e| MkError::io_with_source(format!("创建输出目录失败: {}", dir.display()), e))?;

        let path = dir.join(format!("cell_infilt{}.csv", self.cell));
        let file = File::create(&path)
            .map_err(|e| MkError::io_with_source(format!("创建诊断文件失败: {}", path.display()), e))?;
        let mut writer = BufWriter::new(file);

        let write_err = |e: std::io::Error| MkError::io_with_source("写入诊断文件失败", e);

        writeln!(
            writer,
            "Model_time,Opportunity_time,Infiltration,Infiltration_potential,Water_depth,{},{},{}",
            self.cell, self.position.x, self.position.y
        )
        .map_err(write_err)?;

        for i in 0..self.model_time.len() {
            writeln!(
                writer,
                "{},{},{},{},{}",
                self.model_time[i],
                self.opportunity_time[i],
                self.infiltration[i],
                self.infiltration_potential[i],
                self.water_depth[i]
            )
            .map_err(write_err)?;
        }

        writer.flush().map_err(write_err)?;
        tracing::debug!(path = %path.display(), steps = self.len(), "诊断文件已写出");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_centers(nx: usize, ny: usize, dx: f64, dy: f64) -> Vec<DVec2> {
        let mut centers = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                centers.push(DVec2::new((i as f64 + 0.5) * dx, (j as f64 + 0.5) * dy));
            }
        }
        centers
    }

    #[test]
    fn test_extent_from_points() {
        let centers = grid_centers(10, 5, 1.0, 1.0);
        let extent = DomainExtent::from_points(&centers).unwrap();
        assert_eq!(extent.x_min, 0.5);
        assert_eq!(extent.x_max, 9.5);
        assert_eq!(extent.y_min, 0.5);
        assert_eq!(extent.y_max, 4.5);
    }

    #[test]
    fn test_extent_empty_rejected() {
        assert!(DomainExtent::from_points(&[]).is_err());
    }

    #[test]
    fn test_probe_target_point() {
        let extent = DomainExtent::new(0.0, 10.0, 0.0, 4.0);
        let target = extent.probe_target();
        assert_eq!(target.x, 5.0);
        assert_eq!(target.y, 1.0);
    }

    #[test]
    fn test_locate_nearest_cell() {
        // 10x4 网格，dx = dy = 1，目标点 (5, 1)
        let centers = grid_centers(10, 4, 1.0, 1.0);
        let extent = DomainExtent::new(0.0, 10.0, 0.0, 4.0);
        let probe = InfiltrationProbe::locate(&centers, extent).unwrap();
        // 质心 (4.5, 0.5) 与 (5.5, 0.5)、(4.5, 1.5)、(5.5, 1.5) 距目标等距，
        // 升序扫描先遇到 (4.5, 0.5)，即行 0 列 4
        assert_eq!(probe.cell(), 4);
        assert_eq!(probe.position(), DVec2::new(4.5, 0.5));
    }

    #[test]
    fn test_locate_tie_breaks_first_wins() {
        // 两个与目标点等距的质心，取索引较小者
        let centers = vec![DVec2::new(0.0, 0.0), DVec2::new(2.0, 0.0)];
        let extent = DomainExtent::new(0.0, 2.0, 0.0, 0.0);
        let probe = InfiltrationProbe::locate(&centers, extent).unwrap();
        assert_eq!(probe.cell(), 0);
    }

    #[test]
    fn test_export_without_records() {
        let probe =
            InfiltrationProbe::locate(&[DVec2::ZERO], DomainExtent::new(0.0, 0.0, 0.0, 0.0))
                .unwrap();
        let err = probe.export(&std::env::temp_dir()).unwrap_err();
        assert!(matches!(
            err,
            InfiltrationError::DiagnosticsUnavailable { .. }
        ));
    }

    #[test]
    fn test_export_header_carries_cell_and_coords() {
        let mut probe =
            InfiltrationProbe::locate(&[DVec2::new(1.5, 2.5)], DomainExtent::new(0.0, 3.0, 0.0, 5.0))
                .unwrap();
        probe.record(0.2, 0.2, 0.001, 0.0, 0.05);

        let dir = std::env::temp_dir().join("mk_probe_header_test");
        let path = probe.export(&dir).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert!(header.starts_with(
            "Model_time,Opportunity_time,Infiltration,Infiltration_potential,Water_depth"
        ));
        assert!(header.contains(",0,1.5,2.5"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}

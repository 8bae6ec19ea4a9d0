//! # fcc 堆垛与广义层错结构
//!
//! 沿 [111] 方向按 A/B/C 序列堆叠 fcc 原子层，并通过平移部分原子层
//! 生成广义层错能 (GSFE) 曲线所需的一系列结构。
//!
//! 晶胞取正交胞：x 沿 [1-10]，y 沿 [11-2]，z 沿 [111]，
//! 单位长度分别为 √2/2、√6/2、√3/3 倍晶格常数。
//!
//! ## 依赖关系
//! - 被 `commands/gsf.rs` 调用
//! - 使用 `models/cell.rs` 的编辑接口

use crate::error::{CellforgeError, Result};
use crate::models::{Cell, Site};
use std::ops::Range;

/// 层位判定容差（分数坐标）
const LAYER_TOLERANCE: f64 = 1e-6;

/// 本征层错平移的原子层
pub const INTRINSIC_FAULT_LAYERS: Range<usize> = 0..7;

/// 外禀层错阶段平移的原子层
pub const EXTRINSIC_FAULT_LAYERS: Range<usize> = 1..6;

/// 孪晶默认堆垛序列
pub const TWIN_SEQUENCE: &str = "ABCACBACBACABC";

/// fcc 密排层类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackingLayer {
    A,
    B,
    C,
}

impl StackingLayer {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(StackingLayer::A),
            'B' => Some(StackingLayer::B),
            'C' => Some(StackingLayer::C),
            _ => None,
        }
    }

    /// 该层在 y 方向的起始偏移
    fn y_offset(self, ny: usize) -> f64 {
        let thirds = match self {
            StackingLayer::A => 0.0,
            StackingLayer::B => 1.0,
            StackingLayer::C => 2.0,
        };
        thirds / (3.0 * ny as f64)
    }
}

/// 解析堆垛序列字符串 (如 "ABCABC")
pub fn parse_sequence(sequence: &str) -> Result<Vec<StackingLayer>> {
    let layers = sequence
        .chars()
        .map(|c| {
            StackingLayer::from_char(c).ok_or_else(|| {
                CellforgeError::InvalidArgument(format!(
                    "Invalid stacking layer '{}' in '{}' (A, B, C only)",
                    c, sequence
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if layers.is_empty() {
        return Err(CellforgeError::InvalidArgument(
            "Stacking sequence is empty".to_string(),
        ));
    }
    Ok(layers)
}

/// 按堆垛序列构建 fcc 平板
///
/// 所有位点只允许沿 z 弛豫。
pub fn build_fcc_slab(
    element: &str,
    lattice_constant: f64,
    nx: usize,
    ny: usize,
    sequence: &str,
) -> Result<Cell> {
    if nx == 0 || ny == 0 {
        return Err(CellforgeError::InvalidArgument(
            "Periodicities must be at least 1".to_string(),
        ));
    }
    let layers = parse_sequence(sequence)?;
    let nz = layers.len();

    let ax = 2f64.sqrt() / 2.0;
    let ay = 6f64.sqrt() / 2.0;
    let az = 3f64.sqrt() / 3.0;

    let mut cell = Cell::new();
    cell.set_header(sequence);
    cell.set_elements(vec![element.to_string()]);
    cell.set_scale(lattice_constant)?;
    cell.set_coordinate_system("Direct")?;
    cell.set_lattice_matrix([
        [nx as f64 * ax, 0.0, 0.0],
        [0.0, ny as f64 * ay, 0.0],
        [0.0, 0.0, nz as f64 * az],
    ]);

    let mut index = 0;
    for (k, layer) in layers.iter().enumerate() {
        let z = k as f64 / nz as f64;
        add_layer(&mut cell, *layer, nx, ny, z, &mut index)?;
    }

    cell.set_site_mobilities(false, false, true);
    Ok(cell)
}

/// 在高度 z 处加入一层 nx × ny 的密排原子
fn add_layer(
    cell: &mut Cell,
    layer: StackingLayer,
    nx: usize,
    ny: usize,
    z: f64,
    index: &mut usize,
) -> Result<()> {
    let dx = 1.0 / nx as f64;
    let dy = 1.0 / ny as f64;
    let y0 = layer.y_offset(ny);

    for j in 0..ny {
        let y = y0 + j as f64 * dy;
        for i in 0..nx {
            let x = i as f64 * dx;
            for position in [[x, y, z], [x + 0.5 * dx, y + 0.5 * dy, z]] {
                cell.add_site(0, Site::new(position, *index))?;
                *index += 1;
            }
        }
    }
    Ok(())
}

/// 平板的层结构信息
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    /// 升序排列的各层 z 坐标
    pub z_levels: Vec<f64>,
    /// y 方向周期数
    pub ny: usize,
}

/// 将 z ≥ 1 的位点折回晶胞内，并统计原子层和 y 周期
///
/// 每层 2 个 y 值，A/B/C 共 3 种层，故 ny = 不同 y 值数 / 6。
pub fn wrap_and_index_layers(cell: &mut Cell) -> Result<LayerInfo> {
    let mut zs = Vec::new();
    let mut ys = Vec::new();

    for g in 0..cell.number_of_element_groups() {
        for n in 0..cell.atom_count_in_group(g)? {
            let [x, y, mut z] = cell.site(g, n)?.position;
            if z >= 1.0 {
                z -= 1.0;
            }
            cell.move_site(g, n, [x, y, z])?;
            zs.push(z);
            ys.push(y);
        }
    }

    let z_levels = distinct_sorted(zs);
    let ny = distinct_sorted(ys).len() / 6;
    if ny == 0 {
        return Err(CellforgeError::InvalidArgument(
            "Structure has fewer than 6 distinct y positions; not an A/B/C stacked slab"
                .to_string(),
        ));
    }

    Ok(LayerInfo { z_levels, ny })
}

fn distinct_sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup_by(|a, b| (*a - *b).abs() < LAYER_TOLERANCE);
    values
}

/// 将指定原子层沿 y 平移 `displacement` 个 Burgers 分量 (a/√6 方向)
pub fn shift_layers(
    cell: &mut Cell,
    layers: Range<usize>,
    displacement: f64,
    info: &LayerInfo,
) -> Result<()> {
    let end = layers.end.min(info.z_levels.len());
    let start = layers.start.min(end);
    let targets = &info.z_levels[start..end];
    let dy = displacement / (3.0 * info.ny as f64);

    for g in 0..cell.number_of_element_groups() {
        for n in 0..cell.atom_count_in_group(g)? {
            let [x, y, z] = cell.site(g, n)?.position;
            if targets.iter().any(|t| (t - z).abs() < LAYER_TOLERANCE) {
                cell.move_site(g, n, [x, y + dy, z])?;
            }
        }
    }

    cell.set_site_mobilities(false, false, true);
    Ok(())
}

/// 一个层错结构及其累计位移
#[derive(Debug, Clone)]
pub struct FaultedStructure {
    pub displacement: f64,
    pub cell: Cell,
}

/// 生成广义层错路径上的结构序列
///
/// 先平移底部 7 层得到本征层错 (ISF) 路径；`full_pathway` 时再从
/// 位移 1 的结构出发平移第 1-5 层，得到外禀层错 (ESF) 路径，
/// 位移记为 d + 1。
pub fn generalized_stacking_fault(
    base: &Cell,
    info: &LayerInfo,
    displacements: &[f64],
    full_pathway: bool,
) -> Result<Vec<FaultedStructure>> {
    let mut structures = Vec::with_capacity(displacements.len() * 2);

    for &d in displacements {
        let mut cell = base.clone();
        shift_layers(&mut cell, INTRINSIC_FAULT_LAYERS, d, info)?;
        structures.push(FaultedStructure {
            displacement: d,
            cell,
        });
    }

    if full_pathway {
        if let Some(intrinsic) = structures.last().map(|s| s.cell.clone()) {
            for &d in displacements.iter().skip(1) {
                let mut cell = intrinsic.clone();
                shift_layers(&mut cell, EXTRINSIC_FAULT_LAYERS, d, info)?;
                structures.push(FaultedStructure {
                    displacement: d + 1.0,
                    cell,
                });
            }
        }
    }

    Ok(structures)
}

/// 层错结构文件名，如 `POSCAR_050000`
pub fn fault_file_name(prefix: &str, displacement: f64) -> String {
    format!("{}_{}", prefix, format!("{:.5}", displacement).replace('.', ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::linspace;
    use crate::models::Mobility;

    #[test]
    fn test_parse_sequence() {
        assert_eq!(
            parse_sequence("abC").unwrap(),
            vec![StackingLayer::A, StackingLayer::B, StackingLayer::C]
        );
        assert!(parse_sequence("ABD").is_err());
        assert!(parse_sequence("").is_err());
    }

    #[test]
    fn test_build_twin_slab() {
        let cell = build_fcc_slab("Cu", 3.6355, 1, 1, TWIN_SEQUENCE).unwrap();

        assert_eq!(cell.header(), TWIN_SEQUENCE);
        assert_eq!(cell.elements(), &["Cu".to_string()]);
        assert_eq!(cell.element_counts(), vec![28]);
        assert_eq!(cell.scale(), 3.6355);
        assert!((cell.lattice_vectors()[2][2] - 14.0 * 3f64.sqrt() / 3.0).abs() < 1e-12);
        assert!(cell.selective_dynamics());
        assert!(cell
            .iter_sites()
            .all(|s| s.mobility == Mobility::new(false, false, true)));

        // 第 1 层为 B 层
        let b_site = cell.site(0, 2).unwrap();
        assert!((b_site.position[1] - 1.0 / 3.0).abs() < 1e-12);
        assert!((b_site.position[2] - 1.0 / 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_supercell_site_count() {
        let cell = build_fcc_slab("Al", 4.05, 2, 3, "ABC").unwrap();
        assert_eq!(cell.total_atoms(), 3 * 2 * 2 * 3);
    }

    #[test]
    fn test_layer_info() {
        let mut cell = build_fcc_slab("Cu", 3.6355, 1, 1, TWIN_SEQUENCE).unwrap();
        let info = wrap_and_index_layers(&mut cell).unwrap();
        assert_eq!(info.z_levels.len(), 14);
        assert_eq!(info.ny, 1);
    }

    #[test]
    fn test_wrap_z_above_one() {
        let mut cell = build_fcc_slab("Cu", 3.6355, 1, 1, "ABCABC").unwrap();
        let [x, y, _] = cell.site(0, 0).unwrap().position;
        cell.move_site(0, 0, [x, y, 1.0]).unwrap();
        wrap_and_index_layers(&mut cell).unwrap();
        assert_eq!(cell.site(0, 0).unwrap().position[2], 0.0);
    }

    #[test]
    fn test_shift_moves_only_selected_layers() {
        let mut base = build_fcc_slab("Cu", 3.6355, 1, 1, TWIN_SEQUENCE).unwrap();
        let info = wrap_and_index_layers(&mut base).unwrap();

        let mut shifted = base.clone();
        shift_layers(&mut shifted, 0..7, 1.0, &info).unwrap();

        // 第 0 层 (A) 平移 1/3
        let moved = shifted.site(0, 0).unwrap().position;
        assert!((moved[1] - 1.0 / 3.0).abs() < 1e-12);
        // 第 7 层不动
        let untouched = shifted.site(0, 14).unwrap().position;
        assert_eq!(untouched, base.site(0, 14).unwrap().position);
    }

    #[test]
    fn test_generalized_stacking_fault_pathways() {
        let mut base = build_fcc_slab("Cu", 3.6355, 1, 1, TWIN_SEQUENCE).unwrap();
        let info = wrap_and_index_layers(&mut base).unwrap();
        let displacements = linspace(0.0, 1.0, 5);

        let isf = generalized_stacking_fault(&base, &info, &displacements, false).unwrap();
        assert_eq!(isf.len(), 5);

        let full = generalized_stacking_fault(&base, &info, &displacements, true).unwrap();
        assert_eq!(full.len(), 9);
        assert_eq!(full[5].displacement, 1.25);
        assert_eq!(full[8].displacement, 2.0);

        // ESF 阶段从 d = 1 的结构出发：第 0 层保持 1/3 的位移
        let layer0 = full[8].cell.site(0, 0).unwrap().position;
        assert!((layer0[1] - 1.0 / 3.0).abs() < 1e-12);
        // 第 1 层累计位移 2/3
        let layer1 = full[8].cell.site(0, 2).unwrap().position;
        let original = base.site(0, 2).unwrap().position;
        assert!((layer1[1] - original[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_fault_file_name() {
        assert_eq!(fault_file_name("POSCAR", 0.0), "POSCAR_000000");
        assert_eq!(fault_file_name("POSCAR", 0.5), "POSCAR_050000");
        assert_eq!(fault_file_name("POSCAR", 1.25), "POSCAR_125000");
    }
}

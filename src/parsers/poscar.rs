//! # VASP POSCAR 格式解析器
//!
//! 读写 VASP 5 风格的 POSCAR/CONTCAR 文件。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1 [T T F]       # atom positions
//! ...
//! ```
//!
//! 每行 6 个字段时视为带可动性标记，与文件头是否有 Selective dynamics 无关。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 和 `commands/` 使用
//! - 使用 `models/cell.rs`

use crate::error::{CellforgeError, Result};
use crate::models::{Cell, CoordinateSystem, Mobility, Site};
use std::fs;
use std::path::Path;

/// 读取 POSCAR/CONTCAR 文件
pub fn read_poscar_file(path: &Path) -> Result<Cell> {
    let content = fs::read_to_string(path).map_err(|e| CellforgeError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_poscar_content(&content, &path.display().to_string())
}

/// 将 Cell 写入 POSCAR 文件
pub fn write_poscar_file(cell: &Cell, path: &Path) -> Result<()> {
    fs::write(path, to_poscar_string(cell)).map_err(|e| CellforgeError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 从字符串内容解析 POSCAR 格式
///
/// `source` 仅用于错误信息。
pub fn parse_poscar_content(content: &str, source: &str) -> Result<Cell> {
    let fail = |reason: String| CellforgeError::parse("poscar", source, reason);
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 8 {
        return Err(fail(format!(
            "File too short ({} lines, need at least 8)",
            lines.len()
        )));
    }

    let mut cell = Cell::new();

    // Line 0: Comment
    cell.set_header(lines[0].trim());

    // Line 1: Scaling factor
    let scale: f64 = lines[1]
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| fail(format!("Invalid scaling factor '{}'", lines[1].trim())))?;
    cell.set_scale(scale).map_err(|e| fail(e.to_string()))?;

    // Lines 2-4: Lattice vectors
    let mut matrix = [[0.0; 3]; 3];
    for (i, row) in matrix.iter_mut().enumerate() {
        *row = parse_triple(lines[2 + i])
            .ok_or_else(|| fail(format!("Invalid lattice vector at line {}", 3 + i)))?;
    }
    cell.set_lattice_matrix(matrix);

    // Line 5: Element symbols
    let elements: Vec<String> = lines[5].split_whitespace().map(str::to_string).collect();
    match elements.first() {
        None => return Err(fail("Missing element symbols at line 6".to_string())),
        Some(first) if first.parse::<f64>().is_ok() => {
            return Err(fail(
                "Element symbols missing at line 6 (VASP 4 format is not supported)".to_string(),
            ))
        }
        _ => {}
    }

    // Line 6: Atom counts
    let counts = lines[6]
        .split_whitespace()
        .map(|s| s.parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| fail(format!("Invalid atom counts '{}'", lines[6].trim())))?;

    if counts.len() != elements.len() {
        return Err(fail(format!(
            "{} element symbols but {} atom counts",
            elements.len(),
            counts.len()
        )));
    }
    if let Some(i) = counts.iter().position(|&n| n == 0) {
        return Err(fail(format!("Element '{}' has zero atoms", elements[i])));
    }

    // Line 7: Optional selective dynamics
    let header_selective = lines[7].trim_start().starts_with(['S', 's']);
    let coord_line = if header_selective { 8 } else { 7 };

    let coord_token = lines
        .get(coord_line)
        .map(|l| l.trim())
        .ok_or_else(|| fail("Missing coordinate type line".to_string()))?;
    if CoordinateSystem::from_token(coord_token).is_none() {
        return Err(fail(format!(
            "Invalid coordinate system '{}' at line {}",
            coord_token,
            coord_line + 1
        )));
    }
    cell.set_coordinate_system(coord_token)
        .map_err(|e| fail(e.to_string()))?;

    // Atom positions
    let expected: usize = counts.iter().sum();
    let mut sites: Vec<Vec<Site>> = Vec::with_capacity(counts.len());
    let mut line_idx = coord_line + 1;
    let mut index = 0;

    for &count in &counts {
        let mut group = Vec::with_capacity(count);
        for _ in 0..count {
            let line = lines.get(line_idx).ok_or_else(|| {
                fail(format!(
                    "Expected {} atom lines, found {}",
                    expected, index
                ))
            })?;
            group.push(parse_site_line(line, index).ok_or_else(|| {
                fail(format!("Invalid atom position at line {}", line_idx + 1))
            })?);
            index += 1;
            line_idx += 1;
        }
        sites.push(group);
    }

    let constrained = sites.iter().flatten().any(|s| !s.mobility.is_free());
    cell.replace_state(elements, sites, header_selective || constrained);

    Ok(cell)
}

/// 解析一行中的前三个浮点数
fn parse_triple(line: &str) -> Option<[f64; 3]> {
    let mut parts = line.split_whitespace().map(|s| s.parse::<f64>());
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    let z = parts.next()?.ok()?;
    Some([x, y, z])
}

/// 解析原子行，6 个字段时后三个为可动性标记 ('T' 为可动)
fn parse_site_line(line: &str, index: usize) -> Option<Site> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return None;
    }
    let position = parse_triple(line)?;

    let site = Site::new(position, index);
    if tokens.len() == 6 {
        let free = |t: &str| t == "T";
        Some(site.with_mobility(Mobility::new(
            free(tokens[3]),
            free(tokens[4]),
            free(tokens[5]),
        )))
    } else {
        Some(site)
    }
}

/// 将 Cell 转换为 POSCAR 格式字符串
pub fn to_poscar_string(cell: &Cell) -> String {
    let mut result = String::new();

    result.push_str(&format!("{}\n", cell.header()));
    result.push_str(&format!("{:.6}\n", cell.scale()));

    for row in cell.lattice_vectors() {
        result.push_str(&format!("{:.6} {:.6} {:.6}\n", row[0], row[1], row[2]));
    }

    for el in cell.elements() {
        result.push_str(&format!(" {}", el));
    }
    result.push('\n');
    for count in cell.element_counts() {
        result.push_str(&format!(" {}", count));
    }
    result.push('\n');

    if cell.selective_dynamics() {
        result.push_str("Selective Dynamics\n");
    }
    result.push_str(&format!("{}\n", cell.coordinate_label().trim()));

    for site in cell.iter_sites() {
        let p = site.position;
        result.push_str(&format!("{:.10} {:.10} {:.10}", p[0], p[1], p[2]));
        if cell.selective_dynamics() {
            result.push(' ');
            result.push_str(&site.mobility.to_flags());
        }
        result.push('\n');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const NACL: &str = r#"NaCl
1.0
5.64 0.0 0.0
0.0 5.64 0.0
0.0 0.0 5.64
Na Cl
4 4
Direct
0.0 0.0 0.0
0.5 0.5 0.0
0.5 0.0 0.5
0.0 0.5 0.5
0.5 0.0 0.0
0.0 0.5 0.0
0.0 0.0 0.5
0.5 0.5 0.5
"#;

    #[test]
    fn test_parse_poscar_vasp5() {
        let cell = parse_poscar_content(NACL, "NaCl").unwrap();
        assert_eq!(cell.header(), "NaCl");
        assert_eq!(cell.elements(), &["Na".to_string(), "Cl".to_string()]);
        assert_eq!(cell.element_counts(), vec![4, 4]);
        assert_eq!(cell.coordinate_system(), CoordinateSystem::Direct);
        assert!(!cell.selective_dynamics());

        // 按文件顺序连续编号
        let indices: Vec<usize> = cell.iter_sites().map(|s| s.index).collect();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
        assert_eq!(cell.site(1, 3).unwrap().position, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_parse_poscar_selective_dynamics() {
        let content = r#"Fe with selective
2.87
1.0 0.0 0.0
0.0 1.0 0.0
0.0 0.0 1.0
Fe
2
Selective dynamics
Cartesian
0.0 0.0 0.0 T T T
1.435 1.435 1.435 F F T
"#;
        let cell = parse_poscar_content(content, "Fe").unwrap();
        assert!(cell.selective_dynamics());
        assert_eq!(cell.coordinate_system(), CoordinateSystem::Cartesian);
        assert_eq!(cell.coordinate_label(), "Cartesian");
        assert!(cell.site(0, 0).unwrap().mobility.is_free());
        assert_eq!(
            cell.site(0, 1).unwrap().mobility,
            Mobility::new(false, false, true)
        );
    }

    #[test]
    fn test_six_token_lines_without_header() {
        let content = "Cu\n1.0\n1 0 0\n0 1 0\n0 0 1\nCu\n2\nDirect\n0 0 0 F F T\n0.5 0.5 0.5\n";
        let cell = parse_poscar_content(content, "Cu").unwrap();
        assert_eq!(
            cell.site(0, 0).unwrap().mobility,
            Mobility::new(false, false, true)
        );
        assert!(cell.site(0, 1).unwrap().mobility.is_free());
        assert!(cell.selective_dynamics());
    }

    #[test]
    fn test_truncated_file_is_rejected() {
        let truncated: String = NACL.lines().take(13).collect::<Vec<_>>().join("\n");
        let err = parse_poscar_content(&truncated, "NaCl").unwrap_err();
        match err {
            CellforgeError::ParseError { reason, .. } => {
                assert!(reason.contains("Expected 8 atom lines"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_lattice_and_coordinates_rejected() {
        let bad_lattice = NACL.replacen("0.0 5.64 0.0", "0.0 5.64", 1);
        assert!(parse_poscar_content(&bad_lattice, "x").is_err());

        let bad_coord = NACL.replacen("Direct", "Reciprocal", 1);
        assert!(parse_poscar_content(&bad_coord, "x").is_err());

        let vasp4 = NACL.replacen("Na Cl\n", "", 1);
        assert!(parse_poscar_content(&vasp4, "x").is_err());

        let bad_count = NACL.replacen("4 4", "4 x", 1);
        assert!(parse_poscar_content(&bad_count, "x").is_err());
    }

    #[test]
    fn test_to_poscar_string_layout() {
        let mut cell = parse_poscar_content(NACL, "NaCl").unwrap();
        cell.set_site_mobilities(false, false, true);
        let text = to_poscar_string(&cell);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[1], "1.000000");
        assert_eq!(lines[2], "5.640000 0.000000 0.000000");
        assert_eq!(lines[5], " Na Cl");
        assert_eq!(lines[6], " 4 4");
        assert_eq!(lines[7], "Selective Dynamics");
        assert_eq!(lines[8], "Direct");
        assert!(lines[9].ends_with("F F T"));
        assert_eq!(lines.len(), 17);
    }

    #[test]
    fn test_poscar_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("POSCAR");

        let mut cell = Cell::new();
        cell.set_header("TiO2 test");
        cell.set_scale(4.594).unwrap();
        cell.set_lattice_vectors(&[
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.644],
        ])
        .unwrap();
        cell.set_coordinate_system("Direct").unwrap();
        cell.set_elements(vec!["Ti".into(), "O".into()]);
        cell.add_site(0, Site::new([0.0, 0.0, 0.0], 0)).unwrap();
        cell.add_site(0, Site::new([0.5, 0.5, 0.5], 1)).unwrap();
        cell.add_site(1, Site::new([0.3053, 0.3053, 0.0], 2))
            .unwrap();
        cell.add_site(
            1,
            Site::new([0.6947, 0.6947, 0.0], 3).with_mobility(Mobility::new(true, false, true)),
        )
        .unwrap();

        write_poscar_file(&cell, &path).unwrap();
        let loaded = read_poscar_file(&path).unwrap();

        assert_eq!(loaded.header(), cell.header());
        assert!((loaded.scale() - cell.scale()).abs() < 1e-6);
        for (a, b) in loaded.lattice_vectors().iter().zip(cell.lattice_vectors()) {
            for k in 0..3 {
                assert!((a[k] - b[k]).abs() < 1e-6);
            }
        }
        assert_eq!(loaded.elements(), cell.elements());
        assert_eq!(loaded.element_counts(), cell.element_counts());
        assert_eq!(loaded.coordinate_system(), cell.coordinate_system());
        assert_eq!(loaded.selective_dynamics(), cell.selective_dynamics());
        for (a, b) in loaded.iter_sites().zip(cell.iter_sites()) {
            for k in 0..3 {
                assert!((a.position[k] - b.position[k]).abs() < 1e-6);
            }
            assert_eq!(a.mobility, b.mobility);
        }
    }

    #[test]
    fn test_replaced_constrained_sites_survive_reload() {
        let mut cell = parse_poscar_content(NACL, "NaCl").unwrap();
        cell.set_elements(vec!["Cu".to_string()]);
        cell.set_coordinate_system(" Direct ").unwrap();
        cell.replace_all_sites(vec![vec![
            Site::new([0.0, 0.0, 0.0], 0).with_mobility(Mobility::new(false, false, true)),
            Site::new([0.5, 0.5, 0.5], 1),
        ]])
        .unwrap();

        let text = to_poscar_string(&cell);
        assert!(text.contains("Selective Dynamics\nDirect\n"));

        let reloaded = parse_poscar_content(&text, "Cu").unwrap();
        assert!(reloaded.selective_dynamics());
        assert_eq!(
            reloaded.site(0, 0).unwrap().mobility,
            Mobility::new(false, false, true)
        );
        assert!(reloaded.site(0, 1).unwrap().mobility.is_free());
    }

    #[test]
    fn test_missing_file() {
        let err = read_poscar_file(Path::new("/nonexistent/POSCAR")).unwrap_err();
        assert!(matches!(err, CellforgeError::FileReadError { .. }));
    }
}

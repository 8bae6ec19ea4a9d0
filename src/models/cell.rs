//! # 模拟晶胞数据模型
//!
//! `Cell` 保存一个 VASP 模拟晶胞：缩放因子、晶格向量、坐标系，
//! 以及按元素分组的原子位点 (`Site`)。
//!
//! ## 不变量
//! - 晶格向量始终为 3x3
//! - `sites` 的第 i 组对应 `elements[i]`，组内原子数即 `element_counts()[i]`
//! - 不存在空组：删除某组最后一个位点时整组（及其元素标签）一并移除
//!
//! ## 依赖关系
//! - 被 `parsers/poscar.rs`, `parsers/sqs.rs`, `builders/` 使用
//! - 使用 `error.rs`

use crate::error::{CellforgeError, Result};

/// 单个位点在 x/y/z 三个方向上是否允许弛豫
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mobility {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl Mobility {
    pub const FREE: Mobility = Mobility {
        x: true,
        y: true,
        z: true,
    };

    pub fn new(x: bool, y: bool, z: bool) -> Self {
        Mobility { x, y, z }
    }

    /// 三个方向均可移动
    pub fn is_free(&self) -> bool {
        self.x && self.y && self.z
    }

    /// POSCAR 选择性动力学标记 ("T T F")
    pub fn to_flags(&self) -> String {
        let flag = |free: bool| if free { "T" } else { "F" };
        format!("{} {} {}", flag(self.x), flag(self.y), flag(self.z))
    }
}

impl Default for Mobility {
    fn default() -> Self {
        Mobility::FREE
    }
}

/// 原子位点
///
/// 相等性只比较 `index` 和 `position`，不包含 `mobility`。
#[derive(Debug, Clone)]
pub struct Site {
    /// 坐标（分数或笛卡尔，取决于所属 Cell 的坐标系）
    pub position: [f64; 3],

    /// 载入时按文件顺序分配的编号，编辑时不重新编号
    pub index: usize,

    pub mobility: Mobility,
}

impl Site {
    pub fn new(position: [f64; 3], index: usize) -> Self {
        Site {
            position,
            index,
            mobility: Mobility::FREE,
        }
    }

    pub fn with_mobility(mut self, mobility: Mobility) -> Self {
        self.mobility = mobility;
        self
    }

    /// 整体替换坐标
    pub fn move_to(&mut self, position: [f64; 3]) {
        self.position = position;
    }
}

impl PartialEq for Site {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.position == other.position
    }
}

/// 坐标系
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    Cartesian,
    Direct,
}

impl CoordinateSystem {
    /// 按首字母识别 ('C'/'c' 笛卡尔, 'D'/'d' 分数)
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim_start().chars().next() {
            Some('C') | Some('c') => Some(CoordinateSystem::Cartesian),
            Some('D') | Some('d') => Some(CoordinateSystem::Direct),
            _ => None,
        }
    }
}

impl std::fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateSystem::Cartesian => write!(f, "Cartesian"),
            CoordinateSystem::Direct => write!(f, "Direct"),
        }
    }
}

/// VASP 模拟晶胞
#[derive(Debug, Clone)]
pub struct Cell {
    header: String,
    scale: f64,
    lattice_vectors: [[f64; 3]; 3],
    coordinate_system: CoordinateSystem,
    /// 用户给定的原始坐标系字符串，写文件时原样输出
    coordinate_label: String,
    elements: Vec<String>,
    sites: Vec<Vec<Site>>,
    selective_dynamics: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            header: String::new(),
            scale: 1.0,
            lattice_vectors: [[0.0; 3]; 3],
            coordinate_system: CoordinateSystem::Direct,
            coordinate_label: "Direct".to_string(),
            elements: Vec::new(),
            sites: Vec::new(),
            selective_dynamics: false,
        }
    }
}

impl Cell {
    pub fn new() -> Self {
        Cell::default()
    }

    // ─────────────────────────────────────────────────────────────
    // 访问器
    // ─────────────────────────────────────────────────────────────

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn lattice_vectors(&self) -> &[[f64; 3]; 3] {
        &self.lattice_vectors
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    pub fn coordinate_label(&self) -> &str {
        &self.coordinate_label
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn sites(&self) -> &[Vec<Site>] {
        &self.sites
    }

    pub fn selective_dynamics(&self) -> bool {
        self.selective_dynamics
    }

    /// 每组原子数（由组长度导出）
    pub fn element_counts(&self) -> Vec<usize> {
        self.sites.iter().map(Vec::len).collect()
    }

    pub fn number_of_element_groups(&self) -> usize {
        self.sites.len()
    }

    pub fn atom_count_in_group(&self, group: usize) -> Result<usize> {
        self.group(group).map(|g| g.len())
    }

    pub fn total_atoms(&self) -> usize {
        self.sites.iter().map(Vec::len).sum()
    }

    /// 按组顺序遍历所有位点
    pub fn iter_sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.iter().flatten()
    }

    // ─────────────────────────────────────────────────────────────
    // 修改器
    // ─────────────────────────────────────────────────────────────

    pub fn set_header(&mut self, header: impl Into<String>) {
        self.header = header.into();
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<()> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CellforgeError::InvalidScale(scale));
        }
        self.scale = scale;
        Ok(())
    }

    /// 设置坐标系，保留原始字符串
    pub fn set_coordinate_system(&mut self, token: &str) -> Result<()> {
        let system = CoordinateSystem::from_token(token)
            .ok_or_else(|| CellforgeError::InvalidCoordinateSystem(token.to_string()))?;
        self.coordinate_system = system;
        self.coordinate_label = token.to_string();
        Ok(())
    }

    /// 设置晶格向量，必须恰好 3 个长度为 3 的向量
    pub fn set_lattice_vectors(&mut self, vectors: &[Vec<f64>]) -> Result<()> {
        if vectors.len() != 3 {
            return Err(CellforgeError::InvalidLatticeVectors(format!(
                "expected 3 vectors, got {}",
                vectors.len()
            )));
        }

        let mut matrix = [[0.0; 3]; 3];
        for (row, v) in matrix.iter_mut().zip(vectors) {
            if v.len() != 3 {
                return Err(CellforgeError::InvalidLatticeVectors(format!(
                    "expected 3 components per vector, got {}",
                    v.len()
                )));
            }
            row.copy_from_slice(v);
        }

        self.lattice_vectors = matrix;
        Ok(())
    }

    pub fn set_lattice_matrix(&mut self, matrix: [[f64; 3]; 3]) {
        self.lattice_vectors = matrix;
    }

    /// 替换元素标签，与 `sites` 的一致性由调用方负责
    pub fn set_elements(&mut self, elements: Vec<String>) {
        self.elements = elements;
    }

    /// 为所有位点设置同一组可动性
    pub fn set_site_mobilities(&mut self, x_free: bool, y_free: bool, z_free: bool) {
        let mobility = Mobility::new(x_free, y_free, z_free);
        for site in self.sites.iter_mut().flatten() {
            site.mobility = mobility;
        }
        self.selective_dynamics = !mobility.is_free();
    }

    /// 向第 `group` 组追加位点
    ///
    /// `group == 组数` 时新建一组；组内已存在相等位点时静默忽略。
    pub fn add_site(&mut self, group: usize, site: Site) -> Result<()> {
        let len = self.sites.len();
        if group > len {
            return Err(CellforgeError::IndexOutOfRange {
                what: "element group",
                index: group,
                len,
            });
        }
        if group == len {
            self.sites.push(Vec::new());
        }

        let members = &mut self.sites[group];
        if members.iter().any(|s| *s == site) {
            return Ok(());
        }

        if !site.mobility.is_free() {
            self.selective_dynamics = true;
        }
        members.push(site);
        Ok(())
    }

    pub fn move_site(&mut self, group: usize, nth: usize, position: [f64; 3]) -> Result<()> {
        self.site_mut(group, nth)?.move_to(position);
        Ok(())
    }

    /// 删除位点；组变空时整组连同元素标签一起移除，后续组下标前移
    pub fn remove_site(&mut self, group: usize, nth: usize) -> Result<Site> {
        let members = self.group_mut(group)?;
        let len = members.len();
        if nth >= len {
            return Err(CellforgeError::IndexOutOfRange {
                what: "site",
                index: nth,
                len,
            });
        }

        let removed = members.remove(nth);
        if members.is_empty() {
            self.sites.remove(group);
            if group < self.elements.len() {
                self.elements.remove(group);
            }
        }
        Ok(removed)
    }

    /// 整体替换位点列表
    pub fn replace_all_sites(&mut self, sites: Vec<Vec<Site>>) -> Result<()> {
        if let Some(i) = sites.iter().position(Vec::is_empty) {
            return Err(CellforgeError::InvalidSiteList(format!(
                "element group {} is empty",
                i
            )));
        }
        self.sites = sites;
        self.selective_dynamics =
            self.selective_dynamics || self.iter_sites().any(|s| !s.mobility.is_free());
        Ok(())
    }

    pub fn site(&self, group: usize, nth: usize) -> Result<&Site> {
        let members = self.group(group)?;
        members.get(nth).ok_or(CellforgeError::IndexOutOfRange {
            what: "site",
            index: nth,
            len: members.len(),
        })
    }

    fn site_mut(&mut self, group: usize, nth: usize) -> Result<&mut Site> {
        let members = self.group_mut(group)?;
        let len = members.len();
        members.get_mut(nth).ok_or(CellforgeError::IndexOutOfRange {
            what: "site",
            index: nth,
            len,
        })
    }

    /// 载入器一次性写入全部状态
    pub(crate) fn replace_state(
        &mut self,
        elements: Vec<String>,
        sites: Vec<Vec<Site>>,
        selective_dynamics: bool,
    ) {
        self.elements = elements;
        self.sites = sites;
        self.selective_dynamics = selective_dynamics;
    }

    fn group(&self, group: usize) -> Result<&Vec<Site>> {
        let len = self.sites.len();
        self.sites.get(group).ok_or(CellforgeError::IndexOutOfRange {
            what: "element group",
            index: group,
            len,
        })
    }

    fn group_mut(&mut self, group: usize) -> Result<&mut Vec<Site>> {
        let len = self.sites.len();
        self.sites
            .get_mut(group)
            .ok_or(CellforgeError::IndexOutOfRange {
                what: "element group",
                index: group,
                len,
            })
    }
}

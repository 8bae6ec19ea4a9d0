//! # VASP 计算结果数据模型
//!
//! 存储从单个 OUTCAR 中提取的逐离子步序列。
//!
//! ## 依赖关系
//! - 被 `parsers/outcar.rs` 使用
//! - 被 `commands/analyze.rs` 使用

use serde::Serialize;

/// 单个计算目录的提取结果
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// 计算目录名
    pub name: String,

    /// 每个离子步的 energy(sigma->0) (eV)
    pub energies: Vec<f64>,

    /// 每个离子步的体积 (Å³)
    pub volumes: Vec<f64>,

    /// 每个离子步的晶格常数 |a|, |b|, |c| (Å)
    pub lattice_lengths: Vec<[f64; 3]>,

    /// 外压 (kB)
    pub pressures: Vec<f64>,

    /// Pulay 应力 (kB)
    pub pulay_stresses: Vec<f64>,

    /// 不可约 k 点数
    pub irreducible_kpoints: Option<usize>,

    /// 总 CPU 时间 (s)
    pub cpu_time: Option<f64>,
}

impl RunSummary {
    pub fn new(name: impl Into<String>) -> Self {
        RunSummary {
            name: name.into(),
            ..Default::default()
        }
    }

    /// 离子步数
    pub fn ionic_steps(&self) -> usize {
        self.energies.len()
    }

    /// 各序列的最后一个值
    pub fn final_values(&self) -> FinalValues {
        FinalValues {
            name: self.name.clone(),
            energy: self.energies.last().copied(),
            volume: self.volumes.last().copied(),
            lattice_lengths: self.lattice_lengths.last().copied(),
            pressure: self.pressures.last().copied(),
            pulay_stress: self.pulay_stresses.last().copied(),
            irreducible_kpoints: self.irreducible_kpoints,
            cpu_time: self.cpu_time,
        }
    }
}

/// 单次计算的最终值
#[derive(Debug, Clone, PartialEq)]
pub struct FinalValues {
    pub name: String,
    pub energy: Option<f64>,
    pub volume: Option<f64>,
    pub lattice_lengths: Option<[f64; 3]>,
    pub pressure: Option<f64>,
    pub pulay_stress: Option<f64>,
    pub irreducible_kpoints: Option<usize>,
    pub cpu_time: Option<f64>,
}

/// CSV 输出行
#[derive(Debug, Serialize)]
pub struct FinalValuesRecord {
    pub name: String,
    pub energy_ev: Option<f64>,
    pub volume: Option<f64>,
    pub a: Option<f64>,
    pub b: Option<f64>,
    pub c: Option<f64>,
    pub pressure_kb: Option<f64>,
    pub pulay_stress_kb: Option<f64>,
    pub irreducible_kpoints: Option<usize>,
    pub time_s: Option<f64>,
}

impl From<&FinalValues> for FinalValuesRecord {
    fn from(v: &FinalValues) -> Self {
        FinalValuesRecord {
            name: v.name.clone(),
            energy_ev: v.energy,
            volume: v.volume,
            a: v.lattice_lengths.map(|l| l[0]),
            b: v.lattice_lengths.map(|l| l[1]),
            c: v.lattice_lengths.map(|l| l[2]),
            pressure_kb: v.pressure,
            pulay_stress_kb: v.pulay_stress,
            irreducible_kpoints: v.irreducible_kpoints,
            time_s: v.cpu_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_values_take_last_entry() {
        let mut run = RunSummary::new("Cu_3.60000");
        run.energies = vec![-3.0, -3.5, -3.7];
        run.volumes = vec![11.0, 11.5];
        run.lattice_lengths = vec![[2.55, 2.55, 2.55]];
        run.irreducible_kpoints = Some(120);

        let fin = run.final_values();
        assert_eq!(run.ionic_steps(), 3);
        assert_eq!(fin.energy, Some(-3.7));
        assert_eq!(fin.volume, Some(11.5));
        assert_eq!(fin.lattice_lengths, Some([2.55, 2.55, 2.55]));
        assert_eq!(fin.pressure, None);
        assert_eq!(fin.irreducible_kpoints, Some(120));
    }

    #[test]
    fn test_record_splits_lattice_lengths() {
        let mut run = RunSummary::new("a");
        run.lattice_lengths = vec![[1.0, 2.0, 3.0]];
        let record = FinalValuesRecord::from(&run.final_values());
        assert_eq!(record.a, Some(1.0));
        assert_eq!(record.c, Some(3.0));
        assert_eq!(record.energy_ev, None);
    }
}

//! # Birch-Murnaghan 状态方程
//!
//! ```text
//! E(V) = E0 + 9·V0·B0/16 · { [(V0/V)^(2/3) - 1]^3 · B'
//!                          + [(V0/V)^(2/3) - 1]^2 · [6 - 4·(V0/V)^(2/3)] }
//! ```
//!
//! ## 依赖关系
//! - 被 `eos/mod.rs` 导出
//! - 使用 `nalgebra` 的定长矩阵

use crate::error::{CellforgeError, Result};
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

/// eV/Å³ -> GPa
pub const EV_PER_A3_TO_GPA: f64 = 160.2177;

const MAX_ITERATIONS: usize = 200;
const MAX_DAMPING_TRIES: usize = 30;

/// Birch-Murnaghan 参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirchParams {
    /// 平衡能量 (eV)
    pub e0: f64,
    /// 体弹模量 (eV/Å³)
    pub b0: f64,
    /// 体弹模量对压力的导数
    pub bp: f64,
    /// 平衡体积 (Å³)
    pub v0: f64,
}

impl BirchParams {
    fn from_vector(p: &Vector4<f64>) -> Self {
        BirchParams {
            e0: p[0],
            b0: p[1],
            bp: p[2],
            v0: p[3],
        }
    }

    fn to_vector(self) -> Vector4<f64> {
        Vector4::new(self.e0, self.b0, self.bp, self.v0)
    }

    /// 给定体积的能量
    pub fn energy(&self, volume: f64) -> f64 {
        let x = (self.v0 / volume).powf(2.0 / 3.0);
        let t = x - 1.0;
        self.e0 + 9.0 * self.v0 * self.b0 / 16.0 * (t.powi(3) * self.bp + t.powi(2) * (6.0 - 4.0 * x))
    }

    /// 对 (E0, B0, B', V0) 的解析偏导
    fn gradient(&self, volume: f64) -> Vector4<f64> {
        let x = (self.v0 / volume).powf(2.0 / 3.0);
        let t = x - 1.0;
        let u = 6.0 - 4.0 * x;
        let g = t.powi(3) * self.bp + t.powi(2) * u;
        let dg_dx = 3.0 * t.powi(2) * self.bp + 2.0 * t * u - 4.0 * t.powi(2);
        let k = 9.0 * self.b0 / 16.0;

        Vector4::new(
            1.0,
            9.0 * self.v0 / 16.0 * g,
            k * self.v0 * t.powi(3),
            k * (g + 2.0 / 3.0 * x * dg_dx),
        )
    }

    /// 平衡体积的立方根（立方晶胞的晶格常数）
    pub fn cube_root_volume(&self) -> f64 {
        self.v0.cbrt()
    }

    pub fn bulk_modulus_gpa(&self) -> f64 {
        self.b0 * EV_PER_A3_TO_GPA
    }
}

/// 二次多项式最小二乘 `y = a·x² + b·x + c`
pub fn fit_parabola(xs: &[f64], ys: &[f64]) -> Result<(f64, f64, f64)> {
    let mut ata = Matrix3::zeros();
    let mut aty = Vector3::zeros();
    for (&x, &y) in xs.iter().zip(ys) {
        let row = Vector3::new(x * x, x, 1.0);
        ata += row * row.transpose();
        aty += row * y;
    }

    let coeffs = ata
        .lu()
        .solve(&aty)
        .ok_or_else(|| CellforgeError::FitError("degenerate volumes for parabola".to_string()))?;
    Ok((coeffs[0], coeffs[1], coeffs[2]))
}

/// 由抛物线顶点估计初值，B' 取 4
pub fn initial_guess(volumes: &[f64], energies: &[f64]) -> Result<BirchParams> {
    let (a, b, c) = fit_parabola(volumes, energies)?;
    let v0 = -b / (2.0 * a);
    let e0 = a * v0 * v0 + b * v0 + c;

    Ok(BirchParams {
        e0,
        b0: 2.0 * a * v0,
        bp: 4.0,
        v0,
    })
}

fn sum_squared_residuals(params: &BirchParams, volumes: &[f64], energies: &[f64]) -> f64 {
    volumes
        .iter()
        .zip(energies)
        .map(|(&v, &e)| (e - params.energy(v)).powi(2))
        .sum()
}

/// Levenberg-Marquardt 拟合
pub fn fit_birch_murnaghan(volumes: &[f64], energies: &[f64]) -> Result<BirchParams> {
    if volumes.len() != energies.len() {
        return Err(CellforgeError::FitError(format!(
            "{} volumes but {} energies",
            volumes.len(),
            energies.len()
        )));
    }
    if volumes.len() < 4 {
        return Err(CellforgeError::FitError(format!(
            "need at least 4 points, got {}",
            volumes.len()
        )));
    }
    if volumes.iter().any(|&v| v.is_nan() || v <= 0.0) {
        return Err(CellforgeError::FitError(
            "volumes must be positive".to_string(),
        ));
    }

    let mut params = initial_guess(volumes, energies)?;
    if !params.to_vector().iter().all(|v| v.is_finite()) {
        return Err(CellforgeError::FitError(
            "no parabolic minimum in the data".to_string(),
        ));
    }

    let mut sse = sum_squared_residuals(&params, volumes, energies);
    let mut lambda = 1e-3;

    for _ in 0..MAX_ITERATIONS {
        let mut jtj = Matrix4::zeros();
        let mut jtr = Vector4::zeros();
        for (&v, &e) in volumes.iter().zip(energies) {
            let g = params.gradient(v);
            jtj += g * g.transpose();
            jtr += g * (e - params.energy(v));
        }

        let mut step = None;
        for _ in 0..MAX_DAMPING_TRIES {
            let mut damped = jtj;
            for k in 0..4 {
                damped[(k, k)] *= 1.0 + lambda;
            }

            if let Some(delta) = damped.lu().solve(&jtr) {
                let trial = BirchParams::from_vector(&(params.to_vector() + delta));
                let trial_sse = sum_squared_residuals(&trial, volumes, energies);
                if trial_sse.is_finite() && trial_sse <= sse {
                    step = Some((trial, trial_sse, delta.norm()));
                    lambda = (lambda / 10.0).max(1e-12);
                    break;
                }
            }
            lambda *= 10.0;
        }

        let Some((trial, trial_sse, step_norm)) = step else {
            break;
        };

        let converged = step_norm <= 1e-12 * (params.to_vector().norm() + 1e-12)
            || (sse - trial_sse) <= 1e-20 * sse.max(1e-300);
        params = trial;
        sse = trial_sse;
        if converged {
            break;
        }
    }

    if !params.to_vector().iter().all(|v| v.is_finite()) {
        return Err(CellforgeError::FitError("fit diverged".to_string()));
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> BirchParams {
        BirchParams {
            e0: -10.0,
            b0: 0.6,
            bp: 4.5,
            v0: 40.0,
        }
    }

    #[test]
    fn test_energy_minimum_at_v0() {
        let p = reference();
        assert!((p.energy(40.0) - (-10.0)).abs() < 1e-12);
        assert!(p.energy(38.0) > p.energy(40.0));
        assert!(p.energy(42.0) > p.energy(40.0));
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let p = reference();
        let v = 37.5;
        let g = p.gradient(v);
        let base = p.to_vector();
        for k in 0..4 {
            let h = 1e-6;
            let mut up = base;
            let mut down = base;
            up[k] += h;
            down[k] -= h;
            let numeric = (BirchParams::from_vector(&up).energy(v)
                - BirchParams::from_vector(&down).energy(v))
                / (2.0 * h);
            assert!((numeric - g[k]).abs() < 1e-5, "component {k}");
        }
    }

    #[test]
    fn test_fit_parabola_exact() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x * x - 3.0 * x + 1.0).collect();
        let (a, b, c) = fit_parabola(&xs, &ys).unwrap();
        assert!((a - 2.0).abs() < 1e-9);
        assert!((b + 3.0).abs() < 1e-9);
        assert!((c - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_recovers_synthetic_parameters() {
        let p = reference();
        let volumes: Vec<f64> = (0..9).map(|i| 35.0 + 1.25 * i as f64).collect();
        let energies: Vec<f64> = volumes.iter().map(|&v| p.energy(v)).collect();

        let fit = fit_birch_murnaghan(&volumes, &energies).unwrap();
        assert!((fit.e0 - p.e0).abs() < 1e-6);
        assert!((fit.v0 - p.v0).abs() < 1e-4);
        assert!((fit.b0 - p.b0).abs() < 1e-4);
        assert!((fit.bp - p.bp).abs() < 1e-2);
        assert!((fit.bulk_modulus_gpa() - 0.6 * EV_PER_A3_TO_GPA).abs() < 0.05);
        assert!((fit.cube_root_volume() - 40f64.cbrt()).abs() < 1e-5);
    }

    #[test]
    fn test_fit_needs_four_points() {
        let err = fit_birch_murnaghan(&[10.0, 11.0, 12.0], &[-1.0, -1.2, -1.1]).unwrap_err();
        assert!(matches!(err, CellforgeError::FitError(_)));
    }
}

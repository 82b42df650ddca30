// Polynomial least-squares fitting, differentiation and root finding
use super::error::TrajectoryError;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Leading terms whose size over the fitted span is this small relative to the largest
/// term are treated as zero before root finding.
const NEGLIGIBLE_LEADING_TERM: f64 = 1e-12;

/// Relative size below which an R diagonal entry marks a dependent Vandermonde column.
const RANK_TOLERANCE: f64 = 1e-10;

const ROOT_MAX_ITERATIONS: usize = 500;
const ROOT_CONVERGENCE: f64 = 1e-14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittingConfig {
    pub polynomial_degree: usize,
}

impl FittingConfig {
    pub fn new(polynomial_degree: usize) -> Self {
        Self { polynomial_degree }
    }

    /// Accepts the signed degree that arrives over the wire.
    pub fn from_degree(polynomial_degree: i64) -> Result<Self, TrajectoryError> {
        usize::try_from(polynomial_degree)
            .map(Self::new)
            .map_err(|_| TrajectoryError::NegativeDegree(polynomial_degree))
    }

    pub fn required_points(&self) -> usize {
        self.polynomial_degree + 1
    }
}

/// Polynomial with coefficients stored highest degree first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

/// The least-squares system had fewer independent columns than the requested degree needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankDeficient;

impl Polynomial {
    /// Empty input is the zero polynomial.
    pub fn new(coefficients: Vec<f64>) -> Self {
        if coefficients.is_empty() {
            return Self::zero();
        }
        Self { coefficients }
    }

    pub fn zero() -> Self {
        Self {
            coefficients: vec![0.0],
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Horner evaluation.
    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients.iter().fold(0.0, |acc, &c| acc * x + c)
    }

    pub fn derivative(&self) -> Polynomial {
        let degree = self.degree();
        if degree == 0 {
            return Self::zero();
        }
        let coefficients = self.coefficients[..degree]
            .iter()
            .enumerate()
            .map(|(i, &c)| (degree - i) as f64 * c)
            .collect();
        Self { coefficients }
    }

    /// Least-squares fit of degree exactly `degree` through `(xs[i], ys[i])`.
    ///
    /// Householder QR on the Vandermonde matrix with every column scaled to unit norm.
    /// Callers must supply at least `degree + 1` points.
    pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> Result<Polynomial, RankDeficient> {
        debug_assert_eq!(xs.len(), ys.len());
        let rows = xs.len();
        let cols = degree + 1;
        if rows < cols {
            return Err(RankDeficient);
        }

        let mut a: Vec<Vec<f64>> = xs
            .iter()
            .map(|&x| (0..cols).map(|j| x.powi((degree - j) as i32)).collect())
            .collect();
        let mut b = ys.to_vec();

        let scales: Vec<f64> = (0..cols)
            .map(|j| {
                let norm = a.iter().map(|row| row[j] * row[j]).sum::<f64>().sqrt();
                if norm > 0.0 { norm } else { 1.0 }
            })
            .collect();
        for row in a.iter_mut() {
            for (value, scale) in row.iter_mut().zip(&scales) {
                *value /= scale;
            }
        }

        let mut diagonal = vec![0.0; cols];
        for k in 0..cols {
            let sigma = (k..rows).map(|i| a[i][k] * a[i][k]).sum::<f64>().sqrt();
            if sigma == 0.0 {
                continue;
            }
            let alpha = if a[k][k] > 0.0 { -sigma } else { sigma };

            let mut v: Vec<f64> = (k..rows).map(|i| a[i][k]).collect();
            v[0] -= alpha;
            let v_norm_sq: f64 = v.iter().map(|vi| vi * vi).sum();
            if v_norm_sq == 0.0 {
                diagonal[k] = alpha;
                continue;
            }

            for j in k..cols {
                let dot: f64 = v.iter().zip(k..rows).map(|(vi, i)| vi * a[i][j]).sum();
                let factor = 2.0 * dot / v_norm_sq;
                for (vi, i) in v.iter().zip(k..rows) {
                    a[i][j] -= factor * vi;
                }
            }
            let dot: f64 = v.iter().zip(k..rows).map(|(vi, i)| vi * b[i]).sum();
            let factor = 2.0 * dot / v_norm_sq;
            for (vi, i) in v.iter().zip(k..rows) {
                b[i] -= factor * vi;
            }

            diagonal[k] = alpha;
        }

        let largest = diagonal.iter().fold(0.0_f64, |m, d| m.max(d.abs()));
        let tolerance = largest * RANK_TOLERANCE;
        if largest == 0.0 || diagonal.iter().any(|d| d.abs() <= tolerance) {
            return Err(RankDeficient);
        }

        let mut solution = vec![0.0; cols];
        for k in (0..cols).rev() {
            let tail: f64 = (k + 1..cols).map(|j| a[k][j] * solution[j]).sum();
            solution[k] = (b[k] - tail) / diagonal[k];
        }
        let coefficients = solution
            .iter()
            .zip(&scales)
            .map(|(c, scale)| c / scale)
            .collect();

        Ok(Polynomial { coefficients })
    }

    /// All complex roots of `self(x) - constant = 0`.
    ///
    /// `span` is the time scale the polynomial was fitted over. Roots are solved in
    /// `s = x / span`, so a term is judged by `|a_k| * span^k` rather than by its raw
    /// coefficient. A non-positive or non-finite span falls back to 1.
    pub fn roots_minus(&self, constant: f64, span: f64) -> Vec<Complex64> {
        let span = if span.is_finite() && span > 0.0 { span } else { 1.0 };
        let degree = self.degree();

        let mut scaled: Vec<f64> = self
            .coefficients
            .iter()
            .enumerate()
            .map(|(i, &c)| c * span.powi((degree - i) as i32))
            .collect();
        if let Some(last) = scaled.last_mut() {
            *last -= constant;
        }

        let largest = scaled.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        if largest == 0.0 {
            return Vec::new();
        }
        let first = scaled
            .iter()
            .position(|c| c.abs() > largest * NEGLIGIBLE_LEADING_TERM)
            .unwrap_or(scaled.len() - 1);

        polynomial_roots(&scaled[first..])
            .into_iter()
            .map(|root| root * span)
            .collect()
    }
}

/// Roots of a polynomial whose leading coefficient is non-zero.
fn polynomial_roots(coefficients: &[f64]) -> Vec<Complex64> {
    match coefficients {
        [] | [_] => Vec::new(),
        [a, b] => vec![Complex64::new(-b / a, 0.0)],
        [a, b, c] => quadratic_roots(*a, *b, *c),
        _ => durand_kerner(coefficients),
    }
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<Complex64> {
    let discriminant = b * b - 4.0 * a * c;
    if discriminant >= 0.0 {
        // Citardauq form: no cancellation when b^2 >> 4ac.
        let q = -0.5 * (b + b.signum() * discriminant.sqrt());
        if q == 0.0 {
            return vec![Complex64::new(0.0, 0.0); 2];
        }
        vec![Complex64::new(q / a, 0.0), Complex64::new(c / q, 0.0)]
    } else {
        let re = -b / (2.0 * a);
        let im = (-discriminant).sqrt() / (2.0 * a).abs();
        vec![Complex64::new(re, im), Complex64::new(re, -im)]
    }
}

/// Weierstrass (Durand-Kerner) simultaneous iteration on the monic polynomial.
fn durand_kerner(coefficients: &[f64]) -> Vec<Complex64> {
    let lead = coefficients[0];
    let monic: Vec<f64> = coefficients.iter().map(|c| c / lead).collect();
    let n = monic.len() - 1;

    // Cauchy bound on root magnitude.
    let radius = 1.0 + monic[1..].iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    let mut roots: Vec<Complex64> = (0..n)
        .map(|k| {
            let angle = std::f64::consts::TAU * k as f64 / n as f64 + 0.4;
            Complex64::from_polar(radius, angle)
        })
        .collect();

    let eval = |z: Complex64| {
        monic
            .iter()
            .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z + c)
    };

    for _ in 0..ROOT_MAX_ITERATIONS {
        let mut largest_step = 0.0_f64;
        for i in 0..n {
            let zi = roots[i];
            let denominator = roots
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .fold(Complex64::new(1.0, 0.0), |acc, (_, zj)| acc * (zi - zj));
            if denominator.norm() == 0.0 {
                continue;
            }
            let step = eval(zi) / denominator;
            roots[i] = zi - step;
            largest_step = largest_step.max(step.norm() / (1.0 + roots[i].norm()));
        }
        if largest_step < ROOT_CONVERGENCE {
            break;
        }
    }

    roots
}

//! Real roots of a cubic polynomial.
//!
//! `w3·x³ + w2·x² + w1·x + w0 = 0` with `w3 ≠ 0`, reduced to the depressed
//! form with
//!
//! ```text
//! q = (3·w3·w1 − w2²) / (9·w3²)
//! r = (9·w3·w2·w1 − 27·w3²·w0 − 2·w2³) / (54·w3³)
//! d = q³ + r²
//! ```
//!
//! `d ≥ 0` has one real root (Cardano, plus a double root when `d = 0`);
//! `d < 0` has three, found with the trigonometric method.

use std::f64::consts::PI;

use tracing::warn;

/// Up to three real roots, ascending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roots {
    values: [f64; 3],
    len: usize,
}

impl Roots {
    fn from_slice(roots: &[f64]) -> Self {
        let mut values = [f64::NAN; 3];
        values[..roots.len()].copy_from_slice(roots);
        values[..roots.len()].sort_by(f64::total_cmp);
        Self {
            values,
            len: roots.len(),
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Root strictly inside `(lo, hi)`. When rounding lets a root that
    /// belongs on an endpoint slip inside, the one farthest from both
    /// endpoints wins.
    pub fn strictly_between(&self, lo: f64, hi: f64) -> Option<f64> {
        self.as_slice()
            .iter()
            .copied()
            .filter(|&x| lo < x && x < hi)
            .max_by(|a, b| (a - lo).min(hi - a).total_cmp(&(b - lo).min(hi - b)))
    }
}

/// Real roots of `w3·x³ + w2·x² + w1·x + w0`.
pub fn solve_cubic(w3: f64, w2: f64, w1: f64, w0: f64) -> Roots {
    let q = (3.0 * w3 * w1 - w2 * w2) / (9.0 * w3 * w3);
    let r = (9.0 * w3 * w2 * w1 - 27.0 * w3 * w3 * w0 - 2.0 * w2 * w2 * w2)
        / (54.0 * w3 * w3 * w3);
    let d = q * q * q + r * r;
    let shift = -w2 / (3.0 * w3);

    if d >= 0.0 {
        let sqrt_d = d.sqrt();
        let s = (r + sqrt_d).cbrt();
        let t = (r - sqrt_d).cbrt();
        let single = s + t + shift;
        return if d == 0.0 && s + t != 0.0 {
            Roots::from_slice(&[single, -(s + t) / 2.0 + shift])
        } else {
            Roots::from_slice(&[single])
        };
    }

    let mut cos_theta = r / (-q * q * q).sqrt();
    if !(-1.0..=1.0).contains(&cos_theta) {
        warn!(cos_theta, "clamping cubic cos theta into [-1, 1]");
        cos_theta = cos_theta.clamp(-1.0, 1.0);
    }
    let theta = cos_theta.acos();
    let scale = 2.0 * (-q).sqrt();
    let root = |k: f64| scale * ((theta + 2.0 * PI * k) / 3.0).cos() + shift;
    Roots::from_slice(&[root(0.0), root(1.0), root(2.0)])
}

/// Coefficients of the equilibrium cubic of the aversion/centroid force.
///
/// The force on a leaf at `x` between neighbors `left` and `right`, pulled
/// towards `centroid`, is
/// `aversion·(1/(x − left) − 1/(right − x)) + (1 − aversion)·(centroid − x)`;
/// multiplying out the denominators gives a cubic in `x`.
pub fn force_cubic(left: f64, right: f64, centroid: f64, aversion: f64) -> [f64; 4] {
    let pull = 1.0 - aversion;
    let w3 = pull;
    let w2 = -pull * (centroid + left + right);
    let w1 = pull * (centroid * (left + right) + left * right) - 2.0 * aversion;
    let w0 = aversion * (left + right) - pull * centroid * left * right;
    [w3, w2, w1, w0]
}

/// Equilibrium position strictly between `left` and `right`, if the
/// cubic has a root there.
pub fn equilibrium(left: f64, right: f64, centroid: f64, aversion: f64) -> Option<f64> {
    let [w3, w2, w1, w0] = force_cubic(left, right, centroid, aversion);
    solve_cubic(w3, w2, w1, w0).strictly_between(left, right)
}

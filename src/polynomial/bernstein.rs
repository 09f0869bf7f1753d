//! Bernstein polynomials on [0, 1].
//!
//! B_i^p(t) = C(p, i) t^i (1 - t)^(p - i), i = 0..=p
//!
//! The basis is non-negative and forms a partition of unity. Its control
//! points sit at the Greville abscissae i / p, and it reproduces linear
//! functions from values at those points.

/// Evaluate all Bernstein polynomials of degree `p` at `t`.
///
/// Uses the triangular recurrence
/// B_i^r = (1 - t) B_i^(r-1) + t B_(i-1)^(r-1).
pub fn bernstein(p: usize, t: f64) -> Vec<f64> {
    let mut b = vec![0.0; p + 1];
    b[0] = 1.0;
    let s = 1.0 - t;
    for r in 1..=p {
        let mut prev = 0.0;
        for i in 0..=r {
            let cur = b[i];
            b[i] = s * cur + t * prev;
            prev = cur;
        }
    }
    b
}

/// Evaluate Bernstein polynomials of degree `p` and their derivatives.
///
/// d/dt B_i^p = p (B_(i-1)^(p-1) - B_i^(p-1))
pub fn bernstein_with_derivative(p: usize, t: f64) -> (Vec<f64>, Vec<f64>) {
    let values = bernstein(p, t);
    let mut derivs = vec![0.0; p + 1];
    if p == 0 {
        return (values, derivs);
    }

    let lower = bernstein(p - 1, t);
    let pf = p as f64;
    for i in 0..=p {
        let left = if i > 0 { lower[i - 1] } else { 0.0 };
        let right = if i < p { lower[i] } else { 0.0 };
        derivs[i] = pf * (left - right);
    }
    (values, derivs)
}

/// Greville abscissae i / p; degree 0 uses the midpoint.
pub fn greville_points(p: usize) -> Vec<f64> {
    if p == 0 {
        return vec![0.5];
    }
    (0..=p).map(|i| i as f64 / p as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binomial(n: usize, k: usize) -> f64 {
        (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
    }

    #[test]
    fn test_partition_of_unity() {
        for p in 0..=5 {
            for &t in &[0.0, 0.13, 0.5, 0.77, 1.0] {
                let sum: f64 = bernstein(p, t).iter().sum();
                assert!((sum - 1.0).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_closed_form() {
        let t: f64 = 0.3;
        for p in 0..=4 {
            let b = bernstein(p, t);
            for i in 0..=p {
                let expected = binomial(p, i) * t.powi(i as i32) * (1.0 - t).powi((p - i) as i32);
                assert!((b[i] - expected).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_endpoint_interpolation() {
        let p = 3;
        let b0 = bernstein(p, 0.0);
        let b1 = bernstein(p, 1.0);
        assert!((b0[0] - 1.0).abs() < 1e-14);
        assert!((b1[p] - 1.0).abs() < 1e-14);
        for i in 1..=p {
            assert!(b0[i].abs() < 1e-14);
        }
    }

    #[test]
    fn test_linear_precision() {
        // Σ_i (i/p) B_i^p(t) = t
        for p in 1..=5 {
            let g = greville_points(p);
            for &t in &[0.1, 0.4, 0.9] {
                let b = bernstein(p, t);
                let x: f64 = g.iter().zip(b.iter()).map(|(gi, bi)| gi * bi).sum();
                assert!((x - t).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_derivative_by_finite_difference() {
        let h = 1e-6;
        for p in 1..=4 {
            let t = 0.37;
            let (_, d) = bernstein_with_derivative(p, t);
            let plus = bernstein(p, t + h);
            let minus = bernstein(p, t - h);
            for i in 0..=p {
                let fd = (plus[i] - minus[i]) / (2.0 * h);
                assert!((d[i] - fd).abs() < 1e-8);
            }
            // Derivatives of a partition of unity sum to zero
            assert!(d.iter().sum::<f64>().abs() < 1e-12);
        }
    }
}

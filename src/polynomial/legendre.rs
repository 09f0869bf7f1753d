//! Legendre polynomial evaluation on [-1, 1].
//!
//! Only used to locate Gauss-Legendre nodes; the discrete spaces themselves
//! are built from Bernstein polynomials.

/// Evaluate P_n(x) and P'_n(x) with the three-term recurrence.
///
/// ```text
/// P_0 = 1, P_1 = x
/// (k+1) P_{k+1} = (2k+1) x P_k - k P_{k-1}
/// P'_n = n (x P_n - P_{n-1}) / (x² - 1)
/// ```
///
/// At x = ±1 the closed-form endpoint derivatives are used.
pub fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }

    let mut p_prev = 1.0;
    let mut p_curr = x;
    for k in 1..n {
        let p_next = ((2 * k + 1) as f64 * x * p_curr - k as f64 * p_prev) / (k + 1) as f64;
        p_prev = p_curr;
        p_curr = p_next;
    }

    let end_slope = (n * (n + 1)) as f64 / 2.0;
    let dp = if (x - 1.0).abs() < 1e-14 {
        end_slope
    } else if (x + 1.0).abs() < 1e-14 {
        if n % 2 == 0 { -end_slope } else { end_slope }
    } else {
        n as f64 * (x * p_curr - p_prev) / (x * x - 1.0)
    };

    (p_curr, dp)
}

/// Evaluate P_n(x).
pub fn legendre(n: usize, x: f64) -> f64 {
    legendre_and_derivative(n, x).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legendre_values() {
        let x: f64 = 0.5;
        assert!((legendre(0, x) - 1.0).abs() < 1e-14);
        assert!((legendre(1, x) - x).abs() < 1e-14);
        assert!((legendre(2, x) - (3.0 * x * x - 1.0) / 2.0).abs() < 1e-14);
        assert!((legendre(3, x) - (5.0 * x.powi(3) - 3.0 * x) / 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_derivative_matches_closed_form() {
        let x = 0.3;
        let (_, dp2) = legendre_and_derivative(2, x);
        assert!((dp2 - 3.0 * x).abs() < 1e-14);
        let (_, dp3) = legendre_and_derivative(3, x);
        assert!((dp3 - (15.0 * x * x - 3.0) / 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_endpoint_derivatives() {
        for n in 1..=5 {
            let expected = (n * (n + 1)) as f64 / 2.0;
            assert!((legendre_and_derivative(n, 1.0).1 - expected).abs() < 1e-12);
            let sign = if n % 2 == 0 { -1.0 } else { 1.0 };
            assert!((legendre_and_derivative(n, -1.0).1 - sign * expected).abs() < 1e-12);
        }
    }
}

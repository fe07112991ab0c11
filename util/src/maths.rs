//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Apply polynomial coefficients to a value
///
/// The order of the coefficients is highest power first, i.e. if there are 3
/// coefficients it's a 2nd order polynomial with c[0]*x^2 + c[1]*x + c[2].
pub fn poly_val<T>(value: &T, coeffs: &Vec<T>) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::AddAssign
{
    let mut res = T::from(0).unwrap();

    for i in 0..(coeffs.len() as i32) {
        res += value.powi(coeffs.len() as i32 - 1 - i) * coeffs[i as usize];
    }

    res
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_poly_val() {
        // Quadratic throttle map used by the controller, -0.45x^2 + 0.45
        let coeffs = vec![-0.45f64, 0.0, 0.45];

        assert!((poly_val(&0.0f64, &coeffs) - 0.45).abs() < 1e-12);
        assert!((poly_val(&1.0f64, &coeffs) - 0.0).abs() < 1e-12);
        assert!((poly_val(&-1.0f64, &coeffs) - 0.0).abs() < 1e-12);
        assert!((poly_val(&0.5f64, &coeffs) - 0.3375).abs() < 1e-12);
    }
}

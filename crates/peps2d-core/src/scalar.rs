//! Scalar types the engine is generic over.

use nalgebra::ComplexField;
use num_complex::Complex64;
use rand::Rng;

/// Element type of tensor data.
///
/// Implemented for `f64` and `Complex64`. The `ComplexField` bound supplies
/// conjugation, modulus and the field operations needed by the dense QR/SVD
/// kernels; `RealField = f64` pins both scalar types to double precision.
pub trait TnScalar:
    ComplexField<RealField = f64>
    + num_traits::Zero
    + num_traits::One
    + Copy
    + Default
    + Send
    + Sync
    + 'static
{
    /// Lift a real number into this scalar type.
    fn from_f64(x: f64) -> Self {
        Self::from_real(x)
    }

    /// Squared modulus as a plain `f64`.
    fn abs_sq(self) -> f64 {
        self.modulus_squared()
    }

    /// Draw a sample uniformly from `[-1, 1)` (per real component).
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl TnScalar for f64 {
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.gen::<f64>() * 2.0 - 1.0
    }
}

impl TnScalar for Complex64 {
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Complex64::new(rng.gen::<f64>() * 2.0 - 1.0, rng.gen::<f64>() * 2.0 - 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_f64_roundtrip() {
        assert_eq!(<f64 as TnScalar>::from_f64(2.5), 2.5);
        assert_eq!(<Complex64 as TnScalar>::from_f64(2.5), Complex64::new(2.5, 0.0));
    }

    #[test]
    fn abs_sq_complex() {
        let z = Complex64::new(3.0, 4.0);
        assert_eq!(z.abs_sq(), 25.0);
    }
}

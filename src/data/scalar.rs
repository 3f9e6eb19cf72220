use num::complex::Complex;
use num_traits::Zero;
use rand::Rng;
use rand_distr::StandardNormal;
use std::fmt::{Debug, Display};
use std::ops::{Add, Sub};

/// A value a Gaussian component can be defined over.
///
/// Anything that can be subtracted, scaled by a real weight, and reduced to
/// a real squared magnitude will do. Real values use `|x|^2 = x^2`; complex
/// (in-phase/quadrature) values use the squared modulus, which makes the
/// Gaussian circularly symmetric.
pub trait Scalar:
    Copy
    + Debug
    + Display
    + PartialEq
    + Zero
    + Add<Output = Self>
    + Sub<Output = Self>
{
    /// Multiply by a real weight
    fn scale(self, w: f64) -> Self;

    /// Squared magnitude, `|x|^2`
    fn norm_sq(self) -> f64;

    /// `true` if every part of the value is finite
    fn is_finite(self) -> bool;

    /// Draw from a Gaussian centered at `self` with `E|x - self|^2 ==
    /// variance`.
    fn draw_around<R: Rng>(self, variance: f64, rng: &mut R) -> Self;
}

macro_rules! impl_real_scalar {
    ($kind:ty) => {
        impl Scalar for $kind {
            #[inline]
            fn scale(self, w: f64) -> Self {
                (f64::from(self) * w) as $kind
            }

            #[inline]
            fn norm_sq(self) -> f64 {
                let x = f64::from(self);
                x * x
            }

            #[inline]
            fn is_finite(self) -> bool {
                <$kind>::is_finite(self)
            }

            fn draw_around<R: Rng>(self, variance: f64, rng: &mut R) -> Self {
                let z: f64 = rng.sample(StandardNormal);
                variance.sqrt().mul_add(z, f64::from(self)) as $kind
            }
        }
    };
}

macro_rules! impl_complex_scalar {
    ($kind:ty) => {
        impl Scalar for Complex<$kind> {
            #[inline]
            fn scale(self, w: f64) -> Self {
                Complex::new(
                    (f64::from(self.re) * w) as $kind,
                    (f64::from(self.im) * w) as $kind,
                )
            }

            #[inline]
            fn norm_sq(self) -> f64 {
                let re = f64::from(self.re);
                let im = f64::from(self.im);
                re.mul_add(re, im * im)
            }

            #[inline]
            fn is_finite(self) -> bool {
                self.re.is_finite() && self.im.is_finite()
            }

            // Each axis carries half the variance
            fn draw_around<R: Rng>(self, variance: f64, rng: &mut R) -> Self {
                let s = (0.5 * variance).sqrt();
                let z_re: f64 = rng.sample(StandardNormal);
                let z_im: f64 = rng.sample(StandardNormal);
                Complex::new(
                    s.mul_add(z_re, f64::from(self.re)) as $kind,
                    s.mul_add(z_im, f64::from(self.im)) as $kind,
                )
            }
        }
    };
}

impl_real_scalar!(f32);
impl_real_scalar!(f64);
impl_complex_scalar!(f32);
impl_complex_scalar!(f64);

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    const TOL: f64 = 1E-12;

    #[test]
    fn real_norm_sq_is_square() {
        assert::close(Scalar::norm_sq(-3.0_f64), 9.0, TOL);
        assert::close(Scalar::norm_sq(0.5_f32), 0.25, TOL);
    }

    #[test]
    fn complex_norm_sq_is_squared_modulus() {
        let z = Complex::new(3.0_f64, -4.0);
        assert::close(Scalar::norm_sq(z), 25.0, TOL);
    }

    #[test]
    fn scale_real_and_complex() {
        assert::close(Scalar::scale(1.5_f64, 2.0), 3.0, TOL);
        let z = Scalar::scale(Complex::new(1.0_f64, -2.0), 0.5);
        assert::close(z.re, 0.5, TOL);
        assert::close(z.im, -1.0, TOL);
    }

    #[test]
    fn finiteness() {
        assert!(Scalar::is_finite(1.0_f64));
        assert!(!Scalar::is_finite(f64::NAN));
        assert!(!Scalar::is_finite(f32::INFINITY));
        assert!(Scalar::is_finite(Complex::new(1.0_f32, 2.0)));
        assert!(!Scalar::is_finite(Complex::new(1.0_f64, f64::NAN)));
        assert!(!Scalar::is_finite(Complex::new(f64::NEG_INFINITY, 0.0)));
    }

    #[test]
    fn complex_draws_have_requested_spread() {
        let mut rng = Xoshiro256Plus::seed_from_u64(0x1234);
        let center = Complex::new(1.0_f64, -1.0);
        let n = 100_000;
        let mean_sq = (0..n)
            .map(|_| (center.draw_around(2.0, &mut rng) - center).norm_sq())
            .sum::<f64>()
            / n as f64;
        assert::close(mean_sq, 2.0, 0.05);
    }

    #[test]
    fn real_draws_have_requested_spread() {
        let mut rng = Xoshiro256Plus::seed_from_u64(0x4321);
        let n = 100_000;
        let mean_sq = (0..n)
            .map(|_| Scalar::norm_sq(3.0_f64.draw_around(0.25, &mut rng) - 3.0))
            .sum::<f64>()
            / n as f64;
        assert::close(mean_sq, 0.25, 0.01);
    }
}

//! A single weighted Gaussian over real or complex values
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use rand::Rng;
use std::fmt;

use crate::consts::{FRAC_1_SQRT_2PI, HALF_LN_2PI};
use crate::data::Scalar;
use crate::traits::{HasDensity, Sampleable};

/// One weighted Gaussian density, `α N(x | μ, σ²)`.
///
/// The mean lives in the value domain `T`; the variance and mixing weight
/// `alpha` are always real. For complex `T` the density depends only on the
/// modulus `|x - μ|`, so the component is circularly symmetric.
///
/// # Examples
///
/// ```
/// use gaussmix::prelude::*;
///
/// let cpnt = GaussianComponent::new(0.0_f64, 1.0, 0.5).unwrap();
///
/// // alpha is folded into the density
/// let f = cpnt.density(&0.0);
/// assert!((f - 0.5 / (2.0 * std::f64::consts::PI).sqrt()).abs() < 1E-12);
/// ```
///
/// Complex (in-phase/quadrature) values work the same way
///
/// ```
/// use gaussmix::prelude::*;
/// use num::complex::Complex64;
///
/// let cpnt = GaussianComponent::with_mean(Complex64::new(1.0, 1.0)).unwrap();
///
/// // equidistant points have equal density
/// let f1 = cpnt.density(&Complex64::new(2.0, 1.0));
/// let f2 = cpnt.density(&Complex64::new(1.0, 0.0));
/// assert!((f1 - f2).abs() < 1E-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct GaussianComponent<T> {
    /// Mean
    mean: T,
    /// Variance
    variance: f64,
    /// Mixing weight
    alpha: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum GaussianComponentError {
    /// The mean has an infinite or NaN part
    MeanNotFinite,
    /// The variance parameter is less than or equal to zero
    VarianceTooLow { variance: f64 },
    /// The variance parameter is infinite or NaN
    VarianceNotFinite { variance: f64 },
    /// The alpha parameter is less than zero
    AlphaTooLow { alpha: f64 },
    /// The alpha parameter is infinite or NaN
    AlphaNotFinite { alpha: f64 },
}

#[inline]
fn validate_variance(variance: f64) -> Result<(), GaussianComponentError> {
    if variance <= 0.0 {
        Err(GaussianComponentError::VarianceTooLow { variance })
    } else if !variance.is_finite() {
        Err(GaussianComponentError::VarianceNotFinite { variance })
    } else {
        Ok(())
    }
}

#[inline]
fn validate_alpha(alpha: f64) -> Result<(), GaussianComponentError> {
    if alpha < 0.0 {
        Err(GaussianComponentError::AlphaTooLow { alpha })
    } else if !alpha.is_finite() {
        Err(GaussianComponentError::AlphaNotFinite { alpha })
    } else {
        Ok(())
    }
}

impl<T: Scalar> GaussianComponent<T> {
    /// Create a new weighted Gaussian
    ///
    /// # Arguments
    /// - mean: mean
    /// - variance: variance (not the standard deviation)
    /// - alpha: mixing weight
    pub fn new(
        mean: T,
        variance: f64,
        alpha: f64,
    ) -> Result<Self, GaussianComponentError> {
        if !mean.is_finite() {
            return Err(GaussianComponentError::MeanNotFinite);
        }
        validate_variance(variance)?;
        validate_alpha(alpha)?;
        Ok(Self::new_unchecked(mean, variance, alpha))
    }

    /// Creates a new component without checking whether the parameters are
    /// valid.
    #[inline]
    #[must_use]
    pub fn new_unchecked(mean: T, variance: f64, alpha: f64) -> Self {
        GaussianComponent {
            mean,
            variance,
            alpha,
        }
    }

    /// Unit variance, unit weight component centered at `mean`
    ///
    /// # Example
    ///
    /// ```rust
    /// # use gaussmix::dist::GaussianComponent;
    /// let cpnt = GaussianComponent::with_mean(2.5_f64).unwrap();
    ///
    /// assert_eq!(cpnt.variance(), 1.0);
    /// assert_eq!(cpnt.alpha(), 1.0);
    /// ```
    pub fn with_mean(mean: T) -> Result<Self, GaussianComponentError> {
        Self::new(mean, 1.0, 1.0)
    }

    /// Zero mean, unit variance, unit weight
    #[inline]
    #[must_use]
    pub fn standard() -> Self {
        Self::new_unchecked(T::zero(), 1.0, 1.0)
    }

    /// Get the mean
    #[inline]
    pub fn mean(&self) -> T {
        self.mean
    }

    /// Set the mean
    ///
    /// # Example
    ///
    /// ```rust
    /// # use gaussmix::dist::GaussianComponent;
    /// let mut cpnt = GaussianComponent::<f64>::standard();
    ///
    /// assert!(cpnt.set_mean(1.3).is_ok());
    /// assert_eq!(cpnt.mean(), 1.3);
    ///
    /// assert!(cpnt.set_mean(f64::NAN).is_err());
    /// assert_eq!(cpnt.mean(), 1.3);
    /// ```
    #[inline]
    pub fn set_mean(&mut self, mean: T) -> Result<(), GaussianComponentError> {
        if mean.is_finite() {
            self.set_mean_unchecked(mean);
            Ok(())
        } else {
            Err(GaussianComponentError::MeanNotFinite)
        }
    }

    /// Set the mean without input validation
    #[inline]
    pub fn set_mean_unchecked(&mut self, mean: T) {
        self.mean = mean;
    }

    /// Get the variance
    #[inline]
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Set the variance
    ///
    /// # Example
    ///
    /// ```rust
    /// # use gaussmix::dist::GaussianComponent;
    /// let mut cpnt = GaussianComponent::<f64>::standard();
    ///
    /// assert!(cpnt.set_variance(2.3).is_ok());
    /// assert!(cpnt.set_variance(0.0).is_err());
    /// assert!(cpnt.set_variance(-1.0).is_err());
    /// assert!(cpnt.set_variance(f64::INFINITY).is_err());
    /// assert!(cpnt.set_variance(f64::NAN).is_err());
    ///
    /// assert_eq!(cpnt.variance(), 2.3);
    /// ```
    #[inline]
    pub fn set_variance(
        &mut self,
        variance: f64,
    ) -> Result<(), GaussianComponentError> {
        validate_variance(variance)?;
        self.set_variance_unchecked(variance);
        Ok(())
    }

    /// Set the variance without input validation
    #[inline]
    pub fn set_variance_unchecked(&mut self, variance: f64) {
        self.variance = variance;
    }

    /// Standard deviation, `sqrt(variance)`
    #[inline]
    pub fn sigma(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Get the mixing weight
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Set the mixing weight
    ///
    /// A zero weight is allowed; negative or non-finite weights are not.
    #[inline]
    pub fn set_alpha(
        &mut self,
        alpha: f64,
    ) -> Result<(), GaussianComponentError> {
        validate_alpha(alpha)?;
        self.set_alpha_unchecked(alpha);
        Ok(())
    }

    /// Set the mixing weight without input validation
    #[inline]
    pub fn set_alpha_unchecked(&mut self, alpha: f64) {
        self.alpha = alpha;
    }
}

impl<T: Scalar> Default for GaussianComponent<T> {
    fn default() -> Self {
        GaussianComponent::standard()
    }
}

impl<T: Scalar> HasDensity<T> for GaussianComponent<T> {
    fn ln_density(&self, x: &T) -> f64 {
        let dx2 = (*x - self.mean).norm_sq();
        self.alpha.ln()
            - 0.5 * (dx2 / self.variance + self.variance.ln())
            - HALF_LN_2PI
    }

    fn density(&self, x: &T) -> f64 {
        let dx2 = (*x - self.mean).norm_sq();
        self.alpha * (-0.5 * dx2 / self.variance).exp() * FRAC_1_SQRT_2PI
            / self.variance.sqrt()
    }
}

/// Draws ignore `alpha`
impl<T: Scalar> Sampleable<T> for GaussianComponent<T> {
    fn draw<R: Rng>(&self, rng: &mut R) -> T {
        self.mean.draw_around(self.variance, rng)
    }
}

impl<T: Scalar> fmt::Display for GaussianComponent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "G(μ: {}, σ²: {}, α: {})",
            self.mean, self.variance, self.alpha
        )
    }
}

impl std::error::Error for GaussianComponentError {}

impl fmt::Display for GaussianComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MeanNotFinite => write!(f, "non-finite mean"),
            Self::VarianceTooLow { variance } => {
                write!(f, "variance ({variance}) must be greater than zero")
            }
            Self::VarianceNotFinite { variance } => {
                write!(f, "non-finite variance: {variance}")
            }
            Self::AlphaTooLow { alpha } => {
                write!(f, "alpha ({alpha}) must not be negative")
            }
            Self::AlphaNotFinite { alpha } => {
                write!(f, "non-finite alpha: {alpha}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::complex::Complex64;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    const TOL: f64 = 1E-12;

    use crate::test_basic_impls;
    test_basic_impls!(GaussianComponent::new(1.5_f64, 2.0, 0.3).unwrap());

    #[test]
    fn new() {
        let cpnt = GaussianComponent::new(1.2_f64, 3.0, 0.25).unwrap();
        assert::close(cpnt.mean(), 1.2, TOL);
        assert::close(cpnt.variance(), 3.0, TOL);
        assert::close(cpnt.alpha(), 0.25, TOL);
    }

    #[test]
    fn new_rejects_invalid_parameters() {
        assert_eq!(
            GaussianComponent::new(f64::NAN, 1.0, 1.0),
            Err(GaussianComponentError::MeanNotFinite)
        );
        assert_eq!(
            GaussianComponent::new(0.0_f64, 0.0, 1.0),
            Err(GaussianComponentError::VarianceTooLow { variance: 0.0 })
        );
        assert_eq!(
            GaussianComponent::new(0.0_f64, f64::INFINITY, 1.0),
            Err(GaussianComponentError::VarianceNotFinite {
                variance: f64::INFINITY
            })
        );
        assert_eq!(
            GaussianComponent::new(0.0_f64, 1.0, -0.1),
            Err(GaussianComponentError::AlphaTooLow { alpha: -0.1 })
        );
        assert!(matches!(
            GaussianComponent::new(0.0_f64, 1.0, f64::NAN),
            Err(GaussianComponentError::AlphaNotFinite { .. })
        ));
        assert_eq!(
            GaussianComponent::new(Complex64::new(0.0, f64::NAN), 1.0, 1.0),
            Err(GaussianComponentError::MeanNotFinite)
        );
    }

    #[test]
    fn zero_alpha_is_valid() {
        assert!(GaussianComponent::new(0.0_f64, 1.0, 0.0).is_ok());
    }

    #[test]
    fn standard_and_default_agree() {
        let cpnt = GaussianComponent::<f64>::standard();
        assert_eq!(cpnt, GaussianComponent::default());
        assert::close(cpnt.mean(), 0.0, TOL);
        assert::close(cpnt.variance(), 1.0, TOL);
        assert::close(cpnt.alpha(), 1.0, TOL);
    }

    #[test]
    fn standard_density_at_zero() {
        let cpnt = GaussianComponent::<f64>::standard();
        assert::close(cpnt.density(&0.0), FRAC_1_SQRT_2PI, TOL);
        assert::close(cpnt.ln_density(&0.0), -HALF_LN_2PI, TOL);
    }

    #[test]
    fn density_off_mean() {
        let cpnt = GaussianComponent::new(-1.2_f64, 0.33 * 0.33, 1.0).unwrap();
        assert::close(cpnt.ln_density(&0.0), -6.421_846_156_616_945, TOL);
        assert::close(
            cpnt.density(&0.0),
            (-6.421_846_156_616_945_f64).exp(),
            TOL,
        );
    }

    #[test]
    fn alpha_scales_density() {
        let full = GaussianComponent::new(0.3_f64, 2.0, 1.0).unwrap();
        let part = GaussianComponent::new(0.3_f64, 2.0, 0.25).unwrap();
        for x in [-2.0, 0.0, 0.3, 1.7] {
            assert::close(part.density(&x), 0.25 * full.density(&x), TOL);
            assert::close(
                part.ln_density(&x),
                0.25_f64.ln() + full.ln_density(&x),
                TOL,
            );
        }
    }

    #[test]
    fn zero_alpha_has_zero_density() {
        let cpnt = GaussianComponent::new(0.0_f64, 1.0, 0.0).unwrap();
        assert_eq!(cpnt.density(&0.0), 0.0);
        assert_eq!(cpnt.ln_density(&0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn complex_density_uses_modulus() {
        let cpnt = GaussianComponent::<Complex64>::standard();
        let x = Complex64::new(3.0, 4.0);
        assert::close(
            cpnt.density(&x),
            (-12.5_f64).exp() * FRAC_1_SQRT_2PI,
            TOL,
        );
        assert::close(
            cpnt.density(&x),
            GaussianComponent::<f64>::standard().density(&5.0),
            TOL,
        );
    }

    #[test]
    fn f32_density_agrees_with_f64() {
        let c32 = GaussianComponent::new(0.5_f32, 1.5, 0.7).unwrap();
        let c64 = GaussianComponent::new(0.5_f64, 1.5, 0.7).unwrap();
        assert::close(c32.density(&1.25), c64.density(&1.25), 1E-7);
    }

    #[test]
    fn setters_leave_component_unchanged_on_error() {
        let mut cpnt = GaussianComponent::new(1.0_f64, 2.0, 0.5).unwrap();
        let before = cpnt.clone();

        assert!(cpnt.set_mean(f64::INFINITY).is_err());
        assert!(cpnt.set_variance(-2.0).is_err());
        assert!(cpnt.set_alpha(-0.5).is_err());
        assert_eq!(cpnt, before);

        cpnt.set_mean(-1.0).unwrap();
        cpnt.set_variance(0.5).unwrap();
        cpnt.set_alpha(0.0).unwrap();
        assert_eq!(cpnt, GaussianComponent::new(-1.0, 0.5, 0.0).unwrap());
    }

    #[test]
    fn sigma_is_sqrt_variance() {
        let cpnt = GaussianComponent::new(0.0_f64, 4.0, 1.0).unwrap();
        assert::close(cpnt.sigma(), 2.0, TOL);
    }

    #[test]
    fn density_integrates_to_alpha() {
        use peroxide::numerical::integral::{
            gauss_kronrod_quadrature, Integral,
        };
        let cpnt = GaussianComponent::new(-2.3_f64, 0.25, 0.4).unwrap();
        let pdf = |x: f64| cpnt.density(&x);
        let res = gauss_kronrod_quadrature(
            pdf,
            (-12.3, 7.7),
            Integral::G7K15(1e-12, 100),
        );
        assert::close(res, 0.4, 1e-9);
    }

    #[test]
    fn draws_should_be_finite() {
        let mut rng = Xoshiro256Plus::seed_from_u64(17);
        let cpnt = GaussianComponent::new(3.0_f64, 2.0, 0.1).unwrap();
        let xs: Vec<f64> = cpnt.sample(100, &mut rng);
        assert_eq!(xs.len(), 100);
        assert!(xs.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn sample_moments_match_parameters() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1701);
        let cpnt = GaussianComponent::new(3.0_f64, 2.0, 0.1).unwrap();
        let n = 50_000;
        let xs: Vec<f64> = cpnt.sample(n, &mut rng);
        let mean = xs.iter().sum::<f64>() / n as f64;
        let var =
            xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert::close(mean, 3.0, 0.05);
        assert::close(var, 2.0, 0.05);
    }

    #[test]
    fn display() {
        let cpnt = GaussianComponent::new(1.0_f64, 2.0, 0.5).unwrap();
        assert_eq!(cpnt.to_string(), "G(μ: 1, σ²: 2, α: 0.5)");
    }
}

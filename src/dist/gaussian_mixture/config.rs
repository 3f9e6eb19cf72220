#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// What `recalc` does when an update would divide zero by zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum DegeneracyPolicy {
    /// Leave out the offending part of the update and carry on.
    ///
    /// - A sample with zero (or undefined) mixture density is dropped from
    ///   the batch.
    /// - A component with no responsibility mass keeps its mean and
    ///   variance, and its weight becomes zero.
    /// - A component whose new variance is not a positive finite number
    ///   keeps its old variance but takes its new mean and weight.
    /// - A batch with no retained mass leaves the mixture untouched.
    #[default]
    Skip,
    /// Abort the step with `GaussianMixtureError::NumericalDegeneracy`
    /// and commit nothing.
    Fail,
}

/// Settings for the EM step
///
/// # Example
///
/// ```
/// use gaussmix::dist::{DegeneracyPolicy, EmConfig};
///
/// let config = EmConfig::default()
///     .with_policy(DegeneracyPolicy::Fail)
///     .with_reg_variance(1E-6)
///     .unwrap();
///
/// assert_eq!(config.policy(), DegeneracyPolicy::Fail);
/// assert_eq!(config.reg_variance(), 1E-6);
///
/// assert!(EmConfig::default().with_reg_variance(-1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct EmConfig {
    /// Handling of zero densities and collapsed components
    policy: DegeneracyPolicy,
    /// Non-negative amount added to every re-estimated variance
    reg_variance: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum EmConfigError {
    /// The variance regularization is less than zero
    RegVarianceTooLow { reg_variance: f64 },
    /// The variance regularization is infinite or NaN
    RegVarianceNotFinite { reg_variance: f64 },
}

impl EmConfig {
    /// Create a new config, checking that `reg_variance` is a finite,
    /// non-negative number.
    pub fn new(
        policy: DegeneracyPolicy,
        reg_variance: f64,
    ) -> Result<Self, EmConfigError> {
        validate_reg_variance(reg_variance)?;
        Ok(Self::new_unchecked(policy, reg_variance))
    }

    /// Creates a new config without checking `reg_variance`
    #[inline]
    pub fn new_unchecked(policy: DegeneracyPolicy, reg_variance: f64) -> Self {
        EmConfig {
            policy,
            reg_variance,
        }
    }

    #[inline]
    pub fn policy(&self) -> DegeneracyPolicy {
        self.policy
    }

    #[inline]
    pub fn reg_variance(&self) -> f64 {
        self.reg_variance
    }

    #[must_use]
    pub fn with_policy(mut self, policy: DegeneracyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the variance regularization
    ///
    /// # Errors
    /// `reg_variance` is negative, infinite, or NaN.
    pub fn with_reg_variance(
        mut self,
        reg_variance: f64,
    ) -> Result<Self, EmConfigError> {
        validate_reg_variance(reg_variance)?;
        self.reg_variance = reg_variance;
        Ok(self)
    }

    #[must_use]
    pub fn with_reg_variance_unchecked(mut self, reg_variance: f64) -> Self {
        self.reg_variance = reg_variance;
        self
    }
}

fn validate_reg_variance(reg_variance: f64) -> Result<(), EmConfigError> {
    if reg_variance < 0.0 {
        Err(EmConfigError::RegVarianceTooLow { reg_variance })
    } else if !reg_variance.is_finite() {
        Err(EmConfigError::RegVarianceNotFinite { reg_variance })
    } else {
        Ok(())
    }
}

impl Default for EmConfig {
    fn default() -> Self {
        EmConfig::new_unchecked(DegeneracyPolicy::Skip, 0.0)
    }
}

impl std::error::Error for EmConfigError {}

impl fmt::Display for EmConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegVarianceTooLow { reg_variance } => write!(
                f,
                "reg_variance ({reg_variance}) must be greater than or equal \
                 to zero"
            ),
            Self::RegVarianceNotFinite { reg_variance } => {
                write!(f, "non-finite reg_variance: {reg_variance}")
            }
        }
    }
}

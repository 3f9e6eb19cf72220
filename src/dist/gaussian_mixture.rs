//! Weighted mixture of Gaussian components
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use rand::Rng;
use std::fmt;

use crate::data::Scalar;
use crate::dist::GaussianComponent;
use crate::misc::{pflip, LogSumExp};
use crate::traits::{HasDensity, Sampleable};

mod config;
mod recalc;

pub use config::{DegeneracyPolicy, EmConfig, EmConfigError};
pub use recalc::RecalcSummary;

/// A Gaussian Mixture Model, Σ αᵢ N(x | μᵢ, σᵢ²), fitted one EM step at a
/// time.
///
/// Components are kept in the order they were given. Their weights sum to
/// one after construction and after every successful
/// [`normalize`](GaussianMixture::normalize); [`add`](GaussianMixture::add)
/// does not renormalize.
///
/// # Example
///
/// Fit a two-component mixture by repeating the EM step until the
/// log-likelihood stops improving.
///
/// ```
/// use gaussmix::prelude::*;
///
/// let mut gmm = GaussianMixture::new(vec![
///     GaussianComponent::with_mean(-1.0_f64).unwrap(),
///     GaussianComponent::with_mean(1.0_f64).unwrap(),
/// ])
/// .unwrap();
///
/// let xs = vec![-3.1, -2.9, -3.0, -3.2, 2.9, 3.1, 3.0, 2.8];
///
/// let mut ln_lik = f64::NEG_INFINITY;
/// for _ in 0..100 {
///     let summary = gmm.recalc(&xs).unwrap();
///     if summary.ln_likelihood - ln_lik < 1E-10 {
///         break;
///     }
///     ln_lik = summary.ln_likelihood;
/// }
///
/// assert!((gmm.get(0).unwrap().mean() + 3.05).abs() < 1E-3);
/// assert!((gmm.get(1).unwrap().mean() - 2.95).abs() < 1E-3);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct GaussianMixture<T> {
    /// The components, in caller-given order
    components: Vec<GaussianComponent<T>>,
    /// EM step settings
    #[cfg_attr(feature = "serde1", serde(default))]
    config: EmConfig,
}

/// A 0/0 met during an EM step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum Degeneracy {
    /// The batch carries no (retained) count mass
    NoObservations,
    /// The mixture density at the sample at `index` is zero or undefined
    ZeroDensity { index: usize },
    /// No responsibility mass landed on the component at `component`
    CollapsedComponent { component: usize },
    /// The re-estimated variance of the component at `component` is not a
    /// positive finite number
    CollapsedVariance { component: usize },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum GaussianMixtureError {
    /// `values` and `counts` have different lengths
    LengthMismatch { n_values: usize, n_counts: usize },
    /// Component index past the end of the mixture
    OutOfRange { index: usize, k: usize },
    /// The weights cannot be normalized because their sum is not a
    /// positive finite number
    DegenerateWeights { sum: f64 },
    /// The EM step hit a 0/0 and the policy is `DegeneracyPolicy::Fail`
    NumericalDegeneracy(Degeneracy),
}

impl<T: Scalar> GaussianMixture<T> {
    /// Create a mixture and normalize its weights.
    ///
    /// An empty `components` gives an empty mixture.
    ///
    /// # Example
    ///
    /// ```
    /// # use gaussmix::dist::{GaussianComponent, GaussianMixture};
    /// let gmm = GaussianMixture::new(vec![
    ///     GaussianComponent::new(0.0_f64, 1.0, 3.0).unwrap(),
    ///     GaussianComponent::new(5.0_f64, 1.0, 1.0).unwrap(),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(gmm.weights(), vec![0.75, 0.25]);
    /// ```
    pub fn new(
        components: Vec<GaussianComponent<T>>,
    ) -> Result<Self, GaussianMixtureError> {
        let mut mixture = Self::new_unchecked(components);
        if !mixture.is_empty() {
            mixture.normalize()?;
        }
        Ok(mixture)
    }

    /// Create a mixture without normalizing the weights
    #[inline]
    #[must_use]
    pub fn new_unchecked(components: Vec<GaussianComponent<T>>) -> Self {
        GaussianMixture {
            components,
            config: EmConfig::default(),
        }
    }

    /// Create a mixture in which every component has weight `1/k`
    ///
    /// # Example
    ///
    /// ```
    /// # use gaussmix::dist::{GaussianComponent, GaussianMixture};
    /// let gmm = GaussianMixture::uniform(vec![
    ///     GaussianComponent::new(0.0_f64, 1.0, 0.9).unwrap(),
    ///     GaussianComponent::new(5.0_f64, 1.0, 0.1).unwrap(),
    /// ]);
    ///
    /// assert_eq!(gmm.weights(), vec![0.5, 0.5]);
    /// ```
    #[must_use]
    pub fn uniform(mut components: Vec<GaussianComponent<T>>) -> Self {
        let alpha = (components.len() as f64).recip();
        components
            .iter_mut()
            .for_each(|cpnt| cpnt.set_alpha_unchecked(alpha));
        Self::new_unchecked(components)
    }

    /// Replace the EM settings
    #[must_use]
    pub fn with_config(mut self, config: EmConfig) -> Self {
        self.config = config;
        self
    }

    /// The EM settings
    #[inline]
    pub fn config(&self) -> &EmConfig {
        &self.config
    }

    /// Replace the EM settings
    #[inline]
    pub fn set_config(&mut self, config: EmConfig) {
        self.config = config;
    }

    /// Number of components
    #[inline]
    pub fn k(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The components, in order
    #[inline]
    pub fn components(&self) -> &[GaussianComponent<T>] {
        &self.components
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, GaussianComponent<T>> {
        self.components.iter()
    }

    /// Consume the mixture, returning its components
    #[inline]
    pub fn into_components(self) -> Vec<GaussianComponent<T>> {
        self.components
    }

    /// The component weights, in order
    pub fn weights(&self) -> Vec<f64> {
        self.components.iter().map(|cpnt| cpnt.alpha()).collect()
    }

    /// The component at `index`
    ///
    /// # Example
    ///
    /// ```
    /// # use gaussmix::dist::{GaussianComponent, GaussianMixture, GaussianMixtureError};
    /// let gmm = GaussianMixture::new(vec![GaussianComponent::<f64>::standard()])
    ///     .unwrap();
    ///
    /// assert!(gmm.get(0).is_ok());
    /// assert_eq!(
    ///     gmm.get(1),
    ///     Err(GaussianMixtureError::OutOfRange { index: 1, k: 1 })
    /// );
    /// ```
    pub fn get(
        &self,
        index: usize,
    ) -> Result<&GaussianComponent<T>, GaussianMixtureError> {
        self.components
            .get(index)
            .ok_or(GaussianMixtureError::OutOfRange {
                index,
                k: self.k(),
            })
    }

    /// Append a component. The weights are not renormalized.
    pub fn add(&mut self, component: GaussianComponent<T>) {
        self.components.push(component);
    }

    /// Remove every component
    pub fn clear(&mut self) {
        self.components.clear();
    }

    /// Rescale the weights so they sum to one.
    ///
    /// Fails, leaving the weights untouched, if their sum is zero (including
    /// the empty mixture) or not finite.
    pub fn normalize(&mut self) -> Result<(), GaussianMixtureError> {
        let sum: f64 = self.components.iter().map(|cpnt| cpnt.alpha()).sum();
        if sum > 0.0 && sum.is_finite() {
            self.components
                .iter_mut()
                .for_each(|cpnt| cpnt.set_alpha_unchecked(cpnt.alpha() / sum));
            Ok(())
        } else {
            Err(GaussianMixtureError::DegenerateWeights { sum })
        }
    }
}

impl<T: Scalar> Default for GaussianMixture<T> {
    fn default() -> Self {
        GaussianMixture::new_unchecked(Vec::new())
    }
}

impl<'a, T> IntoIterator for &'a GaussianMixture<T> {
    type Item = &'a GaussianComponent<T>;
    type IntoIter = std::slice::Iter<'a, GaussianComponent<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

impl<T: Scalar> HasDensity<T> for GaussianMixture<T> {
    fn ln_density(&self, x: &T) -> f64 {
        self.components
            .iter()
            .map(|cpnt| cpnt.ln_density(x))
            .logsumexp()
    }

    fn density(&self, x: &T) -> f64 {
        self.components.iter().map(|cpnt| cpnt.density(x)).sum()
    }
}

/// Draws pick a component in proportion to its weight.
///
/// # Panics
///
/// Drawing from an empty mixture, or one whose weights are all zero,
/// panics.
impl<T: Scalar> Sampleable<T> for GaussianMixture<T> {
    fn draw<R: Rng>(&self, rng: &mut R) -> T {
        let ix = pflip(&self.weights(), 1, rng)[0];
        self.components[ix].draw(rng)
    }

    fn sample<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<T> {
        pflip(&self.weights(), n, rng)
            .into_iter()
            .map(|ix| self.components[ix].draw(rng))
            .collect()
    }
}

impl<T: Scalar> fmt::Display for GaussianMixture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GMM(k: {}", self.k())?;
        for cpnt in &self.components {
            write!(f, ", {cpnt}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoObservations => write!(f, "no observations to fit"),
            Self::ZeroDensity { index } => {
                write!(f, "zero mixture density at sample {index}")
            }
            Self::CollapsedComponent { component } => {
                write!(f, "component {component} has no responsibility mass")
            }
            Self::CollapsedVariance { component } => {
                write!(f, "component {component} collapsed to zero variance")
            }
        }
    }
}

impl std::error::Error for GaussianMixtureError {}

impl fmt::Display for GaussianMixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { n_values, n_counts } => write!(
                f,
                "got {n_values} values but {n_counts} counts; they must match"
            ),
            Self::OutOfRange { index, k } => write!(
                f,
                "component index {index} out of range for mixture with {k} \
                 components"
            ),
            Self::DegenerateWeights { sum } => {
                write!(f, "cannot normalize weights that sum to {sum}")
            }
            Self::NumericalDegeneracy(degeneracy) => {
                write!(f, "numerical degeneracy: {degeneracy}")
            }
        }
    }
}

//! Count-weighted Gaussian mixtures over real and complex values.
//!
//! A [`GaussianMixture`](dist::GaussianMixture) owns an ordered list of
//! weighted [`GaussianComponent`](dist::GaussianComponent)s and is refined
//! by one Expectation-Maximization step per call to
//! [`recalc`](dist::GaussianMixture::recalc). Repeated observations of a value
//! can be passed once with a count through
//! [`recalc_weighted`](dist::GaussianMixture::recalc_weighted).
//!
//! # Example
//!
//! Model the background of an in-phase/quadrature stream as two circularly
//! symmetric Gaussians.
//!
//! ```
//! use gaussmix::prelude::*;
//! use num::complex::Complex64;
//!
//! let mut gmm = GaussianMixture::new(vec![
//!     GaussianComponent::new(Complex64::new(0.0, 0.0), 1.0, 0.5).unwrap(),
//!     GaussianComponent::new(Complex64::new(4.0, 0.0), 1.0, 0.5).unwrap(),
//! ])
//! .unwrap();
//!
//! let iq = vec![
//!     Complex64::new(0.1, -0.2),
//!     Complex64::new(-0.1, 0.1),
//!     Complex64::new(4.2, 0.1),
//! ];
//! let counts: Vec<u32> = vec![10, 12, 3];
//!
//! let summary = gmm.recalc_weighted(&iq, &counts).unwrap();
//! assert!(summary.degeneracies.is_empty());
//!
//! let weights = gmm.weights();
//! assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1E-12);
//! assert!(weights[0] > weights[1]);
//! ```

pub mod consts;
pub mod data;
pub mod dist;
pub mod misc;
pub mod traits;

pub mod prelude {
    pub use crate::data::{Count, Scalar};
    pub use crate::dist::{
        Degeneracy, DegeneracyPolicy, EmConfig, EmConfigError,
        GaussianComponent, GaussianComponentError, GaussianMixture,
        GaussianMixtureError, RecalcSummary,
    };
    pub use crate::traits::{HasDensity, Sampleable};
}

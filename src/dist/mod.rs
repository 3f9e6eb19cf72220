//! Gaussian components and mixtures
mod gaussian_component;
mod gaussian_mixture;

pub use gaussian_component::{GaussianComponent, GaussianComponentError};
pub use gaussian_mixture::{
    Degeneracy, DegeneracyPolicy, EmConfig, EmConfigError, GaussianMixture,
    GaussianMixtureError, RecalcSummary,
};

//! Data utilities
mod count;
mod scalar;

pub use self::count::Count;
pub use self::scalar::Scalar;

use crate::dist::GaussianMixtureError;

/// Ensure a batch of values has exactly one count per value
pub(crate) fn check_lengths<T, C>(
    values: &[T],
    counts: &[C],
) -> Result<(), GaussianMixtureError> {
    if values.len() == counts.len() {
        Ok(())
    } else {
        Err(GaussianMixtureError::LengthMismatch {
            n_values: values.len(),
            n_counts: counts.len(),
        })
    }
}

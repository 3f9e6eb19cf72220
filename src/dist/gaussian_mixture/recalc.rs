#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    Degeneracy, DegeneracyPolicy, GaussianMixture, GaussianMixtureError,
};
use crate::data::{check_lengths, Count, Scalar};
use crate::misc::LogSumExp;
use crate::traits::HasDensity;

/// The outcome of one EM step
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct RecalcSummary {
    /// Count-weighted log likelihood of the retained samples under the
    /// parameters from *before* the step
    pub ln_likelihood: f64,
    /// Total count of the retained samples
    pub total_count: f64,
    /// Number of samples dropped for having zero mixture density
    pub n_dropped: usize,
    /// The degeneracies skipped over, in the order they were met
    pub degeneracies: Vec<Degeneracy>,
}

struct Update<T> {
    mean: T,
    variance: f64,
    alpha: f64,
}

fn note(
    policy: DegeneracyPolicy,
    degeneracy: Degeneracy,
    seen: &mut Vec<Degeneracy>,
) -> Result<(), GaussianMixtureError> {
    match policy {
        DegeneracyPolicy::Fail => {
            Err(GaussianMixtureError::NumericalDegeneracy(degeneracy))
        }
        DegeneracyPolicy::Skip => {
            warn!(%degeneracy, "skipping degenerate EM update");
            seen.push(degeneracy);
            Ok(())
        }
    }
}

impl<T: Scalar> GaussianMixture<T> {
    /// One EM step over unweighted samples.
    ///
    /// Same as [`recalc_weighted`](GaussianMixture::recalc_weighted) with a
    /// count of one for every value.
    pub fn recalc(
        &mut self,
        values: &[T],
    ) -> Result<RecalcSummary, GaussianMixtureError> {
        let counts = vec![1_u32; values.len()];
        self.recalc_weighted(values, &counts)
    }

    /// One EM step over count-weighted samples; `counts[i]` is the number of
    /// times `values[i]` was observed.
    ///
    /// Responsibilities are computed from the parameters as they were
    /// before the call, and every component is updated from that same
    /// snapshot. The new parameters are committed together, and only if
    /// the whole step succeeds.
    ///
    /// # Example
    ///
    /// With a single component the step is the maximum likelihood fit.
    ///
    /// ```
    /// use gaussmix::prelude::*;
    ///
    /// let mut gmm =
    ///     GaussianMixture::new(vec![GaussianComponent::<f64>::standard()])
    ///         .unwrap();
    ///
    /// // 1, 1, 1, 4
    /// gmm.recalc_weighted(&[1.0, 4.0], &[3_u32, 1]).unwrap();
    ///
    /// let cpnt = gmm.get(0).unwrap();
    /// assert!((cpnt.mean() - 1.75).abs() < 1E-12);
    /// assert!((cpnt.variance() - 1.6875).abs() < 1E-12);
    /// assert!((cpnt.alpha() - 1.0).abs() < 1E-12);
    /// ```
    pub fn recalc_weighted<C: Count>(
        &mut self,
        values: &[T],
        counts: &[C],
    ) -> Result<RecalcSummary, GaussianMixtureError> {
        check_lengths(values, counts)?;

        let policy = self.config.policy();
        let mut degeneracies = Vec::new();

        // One row per component. Starts as log densities and is turned into
        // count-weighted responsibilities column by column.
        let mut resp: Vec<Vec<f64>> = self
            .components
            .iter()
            .map(|cpnt| values.iter().map(|x| cpnt.ln_density(x)).collect())
            .collect();

        let mut total_count = 0.0;
        let mut ln_likelihood = 0.0;
        let mut n_dropped: usize = 0;

        for (i, count) in counts.iter().enumerate() {
            let w = count.as_weight();
            let ln_mix = if w > 0.0 {
                resp.iter().map(|row| row[i]).logsumexp()
            } else {
                f64::NEG_INFINITY
            };

            if ln_mix.is_finite() {
                resp.iter_mut()
                    .for_each(|row| row[i] = w * (row[i] - ln_mix).exp());
                total_count += w;
                ln_likelihood += w * ln_mix;
            } else {
                if w > 0.0 {
                    note(
                        policy,
                        Degeneracy::ZeroDensity { index: i },
                        &mut degeneracies,
                    )?;
                    n_dropped += 1;
                }
                resp.iter_mut().for_each(|row| row[i] = 0.0);
            }
        }

        if total_count <= 0.0 {
            note(policy, Degeneracy::NoObservations, &mut degeneracies)?;
            debug!(
                k = self.k(),
                n = values.len(),
                total_count,
                n_dropped,
                "EM step without observations; mixture unchanged"
            );
            return Ok(RecalcSummary {
                ln_likelihood,
                total_count,
                n_dropped,
                degeneracies,
            });
        }

        let reg_variance = self.config.reg_variance();
        let mut updates: Vec<Update<T>> = Vec::with_capacity(self.k());

        for (ix, (cpnt, row)) in
            self.components.iter().zip(resp.iter()).enumerate()
        {
            let n_k: f64 = row.iter().sum();

            if !(n_k > 0.0 && n_k.is_finite()) {
                note(
                    policy,
                    Degeneracy::CollapsedComponent { component: ix },
                    &mut degeneracies,
                )?;
                updates.push(Update {
                    mean: cpnt.mean(),
                    variance: cpnt.variance(),
                    alpha: 0.0,
                });
                continue;
            }

            // Dropped and zero-count samples have r == 0 and must not touch
            // the sums, even if the value itself is not finite. Each term is
            // scaled by r / n_k, which lies in [0, 1], so responsibilities
            // below the precision of T do not vanish.
            let mean = values
                .iter()
                .zip(row.iter())
                .filter(|(_, &r)| r > 0.0)
                .fold(T::zero(), |acc, (&x, &r)| acc + x.scale(r / n_k));

            let variance = values
                .iter()
                .zip(row.iter())
                .filter(|(_, &r)| r > 0.0)
                .map(|(&x, &r)| r * (x - mean).norm_sq())
                .sum::<f64>()
                / n_k
                + reg_variance;

            let variance = if variance > 0.0 && variance.is_finite() {
                variance
            } else {
                note(
                    policy,
                    Degeneracy::CollapsedVariance { component: ix },
                    &mut degeneracies,
                )?;
                cpnt.variance()
            };

            updates.push(Update {
                mean,
                variance,
                alpha: n_k / total_count,
            });
        }

        self.components
            .iter_mut()
            .zip(updates)
            .for_each(|(cpnt, update)| {
                cpnt.set_mean_unchecked(update.mean);
                cpnt.set_variance_unchecked(update.variance);
                cpnt.set_alpha_unchecked(update.alpha);
            });

        debug!(
            k = self.k(),
            n = values.len(),
            total_count,
            ln_likelihood,
            n_dropped,
            "EM step"
        );

        Ok(RecalcSummary {
            ln_likelihood,
            total_count,
            n_dropped,
            degeneracies,
        })
    }

    /// Count-weighted log likelihood, `Σ counts[i] ln p(values[i])`, under
    /// the current parameters.
    ///
    /// Samples with a zero count are ignored.
    pub fn ln_likelihood<C: Count>(
        &self,
        values: &[T],
        counts: &[C],
    ) -> Result<f64, GaussianMixtureError> {
        check_lengths(values, counts)?;
        Ok(values
            .iter()
            .zip(counts.iter())
            .map(|(x, count)| (x, count.as_weight()))
            .filter(|(_, w)| *w > 0.0)
            .map(|(x, w)| w * self.ln_density(x))
            .sum())
    }
}

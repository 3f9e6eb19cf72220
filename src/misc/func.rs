use rand::Rng;
use std::ops::AddAssign;

/// Numerically stable `ln(sum(exp(x)))` over an iterator of log-domain
/// values.
///
/// Terms equal to `-∞` contribute nothing, so an empty iterator, or one
/// holding only `-∞`, yields `-∞`. A `NaN` term makes the result `NaN`.
///
/// # Example
///
/// ```rust
/// use gaussmix::misc::LogSumExp;
///
/// let ln_xs = vec![0.5_f64.ln(), 0.25_f64.ln(), 0.25_f64.ln()];
/// assert!(ln_xs.into_iter().logsumexp().abs() < 1E-12);
///
/// assert_eq!(Vec::<f64>::new().into_iter().logsumexp(), f64::NEG_INFINITY);
/// ```
pub trait LogSumExp: Iterator<Item = f64> + Sized {
    fn logsumexp(self) -> f64 {
        // Streaming: `sum` is kept relative to the running max
        let (max, sum) =
            self.fold((f64::NEG_INFINITY, 0.0_f64), |(max, sum), x| {
                if x == f64::NEG_INFINITY {
                    (max, sum)
                } else if x <= max {
                    (max, sum + (x - max).exp())
                } else {
                    (x, sum.mul_add((max - x).exp(), 1.0))
                }
            });

        if max.is_nan() {
            f64::NAN
        } else if sum == 0.0 {
            f64::NEG_INFINITY
        } else {
            max + sum.ln()
        }
    }
}

impl<I: Iterator<Item = f64>> LogSumExp for I {}

/// Cumulative sum of `xs`
///
/// # Example
///
/// ```rust
/// # use gaussmix::misc::cumsum;
/// let xs: Vec<f64> = vec![0.5, 0.25, 0.25];
/// assert_eq!(cumsum(&xs), vec![0.5, 0.75, 1.0]);
/// ```
pub fn cumsum<T>(xs: &[T]) -> Vec<T>
where
    T: AddAssign + Copy + Default,
{
    xs.iter()
        .scan(T::default(), |acc, &x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

/// Draw `n` indices in proportion to their (unnormalized) `weights`
///
/// # Panics
///
/// Panics if `weights` is empty or does not have a positive sum.
///
/// # Example
///
/// ```rust
/// use gaussmix::misc::pflip;
///
/// let weights: Vec<f64> = vec![0.4, 0.0, 0.6];
/// let ixs = pflip(&weights, 100, &mut rand::thread_rng());
///
/// assert_eq!(ixs.len(), 100);
/// assert!(ixs.iter().all(|&ix| ix == 0 || ix == 2));
/// ```
pub fn pflip(weights: &[f64], n: usize, rng: &mut impl Rng) -> Vec<usize> {
    if weights.is_empty() {
        panic!("Empty container");
    }
    let cws: Vec<f64> = cumsum(weights);
    let scale: f64 = cws[cws.len() - 1];
    if !(scale > 0.0 && scale.is_finite()) {
        panic!("Could not draw from {:?}", weights)
    }
    let u = rand::distributions::Uniform::new(0.0, scale);

    (0..n)
        .map(|_| {
            let r = rng.sample(u);
            match cws.iter().position(|&w| w > r) {
                Some(ix) => ix,
                None => panic!("Could not draw from {:?}", weights),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    const TOL: f64 = 1E-12;

    #[test]
    fn logsumexp_on_vector_of_zeros() {
        let xs: Vec<f64> = vec![0.0; 5];
        // should be about log(5)
        assert::close(xs.into_iter().logsumexp(), 1.609_437_912_434_100_3, TOL);
    }

    #[test]
    fn logsumexp_on_random_values() {
        let xs: Vec<f64> = vec![
            0.304_153_86,
            -0.070_722_96,
            -1.042_870_19,
            0.278_554_07,
            -0.818_967_65,
        ];
        assert::close(xs.into_iter().logsumexp(), 1.482_000_789_426_305_9, TOL);
    }

    #[test]
    fn logsumexp_returns_only_value_on_one_element_container() {
        let xs: Vec<f64> = vec![0.304_153_86];
        assert::close(xs.into_iter().logsumexp(), 0.304_153_86, TOL);
    }

    #[test]
    fn logsumexp_ignores_neg_infinity() {
        let xs: Vec<f64> = vec![f64::NEG_INFINITY, 0.0, f64::NEG_INFINITY];
        assert::close(xs.into_iter().logsumexp(), 0.0, TOL);
    }

    #[test]
    fn logsumexp_of_all_neg_infinity_is_neg_infinity() {
        let xs: Vec<f64> = vec![f64::NEG_INFINITY; 3];
        assert_eq!(xs.into_iter().logsumexp(), f64::NEG_INFINITY);
    }

    #[test]
    fn logsumexp_propagates_nan() {
        let xs: Vec<f64> = vec![0.0, f64::NAN, 1.0];
        assert!(xs.into_iter().logsumexp().is_nan());
    }

    #[test]
    fn logsumexp_does_not_underflow() {
        let xs: Vec<f64> = vec![-1000.0, -1000.0];
        assert::close(
            xs.into_iter().logsumexp(),
            -1000.0 + 2.0_f64.ln(),
            TOL,
        );
    }

    #[test]
    fn cumsum_of_counts() {
        let xs: Vec<u32> = vec![1, 1, 2, 1];
        assert_eq!(cumsum(&xs), vec![1, 2, 4, 5]);
    }

    #[test]
    fn pflip_frequencies_follow_weights() {
        let mut rng = Xoshiro256Plus::seed_from_u64(0xdead_beef);
        let weights = vec![1.0, 3.0];
        let n = 20_000;
        let ixs = pflip(&weights, n, &mut rng);
        let n_one = ixs.iter().filter(|&&ix| ix == 1).count();
        assert::close(n_one as f64 / n as f64, 0.75, 0.02);
    }

    #[test]
    #[should_panic]
    fn pflip_should_panic_on_empty() {
        pflip(&[], 1, &mut rand::thread_rng());
    }

    #[test]
    #[should_panic]
    fn pflip_should_panic_on_zero_weights() {
        pflip(&[0.0, 0.0], 1, &mut rand::thread_rng());
    }
}

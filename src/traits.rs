//! Trait definitions
use rand::Rng;

/// A (possibly weighted) density over values of type `X`
pub trait HasDensity<X> {
    /// The natural log of the density at `x`
    fn ln_density(&self, x: &X) -> f64;

    /// The density at `x`
    fn density(&self, x: &X) -> f64 {
        self.ln_density(x).exp()
    }
}

/// Something values of type `X` can be drawn from
pub trait Sampleable<X> {
    /// Single draw
    fn draw<R: Rng>(&self, rng: &mut R) -> X;

    /// Multiple draws
    fn sample<R: Rng>(&self, n: usize, mut rng: &mut R) -> Vec<X> {
        (0..n).map(|_| self.draw(&mut rng)).collect()
    }

    /// Create a never-ending iterator of draws
    ///
    /// # Example
    ///
    /// ```
    /// use gaussmix::prelude::*;
    ///
    /// let cpnt = GaussianComponent::<f64>::standard();
    /// let mut rng = rand::thread_rng();
    ///
    /// let xs: Vec<f64> = cpnt.sample_stream(&mut rng).take(5).collect();
    /// assert_eq!(xs.len(), 5);
    /// ```
    fn sample_stream<'r, R: Rng>(
        &'r self,
        rng: &'r mut R,
    ) -> Box<dyn Iterator<Item = X> + 'r>
    where
        X: 'r,
    {
        Box::new(std::iter::repeat_with(move || self.draw(rng)))
    }
}

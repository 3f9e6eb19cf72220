use std::fmt::Debug;

/// Multiplicity of an observed value.
///
/// Implemented for the unsigned integer types so a count can never be
/// negative.
pub trait Count: Copy + Debug {
    /// The count as a real-valued weight
    fn as_weight(self) -> f64;
}

macro_rules! impl_count {
    ($kind:ty) => {
        impl Count for $kind {
            #[inline]
            fn as_weight(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_count!(u8);
impl_count!(u16);
impl_count!(u32);
impl_count!(u64);
impl_count!(usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_match_counts() {
        assert_eq!(3_u8.as_weight(), 3.0);
        assert_eq!(0_u16.as_weight(), 0.0);
        assert_eq!(17_u32.as_weight(), 17.0);
        assert_eq!(1_000_000_u64.as_weight(), 1e6);
        assert_eq!(42_usize.as_weight(), 42.0);
    }
}

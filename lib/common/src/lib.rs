//! Plumbing shared by the `wzmodel` text codecs: a line-oriented record reader and the numeric
//! trait bound used by the geometry helpers.

mod record;
pub use record::*;

/// Trait for floating-point types, so that geometry helpers can be generic over {f32, f64}.
pub trait Float:
    num_traits::Float
    + nalgebra::Scalar
    + nalgebra::SimdPartialOrd
    + std::ops::AddAssign
    + std::ops::SubAssign
    + std::fmt::Display
    + std::str::FromStr
    + Copy
    + Send
    + Sync
{
    const ZERO: Self;
    const TWO: Self;

    /// Convert an element count into `Self`, for averaging.
    fn from_count(n: usize) -> Self;
}

macro_rules! impl_float {
    ($($Real:ty),+) => {
        $(
            impl Float for $Real {
                const ZERO: Self = 0.0;
                const TWO: Self = 2.0;

                #[inline]
                fn from_count(n: usize) -> Self {
                    n as $Real
                }
            }
        )+
    };
}

impl_float!(f32, f64);

/// Upper bound on how many elements a declared record count may pre-allocate.
///
/// Counts come from untrusted files; anything past this grows on demand instead.
pub const MAX_PREALLOC: usize = 1 << 16;

/// Clamp a record count read from a file to something safe to hand to `with_capacity`.
#[inline]
pub fn capacity_hint(count: usize) -> usize {
    count.min(MAX_PREALLOC)
}

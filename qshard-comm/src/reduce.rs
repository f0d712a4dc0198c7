//! Element types and operators for reductions

use crate::error::{CommError, Result};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Associative reduction operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReduceOp {
    Sum,
    Prod,
    Min,
    Max,
}

/// Values that can be combined by a [`ReduceOp`]
pub trait Reducible: Copy + Send + 'static {
    /// Type name used in error messages
    const TYPE_NAME: &'static str;

    /// Combine two values; fails for operators the type does not support
    fn combine(a: Self, b: Self, op: ReduceOp) -> Result<Self>;
}

macro_rules! impl_reducible_ordered {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Reducible for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                #[inline]
                fn combine(a: Self, b: Self, op: ReduceOp) -> Result<Self> {
                    Ok(match op {
                        ReduceOp::Sum => a + b,
                        ReduceOp::Prod => a * b,
                        ReduceOp::Min => if b < a { b } else { a },
                        ReduceOp::Max => if b > a { b } else { a },
                    })
                }
            }
        )+
    };
}

impl_reducible_ordered!(f64, f32, i32, i64, u64, usize);

impl Reducible for Complex64 {
    const TYPE_NAME: &'static str = "Complex64";

    #[inline]
    fn combine(a: Self, b: Self, op: ReduceOp) -> Result<Self> {
        match op {
            ReduceOp::Sum => Ok(a + b),
            ReduceOp::Prod => Ok(a * b),
            ReduceOp::Min | ReduceOp::Max => Err(CommError::UnsupportedReduceOp {
                op,
                ty: Self::TYPE_NAME,
            }),
        }
    }
}

/// Fold `src` into `acc` elementwise
pub fn combine_into<T: Reducible>(acc: &mut [T], src: &[T], op: ReduceOp) -> Result<()> {
    if acc.len() != src.len() {
        return Err(CommError::LengthMismatch {
            expected: acc.len(),
            actual: src.len(),
        });
    }
    for (a, &b) in acc.iter_mut().zip(src) {
        *a = T::combine(*a, b, op)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_ops() {
        assert_eq!(f64::combine(2.0, 3.0, ReduceOp::Sum).unwrap(), 5.0);
        assert_eq!(i32::combine(2, 3, ReduceOp::Prod).unwrap(), 6);
        assert_eq!(usize::combine(2, 3, ReduceOp::Min).unwrap(), 2);
        assert_eq!(u64::combine(2, 3, ReduceOp::Max).unwrap(), 3);
    }

    #[test]
    fn test_complex_min_unsupported() {
        let z = Complex64::new(1.0, 1.0);
        assert_eq!(Complex64::combine(z, z, ReduceOp::Sum).unwrap(), Complex64::new(2.0, 2.0));
        assert!(Complex64::combine(z, z, ReduceOp::Min).is_err());
    }

    #[test]
    fn test_combine_into_length_checked() {
        let mut acc = vec![1.0, 2.0];
        combine_into(&mut acc, &[3.0, 4.0], ReduceOp::Sum).unwrap();
        assert_eq!(acc, vec![4.0, 6.0]);
        assert!(combine_into(&mut acc, &[1.0], ReduceOp::Sum).is_err());
    }
}

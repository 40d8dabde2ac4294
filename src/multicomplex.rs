//! Multicomplex number tower for derivative extraction.
//!
//! A multicomplex number of order k has 2^k real components and k
//! imaginary units i_1..i_k. Each unit squares to -1; distinct units
//! commute and their products do not merge, so a product of two order-2
//! numbers carries a nonzero "both-imaginary" coefficient, the slot a
//! mixed second derivative lands in when both lanes are seeded with
//! step-scaled perturbations.
//!
//! The tower is built by composition: order k is a pair of order-(k-1)
//! values, order 0 is the base scalar. Because the element energy is a
//! polynomial in the deformation gradient, lifted arithmetic stays
//! linear, distributive and associative exactly as over the reals, and
//! derivative readout needs no limit h -> 0 and suffers no subtractive
//! cancellation: an imaginary lane only ever combines terms of its own
//! magnitude.
//!
//! [`ComplexScalar`] is the small algebraic interface the energy kernel
//! is generic over, so one kernel serves real, order-1, order-2 and
//! order-3 operands alike.

use num_traits::{One, Zero};
use std::ops::{Add, Mul, Neg, Sub};

use crate::types::Real;

/// One nesting level of the multicomplex tower: `re + i * im`, where
/// `re` and `im` are values of the next-lower order and `i` is a fresh
/// imaginary unit independent of every inner unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiComplex<A> {
    /// Component along 1.
    pub re: A,
    /// Component along this level's imaginary unit.
    pub im: A,
}

/// Order-1 multicomplex number (ordinary complex): 2 components.
pub type Complex1<T> = MultiComplex<T>;

/// Order-2 multicomplex number (bicomplex): 4 components.
pub type Bicomplex<T> = MultiComplex<Complex1<T>>;

/// Order-3 multicomplex number (tricomplex): 8 components.
pub type Tricomplex<T> = MultiComplex<Bicomplex<T>>;

impl<A> MultiComplex<A> {
    /// Build from explicit components.
    #[inline]
    pub const fn new(re: A, im: A) -> Self {
        Self { re, im }
    }
}

/// Scalar interface shared by the base reals and every tower order.
///
/// This is the complete algebraic surface the lifted energy formula
/// needs: ring arithmetic, scalar multiply by the base real, embedding
/// of reals, and readout of the fully-real component. Arithmetic must
/// reduce to ordinary real arithmetic whenever all imaginary
/// components are zero.
pub trait ComplexScalar:
    Copy + Zero + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + Neg<Output = Self>
{
    /// The underlying real scalar.
    type Real: Real;

    /// Embed a real value (all imaginary components zero).
    fn from_real(r: Self::Real) -> Self;

    /// Replace the fully-real component, keeping every imaginary one.
    fn with_real(self, r: Self::Real) -> Self;

    /// Multiply every component by a base-real factor.
    fn scale(self, s: Self::Real) -> Self;

    /// The fully-real component.
    fn real(self) -> Self::Real;
}

macro_rules! impl_complex_scalar_for_real {
    ($($t:ty),*) => {$(
        impl ComplexScalar for $t {
            type Real = $t;

            #[inline]
            fn from_real(r: Self::Real) -> Self {
                r
            }

            #[inline]
            fn with_real(self, r: Self::Real) -> Self {
                r
            }

            #[inline]
            fn scale(self, s: Self::Real) -> Self {
                self * s
            }

            #[inline]
            fn real(self) -> Self::Real {
                self
            }
        }
    )*};
}

impl_complex_scalar_for_real!(f32, f64);

impl<A: ComplexScalar> ComplexScalar for MultiComplex<A> {
    type Real = A::Real;

    #[inline]
    fn from_real(r: Self::Real) -> Self {
        Self {
            re: A::from_real(r),
            im: A::zero(),
        }
    }

    #[inline]
    fn with_real(self, r: Self::Real) -> Self {
        Self {
            re: self.re.with_real(r),
            im: self.im,
        }
    }

    #[inline]
    fn scale(self, s: Self::Real) -> Self {
        Self {
            re: self.re.scale(s),
            im: self.im.scale(s),
        }
    }

    #[inline]
    fn real(self) -> Self::Real {
        self.re.real()
    }
}

impl<A: Add<Output = A>> Add for MultiComplex<A> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl<A: Sub<Output = A>> Sub for MultiComplex<A> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl<A: Neg<Output = A>> Neg for MultiComplex<A> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            re: -self.re,
            im: -self.im,
        }
    }
}

/// Product with the unit rule `i^2 = -1` at this level; inner units are
/// carried through untouched by the recursive component products.
impl<A> Mul for MultiComplex<A>
where
    A: Copy + Add<Output = A> + Sub<Output = A> + Mul<Output = A>,
{
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl<A: Zero> Zero for MultiComplex<A> {
    #[inline]
    fn zero() -> Self {
        Self {
            re: A::zero(),
            im: A::zero(),
        }
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }
}

impl<A: Copy + Zero + One + Sub<Output = A>> One for MultiComplex<A> {
    #[inline]
    fn one() -> Self {
        Self {
            re: A::one(),
            im: A::zero(),
        }
    }
}

//! Gene element kinds and the packed numeric buffers that hold them.
//!
//! A population is one flat buffer of a single element kind. The kind fixes
//! the natural value bounds every gene must respect.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Divisor applied to float maxima so that arithmetic on scores built from
/// genes (sums, products of a few terms) stays finite.
pub const FLOAT_BOUND_SCALE: f64 = 1E4;

/// Element kind of a gene buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    F32,
    F64,
}

impl Dtype {
    /// All supported kinds.
    pub const ALL: [Dtype; 8] = [
        Dtype::U8,
        Dtype::U16,
        Dtype::U32,
        Dtype::I8,
        Dtype::I16,
        Dtype::I32,
        Dtype::F32,
        Dtype::F64,
    ];

    /// Width of one element in bits.
    pub fn bits(self) -> u32 {
        match self {
            Dtype::U8 | Dtype::I8 => 8,
            Dtype::U16 | Dtype::I16 => 16,
            Dtype::U32 | Dtype::I32 | Dtype::F32 => 32,
            Dtype::F64 => 64,
        }
    }

    #[inline]
    pub fn is_unsigned(self) -> bool {
        matches!(self, Dtype::U8 | Dtype::U16 | Dtype::U32)
    }

    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, Dtype::F32 | Dtype::F64)
    }

    /// Natural `(lower, upper)` value bounds for this kind.
    ///
    /// Unsigned kinds span `[0, 2^bits - 1]`, signed kinds the symmetric
    /// `[-(2^(bits-1)) + 1, 2^(bits-1) - 1]`, and float kinds `±MAX / 1E4`.
    pub fn bounds(self) -> (f64, f64) {
        let bits = self.bits() as i32;
        match self {
            Dtype::U8 | Dtype::U16 | Dtype::U32 => (0.0, 2f64.powi(bits) - 1.0),
            Dtype::I8 | Dtype::I16 | Dtype::I32 => {
                let half = 2f64.powi(bits - 1);
                (-half + 1.0, half - 1.0)
            }
            Dtype::F32 => {
                let max = f32::MAX as f64 / FLOAT_BOUND_SCALE;
                (-max, max)
            }
            Dtype::F64 => {
                let max = f64::MAX / FLOAT_BOUND_SCALE;
                (-max, max)
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dtype::U8 => "u8",
            Dtype::U16 => "u16",
            Dtype::U32 => "u32",
            Dtype::I8 => "i8",
            Dtype::I16 => "i16",
            Dtype::I32 => "i32",
            Dtype::F32 => "f32",
            Dtype::F64 => "f64",
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dtype {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Dtype::ALL
            .into_iter()
            .find(|dtype| dtype.as_str() == lower)
            .ok_or_else(|| ConfigError::UnknownDtype(s.to_string()))
    }
}

/// A numeric type that can be stored as a gene.
pub trait Gene: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Element kind backing this type.
    const DTYPE: Dtype;

    fn to_f64(self) -> f64;

    /// Convert from `f64`, saturating at the kind's bounds. NaN maps to zero.
    fn from_f64(value: f64) -> Self;

    /// Draw a value uniformly from `[lower, upper]`.
    fn sample<R: Rng + ?Sized>(rng: &mut R, lower: f64, upper: f64) -> Self;

    /// Clamp an arbitrary value of this type into the kind's bounds.
    #[inline]
    fn clamp_to_kind(self) -> Self {
        Self::from_f64(self.to_f64())
    }
}

macro_rules! int_gene {
    ($ty:ty, $dtype:expr) => {
        impl Gene for $ty {
            const DTYPE: Dtype = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                if value.is_nan() {
                    return 0;
                }
                let (lower, upper) = $dtype.bounds();
                value.round().clamp(lower, upper) as $ty
            }

            fn sample<R: Rng + ?Sized>(rng: &mut R, lower: f64, upper: f64) -> Self {
                let lower = lower.ceil() as i64;
                let upper = upper.floor() as i64;
                if lower >= upper {
                    return Self::from_f64(lower as f64);
                }
                Self::from_f64(rng.gen_range(lower..=upper) as f64)
            }
        }
    };
}

macro_rules! float_gene {
    ($ty:ty, $dtype:expr) => {
        impl Gene for $ty {
            const DTYPE: Dtype = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                if value.is_nan() {
                    return 0.0;
                }
                let (lower, upper) = $dtype.bounds();
                value.clamp(lower, upper) as $ty
            }

            fn sample<R: Rng + ?Sized>(rng: &mut R, lower: f64, upper: f64) -> Self {
                if lower >= upper {
                    return Self::from_f64(lower);
                }
                Self::from_f64(rng.gen_range(lower..=upper))
            }
        }
    };
}

int_gene!(u8, Dtype::U8);
int_gene!(u16, Dtype::U16);
int_gene!(u32, Dtype::U32);
int_gene!(i8, Dtype::I8);
int_gene!(i16, Dtype::I16);
int_gene!(i32, Dtype::I32);
float_gene!(f32, Dtype::F32);
float_gene!(f64, Dtype::F64);

/// Allocate a zero-initialized gene buffer of `len` elements.
pub fn zeroed<T: Gene>(len: usize) -> Vec<T> {
    vec![T::default(); len]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_integer_bounds() {
        assert_eq!(Dtype::U8.bounds(), (0.0, 255.0));
        assert_eq!(Dtype::U16.bounds(), (0.0, 65535.0));
        assert_eq!(Dtype::U32.bounds(), (0.0, 4294967295.0));
        assert_eq!(Dtype::I8.bounds(), (-127.0, 127.0));
        assert_eq!(Dtype::I16.bounds(), (-32767.0, 32767.0));
        assert_eq!(Dtype::I32.bounds(), (-2147483647.0, 2147483647.0));
    }

    #[test]
    fn test_float_bounds_leave_headroom() {
        let (lower, upper) = Dtype::F32.bounds();
        assert_eq!(lower, -upper);
        assert!((upper * 100.0) < f32::MAX as f64);

        let (_, upper) = Dtype::F64.bounds();
        assert!((upper * 100.0).is_finite());
    }

    #[test]
    fn test_parse_dtype() {
        assert_eq!("u8".parse::<Dtype>().unwrap(), Dtype::U8);
        assert_eq!("F64".parse::<Dtype>().unwrap(), Dtype::F64);
        assert!(matches!(
            "u64".parse::<Dtype>(),
            Err(ConfigError::UnknownDtype(name)) if name == "u64"
        ));
    }

    #[test]
    fn test_from_f64_saturates() {
        assert_eq!(u8::from_f64(300.0), 255);
        assert_eq!(u8::from_f64(-4.0), 0);
        assert_eq!(i8::from_f64(-128.0), -127);
        assert_eq!(i16::from_f64(f64::NAN), 0);
        assert_eq!(f32::from_f64(f64::INFINITY), Dtype::F32.bounds().1 as f32);
        assert_eq!(i8::MIN.clamp_to_kind(), -127);
    }

    #[test]
    fn test_sample_within_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = u16::sample(&mut rng, 10.0, 20.0);
            assert!((10..=20).contains(&v));
            let f = f64::sample(&mut rng, -1.5, 2.5);
            assert!((-1.5..=2.5).contains(&f));
        }
        assert_eq!(i32::sample(&mut rng, 3.0, 3.0), 3);
    }

    #[test]
    fn test_zeroed_buffer() {
        let buffer = zeroed::<i16>(12);
        assert_eq!(buffer.len(), 12);
        assert!(buffer.iter().all(|&v| v == 0));
    }
}

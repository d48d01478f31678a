//! The process-wide numeric configuration of float domains.
//!
//! The configuration is installed at most once, before any model is built. Reading it before it
//! was configured fixes the defaults for the remainder of the process.
use once_cell::sync::OnceCell;
use thiserror::Error;

static FLOAT_PRECISION: OnceCell<FloatPrecision> = OnceCell::new();

/// Governs when a float variable counts as ground and how coarse the grid is onto which float
/// bounds are rounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatPrecision {
    /// A float domain whose width is at most `precision * max(1, |bound|)` is considered ground.
    /// Narrowings which improve a bound by less than this relative amount are ignored.
    pub precision: f64,
    /// The number of low mantissa bits that are cleared when a bound is rounded. With `0` every
    /// double is a representable bound.
    pub rounding_bits: u32,
}

impl FloatPrecision {
    /// The largest supported value for [`FloatPrecision::rounding_bits`].
    pub const MAX_ROUNDING_BITS: u32 = 32;
}

impl Default for FloatPrecision {
    fn default() -> Self {
        Self {
            precision: 1e-10,
            rounding_bits: 0,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum PrecisionError {
    #[error("the float precision was already configured or has been read")]
    AlreadyConfigured,
    #[error("the precision must be a positive finite number, got {0}")]
    InvalidPrecision(f64),
    #[error("at most {max} rounding bits are supported, got {0}", max = FloatPrecision::MAX_ROUNDING_BITS)]
    InvalidRoundingBits(u32),
}

/// Install the global float precision. This should happen before any model is built; it fails
/// if a precision was configured before or the defaults were already observed.
pub fn configure_float_precision(precision: FloatPrecision) -> Result<(), PrecisionError> {
    if !precision.precision.is_finite() || precision.precision <= 0.0 {
        return Err(PrecisionError::InvalidPrecision(precision.precision));
    }
    if precision.rounding_bits > FloatPrecision::MAX_ROUNDING_BITS {
        return Err(PrecisionError::InvalidRoundingBits(
            precision.rounding_bits,
        ));
    }

    FLOAT_PRECISION
        .set(precision)
        .map_err(|_| PrecisionError::AlreadyConfigured)?;
    log::debug!("Configured float precision {precision:?}");
    Ok(())
}

/// The active float precision.
pub fn float_precision() -> FloatPrecision {
    *FLOAT_PRECISION.get_or_init(FloatPrecision::default)
}

/// Whether an interval of the given bounds is narrow enough to count as a single value.
pub(crate) fn is_within_precision(lower: f64, upper: f64) -> bool {
    if lower == upper {
        return true;
    }
    if !lower.is_finite() || !upper.is_finite() {
        return false;
    }
    let magnitude = lower.abs().max(upper.abs()).max(1.0);
    upper - lower <= float_precision().precision * magnitude
}

use std::{error::Error, fmt::Display, ops::RangeInclusive};

/// This type gets used to be our catch all error.
/// Precondition violations of the segment tree get their own variants,
/// everything else is funneled through the generic ones.
#[derive(Debug)]
pub enum SegError {
    /// A query or update range with `left > right`, or reaching outside of `borders`.
    InvalidRange {
        /// Requested left end (inclusive).
        left: i64,
        /// Requested right end (inclusive).
        right: i64,
        /// The range the tree was built for.
        borders: RangeInclusive<i64>,
    },
    /// A tree was requested over `[left_bound, right_bound]` with `left_bound > right_bound`.
    InvalidBorders {
        /// Requested left border.
        left_bound: i64,
        /// Requested right border.
        right_bound: i64,
    },
    /// Bulk construction from an empty sequence.
    EmptyInput,
    /// The number of points can neither be allocated for nor represented in the value type.
    RangeTooLarge {
        /// Number of points in the requested range.
        points: u128,
    },
    /// Allows a generic Error message.
    StringError(String),
    /// Anticipated errors, may be rethrown with an additional error message
    RethrowError(String, Box<dyn Error>),
    /// All other library Errors get converted to this error.
    OtherError(Box<dyn Error>),
}

/// This type is our goto Result, as it allows us to convert between many different errors.
pub type SegResult<O> = Result<O, SegError>;

impl Display for SegError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegError::InvalidRange {
                left,
                right,
                borders,
            } => write!(
                f,
                "invalid range [{}, {}] for a tree over [{}, {}]",
                left,
                right,
                borders.start(),
                borders.end()
            ),
            SegError::InvalidBorders {
                left_bound,
                right_bound,
            } => write!(
                f,
                "left border {} is greater than right border {}",
                left_bound, right_bound
            ),
            SegError::EmptyInput => "cannot build a segment tree from an empty sequence".fmt(f),
            SegError::RangeTooLarge { points } => {
                write!(f, "a range of {} points is too large", points)
            }
            SegError::StringError(str) => str.fmt(f),
            SegError::RethrowError(str, err) => {
                str.fmt(f)?;
                " with: ".fmt(f)?;
                err.fmt(f)?;
                Ok(())
            }
            SegError::OtherError(err) => err.fmt(f),
        }
    }
}
impl Error for SegError {}

impl SegError {
    /// Allows to annotate a SegError with a to better detect the origin of errors.
    /// # Usage
    /// ```
    /// # use common::{SegError, SegResult};
    /// # fn fallible_function() -> SegResult<()> {
    /// # Err(SegError::EmptyInput)
    /// # }
    /// # fn container_function() -> SegResult<()> {
    /// fallible_function().map_err(SegError::rethrow_with("function failed"))?;
    /// # Ok(())
    /// # }
    /// let err = container_function().unwrap_err();
    /// assert!(err.to_string().starts_with("function failed with: "));
    /// ```
    pub fn rethrow_with(str: &'static str) -> impl Fn(SegError) -> SegError {
        move |err| SegError::RethrowError(str.to_string(), Box::new(err))
    }
}

macro_rules! implement_from {
    ($type:ty) => {
        impl From<$type> for SegError {
            fn from(other: $type) -> Self {
                SegError::OtherError(Box::from(other))
            }
        }
    };
}
implement_from!(std::io::Error);
implement_from!(flexi_logger::FlexiLoggerError);

impl<'a> From<&'a str> for SegError {
    fn from(other: &'a str) -> Self {
        SegError::StringError(other.to_string())
    }
}
impl From<String> for SegError {
    fn from(other: String) -> Self {
        SegError::StringError(other)
    }
}

use thiserror::Error;

/// Errors reported when validating input images and parameters.
///
/// Every public entry point validates its arguments before touching any pixel, so no partial
/// result is ever produced.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// A bandwidth, tolerance or step count is out of its valid range.
    #[error("invalid parameter `{name}` = {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    /// Image has zero width or zero height.
    #[error("image has no pixels")]
    EmptyInput,
    /// Channel grids do not agree on their `(width, height)`.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// Flat buffer holds a different number of elements than its dimensions require.
    #[error("buffer length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    /// Number of pixels does not fit the label representation.
    #[error("{0} pixels can't be labeled with 32-bit labels")]
    TooManyPixels(usize),
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn error_display_test() {
        let err = Error::InvalidParameter {
            name: "color_bandwidth",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "invalid parameter `color_bandwidth` = -1");
        let err = Error::ShapeMismatch {
            expected: (4, 4),
            actual: (4, 3),
        };
        assert_eq!(
            err.to_string(),
            "shape mismatch: expected (4, 4), got (4, 3)"
        );
        assert_eq!(Error::EmptyInput.to_string(), "image has no pixels");
        let err = Error::LengthMismatch {
            expected: 12,
            actual: 11,
        };
        assert_eq!(
            err.to_string(),
            "buffer length mismatch: expected 12 elements, got 11"
        );
    }
}

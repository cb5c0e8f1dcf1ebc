//! Allocation caps.
//!
//! [`ResourceLimits`] bounds what a single [`Bitmap`](crate::Bitmap)
//! allocation may request. Shape caps are checked before the block is
//! sized; the block cap is checked once the size calculator has run. Both
//! happen before any memory is touched.

/// Caps applied by [`Bitmap::allocate`](crate::Bitmap::allocate) and
/// [`Bitmap::wrap_external`](crate::Bitmap::wrap_external).
///
/// `None` leaves a resource unbounded. The default bounds nothing.
///
/// # Example
///
/// ```
/// use zenraster::{Bitmap, BitmapDesc, BitmapError, ResourceLimits};
///
/// let limits = ResourceLimits::none()
///     .with_max_pixels(1 << 20)
///     .with_max_block_bytes(4 << 20);
/// let desc = BitmapDesc::new(4096, 4096, 24).with_limits(limits);
/// assert!(matches!(Bitmap::allocate(&desc), Err(BitmapError::Limit(_))));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResourceLimits {
    /// Widest accepted bitmap, in pixels.
    pub max_width: Option<u32>,
    /// Tallest accepted bitmap, in pixels.
    pub max_height: Option<u32>,
    /// Largest accepted `width * height`.
    pub max_pixels: Option<u64>,
    /// Largest accepted block, as sized by the size calculator.
    pub max_block_bytes: Option<u64>,
}

impl ResourceLimits {
    /// Bound nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Cap the width.
    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Cap the height.
    pub fn with_max_height(mut self, height: u32) -> Self {
        self.max_height = Some(height);
        self
    }

    /// Cap the pixel count.
    pub fn with_max_pixels(mut self, pixels: u64) -> Self {
        self.max_pixels = Some(pixels);
        self
    }

    /// Cap the block size.
    pub fn with_max_block_bytes(mut self, bytes: u64) -> Self {
        self.max_block_bytes = Some(bytes);
        self
    }

    /// Whether any cap is set.
    pub fn is_bounded(&self) -> bool {
        *self != Self::default()
    }

    /// Check width, height and pixel count.
    pub fn check_shape(&self, width: u32, height: u32) -> Result<(), LimitExceeded> {
        exceeds(width, self.max_width).map_or(Ok(()), |max| {
            Err(LimitExceeded::Width { actual: width, max })
        })?;
        exceeds(height, self.max_height).map_or(Ok(()), |max| {
            Err(LimitExceeded::Height {
                actual: height,
                max,
            })
        })?;
        let pixels = u64::from(width) * u64::from(height);
        exceeds(pixels, self.max_pixels).map_or(Ok(()), |max| {
            Err(LimitExceeded::Pixels {
                actual: pixels,
                max,
            })
        })
    }

    /// Check a computed block size.
    pub fn check_block(&self, bytes: u64) -> Result<(), LimitExceeded> {
        match exceeds(bytes, self.max_block_bytes) {
            Some(max) => Err(LimitExceeded::BlockSize { actual: bytes, max }),
            None => Ok(()),
        }
    }
}

/// The cap `value` is over, if any.
fn exceeds<T: PartialOrd + Copy>(value: T, cap: Option<T>) -> Option<T> {
    cap.filter(|&max| value > max)
}

/// A [`ResourceLimits`] cap rejected an allocation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum LimitExceeded {
    /// Width over `max_width`.
    #[error("bitmap width {actual} is over the cap of {max}")]
    Width {
        /// Requested width.
        actual: u32,
        /// Cap.
        max: u32,
    },
    /// Height over `max_height`.
    #[error("bitmap height {actual} is over the cap of {max}")]
    Height {
        /// Requested height.
        actual: u32,
        /// Cap.
        max: u32,
    },
    /// Pixel count over `max_pixels`.
    #[error("bitmap of {actual} pixels is over the cap of {max}")]
    Pixels {
        /// Requested `width * height`.
        actual: u64,
        /// Cap.
        max: u64,
    },
    /// Block size over `max_block_bytes`.
    #[error("bitmap block of {actual} bytes is over the cap of {max}")]
    BlockSize {
        /// Computed block size.
        actual: u64,
        /// Cap.
        max: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn unbounded_by_default() {
        let limits = ResourceLimits::none();
        assert!(!limits.is_bounded());
        assert!(limits.check_shape(u32::MAX, u32::MAX).is_ok());
        assert!(limits.check_block(u64::MAX).is_ok());
    }

    #[test]
    fn any_cap_bounds() {
        assert!(ResourceLimits::none().with_max_height(1).is_bounded());
        assert!(ResourceLimits::none().with_max_block_bytes(1).is_bounded());
    }

    #[test]
    fn shape_caps_are_inclusive() {
        let limits = ResourceLimits::none()
            .with_max_width(640)
            .with_max_height(480)
            .with_max_pixels(640 * 480);
        assert!(limits.check_shape(640, 480).is_ok());
        assert_eq!(
            limits.check_shape(641, 1),
            Err(LimitExceeded::Width {
                actual: 641,
                max: 640
            })
        );
        assert_eq!(
            limits.check_shape(1, 481),
            Err(LimitExceeded::Height {
                actual: 481,
                max: 480
            })
        );
    }

    #[test]
    fn pixel_cap_uses_wide_product() {
        let limits = ResourceLimits::none().with_max_pixels(u32::MAX as u64);
        assert_eq!(
            limits.check_shape(70_000, 70_000),
            Err(LimitExceeded::Pixels {
                actual: 4_900_000_000,
                max: u32::MAX as u64
            })
        );
    }

    #[test]
    fn block_cap() {
        let limits = ResourceLimits::none().with_max_block_bytes(4096);
        assert!(limits.check_block(4096).is_ok());
        assert_eq!(
            limits.check_block(4097),
            Err(LimitExceeded::BlockSize {
                actual: 4097,
                max: 4096
            })
        );
    }

    #[test]
    fn messages() {
        let err = LimitExceeded::BlockSize {
            actual: 10,
            max: 5,
        };
        assert_eq!(err.to_string(), "bitmap block of 10 bytes is over the cap of 5");
    }
}

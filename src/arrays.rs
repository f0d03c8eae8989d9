use crate::common::ThreadingStrategy;
use crate::error::Error;
use crate::working_space::pixel_to_working;
use aligned_vec::{AVec, ConstAlign};
use rayon::prelude::*;
use std::ops::{Index, IndexMut};

const ALIGN: usize = 64;

/// Dense row-major grid indexed by `(x, y)`, that is `(column, row)`.
#[derive(Debug)]
pub struct Array2D<T> {
    pub data: AVec<T, ConstAlign<ALIGN>>,
    pub width: usize,
    pub height: usize,
}

impl<T> Array2D<T> {
    pub fn from_slice(data: &[T], width: usize, height: usize) -> Result<Self, Error>
    where
        T: Clone,
    {
        if width == 0 || height == 0 {
            return Err(Error::EmptyInput);
        }
        if data.len() != width * height {
            return Err(Error::LengthMismatch {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data: AVec::from_slice(ALIGN, data),
        })
    }

    pub fn from_fill(value: T, width: usize, height: usize) -> Self
    where
        T: Clone + Copy,
    {
        let data: AVec<T, ConstAlign<ALIGN>> =
            AVec::from_iter(ALIGN, (0..width * height).map(|_| value));
        Self {
            width,
            height,
            data,
        }
    }

    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.data.fill(value)
    }

    /// Same as [`Array2D::fill`], every row is written by a different rayon task.
    pub fn par_fill(&mut self, value: T)
    where
        T: Copy + Send + Sync,
    {
        self.data
            .par_chunks_mut(self.width)
            .for_each(|row| row.fill(value));
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn get_row(&self, row: usize) -> &[T] {
        debug_assert!(row < self.height);
        &self.data[(self.width * row)..(self.width * row + self.width)]
    }

    #[inline(always)]
    pub fn get_index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            self.width > x,
            "Index ({x}, {y}) is out of bounds ({}, {})",
            self.width,
            self.height
        );
        debug_assert!(
            self.height > y,
            "Index ({x}, {y}) is out of bounds ({}, {})",
            self.width,
            self.height
        );
        self.width * y + x
    }

    pub fn get_x_y_index(&self, ind: usize) -> (usize, usize) {
        debug_assert!(ind < self.data.len());
        (ind % self.width, ind / self.width)
    }
}

impl<T> Index<(usize, usize)> for Array2D<T> {
    type Output = T;
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.data[self.get_index(x, y)]
    }
}

impl<T> IndexMut<(usize, usize)> for Array2D<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        let idx = self.get_index(x, y);
        &mut self.data[idx]
    }
}

/// 8-bit 3-channel image, packed (3 bytes per pixel) in row-major order.
///
/// The channel order is whatever the caller supplies. The first channel is treated as the
/// lightness-like one by [`crate::working_space`].
#[derive(Debug)]
pub struct ChannelImage {
    pub data: AVec<u8, ConstAlign<ALIGN>>,
    pub width: usize,
    pub height: usize,
}

impl ChannelImage {
    pub const CHANNELS: usize = 3;

    /// Merges three equally sized channel grids.
    pub fn from_channels(
        c0: &Array2D<u8>,
        c1: &Array2D<u8>,
        c2: &Array2D<u8>,
    ) -> Result<Self, Error> {
        let expected = c0.dimensions();
        for channel in [c1, c2] {
            if channel.dimensions() != expected {
                return Err(Error::ShapeMismatch {
                    expected,
                    actual: channel.dimensions(),
                });
            }
        }
        let (width, height) = expected;
        if width == 0 || height == 0 {
            return Err(Error::EmptyInput);
        }
        let packed = c0
            .data
            .iter()
            .zip(c1.data.iter())
            .zip(c2.data.iter())
            .flat_map(|((v0, v1), v2)| [*v0, *v1, *v2]);
        Ok(Self {
            width,
            height,
            data: AVec::from_iter(ALIGN, packed),
        })
    }

    /// Copies packed pixels (e.g. RGB24 as produced by the `image` crate).
    pub fn from_interleaved(data: &[u8], width: usize, height: usize) -> Result<Self, Error> {
        let image = Self {
            width,
            height,
            data: AVec::from_slice(ALIGN, data),
        };
        image.validate()?;
        Ok(image)
    }

    /// Image of a single color.
    pub fn from_fill(color: [u8; 3], width: usize, height: usize) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyInput);
        }
        Ok(Self {
            width,
            height,
            data: AVec::from_iter(ALIGN, (0..width * height).flat_map(|_| color)),
        })
    }

    /// Zeroed image, only for outputs of already validated dimensions.
    pub(crate) fn zeroed(width: usize, height: usize) -> Self {
        debug_assert!(width > 0 && height > 0);
        Self {
            width,
            height,
            data: AVec::from_iter(ALIGN, (0..width * height * Self::CHANNELS).map(|_| 0u8)),
        }
    }

    /// Splits the image back into its three channel grids.
    pub fn to_channels(&self) -> [Array2D<u8>; 3] {
        std::array::from_fn(|c| Array2D {
            width: self.width,
            height: self.height,
            data: AVec::from_iter(
                ALIGN,
                self.data.iter().skip(c).step_by(Self::CHANNELS).copied(),
            ),
        })
    }

    /// Checks that the image has pixels and that the buffer matches `width * height * 3`.
    ///
    /// The fields are public, so the algorithms call this on entry instead of trusting the
    /// constructors.
    pub fn validate(&self) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::EmptyInput);
        }
        let expected = self
            .width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(Self::CHANNELS))
            .ok_or(Error::TooManyPixels(usize::MAX))?;
        if self.data.len() != expected {
            return Err(Error::LengthMismatch {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline(always)]
    pub fn row_len(&self) -> usize {
        self.width * Self::CHANNELS
    }

    #[inline(always)]
    pub fn get_row(&self, row: usize) -> &[u8] {
        debug_assert!(row < self.height);
        &self.data[(self.row_len() * row)..(self.row_len() * row + self.row_len())]
    }

    #[inline(always)]
    pub fn get_index(&self, x: usize, y: usize) -> usize {
        debug_assert!(self.width > x);
        debug_assert!(self.height > y);
        (self.width * y + x) * Self::CHANNELS
    }

    #[inline(always)]
    pub fn get_pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = self.get_index(x, y);
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    #[inline(always)]
    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: [u8; 3]) {
        let idx = self.get_index(x, y);
        self.data[idx..idx + Self::CHANNELS].copy_from_slice(&pixel);
    }

    /// Converts every pixel into the working color space.
    pub fn to_working(&self, strategy: ThreadingStrategy) -> Array2D<[f32; 3]> {
        let mut working = Array2D::from_fill([0f32; 3], self.width, self.height);
        let row_len = self.row_len();
        match strategy {
            ThreadingStrategy::SingleThread => working
                .data
                .chunks_mut(self.width)
                .zip(self.data.chunks(row_len))
                .for_each(|(out, row)| convert_row(out, row)),
            ThreadingStrategy::RowBased => working
                .data
                .par_chunks_mut(self.width)
                .zip(self.data.par_chunks(row_len))
                .for_each(|(out, row)| convert_row(out, row)),
        }
        working
    }
}

impl PartialEq for ChannelImage {
    fn eq(&self, other: &Self) -> bool {
        self.dimensions() == other.dimensions() && self.data.as_slice() == other.data.as_slice()
    }
}

#[inline(always)]
fn convert_row(out: &mut [[f32; 3]], row: &[u8]) {
    for (color, pixel) in out.iter_mut().zip(row.chunks_exact(ChannelImage::CHANNELS)) {
        *color = pixel_to_working(pixel);
    }
}

impl Index<(usize, usize)> for ChannelImage {
    type Output = [u8];
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        let idx = self.get_index(x, y);
        &self.data[idx..idx + Self::CHANNELS]
    }
}

#[cfg(test)]
mod tests {
    use super::{Array2D, ChannelImage, ALIGN};
    use crate::common::ThreadingStrategy;
    use crate::error::Error;
    use aligned_vec::AVec;

    fn channel(width: usize, height: usize, f: impl Fn(usize, usize) -> u8) -> Array2D<u8> {
        let data: Vec<u8> = (0..width * height).map(|i| f(i % width, i / width)).collect();
        Array2D::from_slice(&data, width, height).unwrap()
    }

    #[test]
    fn array2d_index_test() {
        let mut arr = Array2D::from_fill(0u32, 5, 3);
        arr[(4, 2)] = 7;
        assert_eq!(arr.data[14], 7);
        assert_eq!(arr.get_row(2), &[0, 0, 0, 0, 7]);
        assert_eq!((4, 2), arr.get_x_y_index(arr.get_index(4, 2)));
        arr.par_fill(u32::MAX);
        assert!(arr.data.iter().all(|v| *v == u32::MAX));
    }

    #[test]
    fn array2d_from_slice_errors() {
        assert_eq!(
            Array2D::from_slice(&[0u8; 5], 2, 3).unwrap_err(),
            Error::LengthMismatch {
                expected: 6,
                actual: 5
            }
        );
        assert_eq!(
            Array2D::<u8>::from_slice(&[], 0, 3).unwrap_err(),
            Error::EmptyInput
        );
    }

    #[test]
    fn channels_round_trip() {
        let c0 = channel(4, 3, |x, y| (x + 10 * y) as u8);
        let c1 = channel(4, 3, |x, _| x as u8 * 2);
        let c2 = channel(4, 3, |_, y| 255 - y as u8);
        let image = ChannelImage::from_channels(&c0, &c1, &c2).unwrap();
        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(image.get_pixel(3, 2), [23, 6, 253]);
        assert_eq!(&image[(1, 0)], &[1, 2, 255]);
        let [d0, d1, d2] = image.to_channels();
        assert_eq!(d0.data.as_slice(), c0.data.as_slice());
        assert_eq!(d1.data.as_slice(), c1.data.as_slice());
        assert_eq!(d2.data.as_slice(), c2.data.as_slice());
    }

    #[test]
    fn channels_shape_mismatch() {
        let c0 = channel(4, 4, |_, _| 0);
        let c1 = channel(4, 4, |_, _| 0);
        let c2 = channel(4, 3, |_, _| 0);
        assert_eq!(
            ChannelImage::from_channels(&c0, &c1, &c2).unwrap_err(),
            Error::ShapeMismatch {
                expected: (4, 4),
                actual: (4, 3)
            }
        );
        let t = channel(3, 4, |_, _| 0);
        assert!(matches!(
            ChannelImage::from_channels(&c2, &t, &c2),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn interleaved_and_fill_test() {
        assert_eq!(
            ChannelImage::from_interleaved(&[0u8; 11], 2, 2).unwrap_err(),
            Error::LengthMismatch {
                expected: 12,
                actual: 11
            }
        );
        assert_eq!(
            ChannelImage::from_interleaved(&[], 0, 0).unwrap_err(),
            Error::EmptyInput
        );
        assert_eq!(
            ChannelImage::from_fill([1, 2, 3], 3, 0).unwrap_err(),
            Error::EmptyInput
        );
        let mut image = ChannelImage::from_fill([1, 2, 3], 3, 2).unwrap();
        assert_eq!(image.data.len(), 18);
        image.set_pixel(2, 1, [9, 8, 7]);
        assert_eq!(image.get_row(1), &[1, 2, 3, 1, 2, 3, 9, 8, 7]);
        let packed: Vec<u8> = image.data.to_vec();
        assert_eq!(ChannelImage::from_interleaved(&packed, 3, 2).unwrap(), image);
    }

    #[test]
    fn validate_checks_public_fields() {
        let empty = ChannelImage {
            data: AVec::new(ALIGN),
            width: 0,
            height: 0,
        };
        assert_eq!(empty.validate(), Err(Error::EmptyInput));
        let short = ChannelImage {
            data: AVec::from_slice(ALIGN, &[0u8; 9]),
            width: 2,
            height: 2,
        };
        assert_eq!(
            short.validate(),
            Err(Error::LengthMismatch {
                expected: 12,
                actual: 9
            })
        );
        let ok = ChannelImage::from_fill([5, 6, 7], 2, 2).unwrap();
        assert_eq!(ok.validate(), Ok(()));
    }

    #[test]
    fn to_working_strategies_agree() {
        let c0 = channel(17, 9, |x, y| (x * 13 + y * 7) as u8);
        let c1 = channel(17, 9, |x, y| (x * y) as u8);
        let c2 = channel(17, 9, |x, _| 255 - x as u8);
        let image = ChannelImage::from_channels(&c0, &c1, &c2).unwrap();
        let single = image.to_working(ThreadingStrategy::SingleThread);
        let rows = image.to_working(ThreadingStrategy::RowBased);
        assert_eq!(single.data.as_slice(), rows.data.as_slice());
        assert_eq!(single[(0, 0)], [0.0, -128.0, 127.0]);
    }
}

use crate::arrays::{Array2D, ChannelImage};
use crate::common::{Config, ThreadingStrategy};
use crate::error::Error;
use crate::point::SamplePoint;
use crate::working_space::working_to_pixel;
use log::debug;
use multiversion::multiversion;
use rayon::prelude::*;
use std::ops::Range;

/// Search window of one pixel: half-open row and column ranges clipped to the image.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl Window {
    /// Box `[row - radius, row + radius) x [col - radius, col + radius)` clipped to
    /// `width x height`. The upper bound is exclusive, so the box is not centered.
    ///
    /// Both bounds saturate, any radius at least as large as the image covers all of it.
    pub fn around(row: usize, col: usize, radius: usize, width: usize, height: usize) -> Self {
        Self {
            rows: row.saturating_sub(radius)..row.saturating_add(radius).min(height),
            cols: col.saturating_sub(radius)..col.saturating_add(radius).min(width),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len() * self.cols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of the mean-shift iteration of one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence {
    /// Last mean. Only its color is written to the output.
    pub point: SamplePoint,
    /// Number of mean-shift steps done, between 1 and `max_convergence_steps`.
    pub steps: u16,
}

/// Runs the mean-shift iteration for the pixel at `(row, col)`.
///
/// The window stays around the starting pixel for all steps. Every step averages the window
/// members whose color is closer than `color_bandwidth` to the current mean. The loop runs at
/// least once and stops when the color shift or the spatial shift of the mean is not above its
/// tolerance, or after `max_convergence_steps` steps.
///
/// `config` must be validated (see [`Config::validate_filter`]).
#[multiversion(targets = "simd")]
pub fn converge_pixel(
    working: &Array2D<[f32; 3]>,
    row: usize,
    col: usize,
    config: &Config,
) -> Convergence {
    let window = Window::around(
        row,
        col,
        config.window_radius(),
        working.width,
        working.height,
    );
    debug_assert!(window.rows.contains(&row) && window.cols.contains(&col));
    let mut current = SamplePoint::from_working(row, col, working[(col, row)]);
    let mut previous = SamplePoint::default();
    let mut steps: u16 = 0;
    loop {
        previous.copy_from(&current);
        let mut sum = SamplePoint::zero();
        let mut num_points: u32 = 0;
        for y in window.rows.clone() {
            let colors = &working.get_row(y)[window.cols.clone()];
            for (x, color) in (window.cols.start..).zip(colors) {
                let sample = SamplePoint::from_working(y, x, *color);
                if sample.color_distance(&current) < config.color_bandwidth {
                    sum.accumulate(&sample);
                    num_points += 1;
                }
            }
        }
        steps += 1;
        if num_points == 0 {
            break;
        }
        sum.scale(1f32 / num_points as f32);
        current.copy_from(&sum);
        let moving = current.color_distance(&previous) > config.color_tolerance
            && current.spatial_distance(&previous) > config.spatial_tolerance;
        if !moving || steps >= config.max_convergence_steps {
            break;
        }
    }
    Convergence {
        point: current,
        steps,
    }
}

fn filter_row(working: &Array2D<[f32; 3]>, row: usize, output_row: &mut [u8], config: &Config) {
    for (col, pixel) in output_row
        .chunks_exact_mut(ChannelImage::CHANNELS)
        .enumerate()
    {
        let converged = converge_pixel(working, row, col, config);
        pixel.copy_from_slice(&working_to_pixel(converged.point.color()));
    }
}

/// Mean-shift filtering (edge-preserving smoothing).
///
/// Every pixel is replaced by the color its mean-shift iteration converges to. Pixels are
/// independent of each other: all of them read the same snapshot of `image` and write only their
/// own output pixel.
///
/// Rejects invalid bandwidths with [`Error::InvalidParameter`], and an empty or inconsistent
/// image with [`Error::EmptyInput`] or [`Error::LengthMismatch`], before reading any pixel.
pub fn mean_shift_filter(image: &ChannelImage, config: &Config) -> Result<ChannelImage, Error> {
    config.validate_filter()?;
    image.validate()?;
    debug!(
        "mean-shift filter {}x{}: hs={} hr={} max_steps={} ({:?})",
        image.width,
        image.height,
        config.spatial_bandwidth,
        config.color_bandwidth,
        config.max_convergence_steps,
        config.threading_strategy
    );
    let working = image.to_working(config.threading_strategy);
    let mut output = ChannelImage::zeroed(image.width, image.height);
    let row_len = output.row_len();
    match config.threading_strategy {
        ThreadingStrategy::SingleThread => output
            .data
            .chunks_mut(row_len)
            .enumerate()
            .for_each(|(row, output_row)| filter_row(&working, row, output_row, config)),
        ThreadingStrategy::RowBased => output
            .data
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(row, output_row)| filter_row(&working, row, output_row, config)),
    }
    Ok(output)
}

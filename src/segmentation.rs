use crate::arrays::{Array2D, ChannelImage};
use crate::common::{Config, ThreadingStrategy};
use crate::error::Error;
use crate::filter::mean_shift_filter;
use crate::point::color_distance;
use crate::region::Region;
use assume::assume;
use log::{debug, trace, warn};
use rayon::prelude::*;

/// Label of a pixel not yet claimed by any region.
pub const UNLABELED: u32 = u32::MAX;

/// 8-connected neighborhood as `(dx, dy)`.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Result of [`segment`].
#[derive(Debug)]
pub struct Segmentation {
    /// Every pixel recolored to the mode of its region.
    pub image: ChannelImage,
    /// Label of every pixel, `0..num_segments()`.
    pub labels: Array2D<u32>,
    /// Region table, `regions[label].label == label`.
    pub regions: Vec<Region>,
}

impl Segmentation {
    pub fn num_segments(&self) -> usize {
        self.regions.len()
    }

    /// Region the pixel at `(x, y)` belongs to.
    pub fn region_at(&self, x: usize, y: usize) -> &Region {
        &self.regions[self.labels[(x, y)] as usize]
    }
}

fn check_label_capacity(num_pixels: usize) -> Result<(), Error> {
    if num_pixels as u64 >= UNLABELED as u64 {
        warn!("rejecting image with {num_pixels} pixels");
        return Err(Error::TooManyPixels(num_pixels));
    }
    Ok(())
}

/// Splits the image into regions by growing them from seeds.
///
/// Pixels are scanned in row-major order and every unlabeled pixel starts a new region with the
/// next label. The region then grows over 8-connected unlabeled pixels whose color is closer
/// than `color_bandwidth` to the color of the seed. The seed color stays the reference for the
/// whole growth, similarity is not chained through members. Labels are therefore assigned in
/// the order the seeds are found.
///
/// This pass is sequential. Only the initialization of the label grid uses
/// `config.threading_strategy`.
///
/// `image` must pass [`ChannelImage::validate`], [`segment`] checks it.
pub fn label_regions(image: &ChannelImage, config: &Config) -> (Array2D<u32>, Vec<Region>) {
    debug_assert!(image.validate().is_ok());
    let (width, height) = image.dimensions();
    let working = image.to_working(config.threading_strategy);
    let mut labels = Array2D::from_fill(0u32, width, height);
    match config.threading_strategy {
        ThreadingStrategy::SingleThread => labels.fill(UNLABELED),
        ThreadingStrategy::RowBased => labels.par_fill(UNLABELED),
    }
    let mut regions: Vec<Region> = Vec::new();
    let mut pending: Vec<(usize, usize)> = Vec::new();
    let mut next_label: u32 = 0;
    for y in 0..height {
        for x in 0..width {
            if labels[(x, y)] != UNLABELED {
                continue;
            }
            let label = next_label;
            next_label += 1;
            labels[(x, y)] = label;
            let mut region = Region::seed(label, x, y, working[(x, y)]);
            pending.push((x, y));
            while let Some((px, py)) = pending.pop() {
                for (dx, dy) in NEIGHBOR_OFFSETS {
                    let (Some(nx), Some(ny)) = (px.checked_add_signed(dx), py.checked_add_signed(dy))
                    else {
                        continue;
                    };
                    if nx >= width || ny >= height {
                        continue;
                    }
                    let idx = labels.get_index(nx, ny);
                    assume!(unsafe: idx < labels.data.len());
                    assume!(unsafe: idx < working.data.len());
                    if labels.data[idx] != UNLABELED {
                        continue;
                    }
                    let color = working.data[idx];
                    if color_distance(color, region.anchor) < config.color_bandwidth {
                        labels.data[idx] = label;
                        region.add_member(color);
                        pending.push((nx, ny));
                    }
                }
            }
            region.finalize();
            trace!(
                "region {label}: seed ({x}, {y}), {} members",
                region.num_members
            );
            regions.push(region);
        }
    }
    debug_assert!(labels.data.iter().all(|l| *l != UNLABELED));
    (labels, regions)
}

fn recolor_row(output_row: &mut [u8], row_labels: &[u32], palette: &[[u8; 3]]) {
    for (pixel, label) in output_row
        .chunks_exact_mut(ChannelImage::CHANNELS)
        .zip(row_labels)
    {
        pixel.copy_from_slice(&palette[*label as usize]);
    }
}

/// Paints every pixel with the mode of its region.
pub fn recolor(labels: &Array2D<u32>, regions: &[Region], strategy: ThreadingStrategy) -> ChannelImage {
    let palette: Vec<[u8; 3]> = regions.iter().map(Region::mode_pixel).collect();
    let mut output = ChannelImage::zeroed(labels.width, labels.height);
    let row_len = output.row_len();
    match strategy {
        ThreadingStrategy::SingleThread => output
            .data
            .chunks_mut(row_len)
            .zip(labels.data.chunks(labels.width))
            .for_each(|(output_row, row_labels)| recolor_row(output_row, row_labels, &palette)),
        ThreadingStrategy::RowBased => output
            .data
            .par_chunks_mut(row_len)
            .zip(labels.data.par_chunks(labels.width))
            .for_each(|(output_row, row_labels)| recolor_row(output_row, row_labels, &palette)),
    }
    output
}

/// Segments an (already filtered) image.
///
/// Runs [`label_regions`] and [`recolor`]. Only `color_bandwidth` and `threading_strategy` of the
/// config are used.
pub fn segment(image: &ChannelImage, config: &Config) -> Result<Segmentation, Error> {
    config.validate_segment()?;
    image.validate()?;
    check_label_capacity(image.num_pixels())?;
    debug!(
        "segmentation {}x{}: hr={} ({:?})",
        image.width, image.height, config.color_bandwidth, config.threading_strategy
    );
    let (labels, regions) = label_regions(image, config);
    let recolored = recolor(&labels, &regions, config.threading_strategy);
    debug!("segmentation found {} regions", regions.len());
    Ok(Segmentation {
        image: recolored,
        labels,
        regions,
    })
}

/// Mean-shift segmentation: [`mean_shift_filter`] followed by [`segment`] of the smoothed image.
pub fn mean_shift_segmentation(
    image: &ChannelImage,
    config: &Config,
) -> Result<Segmentation, Error> {
    config.validate_filter()?;
    image.validate()?;
    check_label_capacity(image.num_pixels())?;
    let filtered = mean_shift_filter(image, config)?;
    segment(&filtered, config)
}

//! Mean-shift filtering and mean-shift segmentation in Rust.
//!
//! This crate provides edge-preserving smoothing of 3-channel 8-bit images (mean-shift
//! filtering) and unsupervised segmentation of the smoothed image into connected regions of
//! similar color (mean-shift segmentation). There is no training and no clustering step, the
//! result depends only on two bandwidths:
//!
//!  - `spatial_bandwidth` (_hs_): half-width of the square search window in pixels.
//!  - `color_bandwidth` (_hr_): color distance threshold in the working color space.
//!
//! All color distances are measured in a fixed affine remap of the input channels
//! (see [`working_space`]), not in real CIELAB.
//!
//! The following example describes how to segment an image in packed RGB24 (RGB 8bit) format
//! (default for image crate):
//!
//! ```rust
//! use mean_shift_rust::arrays::ChannelImage;
//! use mean_shift_rust::common::Config;
//! use mean_shift_rust::segmentation::mean_shift_segmentation;
//!
//! fn main() {
//!     // 16x8 image, left half dark red, right half light blue
//!     let (width, height) = (16usize, 8usize);
//!     let rgb: Vec<u8> = (0..width * height)
//!         .flat_map(|i| if i % width < 8 { [120, 20, 20] } else { [150, 200, 250] })
//!         .collect();
//!     let image = ChannelImage::from_interleaved(&rgb, width, height).unwrap();
//!     // window half-width 8 px, color threshold 20
//!     let config = Config::new(8.0, 20.0);
//!     let segmentation = mean_shift_segmentation(&image, &config).unwrap();
//!     assert_eq!(segmentation.num_segments(), 2);
//!     // every pixel is painted with the mode of its region
//!     let [r, g, b] = segmentation.image.to_channels();
//!     assert_eq!(r[(0, 0)], 120);
//!     assert_eq!((g[(15, 7)], b[(15, 7)]), (200, 250));
//! }
//! ```
//!
//! Filtering alone is [`filter::mean_shift_filter`], and [`segmentation::segment`] segments an
//! image that was already filtered (or any image). The data-parallel passes run on the rayon
//! global thread pool unless [`common::ThreadingStrategy::SingleThread`] is selected. Region
//! growing itself is always sequential.
//!
//! The crate logs through the `log` facade and never installs a logger.

pub mod arrays;
pub mod common;
pub mod error;
pub mod filter;
pub mod point;
pub mod region;
pub mod segmentation;
pub mod working_space;

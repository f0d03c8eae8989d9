//! Working color space used for every color distance in this crate.
//!
//! This is NOT CIELAB. It is a fixed affine remap of whatever three channels are supplied:
//!
//!  - L' = L * 100 / 255  (0..=100)
//!  - A' = A - 128        (-128..=127)
//!  - B' = B - 128        (-128..=127)
//!
//! Bandwidths and tolerances are calibrated against this remap, so replacing it with a real Lab
//! conversion changes the results.
use tables::{WORKING_AB_TBL, WORKING_L_TBL};

pub(crate) mod tables {
    use static_init::dynamic;
    #[dynamic(65535)]
    pub static WORKING_L_TBL: [f32; 256] =
        core::array::from_fn(|i| super::l_to_working(i as f32));
    #[dynamic(65535)]
    pub static WORKING_AB_TBL: [f32; 256] =
        core::array::from_fn(|i| super::ab_to_working(i as f32));
}

const L_RANGE: f32 = 100.0;
const CHANNEL_MAX: f32 = 255.0;
const AB_OFFSET: f32 = 128.0;

#[inline(always)]
fn l_to_working(l: f32) -> f32 {
    l * L_RANGE / CHANNEL_MAX
}

#[inline(always)]
fn ab_to_working(v: f32) -> f32 {
    v - AB_OFFSET
}

/// Forward transform of a raw channel triple into the working space.
#[inline(always)]
pub fn to_working(raw: [f32; 3]) -> [f32; 3] {
    [
        l_to_working(raw[0]),
        ab_to_working(raw[1]),
        ab_to_working(raw[2]),
    ]
}

/// Inverse of [`to_working`]. The result is not quantized.
#[inline(always)]
pub fn to_raw(working: [f32; 3]) -> [f32; 3] {
    [
        working[0] * CHANNEL_MAX / L_RANGE,
        working[1] + AB_OFFSET,
        working[2] + AB_OFFSET,
    ]
}

/// Forward transform of an 8-bit pixel (at least 3 bytes) using lookup tables.
///
/// Gives the same values as [`to_working`].
#[inline(always)]
pub fn pixel_to_working(pixel: &[u8]) -> [f32; 3] {
    debug_assert!(pixel.len() >= 3);
    unsafe {
        [
            WORKING_L_TBL[pixel[0] as usize],
            WORKING_AB_TBL[pixel[1] as usize],
            WORKING_AB_TBL[pixel[2] as usize],
        ]
    }
}

/// Round to nearest and saturate into the 8-bit channel range.
#[inline(always)]
pub fn quantize(raw: [f32; 3]) -> [u8; 3] {
    raw.map(|v| v.round().clamp(0.0, CHANNEL_MAX) as u8)
}

/// Inverse transform of a working-space color straight into an 8-bit pixel.
#[inline(always)]
pub fn working_to_pixel(working: [f32; 3]) -> [u8; 3] {
    quantize(to_raw(working))
}

use crate::error::Error;
use log::warn;

/// Changes between parallelization schemas of the data-parallel passes (filtering, label-grid
/// initialization and recoloring). Region growing is always single-threaded.
#[derive(Clone, PartialEq, Debug, Copy)]
pub enum ThreadingStrategy {
    /// No threading - used for correctness checks and very small images.
    SingleThread,
    /// Every output row is a separate rayon task. Rows are disjoint, so no synchronization is
    /// needed other than the end of the pass.
    ///
    /// This is the default.
    RowBased,
}

/// Main config for the processing.
///
/// Both bandwidths are in the units the algorithms measure in: `spatial_bandwidth` in pixels
/// and `color_bandwidth` in the working color space (see [`crate::working_space`]).
#[derive(Clone, Debug)]
pub struct Config {
    /// Half-width of the square search window (_hs_). Truncated to whole pixels, so it must be at
    /// least 1.
    ///
    /// The window is the half-open box `[i - hs, i + hs)` clipped to the image. There is no
    /// spatial kernel inside the window, every member is tested only by color.
    pub spatial_bandwidth: f32,
    /// Color distance threshold (_hr_). A window member takes part in the mean only if its color
    /// distance to the current sample is strictly less than this. Also used as the region
    /// growing threshold in segmentation.
    pub color_bandwidth: f32,
    /// Upper bound of mean-shift iterations per pixel. The loop always runs at least once.
    pub max_convergence_steps: u16,
    /// Iteration stops once the color shift between two steps is not above this.
    pub color_tolerance: f32,
    /// Iteration stops once the spatial shift between two steps is not above this.
    pub spatial_tolerance: f32,
    /// Threading strategy for the data-parallel passes.
    pub threading_strategy: ThreadingStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spatial_bandwidth: 8f32,
            color_bandwidth: 16f32,
            max_convergence_steps: 5,
            color_tolerance: 0.3,
            spatial_tolerance: 0.3,
            threading_strategy: ThreadingStrategy::RowBased,
        }
    }
}

impl Config {
    /// Config with given bandwidths and defaults for everything else.
    pub fn new(spatial_bandwidth: f32, color_bandwidth: f32) -> Self {
        Self {
            spatial_bandwidth,
            color_bandwidth,
            ..Self::default()
        }
    }

    /// Search window half-width in whole pixels.
    #[inline(always)]
    pub fn window_radius(&self) -> usize {
        self.spatial_bandwidth as usize
    }

    /// Checks everything the mean-shift filter depends on.
    pub fn validate_filter(&self) -> Result<(), Error> {
        if !(self.spatial_bandwidth.is_finite() && self.spatial_bandwidth >= 1.0) {
            return Err(invalid("spatial_bandwidth", self.spatial_bandwidth as f64));
        }
        self.validate_segment()?;
        if self.max_convergence_steps == 0 {
            return Err(invalid("max_convergence_steps", 0.0));
        }
        if !(self.color_tolerance.is_finite() && self.color_tolerance >= 0.0) {
            return Err(invalid("color_tolerance", self.color_tolerance as f64));
        }
        if !(self.spatial_tolerance.is_finite() && self.spatial_tolerance >= 0.0) {
            return Err(invalid("spatial_tolerance", self.spatial_tolerance as f64));
        }
        Ok(())
    }

    /// Checks everything the region growing depends on. Only the color bandwidth matters there.
    pub fn validate_segment(&self) -> Result<(), Error> {
        if !(self.color_bandwidth.is_finite() && self.color_bandwidth > 0.0) {
            return Err(invalid("color_bandwidth", self.color_bandwidth as f64));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, value: f64) -> Error {
    warn!("rejecting config: {name} = {value}");
    Error::InvalidParameter { name, value }
}

#[cfg(test)]
mod tests {
    use super::{Config, ThreadingStrategy};
    use crate::error::Error;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.validate_filter(), Ok(()));
        assert_eq!(config.validate_segment(), Ok(()));
        assert_eq!(config.threading_strategy, ThreadingStrategy::RowBased);
        assert_eq!(config.max_convergence_steps, 5);
    }

    #[test]
    fn bandwidth_validation_test() {
        for hs in [0.0, -3.0, 0.5, f32::NAN, f32::INFINITY] {
            assert!(
                matches!(
                    Config::new(hs, 10.0).validate_filter(),
                    Err(Error::InvalidParameter {
                        name: "spatial_bandwidth",
                        ..
                    })
                ),
                "hs = {hs} accepted"
            );
        }
        for hr in [0.0, -1.0, f32::NAN] {
            let config = Config::new(4.0, hr);
            assert!(matches!(
                config.validate_filter(),
                Err(Error::InvalidParameter {
                    name: "color_bandwidth",
                    ..
                })
            ));
            assert!(config.validate_segment().is_err());
        }
        // segmentation does not look at the window at all
        assert_eq!(Config::new(0.0, 10.0).validate_segment(), Ok(()));
    }

    #[test]
    fn window_radius_truncates() {
        assert_eq!(Config::new(1.0, 1.0).window_radius(), 1);
        assert_eq!(Config::new(7.9, 1.0).window_radius(), 7);
    }

    #[test]
    fn iteration_validation_test() {
        let mut config = Config::default();
        config.max_convergence_steps = 0;
        assert!(config.validate_filter().is_err());
        let mut config = Config::default();
        config.color_tolerance = -0.1;
        assert!(config.validate_filter().is_err());
        let mut config = Config::default();
        config.spatial_tolerance = f32::NAN;
        assert!(config.validate_filter().is_err());
    }
}

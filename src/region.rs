use crate::working_space::working_to_pixel;

/// One segment found by region growing.
///
/// `num_members` and `mode` are final only after the growth of the region finished (see
/// `segmentation::label_regions()`).
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Label stored in the label grid for every member.
    pub label: u32,
    /// Column of the pixel that started the region.
    pub seed_x: usize,
    /// Row of the pixel that started the region.
    pub seed_y: usize,
    /// Working-space color of the seed. Every candidate is compared against it.
    pub anchor: [f32; 3],
    /// Average working-space color of all members.
    pub mode: [f32; 3],
    /// Number of pixels in the region, seed included.
    pub num_members: u32,
    // Running color sum. Starts at the anchor, so the seed is already in the sum before it is
    // counted by `finalize()`.
    sum: [f64; 3],
}

impl Region {
    pub(crate) fn seed(label: u32, seed_x: usize, seed_y: usize, anchor: [f32; 3]) -> Self {
        Self {
            label,
            seed_x,
            seed_y,
            anchor,
            mode: anchor,
            num_members: 0,
            sum: anchor.map(f64::from),
        }
    }

    #[inline(always)]
    pub(crate) fn add_member(&mut self, color: [f32; 3]) {
        for (acc, c) in self.sum.iter_mut().zip(color) {
            *acc += c as f64;
        }
        self.num_members += 1;
    }

    pub(crate) fn finalize(&mut self) {
        self.num_members += 1;
        let n = self.num_members as f64;
        self.mode = self.sum.map(|s| (s / n) as f32);
    }

    /// Mode converted back to an 8-bit pixel.
    pub fn mode_pixel(&self) -> [u8; 3] {
        working_to_pixel(self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::Region;

    #[test]
    fn seed_is_counted_at_finalize() {
        let mut region = Region::seed(3, 1, 2, [10.0, -4.0, 0.0]);
        assert_eq!(region.num_members, 0);
        region.finalize();
        assert_eq!(region.num_members, 1);
        assert_eq!(region.mode, [10.0, -4.0, 0.0]);
    }

    #[test]
    fn mode_is_average_of_members() {
        let mut region = Region::seed(0, 0, 0, [10.0, 0.0, 0.0]);
        region.add_member([20.0, 3.0, -3.0]);
        region.add_member([30.0, 6.0, 3.0]);
        assert_eq!(region.num_members, 2);
        region.finalize();
        assert_eq!(region.num_members, 3);
        assert_eq!(region.mode, [20.0, 3.0, 0.0]);
        assert_eq!(region.anchor, [10.0, 0.0, 0.0]);
        assert_eq!(region.mode_pixel(), [51, 131, 128]);
    }
}

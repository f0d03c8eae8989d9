/// Sample in the joint spatial-color domain.
///
/// `row` and `col` are real-valued while the sample is being averaged and are only meaningful as
/// grid indices at the image boundary. `l`, `a`, `b` are in the working color space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub row: f32,
    pub col: f32,
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Default for SamplePoint {
    /// Unset sample `(-1, -1, 0, 0, 0)`.
    fn default() -> Self {
        Self {
            row: -1.0,
            col: -1.0,
            l: 0.0,
            a: 0.0,
            b: 0.0,
        }
    }
}

impl SamplePoint {
    #[inline(always)]
    pub fn new(row: f32, col: f32, l: f32, a: f32, b: f32) -> Self {
        Self { row, col, l, a, b }
    }

    /// Sample at grid position `(row, col)` with an already converted color.
    #[inline(always)]
    pub fn from_working(row: usize, col: usize, color: [f32; 3]) -> Self {
        Self::new(row as f32, col as f32, color[0], color[1], color[2])
    }

    /// All-zero sample, the neutral element of [`SamplePoint::accumulate`].
    #[inline(always)]
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0)
    }

    pub fn is_unset(&self) -> bool {
        self.row < 0.0 || self.col < 0.0
    }

    #[inline(always)]
    pub fn set(&mut self, row: f32, col: f32, l: f32, a: f32, b: f32) {
        *self = Self::new(row, col, l, a, b);
    }

    #[inline(always)]
    pub fn copy_from(&mut self, other: &SamplePoint) {
        *self = *other;
    }

    #[inline(always)]
    pub fn accumulate(&mut self, other: &SamplePoint) {
        self.row += other.row;
        self.col += other.col;
        self.l += other.l;
        self.a += other.a;
        self.b += other.b;
    }

    #[inline(always)]
    pub fn scale(&mut self, factor: f32) {
        self.row *= factor;
        self.col *= factor;
        self.l *= factor;
        self.a *= factor;
        self.b *= factor;
    }

    #[inline(always)]
    pub fn color(&self) -> [f32; 3] {
        [self.l, self.a, self.b]
    }

    /// Euclidean distance over the color components only.
    #[inline(always)]
    pub fn color_distance(&self, other: &SamplePoint) -> f32 {
        color_distance(self.color(), other.color())
    }

    /// Euclidean distance over the spatial components only.
    #[inline(always)]
    pub fn spatial_distance(&self, other: &SamplePoint) -> f32 {
        let dr = self.row - other.row;
        let dc = self.col - other.col;
        (dr * dr + dc * dc).sqrt()
    }
}

/// Euclidean distance of two working-space colors.
#[inline(always)]
pub fn color_distance(c1: [f32; 3], c2: [f32; 3]) -> f32 {
    let dl = c1[0] - c2[0];
    let da = c1[1] - c2[1];
    let db = c1[2] - c2[2];
    (dl * dl + da * da + db * db).sqrt()
}

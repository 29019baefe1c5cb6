/// Fraction of each dimension left as margin on every side of the seed
pub const SEED_MARGIN: f64 = 0.08;

/// Initial foreground hint: an axis-aligned rectangle inset from the image border
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl SeedRect {
    /// Build the seed for a `width`×`height` image with an 8% margin per side
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        let (width, height) = (i64::from(width), i64::from(height));
        let margin_w = (width as f64 * SEED_MARGIN).floor() as i64;
        let margin_h = (height as f64 * SEED_MARGIN).floor() as i64;

        Self {
            x: margin_w,
            y: margin_h,
            width: width - 2 * margin_w,
            height: height - 2 * margin_h,
        }
    }

    /// True when the rectangle has no extent or touches the image border.
    /// Segmentation must be skipped for such seeds.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0 || self.x <= 0 || self.y <= 0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margins_are_eight_percent() {
        let seed = SeedRect::from_dimensions(100, 100);
        assert_eq!(seed, SeedRect { x: 8, y: 8, width: 84, height: 84 });
        assert!(!seed.is_degenerate());
    }

    #[test]
    fn test_margins_floor_per_axis() {
        let seed = SeedRect::from_dimensions(640, 33);
        assert_eq!(seed, SeedRect { x: 51, y: 2, width: 538, height: 29 });
    }

    #[test]
    fn test_small_images_are_degenerate() {
        assert!(SeedRect::from_dimensions(12, 400).is_degenerate());
        assert!(SeedRect::from_dimensions(400, 12).is_degenerate());
        assert!(SeedRect::from_dimensions(0, 0).is_degenerate());
        assert!(!SeedRect::from_dimensions(13, 13).is_degenerate());
    }

    #[test]
    fn test_contains_is_half_open() {
        let seed = SeedRect::from_dimensions(100, 50);
        assert!(seed.contains(8, 4));
        assert!(seed.contains(91, 45));
        assert!(!seed.contains(92, 45));
        assert!(!seed.contains(7, 10));
        assert!(!seed.contains(50, 46));
    }
}

use image::GrayImage;

/// Tightest axis-aligned rectangle around the non-zero cells of a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    /// `None` when every cell is zero
    pub fn of_mask(mask: &GrayImage) -> Option<Self> {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut found = false;

        for (x, y, pixel) in mask.enumerate_pixels() {
            if pixel[0] > 0 {
                found = true;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }

        found.then(|| Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    /// Top-left corner that centres these bounds on a `canvas_width`×`canvas_height` canvas
    pub fn centered_origin(&self, canvas_width: u32, canvas_height: u32) -> (u32, u32) {
        (
            canvas_width.saturating_sub(self.width) / 2,
            canvas_height.saturating_sub(self.height) / 2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_empty_mask_has_no_bounds() {
        assert_eq!(Bounds::of_mask(&GrayImage::new(10, 10)), None);
    }

    #[test]
    fn test_bounds_cover_all_non_zero_cells() {
        let mut mask = GrayImage::new(20, 10);
        mask.put_pixel(3, 7, Luma([1]));
        mask.put_pixel(15, 2, Luma([200]));
        mask.put_pixel(8, 5, Luma([255]));

        let bounds = Bounds::of_mask(&mask).unwrap();
        assert_eq!(
            bounds,
            Bounds {
                x: 3,
                y: 2,
                width: 13,
                height: 6
            }
        );
    }

    #[test]
    fn test_single_cell_bounds() {
        let mut mask = GrayImage::new(5, 5);
        mask.put_pixel(4, 0, Luma([9]));
        let bounds = Bounds::of_mask(&mask).unwrap();
        assert_eq!((bounds.x, bounds.y, bounds.width, bounds.height), (4, 0, 1, 1));
    }

    #[test]
    fn test_centered_origin_floors_and_stays_in_range() {
        let bounds = Bounds {
            x: 0,
            y: 0,
            width: 5,
            height: 4,
        };
        assert_eq!(bounds.centered_origin(10, 10), (2, 3));
        assert_eq!(bounds.centered_origin(5, 4), (0, 0));

        for (w, h) in [(7, 3), (100, 1), (1, 80), (64, 63)] {
            let bounds = Bounds {
                x: 0,
                y: 0,
                width: w,
                height: h,
            };
            let (cx, cy) = bounds.centered_origin(100, 80);
            assert!(cx + w <= 100);
            assert!(cy + h <= 80);
        }
    }
}

use image::GrayImage;

/// Bresenham circle of radius 3, clockwise from 12 o'clock.
pub(crate) const CIRCLE_OFFSETS: [(i32, i32); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

/// A FAST segment-test corner in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    pub x: u32,
    pub y: u32,
    /// Sum of `|circle - center| - threshold` over the best arc.
    pub score: f32,
}

/// FAST-N corner detector restricted to an interior window.
#[derive(Debug, Clone)]
pub struct FastDetector {
    pub threshold: u8,
    /// Contiguous arc length, 9..=12.
    pub arc_length: usize,
    /// Corners closer than this to any image edge are not reported.
    pub border: u32,
}

impl FastDetector {
    pub fn new(threshold: u8, arc_length: usize, border: u32) -> FastDetector {
        FastDetector {
            threshold,
            arc_length: arc_length.clamp(9, 12),
            border: border.max(3),
        }
    }

    /// Raw segment-test corners in raster order.
    pub fn detect(&self, image: &GrayImage) -> Vec<Corner> {
        let (w, h) = image.dimensions();
        let mut corners = Vec::new();
        if w <= 2 * self.border || h <= 2 * self.border {
            return corners;
        }
        let thresh = self.threshold as i16;
        let min_cardinals = if self.arc_length >= 12 { 3 } else { 2 };
        let px = |x: u32, y: u32, dx: i32, dy: i32| -> i16 {
            image.get_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32)[0] as i16
        };

        for y in self.border..(h - self.border) {
            for x in self.border..(w - self.border) {
                let center = image.get_pixel(x, y)[0] as i16;

                // high-speed test on the four cardinal points
                let mut bright = 0;
                let mut dark = 0;
                for i in [0, 4, 8, 12] {
                    let (dx, dy) = CIRCLE_OFFSETS[i];
                    let p = px(x, y, dx, dy);
                    if p > center + thresh {
                        bright += 1;
                    } else if p < center - thresh {
                        dark += 1;
                    }
                }
                if bright < min_cardinals && dark < min_cardinals {
                    continue;
                }

                let mut circle = [0i16; 16];
                for (i, &(dx, dy)) in CIRCLE_OFFSETS.iter().enumerate() {
                    circle[i] = px(x, y, dx, dy);
                }
                if let Some(score) = self.segment_score(center, &circle, thresh) {
                    corners.push(Corner { x, y, score });
                }
            }
        }
        corners
    }

    /// `Some(score)` when at least `arc_length` contiguous circle pixels are
    /// all brighter or all darker than the center.
    fn segment_score(&self, center: i16, circle: &[i16; 16], thresh: i16) -> Option<f32> {
        let mut bright_mask: u16 = 0;
        let mut dark_mask: u16 = 0;
        for (i, &v) in circle.iter().enumerate() {
            let diff = v - center;
            if diff > thresh {
                bright_mask |= 1 << i;
            } else if diff < -thresh {
                dark_mask |= 1 << i;
            }
        }

        let mut best: Option<f32> = None;
        for mask in [bright_mask, dark_mask] {
            if (mask.count_ones() as usize) < self.arc_length || !has_run(mask, self.arc_length) {
                continue;
            }
            let score = best_arc_score(center, circle, thresh, mask);
            best = Some(best.map_or(score, |b: f32| b.max(score)));
        }
        best
    }
}

/// Circular run of `n` set bits, using the doubled-mask AND-shift trick.
fn has_run(mask: u16, n: usize) -> bool {
    let mut acc = (mask as u32) | ((mask as u32) << 16);
    for _ in 1..n {
        acc &= acc >> 1;
    }
    acc != 0
}

fn best_arc_score(center: i16, circle: &[i16; 16], thresh: i16, mask: u16) -> f32 {
    let m32 = (mask as u32) | ((mask as u32) << 16);
    let mut best_start = 0usize;
    let mut best_len = 0usize;
    let mut i = 0usize;
    while i < 16 {
        if m32 & (1 << i) == 0 {
            i += 1;
            continue;
        }
        let start = i;
        while i < 32 && m32 & (1 << i) != 0 {
            i += 1;
        }
        if i - start > best_len {
            best_len = (i - start).min(16);
            best_start = start;
        }
    }
    (best_start..best_start + best_len)
        .map(|j| ((circle[j % 16] - center).abs() - thresh).max(0) as f32)
        .sum()
}

/// 3x3 non-maximum suppression on corner scores.
///
/// Equal scores are resolved in favour of the earlier corner in raster order,
/// so the result does not depend on anything but the pixel data.
pub fn suppress_non_maxima(corners: &[Corner], width: u32, height: u32) -> Vec<Corner> {
    let w = width as usize;
    let mut score_map = vec![f32::NEG_INFINITY; w * height as usize];
    for c in corners {
        score_map[c.y as usize * w + c.x as usize] = c.score;
    }
    corners
        .iter()
        .filter(|c| {
            let idx = c.y as usize * w + c.x as usize;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = c.x as i32 + dx;
                    let ny = c.y as i32 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                        continue;
                    }
                    let nidx = ny as usize * w + nx as usize;
                    let ns = score_map[nidx];
                    if ns > c.score || (ns == c.score && nidx < idx) {
                        return false;
                    }
                }
            }
            true
        })
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn ring_image(size: u32, center_val: u8, ring_val: u8) -> GrayImage {
        let mut img = GrayImage::from_pixel(size, size, Luma([center_val]));
        let c = size as i32 / 2;
        for &(dx, dy) in &CIRCLE_OFFSETS {
            img.put_pixel((c + dx) as u32, (c + dy) as u32, Luma([ring_val]));
        }
        img
    }

    #[test]
    fn bright_ring_is_a_corner() {
        let img = ring_image(21, 50, 200);
        let corners = FastDetector::new(30, 9, 3).detect(&img);
        assert!(corners.iter().any(|c| c.x == 10 && c.y == 10));
    }

    #[test]
    fn flat_image_has_no_corners() {
        let img = GrayImage::from_pixel(32, 32, Luma([128]));
        assert!(FastDetector::new(10, 9, 3).detect(&img).is_empty());
    }

    #[test]
    fn border_is_respected() {
        let img = ring_image(21, 50, 200);
        assert!(FastDetector::new(30, 9, 11).detect(&img).is_empty());
    }

    #[test]
    fn nms_keeps_strongest_and_breaks_ties_by_raster_order() {
        let corners = vec![
            Corner { x: 5, y: 5, score: 10.0 },
            Corner { x: 6, y: 5, score: 20.0 },
            Corner { x: 10, y: 10, score: 7.0 },
            Corner { x: 11, y: 10, score: 7.0 },
        ];
        let kept = suppress_non_maxima(&corners, 20, 20);
        assert_eq!(kept.len(), 2);
        assert_eq!((kept[0].x, kept[0].y), (6, 5));
        assert_eq!((kept[1].x, kept[1].y), (10, 10));
    }

    #[test]
    fn run_detection_wraps_around() {
        // bits 12..16 and 0..5 form a circular run of 9
        let mask: u16 = 0b1111_0000_0001_1111;
        assert!(has_run(mask, 9));
        assert!(!has_run(mask, 10));
    }
}

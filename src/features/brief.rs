use image::GrayImage;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::Descriptor;

/// Radius of the disc used for the intensity-centroid orientation.
pub const ORIENTATION_RADIUS: i32 = 15;
/// Sample offsets lie in `[-PATTERN_EXTENT, PATTERN_EXTENT]` before steering.
pub const PATTERN_EXTENT: i32 = 13;
const PATTERN_SEED: u64 = 0x0b1e_5eed;
const SMOOTH_RADIUS: i32 = 2;

/// Point pairs compared by the 256 descriptor bits.
pub struct BriefPattern {
    pairs: Vec<[(f32, f32); 2]>,
}

impl BriefPattern {
    /// The fixed pattern. Seeding the generator keeps descriptors comparable
    /// between runs and between processes.
    pub fn standard() -> BriefPattern {
        let mut rng = ChaCha8Rng::seed_from_u64(PATTERN_SEED);
        let mut sample = || {
            (
                rng.random_range(-PATTERN_EXTENT..=PATTERN_EXTENT) as f32,
                rng.random_range(-PATTERN_EXTENT..=PATTERN_EXTENT) as f32,
            )
        };
        let pairs = (0..256).map(|_| [sample(), sample()]).collect();
        BriefPattern { pairs }
    }

    /// Steered BRIEF at `(x, y)` for orientation `angle` (radians).
    pub fn describe(&self, smoothed: &SmoothedImage, x: f32, y: f32, angle: f32) -> Descriptor {
        let (sin, cos) = angle.sin_cos();
        let rotate = |(u, v): (f32, f32)| {
            (
                (x + cos * u - sin * v).round() as i32,
                (y + sin * u + cos * v).round() as i32,
            )
        };
        let mut bytes = [0u8; 32];
        for (bit, [p, q]) in self.pairs.iter().enumerate() {
            let (px, py) = rotate(*p);
            let (qx, qy) = rotate(*q);
            if smoothed.get(px, py) < smoothed.get(qx, qy) {
                bytes[bit / 8] |= 1 << (bit % 8);
            }
        }
        Descriptor(bytes)
    }
}

/// 5x5 box-filtered copy of an image, sampled with edge clamping.
pub struct SmoothedImage {
    width: i32,
    height: i32,
    data: Vec<u8>,
}

impl SmoothedImage {
    pub fn new(image: &GrayImage) -> SmoothedImage {
        let (w, h) = (image.width() as usize, image.height() as usize);
        // integral image with a zero first row and column
        let mut integral = vec![0u32; (w + 1) * (h + 1)];
        for y in 0..h {
            let mut row_sum = 0u32;
            for x in 0..w {
                row_sum += image.get_pixel(x as u32, y as u32)[0] as u32;
                integral[(y + 1) * (w + 1) + x + 1] = integral[y * (w + 1) + x + 1] + row_sum;
            }
        }
        let mut data = vec![0u8; w * h];
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                let x0 = (x - SMOOTH_RADIUS).max(0) as usize;
                let y0 = (y - SMOOTH_RADIUS).max(0) as usize;
                let x1 = (x + SMOOTH_RADIUS + 1).min(w as i32) as usize;
                let y1 = (y + SMOOTH_RADIUS + 1).min(h as i32) as usize;
                let sum = integral[y1 * (w + 1) + x1] + integral[y0 * (w + 1) + x0]
                    - integral[y0 * (w + 1) + x1]
                    - integral[y1 * (w + 1) + x0];
                let count = ((x1 - x0) * (y1 - y0)) as u32;
                data[y as usize * w + x as usize] = (sum / count) as u8;
            }
        }
        SmoothedImage {
            width: w as i32,
            height: h as i32,
            data,
        }
    }

    pub fn get(&self, x: i32, y: i32) -> u8 {
        let x = x.clamp(0, self.width - 1);
        let y = y.clamp(0, self.height - 1);
        self.data[(y * self.width + x) as usize]
    }
}

/// Intensity-centroid orientation of the disc around `(cx, cy)`.
pub fn intensity_centroid_angle(image: &GrayImage, cx: u32, cy: u32) -> f32 {
    let (w, h) = (image.width() as i32, image.height() as i32);
    let r2 = ORIENTATION_RADIUS * ORIENTATION_RADIUS;
    let mut m10 = 0i64;
    let mut m01 = 0i64;
    for v in -ORIENTATION_RADIUS..=ORIENTATION_RADIUS {
        for u in -ORIENTATION_RADIUS..=ORIENTATION_RADIUS {
            if u * u + v * v > r2 {
                continue;
            }
            let x = (cx as i32 + u).clamp(0, w - 1);
            let y = (cy as i32 + v).clamp(0, h - 1);
            let i = image.get_pixel(x as u32, y as u32)[0] as i64;
            m10 += u as i64 * i;
            m01 += v as i64 * i;
        }
    }
    (m01 as f32).atan2(m10 as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn pattern_is_reproducible() {
        let a = BriefPattern::standard();
        let b = BriefPattern::standard();
        assert_eq!(a.pairs, b.pairs);
        assert_eq!(a.pairs.len(), 256);
        assert!(
            a.pairs
                .iter()
                .flatten()
                .all(|(u, v)| u.abs() <= PATTERN_EXTENT as f32 && v.abs() <= PATTERN_EXTENT as f32)
        );
    }

    #[test]
    fn smoothing_flat_image_is_identity() {
        let img = GrayImage::from_pixel(9, 7, Luma([77]));
        let smoothed = SmoothedImage::new(&img);
        for y in 0..7 {
            for x in 0..9 {
                assert_eq!(smoothed.get(x, y), 77);
            }
        }
        assert_eq!(smoothed.get(-5, 100), 77);
    }

    #[test]
    fn centroid_points_towards_bright_side() {
        let mut img = GrayImage::from_pixel(41, 41, Luma([0]));
        for y in 0..41 {
            for x in 21..41 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        let angle = intensity_centroid_angle(&img, 20, 20);
        assert!(angle.abs() < 1e-3, "angle = {angle}");
    }
}

#![allow(dead_code)]

use image::{GrayImage, Luma, imageops};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};

/// Ground texture of random 8x8 blocks.
pub fn textured_ground(width: u32, height: u32, seed: u64) -> GrayImage {
    const BLOCK: u32 = 8;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cols = width.div_ceil(BLOCK);
    let rows = height.div_ceil(BLOCK);
    let blocks: Vec<u8> = (0..cols * rows).map(|_| rng.random()).collect();
    GrayImage::from_fn(width, height, |x, y| {
        Luma([blocks[((y / BLOCK) * cols + x / BLOCK) as usize]])
    })
}

pub fn crop(ground: &GrayImage, x: u32, y: u32, width: u32, height: u32) -> GrayImage {
    imageops::crop_imm(ground, x, y, width, height).to_image()
}

/// Writes `count` frames shifted by `(dx, dy)` per frame, named by capture
/// time in nanoseconds, one second apart.
pub fn write_pass(dir: &Path, count: u32, dx: u32, dy: u32) -> Vec<PathBuf> {
    let size = 240;
    let ground = textured_ground(size + dx * count, size + dy * count, 11);
    (0..count)
        .map(|k| {
            let path = dir.join(format!("{}.png", (k as i64 + 1) * 1_000_000_000));
            crop(&ground, dx * k, dy * k, size, size).save(&path).unwrap();
            path
        })
        .collect()
}

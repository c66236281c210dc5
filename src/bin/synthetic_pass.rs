use clap::{Parser, Subcommand};
use image::{GrayImage, Luma, imageops};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::path::Path;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a pass of frames sliding over a synthetic textured ground
    Generate {
        /// Output directory
        #[arg(short, long)]
        output: String,

        /// Number of frames to generate
        #[arg(short, long, default_value = "20")]
        num_frames: usize,

        /// Image width
        #[arg(long, default_value = "640")]
        width: u32,

        /// Image height
        #[arg(long, default_value = "480")]
        height: u32,

        /// Ground shift per frame along x, pixels
        #[arg(long, default_value = "6")]
        shift_x: u32,

        /// Ground shift per frame along y, pixels
        #[arg(long, default_value = "2")]
        shift_y: u32,

        /// Time between frames, milliseconds
        #[arg(long, default_value = "1000")]
        interval_ms: u64,

        /// Texture seed
        #[arg(long, default_value = "7")]
        seed: u64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Generate {
            output,
            num_frames,
            width,
            height,
            shift_x,
            shift_y,
            interval_ms,
            seed,
        } => {
            generate_pass(
                &output,
                num_frames,
                (width, height),
                (shift_x, shift_y),
                interval_ms,
                seed,
            )?;
        }
    }

    Ok(())
}

/// Random 8x8 intensity blocks, which give FAST plenty of junction corners.
fn textured_ground(width: u32, height: u32, seed: u64) -> GrayImage {
    const BLOCK: u32 = 8;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cols = width.div_ceil(BLOCK);
    let rows = height.div_ceil(BLOCK);
    let blocks: Vec<u8> = (0..cols * rows).map(|_| rng.random()).collect();
    GrayImage::from_fn(width, height, |x, y| {
        Luma([blocks[((y / BLOCK) * cols + x / BLOCK) as usize]])
    })
}

fn generate_pass(
    output_dir: &str,
    num_frames: usize,
    (width, height): (u32, u32),
    (shift_x, shift_y): (u32, u32),
    interval_ms: u64,
    seed: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(output_dir)?;
    let steps = num_frames.saturating_sub(1) as u32;
    let ground = textured_ground(width + shift_x * steps, height + shift_y * steps, seed);
    let start_ns = time::OffsetDateTime::now_utc().unix_timestamp_nanos() as i64;

    for frame_idx in 0..num_frames {
        let i = frame_idx as u32;
        let frame = imageops::crop_imm(&ground, shift_x * i, shift_y * i, width, height).to_image();
        let time_ns = start_ns + frame_idx as i64 * interval_ms as i64 * 1_000_000;
        frame.save(Path::new(output_dir).join(format!("{}.png", time_ns)))?;
        log::debug!("frame {} at {}", frame_idx, time_ns);
    }

    println!("Generated {} frames in {}", num_frames, output_dir);
    Ok(())
}

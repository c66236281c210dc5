use clap::{Parser, Subcommand, ValueEnum};
use ground_speed::capture::{FixedPosition, GeoPosition, ReplayCapture};
use ground_speed::config::{SessionConfig, VelocityConfig};
use ground_speed::data_loader::estimate_folder;
use ground_speed::io::{format_speed, object_from_json, write_report, write_result};
use ground_speed::metadata::{FilenameTimestamp, MetadataReader, SidecarMetadata};
use ground_speed::pipeline::PairEstimator;
use ground_speed::session::run_session;
use ground_speed::visualization::{create_recording, log_frame, log_pair};
use ground_speed::{SessionEstimate, SpeedSample};
use std::time::Instant;

#[derive(Parser)]
#[command(version, about, author)]
struct GsrsCli {
    #[command(subcommand)]
    command: Commands,

    /// velocity pipeline config json
    #[arg(long, global = true)]
    config: Option<String>,

    /// ground sample distance, cm per pixel
    #[arg(long, global = true)]
    gsd: Option<f64>,

    /// maximum number of features per image
    #[arg(long, global = true)]
    max_features: Option<usize>,

    /// result file, written only when an estimate exists
    #[arg(short, long, global = true, default_value = "result.txt")]
    output: String,

    /// optional json report with every sample
    #[arg(long, global = true)]
    report: Option<String>,

    /// write log records to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TimestampSource {
    /// file stem is the capture time in nanoseconds
    Filename,
    /// `<image>.json` sidecar written by the capture service
    Sidecar,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate ground speed from a folder of already captured frames
    Estimate {
        /// path to image folder
        path: String,

        #[arg(long, value_enum, default_value = "filename")]
        timestamps: TimestampSource,

        /// save a rerun recording of frames and matches
        #[arg(long)]
        rrd: Option<String>,
    },
    /// Replay recorded frames through the timed acquisition loop
    Replay {
        /// folder of recorded frames
        source: String,

        /// folder the session writes its captures to
        #[arg(short, long, default_value = ".")]
        workdir: String,

        /// session config json
        #[arg(long)]
        session_config: Option<String>,

        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        latitude: f64,

        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        longitude: f64,
    },
}

fn init_logging(log_file: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = log_file {
        let file = std::fs::File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn velocity_config(cli: &GsrsCli) -> Result<VelocityConfig, Box<dyn std::error::Error>> {
    let mut config: VelocityConfig = match &cli.config {
        Some(path) => object_from_json(path)?,
        None => VelocityConfig::default(),
    };
    if let Some(gsd) = cli.gsd {
        config.gsd_cm_per_px = gsd;
    }
    if let Some(n) = cli.max_features {
        config.extractor.max_features = n;
    }
    Ok(config)
}

fn finish(
    cli: &GsrsCli,
    config: &VelocityConfig,
    estimate: &SessionEstimate,
    samples: &[SpeedSample],
) -> Result<(), Box<dyn std::error::Error>> {
    write_result(&cli.output, estimate)?;
    if let Some(report) = &cli.report {
        write_report(report, estimate, samples, config.band, config.gsd_cm_per_px)?;
    }
    println!("{}", format_speed(estimate.speed_km_s));
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = GsrsCli::parse();
    init_logging(cli.log_file.as_deref())?;
    let config = velocity_config(&cli)?;
    let estimator = PairEstimator::new(config.clone());
    let now = Instant::now();

    match &cli.command {
        Commands::Estimate {
            path,
            timestamps,
            rrd,
        } => {
            let metadata: Box<dyn MetadataReader + Sync> = match timestamps {
                TimestampSource::Filename => Box::new(FilenameTimestamp),
                TimestampSource::Sidecar => Box::new(SidecarMetadata),
            };
            let run = estimate_folder(path, metadata.as_ref(), &estimator)?;
            log::info!(
                "{} pairs measured in {:.3} sec",
                run.measurements.len(),
                now.elapsed().as_secs_f64()
            );

            if let Some(rrd) = rrd {
                let recording = create_recording(rrd)?;
                for frame in run.frames.iter().flatten() {
                    log_frame(&recording, "/cam0", frame)?;
                }
                for m in &run.measurements {
                    let time_ns = run.frames[m.sample.pair_index + 1]
                        .as_ref()
                        .map_or(0, |f| f.time_ns);
                    log_pair(&recording, "/cam0", m, time_ns)?;
                }
            }

            let samples: Vec<SpeedSample> = run.measurements.iter().map(|m| m.sample).collect();
            let estimate = run.estimate?;
            finish(&cli, &config, &estimate, &samples)
        }
        Commands::Replay {
            source,
            workdir,
            session_config,
            latitude,
            longitude,
        } => {
            let session_config: SessionConfig = match session_config {
                Some(path) => object_from_json(path)?,
                None => SessionConfig::default(),
            };
            std::fs::create_dir_all(workdir)?;
            let oracle = FixedPosition(GeoPosition {
                latitude: *latitude,
                longitude: *longitude,
            });
            let mut capture = ReplayCapture::from_folder(source, oracle)?;
            let run = run_session(
                &mut capture,
                &SidecarMetadata,
                &estimator,
                std::path::Path::new(workdir),
                &session_config,
            );
            log::info!(
                "captured {} images, {} samples in {:.3} sec",
                run.captured,
                run.samples.len(),
                now.elapsed().as_secs_f64()
            );
            let estimate = run.estimate?;
            finish(&cli, &config, &estimate, &run.samples)
        }
    }
}

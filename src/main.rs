use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::time::{Duration, Instant};
use vibe_fx::capture::{CaptureSource, ImageSequenceCapture, WebcamCapture};
use vibe_fx::output::{fit_to_sink, ImageSequenceOutput, OutputSink, V4L2Output};
use vibe_fx::segmentation::{self, Preprocessor, Seeding, SegmentationModel};
use vibe_fx::vibe::ModelParams;

/// What gets written to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum View {
    /// Original video
    Video,
    /// Foreground score as a grayscale image
    Score,
    /// Mean of the stored background samples
    Model,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input webcam device index
    #[arg(short, long, default_value_t = 0)]
    input_device: u32,

    /// Read frames from a directory of images instead of a webcam
    #[arg(long)]
    input_dir: Option<String>,

    /// Output v4l2loopback device path
    #[arg(short, long, default_value = "/dev/video10")]
    output_device: String,

    /// Write numbered PNGs to this directory instead of a v4l2 device
    #[arg(long)]
    output_dir: Option<String>,

    /// Capture resolution width
    #[arg(long, default_value_t = 640)]
    capture_width: u32,

    /// Capture resolution height
    #[arg(long, default_value_t = 480)]
    capture_height: u32,

    /// Background model working width
    #[arg(long, default_value_t = 320)]
    model_width: u32,

    /// Background model working height
    #[arg(long, default_value_t = 240)]
    model_height: u32,

    /// Target frames per second (0 disables rate limiting)
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// What to send to the output
    #[arg(long, value_enum, default_value_t = View::Score)]
    view: View,

    /// Colour samples kept per pixel
    #[arg(long, default_value_t = 20)]
    nsamples: usize,

    /// Match radius on luma
    #[arg(long, default_value_t = 20)]
    sigma_y: u8,

    /// Match radius on U
    #[arg(long, default_value_t = 8)]
    sigma_u: u8,

    /// Match radius on V
    #[arg(long, default_value_t = 8)]
    sigma_v: u8,

    /// Extra replacement period for confident foreground
    #[arg(long, default_value_t = 128)]
    lspeed_fg: u32,

    /// Base replacement period
    #[arg(long, default_value_t = 4)]
    lspeed_bg: u32,

    /// Confidence gained on a sample refresh
    #[arg(long, default_value_t = 16)]
    cinc_bg: u8,

    /// Confidence lost when no sample is refreshed
    #[arg(long, default_value_t = 8)]
    cdec_fg: u8,

    /// Forced-replace frames before classification starts
    #[arg(long, default_value_t = 30)]
    warmup_frames: u32,

    /// Seed the model from the first frame instead of warming up
    #[arg(long)]
    init_from_first_frame: bool,

    /// Fixed seed for the replacement ring
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn model_params(&self) -> ModelParams {
        ModelParams {
            nsamples: self.nsamples,
            sigma_y: self.sigma_y,
            sigma_u: self.sigma_u,
            sigma_v: self.sigma_v,
            lspeed_fg: self.lspeed_fg,
            lspeed_bg: self.lspeed_bg,
            cinc_bg: self.cinc_bg,
            cdec_fg: self.cdec_fg,
            seed: self.seed,
        }
    }

    fn seeding(&self) -> Seeding {
        if self.init_from_first_frame {
            Seeding::FirstFrame
        } else {
            Seeding::WarmUp(self.warmup_frames)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("vibe-fx starting");
    tracing::info!("Model: {}x{}", args.model_width, args.model_height);
    tracing::info!("Target FPS: {}", args.fps);

    // Initialize capture
    let mut capture: Box<dyn CaptureSource> = match &args.input_dir {
        Some(dir) => Box::new(
            ImageSequenceCapture::new(dir).context("Failed to open image sequence")?,
        ),
        None => Box::new(
            WebcamCapture::new(
                args.input_device,
                args.capture_width,
                args.capture_height,
                args.fps.max(1),
            )
            .context("Failed to initialize webcam capture")?,
        ),
    };

    // Initialize output at the capture resolution
    let (out_width, out_height) = capture.resolution();
    let mut output: Box<dyn OutputSink> = match &args.output_dir {
        Some(dir) => Box::new(
            ImageSequenceOutput::new(dir, out_width, out_height)
                .context("Failed to initialize image output")?,
        ),
        None => Box::new(
            V4L2Output::new(&args.output_device, out_width, out_height)
                .context("Failed to initialize v4l2loopback output")?,
        ),
    };

    anyhow::ensure!(
        output.resolution() == capture.resolution(),
        "Output resolution {:?} does not match capture resolution {:?}",
        output.resolution(),
        capture.resolution()
    );

    let model = segmentation::create_default_model(
        args.model_width,
        args.model_height,
        args.model_params(),
        args.seeding(),
    )
    .context("Failed to create background model")?;

    run_pipeline(capture.as_mut(), output.as_mut(), model, args.fps, args.view)?;

    tracing::info!("Input exhausted, shutting down");
    Ok(())
}

fn run_pipeline(
    capture: &mut dyn CaptureSource,
    output: &mut dyn OutputSink,
    mut model: Box<dyn SegmentationModel>,
    target_fps: u32,
    view: View,
) -> Result<()> {
    let frame_duration = (target_fps > 0).then(|| Duration::from_secs_f32(1.0 / target_fps as f32));
    let mut frame_count = 0u64;
    let mut total_capture_time = Duration::ZERO;
    let mut total_segment_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    tracing::info!("Starting main pipeline loop, view={:?}", view);
    tracing::info!("Press Ctrl+C to stop");

    loop {
        let loop_start = Instant::now();

        // Capture frame
        let capture_start = Instant::now();
        let Some(frame) = capture.capture_frame().context("Failed to capture frame")? else {
            break;
        };
        total_capture_time += capture_start.elapsed();

        // Segmentation
        let segment_start = Instant::now();
        let matte = model.segment(&frame).context("Failed to segment frame")?;
        total_segment_time += segment_start.elapsed();

        let output_frame = match view {
            View::Video => frame,
            View::Score => Preprocessor::matte_to_rgb(&matte),
            View::Model => model.background().unwrap_or(frame),
        };

        // Output frame
        let output_start = Instant::now();
        let output_frame = fit_to_sink(output_frame, output);
        output
            .write_frame(&output_frame)
            .context("Failed to write frame")?;
        total_output_time += output_start.elapsed();

        frame_count += 1;

        // Log stats every 30 frames
        if frame_count % 30 == 0 {
            let avg_capture_ms = total_capture_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_segment_ms = total_segment_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_output_ms = total_output_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let total_ms = avg_capture_ms + avg_segment_ms + avg_output_ms;
            let foreground =
                matte.pixels().filter(|p| p[0] > 127).count() as f64 / matte.len() as f64;

            tracing::info!(
                "Frame {}: capture={:.1}ms, segment={:.1}ms, output={:.1}ms, total={:.1}ms, fps={:.1}, foreground={:.1}%",
                frame_count,
                avg_capture_ms,
                avg_segment_ms,
                avg_output_ms,
                total_ms,
                1000.0 / total_ms,
                foreground * 100.0
            );
        }

        // Frame rate limiting
        if let Some(frame_duration) = frame_duration {
            let elapsed = loop_start.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }
    }

    tracing::info!("Processed {} frames", frame_count);
    Ok(())
}

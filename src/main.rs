use std::fs;
use std::path::{Path, PathBuf};

use ndvi_stream_rs::image_pipeline::{
    CaptureConfig, FrameSource, NdviPipeline, PipelineConfig, RawFileSource, SyntheticSource,
};
use ndvi_stream_rs::logger;

use tracing::{error, info};

const OUTPUT_DIR: &str = "frames";
const SYNTHETIC_FRAMES: usize = 30;

fn run<S: FrameSource>(pipeline: NdviPipeline, source: S, out_dir: &Path) -> Result<u64, Box<dyn std::error::Error>> {
    let extension = pipeline.config().output.extension();
    let mut stream = pipeline.stream(source);

    for (i, encoded) in stream.by_ref().enumerate() {
        let encoded = encoded?;
        let path = out_dir.join(format!("frame_{:05}.{}", i, extension));
        fs::write(&path, encoded.bytes())?;
    }

    if let Some(timings) = stream.last_timings() {
        timings.log_summary();
    }
    Ok(stream.frames_emitted())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logger::init();

    info!("Starting ndvi_stream...");

    let capture = CaptureConfig::default();
    let config = PipelineConfig::default();
    let pipeline = NdviPipeline::new(config)?;

    info!("NDVI pipeline initialized");
    info!("Resolution: {}x{}", capture.width, capture.height);
    info!("Colormap: {:?}", pipeline.config().colormap);
    info!("Output: {}", pipeline.config().output.mime_type());

    let out_dir = PathBuf::from(OUTPUT_DIR);
    fs::create_dir_all(&out_dir)?;

    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    let result = if paths.is_empty() {
        info!("No RAW inputs given, streaming {} synthetic frames", SYNTHETIC_FRAMES);
        run(pipeline, SyntheticSource::with_count(capture, SYNTHETIC_FRAMES), &out_dir)
    } else {
        info!("Streaming {} RAW files", paths.len());
        run(pipeline, RawFileSource::new(paths, capture), &out_dir)
    };

    match result {
        Ok(count) => info!("Wrote {} frames to {}", count, out_dir.display()),
        Err(e) => {
            error!("Stream failed: {}", e);
            return Err(e);
        }
    }

    Ok(())
}

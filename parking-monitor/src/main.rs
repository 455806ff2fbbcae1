mod capture;
mod controls;

use std::{path::PathBuf, time::{Duration, Instant}};

use capture::LoopingVideo;
use clap::Parser;
use controls::Controls;
use occupancy::{overlay, LotSummary, OccupancySystem, PreprocessParams, OCCUPANCY_THRESHOLD};
use opencv::highgui;
use report::{ParkingUpdate, ReportClient, ReportThrottle, DEFAULT_ENDPOINT};
use spots::{scale_regions, RegionStore, Resolution};

#[derive(Parser, Debug)]
#[command(name = "parking-monitor", about = "Counts free parking spaces in a video and reports them")]
struct Args {
    #[arg(long, value_name = "PATH", default_value = "carPark.MOV")]
    video: PathBuf,
    /// Region file written by spot-picker
    #[arg(long, value_name = "PATH", default_value = "CarParkPos")]
    regions: PathBuf,
    #[arg(long, value_name = "URL", env = "PARKING_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    #[arg(long, default_value = "Lot A")]
    lot_name: String,
    /// Size of the image the regions were annotated on
    #[arg(long, default_value_t = 3520, value_parser = clap::value_parser!(i32).range(1..))]
    reference_width: i32,
    #[arg(long, default_value_t = 1980, value_parser = clap::value_parser!(i32).range(1..))]
    reference_height: i32,
    /// Size of the video frames
    #[arg(long, default_value_t = 1920, value_parser = clap::value_parser!(i32).range(1..))]
    video_width: i32,
    #[arg(long, default_value_t = 1080, value_parser = clap::value_parser!(i32).range(1..))]
    video_height: i32,
    /// Foreground pixel count from which a space is occupied
    #[arg(long, default_value_t = OCCUPANCY_THRESHOLD)]
    threshold: i32,
    #[arg(long, default_value_t = 3)]
    report_interval_secs: u64,
    #[arg(long, default_value_t = 50)]
    lighting: i32,
    #[arg(long, default_value_t = 16)]
    brightness: i32,
    #[arg(long, default_value_t = 5)]
    smoothing: i32,
    /// Run without windows, using the preprocessing values given on the command line
    #[arg(long)]
    headless: bool,
}

fn main() -> anyhow::Result<()> {
    setup_logging();
    let args = Args::parse();

    let reference = Resolution::new(args.reference_width, args.reference_height);
    let target = Resolution::new(args.video_width, args.video_height);
    let regions = RegionStore::new(&args.regions).load();
    let regions = scale_regions(&regions, &reference, &target);
    log::info!("Scaled {} regions from {reference} to {target}", regions.len());
    let system = OccupancySystem::new(regions, args.threshold);
    log::info!("Spaces with {} or more foreground pixels count as occupied", system.threshold());

    log::info!("Opening video {}", args.video.display());
    let mut video = LoopingVideo::open(&args.video)?;
    let frame_size = video.frame_size()?;
    if frame_size != target {
        log::warn!("Video frames are {frame_size}, regions are scaled for {target}");
    }

    let reporter = ReportClient::new(&args.endpoint)?;
    let mut throttle = ReportThrottle::new(Duration::from_secs(args.report_interval_secs));
    log::info!("Reporting to {} every {:?}", reporter.endpoint(), throttle.interval());

    let initial_params = PreprocessParams {
        lighting: args.lighting,
        brightness: args.brightness,
        smoothing: args.smoothing,
    };
    let controls = if args.headless {
        None
    } else {
        Some(Controls::create(&initial_params)?)
    };

    log::info!("Starting main loop");
    loop {
        let mut frame = video.next_frame()?;
        let params = match &controls {
            Some(controls) => controls.params()?,
            None => initial_params,
        };

        let result = system.process_frame(&frame, &params)?;
        let summary = result.summary;
        log::debug!("Free {}/{}, occupied {}", summary.free, summary.total, summary.occupied);

        throttle.run_if_due(Instant::now(), || {
            reporter.report(&parking_update(&args.lot_name, &summary))
        });

        if controls.is_some() {
            overlay::draw_occupancy(&mut frame, system.regions(), &result.spaces, &summary)?;
            highgui::imshow("Threshold", &result.mask)?;
            highgui::imshow("Image", &frame)?;

            let key = highgui::wait_key(10)?;
            if key == 'q' as i32 {
                break;
            }
        }
    }

    highgui::destroy_all_windows()?;
    Ok(())
}

fn parking_update(lot_name: &str, summary: &LotSummary) -> ParkingUpdate {
    ParkingUpdate {
        parking_lot_name: lot_name.to_string(),
        total_spots: summary.total,
        free_spots: summary.free,
        occupied_spots: summary.occupied,
    }
}

fn setup_logging() {
    simple_log::quick!();
}

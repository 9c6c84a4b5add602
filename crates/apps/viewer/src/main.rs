mod runtime;
mod shell;
mod tiles;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use capture::artifact::{comparison_filename, screenshot_filename};
use capture::composite::compose_side_by_side;
use capture::{ComparisonCapture, OpGate, SceneFrame, take_dated_screenshot, take_screenshot};
use clap::{Parser, Subcommand, ValueEnum};
use foundation::time::{IsoDate, TimeSelector};
use geosearch::{RegionInfoClient, SearchBox, SearchClient};
use layers::layer::{LAYER_CATALOG, catalog_entry};
use layers::{ImageFormat, OverlaySpec, TileTemplate};
use scene::ViewMode;
use scene::flight::{
    DEFAULT_POINT_ALTITUDE_M, DEFAULT_POINT_DURATION_S, fly_to_point, fly_to_rect, focus_body,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::runtime::ViewerRuntime;
use crate::shell::Shell;

#[derive(Debug, Parser)]
#[command(name = "viewer", about = "Globe and solar-system observation viewer")]
struct Args {
    /// Backend proxy for search and region info.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    backend_url: String,

    /// Remote WMTS tile host.
    #[arg(long, default_value = layers::wmts::DEFAULT_TILE_HOST)]
    tile_host: String,

    /// Imagery layer identifier.
    #[arg(long, default_value = "MODIS_Terra_CorrectedReflectance_TrueColor")]
    layer: String,

    /// Overlay date; latest available when omitted.
    #[arg(long)]
    date: Option<IsoDate>,

    /// Tile image format (jpg or png).
    #[arg(long, default_value = "jpg")]
    format: ImageFormat,

    #[arg(long, value_enum, default_value_t = ModeArg::Globe)]
    mode: ModeArg,

    /// Frame width in pixels.
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Directory captured PNGs are written into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Skip tile fetching; render base color only.
    #[arg(long)]
    offline: bool,

    /// Start with the fullscreen viewport.
    #[arg(long)]
    fullscreen: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Globe,
    Mars,
    SolarSystem,
}

impl From<ModeArg> for ViewMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Globe => ViewMode::Globe,
            ModeArg::Mars => ViewMode::Mars,
            ModeArg::SolarSystem => ViewMode::SolarSystem,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Capture the current view, optionally re-dated.
    Screenshot {
        /// Capture this date instead of the configured overlay date.
        #[arg(long)]
        date: Option<IsoDate>,
    },
    /// Capture a before/after pair and write the combined image.
    Compare {
        #[arg(long)]
        before: IsoDate,
        #[arg(long)]
        after: IsoDate,
    },
    /// Search for a place and fly to the first match.
    Search { query: String },
    /// Fetch historical context for the viewport around a point.
    RegionInfo {
        #[arg(long, default_value_t = 0.0)]
        lat: f64,
        #[arg(long, default_value_t = 0.0)]
        lon: f64,
        #[arg(long, default_value_t = 1_000_000.0)]
        height: f64,
    },
    /// Focus a solar-system body.
    Focus { body: String },
    /// Print scene and catalog state.
    Inspect,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if catalog_entry(&args.layer).is_none() {
        warn!("layer {:?} is not in the built-in catalog; requesting anyway", args.layer);
    }

    let http = reqwest::Client::builder()
        .user_agent("globe-viewer/0.1")
        .build()
        .expect("http client");
    let template = TileTemplate::new(args.tile_host.clone());
    let mut rt = ViewerRuntime::new(
        args.mode.into(),
        template,
        http.clone(),
        args.width,
        args.height,
        args.offline,
    );
    if args.fullscreen {
        let mut shell = Shell::new((args.width as f64, args.height as f64), (1920.0, 1080.0));
        shell.enter(&mut rt.viewer.camera);
    }

    let gate = OpGate::new();

    let overlay = overlay_spec(&args);

    match args.command {
        Command::Screenshot { date } => {
            rt.apply_overlay(&overlay);
            let _guard = gate.try_begin().expect("first operation");
            let image = match date {
                Some(date) => take_dated_screenshot(&mut rt, date).await,
                None => take_screenshot(&mut rt).await,
            };
            match image {
                Some(image) => {
                    let path = args.out_dir.join(screenshot_filename(unix_now()));
                    std::fs::write(&path, image.png_bytes()).expect("write screenshot");
                    println!(
                        "wrote {} ({}x{})",
                        path.display(),
                        image.width(),
                        image.height()
                    );
                }
                None => println!("no screenshot produced"),
            }
        }

        Command::Compare { before, after } => {
            rt.apply_overlay(&overlay);
            let _guard = gate.try_begin().expect("first operation");
            let mut comparison = ComparisonCapture::new();
            match comparison
                .take_comparison(&mut rt, before.clone(), after.clone())
                .await
            {
                Ok(session) => {
                    let combined = compose_side_by_side(session).expect("compose comparison");
                    let path = args.out_dir.join(comparison_filename(&before, &after));
                    std::fs::write(&path, combined.png_bytes()).expect("write comparison");
                    println!(
                        "wrote {} ({} vs {})",
                        path.display(),
                        session.before_date,
                        session.after_date
                    );
                }
                Err(err) => println!("comparison failed: {err}"),
            }
        }

        Command::Search { query } => {
            let client = SearchClient::new(http.clone(), &args.backend_url);
            let mut search_box = SearchBox::new();
            let Some(query) = search_box.on_enter(&query) else {
                println!("empty query");
                return;
            };
            let outcome = client.search(&query).await;
            let selected = search_box.apply(outcome).cloned();
            match selected {
                Some(first) => {
                    let flight = match first.bounds() {
                        Some(rect) => fly_to_rect(rect, DEFAULT_POINT_DURATION_S),
                        None => fly_to_point(
                            first.lat,
                            first.lon,
                            DEFAULT_POINT_ALTITUDE_M,
                            DEFAULT_POINT_DURATION_S,
                        ),
                    };
                    rt.viewer.fly(&flight);
                    let camera = rt.camera_geodetic();
                    println!("{} ({:.4}, {:.4})", first.name, first.lat, first.lon);
                    for other in search_box.results.iter().skip(1) {
                        println!("  also: {}", other.name);
                    }
                    println!(
                        "camera: lat {:.4} lon {:.4} alt {:.0} m",
                        camera.lat_deg, camera.lon_deg, camera.height_m
                    );
                }
                None => println!(
                    "{}",
                    search_box
                        .error
                        .unwrap_or_else(|| "Location not found".to_string())
                ),
            }
        }

        Command::RegionInfo { lat, lon, height } => {
            rt.viewer
                .fly(&fly_to_point(lat, lon, height, DEFAULT_POINT_DURATION_S));
            if let Err(err) = rt.render().await {
                println!("render failed: {err}");
                return;
            }
            match rt.tracker.bounds() {
                Some(bounds) => {
                    let client = RegionInfoClient::new(http.clone(), &args.backend_url);
                    match client.region_info(bounds).await {
                        Ok(info) => println!("{info}"),
                        Err(err) => println!("region info unavailable: {err}"),
                    }
                }
                None => println!("viewport bounds not available for this view"),
            }
        }

        Command::Focus { body } => {
            if rt.viewer.mode() != ViewMode::SolarSystem {
                rt.switch_mode(ViewMode::SolarSystem);
            }
            let Some(system) = rt.viewer.bodies.as_mut() else {
                println!("no celestial bodies in this view");
                return;
            };
            let Some(index) = system
                .bodies()
                .iter()
                .position(|b| b.name.eq_ignore_ascii_case(&body))
            else {
                println!("unknown body: {body}");
                return;
            };
            let (name, center, radius) = {
                let focused = system.focus(index).expect("index in range");
                (focused.name, focused.center, focused.radius)
            };
            rt.viewer.fly(&focus_body(center, radius));
            let position = rt.viewer.camera.position;
            println!(
                "focused {name}; camera at ({:.0}, {:.0}, {:.0})",
                position.x, position.y, position.z
            );
        }

        Command::Inspect => {
            println!("mode: {:?}", rt.viewer.mode());
            let camera = rt.camera_geodetic();
            println!(
                "camera: lat {:.4} lon {:.4} alt {:.0} m",
                camera.lat_deg, camera.lon_deg, camera.height_m
            );
            match rt.attached_overlay() {
                Some(spec) => println!(
                    "overlay: {} @ {} ({})",
                    spec.layer,
                    spec.time,
                    spec.format.ext()
                ),
                None => println!("overlay: none"),
            }
            match rt.tracker.bounds() {
                Some(bounds) => println!(
                    "viewport: ({:.3}, {:.3}) .. ({:.3}, {:.3})",
                    bounds.top_left.lat_deg,
                    bounds.top_left.lon_deg,
                    bounds.bottom_right.lat_deg,
                    bounds.bottom_right.lon_deg
                ),
                None => println!("viewport: not sampled yet"),
            }
            println!("layers:");
            for entry in LAYER_CATALOG {
                println!("  {} - {} ({})", entry.id, entry.title, entry.format.ext());
            }
        }
    }
}

fn overlay_spec(args: &Args) -> OverlaySpec {
    let time = args
        .date
        .clone()
        .map(TimeSelector::Date)
        .unwrap_or(TimeSelector::Latest);
    OverlaySpec::new(args.layer.clone(), time, args.format)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

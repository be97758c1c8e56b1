use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::{error, info};

use skyview::coordinates::sidereal::local_sidereal_hours;
use skyview::orientation::device::DeviceLink;
use skyview::{
    logging, Catalog, ObserverPosition, Orientation, Result, ScreenPoint, SkySession,
    SkyViewConfig, SkyViewError, Viewport,
};

#[derive(Parser)]
#[command(name = "skyview")]
#[command(version, about = "Render the sky above an observer as a star map frame", long_about = None)]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Observer latitude in degrees, north positive
    #[arg(long, requires = "lon")]
    lat: Option<f64>,

    /// Observer longitude in degrees, east positive
    #[arg(long, requires = "lat")]
    lon: Option<f64>,

    /// Instant to render (RFC 3339), defaults to now
    #[arg(long, value_name = "TIME")]
    at: Option<DateTime<Utc>>,

    /// Initial view azimuth in degrees
    #[arg(long)]
    azimuth: Option<f64>,

    /// Initial view altitude in degrees
    #[arg(long)]
    altitude: Option<f64>,

    #[arg(long, default_value_t = 800.0)]
    width: f64,

    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Pointer movement of one drag gesture, repeatable
    #[arg(long, value_name = "DX,DY", value_parser = parse_pair, allow_hyphen_values = true)]
    drag: Vec<(f64, f64)>,

    /// Select the star under this screen point
    #[arg(long, value_name = "X,Y", value_parser = parse_pair)]
    select: Option<(f64, f64)>,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the frame as JSON instead of a text summary
    #[arg(long)]
    json: bool,

    /// Emit log events as JSON
    #[arg(long)]
    log_json: bool,
}

fn parse_pair(s: &str) -> std::result::Result<(f64, f64), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected two comma separated numbers, got {:?}", s))?;
    let a = a.trim().parse::<f64>().map_err(|e| format!("{:?}: {}", a, e))?;
    let b = b.trim().parse::<f64>().map_err(|e| format!("{:?}: {}", b, e))?;
    Ok((a, b))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "skyview failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => SkyViewConfig::load(path)?,
        None => SkyViewConfig::default(),
    };
    if cli.azimuth.is_some() || cli.altitude.is_some() {
        config.initial_view = Orientation::new(
            cli.azimuth.unwrap_or(config.initial_view.azimuth),
            cli.altitude.unwrap_or(config.initial_view.altitude),
        );
    }
    logging::init_logging(&config.log_level, cli.log_json)?;

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_file(path)?,
        None => Catalog::bright_stars()?,
    };
    info!(stars = catalog.len(), "catalog loaded");

    let observer = match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => ObserverPosition::new(lat, lon)?,
        _ => {
            info!(
                position = %config.fallback_observer.describe(),
                "no observer position given, using the fallback"
            );
            config.fallback_observer
        }
    };
    if !(cli.width > 0.0 && cli.height > 0.0) {
        return Err(SkyViewError::Config(format!(
            "viewport must be positive, got {}x{}",
            cli.width, cli.height
        )));
    }
    let viewport = Viewport::new(cli.width, cli.height);
    let instant = cli.at.unwrap_or_else(Utc::now);

    let mut session = SkySession::new(
        Arc::new(catalog),
        &config,
        DeviceLink::unavailable(),
        viewport,
    );
    session.set_observer(observer, instant);

    if !cli.drag.is_empty() {
        let mut pointer = viewport.center();
        session.pointer_down(pointer);
        for (dx, dy) in &cli.drag {
            pointer = ScreenPoint::new(pointer.x + dx, pointer.y + dy);
            session.pointer_move(pointer);
        }
        session.pointer_up();
    }

    let selected = cli
        .select
        .and_then(|(x, y)| session.select_at(ScreenPoint::new(x, y)))
        .map(|star| star.name.clone());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(session.frame())?);
    } else {
        print_summary(&mut session, &observer, &instant, cli.select, selected);
    }
    session.close();
    Ok(())
}

fn print_summary(
    session: &mut SkySession,
    observer: &ObserverPosition,
    instant: &DateTime<Utc>,
    select: Option<(f64, f64)>,
    selected: Option<String>,
) {
    let visible = session
        .snapshot()
        .map(|snapshot| snapshot.visible().count())
        .unwrap_or(0);
    println!("observer   {}", observer.describe());
    println!("time       {}", instant.to_rfc3339());
    println!(
        "lst        {:.4} h",
        local_sidereal_hours(instant, observer.lon)
    );
    println!(
        "view       az {:.1} alt {:.1}",
        session.orientation().azimuth,
        session.orientation().altitude
    );
    println!("above horizon {} of {}", visible, session.catalog().len());

    let frame = session.frame().clone();
    println!("compass    {}", frame.compass.text());
    println!("rendered   {}", frame.stars.len());
    for projected in &frame.stars {
        let name = session
            .catalog()
            .get(projected.star_id)
            .map_or("?", |star| star.name.as_str());
        let position = session
            .snapshot()
            .and_then(|snapshot| snapshot.position_of(projected.star_id));
        if let Some(position) = position {
            println!(
                "  {:<12} alt {:>6.2}  az {:>6.2}  x {:>8.1}  y {:>8.1}",
                name, position.altitude, position.azimuth, projected.point.x, projected.point.y
            );
        }
    }

    if let Some((x, y)) = select {
        match selected {
            Some(name) => println!("selected   {} at ({}, {})", name, x, y),
            None => println!("selected   nothing at ({}, {})", x, y),
        }
    }
}

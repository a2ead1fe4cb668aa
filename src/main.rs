//! `geodesk` command line tool.

use std::path::PathBuf;

use argh::FromArgs;
use geodesk::config::{AppConfig, LogLevel};
use geodesk::document::DocumentError;
use geodesk::format;
use geodesk::model::ImagePoint;
use geodesk::transform::REQUIRED_CONTROL_POINTS;
use geodesk::viewport::{ScrollBar, Size, ViewPoint, ViewState, map_click_to_image};

/// Georeference scanned maps from three control points.
#[derive(Debug, FromArgs)]
struct Args {
    /// log verbosity: error, warn, info, debug or trace
    #[argh(option)]
    log_level: Option<LogLevel>,

    /// configuration file (defaults to the user configuration directory)
    #[argh(option)]
    config: Option<PathBuf>,

    #[argh(subcommand)]
    command: Command,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
enum Command {
    Solve(SolveArgs),
    Locate(LocateArgs),
    Click(ClickArgs),
}

/// Solve a transform from a reference point file and write a world file
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "solve")]
struct SolveArgs {
    /// reference point file with three `imageX imageY lon lat` lines
    #[argh(positional)]
    points: PathBuf,

    /// world file to write
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// fractional digits written (shortest exact decimals by default)
    #[argh(option)]
    precision: Option<usize>,

    /// replace an existing world file
    #[argh(switch, short = 'f')]
    force: bool,
}

/// Print the geographic position of an image pixel
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "locate")]
struct LocateArgs {
    /// world file of the image
    #[argh(positional)]
    world_file: PathBuf,

    /// pixel column
    #[argh(positional)]
    x: f64,

    /// pixel row
    #[argh(positional)]
    y: f64,

    /// print JSON instead of plain text
    #[argh(switch)]
    json: bool,
}

/// Map a click in a zoomed and scrolled view to image pixel coordinates
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "click")]
struct ClickArgs {
    /// click x in view coordinates
    #[argh(positional)]
    x: f64,

    /// click y in view coordinates
    #[argh(positional)]
    y: f64,

    /// unscaled image size as `width,height`
    #[argh(option, from_str_fn(parse_size))]
    image: Size,

    /// visible area size as `width,height`
    #[argh(option, from_str_fn(parse_size))]
    viewport: Size,

    /// zoom factor
    #[argh(option, default = "1.0")]
    scale: f64,

    /// horizontal scroll bar as `value,min,max`
    #[argh(option, from_str_fn(parse_scroll_bar))]
    scroll_x: Option<ScrollBar>,

    /// vertical scroll bar as `value,min,max`
    #[argh(option, from_str_fn(parse_scroll_bar))]
    scroll_y: Option<ScrollBar>,

    /// image widget offset as `x,y`
    #[argh(option, from_str_fn(parse_view_point))]
    origin: Option<ViewPoint>,

    /// also georeference the pixel with this world file
    #[argh(option)]
    world_file: Option<PathBuf>,
}

fn parse_numbers<const N: usize>(value: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {} comma-separated numbers, got '{}'", N, value));
    }

    let mut numbers = [0.0; N];
    for (number, part) in numbers.iter_mut().zip(&parts) {
        *number = part
            .parse()
            .map_err(|_| format!("'{}' is not a number", part))?;
    }
    Ok(numbers)
}

fn parse_size(value: &str) -> Result<Size, String> {
    let [width, height] = parse_numbers::<2>(value)?;
    Ok(Size::new(width, height))
}

fn parse_view_point(value: &str) -> Result<ViewPoint, String> {
    let [x, y] = parse_numbers::<2>(value)?;
    Ok(ViewPoint::new(x, y))
}

fn parse_scroll_bar(value: &str) -> Result<ScrollBar, String> {
    let [v, min, max] = parse_numbers::<3>(value)?;
    Ok(ScrollBar::new(v as i32, min as i32, max as i32, 0))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = argh::from_env();

    let config = match &args.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load_from_default_path().unwrap_or_default(),
    };

    let level = args.log_level.unwrap_or(config.preferences.log_level);
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .init();
    log::debug!("Log level: {}", level.name());

    match args.command {
        Command::Solve(cmd) => solve(cmd, &config),
        Command::Locate(cmd) => locate(cmd),
        Command::Click(cmd) => click(cmd, &config),
    }
}

fn solve(cmd: SolveArgs, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let points = format::load_reference_points(&cmd.points)?;
    let points: [_; REQUIRED_CONTROL_POINTS] =
        points
            .as_slice()
            .try_into()
            .map_err(|_| DocumentError::WrongPointCount {
                expected: REQUIRED_CONTROL_POINTS,
                found: points.len(),
            })?;

    let transform = config.affine_solver().solve(&points)?;

    if cmd.output.exists() && !cmd.force {
        return Err(DocumentError::WorldFileExists { path: cmd.output }.into());
    }

    let precision = cmd.precision.or(config.output.world_file_precision);
    format::save_world_file_with_precision(&cmd.output, &transform, precision)?;
    println!("{}", format::to_world_string(&transform, precision).trim_end());
    Ok(())
}

fn locate(cmd: LocateArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !format::is_world_file_name(&cmd.world_file) {
        log::warn!("{:?} does not look like a world file", cmd.world_file);
    }
    let transform = format::load_world_file(&cmd.world_file)?;
    let geo = transform.apply(ImagePoint::new(cmd.x, cmd.y));

    if cmd.json {
        println!("{}", serde_json::to_string(&geo)?);
    } else {
        println!("{} {}", geo.lon(), geo.lat());
    }
    Ok(())
}

fn click(cmd: ClickArgs, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut view = ViewState::new(cmd.image, cmd.viewport).with_zoom_settings(config.zoom_settings());
    view.set_scale_factor(cmd.scale);
    if let Some(bar) = cmd.scroll_x {
        view.horizontal = bar;
    }
    if let Some(bar) = cmd.scroll_y {
        view.vertical = bar;
    }
    if let Some(origin) = cmd.origin {
        view.origin = origin;
    }

    let image = map_click_to_image(ViewPoint::new(cmd.x, cmd.y), &view);
    if !image.is_within(cmd.image.width, cmd.image.height) {
        log::warn!("Click {} is outside the image", image);
    }

    match cmd.world_file {
        Some(path) => {
            let geo = format::load_world_file(&path)?.apply(image);
            println!("{} {} {} {}", image.x(), image.y(), geo.lon(), geo.lat());
        }
        None => println!("{} {}", image.x(), image.y()),
    }
    Ok(())
}

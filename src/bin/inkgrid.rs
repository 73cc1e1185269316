use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use inkgrid::{
    BlobParams, GenerativeGrid, GridConfig, ManualHost, MotionPreference, PixelSurface, Rgba8,
    SeededRandom, StructureGenerator, SyntheticClock, Viewport,
};

#[derive(Parser, Debug)]
#[command(name = "inkgrid", version)]
struct Cli {
    /// Log library diagnostics to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print blob path data, or write an SVG/PNG preview.
    Blob(BlobArgs),
    /// Animate a grid background on a synthetic clock and write the result as PNG.
    Grid(GridArgs),
    /// Dump the generated structure layout as JSON.
    Structures(StructuresArgs),
}

#[derive(Parser, Debug)]
struct BlobArgs {
    /// Parameter string, e.g. "size:1.2, seed:42, shape:square".
    #[arg(long, default_value = "")]
    params: String,

    /// Seed for parameters the string leaves out. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Host image aspect ratio (width / height); shapes squares.
    #[arg(long)]
    aspect: Option<f64>,

    /// Fill color for previews.
    #[arg(long, default_value = "#e85d5d")]
    color: String,

    /// Output `.svg` or `.png`. Prints path data to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Edge length of PNG previews.
    #[arg(long, default_value_t = 512)]
    size: u32,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Grid configuration JSON. Missing keys use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Layout seed. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 800)]
    height: u32,
}

#[derive(Parser, Debug)]
struct GridArgs {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Synthetic time to run the animation for.
    #[arg(long, default_value_t = 5000.0)]
    duration_ms: f64,

    /// Draw the static reduced-motion state instead of animating.
    #[arg(long)]
    reduced_motion: bool,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Also write the final state snapshot as JSON.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct StructuresArgs {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Output JSON path. Prints to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    match cli.cmd {
        Command::Blob(args) => cmd_blob(args),
        Command::Grid(args) => cmd_grid(args),
        Command::Structures(args) => cmd_structures(args),
    }
}

fn cmd_blob(args: BlobArgs) -> anyhow::Result<()> {
    let seed = args.seed.unwrap_or_else(inkgrid::session_seed);
    let spec = BlobParams::parse(&args.params).resolve(&mut SeededRandom::new(seed));

    let Some(out) = args.out else {
        println!("{}", spec.path_data(args.aspect));
        return Ok(());
    };

    let color = Rgba8::from_hex(&args.color)?;
    let svg = spec.preview_svg(color, args.aspect);
    let is_png = out
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));

    create_parent_dir(&out)?;
    if is_png {
        let png = inkgrid::rasterize_svg_png(&svg, args.size, args.size)?;
        std::fs::write(&out, png).with_context(|| format!("write png '{}'", out.display()))?;
    } else {
        std::fs::write(&out, svg).with_context(|| format!("write svg '{}'", out.display()))?;
    }

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_grid(args: GridArgs) -> anyhow::Result<()> {
    let config = load_config(args.layout.config.as_deref())?;
    let viewport = viewport(&args.layout)?;
    let seed = args.layout.seed.unwrap_or_else(inkgrid::session_seed);
    let mut grid = GenerativeGrid::new(config, viewport, seed)?;

    let mut surface = PixelSurface::for_viewport(viewport)?;
    let mut host = ManualHost::new();
    let mut clock = SyntheticClock::display_60hz();

    let motion = if args.reduced_motion {
        MotionPreference::Reduced
    } else {
        MotionPreference::Full
    };
    grid.mount(motion, clock.now(), &mut surface, &mut host);

    while clock.now() < args.duration_ms && host.take_pending() {
        let now = clock.advance();
        grid.on_frame(now, None, &mut surface, &mut host);
    }

    let snapshot = grid.snapshot();
    tracing::debug!(
        state = ?snapshot.state,
        fill_index = snapshot.fill_index,
        "grid run finished"
    );

    create_parent_dir(&args.out)?;
    surface
        .write_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());

    if let Some(path) = args.snapshot {
        write_json(&path, &snapshot)?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_structures(args: StructuresArgs) -> anyhow::Result<()> {
    let config = load_config(args.layout.config.as_deref())?;
    let viewport = viewport(&args.layout)?;
    let seed = args.layout.seed.unwrap_or_else(inkgrid::session_seed);

    let grid = inkgrid::Grid::new(viewport, config.cell_size);
    let structures = StructureGenerator::new(config.attempts).generate(
        grid.cols(),
        grid.rows(),
        &mut SeededRandom::new(seed),
        &config.palette,
    );

    let doc = serde_json::json!({
        "seed": seed,
        "cols": grid.cols(),
        "rows": grid.rows(),
        "structures": structures,
    });

    match args.out {
        Some(path) => {
            write_json(&path, &doc)?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&doc)?),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GridConfig> {
    match path {
        Some(p) => {
            GridConfig::from_path(p).with_context(|| format!("load config '{}'", p.display()))
        }
        None => Ok(GridConfig::default()),
    }
}

fn viewport(args: &LayoutArgs) -> anyhow::Result<Viewport> {
    Ok(Viewport::new(f64::from(args.width), f64::from(args.height))?)
}

fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn write_json(path: &Path, value: &impl serde::Serialize) -> anyhow::Result<()> {
    create_parent_dir(path)?;
    let s = serde_json::to_string_pretty(value).context("serialize json")?;
    std::fs::write(path, s).with_context(|| format!("write json '{}'", path.display()))
}

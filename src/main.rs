use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;

use lifefade::render::{self, Palette};
use lifefade::{GridSimulation, Params, Script, SimulationController, patterns};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// 20 Hz, short trail
    Classic,
    /// 15 Hz, long trail
    LongTrail,
}

#[derive(Parser, Debug)]
#[command(name = "lifefade")]
#[command(about = "Headless Game of Life with fading trails, rendered to PNG snapshots", long_about = None)]
struct Args {
    /// JSON params file; CLI flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Preset::Classic)]
    preset: Preset,

    #[arg(long)]
    rows: Option<usize>,

    #[arg(long)]
    cols: Option<usize>,

    #[arg(long)]
    cell_size: Option<usize>,

    /// Treat grid edges as hard borders instead of a torus
    #[arg(long, default_value_t = false)]
    no_wrap: bool,

    /// Start from an empty grid instead of a random one
    #[arg(long, default_value_t = false)]
    empty: bool,

    #[arg(long)]
    rng_seed: Option<u64>,

    /// Stamp a named pattern at the grid center
    #[arg(long)]
    pattern: Option<String>,

    #[arg(long, default_value_t = 600)]
    frames: usize,

    /// Simulated render rate
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Save every Nth frame (0 saves only the last)
    #[arg(long, default_value_t = 60)]
    snapshot_every: usize,

    #[arg(long, default_value = "artifacts")]
    out: PathBuf,

    /// Commands to replay, e.g. "120:pause,150:step,200:pause"
    #[arg(long, default_value = "")]
    script: String,
}

fn load_params(args: &Args) -> lifefade::Result<Params> {
    let mut params = match &args.config {
        Some(path) => Params::from_json(&std::fs::read_to_string(path)?)?,
        None => match args.preset {
            Preset::Classic => Params::default(),
            Preset::LongTrail => Params::long_trail(),
        },
    };
    if let Some(rows) = args.rows {
        params.rows = rows;
    }
    if let Some(cols) = args.cols {
        params.cols = cols;
    }
    if let Some(cell_size) = args.cell_size {
        params.cell_size = cell_size;
    }
    if args.no_wrap {
        params.wrap = false;
    }
    if args.empty || args.pattern.is_some() {
        params.seed = false;
    }
    if args.rng_seed.is_some() {
        params.rng_seed = args.rng_seed;
    }
    params.validate()?;
    Ok(params)
}

fn main() -> lifefade::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let params = load_params(&args)?;
    let script: Script = args.script.parse()?;

    std::fs::create_dir_all(&args.out)?;
    let params_path = args.out.join("params.json");
    std::fs::write(&params_path, params.to_json()?)?;
    info!("Saved {}", params_path.display());

    let mut sim = GridSimulation::from_params(&params)?;
    if let Some(name) = &args.pattern {
        let pattern = patterns::find(name)?;
        let (h, w) = pattern.extent();
        sim.place(
            pattern,
            params.rows.saturating_sub(h) / 2,
            params.cols.saturating_sub(w) / 2,
        )?;
    }

    info!(
        "Running {}x{} grid for {} frames at {} fps, {} Hz updates, {} scripted command(s)",
        params.rows,
        params.cols,
        args.frames,
        args.fps,
        params.update_rate_hz,
        script.len()
    );

    let frame_ms = if args.fps > 0.0 { 1000.0 / args.fps } else { 0.0 };
    let palette = Palette::default();
    let (w, h) = (params.width_px(), params.height_px());
    let last = args.frames.saturating_sub(1);

    let mut controller = SimulationController::new(sim);
    let timings = lifefade::run(&mut controller, args.frames, frame_ms, &script, |frame, sim| {
        let due = frame == last || (args.snapshot_every > 0 && frame % args.snapshot_every == 0);
        if !due {
            return Ok(());
        }
        let rgba = render::render_frame(sim, params.cell_size, &palette);
        let path = args.out.join(format!("frame_{frame:05}.png"));
        image::save_buffer(&path, &rgba, w as u32, h as u32, image::ColorType::Rgba8)?;
        info!(
            "Saved {} (generation {}, population {})",
            path.display(),
            sim.generation(),
            sim.population()
        );
        Ok(())
    })?;

    info!("Timings:");
    for t in &timings {
        info!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    Ok(())
}

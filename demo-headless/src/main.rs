use clap::Parser;
use fluid_sim_core::{
    viewport_to_grid, ExecutionMode, FluidConfig, FluidSimulation, KernelId, PointerInput, Vec2,
};
use nalgebra::Rotation2;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Fluid simulation demo driven by a scripted pointer stroke
#[derive(Parser, Debug)]
#[command(name = "fluid-sim-demo")]
#[command(about = "Headless 2D grid fluid simulation demo", long_about = None)]
struct Args {
    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 240)]
    frames: u32,

    /// TOML configuration file (missing keys use defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the simulation resolution
    #[arg(short = 's', long)]
    resolution: Option<usize>,

    /// Override the render resolution
    #[arg(long)]
    render_resolution: Option<usize>,

    /// Run every kernel on the calling thread
    #[arg(long)]
    serial: bool,

    /// Frames per full turn of the pointer circle
    #[arg(long, default_value_t = 120)]
    turn_frames: u32,

    /// Radius of the pointer circle as a fraction of the viewport
    #[arg(long, default_value_t = 0.25)]
    stroke_radius: f32,

    /// Release the pointer after this many frames (0 = never)
    #[arg(long, default_value_t = 0)]
    release_after: u32,

    /// Seed for the density color sequence
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Report interval in frames
    #[arg(short, long, default_value_t = 30)]
    report_interval: u32,

    /// Write the final density image to this PNG file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<FluidConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => FluidConfig::load(path)?,
        None => FluidConfig::default(),
    };
    if let Some(resolution) = args.resolution {
        config.simulation_resolution = resolution;
    }
    if let Some(render) = args.render_resolution {
        config.render_resolution = render;
    }
    if args.serial {
        config.execution = ExecutionMode::Serial;
    }
    config.validate()?;
    Ok(config)
}

/// Pointer position on the scripted circle, in normalized viewport space
fn stroke_position(frame: u32, turn_frames: u32, radius: f32) -> Vec2 {
    let angle = frame as f32 / turn_frames.max(1) as f32 * std::f32::consts::TAU;
    let offset = Rotation2::new(angle) * Vec2::new(radius, 0.0);
    Vec2::new(0.5, 0.5) + offset
}

fn save_png(path: &Path, pixels: Vec<u8>, size: usize) -> Result<(), Box<dyn Error>> {
    let image = image::RgbaImage::from_raw(size as u32, size as u32, pixels)
        .ok_or("rendered image has the wrong size")?;
    // Grid rows run bottom to top; image rows run top to bottom
    image::imageops::flip_vertical(&image).save(path)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let resolution = config.simulation_resolution;
    let render_resolution = config.render_resolution;

    println!("=== Fluid Simulation Demo ===\n");
    println!(
        "Grid {res}x{res}, render {render}x{render}, viscosity {}, dt {}, {} iterations",
        config.viscosity,
        config.delta_time,
        config.solver_iterations,
        res = resolution,
        render = render_resolution,
    );

    let mut sim = FluidSimulation::with_seed(config, args.seed)?;
    let frame_dt = 1.0 / 60.0;

    for frame in 0..args.frames {
        let viewport = stroke_position(frame, args.turn_frames, args.stroke_radius);
        let position = viewport_to_grid(viewport, resolution);
        let input = if args.release_after > 0 && frame >= args.release_after {
            PointerInput::hover(position)
        } else {
            PointerInput::drag(position)
        };
        sim.update(&input, frame_dt);

        if args.report_interval > 0 && (frame + 1) % args.report_interval == 0 {
            let stats = sim.stats();
            println!(
                "Frame {:>5}: density {:>10.3}, peak speed {:>7.3}, {:>7.2}ms/frame",
                stats.frame, stats.total_density, stats.peak_speed, stats.last_frame_ms
            );
            if !stats.total_density.is_finite() || !stats.peak_speed.is_finite() {
                warn!("Simulation diverged at frame {}", stats.frame);
            }
        }
    }

    let stats = sim.stats();
    println!("\n=== Final State ===");
    println!("Frames: {}", stats.frame);
    println!("Total density: {:.3}", stats.total_density);
    println!("Peak speed: {:.3}", stats.peak_speed);
    println!("Kernel launches: {}", stats.kernel_launches);

    println!("\n=== Kernel Timings ===");
    for (kernel, kernel_stats) in sim.solver().kernel_stats() {
        if kernel_stats.launches == 0 {
            continue;
        }
        println!(
            "{:<18} {:>8} launches {:>10.2}ms",
            kernel.name(),
            kernel_stats.launches,
            kernel_stats.total_ms
        );
    }
    let jacobi = sim
        .solver()
        .kernel_stats()
        .into_iter()
        .find(|(kernel, _)| *kernel == KernelId::Jacobi)
        .map_or(0, |(_, s)| s.launches);
    info!("Jacobi sweeps per frame: {}", jacobi / stats.frame.max(1));

    if let Some(path) = &args.output {
        save_png(path, sim.render(), render_resolution)?;
        println!("\nWrote {}", path.display());
    }

    Ok(())
}

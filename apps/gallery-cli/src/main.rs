use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use gallery_assets::{HeadlessTextureHost, UploadedFile};
use gallery_common::GalleryConfig;
use gallery_input::{InputAdapter, InputState};
use gallery_kernel::Gallery;
use gallery_motion::MotionController;
use gallery_render::{DebugTextRenderer, RenderView, Renderer};
use glam::Vec3;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gallery-cli", about = "CLI tool for gallery layouts and walkthroughs")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and room info
    Info,
    /// Print the effective configuration as YAML
    Config,
    /// Hang images and print where each one ends up
    Layout {
        /// Image files, hung in order
        files: Vec<PathBuf>,
        /// Add N generated images of varying aspect ratio
        #[arg(short, long, default_value = "0")]
        synthetic: usize,
        /// Print placements as JSON
        #[arg(long)]
        json: bool,
    },
    /// Simulate walking from the spawn point with keys held
    Walk {
        /// Frames with keys held
        #[arg(short, long, default_value = "50")]
        steps: u32,
        /// Seconds per frame
        #[arg(long, default_value = "0.1")]
        dt: f32,
        /// Held keys, any of W A S D
        #[arg(short, long, default_value = "W")]
        keys: String,
        /// Frames after release
        #[arg(long, default_value = "10")]
        settle_steps: u32,
    },
}

/// Aspect ratios cycled through by `layout --synthetic`.
const SYNTHETIC_SIZES: [(u32, u32); 4] = [(20, 10), (10, 10), (15, 10), (10, 15)];

fn synthetic_files(count: usize) -> anyhow::Result<Vec<UploadedFile>> {
    (0..count)
        .map(|i| -> anyhow::Result<UploadedFile> {
            let (w, h) = SYNTHETIC_SIZES[i % SYNTHETIC_SIZES.len()];
            let mut buf = Cursor::new(Vec::new());
            DynamicImage::ImageRgba8(RgbaImage::new(w, h)).write_to(&mut buf, ImageFormat::Png)?;
            Ok(UploadedFile::new(
                format!("synthetic-{i}.png"),
                "image/png",
                buf.into_inner(),
            ))
        })
        .collect()
}

fn layout(
    config: &GalleryConfig,
    files: Vec<PathBuf>,
    synthetic: usize,
    json: bool,
) -> anyhow::Result<()> {
    let mut uploads = Vec::with_capacity(files.len() + synthetic);
    for path in &files {
        uploads.push(
            UploadedFile::read(path).with_context(|| format!("reading {}", path.display()))?,
        );
    }
    uploads.extend(synthetic_files(synthetic)?);

    let mut gallery = Gallery::new(config.room, config.layout);
    let mut host = HeadlessTextureHost::new();
    let report = gallery.upload(uploads, &mut host);
    for name in &report.skipped {
        eprintln!("skipped (not an image): {name}");
    }
    for (name, e) in &report.failed {
        eprintln!("skipped (undecodable): {name}: {e}");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(gallery.placements())?);
    } else {
        let view = RenderView {
            eye: config.camera.spawn,
            look: Vec3::NEG_Z,
            fov_degrees: config.camera.fov_degrees,
        };
        print!("{}", DebugTextRenderer::new().render(&gallery, &view));
        println!("layout hash: {:#018x}", gallery.layout_hash());
    }

    gallery.teardown(&mut host);
    Ok(())
}

fn walk(
    config: &GalleryConfig,
    steps: u32,
    dt: f32,
    keys: &str,
    settle_steps: u32,
) -> anyhow::Result<()> {
    if !(dt.is_finite() && dt >= 0.0) {
        bail!("--dt must be a non-negative number, got {dt}");
    }

    let mut adapter = InputAdapter::from_config(&config.input)?;
    for c in keys.chars() {
        let code = format!("Key{}", c.to_ascii_uppercase());
        if !adapter.handle_key(&code, true) {
            bail!("'{c}' is not bound to a movement action");
        }
    }

    let controller = MotionController::new(config.motion, config.room, config.camera.spawn);
    let look = Vec3::NEG_Z;
    let mut state = controller.spawn_state();
    println!(
        "start: ({:.3}, {:.3}, {:.3})",
        state.position.x, state.position.y, state.position.z
    );

    for frame in 0..steps {
        state = controller.advance(state, adapter.state(), look, dt);
        tracing::debug!(frame, x = state.position.x, z = state.position.z, "step");
    }
    println!(
        "after {steps} frames holding {keys}: ({:.3}, {:.3}, {:.3}) speed {:.4}/frame",
        state.position.x,
        state.position.y,
        state.position.z,
        state.velocity.length()
    );

    adapter.clear();
    let released = InputState::new();
    for frame in 0..settle_steps {
        let before = state.position;
        state = controller.advance(state, &released, look, dt);
        println!(
            "  settle {:>3}: moved {:.5}",
            frame + 1,
            (state.position - before).length()
        );
    }
    println!(
        "rest: ({:.3}, {:.3}, {:.3})",
        state.position.x, state.position.y, state.position.z
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = GalleryConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Info => {
            let gallery = Gallery::new(config.room, config.layout);
            println!("gallery-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "room: {}x{}x{} (walkable within ±{})",
                config.room.size, config.room.size, config.room.height, config.room.walk_bound
            );
            println!("wall capacity: {}", gallery.capacity());
            println!("key bindings: {}", config.input.bindings.len());
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
        Commands::Layout {
            files,
            synthetic,
            json,
        } => layout(&config, files, synthetic, json)?,
        Commands::Walk {
            steps,
            dt,
            keys,
            settle_steps,
        } => walk(&config, steps, dt, &keys, settle_steps)?,
    }

    Ok(())
}

//! Ember command line renderer.
//!
//! Loads a JSON scene (or builds the random spheres demo), renders it on a
//! fixed pool of worker threads and writes a BMP, PPM or PNG file, or streams
//! PPM to stdout with `-o -`.

use anyhow::{Context, Result};
use clap::Parser;
use ember_renderer::{write_image, write_ppm, CameraConfig, Renderer};
use std::io::{BufWriter, Write};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod cli;
mod scene;

use cli::{default_threads, Args, OutputTarget};
use scene::{cover_scene, load_scene};

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    log::info!("Starting Ember {}", env!("CARGO_PKG_VERSION"));

    let base = CameraConfig::default().with_threads(default_threads());
    let mut scene = match &args.scene {
        Some(path) => load_scene(path, base)
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => {
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            cover_scene(base, &mut rng)
        }
    };
    args.apply(&mut scene.camera);

    let mut renderer = Renderer::new(scene.camera);
    let image = renderer.render(&scene.world).context("Render failed")?;

    match args.output_target() {
        OutputTarget::Stdout => {
            let mut out = BufWriter::new(std::io::stdout().lock());
            write_ppm(&image, &mut out).context("Failed to write image to stdout")?;
            out.flush().context("Failed to flush stdout")?;
            log::info!("Wrote PPM image to stdout");
        }
        OutputTarget::File(path) => {
            write_image(&image, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }

    Ok(())
}

//! Simple path tracer example.
//!
//! Renders three spheres on a ground plane and saves to BMP format.

use ember_renderer::{
    write_image, CameraConfig, Color, Dielectric, HittableList, Lambertian, Metal, Renderer,
    Sphere, Vec3,
};

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let world = build_scene();

    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    let config = CameraConfig::default()
        .with_resolution(400, 225)
        .with_quality(50, 10)
        .with_position(
            Vec3::new(-2.0, 2.0, 1.0), // look_from
            Vec3::new(0.0, 0.0, -1.0), // look_at
            Vec3::new(0.0, 1.0, 0.0),  // vup
        )
        .with_lens(20.0, 10.0, 3.4)
        .with_threads(threads);

    let image = match Renderer::new(config).render(&world) {
        Ok(image) => image,
        Err(e) => {
            log::error!("Render failed: {}", e);
            std::process::exit(1);
        }
    };

    let filename = "simple_render.bmp";
    if let Err(e) = write_image(&image, filename) {
        log::error!("Failed to save image: {}", e);
        std::process::exit(1);
    }
}

fn build_scene() -> HittableList {
    let mut world = HittableList::new();

    // Ground
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, -100.5, -1.0),
        100.0,
        Lambertian::new(Color::new(0.8, 0.8, 0.0)),
    )));

    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, 0.0, -1.2),
        0.5,
        Lambertian::new(Color::new(0.1, 0.2, 0.5)),
    )));

    // Hollow glass: outer shell plus an inverted inner surface
    world.add(Box::new(Sphere::new(
        Vec3::new(-1.0, 0.0, -1.0),
        0.5,
        Dielectric::new(1.5),
    )));
    world.add(Box::new(Sphere::new(
        Vec3::new(-1.0, 0.0, -1.0),
        0.4,
        Dielectric::new(1.0 / 1.5),
    )));

    world.add(Box::new(Sphere::new(
        Vec3::new(1.0, 0.0, -1.0),
        0.5,
        Metal::new(Color::new(0.8, 0.6, 0.2), 1.0),
    )));

    world
}

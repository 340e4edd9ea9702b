//! Scene descriptions: JSON scene files and the built-in demo scene.

use ember_renderer::{
    CameraConfig, Color, Dielectric, Hittable, HittableList, Lambertian, Metal, Sphere, Vec3,
};
use rand::Rng;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a scene file.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("object {index}: sphere radius must be finite and positive, got {radius}")]
    InvalidRadius { index: usize, radius: f32 },
}

/// Result type for scene loading.
pub type SceneResult<T> = Result<T, SceneError>;

/// Everything needed to render: camera settings plus geometry.
pub struct Scene {
    pub camera: CameraConfig,
    pub world: HittableList,
}

/// Camera block of a scene file. Absent fields keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraSettings {
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    pub samples_per_pixel: Option<u32>,
    pub max_depth: Option<u32>,
    pub vfov: Option<f32>,
    pub look_from: Option<[f32; 3]>,
    pub look_at: Option<[f32; 3]>,
    pub vup: Option<[f32; 3]>,
    pub defocus_angle: Option<f32>,
    pub focus_dist: Option<f32>,
    pub threads: Option<usize>,
    pub seed: Option<u64>,
}

impl CameraSettings {
    fn apply(&self, config: &mut CameraConfig) {
        macro_rules! set {
            ($field:ident) => {
                if let Some(value) = self.$field {
                    config.$field = value;
                }
            };
            ($field:ident, vec) => {
                if let Some(value) = self.$field {
                    config.$field = Vec3::from_array(value);
                }
            };
        }

        set!(image_width);
        set!(image_height);
        set!(samples_per_pixel);
        set!(max_depth);
        set!(vfov);
        set!(look_from, vec);
        set!(look_at, vec);
        set!(vup, vec);
        set!(defocus_angle);
        set!(focus_dist);
        set!(threads);
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

/// Surface description of a scene object.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDesc {
    Lambertian {
        albedo: [f32; 3],
    },
    Metal {
        albedo: [f32; 3],
        #[serde(default)]
        fuzz: f32,
    },
    Dielectric {
        refraction_index: f32,
    },
}

/// Geometry description of a scene object.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectDesc {
    Sphere {
        center: [f32; 3],
        radius: f32,
        material: MaterialDesc,
    },
}

impl ObjectDesc {
    fn check(&self, index: usize) -> SceneResult<()> {
        match *self {
            ObjectDesc::Sphere { radius, .. } => {
                if radius.is_finite() && radius > 0.0 {
                    Ok(())
                } else {
                    Err(SceneError::InvalidRadius { index, radius })
                }
            }
        }
    }

    fn build(&self) -> Box<dyn Hittable> {
        match *self {
            ObjectDesc::Sphere {
                center,
                radius,
                material,
            } => sphere(Vec3::from_array(center), radius, material),
        }
    }
}

/// Top level of a scene file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneFile {
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub objects: Vec<ObjectDesc>,
}

impl SceneFile {
    /// Parse a scene from JSON text.
    pub fn from_json(text: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the renderable scene, layering file settings over `base`.
    pub fn into_scene(self, base: CameraConfig) -> SceneResult<Scene> {
        let mut camera = base;
        self.camera.apply(&mut camera);

        let mut world = HittableList::new();
        for (index, object) in self.objects.iter().enumerate() {
            object.check(index)?;
            world.add(object.build());
        }

        Ok(Scene { camera, world })
    }
}

/// Load a JSON scene file.
pub fn load_scene(path: &Path, base: CameraConfig) -> SceneResult<Scene> {
    let text = std::fs::read_to_string(path)?;
    let file = SceneFile::from_json(&text)?;
    log::info!("Loaded {} object(s) from {}", file.objects.len(), path.display());
    file.into_scene(base)
}

fn sphere(center: Vec3, radius: f32, material: MaterialDesc) -> Box<dyn Hittable> {
    match material {
        MaterialDesc::Lambertian { albedo } => Box::new(Sphere::new(
            center,
            radius,
            Lambertian::new(Color::from_array(albedo)),
        )),
        MaterialDesc::Metal { albedo, fuzz } => Box::new(Sphere::new(
            center,
            radius,
            Metal::new(Color::from_array(albedo), fuzz),
        )),
        MaterialDesc::Dielectric { refraction_index } => {
            Box::new(Sphere::new(center, radius, Dielectric::new(refraction_index)))
        }
    }
}

/// Ground, three large feature spheres and a grid of small random spheres.
pub fn cover_scene(base: CameraConfig, rng: &mut impl Rng) -> Scene {
    let camera = base
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0);

    let mut world = HittableList::new();

    // Ground
    world.add(sphere(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        MaterialDesc::Lambertian {
            albedo: [0.5, 0.5, 0.5],
        },
    ));

    for a in -11..11 {
        for b in -11..11 {
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            // Keep clear of the large metal sphere
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat: f32 = rng.gen();
            let material = if choose_mat < 0.8 {
                MaterialDesc::Lambertian {
                    albedo: [
                        rng.gen::<f32>() * rng.gen::<f32>(),
                        rng.gen::<f32>() * rng.gen::<f32>(),
                        rng.gen::<f32>() * rng.gen::<f32>(),
                    ],
                }
            } else if choose_mat < 0.95 {
                MaterialDesc::Metal {
                    albedo: [
                        0.5 + 0.5 * rng.gen::<f32>(),
                        0.5 + 0.5 * rng.gen::<f32>(),
                        0.5 + 0.5 * rng.gen::<f32>(),
                    ],
                    fuzz: 0.5 * rng.gen::<f32>(),
                }
            } else {
                MaterialDesc::Dielectric {
                    refraction_index: 1.5,
                }
            };

            world.add(sphere(center, 0.2, material));
        }
    }

    // Three main spheres
    world.add(sphere(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        MaterialDesc::Dielectric {
            refraction_index: 1.5,
        },
    ));
    world.add(sphere(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        MaterialDesc::Lambertian {
            albedo: [0.4, 0.2, 0.1],
        },
    ));
    world.add(sphere(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        MaterialDesc::Metal {
            albedo: [0.7, 0.6, 0.5],
            fuzz: 0.0,
        },
    ));

    log::info!("Built cover scene with {} objects", world.len());
    Scene { camera, world }
}

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};

use crate::asset_pipeline::materials::{Material, Shading, TextureData, TextureSettings};
use crate::asset_pipeline::mtl::{self, MaterialLibrary};
use crate::asset_pipeline::obj::{self, ObjModel};
use crate::color::Color;
use crate::material_manager::{fallback_texture, load_texture};
use crate::scene_graph::{ObjectId, Scene};

/// Everything decoded off the main thread: parsed geometry, its material library and
/// the library's diffuse textures keyed by material name.
pub struct LoadedAsset {
    pub name: String,
    pub models: Vec<ObjModel>,
    pub library: MaterialLibrary,
    pub textures: HashMap<String, TextureData>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Loading,
    Loaded,
    Failed(String),
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStatus::Loading => write!(f, "loading"),
            LoadStatus::Loaded => write!(f, "loaded"),
            LoadStatus::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn diffuse_texture_settings() -> TextureSettings {
    TextureSettings {
        wrap_repeat: true,
        nearest_mag_filter: false,
        repeat: Vec2::ONE,
        srgb: true,
    }
}

/// Reads the material library first, decodes its textures, then reads the geometry.
pub fn load_asset(name: &str, mtl_path: &Path, obj_path: &Path) -> Result<LoadedAsset> {
    let base_dir = mtl_path.parent().unwrap_or(Path::new(""));
    let library = mtl::parse(open(mtl_path)?, base_dir)
        .with_context(|| format!("Failed to parse {}", mtl_path.display()))?;

    let mut textures = HashMap::new();
    for material in &library.materials {
        let Some(path) = &material.diffuse_map else {
            continue;
        };

        let texture = load_texture(path, diffuse_texture_settings()).unwrap_or_else(|e| {
            log::warn!("{:#}; using a generated texture instead", e);
            fallback_texture(path, diffuse_texture_settings())
        });
        textures.insert(material.name.clone(), texture);
    }

    let set = obj::parse(open(obj_path)?)
        .with_context(|| format!("Failed to parse {}", obj_path.display()))?;

    if let Some(mtllib) = &set.mtllib {
        let expected = mtl_path.file_name().map(|n| n.to_string_lossy());
        if expected.as_deref() != Some(mtllib.as_str()) {
            log::debug!("{} names mtllib {} but {} was loaded", name, mtllib, mtl_path.display());
        }
    }

    Ok(LoadedAsset {
        name: name.to_string(),
        models: set.to_models(),
        library,
        textures,
    })
}

/// Loads one OBJ/MTL pair on a worker thread. The main loop polls once per frame.
pub struct AssetLoader {
    name: String,
    receiver: Receiver<Result<LoadedAsset>>,
    handle: Option<JoinHandle<()>>,
    status: LoadStatus,
}

impl AssetLoader {
    pub fn spawn(name: impl Into<String>, mtl_path: PathBuf, obj_path: PathBuf) -> Self {
        let name = name.into();
        let (sender, receiver) = mpsc::channel();

        let thread_name = name.clone();
        let handle = thread::spawn(move || {
            let result = load_asset(&thread_name, &mtl_path, &obj_path);
            // The receiver is gone if the app shut down mid-load
            let _ = sender.send(result);
        });

        log::info!("Loading {} in the background", name);

        Self {
            name,
            receiver,
            handle: Some(handle),
            status: LoadStatus::Loading,
        }
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Non-blocking. Yields the result exactly once.
    pub fn poll(&mut self) -> Option<Result<LoadedAsset>> {
        if self.status != LoadStatus::Loading {
            return None;
        }

        let result = match self.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                Err(anyhow::anyhow!("Loader thread for {} exited early", self.name))
            }
        };

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Loader thread for {} panicked", self.name);
            }
        }

        self.status = match &result {
            Ok(_) => LoadStatus::Loaded,
            Err(e) => LoadStatus::Failed(format!("{:#}", e)),
        };
        Some(result)
    }
}

fn phong_from(library: &MaterialLibrary, name: Option<&str>) -> Material {
    let Some(mtl) = name.and_then(|name| library.get(name)) else {
        if let Some(name) = name {
            log::warn!("Material {} is not in the library", name);
        }
        return Material::phong(Color::WHITE);
    };

    Material::new(
        mtl.name.clone(),
        Shading::Phong {
            color: mtl.diffuse,
            map: None,
            flat_shading: false,
            specular: mtl.specular,
            shininess: mtl.shininess,
        },
    )
    .with_opacity(mtl.opacity)
}

/// Adds the asset under a new group at `position`, one Phong mesh per model.
pub fn attach(scene: &mut Scene, asset: LoadedAsset, position: Vec3) -> ObjectId {
    let LoadedAsset {
        name,
        models,
        library,
        mut textures,
    } = asset;

    let root = scene.add_group(name.clone(), None);
    scene.set_object_translation(root, position);

    let mut material_ids = HashMap::new();
    for ObjModel { model, material } in models {
        let material_id = *material_ids
            .entry(material.clone())
            .or_insert_with(|| {
                let mut phong = phong_from(&library, material.as_deref());
                if let Some(texture) = material.as_ref().and_then(|m| textures.remove(m)) {
                    let texture = scene.materials.add_texture(texture);
                    phong = phong.with_map(texture);
                }
                scene.materials.add_material(phong)
            });

        let mesh_name = model.name.clone();
        let model_id = scene.add_model(model, material_id);
        scene.add_mesh(mesh_name, model_id, Some(root));
    }

    log::info!(
        "Attached {} with {} meshes at {}",
        name,
        scene.get_object(root).map_or(0, |o| o.child_ids.len()),
        position
    );

    root
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    const OBJ: &str = "\
mtllib crate.mtl
o Crate
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
v 0 2 0
usemtl Wood
f 1 2 3 4
usemtl Metal
f 1 2 5
f 2 3 5
";

    const MTL: &str = "\
newmtl Wood
Kd 0.5 0.3 0.1
newmtl Metal
Kd 0.7 0.7 0.7
Ns 200
";

    fn parsed() -> LoadedAsset {
        let library = mtl::parse(MTL.as_bytes(), Path::new(".")).unwrap();
        let models = obj::parse(OBJ.as_bytes()).unwrap().to_models();
        LoadedAsset {
            name: "Crate".to_string(),
            models,
            library,
            textures: HashMap::new(),
        }
    }

    #[test]
    fn attach_adds_one_mesh_per_material_group() {
        let mut scene = Scene::new();
        let root = attach(&mut scene, parsed(), Vec3::new(0.0, 0.0, 5.0));
        scene.late_update();

        let group = scene.get_object(root).unwrap();
        assert_eq!(group.child_ids.len(), 2);
        assert_eq!(scene.mesh_count(), 2);
        assert_eq!(scene.materials.material_count(), 2);

        let bounds = scene.world_bounds(root).unwrap();
        assert!((bounds.center().z - 5.0).abs() < 1e-5);

        let metal = scene.get_object(group.child_ids[1]).unwrap();
        let model = scene.get_model(metal.model_id.unwrap()).unwrap();
        let material = scene.materials.material(model.material).unwrap();
        assert!(matches!(
            material.shading,
            Shading::Phong { shininess, .. } if shininess == 200.0
        ));
    }

    #[test]
    fn unknown_material_falls_back_to_white_phong() {
        let library = MaterialLibrary::default();
        let material = phong_from(&library, Some("Missing"));
        assert!(matches!(material.shading, Shading::Phong { color, .. } if color == Color::WHITE));
    }

    #[test]
    fn dissolve_carries_into_the_material() {
        let library =
            mtl::parse("newmtl Glass\nKd 1 1 1\nd 0.4\n".as_bytes(), Path::new(".")).unwrap();
        let material = phong_from(&library, Some("Glass"));

        assert!((material.opacity - 0.4).abs() < 1e-6);
        assert!(material.is_transparent());
        assert!(!phong_from(&library, None).is_transparent());
    }

    #[test]
    fn missing_files_report_failure() {
        let mut loader = AssetLoader::spawn(
            "nothing",
            PathBuf::from("does/not/exist.mtl"),
            PathBuf::from("does/not/exist.obj"),
        );

        let deadline = Instant::now() + Duration::from_secs(10);
        let result = loop {
            if let Some(result) = loader.poll() {
                break result;
            }
            assert!(Instant::now() < deadline, "loader never finished");
            thread::sleep(Duration::from_millis(5));
        };

        assert!(result.is_err());
        assert!(matches!(loader.status(), LoadStatus::Failed(_)));
        assert!(loader.poll().is_none());
    }

    #[test]
    fn loads_the_bundled_bus() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/models");
        let asset = load_asset("Bus", &root.join("bus.mtl"), &root.join("bus.obj")).unwrap();

        assert!(!asset.models.is_empty());
        assert!(asset.library.materials.len() >= 2);
        for model in &asset.models {
            let material = model.material.as_deref().unwrap();
            assert!(asset.library.get(material).is_some(), "{} missing", material);
        }
    }
}

use std::{
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, channel},
        Arc, RwLock,
    },
    time::Duration,
};

use anyhow::Context;
use id_arena::{Arena, Id};
use naga::{
    back::wgsl::WriterFlags,
    valid::{Capabilities, ValidationFlags},
};
use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
};
use notify_debouncer_mini::{
    new_debouncer_opt, notify::*, DebounceEventResult, DebouncedEventKind, Debouncer,
};
use pollster::block_on;
use wgpu::{PollType, RenderPipeline};

const SHARED_MODULES_FOLDER: &str = "shared";

type PipelineFactory = Box<
    dyn Sync
        + Send
        + Fn(&wgpu::Device, &ShaderDefinition, &str) -> anyhow::Result<wgpu::RenderPipeline>,
>;

#[derive(Debug, Clone)]
pub(crate) struct ShaderDefinition {
    pub name: &'static str,
    pub path: &'static str,
}

pub struct ShaderEntry {
    pipeline_id: PipelineId,
    def: ShaderDefinition,
    factory: PipelineFactory,
}

impl ShaderEntry {
    pub fn new(pipeline_id: PipelineId, def: ShaderDefinition, factory: PipelineFactory) -> Self {
        Self {
            pipeline_id,
            def,
            factory,
        }
    }
}

pub type PipelineId = Id<PipelineCacheEntry>;

#[derive(Default)]
pub struct PipelineCacheEntry(Option<wgpu::RenderPipeline>);

impl PipelineCacheEntry {
    pub fn set_pipeline(&mut self, pipeline: wgpu::RenderPipeline) {
        self.0 = Some(pipeline);
    }
}

pub struct PipelineCacheBuilder {
    shaders: Arena<ShaderEntry>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCacheBuilder {
    pub fn new() -> Self {
        Self {
            shaders: Arena::new(),
            pipelines: Arena::new(),
        }
    }

    /// Several pipelines may come from the same file; all of them are rebuilt when it changes.
    pub fn add_shader(
        &mut self,
        shader_def: ShaderDefinition,
        factory: PipelineFactory,
    ) -> PipelineId {
        let pipeline_id = self.pipelines.alloc(PipelineCacheEntry::default());
        let shader_entry = ShaderEntry::new(pipeline_id, shader_def, factory);
        self.shaders.alloc(shader_entry);
        pipeline_id
    }

    pub fn build(self) -> PipelineCache {
        PipelineCache {
            shaders: Arc::new(self.shaders),
            pipelines: self.pipelines,
        }
    }
}

pub struct PipelineCache {
    shaders: Arc<Arena<ShaderEntry>>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCache {
    pub fn get(&self, id: PipelineId) -> Option<&RenderPipeline> {
        self.pipelines.get(id).and_then(|entry| entry.0.as_ref())
    }

    fn get_entry_mut(&mut self, id: PipelineId) -> Option<&mut PipelineCacheEntry> {
        self.pipelines.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    fn iter_shaders_and_pipelines_mut(
        &mut self,
    ) -> impl Iterator<Item = (&ShaderEntry, &mut PipelineCacheEntry)> {
        // Shaders and pipelines are allocated in pairs by `add_shader`
        self.shaders
            .iter()
            .map(|(_, shader_entry)| shader_entry)
            .zip(
                self.pipelines
                    .iter_mut()
                    .map(|(_, pipeline_entry)| pipeline_entry),
            )
    }
}

type CompiledPipeline = (&'static str, PipelineId, wgpu::RenderPipeline);

/// Compiles every registered shader up front and, when hot reloading is on, recompiles
/// changed files on the watcher thread. New pipelines are swapped in by `load_pending_shaders`.
pub(crate) struct ShaderLoader {
    pub cache: PipelineCache,
    device: wgpu::Device,
    shader_dir: PathBuf,
    receiver: mpsc::Receiver<CompiledPipeline>,
    composer: Arc<RwLock<Composer>>,
    _debouncer: Option<Debouncer<RecommendedWatcher>>,
}

impl ShaderLoader {
    pub fn new(
        device: wgpu::Device,
        cache_builder: PipelineCacheBuilder,
        shader_dir: PathBuf,
        hot_reload: bool,
    ) -> anyhow::Result<Self> {
        let cache = cache_builder.build();
        let (send_new_pipelines, recv_new_pipelines) = channel();

        let composer = create_composer(&shader_dir)
            .context("Failed to create composer for shader loader")?;
        let composer = Arc::new(RwLock::new(composer));

        let debouncer = if hot_reload {
            Some(watch_shaders(
                &device,
                &shader_dir,
                cache.shaders.clone(),
                composer.clone(),
                send_new_pipelines,
            )?)
        } else {
            None
        };

        let mut shader_loader = Self {
            device,
            cache,
            shader_dir,
            receiver: recv_new_pipelines,
            composer,
            _debouncer: debouncer,
        };

        shader_loader
            .create_all_pipelines()
            .context("Failed to create all pipelines")?;

        log::info!(
            "Compiled {} pipelines from {} (hot reload {})",
            shader_loader.cache.len(),
            shader_loader.shader_dir.display(),
            if hot_reload { "on" } else { "off" }
        );

        Ok(shader_loader)
    }

    fn create_all_pipelines(&mut self) -> anyhow::Result<()> {
        let device = self.device.clone();
        let shader_dir = self.shader_dir.clone();
        let composer = self.composer.clone();

        for (shader, pipeline_entry) in self.cache.iter_shaders_and_pipelines_mut() {
            let pipeline = compile_file(
                &device,
                &shader_dir,
                &shader.def,
                &shader.factory,
                &composer,
            )
            .with_context(|| format!("Failed to compile shader: {}", shader.def.name))?;
            pipeline_entry.set_pipeline(pipeline);
        }
        Ok(())
    }

    pub fn load_pending_shaders(&mut self) {
        while let Ok((name, pipeline_id, pipeline)) = self.receiver.try_recv() {
            if let Some(entry) = self.cache.get_entry_mut(pipeline_id) {
                log::info!("Shader reloaded: {}", name);
                entry.set_pipeline(pipeline);
            }
        }
    }
}

fn watch_shaders(
    device: &wgpu::Device,
    shader_dir: &Path,
    shaders: Arc<Arena<ShaderEntry>>,
    composer: Arc<RwLock<Composer>>,
    sender: mpsc::Sender<CompiledPipeline>,
) -> anyhow::Result<Debouncer<RecommendedWatcher>> {
    let device = device.clone();
    let absolute_shader_dir = shader_dir
        .canonicalize()
        .with_context(|| format!("Shader folder {} not found", shader_dir.display()))?;
    let shared_dir = absolute_shader_dir.join(SHARED_MODULES_FOLDER);
    let loader_dir = shader_dir.to_path_buf();

    let mut debouncer = new_debouncer_opt(
        notify_debouncer_mini::Config::default().with_timeout(Duration::from_millis(100)),
        move |res: DebounceEventResult| {
            let events = match res {
                Ok(events) => events,
                Err(e) => {
                    log::error!("Error debouncing shader changes: {}", e);
                    return;
                }
            };

            for event in events {
                if event.kind != DebouncedEventKind::Any {
                    continue;
                }

                // A shared module can be imported by anything, so rebuild all of them
                let shared_changed = event.path.starts_with(&shared_dir);
                if shared_changed {
                    match create_composer(&loader_dir) {
                        Ok(new_composer) => match composer.write() {
                            Ok(mut guard) => *guard = new_composer,
                            Err(_) => {
                                log::error!("Shader composer lock poisoned");
                                return;
                            }
                        },
                        Err(e) => {
                            log::error!("Failed to reload shared shader modules: {:#}", e);
                            continue;
                        }
                    }
                }

                for (_, entry) in shaders
                    .iter()
                    .filter(|(_, entry)| shared_changed || event.path.ends_with(entry.def.path))
                {
                    match compile_file(&device, &loader_dir, &entry.def, &entry.factory, &composer) {
                        Ok(pipeline) => {
                            if sender
                                .send((entry.def.name, entry.pipeline_id, pipeline))
                                .is_err()
                            {
                                return;
                            }
                        }
                        Err(e) => log::error!("Failed to load shader: {:#}", e),
                    }
                }
            }
        },
    )
    .context("Failed to create shader file watcher")?;

    debouncer
        .watcher()
        .watch(&absolute_shader_dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", absolute_shader_dir.display()))?;

    Ok(debouncer)
}

fn compile_file(
    device: &wgpu::Device,
    shader_dir: &Path,
    shader_def: &ShaderDefinition,
    factory: &PipelineFactory,
    composer: &RwLock<Composer>,
) -> anyhow::Result<wgpu::RenderPipeline> {
    let path = shader_dir.join(shader_def.path);
    let shader_code = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read shader file {}", path.display()))?;

    let file_path = path.to_string_lossy().to_string();

    let module = {
        let mut composer = composer
            .write()
            .map_err(|_| anyhow::anyhow!("Shader composer lock poisoned"))?;

        composer
            .make_naga_module(NagaModuleDescriptor {
                file_path: &file_path,
                source: &shader_code,
                ..Default::default()
            })
            .with_context(|| format!("Failed to compose {}", file_path))?
    };

    // wgpu validates again when the module is created; this only builds the info the writer needs
    let info = naga::valid::Validator::new(ValidationFlags::empty(), Capabilities::all())
        .validate(&module)
        .context("Failed to validate Naga module")?;

    let shader_code = naga::back::wgsl::write_string(&module, &info, WriterFlags::empty())
        .context("Failed to convert Naga module to WGSL string")?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let pipeline = factory(device, shader_def, &shader_code);

    device
        .poll(PollType::Wait)
        .context("Failed to poll device after shader compilation.")?;

    if let Some(error) = block_on(device.pop_error_scope()) {
        anyhow::bail!("Shader compilation failed for {}: {}", shader_def.name, error);
    }

    pipeline
}

fn create_composer(shader_dir: &Path) -> anyhow::Result<Composer> {
    let shared_dir = shader_dir.join(SHARED_MODULES_FOLDER);
    let shared_files = std::fs::read_dir(&shared_dir)
        .with_context(|| format!("Failed to read {}", shared_dir.display()))?;

    let mut paths = shared_files
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .context("Failed to list shared shader modules")?;
    paths.retain(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "wgsl"));
    // Imports must be registered before their importers; the file names are ordered that way
    paths.sort();

    let mut composer = Composer::default();
    for path in paths {
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_path = path.to_string_lossy().to_string();

        composer
            .add_composable_module(ComposableModuleDescriptor {
                source: &source,
                file_path: &file_path,
                language: ShaderLanguage::Wgsl,
                ..Default::default()
            })
            .with_context(|| format!("Failed to add shared shader module: {}", file_path))?;
    }

    Ok(composer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shader_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/shaders")
    }

    #[test]
    fn bundled_shaders_compose_and_validate() {
        let composer = RwLock::new(create_composer(&shader_dir()).unwrap());

        for file in ["sky.wgsl", "scene.wgsl", "celestial.wgsl"] {
            let path = shader_dir().join(file);
            let source = std::fs::read_to_string(&path).unwrap();
            let module = composer
                .write()
                .unwrap()
                .make_naga_module(NagaModuleDescriptor {
                    file_path: &path.to_string_lossy(),
                    source: &source,
                    ..Default::default()
                })
                .unwrap_or_else(|e| panic!("{}: {:?}", file, e));

            naga::valid::Validator::new(ValidationFlags::all(), Capabilities::all())
                .validate(&module)
                .unwrap_or_else(|e| panic!("{}: {:?}", file, e));
        }
    }
}

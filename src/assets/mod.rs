//! # Asset Loading
//!
//! Furniture models are read off the main thread. Each request runs on its
//! own worker thread and reports through a `oneshot` channel; the
//! [`AssetLoader`] polls those channels once per frame without blocking.
//!
//! Loaded models are normalized before they are handed back: scaled to the
//! kind's target height, resting on `y = 0`, centered on the vertical axis.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};

use futures::channel::oneshot;
use thiserror::Error;

use crate::{
    furniture::{self, Furniture, FurnitureKind},
    gfx::scene::{ItemId, Mesh, Model},
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read model {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("model {0} contains no triangles")]
    Empty(PathBuf),
    #[error("load worker stopped before reporting a result")]
    WorkerLost,
    #[error("could not start load worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Source of furniture models
pub trait ModelProvider: Send + Sync + 'static {
    /// Produces the raw model for `furniture`; normalization happens in the loader
    fn load(&self, furniture: &dyn Furniture) -> Result<Model, LoadError>;
}

/// Reads `<kind>.obj` files from a directory
#[derive(Debug, Clone)]
pub struct ObjDirectory {
    root: PathBuf,
}

impl ObjDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load_file(path: &Path) -> Result<Model, LoadError> {
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| LoadError::Obj {
            path: path.to_path_buf(),
            source,
        })?;

        let meshes: Vec<Mesh> = models
            .iter()
            .map(|m| &m.mesh)
            .filter(|mesh| !mesh.indices.is_empty())
            .map(|mesh| {
                // Use normals from the file if they line up, otherwise calculate them
                let normals = if mesh.normals.len() == mesh.positions.len() {
                    mesh.normals.clone()
                } else {
                    Mesh::calculate_normals(&mesh.positions, &mesh.indices)
                };
                Mesh::from_flat(&mesh.positions, &normals, mesh.indices.clone())
            })
            .collect();

        if meshes.is_empty() {
            return Err(LoadError::Empty(path.to_path_buf()));
        }
        Ok(Model::new(meshes))
    }
}

impl ModelProvider for ObjDirectory {
    fn load(&self, furniture: &dyn Furniture) -> Result<Model, LoadError> {
        Self::load_file(&self.root.join(furniture.asset_file()))
    }
}

/// Result of one finished request
#[derive(Debug)]
pub struct CompletedLoad {
    pub item: ItemId,
    pub kind: FurnitureKind,
    pub result: Result<Model, LoadError>,
}

struct PendingLoad {
    item: ItemId,
    kind: FurnitureKind,
    receiver: oneshot::Receiver<Result<Model, LoadError>>,
}

/// Runs model loads on worker threads and collects their results
pub struct AssetLoader {
    provider: Arc<dyn ModelProvider>,
    pending: Vec<PendingLoad>,
    ready: Vec<CompletedLoad>,
}

impl AssetLoader {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            pending: Vec::new(),
            ready: Vec::new(),
        }
    }

    pub fn from_directory(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(ObjDirectory::new(root)))
    }

    /// Starts loading the model for `kind` on behalf of `item`
    pub fn request(&mut self, item: ItemId, kind: FurnitureKind) {
        let (sender, receiver) = oneshot::channel();
        let provider = Arc::clone(&self.provider);

        let spawned = thread::Builder::new()
            .name(format!("load-{}", kind.slug()))
            .spawn(move || {
                let furniture = furniture::create(kind);
                let result = provider
                    .load(furniture.as_ref())
                    .map(|model| model.normalize_to_height(furniture.target_height()));
                // The receiver is gone only if the loader was dropped
                let _ = sender.send(result);
            });

        match spawned {
            Ok(_) => {
                log::debug!("Loading {} model for item {}", kind, item);
                self.pending.push(PendingLoad {
                    item,
                    kind,
                    receiver,
                });
            }
            Err(e) => self.ready.push(CompletedLoad {
                item,
                kind,
                result: Err(LoadError::Spawn(e)),
            }),
        }
    }

    /// Collects finished loads without blocking
    pub fn poll(&mut self) -> Vec<CompletedLoad> {
        let mut completed = std::mem::take(&mut self.ready);

        self.pending.retain_mut(|load| {
            let result = match load.receiver.try_recv() {
                Ok(Some(result)) => result,
                Ok(None) => return true,
                Err(oneshot::Canceled) => Err(LoadError::WorkerLost),
            };
            completed.push(CompletedLoad {
                item: load.item,
                kind: load.kind,
                result,
            });
            false
        });

        completed
    }

    /// Blocks until every outstanding load has reported
    pub fn finish_all(&mut self) -> Vec<CompletedLoad> {
        let mut completed = std::mem::take(&mut self.ready);

        for load in self.pending.drain(..) {
            let result = futures::executor::block_on(load.receiver)
                .unwrap_or_else(|oneshot::Canceled| Err(LoadError::WorkerLost));
            completed.push(CompletedLoad {
                item: load.item,
                kind: load.kind,
                result,
            });
        }

        completed
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len() + self.ready.len()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::atomic::{AtomicUsize, Ordering}};

    use super::*;
    use crate::gfx::geometry::generate_box;

    struct BoxProvider;

    impl ModelProvider for BoxProvider {
        fn load(&self, _furniture: &dyn Furniture) -> Result<Model, LoadError> {
            Ok(Model::from_geometry(&generate_box(1.0, 4.0, 1.0)))
        }
    }

    struct MissingProvider;

    impl ModelProvider for MissingProvider {
        fn load(&self, furniture: &dyn Furniture) -> Result<Model, LoadError> {
            Err(LoadError::Empty(PathBuf::from(furniture.asset_file())))
        }
    }

    fn scratch_dir() -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "furnish-assets-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loaded_models_are_normalized() {
        let mut loader = AssetLoader::new(Arc::new(BoxProvider));
        loader.request(ItemId(7), FurnitureKind::Table);

        let mut done = loader.finish_all();
        assert_eq!(done.len(), 1);
        let load = done.remove(0);
        assert_eq!(load.item, ItemId(7));

        let bounds = load.result.unwrap().local_bounds();
        assert!((bounds.size().y - 0.75).abs() < 1e-4);
        assert!(bounds.min.y.abs() < 1e-4);
        assert_eq!(loader.pending_count(), 0);
    }

    #[test]
    fn failures_are_reported_not_raised() {
        let mut loader = AssetLoader::new(Arc::new(MissingProvider));
        loader.request(ItemId(1), FurnitureKind::Lamp);
        let done = loader.finish_all();
        assert!(matches!(done[0].result, Err(LoadError::Empty(_))));
    }

    #[test]
    fn poll_eventually_drains() {
        let mut loader = AssetLoader::new(Arc::new(BoxProvider));
        loader.request(ItemId(1), FurnitureKind::Chair);
        loader.request(ItemId(2), FurnitureKind::Bed);

        let mut seen = Vec::new();
        for _ in 0..500 {
            seen.extend(loader.poll().into_iter().map(|load| load.item));
            if loader.pending_count() == 0 {
                break;
            }
            thread::sleep(std::time::Duration::from_millis(2));
        }
        seen.sort();
        assert_eq!(seen, vec![ItemId(1), ItemId(2)]);
    }

    #[test]
    fn reads_obj_from_directory() {
        let dir = scratch_dir();
        fs::write(
            dir.join("chair.obj"),
            "v 0 0 0\nv 1 0 0\nv 1 2 0\nv 0 2 0\nf 1 2 3 4\n",
        )
        .unwrap();

        let model = ObjDirectory::new(&dir).load(furniture::create(FurnitureKind::Chair).as_ref()).unwrap();
        assert_eq!(model.triangle_count(), 2);
        assert_eq!(model.local_bounds().size().y, 2.0);

        let missing = ObjDirectory::new(&dir).load(furniture::create(FurnitureKind::Sofa).as_ref());
        assert!(matches!(missing, Err(LoadError::Obj { .. })));
        fs::remove_dir_all(dir).ok();
    }
}

use crate::backend::SegmentationModel;
use preprocess::Network;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

type Loader<B> = Box<dyn Fn(&Path) -> anyhow::Result<B> + Send + Sync>;

/// Lazily loaded models, one instance per network.
///
/// The map lock only guards lookup and insertion; each model sits behind its
/// own lock, so requests for different networks never wait on each other.
pub struct ModelRegistry<B> {
    models_dir: PathBuf,
    loader: Loader<B>,
    models: Mutex<HashMap<Network, Arc<Mutex<B>>>>,
}

impl<B: SegmentationModel + 'static> ModelRegistry<B> {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            loader: Box::new(|path| B::load_model(path)),
            models: Mutex::new(HashMap::new()),
        }
    }
}

impl<B> ModelRegistry<B> {
    /// Replace how model files are turned into models.
    pub fn with_loader(
        mut self,
        loader: impl Fn(&Path) -> anyhow::Result<B> + Send + Sync + 'static,
    ) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn model_path(&self, network: Network) -> PathBuf {
        self.models_dir.join(format!("{network}.onnx"))
    }

    /// Model for `network`, loading it on first use.
    pub fn get(&self, network: Network) -> anyhow::Result<Arc<Mutex<B>>> {
        if let Some(model) = self.lock_models()?.get(&network) {
            return Ok(Arc::clone(model));
        }

        let path = self.model_path(network);
        tracing::info!(%network, path = %path.display(), "Loading segmentation model");
        let model = (self.loader)(&path)
            .map_err(|e| e.context(format!("failed to load {network} model")))?;

        // Another request may have loaded it meanwhile; keep the first one.
        let mut models = self.lock_models()?;
        let model = models
            .entry(network)
            .or_insert_with(|| Arc::new(Mutex::new(model)));
        Ok(Arc::clone(model))
    }

    /// Load every network in `networks` up front.
    pub fn preload(&self, networks: &[Network]) -> anyhow::Result<()> {
        for &network in networks {
            self.get(network)?;
        }
        Ok(())
    }

    pub fn loaded(&self) -> Vec<Network> {
        self.models
            .lock()
            .map(|models| models.keys().copied().collect())
            .unwrap_or_default()
    }

    fn lock_models(
        &self,
    ) -> anyhow::Result<std::sync::MutexGuard<'_, HashMap<Network, Arc<Mutex<B>>>>> {
        self.models
            .lock()
            .map_err(|_| anyhow::anyhow!("Model registry lock poisoned"))
    }
}

use crate::backend::ExecutionProvider;
use preprocess::DEFAULT_MAX_SIDE;
use std::env;
use std::path::PathBuf;

pub use common::Environment;

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub environment: Environment,
    /// Directory holding one `<network>.onnx` file per network.
    pub models_dir: PathBuf,
    /// Longest image side fed to the model.
    pub max_image_size: usize,
    pub execution_provider: ExecutionProvider,
    pub intra_threads: usize,
}

impl InferenceConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let models_dir = env::var("MODELS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("models"));

        let max_image_size = env::var("MAX_IMAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&size: &usize| size > 0)
            .unwrap_or(DEFAULT_MAX_SIDE);

        let execution_provider = match env::var("EXECUTION_PROVIDER") {
            Ok(raw) => raw.parse()?,
            Err(_) => ExecutionProvider::Cpu,
        };

        let intra_threads = env::var("INTRA_THREADS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(4);

        Ok(Self {
            environment,
            models_dir,
            max_image_size,
            execution_provider,
            intra_threads,
        })
    }

    /// Create default configuration for testing
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            models_dir: PathBuf::from("models"),
            max_image_size: DEFAULT_MAX_SIDE,
            execution_provider: ExecutionProvider::Cpu,
            intra_threads: 1,
        }
    }
}

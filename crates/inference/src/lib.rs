pub mod backend;
pub mod config;
pub mod error;
pub mod invoker;
pub mod postprocessing;
pub mod processing;
pub mod registry;
pub mod request;
pub mod service;

// Re-export commonly used types for convenience
pub use backend::{ExecutionProvider, ModelInput, ModelOutput, SegmentationModel};
pub use config::InferenceConfig;
pub use error::SegmentError;
pub use invoker::{InferenceInvoker, Segmentation};
pub use postprocessing::{RestoredOutputs, restore_size};
pub use registry::ModelRegistry;
pub use request::SegmentationConfig;
pub use service::{SegmentOutcome, SegmentationService, TIMESTAMP_FORMAT};

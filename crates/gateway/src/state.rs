use crate::{samples::SampleCatalog, session::SessionStore, storage::UploadStore};
use inference::SegmentationService;
use std::sync::Arc;

pub struct AppState<B> {
    pub service: Arc<SegmentationService<B>>,
    pub sessions: Arc<SessionStore>,
    pub uploads: Arc<UploadStore>,
    pub samples: Arc<SampleCatalog>,
}

impl<B> AppState<B> {
    pub fn new(
        service: SegmentationService<B>,
        uploads: UploadStore,
        samples: SampleCatalog,
    ) -> Self {
        Self {
            service: Arc::new(service),
            sessions: Arc::new(SessionStore::new()),
            uploads: Arc::new(uploads),
            samples: Arc::new(samples),
        }
    }
}

// Derived Clone would demand `B: Clone`.
impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            sessions: Arc::clone(&self.sessions),
            uploads: Arc::clone(&self.uploads),
            samples: Arc::clone(&self.samples),
        }
    }
}

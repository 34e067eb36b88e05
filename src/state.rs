// src/state.rs
use crate::services::{
    auth_service::AdminAccount,
    capture_service::{CaptureManager, SharedStore},
    recognition_service::FaceMatcher,
};
use std::{sync::Arc, time::Duration};

/// Shared by every handler. The store sits behind one async mutex, so
/// mutations are serialised.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub admin: Arc<AdminAccount>,
    pub matcher: Arc<dyn FaceMatcher>,
    pub captures: CaptureManager,
    pub capture_interval: Duration,
}

impl AppState {
    pub fn new(
        store: SharedStore,
        admin: AdminAccount,
        matcher: Arc<dyn FaceMatcher>,
        capture_interval: Duration,
    ) -> Self {
        Self {
            store,
            admin: Arc::new(admin),
            matcher,
            captures: CaptureManager::default(),
            capture_interval,
        }
    }
}


//! `AppState`: the bundle of shared, read-only-at-serve-time collaborators
//! every controller needs. Grounded on `control::context::AppContext`'s
//! plain struct-of-handles shape, generalized to the normalization engine's
//! collaborators (SPEC_FULL.md §4.J).

use std::sync::Arc;

use normalizer_core::store::MultiStore;
use normalizer_core::{MessageNormalizer, Resolver, SetIdGenerator};
use reqwest_middleware::ClientWithMiddleware;

use crate::config::ApplicationSettings;

pub struct AppState {
    pub resolver: Resolver,
    pub settings: ApplicationSettings,
    pub store: Arc<dyn MultiStore>,
    pub callback_client: ClientWithMiddleware,
}

impl AppState {
    pub fn message_normalizer(&self) -> MessageNormalizer<'_> {
        MessageNormalizer::new(&self.resolver)
    }

    pub fn set_id_generator(&self) -> SetIdGenerator<'_> {
        SetIdGenerator::new(&self.resolver)
    }
}

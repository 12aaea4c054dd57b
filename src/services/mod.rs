//! Service layer for business logic
//!
//! Everything here is transport-free; the HTTP handlers in `api` only
//! translate requests into service calls and results into responses.

pub mod command;
pub mod key_generator;
pub mod link_store;
pub mod pages;
pub mod protected;
pub mod redirect;

use std::sync::Arc;

pub use command::{ApiStatus, CommandDispatcher, CommandRequest, CommandResponse};
pub use key_generator::KeyGenerator;
pub use link_store::{COUNTER_SUFFIX, KvEntry, LinkStore};
pub use pages::PageRenderer;
pub use protected::{AccessContext, ProtectedKeySet};
pub use redirect::{RedirectResolver, Resolution};

use crate::config::AppConfig;
use crate::storage::KvStore;

/// 共享给所有 handler 的应用状态
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub dispatcher: CommandDispatcher,
    pub resolver: RedirectResolver,
    pub pages: PageRenderer,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn KvStore>) -> Self {
        let links = Arc::new(LinkStore::new(store, &config));
        Self {
            dispatcher: CommandDispatcher::new(Arc::clone(&links), Arc::clone(&config)),
            resolver: RedirectResolver::new(links, Arc::clone(&config)),
            pages: PageRenderer::new(config.pages.clone()),
            config,
        }
    }
}

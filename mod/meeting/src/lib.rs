//! Meeting module — meeting records and the access gateway.
//!
//! # Resources
//!
//! - **Meeting** — link plus optional schedule metadata, owned by one user
//! - **User** — identity record; read-only here, owned by the auth collaborator
//!
//! # Usage
//!
//! ```ignore
//! use meeting::{MeetingModule, store::SqliteStore};
//!
//! let store = Arc::new(SqliteStore::open(&path)?);
//! let module = MeetingModule::new(store.clone(), store);
//! let router = module.routes();
//! ```

pub mod api;
pub mod model;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;

use meetmash_core::Module;

use crate::service::MeetingGateway;
use crate::store::{MeetingStore, UserStore};

/// Meeting module implementing the Module trait.
pub struct MeetingModule {
    gateway: Arc<MeetingGateway>,
}

impl MeetingModule {
    pub fn new(meetings: Arc<dyn MeetingStore>, users: Arc<dyn UserStore>) -> Self {
        Self {
            gateway: Arc::new(MeetingGateway::new(meetings, users)),
        }
    }

    /// Get a reference to the underlying gateway.
    pub fn gateway(&self) -> &Arc<MeetingGateway> {
        &self.gateway
    }
}

impl Module for MeetingModule {
    fn name(&self) -> &str {
        "meeting"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.gateway))
    }
}

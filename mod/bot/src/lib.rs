//! Bot dispatch module.
//!
//! Owns the admission window for creating meeting bots and the HTTP
//! client that talks to the external bot orchestrator. The REST
//! surface is two routes on `/bot-instances`: POST asks for a bot to
//! be dispatched to one of the caller's meetings, GET proxies the
//! caller's instance listing from the orchestrator.

pub mod api;
pub mod dispatch;
pub mod model;
pub mod orchestrator;

use std::sync::Arc;

use axum::Router;

use meeting::store::MeetingStore;
use meetmash_core::Module;

use crate::dispatch::DispatchService;
use crate::orchestrator::Orchestrator;

pub struct BotModule {
    service: Arc<DispatchService>,
}

impl BotModule {
    pub fn new(meetings: Arc<dyn MeetingStore>, orchestrator: Arc<dyn Orchestrator>) -> Self {
        Self {
            service: Arc::new(DispatchService::new(meetings, orchestrator)),
        }
    }

    pub fn service(&self) -> Arc<DispatchService> {
        self.service.clone()
    }
}

impl Module for BotModule {
    fn name(&self) -> &str {
        "bot"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}

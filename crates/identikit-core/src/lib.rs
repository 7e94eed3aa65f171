//! identikit-core: client core for an identity-generation studio.
//!
//! The backend does all synthesis (portrait, biography, voice); this crate
//! holds the typed HTTP client, the generation engine that turns one
//! long-running request into an observable progress stream, and the
//! operation wrappers that surface success/failure as user notifications.

mod client;
mod config;
mod engine;
mod error;
mod ops;
mod types;

pub use client::{IdentityBackend, IdentityClient};
pub use config::{GenerationMode, StudioConfig};
pub use engine::GenerationEngine;
pub use error::{ClientError, GenerationError, OpsError};
pub use ops::{Notification, Severity, StudioOps};
pub use types::{
    GeneratedIdentity, GenerationProgress, GenerationStatus, GenerationStep, SavedProfile,
    TaskHandle,
};

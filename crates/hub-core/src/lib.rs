//! Shared types for the twister-hub RPC hub: the wire protocol, the error
//! model, configuration resolution, and the project-model collaborator
//! seam. The registry, dispatcher, and resource engine that use these types
//! live in `twister-hub-daemon`.

pub mod config;
pub mod error;
pub mod home;
pub mod io;
pub mod logging;
pub mod project;
pub mod wire;

pub use error::HubError;
pub use project::ProjectModel;
pub use wire::{CommandEnvelope, Request, Response};

// Re-export for downstream crates that parse hub config files directly.
pub use toml;

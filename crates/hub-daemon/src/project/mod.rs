//! Reference [`twister_hub_core::ProjectModel`] implementation.

mod memory;

pub use memory::InMemoryProjectModel;

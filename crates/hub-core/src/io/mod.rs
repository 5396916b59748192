//! Locked and durable file operations shared by config loading and resource
//! persistence.

pub mod atomic;
pub mod error;
pub mod lock;

pub use atomic::atomic_write;
pub use error::IoError;
pub use lock::{acquire_lock, FileLock};

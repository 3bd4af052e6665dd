//! Persistent record of installed packages.
//!
//! - [`registry`] - The in-memory [`Registry`] consulted by the installer
//! - [`store`] - Backends that make the registry durable

pub mod registry;
pub mod store;

pub use registry::{InstalledPackage, Registry};
pub use store::{FileBackend, MemoryBackend, Records, RegistryBackend};

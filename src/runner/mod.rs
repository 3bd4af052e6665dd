//! Install orchestration.
//!
//! - [`resolver`] - Turns a requested package into an ordered plan
//! - [`plan`] - The ordered plan itself
//! - [`installer`] - Executes plans and removes packages

pub mod installer;
pub mod plan;
pub mod resolver;

pub use installer::{CancelHandle, InstallOptions, InstallProgress, InstallReport, Installer};
pub use plan::InstallPlan;
pub use resolver::{Resolver, MAX_DEPTH};

//! Packaging lifecycle plugin.
//!
//! The host fires [`LifecycleHook`]s; [`ParcelPlugin`] answers them by
//! resolving build jobs, running the bundler, redirecting the service path,
//! and afterwards relocating artifacts and removing the build folder.

pub mod hooks;
pub mod layout;
pub mod plugin;
pub mod relocate;
pub mod resolver;

pub use hooks::{LifecycleHook, Phase};
pub use layout::BuildLayout;
pub use plugin::{ParcelPlugin, PluginOptions};
pub use resolver::{parse_handler, resolve_jobs, HandlerRef, Selection};

pub mod config;
pub mod error;
pub mod observability;
pub mod service;

pub use error::{JobFailure, PackError};
pub use service::{CustomEntry, FunctionSpec, PackageSpec, ParcelConfig, Service, ServicePath};

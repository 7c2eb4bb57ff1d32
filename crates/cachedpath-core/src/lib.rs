//! Resolve a local path or remote URL (optionally `archive!entry`) to a local file.
//!
//! Remote resources are downloaded once into a content-addressed cache guarded by
//! per-entry advisory file locks; archives are extracted on demand.

pub mod archive;
pub mod cache;
pub mod config;
pub mod error;
pub mod identifier;
pub mod lock;
pub mod logging;
pub mod options;
pub mod progress;
pub mod resolver;
pub mod retry;
pub mod storage;
pub mod transport;

pub use error::{CachedPathError, Result};
pub use options::ResolveOptions;
pub use resolver::{resolve, Resolver};

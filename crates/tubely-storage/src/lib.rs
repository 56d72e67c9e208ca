//! Tubely Storage Library
//!
//! The object store gateway: a [`Storage`] trait with S3 and local filesystem
//! backends, generation of unguessable object keys and parsing of the
//! `{bucket},{key}` references persisted for signed-access deployments.
//!
//! # Storage key format
//!
//! Video keys are `{classification}/{64 hex chars}.{extension}`, for example
//! `landscape/9f86d081...0f00a08.mp4`. Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod reference;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::StorageObjectKey;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use reference::StorageReference;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;

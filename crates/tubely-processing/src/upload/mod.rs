//! Upload pipeline: authorize → stage → inspect → normalize → store → record.

mod location;
mod pipeline;
mod staging;

pub use location::VideoLocationStrategy;
pub use pipeline::VideoUploadPipeline;
pub use staging::{BodyError, ScratchPath, StagedUpload, STAGED_UPLOAD_PREFIX};

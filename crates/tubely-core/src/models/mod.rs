//! Data models for the application
//!
//! Each sub-module covers one feature area; the types are re-exported here.

mod aspect;
mod video;

pub use aspect::AspectClassification;
pub use video::{CreateVideoRequest, VideoRecord, VideoResponse};

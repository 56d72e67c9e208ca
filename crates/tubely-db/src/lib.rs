//! Tubely Database Library
//!
//! The metadata store for video records: a [`VideoRepository`] trait with a
//! PostgreSQL implementation and an in-memory one for development and tests.

pub mod db;

pub use db::{connect, run_migrations, InMemoryVideoRepository, PgVideoRepository, VideoRepository};

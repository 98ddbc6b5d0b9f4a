//! Facemark Adapters - External adapters for facemark.
//!
//! This crate provides adapters for:
//! - Filesystem image source
//! - Writing annotated canvases to disk
//! - Model downloading and caching

pub mod fs;
pub mod models;
pub mod presenter;

pub use fs::FsImageSource;
pub use models::{model_path, models_dir};
pub use presenter::FilePresenter;

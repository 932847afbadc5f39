pub mod config;
pub mod error;
pub mod logging;

// Pipeline stages, leaf-first.
pub mod naming;
pub mod scan;
pub mod fetch;
pub mod rewrite;
pub mod pretty;
pub mod downloader;
pub mod storage;
pub mod loader;

pub use config::{FetchConfig, LoaderConfig};
pub use error::LoadError;
pub use loader::{load_page, load_page_async, PageLoader, Phase};

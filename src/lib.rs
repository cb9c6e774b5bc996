#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod duration;
pub mod error;
pub mod filesystem;
pub mod generator;
pub mod manifest;
pub mod models;
pub mod patterns;

pub use config::{AssetGroupConfig, CacheStrategy, Config, DataGroupConfig, InstallMode};
pub use error::{ManifestError, ManifestResult};
pub use filesystem::{DirectoryFilesystem, Filesystem, InMemoryFilesystem};
pub use generator::ManifestGenerator;
pub use models::{HashTable, Manifest};

//! Resolution steps turning configuration sections into manifest entries.

mod asset_groups;
mod data_groups;
mod hashing;
mod navigation;

pub use asset_groups::{ResolvedAssetGroup, resolve_asset_group, resolve_asset_groups};
pub use data_groups::{resolve_data_group, resolve_data_groups};
pub use hashing::hash_files;
pub use navigation::{DEFAULT_NAVIGATION_URLS, process_navigation_urls};

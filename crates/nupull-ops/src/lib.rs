pub mod ops_download;
pub mod ops_fetch;
pub mod ops_resolve;
pub mod ops_versions;
pub mod settings;

//! NuGet registry protocol: the [`PackageRegistry`] contract, a NuGet V3
//! client over HTTPS, and an in-memory registry for tests.

pub mod error;
pub mod http;
pub mod memory;
pub mod nuget;
pub mod registration;
pub mod registry;
pub mod service_index;

pub use error::RegistryError;
pub use memory::InMemoryRegistry;
pub use nuget::NuGetRegistry;
pub use registry::{DownloadStatus, PackageRegistry};

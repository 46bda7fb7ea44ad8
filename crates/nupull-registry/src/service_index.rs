//! NuGet V3 service index (`index.json`): the list of resources a feed serves.

use serde::Deserialize;

/// Flat container: version lists and `.nupkg` files.
pub const PACKAGE_BASE_ADDRESS: &str = "PackageBaseAddress/3.0.0";

/// Registration resources, most preferred first.
pub const REGISTRATION_TYPES: &[&str] = &[
    "RegistrationsBaseUrl/3.6.0",
    "RegistrationsBaseUrl/3.4.0",
    "RegistrationsBaseUrl/3.0.0-rc",
    "RegistrationsBaseUrl",
];

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceIndex {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub resources: Vec<ServiceResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceResource {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
}

impl ServiceIndex {
    /// URL of the first resource of the given type, without a trailing slash.
    pub fn resource(&self, kind: &str) -> Option<&str> {
        self.resources
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| r.id.trim_end_matches('/'))
    }

    pub fn package_base_address(&self) -> Option<&str> {
        self.resource(PACKAGE_BASE_ADDRESS)
    }

    pub fn registrations_base_url(&self) -> Option<&str> {
        REGISTRATION_TYPES.iter().find_map(|kind| self.resource(kind))
    }
}

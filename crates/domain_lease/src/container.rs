//! Container reference data
//!
//! Containers are created by inventory intake elsewhere. The lease engine
//! only ever sees the denormalized summary embedded in a contract.

use serde::{Deserialize, Serialize};

use core_kernel::ContainerId;

/// Denormalized container fields carried on a lease contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Unique identifier
    pub id: ContainerId,
    /// Owner prefix + serial (e.g., "MSKU1234565")
    pub container_number: String,
    /// Pick-up depot or port
    pub origin: String,
    /// Drop-off depot or port
    pub destination: String,
    /// Size classification (e.g., "20ft", "40ft HC")
    pub size: String,
    /// Type classification (e.g., "dry", "reefer")
    pub container_type: String,
    /// Status label as last written by inventory; display only
    #[serde(default)]
    pub status_label: Option<String>,
}

impl Container {
    /// Creates a container summary
    pub fn new(
        container_number: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            id: ContainerId::new_v7(),
            container_number: container_number.into(),
            origin: origin.into(),
            destination: destination.into(),
            size: size.into(),
            container_type: "dry".to_string(),
            status_label: None,
        }
    }
}

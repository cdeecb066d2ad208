//! Lease Domain Ports
//!
//! The contract/container store is an external collaborator. The engine only
//! needs to list contracts (with denormalized container fields) and fetch one
//! by id; it never writes.
//!
//! ```rust,ignore
//! let store: Arc<dyn ContractPort> = Arc::new(InMemoryContractStore::from_json_file(path)?);
//! let overdue: Vec<_> = store
//!     .list_contracts()
//!     .await?
//!     .into_iter()
//!     .filter(|c| c.status(today) == LeaseStatus::Overage)
//!     .collect();
//! ```

use async_trait::async_trait;

use core_kernel::{ContractId, DomainPort, HealthCheckable, PortError};

use crate::contract::LeaseContract;

/// Read-only access to lease contracts
#[async_trait]
pub trait ContractPort: DomainPort + HealthCheckable {
    /// Lists every contract, in the store's stable iteration order
    async fn list_contracts(&self) -> Result<Vec<LeaseContract>, PortError>;

    /// Retrieves a contract by ID
    ///
    /// Returns `PortError::NotFound` if no such contract exists
    async fn get_contract(&self, id: ContractId) -> Result<LeaseContract, PortError>;
}

/// In-memory contract store
///
/// Holds contracts in insertion order. Used by the server when contracts are
/// supplied as a JSON export and by the test suites.
pub mod memory {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    use crate::contract::ContractRecord;
    use crate::error::LeaseError;

    /// Contract store backed by a `Vec` behind an async lock
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryContractStore {
        contracts: Arc<RwLock<Vec<LeaseContract>>>,
    }

    impl InMemoryContractStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a store pre-populated with `contracts`
        pub fn with_contracts(contracts: Vec<LeaseContract>) -> Self {
            Self {
                contracts: Arc::new(RwLock::new(contracts)),
            }
        }

        /// Loads a JSON array of [`ContractRecord`]s, validating every entry
        ///
        /// # Errors
        ///
        /// Returns `LeaseError::Seed` if the file cannot be read or parsed and
        /// `LeaseError::Validation` for the first record with invalid terms
        pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LeaseError> {
            let path = path.as_ref();
            let raw = std::fs::read_to_string(path)
                .map_err(|e| LeaseError::Seed(format!("{}: {}", path.display(), e)))?;
            let records: Vec<ContractRecord> = serde_json::from_str(&raw)
                .map_err(|e| LeaseError::Seed(format!("{}: {}", path.display(), e)))?;

            let contracts = records
                .into_iter()
                .map(LeaseContract::try_from)
                .collect::<Result<Vec<_>, _>>()?;

            tracing::info!(
                path = %path.display(),
                count = contracts.len(),
                "Loaded lease contracts"
            );

            Ok(Self::with_contracts(contracts))
        }
    }

    impl DomainPort for InMemoryContractStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryContractStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("memory-contracts")
        }
    }

    #[async_trait]
    impl ContractPort for InMemoryContractStore {
        async fn list_contracts(&self) -> Result<Vec<LeaseContract>, PortError> {
            Ok(self.contracts.read().await.clone())
        }

        async fn get_contract(&self, id: ContractId) -> Result<LeaseContract, PortError> {
            self.contracts
                .read()
                .await
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("LeaseContract", id))
        }
    }
}

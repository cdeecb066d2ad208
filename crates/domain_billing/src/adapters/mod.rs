//! Payment Gateway Adapters
//!
//! Implementations of [`PaymentGateway`](crate::payment::PaymentGateway).
//!
//! # Available Adapters
//!
//! - **SandboxGateway**: Issues order ids and approval links locally and
//!   captures on request. No network traffic; used by the server in
//!   sandbox mode and by the test suites.
//!
//! ```rust,ignore
//! let gateway: Arc<dyn PaymentGateway> = Arc::new(SandboxGateway::new(SandboxGatewayConfig {
//!     approval_base_url: "https://sandbox.pay.local".to_string(),
//! }));
//! ```

pub mod sandbox_gateway;

pub use sandbox_gateway::{SandboxGateway, SandboxGatewayConfig};

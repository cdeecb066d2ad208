//! HTTP API Layer
//!
//! This crate provides the REST API for the container lease billing engine
//! using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: calendar, billing runs, invoices, webhooks, event stream
//! - **Middleware**: JWT authentication, webhook secret check, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::in_memory(config)?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_billing::{
    DailyBillingRunner, EventBus, InMemoryInvoiceStore, InvoiceGenerator, InvoicePort,
    PaymentGateway, PaymentReconciler, SandboxGateway, SandboxGatewayConfig,
};
use domain_lease::{ContractPort, InMemoryContractStore, LeaseError};

use crate::config::ApiConfig;
use crate::handlers::{billing, calendar, events, health, invoices, webhooks};
use crate::middleware::{audit_middleware, auth_middleware, webhook_auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub contracts: Arc<dyn ContractPort>,
    pub invoices: Arc<dyn InvoicePort>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub runner: DailyBillingRunner,
    pub reconciler: PaymentReconciler,
    pub events: EventBus,
}

impl AppState {
    /// Wires the billing services on top of the given adapters
    pub fn new(
        config: ApiConfig,
        contracts: Arc<dyn ContractPort>,
        invoices: Arc<dyn InvoicePort>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let events = EventBus::with_capacity(config.event_channel_capacity);
        let generator = InvoiceGenerator::new(invoices.clone(), gateway.clone())
            .with_policy(config.billing_policy)
            .with_payment_method(config.payment_method);
        let runner = DailyBillingRunner::new(contracts.clone(), generator.clone(), events.clone());
        let reconciler =
            PaymentReconciler::new(invoices.clone(), gateway.clone(), generator, events.clone());

        Self {
            config,
            contracts,
            invoices,
            gateway,
            runner,
            reconciler,
            events,
        }
    }

    /// In-memory stores and the sandbox gateway
    ///
    /// Contracts are seeded from `config.contracts_file` when set.
    ///
    /// # Errors
    ///
    /// Returns `LeaseError` if the seed file cannot be loaded.
    pub fn in_memory(config: ApiConfig) -> Result<Self, LeaseError> {
        let contracts = match &config.contracts_file {
            Some(path) => InMemoryContractStore::from_json_file(path)?,
            None => InMemoryContractStore::new(),
        };
        let gateway = SandboxGateway::new(SandboxGatewayConfig {
            approval_base_url: config.gateway_approval_base_url.clone(),
        });

        Ok(Self::new(
            config,
            Arc::new(contracts),
            Arc::new(InMemoryInvoiceStore::new()),
            Arc::new(gateway),
        ))
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Provider callbacks, authenticated by shared secret
    let webhook_routes = Router::new()
        .route("/payments", post(webhooks::payment_webhook))
        .layer(axum_middleware::from_fn_with_state(state.clone(), webhook_auth_middleware));

    let billing_routes = Router::new()
        .route("/run", post(billing::run_billing))
        .route("/reconcile", post(billing::reconcile))
        .route("/events", get(events::billing_events));

    let invoice_routes = Router::new()
        .route("/", get(invoices::list_invoices))
        .route("/:id", get(invoices::get_invoice))
        .route("/:id/cancel", post(invoices::cancel_invoice));

    // Protected API routes
    let api_routes = Router::new()
        .route("/calendar", get(calendar::get_calendar))
        .nest("/billing", billing_routes)
        .nest("/invoices", invoice_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/webhooks", webhook_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

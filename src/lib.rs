//! # openerp-rs: An async Rust SDK for the OpenERP object API
//!
//! This SDK provides a thin, typed convenience layer over a remote
//! business-application server's object API, with a generic
//! find-or-create/update mediation layer and specialized record-mapping
//! clients built on top of it.
//!
//! ## Key Features
//!
//! - JSON-RPC object calls with lazy authentication and a fluent builder
//! - Generic CRUD mediation: unique lookups, upserts, guarded copies
//! - A partner record-mapping client with address handling
//! - Middleware support for call/result processing
//! - Secure password handling with memory zeroing
//! - TLS security configuration
//!
//! ## Basic Usage
//!
//! ```no_run
//! use openerp_rs::{from_env, PartnerProfile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a client from environment variables
//!     let erp = from_env()?;
//!
//!     // Ensure a partner exists, keyed by its external reference
//!     let profile = PartnerProfile::new("Acme Corp", "8778507587", "TRPL29", true, false);
//!     let partner = erp.partners().ensure(&profile).await?;
//!
//!     println!("partner id: {}", partner.partner_id);
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod client;
mod builder;
mod middleware;
mod config;
pub mod models;
pub mod utils;

// Re-export core components
pub use client::{OpenErp, TlsConfig, set_tls_config, MockRpcHandler};
pub use types::{
    Domain, DomainOp, ErpError, ErpModel, ErpResult, Record, RecordId, RpcCall, SecurePassword,
    Values, sanitize_error_message,
};
pub use builder::CallBuilder;
pub use middleware::{RequestMiddleware, ResponseMiddleware};
pub use config::ConnectionConfig;

// Re-export model-mapping components
pub mod prelude {
    //! Convenient imports for commonly used types and functions
    pub use crate::{
        from_env, new_client, ConnectionConfig, Domain, DomainOp, ErpError, ErpModel, ErpResult,
        OpenErp, SecurePassword, TlsConfig, Values, set_tls_config,
    };
    pub use crate::models::{
        AddressKind, AddressSpec, ModelClient, ModelHandle, ModelOperations, PartnerBinding,
        PartnerClient, PartnerProfile,
    };
}

// Public model-layer access
pub use models::{
    // Base traits
    ModelClient,
    ModelOperations,
    ValidationOperations,

    // Built-in clients and types
    CopyOutcome,
    ModelHandle,
    PartnerClient,
};

// Import-specific model types
pub use models::partner::{AddressKind, AddressSpec, PartnerBinding, PartnerProfile};

// Entry point functions
pub fn new_client(config: ConnectionConfig) -> ErpResult<OpenErp> {
    config.connect()
}

pub fn from_env() -> ErpResult<OpenErp> {
    ConnectionConfig::from_env()?.connect()
}

//! Base implementation for record-mapping clients.
//!
//! This module provides the foundation for record-mapping client
//! implementations, including common operations and error handling
//! patterns.

use crate::client::OpenErp;
use crate::models::{ModelClient, ModelOperations, ValidationOperations};
use crate::types::ErpModel;
use std::sync::Arc;

/// Base client for record-mapping implementations
/// Provides common functionality for all model clients
pub struct BaseModelClient {
    /// Reference to the connection
    erp: Arc<OpenErp>,
    /// The remote model this client is anchored to
    model: ErpModel,
}

impl BaseModelClient {
    /// Create a new base model client
    pub fn new(erp: Arc<OpenErp>, model: ErpModel) -> Self {
        Self { erp, model }
    }
}

impl ModelClient for BaseModelClient {
    fn model(&self) -> &ErpModel {
        &self.model
    }
}

impl ValidationOperations for BaseModelClient {}

impl ModelOperations for BaseModelClient {
    fn erp(&self) -> &Arc<OpenErp> {
        &self.erp
    }
}

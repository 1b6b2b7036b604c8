//! Record-Mapping Clients over Remote Models
//!
//! This module contains the generic CRUD-mediation layer and the
//! specialized clients built on it. Each record-mapping client
//! implements the `ModelClient` and `ModelOperations` traits and turns
//! local intent ("ensure this partner exists with these fields") into a
//! sequence of remote search/create/write calls.
//!
//! ## Architecture
//!
//! The model client system uses a trait-based approach:
//!
//! - `ModelClient` trait: identifies the model a client is anchored to
//! - `ValidationOperations` trait: common validation and error helpers
//! - `ModelOperations` trait: the find-or-create/update operations
//! - `BaseModelClient`: implements all three and serves as a composition base
//!
//! Record-mapping clients use composition rather than inheritance by
//! containing a `BaseModelClient` instance and delegating trait
//! implementations to it.
//!
//! ## Example: Creating a Custom Model Client
//!
//! ```rust
//! use openerp_rs::{OpenErp, ErpResult, ErpModel, Domain, RecordId};
//! use openerp_rs::models::{ModelClient, ModelOperations, base::BaseModelClient};
//! use std::sync::Arc;
//!
//! struct CountryClient {
//!     base: BaseModelClient
//! }
//!
//! impl CountryClient {
//!     pub fn new(erp: Arc<OpenErp>) -> Self {
//!         Self {
//!             base: BaseModelClient::new(erp, ErpModel::Country)
//!         }
//!     }
//!
//!     pub async fn id_by_name(&self, name: &str) -> ErpResult<RecordId> {
//!         self.unique_id(self.model(), &Domain::matching("name", name)).await
//!     }
//! }
//!
//! impl ModelClient for CountryClient {
//!     fn model(&self) -> &ErpModel {
//!         self.base.model()
//!     }
//! }
//!
//! impl ModelOperations for CountryClient {
//!     fn erp(&self) -> &Arc<OpenErp> {
//!         self.base.erp()
//!     }
//! }
//! ```

pub mod base;
pub mod handle;
pub mod partner;

// Re-export model clients
pub use handle::ModelHandle;
pub use partner::{AddressKind, AddressSpec, PartnerBinding, PartnerClient, PartnerProfile};

use crate::client::OpenErp;
use crate::model_error;
use crate::types::*;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::{Arc, OnceLock};

/// Common trait for all record-mapping clients
///
/// Provides model identification for the registry system.
pub trait ModelClient: Send + Sync {
    /// The remote model this client is anchored to
    fn model(&self) -> &ErpModel;
}

/// Common trait for validation operations
pub trait ValidationOperations: ModelClient {
    /// Creates a model-scoped error
    fn model_error<T>(&self, message: impl Into<String>) -> ErpResult<T> {
        Err(model_error!(self.model().display_name(), message.into()))
    }

    /// Creates a model-scoped error with details
    fn model_error_with_details<T>(
        &self,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> ErpResult<T> {
        Err(model_error!(
            self.model().display_name(),
            message.into(),
            details.into()
        ))
    }

    /// Validate a string parameter
    fn validate_string<S: Into<String>>(
        &self,
        value: S,
        param_name: &str,
    ) -> ErpResult<String> {
        let string = value.into();
        if string.trim().is_empty() {
            return self.model_error(format!("{} cannot be empty", param_name));
        }
        Ok(string)
    }

    /// Validate a collection is not empty
    fn validate_not_empty<C: AsRef<[T]>, T>(
        &self,
        collection: C,
        param_name: &str,
    ) -> ErpResult<C> {
        if collection.as_ref().is_empty() {
            return self.model_error(format!("{} cannot be empty", param_name));
        }
        Ok(collection)
    }
}

/// Outcome of [`ModelOperations::duplicate_unless`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The guard domain already matched; nothing was copied
    AlreadyPresent,
    /// A fresh copy was made and written with the extra values
    Duplicated(RecordId),
}

/// Common implementation for model operations
///
/// The mediation layer proper. Every operation is expressed against an
/// explicit model so one client can resolve related records (a partner
/// client looks up accounts, pricelists, countries) without holding a
/// client per model. The invariant throughout is "at most one matching
/// remote record": lookups that must land on a single record report
/// zero matches and many matches as distinct errors.
pub trait ModelOperations: ModelClient {
    /// Get a reference to the connection
    fn erp(&self) -> &Arc<OpenErp>;

    /// A handle bound to the given model over this client's connection
    fn handle_for(&self, model: &ErpModel) -> ModelHandle {
        ModelHandle::new(self.erp().clone(), model.clone())
    }

    /// Create a record from the given values
    fn create_record<'a>(&'a self, model: &ErpModel, values: Values) -> RpcFuture<'a, RecordId> {
        let model = model.clone();
        Box::pin(async move { self.handle_for(&model).create(values).await })
    }

    /// True iff the search has a result
    fn record_exists<'a>(&'a self, model: &ErpModel, domain: &Domain) -> RpcFuture<'a, bool> {
        let model = model.clone();
        let domain = domain.clone();
        Box::pin(async move {
            let matches = self.handle_for(&model).search(&domain).await?;
            Ok(!matches.is_empty())
        })
    }

    /// The record id iff the search returns a single result
    fn unique_id<'a>(&'a self, model: &ErpModel, domain: &Domain) -> RpcFuture<'a, RecordId> {
        let model = model.clone();
        let domain = domain.clone();
        Box::pin(async move {
            let matches = self.handle_for(&model).search(&domain).await?;
            match matches.len() {
                1 => Ok(matches[0]),
                0 => Err(ErpError::NotFound {
                    model: model.display_name().to_string(),
                    domain: domain.to_string(),
                    location: None,
                }),
                _ => Err(ErpError::AmbiguousMatch {
                    model: model.display_name().to_string(),
                    matches,
                    domain: domain.to_string(),
                    location: None,
                }),
            }
        })
    }

    /// One field of the unique match
    fn unique_field<'a>(
        &'a self,
        model: &ErpModel,
        domain: &Domain,
        field: &str,
    ) -> RpcFuture<'a, Value> {
        let model = model.clone();
        let domain = domain.clone();
        let field = field.to_string();
        Box::pin(async move {
            let id = self.unique_id(&model, &domain).await?;
            let record = self
                .handle_for(&model)
                .read_one(id, Some(&[field.as_str()]))
                .await?;
            record.get(&field).cloned().ok_or_else(|| {
                model_error!(
                    model.display_name(),
                    format!("Field '{}' missing from read result", field)
                )
            })
        })
    }

    /// Write values to the record the domain uniquely matches
    fn update_unique<'a>(
        &'a self,
        model: &ErpModel,
        domain: &Domain,
        values: Values,
    ) -> RpcFuture<'a, RecordId> {
        let model = model.clone();
        let domain = domain.clone();
        Box::pin(async move {
            let handle = self.handle_for(&model);
            let matches = handle.search(&domain).await?;
            match matches.len() {
                1 => {
                    let id = matches[0];
                    if handle.write(&[id], &values).await? {
                        Ok(id)
                    } else {
                        Err(ErpError::WriteFailed {
                            model: model.display_name().to_string(),
                            ids: vec![id],
                            location: None,
                        })
                    }
                }
                0 => Err(ErpError::NotFound {
                    model: model.display_name().to_string(),
                    domain: domain.to_string(),
                    location: None,
                }),
                _ => Err(ErpError::AmbiguousMatch {
                    model: model.display_name().to_string(),
                    matches,
                    domain: domain.to_string(),
                    location: None,
                }),
            }
        })
    }

    /// Write values when the id is already known
    fn update_by_id<'a>(
        &'a self,
        model: &ErpModel,
        id: RecordId,
        values: Values,
    ) -> RpcFuture<'a, RecordId> {
        let model = model.clone();
        Box::pin(async move {
            if self.handle_for(&model).write(&[id], &values).await? {
                Ok(id)
            } else {
                Err(ErpError::WriteFailed {
                    model: model.display_name().to_string(),
                    ids: vec![id],
                    location: None,
                })
            }
        })
    }

    /// Update the record if the domain matches, create it otherwise
    fn ensure_record<'a>(
        &'a self,
        model: &ErpModel,
        domain: &Domain,
        values: Values,
    ) -> RpcFuture<'a, RecordId> {
        let model = model.clone();
        let domain = domain.clone();
        Box::pin(async move {
            if self.record_exists(&model, &domain).await? {
                self.update_unique(&model, &domain, values).await
            } else {
                self.create_record(&model, values).await
            }
        })
    }

    /// Copy the unique source record and write extra values onto the
    /// copy, unless the guard domain already matches
    fn duplicate_unless<'a>(
        &'a self,
        model: &ErpModel,
        source: &Domain,
        guard: &Domain,
        values: Values,
    ) -> RpcFuture<'a, CopyOutcome> {
        let model = model.clone();
        let source = source.clone();
        let guard = guard.clone();
        Box::pin(async move {
            if self.record_exists(&model, &guard).await? {
                return Ok(CopyOutcome::AlreadyPresent);
            }
            let source_id = self.unique_id(&model, &source).await?;
            let new_id = self.handle_for(&model).copy(source_id).await?;
            self.update_by_id(&model, new_id, values).await?;
            Ok(CopyOutcome::Duplicated(new_id))
        })
    }

    /// The full record by id
    fn fetch_record<'a>(&'a self, model: &ErpModel, id: RecordId) -> RpcFuture<'a, Record> {
        let model = model.clone();
        Box::pin(async move { self.handle_for(&model).read_one(id, None).await })
    }

    /// The single draft, non-special account period covering the date
    fn open_period<'a>(&'a self, date: NaiveDate) -> RpcFuture<'a, RecordId> {
        Box::pin(async move {
            let day = date.format("%Y-%m-%d").to_string();
            let domain = Domain::new()
                .filter("date_start", DomainOp::Le, day.clone())
                .filter("date_stop", DomainOp::Ge, day)
                .filter("state", DomainOp::Eq, "draft")
                .filter("special", DomainOp::Eq, false);
            self.unique_id(&ErpModel::Period, &domain).await
        })
    }
}

/// Registry for record-mapping clients that provides a central access point.
/// This allows for both direct accessor methods and the models() method approach.
pub struct ModelClientRegistry {
    erp: Arc<OpenErp>,
    // DashMap for lock-free concurrent access
    clients: Arc<DashMap<String, Arc<dyn ModelClient>>>,
    // Cached instance of the built-in partner client
    partner_client: OnceLock<Arc<PartnerClient>>,
}

impl ModelClientRegistry {
    pub(crate) fn new(erp: Arc<OpenErp>) -> Self {
        Self {
            erp,
            clients: Arc::new(DashMap::new()),
            partner_client: OnceLock::new(),
        }
    }

    /// Get the partner client (optimized with caching)
    pub fn partner(&self) -> Arc<PartnerClient> {
        self.partner_client
            .get_or_init(|| Arc::new(PartnerClient::new(self.erp.clone())))
            .clone()
    }

    /// Register a custom model client (lock-free)
    pub fn register<T: ModelClient + 'static>(&self, name: &str, client: T) {
        self.clients.insert(name.to_string(), Arc::new(client));
    }

    /// Get a registered custom model client by name (lock-free)
    pub fn get(&self, name: &str) -> Option<Arc<dyn ModelClient>> {
        self.clients.get(name).map(|r| r.value().clone())
    }

    /// Get all registered client names
    pub fn list_clients(&self) -> Vec<String> {
        self.clients.iter().map(|entry| entry.key().clone()).collect()
    }
}

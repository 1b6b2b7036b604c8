// Model Handle

use crate::builder::CallBuilder;
use crate::client::OpenErp;
use crate::types::*;
use crate::utils::rpc_decode;
use std::sync::Arc;

/// A handle bound to one remote model
///
/// The thinnest layer over the wire: each method is one object call
/// against the bound model, with the result coerced into a usable shape.
/// The mediation logic (uniqueness, upserts) lives in
/// [`crate::models::ModelOperations`] on top of this.
pub struct ModelHandle {
    erp: Arc<OpenErp>,
    model: ErpModel,
}

impl ModelHandle {
    pub fn new(erp: Arc<OpenErp>, model: ErpModel) -> Self {
        Self { erp, model }
    }

    pub fn model(&self) -> &ErpModel {
        &self.model
    }

    fn call(&self) -> CallBuilder {
        self.erp.call().model(self.model.clone())
    }

    /// Ids of the records matching the domain
    pub async fn search(&self, domain: &Domain) -> ErpResult<Vec<RecordId>> {
        let result = self
            .call()
            .method("search")?
            .serialized_arg(domain)?
            .send()
            .await?;
        rpc_decode::id_list(result)
    }

    /// Number of records matching the domain
    pub async fn search_count(&self, domain: &Domain) -> ErpResult<i64> {
        let result = self
            .call()
            .method("search_count")?
            .serialized_arg(domain)?
            .send()
            .await?;
        rpc_decode::count(&result)
    }

    /// Create a record, returning its id
    pub async fn create(&self, values: Values) -> ErpResult<RecordId> {
        let result = self
            .call()
            .method("create")?
            .serialized_arg(&values)?
            .send()
            .await?;
        rpc_decode::record_id(&result).ok_or_else(|| ErpError::CreateFailed {
            model: self.model.display_name().to_string(),
            location: None,
        })
    }

    /// Write values to the given records
    pub async fn write(&self, ids: &[RecordId], values: &Values) -> ErpResult<bool> {
        let result = self
            .call()
            .method("write")?
            .serialized_arg(ids)?
            .serialized_arg(values)?
            .send()
            .await?;
        Ok(rpc_decode::acknowledged(&result))
    }

    /// Read records, optionally restricted to the given fields
    pub async fn read(&self, ids: &[RecordId], fields: Option<&[&str]>) -> ErpResult<Vec<Record>> {
        let mut builder = self.call().method("read")?.serialized_arg(ids)?;
        if let Some(fields) = fields {
            builder = builder.serialized_arg(fields)?;
        }
        rpc_decode::record_list(builder.send().await?)
    }

    /// Read a single record by id
    pub async fn read_one(&self, id: RecordId, fields: Option<&[&str]>) -> ErpResult<Record> {
        let mut records = self.read(&[id], fields).await?;
        if records.is_empty() {
            return Err(ErpError::NotFound {
                model: self.model.display_name().to_string(),
                domain: Domain::matching("id", id).to_string(),
                location: None,
            });
        }
        Ok(records.swap_remove(0))
    }

    /// Duplicate a record server-side, returning the new id
    pub async fn copy(&self, id: RecordId) -> ErpResult<RecordId> {
        let result = self.call().method("copy")?.arg(id).send().await?;
        rpc_decode::record_id(&result).ok_or_else(|| ErpError::CreateFailed {
            model: self.model.display_name().to_string(),
            location: None,
        })
    }

    /// Delete the given records
    pub async fn unlink(&self, ids: &[RecordId]) -> ErpResult<bool> {
        let result = self
            .call()
            .method("unlink")?
            .serialized_arg(ids)?
            .send()
            .await?;
        Ok(rpc_decode::acknowledged(&result))
    }
}

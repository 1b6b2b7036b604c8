// Core types and errors

use serde::ser::{SerializeSeq, SerializeTuple};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;
use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;
use std::sync::Arc;

/// The result type used throughout the SDK
pub type ErpResult<T> = Result<T, ErpError>;

/// Convert reqwest::Error to our ErpError
impl From<reqwest::Error> for ErpError {
    fn from(err: reqwest::Error) -> Self {
        ErpError::RequestError {
            message: err.to_string(),
            details: None,
            location: None,
            source: Some(Arc::new(err) as Arc<dyn std::error::Error + Send + Sync>),
        }
    }
}

/// Type alias for boxed futures returned by model operations
pub type RpcFuture<'a, T> = Pin<Box<dyn Future<Output = ErpResult<T>> + Send + 'a>>;

/// Server-side database identifier of a record
pub type RecordId = i64;

/// A full record as returned by `read`: remote field name to value
pub type Record = serde_json::Map<String, Value>;

/// A secure container for the login password that zeroes memory when dropped
pub struct SecurePassword {
    secret: String,
}

impl SecurePassword {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    /// Get a reference to the underlying password
    pub fn as_str(&self) -> &str {
        &self.secret
    }
}

// Implement Deref for convenience when building the RPC frame
impl Deref for SecurePassword {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.secret
    }
}

// Implement Drop to zero memory when the password is dropped
impl Drop for SecurePassword {
    fn drop(&mut self) {
        unsafe {
            let bytes = self.secret.as_bytes_mut();
            bytes.iter_mut().for_each(|b| *b = 0);
        }
    }
}

// Prevent accidental printing of passwords in logs/debug output
impl fmt::Debug for SecurePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecurePassword([REDACTED])")
    }
}

// Display implementation also redacts the password
impl fmt::Display for SecurePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED PASSWORD]")
    }
}

impl Clone for SecurePassword {
    fn clone(&self) -> Self {
        Self {
            secret: self.secret.clone(),
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum ErpError {
    #[error("RPC request failed: {message}")]
    RequestError {
        message: String,
        details: Option<String>,
        location: Option<String>,
        source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to parse server response: {message}")]
    ParseError {
        message: String,
        source_text: Option<String>,
        location: Option<String>,
        source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Server returned error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
        response_body: Option<String>,
        location: Option<String>,
    },

    #[error("RPC fault {code}: {message}")]
    RpcFault {
        code: i64,
        message: String,
        data: Option<String>,
        location: Option<String>,
    },

    #[error("Connection credentials not provided")]
    MissingCredentials {
        location: Option<String>,
    },

    #[error("Authentication failed for login '{login}' on database '{database}'")]
    AuthenticationFailed {
        login: String,
        database: String,
        location: Option<String>,
    },

    #[error("No {model} matched {domain}")]
    NotFound {
        model: String,
        domain: String,
        location: Option<String>,
    },

    #[error("Expected a single {model} but {domain} matched ids {matches:?}")]
    AmbiguousMatch {
        model: String,
        matches: Vec<RecordId>,
        domain: String,
        location: Option<String>,
    },

    #[error("We attempted to create a {model} but failed")]
    CreateFailed {
        model: String,
        location: Option<String>,
    },

    #[error("We attempted to update a {model} but failed, ids {ids:?}")]
    WriteFailed {
        model: String,
        ids: Vec<RecordId>,
        location: Option<String>,
    },

    #[error("Model error: {model}: {message}")]
    ModelError {
        model: String,
        message: String,
        details: Option<String>,
        location: Option<String>,
        source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Conversion error: {0}")]
    ConversionError(String),
}

// Implementation of helper methods for ErpError
impl ErpError {
    pub fn request_error<T: Into<String>>(
        message: T,
        details: Option<String>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
        location: Option<&str>,
    ) -> Self {
        let error = Self::RequestError {
            message: message.into(),
            details,
            location: location.map(String::from),
            source: source.map(|e| Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>),
        };
        error.log();
        error
    }

    pub fn parse_error<T: Into<String>>(
        message: T,
        source_text: Option<String>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
        location: Option<&str>,
    ) -> Self {
        let error = Self::ParseError {
            message: message.into(),
            source_text,
            location: location.map(String::from),
            source: source.map(|e| Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>),
        };
        error.log();
        error
    }

    pub fn model_error<T: Into<String>>(
        message: T,
        model: Option<String>,
        details: Option<String>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
        location: Option<&str>,
    ) -> Self {
        let error = Self::ModelError {
            message: message.into(),
            model: model.unwrap_or_default(),
            details,
            location: location.map(String::from),
            source: source.map(|e| Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>),
        };
        error.log();
        error
    }

    pub fn api_error<T: Into<String>>(
        message: T,
        status: Option<u16>,
        response_body: Option<String>,
        location: Option<&str>,
    ) -> Self {
        let error = Self::ApiError {
            message: message.into(),
            status: status.unwrap_or(500),
            response_body,
            location: location.map(String::from),
        };
        error.log();
        error
    }

    pub fn rpc_fault(code: i64, message: impl Into<String>, data: Option<String>, location: Option<&str>) -> Self {
        let error = Self::RpcFault {
            code,
            message: message.into(),
            data,
            location: location.map(String::from),
        };
        error.log();
        error
    }

    // Simpler overloads for call sites without context to attach
    pub fn simple_request_error<T: Into<String>>(message: T) -> Self {
        Self::request_error(message, None, None::<reqwest::Error>, None)
    }

    pub fn simple_parse_error<T: Into<String>>(message: T) -> Self {
        Self::parse_error(message, None, None::<reqwest::Error>, None)
    }

    pub fn simple_model_error<T: Into<String>>(message: T, model: &str) -> Self {
        Self::model_error(message, Some(model.to_string()), None, None::<reqwest::Error>, None)
    }

    fn log(&self) {
        if let Some(loc) = self.location() {
            log::error!("{} at {}", self, loc);
        } else {
            log::error!("{}", self);
        }
    }

    // Location and source information accessors
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::RequestError { location, .. } => location.as_deref(),
            Self::ParseError { location, .. } => location.as_deref(),
            Self::ApiError { location, .. } => location.as_deref(),
            Self::RpcFault { location, .. } => location.as_deref(),
            Self::MissingCredentials { location } => location.as_deref(),
            Self::AuthenticationFailed { location, .. } => location.as_deref(),
            Self::NotFound { location, .. } => location.as_deref(),
            Self::AmbiguousMatch { location, .. } => location.as_deref(),
            Self::CreateFailed { location, .. } => location.as_deref(),
            Self::WriteFailed { location, .. } => location.as_deref(),
            Self::ModelError { location, .. } => location.as_deref(),
            _ => None,
        }
    }

    pub fn source_error(&self) -> Option<&(dyn std::error::Error + Send + Sync)> {
        match self {
            Self::RequestError { source, .. } => source.as_ref().map(|s| s.as_ref()),
            Self::ParseError { source, .. } => source.as_ref().map(|s| s.as_ref()),
            Self::ModelError { source, .. } => source.as_ref().map(|s| s.as_ref()),
            _ => None,
        }
    }
}

/// Helper function to create model-scoped errors
pub fn model_error<T>(model: &str, message: impl Into<String>) -> ErpResult<T> {
    Err(ErpError::model_error(message, Some(model.to_string()), None, None::<reqwest::Error>, None))
}

/// Create a macro to capture file and line location information
#[macro_export]
macro_rules! request_error {
    ($message:expr) => {
        $crate::types::ErpError::request_error($message, None, None::<reqwest::Error>, Some(concat!(file!(), ":", line!())))
    };
    ($message:expr, $details:expr) => {
        $crate::types::ErpError::request_error($message, Some($details), None::<reqwest::Error>, Some(concat!(file!(), ":", line!())))
    };
    ($message:expr, $details:expr, $source:expr) => {
        $crate::types::ErpError::request_error($message, Some($details), Some($source), Some(concat!(file!(), ":", line!())))
    };
}

/// Create a macro for model errors with location info
#[macro_export]
macro_rules! model_error {
    ($model:expr, $message:expr) => {
        $crate::types::ErpError::model_error($message, Some($model.to_string()), None, None::<reqwest::Error>, Some(concat!(file!(), ":", line!())))
    };
    ($model:expr, $message:expr, $details:expr) => {
        $crate::types::ErpError::model_error($message, Some($model.to_string()), Some($details), None::<reqwest::Error>, Some(concat!(file!(), ":", line!())))
    };
}

/// Well-known remote model identifiers
///
/// Maps each model to its wire name and to the human label used in error
/// messages, so failures read "we did not get a single Partner back"
/// rather than exposing `res.partner` to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErpModel {
    Partner,
    PartnerAddress,
    PartnerCategory,
    Country,
    CountryState,
    Company,
    Users,
    Invoice,
    InvoiceLine,
    InvoiceTax,
    Account,
    AccountType,
    AnalyticAccount,
    PaymentTerm,
    FiscalPosition,
    Period,
    Journal,
    JournalEntry,
    JournalItem,
    Voucher,
    VoucherLine,
    BankStatement,
    Asset,
    AssetCategory,
    Product,
    ProductTemplate,
    ProductCategory,
    ProductUom,
    ProductUomCategory,
    SupplierInfo,
    Pricelist,
    PricelistPartnerInfo,
    SaleOrder,
    SaleOrderLine,
    SaleShop,
    PurchaseOrder,
    PurchaseOrderLine,
    StockLocation,
    StockMove,
    StockWarehouse,
    StockInventory,
    StockInventoryLine,
    ProductionLot,
    Attachment,
    /// Use a model not covered by the built-in table
    Custom(String),
}

impl ErpModel {
    /// The technical name the server knows the model by
    pub fn as_str(&self) -> &str {
        match self {
            ErpModel::Partner => "res.partner",
            ErpModel::PartnerAddress => "res.partner.address",
            ErpModel::PartnerCategory => "res.partner.category",
            ErpModel::Country => "res.country",
            ErpModel::CountryState => "res.country.state",
            ErpModel::Company => "res.company",
            ErpModel::Users => "res.users",
            ErpModel::Invoice => "account.invoice",
            ErpModel::InvoiceLine => "account.invoice.line",
            ErpModel::InvoiceTax => "account.invoice.tax",
            ErpModel::Account => "account.account",
            ErpModel::AccountType => "account.account.type",
            ErpModel::AnalyticAccount => "account.analytic.account",
            ErpModel::PaymentTerm => "account.payment.term",
            ErpModel::FiscalPosition => "account.fiscal.position",
            ErpModel::Period => "account.period",
            ErpModel::Journal => "account.journal",
            ErpModel::JournalEntry => "account.move",
            ErpModel::JournalItem => "account.move.line",
            ErpModel::Voucher => "account.voucher",
            ErpModel::VoucherLine => "account.voucher.line",
            ErpModel::BankStatement => "account.bank.statement",
            ErpModel::Asset => "account.asset.asset",
            ErpModel::AssetCategory => "account.asset.category",
            ErpModel::Product => "product.product",
            ErpModel::ProductTemplate => "product.template",
            ErpModel::ProductCategory => "product.category",
            ErpModel::ProductUom => "product.uom",
            ErpModel::ProductUomCategory => "product.uom.categ",
            ErpModel::SupplierInfo => "product.supplierinfo",
            ErpModel::Pricelist => "product.pricelist",
            ErpModel::PricelistPartnerInfo => "pricelist.partnerinfo",
            ErpModel::SaleOrder => "sale.order",
            ErpModel::SaleOrderLine => "sale.order.line",
            ErpModel::SaleShop => "sale.shop",
            ErpModel::PurchaseOrder => "purchase.order",
            ErpModel::PurchaseOrderLine => "purchase.order.line",
            ErpModel::StockLocation => "stock.location",
            ErpModel::StockMove => "stock.move",
            ErpModel::StockWarehouse => "stock.warehouse",
            ErpModel::StockInventory => "stock.inventory",
            ErpModel::StockInventoryLine => "stock.inventory.line",
            ErpModel::ProductionLot => "stock.production.lot",
            ErpModel::Attachment => "ir.attachment",
            ErpModel::Custom(name) => name,
        }
    }

    /// The label used when reporting failures against this model
    pub fn display_name(&self) -> &str {
        match self {
            ErpModel::Partner => "Partner",
            ErpModel::PartnerAddress => "Address",
            ErpModel::PartnerCategory => "Partner Category",
            ErpModel::Country => "Country",
            ErpModel::CountryState => "State",
            ErpModel::Company => "Company",
            ErpModel::Users => "Users",
            ErpModel::Invoice => "Invoice",
            ErpModel::InvoiceLine => "Invoice Line",
            ErpModel::InvoiceTax => "Tax",
            ErpModel::Account => "Account",
            ErpModel::AccountType => "Account Type",
            ErpModel::AnalyticAccount => "Analytic Account",
            ErpModel::PaymentTerm => "Payment Term",
            ErpModel::FiscalPosition => "Fiscal Position",
            ErpModel::Period => "Account Period",
            ErpModel::Journal => "Journal",
            ErpModel::JournalEntry => "Journal Entry",
            ErpModel::JournalItem => "Journal Item",
            ErpModel::Voucher => "Voucher",
            ErpModel::VoucherLine => "Voucher Line Item",
            ErpModel::BankStatement => "Account Bank Statement",
            ErpModel::Asset => "Asset",
            ErpModel::AssetCategory => "Asset Category",
            ErpModel::Product => "Product",
            ErpModel::ProductTemplate => "Product Template",
            ErpModel::ProductCategory => "Category",
            ErpModel::ProductUom => "Unit of Measure",
            ErpModel::ProductUomCategory => "Product UOM Category",
            ErpModel::SupplierInfo => "SupplierInfo",
            ErpModel::Pricelist => "Pricelist",
            ErpModel::PricelistPartnerInfo => "Partner Pricelist",
            ErpModel::SaleOrder => "Sales Order",
            ErpModel::SaleOrderLine => "Sales Order Line",
            ErpModel::SaleShop => "Shop",
            ErpModel::PurchaseOrder => "Purchase Order",
            ErpModel::PurchaseOrderLine => "Purchase Order Line",
            ErpModel::StockLocation => "Stock Location",
            ErpModel::StockMove => "Stock Move",
            ErpModel::StockWarehouse => "Stock Warehouse",
            ErpModel::StockInventory => "Inventory",
            ErpModel::StockInventoryLine => "Inventory Line",
            ErpModel::ProductionLot => "Production Lot",
            ErpModel::Attachment => "Attachment",
            ErpModel::Custom(name) => name,
        }
    }
}

impl fmt::Display for ErpModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ErpModel {
    fn from(name: &str) -> Self {
        ErpModel::Custom(name.to_string())
    }
}

/// Comparison operators accepted in search domains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    Ilike,
    In,
    NotIn,
}

impl DomainOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainOp::Eq => "=",
            DomainOp::NotEq => "!=",
            DomainOp::Lt => "<",
            DomainOp::Le => "<=",
            DomainOp::Gt => ">",
            DomainOp::Ge => ">=",
            DomainOp::Like => "like",
            DomainOp::Ilike => "ilike",
            DomainOp::In => "in",
            DomainOp::NotIn => "not in",
        }
    }
}

/// One `(field, operator, value)` term of a search domain
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub field: String,
    pub op: DomainOp,
    pub value: Value,
}

impl Serialize for Criterion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.field)?;
        tuple.serialize_element(self.op.as_str())?;
        tuple.serialize_element(&self.value)?;
        tuple.end()
    }
}

/// A search expression over a remote model
///
/// Serializes to the server's list-of-triples form, e.g.
/// `[["ref", "=", "TRPL29"], ["active", "=", true]]`. All terms are
/// implicitly AND-ed, which is the only combination this layer needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domain {
    criteria: Vec<Criterion>,
}

impl Domain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `(field, operator, value)` term
    pub fn filter(mut self, field: impl Into<String>, op: DomainOp, value: impl Into<Value>) -> Self {
        self.criteria.push(Criterion {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Shorthand for the equality term, by far the most common one
    pub fn matching(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().filter(field, DomainOp::Eq, value)
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }
}

impl Serialize for Domain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.criteria.len()))?;
        for criterion in &self.criteria {
            seq.serialize_element(criterion)?;
        }
        seq.end()
    }
}

// Rendered into NotFound/AmbiguousMatch messages
impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.criteria.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({:?}, {:?}, {})", c.field, c.op.as_str(), c.value)?;
        }
        write!(f, "]")
    }
}

/// Field values for create/write calls
///
/// An insertion-ordered map of remote field name to value. Setters drop
/// nulls so that an unresolved optional never reaches the server: absent
/// and null are not the same thing to a write call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values {
    entries: serde_json::Map<String, Value>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. A `Value::Null` is dropped, not written.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !value.is_null() {
            self.entries.insert(field.into(), value);
        }
        self
    }

    /// Set a field from an optional; `None` is dropped
    pub fn opt(self, field: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(v) => self.set(field, v),
            None => self,
        }
    }

    /// Link an existing record into a many2many field, `(4, id)` form
    pub fn link(self, field: impl Into<String>, id: RecordId) -> Self {
        self.set(field, serde_json::json!([[4, id]]))
    }

    /// Flatten another value map into this one, later keys winning
    pub fn merge(mut self, options: Values) -> Self {
        for (k, v) in options.entries {
            self.entries.insert(k, v);
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_inner(self) -> serde_json::Map<String, Value> {
        self.entries
    }
}

impl Serialize for Values {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl From<Values> for Value {
    fn from(values: Values) -> Self {
        Value::Object(values.into_inner())
    }
}

/// One RPC call as seen by middleware: service, method, positional frame
#[derive(Debug, Clone, Serialize)]
pub struct RpcCall {
    pub service: String,
    pub method: String,
    pub args: Vec<Value>,
}

/// The JSON-RPC request envelope posted to the server
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: RpcCall,
    pub id: u64,
}

impl RpcRequest {
    pub fn new(params: RpcCall, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "call",
            params,
            id,
        }
    }
}

/// The JSON-RPC response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

/// The `error` member of a failed JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Helper function to sanitize error messages to prevent leaking credentials
pub fn sanitize_error_message(message: &str) -> String {
    // Password fields in echoed request bodies
    let password_pattern = regex::Regex::new(r#""password"\s*:\s*"[^"]*""#)
        .unwrap_or_else(|_| regex::Regex::new(r"").unwrap());
    let sanitized = password_pattern.replace_all(message, r#""password": "[REDACTED]""#);

    // Long opaque tokens (session ids, keys)
    let token_pattern = regex::Regex::new(r"[A-Za-z0-9_-]{32,}")
        .unwrap_or_else(|_| regex::Regex::new(r"").unwrap());
    let sanitized = token_pattern.replace_all(&sanitized, "[REDACTED]");

    sanitized.into_owned()
}

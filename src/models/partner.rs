// Partner Record Mapping

use crate::client::OpenErp;
use crate::models::{base::BaseModelClient, ModelClient, ModelOperations, ValidationOperations};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// Partner Client
pub struct PartnerClient {
    base: BaseModelClient,
}

/// The fields a partner is synchronized from
///
/// The external reference doubles as the match key: `ensure` upserts by
/// `ref`, so running the same profile twice updates rather than
/// duplicates. The `property_*` records are addressed by display name
/// and resolved to ids at sync time; the defaults are the names a stock
/// chart of accounts ships with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerProfile {
    pub name: String,
    pub phone: String,
    /// External reference, stored in the partner's `ref` field
    pub reference: String,
    pub customer: bool,
    pub supplier: bool,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub fax: Option<String>,
    pub fiscal_position: String,
    pub receivable_account: String,
    pub payable_account: String,
    pub payment_term: String,
    pub sale_pricelist: String,
    pub purchase_pricelist: String,
    pub category: Option<String>,
}

impl PartnerProfile {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        reference: impl Into<String>,
        customer: bool,
        supplier: bool,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            reference: reference.into(),
            customer,
            supplier,
            email: None,
            mobile: None,
            fax: None,
            fiscal_position: "Normal Taxes".to_string(),
            receivable_account: "Accounts Receivable".to_string(),
            payable_account: "Accounts Payable".to_string(),
            payment_term: "30 Net Days".to_string(),
            sale_pricelist: "Public Pricelist".to_string(),
            purchase_pricelist: "Default Purchase Pricelist".to_string(),
            category: None,
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = Some(mobile.into());
        self
    }

    pub fn fax(mut self, fax: impl Into<String>) -> Self {
        self.fax = Some(fax.into());
        self
    }

    pub fn fiscal_position(mut self, name: impl Into<String>) -> Self {
        self.fiscal_position = name.into();
        self
    }

    pub fn receivable_account(mut self, name: impl Into<String>) -> Self {
        self.receivable_account = name.into();
        self
    }

    pub fn payable_account(mut self, name: impl Into<String>) -> Self {
        self.payable_account = name.into();
        self
    }

    pub fn payment_term(mut self, name: impl Into<String>) -> Self {
        self.payment_term = name.into();
        self
    }

    pub fn sale_pricelist(mut self, name: impl Into<String>) -> Self {
        self.sale_pricelist = name.into();
        self
    }

    pub fn purchase_pricelist(mut self, name: impl Into<String>) -> Self {
        self.purchase_pricelist = name.into();
        self
    }

    pub fn category(mut self, name: impl Into<String>) -> Self {
        self.category = Some(name.into());
        self
    }
}

/// Address slots a partner record carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    Default,
    Invoice,
    Delivery,
    Contact,
    Other,
}

impl AddressKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressKind::Default => "default",
            AddressKind::Invoice => "invoice",
            AddressKind::Delivery => "delivery",
            AddressKind::Contact => "contact",
            AddressKind::Other => "other",
        }
    }
}

/// One address of a partner
///
/// Country is addressed by name, state by its two-letter code; both are
/// resolved to ids at sync time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressSpec {
    pub city: String,
    /// State code, two letters
    pub state: String,
    pub zip: String,
    pub street: String,
    pub street2: Option<String>,
    pub country: String,
    pub kind: AddressKind,
}

impl AddressSpec {
    pub fn new(
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
        street: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
            street: street.into(),
            street2: None,
            country: country.into(),
            kind: AddressKind::Default,
        }
    }

    pub fn street2(mut self, street2: impl Into<String>) -> Self {
        self.street2 = Some(street2.into());
        self
    }

    pub fn kind(mut self, kind: AddressKind) -> Self {
        self.kind = kind;
        self
    }
}

/// A synchronized partner, as returned by the ensure/find operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartnerBinding {
    pub partner_id: RecordId,
}

impl PartnerClient {
    pub(crate) fn new(erp: Arc<OpenErp>) -> Self {
        Self {
            base: BaseModelClient::new(erp, ErpModel::Partner),
        }
    }

    /// Ensure a partner exists with the profile's fields, upserting by reference
    ///
    /// Resolves each named property record to its id first, so a typo in
    /// an account or pricelist name fails the sync before anything is
    /// written to the partner.
    pub async fn ensure(&self, profile: &PartnerProfile) -> ErpResult<PartnerBinding> {
        let name = self.validate_string(profile.name.clone(), "name")?;
        let phone = self.validate_string(profile.phone.clone(), "phone")?;
        let reference = self.validate_string(profile.reference.clone(), "reference")?;

        let fiscal_position_id = self
            .unique_id(
                &ErpModel::FiscalPosition,
                &Domain::matching("name", profile.fiscal_position.as_str()),
            )
            .await?;
        let receivable_id = self
            .unique_id(
                &ErpModel::Account,
                &Domain::matching("name", profile.receivable_account.as_str()),
            )
            .await?;
        let payable_id = self
            .unique_id(
                &ErpModel::Account,
                &Domain::matching("name", profile.payable_account.as_str()),
            )
            .await?;
        let payment_term_id = self
            .unique_id(
                &ErpModel::PaymentTerm,
                &Domain::matching("name", profile.payment_term.as_str()),
            )
            .await?;
        let sale_pricelist_id = self
            .unique_id(
                &ErpModel::Pricelist,
                &Domain::matching("name", profile.sale_pricelist.as_str()),
            )
            .await?;
        let purchase_pricelist_id = self
            .unique_id(
                &ErpModel::Pricelist,
                &Domain::matching("name", profile.purchase_pricelist.as_str()),
            )
            .await?;

        let mut values = Values::new()
            .set("name", name)
            .set("phone", phone)
            .opt("email", profile.email.clone())
            .opt("mobile", profile.mobile.clone())
            .opt("fax", profile.fax.clone())
            .set("customer", profile.customer)
            .set("supplier", profile.supplier)
            .set("ref", reference.clone())
            .set("property_account_position", fiscal_position_id)
            .set("property_account_receivable", receivable_id)
            .set("property_account_payable", payable_id)
            .set("property_payment_term", payment_term_id)
            .set("property_product_pricelist", sale_pricelist_id)
            .set("property_product_pricelist_purchase", purchase_pricelist_id);

        if let Some(category) = &profile.category {
            let category_id = self
                .unique_id(
                    &ErpModel::PartnerCategory,
                    &Domain::matching("name", category.as_str()),
                )
                .await?;
            values = values.link("category_id", category_id);
        }

        let partner_id = self
            .ensure_record(
                &ErpModel::Partner,
                &Domain::matching("ref", reference),
                values,
            )
            .await?;

        Ok(PartnerBinding { partner_id })
    }

    /// Ensure the partner carries the given address, upserting by (partner, kind)
    ///
    /// When the state code cannot be resolved to a single record, both
    /// the state and the country are left out of the written values.
    pub async fn ensure_address(
        &self,
        binding: &PartnerBinding,
        spec: &AddressSpec,
    ) -> ErpResult<RecordId> {
        let city = self.validate_string(spec.city.clone(), "city")?;
        let street = self.validate_string(spec.street.clone(), "street")?;

        let country_id = self
            .unique_id(
                &ErpModel::Country,
                &Domain::matching("name", spec.country.as_str()),
            )
            .await?;

        let (country_id, state_id) = match self
            .unique_id(
                &ErpModel::CountryState,
                &Domain::matching("code", spec.state.as_str()),
            )
            .await
        {
            Ok(state_id) => (Some(country_id), Some(state_id)),
            Err(ErpError::NotFound { .. }) | Err(ErpError::AmbiguousMatch { .. }) => (None, None),
            Err(other) => return Err(other),
        };

        let values = Values::new()
            .set("partner_id", binding.partner_id)
            .opt("country_id", country_id)
            .set("type", spec.kind.as_str())
            .set("city", city)
            .opt("state_id", state_id)
            .set("zip", spec.zip.clone())
            .set("street", street)
            .opt("street2", spec.street2.clone());

        let domain = Domain::matching("partner_id", binding.partner_id)
            .filter("type", DomainOp::Eq, spec.kind.as_str());

        self.ensure_record(&ErpModel::PartnerAddress, &domain, values)
            .await
    }

    /// The partner's delivery address, falling back to the default one
    pub async fn delivery_address(&self, binding: &PartnerBinding) -> ErpResult<RecordId> {
        self.preferred_address(binding, AddressKind::Delivery).await
    }

    /// The partner's invoice address, falling back to the default one
    pub async fn invoice_address(&self, binding: &PartnerBinding) -> ErpResult<RecordId> {
        self.preferred_address(binding, AddressKind::Invoice).await
    }

    async fn preferred_address(
        &self,
        binding: &PartnerBinding,
        kind: AddressKind,
    ) -> ErpResult<RecordId> {
        match self.address_of_kind(binding, kind).await {
            Ok(id) => Ok(id),
            Err(ErpError::NotFound { .. }) | Err(ErpError::AmbiguousMatch { .. }) => {
                self.address_of_kind(binding, AddressKind::Default).await
            }
            Err(other) => Err(other),
        }
    }

    async fn address_of_kind(
        &self,
        binding: &PartnerBinding,
        kind: AddressKind,
    ) -> ErpResult<RecordId> {
        let domain = Domain::matching("partner_id", binding.partner_id)
            .filter("type", DomainOp::Eq, kind.as_str());
        self.unique_id(&ErpModel::PartnerAddress, &domain).await
    }

    /// The single active partner with this name
    pub async fn find_by_name(&self, name: impl Into<String>) -> ErpResult<PartnerBinding> {
        let name = self.validate_string(name, "name")?;
        let domain = Domain::matching("name", name).filter("active", DomainOp::Eq, true);
        let partner_id = self.unique_id(&ErpModel::Partner, &domain).await?;
        Ok(PartnerBinding { partner_id })
    }

    /// The single active partner with this external reference
    pub async fn find_by_ref(&self, reference: impl Into<String>) -> ErpResult<PartnerBinding> {
        let reference = self.validate_string(reference, "reference")?;
        let domain = Domain::matching("ref", reference).filter("active", DomainOp::Eq, true);
        let partner_id = self.unique_id(&ErpModel::Partner, &domain).await?;
        Ok(PartnerBinding { partner_id })
    }

    /// The full partner record
    pub async fn fetch(&self, partner_id: RecordId) -> ErpResult<Record> {
        self.fetch_record(&ErpModel::Partner, partner_id).await
    }
}

impl ModelClient for PartnerClient {
    fn model(&self) -> &ErpModel {
        self.base.model()
    }
}

impl ValidationOperations for PartnerClient {}

impl ModelOperations for PartnerClient {
    fn erp(&self) -> &Arc<OpenErp> {
        self.base.erp()
    }
}

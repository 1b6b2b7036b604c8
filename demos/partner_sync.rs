use openerp_rs::prelude::*;

/// Synchronize a partner and its addresses from an external system
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let erp = from_env()?;
    let partners = erp.partners();

    // Upserted by reference: running this twice updates, never duplicates
    let profile = PartnerProfile::new("Triple R Logistics", "8778507587", "TRPL29", true, false)
        .email("office@triple-r.example")
        .category("Wholesale");
    let partner = partners.ensure(&profile).await?;
    println!("partner id: {}", partner.partner_id);

    // The default address slot
    let address = AddressSpec::new("Blue Springs", "MO", "64015", "2567 SW 90 Hwy", "United States");
    let address_id = partners.ensure_address(&partner, &address).await?;
    println!("default address id: {}", address_id);

    // A dedicated delivery slot
    let dock = AddressSpec::new("Blue Springs", "MO", "64015", "200 NW Dock Rd", "United States")
        .kind(AddressKind::Delivery)
        .street2("Gate 4");
    partners.ensure_address(&partner, &dock).await?;

    // Reads fall back to the default slot when a kind is missing
    let delivery = partners.delivery_address(&partner).await?;
    let invoice = partners.invoice_address(&partner).await?;
    println!("delivery address: {}, invoice address: {}", delivery, invoice);

    Ok(())
}

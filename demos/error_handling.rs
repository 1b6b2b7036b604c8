use openerp_rs::prelude::*;

/// Demonstrates how the error variants separate the failure modes
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let erp = from_env()?;
    let partners = erp.partners();

    match partners.find_by_ref("TRPL29").await {
        Ok(binding) => println!("found partner {}", binding.partner_id),
        Err(ErpError::NotFound { model, domain, .. }) => {
            println!("no {} matches {}", model, domain);
        }
        Err(ErpError::AmbiguousMatch { model, matches, .. }) => {
            // More than one record carries the reference; the data needs fixing
            println!("{} candidates for one {}: {:?}", matches.len(), model, matches);
        }
        Err(ErpError::AuthenticationFailed { login, database, .. }) => {
            println!("login {} rejected on database {}", login, database);
        }
        Err(ErpError::RpcFault { code, message, .. }) => {
            println!("server fault {}: {}", code, message);
        }
        Err(e) => {
            // Transport and parse errors keep their source chain
            println!("call failed: {}", e);
            if let Some(location) = e.location() {
                println!("  raised at {}", location);
            }
        }
    }

    Ok(())
}

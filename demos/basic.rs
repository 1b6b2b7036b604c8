// Import the main modules using prelude for convenience
use openerp_rs::prelude::*;

/// Basic usage example showing connection handling and a simple lookup
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Basic OpenERP Client Usage Example");

    // Create client from environment variables
    let client_result = from_env();

    // Check if client creation failed due to missing credentials
    let erp = match client_result {
        Ok(client) => client,
        Err(e) => {
            println!("Note: credentials not found, using a local dummy client for demonstration only.");
            println!("Error: {}\n", e);
            // For demonstration purposes only, the calls below will fail without a server
            ConnectionConfig::new("demo", "admin", "admin").connect()?
        }
    };

    // Validation failures are caught before anything goes on the wire
    println!("\nValidation demonstration:");
    match erp.call().model(ErpModel::Partner).method("") {
        Ok(_) => println!("This should not happen"),
        Err(e) => println!("Expected validation error: {}", e),
    }

    // Look up every active partner
    println!("\nSearching for active partners...");
    let ids = erp
        .model(ErpModel::Partner)
        .search(&Domain::matching("active", true))
        .await?;
    println!("Found {} partners: {:?}", ids.len(), ids);

    println!("\nExample complete!");
    Ok(())
}

//! Services command - manage custom service-name entries.

use anyhow::Result;
use portmedic_core::ConfigStore;

pub async fn add(port: u16, name: &str) -> Result<()> {
    let store = ConfigStore::new()?;
    store.add_service(port, name).await?;
    println!("Added service entry: {port} -> {name}");
    Ok(())
}

pub async fn remove(port: u16) -> Result<()> {
    let store = ConfigStore::new()?;
    if store.remove_service(port).await? {
        println!("Removed service entry for port {port}");
    } else {
        println!("No custom service entry for port {port}");
    }
    Ok(())
}

pub async fn list(json: bool) -> Result<()> {
    let store = ConfigStore::new()?;
    let config = store.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config.custom_services)?);
        return Ok(());
    }

    if config.custom_services.is_empty() {
        println!("No custom service entries. The default table is in effect.");
        return Ok(());
    }

    println!("{:<7} NAME", "PORT");
    for entry in &config.custom_services {
        println!("{:<7} {}", entry.port, entry.name);
    }

    Ok(())
}

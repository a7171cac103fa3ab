//! Integration tests for the NX-API client
//!
//! These tests require a reachable Nexus switch with NX-API enabled.
//! Set NEXUS_HOSTS, NEXUS_USER and NEXUS_PASS environment variables to run.

use nxos_client::{ClientOptions, ClientSession};

#[tokio::test]
#[ignore] // Requires a running Nexus switch
async fn test_login_refresh_logout() -> anyhow::Result<()> {
    let mut session = ClientSession::new(ClientOptions::default())?;

    session.login().await?;
    assert!(session.is_authenticated());
    println!(
        "Logged in to {} (refresh every {:?})",
        session.current_host(),
        session.refresh_timeout()
    );

    session.refresh().await?;
    session.logout().await;
    assert!(!session.is_authenticated());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_list_vlans() -> anyhow::Result<()> {
    let mut session = ClientSession::new(ClientOptions::default())?;
    session.login().await?;

    let vlans = session.get_vlan("").await?;
    println!("Found {} VLANs", vlans.len());
    for vlan in &vlans {
        println!(
            "{}\t{}\t{}",
            vlan.get("id").map_or("", String::as_str),
            vlan.get("accEncap").map_or("", String::as_str),
            vlan.get("BdOperName").map_or("", String::as_str)
        );
    }

    session.logout().await;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_list_interfaces() -> anyhow::Result<()> {
    let mut session = ClientSession::new(ClientOptions::default())?;
    session.login().await?;

    let ethernet = session.get_interface("ethernet").await?;
    let port_channels = session.get_interface("port-channel").await?;
    println!(
        "Found {} ethernet and {} port-channel interfaces",
        ethernet.len(),
        port_channels.len()
    );

    session.logout().await;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_add_and_delete_vlan() -> anyhow::Result<()> {
    let mut session = ClientSession::new(ClientOptions::default())?;
    session.login().await?;

    session.add_vlan("3999", "").await?;
    let vlans = session.get_vlan("3999").await?;
    assert_eq!(vlans.len(), 1);

    // Clean up
    session.delete_vlan("3999").await?;
    session.logout().await;
    Ok(())
}

//! Fires one door release against the production vendor API.
//!
//! Credentials come from the environment:
//!
//! ```sh
//! export BMX_CLIENT_ID=...
//! export BMX_AUTH_TOKEN=...
//! export BMX_REFRESH_TOKEN=...
//! export BMX_UNIT_ID=...
//! export BMX_PANEL_ID=...
//! cargo run --example unlock
//! ```

// std
use std::env;
// crates.io
use color_eyre::{Result, eyre::WrapErr};
use tracing_subscriber::EnvFilter;
// self
use butterflymx_bridge::{
	accessory::DoorSwitch,
	config::{BridgeConfig, Endpoints, PanelId, UnitId},
	http::ReqwestHttpClient,
	lock::DoorLock,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let config = BridgeConfig {
		client_id: var("BMX_CLIENT_ID")?,
		auth_token: var("BMX_AUTH_TOKEN")?,
		refresh_token: var("BMX_REFRESH_TOKEN")?,
		unit_id: UnitId::new(var("BMX_UNIT_ID")?)?,
		panel_id: PanelId::new(var("BMX_PANEL_ID")?)?,
	};
	let lock = DoorLock::new(config, Endpoints::default(), ReqwestHttpClient::default())?;
	let switch = DoorSwitch::new(lock);

	println!("Switch reads: {}.", switch.read_on().await);

	let receipt = switch.write_on(true).await?;

	println!("Created door release request {}.", receipt.id);

	Ok(())
}

fn var(name: &'static str) -> Result<String> {
	env::var(name).wrap_err_with(|| format!("Environment variable `{name}` is required."))
}

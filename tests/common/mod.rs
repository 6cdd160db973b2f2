//! Shared fixtures for the integration suite.

// std
use std::sync::Arc;
// crates.io
use httpmock::MockServer;
use url::Url;
// self
use butterflymx_bridge::{
	config::{BridgeConfig, Endpoints, PanelId, UnitId},
	http::ReqwestHttpClient,
	lock::DoorLock,
};

pub const CLIENT_ID: &str = "client-bridge";

pub fn bridge_config(access: &str, refresh: &str) -> BridgeConfig {
	BridgeConfig {
		client_id: CLIENT_ID.into(),
		auth_token: access.into(),
		refresh_token: refresh.into(),
		unit_id: UnitId::new("unit-101").expect("Unit fixture should be valid."),
		panel_id: PanelId::new("panel-7").expect("Panel fixture should be valid."),
	}
}

pub fn mock_endpoints(server: &MockServer) -> Endpoints {
	Endpoints {
		token: url(&server.url("/oauth/token")),
		account: url(&server.url("/mobile/v3/me")),
		door_release: url(&server.url("/mobile/v3/door_release_requests")),
	}
}

pub fn build_lock(server: &MockServer, access: &str, refresh: &str) -> Arc<DoorLock<ReqwestHttpClient>> {
	build_lock_with_endpoints(mock_endpoints(server), access, refresh)
}

pub fn build_lock_with_endpoints(
	endpoints: Endpoints,
	access: &str,
	refresh: &str,
) -> Arc<DoorLock<ReqwestHttpClient>> {
	Arc::new(
		DoorLock::new(bridge_config(access, refresh), endpoints, ReqwestHttpClient::default())
			.expect("Facade fixture should build against the mock server."),
	)
}

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("Mock endpoint URL should parse.")
}

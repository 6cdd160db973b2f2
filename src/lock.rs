//! Door-lock facade: state queries with a one-time configuration check, and door release.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// crates.io
use tracing::Instrument;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	config::{BridgeConfig, Endpoints, TargetIdentity},
	error::ConfigError,
	http::{self, HttpClient, RequestDescriptor},
	obs::{self, OpKind, OpOutcome},
	session::{Session, TokenPair},
	transport::AuthTransport,
};

// The door-release body is a fixed four-field form; field order is part of
// the wire contract.
const RELEASE_TYPE: (&str, &str) = ("data[type]", "door_release_requests");
const RELEASE_METHOD: (&str, &str) = ("data[attributes][release_method]", "front_door_view");
const RELEASE_UNIT_KEY: &str = "data[relationships][unit][data][id]";
const RELEASE_PANEL_KEY: &str = "data[relationships][panel][data][id]";

/// Identifier assigned by the vendor to an accepted door-release request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseReceipt {
	/// Vendor-assigned identifier of the created request.
	pub id: String,
}

#[derive(Deserialize)]
struct ReleaseDocument {
	data: ReleaseData,
}
#[derive(Deserialize)]
struct ReleaseData {
	id: String,
}

#[derive(Deserialize)]
struct AccountDocument {
	#[serde(default)]
	included: Vec<IncludedResource>,
}
#[derive(Deserialize)]
struct IncludedResource {
	#[serde(rename = "type")]
	kind: String,
	#[serde(default)]
	attributes: ResourceAttributes,
}
#[derive(Default, Deserialize)]
struct ResourceAttributes {
	name: Option<String>,
	label: Option<String>,
}

/// Facade over the vendor's door-release API for a single configured door.
///
/// Owns the [`Session`] (via its transport) and the process-lifetime
/// verified flag. The remote API cannot report the actual door state, so
/// [`DoorLock::query_state`] always reports "not unlocked" and uses the call
/// as an opportunity to verify the configuration once.
pub struct DoorLock<C>
where
	C: ?Sized + HttpClient,
{
	transport: AuthTransport<C>,
	target: TargetIdentity,
	endpoints: Endpoints,
	verified: AtomicBool,
}
impl<C> DoorLock<C>
where
	C: ?Sized + HttpClient,
{
	/// Builds the facade from host-supplied configuration.
	pub fn new(
		config: BridgeConfig,
		endpoints: Endpoints,
		http: impl Into<Arc<C>>,
	) -> Result<Self> {
		endpoints.validate()?;

		let session = Arc::new(Session::new(
			config.client_id,
			TokenPair::new(config.auth_token, config.refresh_token),
		));
		let transport = AuthTransport::new(http, session, endpoints.token.clone());

		Ok(Self {
			transport,
			target: TargetIdentity { unit: config.unit_id, panel: config.panel_id },
			endpoints,
			verified: AtomicBool::new(false),
		})
	}

	/// Session holding the current token pair.
	pub fn session(&self) -> &Session {
		&self.transport.session
	}

	/// Door the facade actuates.
	pub fn target(&self) -> &TargetIdentity {
		&self.target
	}

	/// Reports the current switch state; always `false`.
	///
	/// The vendor API offers no lock-state introspection. The first call per
	/// process instead probes the account-metadata endpoint to confirm the
	/// configured unit and building exist, logging the result. Failures are
	/// logged and swallowed; they never change the reported state.
	pub async fn query_state(&self) -> bool {
		if !self.verified.load(Ordering::Acquire) {
			let span = tracing::info_span!(
				"butterflymx_bridge.op",
				op = OpKind::Verify.as_str(),
				stage = "query_state"
			);

			obs::record_op_outcome(OpKind::Verify, OpOutcome::Attempt);

			match self.verify_configuration().instrument(span).await {
				Ok(()) => {
					self.verified.store(true, Ordering::Release);
					obs::record_op_outcome(OpKind::Verify, OpOutcome::Success);
				},
				Err(e) => {
					tracing::error!(error = %e, "Configuration verification failed; will retry on the next state query.");
					obs::record_op_outcome(OpKind::Verify, OpOutcome::Failure);
				},
			}
		}

		false
	}

	async fn verify_configuration(&self) -> Result<()> {
		let request = RequestDescriptor::get(self.endpoints.account.clone());
		let response = self.transport.dispatch(request).await?;

		if response.status != 200 {
			return Err(Error::Status { status: response.status, body: response.body });
		}

		let document: AccountDocument = http::parse_json(&response.body, response.status)?;
		let unit = document
			.included
			.iter()
			.find(|resource| resource.kind == "units")
			.ok_or(ConfigError::MissingResource { kind: "units" })?;
		let building = document
			.included
			.iter()
			.find(|resource| resource.kind == "buildings")
			.ok_or(ConfigError::MissingResource { kind: "buildings" })?;
		let building_name = building.attributes.name.as_deref().unwrap_or("unknown building");
		let unit_label = unit.attributes.label.as_deref().unwrap_or("unknown unit");

		tracing::info!("Configured for {building_name} {unit_label}.");

		Ok(())
	}

	/// Sends a door-release request through the authenticated transport.
	///
	/// Success is exactly status 200 or 201 with a body carrying `data.id`.
	/// Everything else (an unexpected status, a malformed success body, a
	/// transport or refresh failure) is reported to the caller; the actuation
	/// itself is never retried.
	pub async fn actuate(&self) -> Result<ReleaseReceipt> {
		let span = tracing::info_span!(
			"butterflymx_bridge.op",
			op = OpKind::Release.as_str(),
			stage = "actuate"
		);

		obs::record_op_outcome(OpKind::Release, OpOutcome::Attempt);

		let result = self.release().instrument(span).await;

		match &result {
			Ok(_) => obs::record_op_outcome(OpKind::Release, OpOutcome::Success),
			Err(e) => {
				tracing::error!(error = %e, "Door release failed.");
				obs::record_op_outcome(OpKind::Release, OpOutcome::Failure);
			},
		}

		result
	}

	async fn release(&self) -> Result<ReleaseReceipt> {
		tracing::info!(unit = %self.target.unit, panel = %self.target.panel, "Unlocking door.");

		let request = RequestDescriptor::post(self.endpoints.door_release.clone(), self.release_body())
			.content_type("application/x-www-form-urlencoded");
		let response = self.transport.dispatch(request).await?;

		if !matches!(response.status, 200 | 201) {
			return Err(Error::Status { status: response.status, body: response.body });
		}

		let document: ReleaseDocument = http::parse_json(&response.body, response.status)?;

		tracing::info!(id = %document.data.id, "Created door release request.");

		Ok(ReleaseReceipt { id: document.data.id })
	}

	/// Encodes the four release fields in their fixed order.
	fn release_body(&self) -> String {
		let mut body = form_urlencoded::Serializer::new(String::new());

		body.append_pair(RELEASE_TYPE.0, RELEASE_TYPE.1);
		body.append_pair(RELEASE_METHOD.0, RELEASE_METHOD.1);
		body.append_pair(RELEASE_UNIT_KEY, self.target.unit.as_ref());
		body.append_pair(RELEASE_PANEL_KEY, self.target.panel.as_ref());

		body.finish()
	}
}
impl<C> Debug for DoorLock<C>
where
	C: ?Sized + HttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DoorLock")
			.field("target", &self.target)
			.field("endpoints", &self.endpoints)
			.field("verified", &self.verified.load(Ordering::Acquire))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::config::{PanelId, UnitId};

	#[cfg(feature = "reqwest")]
	fn build_lock() -> DoorLock<crate::http::ReqwestHttpClient> {
		let config = BridgeConfig {
			client_id: "client-1".into(),
			auth_token: "A1".into(),
			refresh_token: "R1".into(),
			unit_id: UnitId::new("unit-101").expect("Unit fixture should be valid."),
			panel_id: PanelId::new("panel-7").expect("Panel fixture should be valid."),
		};

		DoorLock::new(config, Endpoints::default(), crate::http::ReqwestHttpClient::default())
			.expect("Facade fixture should build.")
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn release_body_is_fixed_order_and_percent_encoded() {
		let lock = build_lock();
		let body = lock.release_body();

		assert_eq!(
			body,
			"data%5Btype%5D=door_release_requests\
			&data%5Battributes%5D%5Brelease_method%5D=front_door_view\
			&data%5Brelationships%5D%5Bunit%5D%5Bdata%5D%5Bid%5D=unit-101\
			&data%5Brelationships%5D%5Bpanel%5D%5Bdata%5D%5Bid%5D=panel-7",
		);
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn release_body_round_trips_through_a_form_decoder() {
		let lock = build_lock();
		let body = lock.release_body();
		let decoded: Vec<(String, String)> = form_urlencoded::parse(body.as_bytes())
			.map(|(key, value)| (key.into_owned(), value.into_owned()))
			.collect();

		let expected = [
			("data[type]".to_owned(), "door_release_requests".to_owned()),
			("data[attributes][release_method]".to_owned(), "front_door_view".to_owned()),
			("data[relationships][unit][data][id]".to_owned(), "unit-101".to_owned()),
			("data[relationships][panel][data][id]".to_owned(), "panel-7".to_owned()),
		];

		assert_eq!(decoded, expected);
	}

	#[test]
	fn account_document_locates_first_units_and_buildings() {
		let raw = r#"{
			"included": [
				{"type": "panels", "attributes": {"name": "Front"}},
				{"type": "units", "attributes": {"label": "101"}},
				{"type": "units", "attributes": {"label": "102"}},
				{"type": "buildings", "attributes": {"name": "Oak Tower"}}
			]
		}"#;
		let document: AccountDocument =
			serde_json::from_str(raw).expect("Account fixture should deserialize.");
		let unit = document
			.included
			.iter()
			.find(|resource| resource.kind == "units")
			.expect("Fixture should contain a unit.");
		let building = document
			.included
			.iter()
			.find(|resource| resource.kind == "buildings")
			.expect("Fixture should contain a building.");

		assert_eq!(unit.attributes.label.as_deref(), Some("101"));
		assert_eq!(building.attributes.name.as_deref(), Some("Oak Tower"));
	}

	#[test]
	fn release_document_requires_data_id() {
		let document: ReleaseDocument = serde_json::from_str("{\"data\":{\"id\":\"D1\"}}")
			.expect("Release fixture should deserialize.");

		assert_eq!(document.data.id, "D1");
		assert!(serde_json::from_str::<ReleaseDocument>("{\"data\":{}}").is_err());
	}
}

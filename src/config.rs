//! Construction inputs: validated identifiers, target identity, credentials, endpoints.

// std
use std::ops::Deref;
// crates.io
use url::Host;
// self
use crate::{_prelude::*, error::ConfigError};

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, Hash, Deserialize)]
		#[serde(try_from = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 64;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (unit, panel).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (unit, panel).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (unit, panel).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { UnitId, "Vendor identifier of the unit whose door is actuated.", "Unit" }
def_id! { PanelId, "Vendor identifier of the intercom panel wired to the door release.", "Panel" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

/// Immutable pair identifying which physical door the bridge actuates.
///
/// Set once at construction and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetIdentity {
	/// Unit the door release belongs to.
	pub unit: UnitId,
	/// Intercom panel that executes the release.
	pub panel: PanelId,
}

/// Everything a host process supplies to construct the bridge.
///
/// Field names deserialize from the camelCase keys the original plugin's
/// configuration block used, so an existing config file can be handed over
/// unchanged.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
	/// OAuth 2.0 client identifier presented during refresh exchanges.
	pub client_id: String,
	/// Initial access token; replaced in place after the first refresh.
	pub auth_token: String,
	/// Refresh token exchanged at the vendor's OAuth endpoint.
	pub refresh_token: String,
	/// Unit whose door is actuated.
	pub unit_id: UnitId,
	/// Panel wired to the door release.
	pub panel_id: PanelId,
}
impl Debug for BridgeConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BridgeConfig")
			.field("client_id", &self.client_id)
			.field("auth_token", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.field("unit_id", &self.unit_id)
			.field("panel_id", &self.panel_id)
			.finish()
	}
}

const DEFAULT_TOKEN_ENDPOINT: &str = "https://accounts.butterflymx.com/oauth/token";
const DEFAULT_ACCOUNT_ENDPOINT: &str = "https://api.butterflymx.com/mobile/v3/me";
const DEFAULT_DOOR_RELEASE_ENDPOINT: &str = "https://api.butterflymx.com/mobile/v3/door_release_requests";

/// Vendor API endpoints the bridge talks to.
///
/// Defaults to the production hosts; every field can be overridden, which is
/// how the integration suite points the bridge at a mock server.
#[derive(Clone, Debug)]
pub struct Endpoints {
	/// OAuth token endpoint used for refresh exchanges.
	pub token: Url,
	/// Account metadata endpoint probed by the one-time configuration check.
	pub account: Url,
	/// Door-release endpoint actuation posts against.
	pub door_release: Url,
}
impl Endpoints {
	/// Ensures every endpoint is https or points at a loopback address.
	pub fn validate(&self) -> Result<(), ConfigError> {
		validate_endpoint("token", &self.token)?;
		validate_endpoint("account", &self.account)?;
		validate_endpoint("door_release", &self.door_release)?;

		Ok(())
	}
}
impl Default for Endpoints {
	fn default() -> Self {
		Self {
			token: parse_known(DEFAULT_TOKEN_ENDPOINT),
			account: parse_known(DEFAULT_ACCOUNT_ENDPOINT),
			door_release: parse_known(DEFAULT_DOOR_RELEASE_ENDPOINT),
		}
	}
}

fn parse_known(value: &'static str) -> Url {
	match Url::parse(value) {
		Ok(url) => url,
		// The defaults above are compile-time constants.
		Err(_) => unreachable!("Default endpoint constants must parse."),
	}
}

fn validate_endpoint(endpoint: &'static str, url: &Url) -> Result<(), ConfigError> {
	if url.scheme() == "https" || is_loopback(url) {
		return Ok(());
	}

	Err(ConfigError::InsecureEndpoint { endpoint, url: url.clone() })
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain == "localhost",
		Some(Host::Ipv4(ip)) => ip.is_loopback(),
		Some(Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_validate_shape() {
		assert!(UnitId::new("").is_err());
		assert!(UnitId::new("unit 101").is_err());
		assert!(PanelId::new("a".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());

		let unit = UnitId::new("12345").expect("Unit fixture should be valid.");

		assert_eq!(unit.as_ref(), "12345");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let unit: UnitId =
			serde_json::from_str("\"unit-42\"").expect("Unit should deserialize successfully.");

		assert_eq!(unit.as_ref(), "unit-42");
		assert!(serde_json::from_str::<UnitId>("\"with space\"").is_err());
	}

	#[test]
	fn config_deserializes_camel_case_keys() {
		let raw = r#"{
			"clientId": "client-1",
			"authToken": "A1",
			"refreshToken": "R1",
			"unitId": "U1",
			"panelId": "P1"
		}"#;
		let config: BridgeConfig =
			serde_json::from_str(raw).expect("Config fixture should deserialize successfully.");

		assert_eq!(config.client_id, "client-1");
		assert_eq!(config.unit_id.as_ref(), "U1");
		assert_eq!(config.panel_id.as_ref(), "P1");

		let printed = format!("{config:?}");

		assert!(!printed.contains("A1"), "Debug output must redact the access token.");
		assert!(!printed.contains("R1"), "Debug output must redact the refresh token.");
	}

	#[test]
	fn endpoints_reject_insecure_hosts() {
		let mut endpoints = Endpoints::default();

		endpoints.validate().expect("Production defaults should validate.");

		endpoints.token =
			Url::parse("http://accounts.example.com/oauth/token").expect("Fixture URL should parse.");

		assert!(matches!(
			endpoints.validate(),
			Err(ConfigError::InsecureEndpoint { endpoint: "token", .. })
		));

		endpoints.token =
			Url::parse("http://127.0.0.1:9999/oauth/token").expect("Loopback URL should parse.");

		endpoints.validate().expect("Loopback http endpoints should be accepted for tests.");
	}
}

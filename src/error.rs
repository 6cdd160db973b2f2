//! Bridge-level error types shared across the transport, facade, and accessory layers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical bridge error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS); no HTTP response was received.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Token endpoint refused the refresh exchange; the pending request was abandoned.
	#[error("Token endpoint refused the refresh request with status {status}.")]
	Refresh {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Raw response body, kept for diagnostics.
		body: String,
	},
	/// Vendor API answered with a status outside the operation's success set.
	#[error("Vendor API returned unexpected status {status}.")]
	Status {
		/// HTTP status code of the completed response.
		status: u16,
		/// Raw response body, kept for diagnostics.
		body: String,
	},
	/// Vendor API returned malformed JSON for an otherwise successful call.
	#[error("Vendor API returned malformed JSON.")]
	Parse {
		/// Structured parsing failure carrying the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status of the response that failed to parse.
		status: u16,
	},
}

/// Configuration and validation failures raised while assembling the bridge.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint URL cannot be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint URL uses a scheme the bridge refuses to send credentials over.
	#[error("Endpoint `{endpoint}` must use https or point at a loopback address.")]
	InsecureEndpoint {
		/// Endpoint label (token, account, door_release).
		endpoint: &'static str,
		/// Offending URL.
		url: Url,
	},
	/// Unit or panel identifier failed validation.
	#[error("Unit or panel identifier is invalid.")]
	InvalidIdentifier(#[from] crate::config::IdentifierError),
	/// Account metadata omitted a resource the configuration check requires.
	#[error("Account metadata did not include any `{kind}` resource.")]
	MissingResource {
		/// Resource type that was absent (`units` or `buildings`).
		kind: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the vendor API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the vendor API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

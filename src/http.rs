//! Transport primitives for vendor API calls.
//!
//! The module exposes [`HttpClient`] alongside [`RequestDescriptor`] and
//! [`HttpResponse`] so downstream hosts can integrate custom HTTP stacks. The
//! trait is the crate's only dependency on an HTTP implementation; the bundled
//! [`ReqwestHttpClient`] satisfies it behind the default `reqwest` feature.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";

/// HTTP methods the bridge issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	/// GET request.
	Get,
	/// POST request.
	Post,
}
impl Method {
	/// Returns the canonical method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Ephemeral description of one outbound request.
///
/// Constructed fresh per call and discarded after response handling. The
/// transport stamps the `Authorization` header at dispatch time, and rewrites
/// it before the single replay that follows a refresh.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
	/// HTTP method.
	pub method: Method,
	/// Target URL.
	pub url: Url,
	/// Header map; later insertions overwrite earlier ones by name.
	pub headers: BTreeMap<String, String>,
	/// Opaque request body, absent for GET requests.
	pub body: Option<String>,
}
impl RequestDescriptor {
	/// Describes a GET request for `url`.
	pub fn get(url: Url) -> Self {
		Self { method: Method::Get, url, headers: BTreeMap::new(), body: None }
	}

	/// Describes a POST request for `url` carrying `body`.
	pub fn post(url: Url, body: impl Into<String>) -> Self {
		Self { method: Method::Post, url, headers: BTreeMap::new(), body: Some(body.into()) }
	}

	/// Adds a header, replacing any previous value for the same name.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Sets the `Content-Type` header.
	pub fn content_type(self, value: impl Into<String>) -> Self {
		self.header(CONTENT_TYPE, value)
	}

	/// Stamps (or overwrites) the `Authorization` header with a bearer token.
	pub fn bearer(&mut self, token: &str) {
		self.headers.insert(AUTHORIZATION.into(), format!("Bearer {token}"));
	}

	/// Current `Authorization` header value, if any.
	pub fn authorization(&self) -> Option<&str> {
		self.headers.get(AUTHORIZATION).map(String::as_str)
	}
}

/// Completed HTTP exchange: status code plus the raw body.
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: String,
}
impl HttpResponse {
	/// `true` when the response signals an authorization failure.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}
}

/// Boxed future resolved by [`HttpClient::execute`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing vendor API calls.
///
/// Implementations must be `Send + Sync + 'static` so one client can be shared
/// across the transport and facade without wrappers, and the returned future
/// must be `Send` for the lifetime of the in-flight request. Network-level
/// failures are reported through [`TransportError::network`]; an HTTP response
/// of any status is a successful execution.
pub trait HttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and resolves with the completed response.
	fn execute(&self, request: RequestDescriptor) -> HttpFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one
/// place. No timeout or redirect policy of its own; the bridge relies on the
/// underlying client's defaults.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpClient for ReqwestHttpClient {
	fn execute(&self, request: RequestDescriptor) -> HttpFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = match request.method {
				Method::Get => client.get(request.url),
				Method::Post => client.post(request.url),
			};

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.text().await.map_err(TransportError::from)?;

			Ok(HttpResponse { status, body })
		})
	}
}

/// Parses a JSON response body, attaching the offending path on failure.
pub(crate) fn parse_json<T>(body: &str, status: u16) -> Result<T>
where
	T: serde::de::DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_str(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::Parse { source, status })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Fixture URL should parse.")
	}

	#[test]
	fn bearer_overwrites_previous_token() {
		let mut descriptor = RequestDescriptor::get(url("https://api.example.com/me"));

		descriptor.bearer("A1");

		assert_eq!(descriptor.authorization(), Some("Bearer A1"));

		descriptor.bearer("A2");

		assert_eq!(descriptor.authorization(), Some("Bearer A2"));
		assert_eq!(descriptor.headers.len(), 1);
	}

	#[test]
	fn post_descriptor_carries_body_and_content_type() {
		let descriptor = RequestDescriptor::post(url("https://api.example.com/x"), "a=b")
			.content_type("application/x-www-form-urlencoded");

		assert_eq!(descriptor.method.as_str(), "POST");
		assert_eq!(descriptor.body.as_deref(), Some("a=b"));
		assert_eq!(
			descriptor.headers.get("Content-Type").map(String::as_str),
			Some("application/x-www-form-urlencoded"),
		);
	}

	#[test]
	fn unauthorized_detection_is_exact() {
		assert!(HttpResponse { status: 401, body: String::new() }.is_unauthorized());
		assert!(!HttpResponse { status: 403, body: String::new() }.is_unauthorized());
	}

	#[test]
	fn parse_json_reports_offending_path() {
		#[derive(serde::Deserialize, Debug)]
		struct Doc {
			#[allow(dead_code)]
			data: Inner,
		}
		#[derive(serde::Deserialize, Debug)]
		struct Inner {
			#[allow(dead_code)]
			id: String,
		}

		let err = parse_json::<Doc>("{\"data\":{}}", 200).expect_err("Missing id should fail.");

		match err {
			Error::Parse { source, status } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "data");
			},
			other => panic!("Expected a parse error, got {other:?}."),
		}
	}
}

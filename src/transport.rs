//! Authenticated dispatch with transparent refresh and a single replay.
//!
//! [`AuthTransport::dispatch`] stamps the session's current bearer token onto
//! a request, detects an authorization failure, performs one single-flight
//! refresh exchange, and replays the original request exactly once with the
//! rotated token. Everything else (transport failures, non-401 statuses, a
//! second 401 after a fresh refresh) is handed back to the caller unchanged.

// crates.io
use tracing::Instrument;
// self
use crate::{
	_prelude::*,
	http::{self, HttpClient, HttpResponse, RequestDescriptor},
	obs::{self, OpKind, OpOutcome},
	session::{AccessSecret, Session, TokenPair},
};

const GRANT_TYPE: &str = "refresh_token";

/// Wire model of a successful token endpoint response.
#[derive(Deserialize)]
struct RefreshResponse {
	access_token: String,
	refresh_token: String,
}

/// Issues vendor API requests on behalf of the session.
///
/// Generic over [`HttpClient`] so hosts can substitute their own stack; the
/// bundled reqwest transport is the default. Cloning is cheap; the session
/// and client are shared behind [`Arc`]s.
#[derive(Clone)]
pub struct AuthTransport<C>
where
	C: ?Sized + HttpClient,
{
	/// HTTP client used for every outbound request.
	pub http: Arc<C>,
	/// Session holding the current token pair.
	pub session: Arc<Session>,
	token_endpoint: Url,
}
impl<C> AuthTransport<C>
where
	C: ?Sized + HttpClient,
{
	/// Creates a transport bound to `session` and the vendor's token endpoint.
	pub fn new(http: impl Into<Arc<C>>, session: Arc<Session>, token_endpoint: Url) -> Self {
		Self { http: http.into(), session, token_endpoint }
	}

	/// Dispatches `descriptor` with the current access token.
	///
	/// A transport-level failure surfaces immediately; there is no HTTP
	/// response to classify, so no refresh is attempted. A 401 triggers the
	/// refresh procedure followed by exactly one replay carrying the rotated
	/// token. Any other status is forwarded unchanged; classifying success
	/// belongs to the caller.
	pub async fn dispatch(&self, mut descriptor: RequestDescriptor) -> Result<HttpResponse> {
		let stale = self.session.access_token();

		descriptor.bearer(stale.expose());

		let mut replay = descriptor.clone();
		let response = self.http.execute(descriptor).await?;

		if !response.is_unauthorized() {
			return Ok(response);
		}

		tracing::warn!(
			status = response.status,
			"Access token was rejected; attempting a session refresh."
		);

		let rotated = self.refresh(&stale).await?;

		replay.bearer(rotated.expose());

		// The replay's outcome is final: a second 401 is handed back unchanged
		// instead of triggering another refresh.
		let replayed = self.http.execute(replay).await?;

		Ok(replayed)
	}

	/// Exchanges the refresh token for a new pair and installs it.
	///
	/// Single-flight: callers that lose the race on the session gate adopt the
	/// winner's rotation instead of issuing a second exchange.
	async fn refresh(&self, stale: &AccessSecret) -> Result<AccessSecret> {
		let span = tracing::info_span!(
			"butterflymx_bridge.op",
			op = OpKind::Refresh.as_str(),
			stage = "refresh"
		);

		obs::record_op_outcome(OpKind::Refresh, OpOutcome::Attempt);

		let result = self.refresh_locked(stale).instrument(span).await;

		match &result {
			Ok(_) => obs::record_op_outcome(OpKind::Refresh, OpOutcome::Success),
			Err(e) => {
				tracing::error!(error = %e, "Session refresh failed; the pending request is abandoned.");
				obs::record_op_outcome(OpKind::Refresh, OpOutcome::Failure);
			},
		}

		result
	}

	async fn refresh_locked(&self, stale: &AccessSecret) -> Result<AccessSecret> {
		let _gate = self.session.refresh_gate().lock().await;
		let current = self.session.access_token();

		// Another dispatch rotated the pair while we waited on the gate.
		if current != *stale {
			return Ok(current);
		}

		let refresh = self.session.refresh_token();
		let payload = serde_json::json!({
			"refresh_token": refresh.expose(),
			"client_id": self.session.client_id(),
			"grant_type": GRANT_TYPE,
		})
		.to_string();
		let request = RequestDescriptor::post(self.token_endpoint.clone(), payload)
			.content_type("application/json");
		let response = self.http.execute(request).await?;

		if response.status != 200 {
			return Err(Error::Refresh { status: response.status, body: response.body });
		}

		let rotated: RefreshResponse = http::parse_json(&response.body, response.status)?;
		let pair = TokenPair::new(rotated.access_token, rotated.refresh_token);
		let access = pair.access.clone();

		self.session.install(pair);

		Ok(access)
	}
}
impl<C> Debug for AuthTransport<C>
where
	C: ?Sized + HttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthTransport")
			.field("session", &self.session)
			.field("token_endpoint", &self.token_endpoint.as_str())
			.finish()
	}
}

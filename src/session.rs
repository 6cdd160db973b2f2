//! Process-lifetime OAuth session: the current token pair plus a single-flight refresh gate.

// self
use crate::_prelude::*;

/// Redacted bearer secret keeping token material out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessSecret(String);
impl AccessSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for AccessSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AccessSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessSecret").field(&"<redacted>").finish()
	}
}
impl Display for AccessSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Access/refresh pair held by the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenPair {
	/// Bearer token stamped onto every vendor API request.
	pub access: AccessSecret,
	/// Secret exchanged at the token endpoint when the access token expires.
	pub refresh: AccessSecret,
}
impl TokenPair {
	/// Wraps raw token strings into a redacted pair.
	pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
		Self { access: AccessSecret::new(access), refresh: AccessSecret::new(refresh) }
	}
}

/// Single authoritative credential record for the process lifetime.
///
/// Readers snapshot the pair under the mutex, so they observe a consistent
/// pre- or post-refresh value and never a partially updated one.
/// [`Session::install`] is the only mutation entry point; the transport calls
/// it once per successful refresh exchange. The async gate serializes refresh
/// attempts so exactly one exchange is in flight at a time.
pub struct Session {
	client_id: String,
	tokens: Mutex<TokenPair>,
	refresh_gate: AsyncMutex<()>,
}
impl Session {
	/// Creates a session from the construction-time credentials.
	pub fn new(client_id: impl Into<String>, tokens: TokenPair) -> Self {
		Self {
			client_id: client_id.into(),
			tokens: Mutex::new(tokens),
			refresh_gate: AsyncMutex::new(()),
		}
	}

	/// OAuth client identifier presented during refresh exchanges.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Snapshots the current token pair.
	pub fn tokens(&self) -> TokenPair {
		self.tokens.lock().clone()
	}

	/// Snapshots the current access token.
	pub fn access_token(&self) -> AccessSecret {
		self.tokens.lock().access.clone()
	}

	/// Snapshots the current refresh token.
	pub fn refresh_token(&self) -> AccessSecret {
		self.tokens.lock().refresh.clone()
	}

	/// Formats the `Authorization` header value for the current access token.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.tokens.lock().access.expose())
	}

	/// Replaces both secrets atomically. The sole mutation entry point.
	pub fn install(&self, tokens: TokenPair) {
		*self.tokens.lock() = tokens;
	}

	/// Gate serializing refresh exchanges across concurrent dispatches.
	pub(crate) fn refresh_gate(&self) -> &AsyncMutex<()> {
		&self.refresh_gate
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("client_id", &self.client_id)
			.field("tokens", &"<redacted>")
			.finish()
	}
}

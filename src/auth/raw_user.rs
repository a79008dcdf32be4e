//! Raw user records as delivered by the protocol engine.

// self
use crate::_prelude::*;

/// Error returned when a raw user payload cannot be parsed.
#[derive(Debug, ThisError)]
#[error("Raw user payload is malformed at `{}`.", .source.path())]
pub struct RawUserParseError {
	/// Structured parsing failure, including the offending JSON path.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
}

/// Profile claims carried by a raw user record.
///
/// Only the claims the session layer maps are named; anything else the provider sends is kept
/// in [`extra`](Self::extra).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProfile {
	/// Subject identifier.
	#[serde(default)]
	pub sub: Option<String>,
	/// Email address.
	#[serde(default)]
	pub email: Option<String>,
	/// Given name.
	#[serde(default)]
	pub given_name: Option<String>,
	/// Family name.
	#[serde(default)]
	pub family_name: Option<String>,
	/// Organization display name.
	#[serde(default)]
	pub org_name: Option<String>,
	/// Organization identifier.
	#[serde(default)]
	pub org_id: Option<String>,
	/// Site identifier within the organization.
	#[serde(default)]
	pub site_id: Option<String>,
	/// Country code.
	#[serde(default)]
	pub country_code: Option<String>,
	/// Claims not mapped onto a credential.
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}

/// Provider-issued user record, prior to validation.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
	/// Access token issued for API calls.
	#[serde(default)]
	pub access_token: Option<String>,
	/// Identity token issued alongside the access token.
	#[serde(default)]
	pub id_token: Option<String>,
	/// Token type (usually `Bearer`).
	#[serde(default)]
	pub token_type: Option<String>,
	/// Space-delimited scopes granted by the provider.
	#[serde(default)]
	pub scope: Option<String>,
	/// Absolute expiry as unix seconds.
	#[serde(default)]
	pub expires_at: Option<i64>,
	/// Validity duration in seconds.
	#[serde(default)]
	pub expires_in: Option<i64>,
	/// Profile claims.
	#[serde(default)]
	pub profile: RawProfile,
}
impl RawUser {
	/// Parses a JSON payload, reporting the path of the first malformed field.
	pub fn from_json(payload: &str) -> Result<Self, RawUserParseError> {
		let mut de = serde_json::Deserializer::from_str(payload);

		serde_path_to_error::deserialize(&mut de).map_err(|source| RawUserParseError { source })
	}

	/// Absolute expiry instant, when the provider supplied a representable one.
	pub fn expiry(&self) -> Option<OffsetDateTime> {
		self.expires_at.and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
	}

	/// Returns `true` if the record carries an expiry at or before `instant`.
	///
	/// Records without an expiry are not considered expired here; the credential factory
	/// rejects them instead.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		match self.expires_at {
			Some(secs) => secs <= instant.unix_timestamp(),
			None => false,
		}
	}
}
impl Debug for RawUser {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RawUser")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("expires_at", &self.expires_at)
			.field("expires_in", &self.expires_in)
			.field("profile", &self.profile)
			.finish()
	}
}

//! Immutable credential values and the factory that maps raw provider records onto them.

// self
use crate::{
	_prelude::*,
	auth::{BearerToken, RawUser},
};

/// Current lifecycle status for a credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialStatus {
	/// The validity window has not started yet.
	Pending,
	/// The credential is currently valid.
	Active,
	/// The credential reached its expiry instant.
	Expired,
}

/// Errors produced while building a [`Credential`] from a [`RawUser`].
///
/// A provider response missing a mandatory field indicates a misconfigured identity provider,
/// so the factory never substitutes defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum CredentialError {
	/// A mandatory field or claim was absent.
	#[error("Raw user is missing the mandatory `{field}` field.")]
	MissingField {
		/// Name of the absent field.
		field: &'static str,
	},
	/// The validity duration was negative, which would invert the validity window.
	#[error("The expires_in value must not be negative.")]
	NegativeExpiresIn,
	/// The absolute expiry is outside the representable range.
	#[error("The expires_at value exceeds the supported range.")]
	ExpiresAtOutOfRange,
}

/// Identity claims copied verbatim from the provider profile.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityClaims {
	/// Subject identifier.
	pub subject: String,
	/// Email address.
	pub email: String,
	/// Given name.
	pub given_name: Option<String>,
	/// Family name.
	pub family_name: Option<String>,
	/// Organization display name.
	pub organization_name: Option<String>,
	/// Organization identifier.
	pub organization_id: Option<String>,
	/// Site identifier.
	pub site_id: Option<String>,
	/// Country code.
	pub country_code: Option<String>,
}

/// Authenticated session credential.
///
/// Values are only produced by [`Credential::from_raw_user`] and are never mutated; a new
/// session state replaces the whole value. `valid_from <= expires_at` always holds.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
	token: BearerToken,
	valid_from: OffsetDateTime,
	expires_at: OffsetDateTime,
	claims: IdentityClaims,
}
impl Credential {
	/// Maps a raw provider record onto a credential.
	///
	/// The window starts at `expires_at - expires_in`. The subject, email, access token, and
	/// both expiry fields are mandatory.
	pub fn from_raw_user(user: &RawUser) -> Result<Self, CredentialError> {
		let access_token = required("access_token", user.access_token.as_deref())?;
		let subject = required("sub", user.profile.sub.as_deref())?;
		let email = required("email", user.profile.email.as_deref())?;
		let expires_at_secs =
			user.expires_at.ok_or(CredentialError::MissingField { field: "expires_at" })?;
		let expires_in_secs =
			user.expires_in.ok_or(CredentialError::MissingField { field: "expires_in" })?;

		if expires_in_secs < 0 {
			return Err(CredentialError::NegativeExpiresIn);
		}

		let expires_at = OffsetDateTime::from_unix_timestamp(expires_at_secs)
			.map_err(|_| CredentialError::ExpiresAtOutOfRange)?;
		let valid_from = expires_at
			.checked_sub(Duration::seconds(expires_in_secs))
			.ok_or(CredentialError::ExpiresAtOutOfRange)?;
		let profile = &user.profile;

		Ok(Self {
			token: BearerToken::new(access_token),
			valid_from,
			expires_at,
			claims: IdentityClaims {
				subject: subject.to_owned(),
				email: email.to_owned(),
				given_name: profile.given_name.clone(),
				family_name: profile.family_name.clone(),
				organization_name: profile.org_name.clone(),
				organization_id: profile.org_id.clone(),
				site_id: profile.site_id.clone(),
				country_code: profile.country_code.clone(),
			},
		})
	}

	/// Bearer token to attach to API calls.
	pub fn token(&self) -> &BearerToken {
		&self.token
	}

	/// Start of the validity window.
	pub fn valid_from(&self) -> OffsetDateTime {
		self.valid_from
	}

	/// End of the validity window.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.expires_at
	}

	/// Identity claims for the authenticated user.
	pub fn claims(&self) -> &IdentityClaims {
		&self.claims
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> CredentialStatus {
		if instant < self.valid_from {
			return CredentialStatus::Pending;
		}
		if instant >= self.expires_at {
			return CredentialStatus::Expired;
		}

		CredentialStatus::Active
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> CredentialStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the credential has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), CredentialStatus::Expired)
	}

	/// Returns `true` if the credential is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		matches!(self.status(), CredentialStatus::Expired)
	}

	/// Time left until expiry, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl TryFrom<&RawUser> for Credential {
	type Error = CredentialError;

	fn try_from(user: &RawUser) -> Result<Self, Self::Error> {
		Self::from_raw_user(user)
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("token", &self.token)
			.field("valid_from", &self.valid_from)
			.field("expires_at", &self.expires_at)
			.field("claims", &self.claims)
			.finish()
	}
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, CredentialError> {
	value.ok_or(CredentialError::MissingField { field })
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::auth::RawProfile;

	fn raw_user(expires_at: OffsetDateTime, expires_in: i64) -> RawUser {
		RawUser {
			access_token: Some("access-1".into()),
			id_token: Some("id-1".into()),
			token_type: Some("Bearer".into()),
			scope: Some("openid profile".into()),
			expires_at: Some(expires_at.unix_timestamp()),
			expires_in: Some(expires_in),
			profile: RawProfile {
				sub: Some("user-1".into()),
				email: Some("ada@example.com".into()),
				given_name: Some("Ada".into()),
				family_name: Some("Lovelace".into()),
				org_name: Some("Analytical Engines".into()),
				org_id: Some("org-7".into()),
				site_id: Some("site-3".into()),
				country_code: Some("GB".into()),
				..Default::default()
			},
		}
	}

	#[test]
	fn window_starts_at_expiry_minus_duration() {
		let expiry = macros::datetime!(2025-01-01 01:00 UTC);
		let credential = Credential::from_raw_user(&raw_user(expiry, 3600))
			.expect("Complete raw user should map onto a credential.");

		assert_eq!(credential.valid_from(), macros::datetime!(2025-01-01 00:00 UTC));
		assert_eq!(credential.expires_at(), expiry);
		assert_eq!(credential.token().expose(), "access-1");
	}

	#[test]
	fn claims_are_copied_verbatim() {
		let user = raw_user(macros::datetime!(2025-01-01 01:00 UTC), 60);
		let claims = Credential::from_raw_user(&user)
			.expect("Complete raw user should map onto a credential.")
			.claims()
			.clone();

		assert_eq!(
			claims,
			IdentityClaims {
				subject: "user-1".into(),
				email: "ada@example.com".into(),
				given_name: Some("Ada".into()),
				family_name: Some("Lovelace".into()),
				organization_name: Some("Analytical Engines".into()),
				organization_id: Some("org-7".into()),
				site_id: Some("site-3".into()),
				country_code: Some("GB".into()),
			}
		);
	}

	#[test]
	fn factory_is_deterministic() {
		let user = raw_user(macros::datetime!(2025-01-01 01:00 UTC), 1800);
		let first = Credential::from_raw_user(&user).expect("First build should succeed.");
		let second = Credential::try_from(&user).expect("Second build should succeed.");

		assert_eq!(first, second);
	}

	#[test]
	fn mandatory_fields_fail_loudly() {
		let base = raw_user(macros::datetime!(2025-01-01 01:00 UTC), 60);
		let mut missing_sub = base.clone();

		missing_sub.profile.sub = None;

		let mut missing_email = base.clone();

		missing_email.profile.email = None;

		let mut missing_token = base.clone();

		missing_token.access_token = None;

		let mut missing_expiry = base.clone();

		missing_expiry.expires_at = None;

		let mut missing_duration = base;

		missing_duration.expires_in = None;

		for (user, field) in [
			(missing_sub, "sub"),
			(missing_email, "email"),
			(missing_token, "access_token"),
			(missing_expiry, "expires_at"),
			(missing_duration, "expires_in"),
		] {
			assert_eq!(
				Credential::from_raw_user(&user),
				Err(CredentialError::MissingField { field }),
				"Missing `{field}` must be rejected."
			);
			assert_eq!(
				Credential::from_raw_user(&user),
				Err(CredentialError::MissingField { field }),
				"Failures must be deterministic."
			);
		}
	}

	#[test]
	fn negative_duration_is_rejected() {
		let user = raw_user(macros::datetime!(2025-01-01 01:00 UTC), -1);

		assert_eq!(Credential::from_raw_user(&user), Err(CredentialError::NegativeExpiresIn));
	}

	#[test]
	fn status_transitions_cover_all_states() {
		let credential =
			Credential::from_raw_user(&raw_user(macros::datetime!(2025-01-01 01:00 UTC), 3600))
				.expect("Complete raw user should map onto a credential.");

		assert_eq!(
			credential.status_at(macros::datetime!(2024-12-31 23:59 UTC)),
			CredentialStatus::Pending
		);
		assert_eq!(
			credential.status_at(macros::datetime!(2025-01-01 00:30 UTC)),
			CredentialStatus::Active
		);
		assert!(credential.is_expired_at(macros::datetime!(2025-01-01 01:00 UTC)));
		assert_eq!(
			credential.remaining_at(macros::datetime!(2025-01-01 00:45 UTC)),
			Duration::minutes(15)
		);
		assert_eq!(credential.remaining_at(macros::datetime!(2025-01-01 02:00 UTC)), Duration::ZERO);
	}

	#[test]
	fn debug_redacts_the_token() {
		let credential =
			Credential::from_raw_user(&raw_user(macros::datetime!(2025-01-01 01:00 UTC), 60))
				.expect("Complete raw user should map onto a credential.");

		assert!(!format!("{credential:?}").contains("access-1"));
	}
}

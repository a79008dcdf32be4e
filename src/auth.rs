//! Auth-domain models: scope sets, bearer tokens, raw provider records, and credentials.

pub mod credential;
pub mod raw_user;
pub mod scope;
pub mod secret;

pub use credential::*;
pub use raw_user::*;
pub use scope::*;
pub use secret::*;

//! Redirect-based OpenID Connect session manager: one credential slot, one change channel, and
//! a readiness gate in front of your identity provider engine.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod navigation;
pub mod obs;
pub mod session;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::{
			Arc,
			atomic::{AtomicBool, AtomicU64, Ordering},
		},
	};

	pub use async_lock::OnceCell as AsyncOnceCell;
	pub use parking_lot::{Mutex, ReentrantMutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use auth::{Credential, CredentialError, CredentialStatus, IdentityClaims, RawUser};
pub use config::{ConfigProvider, SessionConfig};
pub use discovery::{AuthorityDiscovery, StaticDiscovery};
pub use engine::{EngineEvent, EngineEventKind, EngineFactory, MemoryEngine, ProtocolEngine};
pub use error::{Error, Result};
pub use navigation::{MemoryNavigator, Navigator};
pub use session::{ListenerId, SessionManager, SessionState};
#[cfg(feature = "reqwest")] pub use reqwest;
pub use {time, url};
#[cfg(test)] use {httpmock as _, tokio as _};

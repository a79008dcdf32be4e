//! Page location seam: where the application runs, which path is showing, and how to leave it.

// self
use crate::_prelude::*;

/// Location and navigation collaborator injected into the session manager.
pub trait Navigator
where
	Self: Send + Sync,
{
	/// Origin of the running application (scheme, host, port).
	fn origin(&self) -> Url;

	/// Path of the page currently displayed.
	fn current_path(&self) -> String;

	/// Replaces the current location with `path` on the same origin.
	fn replace(&self, path: &str);
}

/// In-memory navigator that tracks a current URL and every replacement made.
#[derive(Clone, Debug)]
pub struct MemoryNavigator {
	location: Arc<RwLock<Url>>,
	replacements: Arc<Mutex<Vec<String>>>,
}
impl MemoryNavigator {
	/// Creates a navigator showing `location`.
	pub fn new(location: Url) -> Self {
		Self { location: Arc::new(RwLock::new(location)), replacements: Default::default() }
	}

	/// Moves to `path` on the same origin, as a user navigation would.
	pub fn set_path(&self, path: &str) {
		self.location.write().set_path(path);
	}

	/// Current location.
	pub fn location(&self) -> Url {
		self.location.read().clone()
	}

	/// Paths passed to [`Navigator::replace`], oldest first.
	pub fn replacements(&self) -> Vec<String> {
		self.replacements.lock().clone()
	}
}
impl Navigator for MemoryNavigator {
	fn origin(&self) -> Url {
		let location = self.location.read();
		let mut origin = location.clone();

		origin.set_path("/");
		origin.set_query(None);
		origin.set_fragment(None);

		origin
	}

	fn current_path(&self) -> String {
		self.location.read().path().to_owned()
	}

	fn replace(&self, path: &str) {
		self.set_path(path);
		self.replacements.lock().push(path.to_owned());
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn replace_records_history_and_moves() {
		let navigator = MemoryNavigator::new(
			Url::parse("https://app.example.com/auth/callback?code=abc#state")
				.expect("Location fixture should parse."),
		);

		assert_eq!(navigator.current_path(), "/auth/callback");
		assert_eq!(navigator.origin().as_str(), "https://app.example.com/");

		navigator.replace("/");

		assert_eq!(navigator.current_path(), "/");
		assert_eq!(navigator.replacements(), vec!["/".to_string()]);
	}

	#[test]
	fn set_path_does_not_count_as_replacement() {
		let navigator = MemoryNavigator::new(
			Url::parse("https://app.example.com/").expect("Location fixture should parse."),
		);

		navigator.set_path("/reports");

		assert_eq!(navigator.current_path(), "/reports");
		assert_eq!(navigator.location().as_str(), "https://app.example.com/reports");
		assert!(navigator.replacements().is_empty());
	}
}

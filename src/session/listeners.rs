//! Change notification channel carrying the current credential to subscribers.

// self
use crate::{_prelude::*, auth::Credential};

/// Callback invoked with the current credential, or `None` when signed out.
pub type Listener = Arc<dyn Fn(Option<&Credential>) + Send + Sync>;

/// Handle returned when a listener is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Ordered set of listeners with synchronous delivery.
///
/// Delivery walks a snapshot taken before the first callback runs, so listeners may add or
/// remove listeners (including themselves) while being notified; such changes apply from the
/// next delivery on.
#[derive(Default)]
pub struct Listeners {
	entries: Mutex<Vec<(ListenerId, Listener)>>,
	next_id: AtomicU64,
}
impl Listeners {
	/// Registers a listener at the end of the delivery order.
	pub fn add(&self, listener: Listener) -> ListenerId {
		let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));

		self.entries.lock().push((id, listener));

		id
	}

	/// Removes a listener; returns `false` if it was not registered.
	pub fn remove(&self, id: ListenerId) -> bool {
		let mut entries = self.entries.lock();
		let before = entries.len();

		entries.retain(|(existing, _)| *existing != id);

		entries.len() != before
	}

	/// Number of registered listeners.
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Returns `true` if nobody is listening.
	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	/// Delivers `credential` to every listener in registration order.
	pub fn notify(&self, credential: Option<&Credential>) {
		let snapshot =
			self.entries.lock().iter().map(|(_, listener)| listener.clone()).collect::<Vec<_>>();

		for listener in snapshot {
			listener(credential);
		}
	}
}
impl Debug for Listeners {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Listeners").field("len", &self.len()).finish()
	}
}

//! Thread-safe in-process [`ProtocolEngine`] for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::RawUser,
	engine::{
		EngineEvent, EngineEventKind, EngineFactory, EngineFuture, EngineHandler, EngineSettings,
		ProtocolEngine, SubscriptionId,
	},
	error::EngineError,
};

#[derive(Default)]
struct MemoryEngineState {
	handlers: Vec<(SubscriptionId, EngineEventKind, EngineHandler)>,
	user: Option<RawUser>,
	settings: Option<EngineSettings>,
	attach_failure: Option<EngineError>,
	user_failure: Option<EngineError>,
	redirect_failure: Option<EngineError>,
	sign_in_callback: Option<Result<(), EngineError>>,
	sign_out_callback: Option<Result<(), EngineError>>,
	sign_in_requests: usize,
	sign_out_requests: usize,
	sign_in_completions: usize,
	sign_out_completions: usize,
}

/// In-process engine that stores the user in memory and raises events on demand.
///
/// The same handle acts as its own [`EngineFactory`], so tests can keep a clone to drive
/// events after handing it to the session manager. Callback completions fail by default,
/// matching a real engine that finds no provider response on the current page; a successful
/// sign-in completion re-raises [`EngineEvent::UserLoaded`] for the stored user.
#[derive(Clone, Default)]
pub struct MemoryEngine {
	state: Arc<Mutex<MemoryEngineState>>,
	next_id: Arc<AtomicU64>,
}
impl MemoryEngine {
	/// Creates an engine that already holds `user`.
	pub fn with_user(user: RawUser) -> Self {
		let engine = Self::default();

		engine.set_user(Some(user));

		engine
	}

	/// Replaces the stored user.
	pub fn set_user(&self, user: Option<RawUser>) {
		self.state.lock().user = user;
	}

	/// Makes the next [`EngineFactory::attach`] calls fail.
	pub fn fail_attach(&self, error: EngineError) {
		self.state.lock().attach_failure = Some(error);
	}

	/// Makes [`ProtocolEngine::current_user`] fail.
	pub fn fail_current_user(&self, error: EngineError) {
		self.state.lock().user_failure = Some(error);
	}

	/// Makes the redirect commands fail.
	pub fn fail_redirects(&self, error: EngineError) {
		self.state.lock().redirect_failure = Some(error);
	}

	/// Sets the outcome of [`ProtocolEngine::complete_sign_in_redirect`].
	pub fn set_sign_in_callback(&self, outcome: Result<(), EngineError>) {
		self.state.lock().sign_in_callback = Some(outcome);
	}

	/// Sets the outcome of [`ProtocolEngine::complete_sign_out_redirect`].
	pub fn set_sign_out_callback(&self, outcome: Result<(), EngineError>) {
		self.state.lock().sign_out_callback = Some(outcome);
	}

	/// Delivers `event` to every handler subscribed to its kind, in subscription order.
	pub fn emit(&self, event: EngineEvent) {
		let kind = event.kind();
		let handlers = self
			.state
			.lock()
			.handlers
			.iter()
			.filter(|(_, subscribed, _)| *subscribed == kind)
			.map(|(_, _, handler)| handler.clone())
			.collect::<Vec<_>>();

		for handler in handlers {
			handler(&event);
		}
	}

	/// Settings received by the last successful attach.
	pub fn settings(&self) -> Option<EngineSettings> {
		self.state.lock().settings.clone()
	}

	/// Number of live subscriptions.
	pub fn subscription_count(&self) -> usize {
		self.state.lock().handlers.len()
	}

	/// Number of live subscriptions for `kind`.
	pub fn subscription_count_for(&self, kind: EngineEventKind) -> usize {
		self.state.lock().handlers.iter().filter(|(_, subscribed, _)| *subscribed == kind).count()
	}

	/// Number of sign-in redirects requested.
	pub fn sign_in_requests(&self) -> usize {
		self.state.lock().sign_in_requests
	}

	/// Number of sign-out redirects requested.
	pub fn sign_out_requests(&self) -> usize {
		self.state.lock().sign_out_requests
	}

	/// Number of sign-in callback completions attempted.
	pub fn sign_in_completions(&self) -> usize {
		self.state.lock().sign_in_completions
	}

	/// Number of sign-out callback completions attempted.
	pub fn sign_out_completions(&self) -> usize {
		self.state.lock().sign_out_completions
	}

	fn callback_outcome(outcome: &Option<Result<(), EngineError>>) -> Result<(), EngineError> {
		outcome.clone().unwrap_or_else(|| {
			Err(EngineError::Callback { message: "No provider response on this page".into() })
		})
	}
}
impl Debug for MemoryEngine {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("MemoryEngine")
			.field("subscriptions", &state.handlers.len())
			.field("user", &state.user)
			.field("settings", &state.settings)
			.finish()
	}
}
impl ProtocolEngine for MemoryEngine {
	fn subscribe(&self, kind: EngineEventKind, handler: EngineHandler) -> SubscriptionId {
		let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));

		self.state.lock().handlers.push((id, kind, handler));

		id
	}

	fn unsubscribe(&self, id: SubscriptionId) {
		self.state.lock().handlers.retain(|(existing, _, _)| *existing != id);
	}

	fn sign_in_redirect(&self) -> Result<(), EngineError> {
		let mut state = self.state.lock();

		if let Some(err) = state.redirect_failure.clone() {
			return Err(err);
		}

		state.sign_in_requests += 1;

		Ok(())
	}

	fn sign_out_redirect(&self) -> Result<(), EngineError> {
		let mut state = self.state.lock();

		if let Some(err) = state.redirect_failure.clone() {
			return Err(err);
		}

		state.sign_out_requests += 1;

		Ok(())
	}

	fn current_user(&self) -> EngineFuture<'_, Option<RawUser>> {
		let outcome = {
			let state = self.state.lock();

			match state.user_failure.clone() {
				Some(err) => Err(err),
				None => Ok(state.user.clone()),
			}
		};

		Box::pin(async move { outcome })
	}

	fn complete_sign_in_redirect(&self) -> EngineFuture<'_, ()> {
		let (outcome, user) = {
			let mut state = self.state.lock();

			state.sign_in_completions += 1;

			(Self::callback_outcome(&state.sign_in_callback), state.user.clone())
		};

		Box::pin(async move {
			outcome?;

			if let Some(user) = user {
				self.emit(EngineEvent::UserLoaded(user));
			}

			Ok(())
		})
	}

	fn complete_sign_out_redirect(&self) -> EngineFuture<'_, ()> {
		let outcome = {
			let mut state = self.state.lock();

			state.sign_out_completions += 1;

			Self::callback_outcome(&state.sign_out_callback)
		};

		Box::pin(async move { outcome })
	}
}
impl EngineFactory for MemoryEngine {
	fn attach(&self, settings: EngineSettings) -> EngineFuture<'_, Arc<dyn ProtocolEngine>> {
		let outcome = {
			let mut state = self.state.lock();

			match state.attach_failure.clone() {
				Some(err) => Err(err),
				None => {
					state.settings = Some(settings);

					Ok(Arc::new(self.clone()) as Arc<dyn ProtocolEngine>)
				},
			}
		};

		Box::pin(async move { outcome })
	}
}

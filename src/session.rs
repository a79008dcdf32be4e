//! Session manager: the credential slot, its change channel, and the readiness gate.
//!
//! [`SessionManager::new`] only wires collaborators together. [`SessionManager::start`] runs
//! the one-time setup sequence (discover the authority, attach the engine, subscribe to its
//! lifecycle events, load the current user, and finish a pending redirect callback) and then
//! resolves the readiness gate. Setup failures are logged and leave the manager signed out
//! but usable; only [`Error::NotReady`] and engine hand-off failures ever reach callers.
//!
//! While the current page is the configured redirect path, transitions still update the
//! credential slot but are not delivered to listeners, so observers never render the
//! half-settled state of a redirect round trip.

pub mod listeners;
pub mod state;

pub use listeners::*;
pub use state::SessionState;

// self
use crate::{
	_prelude::*,
	auth::Credential,
	config::SessionConfig,
	discovery::AuthorityDiscovery,
	engine::{
		EngineEvent, EngineEventKind, EngineFactory, EngineHandler, EngineSettings,
		ProtocolEngine, SubscriptionId,
	},
	navigation::Navigator,
	obs::{self, Delivery, SessionSpan, TransitionCause},
	session::state::Transition,
};

/// Source of the current instant used for expiry checks.
pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

/// Path the application returns to once a redirect callback completes.
pub const APPLICATION_ROOT: &str = "/";

/// Coordinates the redirect-based sign-in lifecycle for one application.
///
/// Cloning is cheap and every clone observes the same session.
#[derive(Clone)]
pub struct SessionManager {
	inner: Arc<SessionInner>,
}
impl SessionManager {
	/// Wires the manager to its collaborators without performing any work.
	pub fn new(
		config: SessionConfig,
		discovery: Arc<dyn AuthorityDiscovery>,
		engine_factory: Arc<dyn EngineFactory>,
		navigator: Arc<dyn Navigator>,
	) -> Self {
		Self {
			inner: Arc::new(SessionInner {
				config,
				discovery,
				engine_factory,
				navigator,
				clock: RwLock::new(Arc::new(OffsetDateTime::now_utc)),
				state: Default::default(),
				listeners: Default::default(),
				attachment: Default::default(),
				ready: AsyncOnceCell::new(),
				transitions: ReentrantMutex::new(()),
				disposed: AtomicBool::new(false),
			}),
		}
	}

	/// Replaces the clock used to decide whether a loaded user has expired.
	pub fn with_clock(self, clock: Clock) -> Self {
		*self.inner.clock.write() = clock;

		self
	}

	/// Runs the setup sequence once and resolves the readiness gate.
	///
	/// Concurrent calls wait for the running setup. If that setup is dropped before it
	/// finishes, the next call runs it again.
	pub async fn start(&self) {
		self.inner
			.ready
			.get_or_init(|| SessionSpan::new("start").instrument(self.inner.setup()))
			.await;
	}

	/// Resolves once setup has finished, whatever its outcome.
	pub async fn ready(&self) {
		self.inner.ready.wait().await;
	}

	/// Returns `true` once the readiness gate has resolved.
	pub fn is_ready(&self) -> bool {
		self.inner.ready.is_initialized()
	}

	/// Current credential, or `None` when signed out. Never waits for setup.
	pub fn access_token(&self) -> Option<Credential> {
		self.inner.state.read().credential().cloned()
	}

	/// Snapshot of the session state.
	pub fn state(&self) -> SessionState {
		self.inner.state.read().clone()
	}

	/// Returns `true` while the page is the redirect target, i.e. a callback is in flight.
	pub fn is_loading(&self) -> bool {
		self.inner.is_loading()
	}

	/// Starts the sign-in redirect.
	///
	/// Calling this before [`ready`](Self::ready) resolves, or after a setup that failed to
	/// attach the engine, is a programming error reported as [`Error::NotReady`].
	pub fn sign_in(&self) -> Result<()> {
		self.inner.engine("sign_in")?.sign_in_redirect()?;

		Ok(())
	}

	/// Starts the sign-out redirect. Same precondition as [`sign_in`](Self::sign_in).
	pub fn sign_out(&self) -> Result<()> {
		self.inner.engine("sign_out")?.sign_out_redirect()?;

		Ok(())
	}

	/// Registers a listener for credential changes and returns its handle.
	pub fn on_user_state_changed<F>(&self, listener: F) -> ListenerId
	where
		F: 'static + Fn(Option<&Credential>) + Send + Sync,
	{
		self.inner.listeners.add(Arc::new(listener))
	}

	/// Detaches a listener; returns `false` if it was not registered.
	pub fn remove_listener(&self, id: ListenerId) -> bool {
		self.inner.listeners.remove(id)
	}

	/// Unsubscribes from every engine event.
	///
	/// Idempotent and safe before or during setup; a setup still in flight will not subscribe.
	pub fn dispose(&self) {
		let mut attachment = self.inner.attachment.lock();

		self.inner.disposed.store(true, Ordering::Release);

		if let Some(attachment) = attachment.as_mut() {
			for id in attachment.subscriptions.drain(..) {
				attachment.engine.unsubscribe(id);
			}
		}
	}

	/// The configuration this manager was built with.
	pub fn config(&self) -> &SessionConfig {
		&self.inner.config
	}
}
impl Debug for SessionManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionManager")
			.field("config", &self.inner.config)
			.field("state", &*self.inner.state.read())
			.field("ready", &self.is_ready())
			.field("disposed", &self.inner.disposed.load(Ordering::Acquire))
			.field("listeners", &self.inner.listeners)
			.finish()
	}
}

struct Attachment {
	engine: Arc<dyn ProtocolEngine>,
	subscriptions: Vec<SubscriptionId>,
}

struct SessionInner {
	config: SessionConfig,
	discovery: Arc<dyn AuthorityDiscovery>,
	engine_factory: Arc<dyn EngineFactory>,
	navigator: Arc<dyn Navigator>,
	clock: RwLock<Clock>,
	state: RwLock<SessionState>,
	listeners: Listeners,
	attachment: Mutex<Option<Attachment>>,
	ready: AsyncOnceCell<()>,
	transitions: ReentrantMutex<()>,
	disposed: AtomicBool,
}
impl SessionInner {
	async fn setup(self: &Arc<Self>) {
		let engine = match self.attach().await {
			Ok(engine) => engine,
			Err(err) => {
				obs::log_setup_failure(&err);
				self.apply(Transition::signed_out(TransitionCause::SetupFailed));

				return;
			},
		};

		match engine.current_user().await {
			Ok(Some(user)) => self.apply(Transition::loaded(&user, self.now())),
			Ok(None) => self.apply(Transition::signed_out(TransitionCause::InitialUserAbsent)),
			Err(err) => {
				obs::log_setup_failure(&Error::from(err));
				self.apply(Transition::signed_out(TransitionCause::SetupFailed));
			},
		}

		if self.is_loading() {
			self.complete_redirect(engine.as_ref()).await;
		}
	}

	async fn attach(self: &Arc<Self>) -> Result<Arc<dyn ProtocolEngine>> {
		let authority = self.discovery.resolve(&self.config.authority_service_key).await?;
		let settings = EngineSettings::new(&self.config, authority, &self.navigator.origin())?;
		let engine = self.engine_factory.attach(settings).await?;
		let mut attachment = self.attachment.lock();

		// A previous setup may have been dropped after subscribing.
		if let Some(stale) = attachment.take() {
			for id in stale.subscriptions {
				stale.engine.unsubscribe(id);
			}
		}

		let subscriptions = if self.disposed.load(Ordering::Acquire) {
			Vec::new()
		} else {
			self.subscribe_all(engine.as_ref())
		};

		*attachment = Some(Attachment { engine: engine.clone(), subscriptions });

		Ok(engine)
	}

	fn subscribe_all(self: &Arc<Self>, engine: &dyn ProtocolEngine) -> Vec<SubscriptionId> {
		EngineEventKind::ALL
			.into_iter()
			.map(|kind| {
				let session = Arc::downgrade(self);
				let handler: EngineHandler = Arc::new(move |event: &EngineEvent| {
					if let Some(session) = session.upgrade() {
						session.handle_event(event);
					}
				});

				engine.subscribe(kind, handler)
			})
			.collect()
	}

	async fn complete_redirect(&self, engine: &dyn ProtocolEngine) {
		let sign_in = engine.complete_sign_in_redirect().await;
		let sign_out = engine.complete_sign_out_redirect().await;

		match (sign_in, sign_out) {
			(Err(sign_in), Err(sign_out)) => {
				obs::log_callback_failure("sign_in", &sign_in);
				obs::log_callback_failure("sign_out", &sign_out);

				return;
			},
			(Err(sign_in), Ok(())) => obs::log_callback_skipped("sign_in", &sign_in),
			(Ok(()), Err(sign_out)) => obs::log_callback_skipped("sign_out", &sign_out),
			(Ok(()), Ok(())) => {},
		}

		self.navigator.replace(APPLICATION_ROOT);
	}

	fn handle_event(&self, event: &EngineEvent) {
		self.apply(Transition::from_event(event, self.now()));
	}

	/// Writes and delivers one transition at a time, so the last delivered value always matches
	/// the slot. Re-entrant so listeners may drive the engine synchronously.
	fn apply(&self, transition: Transition) {
		let _serialized = self.transitions.lock();
		let Transition { next, cause } = transition;
		let credential = next.credential().cloned();

		*self.state.write() = next;

		let delivery = if self.is_loading() { Delivery::Suppressed } else { Delivery::Delivered };

		obs::record_transition(cause, delivery);
		obs::log_transition(cause, delivery, credential.is_some());

		if delivery == Delivery::Delivered {
			self.listeners.notify(credential.as_ref());
		}
	}

	fn engine(&self, operation: &'static str) -> Result<Arc<dyn ProtocolEngine>> {
		if !self.ready.is_initialized() {
			return Err(Error::NotReady { operation });
		}

		self.attachment
			.lock()
			.as_ref()
			.map(|attachment| attachment.engine.clone())
			.ok_or(Error::NotReady { operation })
	}

	fn is_loading(&self) -> bool {
		self.config.is_redirect_path(&self.navigator.current_path())
	}

	fn now(&self) -> OffsetDateTime {
		let clock = self.clock.read().clone();

		clock()
	}
}

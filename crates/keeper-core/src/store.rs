//! The central state container.
//!
//! The store owns the `{session, records}` tree, routes dispatched actions
//! through the two pure reducers, and notifies subscribers once per
//! committed dispatch. It performs no I/O itself: committed session changes
//! are forwarded as [`SessionEffect`]s to an attached sink, which the
//! persistence gateway drains and mirrors to durable storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;
use crate::error::{KeeperError, Result};
use crate::record;
use crate::session::{self, Profile, SessionAction};
use crate::state::AppState;

/// A committed session change that must be mirrored to durable storage.
///
/// Effects are emitted in dispatch order; the gateway must apply them to the
/// same logical key strictly in that order.
#[derive(Debug, Clone)]
pub enum SessionEffect {
    /// Persist this profile under the session key.
    Persist(Profile),
    /// Remove the session key.
    Clear,
}

/// Callback invoked after every committed dispatch.
///
/// Shared so notification can run without holding the subscriber registry
/// lock: callbacks are free to subscribe, unsubscribe, or dispatch on the
/// same store.
pub type Subscriber = Arc<dyn Fn(&AppState) + Send + Sync>;

/// Handle returned by [`Store::subscribe`]; pass it to
/// [`Store::unsubscribe`] to deregister the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

/// The central state container.
///
/// Dispatch is synchronous and runs to completion: no action's reducer logic
/// can interleave with another's. The store is cheaply shareable behind
/// `Arc`; the state tree is single-writer by construction since only
/// `dispatch` and `hydrate` mutate it.
pub struct Store {
    state: Mutex<AppState>,
    subscribers: Mutex<HashMap<u64, Subscriber>>,
    next_subscriber_id: AtomicU64,
    ready: AtomicBool,
    effects: Mutex<Option<UnboundedSender<SessionEffect>>>,
}

impl Store {
    /// Creates a store holding the initial state, not yet hydrated.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AppState::new()),
            subscribers: Mutex::new(HashMap::new()),
            next_subscriber_id: AtomicU64::new(0),
            ready: AtomicBool::new(false),
            effects: Mutex::new(None),
        }
    }

    /// Returns an owned snapshot of the current state.
    pub fn get_state(&self) -> AppState {
        self.lock_state().clone()
    }

    /// True once hydration has completed. Until then, readers see the
    /// absent-user initial session.
    pub fn ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Registers a callback invoked after every committed dispatch.
    pub fn subscribe(&self, callback: impl Fn(&AppState) + Send + Sync + 'static) -> Subscription {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        self.lock_subscribers().insert(id, Arc::new(callback));
        Subscription(id)
    }

    /// Deregisters a previously registered callback.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.lock_subscribers().remove(&subscription.0);
    }

    /// Attaches the sink that receives committed session effects.
    ///
    /// The gateway attaches this before hydrating, so no committed
    /// login/logout can slip past the write-through mirror.
    pub fn attach_effect_sink(&self, sink: UnboundedSender<SessionEffect>) {
        *self.lock_effects() = Some(sink);
    }

    /// Dispatches an action, returning the committed next state.
    ///
    /// Validation and record-domain errors leave the state untouched and are
    /// surfaced to the caller; every dispatch either commits a new state or
    /// returns a typed error before any state change.
    pub fn dispatch(&self, action: Action) -> Result<AppState> {
        validate(&action)?;

        let committed = {
            let mut state = self.lock_state();
            let next = match &action {
                Action::Login { profile } => {
                    let session = session::reduce(
                        &state.session,
                        &SessionAction::Login(profile.clone()),
                    );
                    AppState {
                        session,
                        records: state.records.clone(),
                    }
                }
                Action::Logout => {
                    let session = session::reduce(&state.session, &SessionAction::Logout);
                    AppState {
                        session,
                        records: state.records.clone(),
                    }
                }
                Action::Add { id, text } => {
                    let records = record::reduce(
                        &state.records,
                        &record::RecordAction::Add {
                            id: id.clone(),
                            text: text.clone(),
                        },
                    )?;
                    AppState {
                        session: state.session.clone(),
                        records,
                    }
                }
                Action::Update { id, text } => {
                    let records = record::reduce(
                        &state.records,
                        &record::RecordAction::Update {
                            id: id.clone(),
                            text: text.clone(),
                        },
                    )?;
                    AppState {
                        session: state.session.clone(),
                        records,
                    }
                }
                Action::Delete { id } => {
                    let records = record::reduce(
                        &state.records,
                        &record::RecordAction::Delete { id: id.clone() },
                    )?;
                    AppState {
                        session: state.session.clone(),
                        records,
                    }
                }
            };
            *state = next.clone();

            // Forward the session effect while still holding the state lock,
            // so effects enter the channel in dispatch order.
            match &action {
                Action::Login { profile } => {
                    self.send_effect(SessionEffect::Persist(profile.clone()))
                }
                Action::Logout => self.send_effect(SessionEffect::Clear),
                _ => {}
            }

            next
        };

        self.notify(&committed);
        Ok(committed)
    }

    /// Injects the durably stored profile during bootstrap.
    ///
    /// This is the only path that flips `ready`, and it succeeds exactly
    /// once per process lifetime; any later call fails with
    /// [`KeeperError::AlreadyHydrated`]. Hydration emits no session effect:
    /// the value was just read from storage, so there is nothing to mirror.
    pub fn hydrate(&self, profile: Option<Profile>) -> Result<AppState> {
        if self.ready.swap(true, Ordering::SeqCst) {
            return Err(KeeperError::AlreadyHydrated);
        }

        let committed = {
            let mut state = self.lock_state();
            let session = session::reduce(&state.session, &SessionAction::Hydrate(profile));
            let next = AppState {
                session,
                records: state.records.clone(),
            };
            *state = next.clone();
            next
        };

        tracing::debug!(
            authenticated = committed.session.is_authenticated,
            "store hydrated"
        );
        self.notify(&committed);
        Ok(committed)
    }

    fn send_effect(&self, effect: SessionEffect) {
        let sink = self.lock_effects();
        if let Some(sender) = sink.as_ref() {
            // A closed receiver means the gateway is gone; the in-memory
            // store stays authoritative either way.
            if sender.send(effect).is_err() {
                tracing::warn!("session effect dropped: gateway receiver closed");
            }
        }
    }

    fn notify(&self, state: &AppState) {
        // Snapshot the callbacks and release the registry lock before
        // invoking them, so a callback may subscribe, unsubscribe, or
        // dispatch on this store without deadlocking. A callback removed
        // during this notification still sees it; one added during it does
        // not.
        let callbacks: Vec<Subscriber> = self.lock_subscribers().values().cloned().collect();
        for callback in callbacks {
            callback(state);
        }
    }

    // A panicking callback must not brick the store, so poisoned locks are
    // recovered rather than propagated.
    fn lock_state(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, HashMap<u64, Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_effects(&self) -> MutexGuard<'_, Option<UnboundedSender<SessionEffect>>> {
        self.effects.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Boundary validation of action payloads. Reducers stay total; anything
/// rejected here never reaches them.
fn validate(action: &Action) -> Result<()> {
    match action {
        Action::Login { profile } => {
            if profile.is_null() {
                return Err(KeeperError::validation("login profile must not be null"));
            }
        }
        Action::Add { id, .. } | Action::Update { id, .. } | Action::Delete { id } => {
            if id.trim().is_empty() {
                return Err(KeeperError::validation("record id must not be empty"));
            }
        }
        Action::Logout => {}
    }
    Ok(())
}

//! Persistence gateway: bootstrap hydration and write-through mirroring.
//!
//! The gateway sits between the store and the durable key-value store. At
//! process start it reads the session key once and injects the result into
//! the store before the store is considered ready. Afterwards it drains the
//! store's effect channel and mirrors committed session changes to durable
//! storage, fire-and-forget relative to the dispatch that triggered them.
//!
//! Overlapping durable calls against the same key would race, so writes are
//! queued per logical key and processed strictly in dispatch order. After
//! the last queued write settles, durable state matches in-memory state. A
//! hung write blocks only its own key's queue, never dispatch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use keeper_core::error::{KeeperError, Result};
use keeper_core::session::Profile;
use keeper_core::storage::{DurableStore, SESSION_KEY};
use keeper_core::store::{SessionEffect, Store};

/// One queued durable operation.
enum WriteOp {
    Put(Vec<u8>),
    Delete,
    /// Resolves once every operation queued before it has settled.
    Barrier(oneshot::Sender<()>),
}

/// Per-key serialized write queues.
///
/// Each key gets its own worker task; operations on the same key settle in
/// the order they were enqueued, operations on different keys are
/// independent.
struct WriteQueue {
    durable: Arc<dyn DurableStore>,
    workers: Mutex<HashMap<String, UnboundedSender<WriteOp>>>,
}

impl WriteQueue {
    fn new(durable: Arc<dyn DurableStore>) -> Self {
        Self {
            durable,
            workers: Mutex::new(HashMap::new()),
        }
    }

    fn enqueue(&self, key: &str, op: WriteOp) {
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = workers.entry(key.to_string()).or_insert_with(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(write_worker(key.to_string(), self.durable.clone(), rx));
            tx
        });
        if sender.send(op).is_err() {
            tracing::warn!(%key, "write queue worker is gone, durable write dropped");
        }
    }

    /// Waits until every operation enqueued before this call has settled.
    async fn settle(&self) {
        let senders: Vec<UnboundedSender<WriteOp>> = {
            let workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
            workers.values().cloned().collect()
        };
        for sender in senders {
            let (tx, rx) = oneshot::channel();
            if sender.send(WriteOp::Barrier(tx)).is_ok() {
                let _ = rx.await;
            }
        }
    }
}

/// Processes one key's queue. Durable faults are report-only: logged and
/// swallowed, never propagated into store state, never retried.
async fn write_worker(
    key: String,
    durable: Arc<dyn DurableStore>,
    mut rx: UnboundedReceiver<WriteOp>,
) {
    while let Some(op) = rx.recv().await {
        match op {
            WriteOp::Put(bytes) => {
                if let Err(e) = durable.set(&key, bytes).await {
                    tracing::warn!(%key, error = %e, "durable write failed");
                }
            }
            WriteOp::Delete => {
                if let Err(e) = durable.remove(&key).await {
                    tracing::warn!(%key, error = %e, "durable remove failed");
                }
            }
            WriteOp::Barrier(done) => {
                let _ = done.send(());
            }
        }
    }
}

/// Request handled by the effect forwarder.
enum Control {
    /// Drain buffered effects, then wait for all queues to settle.
    Flush(oneshot::Sender<()>),
}

/// Orchestrates hydration and write-through for one store.
#[derive(Debug)]
pub struct PersistenceGateway {
    control: UnboundedSender<Control>,
    forwarder: JoinHandle<()>,
}

impl PersistenceGateway {
    /// Bootstraps the gateway: attaches the effect sink, hydrates the store
    /// from durable storage, and starts the write-through pipeline.
    ///
    /// The sink is attached before the durable read so that no committed
    /// login/logout can slip past the mirror while hydration is in flight.
    /// A corrupt or unreadable persisted value hydrates as logged-out; parse
    /// faults are never propagated into session state.
    ///
    /// Fails only if the store was already hydrated.
    pub async fn bootstrap(store: &Store, durable: Arc<dyn DurableStore>) -> Result<Self> {
        let (effect_tx, effect_rx) = mpsc::unbounded_channel();
        store.attach_effect_sink(effect_tx);

        let profile = read_persisted_profile(durable.as_ref()).await;
        let hydrated = store.hydrate(profile)?;
        tracing::info!(
            authenticated = hydrated.session.is_authenticated,
            "session hydrated from durable storage"
        );

        let queue = Arc::new(WriteQueue::new(durable));
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let forwarder = tokio::spawn(forward_effects(effect_rx, control_rx, queue));

        Ok(Self {
            control: control_tx,
            forwarder,
        })
    }

    /// Waits until every effect emitted by dispatches that happened before
    /// this call has settled against durable storage.
    ///
    /// Used at shutdown and by tests asserting eventual consistency.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.control.send(Control::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

impl Drop for PersistenceGateway {
    fn drop(&mut self) {
        // Writes already handed to a key worker still settle; effects that
        // never reached the queue are lost. Callers that care flush first.
        self.forwarder.abort();
    }
}

/// Reads and deserializes the persisted profile, treating every fault as
/// absent (report-only).
async fn read_persisted_profile(durable: &dyn DurableStore) -> Option<Profile> {
    let bytes = match durable.get(SESSION_KEY).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "durable read failed during hydration, treating as logged out");
            return None;
        }
    };
    match serde_json::from_slice::<Profile>(&bytes) {
        Ok(profile) if !profile.is_null() => Some(profile),
        Ok(_) => {
            tracing::warn!("persisted profile is null, treating as logged out");
            None
        }
        Err(e) => {
            let fault = KeeperError::json(e.to_string());
            tracing::warn!(error = %fault, "persisted profile is corrupt, treating as logged out");
            None
        }
    }
}

/// Drains session effects into the per-key write queue, in dispatch order.
async fn forward_effects(
    mut effects: UnboundedReceiver<SessionEffect>,
    mut control: UnboundedReceiver<Control>,
    queue: Arc<WriteQueue>,
) {
    let mut effects_open = true;
    loop {
        tokio::select! {
            effect = effects.recv(), if effects_open => match effect {
                Some(effect) => enqueue_effect(&queue, effect),
                None => effects_open = false,
            },
            request = control.recv() => match request {
                Some(Control::Flush(done)) => {
                    // Effects from dispatches that happened before the flush
                    // are already buffered; move them into the queue before
                    // waiting for settlement.
                    while let Ok(effect) = effects.try_recv() {
                        enqueue_effect(&queue, effect);
                    }
                    queue.settle().await;
                    let _ = done.send(());
                }
                None => break,
            },
            else => break,
        }
    }
}

fn enqueue_effect(queue: &WriteQueue, effect: SessionEffect) {
    match effect {
        SessionEffect::Persist(profile) => match serde_json::to_vec(&profile) {
            Ok(bytes) => queue.enqueue(SESSION_KEY, WriteOp::Put(bytes)),
            Err(e) => {
                let fault = KeeperError::json(e.to_string());
                tracing::warn!(error = %fault, "failed to serialize profile, durable write skipped");
            }
        },
        SessionEffect::Clear => queue.enqueue(SESSION_KEY, WriteOp::Delete),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::InMemoryDurableStore;
    use async_trait::async_trait;
    use keeper_core::action::Action;
    use serde_json::json;
    use std::time::Duration;

    /// Wraps an inner store, delaying `set` so that a racing `remove` would
    /// overtake it without per-key ordering.
    struct SlowWrites {
        inner: InMemoryDurableStore,
        set_delay: Duration,
    }

    #[async_trait]
    impl DurableStore for SlowWrites {
        async fn get(&self, key: &str) -> keeper_core::Result<Option<Vec<u8>>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, bytes: Vec<u8>) -> keeper_core::Result<()> {
            tokio::time::sleep(self.set_delay).await;
            self.inner.set(key, bytes).await
        }

        async fn remove(&self, key: &str) -> keeper_core::Result<()> {
            self.inner.remove(key).await
        }
    }

    /// Fails every call; hydration must still complete.
    struct BrokenStore;

    #[async_trait]
    impl DurableStore for BrokenStore {
        async fn get(&self, _key: &str) -> keeper_core::Result<Option<Vec<u8>>> {
            Err(KeeperError::persistence("read failed"))
        }

        async fn set(&self, _key: &str, _bytes: Vec<u8>) -> keeper_core::Result<()> {
            Err(KeeperError::persistence("write failed"))
        }

        async fn remove(&self, _key: &str) -> keeper_core::Result<()> {
            Err(KeeperError::persistence("remove failed"))
        }
    }

    #[tokio::test]
    async fn test_bootstrap_with_empty_storage() {
        let store = Store::new();
        let durable = Arc::new(InMemoryDurableStore::new());
        let _gateway = PersistenceGateway::bootstrap(&store, durable).await.unwrap();

        assert!(store.ready());
        let session = store.get_state().session;
        assert!(session.user.is_none());
        assert!(!session.is_authenticated);
    }

    #[tokio::test]
    async fn test_bootstrap_with_persisted_profile() {
        let durable = Arc::new(InMemoryDurableStore::new());
        durable
            .set(SESSION_KEY, serde_json::to_vec(&json!({"name": "mai"})).unwrap())
            .await
            .unwrap();

        let store = Store::new();
        let _gateway = PersistenceGateway::bootstrap(&store, durable).await.unwrap();

        let session = store.get_state().session;
        assert!(session.is_authenticated);
        assert_eq!(session.user, Some(json!({"name": "mai"})));
    }

    #[tokio::test]
    async fn test_bootstrap_with_corrupt_bytes_hydrates_logged_out() {
        let durable = Arc::new(InMemoryDurableStore::new());
        durable
            .set(SESSION_KEY, b"not valid json {".to_vec())
            .await
            .unwrap();

        let store = Store::new();
        let _gateway = PersistenceGateway::bootstrap(&store, durable).await.unwrap();

        assert!(store.ready());
        assert!(!store.get_state().session.is_authenticated);
    }

    #[tokio::test]
    async fn test_bootstrap_with_failing_storage_is_not_fatal() {
        let store = Store::new();
        let _gateway = PersistenceGateway::bootstrap(&store, Arc::new(BrokenStore))
            .await
            .unwrap();

        assert!(store.ready());
        assert!(!store.get_state().session.is_authenticated);
    }

    #[tokio::test]
    async fn test_bootstrap_twice_is_rejected() {
        let store = Store::new();
        let durable = Arc::new(InMemoryDurableStore::new());
        let _gateway = PersistenceGateway::bootstrap(&store, durable.clone())
            .await
            .unwrap();
        let err = PersistenceGateway::bootstrap(&store, durable)
            .await
            .unwrap_err();
        assert!(matches!(err, KeeperError::AlreadyHydrated));
    }

    #[tokio::test]
    async fn test_login_is_mirrored_to_durable_storage() {
        let store = Store::new();
        let durable = Arc::new(InMemoryDurableStore::new());
        let gateway = PersistenceGateway::bootstrap(&store, durable.clone())
            .await
            .unwrap();

        store
            .dispatch(Action::Login {
                profile: json!({"name": "mai"}),
            })
            .unwrap();
        gateway.flush().await;

        let bytes = durable.get(SESSION_KEY).await.unwrap().unwrap();
        let persisted: Profile = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(persisted, json!({"name": "mai"}));
    }

    #[tokio::test]
    async fn test_logout_removes_durable_entry() {
        let store = Store::new();
        let durable = Arc::new(InMemoryDurableStore::new());
        let gateway = PersistenceGateway::bootstrap(&store, durable.clone())
            .await
            .unwrap();

        store
            .dispatch(Action::Login {
                profile: json!("u"),
            })
            .unwrap();
        store.dispatch(Action::Logout).unwrap();
        gateway.flush().await;

        assert!(durable.get(SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_login_logout_race_settles_to_final_state() {
        // The slow `set` would lose to the immediate `remove` without the
        // per-key queue; durable state must match final in-memory state.
        let durable = Arc::new(SlowWrites {
            inner: InMemoryDurableStore::new(),
            set_delay: Duration::from_millis(50),
        });
        let store = Store::new();
        let gateway = PersistenceGateway::bootstrap(&store, durable.clone())
            .await
            .unwrap();

        store
            .dispatch(Action::Login {
                profile: json!("a"),
            })
            .unwrap();
        store.dispatch(Action::Logout).unwrap();
        gateway.flush().await;

        assert!(durable.get(SESSION_KEY).await.unwrap().is_none());
        assert!(!store.get_state().session.is_authenticated);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_relogin_after_logout_persists_latest_profile() {
        let durable = Arc::new(SlowWrites {
            inner: InMemoryDurableStore::new(),
            set_delay: Duration::from_millis(20),
        });
        let store = Store::new();
        let gateway = PersistenceGateway::bootstrap(&store, durable.clone())
            .await
            .unwrap();

        store
            .dispatch(Action::Login {
                profile: json!("first"),
            })
            .unwrap();
        store.dispatch(Action::Logout).unwrap();
        store
            .dispatch(Action::Login {
                profile: json!("second"),
            })
            .unwrap();
        gateway.flush().await;

        let bytes = durable.get(SESSION_KEY).await.unwrap().unwrap();
        let persisted: Profile = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(persisted, json!("second"));
    }

    #[tokio::test]
    async fn test_record_actions_touch_no_durable_state() {
        let store = Store::new();
        let durable = Arc::new(InMemoryDurableStore::new());
        let gateway = PersistenceGateway::bootstrap(&store, durable.clone())
            .await
            .unwrap();

        store
            .dispatch(Action::Add {
                id: "1".to_string(),
                text: "buy milk".to_string(),
            })
            .unwrap();
        gateway.flush().await;

        assert!(durable.is_empty().await);
    }
}

//! Rendezvous between a waiting login flow and the provider's popup window.

use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::domain::entities::{BearerToken, Identity};
use crate::domain::repositories::ProviderError;

const POPUP_ID_LEN: usize = 32;
const POPUP_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Opaque identifier of one popup sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PopupId(String);

impl PopupId {
    fn generate() -> Self {
        let mut rng = rand::rng();
        let id = (0..POPUP_ID_LEN)
            .map(|_| {
                let idx = rng.random_range(0..POPUP_ID_CHARSET.len());
                POPUP_ID_CHARSET[idx] as char
            })
            .collect();
        Self(id)
    }

    /// Parses an id received from the client.
    ///
    /// Returns `None` unless the value has the generated shape.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = raw.len() == POPUP_ID_LEN && raw.bytes().all(|b| b.is_ascii_alphanumeric());
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PopupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the provider hands back when the popup completes.
#[derive(Debug, Clone)]
pub struct PopupResult {
    pub identity: Identity,
    pub token: BearerToken,
}

type PopupOutcome = Result<PopupResult, ProviderError>;

struct PendingPopup {
    sender: Option<oneshot::Sender<PopupOutcome>>,
    receiver: Option<oneshot::Receiver<PopupOutcome>>,
    opened_at: Instant,
}

impl PendingPopup {
    fn is_waited_on(&self) -> bool {
        self.receiver.is_none()
    }
}

/// Removes a popup once its waiter finishes or is dropped mid-wait, e.g.
/// when the client disconnects during the login request.
struct WaitClaim<'a> {
    broker: &'a PopupBroker,
    id: &'a PopupId,
}

impl Drop for WaitClaim<'_> {
    fn drop(&mut self) {
        self.broker.lock().remove(self.id);
    }
}

/// Registry of popups between `open` and completion.
///
/// A popup can be completed before or after the login flow starts waiting on
/// it; the outcome is buffered either way. Nothing here bounds how long a
/// waiting flow stays suspended.
pub struct PopupBroker {
    pending: Mutex<HashMap<PopupId, PendingPopup>>,
    ttl: Duration,
}

impl PopupBroker {
    /// Creates a broker. Popups older than `ttl` that nobody waits on are
    /// discarded the next time a popup is opened.
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PopupId, PendingPopup>> {
        match self.pending.lock() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Registers a new popup and returns its id.
    pub fn open(&self) -> PopupId {
        let mut pending = self.lock();

        let before = pending.len();
        let ttl = self.ttl;
        pending.retain(|_, popup| popup.is_waited_on() || popup.opened_at.elapsed() < ttl);
        let pruned = before - pending.len();
        if pruned > 0 {
            debug!(pruned, "Discarded abandoned popups");
        }

        let id = PopupId::generate();
        let (sender, receiver) = oneshot::channel();
        pending.insert(
            id.clone(),
            PendingPopup {
                sender: Some(sender),
                receiver: Some(receiver),
                opened_at: Instant::now(),
            },
        );

        debug!(popup = %id, "Popup opened");
        id
    }

    /// Suspends until the popup is resolved or rejected.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::PopupExpired`] if the id is unknown or already waited on
    /// - [`ProviderError::PopupClosedByUser`] if the popup is discarded unresolved
    /// - the provider's error if the popup was rejected
    pub async fn wait(&self, id: &PopupId) -> Result<PopupResult, ProviderError> {
        let receiver = {
            let mut pending = self.lock();
            let Some(popup) = pending.get_mut(id) else {
                return Err(ProviderError::PopupExpired);
            };
            let Some(receiver) = popup.receiver.take() else {
                return Err(ProviderError::PopupExpired);
            };
            if popup.sender.is_none() {
                pending.remove(id);
            }
            receiver
        };
        let _claim = WaitClaim { broker: self, id };

        match receiver.await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProviderError::PopupClosedByUser),
        }
    }

    /// Completes the popup with the provider's identity and token.
    ///
    /// Returns `false` if the popup is unknown or already completed.
    pub fn resolve(&self, id: &PopupId, result: PopupResult) -> bool {
        info!(popup = %id, uid = %result.identity.uid(), "Popup sign-in completed");
        self.complete(id, Ok(result))
    }

    /// Fails the popup with a provider error.
    ///
    /// Returns `false` if the popup is unknown or already completed.
    pub fn reject(&self, id: &PopupId, error: ProviderError) -> bool {
        info!(popup = %id, error = %error, "Popup sign-in rejected");
        self.complete(id, Err(error))
    }

    fn complete(&self, id: &PopupId, outcome: PopupOutcome) -> bool {
        let mut pending = self.lock();
        let Some(popup) = pending.get_mut(id) else {
            return false;
        };
        let Some(sender) = popup.sender.take() else {
            return false;
        };
        if popup.is_waited_on() {
            pending.remove(id);
        }

        // A dropped receiver means the waiting flow is gone; nothing to deliver.
        let _ = sender.send(outcome);
        true
    }

    /// Number of popups not yet fully consumed.
    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }
}

//! Login flow: popup sign-in, session marker, profile record, navigation.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::domain::entities::{Identity, LocalSessionMarker, NewProfile, ProfileRecord, Route};
use crate::domain::repositories::{
    IdentityProvider, LocalStorage, Navigator, ProfileRepository, ProviderError, RepositoryError,
    StorageError,
};

/// Progress of a login attempt.
///
/// Transitions only move forward: `Idle → AwaitingProvider → Persisting →
/// Navigated`, or from an in-flight state to `Failed`. A new
/// [`LoginService::initiate`] call starts over from `AwaitingProvider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    AwaitingProvider,
    Persisting,
    Navigated,
    Failed,
}

impl LoginState {
    pub fn is_in_progress(self) -> bool {
        matches!(self, Self::AwaitingProvider | Self::Persisting)
    }
}

/// Why a login attempt stopped.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("identity provider: {0}")]
    Provider(#[from] ProviderError),
    #[error("local storage: {0}")]
    LocalStorage(#[from] StorageError),
    #[error("profile write: {0}")]
    RemoteWrite(#[from] RepositoryError),
    #[error("a login is already in progress")]
    AlreadyInProgress,
}

/// Coarse failure category, suitable for metrics labels and UI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginErrorKind {
    ProviderInteraction,
    LocalStorage,
    RemoteWrite,
    AlreadyInProgress,
}

impl LoginErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProviderInteraction => "provider_interaction",
            Self::LocalStorage => "local_storage",
            Self::RemoteWrite => "remote_write",
            Self::AlreadyInProgress => "already_in_progress",
        }
    }
}

impl fmt::Display for LoginErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LoginError {
    pub fn kind(&self) -> LoginErrorKind {
        match self {
            Self::Provider(_) => LoginErrorKind::ProviderInteraction,
            Self::LocalStorage(_) => LoginErrorKind::LocalStorage,
            Self::RemoteWrite(_) => LoginErrorKind::RemoteWrite,
            Self::AlreadyInProgress => LoginErrorKind::AlreadyInProgress,
        }
    }
}

/// What callers show the user when a login fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stay on the login screen with no indication.
    #[default]
    Silent,
    /// Render a short message describing the failure category.
    Surface,
}

impl FailurePolicy {
    /// User-facing message for `err`, or `None` when failures stay silent.
    pub fn feedback(self, err: &LoginError) -> Option<&'static str> {
        match self {
            Self::Silent => None,
            Self::Surface => Some(match err.kind() {
                LoginErrorKind::ProviderInteraction => {
                    "Sign-in was cancelled or could not be completed."
                }
                LoginErrorKind::LocalStorage => "Your browser refused to store the session.",
                LoginErrorKind::RemoteWrite => "We could not save your profile. Please try again.",
                LoginErrorKind::AlreadyInProgress => "A sign-in is already in progress.",
            }),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "surface" => Ok(Self::Surface),
            other => Err(format!("unknown failure policy '{}'", other)),
        }
    }
}

/// Whether overlapping [`LoginService::initiate`] calls are allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConcurrencyPolicy {
    /// No in-flight guard. Overlapping calls race; the last write wins.
    #[default]
    AllowConcurrent,
    /// Calls made while another is in flight fail with
    /// [`LoginError::AlreadyInProgress`] without side effects.
    RejectWhileInProgress,
}

/// Orchestrates a single login attempt against injected collaborators.
///
/// Every external service is passed in at construction, so tests substitute
/// mocks or in-memory adapters for any of them.
///
/// # Flow
///
/// 1. Popup sign-in via [`IdentityProvider::sign_in_with_popup`]
/// 2. Fresh bearer token via [`IdentityProvider::fresh_token`]
/// 3. [`LocalSessionMarker`] written to [`LocalStorage`] (`user`, then `token`)
/// 4. [`ProfileRecord`] overwritten in [`ProfileRepository`]
/// 5. [`Navigator::navigate`] to [`Route::root`]
///
/// The first failing step ends the attempt: nothing after it runs and
/// navigation does not happen. The local and remote writes are independent;
/// a remote failure leaves the local marker in place.
pub struct LoginService<P: ?Sized, S: ?Sized, R: ?Sized, N: ?Sized> {
    provider: Arc<P>,
    storage: Arc<S>,
    profiles: Arc<R>,
    navigator: Arc<N>,
    failure_policy: FailurePolicy,
    concurrency_policy: ConcurrencyPolicy,
    state: watch::Sender<LoginState>,
}

impl<P, S, R, N> LoginService<P, S, R, N>
where
    P: IdentityProvider + ?Sized,
    S: LocalStorage + ?Sized,
    R: ProfileRepository + ?Sized,
    N: Navigator + ?Sized,
{
    /// Creates a login flow in the `Idle` state with default policies.
    pub fn new(provider: Arc<P>, storage: Arc<S>, profiles: Arc<R>, navigator: Arc<N>) -> Self {
        Self {
            provider,
            storage,
            profiles,
            navigator,
            failure_policy: FailurePolicy::default(),
            concurrency_policy: ConcurrencyPolicy::default(),
            state: watch::Sender::new(LoginState::Idle),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_concurrency_policy(mut self, policy: ConcurrencyPolicy) -> Self {
        self.concurrency_policy = policy;
        self
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn state(&self) -> LoginState {
        *self.state.borrow()
    }

    /// Subscribes to state transitions, e.g. to drive a loading indicator.
    pub fn subscribe(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    /// Runs one login attempt.
    ///
    /// Failures never escape as panics or partial navigation: each one is
    /// logged once with the `login failed:` prefix and returned.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError`] naming the step that failed.
    pub async fn initiate(&self) -> Result<Identity, LoginError> {
        let result = self.run().await;

        match &result {
            Ok(identity) => {
                metrics::counter!("login_attempts_total", "outcome" => "success").increment(1);
                info!(uid = %identity.uid(), "Login completed");
            }
            Err(err) => {
                if !matches!(err, LoginError::AlreadyInProgress) {
                    self.state.send_replace(LoginState::Failed);
                }
                metrics::counter!("login_attempts_total", "outcome" => err.kind().as_str())
                    .increment(1);
                error!(kind = %err.kind(), "login failed: {}", err);
            }
        }

        result
    }

    async fn run(&self) -> Result<Identity, LoginError> {
        self.begin()?;

        let identity = self.provider.sign_in_with_popup().await?;
        debug!(uid = %identity.uid(), "Popup sign-in resolved");

        let token = self.provider.fresh_token(&identity).await?;

        self.state.send_replace(LoginState::Persisting);

        let marker = LocalSessionMarker::new(identity.clone(), token);
        self.persist_local(&marker)?;

        let record = self.persist_remote(&identity).await?;
        debug!(uid = %record.uid, login_at = %record.login_at, "Profile record written");

        let home = Route::root();
        self.navigator.navigate(&home);
        self.state.send_replace(LoginState::Navigated);

        Ok(identity)
    }

    /// Moves to `AwaitingProvider`, honoring the concurrency policy.
    fn begin(&self) -> Result<(), LoginError> {
        let reject = self.concurrency_policy == ConcurrencyPolicy::RejectWhileInProgress;
        let mut rejected = false;

        self.state.send_if_modified(|state| {
            if reject && state.is_in_progress() {
                rejected = true;
                return false;
            }
            *state = LoginState::AwaitingProvider;
            true
        });

        if rejected {
            Err(LoginError::AlreadyInProgress)
        } else {
            Ok(())
        }
    }

    /// Writes the session marker entries in order.
    fn persist_local(&self, marker: &LocalSessionMarker) -> Result<(), StorageError> {
        for (key, value) in marker.entries()? {
            self.storage.set_item(key, &value)?;
        }
        Ok(())
    }

    async fn persist_remote(&self, identity: &Identity) -> Result<ProfileRecord, RepositoryError> {
        self.profiles
            .overwrite(identity.uid(), &NewProfile::from(identity))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{BearerToken, UserId};
    use crate::domain::repositories::{
        MockIdentityProvider, MockLocalStorage, MockNavigator, MockProfileRepository,
    };
    use crate::infrastructure::navigation::ResponseNavigator;
    use crate::infrastructure::persistence::InMemoryProfileRepository;
    use crate::infrastructure::storage::MemoryLocalStorage;
    use async_trait::async_trait;
    use chrono::Utc;
    use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, SharedString, Unit};
    use mockall::Sequence;
    use std::collections::HashMap;
    use std::io;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::oneshot;

    fn ada() -> Identity {
        Identity::new(
            UserId::new("u1").unwrap(),
            Some("Ada".to_string()),
            Some("ada@x.com".to_string()),
        )
    }

    fn token() -> BearerToken {
        BearerToken::new("tok123").unwrap()
    }

    fn stored(uid: &UserId, profile: &NewProfile) -> ProfileRecord {
        ProfileRecord {
            uid: uid.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            login_at: Utc::now(),
        }
    }

    fn signed_in_provider() -> MockIdentityProvider {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in_with_popup()
            .times(1)
            .returning(|| Ok(ada()));
        provider
            .expect_fresh_token()
            .times(1)
            .returning(|_| Ok(token()));
        provider
    }

    /// Log sink shared between a test and its tracing subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn lines_containing(&self, needle: &str) -> Vec<String> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .filter(|line| line.contains(needle))
                .map(str::to_string)
                .collect()
        }
    }

    fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    #[tokio::test]
    async fn test_initiate_success_writes_in_order_then_navigates() {
        let mut seq = Sequence::new();
        let mut provider = MockIdentityProvider::new();
        let mut storage = MockLocalStorage::new();
        let mut profiles = MockProfileRepository::new();
        let mut navigator = MockNavigator::new();

        provider
            .expect_sign_in_with_popup()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(ada()));
        provider
            .expect_fresh_token()
            .withf(|identity| identity.uid().as_str() == "u1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(token()));
        storage
            .expect_set_item()
            .withf(|key, value| {
                key == "user"
                    && serde_json::from_str::<serde_json::Value>(value)
                        .is_ok_and(|json| json["id"] == "u1" && json["name"] == "Ada")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        storage
            .expect_set_item()
            .withf(|key, value| key == "token" && value == "tok123")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        profiles
            .expect_overwrite()
            .withf(|uid, profile| {
                uid.as_str() == "u1"
                    && profile.name.as_deref() == Some("Ada")
                    && profile.email.as_deref() == Some("ada@x.com")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|uid, profile| Ok(stored(uid, profile)));
        navigator
            .expect_navigate()
            .withf(|route| *route == Route::root())
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let service = LoginService::new(
            Arc::new(provider),
            Arc::new(storage),
            Arc::new(profiles),
            Arc::new(navigator),
        );

        let result = service.initiate().await;

        assert_eq!(result.unwrap(), ada());
        assert_eq!(service.state(), LoginState::Navigated);
    }

    #[tokio::test]
    async fn test_concrete_scenario_end_state() {
        let storage = Arc::new(MemoryLocalStorage::new());
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let navigator = Arc::new(ResponseNavigator::new());

        let service = LoginService::new(
            Arc::new(signed_in_provider()),
            storage.clone(),
            profiles.clone(),
            navigator.clone(),
        );

        service.initiate().await.unwrap();

        let user: serde_json::Value =
            serde_json::from_str(&storage.get_item("user").unwrap()).unwrap();
        assert_eq!(user["id"], "u1");
        assert_eq!(user["name"], "Ada");
        assert_eq!(user["email"], "ada@x.com");
        assert_eq!(storage.get_item("token").as_deref(), Some("tok123"));

        let record = profiles
            .find(&UserId::new("u1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.name.as_deref(), Some("Ada"));
        assert_eq!(record.email.as_deref(), Some("ada@x.com"));

        assert_eq!(navigator.destination(), Some(Route::root()));
    }

    #[tokio::test]
    async fn test_popup_closed_by_user_stops_flow_with_one_log_entry() {
        let (logs, _guard) = capture_logs();

        let mut provider = MockIdentityProvider::new();
        let mut storage = MockLocalStorage::new();
        let mut profiles = MockProfileRepository::new();
        let mut navigator = MockNavigator::new();

        provider
            .expect_sign_in_with_popup()
            .times(1)
            .returning(|| Err(ProviderError::PopupClosedByUser));
        provider.expect_fresh_token().never();
        storage.expect_set_item().never();
        profiles.expect_overwrite().never();
        navigator.expect_navigate().never();

        let service = LoginService::new(
            Arc::new(provider),
            Arc::new(storage),
            Arc::new(profiles),
            Arc::new(navigator),
        );

        let err = service.initiate().await.unwrap_err();

        assert!(matches!(
            err,
            LoginError::Provider(ProviderError::PopupClosedByUser)
        ));
        assert_eq!(err.kind(), LoginErrorKind::ProviderInteraction);
        assert_eq!(service.state(), LoginState::Failed);

        let entries = logs.lines_containing("login failed:");
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains("popup-closed-by-user"));
    }

    #[tokio::test]
    async fn test_token_failure_writes_nothing() {
        let mut provider = MockIdentityProvider::new();
        let mut storage = MockLocalStorage::new();
        let mut profiles = MockProfileRepository::new();
        let mut navigator = MockNavigator::new();

        provider
            .expect_sign_in_with_popup()
            .times(1)
            .returning(|| Ok(ada()));
        provider
            .expect_fresh_token()
            .times(1)
            .returning(|_| Err(ProviderError::Network("offline".to_string())));
        storage.expect_set_item().never();
        profiles.expect_overwrite().never();
        navigator.expect_navigate().never();

        let service = LoginService::new(
            Arc::new(provider),
            Arc::new(storage),
            Arc::new(profiles),
            Arc::new(navigator),
        );

        let err = service.initiate().await.unwrap_err();

        assert_eq!(err.kind(), LoginErrorKind::ProviderInteraction);
        assert_eq!(service.state(), LoginState::Failed);
    }

    /// Counts `login_attempts_total` increments per `outcome` label.
    #[derive(Default)]
    struct OutcomeRecorder(Mutex<HashMap<String, Arc<AtomicU64>>>);

    impl OutcomeRecorder {
        fn count(&self, outcome: &str) -> u64 {
            self.0
                .lock()
                .unwrap()
                .get(outcome)
                .map_or(0, |counter| counter.load(Ordering::SeqCst))
        }
    }

    impl metrics::Recorder for OutcomeRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            if key.name() != "login_attempts_total" {
                return Counter::noop();
            }
            let outcome = key
                .labels()
                .find(|label| label.key() == "outcome")
                .map(|label| label.value().to_string())
                .unwrap_or_default();
            let counter = self.0.lock().unwrap().entry(outcome).or_default().clone();
            Counter::from_arc(counter)
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[tokio::test]
    async fn test_attempts_counted_by_outcome() {
        let recorder = OutcomeRecorder::default();
        let _guard = metrics::set_default_local_recorder(&recorder);

        let succeeding = LoginService::new(
            Arc::new(signed_in_provider()),
            Arc::new(MemoryLocalStorage::new()),
            Arc::new(InMemoryProfileRepository::new()),
            Arc::new(ResponseNavigator::new()),
        );
        succeeding.initiate().await.unwrap();

        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in_with_popup()
            .times(1)
            .returning(|| Err(ProviderError::PopupBlocked));
        let failing = LoginService::new(
            Arc::new(provider),
            Arc::new(MemoryLocalStorage::new()),
            Arc::new(InMemoryProfileRepository::new()),
            Arc::new(ResponseNavigator::new()),
        );
        failing.initiate().await.unwrap_err();

        assert_eq!(recorder.count("success"), 1);
        assert_eq!(recorder.count("provider_interaction"), 1);
        assert_eq!(recorder.count("remote_write"), 0);
    }

    /// Runs the flow with the local and remote writes forced to succeed or
    /// fail, returning the result and whether navigation happened.
    async fn run_with_outcomes(
        local_ok: bool,
        remote_ok: bool,
    ) -> (Result<Identity, LoginError>, bool) {
        let mut storage = MockLocalStorage::new();
        let mut profiles = MockProfileRepository::new();
        let navigator = Arc::new(ResponseNavigator::new());

        if local_ok {
            storage.expect_set_item().times(2).returning(|_, _| Ok(()));
        } else {
            storage.expect_set_item().times(1).returning(|key, value| {
                Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size: value.len(),
                    limit: 0,
                })
            });
        }

        // The remote write is only attempted after the local marker is in place.
        let remote_calls: usize = if local_ok { 1 } else { 0 };
        if remote_ok {
            profiles
                .expect_overwrite()
                .times(remote_calls)
                .returning(|uid, profile| Ok(stored(uid, profile)));
        } else {
            profiles
                .expect_overwrite()
                .times(remote_calls)
                .returning(|_, _| Err(RepositoryError::Unavailable("offline".to_string())));
        }

        let service = LoginService::new(
            Arc::new(signed_in_provider()),
            Arc::new(storage),
            Arc::new(profiles),
            navigator.clone(),
        );

        let result = service.initiate().await;
        (result, navigator.destination().is_some())
    }

    #[tokio::test]
    async fn test_local_ok_remote_ok_navigates() {
        let (result, navigated) = run_with_outcomes(true, true).await;
        assert!(result.is_ok());
        assert!(navigated);
    }

    #[tokio::test]
    async fn test_local_ok_remote_failed_keeps_marker_without_navigation() {
        let (result, navigated) = run_with_outcomes(true, false).await;
        assert_eq!(result.unwrap_err().kind(), LoginErrorKind::RemoteWrite);
        assert!(!navigated);
    }

    #[tokio::test]
    async fn test_local_failed_remote_ok_skips_remote_write() {
        let (result, navigated) = run_with_outcomes(false, true).await;
        assert_eq!(result.unwrap_err().kind(), LoginErrorKind::LocalStorage);
        assert!(!navigated);
    }

    #[tokio::test]
    async fn test_local_failed_remote_failed_skips_remote_write() {
        let (result, navigated) = run_with_outcomes(false, false).await;
        assert_eq!(result.unwrap_err().kind(), LoginErrorKind::LocalStorage);
        assert!(!navigated);
    }

    #[tokio::test]
    async fn test_remote_failure_leaves_partial_state() {
        let storage = Arc::new(MemoryLocalStorage::new());
        let navigator = Arc::new(ResponseNavigator::new());
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_overwrite()
            .times(1)
            .returning(|_, _| Err(RepositoryError::PermissionDenied("users/u1".to_string())));

        let service = LoginService::new(
            Arc::new(signed_in_provider()),
            storage.clone(),
            Arc::new(profiles),
            navigator.clone(),
        );

        let err = service.initiate().await.unwrap_err();

        assert!(matches!(err, LoginError::RemoteWrite(_)));
        assert!(storage.get_item("user").is_some());
        assert_eq!(storage.get_item("token").as_deref(), Some("tok123"));
        assert!(navigator.destination().is_none());
        assert_eq!(service.state(), LoginState::Failed);
    }

    #[tokio::test]
    async fn test_token_key_quota_leaves_user_key_only() {
        let long_token = "t".repeat(64);
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in_with_popup()
            .times(1)
            .returning(|| Ok(ada()));
        let token_value = long_token.clone();
        provider
            .expect_fresh_token()
            .times(1)
            .returning(move |_| Ok(BearerToken::new(token_value.clone()).unwrap()));

        let user_len = serde_json::to_string(&ada()).unwrap().len();
        let storage = Arc::new(MemoryLocalStorage::with_quota(
            "user".len() + user_len + "token".len() + 10,
        ));
        let mut profiles = MockProfileRepository::new();
        profiles.expect_overwrite().never();

        let service = LoginService::new(
            Arc::new(provider),
            storage.clone(),
            Arc::new(profiles),
            Arc::new(ResponseNavigator::new()),
        );

        let err = service.initiate().await.unwrap_err();

        assert!(matches!(
            err,
            LoginError::LocalStorage(StorageError::QuotaExceeded { .. })
        ));
        assert!(storage.get_item("user").is_some());
        assert!(storage.get_item("token").is_none());
    }

    #[tokio::test]
    async fn test_repeated_login_overwrites_profile() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in_with_popup()
            .times(2)
            .returning(|| Ok(ada()));
        provider
            .expect_fresh_token()
            .times(2)
            .returning(|_| Ok(token()));

        let profiles = Arc::new(InMemoryProfileRepository::new());
        let service = LoginService::new(
            Arc::new(provider),
            Arc::new(MemoryLocalStorage::new()),
            profiles.clone(),
            Arc::new(ResponseNavigator::new()),
        );

        service.initiate().await.unwrap();
        let uid = UserId::new("u1").unwrap();
        let first = profiles.find(&uid).await.unwrap().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        service.initiate().await.unwrap();
        let second = profiles.find(&uid).await.unwrap().unwrap();

        assert!(second.login_at > first.login_at);
        assert_eq!(profiles.list_recent(10).await.unwrap().len(), 1);
    }

    /// Provider whose first sign-in waits until the test releases it.
    struct GatedProvider {
        gate: Mutex<Option<oneshot::Receiver<()>>>,
    }

    impl GatedProvider {
        fn new() -> (Self, oneshot::Sender<()>) {
            let (tx, rx) = oneshot::channel();
            (
                Self {
                    gate: Mutex::new(Some(rx)),
                },
                tx,
            )
        }
    }

    #[async_trait]
    impl IdentityProvider for GatedProvider {
        async fn sign_in_with_popup(&self) -> Result<Identity, ProviderError> {
            let gate = self.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                gate.await.map_err(|_| ProviderError::PopupClosedByUser)?;
            }
            Ok(ada())
        }

        async fn fresh_token(&self, _identity: &Identity) -> Result<BearerToken, ProviderError> {
            Ok(token())
        }
    }

    #[tokio::test]
    async fn test_reject_while_in_progress() {
        let (provider, release) = GatedProvider::new();
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let service = Arc::new(
            LoginService::new(
                Arc::new(provider),
                Arc::new(MemoryLocalStorage::new()),
                profiles.clone(),
                Arc::new(ResponseNavigator::new()),
            )
            .with_concurrency_policy(ConcurrencyPolicy::RejectWhileInProgress),
        );

        let first = tokio::spawn({
            let service = service.clone();
            async move { service.initiate().await }
        });

        let mut states = service.subscribe();
        states
            .wait_for(|state| *state == LoginState::AwaitingProvider)
            .await
            .unwrap();

        let second = service.initiate().await;
        assert!(matches!(second, Err(LoginError::AlreadyInProgress)));
        assert_eq!(service.state(), LoginState::AwaitingProvider);
        assert!(profiles.list_recent(10).await.unwrap().is_empty());

        release.send(()).unwrap();
        assert!(first.await.unwrap().is_ok());
        assert_eq!(service.state(), LoginState::Navigated);
    }

    #[tokio::test]
    async fn test_allow_concurrent_lets_overlapping_calls_race() {
        let (provider, release) = GatedProvider::new();
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let service = Arc::new(LoginService::new(
            Arc::new(provider),
            Arc::new(MemoryLocalStorage::new()),
            profiles.clone(),
            Arc::new(ResponseNavigator::new()),
        ));

        let first = tokio::spawn({
            let service = service.clone();
            async move { service.initiate().await }
        });

        let mut states = service.subscribe();
        states
            .wait_for(|state| *state == LoginState::AwaitingProvider)
            .await
            .unwrap();

        assert!(service.initiate().await.is_ok());

        release.send(()).unwrap();
        assert!(first.await.unwrap().is_ok());
        assert_eq!(profiles.list_recent(10).await.unwrap().len(), 1);
    }

    #[test]
    fn test_failure_policy_feedback() {
        let err = LoginError::Provider(ProviderError::PopupClosedByUser);

        assert_eq!(FailurePolicy::Silent.feedback(&err), None);
        assert!(FailurePolicy::Surface.feedback(&err).is_some());
    }

    #[test]
    fn test_failure_policy_from_str() {
        assert_eq!("silent".parse::<FailurePolicy>(), Ok(FailurePolicy::Silent));
        assert_eq!(" Surface ".parse::<FailurePolicy>(), Ok(FailurePolicy::Surface));
        assert!("loud".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn test_new_service_is_idle() {
        let service = LoginService::new(
            Arc::new(MockIdentityProvider::new()),
            Arc::new(MockLocalStorage::new()),
            Arc::new(MockProfileRepository::new()),
            Arc::new(MockNavigator::new()),
        );

        assert_eq!(service.state(), LoginState::Idle);
        assert_eq!(service.failure_policy(), FailurePolicy::Silent);
    }
}

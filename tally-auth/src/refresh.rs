use crate::error::RefreshError;
use crate::session::Session;
use secrecy::{ExposeSecret, SecretString};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

type Outcome = Result<SecretString, RefreshError>;
type Waiter = oneshot::Sender<Outcome>;

/// Exchanges the ambient refresh credential for a new bearer token
pub trait Reissuer: Send + Sync {
    fn reissue(&self) -> impl Future<Output = Outcome> + Send;
}

/// Classifies transport errors that mean "the bearer token was not accepted"
pub trait Unauthorized {
    fn is_unauthorized(&self) -> bool;
}

enum Cycle {
    Idle,
    /// One reissue call is in flight; everyone else waits here in arrival order.
    RefreshPending { waiters: VecDeque<Waiter> },
}

/// Serializes token reissue so that at most one call is in flight.
///
/// The first caller to see a rejected token while the coordinator is idle
/// becomes the leader and performs the reissue. Callers arriving while it is
/// pending are queued and receive the leader's outcome, first in first out.
/// The queue is drained and the state returns to idle under one lock, so
/// there is never a pending waiter outside a refresh window.
pub struct RefreshCoordinator<R> {
    reissuer: R,
    session: Arc<Session>,
    cycle: Mutex<Cycle>,
    reissues: AtomicU64,
}

impl<R: Reissuer> RefreshCoordinator<R> {
    pub fn new(session: Arc<Session>, reissuer: R) -> Self {
        Self {
            reissuer,
            session,
            cycle: Mutex::new(Cycle::Idle),
            reissues: AtomicU64::new(0),
        }
    }

    pub fn reissuer(&self) -> &R {
        &self.reissuer
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Number of reissue calls made over the coordinator's lifetime
    pub fn reissue_count(&self) -> u64 {
        self.reissues.load(Ordering::SeqCst)
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*lock(&self.cycle), Cycle::RefreshPending { .. })
    }

    /// Callers currently parked behind the in-flight reissue
    pub fn queued(&self) -> usize {
        match &*lock(&self.cycle) {
            Cycle::Idle => 0,
            Cycle::RefreshPending { waiters } => waiters.len(),
        }
    }

    /// Wait for a token newer than `rejected`.
    ///
    /// If another caller already replaced the rejected token, that token is
    /// returned without a reissue. Otherwise this either joins the pending
    /// refresh or starts one.
    pub async fn refreshed_token_after(&self, rejected: Option<&SecretString>) -> Outcome {
        let queued = {
            let mut cycle = lock(&self.cycle);
            match &mut *cycle {
                Cycle::RefreshPending { waiters } => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push_back(tx);
                    tracing::debug!(position = waiters.len(), "Reissue in flight, request queued");
                    Some(rx)
                }
                Cycle::Idle => {
                    if let Some(current) = self.session.token() {
                        if !same_token(rejected, &current) {
                            tracing::debug!("Token already replaced, skipping reissue");
                            return Ok(current);
                        }
                    }
                    *cycle = Cycle::RefreshPending {
                        waiters: VecDeque::new(),
                    };
                    None
                }
            }
        };

        match queued {
            Some(rx) => rx.await.unwrap_or(Err(RefreshError::Abandoned)),
            None => self.lead().await,
        }
    }

    async fn lead(&self) -> Outcome {
        let guard = CycleGuard { cycle: &self.cycle };
        let cycle = self.reissues.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(cycle, "Reissuing access token");

        let outcome = self.reissuer.reissue().await;
        match &outcome {
            Ok(token) => {
                self.session.set_token(token.clone());
                let waiters = guard.settle(&outcome);
                tracing::info!(cycle, waiters, "Access token reissued");
            }
            Err(err) => {
                let waiters = guard.settle(&outcome);
                self.session.expire();
                tracing::warn!(cycle, waiters, error = %err, "Access token reissue failed");
            }
        }
        outcome
    }
}

impl<R> std::fmt::Debug for RefreshCoordinator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("reissues", &self.reissues.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Returns the cycle to idle on every exit path of the leader.
///
/// If the leader is dropped before the reissue settles, queued callers are
/// released with `RefreshError::Abandoned`.
struct CycleGuard<'a> {
    cycle: &'a Mutex<Cycle>,
}

impl CycleGuard<'_> {
    /// Hand `outcome` to every waiter and disarm the guard.
    ///
    /// Once this returns another leader may already own a new cycle, so the
    /// guard must not drain again on drop.
    fn settle(self, outcome: &Outcome) -> usize {
        let released = drain(self.cycle, outcome);
        std::mem::forget(self);
        released
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        let released = drain(self.cycle, &Err(RefreshError::Abandoned));
        if released > 0 {
            tracing::warn!(waiters = released, "Reissue abandoned, queued requests released");
        }
    }
}

fn drain(cycle: &Mutex<Cycle>, outcome: &Outcome) -> usize {
    let mut cycle = lock(cycle);
    let Cycle::RefreshPending { waiters } = std::mem::replace(&mut *cycle, Cycle::Idle) else {
        return 0;
    };

    let count = waiters.len();
    for waiter in waiters {
        // A receiver that went away has nothing left to replay
        let _ = waiter.send(outcome.clone());
    }
    count
}

fn lock(cycle: &Mutex<Cycle>) -> MutexGuard<'_, Cycle> {
    cycle.lock().unwrap_or_else(PoisonError::into_inner)
}

fn same_token(rejected: Option<&SecretString>, current: &SecretString) -> bool {
    rejected.is_some_and(|rejected| rejected.expose_secret() == current.expose_secret())
}

/// Token handed to one attempt of a request
#[derive(Debug, Clone)]
pub struct Attempt {
    pub token: Option<SecretString>,
    /// Set on the single replay after a reissue; a replay is never replayed again.
    pub retried: bool,
}

/// Wraps request attempts with bearer-token recovery.
///
/// This is the decorator composed around a base transport: it runs an
/// attempt with the current token and, if the attempt is unauthorized, waits
/// for a refreshed token and runs the attempt exactly once more.
pub struct Authenticator<R> {
    coordinator: RefreshCoordinator<R>,
}

impl<R: Reissuer> Authenticator<R> {
    pub fn new(session: Arc<Session>, reissuer: R) -> Self {
        Self {
            coordinator: RefreshCoordinator::new(session, reissuer),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        self.coordinator.session()
    }

    pub fn coordinator(&self) -> &RefreshCoordinator<R> {
        &self.coordinator
    }

    pub async fn execute<F, Fut, T, E>(&self, mut attempt: F) -> Result<T, E>
    where
        F: FnMut(Attempt) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Unauthorized + From<RefreshError>,
    {
        let sent = self.session().token();
        let first = attempt(Attempt {
            token: sent.clone(),
            retried: false,
        })
        .await;

        match first {
            Err(err) if err.is_unauthorized() => {
                tracing::debug!("Request unauthorized, waiting for a fresh token");
                let token = self
                    .coordinator
                    .refreshed_token_after(sent.as_ref())
                    .await?;

                let replay = attempt(Attempt {
                    token: Some(token),
                    retried: true,
                })
                .await;
                if let Err(err) = &replay {
                    if err.is_unauthorized() {
                        tracing::warn!("Replayed request rejected again, passing error through");
                    }
                }
                replay
            }
            other => other,
        }
    }
}

impl<R> std::fmt::Debug for Authenticator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use reqwest::StatusCode;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Reissuer that blocks until released, then returns a fixed outcome
    struct GatedReissuer {
        outcome: Outcome,
        gate: Notify,
        calls: AtomicUsize,
    }

    impl GatedReissuer {
        fn granting(token: &str) -> Self {
            Self::with_outcome(Ok(token.into()))
        }

        fn rejecting(status: StatusCode) -> Self {
            Self::with_outcome(Err(RefreshError::Rejected {
                status,
                message: "refresh token expired".to_string(),
            }))
        }

        fn with_outcome(outcome: Outcome) -> Self {
            Self {
                outcome,
                gate: Notify::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn release(&self) {
            self.gate.notify_one();
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Reissuer for GatedReissuer {
        async fn reissue(&self) -> Outcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            self.outcome.clone()
        }
    }

    #[derive(Debug, PartialEq)]
    enum FakeError {
        Unauthorized,
        NotFound,
        Refresh(RefreshError),
    }

    impl Unauthorized for FakeError {
        fn is_unauthorized(&self) -> bool {
            matches!(self, FakeError::Unauthorized)
        }
    }

    impl From<RefreshError> for FakeError {
        fn from(err: RefreshError) -> Self {
            FakeError::Refresh(err)
        }
    }

    fn coordinator(reissuer: GatedReissuer) -> Arc<RefreshCoordinator<GatedReissuer>> {
        Arc::new(RefreshCoordinator::new(Arc::new(Session::new()), reissuer))
    }

    async fn until(condition: impl Fn() -> bool) {
        while !condition() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_reissue() {
        let coordinator = coordinator(GatedReissuer::granting("tok2"));

        let (a, b, c, ()) = tokio::join!(
            coordinator.refreshed_token_after(None),
            coordinator.refreshed_token_after(None),
            coordinator.refreshed_token_after(None),
            async {
                until(|| coordinator.queued() == 2).await;
                coordinator.reissuer().release();
            }
        );

        for result in [a, b, c] {
            assert_eq!(result.unwrap().expose_secret(), "tok2");
        }
        assert_eq!(coordinator.reissuer().calls(), 1);
        assert_eq!(coordinator.reissue_count(), 1);
        assert_eq!(
            coordinator.session().token().unwrap().expose_secret(),
            "tok2"
        );
    }

    #[tokio::test]
    async fn test_queued_callers_are_released_in_arrival_order() {
        let coordinator = coordinator(GatedReissuer::granting("tok2"));
        let order = Arc::new(Mutex::new(Vec::new()));

        let leader = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.refreshed_token_after(None).await })
        };
        until(|| coordinator.is_refreshing()).await;

        let mut followers = Vec::new();
        for label in ["A", "B", "C"] {
            let follower = coordinator.clone();
            let order = order.clone();
            followers.push(tokio::spawn(async move {
                let token = follower.refreshed_token_after(None).await;
                order.lock().unwrap().push(label);
                token
            }));
            let expected = followers.len();
            until(|| coordinator.queued() == expected).await;
        }

        coordinator.reissuer().release();

        assert_eq!(leader.await.unwrap().unwrap().expose_secret(), "tok2");
        for follower in followers {
            assert_eq!(follower.await.unwrap().unwrap().expose_secret(), "tok2");
        }
        assert_eq!(*order.lock().unwrap(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_failed_reissue_rejects_queue_and_expires_session() {
        let coordinator = coordinator(GatedReissuer::rejecting(StatusCode::FORBIDDEN));
        coordinator.session().set_token("tok1".into());
        let rejected: SecretString = "tok1".into();

        let (a, b, ()) = tokio::join!(
            coordinator.refreshed_token_after(Some(&rejected)),
            coordinator.refreshed_token_after(Some(&rejected)),
            async {
                until(|| coordinator.queued() == 1).await;
                coordinator.reissuer().release();
            }
        );

        let expected = RefreshError::Rejected {
            status: StatusCode::FORBIDDEN,
            message: "refresh token expired".to_string(),
        };
        assert_eq!(a.unwrap_err(), expected);
        assert_eq!(b.unwrap_err(), expected);
        assert!(coordinator.session().token().is_none());
        assert_eq!(
            coordinator.session().state(),
            SessionState::Expired {
                login_path: "/login".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_cycle_resets_after_failure_and_next_cycle_is_independent() {
        let coordinator = coordinator(GatedReissuer::rejecting(StatusCode::UNAUTHORIZED));

        coordinator.reissuer().release();
        assert!(coordinator.refreshed_token_after(None).await.is_err());
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.queued(), 0);

        coordinator.reissuer().release();
        assert!(coordinator.refreshed_token_after(None).await.is_err());
        assert_eq!(coordinator.reissue_count(), 2);
    }

    #[tokio::test]
    async fn test_stale_rejection_reuses_current_token() {
        let coordinator = coordinator(GatedReissuer::granting("unused"));
        coordinator.session().set_token("tok2".into());
        let stale: SecretString = "tok1".into();

        let token = coordinator.refreshed_token_after(Some(&stale)).await.unwrap();

        assert_eq!(token.expose_secret(), "tok2");
        assert_eq!(coordinator.reissue_count(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_leader_releases_waiters() {
        let coordinator = coordinator(GatedReissuer::granting("never"));

        let leader = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.refreshed_token_after(None).await })
        };
        until(|| coordinator.is_refreshing()).await;

        let waiter = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.refreshed_token_after(None).await })
        };
        until(|| coordinator.queued() == 1).await;

        leader.abort();

        assert_eq!(waiter.await.unwrap().unwrap_err(), RefreshError::Abandoned);
        assert!(!coordinator.is_refreshing());
    }

    /// Reissuer that hands out numbered tokens and tracks overlap
    #[derive(Default)]
    struct CountingReissuer {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        issued: AtomicUsize,
    }

    impl Reissuer for CountingReissuer {
        async fn reissue(&self) -> Outcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(format!("tok{}", n).into())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_back_to_back_cycles_never_overlap() {
        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::new(Session::new()),
            CountingReissuer::default(),
        ));

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let caller = coordinator.clone();
            tasks.push(tokio::spawn(async move {
                let mut failures = Vec::new();
                for _ in 0..200 {
                    let rejected = caller.session().token();
                    if let Err(err) = caller.refreshed_token_after(rejected.as_ref()).await {
                        failures.push(err);
                    }
                }
                failures
            }));
        }

        let mut failures = Vec::new();
        for task in tasks {
            failures.extend(task.await.unwrap());
        }

        assert!(failures.is_empty(), "unexpected failures: {:?}", failures);
        assert_eq!(
            coordinator.reissuer().max_in_flight.load(Ordering::SeqCst),
            1
        );
        assert_eq!(coordinator.queued(), 0);
    }

    #[tokio::test]
    async fn test_execute_replays_once_with_fresh_token() {
        let reissuer = GatedReissuer::granting("tok2");
        reissuer.release();
        let auth = Authenticator::new(Arc::new(Session::new()), reissuer);
        auth.session().set_token("tok1".into());

        let attempts = Mutex::new(Vec::new());
        let result: Result<&str, FakeError> = auth
            .execute(|attempt| {
                let token = attempt.token.map(|t| t.expose_secret().to_string());
                attempts.lock().unwrap().push((token.clone(), attempt.retried));
                async move {
                    match token.as_deref() {
                        Some("tok2") => Ok("ok"),
                        _ => Err(FakeError::Unauthorized),
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(
            *attempts.lock().unwrap(),
            vec![
                (Some("tok1".to_string()), false),
                (Some("tok2".to_string()), true)
            ]
        );
    }

    #[tokio::test]
    async fn test_execute_does_not_loop_on_second_unauthorized() {
        let reissuer = GatedReissuer::granting("tok2");
        reissuer.release();
        let auth = Authenticator::new(Arc::new(Session::new()), reissuer);

        let calls = AtomicUsize::new(0);
        let result: Result<(), FakeError> = auth
            .execute(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(FakeError::Unauthorized) }
            })
            .await;

        assert_eq!(result, Err(FakeError::Unauthorized));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(auth.coordinator().reissue_count(), 1);
    }

    #[tokio::test]
    async fn test_execute_passes_other_errors_through() {
        let auth = Authenticator::new(Arc::new(Session::new()), GatedReissuer::granting("x"));

        let result: Result<(), FakeError> =
            auth.execute(|_| async { Err(FakeError::NotFound) }).await;

        assert_eq!(result, Err(FakeError::NotFound));
        assert_eq!(auth.coordinator().reissue_count(), 0);
    }

    #[tokio::test]
    async fn test_execute_surfaces_session_loss() {
        let reissuer = GatedReissuer::rejecting(StatusCode::UNAUTHORIZED);
        reissuer.release();
        let auth = Authenticator::new(Arc::new(Session::new()), reissuer);

        let result: Result<(), FakeError> =
            auth.execute(|_| async { Err(FakeError::Unauthorized) }).await;

        assert!(matches!(
            result,
            Err(FakeError::Refresh(RefreshError::Rejected { .. }))
        ));
        assert!(matches!(
            auth.session().state(),
            SessionState::Expired { .. }
        ));
    }
}

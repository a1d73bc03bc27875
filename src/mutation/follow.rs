use std::sync::Arc;

use parking_lot::Mutex;
use scopeguard::ScopeGuard;

use crate::api::models::UserId;
use crate::api::FollowApi;
use crate::mutation::guard::{GuardState, MutationGuard};
use crate::mutation::MutationError;

const NOT_UPDATED: &str = "Failed to update follow status";
const TRY_AGAIN: &str = "Network error. Please try again.";

/// Settled result of a successful toggle, delivered to dependent views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowChange {
    pub target: UserId,
    pub following: bool,
    /// Target's follower count as computed by the server, when returned.
    pub follower_count: Option<u64>,
}

pub type FollowListener = Arc<dyn Fn(FollowChange) + Send + Sync>;

#[derive(Debug, Clone, Default)]
struct Display {
    following: bool,
    error: Option<String>,
}

/// Optimistic follow/unfollow for one (viewer, target) pair.
///
/// `toggle` flips the displayed state before the request goes out and
/// flips it back if the server fails or answers `success: false`. A
/// second toggle while one is outstanding is rejected with
/// [`MutationError::Busy`].
pub struct FollowController {
    api: Arc<dyn FollowApi>,
    viewer: UserId,
    target: UserId,
    display: Mutex<Display>,
    guard: MutationGuard,
    listener: Option<FollowListener>,
}

impl FollowController {
    pub fn new(
        api: Arc<dyn FollowApi>,
        viewer: UserId,
        target: UserId,
        initially_following: bool,
    ) -> Result<Self, MutationError> {
        if viewer == target {
            return Err(MutationError::SelfFollow);
        }
        Ok(Self {
            api,
            viewer,
            target,
            display: Mutex::new(Display {
                following: initially_following,
                error: None,
            }),
            guard: MutationGuard::new(),
            listener: None,
        })
    }

    pub fn with_listener(mut self, listener: FollowListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn target(&self) -> UserId {
        self.target
    }

    /// Currently displayed state, including an optimistic flip in flight.
    pub fn is_following(&self) -> bool {
        self.display.lock().following
    }

    pub fn is_busy(&self) -> bool {
        self.guard.state() == GuardState::InFlight
    }

    /// Last recoverable error, cleared when the next toggle starts.
    pub fn error(&self) -> Option<String> {
        self.display.lock().error.clone()
    }

    /// Replace the displayed state with a freshly loaded value.
    /// Ignored while a toggle is outstanding.
    pub fn reset(&self, following: bool) {
        if self.is_busy() {
            return;
        }
        let mut display = self.display.lock();
        display.following = following;
        display.error = None;
    }

    pub async fn toggle(&self) -> Result<FollowChange, MutationError> {
        let Some(_permit) = self.guard.try_acquire() else {
            tracing::debug!(target_user = self.target, "Follow toggle ignored: request in flight");
            return Err(MutationError::Busy);
        };

        let previous = {
            let mut display = self.display.lock();
            let previous = display.following;
            display.following = !previous;
            display.error = None;
            previous
        };
        // Undo the flip if this future is dropped before the request settles.
        let revert = scopeguard::guard(previous, |previous| {
            self.display.lock().following = previous;
        });

        let result = if previous {
            self.api.unfollow(self.viewer, self.target).await
        } else {
            self.api.follow(self.viewer, self.target).await
        };

        let previous = ScopeGuard::into_inner(revert);
        let failure = match result {
            Ok(response) if response.success => {
                let change = FollowChange {
                    target: self.target,
                    following: !previous,
                    follower_count: response.follower_count,
                };
                tracing::info!(
                    viewer = self.viewer,
                    target_user = self.target,
                    following = change.following,
                    "Follow state updated"
                );
                if let Some(listener) = &self.listener {
                    listener(change);
                }
                return Ok(change);
            }
            Ok(response) => MutationError::Rejected {
                message: response.message.unwrap_or_else(|| NOT_UPDATED.to_string()),
            },
            Err(err) => MutationError::Failed {
                message: err.user_message(TRY_AGAIN),
                source: err,
            },
        };

        tracing::warn!(
            viewer = self.viewer,
            target_user = self.target,
            error = %failure,
            "Follow update failed, reverting"
        );
        let mut display = self.display.lock();
        display.following = previous;
        display.error = Some(failure.to_string());
        Err(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{FollowCounts, FollowResponse, UserSummary};
    use crate::api::ApiError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct ScriptedFollowApi {
        responses: Mutex<VecDeque<Result<FollowResponse, ApiError>>>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedFollowApi {
        fn ok() -> Result<FollowResponse, ApiError> {
            Ok(FollowResponse {
                success: true,
                message: None,
                follower_count: Some(1),
            })
        }

        async fn respond(&self) -> Result<FollowResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(Self::ok)
        }
    }

    #[async_trait]
    impl FollowApi for ScriptedFollowApi {
        async fn follow(&self, _: UserId, _: UserId) -> Result<FollowResponse, ApiError> {
            self.respond().await
        }
        async fn unfollow(&self, _: UserId, _: UserId) -> Result<FollowResponse, ApiError> {
            self.respond().await
        }
        async fn is_following(&self, _: UserId, _: UserId) -> Result<bool, ApiError> {
            Ok(false)
        }
        async fn followers(&self, _: UserId) -> Result<Vec<UserSummary>, ApiError> {
            Ok(Vec::new())
        }
        async fn following(&self, _: UserId) -> Result<Vec<UserSummary>, ApiError> {
            Ok(Vec::new())
        }
        async fn counts(&self, _: UserId) -> Result<FollowCounts, ApiError> {
            Ok(FollowCounts::default())
        }
        async fn can_chat(&self, _: UserId, _: UserId) -> Result<bool, ApiError> {
            Ok(false)
        }
    }

    #[test]
    fn self_follow_is_refused() {
        let api = Arc::new(ScriptedFollowApi::default());
        assert!(matches!(
            FollowController::new(api, 1, 1, false),
            Err(MutationError::SelfFollow)
        ));
    }

    #[tokio::test]
    async fn toggles_without_failure_follow_parity() {
        for initial in [false, true] {
            for toggles in 0..6 {
                let api = Arc::new(ScriptedFollowApi::default());
                let controller = FollowController::new(api, 1, 2, initial).unwrap();
                for _ in 0..toggles {
                    controller.toggle().await.unwrap();
                }
                assert_eq!(controller.is_following(), initial ^ (toggles % 2 == 1));
            }
        }
    }

    #[tokio::test]
    async fn failure_reverts_for_both_initial_states() {
        for initial in [false, true] {
            let api = Arc::new(ScriptedFollowApi::default());
            api.responses.lock().push_back(Err(ApiError::Server { status: 500 }));
            let controller = FollowController::new(api, 1, 2, initial).unwrap();

            let err = controller.toggle().await.unwrap_err();
            assert!(matches!(err, MutationError::Failed { .. }));
            assert_eq!(controller.is_following(), initial);
            assert_eq!(controller.error().as_deref(), Some(TRY_AGAIN));
            assert!(!controller.is_busy());
        }
    }

    #[tokio::test]
    async fn explicit_non_success_reverts_with_server_message() {
        let api = Arc::new(ScriptedFollowApi::default());
        api.responses.lock().push_back(Ok(FollowResponse {
            success: false,
            message: Some("Already following".into()),
            follower_count: None,
        }));
        let controller = FollowController::new(api, 1, 2, false).unwrap();

        let err = controller.toggle().await.unwrap_err();
        assert_eq!(err.to_string(), "Already following");
        assert!(!controller.is_following());
    }

    #[tokio::test]
    async fn non_success_without_message_uses_fallback() {
        let api = Arc::new(ScriptedFollowApi::default());
        api.responses.lock().push_back(Ok(FollowResponse::default()));
        let controller = FollowController::new(api, 1, 2, true).unwrap();

        let err = controller.toggle().await.unwrap_err();
        assert_eq!(err.to_string(), NOT_UPDATED);
        assert!(controller.is_following());
    }

    #[tokio::test]
    async fn second_toggle_while_outstanding_is_rejected() {
        let gate = Arc::new(Notify::new());
        let api = Arc::new(ScriptedFollowApi {
            gate: Some(Arc::clone(&gate)),
            ..Default::default()
        });
        let controller = Arc::new(FollowController::new(api.clone(), 1, 2, false).unwrap());

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.toggle().await })
        };
        while api.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        // Optimistic flip is visible while the request is outstanding.
        assert!(controller.is_following());
        assert!(controller.is_busy());

        for _ in 0..5 {
            assert!(matches!(controller.toggle().await, Err(MutationError::Busy)));
        }

        gate.notify_one();
        let change = first.await.unwrap().unwrap();
        assert!(change.following);
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.max_in_flight.load(Ordering::SeqCst), 1);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn dropped_toggle_restores_previous_state() {
        for initial in [false, true] {
            let gate = Arc::new(Notify::new());
            let api = Arc::new(ScriptedFollowApi {
                gate: Some(Arc::clone(&gate)),
                ..Default::default()
            });
            let controller =
                Arc::new(FollowController::new(api.clone(), 1, 2, initial).unwrap());

            let pending = {
                let controller = Arc::clone(&controller);
                tokio::spawn(async move { controller.toggle().await })
            };
            while api.calls.load(Ordering::SeqCst) == 0 {
                tokio::task::yield_now().await;
            }
            assert_eq!(controller.is_following(), !initial);

            pending.abort();
            assert!(pending.await.unwrap_err().is_cancelled());

            assert_eq!(controller.is_following(), initial);
            assert!(!controller.is_busy());
        }
    }

    #[tokio::test]
    async fn listener_receives_server_counts() {
        let api = Arc::new(ScriptedFollowApi::default());
        api.responses.lock().push_back(Ok(FollowResponse {
            success: true,
            message: None,
            follower_count: Some(11),
        }));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let controller = FollowController::new(api, 1, 2, false)
            .unwrap()
            .with_listener(Arc::new(move |change| sink.lock().push(change)));

        controller.toggle().await.unwrap();
        assert_eq!(
            *seen.lock(),
            vec![FollowChange {
                target: 2,
                following: true,
                follower_count: Some(11),
            }]
        );
    }

    #[tokio::test]
    async fn listener_not_called_on_failure() {
        let api = Arc::new(ScriptedFollowApi::default());
        api.responses.lock().push_back(Err(ApiError::Network {
            message: "down".into(),
        }));
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let controller = FollowController::new(api, 1, 2, false)
            .unwrap()
            .with_listener(Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));

        let _ = controller.toggle().await;
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }
}

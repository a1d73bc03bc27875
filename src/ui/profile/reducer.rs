use crate::ui::mvi::Reducer;
use crate::ui::profile::intent::ProfileIntent;
use crate::ui::profile::state::{ProfilePhase, ProfileState};

pub struct ProfileReducer;

impl Reducer for ProfileReducer {
    type State = ProfileState;
    type Intent = ProfileIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ProfileIntent::Loading => ProfileState::default(),
            ProfileIntent::Loaded {
                user,
                mut posts,
                is_own,
                following,
                can_chat,
                counts,
            } => {
                posts.sort_by(|a, b| b.post_id.cmp(&a.post_id));
                ProfileState {
                    phase: ProfilePhase::Ready,
                    user: Some(user),
                    posts,
                    is_own,
                    following,
                    can_chat,
                    counts,
                }
            }
            ProfileIntent::NotFound => ProfileState {
                phase: ProfilePhase::NotFound,
                ..ProfileState::default()
            },
            ProfileIntent::LoadFailed(message) => ProfileState {
                phase: ProfilePhase::Failed(message),
                ..ProfileState::default()
            },
            ProfileIntent::FollowChanged {
                following,
                follower_count,
            } => {
                if state.phase != ProfilePhase::Ready || state.following == following {
                    return state;
                }
                let mut counts = state.counts;
                counts.followers = match follower_count {
                    Some(n) => n,
                    None if following => counts.followers + 1,
                    None => counts.followers.saturating_sub(1),
                };
                ProfileState {
                    following,
                    counts,
                    ..state
                }
            }
            ProfileIntent::CanChat(can_chat) => ProfileState { can_chat, ..state },
            ProfileIntent::PostRemoved(id) => {
                let mut posts = state.posts;
                posts.retain(|p| p.post_id != id);
                ProfileState { posts, ..state }
            }
        }
    }
}

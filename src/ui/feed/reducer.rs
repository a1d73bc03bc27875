use crate::ui::feed::intent::FeedIntent;
use crate::ui::feed::state::FeedState;
use crate::ui::mvi::Reducer;

pub struct FeedReducer;

impl Reducer for FeedReducer {
    type State = FeedState;
    type Intent = FeedIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            FeedIntent::Loading => FeedState {
                loading: true,
                ..state
            },
            FeedIntent::Loaded(mut posts) => {
                posts.sort_by(|a, b| b.post_id.cmp(&a.post_id));
                // Editing a post that no longer exists makes no sense.
                let editing = state
                    .editing
                    .filter(|id| posts.iter().any(|p| p.post_id == *id));
                FeedState {
                    loading: false,
                    posts,
                    editing,
                    ..state
                }
            }
            FeedIntent::LoadFailed => FeedState {
                loading: false,
                posts: Vec::new(),
                editing: None,
                ..state
            },
            FeedIntent::FollowingLoaded(following) => FeedState { following, ..state },
            FeedIntent::Submitting => FeedState {
                submitting: true,
                ..state
            },
            FeedIntent::Submitted => FeedState {
                submitting: false,
                ..state
            },
            FeedIntent::Edit(id) => {
                let editing = state.posts.iter().any(|p| p.post_id == id).then_some(id);
                FeedState { editing, ..state }
            }
            FeedIntent::CancelEdit => FeedState {
                editing: None,
                ..state
            },
            FeedIntent::PostRemoved(id) => {
                let mut posts = state.posts;
                posts.retain(|p| p.post_id != id);
                let editing = state.editing.filter(|e| *e != id);
                FeedState {
                    posts,
                    editing,
                    ..state
                }
            }
        }
    }
}

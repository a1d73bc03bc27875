//! Navigation bar: username autocomplete, exact user search, the unread
//! message badge and logout.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::models::UserId;
use crate::api::{ChatApi, UserApi};
use crate::config::Config;
use crate::search::{QuickSearch, Suggestions};
use crate::session::SessionContext;
use crate::sync::{CancelToken, PollHandle, Poller};
use crate::ui::mvi::{Intent, Reducer, UiState, ViewStore};
use crate::ui::ViewError;

const USER_NOT_FOUND: &str = "User not found";
const SEARCH_FAILED: &str = "Search failed. Please try again.";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavbarState {
    pub unread: u64,
    /// Set by the first answered unread poll.
    pub unread_loaded: bool,
    /// Last exact search that matched nobody.
    pub missed: Option<String>,
}

impl UiState for NavbarState {}

impl NavbarState {
    /// Badge text; hidden at zero and capped at "99+".
    pub fn badge(&self) -> Option<String> {
        match self.unread {
            0 => None,
            n if n > 99 => Some("99+".to_string()),
            n => Some(n.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum NavbarIntent {
    UnreadLoaded(u64),
    SearchMissed(String),
    SearchHit,
}

impl Intent for NavbarIntent {}

pub struct NavbarReducer;

impl Reducer for NavbarReducer {
    type State = NavbarState;
    type Intent = NavbarIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            NavbarIntent::UnreadLoaded(unread) => NavbarState {
                unread,
                unread_loaded: true,
                ..state
            },
            NavbarIntent::SearchMissed(term) => NavbarState {
                missed: Some(term),
                ..state
            },
            NavbarIntent::SearchHit => NavbarState {
                missed: None,
                ..state
            },
        }
    }
}

pub struct NavbarController<B> {
    api: Arc<B>,
    session: SessionContext,
    store: ViewStore<NavbarReducer>,
    autocomplete: QuickSearch<String>,
    gender: Arc<Mutex<String>>,
    cancel: CancelToken,
    _badge: PollHandle,
}

impl<B: UserApi + ChatApi + 'static> NavbarController<B> {
    pub fn open(api: Arc<B>, session: SessionContext, viewer: UserId, config: &Config) -> Self {
        let store: ViewStore<NavbarReducer> = ViewStore::default();
        let cancel = CancelToken::new();
        let gender = Arc::new(Mutex::new(String::new()));

        let suggest_api = Arc::clone(&api);
        let suggest_gender = Arc::clone(&gender);
        let autocomplete = QuickSearch::spawn(&config.search, move |term: String| {
            let api = Arc::clone(&suggest_api);
            let gender = suggest_gender.lock().clone();
            async move { api.autocomplete(&term, &gender).await }
        });

        let badge_api = Arc::clone(&api);
        let sink = store.clone();
        let badge = Poller::new("unread_count", config.polling.unread_count())
            .with_cancel(cancel.clone())
            .spawn(
                move || {
                    let api = Arc::clone(&badge_api);
                    async move { api.unread_count(viewer).await }
                },
                move |count| sink.dispatch(NavbarIntent::UnreadLoaded(count)),
            );

        Self {
            api,
            session,
            store,
            autocomplete,
            gender,
            cancel,
            _badge: badge,
        }
    }

    pub fn state(&self) -> NavbarState {
        self.store.state()
    }

    pub fn store(&self) -> &ViewStore<NavbarReducer> {
        &self.store
    }

    pub fn suggestions(&self) -> Suggestions<String> {
        self.autocomplete.snapshot()
    }

    pub fn autocomplete(&mut self) -> &mut QuickSearch<String> {
        &mut self.autocomplete
    }

    pub fn type_query(&self, query: impl Into<String>) {
        self.autocomplete.input(query);
    }

    /// Narrow suggestions by gender. Re-runs the current query.
    pub fn set_gender(&self, gender: impl Into<String>) {
        *self.gender.lock() = gender.into();
        let query = self.autocomplete.snapshot().query;
        if !query.is_empty() {
            self.autocomplete.input(query);
        }
    }

    /// Pick a suggestion; returns the username to navigate to.
    pub fn pick(&self, index: usize) -> Option<String> {
        let picked = self.autocomplete.select(index);
        if picked.is_some() {
            self.store.dispatch(NavbarIntent::SearchHit);
        }
        picked
    }

    pub fn escape(&self) {
        self.autocomplete.escape();
    }

    pub fn blur(&self) {
        self.autocomplete.blur();
    }

    /// Submit the search box: exact username lookup.
    pub async fn search(&self, term: &str) -> Result<String, ViewError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ViewError::refused("Enter a username to search"));
        }
        match self.api.find_user(term).await {
            Ok(user) => {
                self.autocomplete.escape();
                self.store.dispatch(NavbarIntent::SearchHit);
                Ok(user.username)
            }
            Err(err) if err.is_not_found() => {
                self.store.dispatch(NavbarIntent::SearchMissed(term.to_string()));
                Err(ViewError::Request {
                    message: USER_NOT_FOUND.to_string(),
                    source: err,
                })
            }
            Err(err) => Err(ViewError::request(err, SEARCH_FAILED)),
        }
    }

    /// End the session and stop background work.
    pub fn logout(&self) -> Result<(), ViewError> {
        self.cancel.cancel();
        self.autocomplete.escape();
        self.session.logout()?;
        Ok(())
    }
}

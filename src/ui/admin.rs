//! Admin user list: every account, filterable by name, username, email and
//! gender, with account deletion.

use std::sync::Arc;

use crate::api::models::{User, UserId};
use crate::api::UserApi;
use crate::notice::Notifier;
use crate::search::Searchable;
use crate::session::SessionContext;
use crate::ui::mvi::{Intent, Reducer, UiState, ViewStore};
use crate::ui::ViewError;

const LOAD_FAILED: &str = "Failed to load users. Please try again.";
const DELETE_FAILED: &str = "Failed to delete user. Please try again.";

/// Admin rows also match on email.
struct AdminRow<'a>(&'a User);

impl Searchable for AdminRow<'_> {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            &self.0.username,
            &self.0.first_name,
            &self.0.last_name,
            &self.0.email,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserStats {
    pub total: usize,
    pub admins: usize,
    pub regular: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdminState {
    pub loading: bool,
    pub users: Vec<User>,
    pub query: String,
    /// Exact gender match; empty means any.
    pub gender: String,
}

impl UiState for AdminState {}

impl AdminState {
    pub fn visible(&self) -> Vec<User> {
        self.users
            .iter()
            .filter(|u| AdminRow(u).matches(&self.query))
            .filter(|u| self.gender.is_empty() || u.gender.as_deref() == Some(self.gender.as_str()))
            .cloned()
            .collect()
    }

    /// Counts over every account, not just the filtered view.
    pub fn stats(&self) -> UserStats {
        let admins = self.users.iter().filter(|u| u.admin).count();
        UserStats {
            total: self.users.len(),
            admins,
            regular: self.users.len() - admins,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AdminIntent {
    Loading,
    Loaded(Vec<User>),
    LoadFailed,
    QueryChanged(String),
    GenderChanged(String),
    UserRemoved(UserId),
}

impl Intent for AdminIntent {}

pub struct AdminReducer;

impl Reducer for AdminReducer {
    type State = AdminState;
    type Intent = AdminIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            AdminIntent::Loading => AdminState {
                loading: true,
                ..state
            },
            AdminIntent::Loaded(users) => AdminState {
                loading: false,
                users,
                ..state
            },
            AdminIntent::LoadFailed => AdminState {
                loading: false,
                ..state
            },
            AdminIntent::QueryChanged(query) => AdminState { query, ..state },
            AdminIntent::GenderChanged(gender) => AdminState { gender, ..state },
            AdminIntent::UserRemoved(id) => {
                let mut users = state.users;
                users.retain(|u| u.user_id != id);
                AdminState { users, ..state }
            }
        }
    }
}

pub struct AdminController<B> {
    api: Arc<B>,
    store: ViewStore<AdminReducer>,
    notifier: Notifier,
}

impl<B: UserApi + 'static> AdminController<B> {
    /// Only for admins; anyone else is refused before any request.
    pub fn new(api: Arc<B>, session: &SessionContext, notifier: Notifier) -> Result<Self, ViewError> {
        session.require_admin()?;
        Ok(Self {
            api,
            store: ViewStore::default(),
            notifier,
        })
    }

    pub fn state(&self) -> AdminState {
        self.store.state()
    }

    pub fn store(&self) -> &ViewStore<AdminReducer> {
        &self.store
    }

    pub async fn load(&self) -> Result<(), ViewError> {
        self.store.dispatch(AdminIntent::Loading);
        match self.api.list_users().await {
            Ok(users) => {
                self.store.dispatch(AdminIntent::Loaded(users));
                Ok(())
            }
            Err(err) => {
                self.store.dispatch(AdminIntent::LoadFailed);
                let err = ViewError::request(err, LOAD_FAILED);
                self.notifier.error(err.to_string());
                Err(err)
            }
        }
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.store.dispatch(AdminIntent::QueryChanged(query.into()));
    }

    pub fn set_gender(&self, gender: impl Into<String>) {
        self.store.dispatch(AdminIntent::GenderChanged(gender.into()));
    }

    pub async fn delete_user(&self, user_id: UserId) -> Result<(), ViewError> {
        match self.api.delete_user(user_id).await {
            Ok(()) => {
                tracing::info!(user_id, "User deleted");
                self.store.dispatch(AdminIntent::UserRemoved(user_id));
                self.notifier.success("User deleted");
                Ok(())
            }
            Err(err) => {
                let err = ViewError::request(err, DELETE_FAILED);
                self.notifier.error(err.to_string());
                Err(err)
            }
        }
    }
}

//! Composition root.
//!
//! [`App`] owns the long-lived collaborators (configuration, HTTP client,
//! object store, session, notices) and builds each view's controller with
//! the session user passed in explicitly.

use std::sync::Arc;

use crate::api::models::{ChatId, User};
use crate::api::{ApiClient, ApiError};
use crate::config::ConfigStore;
use crate::notice::Notifier;
use crate::session::{SessionContext, SessionError};
use crate::storage::{HttpObjectStore, ObjectStore};
use crate::ui::admin::AdminController;
use crate::ui::auth::AuthController;
use crate::ui::chat::ChatController;
use crate::ui::chat_list::ChatListController;
use crate::ui::discover::DiscoverController;
use crate::ui::feed::FeedController;
use crate::ui::navbar::NavbarController;
use crate::ui::profile::ProfileController;
use crate::ui::ViewError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Feed,
    Profile(String),
    Chats,
    Chat(ChatId),
    Discover,
    Admin,
}

impl Route {
    fn needs_session(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }
}

pub struct App {
    config: ConfigStore,
    api: Arc<ApiClient>,
    storage: Arc<dyn ObjectStore>,
    session: SessionContext,
    notifier: Notifier,
}

impl App {
    pub fn new(config: ConfigStore, session: SessionContext) -> Result<Self, ApiError> {
        let snapshot = config.get();
        let api = ApiClient::new(&snapshot.api)?;
        let storage: Arc<dyn ObjectStore> = Arc::new(HttpObjectStore::new(&snapshot.storage));
        Ok(Self::from_parts(config, api, storage, session))
    }

    pub fn from_parts(
        config: ConfigStore,
        api: ApiClient,
        storage: Arc<dyn ObjectStore>,
        session: SessionContext,
    ) -> Self {
        tracing::debug!(base_url = %api.base_url(), "App assembled");
        Self {
            config,
            api: Arc::new(api),
            storage,
            session,
            notifier: Notifier::new(),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Where to land on startup.
    pub fn entry(&self) -> Route {
        if self.session.is_logged_in() {
            Route::Feed
        } else {
            Route::Login
        }
    }

    /// Apply the access rules to a requested route: no session goes to
    /// login, a session skips the auth forms, and non-admins never reach
    /// the admin list.
    pub fn resolve(&self, requested: Route) -> Route {
        match self.session.current() {
            None if requested.needs_session() => Route::Login,
            Some(_) if !requested.needs_session() => Route::Feed,
            Some(user) if requested == Route::Admin && !user.admin => Route::Feed,
            _ => requested,
        }
    }

    fn viewer(&self) -> Result<User, ViewError> {
        Ok(self.session.require()?)
    }

    pub fn auth(&self) -> AuthController<ApiClient> {
        AuthController::new(
            Arc::clone(&self.api),
            Arc::clone(&self.storage),
            self.session.clone(),
        )
    }

    pub fn feed(&self) -> Result<FeedController<ApiClient>, ViewError> {
        Ok(FeedController::new(
            Arc::clone(&self.api),
            Arc::clone(&self.storage),
            self.viewer()?,
            self.notifier.clone(),
        ))
    }

    pub async fn profile(&self, username: &str) -> Result<ProfileController<ApiClient>, ViewError> {
        let viewer = self.viewer()?;
        Ok(ProfileController::load(Arc::clone(&self.api), viewer, username, self.notifier.clone()).await)
    }

    pub fn chat_list(&self) -> Result<ChatListController<ApiClient>, ViewError> {
        let viewer = self.viewer()?;
        Ok(ChatListController::open(
            Arc::clone(&self.api),
            viewer.user_id,
            &self.config.get().polling,
            self.notifier.clone(),
        ))
    }

    pub fn chat(&self, chat_id: ChatId) -> Result<ChatController, ViewError> {
        let viewer = self.viewer()?;
        let config = self.config.get();
        Ok(ChatController::open(
            self.api.clone(),
            viewer.user_id,
            chat_id,
            &config.chat,
            &config.polling,
            self.notifier.clone(),
        ))
    }

    pub fn navbar(&self) -> Result<NavbarController<ApiClient>, ViewError> {
        let viewer = self.viewer()?;
        Ok(NavbarController::open(
            Arc::clone(&self.api),
            self.session.clone(),
            viewer.user_id,
            &self.config.get(),
        ))
    }

    pub fn discover(&self) -> Result<DiscoverController<ApiClient>, ViewError> {
        let viewer = self.viewer()?;
        Ok(DiscoverController::open(
            Arc::clone(&self.api),
            viewer.user_id,
            &self.config.get().search,
        ))
    }

    pub fn admin(&self) -> Result<AdminController<ApiClient>, ViewError> {
        AdminController::new(Arc::clone(&self.api), &self.session, self.notifier.clone())
    }

    /// The single logout path for callers without a navbar.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.session.logout()
    }
}

//! Discover page: recommendations, quick search and filtered advanced
//! search over skills, interests and academic details.

use std::sync::Arc;

use crate::api::models::{SearchCriteria, SearchResult, UserId};
use crate::api::SearchApi;
use crate::config::SearchConfig;
use crate::search::{QuickSearch, Suggestions};
use crate::ui::mvi::{Intent, Reducer, UiState, ViewStore};
use crate::ui::ViewError;

const ADVANCED_PAGE_SIZE: u32 = 20;
const SEARCH_FAILED: &str = "Search failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoverTab {
    #[default]
    Recommendations,
    Results,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filters {
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub college: String,
    pub semester: String,
    pub batch: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiscoverState {
    pub tab: DiscoverTab,
    pub recommendations: Vec<SearchResult>,
    pub results: Vec<SearchResult>,
    pub filters: Filters,
    pub searching: bool,
}

impl UiState for DiscoverState {}

#[derive(Debug, Clone)]
pub enum DiscoverIntent {
    RecommendationsLoaded(Vec<SearchResult>),
    AddSkill(String),
    RemoveSkill(String),
    AddInterest(String),
    RemoveInterest(String),
    SetCollege(String),
    SetSemester(String),
    SetBatch(String),
    SearchStarted,
    SearchFinished(Option<Vec<SearchResult>>),
    ShowTab(DiscoverTab),
}

impl Intent for DiscoverIntent {}

pub struct DiscoverReducer;

fn add_tag(mut tags: Vec<String>, tag: String) -> Vec<String> {
    let tag = tag.trim().to_string();
    if !tag.is_empty() && !tags.contains(&tag) {
        tags.push(tag);
    }
    tags
}

impl Reducer for DiscoverReducer {
    type State = DiscoverState;
    type Intent = DiscoverIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        let mut filters = state.filters.clone();
        match intent {
            DiscoverIntent::RecommendationsLoaded(recommendations) => {
                return DiscoverState {
                    recommendations,
                    ..state
                }
            }
            DiscoverIntent::AddSkill(skill) => filters.skills = add_tag(filters.skills, skill),
            DiscoverIntent::RemoveSkill(skill) => filters.skills.retain(|s| *s != skill),
            DiscoverIntent::AddInterest(interest) => {
                filters.interests = add_tag(filters.interests, interest)
            }
            DiscoverIntent::RemoveInterest(interest) => filters.interests.retain(|i| *i != interest),
            DiscoverIntent::SetCollege(college) => filters.college = college,
            DiscoverIntent::SetSemester(semester) => filters.semester = semester,
            DiscoverIntent::SetBatch(batch) => filters.batch = batch,
            DiscoverIntent::SearchStarted => {
                return DiscoverState {
                    searching: true,
                    ..state
                }
            }
            DiscoverIntent::SearchFinished(Some(results)) => {
                return DiscoverState {
                    searching: false,
                    results,
                    tab: DiscoverTab::Results,
                    ..state
                }
            }
            DiscoverIntent::SearchFinished(None) => {
                return DiscoverState {
                    searching: false,
                    ..state
                }
            }
            DiscoverIntent::ShowTab(tab) => return DiscoverState { tab, ..state },
        }
        DiscoverState { filters, ..state }
    }
}

pub struct DiscoverController<B> {
    api: Arc<B>,
    viewer: UserId,
    store: ViewStore<DiscoverReducer>,
    quick: QuickSearch<SearchResult>,
}

impl<B: SearchApi + 'static> DiscoverController<B> {
    pub fn open(api: Arc<B>, viewer: UserId, search: &SearchConfig) -> Self {
        let quick_api = Arc::clone(&api);
        let quick = QuickSearch::spawn(search, move |query: String| {
            let api = Arc::clone(&quick_api);
            async move { api.quick_search(&query, viewer).await }
        });
        Self {
            api,
            viewer,
            store: ViewStore::default(),
            quick,
        }
    }

    pub fn state(&self) -> DiscoverState {
        self.store.state()
    }

    pub fn store(&self) -> &ViewStore<DiscoverReducer> {
        &self.store
    }

    pub fn quick(&self) -> &QuickSearch<SearchResult> {
        &self.quick
    }

    pub fn quick_results(&self) -> Suggestions<SearchResult> {
        self.quick.snapshot()
    }

    pub fn type_query(&self, query: impl Into<String>) {
        self.quick.input(query);
    }

    /// Apply a filter change.
    pub fn update(&self, intent: DiscoverIntent) {
        self.store.dispatch(intent);
    }

    /// Failures keep the previous list and are logged only.
    pub async fn load_recommendations(&self) {
        match self.api.recommendations(self.viewer).await {
            Ok(results) => self
                .store
                .dispatch(DiscoverIntent::RecommendationsLoaded(results)),
            Err(err) => tracing::debug!(error = %err, "Recommendations unavailable"),
        }
    }

    /// Run the advanced search with the typed query and current filters.
    pub async fn advanced_search(&self) -> Result<usize, ViewError> {
        self.quick.blur();
        let query = self.quick.snapshot().query;
        let filters = self.store.read(|s| s.filters.clone());
        let criteria = SearchCriteria {
            query,
            skills: filters.skills,
            interests: filters.interests,
            college: filters.college,
            semester: filters.semester,
            batch: filters.batch,
            page: 0,
            size: ADVANCED_PAGE_SIZE,
        };

        self.store.dispatch(DiscoverIntent::SearchStarted);
        match self.api.advanced_search(self.viewer, &criteria).await {
            Ok(results) => {
                let found = results.len();
                self.store
                    .dispatch(DiscoverIntent::SearchFinished(Some(results)));
                Ok(found)
            }
            Err(err) => {
                tracing::debug!(error = %err, "Advanced search failed");
                self.store.dispatch(DiscoverIntent::SearchFinished(None));
                Err(ViewError::request(err, SEARCH_FAILED))
            }
        }
    }
}

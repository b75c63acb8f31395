//! Catalog browsing state: loading, search and group expansion.

use std::cell::Cell;
use std::collections::HashMap;
use std::future::Future;

use cardwright_common::{
    CatalogClient, CatalogError, Store, TemplateCard, TemplateCategory, TemplateCollection,
    TemplateGroup,
};

/// Where template collections come from.
pub trait TemplateSource {
    fn fetch_collection(&self) -> impl Future<Output = Result<TemplateCollection, CatalogError>>;
}

impl TemplateSource for CatalogClient {
    fn fetch_collection(&self) -> impl Future<Output = Result<TemplateCollection, CatalogError>> {
        CatalogClient::fetch_collection(self)
    }
}

impl<T: TemplateSource> TemplateSource for &T {
    fn fetch_collection(&self) -> impl Future<Output = Result<TemplateCollection, CatalogError>> {
        (*self).fetch_collection()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplatesState {
    pub template_groups: Vec<TemplateGroup>,
    pub expanded_groups: HashMap<TemplateCategory, bool>,
    pub search_term: String,
    pub last_fetched_at: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// A group as the sidebar shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateGroupView {
    pub id: TemplateCategory,
    pub title: String,
    /// Items matching the current search term.
    pub filtered_items: Vec<TemplateCard>,
    pub expanded: bool,
}

/// Groups filtered by the search term (case-insensitive substring of the
/// card name; a blank term keeps everything).
pub fn build_group_views(state: &TemplatesState) -> Vec<TemplateGroupView> {
    let needle = state.search_term.trim().to_lowercase();

    state
        .template_groups
        .iter()
        .map(|group| TemplateGroupView {
            id: group.id,
            title: group.title.clone(),
            filtered_items: group
                .items
                .iter()
                .filter(|card| needle.is_empty() || card.name.to_lowercase().contains(&needle))
                .cloned()
                .collect(),
            expanded: state.expanded_groups.get(&group.id).copied().unwrap_or(false),
        })
        .collect()
}

pub struct TemplateBrowser<S> {
    source: S,
    store: Store<TemplatesState>,
    current_request: Cell<u64>,
    bootstrapped: Cell<bool>,
}

impl<S: TemplateSource> TemplateBrowser<S> {
    pub fn new(source: S, store: Store<TemplatesState>) -> Self {
        Self {
            source,
            store,
            current_request: Cell::new(0),
            bootstrapped: Cell::new(false),
        }
    }

    pub fn store(&self) -> &Store<TemplatesState> {
        &self.store
    }

    /// Load the catalog the first time this is called; later calls do
    /// nothing.
    pub async fn ensure_loaded(&self) {
        if self.bootstrapped.replace(true) {
            return;
        }
        self.reload().await;
    }

    /// Fetch the catalog again. A failure keeps the groups already shown.
    /// When reloads overlap, only the latest one applies its result.
    pub async fn reload(&self) {
        let request_id = self.current_request.get() + 1;
        self.current_request.set(request_id);

        self.store.update(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let result = self.source.fetch_collection().await;
        if request_id != self.current_request.get() {
            tracing::debug!(request_id, "discarding superseded catalog response");
            return;
        }

        match result {
            Ok(collection) => self.store.update(|state| apply_collection(state, collection)),
            Err(e) => {
                tracing::warn!(error = %e, "catalog reload failed");
                let message = e.to_string();
                self.store.update(|state| state.error = Some(message));
            }
        }

        self.store.update(|state| state.is_loading = false);
    }

    pub fn set_search_term(&self, value: impl Into<String>) {
        let value = value.into();
        self.store.update(|state| state.search_term = value);
    }

    pub fn toggle_group(&self, id: TemplateCategory) {
        self.store.update(|state| {
            let expanded = state.expanded_groups.entry(id).or_insert(false);
            *expanded = !*expanded;
        });
    }

    pub fn group_views(&self) -> Vec<TemplateGroupView> {
        self.store.with_state(build_group_views)
    }
}

/// Replace the groups. Groups keep their previous expansion; new ones start
/// expanded only if they come first.
fn apply_collection(state: &mut TemplatesState, collection: TemplateCollection) {
    let expanded = collection
        .template_groups
        .iter()
        .enumerate()
        .map(|(index, group)| {
            let open = state
                .expanded_groups
                .get(&group.id)
                .copied()
                .unwrap_or(index == 0);
            (group.id, open)
        })
        .collect();

    tracing::debug!(
        groups = collection.template_groups.len(),
        fetched_at = %collection.fetched_at,
        "applied template collection"
    );
    state.expanded_groups = expanded;
    state.template_groups = collection.template_groups;
    state.last_fetched_at = Some(collection.fetched_at);
}

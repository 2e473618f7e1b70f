use crate::client::CatalogClient;
use crate::events::ListSubscription;
use crate::models::{Component, ALL_CATEGORIES};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryState {
    Idle,
    /// Only held while `refresh` awaits the server; callers see the outcome.
    Loading,
    Loaded,
    /// The last fetch failed; the previously shown list is still served.
    Failed(String),
}

/// Browsing state for the component gallery.
///
/// Category filtering happens on the server, free-text search happens here
/// over whatever list was fetched last. The most recent successful list per
/// category is cached until a [`ListSubscription`] reports that the catalog
/// changed.
pub struct Gallery {
    client: CatalogClient,
    updates: ListSubscription,
    category: String,
    search: String,
    state: GalleryState,
    cache: HashMap<String, Vec<Component>>,
    shown: Vec<Component>,
}

impl Gallery {
    pub fn new(client: CatalogClient, updates: ListSubscription) -> Self {
        Self {
            client,
            updates,
            category: ALL_CATEGORIES.to_string(),
            search: String::new(),
            state: GalleryState::Idle,
            cache: HashMap::new(),
            shown: Vec::new(),
        }
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Purely local; never triggers a fetch.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        debug!(search = %self.search, "gallery search changed");
    }

    /// Switches category and reloads it. Served from cache unless the
    /// catalog changed or the category was never fetched.
    pub async fn select_category(&mut self, category: impl Into<String>) -> &GalleryState {
        self.category = category.into();
        debug!(category = %self.category, "gallery category selected");
        self.refresh().await
    }

    /// Loads the current category, from cache when the catalog has not
    /// changed since it was fetched.
    pub async fn refresh(&mut self) -> &GalleryState {
        if self.updates.take_change() {
            debug!("component list invalidated, dropping cached lists");
            self.cache.clear();
        }

        if let Some(cached) = self.cache.get(&self.category) {
            self.shown = cached.clone();
            self.state = GalleryState::Loaded;
            return &self.state;
        }

        self.state = GalleryState::Loading;
        let filter = (self.category != ALL_CATEGORIES).then_some(self.category.as_str());

        match self.client.list_components(filter).await {
            Ok(components) => {
                self.cache.insert(self.category.clone(), components.clone());
                self.shown = components;
                self.state = GalleryState::Loaded;
            }
            Err(err) => {
                warn!(category = %self.category, error = %err, "failed to load components");
                self.state = GalleryState::Failed(err.to_string());
            }
        }

        &self.state
    }

    /// The last fetched list narrowed by the search box.
    pub fn visible(&self) -> Vec<&Component> {
        self.shown
            .iter()
            .filter(|c| c.matches_query(&self.search))
            .collect()
    }

    pub fn summary(&self) -> String {
        let count = self.visible().len();
        format!(
            "{} component{} found",
            count,
            if count == 1 { "" } else { "s" }
        )
    }
}

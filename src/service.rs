//! The reading time service an embedding application wires up.
//!
//! Construct one [`ReadingTime`] per settings store and hand it to whatever
//! renders content. It exposes the two entry points: the content-pipeline hook
//! ([`ReadingTime::filter_content`]) and the on-demand query
//! ([`ReadingTime::query`] / [`ReadingTime::query_content`]). Display strings
//! leaving this type are HTML-escaped.

use std::sync::Arc;

use crate::content::ContentSource;
use crate::estimator::Estimate;
use crate::presenter;
use crate::settings::Settings;
use crate::store::SettingsStore;

#[derive(Clone)]
pub struct ReadingTime {
    store: Arc<dyn SettingsStore>,
}

impl ReadingTime {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    pub fn settings(&self) -> Settings {
        self.store.get()
    }

    pub fn estimate(&self, content: &str) -> Estimate {
        Estimate::of(content, self.settings().words_per_minute)
    }

    /// The filled template for `content`, escaped for HTML text.
    pub fn display_for(&self, content: &str) -> String {
        escaped_display(content, &self.settings())
    }

    /// Content-pipeline hook: returns `content` with the estimate placed in
    /// it when the item qualifies, otherwise `content` unchanged.
    pub fn filter_content(&self, content: &str, category: &str, is_single_item_view: bool) -> String {
        let settings = self.settings();
        if !presenter::should_display(category, &settings, is_single_item_view) {
            tracing::trace!(category, is_single_item_view, "estimate not displayed");
            return content.to_string();
        }
        let display = escaped_display(content, &settings);
        presenter::place(content, &display, settings.display_position)
    }

    /// On-demand estimate for a stored item. Ignores display eligibility.
    ///
    /// Returns an empty string when `source` has no item with this id.
    pub fn query(&self, source: &dyn ContentSource, id: &str) -> String {
        match source.get(id) {
            Some(item) => self.display_for(&item.body_html),
            None => {
                tracing::debug!("No content item {id:?} for reading time query");
                String::new()
            }
        }
    }

    /// On-demand estimate for explicit raw content. Ignores display eligibility.
    pub fn query_content(&self, content: &str) -> String {
        self.display_for(content)
    }
}

fn escaped_display(content: &str, settings: &Settings) -> String {
    html_escape::encode_text(&presenter::render(content, settings)).into_owned()
}

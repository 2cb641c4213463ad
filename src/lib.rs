//! readtime - reading time estimates
//!
//! Estimates how long content takes to read and renders that estimate with
//! configurable display rules. The pure core lives in [`estimator`] and
//! [`presenter`]; [`service::ReadingTime`] wires it to a settings store for
//! embedding, and [`server`] exposes it over HTTP.

pub mod cli;
pub mod config;
pub mod constants;
pub mod content;
pub mod errors;
pub mod estimator;
pub mod presenter;
pub mod server;
pub mod service;
pub mod settings;
pub mod store;
pub mod templates;

pub use config::Config;
pub use content::{ContentItem, ContentSource, DirectorySource, MemorySource};
pub use errors::{ConfigError, ContentError, ReadtimeError, ServerError, StoreError, TemplateError};
pub use estimator::{Estimate, estimate};
pub use presenter::{place, render, should_display};
pub use service::ReadingTime;
pub use settings::{DisplayPosition, DisplayTemplate, Settings, SettingsInput};
pub use store::{JsonFileStore, MemoryStore, SettingsStore};

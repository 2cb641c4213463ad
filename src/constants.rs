//! Shared constants used across multiple modules.

use std::num::NonZeroUsize;

/// Average reading speed for reading time estimates.
pub const DEFAULT_WORDS_PER_MINUTE: NonZeroUsize = NonZeroUsize::new(200).unwrap();

/// The marker in a display template that receives the minute count.
pub const MINUTES_PLACEHOLDER: &str = "{minutes}";

/// Placeholder accepted from older settings and rewritten to [`MINUTES_PLACEHOLDER`].
pub const LEGACY_PLACEHOLDER: &str = "%s";

/// Display template used when none is configured or the configured one is unusable.
pub const DEFAULT_DISPLAY_TEMPLATE: &str = "Reading time: {minutes} min";

/// Content category that gets automatic display out of the box.
pub const DEFAULT_CATEGORY: &str = "post";

/// CSS class of the container wrapped around a placed estimate.
pub const WRAPPER_CLASS: &str = "reading-time-estimate";

/// URL path the stylesheet is served from.
pub const STYLESHEET_PATH: &str = "/assets/style.css";

/// Stylesheet for the estimate wrapper.
pub const STYLESHEET: &str = include_str!("../assets/style.css");

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 5300;

/// Directory holding per-site configuration and saved settings.
pub const SITE_DIR: &str = ".readtime";

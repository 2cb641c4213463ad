//! Formatting and placement of a reading time estimate.
//!
//! These are the display rules: fill the template, decide whether an item
//! gets an automatic estimate, and splice the wrapped estimate into content.
//! Nothing here escapes HTML; the caller at the rendering boundary does.

use crate::constants::WRAPPER_CLASS;
use crate::estimator;
use crate::settings::{DisplayPosition, Settings};

/// Estimates `content` and fills the display template with the minute count.
pub fn render(content: &str, settings: &Settings) -> String {
    let minutes = estimator::estimate(content, settings.words_per_minute);
    settings.display_template.fill(minutes)
}

/// Whether an estimate is automatically inserted into a content body.
///
/// All three must hold: a single item is being viewed, display is enabled,
/// and the item's category is eligible.
pub fn should_display(category: &str, settings: &Settings, is_single_item_view: bool) -> bool {
    is_single_item_view && settings.display_enabled && settings.is_eligible(category)
}

/// Wraps `display` in the estimate container.
pub fn wrap(display: &str) -> String {
    format!(r#"<div class="{WRAPPER_CLASS}">{display}</div>"#)
}

/// Puts the wrapped `display` before or after `original`.
pub fn place(original: &str, display: &str, position: DisplayPosition) -> String {
    let wrapped = wrap(display);
    match position {
        DisplayPosition::Top => format!("{wrapped}{original}"),
        DisplayPosition::Bottom => format!("{original}{wrapped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsInput;
    use std::collections::BTreeSet;

    #[test]
    fn test_render_default_template() {
        let content = vec!["word"; 450].join(" ");
        assert_eq!(render(&content, &Settings::default()), "Reading time: 3 min");
    }

    #[test]
    fn test_render_custom_template_and_rate() {
        let settings = SettingsInput {
            words_per_minute: Some(2),
            display_template: Some("⏱ {minutes} minutes to read".to_string()),
            ..Default::default()
        }
        .normalize();
        assert_eq!(render("one two three four five", &settings), "⏱ 3 minutes to read");
    }

    #[test]
    fn test_render_contains_minutes_once() {
        let settings = SettingsInput {
            display_template: Some("Takes {minutes}".to_string()),
            ..Default::default()
        }
        .normalize();
        let output = render("short", &settings);
        assert_eq!(output, "Takes 1");
        assert_eq!(output.matches('1').count(), 1);
    }

    #[test]
    fn test_render_does_not_escape() {
        let settings = SettingsInput {
            display_template: Some("Fish & {minutes} chips".to_string()),
            ..Default::default()
        }
        .normalize();
        assert_eq!(render("", &settings), "Fish & 1 chips");
    }

    #[test]
    fn test_should_display_requires_single_view() {
        let settings = Settings::default();
        assert!(should_display("post", &settings, true));
        assert!(!should_display("post", &settings, false));
    }

    #[test]
    fn test_should_display_requires_enabled() {
        let settings = Settings {
            display_enabled: false,
            ..Default::default()
        };
        assert!(!should_display("post", &settings, true));
    }

    #[test]
    fn test_should_display_requires_eligible_category() {
        let settings = Settings {
            eligible_content_categories: BTreeSet::from(["page".to_string()]),
            ..Default::default()
        };
        assert!(should_display("page", &settings, true));
        assert!(!should_display("post", &settings, true));
        assert!(!should_display("Page", &settings, true));
    }

    #[test]
    fn test_place_top() {
        assert_eq!(
            place("<p>Body</p>", "Reading time: 1 min", DisplayPosition::Top),
            r#"<div class="reading-time-estimate">Reading time: 1 min</div><p>Body</p>"#
        );
    }

    #[test]
    fn test_place_bottom() {
        assert_eq!(
            place("<p>Body</p>", "Reading time: 1 min", DisplayPosition::Bottom),
            r#"<p>Body</p><div class="reading-time-estimate">Reading time: 1 min</div>"#
        );
    }

    #[test]
    fn test_place_empty_original() {
        assert_eq!(place("", "x", DisplayPosition::Top), wrap("x"));
        assert_eq!(place("", "x", DisplayPosition::Bottom), wrap("x"));
    }
}

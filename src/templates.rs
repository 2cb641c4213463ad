use serde::Serialize;
use tera::{Context, Tera};

use crate::constants::STYLESHEET_PATH;
use crate::content::ContentItem;
use crate::errors::TemplateError;

/// A row on the index page.
#[derive(Debug, Clone, Serialize)]
pub struct IndexEntry {
    pub id: String,
    pub title: String,
    pub display: String,
}

#[derive(Clone)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        for (name, tpl) in DEFAULT_TEMPLATES.iter() {
            tera.add_raw_template(name, tpl)?;
        }
        Ok(Templates { tera })
    }

    /// Renders a full page for `item`. `body_html` is inserted unescaped.
    pub fn render_item(&self, item: &ContentItem, body_html: &str) -> Result<String, TemplateError> {
        let mut context = Context::new();
        context.insert("title", &item.title);
        context.insert("category", &item.category);
        context.insert("body", body_html);
        context.insert("stylesheet", STYLESHEET_PATH);
        self.render("page.html", &context)
    }

    pub fn render_index(&self, entries: &[IndexEntry]) -> Result<String, TemplateError> {
        let mut context = Context::new();
        context.insert("entries", entries);
        context.insert("stylesheet", STYLESHEET_PATH);
        self.render("index.html", &context)
    }

    fn render(&self, template_name: &str, context: &Context) -> Result<String, TemplateError> {
        self.tera
            .render(template_name, context)
            .map_err(|e| TemplateError::RenderFailed {
                template_name: template_name.to_string(),
                source: e,
            })
    }
}

const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("page.html", include_str!("../templates/page.html")),
    ("index.html", include_str!("../templates/index.html")),
];

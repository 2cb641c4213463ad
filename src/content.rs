//! Content items and where they come from.
//!
//! The on-demand query path looks items up by id through a [`ContentSource`].
//! [`DirectorySource`] serves a folder of markdown or HTML files, one item per
//! file, with optional YAML frontmatter:
//!
//! ```markdown
//! ---
//! title: Hello
//! category: page
//! ---
//!
//! Body text.
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pulldown_cmark::{Event, MetadataBlockKind, Options, Parser, Tag, TagEnd, html};
use serde::Serialize;
use walkdir::WalkDir;
use yaml_rust2::YamlLoader;

use crate::constants::DEFAULT_CATEGORY;
use crate::errors::ContentError;

/// A unit of text an estimate is computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentItem {
    pub id: String,
    pub category: String,
    pub title: String,
    pub body_html: String,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, category: impl Into<String>, body_html: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            category: category.into(),
            body_html: body_html.into(),
        }
    }

    /// Loads a single file, using its stem as the id.
    pub fn from_file(path: &Path) -> Result<Self, ContentError> {
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        load_item(id, path)
    }
}

/// Looks content items up by id.
pub trait ContentSource: Send + Sync {
    /// The item with this id, or `None` when there is none.
    fn get(&self, id: &str) -> Option<ContentItem>;

    /// All ids, sorted.
    fn ids(&self) -> Vec<String>;
}

/// Items held in memory, for embedding applications and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    items: BTreeMap<String, ContentItem>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, item: ContentItem) -> Self {
        self.insert(item);
        self
    }

    pub fn insert(&mut self, item: ContentItem) {
        self.items.insert(item.id.clone(), item);
    }
}

impl ContentSource for MemorySource {
    fn get(&self, id: &str) -> Option<ContentItem> {
        self.items.get(id).cloned()
    }

    fn ids(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }
}

/// Items backed by files under a root directory.
///
/// The id of `root/notes/intro.md` is `notes/intro`. Only the root and one
/// level of subdirectories are considered; hidden files and folders are
/// skipped.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirectorySource {
    pub fn new<P: Into<PathBuf>>(root: P, extensions: &[String]) -> Self {
        Self {
            root: root.into(),
            extensions: extensions.to_vec(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn id_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?.with_extension("");
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

impl ContentSource for DirectorySource {
    fn get(&self, id: &str) -> Option<ContentItem> {
        if !is_valid_id(id) {
            tracing::debug!("Rejected content id {id:?}");
            return None;
        }

        let path = self
            .extensions
            .iter()
            .map(|ext| self.root.join(format!("{id}.{ext}")))
            .find(|candidate| candidate.is_file())?;

        load_item(id.to_string(), &path)
            .inspect_err(|e| tracing::warn!("Skipping {}: {e}", path.display()))
            .ok()
    }

    fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(2)
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry.file_name().to_str().unwrap_or_default()))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| self.extensions.iter().any(|known| known == ext))
            })
            .filter_map(|entry| self.id_for(entry.path()))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Ids are relative, slash-separated, at most two segments deep, and never
/// climb out of the root.
fn is_valid_id(id: &str) -> bool {
    let segments: Vec<&str> = id.split('/').collect();
    !id.is_empty()
        && !id.contains('\\')
        && segments.len() <= 2
        && segments
            .iter()
            .all(|segment| !segment.is_empty() && !is_hidden(segment) && !segment.contains(':'))
}

fn load_item(id: String, path: &Path) -> Result<ContentItem, ContentError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ContentError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let is_html = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
    let (frontmatter, body_html) = if is_html {
        let (frontmatter, body) = split_frontmatter(&raw);
        (frontmatter.map(str::to_string), body.to_string())
    } else {
        render_markdown(&raw)
    };

    let mut category = DEFAULT_CATEGORY.to_string();
    let mut title = id.clone();

    if let Some(frontmatter) = frontmatter {
        let docs = YamlLoader::load_from_str(&frontmatter).map_err(|e| {
            ContentError::FrontmatterParseFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        if let Some(doc) = docs.first() {
            if let Some(value) = doc["category"].as_str() {
                category = value.trim().to_string();
            }
            if let Some(value) = doc["title"].as_str() {
                title = value.to_string();
            }
        }
    }

    Ok(ContentItem {
        id,
        category,
        title,
        body_html,
    })
}

/// Splits a leading `---` delimited block off an HTML file. Markdown files
/// get theirs from the parser instead.
fn split_frontmatter(raw: &str) -> (Option<&str>, &str) {
    let Some(rest) = raw
        .strip_prefix("---\n")
        .or_else(|| raw.strip_prefix("---\r\n"))
    else {
        return (None, raw);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, raw)
}

pub fn markdown_to_html(markdown: &str) -> String {
    render_markdown(markdown).1
}

/// Renders markdown to HTML, returning the YAML metadata block alongside.
fn render_markdown(markdown: &str) -> (Option<String>, String) {
    let mut frontmatter: Option<String> = None;
    let mut in_frontmatter = false;

    let parser = Parser::new_ext(markdown, Options::all()).inspect(|event| match event {
        Event::Start(Tag::MetadataBlock(MetadataBlockKind::YamlStyle)) => in_frontmatter = true,
        Event::End(TagEnd::MetadataBlock(_)) => in_frontmatter = false,
        Event::Text(text) if in_frontmatter => {
            frontmatter.get_or_insert_with(String::new).push_str(text)
        }
        _ => {}
    });

    let mut output = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut output, parser);
    (frontmatter, output)
}

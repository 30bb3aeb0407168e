use std::path::{Path, PathBuf};

use log::debug;

mod card;
mod error;
mod format;
mod id;
mod splice;
mod store;

pub(crate) use error::InsertError;
pub(crate) use splice::{ContainerSelector, DEFAULT_CONTAINER_ID};

/// Raw form fields for a new post card.
#[derive(Debug, Clone, Default)]
pub(crate) struct NewPostRequest {
    pub title: String,
    /// comma separated
    pub tags: String,
    pub description: String,
    pub read_time: String,
    pub date: String,
    pub file_name: String,
}

/// A request whose fields passed validation.
#[derive(Debug, Clone)]
pub(crate) struct PreparedPost {
    pub title: String,
    pub tags: Vec<String>,
    pub description: String,
    pub read_time: String,
    pub date: String,
    pub href: String,
}

/// Result handed back to the caller; never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InsertOutcome {
    pub success: bool,
    pub message: String,
}

#[derive(Debug)]
pub(crate) struct Inserted {
    pub id: String,
    pub backup: PathBuf,
}

pub(crate) fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn normalize_file_name(name: &str) -> String {
    if name.to_lowercase().ends_with(".html") {
        name.to_string()
    } else {
        format!("{name}.html")
    }
}

fn required<'a>(label: &str, value: &'a str) -> Result<&'a str, InsertError> {
    let value = value.trim();
    if value.is_empty() {
        Err(InsertError::Validation(format!("Please enter the {label}.")))
    } else {
        Ok(value)
    }
}

impl NewPostRequest {
    pub fn prepare(&self) -> Result<PreparedPost, InsertError> {
        let tags = split_tags(&self.tags);
        if tags.is_empty() {
            return Err(InsertError::Validation(
                "Please provide at least one tag.".to_string(),
            ));
        }
        Ok(PreparedPost {
            title: required("post title", &self.title)?.to_string(),
            tags,
            description: required("description", &self.description)?.to_string(),
            read_time: required("reading time", &self.read_time)?.to_string(),
            date: required("date", &self.date)?.to_string(),
            href: normalize_file_name(required("post HTML filename", &self.file_name)?),
        })
    }
}

/// Inserts a new post card as the first entry of the container in `path`.
pub(crate) fn try_insert_post(
    path: &Path,
    request: &NewPostRequest,
    container: &ContainerSelector,
) -> Result<Inserted, InsertError> {
    let post = request.prepare()?;
    let document = store::load_document(path)?;
    let target = splice::find_container(&document, container)?;

    let id = id::next_post_id(&document);
    debug!("Allocated {id} for {:?}", post.title);
    let entry = card::build_entry(&post, &id)?;
    splice::prepend_entry(&target, entry);

    let formatted = format::format_document(&document);
    let backup = store::save_document(path, &formatted)?;
    Ok(Inserted { id, backup })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Like [`try_insert_post`], with every failure folded into the outcome.
pub(crate) fn insert_post(
    path: &Path,
    request: &NewPostRequest,
    container: &ContainerSelector,
) -> InsertOutcome {
    match try_insert_post(path, request, container) {
        Ok(inserted) => InsertOutcome {
            success: true,
            message: format!(
                "Successfully added post '{}' ({}) to {}.\nBackup saved as {}",
                request.title.trim(),
                inserted.id,
                file_name(path),
                file_name(&inserted.backup),
            ),
        },
        Err(e) => InsertOutcome {
            success: false,
            message: e.to_string(),
        },
    }
}

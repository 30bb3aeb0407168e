use kuchikiki::NodeRef;
use log::{debug, warn};

use super::InsertError;

pub(crate) const DEFAULT_CONTAINER_ID: &str = "blogPosts";

/// Whitespace put in front of a new entry so the source stays readable.
const ENTRY_INDENT: &str = "\n      ";

/// Which element receives new entries.
#[derive(Debug, Clone)]
pub(crate) struct ContainerSelector {
    pub tag: String,
    pub id: String,
}

impl Default for ContainerSelector {
    fn default() -> Self {
        Self {
            tag: "main".to_string(),
            id: DEFAULT_CONTAINER_ID.to_string(),
        }
    }
}

impl ContainerSelector {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Finds `<tag id=..>`, or else the first `<tag>` in document order.
pub(super) fn find_container(
    document: &NodeRef,
    selector: &ContainerSelector,
) -> Result<NodeRef, InsertError> {
    let tag = &selector.tag;
    let id = &selector.id;
    let candidates: Vec<_> = document
        .select(tag)
        .map_err(|()| InsertError::Structural(format!("Invalid container tag: {tag:?}")))?
        .collect();

    if let Some(container) = candidates
        .iter()
        .find(|c| c.attributes.borrow().get("id") == Some(id.as_str()))
    {
        debug!("Found <{tag} id='{id}'>");
        return Ok(container.as_node().clone());
    }

    match candidates.first() {
        Some(container) => {
            warn!("Found <{tag}> tag but not specific id='{id}'. Inserting into first <{tag}>.");
            Ok(container.as_node().clone())
        }
        None => Err(InsertError::Structural(format!(
            "Could not find <{tag} id='{id}'> tag or <{tag}> tag."
        ))),
    }
}

/// Makes `entry` the first child of `container`.
pub(super) fn prepend_entry(container: &NodeRef, entry: NodeRef) {
    container.prepend(entry);
    container.prepend(NodeRef::new_text(ENTRY_INDENT));
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchikiki::traits::*;

    fn parse(html: &str) -> NodeRef {
        kuchikiki::parse_html().one(html)
    }

    fn id_of(node: &NodeRef) -> Option<String> {
        let element = node.as_element()?;
        let id = element.attributes.borrow().get("id").map(str::to_string);
        id
    }

    #[test]
    fn test_prefers_container_with_id() {
        let document = parse(r#"<main class="first"></main><main id="blogPosts"></main>"#);
        let container = find_container(&document, &ContainerSelector::default()).unwrap();
        assert_eq!(id_of(&container).as_deref(), Some("blogPosts"));
    }

    #[test]
    fn test_falls_back_to_first_main() {
        let document = parse(r#"<main id="one"></main><main id="two"></main>"#);
        let container = find_container(&document, &ContainerSelector::default()).unwrap();
        assert_eq!(id_of(&container).as_deref(), Some("one"));
    }

    #[test]
    fn test_custom_container_id() {
        let document = parse(r#"<main id="blogPosts"></main><main id="drafts"></main>"#);
        let container = find_container(&document, &ContainerSelector::with_id("drafts")).unwrap();
        assert_eq!(id_of(&container).as_deref(), Some("drafts"));
    }

    #[test]
    fn test_missing_container() {
        let document = parse(r#"<div id="blogPosts"></div>"#);
        let err = find_container(&document, &ContainerSelector::default()).unwrap_err();
        assert!(matches!(err, InsertError::Structural(_)));
    }

    #[test]
    fn test_prepend_keeps_siblings() {
        let document = parse(
            r#"<main id="blogPosts"><article id="post2"></article><article id="post1"></article></main>"#,
        );
        let container = find_container(&document, &ContainerSelector::default()).unwrap();
        let entry = parse(r#"<article id="post3"></article>"#)
            .select_first("article")
            .unwrap()
            .as_node()
            .clone();
        entry.detach();

        prepend_entry(&container, entry);

        let first = container.first_child().unwrap();
        assert_eq!(first.as_text().map(|t| t.borrow().clone()).as_deref(), Some(ENTRY_INDENT));
        let ids: Vec<_> = container.children().filter_map(|c| id_of(&c)).collect();
        assert_eq!(ids, ["post3", "post2", "post1"]);
    }
}

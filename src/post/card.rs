use kuchikiki::{traits::*, NodeRef};
use maud::{html, Markup};

use super::{InsertError, PreparedPost};

pub(super) fn render_card(post: &PreparedPost, id: &str) -> Markup {
    html! {
        article.post-card data-tags=(post.tags.join(", ")) data-date=(post.date) id=(id) {
            div.post-meta {
                span { (post.date) }
                span { "•" }
                span { (post.read_time) }
            }
            h2 { a href=(post.href) { (post.title) } }
            div.post-tags {
                @for tag in &post.tags {
                    span.tag data-tag=(tag.to_lowercase()) { (tag) }
                }
            }
            p.post-excerpt { (post.description) }
            a.read-more href=(post.href) {
                "Continue Reading "
                span.arrow { "→" }
            }
        }
    }
}

/// Renders the card and parses it into a detached `<article>` node.
pub(super) fn build_entry(post: &PreparedPost, id: &str) -> Result<NodeRef, InsertError> {
    let fragment = kuchikiki::parse_html().one(render_card(post, id).into_string());
    let article = fragment
        .select_first("article")
        .map_err(|()| InsertError::Parse("failed to build the new post element".to_string()))?;
    let entry = article.as_node().clone();
    entry.detach();
    Ok(entry)
}

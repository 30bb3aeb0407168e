use std::sync::OnceLock;

use kuchikiki::NodeRef;
use regex::Regex;

fn post_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^post(\d+)$").expect("post id pattern"))
}

/// Numeric suffix of an entry id like `post12`.
pub(super) fn post_number(id: &str) -> Option<u64> {
    post_id_pattern().captures(id)?.get(1)?.as_str().parse().ok()
}

/// Next free entry id: one past the largest `post<N>` among the articles.
pub(super) fn next_post_id(document: &NodeRef) -> String {
    let mut max_id = 0;
    for article in document.select("article[id]").into_iter().flatten() {
        let attributes = article.attributes.borrow();
        if let Some(n) = attributes.get("id").and_then(post_number) {
            max_id = max_id.max(n);
        }
    }
    format!("post{}", max_id + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchikiki::traits::*;

    fn parse(html: &str) -> NodeRef {
        kuchikiki::parse_html().one(html)
    }

    #[test]
    fn test_post_number() {
        assert_eq!(post_number("post7"), Some(7));
        assert_eq!(post_number("post007"), Some(7));
        assert_eq!(post_number("post"), None);
        assert_eq!(post_number("post1a"), None);
        assert_eq!(post_number("xpost1"), None);
        assert_eq!(post_number("post99999999999999999999999"), None);
    }

    #[test]
    fn test_first_id_without_entries() {
        let document = parse(r#"<main id="blogPosts"></main>"#);
        assert_eq!(next_post_id(&document), "post1");
    }

    #[test]
    fn test_next_after_highest() {
        let document = parse(
            r#"<main id="blogPosts">
                <article id="post2"></article>
                <article id="post5"></article>
                <article id="post1"></article>
            </main>"#,
        );
        assert_eq!(next_post_id(&document), "post6");
    }

    #[test]
    fn test_ignores_foreign_ids() {
        let document = parse(
            r#"<section id="post40"></section>
            <main id="blogPosts">
                <article id="postscript"></article>
                <article id="post3"></article>
                <article></article>
            </main>"#,
        );
        assert_eq!(next_post_id(&document), "post4");
    }
}

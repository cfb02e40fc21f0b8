use scraper::Html;

use super::{element_text, first_attr, first_text, sel, Post, ThreadPage};

// Containers used by the common forum engines (XenForo, phpBB, Discourse, vBulletin, blogs).
// The first one that matches anything wins.
const POST_SELECTORS: &[&str] = &[
    "div.post",
    "article",
    "div.message",
    "div.post-body",
    "div.forum-post",
    "div.comment",
];

const AUTHOR_SELECTORS: &[&str] = &["a.username", "span.author", "div.author"];

/// Thread page from generic forum markup. Never fails: unknown layouts give an empty post list.
pub fn extract(html: &str) -> ThreadPage {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let title = first_text(root, &sel("h1")).or_else(|| first_text(root, &sel("title")));

    let containers = POST_SELECTORS
        .iter()
        .map(|s| root.select(&sel(s)).collect::<Vec<_>>())
        .find(|found| !found.is_empty())
        .unwrap_or_default();

    let mut posts = Vec::new();
    for (idx, node) in containers.into_iter().enumerate() {
        let text = element_text(node);
        if text.is_empty() {
            continue;
        }
        let author = AUTHOR_SELECTORS.iter().find_map(|s| first_text(node, &sel(s)));
        posts.push(Post {
            id: format!("forum_{}", idx),
            author,
            date: first_attr(node, &sel("time[datetime]"), "datetime"),
            text,
        });
    }

    let opening = posts.first().cloned();
    ThreadPage { title, opening, posts }
}

use scraper::{ElementRef, Html};

use super::{element_text, first_attr, first_text, sel, Post, ThreadPage};
use crate::scrape::error::ExtractError;

// Bodies reddit shows in place of moderated or user-deleted comments.
const TOMBSTONES: &[&str] = &["[deleted]", "[removed]"];

/// Thread page from old.reddit.com markup.
pub fn extract(html: &str) -> Result<ThreadPage, ExtractError> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let area = root
        .select(&sel("div.commentarea"))
        .next()
        .ok_or(ExtractError::MissingStructure("div.commentarea"))?;

    let title = first_text(root, &sel("a.title"));
    let opening = root.select(&sel("#siteTable div.thing")).next().map(submission);

    let mut posts = Vec::new();
    for (idx, comment) in area.select(&sel("div.comment")).enumerate() {
        let entry = own_entry(comment);
        let text = first_text(entry, &sel("div.usertext-body")).unwrap_or_default();
        if text.is_empty() || TOMBSTONES.contains(&text.as_str()) {
            continue;
        }
        let id = comment
            .value()
            .attr("data-fullname")
            .map(str::to_string)
            .unwrap_or_else(|| format!("web_{}", idx));
        posts.push(Post {
            id,
            author: first_text(entry, &sel("a.author")),
            date: first_attr(entry, &sel("time[datetime]"), "datetime"),
            text,
        });
    }

    Ok(ThreadPage { title, opening, posts })
}

fn submission(thing: ElementRef<'_>) -> Post {
    let text = thing
        .select(&sel("div.expando div.usertext-body"))
        .next()
        .map(element_text)
        .unwrap_or_default();
    Post {
        id: thing.value().attr("data-fullname").unwrap_or("t3").to_string(),
        author: first_text(thing, &sel("a.author")),
        date: first_attr(thing, &sel("time[datetime]"), "datetime"),
        text,
    }
}

// A comment nests its replies under div.child; only the div.entry sibling belongs to it.
fn own_entry(comment: ElementRef<'_>) -> ElementRef<'_> {
    comment
        .children()
        .filter_map(ElementRef::wrap)
        .find(|c| c.value().classes().any(|cl| cl == "entry"))
        .unwrap_or(comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREAD: &str = r#"
    <html><body>
      <div id="siteTable" class="sitetable linklisting">
        <div class="thing id-t3_abc123 link self" data-fullname="t3_abc123">
          <div class="entry">
            <p class="title"><a class="title" href="/r/electricvehicles/comments/abc123/">Which home   charger?</a></p>
            <p class="tagline">submitted <time datetime="2025-03-01T10:00:00+00:00">1 day ago</time>
              by <a class="author">op_user</a></p>
            <div class="expando"><form><div class="usertext-body"><div class="md">
              <p>Choosing between Ohme and Zappi.</p>
            </div></div></form></div>
          </div>
        </div>
      </div>
      <div class="commentarea">
        <div class="sitetable nestedlisting" id="siteTable_t3_abc123">
          <div class="thing comment" data-fullname="t1_aaa">
            <div class="entry">
              <p class="tagline"><a class="author">alice</a>
                <time datetime="2025-03-01T11:00:00+00:00">x</time></p>
              <form><div class="usertext-body"><div class="md"><p>Hypervolt, works great with Octopus Go.</p></div></div></form>
            </div>
            <div class="child">
              <div class="thing comment" data-fullname="t1_bbb">
                <div class="entry">
                  <p class="tagline"><a class="author">bob</a></p>
                  <form><div class="usertext-body"><div class="md"><p>Agreed.</p></div></div></form>
                </div>
              </div>
            </div>
          </div>
          <div class="thing comment" data-fullname="t1_ccc">
            <div class="entry">
              <p class="tagline"><span>[deleted]</span></p>
              <form><div class="usertext-body"><div class="md"><p>[deleted]</p></div></div></form>
            </div>
            <div class="child">
              <div class="thing comment" data-fullname="t1_ddd">
                <div class="entry">
                  <p class="tagline"><a class="author">dave</a></p>
                  <form><div class="usertext-body"><div class="md"><p>Pod Point here.</p></div></div></form>
                </div>
              </div>
            </div>
          </div>
          <div class="thing comment">
            <div class="entry"><p class="tagline"><a class="author">erin</a></p>
              <form><div class="usertext-body"><div class="md"><p>Easee</p></div></div></form></div>
          </div>
        </div>
      </div>
    </body></html>
    "#;

    #[test]
    fn title_and_opening_post() {
        let page = extract(THREAD).unwrap();
        assert_eq!(page.title.as_deref(), Some("Which home charger?"));
        let op = page.opening.unwrap();
        assert_eq!(op.id, "t3_abc123");
        assert_eq!(op.author.as_deref(), Some("op_user"));
        assert_eq!(op.date.as_deref(), Some("2025-03-01T10:00:00+00:00"));
        assert_eq!(op.text, "Choosing between Ohme and Zappi.");
    }

    #[test]
    fn comments_in_document_order_without_tombstones() {
        let page = extract(THREAD).unwrap();
        let ids: Vec<&str> = page.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["t1_aaa", "t1_bbb", "t1_ddd", "web_4"]);

        let alice = &page.posts[0];
        assert_eq!(alice.author.as_deref(), Some("alice"));
        assert_eq!(alice.text, "Hypervolt, works great with Octopus Go.");
        assert_eq!(alice.date.as_deref(), Some("2025-03-01T11:00:00+00:00"));
    }

    #[test]
    fn deleted_parent_does_not_borrow_child_author() {
        let page = extract(THREAD).unwrap();
        let dave = page.posts.iter().find(|p| p.id == "t1_ddd").unwrap();
        assert_eq!(dave.author.as_deref(), Some("dave"));
        assert!(page.posts.iter().all(|p| p.text != "[deleted]"));
    }

    #[test]
    fn missing_comment_area_is_an_error() {
        let html = r#"<html><body><a class="title">Blocked</a><p>whoa there, pardner!</p></body></html>"#;
        let err = extract(html).unwrap_err();
        assert!(matches!(err, ExtractError::MissingStructure("div.commentarea")));
    }

    #[test]
    fn empty_comment_area_gives_no_posts() {
        let html = r#"<html><body><div class="commentarea"></div></body></html>"#;
        let page = extract(html).unwrap();
        assert!(page.title.is_none());
        assert!(page.opening.is_none());
        assert!(page.posts.is_empty());
    }
}

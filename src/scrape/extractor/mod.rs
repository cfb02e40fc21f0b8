use scraper::{ElementRef, Selector};

use super::classify::UrlKind;
use super::error::ExtractError;

mod forum;
mod reddit;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub author: Option<String>,
    pub date: Option<String>,
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThreadPage {
    pub title: Option<String>,
    pub opening: Option<Post>,
    pub posts: Vec<Post>,
}

pub fn extract(kind: UrlKind, html: &str) -> Result<ThreadPage, ExtractError> {
    match kind {
        UrlKind::Reddit => reddit::extract(html),
        UrlKind::Generic => Ok(forum::extract(html)),
    }
}

pub(crate) fn sel(s: &str) -> Selector {
    // selectors are compile-time literals; a parse failure is a typo caught by the tests
    Selector::parse(s).unwrap_or_else(|e| panic!("bad selector {s:?}: {e:?}"))
}

pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    let parts: Vec<&str> = el.text().map(str::trim).filter(|t| !t.is_empty()).collect();
    collapse_whitespace(&parts.join(" "))
}

pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .map(element_text)
        .find(|t| !t.is_empty())
}

pub(crate) fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    let node = scope.select(selector).next()?;
    let v = node.value().attr(attr)?.trim();
    if v.is_empty() { None } else { Some(v.to_string()) }
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    let mut buf = String::with_capacity(s.len());
    let mut in_ws = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !in_ws {
                if !buf.is_empty() { buf.push(' '); }
                in_ws = true;
            }
        } else {
            buf.push(ch);
            in_ws = false;
        }
    }
    buf.trim().to_string()
}

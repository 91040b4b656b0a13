//! News article pages.
//!
//! Titles come from Open Graph metadata, then the first heading, then the
//! document title. Body text prefers article paragraphs over main-content
//! paragraphs, falling back to the page description.

use herodex_shared::{HerodexError, Result};
use url::Url;

use crate::document::{Document, Query};
use crate::selectors::{
    ARTICLE_PARAGRAPH, HEADING, MAIN_PARAGRAPH, META_DESCRIPTION, OG_IMAGE, OG_TITLE, PAGE_TITLE,
};

/// Fields read from a single news page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsPage {
    pub title: String,
    pub content: Option<String>,
    pub image_url: Option<String>,
}

pub fn extract_news(doc: &Document, page_url: &Url) -> Result<NewsPage> {
    let title = meta_content(doc, &OG_TITLE)
        .or_else(|| element_text(doc, &HEADING))
        .or_else(|| element_text(doc, &PAGE_TITLE))
        .ok_or_else(|| HerodexError::parse(format!("no title found on {page_url}")))?;

    let content = paragraphs(doc, &ARTICLE_PARAGRAPH)
        .or_else(|| paragraphs(doc, &MAIN_PARAGRAPH))
        .or_else(|| meta_content(doc, &META_DESCRIPTION));

    let image_url = meta_content(doc, &OG_IMAGE)
        .and_then(|src| page_url.join(&src).ok())
        .map(String::from);

    Ok(NewsPage {
        title,
        content,
        image_url,
    })
}

fn meta_content(doc: &Document, query: &Query) -> Option<String> {
    doc.select(query)
        .into_iter()
        .filter_map(|meta| meta.attr("content"))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

fn element_text(doc: &Document, query: &Query) -> Option<String> {
    doc.first(query).map(|node| node.text()).filter(|t| !t.is_empty())
}

fn paragraphs(doc: &Document, query: &Query) -> Option<String> {
    let text = doc
        .select(query)
        .iter()
        .map(|p| p.text())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    (!text.is_empty()).then_some(text)
}

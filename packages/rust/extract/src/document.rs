//! Queryable document tree.
//!
//! Extractors only see [`Document`], [`Node`] and [`Query`]; the HTML parser
//! behind them stays an implementation detail of this module.

use herodex_shared::{HerodexError, Result};
use scraper::{ElementRef, Html, Selector};

/// A compiled element query (CSS selector syntax).
#[derive(Debug)]
pub struct Query(Selector);

impl Query {
    /// Compile a query, reporting invalid syntax as a parse error.
    pub fn new(css: &str) -> Result<Self> {
        Selector::parse(css)
            .map(Self)
            .map_err(|e| HerodexError::parse(format!("invalid selector '{css}': {e:?}")))
    }

    /// Compile a query known to be valid at build time.
    pub(crate) fn fixed(css: &str) -> Self {
        Self::new(css).expect("built-in selector must compile")
    }
}

/// An immutable parsed page.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse a full HTML document. Parsing is lenient and never fails.
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// All elements matching `query`, in document order.
    pub fn select(&self, query: &Query) -> Vec<Node<'_>> {
        self.html.select(&query.0).map(Node).collect()
    }

    /// First element matching `query`.
    pub fn first(&self, query: &Query) -> Option<Node<'_>> {
        self.html.select(&query.0).next().map(Node)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").finish_non_exhaustive()
    }
}

/// A borrowed element inside a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    /// Lower-case tag name.
    pub fn tag(&self) -> &'a str {
        self.0.value().name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    /// Whether the element carries an `id` or `class` attribute.
    pub fn has_identity(&self) -> bool {
        self.attr("id").is_some() || self.attr("class").is_some()
    }

    /// Semantic labels of the element (`alt`, then `title`), trimmed, non-empty.
    pub fn labels(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        let el = self.0;
        ["alt", "title"]
            .into_iter()
            .filter_map(move |name| el.value().attr(name))
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }

    /// Concatenated descendant text, trimmed.
    pub fn text(&self) -> String {
        self.0.text().collect::<String>().trim().to_string()
    }

    /// Descendants matching `query`, in document order.
    pub fn select(&self, query: &Query) -> Vec<Node<'a>> {
        self.0.select(&query.0).map(Node).collect()
    }

    /// First descendant matching `query`.
    pub fn first(&self, query: &Query) -> Option<Node<'a>> {
        self.0.select(&query.0).next().map(Node)
    }

    /// Whether any ancestor element matches `query`.
    pub fn is_within(&self, query: &Query) -> bool {
        self.0
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| query.0.matches(&ancestor))
    }

    /// Direct element children.
    pub fn children(&self) -> Vec<Node<'a>> {
        self.0.children().filter_map(ElementRef::wrap).map(Node).collect()
    }

    /// Direct element children with the given tag name.
    pub fn children_named(&self, tag: &str) -> Vec<Node<'a>> {
        self.children()
            .into_iter()
            .filter(|child| child.tag() == tag)
            .collect()
    }

    /// Text of the sibling node immediately after this element, if it is text.
    pub fn following_text(&self) -> Option<String> {
        self.0
            .next_sibling()
            .and_then(|sibling| sibling.value().as_text().map(|t| t.to_string()))
    }

    /// Table-cell column span, defaulting to 1.
    pub fn colspan(&self) -> usize {
        self.attr("colspan")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(1)
    }
}

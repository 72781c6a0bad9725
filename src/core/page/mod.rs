//! Page model: an ordered text tree (elements and text nodes), the user's selection,
//! and the per-request [`PageContext`] sent to the provider.

mod extract;
pub mod html;

use serde::{Deserialize, Serialize};

pub use extract::{extract_context, sanitized_text};
pub use html::{LoadedPage, PageError, PageSource, load, parse};

/// A node of the page tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

/// An element with a lowercase tag name, its attributes, and ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.with_child(Node::text(text))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    /// Concatenated text of all descendant text nodes, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        push_all_text(self, &mut out);
        out
    }

    /// First descendant element (self included) with the given tag, depth-first.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|child| match child {
            Node::Element(e) => e.find(tag),
            Node::Text(_) => None,
        })
    }

    /// All descendant elements (self included) with the given tag, depth-first.
    pub fn find_all<'a>(&'a self, tag: &str, out: &mut Vec<&'a Element>) {
        if self.tag == tag {
            out.push(self);
        }
        for child in &self.children {
            if let Node::Element(e) = child {
                e.find_all(tag, out);
            }
        }
    }
}

fn push_all_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => push_all_text(e, out),
        }
    }
}

/// A parsed page. The root is normally the `<html>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// The `<body>` element, or the root for fragments without one.
    pub fn body(&self) -> &Element {
        self.root.find("body").unwrap_or(&self.root)
    }

    pub fn title(&self) -> String {
        self.root
            .find("title")
            .map(|t| t.text_content().trim().to_string())
            .unwrap_or_default()
    }

    /// Content of `<meta name="description">`, or "".
    pub fn meta_description(&self) -> String {
        let mut metas = Vec::new();
        self.root.find_all("meta", &mut metas);
        metas
            .into_iter()
            .find(|m| {
                m.attr("name")
                    .is_some_and(|n| n.eq_ignore_ascii_case("description"))
            })
            .and_then(|m| m.attr("content"))
            .unwrap_or("")
            .to_string()
    }
}

/// The text the user selected and which of its exact occurrences in the page they selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub text: String,
    /// 0-based index among non-overlapping exact occurrences in the sanitized page text.
    pub occurrence: usize,
}

impl Selection {
    /// Selection of the first occurrence. Surrounding whitespace is trimmed.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.trim().to_string(),
            occurrence: 0,
        }
    }

    pub fn with_occurrence(mut self, occurrence: usize) -> Self {
        self.occurrence = occurrence;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Page data sent with each explanation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageContext {
    pub title: String,
    pub url: String,
    pub meta_description: String,
    pub selected_text: String,
    pub context_text: String,
}

impl PageContext {
    /// Build the context for `selection` from a parsed page.
    pub fn capture(
        document: &Document,
        url: &str,
        selection: &Selection,
        max_context_length: usize,
    ) -> Self {
        Self {
            title: document.title(),
            url: url.to_string(),
            meta_description: document.meta_description(),
            selected_text: selection.text.clone(),
            context_text: extract_context(selection, document, max_context_length),
        }
    }
}

/// Where the context of a continue-conversation prompt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextOrigin {
    /// Extracted fresh for this action.
    Live,
    /// The same context that was sent with the explain request.
    Cached,
}

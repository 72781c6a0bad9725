//! Context extraction: a bounded window of page text around the user's selection.
//!
//! Primary path: search the sanitized, whitespace-collapsed body text for the selection and
//! cut a window around it. Fallback (the selection spans nodes in a way the flattening altered):
//! walk text nodes and return the text of the nearest content container.

use super::{Document, Element, Node, Selection};

/// Subtrees dropped from the sanitized text.
const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "noscript", "svg", "canvas", "iframe", "object", "embed",
];

/// Parents whose text nodes the fallback walk ignores.
const FALLBACK_SKIP_TAGS: &[&str] = &["script", "style", "noscript", "svg", "canvas"];

const CONTAINER_TAGS: &[&str] = &["p", "article", "section", "main"];
const CONTAINER_DIV_CLASSES: &[&str] = &["content", "post", "article"];

const ELLIPSIS: &str = "...";

/// Extract up to `max_context_length` chars of page text around `selection`.
///
/// Returns "" for an empty selection or when nothing on the page contains it.
pub fn extract_context(
    selection: &Selection,
    document: &Document,
    max_context_length: usize,
) -> String {
    if selection.is_empty() {
        return String::new();
    }

    let text = sanitized_text(document);
    if let Some(window) = window_around(
        &text,
        &selection.text,
        selection.occurrence,
        max_context_length,
    ) {
        return window;
    }

    log::debug!(
        "Selection not found in flattened text ({} chars), walking text nodes",
        text.len()
    );
    match container_of(document.body(), &selection.text) {
        Some(container) => {
            let mut raw = String::new();
            push_content_text(container, NON_CONTENT_TAGS, &mut raw);
            collapse_whitespace(&raw)
                .chars()
                .take(max_context_length)
                .collect()
        }
        None => {
            log::debug!("No content container holds the selection; sending no context");
            String::new()
        }
    }
}

/// Body text without script/style/media subtrees, whitespace runs collapsed to one space.
pub fn sanitized_text(document: &Document) -> String {
    let mut raw = String::new();
    push_content_text(document.body(), NON_CONTENT_TAGS, &mut raw);
    collapse_whitespace(&raw)
}

fn push_content_text(el: &Element, skip: &[&str], out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if !skip.contains(&e.tag.as_str()) => {
                push_content_text(e, skip, out)
            }
            Node::Element(_) => {}
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Window around the `occurrence`-th match of `needle`, in chars.
///
/// The surrounding budget is `max_len - len(needle)`, split evenly left and right, so the
/// window body is at most `max(max_len, len(needle))` chars. Ellipses mark clamped sides.
fn window_around(text: &str, needle: &str, occurrence: usize, max_len: usize) -> Option<String> {
    let (byte_idx, _) = text.match_indices(needle).nth(occurrence)?;

    let chars: Vec<char> = text.chars().collect();
    let start = text[..byte_idx].chars().count();
    let needle_len = needle.chars().count();
    let half = max_len.saturating_sub(needle_len) / 2;

    let from = start.saturating_sub(half);
    let to = (start + needle_len + half).min(chars.len());

    let body: String = chars[from..to].iter().collect();
    let mut window = body.trim().to_string();
    if from > 0 {
        window.insert_str(0, ELLIPSIS);
    }
    if to < chars.len() {
        window.push_str(ELLIPSIS);
    }
    Some(window)
}

fn is_content_container(el: &Element) -> bool {
    CONTAINER_TAGS.contains(&el.tag.as_str())
        || (el.tag == "div" && CONTAINER_DIV_CLASSES.iter().any(|c| el.has_class(c)))
}

/// Nearest content container of the first eligible text node containing `needle`.
fn container_of<'a>(body: &'a Element, needle: &str) -> Option<&'a Element> {
    let mut ancestors = Vec::new();
    walk_text_nodes(body, needle, &mut ancestors)
}

fn walk_text_nodes<'a>(
    el: &'a Element,
    needle: &str,
    ancestors: &mut Vec<&'a Element>,
) -> Option<&'a Element> {
    ancestors.push(el);
    let skip_own_text = FALLBACK_SKIP_TAGS.contains(&el.tag.as_str());
    let mut found = None;
    for child in &el.children {
        found = match child {
            Node::Text(t) if !skip_own_text && t.contains(needle) => ancestors
                .iter()
                .rev()
                .find(|a| is_content_container(a))
                .copied(),
            Node::Text(_) => None,
            Node::Element(e) => walk_text_nodes(e, needle, ancestors),
        };
        if found.is_some() {
            break;
        }
    }
    ancestors.pop();
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: Element) -> Document {
        Document::new(Element::new("html").with_child(body))
    }

    fn paragraph_page(text: &str) -> Document {
        page(Element::new("body").with_child(Element::new("p").with_text(text)))
    }

    #[test]
    fn empty_selection_yields_empty_context() {
        let doc = paragraph_page("anything at all");
        assert_eq!(extract_context(&Selection::new(""), &doc, 1000), "");
    }

    #[test]
    fn sanitized_text_drops_scripts_and_collapses_whitespace() {
        let doc = page(
            Element::new("body")
                .with_text("  Intro\n\n ")
                .with_child(Element::new("script").with_text("var x = 1;"))
                .with_child(Element::new("style").with_text("p { color: red }"))
                .with_child(Element::new("svg").with_child(Element::new("text").with_text("logo")))
                .with_child(Element::new("p").with_text("Body\ttext  here ")),
        );
        assert_eq!(sanitized_text(&doc), "Intro Body text here");
    }

    #[test]
    fn whole_page_fits_without_ellipses() {
        let doc = paragraph_page("Short page about rust ownership.");
        let ctx = extract_context(&Selection::new("rust"), &doc, 1000);
        assert_eq!(ctx, "Short page about rust ownership.");
    }

    #[test]
    fn quantum_entanglement_window_is_marked_both_sides() {
        let doc = paragraph_page(
            "This long article carefully discusses quantum entanglement in depth for beginners.",
        );
        let ctx = extract_context(&Selection::new("quantum entanglement"), &doc, 20);
        assert_eq!(ctx, "...quantum entanglement...");
    }

    #[test]
    fn window_centers_on_selection() {
        let doc = paragraph_page("aaaaaaaaaa bbbbbbbbbb TARGET cccccccccc dddddddddd");
        let ctx = extract_context(&Selection::new("TARGET"), &doc, 16);
        // 10 chars of budget: 5 on each side.
        assert_eq!(ctx, "...bbbb TARGET cccc...");
    }

    #[test]
    fn selection_at_document_start_has_no_leading_ellipsis() {
        let doc = paragraph_page("Opening words of a much longer document that keeps going on and on.");
        let ctx = extract_context(&Selection::new("Opening"), &doc, 20);
        assert!(ctx.starts_with("Opening"));
        assert!(ctx.ends_with("..."));
    }

    #[test]
    fn selection_at_document_end_has_no_trailing_ellipsis() {
        let doc = paragraph_page("A much longer document that keeps going on and on until the end");
        let ctx = extract_context(&Selection::new("the end"), &doc, 20);
        assert!(ctx.starts_with("..."));
        assert!(ctx.ends_with("the end"));
    }

    #[test]
    fn window_respects_length_bound() {
        let text = "lorem ipsum dolor sit amet ".repeat(100);
        let doc = paragraph_page(&text);
        for (needle, max) in [("dolor", 200), ("sit amet lorem", 250), ("ipsum", 1000)] {
            let ctx = extract_context(&Selection::new(needle), &doc, max);
            assert!(ctx.contains(needle));
            assert!(
                ctx.chars().count() <= max + 6,
                "{} chars for max {}",
                ctx.chars().count(),
                max
            );
        }
    }

    #[test]
    fn selection_longer_than_budget_is_returned_whole() {
        let doc = paragraph_page("before the quite long selected sentence after");
        let ctx = extract_context(&Selection::new("the quite long selected sentence"), &doc, 10);
        assert_eq!(ctx, "...the quite long selected sentence...");
    }

    #[test]
    fn counts_chars_not_bytes() {
        let doc = paragraph_page("ééééé naïve café ééééé");
        let ctx = extract_context(&Selection::new("café"), &doc, 8);
        assert_eq!(ctx, "...e café é...");
    }

    #[test]
    fn occurrence_selects_later_match() {
        let doc = paragraph_page("alpha term one. filler filler filler filler. beta term two.");
        let first = extract_context(&Selection::new("term"), &doc, 16);
        let second = extract_context(&Selection::new("term").with_occurrence(1), &doc, 16);
        assert!(first.contains("alpha"));
        assert!(second.contains("beta"));
    }

    #[test]
    fn missing_occurrence_falls_back_to_container() {
        let doc = paragraph_page("only one term here");
        let ctx = extract_context(&Selection::new("term").with_occurrence(3), &doc, 1000);
        assert_eq!(ctx, "only one term here");
    }

    #[test]
    fn fallback_uses_nearest_container_text() {
        // The raw text node keeps a newline the flattened text collapses away.
        let doc = page(
            Element::new("body").with_child(
                Element::new("article")
                    .with_child(Element::new("h1").with_text("Title"))
                    .with_child(
                        Element::new("p").with_child(
                            Element::new("span").with_text("line one\nline two"),
                        ),
                    ),
            ),
        );
        let ctx = extract_context(&Selection::new("one\nline"), &doc, 1000);
        assert_eq!(ctx, "line one line two");
    }

    #[test]
    fn fallback_truncates_to_max_length() {
        let doc = page(
            Element::new("body").with_child(
                Element::new("div")
                    .with_attr("class", "post")
                    .with_text("first\n\nsecond third fourth fifth sixth"),
            ),
        );
        let ctx = extract_context(&Selection::new("first\n\nsecond"), &doc, 12);
        assert_eq!(ctx, "first second");
    }

    #[test]
    fn fallback_skips_script_text() {
        let doc = page(
            Element::new("body").with_child(
                Element::new("main").with_child(Element::new("script").with_text("a\n b")),
            ),
        );
        assert_eq!(extract_context(&Selection::new("a\n b"), &doc, 1000), "");
    }

    #[test]
    fn fallback_without_container_yields_empty() {
        let doc = page(Element::new("body").with_child(Element::new("div").with_text("x\n y")));
        assert_eq!(extract_context(&Selection::new("x\n y"), &doc, 1000), "");
    }

    #[test]
    fn not_found_anywhere_yields_empty() {
        let doc = paragraph_page("nothing relevant");
        assert_eq!(extract_context(&Selection::new("absent"), &doc, 1000), "");
    }
}

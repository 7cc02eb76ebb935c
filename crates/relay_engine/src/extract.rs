use relay_core::{Conversation, SelectorSet, SenderType, GLYPH_TEXT};
use relay_logging::relay_warn;
use scraper::{ElementRef, Html, Selector};

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str, selectors: &SelectorSet) -> Conversation;
}

/// Reads a conversation out of page markup using a platform's selector set:
/// - finds the `messageBox` container, or returns an empty conversation
/// - walks `message` bubbles inside it in document order
/// - drops bubbles whose `messageText` node has neither text nor child elements
/// - records [`GLYPH_TEXT`] for bubbles whose text node only holds elements.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectorExtractor;

impl Extractor for SelectorExtractor {
    fn extract(&self, html: &str, selectors: &SelectorSet) -> Conversation {
        let doc = Html::parse_document(html);
        extract_from(&doc, selectors)
    }
}

struct Compiled {
    message_box: Selector,
    message: Selector,
    message_text: Selector,
    admin: Selector,
    user: Selector,
}

impl Compiled {
    fn new(selectors: &SelectorSet) -> Option<Self> {
        Some(Self {
            message_box: parse(selectors.message_box)?,
            message: parse(selectors.message)?,
            message_text: parse(selectors.message_text)?,
            admin: parse(selectors.admin)?,
            user: parse(selectors.user)?,
        })
    }
}

fn parse(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(err) => {
            relay_warn!("Invalid selector {:?}: {:?}", selector, err);
            None
        }
    }
}

/// Extract from an already parsed document.
pub fn extract_from(doc: &Html, selectors: &SelectorSet) -> Conversation {
    let Some(compiled) = Compiled::new(selectors) else {
        return Conversation::new();
    };
    let Some(container) = doc.select(&compiled.message_box).next() else {
        return Conversation::new();
    };

    container
        .select(&compiled.message)
        .filter_map(|bubble| {
            let text = message_text(bubble, &compiled.message_text)?;
            Some((sender_type(bubble, &compiled), text))
        })
        .collect()
}

/// Whether `selector` matches anything in `html`. Invalid selectors never match.
pub fn selector_matches(html: &str, selector: &str) -> bool {
    let Some(sel) = parse(selector) else {
        return false;
    };
    let doc = Html::parse_document(html);
    let mut matches = doc.select(&sel);
    matches.next().is_some()
}

fn sender_type(bubble: ElementRef<'_>, compiled: &Compiled) -> SenderType {
    if bubble.select(&compiled.admin).next().is_some() {
        SenderType::Admin
    } else if bubble.select(&compiled.user).next().is_some() {
        SenderType::User
    } else {
        SenderType::Unspecified
    }
}

fn message_text(bubble: ElementRef<'_>, text_sel: &Selector) -> Option<String> {
    let node = bubble.select(text_sel).next()?;
    let visible = collapse_whitespace(node.text());
    if !visible.is_empty() {
        return Some(visible);
    }
    let has_elements = node.children().any(|child| child.value().is_element());
    has_elements.then(|| GLYPH_TEXT.to_string())
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for word in parts.flat_map(str::split_whitespace) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::collapse_whitespace;

    #[test]
    fn whitespace_runs_collapse_across_text_nodes() {
        let parts = ["  My order\n", "", "  is\tlate "];
        assert_eq!(collapse_whitespace(parts.into_iter()), "My order is late");
    }

    #[test]
    fn blank_text_collapses_to_empty() {
        assert_eq!(collapse_whitespace([" \n ", "\t"].into_iter()), "");
    }
}

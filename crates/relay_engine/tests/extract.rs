use pretty_assertions::assert_eq;
use proptest::prelude::*;
use relay_core::{Platform, SelectorSet, SenderType, SettleMode, GLYPH_TEXT};
use relay_engine::{selector_matches, Extractor, SelectorExtractor};

fn intercom() -> &'static SelectorSet {
    SelectorSet::for_platform(Platform::Intercom).unwrap()
}

fn bubble(marker: &str, inner: &str) -> String {
    format!(
        concat!(
            r#"<div class="conversation__bubble"><div class="{}">"#,
            r#"<div class="conversation__text">{}</div></div></div>"#
        ),
        marker, inner
    )
}

fn admin(text: &str) -> String {
    bubble("o__admin-comment", &format!("<p>{text}</p>"))
}

fn user(text: &str) -> String {
    bubble("o__user-comment", &format!("<p>{text}</p>"))
}

fn page(bubbles: &[String]) -> String {
    format!(
        r#"<html><body>
        <div class="conversation__stream">{}</div>
        <div class="composer-inbox conversation__text"><p>draft</p></div>
        </body></html>"#,
        bubbles.concat()
    )
}

#[test]
fn messages_come_back_in_document_order_with_sender_types() {
    let html = page(&[
        admin("Hello, how can we help?"),
        user("My order is late"),
        admin("Looking into it"),
    ]);
    let conversation = SelectorExtractor.extract(&html, intercom());
    let texts: Vec<_> = conversation.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["Hello, how can we help?", "My order is late", "Looking into it"]
    );
    assert_eq!(
        conversation.senders(),
        vec![SenderType::Admin, SenderType::User, SenderType::Admin]
    );
    // The composer paragraph lives outside the stream and is never a message.
    assert!(conversation.messages().iter().all(|m| m.text != "draft"));
}

#[test]
fn still_rendering_bubbles_are_excluded() {
    let html = page(&[
        admin("Hello, how can we help?"),
        user("My order is late"),
        // Bubble without a text node yet.
        r#"<div class="conversation__bubble"><div class="o__admin-comment"></div></div>"#
            .to_string(),
        // Text node present but empty.
        bubble("o__admin-comment", "<p>   </p>"),
    ]);
    let conversation = SelectorExtractor.extract(&html, intercom());
    assert_eq!(conversation.len(), 2);
    assert_eq!(
        conversation.senders(),
        vec![SenderType::Admin, SenderType::User]
    );
    let latest = conversation.latest_settled(SettleMode::AllSettled).unwrap();
    assert_eq!(latest.text, "My order is late");
}

#[test]
fn glyph_only_messages_get_the_sentinel_text() {
    let html = page(&[user(r#"<img src="thumbs-up.png">"#)]);
    let conversation = SelectorExtractor.extract(&html, intercom());
    assert_eq!(conversation.len(), 1);
    assert_eq!(conversation.messages()[0].text, GLYPH_TEXT);
}

#[test]
fn bubbles_without_markers_are_unspecified() {
    let html = page(&[bubble("o__note", "<p>Conversation assigned</p>")]);
    let conversation = SelectorExtractor.extract(&html, intercom());
    assert_eq!(conversation.senders(), vec![SenderType::Unspecified]);
}

#[test]
fn missing_container_yields_an_empty_conversation() {
    let html = format!("<html><body>{}</body></html>", user("orphan"));
    assert!(SelectorExtractor.extract(&html, intercom()).is_empty());
    assert!(SelectorExtractor.extract("", intercom()).is_empty());
}

#[test]
fn every_intercom_selector_parses() {
    let set = intercom();
    for role in relay_core::SelectorRole::ALL {
        assert!(
            scraper::Selector::parse(set.get(role)).is_ok(),
            "{role:?} selector does not parse"
        );
    }
    assert!(selector_matches(&page(&[]), set.message_box));
    assert!(!selector_matches(&page(&[]), "[[invalid"));
}

fn bubble_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,12}".prop_map(|t| admin(&t)),
        "[a-z]{1,12}".prop_map(|t| user(&t)),
        Just(bubble("o__user-comment", "<p></p>")),
        Just(r#"<div class="conversation__bubble"></div>"#.to_string()),
    ]
}

proptest! {
    #[test]
    fn extraction_is_idempotent_and_never_exceeds_bubble_count(
        bubbles in prop::collection::vec(bubble_strategy(), 0..12)
    ) {
        let html = page(&bubbles);
        let first = SelectorExtractor.extract(&html, intercom());
        let second = SelectorExtractor.extract(&html, intercom());
        prop_assert_eq!(&first, &second);
        prop_assert!(first.len() <= bubbles.len());
        let empty_bubbles = bubbles
            .iter()
            .filter(|b| !b.contains("</p>") || b.contains("<p></p>"))
            .count();
        prop_assert_eq!(first.len(), bubbles.len() - empty_bubbles);
        for (idx, message) in first.messages().iter().enumerate() {
            prop_assert_eq!(message.position, idx);
            prop_assert!(!message.text.is_empty());
        }
    }
}

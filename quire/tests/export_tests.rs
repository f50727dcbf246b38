//! Tests for the export event stream and its bundled sinks.

use pretty_assertions::assert_eq;
use quire::export::export_events;
use quire::selection::{Position, Selection};
use quire::{Event, EventLog, export_with_selection, parse};

#[test]
fn test_stream_shape_for_nested_markup() {
    let doc = parse(
        "<html><body><div class=\"section\" id=\"s1\"><p>Hi</p><!--note--></div></body></html>",
    );
    let body = doc.body().unwrap();

    let events = export_events(&doc, body);
    assert_eq!(
        events,
        vec![
            Event::Enter("body".into()),
            Event::Attribute {
                name: "class".into(),
                value: "section".into()
            },
            Event::Attribute {
                name: "id".into(),
                value: "s1".into()
            },
            Event::Enter("div".into()),
            Event::Enter("p".into()),
            Event::Text("Hi".into()),
            Event::Exit("p".into()),
            Event::Comment("note".into()),
            Event::Exit("div".into()),
            Event::Exit("body".into()),
        ]
    );
}

#[test]
fn test_stream_is_deterministic() {
    let doc = parse(
        "<html><body><div class=\"section\"><p>a</p><p>b</p><!--c--></div></body></html>",
    );
    let body = doc.body().unwrap();
    assert_eq!(export_events(&doc, body), export_events(&doc, body));
}

#[test]
fn test_enter_exit_pairs_match_element_count() {
    let doc = parse(
        "<html><body><div class=\"section\"><div class=\"title\"><p>t</p></div><p>x</p></div></body></html>",
    );
    let body = doc.body().unwrap();
    let elements = doc
        .descendants(body)
        .filter(|&id| doc.is_element(id))
        .count();

    let events = export_events(&doc, body);
    let enters = events
        .iter()
        .filter(|e| matches!(e, Event::Enter(_)))
        .count();
    let exits = events.iter().filter(|e| matches!(e, Event::Exit(_))).count();
    assert_eq!(enters, elements);
    assert_eq!(exits, elements);
}

#[test]
fn test_anchor_and_focus_annotation() {
    let mut doc = parse("<html><body><p>alpha</p><p>omega</p></body></html>");
    let body = doc.body().unwrap();
    let first = doc.child_at(body, 0).unwrap();
    let second = doc.child_at(body, 1).unwrap();
    let first_text = doc.first_child(first).unwrap();
    let second_text = doc.first_child(second).unwrap();
    doc.set_selection(Selection::new(
        Position::new(first_text, 2),
        Position::new(second_text, 4),
    ));

    let mut log = EventLog::default();
    export_with_selection(&doc, body, &mut log);
    assert_eq!(
        log.events,
        vec![
            Event::Enter("body".into()),
            Event::Enter("p".into()),
            Event::Text("alpha".into()),
            Event::Anchor(2),
            Event::Exit("p".into()),
            Event::Enter("p".into()),
            Event::Text("omega".into()),
            Event::Focus(4),
            Event::Exit("p".into()),
            Event::Exit("body".into()),
        ]
    );
}

#[test]
fn test_collapsed_selection_annotates_one_text_node() {
    let mut doc = parse("<html><body><p>word</p></body></html>");
    let body = doc.body().unwrap();
    let p = doc.first_child(body).unwrap();
    let text = doc.first_child(p).unwrap();
    doc.set_caret(Position::new(text, 3));

    let mut log = EventLog::default();
    export_with_selection(&doc, body, &mut log);
    assert_eq!(
        log.events,
        vec![
            Event::Enter("body".into()),
            Event::Enter("p".into()),
            Event::Text("word".into()),
            Event::Anchor(3),
            Event::Focus(3),
            Event::Exit("p".into()),
            Event::Exit("body".into()),
        ]
    );
}

#[test]
fn test_plain_export_carries_no_annotation() {
    let mut doc = parse("<html><body><p>word</p></body></html>");
    let body = doc.body().unwrap();
    let p = doc.first_child(body).unwrap();
    let text = doc.first_child(p).unwrap();
    doc.set_caret(Position::new(text, 3));

    let events = export_events(&doc, body);
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, Event::Anchor(_) | Event::Focus(_)))
    );
}

#[test]
fn test_markup_round_trip_with_escaping() {
    let doc = parse("<html><body><p>a &amp; b &lt; c</p></body></html>");
    assert_eq!(doc.to_markup(), "<body><p>a &amp; b &lt; c</p></body>");
}

#[test]
fn test_markup_round_trip_attributes_and_comments() {
    let doc = parse(
        "<html><body><div class=\"section\" title=\"a &quot;b&quot;\"><!--note--><br></div></body></html>",
    );
    assert_eq!(
        doc.to_markup(),
        "<body><div class=\"section\" title=\"a &quot;b&quot;\"><!--note--><br></div></body>"
    );
}

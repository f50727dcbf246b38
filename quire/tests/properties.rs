//! Property tests over generated trees: export balance and determinism,
//! address round-trips.

use proptest::prelude::*;
use quire::export::export_events;
use quire::path::address_of;
use quire::{Document, Event, NodeId, parse};

/// Tree blueprint the strategies generate; materialized into a document
/// through the same mutation primitives the engine uses.
#[derive(Debug, Clone)]
enum NodeSpec {
    Text(String),
    Comment(String),
    Element {
        tag: String,
        class: Option<String>,
        children: Vec<NodeSpec>,
    },
}

fn node_strategy() -> impl Strategy<Value = NodeSpec> {
    let leaf = prop_oneof![
        2 => "[a-z ]{1,12}".prop_map(NodeSpec::Text),
        1 => "[a-z]{1,8}".prop_map(NodeSpec::Comment),
    ];
    leaf.prop_recursive(3, 20, 4, |inner| {
        (
            prop_oneof![
                Just("p".to_string()),
                Just("div".to_string()),
                Just("em".to_string()),
            ],
            proptest::option::of(prop_oneof![
                Just("section".to_string()),
                Just("title".to_string()),
            ]),
            proptest::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, class, children)| NodeSpec::Element {
                tag,
                class,
                children,
            })
    })
}

fn forest_strategy() -> impl Strategy<Value = Vec<NodeSpec>> {
    proptest::collection::vec(node_strategy(), 0..4)
}

fn build(doc: &mut Document, parent: NodeId, spec: &NodeSpec) {
    match spec {
        NodeSpec::Text(t) => {
            let id = doc.create_text(t);
            doc.append_child(parent, id);
        }
        NodeSpec::Comment(c) => {
            let id = doc.create_comment(c);
            doc.append_child(parent, id);
        }
        NodeSpec::Element {
            tag,
            class,
            children,
        } => {
            let id = doc.create_element(tag);
            if let Some(class) = class {
                doc.set_attr(id, "class", class);
            }
            doc.append_child(parent, id);
            for child in children {
                build(doc, id, child);
            }
        }
    }
}

fn materialize(forest: &[NodeSpec]) -> (Document, NodeId) {
    let mut doc = parse("<html><body></body></html>");
    let body = doc.body().expect("parse always yields a body");
    for spec in forest {
        build(&mut doc, body, spec);
    }
    (doc, body)
}

proptest! {
    #[test]
    fn export_stream_is_balanced(forest in forest_strategy()) {
        let (doc, body) = materialize(&forest);
        let elements = doc
            .descendants(body)
            .filter(|&id| doc.is_element(id))
            .count();

        let events = export_events(&doc, body);
        let mut depth = 0usize;
        let mut enters = 0usize;
        for event in &events {
            match event {
                Event::Enter(_) => {
                    depth += 1;
                    enters += 1;
                }
                Event::Exit(_) => {
                    prop_assert!(depth > 0, "exit without matching enter");
                    depth -= 1;
                }
                _ => {}
            }
        }
        prop_assert_eq!(depth, 0, "unclosed enter events");
        prop_assert_eq!(enters, elements);
    }

    #[test]
    fn export_is_deterministic(forest in forest_strategy()) {
        let (doc, body) = materialize(&forest);
        prop_assert_eq!(export_events(&doc, body), export_events(&doc, body));
    }

    #[test]
    fn addresses_round_trip(forest in forest_strategy()) {
        let (doc, body) = materialize(&forest);
        for id in doc.descendants(body) {
            let address = address_of(&doc, id);
            prop_assert!(address.is_some(), "every attached node has an address");
            if let Some(address) = address {
                prop_assert_eq!(address.resolve(&doc), Some(id));
            }
        }
    }
}

//! Reusable cells driven by a list binding, against fake views.

use std::cell::Cell;
use std::rc::Rc;

use symbiont_harness::{FakeLabel, FakeList, init_test_logging};
use symbiont_runtime::prelude::*;
use symbiont_runtime::{Rgba, Sectioned, SectionFallback};

#[derive(Clone, Debug, PartialEq)]
struct Message {
    body: String,
    unread: bool,
}

fn message(body: &str, unread: bool) -> Message {
    Message {
        body: body.into(),
        unread,
    }
}

/// One cell with a body label that turns red for unread messages.
fn message_cell(source: &Outlet<Message>, setups: &Rc<Cell<u32>>) -> (ReusableCell, FakeLabel) {
    let label = FakeLabel::new();
    let setups = Rc::clone(setups);
    let binding = Binding::builder("body")
        .source(source.reader())
        .view(label.clone())
        .apply(|view: &FakeLabel, m: &Message| {
            view.set_text(Some(m.body.clone()));
            if m.unread {
                view.set_text_color(Some(Rgba::new(0xff, 0, 0, 0xff)));
            }
        })
        .on_setup(move |_| setups.set(setups.get() + 1))
        .build();
    (ReusableCell::new("message").with_binding(binding), label)
}

#[test]
fn reuse_restores_baseline_before_next_row() {
    init_test_logging();
    let outlet = Outlet::with_values(vec![
        message("hello", true),
        message("lunch?", false),
        message("ping", true),
    ]);
    let setups = Rc::new(Cell::new(0));
    let (cell, label) = message_cell(&outlet, &setups);

    cell.prepare(IndexPath::row(0)).unwrap();
    assert_eq!(label.text().as_deref(), Some("hello"));
    assert!(label.detail().text_color.is_some());

    cell.prepare(IndexPath::row(1)).unwrap();
    assert_eq!(label.text().as_deref(), Some("lunch?"));
    assert_eq!(label.detail().text_color, None);

    cell.prepare(IndexPath::row(2)).unwrap();
    assert_eq!(label.text().as_deref(), Some("ping"));
    assert!(label.detail().text_color.is_some());
    assert_eq!(setups.get(), 1);
    assert_eq!(cell.address(), Some(IndexPath::row(2)));
}

#[test]
fn cell_address_change_pushes_z_with_single_setup() {
    let outlet = Outlet::with_values(vec![
        message("x", false),
        message("y", false),
        message("z", false),
    ]);
    let setups = Rc::new(Cell::new(0));
    let (cell, label) = message_cell(&outlet, &setups);

    cell.prepare(IndexPath::ORIGIN).unwrap();
    assert_eq!(label.text().as_deref(), Some("x"));
    cell.prepare(IndexPath::row(2)).unwrap();
    assert_eq!(label.text().as_deref(), Some("z"));
    assert_eq!(setups.get(), 1);
}

#[test]
fn row_past_end_leaves_label_at_baseline() {
    let outlet = Outlet::with_values(vec![message("only", true)]);
    let setups = Rc::new(Cell::new(0));
    let (cell, label) = message_cell(&outlet, &setups);

    cell.prepare(IndexPath::ORIGIN).unwrap();
    cell.prepare(IndexPath::row(5)).unwrap();
    assert_eq!(label.text(), None);
    assert_eq!(label.detail().text_color, None);
}

#[test]
fn cell_follows_later_sets() {
    let outlet = Outlet::with_values(vec![message("a", false), message("b", false)]);
    let setups = Rc::new(Cell::new(0));
    let (cell, label) = message_cell(&outlet, &setups);
    cell.prepare(IndexPath::row(1)).unwrap();

    outlet.set_all(vec![message("c", false), message("d", false)]);
    assert_eq!(label.text().as_deref(), Some("d"));
}

#[test]
fn list_dequeues_cells_per_row() {
    init_test_logging();
    let outlet = Outlet::with_values(vec![message("one", false), message("two", true)]);
    let host = Rc::new(FakeList::new());
    let list = ListBinding::builder("inbox")
        .source(outlet.reader().erased())
        .host(host.clone())
        .build();
    list.activate();
    assert_eq!(host.reloads(), vec![2]);

    let setups = Rc::new(Cell::new(0));
    let (cell, label) = message_cell(&outlet, &setups);
    for row in 0..list.row_count() {
        let prepared = list.dequeue(&cell, IndexPath::row(row)).unwrap();
        assert_eq!(prepared.address(), Some(IndexPath::row(row)));
    }
    assert_eq!(label.text().as_deref(), Some("two"));
    assert_eq!(setups.get(), 1);
}

#[test]
fn sectioned_cell_uses_nested_addressing() {
    let outlet = Outlet::with_values(vec![
        vec!["a".to_string(), "b".to_string()],
        vec!["c".to_string()],
    ]);
    let label = FakeLabel::new();
    let binding = Binding::builder("letter")
        .source(Sectioned::with_fallback(outlet.reader(), SectionFallback::FirstOfSection))
        .view(label.clone())
        .apply(|view: &FakeLabel, text: &String| view.set_text(Some(text.clone())))
        .build();
    let cell = ReusableCell::new("letter").with_binding(binding);

    cell.prepare(IndexPath::new(0, 1)).unwrap();
    assert_eq!(label.text().as_deref(), Some("b"));
    cell.prepare(IndexPath::new(1, 5)).unwrap();
    assert_eq!(label.text().as_deref(), Some("c"));
    cell.prepare(IndexPath::new(2, 0)).unwrap();
    assert_eq!(label.text(), None);
}

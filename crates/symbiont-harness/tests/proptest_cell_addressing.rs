//! Property-based tests for bindings driven through reusable cells.
//!
//! 1. After `prepare(at)` a label shows exactly the value at `at`, or its
//!    baseline when the address resolves to nothing.
//! 2. A later `set` on the source updates the label only when the current
//!    address resolves.
//! 3. Setup runs once no matter how often the cell is reused.

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use symbiont_core::resolve;
use symbiont_harness::FakeLabel;
use symbiont_runtime::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    Prepare(usize),
    Set(Vec<String>),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0usize..6).prop_map(Step::Prepare),
        proptest::collection::vec("[a-z]{1,4}", 0..5).prop_map(Step::Set),
    ]
}

proptest! {
    #[test]
    fn label_tracks_address_and_sets(
        initial in proptest::collection::vec("[a-z]{1,4}", 0..5),
        steps in proptest::collection::vec(step(), 1..24),
    ) {
        let outlet = Outlet::with_values(initial.clone());
        let label = FakeLabel::new();
        let setups = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&setups);
        let binding = Binding::builder("text")
            .source(outlet.reader())
            .view(label.clone())
            .apply(|view: &FakeLabel, text: &String| view.set_text(Some(text.clone())))
            .on_setup(move |_| counter.set(counter.get() + 1))
            .build();
        let cell = ReusableCell::new("row").with_binding(binding);

        let mut contents = initial;
        let mut address: Option<IndexPath> = None;
        let mut expected: Option<String> = None;
        for step in steps {
            match step {
                Step::Prepare(row) => {
                    let at = IndexPath::row(row);
                    prop_assert!(cell.prepare(at).is_ok());
                    address = Some(at);
                    expected = resolve(&contents, address).cloned();
                }
                Step::Set(values) => {
                    outlet.set_all(values.clone());
                    contents = values;
                    if let Some(value) = resolve(&contents, address) {
                        expected = Some(value.clone());
                    }
                }
            }
            prop_assert_eq!(label.text(), expected.clone());
        }
        prop_assert!(setups.get() <= 1);
        if address.is_some() {
            prop_assert_eq!(setups.get(), 1);
        }
    }
}

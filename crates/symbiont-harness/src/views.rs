#![forbid(unsafe_code)]

//! Fake toolkit views.
//!
//! Each fake is a cheap, cloneable handle to shared state, like a real
//! view reference. Every mutation is also appended to a write log so tests
//! can assert what a binding did, not just where it ended up.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use symbiont_runtime::{
    BaseAppearance, BoundView, ButtonAppearance, ControlState, DetailAppearance, Hideable,
    ImageAppearance, LabelAppearance, Rgba, ViewSnapshot,
};

/// The subtype-specific part of a fake view's state.
pub trait ViewDetail: Clone + Default + fmt::Debug + 'static {
    fn to_detail(&self) -> DetailAppearance;
    fn from_detail(detail: &DetailAppearance) -> Option<Self>;
}

/// Detail of a view with nothing beyond the base properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plain;

impl ViewDetail for Plain {
    fn to_detail(&self) -> DetailAppearance {
        DetailAppearance::Plain
    }

    fn from_detail(detail: &DetailAppearance) -> Option<Self> {
        matches!(detail, DetailAppearance::Plain).then_some(Self)
    }
}

impl ViewDetail for LabelAppearance {
    fn to_detail(&self) -> DetailAppearance {
        DetailAppearance::Label(self.clone())
    }

    fn from_detail(detail: &DetailAppearance) -> Option<Self> {
        match detail {
            DetailAppearance::Label(label) => Some(label.clone()),
            _ => None,
        }
    }
}

impl ViewDetail for ImageAppearance {
    fn to_detail(&self) -> DetailAppearance {
        DetailAppearance::Image(self.clone())
    }

    fn from_detail(detail: &DetailAppearance) -> Option<Self> {
        match detail {
            DetailAppearance::Image(image) => Some(image.clone()),
            _ => None,
        }
    }
}

impl ViewDetail for ButtonAppearance {
    fn to_detail(&self) -> DetailAppearance {
        DetailAppearance::Button(self.clone())
    }

    fn from_detail(detail: &DetailAppearance) -> Option<Self> {
        match detail {
            DetailAppearance::Button(button) => Some(button.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct FakeState<D> {
    base: BaseAppearance,
    detail: D,
    subviews: Vec<FakeView>,
    writes: Vec<String>,
}

/// A fake view handle. Clones share the same view.
pub struct Fake<D> {
    state: Rc<RefCell<FakeState<D>>>,
}

pub type FakeView = Fake<Plain>;
pub type FakeLabel = Fake<LabelAppearance>;
pub type FakeImageView = Fake<ImageAppearance>;
pub type FakeButton = Fake<ButtonAppearance>;

impl<D> Clone for Fake<D> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for Fake<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Fake")
            .field("base", &state.base)
            .field("detail", &state.detail)
            .field("subviews", &state.subviews.len())
            .field("writes", &state.writes.len())
            .finish()
    }
}

impl<D: ViewDetail> Default for Fake<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ViewDetail> Fake<D> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(FakeState::default())),
        }
    }

    /// Whether two handles refer to the same view.
    #[must_use]
    pub fn same_view(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    #[must_use]
    pub fn base(&self) -> BaseAppearance {
        self.state.borrow().base.clone()
    }

    #[must_use]
    pub fn detail(&self) -> D {
        self.state.borrow().detail.clone()
    }

    pub fn update_base(&self, update: impl FnOnce(&mut BaseAppearance)) {
        let mut state = self.state.borrow_mut();
        update(&mut state.base);
        state.writes.push("base".into());
    }

    pub fn update_detail(&self, update: impl FnOnce(&mut D)) {
        let mut state = self.state.borrow_mut();
        update(&mut state.detail);
        state.writes.push("detail".into());
    }

    pub fn set_background(&self, color: Option<Rgba>) {
        self.record(format!("background={color:?}"), |state| state.base.background = color);
    }

    pub fn set_alpha(&self, alpha: f32) {
        self.record(format!("alpha={alpha}"), |state| state.base.alpha = alpha);
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.state.borrow().base.hidden
    }

    /// Everything written to this view, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<String> {
        self.state.borrow().writes.clone()
    }

    #[must_use]
    pub fn write_count(&self) -> usize {
        self.state.borrow().writes.len()
    }

    pub fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }

    /// Nest `child` inside this view. Snapshots cover subviews in the order
    /// they were added.
    pub fn add_subview(&self, child: FakeView) {
        self.state.borrow_mut().subviews.push(child);
    }

    #[must_use]
    pub fn subviews(&self) -> Vec<FakeView> {
        self.state.borrow().subviews.clone()
    }

    fn record(&self, entry: String, apply: impl FnOnce(&mut FakeState<D>)) {
        let mut state = self.state.borrow_mut();
        apply(&mut *state);
        state.writes.push(entry);
    }
}

impl Fake<LabelAppearance> {
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.state.borrow().detail.text.clone()
    }

    pub fn set_text(&self, text: Option<String>) {
        self.record(format!("text={text:?}"), |state| state.detail.text = text);
    }

    pub fn set_text_color(&self, color: Option<Rgba>) {
        self.record(format!("text_color={color:?}"), |state| {
            state.detail.text_color = color;
        });
    }
}

impl Fake<ImageAppearance> {
    #[must_use]
    pub fn image(&self) -> Option<String> {
        self.state.borrow().detail.image.clone()
    }

    pub fn set_image(&self, image: Option<String>) {
        self.record(format!("image={image:?}"), |state| state.detail.image = image);
    }
}

impl Fake<ButtonAppearance> {
    #[must_use]
    pub fn title(&self, control: ControlState) -> Option<String> {
        self.state.borrow().detail.title(control).map(String::from)
    }

    pub fn set_title(&self, control: ControlState, title: Option<String>) {
        self.record(format!("title[{control:?}]={title:?}"), |state| {
            state.detail.set_title(control, title);
        });
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.record(format!("enabled={enabled}"), |state| state.detail.enabled = enabled);
    }
}

impl<D: ViewDetail> BoundView for Fake<D> {
    fn snapshot(&self) -> Option<ViewSnapshot> {
        let children = self
            .subviews()
            .iter()
            .filter_map(BoundView::snapshot)
            .collect();
        let state = self.state.borrow();
        Some(ViewSnapshot {
            base: state.base.clone(),
            detail: state.detail.to_detail(),
            children,
        })
    }

    fn restore(&self, snapshot: &ViewSnapshot) {
        {
            let mut state = self.state.borrow_mut();
            state.base = snapshot.base.clone();
            if let Some(detail) = D::from_detail(&snapshot.detail) {
                state.detail = detail;
            }
            state.writes.push("restore".into());
        }
        for (child, saved) in self.subviews().iter().zip(&snapshot.children) {
            child.restore(saved);
        }
    }
}

impl<D: ViewDetail> Hideable for Fake<D> {
    fn set_hidden(&self, hidden: bool) {
        self.record(format!("hidden={hidden}"), |state| state.base.hidden = hidden);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let label = FakeLabel::new();
        let other = label.clone();
        other.set_text(Some("hi".into()));
        assert_eq!(label.text().as_deref(), Some("hi"));
        assert!(label.same_view(&other));
        assert!(!label.same_view(&FakeLabel::new()));
    }

    #[test]
    fn snapshot_round_trip_restores_detail_and_base() {
        let label = FakeLabel::new();
        label.set_text(Some("baseline".into()));
        let snapshot = label.snapshot().unwrap();

        label.set_text(Some("row 7".into()));
        label.set_background(Some(Rgba::BLACK));
        label.set_hidden(true);
        label.restore(&snapshot);

        assert_eq!(label.text().as_deref(), Some("baseline"));
        assert_eq!(label.base().background, None);
        assert!(!label.is_hidden());
        assert_eq!(label.writes().last().map(String::as_str), Some("restore"));
    }

    #[test]
    fn mismatched_detail_keeps_current_detail() {
        let image = FakeImageView::new();
        image.set_image(Some("cat.png".into()));
        image.restore(&ViewSnapshot::default());
        assert_eq!(image.image().as_deref(), Some("cat.png"));
    }

    #[test]
    fn button_titles_and_write_log() {
        let button = FakeButton::new();
        button.set_title(ControlState::Normal, Some("Buy".into()));
        button.set_enabled(false);
        assert_eq!(button.title(ControlState::Normal).as_deref(), Some("Buy"));
        assert_eq!(button.write_count(), 2);
        button.clear_writes();
        assert!(button.writes().is_empty());
    }

    #[test]
    fn restore_walks_subviews() {
        let card = FakeView::new();
        let badge = FakeView::new();
        card.add_subview(badge.clone());
        let snapshot = card.snapshot().unwrap();
        assert_eq!(snapshot.children.len(), 1);

        badge.set_background(Some(Rgba(0xff00_00ff)));
        badge.update_base(|base| base.hidden = true);
        card.restore(&snapshot);

        assert_eq!(badge.base().background, None);
        assert!(!badge.is_hidden());
        assert_eq!(badge.writes().last().map(String::as_str), Some("restore"));
    }

    #[test]
    fn plain_view_snapshot_is_plain() {
        let view = FakeView::new();
        view.set_alpha(0.5);
        let snapshot = view.snapshot().unwrap();
        assert_eq!(snapshot.detail, DetailAppearance::Plain);
        assert!((snapshot.base.alpha - 0.5).abs() < f32::EPSILON);
    }
}

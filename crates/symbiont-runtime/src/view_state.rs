#![forbid(unsafe_code)]

//! Captured view appearance for reusable cells.
//!
//! A [`ViewSnapshot`] records the visual properties a binding is likely to
//! overwrite, so a cell's views can be put back to their baseline before
//! they display a different row.

use std::fmt;

/// A packed `0xRRGGBBAA` colour.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const CLEAR: Self = Self(0x0000_0000);
    pub const BLACK: Self = Self(0x0000_00ff);
    pub const WHITE: Self = Self(0xffff_ffff);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    #[must_use]
    pub const fn alpha(self) -> u8 {
        (self.0 & 0xff) as u8
    }
}

impl fmt::Debug for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rgba(#{:08x})", self.0)
    }
}

/// How content is fitted into a view's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentMode {
    #[default]
    ScaleToFill,
    ScaleAspectFit,
    ScaleAspectFill,
    Center,
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAlignment {
    #[default]
    Natural,
    Left,
    Center,
    Right,
    Justified,
}

/// Interaction state a button can be styled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlState {
    Normal,
    Highlighted,
    Disabled,
    Selected,
}

impl ControlState {
    pub const ALL: [Self; 4] = [
        Self::Normal,
        Self::Highlighted,
        Self::Disabled,
        Self::Selected,
    ];

    const fn index(self) -> usize {
        match self {
            Self::Normal => 0,
            Self::Highlighted => 1,
            Self::Disabled => 2,
            Self::Selected => 3,
        }
    }
}

/// Properties every view has.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseAppearance {
    pub clips_to_bounds: bool,
    pub background: Option<Rgba>,
    pub alpha: f32,
    pub hidden: bool,
    pub content_mode: ContentMode,
    pub tint: Option<Rgba>,
    pub interaction_enabled: bool,
    pub corner_radius: f32,
    pub border_width: f32,
    pub border_color: Option<Rgba>,
}

impl Default for BaseAppearance {
    fn default() -> Self {
        Self {
            clips_to_bounds: false,
            background: None,
            alpha: 1.0,
            hidden: false,
            content_mode: ContentMode::default(),
            tint: None,
            interaction_enabled: true,
            corner_radius: 0.0,
            border_width: 0.0,
            border_color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelAppearance {
    pub text: Option<String>,
    pub text_color: Option<Rgba>,
    pub alignment: TextAlignment,
    pub line_count: usize,
    pub enabled: bool,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageAppearance {
    /// Opaque image identifier (asset name, URL, cache key).
    pub image: Option<String>,
    pub highlighted_image: Option<String>,
    pub highlighted: bool,
}

/// Per-state title and image of a button, plus its flags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ButtonAppearance {
    titles: [Option<String>; 4],
    images: [Option<String>; 4],
    pub enabled: bool,
    pub selected: bool,
    pub highlighted: bool,
}

impl ButtonAppearance {
    #[must_use]
    pub fn title(&self, state: ControlState) -> Option<&str> {
        self.titles[state.index()].as_deref()
    }

    pub fn set_title(&mut self, state: ControlState, title: Option<String>) {
        self.titles[state.index()] = title;
    }

    #[must_use]
    pub fn image(&self, state: ControlState) -> Option<&str> {
        self.images[state.index()].as_deref()
    }

    pub fn set_image(&mut self, state: ControlState, image: Option<String>) {
        self.images[state.index()] = image;
    }

    #[must_use]
    pub fn with_title(mut self, state: ControlState, title: impl Into<String>) -> Self {
        self.set_title(state, Some(title.into()));
        self
    }
}

/// Subtype-specific extras.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailAppearance {
    #[default]
    Plain,
    Label(LabelAppearance),
    Image(ImageAppearance),
    Button(ButtonAppearance),
}

/// Baseline appearance of one view, captured once and restored on reuse.
///
/// `children` holds the subviews' snapshots in subview order, for views
/// that capture their hierarchy.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewSnapshot {
    pub base: BaseAppearance,
    pub detail: DetailAppearance,
    pub children: Vec<ViewSnapshot>,
}

impl ViewSnapshot {
    #[must_use]
    pub fn plain(base: BaseAppearance) -> Self {
        Self {
            base,
            detail: DetailAppearance::Plain,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: DetailAppearance) -> Self {
        self.detail = detail;
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<ViewSnapshot>) -> Self {
        self.children = children;
        self
    }
}

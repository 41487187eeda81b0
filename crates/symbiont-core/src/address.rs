#![forbid(unsafe_code)]

//! Row addressing into outlet contents.
//!
//! An [`IndexPath`] names one logical position inside an outlet. Flat
//! contents are addressed by row within section 0; nested contents
//! (a sequence of sections) resolve the section first, then the row.
//!
//! # Invariants
//!
//! 1. An absent address (`None`) never resolves to a value.
//! 2. Flat resolution only succeeds for section 0.
//! 3. Nested resolution never indexes past the end of a section. A row past
//!    the end either falls back to the section's first element or yields
//!    `None`, depending on [`SectionFallback`].

use std::fmt;

/// A `(section, row)` locator into an outlet's current contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct IndexPath {
    pub section: usize,
    pub row: usize,
}

impl IndexPath {
    /// The default address: first row of the first section.
    pub const ORIGIN: Self = Self { section: 0, row: 0 };

    #[must_use]
    pub const fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }

    /// Address of `row` in section 0.
    #[must_use]
    pub const fn row(row: usize) -> Self {
        Self { section: 0, row }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.row)
    }
}

/// What nested resolution does when the row is past the end of a section
/// that does exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionFallback {
    /// Return the section's first element.
    #[default]
    FirstOfSection,
    /// Return `None`.
    Strict,
}

/// Resolve an address against flat contents.
///
/// Valid iff the address is present, its section is 0 and its row is in
/// range.
#[must_use]
pub fn resolve<T>(contents: &[T], at: Option<IndexPath>) -> Option<&T> {
    let at = at?;
    if at.section != 0 {
        return None;
    }
    contents.get(at.row)
}

/// Resolve an address against nested contents (a sequence of sections).
#[must_use]
pub fn resolve_nested<S, E>(
    sections: &[S],
    at: Option<IndexPath>,
    fallback: SectionFallback,
) -> Option<&E>
where
    S: AsRef<[E]>,
{
    let at = at?;
    let section = sections.get(at.section)?.as_ref();
    match section.get(at.row) {
        Some(value) => Some(value),
        None => match fallback {
            SectionFallback::FirstOfSection => section.first(),
            SectionFallback::Strict => None,
        },
    }
}

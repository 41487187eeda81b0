#![forbid(unsafe_code)]

//! Wiring errors: broken declarations detected at activation.
//!
//! These never describe missing *data*. Absent values travel as `Option`
//! through the data path; a `WiringError` means a binding, binding set or
//! list binding was declared without something it can never run without.

/// A structural configuration error found while activating a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WiringError {
    /// No outlet / value source was connected.
    MissingSource { component: String },
    /// No views were connected to a binding.
    MissingViews { component: String },
    /// A binding set finished its setup without associating any member.
    EmptyBindingSet { component: String },
    /// A list binding has no list view to drive.
    MissingListView { component: String },
    /// A picker binding has no picker view to drive.
    MissingPickerView { component: String },
}

impl WiringError {
    /// Name of the component that failed to activate.
    #[must_use]
    pub fn component(&self) -> &str {
        match self {
            Self::MissingSource { component }
            | Self::MissingViews { component }
            | Self::EmptyBindingSet { component }
            | Self::MissingListView { component }
            | Self::MissingPickerView { component } => component,
        }
    }
}

impl std::fmt::Display for WiringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSource { component } => {
                write!(f, "'{component}' does not have a data source connected")
            }
            Self::MissingViews { component } => {
                write!(f, "'{component}' does not have any views connected")
            }
            Self::EmptyBindingSet { component } => write!(
                f,
                "binding set '{component}' did not associate any bindings with views; \
                 its setup must call associate() at least once"
            ),
            Self::MissingListView { component } => {
                write!(f, "list binding '{component}' has no list view connected")
            }
            Self::MissingPickerView { component } => {
                write!(f, "picker binding '{component}' has no picker view connected")
            }
        }
    }
}

impl std::error::Error for WiringError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_component() {
        let err = WiringError::MissingSource {
            component: "title".into(),
        };
        assert_eq!(err.to_string(), "'title' does not have a data source connected");
        assert_eq!(err.component(), "title");
    }

    #[test]
    fn empty_set_message_mentions_associate() {
        let err = WiringError::EmptyBindingSet {
            component: "header".into(),
        };
        assert!(err.to_string().contains("associate()"));
    }

    #[test]
    fn is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(WiringError::MissingListView {
            component: "results".into(),
        });
        assert!(err.to_string().contains("results"));
    }

    #[test]
    fn picker_message_names_picker() {
        let err = WiringError::MissingPickerView {
            component: "sizes".into(),
        };
        assert_eq!(err.to_string(), "picker binding 'sizes' has no picker view connected");
        assert_eq!(err.component(), "sizes");
    }
}

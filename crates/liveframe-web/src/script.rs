//! Load state of an injected library script tag.
//!
//! A tag only fires `load` or `error` once, so whether a later caller may
//! wait on it depends on the state recorded on the tag.

/// Attribute holding the [`ScriptState`] of an injected tag.
pub const STATE_ATTR: &str = "data-liveframe-state";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptState {
    Loading,
    Loaded,
    Failed,
}

impl ScriptState {
    /// Read the state attribute. Tags without one were not injected by us.
    pub fn from_attr(value: Option<&str>) -> Option<Self> {
        match value? {
            "loading" => Some(Self::Loading),
            "loaded" => Some(Self::Loaded),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_attr(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Failed => "failed",
        }
    }

    /// Whether an existing tag will still fire `load` or `error`.
    ///
    /// Anything else is stale and gets replaced, since waiting on it would
    /// never finish.
    pub fn can_await(state: Option<Self>) -> bool {
        state == Some(Self::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_loading_tags_are_awaited() {
        assert!(ScriptState::can_await(ScriptState::from_attr(Some("loading"))));
        assert!(!ScriptState::can_await(ScriptState::from_attr(Some("failed"))));
        assert!(!ScriptState::can_await(ScriptState::from_attr(Some("loaded"))));
        assert!(!ScriptState::can_await(ScriptState::from_attr(None)));
        assert!(!ScriptState::can_await(ScriptState::from_attr(Some("bogus"))));
    }

    #[test]
    fn test_attr_names_parse_back() {
        for state in [ScriptState::Loading, ScriptState::Loaded, ScriptState::Failed] {
            assert_eq!(ScriptState::from_attr(Some(state.as_attr())), Some(state));
        }
    }
}

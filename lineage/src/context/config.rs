use std::env;

/// Settings for a [`ContextStore`](super::ContextStore).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Whether `set` without an explicit `linked_top` writes to the root
    /// of the current chain.
    pub linked_top: bool,
}

impl StoreConfig {
    /// Environment variable read by [`from_env`](Self::from_env).
    pub const LINKED_TOP_ENV: &'static str = "LINEAGE_LINKED_TOP";

    /// Reads settings from the process environment.
    ///
    /// `LINEAGE_LINKED_TOP` accepts `1`, `true`, `on` or `yes`
    /// (case-insensitive); anything else leaves linked-top disabled.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            linked_top: lookup(Self::LINKED_TOP_ENV)
                .map(|value| parse_flag(&value))
                .unwrap_or(false),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

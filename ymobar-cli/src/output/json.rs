//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;
use ymobar_core::UsageSnapshot;
use ymobar_store::ViewState;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a controller view state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateOutput<'a> {
    pub logged_in: bool,
    pub loading: bool,
    pub auto_login_attempted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<&'a UsageSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl<'a> From<&'a ViewState> for StateOutput<'a> {
    fn from(state: &'a ViewState) -> Self {
        Self {
            logged_in: state.is_logged_in,
            loading: state.is_loading,
            auto_login_attempted: state.auto_login_attempted,
            usage: state.data.as_ref(),
            error: state.error.as_deref(),
        }
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a controller view state.
    pub fn format_state(&self, state: &ViewState) -> Result<String> {
        self.format(&StateOutput::from(state))
    }
}

//! `prefs show` and `prefs set`.

use std::io::Write;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Requested preference changes; `None` leaves a field alone.
#[derive(Debug, Default)]
pub struct PrefsChange {
    pub default_location: Option<String>,
    pub strict: Option<bool>,
    pub sink_url: Option<String>,
}

pub fn show(state: &AppState, json: bool, out: &mut dyn Write) -> AppResult<()> {
    let prefs = state.prefs.get();

    if json {
        let text = serde_json::to_string_pretty(prefs)
            .map_err(|e| AppError::internal(e.to_string()))?;
        writeln!(out, "{}", text)?;
        return Ok(());
    }

    writeln!(out, "default location: {}", or_none(&prefs.default_location))?;
    writeln!(out, "strict mode:      {}", if prefs.strict { "on" } else { "off" })?;
    writeln!(out, "sink URL:         {}", or_none(&prefs.sink_url))?;
    Ok(())
}

/// Applies each requested change, saving after every one.
pub async fn set(state: &mut AppState, change: PrefsChange, out: &mut dyn Write) -> AppResult<()> {
    if change.default_location.is_none() && change.strict.is_none() && change.sink_url.is_none() {
        return Err(AppError::validation(
            "Nothing to change. Pass --default-location, --strict or --sink-url.",
        ));
    }

    if let Some(location) = change.default_location {
        state.prefs.set_default_location(&location).await?;
    }
    if let Some(strict) = change.strict {
        state.prefs.set_strict(strict).await?;
    }
    if let Some(url) = change.sink_url {
        state.prefs.set_sink_url(&url).await?;
    }

    writeln!(out, "Preferences saved.")?;
    show(state, false, out)
}

fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "(none)"
    } else {
        value
    }
}

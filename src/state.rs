//! Codespace state parsing.
//!
//! The `gh` CLI reports state as free text whose exact shape has shifted
//! across releases, so parsing runs through a small ordered chain of
//! matchers and falls back to `Unknown` rather than failing the caller.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a codespace, derived from CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SandboxState {
    /// Provisioning in progress.
    Creating,
    /// Ready for connections. The only terminal success state.
    Available,
    /// Shutting down.
    ShuttingDown,
    /// Stopped.
    Stopped,
    /// State could not be determined. Non-terminal; polling continues.
    #[default]
    Unknown,
}

impl SandboxState {
    /// Parses a single whitespace-delimited token into a state.
    ///
    /// Surrounding punctuation is stripped so table cells like
    /// `Available,` still match. Unrecognized tokens are `Unknown`.
    pub fn from_token(token: &str) -> Self {
        let word = token.trim_matches(|c: char| !c.is_ascii_alphanumeric());
        match word.to_ascii_lowercase().as_str() {
            "available" => SandboxState::Available,
            "creating" => SandboxState::Creating,
            "shutting" | "shuttingdown" => SandboxState::ShuttingDown,
            "stopped" => SandboxState::Stopped,
            _ => SandboxState::Unknown,
        }
    }
}

impl fmt::Display for SandboxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SandboxState::Creating => "Creating",
            SandboxState::Available => "Available",
            SandboxState::ShuttingDown => "ShuttingDown",
            SandboxState::Stopped => "Stopped",
            SandboxState::Unknown => "Unknown",
        };
        write!(f, "{}", label)
    }
}

/// Matches `state: Available` (any casing, optional spaces after the colon).
fn colon_form(line: &str) -> Option<&str> {
    let rest = &line[line.find("state:")? + "state:".len()..];
    rest.split_whitespace().next()
}

/// Matches `state Available` / `State   Available` (no colon).
fn bare_form(line: &str) -> Option<&str> {
    let rest = line[line.find("state")? + "state".len()..].trim_start();
    if rest.starts_with(':') {
        return None;
    }
    rest.split_whitespace().next()
}

/// Ordered matchers for the state field in `view` detail text.
/// Each is tried in turn on every line mentioning "state"; the first
/// one that yields a recognized state wins.
const STATE_MATCHERS: &[for<'a> fn(&'a str) -> Option<&'a str>] = &[colon_form, bare_form];

/// Extracts the codespace state from `view` detail text.
///
/// Scans line by line for a "state" token (case-insensitive) and runs
/// the matcher chain on it. Returns `Unknown` when nothing matches.
pub fn parse_detail_state(text: &str) -> SandboxState {
    for line in text.lines() {
        let lower = line.to_ascii_lowercase();
        if !lower.contains("state") {
            continue;
        }

        for matcher in STATE_MATCHERS {
            if let Some(token) = matcher(&lower) {
                let state = SandboxState::from_token(token);
                if state != SandboxState::Unknown {
                    return state;
                }
            }
        }
    }

    SandboxState::Unknown
}

/// One parsed row of `list` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// First whitespace-delimited field: the codespace name.
    pub name: String,
    /// The full source line, kept for state-keyword scans.
    pub line: String,
}

/// Parses tabular `list` output into entries, skipping blank lines,
/// `NAME` headers, and `---` separator rows.
pub fn parse_list_entries(text: &str) -> Vec<ListEntry> {
    text.lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("NAME") || trimmed.contains("---") {
                return None;
            }
            let name = trimmed.split_whitespace().next()?.to_string();
            Some(ListEntry {
                name,
                line: line.to_string(),
            })
        })
        .collect()
}

/// Selects a codespace name from `list` output.
///
/// Prefers the first entry whose line contains "available"
/// (case-insensitive); otherwise falls back to the first entry, which
/// the registry lists most-recently-created first. `None` when the
/// listing has no entries.
pub fn select_handle(text: &str) -> Option<String> {
    let entries = parse_list_entries(text);

    if let Some(entry) = entries
        .iter()
        .find(|e| e.line.to_ascii_lowercase().contains("available"))
    {
        return Some(entry.name.clone());
    }

    entries.into_iter().next().map(|e| e.name)
}

/// Scans `list` output for the state of the named codespace.
///
/// Fallback for `view` output that carries no recognizable state field.
pub fn scan_list_state(text: &str, name: &str) -> SandboxState {
    for entry in parse_list_entries(text) {
        if entry.name != name && !entry.line.contains(name) {
            continue;
        }

        for token in entry.line.split_whitespace() {
            let state = SandboxState::from_token(token);
            if state != SandboxState::Unknown {
                return state;
            }
        }
    }

    SandboxState::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_parsing_recognizes_known_states() {
        assert_eq!(SandboxState::from_token("Available"), SandboxState::Available);
        assert_eq!(SandboxState::from_token("creating"), SandboxState::Creating);
        assert_eq!(
            SandboxState::from_token("Shutting"),
            SandboxState::ShuttingDown
        );
        assert_eq!(SandboxState::from_token("STOPPED"), SandboxState::Stopped);
        assert_eq!(SandboxState::from_token("Queued"), SandboxState::Unknown);
    }

    #[test]
    fn token_parsing_strips_punctuation() {
        assert_eq!(
            SandboxState::from_token("Available,"),
            SandboxState::Available
        );
        assert_eq!(SandboxState::from_token("(creating)"), SandboxState::Creating);
    }

    #[test]
    fn detail_state_parses_colon_form() {
        assert_eq!(
            parse_detail_state("state: Creating"),
            SandboxState::Creating
        );
        assert_eq!(
            parse_detail_state("State: Available"),
            SandboxState::Available
        );
    }

    #[test]
    fn detail_state_parses_bare_form() {
        assert_eq!(parse_detail_state("State Creating"), SandboxState::Creating);
        assert_eq!(
            parse_detail_state("state   Creating"),
            SandboxState::Creating
        );
    }

    #[test]
    fn detail_state_scans_past_irrelevant_lines() {
        let text = "Name: acme-repo-abcd\nBranch: main\nState: Stopped\n";
        assert_eq!(parse_detail_state(text), SandboxState::Stopped);
    }

    #[test]
    fn detail_state_defaults_to_unknown() {
        assert_eq!(parse_detail_state(""), SandboxState::Unknown);
        assert_eq!(
            parse_detail_state("no status information here"),
            SandboxState::Unknown
        );
        assert_eq!(
            parse_detail_state("state: SomethingNew"),
            SandboxState::Unknown
        );
    }

    #[test]
    fn list_parsing_skips_headers_and_separators() {
        let text = "NAME  REPOSITORY  STATE\n----  ----------  -----\n\nbox-1  acme/repo  Creating\n";
        let entries = parse_list_entries(text);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "box-1");
    }

    #[test]
    fn select_handle_prefers_available_entry() {
        let text = "box-new  acme/repo  Creating\nbox-old  acme/repo  Available\n";
        assert_eq!(select_handle(text), Some("box-old".to_string()));
    }

    #[test]
    fn select_handle_falls_back_to_first_entry() {
        let text = "box-new  acme/repo  Creating\nbox-old  acme/repo  Stopped\n";
        assert_eq!(select_handle(text), Some("box-new".to_string()));
    }

    #[test]
    fn select_handle_returns_none_for_empty_listing() {
        assert_eq!(select_handle(""), None);
        assert_eq!(select_handle("NAME  STATE\n----  -----\n"), None);
    }

    #[test]
    fn list_scan_finds_state_for_named_entry() {
        let text = "other-box  acme/repo  Stopped\nbox-1  acme/repo  Available\n";
        assert_eq!(scan_list_state(text, "box-1"), SandboxState::Available);
        assert_eq!(scan_list_state(text, "other-box"), SandboxState::Stopped);
        assert_eq!(scan_list_state(text, "missing"), SandboxState::Unknown);
    }

    #[test]
    fn list_scan_ignores_name_lookalike_tokens() {
        let text = "available-tools-box  acme/repo  Creating\n";
        assert_eq!(
            scan_list_state(text, "available-tools-box"),
            SandboxState::Creating
        );
    }
}

use super::menu::reason_label;

/// The closed set of actions a conversation can request. Transport
/// payloads — slash text or legacy callback codes — are translated
/// into this type at the boundary; untyped strings never reach the
/// tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register,
    Help,
    StartWork { description: Option<String> },
    StopWork,
    TogglePause { reason: Option<String> },
    EndPause,
    PauseInfo,
    Today,
    Week,
    Status,
}

impl Command {
    /// Parse a slash-command line. Returns `None` for anything
    /// unrecognized.
    pub fn parse(input: &str) -> Option<Command> {
        let input = input.trim();
        let mut parts = input.splitn(2, char::is_whitespace);
        let head = parts.next()?;
        let rest = parts
            .next()
            .map(str::trim)
            .filter(|rest| !rest.is_empty())
            .map(str::to_string);

        match head {
            "/start" => Some(Command::Register),
            "/help" => Some(Command::Help),
            "/start_work" => Some(Command::StartWork { description: rest }),
            "/stop_work" => Some(Command::StopWork),
            "/pause" => Some(Command::TogglePause {
                reason: rest.map(expand_reason),
            }),
            "/end_pause" => Some(Command::EndPause),
            "/pause_info" => Some(Command::PauseInfo),
            "/today" => Some(Command::Today),
            "/week" => Some(Command::Week),
            "/status" => Some(Command::Status),
            _ => None,
        }
    }

    /// Translate a legacy string-prefixed callback code into a typed
    /// command. Unknown codes are rejected here, at the boundary.
    pub fn from_callback(data: &str) -> Option<Command> {
        if let Some(code) = data.strip_prefix("pause_reason:") {
            return match code {
                "none" => Some(Command::TogglePause { reason: None }),
                _ => reason_label(code).map(|label| Command::TogglePause {
                    reason: Some(label.to_string()),
                }),
            };
        }

        match data {
            "start_work" => Some(Command::StartWork { description: None }),
            "stop_work" => Some(Command::StopWork),
            "pause" => Some(Command::TogglePause { reason: None }),
            "pause_stop" => Some(Command::EndPause),
            "pause_info" => Some(Command::PauseInfo),
            "stats_today" => Some(Command::Today),
            "stats_week" => Some(Command::Week),
            "main_menu" => Some(Command::Status),
            "help" => Some(Command::Help),
            _ => None,
        }
    }
}

/// A canned code typed after `/pause` expands to its label; anything
/// else is kept verbatim as a free-text reason.
fn expand_reason(raw: String) -> String {
    reason_label(&raw)
        .map(str::to_string)
        .unwrap_or(raw)
}

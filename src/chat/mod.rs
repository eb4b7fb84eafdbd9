//! Conversation front-end: typed commands in, rendered replies out.
//! Every reply is produced after the underlying mutation has
//! committed; errors never escape this layer, they become replies.

mod command;
mod menu;
mod render;

pub use command::Command;
pub use menu::PAUSE_REASONS;

use chrono::Utc;
use log::{debug, error};

use crate::{
    config::Config,
    error::TrackerError,
    stats,
    tracker::{PauseToggle, Tracker, TrackerStatus},
};

use menu::reason_menu;
use render::{format_date, format_hours_minutes, format_minutes_seconds, format_time};

/// Caller identity as supplied by the transport alongside each update.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct ChatHandler {
    tracker: Tracker,
    config: Config,
}

impl ChatHandler {
    pub fn new(tracker: Tracker, config: Config) -> Self {
        Self { tracker, config }
    }

    pub async fn handle(&self, chat_id: i64, profile: &UserProfile, command: Command) -> String {
        match command {
            Command::Register => self.register(chat_id, profile).await,
            Command::Help => help_text(),
            Command::StartWork { description } => self.start_work(chat_id, description).await,
            Command::StopWork => self.stop_work(chat_id).await,
            Command::TogglePause { reason } => self.toggle_pause(chat_id, reason).await,
            Command::EndPause => self.end_pause(chat_id).await,
            Command::PauseInfo => self.pause_info(chat_id).await,
            Command::Today => self.today(chat_id).await,
            Command::Week => self.week(chat_id).await,
            Command::Status => self.status(chat_id).await,
        }
    }

    async fn register(&self, chat_id: i64, profile: &UserProfile) -> String {
        let is_admin = self.config.is_admin(chat_id);
        match self
            .tracker
            .register_or_update_user(
                chat_id,
                profile.username.clone(),
                profile.first_name.clone(),
                profile.last_name.clone(),
                is_admin,
            )
            .await
        {
            Ok(user) => format!(
                "Hi, {}! I track your work time.\n\n{}",
                user.display_name(),
                command_list()
            ),
            Err(err) => self.error_reply(err),
        }
    }

    async fn start_work(&self, chat_id: i64, description: Option<String>) -> String {
        match self.tracker.start_work_day(chat_id, description).await {
            Ok(session) => format!(
                "Work day started!\nTime: {}\nDate: {}\n\nUse /pause for a break and /stop_work to finish.",
                format_time(session.start_time),
                format_date(session.date)
            ),
            Err(TrackerError::AlreadyActive { started_at }) => format!(
                "Your work day is already running since {}.\nUse /stop_work to finish it.",
                format_time(started_at)
            ),
            Err(err) => self.error_reply(err),
        }
    }

    async fn stop_work(&self, chat_id: i64) -> String {
        let session = match self.tracker.stop_work_day(chat_id).await {
            Ok(session) => session,
            Err(err) => return self.error_reply(err),
        };

        match stats::session_stats(&session) {
            Ok(Some(day)) => format!(
                "Work day finished!\n\nStarted: {}\nFinished: {}\nWork time: {}\nBreaks: {}\nProductivity: {}%\n\nEnjoy your evening!",
                format_time(day.started_at),
                format_time(day.ended_at),
                format_hours_minutes(day.work_seconds),
                format_minutes_seconds(day.pause_seconds),
                day.productivity
            ),
            Ok(None) => "Work day finished!".to_string(),
            Err(err) => self.error_reply(err),
        }
    }

    async fn toggle_pause(&self, chat_id: i64, reason: Option<String>) -> String {
        match self.tracker.toggle_pause(chat_id, reason).await {
            Ok(PauseToggle::Opened(pause)) => {
                let mut reply = format!(
                    "Break started!\nReason: {}\nSince: {}\n\nSend /pause again to get back to work.",
                    pause.reason.as_deref().unwrap_or("not given"),
                    format_time(pause.start_time)
                );
                if pause.reason.is_none() {
                    reply.push_str("\n");
                    reply.push_str(&reason_menu());
                }
                reply
            }
            Ok(PauseToggle::Closed { pause, session }) => {
                let finished_breaks = match self.tracker.session_pauses(&session.id).await {
                    Ok(pauses) => pauses.iter().filter(|p| !p.is_active()).count(),
                    Err(err) => return self.error_reply(err),
                };
                format!(
                    "Break finished!\nDuration: {}\nReason: {}\n\nBreaks this session: {}\nTotal break time: {}\n\nBack to work!",
                    format_minutes_seconds(pause.duration_seconds().unwrap_or(0)),
                    pause.reason.as_deref().unwrap_or("not given"),
                    finished_breaks,
                    format_minutes_seconds(session.total_pause_seconds)
                )
            }
            Err(err) => self.error_reply(err),
        }
    }

    async fn end_pause(&self, chat_id: i64) -> String {
        match self.tracker.end_pause(chat_id).await {
            Ok(PauseToggle::Closed { pause, session }) => format!(
                "Break finished!\nDuration: {}\nTotal break time: {}\n\nBack to work!",
                format_minutes_seconds(pause.duration_seconds().unwrap_or(0)),
                format_minutes_seconds(session.total_pause_seconds)
            ),
            Ok(PauseToggle::Opened(_)) => {
                // end_pause never opens; keep the arm for completeness.
                "Break started.".to_string()
            }
            Err(err) => self.error_reply(err),
        }
    }

    async fn pause_info(&self, chat_id: i64) -> String {
        match self.tracker.active_pause(chat_id).await {
            Ok(Some(active)) => format!(
                "You are on a break.\nReason: {}\nSince: {}\nElapsed: {}\n\nBreak time this session: {}\n\nSend /pause to get back to work.",
                active.pause.reason.as_deref().unwrap_or("not given"),
                format_time(active.pause.start_time),
                format_minutes_seconds(active.elapsed_seconds),
                format_minutes_seconds(active.session.total_pause_seconds)
            ),
            Ok(None) => match self.tracker.status(chat_id).await {
                Ok(TrackerStatus::Idle) => {
                    "You have no active work day. Send /start_work to begin.".to_string()
                }
                Ok(_) => "You are not on a break right now.".to_string(),
                Err(err) => self.error_reply(err),
            },
            Err(err) => self.error_reply(err),
        }
    }

    async fn today(&self, chat_id: i64) -> String {
        let date = Utc::now().date_naive();
        match self.tracker.daily_stats(chat_id, date).await {
            Ok(day) => format!(
                "Statistics for {}:\nWork: {}\nBreaks: {}\nSessions: {}\nProductivity: {}%",
                format_date(date),
                format_hours_minutes(day.total_work_seconds),
                format_minutes_seconds(day.total_pause_seconds),
                day.sessions_count,
                day.productivity
            ),
            Err(err) => self.error_reply(err),
        }
    }

    async fn week(&self, chat_id: i64) -> String {
        let today = Utc::now().date_naive();
        let weekly = match self.tracker.weekly_stats(chat_id, today).await {
            Ok(weekly) => weekly,
            Err(err) => return self.error_reply(err),
        };

        if weekly.days.is_empty() {
            return "No completed sessions in the last 7 days.".to_string();
        }

        let mut lines = vec!["Statistics for the last 7 days:".to_string()];
        for day in &weekly.days {
            lines.push(format!(
                "{}: work {}, breaks {}, productivity {}%",
                format_date(day.date),
                format_hours_minutes(day.stats.total_work_seconds),
                format_minutes_seconds(day.stats.total_pause_seconds),
                day.stats.productivity
            ));
        }
        lines.push(String::new());
        lines.push(format!(
            "Total: work {}, breaks {}, sessions {}, productivity {}%",
            format_hours_minutes(weekly.totals.total_work_seconds),
            format_minutes_seconds(weekly.totals.total_pause_seconds),
            weekly.totals.sessions_count,
            weekly.totals.productivity
        ));
        lines.join("\n")
    }

    async fn status(&self, chat_id: i64) -> String {
        match self.tracker.status(chat_id).await {
            Ok(TrackerStatus::Idle) => {
                "You are not tracking right now. Send /start_work to begin.".to_string()
            }
            Ok(TrackerStatus::Working) => {
                "You are working. /pause for a break, /stop_work to finish.".to_string()
            }
            Ok(TrackerStatus::Paused) => {
                "You are on a break. Send /pause to get back to work.".to_string()
            }
            Err(err) => self.error_reply(err),
        }
    }

    fn error_reply(&self, err: TrackerError) -> String {
        if err.is_state_conflict() {
            debug!("State conflict: {err}");
        }
        match &err {
            TrackerError::NotRegistered(_) => {
                "You are not registered yet. Send /start first.".to_string()
            }
            TrackerError::AlreadyActive { started_at } => format!(
                "Your work day is already running since {}.",
                format_time(*started_at)
            ),
            TrackerError::NoActiveSession => {
                "You have no active work day. Send /start_work to begin.".to_string()
            }
            TrackerError::NoActivePause => "There is no break to finish.".to_string(),
            TrackerError::DataIntegrity { .. } => {
                error!("Statistics unavailable: {err}");
                "The stored records for this period look inconsistent; statistics are unavailable."
                    .to_string()
            }
            TrackerError::Storage(_) => {
                error!("Operation failed: {err}");
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

fn command_list() -> String {
    [
        "Commands:",
        "/start_work [description] - start the work day",
        "/stop_work - finish the work day",
        "/pause [reason] - start or end a break",
        "/pause_info - current break details",
        "/today - statistics for today",
        "/week - statistics for the last 7 days",
        "/status - what am I tracking right now",
        "/help - this help",
    ]
    .join("\n")
}

fn help_text() -> String {
    format!(
        "I record work sessions and breaks, and report your daily and weekly totals.\n\n{}\n\nStart with /start_work.",
        command_list()
    )
}

pub mod event;
pub mod ui;

use chrono::{Datelike, Local};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::api::PlannerClient;
use crate::checkin;
use crate::dates::{cycle_weekday, local_date_string, shift_hhmm};
use crate::models::{Personalization, Preferences, ScheduleData, StudyWindow};
use crate::store::ScheduleStore;
use crate::week::WeekState;

// ─── Chat transcript ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    You,
    Planner,
    /// Failure lines, rendered visibly distinct from normal replies.
    Error,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatKind {
    /// Typed by the user; a successful round trip refreshes the schedule.
    User,
    /// The automatic once-per-day trigger; failures only log.
    DailyCheckin,
}

// ─── Input focus ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Calendar,
    ChatInput,
}

// ─── Settings modal ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCol {
    Day,
    Start,
    End,
    Focus,
}

impl WindowCol {
    pub fn next(self) -> Self {
        match self {
            Self::Day => Self::Start,
            Self::Start => Self::End,
            Self::End => Self::Focus,
            Self::Focus => Self::Day,
        }
    }
}

/// The editable contents of the personalization modal: two time fields
/// followed by the study-window rows. `cursor` 0 and 1 are the awake/sleep
/// fields; `cursor` 2+i is window row i.
#[derive(Debug, Clone)]
pub struct SettingsForm {
    pub awake_time: String,
    pub sleep_time: String,
    pub windows: Vec<StudyWindow>,
    pub cursor: usize,
    pub col: WindowCol,
}

impl SettingsForm {
    pub fn from_data(preferences: Preferences, windows: Vec<StudyWindow>) -> Self {
        let windows = if windows.is_empty() {
            vec![StudyWindow::blank()]
        } else {
            windows
        };
        Self {
            awake_time: preferences.awake_time,
            sleep_time: preferences.sleep_time,
            windows,
            cursor: 0,
            col: WindowCol::Day,
        }
    }

    fn field_count(&self) -> usize {
        2 + self.windows.len()
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.field_count() {
            self.cursor += 1;
        }
    }

    /// Index of the window row under the cursor, if the cursor is on one.
    pub fn current_row(&self) -> Option<usize> {
        self.cursor.checked_sub(2)
    }

    pub fn next_col(&mut self) {
        if self.current_row().is_some() {
            self.col = self.col.next();
        }
    }

    pub fn add_row(&mut self) {
        self.windows.push(StudyWindow::blank());
        self.cursor = self.field_count() - 1;
        self.col = WindowCol::Day;
    }

    /// Remove the row under the cursor. Rows are independently removable;
    /// deleting the last one leaves an empty list, which is saveable.
    pub fn delete_row(&mut self) {
        if let Some(row) = self.current_row() {
            self.windows.remove(row);
            if self.cursor >= self.field_count() {
                self.cursor = self.field_count() - 1;
            }
        }
    }

    /// Step the field under the cursor: times move in half-hour increments,
    /// days and focus levels cycle.
    pub fn adjust(&mut self, delta: i32) {
        match self.current_row() {
            None if self.cursor == 0 => self.awake_time = shift_hhmm(&self.awake_time, delta * 30),
            None => self.sleep_time = shift_hhmm(&self.sleep_time, delta * 30),
            Some(row) => {
                let window = &mut self.windows[row];
                match self.col {
                    WindowCol::Day => window.day = cycle_weekday(&window.day, delta).to_string(),
                    WindowCol::Start => window.start_time = shift_hhmm(&window.start_time, delta * 30),
                    WindowCol::End => window.end_time = shift_hhmm(&window.end_time, delta * 30),
                    WindowCol::Focus => {
                        window.focus_level = if delta >= 0 {
                            window.focus_level.next()
                        } else {
                            window.focus_level.prev()
                        }
                    }
                }
            }
        }
    }

    pub fn payload(&self) -> Personalization {
        Personalization {
            preferences: Preferences {
                awake_time: self.awake_time.clone(),
                sleep_time: self.sleep_time.clone(),
            },
            study_windows: self.windows.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum SettingsState {
    #[default]
    Hidden,
    /// Fetching the current document to populate the form.
    Loading,
    Editing(SettingsForm),
    /// Save request in flight; the form is kept so a failure can reopen it.
    Saving(SettingsForm),
}

impl SettingsState {
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }
}

// ─── Background round-trip results ──────────────────────────────────────────

struct FetchOutcome {
    token: u64,
    result: Result<ScheduleData, String>,
}

struct ChatOutcome {
    kind: ChatKind,
    result: Result<Option<String>, String>,
}

struct SaveOutcome {
    result: Result<Option<String>, String>,
}

// ─── App state ──────────────────────────────────────────────────────────────

pub struct App {
    pub client: PlannerClient,
    pub running: bool,

    pub week: WeekState,
    pub store: ScheduleStore,

    pub focus: Focus,
    pub chat: Vec<ChatMessage>,
    pub chat_input: String,

    pub settings: SettingsState,
    pub show_upcoming: bool,

    pub status_message: String,
    pub loading: bool,
    pub needs_refresh: bool,

    // Monotonic refresh token; poll_refresh drops results from older
    // fetches so a stale slow response cannot clobber a fresher one.
    fetch_seq: u64,
    fetch_rx: Option<oneshot::Receiver<FetchOutcome>>,
    chat_rx: Option<oneshot::Receiver<ChatOutcome>>,
    settings_load_rx: Option<oneshot::Receiver<Result<ScheduleData, String>>>,
    settings_save_rx: Option<oneshot::Receiver<SaveOutcome>>,

    // Incremented each frame; drives the loading spinner.
    pub frame_count: u64,
}

impl App {
    pub fn new(client: PlannerClient) -> Self {
        Self {
            client,
            running: true,
            week: WeekState::new(Local::now().date_naive()),
            store: ScheduleStore::new(),
            focus: Focus::Calendar,
            chat: Vec::new(),
            chat_input: String::new(),
            settings: SettingsState::Hidden,
            show_upcoming: false,
            status_message: "Loading...".into(),
            loading: true,
            needs_refresh: false,
            fetch_seq: 0,
            fetch_rx: None,
            chat_rx: None,
            settings_load_rx: None,
            settings_save_rx: None,
            frame_count: 0,
        }
    }

    fn selected_year(&self) -> String {
        self.week.selected().year().to_string()
    }

    // ── Schedule refresh ────────────────────────────────────────────────

    /// Spawn a background fetch of the schedule document. Always issues a
    /// new request; any still-pending one keeps running but its result will
    /// carry a stale token and be dropped.
    pub fn start_refresh(&mut self) {
        self.fetch_seq += 1;
        let token = self.fetch_seq;
        let client = self.client.clone();
        let (tx, rx) = oneshot::channel();
        self.fetch_rx = Some(rx);
        self.loading = true;
        tokio::spawn(async move {
            let result = client.get_schedule().await.map_err(|e| e.to_string());
            let _ = tx.send(FetchOutcome { token, result });
        });
    }

    /// Check the refresh channel without blocking; apply the result when it
    /// is the latest one issued.
    pub fn poll_refresh(&mut self) {
        let outcome = match self.fetch_rx.as_mut() {
            None => return,
            Some(rx) => match rx.try_recv() {
                Ok(o) => o,
                Err(oneshot::error::TryRecvError::Empty) => return,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.fetch_rx = None;
                    return;
                }
            },
        };
        self.fetch_rx = None;

        if outcome.token != self.fetch_seq {
            debug!(
                token = outcome.token,
                latest = self.fetch_seq,
                "dropping stale refresh result"
            );
            return;
        }

        self.loading = false;
        match outcome.result {
            Ok(data) => {
                info!(
                    classes = data.schedule.len(),
                    tasks = data.tasks.len(),
                    plan = data.generated_plan.len(),
                    "schedule refreshed"
                );
                self.store.apply(data);
                let d = self.store.data();
                self.status_message = format!(
                    "Schedule loaded: {} classes, {} tasks, {} tests, {} plan blocks.",
                    d.schedule.len(),
                    d.tasks.len(),
                    d.tests.len(),
                    d.generated_plan.len()
                );
            }
            Err(e) => {
                warn!(error = %e, "schedule refresh failed");
                self.store.apply_error(e);
                self.status_message = "Could not fetch schedule data.".into();
            }
        }
    }

    // ── Chat ────────────────────────────────────────────────────────────

    /// Send the chat input buffer. Empty or whitespace-only input is a
    /// silent no-op: no request, transcript unchanged.
    pub fn submit_chat_input(&mut self) {
        let message = self.chat_input.trim().to_string();
        if message.is_empty() {
            return;
        }
        if self.chat_rx.is_some() {
            self.status_message = "Still waiting for the previous reply.".into();
            return;
        }

        self.chat.push(ChatMessage {
            speaker: Speaker::You,
            text: message.clone(),
        });
        self.chat_input.clear();
        self.spawn_chat(message, ChatKind::User);
    }

    fn spawn_chat(&mut self, message: String, kind: ChatKind) {
        let client = self.client.clone();
        let year = self.selected_year();
        let (tx, rx) = oneshot::channel();
        self.chat_rx = Some(rx);
        tokio::spawn(async move {
            let result = match client.send_chat(&message, &year).await {
                Ok(reply) => Ok(reply.reply),
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send(ChatOutcome { kind, result });
        });
    }

    pub fn poll_chat(&mut self) {
        let outcome = match self.chat_rx.as_mut() {
            None => return,
            Some(rx) => match rx.try_recv() {
                Ok(o) => o,
                Err(oneshot::error::TryRecvError::Empty) => return,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.chat_rx = None;
                    return;
                }
            },
        };
        self.chat_rx = None;

        match (outcome.kind, outcome.result) {
            (ChatKind::User, Ok(reply)) => {
                self.chat.push(ChatMessage {
                    speaker: Speaker::Planner,
                    text: reply.unwrap_or_else(|| "No reply received.".into()),
                });
                // The message may have mutated the schedule server-side.
                self.needs_refresh = true;
            }
            (ChatKind::User, Err(e)) => {
                warn!(error = %e, "chat round trip failed");
                self.chat.push(ChatMessage {
                    speaker: Speaker::Error,
                    text: "Error: Could not get reply from server.".into(),
                });
            }
            (ChatKind::DailyCheckin, Ok(reply)) => {
                self.chat.push(ChatMessage {
                    speaker: Speaker::Planner,
                    text: reply.unwrap_or_else(|| "...".into()),
                });
            }
            (ChatKind::DailyCheckin, Err(e)) => {
                warn!(error = %e, "daily check-in failed");
            }
        }
    }

    /// Fire the once-per-day check-in if it has not run today. The marker
    /// is recorded at trigger time, so a failed round trip is not retried
    /// until the next calendar day.
    pub fn maybe_daily_checkin(&mut self) {
        let today = local_date_string(Local::now().date_naive());
        if checkin::last_checkin().as_deref() == Some(today.as_str()) {
            return;
        }
        info!("first visit of the day, triggering daily check-in");
        self.spawn_chat("trigger:daily_checkin".into(), ChatKind::DailyCheckin);
        if let Err(e) = checkin::record_checkin(&today) {
            warn!(error = %e, "could not record check-in marker");
        }
    }

    // ── Settings modal ──────────────────────────────────────────────────

    /// Open the modal and fetch the current preferences to populate it.
    pub fn open_settings(&mut self) {
        self.settings = SettingsState::Loading;
        let client = self.client.clone();
        let (tx, rx) = oneshot::channel();
        self.settings_load_rx = Some(rx);
        tokio::spawn(async move {
            let result = client.get_schedule().await.map_err(|e| e.to_string());
            let _ = tx.send(result);
        });
    }

    pub fn poll_settings_load(&mut self) {
        let result = match self.settings_load_rx.as_mut() {
            None => return,
            Some(rx) => match rx.try_recv() {
                Ok(r) => r,
                Err(oneshot::error::TryRecvError::Empty) => return,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.settings_load_rx = None;
                    return;
                }
            },
        };
        self.settings_load_rx = None;

        // The user may have closed the modal while the load was in flight.
        if !matches!(self.settings, SettingsState::Loading) {
            return;
        }

        let form = match result {
            Ok(data) => SettingsForm::from_data(data.preferences, data.study_windows),
            Err(e) => {
                warn!(error = %e, "could not load personalization data");
                SettingsForm::from_data(Preferences::default(), Vec::new())
            }
        };
        self.settings = SettingsState::Editing(form);
    }

    pub fn close_settings(&mut self) {
        self.settings = SettingsState::Hidden;
    }

    /// Post the form contents to the server. The modal stays up (in the
    /// Saving state) until the round trip resolves.
    pub fn save_settings(&mut self) {
        let form = match std::mem::take(&mut self.settings) {
            SettingsState::Editing(form) => form,
            other => {
                self.settings = other;
                return;
            }
        };
        let payload = form.payload();
        self.settings = SettingsState::Saving(form);

        let client = self.client.clone();
        let (tx, rx) = oneshot::channel();
        self.settings_save_rx = Some(rx);
        tokio::spawn(async move {
            let result = match client.save_personalization(&payload).await {
                Ok(reply) => Ok(reply.reply),
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send(SaveOutcome { result });
        });
    }

    pub fn poll_settings_save(&mut self) {
        let outcome = match self.settings_save_rx.as_mut() {
            None => return,
            Some(rx) => match rx.try_recv() {
                Ok(o) => o,
                Err(oneshot::error::TryRecvError::Empty) => return,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.settings_save_rx = None;
                    return;
                }
            },
        };
        self.settings_save_rx = None;

        match std::mem::take(&mut self.settings) {
            SettingsState::Saving(form) => match outcome.result {
                Ok(reply) => {
                    self.chat.push(ChatMessage {
                        speaker: Speaker::Planner,
                        text: reply.unwrap_or_else(|| "Settings saved!".into()),
                    });
                    // The generated plan may change server-side.
                    self.needs_refresh = true;
                }
                Err(e) => {
                    warn!(error = %e, "saving personalization failed");
                    self.chat.push(ChatMessage {
                        speaker: Speaker::Error,
                        text: "Error: Could not save settings.".into(),
                    });
                    self.settings = SettingsState::Editing(form);
                }
            },
            other => self.settings = other,
        }
    }

    // ── Popups ──────────────────────────────────────────────────────────

    pub fn toggle_upcoming(&mut self) {
        self.show_upcoming = !self.show_upcoming;
    }
}

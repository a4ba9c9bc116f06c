use serde::{Deserialize, Serialize};

// ─── Schedule document ──────────────────────────────────────────────────────

/// The full schedule document served by `GET /get_schedule`.
///
/// Every collection defaults to empty so a partial document (a server that
/// omits, say, `study_windows`) still deserializes. The client replaces its
/// copy wholesale on each fetch; there is no identity or merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleData {
    #[serde(default)]
    pub schedule: Vec<ClassEntry>,
    #[serde(default)]
    pub tasks: Vec<TaskEntry>,
    #[serde(default)]
    pub tests: Vec<TestEntry>,
    #[serde(default)]
    pub generated_plan: Vec<PlanEntry>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub study_windows: Vec<StudyWindow>,
}

/// A recurring weekly class. `day` is a weekday name ("Monday").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEntry {
    pub day: String,
    pub subject: String,
    pub start_time: String,
    pub end_time: String,
}

/// A user-entered task. `deadline` is `YYYY-MM-DD`, optionally followed by
/// a local time (`YYYY-MM-DDTHH:MM`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEntry {
    pub name: String,
    pub task_type: String,
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestEntry {
    pub name: String,
    pub test_type: String,
    pub date: String,
}

/// A server-computed study block, distinct from user-entered items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntry {
    pub task: String,
    pub date: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

// ─── Personalization ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_awake_time")]
    pub awake_time: String,
    #[serde(default = "default_sleep_time")]
    pub sleep_time: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            awake_time: default_awake_time(),
            sleep_time: default_sleep_time(),
        }
    }
}

fn default_awake_time() -> String {
    "07:00".into()
}

fn default_sleep_time() -> String {
    "23:00".into()
}

/// A recurring user-declared availability interval, input to the server's
/// plan generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyWindow {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub focus_level: FocusLevel,
}

impl StudyWindow {
    /// The blank row the settings form starts from.
    pub fn blank() -> Self {
        Self {
            day: "Monday".into(),
            start_time: "09:00".into(),
            end_time: "10:00".into(),
            focus_level: FocusLevel::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusLevel {
    High,
    #[default]
    Medium,
    Low,
}

impl FocusLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High Focus",
            Self::Medium => "Medium Focus",
            Self::Low => "Low Focus",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium => Self::Low,
            Self::Low => Self::High,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::High => Self::Low,
            Self::Medium => Self::High,
            Self::Low => Self::Medium,
        }
    }
}

/// Body of `POST /save_personalization`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personalization {
    pub preferences: Preferences,
    pub study_windows: Vec<StudyWindow>,
}

// ─── Chat ───────────────────────────────────────────────────────────────────

/// Body of `POST /chat`. `year` is the currently selected year, sent as a
/// string because that is what the server expects.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub year: &'a str,
}

/// Reply body shared by `/chat` and `/save_personalization`. The field is
/// optional; callers substitute their own fallback text.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub reply: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_data_defaults_for_partial_document() {
        let data: ScheduleData = serde_json::from_str(r#"{"tasks":[]}"#).unwrap();

        assert!(data.schedule.is_empty());
        assert!(data.tasks.is_empty());
        assert!(data.tests.is_empty());
        assert!(data.generated_plan.is_empty());
        assert!(data.study_windows.is_empty());
        assert_eq!(data.preferences.awake_time, "07:00");
        assert_eq!(data.preferences.sleep_time, "23:00");
    }

    #[test]
    fn test_schedule_data_full_document() {
        let json = r#"{
            "schedule": [{"day":"Monday","subject":"Math","start_time":"09:00","end_time":"10:00"}],
            "tasks": [{"name":"Essay","task_type":"hw","deadline":"2024-03-05T14:00"}],
            "tests": [{"name":"Midterm","test_type":"exam","date":"2024-03-07"}],
            "generated_plan": [{"task":"Essay","date":"2024-03-04","start_time":"16:00","end_time":"17:00"}],
            "preferences": {"awake_time":"06:30","sleep_time":"22:00"},
            "study_windows": [{"day":"Tuesday","start_time":"18:00","end_time":"20:00","focus_level":"high"}]
        }"#;
        let data: ScheduleData = serde_json::from_str(json).unwrap();

        assert_eq!(data.schedule[0].subject, "Math");
        assert_eq!(data.tasks[0].deadline.as_deref(), Some("2024-03-05T14:00"));
        assert_eq!(data.tests[0].date, "2024-03-07");
        assert_eq!(data.generated_plan[0].start_time.as_deref(), Some("16:00"));
        assert_eq!(data.preferences.awake_time, "06:30");
        assert_eq!(data.study_windows[0].focus_level, FocusLevel::High);
    }

    #[test]
    fn test_focus_level_serializes_lowercase() {
        let window = StudyWindow {
            day: "Friday".into(),
            start_time: "14:00".into(),
            end_time: "15:00".into(),
            focus_level: FocusLevel::High,
        };

        let json = serde_json::to_string(&window).unwrap();
        assert!(json.contains("\"focus_level\":\"high\""));
    }

    #[test]
    fn test_focus_level_defaults_to_medium() {
        let json = r#"{"day":"Friday","start_time":"14:00","end_time":"15:00"}"#;
        let window: StudyWindow = serde_json::from_str(json).unwrap();

        assert_eq!(window.focus_level, FocusLevel::Medium);
    }

    #[test]
    fn test_focus_level_cycles_through_all_levels() {
        let start = FocusLevel::High;
        assert_eq!(start.next().next().next(), start);
        assert_eq!(start.prev().prev().prev(), start);
        assert_eq!(FocusLevel::Medium.next(), FocusLevel::Low);
        assert_eq!(FocusLevel::Medium.prev(), FocusLevel::High);
    }

    #[test]
    fn test_personalization_with_zero_windows_serializes_empty_list() {
        let payload = Personalization {
            preferences: Preferences::default(),
            study_windows: Vec::new(),
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"study_windows\":[]"));
        assert!(json.contains("\"awake_time\":\"07:00\""));
    }

    #[test]
    fn test_chat_request_shape() {
        let req = ChatRequest {
            message: "add a test on friday",
            year: "2026",
        };

        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"message\":\"add a test on friday\""));
        assert!(json.contains("\"year\":\"2026\""));
    }

    #[test]
    fn test_chat_reply_missing_field() {
        let reply: ChatReply = serde_json::from_str("{}").unwrap();
        assert!(reply.reply.is_none());
    }
}

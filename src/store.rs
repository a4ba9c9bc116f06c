use chrono::{NaiveDate, NaiveDateTime};

use crate::dates::{format_deadline, local_date_string, parse_deadline, weekday_name};
use crate::models::{ClassEntry, PlanEntry, ScheduleData, TaskEntry, TestEntry};

// ─── Store ──────────────────────────────────────────────────────────────────

/// In-memory cache of the last fetched schedule document. Each successful
/// refresh replaces the whole document; a failed refresh resets it to empty
/// defaults and records the error for the detail panel. Touched only from
/// the event loop.
#[derive(Debug, Default)]
pub struct ScheduleStore {
    data: ScheduleData,
    last_error: Option<String>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &ScheduleData {
        &self.data
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn apply(&mut self, data: ScheduleData) {
        self.data = data;
        self.last_error = None;
    }

    pub fn apply_error(&mut self, message: String) {
        self.data = ScheduleData::default();
        self.last_error = Some(message);
    }

    /// Project the cached document onto a single day. Pure; no I/O. Must be
    /// re-invoked after every refresh since it borrows from the store.
    pub fn day_details(&self, date: NaiveDate) -> DayDetails<'_> {
        let date_string = local_date_string(date);
        let day = weekday_name(date);

        let mut plan: Vec<&PlanEntry> = self
            .data
            .generated_plan
            .iter()
            .filter(|p| p.date == date_string)
            .collect();
        // Lexical on HH:MM; stable, with missing start times first.
        plan.sort_by(|a, b| {
            a.start_time
                .as_deref()
                .unwrap_or("")
                .cmp(b.start_time.as_deref().unwrap_or(""))
        });

        let classes: Vec<&ClassEntry> = self
            .data
            .schedule
            .iter()
            .filter(|c| c.day.eq_ignore_ascii_case(day))
            .collect();

        let tasks: Vec<&TaskEntry> = self
            .data
            .tasks
            .iter()
            .filter(|t| {
                t.deadline
                    .as_deref()
                    .is_some_and(|d| d.starts_with(&date_string))
            })
            .collect();

        let tests: Vec<&TestEntry> = self
            .data
            .tests
            .iter()
            .filter(|t| t.date == date_string)
            .collect();

        DayDetails {
            plan,
            classes,
            tasks,
            tests,
        }
    }

    /// Tasks with a deadline strictly in the future, soonest first. Feeds
    /// the upcoming-tasks popup; tasks with unparsable deadlines are
    /// skipped.
    pub fn upcoming_tasks(&self, now: NaiveDateTime) -> Vec<&TaskEntry> {
        let mut pending: Vec<(NaiveDateTime, &TaskEntry)> = self
            .data
            .tasks
            .iter()
            .filter_map(|t| {
                let dt = parse_deadline(t.deadline.as_deref()?)?;
                (dt > now).then_some((dt, t))
            })
            .collect();
        pending.sort_by_key(|(dt, _)| *dt);
        pending.into_iter().map(|(_, t)| t).collect()
    }
}

// ─── Day projection ─────────────────────────────────────────────────────────

/// Categorized view of one day, in the fixed render order: Study Plan,
/// Classes, Tasks Due, Tests/Quizzes.
#[derive(Debug)]
pub struct DayDetails<'a> {
    pub plan: Vec<&'a PlanEntry>,
    pub classes: Vec<&'a ClassEntry>,
    pub tasks: Vec<&'a TaskEntry>,
    pub tests: Vec<&'a TestEntry>,
}

impl DayDetails<'_> {
    /// True when no category has entries, in which case the panel shows a
    /// placeholder message instead of headings.
    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
            && self.classes.is_empty()
            && self.tasks.is_empty()
            && self.tests.is_empty()
    }
}

// ─── Row text ───────────────────────────────────────────────────────────────

pub fn plan_summary(p: &PlanEntry) -> String {
    format!(
        "{}: {} - {}",
        p.task,
        p.start_time.as_deref().unwrap_or("--:--"),
        p.end_time.as_deref().unwrap_or("--:--"),
    )
}

pub fn class_summary(c: &ClassEntry) -> String {
    format!("{}: {} - {}", c.subject, c.start_time, c.end_time)
}

pub fn task_summary(t: &TaskEntry) -> String {
    let due = t
        .deadline
        .as_deref()
        .map(format_deadline)
        .unwrap_or_else(|| "All day".into());
    format!("{} ({}) - Due: {}", t.name, t.task_type, due)
}

pub fn test_summary(t: &TestEntry) -> String {
    format!("{} ({})", t.name, t.test_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Preferences, StudyWindow};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(name: &str, task_type: &str, deadline: Option<&str>) -> TaskEntry {
        TaskEntry {
            name: name.into(),
            task_type: task_type.into(),
            deadline: deadline.map(Into::into),
        }
    }

    fn plan(task: &str, date: &str, start: Option<&str>) -> PlanEntry {
        PlanEntry {
            task: task.into(),
            date: date.into(),
            start_time: start.map(Into::into),
            end_time: start.map(|_| "23:00".into()),
        }
    }

    fn store_with(data: ScheduleData) -> ScheduleStore {
        let mut store = ScheduleStore::new();
        store.apply(data);
        store
    }

    #[test]
    fn test_task_filter_is_exact_prefix_match() {
        let store = store_with(ScheduleData {
            tasks: vec![task("Essay", "hw", Some("2024-03-05T10:00"))],
            ..Default::default()
        });

        assert_eq!(store.day_details(date(2024, 3, 5)).tasks.len(), 1);
        assert!(store.day_details(date(2024, 3, 4)).tasks.is_empty());
        assert!(store.day_details(date(2024, 3, 6)).tasks.is_empty());
        // A different month sharing the day-of-month must not match either.
        assert!(store.day_details(date(2024, 4, 5)).tasks.is_empty());
    }

    #[test]
    fn test_task_without_deadline_never_matches() {
        let store = store_with(ScheduleData {
            tasks: vec![task("Someday", "hw", None)],
            ..Default::default()
        });

        assert!(store.day_details(date(2024, 3, 5)).tasks.is_empty());
    }

    #[test]
    fn test_plan_sorted_ascending_missing_start_first() {
        let store = store_with(ScheduleData {
            generated_plan: vec![
                plan("late", "2024-03-05", Some("16:00")),
                plan("floating-a", "2024-03-05", None),
                plan("early", "2024-03-05", Some("08:30")),
                plan("floating-b", "2024-03-05", None),
                plan("other-day", "2024-03-06", Some("07:00")),
            ],
            ..Default::default()
        });

        let details = store.day_details(date(2024, 3, 5));
        let order: Vec<&str> = details.plan.iter().map(|p| p.task.as_str()).collect();
        // Missing start times sort first; equal keys keep insertion order.
        assert_eq!(order, vec!["floating-a", "floating-b", "early", "late"]);
    }

    #[test]
    fn test_class_weekday_match_is_case_insensitive() {
        let store = store_with(ScheduleData {
            schedule: vec![
                ClassEntry {
                    day: "tuesday".into(),
                    subject: "Math".into(),
                    start_time: "09:00".into(),
                    end_time: "10:00".into(),
                },
                ClassEntry {
                    day: "Wednesday".into(),
                    subject: "History".into(),
                    start_time: "11:00".into(),
                    end_time: "12:00".into(),
                },
            ],
            ..Default::default()
        });

        // 2024-03-05 is a Tuesday.
        let details = store.day_details(date(2024, 3, 5));
        assert_eq!(details.classes.len(), 1);
        assert_eq!(details.classes[0].subject, "Math");
    }

    #[test]
    fn test_test_filter_requires_exact_date() {
        let store = store_with(ScheduleData {
            tests: vec![TestEntry {
                name: "Midterm".into(),
                test_type: "exam".into(),
                date: "2024-03-07".into(),
            }],
            ..Default::default()
        });

        assert_eq!(store.day_details(date(2024, 3, 7)).tests.len(), 1);
        assert!(store.day_details(date(2024, 3, 8)).tests.is_empty());
    }

    #[test]
    fn test_day_details_empty_flag() {
        let store = ScheduleStore::new();
        assert!(store.day_details(date(2024, 3, 5)).is_empty());

        let store = store_with(ScheduleData {
            tests: vec![TestEntry {
                name: "Quiz".into(),
                test_type: "quiz".into(),
                date: "2024-03-05".into(),
            }],
            ..Default::default()
        });
        assert!(!store.day_details(date(2024, 3, 5)).is_empty());
    }

    #[test]
    fn test_apply_error_resets_store_to_empty() {
        let mut store = store_with(ScheduleData {
            tasks: vec![task("Essay", "hw", Some("2024-03-05T10:00"))],
            preferences: Preferences {
                awake_time: "06:00".into(),
                sleep_time: "22:00".into(),
            },
            study_windows: vec![StudyWindow::blank()],
            ..Default::default()
        });

        store.apply_error("HTTP 500: internal server error".into());

        assert!(store.data().tasks.is_empty());
        assert!(store.data().study_windows.is_empty());
        assert_eq!(store.data().preferences.awake_time, "07:00");
        assert_eq!(
            store.last_error(),
            Some("HTTP 500: internal server error")
        );

        // A later successful refresh clears the error.
        store.apply(ScheduleData::default());
        assert!(store.last_error().is_none());
    }

    #[test]
    fn test_task_summary_formats_deadline_time() {
        let t = task("Essay", "hw", Some("2024-03-05T14:00"));
        assert_eq!(task_summary(&t), "Essay (hw) - Due: 2:00 PM");
    }

    #[test]
    fn test_task_summary_date_only_is_all_day() {
        let t = task("Reading", "hw", Some("2024-03-05"));
        assert_eq!(task_summary(&t), "Reading (hw) - Due: All day");
    }

    #[test]
    fn test_row_text_for_other_categories() {
        assert_eq!(
            plan_summary(&plan("Essay", "2024-03-05", Some("16:00"))),
            "Essay: 16:00 - 23:00"
        );
        assert_eq!(
            class_summary(&ClassEntry {
                day: "Monday".into(),
                subject: "Math".into(),
                start_time: "09:00".into(),
                end_time: "10:00".into(),
            }),
            "Math: 09:00 - 10:00"
        );
        assert_eq!(
            test_summary(&TestEntry {
                name: "Midterm".into(),
                test_type: "exam".into(),
                date: "2024-03-07".into(),
            }),
            "Midterm (exam)"
        );
    }

    #[test]
    fn test_fetched_document_renders_task_line() {
        let data: ScheduleData = serde_json::from_str(
            r#"{"tasks":[{"name":"Essay","task_type":"hw","deadline":"2024-03-05T14:00"}]}"#,
        )
        .unwrap();
        let store = store_with(data);

        let details = store.day_details(date(2024, 3, 5));
        assert_eq!(details.tasks.len(), 1);
        assert_eq!(task_summary(details.tasks[0]), "Essay (hw) - Due: 2:00 PM");
    }

    #[test]
    fn test_upcoming_tasks_future_only_soonest_first() {
        let store = store_with(ScheduleData {
            tasks: vec![
                task("past", "hw", Some("2024-03-01T10:00")),
                task("next-week", "hw", Some("2024-03-12")),
                task("tonight", "hw", Some("2024-03-05T20:00")),
                task("unparsable", "hw", Some("whenever")),
                task("undated", "hw", None),
            ],
            ..Default::default()
        });

        let now = date(2024, 3, 5).and_hms_opt(12, 0, 0).unwrap();
        let names: Vec<&str> = store
            .upcoming_tasks(now)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["tonight", "next-week"]);
    }
}

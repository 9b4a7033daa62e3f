use crate::error::FormError;
use crate::task::{Task, TaskDraft, TaskPatch};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub const TITLE_MAX_CHARS: usize = 16;
const DEADLINE_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Deadline,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Title, Field::Description, Field::Deadline];

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Description => "Description",
            Field::Deadline => "Deadline",
        }
    }
}

/// What a valid form produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(TaskDraft),
    Update(u32, TaskPatch),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub mode: FormMode,
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub focus: Field,
    pub error: Option<String>,
}

impl TaskForm {
    pub fn add() -> Self {
        Self {
            mode: FormMode::Add,
            title: String::new(),
            description: String::new(),
            deadline: String::new(),
            focus: Field::Title,
            error: None,
        }
    }

    pub fn edit(task: &Task) -> Self {
        Self {
            mode: FormMode::Edit(task.id),
            title: task.title.clone(),
            description: task.description.clone(),
            deadline: format_deadline(task.deadline),
            focus: Field::Title,
            error: None,
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::Deadline => &self.deadline,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Deadline => &mut self.deadline,
        }
    }

    pub fn push(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            Field::Title => Field::Description,
            Field::Description => Field::Deadline,
            Field::Deadline => Field::Title,
        };
    }

    pub fn prev_field(&mut self) {
        self.focus = match self.focus {
            Field::Title => Field::Deadline,
            Field::Description => Field::Title,
            Field::Deadline => Field::Description,
        };
    }

    pub fn validate(&self) -> Result<Submission, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::TitleRequired);
        }
        if title.chars().count() > TITLE_MAX_CHARS {
            return Err(FormError::TitleTooLong {
                max: TITLE_MAX_CHARS,
            });
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(FormError::DescriptionRequired);
        }
        let deadline = parse_deadline(&self.deadline)?;

        Ok(match self.mode {
            FormMode::Add => Submission::Create(TaskDraft {
                title: title.to_string(),
                description: description.to_string(),
                deadline,
            }),
            // the edit form resubmits every field
            FormMode::Edit(id) => Submission::Update(
                id,
                TaskPatch {
                    title: Some(title.to_string()),
                    description: Some(description.to_string()),
                    deadline: Some(deadline),
                    status: None,
                },
            ),
        })
    }
}

pub fn format_deadline(deadline: Option<DateTime<Utc>>) -> String {
    deadline
        .map(|d| d.format(DEADLINE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Parses a UTC deadline; empty input means no deadline.
pub fn parse_deadline(input: &str) -> Result<Option<DateTime<Utc>>, FormError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let parsed = NaiveDateTime::parse_from_str(input, DEADLINE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        })
        .map_err(|_| FormError::InvalidDeadline(input.to_string()))?;
    Ok(Some(parsed.and_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskStore;
    use chrono::TimeZone;
    use rstest::rstest;

    fn filled(title: &str, description: &str, deadline: &str) -> TaskForm {
        TaskForm {
            title: title.into(),
            description: description.into(),
            deadline: deadline.into(),
            ..TaskForm::add()
        }
    }

    #[rstest]
    #[case("", "d", FormError::TitleRequired)]
    #[case("   ", "d", FormError::TitleRequired)]
    #[case("seventeen chars!!", "d", FormError::TitleTooLong { max: 16 })]
    #[case("ok", " ", FormError::DescriptionRequired)]
    fn rejects_invalid_fields(#[case] title: &str, #[case] description: &str, #[case] expected: FormError) {
        assert_eq!(filled(title, description, "").validate(), Err(expected));
    }

    #[test]
    fn sixteen_char_title_is_accepted() {
        let form = filled("exactly16chars!!", "d", "");
        assert!(form.validate().is_ok());
    }

    #[rstest]
    #[case("2024-12-15T17:00")]
    #[case("2024-12-15 17:00")]
    fn parses_datetime_inputs(#[case] input: &str) {
        assert_eq!(
            parse_deadline(input).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 12, 15, 17, 0, 0).unwrap())
        );
    }

    #[test]
    fn date_only_means_midnight() {
        assert_eq!(
            parse_deadline("2024-12-15").unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 12, 15, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn bad_deadline_is_reported() {
        assert_eq!(
            filled("t", "d", "tomorrow").validate(),
            Err(FormError::InvalidDeadline("tomorrow".into()))
        );
    }

    #[test]
    fn add_form_builds_a_draft() {
        let submission = filled("Buy milk", "2%", "").validate().unwrap();
        assert_eq!(submission, Submission::Create(TaskDraft::new("Buy milk", "2%")));
    }

    #[test]
    fn edit_form_prefills_and_resubmits_all_fields() {
        let store = TaskStore::fixture();
        let task = store.get(1).unwrap();
        let mut form = TaskForm::edit(task);
        assert_eq!(form.deadline, "2024-12-15T17:00");
        form.deadline.clear();
        match form.validate().unwrap() {
            Submission::Update(id, patch) => {
                assert_eq!(id, 1);
                assert_eq!(patch.title.as_deref(), Some("Task 1"));
                assert_eq!(patch.deadline, Some(None));
                assert_eq!(patch.status, None);
            }
            other => panic!("unexpected submission {other:?}"),
        }
    }

    #[test]
    fn typing_goes_to_the_focused_field() {
        let mut form = TaskForm::add();
        form.push('a');
        form.next_field();
        form.push('b');
        form.push('c');
        form.backspace();
        form.prev_field();
        form.prev_field();
        assert_eq!(form.focus, Field::Deadline);
        assert_eq!(form.value(Field::Title), "a");
        assert_eq!(form.value(Field::Description), "b");
    }
}

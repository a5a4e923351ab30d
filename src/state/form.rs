/// Form controller: create/edit dialog state shared by every entity screen.
///
/// Holds the draft being edited, the identity of the entity under edit
/// (absent in create mode), and the dialog flags. Submission targets are
/// selected by the screens based on `editing`; this type only tracks the
/// lifecycle and error surfacing.
use crate::api::ApiError;

#[derive(Debug, Default)]
pub struct FormState<D> {
    pub draft: D,
    /// Identity of the entity being edited; `None` means create mode.
    pub editing: Option<i64>,
    pub open: bool,
    pub busy: bool,
    pub error: Option<String>,
}

/// Result of a finished submission from the screen's point of view.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Saved; the dialog closed and the owning list should re-fetch.
    Saved,
    /// Rejected; the dialog stays open with the draft intact.
    Rejected,
    /// The session is no longer valid; the caller must sign the user out.
    Expired,
}

impl<D: Default> FormState<D> {
    pub fn open_create(&mut self) {
        self.draft = D::default();
        self.editing = None;
        self.error = None;
        self.open = true;
    }

    /// Open the dialog pre-populated from an existing entity.
    pub fn open_edit(&mut self, id: i64, draft: D) {
        self.draft = draft;
        self.editing = Some(id);
        self.error = None;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.draft = D::default();
        self.editing = None;
        self.error = None;
        self.busy = false;
        self.open = false;
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Mark the form as submitting. The screen issues the actual request.
    pub fn submit(&mut self) {
        self.busy = true;
        self.error = None;
    }

    /// Reject the draft locally (client-side constraint) without a request.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.busy = false;
        self.error = Some(message.into());
    }

    pub fn finish(&mut self, result: Result<(), ApiError>) -> Outcome {
        self.busy = false;
        match result {
            Ok(()) => {
                self.close();
                Outcome::Saved
            }
            Err(ApiError::Unauthorized) => Outcome::Expired,
            Err(err) => {
                self.error = Some(err.user_message());
                Outcome::Rejected
            }
        }
    }
}

/// Pending archive confirmation. Archiving is irreversible from the UI, so
/// the request is only issued once the user explicitly accepts; declining
/// drops the id without any request.
#[derive(Debug, Default)]
pub struct Confirm(Option<i64>);

impl Confirm {
    pub fn ask(&mut self, id: i64) {
        self.0 = Some(id);
    }

    pub fn decline(&mut self) {
        self.0 = None;
    }

    pub fn accept(&mut self) -> Option<i64> {
        self.0.take()
    }

    pub fn pending(&self) -> Option<i64> {
        self.0
    }
}

/// Truncate a date-time value to the date-only form used by date inputs.
pub fn date_input(value: &str) -> String {
    value
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or_default()
        .to_string()
}

pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

pub fn parse_date(value: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::FieldErrors;
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Draft {
        title: String,
    }

    #[test]
    fn successful_submission_clears_the_draft_and_closes() {
        let mut form: FormState<Draft> = FormState::default();
        form.open_create();
        form.draft.title = "Dune".to_string();
        form.submit();

        assert_eq!(form.finish(Ok(())), Outcome::Saved);
        assert!(!form.open);
        assert_eq!(form.draft, Draft::default());
        assert_eq!(form.editing, None);
    }

    #[test]
    fn rejected_submission_keeps_the_dialog_open_with_the_first_field_error() {
        let mut form: FormState<Draft> = FormState::default();
        form.open_create();
        form.draft.title = String::new();
        form.submit();

        let mut errors = FieldErrors::new();
        errors.insert("title".to_string(), json!(["Title is required"]));

        assert_eq!(form.finish(Err(ApiError::Invalid(errors))), Outcome::Rejected);
        assert!(form.open);
        assert_eq!(form.error.as_deref(), Some("Title is required"));
    }

    #[test]
    fn expired_session_is_reported_without_closing() {
        let mut form: FormState<Draft> = FormState::default();
        form.open_create();
        form.submit();
        assert_eq!(form.finish(Err(ApiError::Unauthorized)), Outcome::Expired);
    }

    #[test]
    fn editing_prepopulates_and_closing_resets() {
        let mut form: FormState<Draft> = FormState::default();
        form.open_edit(
            9,
            Draft {
                title: "Dune".to_string(),
            },
        );
        assert!(form.is_editing());
        assert_eq!(form.draft.title, "Dune");

        form.close();
        assert!(!form.is_editing());
        assert_eq!(form.draft, Draft::default());
    }

    #[test]
    fn declined_confirmation_yields_no_id() {
        let mut confirm = Confirm::default();
        confirm.ask(5);
        confirm.decline();
        assert_eq!(confirm.accept(), None);
    }

    #[test]
    fn accepted_confirmation_yields_the_id_once() {
        let mut confirm = Confirm::default();
        confirm.ask(5);
        assert_eq!(confirm.accept(), Some(5));
        assert_eq!(confirm.accept(), None);
    }

    #[test]
    fn date_input_truncates_at_the_first_separator() {
        assert_eq!(date_input("2020-05-01T00:00:00Z"), "2020-05-01");
        assert_eq!(date_input("2020-05-01 10:30:00"), "2020-05-01");
        assert_eq!(date_input("2020-05-01"), "2020-05-01");
        assert_eq!(date_input(""), "");
    }
}

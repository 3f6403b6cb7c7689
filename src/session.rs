use serde::Serialize;

use crate::client::RecordStoreClient;
use crate::error::{Error, Result, ValidationError};
use crate::grade::{derive_grade, Grade};
use crate::model::{NewStudent, Section, StudentId, StudentPatch, StudentRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    List,
    Add,
    Edit,
    Details,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::List => "LIST",
            Mode::Add => "ADD",
            Mode::Edit => "EDIT",
            Mode::Details => "DETAILS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A toast for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Success,
            title: "Success".into(),
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            title: "Error".into(),
            message: message.into(),
        }
    }
}

/// Add/edit form contents. `marks` is kept as typed; `grade` follows it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormDraft {
    pub name: String,
    pub section: Option<Section>,
    pub marks: String,
    pub grade: Option<Grade>,
}

impl FormDraft {
    fn from_record(r: &StudentRecord) -> Self {
        FormDraft {
            name: r.name.clone(),
            section: Some(r.section),
            marks: r.marks.to_string(),
            grade: Some(r.grade),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_section(&mut self, section: Section) {
        self.section = Some(section);
    }

    /// Regrades on every keystroke. Blank or non-numeric text clears the grade.
    pub fn set_marks(&mut self, text: impl Into<String>) {
        self.marks = text.into();
        self.grade = self.marks.trim().parse::<i64>().ok().map(derive_grade);
    }

    pub fn to_payload(&self) -> std::result::Result<NewStudent, ValidationError> {
        let name = self.name.trim();
        let section = self.section.ok_or(ValidationError::MissingSection)?;
        let marks = self
            .marks
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidMarks(self.marks.clone()))?;
        let payload = NewStudent::graded(name, section, marks);
        payload.validate()?;
        Ok(payload)
    }
}

/// UI orchestration: which screen is showing, what is selected, and the
/// notices raised by the last actions.
///
/// Store failures never escape as errors; they become error notices and the
/// mode stays put. Only actions that make no sense in the current mode
/// return `Err(InvalidTransition)`.
pub struct Session {
    client: RecordStoreClient,
    mode: Mode,
    selected: Option<StudentRecord>,
    form: FormDraft,
    notices: Vec<Notice>,
}

impl Session {
    pub fn new(client: RecordStoreClient) -> Self {
        Session {
            client,
            mode: Mode::List,
            selected: None,
            form: FormDraft::default(),
            notices: Vec::new(),
        }
    }

    pub fn client(&self) -> &RecordStoreClient {
        &self.client
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selected(&self) -> Option<&StudentRecord> {
        self.selected.as_ref()
    }

    pub fn form(&self) -> &FormDraft {
        &self.form
    }

    pub fn form_mut(&mut self) -> Result<&mut FormDraft> {
        self.require(&[Mode::Add, Mode::Edit], "edit the form")?;
        Ok(&mut self.form)
    }

    pub fn students(&self) -> Vec<StudentRecord> {
        self.client.cached()
    }

    pub fn is_loading(&self) -> bool {
        self.client.is_busy()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub async fn load(&mut self) -> Result<()> {
        self.require(&[Mode::List], "load")?;
        match self.client.load().await {
            Ok(_) => self.notify(Notice::success("Student data loaded successfully.")),
            Err(e) => self.fail("Failed to load students.", &e),
        }
        Ok(())
    }

    pub fn go_to_add(&mut self) -> Result<()> {
        self.require(&[Mode::List], "add")?;
        self.selected = None;
        self.form = FormDraft::default();
        self.mode = Mode::Add;
        Ok(())
    }

    pub async fn go_to_edit(&mut self, id: StudentId) -> Result<()> {
        self.require(&[Mode::List], "edit")?;
        if let Some(record) = self.resolve(id).await {
            self.form = FormDraft::from_record(&record);
            self.selected = Some(record);
            self.mode = Mode::Edit;
        }
        Ok(())
    }

    pub async fn go_to_details(&mut self, id: StudentId) -> Result<()> {
        self.require(&[Mode::List], "view")?;
        if let Some(record) = self.resolve(id).await {
            self.selected = Some(record);
            self.mode = Mode::Details;
        }
        Ok(())
    }

    pub fn back(&mut self) -> Result<()> {
        self.require(&[Mode::Add, Mode::Edit, Mode::Details], "go back")?;
        self.to_list();
        Ok(())
    }

    pub async fn submit(&mut self) -> Result<()> {
        self.require(&[Mode::Add, Mode::Edit], "submit")?;
        let payload = match self.form.to_payload() {
            Ok(p) => p,
            Err(e) => {
                self.fail("Please fix the form.", &Error::Validation(e));
                return Ok(());
            }
        };

        let outcome = match (self.mode, self.selected.as_ref()) {
            (Mode::Edit, Some(current)) => {
                let id = current.id;
                self.client
                    .update(id, StudentPatch::from(payload))
                    .await
                    .map(|_| "Student updated. Please reload to see changes.")
                    .map_err(|e| ("Failed to update student.", e))
            }
            _ => self
                .client
                .create(payload)
                .await
                .map(|_| "Student added. Please reload to see changes.")
                .map_err(|e| ("Failed to add student.", e)),
        };

        match outcome {
            Ok(message) => {
                self.notify(Notice::success(message));
                self.to_list();
            }
            Err((summary, e)) => self.fail(summary, &e),
        }
        Ok(())
    }

    /// Unconfirmed deletes do nothing, matching a dismissed confirm dialog.
    pub async fn delete(&mut self, id: StudentId, confirmed: bool) -> Result<()> {
        self.require(&[Mode::List], "delete")?;
        if !confirmed {
            return Ok(());
        }
        match self.client.delete(id).await {
            Ok(_) => self.notify(Notice::success("Student deleted. Please reload.")),
            Err(e) => self.fail("Failed to delete student.", &e),
        }
        Ok(())
    }

    async fn resolve(&mut self, id: StudentId) -> Option<StudentRecord> {
        if let Some(r) = self.client.cached_by_id(id) {
            return Some(r);
        }
        match self.client.get_by_id(id).await {
            Ok(Some(r)) => Some(r),
            Ok(None) => {
                self.fail("Student not found.", &Error::NotFound(id));
                None
            }
            Err(e) => {
                self.fail("Failed to open student.", &e);
                None
            }
        }
    }

    fn to_list(&mut self) {
        self.selected = None;
        self.form = FormDraft::default();
        self.mode = Mode::List;
    }

    fn require(&self, allowed: &[Mode], action: &'static str) -> Result<()> {
        if allowed.contains(&self.mode) {
            return Ok(());
        }
        Err(Error::InvalidTransition {
            mode: self.mode.as_str(),
            action,
        })
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn fail(&mut self, summary: &str, e: &Error) {
        tracing::warn!(error = %e, "{summary}");
        self.notify(Notice::error(format!("{summary} {e}")));
    }
}

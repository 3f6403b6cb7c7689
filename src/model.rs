use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::grade::{derive_grade, Grade};

pub type StudentId = i64;

pub const MARKS_MIN: i64 = 0;
pub const MARKS_MAX: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    A,
    B,
    C,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::A, Section::B, Section::C];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::A => "A",
            Section::B => "B",
            Section::C => "C",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        Section::ALL
            .into_iter()
            .find(|sec| sec.as_str().eq_ignore_ascii_case(t))
            .ok_or_else(|| ValidationError::InvalidSection(t.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
    pub section: Section,
    pub marks: i64,
    pub grade: Grade,
}

/// A record before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub section: Section,
    pub marks: i64,
    pub grade: Grade,
}

/// Fields to replace on update. There is no `id`: ids never change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

pub fn validate_marks(marks: i64) -> Result<(), ValidationError> {
    if !(MARKS_MIN..=MARKS_MAX).contains(&marks) {
        return Err(ValidationError::MarksOutOfRange(marks));
    }
    Ok(())
}

impl NewStudent {
    /// Builds a payload whose grade is derived from `marks`.
    pub fn graded(name: impl Into<String>, section: Section, marks: i64) -> Self {
        NewStudent {
            name: name.into(),
            section,
            marks,
            grade: derive_grade(marks),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_marks(self.marks)
    }

    pub fn with_id(self, id: StudentId) -> StudentRecord {
        StudentRecord {
            id,
            name: self.name,
            section: self.section,
            marks: self.marks,
            grade: self.grade,
        }
    }
}

impl StudentPatch {
    /// Sets marks and the grade that goes with them.
    pub fn regrade(marks: i64) -> Self {
        StudentPatch {
            marks: Some(marks),
            grade: Some(derive_grade(marks)),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.section.is_none() && self.marks.is_none() && self.grade.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(marks) = self.marks {
            validate_marks(marks)?;
        }
        Ok(())
    }
}

impl From<NewStudent> for StudentPatch {
    fn from(r: NewStudent) -> Self {
        StudentPatch {
            name: Some(r.name),
            section: Some(r.section),
            marks: Some(r.marks),
            grade: Some(r.grade),
        }
    }
}

impl StudentRecord {
    pub fn apply(&mut self, patch: &StudentPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(section) = patch.section {
            self.section = section;
        }
        if let Some(marks) = patch.marks {
            self.marks = marks;
        }
        if let Some(grade) = patch.grade {
            self.grade = grade;
        }
    }
}

/// The mock roster the in-memory store starts with.
pub fn seed_students() -> Vec<StudentRecord> {
    vec![
        NewStudent::graded("Alice Johnson", Section::A, 85).with_id(1),
        NewStudent::graded("Bob Smith", Section::B, 72).with_id(2),
        NewStudent::graded("Charlie Brown", Section::A, 91).with_id(3),
        NewStudent::graded("Diana Prince", Section::C, 65).with_id(4),
    ]
}

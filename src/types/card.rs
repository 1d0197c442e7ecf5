//! Screens and the identification card shown after a save

use serde::{Deserialize, Serialize};

/// Screen currently in front of the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Screen {
    /// Facial recognition (capture-verify-save)
    #[default]
    FaceCapture,
    /// Credential info card
    IdInfo,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::FaceCapture => "Facial Recognition",
            Screen::IdInfo => "Credential Info",
        }
    }
}

/// Static identification card. Empty fields render blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdCard {
    pub institution: String,
    pub title: String,
    pub name: String,
    pub student_id: String,
    pub course: String,
    pub year_level: String,
    pub valid_until: String,
    pub authorized_by: String,
}

impl Default for IdCard {
    fn default() -> Self {
        Self {
            institution: "University of Example".to_string(),
            title: "Student Identification Card".to_string(),
            name: String::new(),
            student_id: String::new(),
            course: String::new(),
            year_level: String::new(),
            valid_until: String::new(),
            authorized_by: "Registrar Office".to_string(),
        }
    }
}

impl IdCard {
    /// Labelled rows in display order
    pub fn rows(&self) -> [(&'static str, &str); 5] {
        [
            ("Name", self.name.as_str()),
            ("Student ID", self.student_id.as_str()),
            ("Course", self.course.as_str()),
            ("Year Level", self.year_level.as_str()),
            ("Valid Until", self.valid_until.as_str()),
        ]
    }

    /// Plain text rendering for terminals
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", self.institution));
        out.push_str(&format!("{}\n", self.title));
        out.push_str("[photo]\n");
        for (label, value) in self.rows() {
            out.push_str(&format!("{:<12} {}\n", format!("{}:", label), value));
        }
        out.push_str(&format!("Authorized by: {}", self.authorized_by));
        out
    }
}

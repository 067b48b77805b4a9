//! Canonical resume schema.
//!
//! `ParsedResume` is the fixed shape every AI completion is coerced into and
//! the shape the persistence and rendering layers consume. Field names
//! serialize in camelCase to match the wire format. Every string field
//! defaults to `""` and every list to `[]`, so `ParsedResume::default()` is
//! the all-defaults object the parse pipeline falls back to.

pub mod validate;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsedResume {
    pub personal_info: PersonalInfo,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub achievements: Vec<Achievement>,
    pub certificates: Vec<Certificate>,
    pub skills: Vec<String>,
    pub additional_information: Vec<String>,
}

/// Contact and profile fields. The first four come from AI extraction; the
/// rest are filled in by the user later and must round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub current_salary: String,
    pub salary_expectation: String,
    pub linkedin_link: String,
    pub github_link: String,
    pub hometown: String,
    pub current_location: String,
    pub hobbies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub position: String,
    pub company: String,
    pub duration: String,
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub year: String,
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub title: String,
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Achievement {
    pub title: String,
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certificate {
    pub title: String,
    pub issuer: String,
    pub year: String,
    pub description: Vec<String>,
}

impl Experience {
    /// An entry with neither position nor company is noise and gets dropped.
    pub fn has_identity(&self) -> bool {
        !self.position.is_empty() || !self.company.is_empty()
    }
}

impl Education {
    pub fn has_identity(&self) -> bool {
        !self.degree.is_empty() || !self.institution.is_empty()
    }
}

impl Project {
    pub fn has_identity(&self) -> bool {
        !self.title.is_empty()
    }
}

impl Achievement {
    pub fn has_identity(&self) -> bool {
        !self.title.is_empty()
    }
}

impl Certificate {
    pub fn has_identity(&self) -> bool {
        !self.title.is_empty()
    }
}

impl ParsedResume {
    /// True when nothing at all was extracted (the fallback object).
    pub fn is_empty(&self) -> bool {
        *self == ParsedResume::default()
    }
}

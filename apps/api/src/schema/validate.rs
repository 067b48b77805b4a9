//! Infallible shape validation.
//!
//! Takes whatever `serde_json::Value` the repair pipeline managed to parse
//! and coerces it into a `ParsedResume`. This layer never fails: wrong types
//! degrade to the schema default, strings are trimmed, numbers become their
//! decimal rendering, empty list entries are dropped, and structured entries
//! without an identifying field are filtered out. Validating an already
//! valid resume is a no-op (idempotent).

use serde_json::Value;

use super::{
    Achievement, Certificate, Education, Experience, ParsedResume, PersonalInfo, Project,
};

/// Coerces an arbitrary JSON value into the canonical resume shape.
pub fn validate_resume(value: &Value) -> ParsedResume {
    let personal = value.get("personalInfo");

    ParsedResume {
        personal_info: PersonalInfo {
            name: coerce_string(field(personal, "name")),
            email: coerce_string(field(personal, "email")),
            phone: coerce_string(field(personal, "phone")),
            location: coerce_string(field(personal, "location")),
            bio: coerce_string(field(personal, "bio")),
            current_salary: coerce_string(field(personal, "currentSalary")),
            salary_expectation: coerce_string(field(personal, "salaryExpectation")),
            linkedin_link: coerce_string(field(personal, "linkedinLink")),
            github_link: coerce_string(field(personal, "githubLink")),
            hometown: coerce_string(field(personal, "hometown")),
            current_location: coerce_string(field(personal, "currentLocation")),
            hobbies: coerce_string_list(field(personal, "hobbies")),
        },
        experience: coerce_entries(value.get("experience"), experience_entry),
        education: coerce_entries(value.get("education"), education_entry),
        projects: coerce_entries(value.get("projects"), project_entry),
        achievements: coerce_entries(value.get("achievements"), achievement_entry),
        certificates: coerce_entries(value.get("certificates"), certificate_entry),
        skills: coerce_string_list(value.get("skills")),
        additional_information: coerce_string_list(value.get("additionalInformation")),
    }
}

fn field<'a>(parent: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    parent.and_then(|p| p.get(key))
}

/// Strings are trimmed, numbers rendered, everything else becomes `""`.
fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Non-arrays degrade to `[]`; entries are coerced and empties dropped.
fn coerce_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| coerce_string(Some(item)))
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Coerces each entry independently, then filters entries with no identity.
/// Bad items are dropped one by one rather than defaulting the whole array.
fn coerce_entries<T, F>(value: Option<&Value>, build: F) -> Vec<T>
where
    F: Fn(&Value) -> Option<T>,
{
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|item| build(item)).collect(),
        _ => Vec::new(),
    }
}

fn experience_entry(item: &Value) -> Option<Experience> {
    let entry = Experience {
        position: coerce_string(item.get("position")),
        company: coerce_string(item.get("company")),
        duration: coerce_string(item.get("duration")),
        description: coerce_string_list(item.get("description")),
    };
    entry.has_identity().then_some(entry)
}

fn education_entry(item: &Value) -> Option<Education> {
    let entry = Education {
        degree: coerce_string(item.get("degree")),
        institution: coerce_string(item.get("institution")),
        year: coerce_string(item.get("year")),
        description: coerce_string_list(item.get("description")),
    };
    entry.has_identity().then_some(entry)
}

fn project_entry(item: &Value) -> Option<Project> {
    let entry = Project {
        title: coerce_string(item.get("title")),
        description: coerce_string_list(item.get("description")),
    };
    entry.has_identity().then_some(entry)
}

fn achievement_entry(item: &Value) -> Option<Achievement> {
    let entry = Achievement {
        title: coerce_string(item.get("title")),
        description: coerce_string_list(item.get("description")),
    };
    entry.has_identity().then_some(entry)
}

fn certificate_entry(item: &Value) -> Option<Certificate> {
    let entry = Certificate {
        title: coerce_string(item.get("title")),
        issuer: coerce_string(item.get("issuer")),
        year: coerce_string(item.get("year")),
        description: coerce_string_list(item.get("description")),
    };
    entry.has_identity().then_some(entry)
}

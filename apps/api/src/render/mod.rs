// Three standalone HTML resume variants driven by one view-model.
// Classic is a single serif column, modern adds a tinted sidebar,
// executive centers the header under small-caps section titles.

pub mod handlers;

use askama::Template;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::{
    errors::AppError,
    schema::{Achievement, Certificate, Education, Experience, ParsedResume, Project},
};

pub const DEFAULT_ACCENT: &str = "#4285f4";

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Classic,
    Modern,
    Executive,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Classic => "classic",
            TemplateKind::Modern => "modern",
            TemplateKind::Executive => "executive",
        }
    }
}

/// Accepts only `#rrggbb` literals; anything else is a 400.
pub fn validate_accent(raw: Option<&str>) -> Result<String, AppError> {
    match raw {
        None => Ok(DEFAULT_ACCENT.to_string()),
        Some(color) if HEX_COLOR_RE.is_match(color) => Ok(color.to_lowercase()),
        Some(other) => Err(AppError::Validation(format!(
            "Invalid accent color '{other}', expected #rrggbb"
        ))),
    }
}

/// Shared view-model: the precomputed lines every variant agrees on.
/// Empty sections stay empty here and the templates skip them.
pub struct ResumeView<'a> {
    pub accent: &'a str,
    pub name: String,
    pub email: &'a str,
    pub phone: &'a str,
    pub location: &'a str,
    pub linkedin: &'a str,
    pub github: &'a str,
    pub contact_line: String,
    pub experience: &'a [Experience],
    pub education: &'a [Education],
    pub projects: &'a [Project],
    pub achievements: &'a [Achievement],
    pub certificates: &'a [Certificate],
    pub certificate_lines: Vec<String>,
    pub certificates_line: String,
    pub skills: &'a [String],
    pub skills_line: String,
    pub additional: &'a [String],
}

impl<'a> ResumeView<'a> {
    pub fn new(resume: &'a ParsedResume, accent: &'a str) -> Self {
        let info = &resume.personal_info;
        let name = match info.name.trim() {
            "" => "Your Name".to_string(),
            trimmed => trimmed.to_string(),
        };
        let contact_line = [&info.email, &info.phone, &info.location]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");
        let certificate_lines: Vec<String> =
            resume.certificates.iter().map(format_certificate).collect();
        let certificates_line = certificate_lines.join(" | ");
        let skills_line = resume.skills.join(" | ");

        Self {
            accent,
            name,
            email: &info.email,
            phone: &info.phone,
            location: &info.location,
            linkedin: &info.linkedin_link,
            github: &info.github_link,
            contact_line,
            experience: &resume.experience,
            education: &resume.education,
            projects: &resume.projects,
            achievements: &resume.achievements,
            certificates: &resume.certificates,
            certificate_lines,
            certificates_line,
            skills: &resume.skills,
            skills_line,
            additional: &resume.additional_information,
        }
    }
}

/// `title (issuer)`, or the bare title when no issuer was extracted.
pub fn format_certificate(cert: &Certificate) -> String {
    let title = cert.title.trim();
    let issuer = cert.issuer.trim();
    if issuer.is_empty() {
        title.to_string()
    } else {
        format!("{title} ({issuer})")
    }
}

#[derive(Template)]
#[template(path = "classic.html")]
struct ClassicTemplate<'a> {
    v: ResumeView<'a>,
}

#[derive(Template)]
#[template(path = "modern.html")]
struct ModernTemplate<'a> {
    v: ResumeView<'a>,
}

#[derive(Template)]
#[template(path = "executive.html")]
struct ExecutiveTemplate<'a> {
    v: ResumeView<'a>,
}

mod filters {
    /// Placeholder text for fields the parser left blank.
    pub fn or_text(value: &str, fallback: &str) -> askama::Result<String> {
        let trimmed = value.trim();
        Ok(if trimmed.is_empty() {
            fallback.to_string()
        } else {
            trimmed.to_string()
        })
    }
}

pub fn render_resume(
    kind: TemplateKind,
    resume: &ParsedResume,
    accent: &str,
) -> Result<String, askama::Error> {
    let v = ResumeView::new(resume, accent);
    match kind {
        TemplateKind::Classic => ClassicTemplate { v }.render(),
        TemplateKind::Modern => ModernTemplate { v }.render(),
        TemplateKind::Executive => ExecutiveTemplate { v }.render(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PersonalInfo;

    fn full_resume() -> ParsedResume {
        ParsedResume {
            personal_info: PersonalInfo {
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone: "+1 555 0100".to_string(),
                location: "Berlin".to_string(),
                linkedin_link: "https://linkedin.com/in/janedoe".to_string(),
                github_link: "https://github.com/janedoe".to_string(),
                ..Default::default()
            },
            experience: vec![Experience {
                position: "Engineer".to_string(),
                company: "Acme".to_string(),
                duration: "2020 - 2024".to_string(),
                description: vec!["Built things".to_string()],
            }],
            education: vec![Education {
                degree: "BSc".to_string(),
                institution: "TU Berlin".to_string(),
                year: "2019".to_string(),
                description: vec![],
            }],
            projects: vec![Project {
                title: "Side Project".to_string(),
                description: vec!["Shipped it".to_string()],
            }],
            achievements: vec![Achievement {
                title: "Award".to_string(),
                description: vec!["First place".to_string()],
            }],
            certificates: vec![Certificate {
                title: "Cert A".to_string(),
                issuer: "Org".to_string(),
                year: "2022".to_string(),
                description: vec![],
            }],
            skills: vec!["Rust".to_string(), "SQL".to_string()],
            additional_information: vec!["Open to relocation".to_string()],
        }
    }

    #[test]
    fn test_accent_validation() {
        assert_eq!(validate_accent(None).unwrap(), DEFAULT_ACCENT);
        assert_eq!(validate_accent(Some("#AB12cd")).unwrap(), "#ab12cd");
        assert!(validate_accent(Some("red")).is_err());
        assert!(validate_accent(Some("#fff")).is_err());
        assert!(validate_accent(Some("#12345g")).is_err());
        assert!(validate_accent(Some("4285f4")).is_err());
    }

    #[test]
    fn test_certificate_formatting() {
        let with_issuer = Certificate {
            title: "Cert A".to_string(),
            issuer: "Org".to_string(),
            ..Default::default()
        };
        assert_eq!(format_certificate(&with_issuer), "Cert A (Org)");

        let bare = Certificate {
            title: "Cert B".to_string(),
            ..Default::default()
        };
        assert_eq!(format_certificate(&bare), "Cert B");
    }

    #[test]
    fn test_view_joins_lines() {
        let resume = full_resume();
        let view = ResumeView::new(&resume, DEFAULT_ACCENT);
        assert_eq!(view.skills_line, "Rust | SQL");
        assert_eq!(view.contact_line, "jane@example.com | +1 555 0100 | Berlin");
        assert_eq!(view.certificates_line, "Cert A (Org)");
    }

    #[test]
    fn test_classic_renders_all_sections() {
        let resume = full_resume();
        let html = render_resume(TemplateKind::Classic, &resume, "#336699").unwrap();
        assert!(html.contains("Jane Doe"));
        assert!(html.contains("PROFESSIONAL EXPERIENCE"));
        assert!(html.contains("Rust | SQL"));
        assert!(html.contains("Cert A (Org)"));
        assert!(html.contains("#336699"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let resume = ParsedResume::default();
        for kind in [
            TemplateKind::Classic,
            TemplateKind::Modern,
            TemplateKind::Executive,
        ] {
            let html = render_resume(kind, &resume, DEFAULT_ACCENT).unwrap();
            assert!(html.contains("Your Name"));
            assert!(!html.contains("PROFESSIONAL EXPERIENCE"));
            assert!(!html.contains("Professional Experience"));
            assert!(!html.contains("TECHNICAL SKILLS"));
            assert!(!html.contains("&gt;SKILLS") && !html.contains(">SKILLS<"));
            assert!(!html.contains("Core Competencies"));
        }
    }

    #[test]
    fn test_modern_and_executive_render() {
        let resume = full_resume();

        let modern = render_resume(TemplateKind::Modern, &resume, DEFAULT_ACCENT).unwrap();
        assert!(modern.contains("Jane Doe"));
        assert!(modern.contains("Acme"));
        assert!(modern.contains("TU Berlin"));

        let executive = render_resume(TemplateKind::Executive, &resume, DEFAULT_ACCENT).unwrap();
        assert!(executive.contains("Jane Doe"));
        assert!(executive.contains("Core Competencies"));
        assert!(executive.contains("Cert A (Org)"));
    }

    #[test]
    fn test_markup_in_fields_is_escaped() {
        let mut resume = full_resume();
        resume.personal_info.name = "<script>alert(1)</script>".to_string();
        let html = render_resume(TemplateKind::Classic, &resume, DEFAULT_ACCENT).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_blank_fields_get_placeholders() {
        let mut resume = full_resume();
        resume.experience[0].company = String::new();
        resume.experience[0].duration = "  ".to_string();
        let html = render_resume(TemplateKind::Classic, &resume, DEFAULT_ACCENT).unwrap();
        assert!(html.contains("Company"));
        assert!(html.contains("Duration"));
    }

    #[test]
    fn test_template_kind_deserializes_lowercase() {
        let kind: TemplateKind = serde_json::from_str("\"executive\"").unwrap();
        assert_eq!(kind, TemplateKind::Executive);
        assert!(serde_json::from_str::<TemplateKind>("\"fancy\"").is_err());
    }
}

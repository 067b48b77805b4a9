//! Profile completeness scoring.
//!
//! Pure function over (user fields, optional resume): a fixed weighted
//! checklist produces an integer 0-100, a per-section breakdown, and the
//! suggested next steps. Item states are exclusive: an item is complete,
//! partial (half credit), or missing. Weights sum to 100 and the overall
//! score is clamped, so the result is always a valid percentage.

use serde::{Deserialize, Serialize};

use crate::schema::ParsedResume;

pub const BASIC_INFO_WEIGHT: u32 = 25;
pub const CONTACT_INFO_WEIGHT: u32 = 15;
pub const PROFESSIONAL_WEIGHT: u32 = 35;
pub const EDUCATION_WEIGHT: u32 = 15;
pub const ADDITIONAL_WEIGHT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Complete,
    Partial,
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub name: String,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionCompletion {
    pub section: String,
    pub weight: u32,
    pub percentage: u32,
    pub completed: usize,
    pub total: usize,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub overall: u32,
    pub sections: Vec<SectionCompletion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextStep {
    pub item: String,
    pub section: String,
    pub priority: Priority,
}

/// Computes the weighted completeness report. `resume` is `None` for users
/// who have not saved one yet; user name and email still earn credit.
pub fn compute_completeness(
    user_name: &str,
    user_email: &str,
    resume: Option<&ParsedResume>,
) -> CompletenessReport {
    let info = resume.map(|r| &r.personal_info);

    let basic_info = vec![
        presence_item("Full Name", !user_name.trim().is_empty()),
        presence_item("Email", !user_email.trim().is_empty()),
        if info.is_some_and(|i| i.bio.trim().len() > 20) {
            complete("Professional Bio")
        } else {
            missing("Professional Bio (20+ characters)")
        },
    ];

    let contact_info = vec![
        presence_item("Phone Number", info.is_some_and(|i| !i.phone.trim().is_empty())),
        presence_item("Location", info.is_some_and(|i| !i.location.trim().is_empty())),
        presence_item(
            "LinkedIn Profile",
            info.is_some_and(|i| !i.linkedin_link.trim().is_empty()),
        ),
    ];

    let experience_count = resume.map_or(0, |r| r.experience.len());
    let skill_count = resume.map_or(0, |r| r.skills.len());
    let professional = vec![
        if experience_count >= 2 {
            complete("Work Experience (2+ positions)")
        } else if experience_count == 1 {
            partial("Work Experience (2+ recommended)")
        } else {
            missing("Work Experience")
        },
        if skill_count >= 5 {
            complete("Skills (5+ skills)")
        } else if skill_count >= 3 {
            partial("Skills (5+ recommended)")
        } else {
            missing("Technical Skills")
        },
        presence_item("Projects", resume.is_some_and(|r| !r.projects.is_empty())),
    ];

    let education = vec![
        presence_item(
            "Education Background",
            resume.is_some_and(|r| !r.education.is_empty()),
        ),
        presence_item(
            "Certifications",
            resume.is_some_and(|r| !r.certificates.is_empty()),
        ),
    ];

    let additional = vec![
        presence_item(
            "GitHub Profile",
            info.is_some_and(|i| !i.github_link.trim().is_empty()),
        ),
        presence_item(
            "Achievements",
            resume.is_some_and(|r| !r.achievements.is_empty()),
        ),
        presence_item(
            "Salary Expectation",
            info.is_some_and(|i| !i.salary_expectation.trim().is_empty()),
        ),
    ];

    let sections = vec![
        score_section("basicInfo", BASIC_INFO_WEIGHT, basic_info),
        score_section("contactInfo", CONTACT_INFO_WEIGHT, contact_info),
        score_section("professional", PROFESSIONAL_WEIGHT, professional),
        score_section("education", EDUCATION_WEIGHT, education),
        score_section("additional", ADDITIONAL_WEIGHT, additional),
    ];

    let total: f64 = sections
        .iter()
        .map(|s| (s.percentage_fraction()) * s.weight as f64)
        .sum();

    CompletenessReport {
        overall: (total.round() as i64).clamp(0, 100) as u32,
        sections,
    }
}

/// The missing checklist items, tagged and sorted by priority, top 5.
/// Partial items are already earning credit and are not re-suggested.
pub fn next_steps(report: &CompletenessReport) -> Vec<NextStep> {
    let mut suggestions: Vec<NextStep> = report
        .sections
        .iter()
        .flat_map(|section| {
            section
                .items
                .iter()
                .filter(|item| item.status == ItemStatus::Missing)
                .map(|item| NextStep {
                    item: item.name.clone(),
                    section: section.section.clone(),
                    priority: section_priority(&section.section),
                })
        })
        .collect();

    // Stable sort keeps section order within the same priority.
    suggestions.sort_by(|a, b| b.priority.cmp(&a.priority));
    suggestions.truncate(5);
    suggestions
}

fn section_priority(section: &str) -> Priority {
    match section {
        "basicInfo" | "professional" => Priority::High,
        "additional" => Priority::Low,
        _ => Priority::Medium,
    }
}

impl SectionCompletion {
    fn percentage_fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let credit: f64 = self
            .items
            .iter()
            .map(|item| match item.status {
                ItemStatus::Complete => 1.0,
                ItemStatus::Partial => 0.5,
                ItemStatus::Missing => 0.0,
            })
            .sum();
        credit / self.total as f64
    }
}

fn score_section(
    section: &'static str,
    weight: u32,
    items: Vec<ChecklistItem>,
) -> SectionCompletion {
    let completed = items
        .iter()
        .filter(|i| i.status == ItemStatus::Complete)
        .count();
    let total = items.len();

    let mut scored = SectionCompletion {
        section: section.to_string(),
        weight,
        percentage: 0,
        completed,
        total,
        items,
    };
    scored.percentage = (scored.percentage_fraction() * 100.0).round() as u32;
    scored
}

fn presence_item(name: &str, present: bool) -> ChecklistItem {
    if present {
        complete(name)
    } else {
        missing(name)
    }
}

fn complete(name: &str) -> ChecklistItem {
    ChecklistItem {
        name: name.to_string(),
        status: ItemStatus::Complete,
    }
}

fn partial(name: &str) -> ChecklistItem {
    ChecklistItem {
        name: name.to_string(),
        status: ItemStatus::Partial,
    }
}

fn missing(name: &str) -> ChecklistItem {
    ChecklistItem {
        name: name.to_string(),
        status: ItemStatus::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Achievement, Certificate, Education, Experience, PersonalInfo, Project};

    fn full_resume() -> ParsedResume {
        ParsedResume {
            personal_info: PersonalInfo {
                name: "Jane Doe".into(),
                email: "jane@x.com".into(),
                phone: "+1 555 0100".into(),
                location: "Berlin".into(),
                bio: "Engineer with a decade of systems work".into(),
                linkedin_link: "https://linkedin.com/in/jane".into(),
                github_link: "https://github.com/jane".into(),
                salary_expectation: "120k".into(),
                ..Default::default()
            },
            experience: vec![Experience::default(), Experience::default()],
            education: vec![Education::default()],
            projects: vec![Project::default()],
            achievements: vec![Achievement::default()],
            certificates: vec![Certificate::default()],
            skills: vec!["Rust".into(), "SQL".into(), "Go".into(), "C".into(), "K8s".into()],
            additional_information: vec![],
        }
    }

    #[test]
    fn test_empty_profile_scores_zero() {
        let report = compute_completeness("", "", None);
        assert_eq!(report.overall, 0);
        assert_eq!(report.sections.len(), 5);
        let weights: u32 = report.sections.iter().map(|s| s.weight).sum();
        assert_eq!(weights, 100);
    }

    #[test]
    fn test_name_and_email_only() {
        let report = compute_completeness("Jane", "jane@x.com", None);
        // basicInfo: 2 of 3 items complete, 25-point weight.
        assert_eq!(report.overall, 17);
        assert_eq!(report.sections[0].completed, 2);
        assert_eq!(report.sections[0].percentage, 67);
    }

    #[test]
    fn test_full_profile_scores_hundred() {
        let resume = full_resume();
        let report = compute_completeness("Jane", "jane@x.com", Some(&resume));
        assert_eq!(report.overall, 100);
        for section in &report.sections {
            assert_eq!(section.percentage, 100);
        }
    }

    #[test]
    fn test_single_experience_is_partial_credit() {
        let mut resume = full_resume();
        resume.experience.truncate(1);

        let report = compute_completeness("Jane", "jane@x.com", Some(&resume));
        // Professional loses half an item: 35 * (0.5 / 3) off a full score.
        assert_eq!(report.overall, 94);

        let professional = &report.sections[2];
        assert_eq!(professional.percentage, 83);
        assert_eq!(
            professional.items[0].status,
            ItemStatus::Partial
        );
    }

    #[test]
    fn test_three_skills_is_partial_credit() {
        let mut resume = full_resume();
        resume.skills.truncate(3);

        let report = compute_completeness("Jane", "jane@x.com", Some(&resume));
        let professional = &report.sections[2];
        assert_eq!(professional.items[1].status, ItemStatus::Partial);
        assert_eq!(professional.items[1].name, "Skills (5+ recommended)");
    }

    #[test]
    fn test_short_bio_is_missing() {
        let mut resume = full_resume();
        resume.personal_info.bio = "Too short".into();

        let report = compute_completeness("Jane", "jane@x.com", Some(&resume));
        let basic = &report.sections[0];
        assert_eq!(basic.items[2].status, ItemStatus::Missing);
        assert_eq!(basic.items[2].name, "Professional Bio (20+ characters)");
    }

    #[test]
    fn test_score_never_exceeds_bounds() {
        let resume = full_resume();
        let report = compute_completeness("Jane", "jane@x.com", Some(&resume));
        assert!(report.overall <= 100);
        let report = compute_completeness("", "", None);
        assert_eq!(report.overall, 0);
    }

    #[test]
    fn test_next_steps_priority_order_and_cap() {
        let report = compute_completeness("", "", None);
        let steps = next_steps(&report);

        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0].priority, Priority::High);
        // High-priority basicInfo items come before contactInfo's medium.
        assert_eq!(steps[0].section, "basicInfo");
        for pair in steps.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
    }

    #[test]
    fn test_partial_items_are_not_suggested() {
        let mut resume = full_resume();
        resume.experience.truncate(1);

        let report = compute_completeness("Jane", "jane@x.com", Some(&resume));
        let steps = next_steps(&report);
        assert!(steps.iter().all(|s| !s.item.starts_with("Work Experience")));
    }

    #[test]
    fn test_deterministic() {
        let resume = full_resume();
        let a = compute_completeness("Jane", "jane@x.com", Some(&resume));
        let b = compute_completeness("Jane", "jane@x.com", Some(&resume));
        assert_eq!(a.overall, b.overall);
    }
}

//! Structured résumé — the canonical in-memory shape used as tailoring input
//! and returned as the tailored draft.
//!
//! Wire names follow the résumé-create payload: camelCase keys, with the
//! professional summary carried under `description`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::tailoring::bullets::split_bullets;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredResume {
    pub title: String,
    #[serde(rename = "description")]
    pub summary: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub work_experiences: Vec<WorkExperience>,
    #[serde(default)]
    pub educations: Vec<Education>,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// A single role. `description` is a list of bullets, never one block of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub company: String,
    pub position: String,
    #[serde(default, deserialize_with = "deserialize_bullets")]
    pub description: Vec<String>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
}

impl WorkExperience {
    /// End date as seen downstream: always `None` for the current role,
    /// whatever was supplied.
    pub fn effective_end_date(&self) -> Option<NaiveDate> {
        if self.is_current {
            None
        } else {
            self.end_date
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// `level` is a free-text proficiency label ("Native", "B2", "Fluent"...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub name: String,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// Accepts the current list form and the legacy newline-joined string form.
fn deserialize_bullets<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BulletsOrText {
        Bullets(Vec<String>),
        Text(String),
    }

    Ok(match Option::<BulletsOrText>::deserialize(deserializer)? {
        Some(BulletsOrText::Bullets(bullets)) => bullets,
        Some(BulletsOrText::Text(text)) => split_bullets(&text),
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resume_uses_description_key_for_summary() {
        let resume = StructuredResume {
            title: "Backend Developer".to_string(),
            summary: "Builds services.".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&resume).unwrap();
        assert_eq!(json["description"], "Builds services.");
        assert!(json.get("summary").is_none());
        assert!(json["workExperiences"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_work_experience_accepts_bullet_list() {
        let json = r#"{
            "company": "Acme",
            "position": "Engineer",
            "description": ["Built X", "Shipped Y"],
            "startDate": "2021-03-01",
            "endDate": null,
            "isCurrent": true
        }"#;
        let exp: WorkExperience = serde_json::from_str(json).unwrap();
        assert_eq!(exp.description, vec!["Built X", "Shipped Y"]);
        assert_eq!(exp.start_date, date(2021, 3, 1));
        assert!(exp.is_current);
    }

    #[test]
    fn test_work_experience_accepts_legacy_newline_text() {
        let json = r#"{
            "company": "Acme",
            "position": "Engineer",
            "description": "Built X\n\n  Shipped Y  \n",
            "startDate": "2019-01-15",
            "endDate": "2020-06-30"
        }"#;
        let exp: WorkExperience = serde_json::from_str(json).unwrap();
        assert_eq!(exp.description, vec!["Built X", "Shipped Y"]);
        assert_eq!(exp.end_date, Some(date(2020, 6, 30)));
        assert!(!exp.is_current);
    }

    #[test]
    fn test_work_experience_serializes_bullets_as_list() {
        let exp = WorkExperience {
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            description: vec!["One".to_string(), "Two".to_string()],
            start_date: date(2020, 1, 1),
            end_date: None,
            is_current: false,
        };
        let json = serde_json::to_value(&exp).unwrap();
        assert_eq!(json["description"], serde_json::json!(["One", "Two"]));
        assert_eq!(json["startDate"], "2020-01-01");
    }

    #[test]
    fn test_effective_end_date_ignored_for_current_role() {
        let mut exp = WorkExperience {
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            description: vec![],
            start_date: date(2020, 1, 1),
            end_date: Some(date(2023, 1, 1)),
            is_current: true,
        };
        assert_eq!(exp.effective_end_date(), None);

        exp.is_current = false;
        assert_eq!(exp.effective_end_date(), Some(date(2023, 1, 1)));
    }
}

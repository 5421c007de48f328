//! Response Normalizer — rebuilds a `StructuredResume` from the model's JSON.
//!
//! The parsed response is walked as a `serde_json::Value` with explicit
//! per-field rules instead of being deserialized straight into the target
//! types. Only two things are rejected: text that is not JSON, and JSON whose
//! top level is not an object. Every other deviation is repaired:
//!
//! - `title` / `description` / `imageUrl` fall back to the original résumé
//! - collections are replaced wholesale; an absent collection is empty
//! - missing string sub-fields become `""`
//! - `description` bullets accept an array or a newline-joined string
//! - an unparseable required date becomes today (a visible sentinel)
//! - an unparseable optional date becomes `None`

use chrono::{NaiveDate, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::models::resume::{Education, Language, Project, StructuredResume, WorkExperience};
use crate::tailoring::bullets::split_bullets;
use crate::tailoring::dates::parse_lenient;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("tailoring response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("tailoring response is a JSON {found}, expected an object")]
    NotAnObject { found: &'static str },
}

/// Parses `json_text` and repairs it into a résumé, falling back to `original`
/// for omitted scalar fields.
pub fn normalize(json_text: &str, original: &StructuredResume) -> Result<StructuredResume, ParseError> {
    let root: Value = serde_json::from_str(json_text)?;
    let obj = match root {
        Value::Object(map) => map,
        other => {
            return Err(ParseError::NotAnObject {
                found: kind_of(&other),
            })
        }
    };

    Ok(StructuredResume {
        title: string_field(&obj, "title").unwrap_or_else(|| original.title.clone()),
        summary: string_field(&obj, "description").unwrap_or_else(|| original.summary.clone()),
        image_url: match obj.get("imageUrl") {
            Some(Value::String(url)) => Some(url.clone()),
            _ => original.image_url.clone(),
        },
        work_experiences: objects(&obj, "workExperiences").map(work_experience).collect(),
        educations: objects(&obj, "educations").map(education).collect(),
        languages: objects(&obj, "languages").map(language).collect(),
        projects: objects(&obj, "projects").map(project).collect(),
        skills: skills(&obj),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Per-entry rules
// ────────────────────────────────────────────────────────────────────────────

fn work_experience(item: &Map<String, Value>) -> WorkExperience {
    let is_current = item
        .get("isCurrent")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    // a current role never carries an end date downstream
    let end_date = if is_current {
        None
    } else {
        optional_date(item, "endDate")
    };

    WorkExperience {
        company: string_or_empty(item, "company"),
        position: string_or_empty(item, "position"),
        description: bullets(item.get("description")),
        start_date: required_date(item, "startDate"),
        end_date,
        is_current,
    }
}

fn education(item: &Map<String, Value>) -> Education {
    Education {
        school: string_or_empty(item, "school"),
        degree: string_or_empty(item, "degree"),
        field_of_study: string_or_empty(item, "fieldOfStudy"),
        start_date: required_date(item, "startDate"),
        end_date: optional_date(item, "endDate"),
    }
}

fn language(item: &Map<String, Value>) -> Language {
    Language {
        name: string_or_empty(item, "name"),
        level: string_or_empty(item, "level"),
    }
}

fn project(item: &Map<String, Value>) -> Project {
    Project {
        title: string_or_empty(item, "title"),
        description: string_or_empty(item, "description"),
        link: string_field(item, "link").filter(|l| !l.trim().is_empty()),
    }
}

/// Bullets from either an array of strings or one newline-joined string.
fn bullets(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(text)) => split_bullets(text),
        _ => Vec::new(),
    }
}

fn skills(obj: &Map<String, Value>) -> Vec<String> {
    match obj.get("skills") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field accessors
// ────────────────────────────────────────────────────────────────────────────

/// Object elements of the array under `key`. Absent, null or non-array values
/// yield nothing; non-object elements are skipped.
fn objects<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    obj.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_or_empty(obj: &Map<String, Value>, key: &str) -> String {
    string_field(obj, key).unwrap_or_default()
}

fn required_date(obj: &Map<String, Value>, key: &str) -> NaiveDate {
    match obj.get(key).and_then(Value::as_str).and_then(parse_lenient) {
        Some(date) => date,
        None => {
            let today = Utc::now().date_naive();
            warn!(
                "Unparseable {} {:?} in tailoring response, defaulting to {}",
                key,
                obj.get(key),
                today
            );
            today
        }
    }
}

fn optional_date(obj: &Map<String, Value>, key: &str) -> Option<NaiveDate> {
    obj.get(key).and_then(Value::as_str).and_then(parse_lenient)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

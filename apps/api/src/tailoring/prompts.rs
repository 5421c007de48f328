//! Prompt Builder — renders a résumé and a job description into the
//! system/user message pair every provider receives.

use serde_json::{json, Value};

use crate::llm_client::PromptPayload;
use crate::models::resume::StructuredResume;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// System instructions for tailoring. Field names in the schema are fixed by contract.
pub const TAILOR_SYSTEM: &str = r#"You are a professional CV/resume tailoring expert. Your task is to modify a candidate's resume to better match a job description.

Return ONLY a JSON object with this exact structure:
{
  "title": "Professional title tailored to the job",
  "description": "Professional summary tailored to highlight relevant experience",
  "imageUrl": "preserve from input or null",
  "workExperiences": [
    {
      "company": "string",
      "position": "string",
      "description": ["Short action + result bullet", "Another bullet"],
      "startDate": "YYYY-MM-DD",
      "endDate": "YYYY-MM-DD or null",
      "isCurrent": false
    }
  ],
  "educations": [
    {
      "school": "string",
      "degree": "string",
      "fieldOfStudy": "string",
      "startDate": "YYYY-MM-DD",
      "endDate": "YYYY-MM-DD or null"
    }
  ],
  "languages": [{"name": "string", "level": "string"}],
  "projects": [
    {
      "title": "string",
      "description": "string",
      "link": "string or null"
    }
  ],
  "skills": ["string"]
}

Rules:
- Preserve all factual data (companies, positions, schools, degrees, dates). Only rephrase prose and reorder/emphasize to match the job.
- Use the exact date format YYYY-MM-DD. Use null for endDate when there is no end date or the role is current.
- Each work experience "description" MUST be a JSON array of short bullets, each one an action followed by its result.
- Write bullets for the current role (isCurrent = true) in present tense; write every other role in past tense.
- Keep skills high-signal and logically ordered, most relevant to the job first.
- Keep the same number of work experiences, educations, languages and projects unless the job description clearly demands a different focus.
- Output ONLY the JSON object. No markdown, no code fences, no explanation."#;

/// User message template. Replace `{resume_json}` and `{job_description}`.
pub const TAILOR_USER_TEMPLATE: &str = r#"Current resume (JSON):
{resume_json}

Job description to tailor for:
{job_description}

Return ONLY valid JSON matching the schema above. Use YYYY-MM-DD for dates.
Preserve original dates from the resume. Keep imageUrl if present."#;

/// Builds the tailoring prompt. Pure and infallible.
pub fn build_prompt(resume: &StructuredResume, job_description: &str) -> PromptPayload {
    let resume_json = resume_to_prompt_json(resume).to_string();

    PromptPayload {
        system_instructions: TAILOR_SYSTEM.to_string(),
        user_content: fill_template(
            TAILOR_USER_TEMPLATE,
            &[
                ("{resume_json}", resume_json.as_str()),
                ("{job_description}", job_description.trim()),
            ],
        ),
    }
}

/// Substitutes placeholders in one left-to-right pass over `template`.
/// Substituted values are never rescanned, so placeholder text inside them survives.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((at, key, value)) = values
        .iter()
        .filter_map(|(key, value)| rest.find(key).map(|at| (at, *key, *value)))
        .min_by_key(|(at, _, _)| *at)
    {
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + key.len()..];
    }

    out.push_str(rest);
    out
}

/// Compact JSON view of the résumé with `YYYY-MM-DD` dates and bullets kept as a list.
fn resume_to_prompt_json(resume: &StructuredResume) -> Value {
    json!({
        "title": resume.title,
        "description": resume.summary,
        "imageUrl": resume.image_url,
        "workExperiences": resume.work_experiences.iter().map(|w| json!({
            "company": w.company,
            "position": w.position,
            "description": w.description,
            "startDate": w.start_date.format(DATE_FORMAT).to_string(),
            "endDate": w.effective_end_date().map(|d| d.format(DATE_FORMAT).to_string()),
            "isCurrent": w.is_current,
        })).collect::<Vec<_>>(),
        "educations": resume.educations.iter().map(|e| json!({
            "school": e.school,
            "degree": e.degree,
            "fieldOfStudy": e.field_of_study,
            "startDate": e.start_date.format(DATE_FORMAT).to_string(),
            "endDate": e.end_date.map(|d| d.format(DATE_FORMAT).to_string()),
        })).collect::<Vec<_>>(),
        "languages": resume.languages.iter().map(|l| json!({
            "name": l.name,
            "level": l.level,
        })).collect::<Vec<_>>(),
        "projects": resume.projects.iter().map(|p| json!({
            "title": p.title,
            "description": p.description,
            "link": p.link,
        })).collect::<Vec<_>>(),
        "skills": resume.skills,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Education, WorkExperience};
    use chrono::NaiveDate;

    fn sample_resume() -> StructuredResume {
        StructuredResume {
            title: "Backend Developer".to_string(),
            summary: "Five years of API work.".to_string(),
            image_url: Some("https://cdn.example.com/me.png".to_string()),
            work_experiences: vec![WorkExperience {
                company: "Acme".to_string(),
                position: "Engineer".to_string(),
                description: vec!["Built billing".to_string(), "Ran on-call".to_string()],
                start_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
                end_date: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                is_current: true,
            }],
            educations: vec![Education {
                school: "TU Delft".to_string(),
                degree: "BSc".to_string(),
                field_of_study: "Computer Science".to_string(),
                start_date: NaiveDate::from_ymd_opt(2015, 9, 1).unwrap(),
                end_date: Some(NaiveDate::from_ymd_opt(2019, 7, 15).unwrap()),
            }],
            skills: vec!["Go".to_string(), "Postgres".to_string()],
            ..Default::default()
        }
    }

    /// Pulls the résumé JSON line back out of the user message.
    fn embedded_resume(payload: &PromptPayload) -> Value {
        let line = payload
            .user_content
            .lines()
            .nth(1)
            .expect("resume JSON on the second line");
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_resume_is_embedded_as_compact_json() {
        let payload = build_prompt(&sample_resume(), "Senior Go engineer");
        let json = embedded_resume(&payload);

        assert_eq!(json["title"], "Backend Developer");
        assert_eq!(json["description"], "Five years of API work.");
        assert_eq!(json["imageUrl"], "https://cdn.example.com/me.png");
        assert_eq!(json["skills"], json!(["Go", "Postgres"]));
    }

    #[test]
    fn test_dates_render_as_iso_days() {
        let json = embedded_resume(&build_prompt(&sample_resume(), "JD"));
        assert_eq!(json["workExperiences"][0]["startDate"], "2021-03-01");
        assert_eq!(json["educations"][0]["startDate"], "2015-09-01");
        assert_eq!(json["educations"][0]["endDate"], "2019-07-15");
    }

    #[test]
    fn test_bullets_stay_a_list() {
        let json = embedded_resume(&build_prompt(&sample_resume(), "JD"));
        assert_eq!(
            json["workExperiences"][0]["description"],
            json!(["Built billing", "Ran on-call"])
        );
    }

    #[test]
    fn test_current_role_is_sent_without_end_date() {
        let json = embedded_resume(&build_prompt(&sample_resume(), "JD"));
        assert!(json["workExperiences"][0]["endDate"].is_null());
        assert_eq!(json["workExperiences"][0]["isCurrent"], true);
    }

    #[test]
    fn test_job_description_and_instructions_are_included() {
        let payload = build_prompt(&sample_resume(), "  We need a Rust engineer.  ");
        assert!(payload
            .user_content
            .contains("Job description to tailor for:\nWe need a Rust engineer."));
        assert_eq!(payload.system_instructions, TAILOR_SYSTEM);
        assert!(payload.system_instructions.contains("present tense"));
        assert!(payload.system_instructions.contains("\"fieldOfStudy\""));
    }

    #[test]
    fn test_placeholder_text_in_resume_is_preserved() {
        let resume = StructuredResume {
            title: "Uses {job_description} templates".to_string(),
            ..sample_resume()
        };
        let payload = build_prompt(&resume, "JD-TEXT");

        let json = embedded_resume(&payload);
        assert_eq!(json["title"], "Uses {job_description} templates");
        assert_eq!(payload.user_content.matches("JD-TEXT").count(), 1);
    }

    #[test]
    fn test_placeholder_text_in_job_description_is_preserved() {
        let payload = build_prompt(&sample_resume(), "Paste {resume_json} here");
        assert!(payload.user_content.contains("Paste {resume_json} here"));
        assert_eq!(embedded_resume(&payload)["title"], "Backend Developer");
    }

    #[test]
    fn test_fill_template_replaces_each_placeholder() {
        assert_eq!(
            fill_template("{a} and {b}, again {a}", &[("{a}", "1"), ("{b}", "{a}")]),
            "1 and {a}, again 1"
        );
        assert_eq!(fill_template("no placeholders", &[("{a}", "1")]), "no placeholders");
    }

    #[test]
    fn test_empty_resume_still_builds() {
        let payload = build_prompt(&StructuredResume::default(), "");
        let json = embedded_resume(&payload);
        assert!(json["workExperiences"].as_array().unwrap().is_empty());
        assert!(json["imageUrl"].is_null());
    }
}

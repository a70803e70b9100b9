//! Outreach request types and required-field validation.
//!
//! Each feature declares which fields it requires; validation runs before any
//! proxy call and reports every missing field at once, not just the first.

use serde::Deserialize;

use crate::errors::AppError;

/// Why the user is reaching out on LinkedIn. Drives which form fields are
/// required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkedInIntent {
    Interview,
    Connections,
    Network,
    Followup,
}

impl LinkedInIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkedInIntent::Interview => "interview",
            LinkedInIntent::Connections => "connections",
            LinkedInIntent::Network => "network",
            LinkedInIntent::Followup => "followup",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkedInFields {
    #[serde(default)]
    pub job_function: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub current_job: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub job_title: String,
    /// Optional for every intent.
    #[serde(default)]
    pub resume: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkedInNoteRequest {
    pub intent: Option<LinkedInIntent>,
    #[serde(default)]
    pub fields: LinkedInFields,
}

impl LinkedInNoteRequest {
    /// Field set the chosen intent requires, as (name, value) pairs.
    fn required_fields(&self, intent: LinkedInIntent) -> Vec<(&'static str, &str)> {
        let f = &self.fields;
        match intent {
            LinkedInIntent::Interview => vec![
                ("job_function", f.job_function.as_str()),
                ("company", f.company.as_str()),
            ],
            LinkedInIntent::Connections => vec![
                ("role", f.role.as_str()),
                ("company", f.company.as_str()),
                ("current_job", f.current_job.as_str()),
            ],
            LinkedInIntent::Network => vec![("current_job", f.current_job.as_str())],
            LinkedInIntent::Followup => vec![
                ("role", f.role.as_str()),
                ("company", f.company.as_str()),
                ("first_name", f.first_name.as_str()),
                ("job_title", f.job_title.as_str()),
            ],
        }
    }

    /// Validates the request and returns the resolved intent.
    pub fn validate(&self) -> Result<LinkedInIntent, AppError> {
        let intent = self
            .intent
            .ok_or_else(|| AppError::Validation("Please select an intent".to_string()))?;

        let missing: Vec<&str> = self
            .required_fields(intent)
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();

        if missing.is_empty() {
            Ok(intent)
        } else {
            Err(missing_fields_error(&missing))
        }
    }

    /// Non-empty form values keyed by the collaborator's wire names.
    pub fn form_entries(&self) -> Vec<(&'static str, &str)> {
        let f = &self.fields;
        [
            ("jobFunction", f.job_function.as_str()),
            ("company", f.company.as_str()),
            ("role", f.role.as_str()),
            ("currentJob", f.current_job.as_str()),
            ("firstName", f.first_name.as_str()),
            ("jobTitle", f.job_title.as_str()),
            ("resume", f.resume.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColdEmailRequest {
    #[serde(default)]
    pub key_points: String,
    #[serde(default)]
    pub resume: String,
}

impl ColdEmailRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.key_points.trim().is_empty() {
            return Err(missing_fields_error(&["key_points"]));
        }
        Ok(())
    }
}

/// The HR contact the email targets. The address is only needed for the
/// compose links, never for generation itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HrEmailRequest {
    #[serde(default)]
    pub contact: ContactRef,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub key_points: String,
}

impl HrEmailRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let missing: Vec<&str> = [
            ("contact.name", self.contact.name.as_str()),
            ("contact.position", self.contact.position.as_str()),
            ("company", self.company.as_str()),
            ("key_points", self.key_points.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing_fields_error(&missing))
        }
    }
}

fn missing_fields_error(missing: &[&str]) -> AppError {
    AppError::Validation(format!("Missing required fields: {}", missing.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn interview_intent_requires_job_function_and_company() {
        let request = LinkedInNoteRequest {
            intent: Some(LinkedInIntent::Interview),
            ..Default::default()
        };
        let msg = validation_message(request.validate().unwrap_err());
        assert_eq!(msg, "Missing required fields: job_function, company");
    }

    #[test]
    fn followup_intent_requires_four_fields() {
        let request = LinkedInNoteRequest {
            intent: Some(LinkedInIntent::Followup),
            fields: LinkedInFields {
                role: "Product Manager".to_string(),
                ..Default::default()
            },
        };
        let msg = validation_message(request.validate().unwrap_err());
        assert_eq!(msg, "Missing required fields: company, first_name, job_title");
    }

    #[test]
    fn resume_is_never_required() {
        let request = LinkedInNoteRequest {
            intent: Some(LinkedInIntent::Network),
            fields: LinkedInFields {
                current_job: "Data Analyst".to_string(),
                ..Default::default()
            },
        };
        assert_eq!(request.validate().unwrap(), LinkedInIntent::Network);
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let request = LinkedInNoteRequest {
            intent: Some(LinkedInIntent::Network),
            fields: LinkedInFields {
                current_job: "   ".to_string(),
                ..Default::default()
            },
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn missing_intent_is_its_own_error() {
        let request = LinkedInNoteRequest::default();
        let msg = validation_message(request.validate().unwrap_err());
        assert_eq!(msg, "Please select an intent");
    }

    #[test]
    fn form_entries_skip_empty_fields_and_use_wire_names() {
        let request = LinkedInNoteRequest {
            intent: Some(LinkedInIntent::Interview),
            fields: LinkedInFields {
                job_function: "Product Designer".to_string(),
                company: "Netflix".to_string(),
                ..Default::default()
            },
        };
        let entries = request.form_entries();
        assert_eq!(
            entries,
            vec![("jobFunction", "Product Designer"), ("company", "Netflix")]
        );
    }

    #[test]
    fn cold_email_requires_key_points() {
        let request = ColdEmailRequest::default();
        let msg = validation_message(request.validate().unwrap_err());
        assert_eq!(msg, "Missing required fields: key_points");

        let ok = ColdEmailRequest {
            key_points: "Ask for referral".to_string(),
            resume: String::new(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn hr_email_reports_every_missing_field() {
        let request = HrEmailRequest {
            company: "Acme".to_string(),
            ..Default::default()
        };
        let msg = validation_message(request.validate().unwrap_err());
        assert_eq!(
            msg,
            "Missing required fields: contact.name, contact.position, key_points"
        );
    }

    #[test]
    fn complete_hr_request_passes() {
        let request = HrEmailRequest {
            contact: ContactRef {
                name: "Sarah Johnson".to_string(),
                position: "HR Manager".to_string(),
                email: "sarah.j@company.com".to_string(),
            },
            company: "Acme".to_string(),
            key_points: "Referral".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}

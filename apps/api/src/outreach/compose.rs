//! Turning generated text into actionable links: mail-client handoff and a
//! LinkedIn people-search URL built from the note form.

use url::form_urlencoded;
use urlencoding::encode;

use crate::outreach::request::{LinkedInIntent, LinkedInNoteRequest};

const DEFAULT_SUBJECT: &str = "Following up on my application";
const LINKEDIN_SEARCH_URL: &str = "https://www.linkedin.com/search/results/people/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailParts {
    pub subject: String,
    pub body: String,
}

/// Parses a leading `Subject:` line (case-insensitive) out of generated text.
/// The remainder becomes the body; without a subject line the whole text is
/// the body under a default subject.
pub fn split_subject(text: &str) -> MailParts {
    let lines: Vec<&str> = text.split('\n').collect();

    let (subject, body_start) = match lines
        .iter()
        .enumerate()
        .find_map(|(index, line)| strip_subject_prefix(line).map(|rest| (index, rest)))
    {
        Some((index, rest)) => (rest.to_string(), index + 1),
        None => (DEFAULT_SUBJECT.to_string(), 0),
    };

    let body = lines[body_start..].join("\n").trim().to_string();

    MailParts { subject, body }
}

fn strip_subject_prefix(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.len() < 8 || !trimmed.is_char_boundary(8) {
        return None;
    }
    let (prefix, rest) = trimmed.split_at(8);
    prefix
        .eq_ignore_ascii_case("subject:")
        .then(|| rest.trim_start())
}

/// `mailto:` link with percent-encoded subject and body. The recipient may
/// be empty (cold emails have no preselected contact).
pub fn mailto_link(to: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{to}?subject={}&body={}",
        encode(subject),
        encode(body)
    )
}

/// Gmail compose link. Query pairs are form-urlencoded; the body parameter
/// is omitted entirely when the body is empty.
pub fn gmail_compose_link(to: &str, subject: &str, body: &str) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("view", "cm")
        .append_pair("fs", "1")
        .append_pair("to", to)
        .append_pair("su", subject);
    if !body.is_empty() {
        query.append_pair("body", body);
    }
    format!("https://mail.google.com/mail/?{}", query.finish())
}

/// People-search URL for the note form. Interview and connection intents get
/// recruiting keywords (plus QA-specific terms when the role calls for them);
/// other intents search just the role and company.
pub fn linkedin_search_url(request: &LinkedInNoteRequest) -> String {
    let role = first_non_empty(&[&request.fields.role, &request.fields.job_function, "hiring"]);
    let company = request.fields.company.as_str();

    let mut terms: Vec<String> = Vec::new();
    let targeted = matches!(
        request.intent,
        Some(LinkedInIntent::Interview) | Some(LinkedInIntent::Connections)
    );

    if targeted {
        terms.push(format!("\"{role}\""));
        terms.push(format!("\"{company}\""));
        for keyword in ["hiring", "talent", "acquisition", "HR"] {
            terms.push(format!("\"{keyword}\""));
        }
        let role_lower = role.to_lowercase();
        if role_lower.contains("qa") || role_lower.contains("quality") {
            terms.push("\"quality assurance\"".to_string());
            terms.push("\"testing\"".to_string());
        }
    } else {
        terms.push(format!("\"{role}\""));
        terms.push(format!("\"{company}\""));
    }

    let keywords = encode(&terms.join(" + ")).into_owned();
    format!("{LINKEDIN_SEARCH_URL}?keywords={keywords}&origin=GLOBAL_SEARCH_HEADER")
}

fn first_non_empty<'a>(candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|value| !value.trim().is_empty())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outreach::fallback::fallback_hr_email;
    use crate::outreach::request::LinkedInFields;

    #[test]
    fn extracts_subject_and_body_from_generated_email() {
        let email = fallback_hr_email("Jane Doe", "Acme", "Led 3 product launches");
        let parts = split_subject(&email);
        assert_eq!(parts.subject, "Exploring opportunities with Acme");
        assert!(parts.body.starts_with("Hi Jane,"));
    }

    #[test]
    fn subject_match_is_case_insensitive() {
        let parts = split_subject("SUBJECT: Hello there\n\nBody line");
        assert_eq!(parts.subject, "Hello there");
        assert_eq!(parts.body, "Body line");
    }

    #[test]
    fn missing_subject_line_uses_the_default() {
        let parts = split_subject("Just a body\nwith two lines");
        assert_eq!(parts.subject, DEFAULT_SUBJECT);
        assert_eq!(parts.body, "Just a body\nwith two lines");
    }

    #[test]
    fn subject_line_is_found_anywhere_in_the_text() {
        let parts = split_subject("Here is your email:\nSubject: Direct ask\nHello\nBye");
        assert_eq!(parts.subject, "Direct ask");
        assert_eq!(parts.body, "Hello\nBye");
    }

    #[test]
    fn bare_subject_prefix_yields_empty_subject() {
        let parts = split_subject("Subject:\nBody");
        assert_eq!(parts.subject, "");
        assert_eq!(parts.body, "Body");
    }

    #[test]
    fn mailto_link_percent_encodes() {
        let link = mailto_link("a@b.com", "Hello World", "Line one\nLine two");
        assert_eq!(
            link,
            "mailto:a@b.com?subject=Hello%20World&body=Line%20one%0ALine%20two"
        );
    }

    #[test]
    fn mailto_link_allows_empty_recipient() {
        let link = mailto_link("", "S", "B");
        assert!(link.starts_with("mailto:?subject="));
    }

    #[test]
    fn gmail_link_form_encodes_and_skips_empty_body() {
        let link = gmail_compose_link("hr@acme.com", "Quick question", "");
        assert_eq!(
            link,
            "https://mail.google.com/mail/?view=cm&fs=1&to=hr%40acme.com&su=Quick+question"
        );

        let with_body = gmail_compose_link("hr@acme.com", "S", "Hi there");
        assert!(with_body.ends_with("&body=Hi+there"));
    }

    #[test]
    fn interview_search_includes_recruiting_keywords() {
        let request = LinkedInNoteRequest {
            intent: Some(LinkedInIntent::Interview),
            fields: LinkedInFields {
                job_function: "Product Designer".to_string(),
                company: "Netflix".to_string(),
                ..Default::default()
            },
        };
        let url = linkedin_search_url(&request);
        assert!(url.starts_with(LINKEDIN_SEARCH_URL));
        let decoded = urlencoding::decode(url.split("keywords=").nth(1).unwrap().split('&').next().unwrap())
            .unwrap()
            .into_owned();
        assert_eq!(
            decoded,
            "\"Product Designer\" + \"Netflix\" + \"hiring\" + \"talent\" + \"acquisition\" + \"HR\""
        );
    }

    #[test]
    fn qa_roles_get_extra_search_terms() {
        let request = LinkedInNoteRequest {
            intent: Some(LinkedInIntent::Connections),
            fields: LinkedInFields {
                role: "QA Engineer".to_string(),
                company: "Acme".to_string(),
                current_job: "Tester".to_string(),
                ..Default::default()
            },
        };
        let url = linkedin_search_url(&request);
        let decoded = urlencoding::decode(url.split("keywords=").nth(1).unwrap().split('&').next().unwrap())
            .unwrap()
            .into_owned();
        assert!(decoded.ends_with("\"quality assurance\" + \"testing\""));
    }

    #[test]
    fn network_search_uses_only_role_and_company() {
        let request = LinkedInNoteRequest {
            intent: Some(LinkedInIntent::Network),
            fields: LinkedInFields {
                current_job: "Data Analyst".to_string(),
                company: "Acme".to_string(),
                ..Default::default()
            },
        };
        let url = linkedin_search_url(&request);
        let decoded = urlencoding::decode(url.split("keywords=").nth(1).unwrap().split('&').next().unwrap())
            .unwrap()
            .into_owned();
        assert_eq!(decoded, "\"hiring\" + \"Acme\"");
    }

    #[test]
    fn role_falls_back_to_job_function_then_hiring() {
        let request = LinkedInNoteRequest {
            intent: Some(LinkedInIntent::Interview),
            fields: LinkedInFields {
                job_function: "Recruiter".to_string(),
                company: "Acme".to_string(),
                ..Default::default()
            },
        };
        let url = linkedin_search_url(&request);
        assert!(urlencoding::decode(&url).unwrap().contains("\"Recruiter\""));
    }
}

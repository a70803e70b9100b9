//! Deterministic HR email fallback.
//!
//! When the generation proxy fails or returns an empty payload, the HR email
//! feature synthesizes an email locally from the raw inputs. Same inputs,
//! same bytes out: no network, no randomness, no retries.

const GENERIC_BULLET: &str = "- Experienced professional eager to contribute to your team";

/// Builds the fallback email from the contact name, company and the user's
/// free-text key points.
///
/// The first non-empty key-point line becomes the opening sentence and the
/// rest become bullets; both sections have generic substitutes when the
/// input has nothing to offer.
pub fn fallback_hr_email(contact_name: &str, company: &str, key_points: &str) -> String {
    let points: Vec<&str> = key_points
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let generic_intro = format!(
        "I'm reaching out about potential opportunities with {company} and would appreciate a quick conversation."
    );
    let intro = points.first().copied().unwrap_or(generic_intro.as_str());

    let bullets = if points.len() > 1 {
        points[1..]
            .iter()
            .map(|point| format!("- {point}"))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        GENERIC_BULLET.to_string()
    };

    let first_name = contact_name
        .split(' ')
        .next()
        .filter(|token| !token.is_empty())
        .unwrap_or(contact_name);

    [
        format!("Subject: Exploring opportunities with {company}"),
        String::new(),
        format!("Hi {first_name},"),
        String::new(),
        intro.to_string(),
        String::new(),
        "Key highlights:".to_string(),
        bullets,
        String::new(),
        "I would appreciate the chance to discuss how I can support your team.".to_string(),
        "Please let me know if we could schedule a quick call at your convenience.".to_string(),
        String::new(),
        "Thank you for your time and consideration.".to_string(),
        String::new(),
        "Best regards,".to_string(),
        "[Your Name]".to_string(),
        "[Your Contact Information]".to_string(),
    ]
    .join("\n")
}

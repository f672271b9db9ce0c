use colored::Colorize;
use regex::Regex;
use std::sync::LazyLock;

use crate::share::ShareMessage;
use crate::types::{QuestionnaireRecord, display_business_name};

pub const EMPTY_VALUE: &str = "(not provided yet)";

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1f]+"#).expect("valid file name pattern"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryItem {
    pub label: &'static str,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummarySection {
    pub title: &'static str,
    pub items: Vec<SummaryItem>,
}

/// Read-only, printable view of a record. The same document feeds the
/// terminal rendering and the PDF export, so both always agree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryDocument {
    pub title: String,
    pub subtitle: Option<String>,
    pub sections: Vec<SummarySection>,
}

fn item(label: &'static str, value: &str) -> SummaryItem {
    SummaryItem {
        label,
        value: value.trim().to_string(),
    }
}

impl SummaryDocument {
    pub fn from_record(record: &QuestionnaireRecord) -> Self {
        let mut additional = vec![
            item("Products and services", &record.products_services),
            item("Current challenges", &record.current_challenges),
            item("Existing logo", record.existing_logo.label()),
        ];
        if record.existing_logo.is_yes() {
            additional.push(item("Previous logo details", &record.existing_logo_details));
        }
        additional.extend([
            item("Other professionals", &record.professionals_involved),
            item("Decision makers", &record.decision_makers),
            item("Inspiration", &record.inspiration_materials),
        ]);

        Self {
            title: format!("Brand profile: {}", display_business_name(record)),
            subtitle: None,
            sections: vec![
                SummarySection {
                    title: "Business details",
                    items: vec![
                        item("Business name", &record.business_name),
                        item("In one line", &record.one_line_description),
                        item("Goal", &record.business_goal),
                    ],
                },
                SummarySection {
                    title: "Vision and values",
                    items: vec![
                        item("Vision", &record.vision),
                        item("Core values", &record.core_values),
                        item("Differentiator", &record.unique_selling_point),
                        item("Main message", &record.main_message),
                        item("Desired emotion", &record.desired_emotion),
                    ],
                },
                SummarySection {
                    title: "Target audience",
                    items: vec![
                        item("Audience", &record.target_audience),
                        item("Ideal client", &record.ideal_client_profile),
                        item("Client challenges", &record.client_challenges),
                    ],
                },
                SummarySection {
                    title: "Design and style",
                    items: vec![
                        item("Preferred style", &record.preferred_style),
                        item("Liked designs", &record.liked_designs),
                        item("Brand colours", &record.brand_colors),
                        item("Colours to avoid", &record.avoid_colors),
                        item("Fonts", &record.font_types),
                        item("Brand scale", record.vibe_scale.label()),
                    ],
                },
                SummarySection {
                    title: "Additional information",
                    items: additional,
                },
            ],
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        if let Some(subtitle) = &self.subtitle {
            out.push_str(subtitle);
            out.push('\n');
        }
        for section in &self.sections {
            out.push_str(&format!("\n--- {} ---\n", section.title));
            for entry in &section.items {
                let value = if entry.value.is_empty() { EMPTY_VALUE } else { &entry.value };
                out.push_str(&format!("{}: {}\n", entry.label, value));
            }
        }
        out
    }

    pub fn terminal_text(&self) -> String {
        let mut out = format!("{}\n", self.title.bold());
        if let Some(subtitle) = &self.subtitle {
            out.push_str(&format!("{}\n", subtitle.dimmed()));
        }
        for section in &self.sections {
            out.push_str(&format!("\n{} {}\n", "▌".cyan(), section.title.bold()));
            for entry in &section.items {
                let value = if entry.value.is_empty() {
                    EMPTY_VALUE.dimmed().italic().to_string()
                } else {
                    entry.value.clone()
                };
                out.push_str(&format!("  {} {}\n", format!("{}:", entry.label).cyan(), value));
            }
        }
        out
    }
}

/// `brand-brief-<name>.pdf`, falling back to `new-business` for a blank name.
pub fn export_file_name(record: &QuestionnaireRecord) -> String {
    let cleaned = UNSAFE_FILE_CHARS.replace_all(record.business_name.trim(), "-");
    let cleaned = cleaned.trim_matches(|c: char| c == '-' || c == '.' || c.is_whitespace());
    let stem = if cleaned.is_empty() { "new-business" } else { cleaned };
    format!("brand-brief-{stem}.pdf")
}

pub fn share_title(record: &QuestionnaireRecord) -> String {
    format!("Brand questionnaire - {}", display_business_name(record))
}

/// Short caption attached to a shared file or a messaging deep link.
pub fn share_caption(record: &QuestionnaireRecord) -> String {
    format!(
        "Hi! Here is the brand questionnaire for {}: {}",
        display_business_name(record),
        if record.one_line_description.trim().is_empty() {
            EMPTY_VALUE
        } else {
            record.one_line_description.trim()
        }
    )
}

pub fn email_subject(record: &QuestionnaireRecord) -> String {
    share_title(record)
}

/// Email body listing every answer, signed with the business name.
pub fn email_body(record: &QuestionnaireRecord) -> String {
    let signature = match record.business_name.trim() {
        "" => "Questionnaire respondent",
        name => name,
    };
    format!(
        "Hello, attached is the brand questionnaire I filled in.\n\n{}\nBest regards,\n{signature}\n",
        SummaryDocument::from_record(record).plain_text()
    )
}

/// Texts used when sending a record's brief to the studio.
pub fn share_message(record: &QuestionnaireRecord) -> ShareMessage {
    ShareMessage {
        title: share_title(record),
        caption: share_caption(record),
        email_subject: email_subject(record),
        email_body: email_body(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogoFlag;

    fn acme() -> QuestionnaireRecord {
        QuestionnaireRecord {
            business_name: "Acme".into(),
            one_line_description: "Widgets".into(),
            ..Default::default()
        }
    }

    #[test]
    fn renders_answers_verbatim() {
        let doc = SummaryDocument::from_record(&acme());
        let text = doc.plain_text();
        assert!(text.contains("Business name: Acme"));
        assert!(text.contains("In one line: Widgets"));
        assert!(text.contains(&format!("Vision: {EMPTY_VALUE}")));
        assert!(text.contains("Brand scale: Balanced"));
        assert!(doc.terminal_text().contains("Widgets"));
    }

    #[test]
    fn logo_details_only_listed_when_flag_set() {
        let mut record = acme();
        record.existing_logo_details = "Blue circle".into();
        assert!(!SummaryDocument::from_record(&record).plain_text().contains("Blue circle"));

        record.existing_logo = LogoFlag::Yes;
        assert!(SummaryDocument::from_record(&record)
            .plain_text()
            .contains("Previous logo details: Blue circle"));
    }

    #[test]
    fn email_and_caption_carry_the_answers() {
        let record = acme();
        assert_eq!(email_subject(&record), "Brand questionnaire - Acme");
        let body = email_body(&record);
        assert!(body.contains("Business name: Acme"));
        assert!(body.contains("In one line: Widgets"));
        assert!(body.trim_end().ends_with("Acme"));
        let caption = share_caption(&record);
        assert!(caption.contains("Acme") && caption.contains("Widgets"));

        let blank = email_body(&QuestionnaireRecord::default());
        assert!(blank.trim_end().ends_with("Questionnaire respondent"));
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(export_file_name(&acme()), "brand-brief-Acme.pdf");
        assert_eq!(
            export_file_name(&QuestionnaireRecord::default()),
            "brand-brief-new-business.pdf"
        );
        let record = QuestionnaireRecord {
            business_name: "A/B: \"Studio\"".into(),
            ..Default::default()
        };
        let name = export_file_name(&record);
        assert!(!name.contains('/') && !name.contains(':') && !name.contains('"'));
        assert!(name.starts_with("brand-brief-A-B"));
    }
}

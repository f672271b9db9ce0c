use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Desired brand tone, picked on a three-position slider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vibe {
    Emotional,
    #[default]
    Balanced,
    Professional,
}

impl Vibe {
    pub const ALL: [Vibe; 3] = [Vibe::Emotional, Vibe::Balanced, Vibe::Professional];

    /// Slider position to tone. Only 0, 1 and 2 are valid stops.
    pub fn from_position(position: u8) -> Option<Self> {
        match position {
            0 => Some(Vibe::Emotional),
            1 => Some(Vibe::Balanced),
            2 => Some(Vibe::Professional),
            _ => None,
        }
    }

    pub fn position(&self) -> u8 {
        match self {
            Vibe::Emotional => 0,
            Vibe::Balanced => 1,
            Vibe::Professional => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Vibe::Emotional => "emotional",
            Vibe::Balanced => "balanced",
            Vibe::Professional => "professional",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Vibe::Emotional => "Emotional / warm",
            Vibe::Balanced => "Balanced",
            Vibe::Professional => "Professional / businesslike",
        }
    }
}

impl fmt::Display for Vibe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vibe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "emotional" => Ok(Vibe::Emotional),
            "balanced" => Ok(Vibe::Balanced),
            "professional" => Ok(Vibe::Professional),
            _ => Err(format!("Unknown vibe: {s}")),
        }
    }
}

/// Whether the business already has a logo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoFlag {
    Yes,
    #[default]
    No,
}

impl LogoFlag {
    pub fn is_yes(&self) -> bool {
        matches!(self, LogoFlag::Yes)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LogoFlag::Yes => "Yes",
            LogoFlag::No => "No",
        }
    }
}

impl From<bool> for LogoFlag {
    fn from(value: bool) -> Self {
        if value { LogoFlag::Yes } else { LogoFlag::No }
    }
}

/// All answers given by one respondent.
///
/// Field names on the wire follow the layout already present in stored
/// submission files, so the struct is camelCased and every field falls back to
/// its default when absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionnaireRecord {
    // Business details
    pub business_name: String,
    pub one_line_description: String,
    pub business_goal: String,

    // Vision and values
    pub vision: String,
    pub core_values: String,
    pub unique_selling_point: String,
    pub main_message: String,
    pub desired_emotion: String,

    // Target audience
    pub target_audience: String,
    pub ideal_client_profile: String,
    pub client_challenges: String,

    // Design and style
    pub preferred_style: String,
    pub liked_designs: String,
    pub brand_colors: String,
    pub avoid_colors: String,
    pub font_types: String,
    pub vibe_scale: Vibe,

    // Additional info
    pub products_services: String,
    pub current_challenges: String,
    pub existing_logo: LogoFlag,
    pub existing_logo_details: String,
    pub professionals_involved: String,
    pub decision_makers: String,
    pub inspiration_materials: String,
}

/// Partial update produced by a form step. `None` means "leave as is".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub business_name: Option<String>,
    pub one_line_description: Option<String>,
    pub business_goal: Option<String>,
    pub vision: Option<String>,
    pub core_values: Option<String>,
    pub unique_selling_point: Option<String>,
    pub main_message: Option<String>,
    pub desired_emotion: Option<String>,
    pub target_audience: Option<String>,
    pub ideal_client_profile: Option<String>,
    pub client_challenges: Option<String>,
    pub preferred_style: Option<String>,
    pub liked_designs: Option<String>,
    pub brand_colors: Option<String>,
    pub avoid_colors: Option<String>,
    pub font_types: Option<String>,
    pub vibe_scale: Option<Vibe>,
    pub products_services: Option<String>,
    pub current_challenges: Option<String>,
    pub existing_logo: Option<LogoFlag>,
    pub existing_logo_details: Option<String>,
    pub professionals_involved: Option<String>,
    pub decision_makers: Option<String>,
    pub inspiration_materials: Option<String>,
}

/// Shallow merge: every field named in `patch` overwrites the record, every
/// other field keeps its prior value.
pub fn apply(mut record: QuestionnaireRecord, patch: RecordPatch) -> QuestionnaireRecord {
    merge_fields!(
        record,
        patch,
        business_name,
        one_line_description,
        business_goal,
        vision,
        core_values,
        unique_selling_point,
        main_message,
        desired_emotion,
        target_audience,
        ideal_client_profile,
        client_challenges,
        preferred_style,
        liked_designs,
        brand_colors,
        avoid_colors,
        font_types,
        vibe_scale,
        products_services,
        current_challenges,
        existing_logo,
        existing_logo_details,
        professionals_involved,
        decision_makers,
        inspiration_materials,
    );
    record
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    New,
    InProgress,
    Completed,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 3] = [
        SubmissionStatus::New,
        SubmissionStatus::InProgress,
        SubmissionStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::New => "new",
            SubmissionStatus::InProgress => "in_progress",
            SubmissionStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionStatus::New => "New",
            SubmissionStatus::InProgress => "In progress",
            SubmissionStatus::Completed => "Completed",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            SubmissionStatus::New => "○",
            SubmissionStatus::InProgress => "◔",
            SubmissionStatus::Completed => "●",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "new" => Ok(SubmissionStatus::New),
            "in_progress" => Ok(SubmissionStatus::InProgress),
            "completed" => Ok(SubmissionStatus::Completed),
            _ => Err(format!("Unknown submission status: {s}")),
        }
    }
}

/// Dashboard list filter. `All` lets everything through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    All,
    Only(SubmissionStatus),
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Only(SubmissionStatus::New),
        StatusFilter::Only(SubmissionStatus::InProgress),
        StatusFilter::Only(SubmissionStatus::Completed),
    ];

    pub fn matches(&self, status: SubmissionStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.label(),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => status.fmt(f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<SubmissionStatus>().map(StatusFilter::Only)
    }
}

/// A persisted record together with its review metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub submitted_at: String,
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(flatten)]
    pub record: QuestionnaireRecord,
}

impl Submission {
    pub fn new(record: QuestionnaireRecord) -> Self {
        Self {
            id: Ulid::new().to_string(),
            submitted_at: Utc::now().to_rfc3339(),
            status: SubmissionStatus::New,
            record,
        }
    }

    /// Submission date in the local timezone, or the raw string when the
    /// stored timestamp cannot be parsed.
    pub fn submitted_on(&self) -> String {
        DateTime::parse_from_rfc3339(&self.submitted_at)
            .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| self.submitted_at.clone())
    }

    pub fn display_name(&self) -> &str {
        display_business_name(&self.record)
    }
}

pub fn display_business_name(record: &QuestionnaireRecord) -> &str {
    let name = record.business_name.trim();
    if name.is_empty() { "New business" } else { name }
}

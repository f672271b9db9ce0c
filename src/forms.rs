//! Per-step form definitions.
//!
//! A step form is a pure function of the current record: it lists which
//! inputs to show and how each input maps onto a record field. Collecting the
//! answers is left to the wizard driver, which turns each answer into a
//! [`RecordPatch`] through [`Field::patch`].

use crate::steps::StepKey;
use crate::types::{LogoFlag, QuestionnaireRecord, RecordPatch, Vibe};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Line,
    Paragraph,
    VibeSlider,
    YesNo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    BusinessName,
    OneLineDescription,
    BusinessGoal,
    Vision,
    CoreValues,
    UniqueSellingPoint,
    MainMessage,
    DesiredEmotion,
    TargetAudience,
    IdealClientProfile,
    ClientChallenges,
    PreferredStyle,
    LikedDesigns,
    BrandColors,
    AvoidColors,
    FontTypes,
    VibeScale,
    ProductsServices,
    CurrentChallenges,
    ExistingLogo,
    ExistingLogoDetails,
    ProfessionalsInvolved,
    DecisionMakers,
    InspirationMaterials,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Vibe(Vibe),
    Logo(LogoFlag),
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::BusinessName => "Business name",
            Field::OneLineDescription => "One-line description",
            Field::BusinessGoal => "What is the business trying to achieve?",
            Field::Vision => "Vision",
            Field::CoreValues => "Core values",
            Field::UniqueSellingPoint => "What sets you apart?",
            Field::MainMessage => "Main message",
            Field::DesiredEmotion => "What should people feel?",
            Field::TargetAudience => "Target audience",
            Field::IdealClientProfile => "Ideal client",
            Field::ClientChallenges => "Client challenges and needs",
            Field::PreferredStyle => "Preferred design style",
            Field::LikedDesigns => "Designs or brands you like",
            Field::BrandColors => "Colours that fit",
            Field::AvoidColors => "Colours to avoid",
            Field::FontTypes => "Font preferences",
            Field::VibeScale => "Where does the brand sit on the scale?",
            Field::ProductsServices => "Products or services offered",
            Field::CurrentChallenges => "Current challenges",
            Field::ExistingLogo => "Is there an existing logo?",
            Field::ExistingLogoDetails => "What did you like or dislike about it?",
            Field::ProfessionalsInvolved => "Other professionals involved",
            Field::DecisionMakers => "Who else takes part in decisions?",
            Field::InspirationMaterials => "Existing inspiration materials",
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Field::PreferredStyle => Some("minimal / bold / classic / young / luxurious ..."),
            Field::BrandColors => Some("blue, gold, evergreen ..."),
            Field::VibeScale => Some("emotional / warm  ←→  professional / businesslike"),
            Field::InspirationMaterials => Some("links, photos, moodboards"),
            _ => None,
        }
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Field::VibeScale => InputKind::VibeSlider,
            Field::ExistingLogo => InputKind::YesNo,
            Field::BusinessName
            | Field::OneLineDescription
            | Field::CoreValues
            | Field::PreferredStyle
            | Field::BrandColors
            | Field::AvoidColors
            | Field::FontTypes => InputKind::Line,
            _ => InputKind::Paragraph,
        }
    }

    pub fn read(&self, record: &QuestionnaireRecord) -> FieldValue {
        let text = match self {
            Field::VibeScale => return FieldValue::Vibe(record.vibe_scale),
            Field::ExistingLogo => return FieldValue::Logo(record.existing_logo),
            Field::BusinessName => &record.business_name,
            Field::OneLineDescription => &record.one_line_description,
            Field::BusinessGoal => &record.business_goal,
            Field::Vision => &record.vision,
            Field::CoreValues => &record.core_values,
            Field::UniqueSellingPoint => &record.unique_selling_point,
            Field::MainMessage => &record.main_message,
            Field::DesiredEmotion => &record.desired_emotion,
            Field::TargetAudience => &record.target_audience,
            Field::IdealClientProfile => &record.ideal_client_profile,
            Field::ClientChallenges => &record.client_challenges,
            Field::PreferredStyle => &record.preferred_style,
            Field::LikedDesigns => &record.liked_designs,
            Field::BrandColors => &record.brand_colors,
            Field::AvoidColors => &record.avoid_colors,
            Field::FontTypes => &record.font_types,
            Field::ProductsServices => &record.products_services,
            Field::CurrentChallenges => &record.current_challenges,
            Field::ExistingLogoDetails => &record.existing_logo_details,
            Field::ProfessionalsInvolved => &record.professionals_involved,
            Field::DecisionMakers => &record.decision_makers,
            Field::InspirationMaterials => &record.inspiration_materials,
        };
        FieldValue::Text(text.clone())
    }

    /// Build the single-field patch for an answer. Returns `None` when the
    /// value kind does not fit the field (text for the slider, and so on).
    pub fn patch(&self, value: FieldValue) -> Option<RecordPatch> {
        let mut patch = RecordPatch::default();
        match (self, value) {
            (Field::VibeScale, FieldValue::Vibe(v)) => patch.vibe_scale = Some(v),
            (Field::ExistingLogo, FieldValue::Logo(v)) => patch.existing_logo = Some(v),
            (Field::VibeScale | Field::ExistingLogo, _) => return None,
            (_, FieldValue::Vibe(_) | FieldValue::Logo(_)) => return None,
            (field, FieldValue::Text(text)) => {
                let slot = match field {
                    Field::BusinessName => &mut patch.business_name,
                    Field::OneLineDescription => &mut patch.one_line_description,
                    Field::BusinessGoal => &mut patch.business_goal,
                    Field::Vision => &mut patch.vision,
                    Field::CoreValues => &mut patch.core_values,
                    Field::UniqueSellingPoint => &mut patch.unique_selling_point,
                    Field::MainMessage => &mut patch.main_message,
                    Field::DesiredEmotion => &mut patch.desired_emotion,
                    Field::TargetAudience => &mut patch.target_audience,
                    Field::IdealClientProfile => &mut patch.ideal_client_profile,
                    Field::ClientChallenges => &mut patch.client_challenges,
                    Field::PreferredStyle => &mut patch.preferred_style,
                    Field::LikedDesigns => &mut patch.liked_designs,
                    Field::BrandColors => &mut patch.brand_colors,
                    Field::AvoidColors => &mut patch.avoid_colors,
                    Field::FontTypes => &mut patch.font_types,
                    Field::ProductsServices => &mut patch.products_services,
                    Field::CurrentChallenges => &mut patch.current_challenges,
                    Field::ExistingLogoDetails => &mut patch.existing_logo_details,
                    Field::ProfessionalsInvolved => &mut patch.professionals_involved,
                    Field::DecisionMakers => &mut patch.decision_makers,
                    Field::InspirationMaterials => &mut patch.inspiration_materials,
                    Field::VibeScale | Field::ExistingLogo => unreachable!(),
                };
                *slot = Some(text);
            }
        }
        Some(patch)
    }
}

pub struct StepForm {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub fields: Vec<Field>,
}

/// Inputs shown for a step given the current answers. The welcome and summary
/// steps have no form.
pub fn form_for(step: StepKey, record: &QuestionnaireRecord) -> Option<StepForm> {
    let form = match step {
        StepKey::Welcome | StepKey::Summary => return None,
        StepKey::Business => StepForm {
            title: "Business details",
            subtitle: "Let's start with the basics.",
            fields: vec![Field::BusinessName, Field::OneLineDescription, Field::BusinessGoal],
        },
        StepKey::Vision => StepForm {
            title: "Vision and values",
            subtitle: "What does the brand stand for?",
            fields: vec![
                Field::Vision,
                Field::CoreValues,
                Field::UniqueSellingPoint,
                Field::MainMessage,
                Field::DesiredEmotion,
            ],
        },
        StepKey::Audience => StepForm {
            title: "Target audience",
            subtitle: "Who are we talking to?",
            fields: vec![
                Field::TargetAudience,
                Field::IdealClientProfile,
                Field::ClientChallenges,
            ],
        },
        StepKey::Style => StepForm {
            title: "Design and style",
            subtitle: "How should the brand look?",
            fields: vec![
                Field::PreferredStyle,
                Field::LikedDesigns,
                Field::BrandColors,
                Field::AvoidColors,
                Field::FontTypes,
                Field::VibeScale,
            ],
        },
        StepKey::Additional => {
            let mut fields = vec![
                Field::ProductsServices,
                Field::CurrentChallenges,
                Field::ExistingLogo,
            ];
            if record.existing_logo.is_yes() {
                fields.push(Field::ExistingLogoDetails);
            }
            fields.extend([
                Field::ProfessionalsInvolved,
                Field::DecisionMakers,
                Field::InspirationMaterials,
            ]);
            StepForm {
                title: "Additional information",
                subtitle: "A few last details.",
                fields,
            }
        }
    };
    Some(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::apply;

    #[test]
    fn logo_details_follow_the_flag() {
        let mut record = QuestionnaireRecord::default();
        let fields = form_for(StepKey::Additional, &record).unwrap().fields;
        assert!(!fields.contains(&Field::ExistingLogoDetails));

        record = apply(record, Field::ExistingLogo.patch(FieldValue::Logo(LogoFlag::Yes)).unwrap());
        let fields = form_for(StepKey::Additional, &record).unwrap().fields;
        let logo = fields.iter().position(|f| *f == Field::ExistingLogo).unwrap();
        assert_eq!(fields[logo + 1], Field::ExistingLogoDetails);

        record = apply(
            record,
            Field::ExistingLogoDetails
                .patch(FieldValue::Text("Old wordmark".into()))
                .unwrap(),
        );
        record = apply(record, Field::ExistingLogo.patch(FieldValue::Logo(LogoFlag::No)).unwrap());
        let fields = form_for(StepKey::Additional, &record).unwrap().fields;
        assert!(!fields.contains(&Field::ExistingLogoDetails));
        assert_eq!(record.existing_logo_details, "Old wordmark");
    }

    #[test]
    fn every_text_field_reads_back_what_it_patched() {
        let record = QuestionnaireRecord::default();
        let steps = [
            StepKey::Business,
            StepKey::Vision,
            StepKey::Audience,
            StepKey::Style,
            StepKey::Additional,
        ];
        let with_logo = QuestionnaireRecord {
            existing_logo: LogoFlag::Yes,
            ..Default::default()
        };
        for step in steps {
            for field in form_for(step, &with_logo).unwrap().fields {
                if matches!(field.kind(), InputKind::Line | InputKind::Paragraph) {
                    let value = FieldValue::Text(format!("{field:?}"));
                    let updated = apply(record.clone(), field.patch(value.clone()).unwrap());
                    assert_eq!(field.read(&updated), value);
                }
            }
        }
    }

    #[test]
    fn mismatched_values_are_rejected() {
        assert!(Field::VibeScale.patch(FieldValue::Text("x".into())).is_none());
        assert!(Field::BusinessName.patch(FieldValue::Vibe(Vibe::Emotional)).is_none());
        assert!(Field::ExistingLogo.patch(FieldValue::Vibe(Vibe::Emotional)).is_none());
    }

    #[test]
    fn slider_field_maps_to_vibe() {
        let patch = Field::VibeScale
            .patch(FieldValue::Vibe(Vibe::from_position(0).unwrap()))
            .unwrap();
        let record = apply(QuestionnaireRecord::default(), patch);
        assert_eq!(record.vibe_scale, Vibe::Emotional);
        assert_eq!(Field::VibeScale.read(&record), FieldValue::Vibe(Vibe::Emotional));
    }

    #[test]
    fn bookend_steps_have_no_form() {
        let record = QuestionnaireRecord::default();
        assert!(form_for(StepKey::Welcome, &record).is_none());
        assert!(form_for(StepKey::Summary, &record).is_none());
    }
}

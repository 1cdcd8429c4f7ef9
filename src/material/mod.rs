pub mod generator;
pub mod prompt;

use serde::Serialize;

use crate::errors::{GenerationError, GenerationResult};

pub use generator::MaterialGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum MaterialKind {
    LessonPlan,
    StudyGuide,
    Quiz,
    FindResources,
}

/// Everything about a kind that varies in prompts and on the form.
#[derive(Debug)]
pub struct KindProfile {
    pub label: &'static str,
    pub objectives_heading: &'static str,
    pub objectives_label: &'static str,
    pub objectives_placeholder: &'static str,
    pub objectives_help: &'static str,
    pub instructions: &'static str,
}

const OBJECTIVES_LABEL: &str = "Learning Objectives / Key Concepts (one per line)";
const OBJECTIVES_PLACEHOLDER: &str = "e.g., Understand the process of photosynthesis.";
const OBJECTIVES_HELP: &str = "Main points or skills for the audience.";
const OBJECTIVES_HEADING: &str = "Key Learning Objectives/Concepts";

static LESSON_PLAN: KindProfile = KindProfile {
    label: "Lesson Plan",
    objectives_heading: OBJECTIVES_HEADING,
    objectives_label: OBJECTIVES_LABEL,
    objectives_placeholder: OBJECTIVES_PLACEHOLDER,
    objectives_help: OBJECTIVES_HELP,
    instructions: prompt::LESSON_PLAN_INSTRUCTIONS,
};

static STUDY_GUIDE: KindProfile = KindProfile {
    label: "Study Guide",
    objectives_heading: OBJECTIVES_HEADING,
    objectives_label: OBJECTIVES_LABEL,
    objectives_placeholder: OBJECTIVES_PLACEHOLDER,
    objectives_help: OBJECTIVES_HELP,
    instructions: prompt::STUDY_GUIDE_INSTRUCTIONS,
};

static QUIZ: KindProfile = KindProfile {
    label: "Quiz",
    objectives_heading: OBJECTIVES_HEADING,
    objectives_label: OBJECTIVES_LABEL,
    objectives_placeholder: OBJECTIVES_PLACEHOLDER,
    objectives_help: OBJECTIVES_HELP,
    instructions: prompt::QUIZ_INSTRUCTIONS,
};

static FIND_RESOURCES: KindProfile = KindProfile {
    label: "Find Example Resources",
    objectives_heading: "Specific Areas of Interest / Keywords",
    objectives_label: "Specific Areas of Interest / Keywords (one per line)",
    objectives_placeholder:
        "e.g., Quantum physics basics, Key historical figures of the Renaissance",
    objectives_help: "Keywords or sub-topics to refine the search for example resources.",
    instructions: prompt::FIND_RESOURCES_INSTRUCTIONS,
};

impl MaterialKind {
    pub const ALL: [MaterialKind; 4] = [
        MaterialKind::LessonPlan,
        MaterialKind::StudyGuide,
        MaterialKind::Quiz,
        MaterialKind::FindResources,
    ];

    pub fn profile(self) -> &'static KindProfile {
        match self {
            MaterialKind::LessonPlan => &LESSON_PLAN,
            MaterialKind::StudyGuide => &STUDY_GUIDE,
            MaterialKind::Quiz => &QUIZ,
            MaterialKind::FindResources => &FIND_RESOURCES,
        }
    }

    pub fn label(self) -> &'static str {
        self.profile().label
    }

    /// Only resource searches are grounded in web results.
    pub fn uses_grounding(self) -> bool {
        self == MaterialKind::FindResources
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRequest {
    pub kind: MaterialKind,
    pub topic: String,
    pub audience: String,
    /// Newline-delimited list; may be empty.
    pub objectives: String,
    pub additional_details: Option<String>,
}

impl MaterialRequest {
    pub fn new(kind: MaterialKind, topic: &str, audience: &str) -> Self {
        Self {
            kind,
            topic: topic.to_string(),
            audience: audience.to_string(),
            objectives: String::new(),
            additional_details: None,
        }
    }

    pub fn with_objectives(mut self, objectives: &str) -> Self {
        self.objectives = objectives.to_string();
        self
    }

    pub fn with_details(mut self, details: &str) -> Self {
        self.additional_details = Some(details.to_string());
        self
    }

    pub fn validate(&self) -> GenerationResult<()> {
        if self.topic.trim().is_empty() || self.audience.trim().is_empty() {
            return Err(GenerationError::Validation(
                "Topic and Target Audience are required.".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationOutcome {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Citation>>,
}

impl GenerationOutcome {
    pub fn display_title(kind: MaterialKind, topic: &str) -> String {
        match kind {
            MaterialKind::FindResources => {
                let topic = if topic.is_empty() { "your topic" } else { topic };
                format!("Example Resources Found for \"{}\"", topic)
            }
            _ => format!("Generated {}", kind.label()),
        }
    }

    pub fn num_sources(&self) -> usize {
        self.sources.as_ref().map_or(0, |s| s.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_topic_and_audience() {
        let ok = MaterialRequest::new(MaterialKind::Quiz, "Fractions", "4th graders");
        assert!(ok.validate().is_ok());

        let missing_topic = MaterialRequest::new(MaterialKind::Quiz, "  ", "4th graders");
        assert_eq!(
            missing_topic.validate(),
            Err(GenerationError::Validation(
                "Topic and Target Audience are required.".into()
            ))
        );

        let missing_audience = MaterialRequest::new(MaterialKind::Quiz, "Fractions", "");
        assert!(missing_audience.validate().is_err());
    }

    #[test]
    fn test_profile_headings_differ_for_find_resources() {
        assert_eq!(
            MaterialKind::FindResources.profile().objectives_heading,
            "Specific Areas of Interest / Keywords"
        );
        for kind in [
            MaterialKind::LessonPlan,
            MaterialKind::StudyGuide,
            MaterialKind::Quiz,
        ] {
            assert_eq!(
                kind.profile().objectives_heading,
                "Key Learning Objectives/Concepts"
            );
        }
    }

    #[test]
    fn test_uses_grounding_only_for_find_resources() {
        for kind in MaterialKind::ALL {
            assert_eq!(kind.uses_grounding(), kind == MaterialKind::FindResources);
        }
    }

    #[test]
    fn test_display_title() {
        assert_eq!(
            GenerationOutcome::display_title(MaterialKind::StudyGuide, "Cells"),
            "Generated Study Guide"
        );
        assert_eq!(
            GenerationOutcome::display_title(MaterialKind::FindResources, "Cells"),
            "Example Resources Found for \"Cells\""
        );
        assert_eq!(
            GenerationOutcome::display_title(MaterialKind::FindResources, ""),
            "Example Resources Found for \"your topic\""
        );
    }

    #[test]
    fn test_outcome_json_omits_absent_sources() {
        let outcome = GenerationOutcome {
            text: "Quiz".into(),
            sources: None,
        };
        assert_eq!(
            serde_json::to_string(&outcome).unwrap(),
            r#"{"text":"Quiz"}"#
        );
    }
}

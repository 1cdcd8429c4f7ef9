use super::MaterialRequest;

const PREAMBLE: &str = "You are an expert curriculum developer and AI assistant.";

const DETAILS_HEADING: &str = "Additional Instructions or specific focus areas";

pub const LESSON_PLAN_INSTRUCTIONS: &str = "Please generate a detailed lesson plan. Include: Title, Learning Objectives, Materials Needed, Step-by-step Procedure (intro, activities, conclusion), Assessment Methods, Differentiation/Extension, Time Allocation. Language: for an educator.";

pub const STUDY_GUIDE_INSTRUCTIONS: &str = "Please generate a comprehensive study guide. Include: Title, Overview, Key Concepts/Definitions, Important Formulas/Principles, Examples/Case Studies, Practice Questions, Study Tips. Structure for easy following.";

pub const QUIZ_INSTRUCTIONS: &str = "Please generate a well-structured quiz. Include: Quiz Title, Instructions, 5-10 Questions (mix of types like multiple-choice (A,B,C,D), true/false, short answer, clearly labeled), and a separate Answer Key. Ensure questions are unambiguous and assess objectives.";

pub const FIND_RESOURCES_INSTRUCTIONS: &str = r#"Please use your search capabilities to find 3-5 relevant educational resources (like existing question papers, books, articles, or online documents) based on the topic and audience.
For each resource, clearly provide:
1.  **Resource Title:** (The title of the document or webpage)
2.  **Brief Description:** (1-2 sentences summarizing the content and its relevance)
3.  **Direct URL:** (The web address to access the resource)

Format the output for readability, clearly labeling each part for each resource.
Example:
**Resource 1:**
*   **Title:** Introduction to Photosynthesis - Lecture Notes
*   **Description:** These university lecture notes cover the basic chemical processes and stages involved in photosynthesis, suitable for undergraduate students.
*   **URL:** https://example.edu/biology/photosynthesis_intro_notes.pdf

List the resources one after another. Ensure the URLs provided are direct links to the resources if possible.
"#;

const CLOSING_INSTRUCTIONS: &str = "Format the output with clear headings for each section (if applicable for the material type) and use bullet points or numbered lists where appropriate for readability. Avoid conversational fluff and stick to delivering the requested educational material or resource list.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub prompt: String,
    pub use_grounding: bool,
}

/// Renders a request into the single user message sent to the provider.
///
/// Optional fields that are empty or whitespace-only are left out together
/// with their heading. Blank objective lines are skipped.
pub fn build(request: &MaterialRequest) -> BuiltPrompt {
    let profile = request.kind.profile();

    let mut prompt = format!(
        "{}\nTopic: \"{}\"\nTarget Audience: {}.\n",
        PREAMBLE, request.topic, request.audience
    );

    let objectives = objective_lines(&request.objectives);
    if !objectives.is_empty() {
        let bullets = objectives
            .iter()
            .map(|line| format!("- {}", line))
            .collect::<Vec<_>>()
            .join("\n");
        prompt.push_str(&format!("{}:\n{}\n\n", profile.objectives_heading, bullets));
    }

    if let Some(details) = request
        .additional_details
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        prompt.push_str(&format!("{}:\n{}\n\n", DETAILS_HEADING, details));
    }

    prompt.push_str(profile.instructions);
    prompt.push_str("\n\n");
    prompt.push_str(CLOSING_INSTRUCTIONS);

    BuiltPrompt {
        prompt,
        use_grounding: request.kind.uses_grounding(),
    }
}

fn objective_lines(objectives: &str) -> Vec<&str> {
    objectives
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialKind;

    const MARKERS: [(MaterialKind, &str); 4] = [
        (MaterialKind::LessonPlan, "Materials Needed"),
        (MaterialKind::StudyGuide, "Important Formulas/Principles"),
        (MaterialKind::Quiz, "separate Answer Key"),
        (MaterialKind::FindResources, "**Direct URL:**"),
    ];

    fn request(kind: MaterialKind) -> MaterialRequest {
        MaterialRequest::new(kind, "Photosynthesis", "7th graders")
    }

    #[test]
    fn test_each_kind_carries_only_its_instructions() {
        for kind in MaterialKind::ALL {
            let built = build(&request(kind));
            assert!(built.prompt.contains(kind.profile().instructions));
            for (other, marker) in MARKERS {
                assert_eq!(
                    built.prompt.contains(marker),
                    other == kind,
                    "{:?} prompt and marker {:?}",
                    kind,
                    marker
                );
            }
        }
    }

    #[test]
    fn test_use_grounding_iff_find_resources() {
        for kind in MaterialKind::ALL {
            assert_eq!(
                build(&request(kind)).use_grounding,
                kind == MaterialKind::FindResources
            );
        }
    }

    #[test]
    fn test_minimal_prompt_is_exact() {
        let built = build(&request(MaterialKind::Quiz));
        let expected = format!(
            "You are an expert curriculum developer and AI assistant.\nTopic: \"Photosynthesis\"\nTarget Audience: 7th graders.\n{}\n\n{}",
            QUIZ_INSTRUCTIONS, CLOSING_INSTRUCTIONS
        );
        assert_eq!(built.prompt, expected);
    }

    #[test]
    fn test_empty_optional_fields_are_omitted() {
        let built = build(&request(MaterialKind::LessonPlan).with_details(""));
        assert!(!built.prompt.contains("Key Learning Objectives/Concepts"));
        assert!(!built.prompt.contains(DETAILS_HEADING));
    }

    #[test]
    fn test_whitespace_only_optional_fields_are_omitted() {
        let built = build(
            &request(MaterialKind::StudyGuide)
                .with_objectives("  \n\t\n")
                .with_details("   "),
        );
        assert!(!built.prompt.contains("Key Learning Objectives/Concepts"));
        assert!(!built.prompt.contains(DETAILS_HEADING));
    }

    #[test]
    fn test_objectives_render_as_trimmed_bullets() {
        let built = build(
            &request(MaterialKind::LessonPlan)
                .with_objectives("  Explain chlorophyll \r\n\nDescribe the light reactions"),
        );
        assert!(built.prompt.contains(
            "Key Learning Objectives/Concepts:\n- Explain chlorophyll\n- Describe the light reactions\n\n"
        ));
    }

    #[test]
    fn test_find_resources_uses_keywords_heading() {
        let built = build(&request(MaterialKind::FindResources).with_objectives("past papers"));
        assert!(built
            .prompt
            .contains("Specific Areas of Interest / Keywords:\n- past papers\n\n"));
        assert!(!built.prompt.contains("Key Learning Objectives/Concepts"));
    }

    #[test]
    fn test_details_appended_verbatim() {
        let details = "Focus on lab safety.\n  Keep it short.";
        let built = build(&request(MaterialKind::Quiz).with_details(details));
        assert!(built.prompt.contains(&format!(
            "Additional Instructions or specific focus areas:\n{}\n\n{}",
            details, QUIZ_INSTRUCTIONS
        )));
    }

    #[test]
    fn test_build_is_deterministic() {
        let req = request(MaterialKind::FindResources)
            .with_objectives("a\nb")
            .with_details("c");
        assert_eq!(build(&req), build(&req));
    }

    #[test]
    fn test_prompt_ends_with_closing_instructions() {
        for kind in MaterialKind::ALL {
            assert!(build(&request(kind)).prompt.ends_with(CLOSING_INSTRUCTIONS));
        }
    }
}

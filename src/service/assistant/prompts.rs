//! Prompt assembly and deterministic fallback narratives for the assistant

use crate::model::{AnalysisResult, DisasterType, Language, RetrievalResult};

const PERSONA: &str = "You are a disaster damage assessment assistant. Ground every answer in \
the reference material and the analysis context provided below. Be specific and practical; \
when asked for next steps, give concrete field actions.";

/// Assemble the system prompt: persona, context, language directive, and
/// the retrieved reference material verbatim
pub fn build_system_prompt(
    disaster_type: Option<DisasterType>,
    language: Language,
    analysis: Option<&AnalysisResult>,
    retrieved: &RetrievalResult,
) -> String {
    let mut prompt = String::from(PERSONA);

    if let Some(dt) = disaster_type {
        prompt.push_str(&format!("\n\nCurrent disaster type: {}.", dt.as_str()));
    }

    if let Some(result) = analysis {
        prompt.push_str(&format!(
            "\n\nLatest analysis: {:.1}% damage, {} severity. \
             Detections ({} total): {} building, {} road, {} flooding, {} vegetation. \
             Affected areas: {}.",
            result.damage_percentage,
            result.severity.as_str(),
            result.record_count(),
            result.building_damage.len(),
            result.road_damage.len(),
            result.flooded_areas.len(),
            result.vegetation_loss.len(),
            result.affected_areas.join(", "),
        ));
    }

    if !retrieved.entries.is_empty() {
        prompt.push_str("\n\nReference material:");
        for hit in &retrieved.entries {
            prompt.push_str(&format!(
                "\n[{}] {}",
                hit.entry.metadata.title, hit.entry.content
            ));
        }
    }

    match language {
        Language::Hindi => prompt.push_str("\n\nRespond in Hindi."),
        Language::English => prompt.push_str("\n\nRespond in English."),
    }

    prompt
}

/// Deterministic reply used when the narrative service is unavailable.
///
/// Built entirely from retrieved knowledge and session context, so the
/// assistant still answers something grounded instead of erroring out.
pub fn fallback_narrative(
    language: Language,
    analysis: Option<&AnalysisResult>,
    retrieved: &RetrievalResult,
) -> String {
    let mut reply = String::new();

    match language {
        Language::Hindi => {
            if let Some(result) = analysis {
                reply.push_str(&format!(
                    "नवीनतम विश्लेषण के अनुसार लगभग {:.0}% क्षति हुई है (गंभीरता: {})। ",
                    result.damage_percentage,
                    severity_hi(result)
                ));
            }
            if let Some(best) = retrieved.best() {
                reply.push_str(&best.entry.content);
            } else {
                reply.push_str(
                    "कृपया प्रभावित क्षेत्र का विवरण दें ताकि उपयुक्त मार्गदर्शन दिया जा सके।",
                );
            }
        }
        Language::English => {
            if let Some(result) = analysis {
                reply.push_str(&format!(
                    "The latest analysis shows approximately {:.0}% damage ({} severity). ",
                    result.damage_percentage,
                    result.severity.as_str()
                ));
            }
            if let Some(best) = retrieved.best() {
                reply.push_str(&best.entry.content);
            } else {
                reply.push_str(
                    "Please describe the affected area so I can point you at the relevant guidance.",
                );
            }
        }
    }

    reply
}

fn severity_hi(result: &AnalysisResult) -> &'static str {
    use crate::model::Severity;
    match result.severity {
        Severity::High => "उच्च",
        Severity::Medium => "मध्यम",
        Severity::Low => "निम्न",
    }
}

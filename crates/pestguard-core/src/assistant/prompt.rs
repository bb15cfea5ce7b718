use crate::constants::assistant::{FORMAT_RULES, NO_DETECTION_NOTICE};
use crate::detection::DetectionCounts;
use crate::llm::{Message, Role};

/// Unanchored, case-sensitive substring match against any trigger term.
/// "uncontrolled" matches "control"; that coarseness is intended.
pub fn contains_trigger(user_input: &str, trigger_terms: &[String]) -> bool {
    trigger_terms
        .iter()
        .any(|term| !term.is_empty() && user_input.contains(term.as_str()))
}

/// One line per category, e.g. `- detected 3 of aphid`.
pub fn render_detection_context(results: &DetectionCounts) -> String {
    if results.is_empty() {
        return NO_DETECTION_NOTICE.to_string();
    }
    let mut context = String::from("Based on the latest image detection results:\n");
    for (category, count) in results.iter() {
        context.push_str(&format!("- detected {count} of {category}\n"));
    }
    context
}

/// Detection summary, category list and output-format block, followed by the
/// user's own text as the final suffix.
pub fn compose_structured_request(results: &DetectionCounts, user_input: &str) -> String {
    let classes = results.categories().collect::<Vec<_>>().join(", ");
    format!(
        "{}\nIdentified categories: {}\n\n{}\n\nUser question: {}",
        render_detection_context(results),
        classes,
        FORMAT_RULES,
        user_input
    )
}

/// Rewrite a history whose last entry is the just-appended user turn into a
/// structured mitigation request: the last user message becomes the composed
/// prompt and `history[0]` becomes the advisor persona.
///
/// Returns the history unchanged when `results` is empty. The previous system
/// prompt is not kept anywhere in the output.
pub fn apply_detection_context(
    history: &[Message],
    results: &DetectionCounts,
    user_input: &str,
    advisor_prompt: &str,
) -> Vec<Message> {
    let mut rewritten = history.to_vec();
    if results.is_empty() {
        return rewritten;
    }

    if let Some(last) = rewritten.last_mut() {
        if last.role == Role::User {
            last.content = compose_structured_request(results, user_input);
        }
    }

    match rewritten.first_mut() {
        Some(first) if first.role == Role::System => first.content = advisor_prompt.to_string(),
        _ => rewritten.insert(0, Message::system(advisor_prompt)),
    }

    rewritten
}

//! 护理建议的 Prompt 构造

use crate::llm::Message;
use crate::vision::Label;

const SYSTEM_PROMPT: &str = "You are a medical assistant providing treatment advice for skin conditions.";
const NO_SYMPTOMS: &str = "No additional symptoms reported";

/// system + user 两条消息
pub fn treatment_messages(label: Label, symptoms: &str) -> Vec<Message> {
    let symptoms = symptoms.trim();
    let symptoms = if symptoms.is_empty() { NO_SYMPTOMS } else { symptoms };
    vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(format!(
            "Diagnosed condition: {label}\nPatient symptoms: {symptoms}\n\nPlease provide a brief treatment plan with 3-4 recommendations."
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_prompt_with_symptoms() {
        let msgs = treatment_messages(Label::Psoriasis, "Itchy scaly patches");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::System);
        assert!(msgs[1].content.contains("Diagnosed condition: Psoriasis"));
        assert!(msgs[1].content.contains("Patient symptoms: Itchy scaly patches"));
    }

    #[test]
    fn test_prompt_without_symptoms() {
        let msgs = treatment_messages(Label::Nevus, "  ");
        assert!(msgs[1].content.contains(NO_SYMPTOMS));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPurpose {
    Conversation,
    SlideOutline,
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub purpose: ChatPurpose,
    pub system_prompt: &'static str,
}

pub fn template_for_purpose(purpose: ChatPurpose) -> PromptTemplate {
    let system_prompt = match purpose {
        ChatPurpose::Conversation => {
            "You are Ava, a friendly desktop voice assistant. Reply in plain conversational text that reads well aloud: short, warm, and directly helpful. Do not use markdown."
        }
        ChatPurpose::SlideOutline => {
            "You are Ava, a presentation writer. Produce educational slide outlines and return valid JSON only, without markdown fences."
        }
    };

    PromptTemplate {
        purpose,
        system_prompt,
    }
}

pub fn slide_outline_prompt(topic: &str) -> String {
    format!(
        "Create a detailed PowerPoint outline for the topic \"{topic}\".\n\
         Return valid JSON only in this format:\n\
         {{\"slides\": [{{\"title\": \"Introduction to {topic}\", \"content\": [\"...\", \"...\", \"...\"]}}]}}\n\
         Include at least 7 slides with strong educational content, interesting facts, and clear structure.\n\
         Avoid markdown or formatting, just plain JSON."
    )
}

#[cfg(test)]
mod tests {
    use super::{ChatPurpose, slide_outline_prompt, template_for_purpose};

    #[test]
    fn slide_prompt_embeds_topic_and_json_shape() {
        let prompt = slide_outline_prompt("volcanoes");
        assert!(prompt.contains("\"volcanoes\""));
        assert!(prompt.contains("{\"slides\": [{\"title\": \"Introduction to volcanoes\""));
    }

    #[test]
    fn each_purpose_has_its_own_system_prompt() {
        let chat = template_for_purpose(ChatPurpose::Conversation);
        let slides = template_for_purpose(ChatPurpose::SlideOutline);
        assert_ne!(chat.system_prompt, slides.system_prompt);
        assert!(slides.system_prompt.contains("JSON"));
    }
}

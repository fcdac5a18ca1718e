//! Prompt rendering.
//!
//! Both documents are injected in full on every request. There is no
//! chunking, truncation or token counting; oversized prompts are only
//! flagged by the caller.

use crate::services::documents::SubsidyDocuments;

const INSTRUCTION: &str = "あなたは補助金に関する質問に答えるチャットボットです。
以下の「補助金情報」を参考に、ユーザーの質問に正確に答えてください。
補助金情報に記載されていない内容については、「補助金情報には記載がありません」と答えてください。";

const CONTEXT_HEADING: &str = "--- 補助金情報 ---";
const QUESTION_HEADING: &str = "--- ユーザーの質問 ---";

/// Marks the end of the prompt; the model's answer follows it.
pub const ANSWER_MARKER: &str = "--- 回答 ---";

/// Render the context block holding both documents.
pub fn render_context(requirements: &str, guidance: &str) -> String {
    format!(
        "\n以下の情報は、補助金に関する要綱と手引きです。\n\
         --- 要綱 (youkou.txt) ---\n\
         {requirements}\n\
         \n\
         --- 手引き (tebiki.txt) ---\n\
         {guidance}\n"
    )
}

/// Render a full prompt. Pure: identical inputs give identical output.
pub fn build_prompt(requirements: &str, guidance: &str, message: &str) -> String {
    PromptBuilder::new(&SubsidyDocuments::new(requirements, guidance)).build(message)
}

/// Holds the context block rendered once at startup.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    context: String,
}

impl PromptBuilder {
    pub fn new(documents: &SubsidyDocuments) -> Self {
        Self {
            context: render_context(&documents.requirements, &documents.guidance),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn build(&self, message: &str) -> String {
        format!(
            "\n{INSTRUCTION}\n\n{CONTEXT_HEADING}\n{}\n\n{QUESTION_HEADING}\n{message}\n\n{ANSWER_MARKER}\n",
            self.context
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = "RULES: max grant 500000 yen";
    const GUIDE: &str = "GUIDE: apply by March";

    #[test]
    fn prompt_contains_documents_message_and_marker_in_order() {
        let prompt = build_prompt(RULES, GUIDE, "What is the deadline?");

        let rules_at = prompt.find(RULES).unwrap();
        let guide_at = prompt.find(GUIDE).unwrap();
        let message_at = prompt.find("What is the deadline?").unwrap();
        let marker_at = prompt.find(ANSWER_MARKER).unwrap();

        assert!(prompt.find(INSTRUCTION).unwrap() < rules_at);
        assert!(rules_at < guide_at);
        assert!(guide_at < message_at);
        assert!(message_at < marker_at);
        assert!(prompt.trim_end().ends_with(ANSWER_MARKER));
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(
            build_prompt(RULES, GUIDE, "締切は？"),
            build_prompt(RULES, GUIDE, "締切は？")
        );
    }

    #[test]
    fn changing_message_leaves_document_segment_untouched() {
        let first = build_prompt(RULES, GUIDE, "Q1");
        let second = build_prompt(RULES, GUIDE, "a much longer second question");

        let split = |prompt: &str| {
            let at = prompt.find(QUESTION_HEADING).unwrap();
            (prompt[..at].to_string(), prompt[at..].to_string())
        };
        let (head_a, tail_a) = split(&first);
        let (head_b, tail_b) = split(&second);

        assert_eq!(head_a, head_b);
        assert_ne!(tail_a, tail_b);
        assert_eq!(tail_a.replace("Q1", "a much longer second question"), tail_b);
    }

    #[test]
    fn message_is_embedded_verbatim() {
        let message = "  {\"json\": true}\n改行あり  ";
        let prompt = build_prompt(RULES, GUIDE, message);
        assert!(prompt.contains(&format!("{QUESTION_HEADING}\n{message}\n\n{ANSWER_MARKER}")));
    }

    #[test]
    fn builder_reuses_rendered_context() {
        let builder = PromptBuilder::new(&SubsidyDocuments::new(RULES, GUIDE));
        assert_eq!(builder.context(), render_context(RULES, GUIDE));
        assert!(builder.build("x").contains(builder.context()));
    }
}

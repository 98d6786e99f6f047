//! Prompt assembly for topic summaries.
//!
//! The system block is a fixed policy followed by the dated, already
//! sanitized context. Results keep the order the search returned them in
//! (most similar first), not chronological order.

use crate::models::{Prompt, SearchResult};

pub const UNKNOWN_DATE: &str = "Unknown Date";
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

/// Generic surnames the model must use for unidentified people in the context.
pub const PLACEHOLDER_NAMES: [&str; 4] = ["佐藤さん", "鈴木さん", "高橋さん", "田中さん"];

const POLICY: &str = r#"You are an analytical assistant. The context below is a set of chat-log excerpts written by one specific person. Answer the inquiry about this person using only what their messages show.

RULES:
1. Language and tone: Write the entire response in Japanese, in polite business Japanese (desu/masu). Refer to the person as "この方". Never call them "ユーザー" or "候補者".

2. Stay on the topic: Address the inquiry itself. Look for evidence that relates directly to the topic instead of producing a generic self-introduction, unless the inquiry asks for one.

3. Evidence for every claim: Back each statement with concrete evidence from the context, for example "〜についての議論で見られるように" or "〜と言及しており".
   - Use specific anecdotes from the logs to illustrate points.
   - When citing a dated anecdote, put the message date at the END of the sentence or paragraph as (YYYY-MM-DD), e.g. "コードをリファクタリングしてパフォーマンスを改善しました(2022-03-27)。" Never open a sentence with the date.

4. Other people: Replace any person name in the context that is unknown or generic with one of these surnames, used consistently for the same person: 佐藤さん, 鈴木さん, 高橋さん, 田中さん. Never use labels such as "User A".

5. Voice: Write as a third-party analyst. Never speak as "I" or give a personal opinion.

6. Audience: Frame the analysis for a recruiter hiring web engineers. Emphasize technical problem solving, learning agility and collaboration, but only as far as they relate to the topic.

7. Privacy and sensitivity:
   - Never mention developmental disorders (ASD, ADHD and similar), mental health conditions, chronic illnesses, or wording that implies neurodivergence (for example "定型" or "neurotypical").
   - If the context contains such content, do not quote it and do not refer to it. Drop that part of the context, or rephrase around it so that only the resulting trait remains (for example "detail-oriented" or "direct communication style").

FORMAT:
- Conclusion: a direct answer to the inquiry, e.g. "[トピック]に関して、この方は…な姿勢を示しています".
- Key Points: the points supporting the conclusion, each with its evidence and date.
- If the context does not hold enough information to answer the topic directly, say so honestly, then still point out generally relevant traits (such as general problem solving) that may apply to the topic."#;

/// Render one result as `"[YYYY-MM-DD]\n<content>"`.
pub fn format_result(result: &SearchResult) -> String {
    let date = result
        .message_date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string());
    format!("[{}]\n{}", date, result.content)
}

pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(format_result)
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Build the prompt for `topic` from results that were already sanitized.
///
/// The topic is used verbatim as the user query.
pub fn assemble(topic: &str, sanitized_results: &[SearchResult]) -> Prompt {
    Prompt {
        system_instructions: format!(
            "{POLICY}\n\nContext:\n{}",
            format_context(sanitized_results)
        ),
        user_query: topic.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn result(id: &str, content: &str, dated: bool) -> SearchResult {
        SearchResult {
            chunk_id: id.to_string(),
            content: content.to_string(),
            message_date: dated.then(|| Utc.with_ymd_and_hms(2022, 3, 27, 23, 59, 0).unwrap()),
            similarity: 0.8,
        }
    }

    #[test]
    fn test_format_result_with_date() {
        assert_eq!(
            format_result(&result("1", "リファクタリングしました", true)),
            "[2022-03-27]\nリファクタリングしました"
        );
    }

    #[test]
    fn test_format_result_without_date() {
        assert_eq!(
            format_result(&result("1", "hello", false)),
            "[Unknown Date]\nhello"
        );
    }

    #[test]
    fn test_context_keeps_supplied_order() {
        let results = vec![
            result("b", "second-most-recent but most similar", false),
            result("a", "oldest", true),
            result("c", "third", false),
        ];
        let context = format_context(&results);
        assert_eq!(
            context,
            "[Unknown Date]\nsecond-most-recent but most similar\n---\n[2022-03-27]\noldest\n---\n[Unknown Date]\nthird"
        );
    }

    #[test]
    fn test_assemble_contains_every_content_in_order() {
        let results: Vec<SearchResult> = (0..5)
            .map(|i| result(&i.to_string(), &format!("内容{i}"), i % 2 == 0))
            .collect();
        let prompt = assemble("学習意欲", &results);

        assert_eq!(prompt.user_query, "学習意欲");
        let mut cursor = 0;
        for r in &results {
            let found = prompt.system_instructions[cursor..]
                .find(&r.content)
                .expect("content present");
            cursor += found + r.content.len();
        }
    }

    #[test]
    fn test_policy_contract() {
        let prompt = assemble("topic", &[]);
        let system = &prompt.system_instructions;
        assert!(system.contains("Japanese"));
        assert!(system.contains("この方"));
        assert!(system.contains("(YYYY-MM-DD)"));
        assert!(system.contains("END of the sentence"));
        for name in PLACEHOLDER_NAMES {
            assert!(system.contains(name));
        }
        assert!(system.contains("ADHD"));
        assert!(system.contains("do not quote it"));
        assert!(system.contains("third-party analyst"));
        assert!(system.contains("Conclusion"));
        assert!(system.contains("Key Points"));
        assert!(system.contains("say so honestly"));
        assert!(system.ends_with("Context:\n"));
    }
}

//! Fixed user-facing replies used when no summary can be produced.

/// Returned when the search finds nothing for the topic.
pub fn no_information_found(topic: &str) -> String {
    format!("「{topic}」に関する情報が見つからなかったため、要約を作成できませんでした。")
}

/// Returned when the backend answers with blank text.
pub const EMPTY_SUMMARY: &str = "要約結果が空でした。別のトピックを試してください。";

/// Markdown body of a profile post: topic heading, then the summary.
pub fn post_content(topic: &str, summary: &str) -> String {
    format!("# {topic}\n\n{summary}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_information_found_quotes_topic() {
        assert_eq!(
            no_information_found("チームワーク"),
            "「チームワーク」に関する情報が見つからなかったため、要約を作成できませんでした。"
        );
    }

    #[test]
    fn test_post_content() {
        assert_eq!(post_content("学習意欲", "結論です"), "# 学習意欲\n\n結論です");
    }
}

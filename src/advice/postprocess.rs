//! 文本生成结果的后处理
//!
//! 1. 原始输出含助手轮标记时，只保留最后一个标记之后的内容；
//! 2. 不含 "dermatologist"（不区分大小写）时追加一行免责声明；
//! 3. 提取后为空视为生成失败，由调用方走知识库降级。

/// 聊天模板中助手轮的起始标记
pub const ASSISTANT_MARKER: &str = "<|assistant|>";

pub const DISCLAIMER_LINE: &str =
    "Disclaimer: Please consult with a dermatologist for proper diagnosis and treatment.";

/// 取最后一个助手标记之后的内容并去掉首尾空白
pub fn extract_answer(raw: &str) -> &str {
    match raw.rfind(ASSISTANT_MARKER) {
        Some(pos) => raw[pos + ASSISTANT_MARKER.len()..].trim(),
        None => raw.trim(),
    }
}

pub fn ensure_disclaimer(answer: &str) -> String {
    if answer.to_lowercase().contains("dermatologist") {
        answer.to_string()
    } else {
        format!("{answer}\n\n{DISCLAIMER_LINE}")
    }
}

/// 完整后处理；None 表示输出不可用
pub fn finalize(raw: &str) -> Option<String> {
    let answer = extract_answer(raw);
    if answer.is_empty() {
        return None;
    }
    Some(ensure_disclaimer(answer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_after_last_marker() {
        let raw = "<|system|>\nsys\n<|assistant|>\nfirst\n<|user|>\nagain\n<|assistant|>\n  Use sunscreen.  \n";
        assert_eq!(extract_answer(raw), "Use sunscreen.");
    }

    #[test]
    fn test_extract_without_marker_trims() {
        assert_eq!(extract_answer("\n  Keep it dry. \n"), "Keep it dry.");
    }

    #[test]
    fn test_disclaimer_appended_when_missing() {
        let out = finalize("Moisturize daily.").unwrap();
        assert_eq!(out, format!("Moisturize daily.\n\n{DISCLAIMER_LINE}"));
    }

    #[test]
    fn test_disclaimer_not_duplicated() {
        let out = finalize("See a DERMATOLOGIST soon.").unwrap();
        assert_eq!(out, "See a DERMATOLOGIST soon.");
    }

    #[test]
    fn test_empty_output_is_unusable() {
        assert_eq!(finalize(""), None);
        assert_eq!(finalize("   \n"), None);
        assert_eq!(finalize("prompt text <|assistant|>   "), None);
    }
}

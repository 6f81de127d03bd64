//! Tag classification: the classifier seam, the prompt, and reply parsing.

use async_trait::async_trait;
use timeline_core::parse_tag_suggestions;

use crate::error::AiResult;

/// Prompt used by the user-initiated connection check.
pub const TEST_CONNECTION_PROMPT: &str = "请回复：连接成功";

/// Shown in the prompt in place of an empty tag list.
const NO_EXISTING_TAGS: &str = "无";

/// Suggests tag names for a piece of content.
///
/// Implementations perform I/O only; they never see or touch the store.
#[async_trait]
pub trait TagClassifier: Send + Sync {
    /// Send one prompt and return the model's trimmed reply.
    async fn complete(&self, prompt: &str) -> AiResult<String>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Suggest tag names for `content`, given the names already in use.
    async fn classify(&self, content: &str, existing_tag_names: &[String]) -> AiResult<Vec<String>> {
        let prompt = build_classification_prompt(content, existing_tag_names);
        let reply = self.complete(&prompt).await?;
        Ok(parse_tag_suggestions(&reply))
    }

    /// Round-trip a fixed prompt and return the reply verbatim.
    async fn test_connection(&self) -> AiResult<String> {
        self.complete(TEST_CONNECTION_PROMPT).await
    }
}

/// Build the classification prompt.
///
/// Existing names are joined with `、`. The model is told to reuse an
/// existing tag only when its full name literally occurs in the content and
/// otherwise to mint short, specific project or requirement names.
pub fn build_classification_prompt(content: &str, existing_tag_names: &[String]) -> String {
    let existing = if existing_tag_names.is_empty() {
        NO_EXISTING_TAGS.to_string()
    } else {
        existing_tag_names.join("、")
    };

    format!(
        "你是一个工作记录标签提取助手。请从内容中提取**具体的项目名称或需求名称**作为标签。

【核心规则 - 必须严格遵守】
1. **精确匹配原则**：只有当内容中**明确出现**已有标签的完整名称时，才使用该已有标签
2. **不同项目必须分开**：不同的项目/需求名称必须创建不同的标签，例如：
   - \"可视化装箱\" 和 \"新装箱\" 是两个不同的项目，必须是两个独立标签
   - \"用户系统\" 和 \"用户认证\" 是两个不同的需求，必须是两个独立标签
3. 禁止模糊关联：不要因为有相似的字就归为同一标签
4. 提取内容中明确提到的项目/需求名称，保持原文
5. 禁止使用笼统词：开发、会议、文档、测试、沟通、学习、设计、需求、讨论、功能、增加、私有化、拆分
6. 标签应是2-8个字的名词短语
7. 最多返回1-2个标签

【已有标签供参考】{existing}

【待分析内容】{content}

请只返回标签名称，用逗号分隔。只有内容中明确出现已有标签原文时才复用，否则创建新标签。"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AiError;

    struct Canned(&'static str);

    #[async_trait]
    impl TagClassifier for Canned {
        async fn complete(&self, _prompt: &str) -> AiResult<String> {
            Ok(self.0.to_string())
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    struct Broken;

    #[async_trait]
    impl TagClassifier for Broken {
        async fn complete(&self, _prompt: &str) -> AiResult<String> {
            Err(AiError::Parse)
        }

        fn model_name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn test_prompt_lists_existing_tags() {
        let names = vec!["开发".to_string(), "用户认证".to_string()];
        let prompt = build_classification_prompt("完成了用户认证模块的开发", &names);
        assert!(prompt.contains("【已有标签供参考】开发、用户认证\n"));
        assert!(prompt.contains("【待分析内容】完成了用户认证模块的开发\n"));
        assert!(prompt.contains("禁止使用笼统词：开发、会议、文档、测试、沟通、学习、设计、需求、讨论、功能、增加、私有化、拆分"));
    }

    #[test]
    fn test_prompt_sentinel_for_no_tags() {
        let prompt = build_classification_prompt("随便写点", &[]);
        assert!(prompt.contains("【已有标签供参考】无\n"));
    }

    #[tokio::test]
    async fn test_classify_parses_reply() {
        let tags = Canned("用户认证模块，这是一个非常非常长的标签名字")
            .classify("x", &[])
            .await
            .unwrap();
        assert_eq!(tags, vec!["用户认证模块"]);
    }

    #[tokio::test]
    async fn test_classify_propagates_error() {
        assert_eq!(Broken.classify("x", &[]).await, Err(AiError::Parse));
    }

    #[tokio::test]
    async fn test_connection_returns_reply_verbatim() {
        assert_eq!(Canned("连接成功").test_connection().await.unwrap(), "连接成功");
    }
}

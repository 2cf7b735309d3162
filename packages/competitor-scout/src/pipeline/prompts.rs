//! LLM prompts for the discovery pipeline.
//!
//! Prompts are written in Chinese because the search provider and the pages
//! it returns are predominantly Chinese-language. Every prompt asks for a
//! single JSON object; replies are parsed with `json_repair::parse_lenient`.

/// System prompt for turning a product description into search queries.
pub const QUERY_SYSTEM_PROMPT: &str = r#"你是一个搜索查询优化专家。根据用户给出的领域、功能描述和产品名称，生成用于发现竞品的搜索引擎查询。

要求：
1. 每个查询是可以直接输入搜索引擎的字符串，长度控制在20个字以内
2. 查询要指向具体的产品，例如"在线文档协作工具 排名"，而不是泛泛的概念
3. 领域相关的查询 type 为 "domain"，功能相关的查询 type 为 "feature"
4. 生成 3 到 6 个查询，不要重复
5. 只返回JSON，不要任何解释

输出格式：
{"queries": [{"type": "domain", "name": "简短标签", "query": "搜索查询"}]}"#;

/// User prompt for query generation.
pub const QUERY_USER_PROMPT: &str = r#"领域：{domain}
功能描述：{features}
产品名称：{product_name}

请生成搜索查询："#;

/// System prompt for extracting competitors from one source.
pub const EXTRACT_SYSTEM_PROMPT: &str = r#"你是一个专业的竞品分析师。从给定的网页内容中找出与目标产品构成竞争关系的具体产品。

评分标准（score，1-10 的整数）：
- 9-10：直接竞品，同一领域且核心功能高度重合
- 7-8：间接竞品，解决相似问题但方式或侧重不同
- 5-6：领域相关，同一市场但功能重合较少
- 1-4：基本无关

要求：
1. 只提取具体的产品名称，不要提取公司介绍、栏目名称、导航文字
2. features 列出内容中提到的该产品核心功能，每项一句短语，不要编造
3. reason 用一句话说明评分理由
4. 内容中没有竞品时返回 {"competitors": []}
5. 只返回JSON，不要任何解释

输出格式：
{"competitors": [{"name": "产品名称", "features": ["功能1", "功能2"], "score": 8, "reason": "评分理由"}]}"#;

/// User prompt for per-source extraction.
pub const EXTRACT_USER_PROMPT: &str = r#"目标领域：{domain}
目标功能：{features}
来源：{url}

网页内容：
{content}"#;

/// System prompt for extracting one competitor's features.
pub const FEATURE_SYSTEM_PROMPT: &str = r#"你是一个产品分析专家。从给定内容中提取 "{name}" 的具体功能。

要求：
1. 只提取该产品的真实功能，不要编造
2. 功能描述要具体，如"智能试卷批改"而非"AI功能"
3. 每个功能用简短的一句话描述
4. 提取所有能找到的功能，不限数量
5. 返回JSON格式: {"features": ["功能1", "功能2"]}
6. 如果内容中没有该产品的功能信息，返回 {"features": []}"#;

/// User prompt for feature extraction.
pub const FEATURE_USER_PROMPT: &str = r#"产品名称: {name}

内容:
{content}"#;

/// System prompt for the market insights section.
pub const INSIGHTS_SYSTEM_PROMPT: &str = r#"你是一位资深的产品战略顾问。根据竞品列表和功能统计，为目标产品撰写市场分析。

要求：
1. summary：两三句话概括竞争格局
2. market_stage：市场阶段，例如"萌芽期"、"成长期"、"成熟期"、"红海"
3. must_have_features：多数竞品都具备的基础功能
4. differentiators：少数竞品具备、可形成差异化的功能
5. recommendations：给目标产品的建议，每条包含 title 和 detail
6. risks：进入该市场的主要风险
7. 只基于给出的信息，只返回JSON

输出格式：
{"summary": "", "market_stage": "", "must_have_features": [], "differentiators": [], "recommendations": [{"title": "", "detail": ""}], "risks": []}"#;

/// User prompt for the insights section.
pub const INSIGHTS_USER_PROMPT: &str = r#"目标产品：{product_name}
领域：{domain}
功能描述：{features}

竞品列表：
{competitors}

功能出现频次：
{frequency}"#;

const UNSPECIFIED: &str = "未指定";

fn or_unspecified(value: Option<&str>) -> &str {
    value.unwrap_or(UNSPECIFIED)
}

/// Substitute `{key}` placeholders in one pass over the template.
///
/// Inserted values are never rescanned, so braces in user input or page
/// text come through verbatim. Unknown `{...}` sequences are left as is.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let found = values.iter().find_map(|(key, value)| {
            tail.strip_prefix(key)?
                .strip_prefix('}')
                .map(|after| (*value, after))
        });
        match found {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Format the query generation prompt.
pub fn format_query_prompt(domain: Option<&str>, features: Option<&str>, product_name: &str) -> String {
    let product_name = if product_name.trim().is_empty() {
        UNSPECIFIED
    } else {
        product_name.trim()
    };
    fill(
        QUERY_USER_PROMPT,
        &[
            ("domain", or_unspecified(domain)),
            ("features", or_unspecified(features)),
            ("product_name", product_name),
        ],
    )
}

/// Format the per-source extraction prompt.
pub fn format_extract_prompt(
    domain: Option<&str>,
    features: Option<&str>,
    url: &str,
    content: &str,
) -> String {
    fill(
        EXTRACT_USER_PROMPT,
        &[
            ("domain", or_unspecified(domain)),
            ("features", or_unspecified(features)),
            ("url", url),
            ("content", content),
        ],
    )
}

/// Format the feature extraction system prompt for one competitor.
pub fn format_feature_system_prompt(name: &str) -> String {
    fill(FEATURE_SYSTEM_PROMPT, &[("name", name)])
}

/// Format the feature extraction user prompt.
pub fn format_feature_prompt(name: &str, content: &str) -> String {
    fill(FEATURE_USER_PROMPT, &[("name", name), ("content", content)])
}

/// Format the insights prompt.
pub fn format_insights_prompt(
    product_name: &str,
    domain: Option<&str>,
    features: Option<&str>,
    competitors: &str,
    frequency: &str,
) -> String {
    fill(
        INSIGHTS_USER_PROMPT,
        &[
            ("product_name", product_name),
            ("domain", or_unspecified(domain)),
            ("features", or_unspecified(features)),
            ("competitors", competitors),
            ("frequency", frequency),
        ],
    )
}

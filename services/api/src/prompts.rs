//! Prompt text sent to the conversation model.

/// System instructions delivered when a session opens.
///
/// Establishes the bilingual reply format (English, `---`, Chinese), the
/// scoring duties and the spoken control phrases the relay also watches
/// for.
pub const PERSONA: &str = "你是一名专业的英语口语指导老师。请用中英文双语进行回复，英文在前中文在后，用 --- 分隔。\n\n\
Your responsibilities are:\n\
1. Help users correct grammar and pronunciation\n\
2. Give pronunciation scores and detailed feedback\n\
3. Understand and respond to control commands:\n\
\x20\x20\x20- Pause when user says \"Can I have a break\"\n\
\x20\x20\x20- Continue when user says \"OK let's continue\"\n\
4. Provide practice sentences based on chosen themes and scenarios\n\n\
你的职责是：\n\
1. 帮助用户纠正语法和发音\n\
2. 给出发音评分和详细反馈\n\
3. 理解并响应用户的控制指令：\n\
\x20\x20\x20- 当用户说\"Can I have a break\"时暂停\n\
\x20\x20\x20- 当用户说\"OK let's continue\"时继续\n\
4. 基于选择的主题和场景提供练习句子\n\n\
First, ask which theme they want to practice (business, travel, daily life, social) in English.\n\n\
每次用户说完一个句子后，你需要：\n\
1. 识别用户说的内容（英文）\n\
2. 给出发音评分（0-100分）\n\
3. 详细说明发音和语法中的问题（中英文对照）\n\
4. 提供改进建议（中英文对照）\n\
5. 提供下一个相关场景的练习句子（中英文对照）\n\n\
请始终保持以下格式：\n\
[English content]\n---\n[中文内容]\n\n\
如果明白了请用中英文回答OK";

/// Statement relaying the client's theme and scenario preference.
pub fn preference_statement(theme: &str, scenario: &str) -> String {
    format!("I'd like to practice the {theme} theme focusing on the {scenario} scenario.")
}

/// Asks the model for one practice sentence, optionally scoped to a theme
/// and scenario.
pub fn practice_sentence_prompt(theme: Option<&str>, scenario: Option<&str>) -> String {
    let mut details = Vec::new();
    if let Some(theme) = theme {
        details.push(format!("theme '{theme}'"));
    }
    if let Some(scenario) = scenario {
        details.push(format!("scenario '{scenario}'"));
    }
    let focus_clause = if details.is_empty() {
        String::new()
    } else {
        format!(" focusing on {}", details.join(" and "))
    };
    format!(
        "Please provide one short, conversational practice sentence{focus_clause}. \
         Respond using the agreed bilingual format (English line, newline, '---', newline, Chinese). \
         After presenting the sentence, encourage me to repeat it aloud and wait for my audio before giving corrections or scores."
    )
}

/// Human-readable description of what the next practice round covers.
pub fn practice_focus_label(theme: Option<&str>, scenario: Option<&str>) -> String {
    match (theme, scenario) {
        (Some(theme), Some(scenario)) => format!("{theme} - {scenario}"),
        (Some(theme), None) => theme.to_string(),
        (None, Some(scenario)) => scenario.to_string(),
        (None, None) => "练习内容".to_string(),
    }
}

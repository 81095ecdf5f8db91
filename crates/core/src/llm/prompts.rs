pub const SYSTEM_PROMPT: &str = "You are a financial analyst.";

/// Headline fed to the model. There is no news feed behind this yet, so the line is
/// templated per ticker.
pub fn news_text(ticker: &str) -> String {
    format!("{ticker} stock has shown strong quarterly earnings and increased investor confidence.")
}

pub fn user_prompt(ticker: &str) -> String {
    format!(
        "Summarize sentiment and impact of this news: {}",
        news_text(ticker)
    )
}

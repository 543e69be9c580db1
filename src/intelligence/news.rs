//! CSR news hub and company-specific news.
//!
//! News answers are plain text. The hub answer is cut into sections by its
//! headings with a best-effort tokenizer: no grammar, just the first
//! occurrence of each known marker. Nothing here is persisted.

use serde::Serialize;

use crate::error::ProfilerError;
use crate::gemini::GenerativeModel;
use crate::types::{Source, StructuredNewsContent};
use crate::util::now_rfc3339;

use super::prompts::{company_news_prompt, news_hub_prompt, NEWS_SECTION_MARKERS, NO_SECTION_INFO};

pub const NO_COMPANY_NEWS: &str =
    "No specific CSR news summary found for this company at this time.";

/// Result of one news hub fetch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsDigest {
    pub content: StructuredNewsContent,
    pub sources: Vec<Source>,
    pub fetched_at: String,
}

/// Result of one company news fetch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyNews {
    pub company: String,
    pub text: String,
    pub sources: Vec<Source>,
    pub fetched_at: String,
}

/// Split `text` into one section per marker.
///
/// Each found marker owns the text from its end to the start of the next
/// found marker (by position, not by list order). Markers that are missing,
/// and sections that are blank after trimming, get `missing`. Output order
/// follows `markers`.
pub fn segment_sections(text: &str, markers: &[&str], missing: &str) -> Vec<String> {
    let mut found: Vec<(usize, usize, usize)> = markers
        .iter()
        .enumerate()
        .filter_map(|(slot, marker)| text.find(marker).map(|pos| (pos, slot, marker.len())))
        .collect();
    found.sort();

    let mut sections = vec![missing.to_string(); markers.len()];
    for (i, &(pos, slot, len)) in found.iter().enumerate() {
        let end = found.get(i + 1).map_or(text.len(), |next| next.0);
        let start = (pos + len).min(end);
        let body = text[start..end].trim();
        if !body.is_empty() {
            sections[slot] = body.to_string();
        }
    }
    sections
}

/// Segment a news hub answer into the four fixed sections.
pub fn parse_news_sections(text: &str) -> StructuredNewsContent {
    let mut sections = segment_sections(text, &NEWS_SECTION_MARKERS, NO_SECTION_INFO).into_iter();
    let mut next = || sections.next().unwrap_or_else(|| NO_SECTION_INFO.to_string());
    StructuredNewsContent {
        news: next(),
        events: next(),
        awards: next(),
        education_csr: next(),
    }
}

fn empty_news_content() -> StructuredNewsContent {
    StructuredNewsContent {
        news: "No news content received.".to_string(),
        events: "No events content received.".to_string(),
        awards: "No awards content received.".to_string(),
        education_csr: "No education CSR content received.".to_string(),
    }
}

/// Fetch the general CSR news hub.
pub async fn fetch_news_hub(model: &dyn GenerativeModel) -> Result<NewsDigest, ProfilerError> {
    let generation = model.generate(&news_hub_prompt()).await?;
    let content = if generation.text.trim().is_empty() {
        log::warn!("Empty AI response for news hub");
        empty_news_content()
    } else {
        parse_news_sections(&generation.text)
    };
    Ok(NewsDigest {
        content,
        sources: generation.sources,
        fetched_at: now_rfc3339(),
    })
}

/// Fetch a short recent-CSR-news summary for one company.
pub async fn fetch_company_news(
    model: &dyn GenerativeModel,
    company_name: &str,
) -> Result<CompanyNews, ProfilerError> {
    let generation = model.generate(&company_news_prompt(company_name)).await?;
    let text = if generation.text.trim().is_empty() {
        NO_COMPANY_NEWS.to_string()
    } else {
        generation.text
    };
    Ok(CompanyNews {
        company: company_name.to_string(),
        text,
        sources: generation.sources,
        fetched_at: now_rfc3339(),
    })
}

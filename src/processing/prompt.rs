//! Prompt construction for the map and reduce stages.

use crate::document::DocumentMetadata;

use super::types::SummaryMode;

/// Build the prompt that summarizes one chunk.
pub(crate) fn build_chunk_prompt(
    chunk: &str,
    metadata: &DocumentMetadata,
    mode: SummaryMode,
) -> String {
    let title = metadata.display_title();
    match mode {
        SummaryMode::Financial => format!(
            "Summarize the following section of a financial document.\n\
Focus on preserving:\n\
1. Important financial terms, metrics, and numbers\n\
2. Policy statements and legal obligations\n\
3. Risk factors and warnings\n\
4. Key dates, timelines, and deadlines\n\n\
Document Title: {title}\n\
Document Section:\n\
{chunk}\n\n\
Provide a concise yet comprehensive summary that maintains all critical financial information and regulatory details:"
        ),
        SummaryMode::General => format!(
            "Summarize the following section of a document.\n\
Document Title: {title}\n\
Document Section:\n\
{chunk}\n\n\
Provide a concise yet comprehensive summary:"
        ),
    }
}

/// Render ordered section summaries as numbered blocks separated by blank lines.
pub(crate) fn render_section_block(summaries: &[String]) -> String {
    summaries
        .iter()
        .enumerate()
        .map(|(index, summary)| format!("Section {} Summary:\n{summary}", index + 1))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the prompt that combines all section summaries into the final summary.
pub(crate) fn build_reduce_prompt(
    summaries: &[String],
    metadata: &DocumentMetadata,
    mode: SummaryMode,
) -> String {
    let (subject, instructions) = match mode {
        SummaryMode::Financial => (
            "a financial document",
            "Create a well-structured final summary of the entire document that:\n\
1. Preserves all critical financial information, terms, and metrics\n\
2. Maintains all policy statements and compliance requirements\n\
3. Highlights key risk factors and warnings\n\
4. Organizes information logically by sections\n\
5. Includes important dates, deadlines, and timelines\n\n\
The summary should be comprehensive enough to serve as a reliable reference to the original document:",
        ),
        SummaryMode::General => (
            "a document",
            "Create a well-structured final summary of the entire document that captures all the key information and maintains the logical flow:",
        ),
    };

    format!(
        "You are creating a final comprehensive summary of {subject}.\n\
Below are summaries of each section of the document.\n\n\
Document Title: {title}\n\
Document Author: {author}\n\
Document Keywords: {keywords}\n\
Total Pages: {pages}\n\n\
{sections}\n\n\
{instructions}",
        title = metadata.display_title(),
        author = metadata.display_author(),
        keywords = metadata.display_keywords(),
        pages = metadata.display_page_count(),
        sections = render_section_block(summaries),
    )
}

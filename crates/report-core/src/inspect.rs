//! Read rendered reports back
//!
//! Used to check output: page counts and the text shown on each page.

use lopdf::content::Content;
use lopdf::Document;

use crate::error::RenderError;
use crate::text::decode_win_ansi;

fn load(bytes: &[u8]) -> Result<Document, RenderError> {
    Document::load_mem(bytes).map_err(|e| RenderError::DocumentError(e.to_string()))
}

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, RenderError> {
    Ok(load(bytes)?.get_pages().len() as u32)
}

/// Text shown by each `Tj` operator, grouped per page in page order
pub fn page_text_runs(bytes: &[u8]) -> Result<Vec<Vec<String>>, RenderError> {
    let doc = load(bytes)?;
    let mut pages = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let raw = doc
            .get_page_content(page_id)
            .map_err(|e| RenderError::DocumentError(e.to_string()))?;
        let content =
            Content::decode(&raw).map_err(|e| RenderError::DocumentError(e.to_string()))?;
        let runs = content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| op.operands.first())
            .filter_map(|operand| operand.as_str().ok())
            .map(decode_win_ansi)
            .collect();
        pages.push(runs);
    }
    Ok(pages)
}

/// First page (1-based) with a text run containing `needle`
pub fn find_page_containing(bytes: &[u8], needle: &str) -> Result<Option<u32>, RenderError> {
    let pages = page_text_runs(bytes)?;
    Ok(pages
        .iter()
        .position(|runs| runs.iter().any(|run| run.contains(needle)))
        .map(|index| index as u32 + 1))
}

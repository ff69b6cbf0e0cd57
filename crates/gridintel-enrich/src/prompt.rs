//! Prompt construction for the analysis request.

use gridintel_core::RawRecord;

/// System message sent with chat-style backends.
pub const SYSTEM_PROMPT: &str = "You are a utility strategic investment analyst specializing in regulated utility investments and grid modernization.";

const INSTRUCTIONS: &str = r#"Act as a strategic investment analyst for Con Edison, New York's largest utility company.
Analyze the following document and evaluate it as a potential investment opportunity based on:

1. Ability to enhance grid reliability and resilience
2. Potential to meet New York CLCPA (Climate Leadership and Community Protection Act) mandates
3. Suitability as a rate-based asset for regulated utility investment
4. Relevance to Con Edison's NYC and Westchester County service territory

Extract the following information and return as JSON:

{
    "investment_thesis_tag": "Primary reason Con Edison should care (e.g., 'Grid Reliability', 'Peak Load Reduction', 'Transmission Decongestion', 'Electrification of Heat/Transport', 'Storm Hardening', 'Regulatory Compliance (CLCPA)', 'Demand Response', 'Energy Storage', 'Smart Grid Technology')",
    "technology_readiness_level": "Integer 1-9 (1-3=concept, 4-6=prototype, 7-9=commercial)",
    "regulated_asset_potential": "true/false - can this become a rate-based asset?",
    "ny_service_territory_relevance": "true/false - does this impact NYC/Westchester?",
    "grid_impact_score": "Integer 1-10 for potential grid improvement",
    "clcpa_compliance_value": "How this helps meet CLCPA mandates (specific benefits)",
    "capital_investment_required": "Low/Medium/High",
    "implementation_timeline": "Short/Medium/Long",
    "risk_assessment": "Low/Medium/High",
    "strategic_priority": "High/Medium/Low based on Con Edison's strategic needs"
}"#;

const PLACEHOLDER: &str = "N/A";

fn or_placeholder(s: &str) -> &str {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        PLACEHOLDER
    } else {
        trimmed
    }
}

/// Builds the analysis prompt for `record`.
///
/// Depends only on the record's title, content, source name and date, so
/// identical records always produce byte-identical prompts.
#[must_use]
pub fn build_prompt(record: &RawRecord) -> String {
    format!(
        "{INSTRUCTIONS}\n\nDocument to analyze:\nTitle: {}\nContent: {}\nSource: {}\nDate: {}\n\nReturn only valid JSON with the exact field names specified above.",
        or_placeholder(&record.title),
        or_placeholder(&record.content),
        or_placeholder(&record.source_name),
        or_placeholder(&record.date),
    )
}

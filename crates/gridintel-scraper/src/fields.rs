//! Regex-based extraction of funding amount, funding stage, and thesis tag.

use std::sync::LazyLock;

use regex::Regex;

/// Dollar-amount patterns, tried in order. Capture 1 is the number, capture 2
/// the unit word or abbreviation. An abbreviation must not run on into a
/// longer word, so `$5 mark` is not an amount while `$10MM` is.
static FUNDING_AMOUNT_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)\$(\d+(?:\.\d+)?)\s*(billion|million|thousand)\b").expect("valid regex"),
        Regex::new(r"(?i)\$(\d+(?:\.\d+)?)\s*(mm|mn|bn|[bmk])(?:[^a-z]|$)").expect("valid regex"),
        Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(billion|million|thousand)\s+dollars\b")
            .expect("valid regex"),
        Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(mm|mn|bn|[bmk])\s+dollars\b").expect("valid regex"),
    ]
});

/// Funding stage vocabulary in precedence order, with the label reported
/// for each.
static FUNDING_STAGES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)\bseed\b", "Seed"),
        (r"(?i)\bseries\s+a\b", "Series A"),
        (r"(?i)\bseries\s+b\b", "Series B"),
        (r"(?i)\bseries\s+c\b", "Series C"),
        (r"(?i)\bgrowth\b", "Growth"),
        (r"(?i)\bipo\b", "IPO"),
        (r"(?i)\bgrants?\b", "Grant"),
        (r"(?i)\bloans?\b", "Loan"),
    ]
    .into_iter()
    .map(|(pattern, label)| (Regex::new(pattern).expect("valid regex"), label))
    .collect()
});

fn unit_suffix(unit: &str) -> Option<char> {
    match unit.to_ascii_lowercase().as_str() {
        "b" | "bn" | "billion" => Some('B'),
        "m" | "mm" | "mn" | "million" => Some('M'),
        "k" | "thousand" => Some('K'),
        _ => None,
    }
}

/// `true` if `text` contains a dollar amount in any recognised form.
#[must_use]
pub fn mentions_dollar_amount(text: &str) -> bool {
    FUNDING_AMOUNT_PATTERNS.iter().any(|re| re.is_match(text))
}

/// Returns the first dollar amount in `text`, normalized to `$<n><M|B|K>`.
///
/// ```
/// use gridintel_scraper::extract_funding_amount;
/// assert_eq!(extract_funding_amount("raised $10M to scale").as_deref(), Some("$10M"));
/// assert_eq!(extract_funding_amount("a 2.5 billion dollars plan").as_deref(), Some("$2.5B"));
/// ```
#[must_use]
pub fn extract_funding_amount(text: &str) -> Option<String> {
    FUNDING_AMOUNT_PATTERNS.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let amount = caps.get(1)?.as_str();
        let unit = unit_suffix(caps.get(2)?.as_str())?;
        Some(format!("${amount}{unit}"))
    })
}

/// Returns the first funding stage, by vocabulary order, that appears in `text`.
#[must_use]
pub fn extract_funding_stage(text: &str) -> Option<String> {
    FUNDING_STAGES
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, label)| (*label).to_owned())
}

/// Returns the first tag of `tags` that appears (case-insensitively) in
/// `text`, exactly as written in the vocabulary.
#[must_use]
pub fn extract_thesis_tag<S: AsRef<str>>(text: &str, tags: &[S]) -> Option<String> {
    let lower = text.to_lowercase();
    tags.iter()
        .map(AsRef::as_ref)
        .find(|tag| !tag.is_empty() && lower.contains(&tag.to_lowercase()))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_with_letter_suffix() {
        assert_eq!(extract_funding_amount("GridCo raised $10M in Series B").as_deref(), Some("$10M"));
        assert_eq!(extract_funding_amount("a $750k grant").as_deref(), Some("$750K"));
        assert_eq!(extract_funding_amount("$2b deal").as_deref(), Some("$2B"));
    }

    #[test]
    fn amount_with_unit_word() {
        assert_eq!(
            extract_funding_amount("secured $1.5 billion in financing").as_deref(),
            Some("$1.5B")
        );
        assert_eq!(
            extract_funding_amount("a $300 thousand award").as_deref(),
            Some("$300K")
        );
    }

    #[test]
    fn amount_written_in_dollars() {
        assert_eq!(
            extract_funding_amount("roughly 40 million dollars for storage").as_deref(),
            Some("$40M")
        );
        assert_eq!(
            extract_funding_amount("about 5 k dollars").as_deref(),
            Some("$5K")
        );
    }

    #[test]
    fn unit_word_is_not_read_as_letter_suffix() {
        assert_eq!(
            extract_funding_amount("Raises $12 million").as_deref(),
            Some("$12M")
        );
    }

    #[test]
    fn amount_with_finance_abbreviation() {
        assert_eq!(extract_funding_amount("raised $10MM").as_deref(), Some("$10M"));
        assert_eq!(extract_funding_amount("a $1.5bn round").as_deref(), Some("$1.5B"));
        assert_eq!(extract_funding_amount("$40mn for storage").as_deref(), Some("$40M"));
        assert!(mentions_dollar_amount("raised $10MM"));
        assert!(mentions_dollar_amount("$1.5bn round"));
    }

    #[test]
    fn letter_suffix_at_sentence_end() {
        assert_eq!(extract_funding_amount("It raised $3M.").as_deref(), Some("$3M"));
        assert_eq!(extract_funding_amount("total: $8k").as_deref(), Some("$8K"));
    }

    #[test]
    fn no_amount_without_unit() {
        assert_eq!(extract_funding_amount("costs $100 per month"), None);
        assert_eq!(extract_funding_amount("$5 mark"), None);
        assert_eq!(extract_funding_amount("$20 monthly fee"), None);
        assert!(!mentions_dollar_amount("2024 was a big year"));
    }

    #[test]
    fn dollar_detection_matches_extraction() {
        for text in ["$10M", "$3.2 billion", "7 million dollars", "15k dollars"] {
            assert!(mentions_dollar_amount(text), "{text}");
            assert!(extract_funding_amount(text).is_some(), "{text}");
        }
    }

    #[test]
    fn stage_follows_vocabulary_order() {
        assert_eq!(
            extract_funding_stage("Series B funding after a seed round").as_deref(),
            Some("Seed")
        );
        assert_eq!(
            extract_funding_stage("closes SERIES  C").as_deref(),
            Some("Series C")
        );
        assert_eq!(extract_funding_stage("DOE grants awarded").as_deref(), Some("Grant"));
    }

    #[test]
    fn stage_requires_word_boundary() {
        assert_eq!(extract_funding_stage("seeded clouds and outgrowth"), None);
        assert_eq!(extract_funding_stage("the series about grids"), None);
    }

    #[test]
    fn thesis_tag_returns_first_vocabulary_match() {
        let tags = ["Grid Reliability", "Energy Storage", "Demand Response"];
        assert_eq!(
            extract_thesis_tag("Demand response and energy storage pilots", &tags).as_deref(),
            Some("Energy Storage")
        );
        assert_eq!(extract_thesis_tag("nothing relevant", &tags), None);
    }

    #[test]
    fn thesis_tag_ignores_empty_entries() {
        let tags = ["", "Storm Hardening"];
        assert_eq!(
            extract_thesis_tag("storm hardening budget", &tags).as_deref(),
            Some("Storm Hardening")
        );
    }
}

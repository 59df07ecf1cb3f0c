use crate::jira::Issue;

const MAX_KEYWORDS: usize = 10;

const STOP_WORDS: &[&str] = &[
    "with", "from", "this", "that", "have", "for", "the", "and", "but", "are", "has", "was",
    "all", "can", "not", "any", "you", "your", "our", "their", "will", "should", "able", "when",
    "then", "than", "each", "more", "less", "also", "just", "like", "into", "over", "under",
    "after", "before", "been", "only", "some", "such", "very", "much", "many", "most", "other",
    "which", "where", "what", "who", "how", "why", "could", "would", "about", "above", "below",
    "between", "during", "through", "because", "while", "these", "those", "every", "both",
    "either", "neither", "since", "until", "within", "without", "across", "against", "among",
    "around", "behind", "beside", "despite", "except", "inside", "outside", "toward", "upon",
    "via",
];

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// One-line "tested area" digest: component names plus summary vocabulary,
/// both in first-seen order.
pub fn tested_area(issues: &[Issue]) -> String {
    let mut components: Vec<String> = Vec::new();
    let mut keywords: Vec<String> = Vec::new();

    for issue in issues {
        for c in &issue.fields.components {
            push_unique(&mut components, &c.name);
        }
        for word in issue.summary().split_whitespace() {
            let word = word.to_lowercase();
            // Length in UTF-16 units, as the browser client measures it.
            if word.encode_utf16().count() > 3 && !STOP_WORDS.contains(&word.as_str()) {
                push_unique(&mut keywords, &word);
            }
        }
    }

    keywords.truncate(MAX_KEYWORDS);
    format!(
        "Tested components: {}. Key areas: {}",
        components.join(", "),
        keywords.join(", ")
    )
}

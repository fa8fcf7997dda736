use sre_copilot_common::{Intent, QuestionType, Specificity, Topic};
use tracing::debug;

/// One entry of a decision list: the first rule with any matching keyword wins.
#[derive(Debug, Clone)]
pub struct KeywordRule<T> {
    pub value: T,
    pub keywords: &'static [&'static str],
}

const fn keywords<T>(value: T, keywords: &'static [&'static str]) -> KeywordRule<T> {
    KeywordRule { value, keywords }
}

pub const TOPIC_RULES: &[KeywordRule<Topic>] = &[
    keywords(Topic::Cuj, &["cuj", "critical user journey", "user journey"]),
    keywords(Topic::Sli, &["sli", "service level indicator", "indicator", "metric"]),
    keywords(Topic::Slo, &["slo", "service level objective", "objective", "error budget", "target"]),
    keywords(
        Topic::Observability,
        &["observability", "monitoring", "alert", "dashboard", "logging", "tracing", "telemetry"],
    ),
    keywords(Topic::Security, &["security", "secure", "vulnerab", "compliance", "encrypt"]),
    keywords(
        Topic::Implementation,
        &["implement", "set up", "setup", "configure", "deploy", "integrate", "build"],
    ),
    keywords(Topic::Comparison, &[" vs ", "versus", "difference", "compare", "comparison"]),
    keywords(
        Topic::Troubleshooting,
        &["troubleshoot", "debug", "not working", "issue", "problem", "broken", "fail", "error"],
    ),
];

pub const QUESTION_RULES: &[KeywordRule<QuestionType>] = &[
    keywords(QuestionType::How, &["how"]),
    keywords(QuestionType::What, &["what", "define", "definition", "explain", "meaning"]),
    keywords(QuestionType::Why, &["why"]),
    keywords(QuestionType::When, &["when"]),
    keywords(QuestionType::Recommendation, &["should", "recommend", "best", "suggest", "advice"]),
];

pub const SPECIFICITY_RULES: &[KeywordRule<Specificity>] = &[
    keywords(
        Specificity::Beginner,
        &["beginner", "new to", "basic", "simple", "introduction", "getting started", "first time"],
    ),
    keywords(
        Specificity::Advanced,
        &["advanced", "complex", "deep dive", "in depth", "in-depth", "expert", "at scale"],
    ),
    keywords(Specificity::Example, &["example", "sample", "template", "show me", "for instance"]),
];

/// Keywords starting with a letter or digit only match at the start of a word,
/// so "how" does not fire inside "show".
fn matches_keyword(text: &str, keyword: &str) -> bool {
    let anchored = keyword.starts_with(char::is_alphanumeric);
    text.match_indices(keyword).any(|(start, _)| {
        !anchored || !text[..start].chars().next_back().is_some_and(char::is_alphanumeric)
    })
}

fn first_match<T: Copy>(rules: &[KeywordRule<T>], text: &str, fallback: T) -> T {
    rules
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| matches_keyword(text, keyword)))
        .map(|rule| rule.value)
        .unwrap_or(fallback)
}

/// Deterministic keyword classifier for chat messages.
///
/// Topic, question type and specificity are decided independently, each by
/// its own ordered rule list. There is no scoring.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    topics: &'static [KeywordRule<Topic>],
    questions: &'static [KeywordRule<QuestionType>],
    specificity: &'static [KeywordRule<Specificity>],
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self {
            topics: TOPIC_RULES,
            questions: QUESTION_RULES,
            specificity: SPECIFICITY_RULES,
        }
    }

    pub fn classify(&self, message: &str) -> Intent {
        let normalized = message.to_lowercase();

        let intent = Intent {
            primary: first_match(self.topics, &normalized, Topic::General),
            question_type: first_match(self.questions, &normalized, QuestionType::General),
            specificity: first_match(self.specificity, &normalized, Specificity::General),
        };

        debug!("Classified '{}' as {:?}", message, intent);
        intent
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

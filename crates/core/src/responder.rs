use sre_copilot_common::{
    AssistantError, ConceptKind, Intent, KnowledgeStats, QuestionType, Result, Specificity, Topic,
};
use sre_copilot_knowledge::KnowledgeBase;
use tracing::debug;

const MAX_EXAMPLES: usize = 3;
const MAX_EXCERPTS: usize = 3;

const GENERIC_TEMPLATE: &str = "I can help with Site Reliability Engineering questions about \
critical user journeys, SLIs, SLOs, observability and incident practice. \
The knowledge base holds {documents} documents with {cujs} CUJs, {slis} SLIs, {slos} SLOs \
and {practices} best practices. Try asking what a CUJ is, how to pick an SLI, \
or how to set an SLO target.";

/// Template keyed on all three intent axes.
fn specific_template(intent: &Intent) -> Option<&'static str> {
    use QuestionType as Q;
    use Specificity as S;
    use Topic as T;

    let template = match (intent.primary, intent.question_type, intent.specificity) {
        (T::Cuj, Q::What, _) => {
            "A Critical User Journey (CUJ) is a sequence of steps a user takes to reach \
             a goal that matters to them, such as signing in or completing a checkout. \
             CUJs anchor reliability work on what users actually experience. \
             I currently know about {cujs} CUJs from your documents."
        }
        (T::Cuj, Q::How, S::Beginner) => {
            "Start small: list the handful of things users must be able to do, write each \
             one down as a journey with a clear start and end, and rank them by business \
             impact. Your documents describe {cujs} CUJs you can use as a starting point."
        }
        (T::Cuj, Q::How, _) => {
            "To define CUJs, map user goals to the services involved, mark the steps where \
             failure is visible to the user, and agree on an owner per journey. \
             Each journey then gets SLIs that measure its success. \
             There are {cujs} CUJs in the knowledge base."
        }
        (T::Sli, Q::What, _) => {
            "A Service Level Indicator (SLI) is a carefully defined measurement of service \
             behaviour, usually the ratio of good events to valid events: successful \
             requests, requests faster than a threshold, or fresh data. \
             I have found {slis} SLIs in your documents."
        }
        (T::Sli, Q::How, S::Example) => {
            "A typical request-based SLI: the proportion of HTTP requests to the checkout \
             API that return a non-5xx status within 300 ms, measured at the load balancer. \
             Your documents contain {slis} SLIs to compare against."
        }
        (T::Sli, Q::How, _) => {
            "Pick SLIs from the user's point of view: measure availability, latency and \
             correctness as close to the user as you can, express each as good events over \
             valid events, and keep the list short per journey. \
             The knowledge base lists {slis} SLIs."
        }
        (T::Slo, Q::What, _) => {
            "A Service Level Objective (SLO) is a target value for an SLI over a time \
             window, for example 99.9% of requests succeed over 30 days. The gap between \
             the target and 100% is the error budget. \
             I know of {slos} SLOs in your documents."
        }
        (T::Slo, Q::How, S::Advanced) => {
            "For mature SLOs, alert on multi-window burn rates rather than raw error \
             counts, tie release policy to remaining error budget, and review targets \
             quarterly against user feedback. There are {slos} SLOs to draw from."
        }
        (T::Slo, Q::How, _) => {
            "To set an SLO, start from the SLI's recent performance, choose a target users \
             would accept, pick a rolling window, and agree on what happens when the error \
             budget runs out. The knowledge base holds {slos} SLOs."
        }
        (T::Slo, Q::Why, _) => {
            "SLOs turn reliability into an explicit, shared target. They let teams balance \
             feature velocity against stability through the error budget. \
             Your documents define {slos} SLOs."
        }
        (_, Q::Recommendation, _) => {
            "Recommended practice: measure what users feel, keep targets below 100%, \
             alert on symptoms rather than causes, and revisit objectives regularly. \
             There are {practices} best practices recorded in your documents."
        }
        _ => return None,
    };
    Some(template)
}

fn topic_template(topic: Topic) -> Option<&'static str> {
    let template = match topic {
        Topic::Cuj => {
            "Critical User Journeys describe what users need to get done. \
             Your documents describe {cujs} CUJs."
        }
        Topic::Sli => {
            "SLIs measure how well a service is doing from the user's point of view. \
             Your documents describe {slis} SLIs."
        }
        Topic::Slo => {
            "SLOs set the reliability target for each SLI and define the error budget. \
             Your documents describe {slos} SLOs."
        }
        Topic::Observability => {
            "Good observability combines metrics, logs and traces, with alerts built on \
             SLO burn rather than on individual causes. The knowledge base covers \
             {documents} documents and {practices} best practices."
        }
        Topic::Security => {
            "Security is part of reliability: treat authentication, dependency \
             vulnerabilities and access reviews as risks to your CUJs. \
             There are {practices} best practices in the knowledge base."
        }
        Topic::Implementation => {
            "A practical rollout: identify CUJs, choose SLIs for each, set SLO targets, \
             build dashboards and burn-rate alerts, then review monthly. \
             You have {cujs} CUJs, {slis} SLIs and {slos} SLOs documented so far."
        }
        Topic::Comparison => {
            "In short: an SLI is the measurement, an SLO is the target for that \
             measurement, and an SLA is the contractual promise built on top, usually \
             looser than the SLO."
        }
        Topic::Troubleshooting => {
            "When a service misbehaves, check which CUJs are affected, look at the SLIs \
             that moved first, and compare error budget burn against recent changes. \
             {practices} best practices in your documents may help."
        }
        Topic::General => return None,
    };
    Some(template)
}

/// Search term used to pull supporting excerpts for a topic.
fn topic_term(topic: Topic) -> Option<&'static str> {
    match topic {
        Topic::Cuj => Some("critical user journey"),
        Topic::Sli => Some("service level indicator"),
        Topic::Slo => Some("service level objective"),
        Topic::Observability => Some("observability"),
        Topic::Security => Some("security"),
        Topic::Implementation => Some("implement"),
        Topic::Troubleshooting => Some("troubleshoot"),
        Topic::Comparison | Topic::General => None,
    }
}

fn topic_concepts(topic: Topic) -> Option<ConceptKind> {
    match topic {
        Topic::Cuj => Some(ConceptKind::Journeys),
        Topic::Sli => Some(ConceptKind::Indicators),
        Topic::Slo => Some(ConceptKind::Objectives),
        Topic::Observability | Topic::Implementation | Topic::Troubleshooting => {
            Some(ConceptKind::Practices)
        }
        Topic::Security | Topic::Comparison | Topic::General => None,
    }
}

fn interpolate(template: &str, stats: &KnowledgeStats) -> String {
    template
        .replace("{documents}", &stats.documents.to_string())
        .replace("{cujs}", &stats.cujs.to_string())
        .replace("{slis}", &stats.slis.to_string())
        .replace("{slos}", &stats.slos.to_string())
        .replace("{practices}", &stats.best_practices.to_string())
}

/// Up to three snippets from the best-matching documents for `topic`.
pub fn supporting_snippets(knowledge: &KnowledgeBase, topic: Topic) -> Vec<String> {
    let Some(term) = topic_term(topic) else {
        return Vec::new();
    };

    knowledge
        .search_engine()
        .search_documents(term)
        .map(|results| {
            results
                .into_iter()
                .flat_map(|result| result.snippets)
                .take(MAX_EXCERPTS)
                .collect()
        })
        .unwrap_or_default()
}

/// Deterministic answer generator used when no remote provider answers.
#[derive(Debug, Default, Clone)]
pub struct LocalResponder;

impl LocalResponder {
    pub fn new() -> Self {
        Self
    }

    pub fn template_for(&self, intent: &Intent) -> &'static str {
        specific_template(intent)
            .or_else(|| topic_template(intent.primary))
            .unwrap_or(GENERIC_TEMPLATE)
    }

    pub fn synthesize(&self, message: &str, intent: &Intent, knowledge: &KnowledgeBase) -> Result<String> {
        let stats = knowledge.stats();
        let mut response = interpolate(self.template_for(intent), &stats);

        if let Some(kind) = topic_concepts(intent.primary) {
            let examples = knowledge.concepts().get(kind).entries();
            if !examples.is_empty() {
                response.push_str(&format!("\n\nExamples of {} from your documents:", kind.label()));
                for example in examples.iter().take(MAX_EXAMPLES) {
                    response.push_str(&format!("\n- {}", example));
                }
            }
        }

        let excerpts = supporting_snippets(knowledge, intent.primary);
        if !excerpts.is_empty() {
            response.push_str("\n\nRelevant excerpts:");
            for excerpt in &excerpts {
                response.push_str(&format!("\n> {}", excerpt));
            }
        }

        if response.trim().is_empty() {
            return Err(AssistantError::SynthesisFailure(
                "template produced no text".to_string(),
            ));
        }

        debug!("Synthesized local response to '{}' as {:?}", message, intent);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sre_copilot_common::{DocumentCategory, DocumentMetadata};

    fn intent(primary: Topic, question_type: QuestionType, specificity: Specificity) -> Intent {
        Intent { primary, question_type, specificity }
    }

    fn loaded_knowledge() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new().unwrap();
        kb.load_document(
            "framework/cuj.md",
            Ok("# CUJ Framework\nCUJ: complete checkout. A critical user journey ends with a receipt.".to_string()),
            DocumentMetadata::new("CUJ Framework", DocumentCategory::Framework),
        );
        kb
    }

    #[test]
    fn test_cuj_what_with_empty_knowledge_reports_zero() {
        let kb = KnowledgeBase::new().unwrap();
        let text = LocalResponder::new()
            .synthesize(
                "What is a CUJ?",
                &intent(Topic::Cuj, QuestionType::What, Specificity::General),
                &kb,
            )
            .unwrap();

        assert!(text.contains("Critical User Journey"));
        assert!(text.contains("0 CUJs"));
    }

    #[test]
    fn test_template_degrades_to_topic_then_generic() {
        let responder = LocalResponder::new();

        let specific = responder.template_for(&intent(Topic::Slo, QuestionType::Why, Specificity::General));
        assert!(specific.starts_with("SLOs turn reliability"));

        let topic = responder.template_for(&intent(Topic::Security, QuestionType::When, Specificity::Advanced));
        assert_eq!(Some(topic), topic_template(Topic::Security));

        let generic = responder.template_for(&Intent::default());
        assert_eq!(generic, GENERIC_TEMPLATE);
    }

    #[test]
    fn test_examples_and_excerpts_are_included() {
        let kb = loaded_knowledge();
        let text = LocalResponder::new()
            .synthesize(
                "how do I define a CUJ",
                &intent(Topic::Cuj, QuestionType::How, Specificity::General),
                &kb,
            )
            .unwrap();

        // "CUJ: ..." and "critical user journey ..." both yield journeys
        assert!(text.contains("2 CUJs"));
        assert!(text.contains("Examples of critical user journeys"));
        assert!(text.contains("- complete checkout"));
        assert!(text.contains("> A critical user journey ends with a receipt"));
    }

    #[test]
    fn test_excerpts_are_capped() {
        let mut kb = KnowledgeBase::new().unwrap();
        for i in 0..5 {
            kb.load_document(
                format!("doc{}", i),
                Ok("Observability matters. Observability needs traces.".to_string()),
                DocumentMetadata::new(format!("Doc {}", i), DocumentCategory::Docs),
            );
        }
        assert_eq!(supporting_snippets(&kb, Topic::Observability).len(), MAX_EXCERPTS);
        assert!(supporting_snippets(&kb, Topic::General).is_empty());
    }

    #[test]
    fn test_blank_message_gets_generic_template() {
        let kb = KnowledgeBase::new().unwrap();
        let text = LocalResponder::new().synthesize("   ", &Intent::default(), &kb).unwrap();
        assert!(text.contains("0 CUJs, 0 SLIs and 0 SLOs"));
    }

    #[test]
    fn test_every_intent_produces_text() {
        let kb = KnowledgeBase::new().unwrap();
        let responder = LocalResponder::new();
        let topics = [
            Topic::Cuj,
            Topic::Sli,
            Topic::Slo,
            Topic::Observability,
            Topic::Security,
            Topic::Implementation,
            Topic::Comparison,
            Topic::Troubleshooting,
            Topic::General,
        ];
        let questions = [
            QuestionType::How,
            QuestionType::What,
            QuestionType::Why,
            QuestionType::When,
            QuestionType::Recommendation,
            QuestionType::General,
        ];
        let tiers = [Specificity::Beginner, Specificity::Advanced, Specificity::Example, Specificity::General];

        for topic in topics {
            for question in questions {
                for tier in tiers {
                    let text = responder
                        .synthesize("question", &intent(topic, question, tier), &kb)
                        .unwrap();
                    assert!(!text.contains('{'), "unfilled placeholder for {:?}/{:?}/{:?}", topic, question, tier);
                }
            }
        }
    }
}

//! Intent classification (spec §4.2), ML-primary with a deterministic
//! keyword fallback, per `original_source/intent_detection.py`. The
//! phrase/keyword tables below are reproduced verbatim from that file
//! — they are not invented and must not drift from it.

use async_trait::async_trait;
use regex::Regex;

use assistsupport_core::Intent;

/// A classifier that scores a query and returns (`Intent`, confidence).
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, query: &str) -> (Intent, f32);
}

/// Wraps a pre-computed class-probability source (training the model
/// itself is out of scope; this crate only consumes its output).
/// `(Intent::Policy, Intent::Procedure, Intent::Reference)` probabilities,
/// summing to roughly 1.0, as a trained classifier would produce.
#[async_trait]
pub trait IntentProbabilitySource: Send + Sync {
    async fn predict_proba(&self, query: &str) -> [f32; 3];
}

/// Below this confidence the ML path reports `Unknown`, with
/// confidence re-derived as `1 - max(proba)` (spec §9 Open Question 1 /
/// `_detect_ml`).
pub const ML_CONFIDENCE_THRESHOLD: f32 = 0.4;

/// Below this confidence the keyword path reports `Unknown` outright
/// (`_detect_keywords`).
pub const KEYWORD_CONFIDENCE_THRESHOLD: f32 = 0.1;

/// ML-backed classifier: argmax over class probabilities, falling back
/// to `Unknown` below [`ML_CONFIDENCE_THRESHOLD`].
pub struct MlIntentClassifier<S> {
    source: S,
}

impl<S: IntentProbabilitySource> MlIntentClassifier<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: IntentProbabilitySource> IntentClassifier for MlIntentClassifier<S> {
    async fn classify(&self, query: &str) -> (Intent, f32) {
        let proba = self.source.predict_proba(query).await;
        let classes = [Intent::Policy, Intent::Procedure, Intent::Reference];

        let (best_idx, &best_score) = proba
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();

        if best_score < ML_CONFIDENCE_THRESHOLD {
            let max_proba = proba.iter().cloned().fold(f32::MIN, f32::max);
            (Intent::Unknown, 1.0 - max_proba)
        } else {
            (classes[best_idx], best_score)
        }
    }
}

const POLICY_PRIORITY: &[&str] = &[
    "can i",
    "am i allowed",
    "am i permitted",
    "is it allowed",
    "is it okay",
    "are we allowed",
    "policy",
];

const POLICY_KEYWORDS: &[&[&str]] = &[
    &["forbidden", "not allowed", "banned", "prohibited", "restricted"],
    &["rule", "must", "shall", "compliance"],
    &["usb", "flash drive", "portable", "removable", "sd card"],
    &["firewall", "vpn", "encryption", "mfa"],
    &["confidential", "pii", "encrypt"],
];

const PROCEDURE_PRIORITY: &[&str] = &["how do i", "how to", "how do you", "how can i", "steps to"];

const PROCEDURE_KEYWORDS: &[&[&str]] = &[
    &["procedure", "process", "walkthrough", "guide"],
    &["request", "apply for", "submit", "fill out", "approval"],
    &["setup", "install", "configure", "set up", "initialization"],
    &["account", "login", "reset", "register"],
    &["laptop", "computer", "phone", "monitor", "keyboard", "device"],
    &["software", "application", "app", "tool", "license"],
];

const REFERENCE_PRIORITY: &[&str] = &["what is", "what are", "what does", "tell me about"];

const REFERENCE_KEYWORDS: &[&[&str]] = &[
    &["definition", "explain", "describe", "meaning"],
    &["about", "information", "details", "overview", "summary"],
    &["list", "options", "available", "approved", "allowed"],
    &["requirement", "requirements"],
];

/// Deterministic keyword-based classifier, used whenever no ML model
/// is wired up. Priority phrases count 2.0 on substring match; keyword
/// groups count 1.0 on whole-word match, else 0.5 on substring match.
/// `total / 5.0`, capped at 1.0 (`_score_intent`).
pub struct KeywordIntentClassifier;

impl KeywordIntentClassifier {
    pub fn new() -> Self {
        Self
    }

    fn score(query_lower: &str, priority: &[&str], keyword_groups: &[&[&str]]) -> f32 {
        let mut total = 0.0f64;

        for phrase in priority {
            if query_lower.contains(phrase) {
                total += 2.0;
            }
        }

        for group in keyword_groups {
            for keyword in *group {
                if query_lower.contains(keyword) {
                    if whole_word_match(query_lower, keyword) {
                        total += 1.0;
                    } else {
                        total += 0.5;
                    }
                }
            }
        }

        (total / 5.0).min(1.0) as f32
    }
}

impl Default for KeywordIntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn whole_word_match(haystack: &str, keyword: &str) -> bool {
    let pattern = format!(r"\b{}\b", regex::escape(keyword));
    Regex::new(&pattern)
        .map(|re| re.is_match(haystack))
        .unwrap_or(false)
}

#[async_trait]
impl IntentClassifier for KeywordIntentClassifier {
    async fn classify(&self, query: &str) -> (Intent, f32) {
        let query_lower = query.to_lowercase();

        let policy = Self::score(&query_lower, POLICY_PRIORITY, POLICY_KEYWORDS);
        let procedure = Self::score(&query_lower, PROCEDURE_PRIORITY, PROCEDURE_KEYWORDS);
        let reference = Self::score(&query_lower, REFERENCE_PRIORITY, REFERENCE_KEYWORDS);

        let (intent, confidence) = [
            (Intent::Policy, policy),
            (Intent::Procedure, procedure),
            (Intent::Reference, reference),
        ]
        .into_iter()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
        .unwrap();

        if confidence < KEYWORD_CONFIDENCE_THRESHOLD {
            (Intent::Unknown, confidence)
        } else {
            (intent, confidence)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn classifies_policy_priority_phrase() {
        let classifier = KeywordIntentClassifier::new();
        let (intent, confidence) = classifier.classify("Can I use a flash drive?").await;
        assert_eq!(intent, Intent::Policy);
        assert!(confidence > 0.0);
    }

    #[tokio::test]
    async fn classifies_procedure_priority_phrase() {
        let classifier = KeywordIntentClassifier::new();
        let (intent, _) = classifier.classify("How do I reset my password?").await;
        assert_eq!(intent, Intent::Procedure);
    }

    #[tokio::test]
    async fn classifies_reference_priority_phrase() {
        let classifier = KeywordIntentClassifier::new();
        let (intent, _) = classifier.classify("What is the VPN policy document?").await;
        assert_eq!(intent, Intent::Reference);
    }

    #[tokio::test]
    async fn falls_back_to_unknown_below_threshold() {
        let classifier = KeywordIntentClassifier::new();
        let (intent, _) = classifier.classify("wifi not connecting").await;
        assert_eq!(intent, Intent::Unknown);
    }

    struct FixedProbabilities([f32; 3]);

    #[async_trait]
    impl IntentProbabilitySource for FixedProbabilities {
        async fn predict_proba(&self, _query: &str) -> [f32; 3] {
            self.0
        }
    }

    #[tokio::test]
    async fn ml_classifier_falls_back_below_confidence_threshold() {
        let classifier = MlIntentClassifier::new(FixedProbabilities([0.3, 0.35, 0.35]));
        let (intent, confidence) = classifier.classify("anything").await;
        assert_eq!(intent, Intent::Unknown);
        assert!((confidence - (1.0 - 0.35)).abs() < 1e-6);
    }

    #[tokio::test]
    async fn ml_classifier_returns_argmax_above_threshold() {
        let classifier = MlIntentClassifier::new(FixedProbabilities([0.1, 0.8, 0.1]));
        let (intent, confidence) = classifier.classify("anything").await;
        assert_eq!(intent, Intent::Procedure);
        assert_eq!(confidence, 0.8);
    }
}

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use storage::models::Essay;

use super::extremes::CompetitionExtremes;
use crate::error::Result;
use crate::grammar::{GrammarMatch, IssueKind};
use crate::traits::{GrammarChecker, TopicScorer};

// Composite weights, summing to 1.
const SPEED_WEIGHT: Decimal = Decimal::from_parts(30, 0, 0, false, 2);
const WORD_WEIGHT: Decimal = Decimal::from_parts(20, 0, 0, false, 2);
const GRAMMAR_WEIGHT: Decimal = Decimal::from_parts(30, 0, 0, false, 2);
const SPELLING_WEIGHT: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

const GRAMMAR_PENALTY_PER_ERROR: i32 = 2;
const SPELLING_PENALTY_PER_ERROR: i32 = 3;
const MAX_SUBSCORE: i32 = 100;

/// Error counts and quality score produced by grammar analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrammarResult {
    pub grammar_errors: i32,
    pub spelling_errors: i32,
    pub grammar_score: i32,
}

impl GrammarResult {
    /// Substituted whenever the grammar checker cannot be used
    pub const NEUTRAL: Self = Self {
        grammar_errors: 0,
        spelling_errors: 0,
        grammar_score: MAX_SUBSCORE,
    };

    pub fn from_matches(matches: &[GrammarMatch]) -> Self {
        let spelling = matches
            .iter()
            .filter(|m| m.kind == IssueKind::Spelling)
            .count();
        let grammar = matches.len() - spelling;

        let spelling_errors = saturating_i32(spelling);
        let grammar_errors = saturating_i32(grammar);

        Self {
            grammar_errors,
            spelling_errors,
            grammar_score: penalized(
                grammar_errors.saturating_add(spelling_errors),
                GRAMMAR_PENALTY_PER_ERROR,
            ),
        }
    }
}

/// Sub-scores and composite of a final scoring run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub speed_score: Decimal,
    pub word_score: Decimal,
    pub grammar_score: Decimal,
    pub spelling_score: Decimal,
    /// Weighted composite rounded to 2 decimals, midpoints away from zero
    pub final_score: Decimal,
}

/// Turns essay text and competition context into scores.
///
/// The grammar checker (and optional topic scorer) are built once at startup
/// and injected here, so every essay reuses the same client.
pub struct ScoringEngine {
    grammar: Arc<dyn GrammarChecker>,
    topic: Option<Arc<dyn TopicScorer>>,
    grammar_timeout: Duration,
}

impl ScoringEngine {
    pub fn new(grammar: Arc<dyn GrammarChecker>, grammar_timeout: Duration) -> Self {
        Self {
            grammar,
            topic: None,
            grammar_timeout,
        }
    }

    pub fn with_topic_scorer(mut self, topic: Arc<dyn TopicScorer>) -> Self {
        self.topic = Some(topic);
        self
    }

    pub fn has_topic_scorer(&self) -> bool {
        self.topic.is_some()
    }

    /// Counts grammar and spelling problems across the essay's paragraphs.
    ///
    /// Never fails: when the checker errors or exceeds the timeout the
    /// neutral result is returned so essay completion is not blocked.
    pub async fn analyze_grammar<S: AsRef<str>>(&self, paragraphs: &[S]) -> GrammarResult {
        let text = join_paragraphs(paragraphs);
        if text.trim().is_empty() {
            return GrammarResult::NEUTRAL;
        }

        match tokio::time::timeout(self.grammar_timeout, self.grammar.check(&text)).await {
            Ok(Ok(matches)) => {
                let result = GrammarResult::from_matches(&matches);
                tracing::debug!(
                    "Grammar analysis found {} grammar and {} spelling errors",
                    result.grammar_errors,
                    result.spelling_errors
                );
                result
            }
            Ok(Err(e)) => {
                tracing::warn!("Grammar check failed, using neutral result: {}", e);
                GrammarResult::NEUTRAL
            }
            Err(_) => {
                tracing::warn!(
                    "Grammar check exceeded {:?}, using neutral result",
                    self.grammar_timeout
                );
                GrammarResult::NEUTRAL
            }
        }
    }

    /// Copies grammar metrics onto the essay; persisting is up to the caller
    pub fn apply_grammar(essay: &mut Essay, result: &GrammarResult) {
        essay.grammar_errors = result.grammar_errors;
        essay.spelling_errors = result.spelling_errors;
        essay.grammar_score = result.grammar_score;
    }

    /// Computes the composite score and stores it in `essay.final_score`.
    ///
    /// Returns `None` and leaves the essay untouched when it has not been
    /// completed yet. Speed and word sub-scores are relative to the supplied
    /// extremes and are not capped at 100.
    pub fn calculate_final_score(
        essay: &mut Essay,
        extremes: &CompetitionExtremes,
    ) -> Option<ScoreBreakdown> {
        let completed_at = essay.completed_at?;

        let user_time = seconds(completed_at - essay.started_at);
        let fastest_time = seconds(extremes.fastest_time);

        let speed_score = if user_time > Decimal::ZERO {
            fastest_time / user_time * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        let word_score = if extremes.max_words > 0 {
            Decimal::from(essay.word_count) / Decimal::from(extremes.max_words)
                * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        let grammar_score = Decimal::from(essay.grammar_score);
        let spelling_score =
            Decimal::from(penalized(essay.spelling_errors, SPELLING_PENALTY_PER_ERROR));

        let composite = SPEED_WEIGHT * speed_score
            + WORD_WEIGHT * word_score
            + GRAMMAR_WEIGHT * grammar_score
            + SPELLING_WEIGHT * spelling_score;
        let final_score = round_score(composite);

        essay.final_score = final_score;

        Some(ScoreBreakdown {
            speed_score,
            word_score,
            grammar_score,
            spelling_score,
            final_score,
        })
    }

    /// Similarity between a topic and essay text, `None` when no topic
    /// scorer is configured
    pub async fn topic_relevance(&self, topic: &str, text: &str) -> Result<Option<f64>> {
        match &self.topic {
            Some(scorer) => Ok(Some(scorer.similarity(topic, text).await?)),
            None => Ok(None),
        }
    }
}

/// Paragraph texts in stored order, separated by single spaces
pub fn join_paragraphs<S: AsRef<str>>(paragraphs: &[S]) -> String {
    let parts: Vec<&str> = paragraphs.iter().map(|p| p.as_ref()).collect();
    parts.join(" ")
}

/// Whitespace-delimited tokens across all paragraphs
pub fn word_count<S: AsRef<str>>(paragraphs: &[S]) -> i32 {
    let total: usize = paragraphs
        .iter()
        .map(|p| p.as_ref().split_whitespace().count())
        .sum();
    saturating_i32(total)
}

pub fn round_score(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn penalized(errors: i32, per_error: i32) -> i32 {
    MAX_SUBSCORE
        .saturating_sub(errors.saturating_mul(per_error))
        .max(0)
}

fn seconds(duration: chrono::Duration) -> Decimal {
    Decimal::new(duration.num_milliseconds(), 3)
}

fn saturating_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use storage::models::EssayStatus;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct ScriptedChecker {
        matches: Vec<GrammarMatch>,
        calls: AtomicUsize,
    }

    impl ScriptedChecker {
        fn new(matches: Vec<GrammarMatch>) -> Arc<Self> {
            Arc::new(Self {
                matches,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl GrammarChecker for ScriptedChecker {
        async fn check(&self, _text: &str) -> Result<Vec<GrammarMatch>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.matches.clone())
        }
    }

    struct FailingChecker;

    #[async_trait::async_trait]
    impl GrammarChecker for FailingChecker {
        async fn check(&self, _text: &str) -> Result<Vec<GrammarMatch>> {
            Err(AnalysisError::GrammarCheckError("connection refused".to_string()))
        }
    }

    struct SlowChecker;

    #[async_trait::async_trait]
    impl GrammarChecker for SlowChecker {
        async fn check(&self, _text: &str) -> Result<Vec<GrammarMatch>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![GrammarMatch::grammar("LATE")])
        }
    }

    struct EchoChecker {
        seen: std::sync::Mutex<Option<String>>,
    }

    #[async_trait::async_trait]
    impl GrammarChecker for EchoChecker {
        async fn check(&self, text: &str) -> Result<Vec<GrammarMatch>> {
            *self.seen.lock().unwrap() = Some(text.to_string());
            Ok(Vec::new())
        }
    }

    struct FixedTopic(f64);

    #[async_trait::async_trait]
    impl TopicScorer for FixedTopic {
        async fn similarity(&self, _topic: &str, _text: &str) -> Result<f64> {
            Ok(self.0)
        }
    }

    fn engine(checker: Arc<dyn GrammarChecker>) -> ScoringEngine {
        ScoringEngine::new(checker, Duration::from_secs(5))
    }

    fn mixed_matches(grammar: usize, spelling: usize) -> Vec<GrammarMatch> {
        let mut matches = vec![GrammarMatch::grammar("EN_A_VS_AN"); grammar];
        matches.extend(vec![GrammarMatch::spelling("MORFOLOGIK_RULE_EN_US"); spelling]);
        matches
    }

    fn completed_essay(
        elapsed_secs: i64,
        word_count: i32,
        grammar_score: i32,
        spelling: i32,
    ) -> Essay {
        let started_at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        Essay {
            essay_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            competition_id: Uuid::new_v4(),
            status: EssayStatus::Completed,
            started_at,
            completed_at: Some(started_at + chrono::Duration::seconds(elapsed_secs)),
            word_count,
            grammar_errors: 0,
            spelling_errors: spelling,
            grammar_score,
            final_score: Decimal::ZERO,
        }
    }

    fn extremes(fastest_secs: i64, max_words: i32) -> CompetitionExtremes {
        CompetitionExtremes {
            fastest_time: chrono::Duration::seconds(fastest_secs),
            max_words,
        }
    }

    #[tokio::test]
    async fn no_paragraphs_yields_neutral_without_calling_checker() {
        let checker = ScriptedChecker::new(mixed_matches(3, 3));
        let engine = engine(checker.clone());

        let result = engine.analyze_grammar::<&str>(&[]).await;

        assert_eq!(result, GrammarResult::NEUTRAL);
        assert_eq!(checker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn splits_spelling_from_other_matches() {
        let engine = engine(ScriptedChecker::new(mixed_matches(7, 3)));

        let result = engine.analyze_grammar(&["Some text", "more text"]).await;

        assert_eq!(result.grammar_errors, 7);
        assert_eq!(result.spelling_errors, 3);
        assert_eq!(result.grammar_score, 80);
    }

    #[tokio::test]
    async fn grammar_score_is_floored_at_zero() {
        let engine = engine(ScriptedChecker::new(mixed_matches(40, 20)));

        let result = engine.analyze_grammar(&["text"]).await;

        assert_eq!(result.grammar_score, 0);
    }

    #[test]
    fn grammar_score_formula_over_error_counts() {
        for e in [0usize, 1, 10, 49, 50, 51, 60, 500] {
            let result = GrammarResult::from_matches(&mixed_matches(e, 0));
            let expected = (100 - 2 * e as i32).max(0);
            assert_eq!(result.grammar_score, expected, "errors = {}", e);
        }
    }

    #[tokio::test]
    async fn checker_failure_yields_neutral() {
        let engine = engine(Arc::new(FailingChecker));

        let result = engine.analyze_grammar(&["Anything at all."]).await;

        assert_eq!(result, GrammarResult::NEUTRAL);
    }

    #[tokio::test(start_paused = true)]
    async fn checker_timeout_yields_neutral() {
        let engine = ScoringEngine::new(Arc::new(SlowChecker), Duration::from_secs(2));

        let result = engine.analyze_grammar(&["Slow service."]).await;

        assert_eq!(result, GrammarResult::NEUTRAL);
    }

    #[tokio::test]
    async fn paragraphs_are_joined_with_single_spaces_in_order() {
        let checker = Arc::new(EchoChecker {
            seen: std::sync::Mutex::new(None),
        });
        let engine = engine(checker.clone());

        engine.analyze_grammar(&["First.", "Second.", "Third."]).await;

        assert_eq!(
            checker.seen.lock().unwrap().as_deref(),
            Some("First. Second. Third.")
        );
    }

    #[test]
    fn word_count_splits_on_any_whitespace() {
        assert_eq!(word_count(&["one two\tthree", "  four\nfive  "]), 5);
        assert_eq!(word_count::<&str>(&[]), 0);
    }

    #[test]
    fn apply_grammar_copies_fields() {
        let mut essay = completed_essay(60, 10, 100, 0);
        let result = GrammarResult {
            grammar_errors: 4,
            spelling_errors: 1,
            grammar_score: 90,
        };

        ScoringEngine::apply_grammar(&mut essay, &result);

        assert_eq!(essay.grammar_errors, 4);
        assert_eq!(essay.spelling_errors, 1);
        assert_eq!(essay.grammar_score, 90);
    }

    #[test]
    fn end_to_end_example() {
        let mut essay = completed_essay(600, 500, 90, 2);

        let breakdown =
            ScoringEngine::calculate_final_score(&mut essay, &extremes(300, 1000)).unwrap();

        assert_eq!(breakdown.speed_score, Decimal::from(50));
        assert_eq!(breakdown.word_score, Decimal::from(50));
        assert_eq!(breakdown.spelling_score, Decimal::from(94));
        assert_eq!(breakdown.final_score, Decimal::new(7080, 2));
        assert_eq!(essay.final_score, Decimal::new(7080, 2));
    }

    #[test]
    fn incomplete_essay_is_left_unchanged() {
        let mut essay = completed_essay(600, 500, 90, 2);
        essay.completed_at = None;
        essay.final_score = Decimal::new(1234, 2);

        for ext in [extremes(0, 0), extremes(300, 1000), extremes(1, 1)] {
            assert!(ScoringEngine::calculate_final_score(&mut essay, &ext).is_none());
            assert_eq!(essay.final_score, Decimal::new(1234, 2));
        }
    }

    #[test]
    fn tying_the_fastest_time_scores_full_speed() {
        let mut essay = completed_essay(437, 10, 100, 0);

        let breakdown =
            ScoringEngine::calculate_final_score(&mut essay, &extremes(437, 10)).unwrap();

        assert_eq!(breakdown.speed_score, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn zero_elapsed_time_gives_zero_speed() {
        let mut essay = completed_essay(0, 10, 100, 0);

        let breakdown = ScoringEngine::calculate_final_score(&mut essay, &extremes(0, 10)).unwrap();

        assert_eq!(breakdown.speed_score, Decimal::ZERO);
    }

    #[test]
    fn zero_max_words_gives_zero_word_score() {
        let mut essay = completed_essay(100, 750, 100, 0);

        let breakdown =
            ScoringEngine::calculate_final_score(&mut essay, &extremes(100, 0)).unwrap();

        assert_eq!(breakdown.word_score, Decimal::ZERO);
    }

    #[test]
    fn spelling_score_is_floored_at_zero() {
        let mut essay = completed_essay(100, 10, 100, 34);

        let breakdown =
            ScoringEngine::calculate_final_score(&mut essay, &extremes(100, 10)).unwrap();

        assert_eq!(breakdown.spelling_score, Decimal::ZERO);
    }

    #[test]
    fn subscores_are_not_capped_when_essay_beats_extremes() {
        // Extremes computed before this essay was added to the competition.
        let mut essay = completed_essay(150, 2000, 100, 0);

        let breakdown =
            ScoringEngine::calculate_final_score(&mut essay, &extremes(300, 1000)).unwrap();

        assert_eq!(breakdown.speed_score, Decimal::from(200));
        assert_eq!(breakdown.word_score, Decimal::from(200));
        assert_eq!(breakdown.final_score, Decimal::from(150));
    }

    #[test]
    fn final_score_rounds_midpoint_up() {
        // 0.20 * (1 / 4000 * 100) = 0.005 with every other sub-score at 0
        let mut essay = completed_essay(100, 1, 0, 34);

        let breakdown =
            ScoringEngine::calculate_final_score(&mut essay, &extremes(0, 4000)).unwrap();

        assert_eq!(breakdown.final_score, Decimal::new(1, 2));
    }

    #[test]
    fn repeated_scoring_is_idempotent() {
        let mut essay = completed_essay(333, 421, 86, 5);
        let ext = extremes(211, 987);

        let first = ScoringEngine::calculate_final_score(&mut essay, &ext).unwrap();
        let second = ScoringEngine::calculate_final_score(&mut essay, &ext).unwrap();

        assert_eq!(first, second);
        assert_eq!(essay.final_score, second.final_score);
    }

    #[tokio::test]
    async fn topic_relevance_is_optional() {
        let without = engine(ScriptedChecker::new(Vec::new()));
        assert_eq!(without.topic_relevance("topic", "text").await.unwrap(), None);

        let with = engine(ScriptedChecker::new(Vec::new()))
            .with_topic_scorer(Arc::new(FixedTopic(0.42)));
        assert!(with.has_topic_scorer());
        assert_eq!(with.topic_relevance("topic", "text").await.unwrap(), Some(0.42));
    }
}

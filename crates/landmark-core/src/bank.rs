//! Question bank: remote questions grouped by landmark, with loading and
//! random selection that falls back to the catalog defaults.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::catalog::LandmarkCatalog;
use crate::error::EmptyQuestionError;
use crate::model::{Landmark, Question, QuestionRecord};
use crate::random::{self, RandomSource};
use crate::traits::QuestionSource;

/// Remote-sourced questions keyed by landmark.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    by_area: HashMap<Landmark, Vec<Question>>,
}

impl QuestionBank {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Group service records by their `area`.
    ///
    /// Records are trusted as published; shape problems are logged, not
    /// dropped.
    pub fn from_records(records: impl IntoIterator<Item = QuestionRecord>) -> Self {
        let mut by_area: HashMap<Landmark, Vec<Question>> = HashMap::new();
        for record in records {
            let (landmark, question) = record.into_question();
            if let Err(reason) = question.check_shape() {
                warn!(
                    area = %landmark,
                    question = %question.text,
                    "remote question is malformed: {reason}"
                );
            }
            by_area.entry(landmark).or_default().push(question);
        }
        Self { by_area }
    }

    pub fn questions_for(&self, landmark: &Landmark) -> &[Question] {
        self.by_area.get(landmark).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_area.values().all(Vec::is_empty)
    }

    /// Total number of questions across all areas.
    pub fn len(&self) -> usize {
        self.by_area.values().map(Vec::len).sum()
    }

    /// `(area, question count)` pairs sorted by area name.
    pub fn area_counts(&self) -> Vec<(&Landmark, usize)> {
        let mut counts: Vec<_> = self.by_area.iter().map(|(k, v)| (k, v.len())).collect();
        counts.sort_by(|a, b| a.0.cmp(b.0));
        counts
    }

    /// Draw a question for `landmark`: uniformly from the remote pool when
    /// it is non-empty, else the catalog default.
    pub fn pick(
        &self,
        landmark: &Landmark,
        catalog: &LandmarkCatalog,
        rng: &mut dyn RandomSource,
    ) -> Result<Question, EmptyQuestionError> {
        if let Some(question) = random::choose(self.questions_for(landmark), rng) {
            return Ok(question.clone());
        }
        catalog
            .default_question(landmark)
            .cloned()
            .ok_or_else(|| EmptyQuestionError {
                landmark: landmark.clone(),
            })
    }
}

/// Present a question's options in a uniformly shuffled order.
pub fn shuffled_options(question: &Question, rng: &mut dyn RandomSource) -> Vec<String> {
    let mut options = question.options.clone();
    random::shuffle(&mut options, rng);
    options
}

/// Performs the single question-bank fetch for a session.
///
/// Consumed by [`load`](Self::load) so a session makes at most one call.
pub struct QuestionBankLoader {
    source: Arc<dyn QuestionSource>,
}

impl QuestionBankLoader {
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self { source }
    }

    /// Fetch and group the remote questions. Any failure yields an empty
    /// bank so callers fall back to the defaults.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn load(self) -> QuestionBank {
        match self.source.fetch().await {
            Ok(records) => {
                let bank = QuestionBank::from_records(records);
                info!(questions = bank.len(), "question bank loaded");
                bank
            }
            Err(e) => {
                warn!("question bank unavailable, using default questions: {e}");
                QuestionBank::empty()
            }
        }
    }

    /// Start the fetch in the background. Must be called inside a Tokio
    /// runtime.
    pub fn spawn(self) -> JoinHandle<QuestionBank> {
        tokio::spawn(self.load())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::random::ScriptedRandom;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn record(area: &str, question: &str, correct: &str) -> QuestionRecord {
        QuestionRecord {
            question: question.into(),
            option_a: correct.into(),
            option_b: "B".into(),
            option_c: "C".into(),
            option_d: "D".into(),
            correct_answer: correct.into(),
            area: area.into(),
        }
    }

    struct FixedSource {
        result: Option<Vec<QuestionRecord>>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl QuestionSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self) -> Result<Vec<QuestionRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.result
                .clone()
                .ok_or_else(|| FetchError::Network("connection refused".into()))
        }
    }

    #[test]
    fn records_grouped_by_area() {
        let bank = QuestionBank::from_records(vec![
            record("Trachea", "T1", "A"),
            record("Trachea", "T2", "A"),
            record("Cricoid cartilage", "C1", "A"),
        ]);
        assert_eq!(bank.len(), 3);
        assert_eq!(bank.questions_for(&"Trachea".into()).len(), 2);
        assert!(bank.questions_for(&"Hyoid bone".into()).is_empty());

        let counts = bank.area_counts();
        assert_eq!(counts[0].0.as_str(), "Cricoid cartilage");
        assert_eq!(counts[1].1, 2);
    }

    #[test]
    fn pick_prefers_remote_pool() {
        let catalog = LandmarkCatalog::reference().unwrap();
        let bank = QuestionBank::from_records(vec![
            record("Trachea", "T1", "A"),
            record("Trachea", "T2", "A"),
        ]);
        let q = bank
            .pick(&"Trachea".into(), &catalog, &mut ScriptedRandom::new([1]))
            .unwrap();
        assert_eq!(q.text, "T2");
    }

    #[test]
    fn pick_falls_back_to_default() {
        let catalog = LandmarkCatalog::reference().unwrap();
        let bank = QuestionBank::empty();
        for landmark in catalog.landmarks() {
            let q = bank
                .pick(landmark, &catalog, &mut ScriptedRandom::first())
                .unwrap();
            assert_eq!(&q, catalog.default_question(landmark).unwrap());
            assert!(!q.is_placeholder());
        }
    }

    #[test]
    fn pick_without_any_question_errors() {
        let catalog = LandmarkCatalog::reference().unwrap();
        let err = QuestionBank::empty()
            .pick(&"Hyoid bone".into(), &catalog, &mut ScriptedRandom::first())
            .unwrap_err();
        assert_eq!(err.landmark.as_str(), "Hyoid bone");
    }

    #[test]
    fn shuffled_options_is_a_permutation() {
        let q = Question::new(
            "Q",
            "A",
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
        );
        let shown = shuffled_options(&q, &mut ScriptedRandom::new([2, 0, 1]));
        assert_eq!(shown, vec!["C", "B", "D", "A"]);
    }

    #[tokio::test]
    async fn loader_success_builds_bank() {
        let source = Arc::new(FixedSource {
            result: Some(vec![record("Trachea", "T1", "A")]),
            calls: AtomicU32::new(0),
        });
        let bank = QuestionBankLoader::new(source.clone()).spawn().await.unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(source.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn loader_failure_yields_empty_bank() {
        let source = Arc::new(FixedSource {
            result: None,
            calls: AtomicU32::new(0),
        });
        let bank = QuestionBankLoader::new(source.clone()).load().await;
        assert!(bank.is_empty());
        assert_eq!(source.calls.load(Ordering::Relaxed), 1);
    }
}

//! Async session driver.
//!
//! Starts the question-bank fetch in the background, runs the state machine
//! over inbound events, awaits the bank only when the first MCQ needs it,
//! and hands the final report to the reporter.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::bank::{QuestionBank, QuestionBankLoader};
use crate::catalog::LandmarkCatalog;
use crate::clock::Clock;
use crate::error::EventRejected;
use crate::model::{Phase, SessionEvent};
use crate::random::RandomSource;
use crate::report::{SessionReporter, DEFAULT_TEARDOWN_DELAY};
use crate::session::{SessionStateMachine, Transition};
use crate::traits::{Presenter, QuestionSource, SessionUploader};

/// Everything needed to start a session.
pub struct SessionSetup {
    pub catalog: Arc<LandmarkCatalog>,
    pub presenter: Arc<dyn Presenter>,
    /// `None` runs offline on the catalog defaults.
    pub source: Option<Arc<dyn QuestionSource>>,
    /// `None` keeps the report local.
    pub uploader: Option<Arc<dyn SessionUploader>>,
    pub rng: Box<dyn RandomSource>,
    pub clock: Clock,
    /// Delay between reporting and `end_experience`.
    pub teardown_delay: Duration,
}

impl SessionSetup {
    /// Offline setup with system time and the default teardown delay.
    pub fn new(
        catalog: Arc<LandmarkCatalog>,
        presenter: Arc<dyn Presenter>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            catalog,
            presenter,
            source: None,
            uploader: None,
            rng,
            clock: Clock::system(),
            teardown_delay: DEFAULT_TEARDOWN_DELAY,
        }
    }
}

/// A running assessment session.
pub struct AssessmentSession {
    machine: SessionStateMachine,
    /// Empty until the pending fetch resolves.
    bank: QuestionBank,
    pending: Option<JoinHandle<QuestionBank>>,
    reporter: SessionReporter,
}

impl AssessmentSession {
    /// Kick off the question fetch, then enter the first location phase.
    /// Must be called inside a Tokio runtime.
    pub fn start(setup: SessionSetup) -> Self {
        let pending = setup
            .source
            .map(|source| QuestionBankLoader::new(source).spawn());
        let reporter = SessionReporter::new(
            setup.uploader,
            Arc::clone(&setup.presenter),
            setup.teardown_delay,
        );
        let machine =
            SessionStateMachine::start(setup.catalog, &setup.clock, setup.rng, setup.presenter);

        Self {
            machine,
            bank: QuestionBank::empty(),
            pending,
            reporter,
        }
    }

    pub fn machine(&self) -> &SessionStateMachine {
        &self.machine
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn is_ended(&self) -> bool {
        self.machine.is_ended()
    }

    /// Whether the reporter has been handed the final report.
    pub fn reported(&self) -> bool {
        self.reporter.has_fired()
    }

    /// Resolve the question bank, waiting for the fetch if still running.
    pub async fn question_bank(&mut self) -> &QuestionBank {
        if let Some(handle) = self.pending.take() {
            self.bank = match handle.await {
                Ok(bank) => bank,
                Err(e) => {
                    warn!("question bank task failed: {e}");
                    QuestionBank::empty()
                }
            };
        }
        &self.bank
    }

    /// Process one inbound event to completion.
    pub async fn handle(&mut self, event: SessionEvent) -> Result<Transition, EventRejected> {
        let needs_bank = self.machine.phase() == Phase::AwaitingClassification
            && matches!(event, SessionEvent::OptionChosen(_));
        if needs_bank {
            self.question_bank().await;
        }

        let transition = self.machine.handle(event, &self.bank)?;
        if let Some(report) = &transition.report {
            self.reporter.report(report);
        }
        Ok(transition)
    }

    /// Wait for the upload and teardown signal after the session ended.
    pub async fn settle(&mut self) {
        self.reporter.settle().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, UploadError};
    use crate::model::QuestionRecord;
    use crate::presenter::{RecordingPresenter, Signal};
    use crate::random::ScriptedRandom;
    use crate::report::SessionReport;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct SlowSource {
        records: Vec<QuestionRecord>,
        delay: Duration,
        calls: AtomicU32,
    }

    #[async_trait]
    impl QuestionSource for SlowSource {
        fn name(&self) -> &str {
            "slow"
        }

        async fn fetch(&self) -> Result<Vec<QuestionRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            tokio::time::sleep(self.delay).await;
            Ok(self.records.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl QuestionSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self) -> Result<Vec<QuestionRecord>, FetchError> {
            Err(FetchError::Status {
                status: 500,
                body: "boom".into(),
            })
        }
    }

    struct PanickingSource;

    #[async_trait]
    impl QuestionSource for PanickingSource {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn fetch(&self) -> Result<Vec<QuestionRecord>, FetchError> {
            panic!("fetch task crashed");
        }
    }

    #[derive(Default)]
    struct CountingUploader {
        reports: Mutex<Vec<SessionReport>>,
    }

    #[async_trait]
    impl SessionUploader for CountingUploader {
        async fn upload(&self, report: &SessionReport) -> Result<(), UploadError> {
            self.reports.lock().unwrap().push(report.clone());
            Err(UploadError::Network("offline".into()))
        }
    }

    fn setup(presenter: Arc<RecordingPresenter>) -> SessionSetup {
        let mut setup = SessionSetup::new(
            Arc::new(LandmarkCatalog::reference().unwrap()),
            presenter,
            Box::new(ScriptedRandom::first()),
        );
        setup.clock = Clock::manual();
        setup
    }

    async fn play_correct_cycle(session: &mut AssessmentSession) -> Transition {
        let target = session.machine().current_target().unwrap().to_string();
        session
            .handle(SessionEvent::LandmarkReached(target))
            .await
            .unwrap();
        let expected = session
            .machine()
            .current_classification()
            .unwrap()
            .expected
            .clone();
        session
            .handle(SessionEvent::OptionChosen(expected))
            .await
            .unwrap();
        let answer = session
            .machine()
            .current_question()
            .unwrap()
            .correct_answer
            .clone();
        session
            .handle(SessionEvent::OptionChosen(answer))
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn pending_bank_awaited_at_first_mcq() {
        let source = Arc::new(SlowSource {
            records: vec![QuestionRecord {
                question: "Remote thyroid question".into(),
                option_a: "A".into(),
                option_b: "B".into(),
                option_c: "C".into(),
                option_d: "D".into(),
                correct_answer: "C".into(),
                area: "Thyroid cartilage".into(),
            }],
            delay: Duration::from_secs(2),
            calls: AtomicU32::new(0),
        });
        let presenter = Arc::new(RecordingPresenter::new());
        let mut setup = setup(presenter.clone());
        setup.source = Some(source.clone());
        let mut session = AssessmentSession::start(setup);

        session
            .handle(SessionEvent::LandmarkReached("Thyroid cartilage".into()))
            .await
            .unwrap();
        session
            .handle(SessionEvent::OptionChosen("Normal".into()))
            .await
            .unwrap();

        assert_eq!(
            session.machine().current_question().unwrap().text,
            "Remote thyroid question"
        );
        assert_eq!(source.calls.load(Ordering::Relaxed), 1);

        // The bank is cached: later landmarks never refetch.
        session.question_bank().await;
        assert_eq!(source.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_falls_back_to_defaults() {
        let presenter = Arc::new(RecordingPresenter::new());
        let mut setup = setup(presenter.clone());
        setup.source = Some(Arc::new(FailingSource));
        let mut session = AssessmentSession::start(setup);

        assert!(session.question_bank().await.is_empty());

        session
            .handle(SessionEvent::LandmarkReached("Thyroid cartilage".into()))
            .await
            .unwrap();
        session
            .handle(SessionEvent::OptionChosen("Normal".into()))
            .await
            .unwrap();
        let question = session.machine().current_question().unwrap();
        assert!(!question.is_placeholder());
        assert_eq!(question.correct_answer, "Thyroid cartilage");
    }

    #[tokio::test]
    async fn crashed_fetch_task_resolves_to_empty_bank() {
        let presenter = Arc::new(RecordingPresenter::new());
        let mut setup = setup(presenter);
        setup.source = Some(Arc::new(PanickingSource));
        let mut session = AssessmentSession::start(setup);

        assert!(session.question_bank().await.is_empty());
        // Resolved once; later calls reuse the stored bank.
        assert!(session.question_bank().await.is_empty());

        session
            .handle(SessionEvent::LandmarkReached("Thyroid cartilage".into()))
            .await
            .unwrap();
        session
            .handle(SessionEvent::OptionChosen("Normal".into()))
            .await
            .unwrap();
        assert_eq!(
            session.machine().current_question().unwrap().correct_answer,
            "Thyroid cartilage"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn full_session_reports_once_and_ends_experience() {
        let presenter = Arc::new(RecordingPresenter::new());
        let uploader = Arc::new(CountingUploader::default());
        let mut setup = setup(presenter.clone());
        setup.uploader = Some(uploader.clone());
        let mut session = AssessmentSession::start(setup);

        let mut ended = 0;
        while !session.is_ended() {
            if play_correct_cycle(&mut session).await.report.is_some() {
                ended += 1;
            }
        }
        assert_eq!(ended, 1);
        assert!(session.reported());

        let rejected = session
            .handle(SessionEvent::OptionChosen("Centered".into()))
            .await
            .unwrap_err();
        assert_eq!(rejected, EventRejected::SessionEnded);

        session.settle().await;
        let reports = uploader.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].score, 9);
        assert_eq!(reports[0].steps.len(), 9);
        assert_eq!(presenter.count(&Signal::EndExperience), 1);
    }

    #[tokio::test]
    async fn mismatched_event_does_not_touch_bank_or_state() {
        let presenter = Arc::new(RecordingPresenter::new());
        let mut session = AssessmentSession::start(setup(presenter));
        let err = session
            .handle(SessionEvent::OptionChosen("Normal".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, EventRejected::UnexpectedEvent { .. }));
        assert_eq!(session.phase(), Phase::AwaitingLocation);
        assert!(session.machine().log().is_empty());
        assert!(!session.reported());
    }
}

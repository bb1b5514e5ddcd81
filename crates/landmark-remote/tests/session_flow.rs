//! Full sessions driven against a mocked question service and results endpoint.

use std::sync::Arc;
use std::time::Duration;

use landmark_core::catalog::LandmarkCatalog;
use landmark_core::driver::{AssessmentSession, SessionSetup};
use landmark_core::model::{SessionEvent, StepStatus};
use landmark_core::presenter::{RecordingPresenter, Signal};
use landmark_core::random::ScriptedRandom;
use landmark_remote::mock::MockUploader;
use landmark_remote::{HttpQuestionSource, HttpUploader};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn remote_record(area: &str, correct: &str) -> serde_json::Value {
    serde_json::json!({
        "question": format!("Remote question about {area}"),
        "option_a": correct,
        "option_b": "Hyoid bone",
        "option_c": "Epiglottis",
        "option_d": "Carotid sheath",
        "correct_answer": correct,
        "area": area
    })
}

fn setup(presenter: Arc<RecordingPresenter>) -> SessionSetup {
    let mut setup = SessionSetup::new(
        Arc::new(LandmarkCatalog::reference().unwrap()),
        presenter,
        Box::new(ScriptedRandom::first()),
    );
    setup.teardown_delay = Duration::ZERO;
    setup
}

async fn answer_everything_correctly(session: &mut AssessmentSession) {
    while !session.is_ended() {
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
            .unwrap();
    }
}

#[tokio::test]
async fn remote_questions_and_upload_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/questions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "questions": [
                remote_record("Thyroid cartilage", "Laryngeal prominence"),
                remote_record("Cricoid cartilage", "Complete ring"),
                remote_record("Trachea", "Midline"),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/results"))
        .and(header("Authorization", "Bearer host-token"))
        .and(body_partial_json(serde_json::json!({
            "sessionCode": "NECK-01",
            "score": 9
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let presenter = Arc::new(RecordingPresenter::new());
    let mut setup = setup(presenter.clone());
    setup.source = Some(Arc::new(
        HttpQuestionSource::new(&format!("{}/questions", server.uri()), "com.example.neck", 5)
            .unwrap(),
    ));
    setup.uploader = Some(Arc::new(
        HttpUploader::new(
            &format!("{}/results", server.uri()),
            Some("NECK-01".into()),
            Some("host-token".into()),
            5,
        )
        .unwrap(),
    ));

    let mut session = AssessmentSession::start(setup);
    answer_everything_correctly(&mut session).await;
    session.settle().await;

    let log = session.machine().log();
    assert_eq!(log.score(), 9);
    let mcq_names: Vec<_> = log
        .steps()
        .iter()
        .filter(|s| s.name.starts_with("MCQ: "))
        .map(|s| s.name.clone())
        .collect();
    assert_eq!(mcq_names.len(), 3);
    assert!(mcq_names.iter().all(|n| n.contains("Remote question about")));

    assert_eq!(presenter.count(&Signal::EndExperience), 1);
    assert_eq!(
        presenter.last_text().as_deref(),
        Some("Test Complete\nScore: 9/9")
    );
}

#[tokio::test]
async fn unavailable_question_service_uses_catalog_defaults() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let presenter = Arc::new(RecordingPresenter::new());
    let uploader = Arc::new(MockUploader::new());
    let mut setup = setup(presenter.clone());
    setup.source = Some(Arc::new(
        HttpQuestionSource::new(&server.uri(), "com.example.neck", 5).unwrap(),
    ));
    setup.uploader = Some(uploader.clone());

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
        "Which of the following cartilages is commonly known as the 'Adam's Apple'?"
    );

    answer_everything_correctly(&mut session).await;
    session.settle().await;

    let reports = uploader.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].score, 9);
    assert_eq!(reports[0].max_score, 9);
}

#[tokio::test]
async fn wrong_answers_are_logged_and_still_upload_once() {
    let presenter = Arc::new(RecordingPresenter::new());
    let uploader = Arc::new(MockUploader::new());
    let mut setup = setup(presenter.clone());
    setup.uploader = Some(uploader.clone());
    let mut session = AssessmentSession::start(setup);

    while !session.is_ended() {
        let target = session.machine().current_target().unwrap().to_string();
        session
            .handle(SessionEvent::LandmarkReached("Mastoid process".into()))
            .await
            .unwrap();
        session
            .handle(SessionEvent::LandmarkReached(target))
            .await
            .unwrap();
        session
            .handle(SessionEvent::OptionChosen("not a label".into()))
            .await
            .unwrap();
        session
            .handle(SessionEvent::OptionChosen("not an answer".into()))
            .await
            .unwrap();
    }
    session.settle().await;

    let reports = uploader.reports();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    // One wrong + one right location per landmark, then two wrong steps.
    assert_eq!(report.steps.len(), 12);
    assert_eq!(report.score, 3);
    assert_eq!(
        report
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Incorrect)
            .count(),
        9
    );
}

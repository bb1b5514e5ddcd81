//! The `landmark run` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use landmark_core::driver::{AssessmentSession, SessionSetup};
use landmark_core::model::SessionEvent;
use landmark_core::random::{RandomSource, StdRandom};
use landmark_core::report::SessionReport;
use landmark_core::scoring::ScoreLog;
use landmark_core::traits::Presenter;
use landmark_remote::config::load_config_from;

/// Console presentation layer.
struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn display_text(&self, text: &str) {
        for line in text.lines() {
            println!("{line}");
        }
    }

    fn show_options(&self, options: &[String]) {
        println!("  Options: {}", options.join(" | "));
    }

    fn hide_options(&self) {}

    fn play_feedback(&self, correct: bool) {
        println!("  [{}]", if correct { "correct" } else { "incorrect" });
    }

    fn end_experience(&self) {
        println!("Experience closed.");
    }
}

/// Where event lines come from.
enum EventInput {
    Script(std::vec::IntoIter<String>),
    Stdin(Lines<BufReader<Stdin>>),
}

impl EventInput {
    async fn next_line(&mut self) -> Result<Option<String>> {
        match self {
            EventInput::Script(lines) => Ok(lines.next()),
            EventInput::Stdin(lines) => lines.next_line().await.context("failed to read stdin"),
        }
    }

    fn is_script(&self) -> bool {
        matches!(self, EventInput::Script(_))
    }
}

/// Parse one event line. Blank lines and `#` comments yield `None`.
pub(crate) fn parse_event_line(line: &str) -> Result<Option<SessionEvent>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    anyhow::ensure!(!rest.is_empty(), "missing argument in event line: '{line}'");

    match verb {
        "reach" => Ok(Some(SessionEvent::LandmarkReached(rest.to_string()))),
        "choose" => Ok(Some(SessionEvent::OptionChosen(rest.to_string()))),
        other => anyhow::bail!("unknown event '{other}', expected 'reach' or 'choose'"),
    }
}

pub async fn execute(
    script: Option<PathBuf>,
    seed: Option<u64>,
    offline: bool,
    output: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    debug!(?config, seed, offline, "configuration loaded");
    let catalog = Arc::new(config.load_catalog()?);

    let mut input = match &script {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read script: {}", path.display()))?;
            let lines: Vec<String> = content.lines().map(str::to_string).collect();
            EventInput::Script(lines.into_iter())
        }
        None => EventInput::Stdin(BufReader::new(tokio::io::stdin()).lines()),
    };

    let rng: Box<dyn RandomSource> = match seed {
        Some(seed) => Box::new(StdRandom::seeded(seed)),
        None => Box::new(StdRandom::from_entropy()),
    };

    let mut setup = SessionSetup::new(Arc::clone(&catalog), Arc::new(ConsolePresenter), rng);
    setup.source = if offline {
        None
    } else {
        Some(config.question_source()?)
    };
    setup.uploader = config.uploader()?;
    setup.teardown_delay = config.teardown_delay();

    eprintln!(
        "landmark v{}: {} landmarks, {}",
        env!("CARGO_PKG_VERSION"),
        catalog.len(),
        if offline {
            "offline"
        } else {
            "remote questions"
        }
    );
    eprintln!();

    let mut session = AssessmentSession::start(setup);
    let mut final_report: Option<SessionReport> = None;
    let mut line_no = 0usize;

    while !session.is_ended() {
        let Some(line) = input.next_line().await? else {
            break;
        };
        line_no += 1;

        let event = match parse_event_line(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) if input.is_script() => return Err(e.context(format!("script line {line_no}"))),
            Err(e) => {
                eprintln!("  {e}");
                continue;
            }
        };

        match session.handle(event).await {
            Ok(transition) => {
                if let Some(report) = transition.report {
                    final_report = Some(report);
                }
            }
            Err(rejected) => eprintln!("  Ignored: {rejected}"),
        }
    }

    let log = session.machine().log();
    print_steps(log);

    match final_report {
        Some(report) => {
            session.settle().await;

            std::fs::create_dir_all(&output)?;
            let path = output.join(format!("session-{}.json", report.id));
            report.save_json(&path)?;
            eprintln!(
                "Score: {}/{} in {:.1}s",
                report.score, report.max_score, report.total_time_seconds
            );
            eprintln!("Report saved to: {}", path.display());
        }
        None => {
            eprintln!(
                "Session incomplete: {}/{} landmarks completed, score {}/{}. Nothing uploaded.",
                session.machine().completed().len(),
                catalog.len(),
                log.score(),
                session.machine().max_score()
            );
        }
    }

    Ok(())
}

fn print_steps(log: &ScoreLog) {
    use comfy_table::{Cell, Table};

    if log.is_empty() {
        eprintln!("No steps recorded.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Step", "Status", "Time", "Expected", "Selected"]);

    for step in log.steps() {
        table.add_row(vec![
            Cell::new(&step.name),
            Cell::new(step.status),
            Cell::new(format!("{:.2}s", step.elapsed_seconds)),
            Cell::new(&step.correct_answer),
            Cell::new(&step.selected_answer),
        ]);
    }

    eprintln!("\n{table}");
}

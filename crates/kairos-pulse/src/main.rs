use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::EventStream,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use kairos_pulse::{
    app::handle_input, logging::init_logging, ui, Args, Config, Flow, HttpStatusProvider, Session,
    StatusProvider, Wake,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tracing::info;

type PulseTerminal = Terminal<CrosstermBackend<io::Stdout>>;

enum Step {
    Wake(Wake),
    Input(Option<io::Result<crossterm::event::Event>>),
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_args(Args::parse())?;
    let log_guard = init_logging(&config);
    info!(
        "pulse_start: api_url={} poll_interval_ms={} file_logging={}",
        config.api_url,
        config.poll_interval.as_millis(),
        log_guard.is_file_backed()
    );

    let provider = Arc::new(
        HttpStatusProvider::new(&config).context("failed to build status provider client")?,
    );
    let mut session = Session::new(provider, &config);

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut session).await;
    session.shutdown();
    restore_terminal(&mut terminal)?;
    result
}

async fn run<P: StatusProvider + 'static>(
    terminal: &mut PulseTerminal,
    session: &mut Session<P>,
) -> Result<()> {
    let mut events = EventStream::new();
    loop {
        terminal.draw(|frame| ui::render(frame, session.app()))?;
        let step = tokio::select! {
            wake = session.next_wake() => Step::Wake(wake),
            maybe_event = events.next() => Step::Input(maybe_event),
        };
        match step {
            Step::Wake(wake) => session.apply_wake(wake),
            Step::Input(Some(Ok(event))) => {
                let intent = handle_input(event, session.app_mut());
                if session.apply_intent(intent) == Flow::Quit {
                    break;
                }
            }
            Step::Input(Some(Err(err))) => return Err(err).context("terminal input error"),
            Step::Input(None) => break,
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<PulseTerminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut PulseTerminal) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

//! Terminal front end for the assistant widget.
//!
//! Plain lines are chat messages; lines starting with `/` drive the page (open, close,
//! scroll, reload).

use anyhow::{Context, Result};
use lead_flow::{AssistantConfig, AssistantWidget, FlowError, Message, TurnOutcome};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tracing::{debug, warn};

const HELP: &str = "\
commands:
  /open           show the chat widget
  /close          hide it (pending replies still arrive)
  /reload         reload the page, discarding the conversation
  /scroll <px>    scroll the page to an offset
  /lead           show the captured contact
  /status         dump the session state as JSON
  /wait           wait until the assistant stops typing
  /quit           leave";

enum Input<'a> {
    Say(&'a str),
    Open,
    Close,
    Reload,
    Scroll(f64),
    Lead,
    Status,
    Wait,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        let Some(command) = line.trim().strip_prefix('/') else {
            return Input::Say(line);
        };
        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("open"), None) => Input::Open,
            (Some("close"), None) => Input::Close,
            (Some("reload"), None) => Input::Reload,
            (Some("scroll"), Some(px)) => match px.parse() {
                Ok(offset) => Input::Scroll(offset),
                Err(_) => Input::Unknown(line),
            },
            (Some("lead"), None) => Input::Lead,
            (Some("status"), None) => Input::Status,
            (Some("wait"), None) => Input::Wait,
            (Some("help"), None) => Input::Help,
            (Some("quit" | "exit"), None) => Input::Quit,
            _ => Input::Unknown(line),
        }
    }
}

/// Tracks how much of the current session's transcript has been printed
struct Printer {
    persona: String,
    session_id: Option<String>,
    cursor: usize,
    events: Option<broadcast::Receiver<Message>>,
}

impl Printer {
    fn new(persona: String) -> Self {
        Self {
            persona,
            session_id: None,
            cursor: 0,
            events: None,
        }
    }

    /// Follow the widget's session, starting over when it changed
    fn attach(&mut self, widget: &AssistantWidget) {
        let Some(session) = widget.session() else {
            self.detach();
            return;
        };
        if self.session_id.as_deref() != Some(session.id()) {
            self.session_id = Some(session.id().to_string());
            self.cursor = 0;
            self.events = Some(session.context().subscribe());
        }
    }

    fn detach(&mut self) {
        self.session_id = None;
        self.cursor = 0;
        self.events = None;
    }

    /// Print assistant messages not shown yet; only while the widget is open
    async fn flush(&mut self, widget: &AssistantWidget) {
        let Some(session) = widget.session().filter(|_| widget.is_open()) else {
            return;
        };
        let transcript = session.context().transcript().await;
        for message in transcript.iter().skip(self.cursor) {
            // the visitor already sees what they typed
            if !message.is_user() {
                println!(
                    "[{}] {}: {}",
                    message.timestamp.format("%H:%M"),
                    self.persona,
                    message.text
                );
            }
        }
        self.cursor = transcript.len();
    }

    /// Resolves when the session appends a message
    async fn next_event(&mut self) {
        let Some(events) = self.events.as_mut() else {
            return std::future::pending().await;
        };
        match events.recv().await {
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => debug!(skipped, "transcript events lagged"),
            Err(RecvError::Closed) => self.events = None,
        }
    }
}

pub async fn run(config: AssistantConfig) -> Result<()> {
    let mut printer = Printer::new(config.persona.clone());
    let mut widget = AssistantWidget::new(config).context("invalid assistant config")?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    widget.open().await.context("failed to open the widget")?;
    printer.attach(&widget);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                if !handle(&line, &mut widget, &mut printer).await? {
                    break;
                }
            }
            _ = printer.next_event() => {
                printer.flush(&widget).await;
            }
        }
    }

    widget.reload();
    Ok(())
}

/// Returns `false` when the user asked to quit
async fn handle(line: &str, widget: &mut AssistantWidget, printer: &mut Printer) -> Result<bool> {
    match Input::parse(line) {
        Input::Say(text) => match widget.submit(text).await {
            Ok(TurnOutcome::Accepted {
                reply_in: Some(_), ..
            }) => println!("({} está digitando...)", widget.config().persona),
            Ok(_) => {}
            Err(FlowError::WidgetClosed) => println!("the chat is closed, type /open"),
            Err(err) => return Err(err).context("failed to submit message"),
        },
        Input::Open => {
            widget.open().await.context("failed to open the widget")?;
            printer.attach(widget);
            printer.flush(widget).await;
        }
        Input::Close => {
            widget.close();
            println!("(chat hidden)");
        }
        Input::Reload => {
            widget.reload();
            printer.detach();
            println!("(page reloaded)");
        }
        Input::Scroll(offset) => match widget.scroll(offset).await {
            Some(change) => println!("(section: {} -> {})", change.from, change.to),
            None => println!("(section: {})", widget.tracker().current()),
        },
        Input::Lead => match widget.session() {
            Some(session) => println!("{}", session.context().lead().await.summary()),
            None => println!("no conversation yet"),
        },
        Input::Status => match widget.session() {
            Some(session) => {
                let snapshot = session.snapshot().await;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&snapshot).context("failed to render status")?
                );
            }
            None => println!("no conversation yet"),
        },
        Input::Wait => {
            if let Some(session) = widget.session() {
                session.wait_idle().await;
            }
            printer.flush(widget).await;
        }
        Input::Help => println!("{HELP}"),
        Input::Quit => return Ok(false),
        Input::Unknown(line) => {
            warn!(input = line, "unknown command");
            println!("unknown command, type /help");
        }
    }
    Ok(true)
}

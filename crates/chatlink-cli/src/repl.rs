//! Interactive chat loop.

use std::io::{self, Write};

use chatlink_gateway::ChatGateway;
use chatlink_session::{InvalidIntent, Reconciliation, SessionController, SessionView};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::render::{self, Printer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Send(String),
    Clear,
    History,
    Sessions,
    Help,
    Quit,
    Unknown(String),
}

/// Interpret one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Option<ReplCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Some(ReplCommand::Send(line.to_string()));
    };
    let command = match command.trim().to_ascii_lowercase().as_str() {
        "clear" => ReplCommand::Clear,
        "history" => ReplCommand::History,
        "sessions" => ReplCommand::Sessions,
        "help" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => ReplCommand::Unknown(other.to_string()),
    };
    Some(command)
}

const HELP: &str = "\
Type a message and press enter to send it.
  /history   show the chat history
  /sessions  list previews of assistant replies
  /clear     clear the chat history
  /quit      exit";

/// Print whatever is new in the latest published view.
pub fn show(
    printer: &mut Printer,
    updates: &mut watch::Receiver<SessionView>,
    out: &mut impl Write,
) -> io::Result<()> {
    let view = updates.borrow_and_update().clone();
    for line in printer.render(&view) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Submit `text`, printing the typing indicator and the reply as the
/// session publishes them. Everything is written from the calling task, so
/// output never interleaves and nothing published during the cycle is lost.
pub async fn send_and_render<G: ChatGateway>(
    controller: &SessionController<G>,
    updates: &mut watch::Receiver<SessionView>,
    printer: &mut Printer,
    text: &str,
    out: &mut impl Write,
) -> io::Result<()> {
    let submit = controller.submit_message(text);
    tokio::pin!(submit);

    let outcome = loop {
        // Drain published views before checking whether the cycle is done.
        tokio::select! {
            biased;
            Ok(()) = updates.changed() => show(printer, updates, out)?,
            outcome = &mut submit => break outcome,
        }
    };
    show(printer, updates, out)?;

    match outcome {
        Ok(report) => {
            if let Err(e) = &report.reply {
                eprintln!("{}", render::format_send_failure(e));
            }
        }
        Err(InvalidIntent::SendInFlight) => eprintln!("Please wait for the current reply."),
        Err(e) => eprintln!("{e}"),
    }
    Ok(())
}

pub async fn run<G: ChatGateway>(controller: &SessionController<G>) -> eyre::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while controller.identity().is_none() {
        println!("Enter your email to start chatting:");
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        controller.set_identity(&line);
    }

    let mut out = io::stdout();
    let mut updates = controller.subscribe();
    let mut printer = Printer::default();
    show(&mut printer, &mut updates, &mut out)?;

    while let Some(line) = lines.next_line().await? {
        let Some(command) = parse_line(&line) else {
            continue;
        };
        match command {
            ReplCommand::Send(text) => {
                send_and_render(controller, &mut updates, &mut printer, &text, &mut out).await?
            }
            ReplCommand::Clear => match controller.clear_history().await {
                Ok(()) => println!("Chat history cleared."),
                Err(e) => eprintln!("Could not clear history: {e}"),
            },
            ReplCommand::History => {
                if let Reconciliation::KeptStale(e) = controller.refresh_history().await? {
                    eprintln!("Could not refresh history ({e}); showing last known.");
                }
                println!("{}", render::format_history(controller.history().entries()));
            }
            ReplCommand::Sessions => {
                println!("{}", render::format_previews(&controller.previews()));
            }
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Quit => break,
            ReplCommand::Unknown(name) => {
                eprintln!("Unknown command /{name}. Type /help for a list.");
            }
        }
        show(&mut printer, &mut updates, &mut out)?;
    }

    Ok(())
}

use std::io::{self, BufRead, Write};

use salesdesk_agent::SalesOrchestrator;
use salesdesk_core::Query;
use tokio::runtime::Runtime;

use crate::commands::{error_line, exit_code_for, open_session, CommandResult, ConfigArgs};

pub const TITLE: &str = "🛒 AI Sales Agent";
pub const PROMPT: &str = "Enter your query: ";

pub fn run(args: &ConfigArgs) -> CommandResult {
    let session = match open_session(args) {
        Ok(session) => session,
        Err(error) => {
            eprintln!("{}", error_line(&error));
            return CommandResult::plain(exit_code_for(&error), "");
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    match converse(
        &session.orchestrator,
        &session.runtime,
        stdin.lock(),
        &mut stdout,
        &mut stderr,
    ) {
        Ok(_) => CommandResult::plain(0, ""),
        Err(error) => {
            eprintln!("error: terminal i/o failed: {error}");
            CommandResult::plain(1, "")
        }
    }
}

/// Reads queries line by line until EOF, `exit`, or `quit`. Answers go to
/// `output`; prompts, warnings, and the busy marker go to `status`. Returns the
/// number of queries answered.
pub fn converse<R, W, S>(
    orchestrator: &SalesOrchestrator,
    runtime: &Runtime,
    mut input: R,
    output: &mut W,
    status: &mut S,
) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
    S: Write,
{
    writeln!(output, "{TITLE}")?;
    let mut answered = 0;
    let mut line = String::new();

    loop {
        write!(status, "{PROMPT}")?;
        status.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let raw = line.trim_end_matches(['\r', '\n']);
        if matches!(raw.trim(), "exit" | "quit") {
            break;
        }

        let query = match Query::parse(raw) {
            Ok(query) => query,
            Err(error) => {
                writeln!(status, "warning: {error}")?;
                continue;
            }
        };

        writeln!(status, "Thinking...")?;
        let response = runtime.block_on(orchestrator.handle(query.as_str()));
        writeln!(output, "{response}\n")?;
        output.flush()?;
        answered += 1;
    }

    Ok(answered)
}

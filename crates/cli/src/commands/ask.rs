use salesdesk_agent::SalesOrchestrator;
use salesdesk_core::errors::ApplicationError;
use salesdesk_core::Query;
use tokio::runtime::Runtime;

use crate::commands::{error_line, exit_code_for, open_session, CommandResult, ConfigArgs};

pub fn run(raw_query: &str, json_output: bool, args: &ConfigArgs) -> CommandResult {
    // Blank input never reaches config loading or the providers.
    let query = match Query::parse(raw_query) {
        Ok(query) => query,
        Err(error) => return reject(ApplicationError::from(error), json_output),
    };

    let session = match open_session(args) {
        Ok(session) => session,
        Err(error) => {
            let exit_code = exit_code_for(&error);
            if json_output {
                return CommandResult::failure("ask", &error, exit_code);
            }
            eprintln!("{}", error_line(&error));
            return CommandResult::plain(exit_code, "");
        }
    };

    answer(&session.orchestrator, &session.runtime, &query, json_output)
}

pub fn answer(
    orchestrator: &SalesOrchestrator,
    runtime: &Runtime,
    query: &Query,
    json_output: bool,
) -> CommandResult {
    if !json_output {
        eprintln!("Thinking...");
    }
    let response = runtime.block_on(orchestrator.handle(query.as_str()));

    if json_output {
        CommandResult::success("ask", response)
    } else {
        CommandResult::plain(0, response)
    }
}

fn reject(error: ApplicationError, json_output: bool) -> CommandResult {
    let interface = error.into_interface("local");
    let exit_code = exit_code_for(&interface);
    if json_output {
        return CommandResult::failure("ask", &interface, exit_code);
    }
    eprintln!("warning: {}", interface.user_message());
    CommandResult::plain(exit_code, "")
}

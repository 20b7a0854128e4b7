//! Line-oriented chat shell: one line in, one reply out.

use agenda_rs_core::SessionRegistry;
use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const PROMPT: &str = "> ";
const HELP: &str = "Commands: /new starts a fresh session, /quit exits.";

/// Shell command recognised on its own line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quit,
    New,
    Help,
}

fn parse_command(line: &str) -> Option<Command> {
    match line {
        "/quit" | "/exit" => Some(Command::Quit),
        "/new" => Some(Command::New),
        "/help" => Some(Command::Help),
        _ => None,
    }
}

/// Run the chat loop for one user until `/quit` or end of input.
///
/// Turn failures are printed and the loop keeps going.
pub async fn run_shell<R, W>(
    registry: &SessionRegistry,
    user_id: &str,
    input: R,
    mut output: W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("shell started (user_id={})", user_id);
    output
        .write_all(format!("Agenda ready for {user_id}. {HELP}\n").as_bytes())
        .await?;
    let mut lines = input.lines();
    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_command(line) {
            Some(Command::Quit) => break,
            Some(Command::New) => {
                registry.end_session(user_id);
                output.write_all(b"Started a new session.\n").await?;
                continue;
            }
            Some(Command::Help) => {
                output.write_all(format!("{HELP}\n").as_bytes()).await?;
                continue;
            }
            None => {}
        }
        match registry.respond(user_id, line).await {
            Ok(reply) => output.write_all(format!("{reply}\n").as_bytes()).await?,
            Err(err) => {
                warn!("turn failed (user_id={}, error={})", user_id, err);
                output
                    .write_all(format!("error: {err}\n").as_bytes())
                    .await?;
            }
        }
    }
    output.flush().await?;
    info!("shell stopped (user_id={})", user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Command, parse_command, run_shell};
    use agenda_rs_core::{Assistant, AssistantSettings, SessionRegistry};
    use agenda_rs_test_utils::{FailingMemory, FixedChatResponse, ScriptedLLM, fixed_clock};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn registry(llm: ScriptedLLM) -> SessionRegistry {
        let assistant = Assistant::new(
            Arc::new(llm),
            Arc::new(FailingMemory::new()),
            fixed_clock("2024-08-20"),
            AssistantSettings::default(),
        );
        SessionRegistry::new(Arc::new(assistant))
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("/quit"), Some(Command::Quit));
        assert_eq!(parse_command("/exit"), Some(Command::Quit));
        assert_eq!(parse_command("/new"), Some(Command::New));
        assert_eq!(parse_command("quit"), None);
    }

    #[tokio::test]
    async fn replies_line_by_line_and_stops_at_quit() {
        let llm = ScriptedLLM::new(vec![
            FixedChatResponse::new("Hello!"),
            FixedChatResponse::new("Never sent"),
        ]);
        let registry = registry(llm.clone());
        let input: &[u8] = b"hi\n\n/quit\nignored\n";
        let mut output = Vec::new();

        run_shell(&registry, "alice", input, &mut output)
            .await
            .expect("shell");

        let text = String::from_utf8(output).expect("utf8");
        assert!(text.contains("> Hello!\n"));
        assert!(!text.contains("Never sent"));
        assert_eq!(llm.requests().len(), 1);
    }

    #[tokio::test]
    async fn turn_errors_are_printed_and_the_loop_continues() {
        let llm = ScriptedLLM::new(Vec::new());
        let registry = registry(llm.clone());
        let input: &[u8] = b"first\n/new\n";
        let mut output = Vec::new();

        run_shell(&registry, "alice", input, &mut output)
            .await
            .expect("shell");

        let text = String::from_utf8(output).expect("utf8");
        assert!(text.contains("error: model call failed: "));
        assert!(text.contains("Started a new session."));
        assert!(registry.is_empty());
    }
}

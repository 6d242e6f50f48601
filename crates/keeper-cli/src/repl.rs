//! Interactive command loop.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use keeper_core::action::Action;
use keeper_core::idgen::{IdGenerator, UuidGenerator};
use keeper_core::store::Store;

const HELP: &str = "\
commands:
  login <json>        store a profile, e.g. login {\"name\":\"mai\"}
  logout              clear the session
  add <text>          append a record (id is generated)
  update <id> <text>  replace a record's text
  delete <id>         remove a record (no-op if absent)
  list                show all records
  whoami              show the current session
  quit                flush pending writes and exit
";

/// Runs the command loop until EOF or `quit`.
pub async fn run(store: &Store) -> Result<()> {
    let ids = UuidGenerator;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    print_session(&mut stdout, store).await?;
    stdout.write_all(b"type 'help' for commands\n> ").await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "help" => stdout.write_all(HELP.as_bytes()).await?,
            "quit" | "exit" => break,
            "login" => {
                match serde_json::from_str(rest) {
                    Ok(profile) => report(&mut stdout, store.dispatch(Action::Login { profile }))
                        .await?,
                    Err(e) => {
                        stdout
                            .write_all(format!("profile must be JSON: {}\n", e).as_bytes())
                            .await?
                    }
                }
            }
            "logout" => report(&mut stdout, store.dispatch(Action::Logout)).await?,
            "add" => {
                if rest.is_empty() {
                    stdout.write_all(b"usage: add <text>\n").await?;
                } else {
                    let id = ids.next_id();
                    let result = store.dispatch(Action::Add {
                        id: id.clone(),
                        text: rest.to_string(),
                    });
                    if result.is_ok() {
                        stdout.write_all(format!("added {}\n", id).as_bytes()).await?;
                    }
                    report(&mut stdout, result).await?;
                }
            }
            "update" => match rest.split_once(' ') {
                Some((id, text)) if !text.trim().is_empty() => {
                    report(
                        &mut stdout,
                        store.dispatch(Action::Update {
                            id: id.to_string(),
                            text: text.trim().to_string(),
                        }),
                    )
                    .await?
                }
                _ => stdout.write_all(b"usage: update <id> <text>\n").await?,
            },
            "delete" => {
                if rest.is_empty() {
                    stdout.write_all(b"usage: delete <id>\n").await?;
                } else {
                    report(
                        &mut stdout,
                        store.dispatch(Action::Delete {
                            id: rest.to_string(),
                        }),
                    )
                    .await?
                }
            }
            "list" => {
                let state = store.get_state();
                if state.records.is_empty() {
                    stdout.write_all(b"(no records)\n").await?;
                }
                for record in state.records.iter() {
                    stdout
                        .write_all(format!("{}  {}\n", record.id, record.text).as_bytes())
                        .await?;
                }
            }
            "whoami" => print_session(&mut stdout, store).await?,
            unknown => {
                stdout
                    .write_all(format!("unknown command '{}', try 'help'\n", unknown).as_bytes())
                    .await?
            }
        }

        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    Ok(())
}

async fn report(
    stdout: &mut tokio::io::Stdout,
    result: keeper_core::Result<keeper_core::AppState>,
) -> Result<()> {
    if let Err(e) = result {
        stdout.write_all(format!("error: {}\n", e).as_bytes()).await?;
    }
    Ok(())
}

async fn print_session(stdout: &mut tokio::io::Stdout, store: &Store) -> Result<()> {
    let session = store.get_state().session;
    let line = match &session.user {
        Some(profile) => format!("logged in: {}\n", profile),
        None => "logged out\n".to_string(),
    };
    stdout.write_all(line.as_bytes()).await?;
    Ok(())
}

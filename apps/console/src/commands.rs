//! # Operator Commands
//!
//! One line of stdin is one command. Form-style commands take their fields
//! comma-separated so names may contain spaces.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tables | reservations | waitlist | stats     show the snapshot         │
//! │  refresh                                      fetch now                 │
//! │  poll on | poll off                           start / stop polling      │
//! │  toggle <table id>                            flip occupancy            │
//! │  wait <name>, <phone>[, <party>[, <email>]]   add walk-in party         │
//! │  reserve <name>, <phone>, <party>, <time>[, <email>]                    │
//! │  wait | reserve                               resubmit the kept draft   │
//! │  drafts | status | json | dismiss | help | quit                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use krabby_core::{ReservationDraft, WaitlistDraft, DEFAULT_PARTY_SIZE};
use tracing::debug;

use crate::error::{ConsoleError, ErrorCode};
use crate::state::ConsoleState;
use crate::view;

pub const HELP: &str = "\
commands:
  tables | reservations | waitlist | stats
  refresh
  poll on | poll off
  toggle <table id>
  wait <name>, <phone>[, <party size>[, <email>]]
  reserve <name>, <phone>, <party size>, <YYYY-MM-DDTHH:MM>[, <email>]
  wait | reserve          resubmit the draft kept after a failure
  drafts | status | json | dismiss | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Tables,
    Reservations,
    Waitlist,
    Stats,
    Refresh,
    Poll(bool),
    Toggle(i64),
    /// `None` resubmits the current draft.
    Wait(Option<WaitlistDraft>),
    Reserve(Option<ReservationDraft>),
    Drafts,
    Status,
    Json,
    Dismiss,
    Quit,
}

/// What the input loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, ConsoleError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "tables" => Command::Tables,
        "reservations" => Command::Reservations,
        "waitlist" => Command::Waitlist,
        "stats" | "dashboard" => Command::Stats,
        "refresh" => Command::Refresh,
        "poll" => match rest {
            "on" => Command::Poll(true),
            "off" => Command::Poll(false),
            _ => return Err(ConsoleError::invalid_argument("usage: poll on | poll off")),
        },
        "toggle" => Command::Toggle(
            rest.parse()
                .map_err(|_| ConsoleError::invalid_argument(format!("not a table id: '{}'", rest)))?,
        ),
        "wait" => Command::Wait(if rest.is_empty() {
            None
        } else {
            Some(parse_waitlist_draft(rest)?)
        }),
        "reserve" => Command::Reserve(if rest.is_empty() {
            None
        } else {
            Some(parse_reservation_draft(rest)?)
        }),
        "drafts" => Command::Drafts,
        "status" => Command::Status,
        "json" => Command::Json,
        "dismiss" => Command::Dismiss,
        "quit" | "exit" => Command::Quit,
        other => return Err(ConsoleError::unknown_command(other)),
    };

    Ok(Some(command))
}

fn fields(rest: &str) -> Vec<String> {
    rest.split(',').map(|f| f.trim().to_string()).collect()
}

fn field(fields: &[String], index: usize) -> String {
    fields.get(index).cloned().unwrap_or_default()
}

/// Missing or blank party size falls back to the form default; anything
/// else must be an integer. Range checks are left to validation.
fn party_size(fields: &[String], index: usize) -> Result<i64, ConsoleError> {
    match fields.get(index).map(String::as_str) {
        None | Some("") => Ok(DEFAULT_PARTY_SIZE),
        Some(raw) => raw
            .parse()
            .map_err(|_| ConsoleError::invalid_argument(format!("party size is not a number: '{}'", raw))),
    }
}

fn parse_waitlist_draft(rest: &str) -> Result<WaitlistDraft, ConsoleError> {
    let f = fields(rest);
    Ok(WaitlistDraft {
        customer_name: field(&f, 0),
        phone_number: field(&f, 1),
        party_size: party_size(&f, 2)?,
        email: field(&f, 3),
    })
}

fn parse_reservation_draft(rest: &str) -> Result<ReservationDraft, ConsoleError> {
    let f = fields(rest);
    Ok(ReservationDraft {
        customer_name: field(&f, 0),
        phone_number: field(&f, 1),
        party_size: party_size(&f, 2)?,
        reservation_time: field(&f, 3),
        email: field(&f, 4),
    })
}

// =============================================================================
// Execution
// =============================================================================

pub async fn execute(state: &mut ConsoleState, command: Command) -> Result<Flow, ConsoleError> {
    debug!(?command, "Executing command");

    match command {
        Command::Help => println!("{}", HELP),
        Command::Tables => print!("{}", ensure_newline(view::render_tables(&state.sync.snapshot()))),
        Command::Reservations => {
            print!("{}", ensure_newline(view::render_reservations(&state.sync.snapshot())))
        }
        Command::Waitlist => print!("{}", ensure_newline(view::render_waitlist(&state.sync.snapshot()))),
        Command::Stats => println!("{}", view::render_stats(&state.sync.snapshot())),
        Command::Refresh => {
            let outcome = state.sync.refresh().await?;
            debug!(?outcome, "Manual refresh finished");
            println!("{}", view::render_stats(&state.sync.snapshot()));
        }
        Command::Poll(true) => {
            state.sync.start_polling(state.poll_interval).await?;
            println!("polling every {}s", state.poll_interval.as_secs());
        }
        Command::Poll(false) => {
            state.sync.stop_polling().await;
            println!("polling stopped");
        }
        Command::Toggle(table_id) => {
            let table = state.pipeline.toggle_table_occupancy(table_id).await?;
            debug!(table_id = table.id, is_occupied = table.is_occupied, "Toggle done");
        }
        Command::Wait(draft) => {
            if let Some(draft) = draft {
                state.waitlist_draft = draft;
            }
            let entry = state
                .pipeline
                .submit_waitlist_entry(&mut state.waitlist_draft)
                .await?;
            debug!(entry_id = entry.id, "Waitlist submit done");
        }
        Command::Reserve(draft) => {
            if let Some(draft) = draft {
                state.reservation_draft = draft;
            }
            let reservation = state
                .pipeline
                .submit_reservation(&mut state.reservation_draft)
                .await?;
            debug!(reservation_id = reservation.id, "Reservation submit done");
        }
        Command::Drafts => {
            println!("waitlist draft:    {:?}", state.waitlist_draft);
            println!("reservation draft: {:?}", state.reservation_draft);
        }
        Command::Status => println!("{}", view::render_status(&state.sync.status().await)),
        Command::Json => {
            let json = serde_json::to_string_pretty(state.sync.snapshot().as_ref())
                .map_err(|e| ConsoleError::new(ErrorCode::Internal, e.to_string()))?;
            println!("{}", json);
        }
        Command::Dismiss => state.notices.clear(),
        Command::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

fn ensure_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use krabby_sync::{
        HttpGateway, MutationPipeline, NotificationCenter, SharedGateway, SyncEngine,
    };
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_parse_simple_verbs() {
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(parse("tables").unwrap(), Some(Command::Tables));
        assert_eq!(parse("STATS").unwrap(), Some(Command::Stats));
        assert_eq!(parse("poll off").unwrap(), Some(Command::Poll(false)));
        assert_eq!(parse("toggle 4").unwrap(), Some(Command::Toggle(4)));
        assert_eq!(parse("wait").unwrap(), Some(Command::Wait(None)));
        assert_eq!(parse("quit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("seat 4").unwrap_err().code, ErrorCode::UnknownCommand);
        assert_eq!(parse("toggle four").unwrap_err().code, ErrorCode::InvalidArgument);
        assert_eq!(parse("poll maybe").unwrap_err().code, ErrorCode::InvalidArgument);
        assert_eq!(
            parse("wait Plankton, 555-1212, two").unwrap_err().code,
            ErrorCode::InvalidArgument
        );
    }

    #[test]
    fn test_parse_waitlist_draft_defaults_party_size() {
        let parsed = parse("wait Plankton, 555-1212").unwrap();
        assert_eq!(
            parsed,
            Some(Command::Wait(Some(WaitlistDraft {
                customer_name: "Plankton".into(),
                phone_number: "555-1212".into(),
                email: String::new(),
                party_size: 2,
            })))
        );
    }

    #[test]
    fn test_parse_reservation_draft_with_spaces() {
        let parsed = parse("reserve Sandy Cheeks, 555-0003, 3, 2024-06-01T18:30, sandy@treedome.sea")
            .unwrap();
        match parsed {
            Some(Command::Reserve(Some(draft))) => {
                assert_eq!(draft.customer_name, "Sandy Cheeks");
                assert_eq!(draft.party_size, 3);
                assert_eq!(draft.reservation_time, "2024-06-01T18:30");
                assert_eq!(draft.email, "sandy@treedome.sea");
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    /// State wired to an address nothing listens on. Only commands that
    /// never reach the network are exercised with it.
    fn offline_state() -> ConsoleState {
        let gateway: SharedGateway =
            Arc::new(HttpGateway::new("http://127.0.0.1:9/api", Duration::from_secs(1)).unwrap());
        let notices = NotificationCenter::default();
        let sync = SyncEngine::spawn(Arc::clone(&gateway), notices.clone());
        let pipeline = MutationPipeline::new(gateway, sync.clone(), notices.clone());
        ConsoleState::new(sync, pipeline, notices, Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_invalid_draft_is_kept_for_resubmit() {
        let mut state = offline_state();
        let draft = WaitlistDraft {
            customer_name: "Plankton".into(),
            phone_number: String::new(),
            ..Default::default()
        };

        let err = execute(&mut state, Command::Wait(Some(draft.clone())))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(state.waitlist_draft, draft);

        let err = execute(&mut state, Command::Wait(None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_toggle_before_first_refresh_is_stale() {
        let mut state = offline_state();
        let err = execute(&mut state, Command::Toggle(1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StaleReference);
    }

    #[tokio::test]
    async fn test_quit_and_local_commands() {
        let mut state = offline_state();
        assert_eq!(execute(&mut state, Command::Poll(false)).await.unwrap(), Flow::Continue);
        assert_eq!(execute(&mut state, Command::Dismiss).await.unwrap(), Flow::Continue);
        assert_eq!(execute(&mut state, Command::Quit).await.unwrap(), Flow::Quit);
    }
}

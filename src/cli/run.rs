//! The `run` command: one event per stdin line, actions to stdout.
//!
//! Stdin is read on its own thread so scheduled tasks fire at their time
//! even while no events arrive.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use jiff::Timestamp;
use tracing::{debug, info, warn};

use crate::bot::{Bot, Event};
use crate::config::Config;
use crate::storage::{RecordStore, Storage};
use crate::transport::{ConsoleTransport, Transport};

pub(super) fn cmd_run(config: &Config, storage: &Storage, drain: bool) -> Result<(), String> {
    let transport = ConsoleTransport::new(io::stdout(), config.admins.clone());
    let mut bot = Bot::new(storage, &transport, config);

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    let handled = serve(&mut bot, &rx)?;

    if drain {
        let ran = bot.run_due(Timestamp::MAX);
        info!(ran, "ran remaining scheduled tasks");
    } else if let Some(next) = bot.next_due() {
        warn!(
            dropped = bot.pending_tasks(),
            %next,
            "end of input, scheduled tasks dropped"
        );
    }
    info!(
        handled,
        threads = bot.session().thread_count(),
        polls = bot.session().polls.len(),
        "event stream ended"
    );
    Ok(())
}

/// Handles event lines until the sender hangs up, waking for scheduled
/// tasks in between. Returns the number of events handled.
fn serve<S: RecordStore + ?Sized, T: Transport + ?Sized>(
    bot: &mut Bot<'_, S, T>,
    lines: &Receiver<io::Result<String>>,
) -> Result<usize, String> {
    let mut handled = 0usize;
    let mut line_no = 0usize;

    loop {
        let received = match bot.next_due() {
            Some(due) => lines.recv_timeout(wait_until(due, Timestamp::now())),
            None => lines.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        let line = match received {
            Ok(line) => line.map_err(|e| format!("failed to read events: {e}"))?,
            Err(RecvTimeoutError::Timeout) => {
                let ran = bot.run_due(Timestamp::now());
                debug!(ran, "woke for scheduled tasks");
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => return Ok(handled),
        };
        line_no += 1;

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: Event = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = line_no, "skipping malformed event: {e}");
                continue;
            }
        };

        let now = Timestamp::now();
        bot.handle(event, now);
        bot.run_due(now);
        handled += 1;
    }
}

/// How long to wait for input before `due`. Overdue tasks wait for nothing.
fn wait_until(due: Timestamp, now: Timestamp) -> Duration {
    Duration::try_from(due.duration_since(now)).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::transport::Outbound;
    use crate::transport::recording::RecordingTransport;

    #[test]
    fn waits_until_the_next_task_is_due() {
        let now: Timestamp = "2025-08-18T02:00:00Z".parse().unwrap();
        let due: Timestamp = "2025-08-18T02:00:05Z".parse().unwrap();

        assert_eq!(wait_until(due, now), Duration::from_secs(5));
    }

    #[test]
    fn overdue_tasks_do_not_wait() {
        let now: Timestamp = "2025-08-18T02:00:05Z".parse().unwrap();
        let due: Timestamp = "2025-08-18T02:00:00Z".parse().unwrap();

        assert_eq!(wait_until(due, now), Duration::ZERO);
        assert_eq!(wait_until(now, now), Duration::ZERO);
    }

    #[test]
    fn scheduled_deletion_fires_while_input_is_idle() {
        let storage = Storage::open_in_memory().unwrap();
        let transport = RecordingTransport::with_admins(vec![1]);
        let config = Config {
            topic_delete_delay_secs: 1,
            ..Config::default()
        };
        let mut bot = Bot::new(&storage, &transport, &config);

        let (tx, rx) = mpsc::channel();
        let sender = thread::spawn(move || {
            for line in [
                r#"{"event":"topicCreated","threadId":812,"userId":1}"#,
                r#"{"event":"button","threadId":812,"userId":1,"messageId":100,"data":"topic|812|perf"}"#,
                r#"{"event":"text","threadId":812,"userId":1,"messageId":5,"text":"Gala // 23aug // Hall"}"#,
                r#"{"event":"button","threadId":812,"userId":1,"messageId":6,"data":"confirm|812|reject"}"#,
            ] {
                tx.send(Ok(line.to_string())).unwrap();
            }
            // Only the timeout can run the deletion: malformed lines run nothing.
            thread::sleep(Duration::from_millis(1500));
            tx.send(Ok("not json".to_string())).unwrap();
        });

        let handled = serve(&mut bot, &rx).unwrap();
        sender.join().unwrap();

        assert_eq!(handled, 4);
        assert!(
            transport
                .sent()
                .iter()
                .any(|o| matches!(o, Outbound::DeleteTopic { thread_id: 812 }))
        );
        assert_eq!(bot.pending_tasks(), 0);
    }
}

//! CLI interface for Encore.
//!
//! - `encore parse <dates>` checks date text the way proposals are parsed.
//! - `encore list` prints the stored performance records.
//! - `encore run` drives the bot from a JSON-lines event stream on stdin and
//!   writes the bot's outbound actions as JSON lines on stdout.
//!
//! Config comes from `--config`, then `$ENCORE_CONFIG`, then
//! `~/.encore/config.toml`.

mod format;
mod run;

use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::datetime::{self, DateParser};
use crate::storage::{self, RecordStore, Storage, list_records};

use format::{format_record_line, format_tsv_row};

/// Encore: performance bookings for a group chat.
#[derive(Debug, Parser)]
#[command(name = "encore", after_long_help = EVENTS_HELP)]
pub struct Cli {
    /// Config file to use instead of the default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const EVENTS_HELP: &str = r#"Events for `encore run`, one JSON object per line:
  {"event":"topicCreated","threadId":812,"userId":1}
  {"event":"command","threadId":812,"userId":1,"messageId":5,"name":"/confirmation"}
  {"event":"text","threadId":812,"userId":1,"messageId":6,"text":"Gala // 23aug 8pm // Hall"}
  {"event":"button","threadId":812,"userId":1,"messageId":7,"data":"confirm|812|accept"}
  {"event":"pollAnswer","pollId":"…","userId":4,"optionIds":[0]}
  {"event":"tick"}"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse comma-separated dates. Prints one canonical date per line.
    Parse {
        /// e.g. "23aug 8pm, 24 aug 2025 1930".
        dates: String,

        /// Year for dates that leave it out. Defaults to the current year.
        #[arg(long)]
        year: Option<i16>,
    },

    /// List stored performance records.
    List {
        /// Print every column as tab-separated values, with a header row.
        #[arg(long)]
        tsv: bool,
    },

    /// Run the bot over events read from stdin until end of input.
    Run {
        /// Run tasks still scheduled at end of input instead of dropping them.
        #[arg(long)]
        drain: bool,
    },
}

/// Run the CLI, returning an error message on failure.
pub fn run() -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Parse { ref dates, year } => cmd_parse(dates, year),
        Command::List { tsv } => {
            let config = load_config(cli.config)?;
            let storage = open_storage(&config)?;
            cmd_list(&storage, tsv)
        }
        Command::Run { drain } => {
            let config = load_config(cli.config)?;
            let storage = open_storage(&config)?;
            run::cmd_run(&config, &storage, drain)
        }
    }
}

fn load_config(flag: Option<PathBuf>) -> Result<Config, String> {
    let path = flag.or_else(|| env::var_os("ENCORE_CONFIG").map(PathBuf::from));
    Config::load(path.as_deref()).map_err(|e| e.to_string())
}

fn open_storage(config: &Config) -> Result<Storage, String> {
    storage::open(config.database.as_deref())
        .map_err(|e| format!("failed to open record store: {e}"))
}

fn cmd_parse(dates: &str, year: Option<i16>) -> Result<(), String> {
    let parsed = match year {
        Some(year) => DateParser::new(year).parse_and_format(dates),
        None => datetime::parse_and_format(dates),
    };
    let entries = parsed.map_err(|e| e.hint())?;
    for entry in &entries {
        println!("{entry}");
    }
    Ok(())
}

fn cmd_list(storage: &Storage, tsv: bool) -> Result<(), String> {
    if tsv {
        let rows = storage
            .rows()
            .map_err(|e| format!("failed to read records: {e}"))?;
        println!("{}", format::tsv_header());
        for row in &rows {
            println!("{}", format_tsv_row(row));
        }
        return Ok(());
    }

    let records =
        list_records(storage).map_err(|e| format!("failed to read records: {e}"))?;
    if records.is_empty() {
        println!("No records");
        return Ok(());
    }
    for record in &records {
        println!("{}", format_record_line(record));
    }
    Ok(())
}

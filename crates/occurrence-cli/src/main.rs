//! `occur` CLI — validate occurrence definitions and step through their dates.
//!
//! ## Usage
//!
//! ```sh
//! # Check a definition (stdin)
//! echo '{"occurrenceType":"DAY_OF_WEEK","dayOfWeek":1}' | occur validate
//!
//! # Next occurrence from today, as an occurrence state
//! occur next -i rule.json
//!
//! # Continue from a stored state, writing the new state back
//! occur next -i rule.json --state state.json -o state.json
//!
//! # The next 5 dates counted from a fixed day
//! occur list -i rule.json -n 5 --today 2020-10-07
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use occurrence_engine::{
    next_occurrence_state, validate_occurrence_definition, CalendarDate, Clock, FixedClock,
    OccurrenceDefinition, OccurrenceRule, OccurrenceState, SystemClock,
};
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "occur",
    version,
    about = "Recurring date-occurrence CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check an occurrence definition without evaluating it
    Validate {
        /// Definition JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Compute the occurrence state after the next occurrence
    Next {
        /// Definition JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Previous occurrence state JSON file (starts fresh if omitted)
        #[arg(long)]
        state: Option<String>,
        /// Use this date (YYYY-MM-DD) as today instead of the system date
        #[arg(long)]
        today: Option<CalendarDate>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print upcoming occurrence dates, one per line
    List {
        /// Definition JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Occurrence state JSON file to continue from
        #[arg(long)]
        state: Option<String>,
        /// Use this date (YYYY-MM-DD) as today instead of the system date
        #[arg(long)]
        today: Option<CalendarDate>,
        /// Maximum number of dates to print
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { input } => {
            let definition = read_definition(input.as_deref())?;
            validate_occurrence_definition(&definition)
                .context("Invalid occurrence definition")?;
            println!("valid");
        }
        Commands::Next {
            input,
            state,
            today,
            output,
        } => {
            let rule = read_rule(input.as_deref())?;
            let previous = read_state(state.as_deref())?;
            let clock = clock(today);
            let next = next_occurrence_state(&rule, previous.as_ref(), clock.as_ref());
            let mut json =
                serde_json::to_string_pretty(&next).context("Failed to serialize state")?;
            json.push('\n');
            write_output(output.as_deref(), &json)?;
        }
        Commands::List {
            input,
            state,
            today,
            count,
        } => {
            let rule = read_rule(input.as_deref())?;
            let start = read_state(state.as_deref())?.unwrap_or_default();
            let clock = clock(today);
            for date in rule.occurrences(start, clock.as_ref()).take(count) {
                println!("{}", date);
            }
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    Ok(())
}

fn clock(today: Option<CalendarDate>) -> Box<dyn Clock> {
    match today {
        Some(today) => {
            debug!(%today, "using fixed clock");
            Box::new(FixedClock(today))
        }
        None => Box::new(SystemClock),
    }
}

fn read_definition(path: Option<&str>) -> Result<OccurrenceDefinition> {
    let json = read_input(path)?;
    serde_json::from_str(&json).context("Failed to parse occurrence definition JSON")
}

fn read_rule(path: Option<&str>) -> Result<OccurrenceRule> {
    let definition = read_definition(path)?;
    OccurrenceRule::try_from(&definition).context("Invalid occurrence definition")
}

fn read_state(path: Option<&str>) -> Result<Option<OccurrenceState>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path))?;
    let state = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse occurrence state JSON: {}", path))?;
    Ok(Some(state))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

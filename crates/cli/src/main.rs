//! `paylens` -- protocol compliance and security auditor for agentic
//! payment protocols (AP2, x402, ACP, UCP).

mod analyze;
mod inspect;
mod profiles;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use paylens_core::{LifecycleState, ProfileRegistry};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Agentic payment protocol auditor.
#[derive(Parser)]
#[command(name = "paylens", version, about = "Agentic payment protocol auditor")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all protocol profiles
    Protocols,

    /// Show metadata for one protocol
    Protocol {
        /// Protocol code (AP2, x402, ACP, UCP)
        code: String,
    },

    /// Print the JSON Schema for an intent type
    Schema {
        code: String,
        intent_type: String,
    },

    /// Validate an intent payload against its structural rules
    Validate {
        code: String,
        intent_type: String,
        /// Path to the intent payload JSON file
        #[arg(long)]
        data: PathBuf,
    },

    /// Execute one lifecycle step through a protocol's transition table
    Step {
        code: String,
        /// Current lifecycle state (wire string, e.g. pending_approval)
        #[arg(long)]
        state: String,
        #[arg(long)]
        intent_type: String,
        /// Path to the intent payload JSON file
        #[arg(long)]
        data: PathBuf,
        /// Path to the execution context JSON file
        #[arg(long)]
        context: Option<PathBuf>,
    },

    /// List actions available from a lifecycle state
    Actions {
        code: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        intent_type: String,
    },

    /// Show a protocol's security control assessment
    Controls {
        code: String,
    },

    /// Show a protocol's recognized error patterns
    Errors {
        code: String,
    },

    /// Score an x402 payment payload against its requirements
    AnalyzeX402 {
        /// Path to the PaymentPayload JSON file
        #[arg(long)]
        payload: PathBuf,
        /// Path to the payment requirements JSON file
        #[arg(long)]
        requirements: PathBuf,
    },

    /// Score an AP2 mandate and user authorization
    AnalyzeAp2 {
        /// Path to the mandate JSON file
        #[arg(long)]
        mandate: PathBuf,
        /// The user authorization string (empty = missing)
        #[arg(long, default_value = "")]
        authorization: String,
    },

    /// Run the compliance suite against a live server
    Inspect {
        code: String,
        /// Base URL of the server under test
        #[arg(long)]
        target: String,
        /// Comma-separated test ids (default: full suite)
        #[arg(long, value_delimiter = ',')]
        tests: Option<Vec<String>>,
    },
}

fn main() {
    let cli = Cli::parse();
    let registry = ProfileRegistry::new();

    match cli.command {
        Commands::Protocols => profiles::cmd_protocols(&registry, cli.output),
        Commands::Protocol { code } => profiles::cmd_protocol(&registry, &code, cli.output),
        Commands::Schema { code, intent_type } => {
            profiles::cmd_schema(&registry, &code, &intent_type)
        }
        Commands::Validate {
            code,
            intent_type,
            data,
        } => profiles::cmd_validate(&registry, &code, &intent_type, &data, cli.output),
        Commands::Step {
            code,
            state,
            intent_type,
            data,
            context,
        } => profiles::cmd_step(
            &registry,
            &code,
            &state,
            &intent_type,
            &data,
            context.as_deref(),
            cli.output,
        ),
        Commands::Actions {
            code,
            state,
            intent_type,
        } => profiles::cmd_actions(&registry, &code, &state, &intent_type, cli.output),
        Commands::Controls { code } => profiles::cmd_controls(&registry, &code, cli.output),
        Commands::Errors { code } => profiles::cmd_errors(&registry, &code, cli.output),
        Commands::AnalyzeX402 {
            payload,
            requirements,
        } => analyze::cmd_analyze_x402(&payload, &requirements, cli.output),
        Commands::AnalyzeAp2 {
            mandate,
            authorization,
        } => analyze::cmd_analyze_ap2(&mandate, &authorization, cli.output),
        Commands::Inspect {
            code,
            target,
            tests,
        } => inspect::cmd_inspect(&code, &target, tests, cli.output),
    }
}

/// Read and parse a JSON file, exiting with a message on failure.
pub(crate) fn read_json(path: &Path) -> serde_json::Value {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", path.display(), e);
            process::exit(1);
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("error: invalid JSON in {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

/// Parse a lifecycle state wire string, exiting with a message on failure.
pub(crate) fn parse_state(value: &str) -> LifecycleState {
    match LifecycleState::parse(value) {
        Some(state) => state,
        None => {
            eprintln!("error: unknown lifecycle state: {}", value);
            process::exit(1);
        }
    }
}

/// Pretty-print any serializable value as JSON.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("error: serialization failed: {}", e);
            process::exit(1);
        }
    }
}

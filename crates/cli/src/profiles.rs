//! Profile-facing subcommands: metadata, schemas, validation, stepping.

use std::path::Path;
use std::process;

use paylens_core::{ProfileRegistry, ProtocolProfile, StepContext};

use crate::{parse_state, print_json, read_json, OutputFormat};

/// Resolve a protocol code or exit with an error.
fn resolve<'a>(registry: &'a ProfileRegistry, code: &str) -> &'a dyn ProtocolProfile {
    match registry.get(code) {
        Some(profile) => profile,
        None => {
            eprintln!("error: unknown protocol: {}", code);
            process::exit(1);
        }
    }
}

pub(crate) fn cmd_protocols(registry: &ProfileRegistry, output: OutputFormat) {
    match output {
        OutputFormat::Json => {
            let all: Vec<_> = registry.profiles().map(|p| p.metadata()).collect();
            print_json(&all);
        }
        OutputFormat::Text => {
            for profile in registry.profiles() {
                println!("{:<6} {:<8} {}", profile.name(), profile.version(), profile.description());
            }
        }
    }
}

pub(crate) fn cmd_protocol(registry: &ProfileRegistry, code: &str, output: OutputFormat) {
    let profile = resolve(registry, code);
    let meta = profile.metadata();
    match output {
        OutputFormat::Json => print_json(&meta),
        OutputFormat::Text => {
            println!("{} {} - {}", meta.name, meta.version, meta.description);
            println!("intent types:       {}", meta.intent_types.join(", "));
            println!("lifecycle:          {}", meta.lifecycle_states.join(" -> "));
            println!("point of no return: {}", meta.point_of_no_return);
            for (role, artifacts) in &meta.signature_coverage {
                println!("signs ({}): {}", role, artifacts.join(", "));
            }
        }
    }
}

pub(crate) fn cmd_schema(registry: &ProfileRegistry, code: &str, intent_type: &str) {
    let profile = resolve(registry, code);
    match profile.intent_schema(intent_type) {
        Some(schema) => print_json(&schema),
        None => {
            eprintln!("error: intent type '{}' not found in {}", intent_type, profile.name());
            process::exit(1);
        }
    }
}

pub(crate) fn cmd_validate(
    registry: &ProfileRegistry,
    code: &str,
    intent_type: &str,
    data_path: &Path,
    output: OutputFormat,
) {
    let profile = resolve(registry, code);
    let data = read_json(data_path);
    let report = profile.validate_intent(intent_type, &data);

    match output {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            if report.valid {
                println!("valid: {} {}", profile.name(), intent_type);
            } else {
                println!("invalid: {} {}", profile.name(), intent_type);
                for error in &report.errors {
                    println!("  {}", error.message);
                }
            }
        }
    }

    if !report.valid {
        process::exit(1);
    }
}

pub(crate) fn cmd_step(
    registry: &ProfileRegistry,
    code: &str,
    state: &str,
    intent_type: &str,
    data_path: &Path,
    context_path: Option<&Path>,
    output: OutputFormat,
) {
    let profile = resolve(registry, code);
    let state = parse_state(state);
    let data = read_json(data_path);
    let context = match context_path {
        Some(path) => StepContext::from_value(&read_json(path)),
        None => StepContext::new(),
    };

    let outcome = profile.execute_step(state, intent_type, &data, &context);
    match output {
        OutputFormat::Json => print_json(&outcome),
        OutputFormat::Text => {
            println!(
                "{} -> {} [{}] {}",
                state, outcome.new_state, outcome.result.action, outcome.result.message
            );
        }
    }
}

pub(crate) fn cmd_actions(
    registry: &ProfileRegistry,
    code: &str,
    state: &str,
    intent_type: &str,
    output: OutputFormat,
) {
    let profile = resolve(registry, code);
    let state = parse_state(state);
    let actions = profile.available_actions(state, intent_type, &StepContext::new());

    match output {
        OutputFormat::Json => print_json(&actions),
        OutputFormat::Text => {
            if actions.is_empty() {
                println!("no actions available from {}", state);
            }
            for action in &actions {
                println!("{:<20} ({}) {}", action.id, action.actor, action.description);
            }
        }
    }
}

pub(crate) fn cmd_controls(registry: &ProfileRegistry, code: &str, output: OutputFormat) {
    let profile = resolve(registry, code);
    let controls = profile.security_controls();

    match output {
        OutputFormat::Json => print_json(&controls),
        OutputFormat::Text => {
            for control in &controls {
                println!(
                    "{:<24} {:<16} {:?}",
                    control.control_name, control.control_category, control.status
                );
            }
        }
    }
}

pub(crate) fn cmd_errors(registry: &ProfileRegistry, code: &str, output: OutputFormat) {
    let profile = resolve(registry, code);
    let patterns = profile.error_patterns();

    match output {
        OutputFormat::Json => print_json(&patterns),
        OutputFormat::Text => {
            for pattern in &patterns {
                println!("{:<24} {}", pattern.code, pattern.description);
                for step in &pattern.recovery {
                    println!("    recovery: {}", step);
                }
            }
        }
    }
}

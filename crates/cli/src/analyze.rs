//! Security analysis subcommands.

use std::collections::HashSet;
use std::path::Path;

use paylens_security::{analyze_ap2_mandate, analyze_x402_payment, SecurityAnalysis};

use crate::{print_json, read_json, OutputFormat};

pub(crate) fn cmd_analyze_x402(payload_path: &Path, requirements_path: &Path, output: OutputFormat) {
    let payload = read_json(payload_path);
    let requirements = read_json(requirements_path);
    // The CLI tracks no replay history; each invocation sees a fresh set.
    let analysis = analyze_x402_payment(&payload, &requirements, &HashSet::new());
    render(&analysis, output);
}

pub(crate) fn cmd_analyze_ap2(mandate_path: &Path, authorization: &str, output: OutputFormat) {
    let mandate = read_json(mandate_path);
    let analysis = analyze_ap2_mandate(&mandate, authorization);
    render(&analysis, output);
}

fn render(analysis: &SecurityAnalysis, output: OutputFormat) {
    match output {
        OutputFormat::Json => print_json(analysis),
        OutputFormat::Text => {
            println!("score {} grade {}", analysis.score, analysis.grade);
            for check in &analysis.checks {
                let status = if check.passed { "pass" } else { "FAIL" };
                println!("  [{}] {:<24} {}", status, check.name, check.message);
                if let Some(rec) = &check.recommendation {
                    println!("         fix: {}", rec);
                }
            }
            println!("{}", analysis.summary);
        }
    }
}

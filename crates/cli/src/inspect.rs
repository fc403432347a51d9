//! The `inspect` subcommand: run a compliance suite against a live server.

use std::process;

use paylens_inspector::{ComplianceRunner, TestReport, UreqTarget};

use crate::{print_json, OutputFormat};

pub(crate) fn cmd_inspect(
    code: &str,
    target_url: &str,
    tests: Option<Vec<String>>,
    output: OutputFormat,
) {
    let runner = ComplianceRunner::new();
    let target = UreqTarget::new(target_url);

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    let report = match rt.block_on(runner.run(&target, code, tests.as_deref())) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => render_text(&report),
    }

    if report.failed > 0 {
        process::exit(1);
    }
}

fn render_text(report: &TestReport) {
    println!("{} against {} ({})", report.protocol, report.target_url, report.run_id);
    for result in &report.results {
        let status = if result.passed { "pass" } else { "FAIL" };
        println!(
            "  [{}] {:<32} {:>5}ms  {}",
            status, result.test_id, result.duration_ms, result.name
        );
        if let Some(error) = &result.error {
            println!("         {}", error);
        }
        if let Some(rec) = &result.recommendation {
            println!("         fix: {}", rec);
        }
    }
    println!(
        "{} passed, {} failed, score {}",
        report.passed, report.failed, report.security_score
    );
    println!("{}", report.summary);
}

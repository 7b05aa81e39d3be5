//! CLI smoke and inspection entry point.
//!
//! # Responsibility
//! - Verify `mindtime_core` linkage with a ping/version probe.
//! - Validate exchange files given as arguments and summarize them.
//!
//! Exit code is non-zero when any file fails validation.

use std::process::ExitCode;

fn main() -> ExitCode {
    println!("mindtime_core ping={}", mindtime_core::ping());
    println!("mindtime_core version={}", mindtime_core::core_version());

    let mut failures = 0usize;
    for path in std::env::args().skip(1) {
        match mindtime_core::read_import_file(&path) {
            Ok(imported) => {
                let document = imported.into_document();
                let issues = document.integrity_issues();
                println!(
                    "{path}: ok nodes={} edges={} integrity_issues={}",
                    document.nodes.len(),
                    document.edges.len(),
                    issues.len()
                );
                for issue in issues {
                    println!("  {issue:?}");
                }
            }
            Err(err) => {
                failures += 1;
                eprintln!("{path}: error {err}");
            }
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

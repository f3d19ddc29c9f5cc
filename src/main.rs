use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use nbfix::{Diagnostic, NormalizeOptions, Policy, VerifyReport};

const DEFAULT_NOTEBOOK: &str = "notebooks/financial_sentiment_analysis.ipynb";

/// Repair Jupyter notebooks so they render on GitHub.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Notebooks to repair.
    #[arg(default_value = DEFAULT_NOTEBOOK)]
    files: Vec<PathBuf>,

    /// Write the repaired notebook here instead of next to the input.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Which set of repair rules to apply.
    #[arg(short, long, value_enum, default_value_t = PolicyArg::Complete)]
    policy: PolicyArg,

    /// Verify the written notebook (default for the complete policy).
    #[arg(long, overrides_with = "no_verify")]
    verify: bool,

    /// Skip verification of the written notebook.
    #[arg(long, overrides_with = "verify")]
    no_verify: bool,

    /// Only verify the inputs; write nothing.
    #[arg(long, conflicts_with_all = ["output", "verify", "no_verify"])]
    check: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Overwrite version and kernel metadata; always passes verification.
    Complete,
    /// Only fill in what is missing.
    Lenient,
}

impl From<PolicyArg> for Policy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Complete => Policy::Complete,
            PolicyArg::Lenient => Policy::Lenient,
        }
    }
}

fn print_diagnostics(level: &str, diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        let loc = d
            .location
            .as_deref()
            .map(|l| format!(" ({l})"))
            .unwrap_or_default();
        eprintln!("{level}: [{:?}] {}{}", d.code, d.message, loc);
    }
}

fn print_verification(path: &Path, report: &VerifyReport) -> bool {
    print_diagnostics("error", &report.issues);
    eprintln!(
        "info: {}: valid cells: {}/{}",
        path.display(),
        report.valid_cells,
        report.total_cells
    );
    report.is_valid()
}

fn check(path: &Path) -> bool {
    eprintln!("info: verifying {}", path.display());
    match nbfix::verify_file(path) {
        Ok(report) => print_verification(path, &report),
        Err(e) => {
            eprintln!("error: {}: verification failed: {e}", path.display());
            false
        }
    }
}

fn fix(path: &Path, options: &NormalizeOptions) -> bool {
    eprintln!(
        "info: fixing {} ({} policy)",
        path.display(),
        options.policy.name()
    );

    let report = match nbfix::normalize_file(path, options) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {}: {e}", path.display());
            return false;
        }
    };

    print_diagnostics("warning", &report.warnings);
    if report.widgets_removed {
        eprintln!("info: removed widgets metadata");
    }
    eprintln!("info: saved {}", report.output_path.display());
    eprintln!("info: cells: {}", report.cell_count);
    eprintln!(
        "info: size: {:.2} MB",
        report.output_bytes as f64 / 1024.0 / 1024.0
    );
    println!("{}", report.output_path.display());

    match &report.verification {
        None => true,
        Some(Ok(verify)) => print_verification(&report.output_path, verify),
        Some(Err(e)) => {
            eprintln!(
                "error: {}: verification failed: {e}",
                report.output_path.display()
            );
            false
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, ExitCode> {
    if cli.output.is_some() && cli.files.len() > 1 {
        eprintln!("error: --output requires a single input file");
        return Err(ExitCode::from(2));
    }

    let verify = if cli.verify {
        Some(true)
    } else if cli.no_verify {
        Some(false)
    } else {
        None
    };

    let options = NormalizeOptions {
        policy: cli.policy.into(),
        output: cli.output,
        verify,
    };

    let mut had_error = false;
    for path in &cli.files {
        let ok = if cli.check {
            check(path)
        } else {
            fix(path, &options)
        };
        had_error |= !ok;
    }

    if had_error {
        Err(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(code) => code,
    }
}

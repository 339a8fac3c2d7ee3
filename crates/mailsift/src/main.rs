//! Command-line front end: collects the form inputs, runs one scan, prints the
//! per-email listing and hands over the archive.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use mailsift::config::{load_settings, FormInput};
use mailsift::secrets::{resolve_secret, DEFAULT_PASSWORD_ENV_VAR};
use mailsift::{ImapCredentials, ItemOutcome, MailboxScanner, ScanOutcome, ScanReport};

#[derive(Parser)]
#[command(name = "mailsift", version, about = "Filter PDF attachments in an IMAP inbox")]
struct Cli {
    /// Email username (usually the address)
    #[arg(short, long, env = "MAILSIFT_USERNAME")]
    username: String,

    /// Password given directly (prefer --password-file or --password-env)
    #[arg(long, hide = true)]
    password: Option<String>,

    /// File containing the password
    #[arg(long, value_name = "FILE")]
    password_file: Option<String>,

    /// Environment variable holding the password
    #[arg(long, value_name = "VAR", default_value = DEFAULT_PASSWORD_ENV_VAR)]
    password_env: String,

    /// Keywords, comma-separated; a document needs at least one (blank = any)
    #[arg(short, long, default_value = "")]
    keywords: String,

    /// Terms that must all appear, comma-separated
    #[arg(short, long, default_value = "experience, education, skills")]
    terms: String,

    /// Only examine the newest N emails
    #[arg(short = 'n', long, value_name = "N", conflicts_with_all = ["since", "until"])]
    max_messages: Option<usize>,

    /// First day of the date range (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "until")]
    since: Option<String>,

    /// Last day of the date range, inclusive (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "since")]
    until: Option<String>,

    /// Where to save the downloaded archive
    #[arg(short, long, value_name = "PATH", default_value = "cv_files.zip")]
    output: PathBuf,

    /// YAML settings file (server, folder, directories, page limit)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the scan report as JSON instead of a listing
    #[arg(long)]
    json: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    mailsift::logging::init(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli.config.as_ref()).context("Failed to load settings")?;

    let form = FormInput {
        keywords: cli.keywords,
        required_terms: cli.terms,
        max_messages: cli.max_messages,
        since: cli.since,
        until: cli.until,
    };
    let criteria = form.criteria(settings.max_pages);
    let mode = form.mode()?;

    let password = resolve_secret(
        cli.password.as_deref(),
        cli.password_file.as_deref(),
        Some(&cli.password_env),
    )
    .context("Failed to read the email password")?;
    let credentials = ImapCredentials::new(cli.username, password);

    let scanner = MailboxScanner::new(settings, criteria, mode);
    let outcome = scanner.run(credentials).await?;

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();

    write_report(&mut out, &mut err, outcome.report(), cli.json)?;

    let status = match outcome {
        ScanOutcome::Empty(report) => {
            if let Some(error) = &report.search_error {
                writeln!(err, "Warning: search failed: {}", error)?;
            }
            format!(
                "No matching PDFs found in {} emails.",
                report.messages_examined()
            )
        }
        ScanOutcome::Found { bundle, report } => {
            let count = bundle.file_count();
            let saved = bundle
                .deliver_to(&cli.output)
                .context("Failed to save the archive")?;
            format!(
                "Process completed! Kept {} of {} PDFs; archive saved to {}",
                count,
                report.outcomes().count(),
                saved.display()
            )
        }
    };
    write_status(&mut out, &mut err, &status, cli.json)?;

    Ok(())
}

/// Writes the report to `out`: a per-email listing, or one JSON document.
///
/// Per-item problems go to `err` in listing mode.
fn write_report<O: Write, E: Write>(
    out: &mut O,
    err: &mut E,
    report: &ScanReport,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
        return Ok(());
    }

    for message in &report.messages {
        writeln!(
            out,
            "Subject: {}",
            message.subject.as_deref().unwrap_or("(no subject)")
        )?;
        writeln!(out, "Date: {}", message.date.as_deref().unwrap_or("(unknown)"))?;
        for outcome in &message.attachments {
            match outcome {
                ItemOutcome::Kept { filename } => writeln!(out, "  kept       {}", filename)?,
                ItemOutcome::Discarded { filename, reason } => {
                    writeln!(out, "  discarded  {} ({})", filename, reason)?
                }
                ItemOutcome::ParseError { filename, error } => {
                    writeln!(err, "  error      {}: {}", filename, error)?
                }
                ItemOutcome::SaveError { filename, error } => {
                    writeln!(err, "  not saved  {}: {}", filename, error)?
                }
            }
        }
    }

    for failure in &report.failures {
        writeln!(err, "Warning: email UID {} skipped: {}", failure.uid, failure.error)?;
    }

    Ok(())
}

/// Final status line; kept off stdout in JSON mode so the output stays parseable.
fn write_status<O: Write, E: Write>(
    out: &mut O,
    err: &mut E,
    status: &str,
    json: bool,
) -> std::io::Result<()> {
    if json {
        writeln!(err, "{}", status)
    } else {
        writeln!(out, "{}", status)
    }
}

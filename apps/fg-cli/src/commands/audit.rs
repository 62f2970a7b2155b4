// audit.rs — Audit subcommands: verify, tail, query, export.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use fg_audit::{export_csv, read_all, sink, verify_chain, AuditError, AuditEvent, AuditQuery, Outcome};
use fg_gateway::GatewayConfig;

#[derive(Subcommand)]
pub enum AuditCommands {
    /// Verify the audit log hash chain integrity.
    Verify {
        /// Path to audit log (defaults to .finguard/audit.jsonl).
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Show recent audit events.
    Tail {
        /// Path to audit log (defaults to .finguard/audit.jsonl).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Number of events to show.
        #[arg(short, default_value = "10")]
        n: usize,
    },
    /// Filter audit events.
    Query {
        /// Path to audit log (defaults to .finguard/audit.jsonl).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Exact identity token.
        #[arg(long)]
        user: Option<String>,
        /// Exact tool name.
        #[arg(long)]
        tool: Option<String>,
        /// Outcome (allow, deny, pass, redact, block, success, failure, timeout).
        #[arg(long)]
        outcome: Option<String>,
        /// Inclusive RFC 3339 lower bound (e.g. 2026-08-01T00:00:00Z).
        #[arg(long)]
        since: Option<String>,
        /// Inclusive RFC 3339 upper bound.
        #[arg(long)]
        until: Option<String>,
    },
    /// Export the audit log as CSV.
    Export {
        /// Path to audit log (defaults to .finguard/audit.jsonl).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Output file (stdout when omitted).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub fn execute(cmd: &AuditCommands, config: &GatewayConfig) -> anyhow::Result<()> {
    match cmd {
        AuditCommands::Verify { log } => {
            let path = log.clone().unwrap_or_else(|| config.audit_log.clone());
            if !path.exists() {
                println!("No audit log found at {}", path.display());
                return Ok(());
            }

            match verify_chain(&path) {
                Ok(()) => {
                    let events = read_all(&path)?;
                    println!(
                        "Audit log verified: {} event(s), hash chain intact.",
                        events.len()
                    );
                }
                Err(AuditError::IntegrityViolation {
                    line,
                    expected,
                    actual,
                }) => {
                    println!("INTEGRITY VIOLATION at line {}:", line);
                    println!("  Expected previous_hash: {}", expected);
                    println!("  Actual previous_hash:   {}", actual);
                    println!();
                    println!("The audit log may have been tampered with.");
                    anyhow::bail!("Audit log integrity check failed");
                }
                Err(e) => return Err(e.into()),
            }
        }

        AuditCommands::Tail { log, n } => {
            let path = log.clone().unwrap_or_else(|| config.audit_log.clone());
            if !path.exists() {
                println!("No audit log found at {}", path.display());
                return Ok(());
            }

            let events = read_all(&path)?;
            let start = events.len().saturating_sub(*n);
            print_events(&events[start..]);
        }

        AuditCommands::Query {
            log,
            user,
            tool,
            outcome,
            since,
            until,
        } => {
            let path = log.clone().unwrap_or_else(|| config.audit_log.clone());
            if !path.exists() {
                println!("No audit log found at {}", path.display());
                return Ok(());
            }

            let filter = AuditQuery {
                raw_id: user.clone(),
                tool_name: tool.clone(),
                outcome: outcome.as_deref().map(parse_outcome).transpose()?,
                since: since.as_deref().map(parse_timestamp).transpose()?,
                until: until.as_deref().map(parse_timestamp).transpose()?,
            };

            let events = sink::query(&path, &filter)?;
            if events.is_empty() {
                println!("No matching audit events.");
            } else {
                print_events(&events);
            }
        }

        AuditCommands::Export { log, out } => {
            let path = log.clone().unwrap_or_else(|| config.audit_log.clone());
            if !path.exists() {
                println!("No audit log found at {}", path.display());
                return Ok(());
            }

            match out {
                Some(out_path) => {
                    let mut file = std::fs::File::create(out_path)
                        .with_context(|| format!("cannot create {}", out_path.display()))?;
                    let rows = export_csv(&path, &mut file)?;
                    println!("Exported {} event(s) to {}", rows, out_path.display());
                }
                None => {
                    let mut stdout = std::io::stdout();
                    export_csv(&path, &mut stdout)?;
                }
            }
        }
    }

    Ok(())
}

fn print_events(events: &[AuditEvent]) {
    if events.is_empty() {
        println!("No audit events.");
        return;
    }

    println!(
        "{:<20} {:<14} {:<18} {:<15} {:<9} REASON",
        "TIMESTAMP", "IDENTITY", "TOOL", "STAGE", "OUTCOME"
    );
    println!("{}", "-".repeat(90));

    for event in events {
        println!(
            "{:<20} {:<14} {:<18} {:<15} {:<9} {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.raw_id,
            event.tool_name,
            stage_label(event),
            outcome_label(event),
            event.reason_code.as_deref().unwrap_or("-"),
        );
    }
}

fn stage_label(event: &AuditEvent) -> String {
    serde_json::to_value(event.stage)
        .ok()
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_default()
}

fn outcome_label(event: &AuditEvent) -> String {
    serde_json::to_value(event.outcome)
        .ok()
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_default()
}

fn parse_outcome(text: &str) -> anyhow::Result<Outcome> {
    serde_json::from_value(serde_json::Value::String(text.to_string()))
        .with_context(|| format!("unknown outcome '{}'", text))
}

fn parse_timestamp(text: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .with_context(|| format!("'{}' is not an RFC 3339 timestamp", text))
}

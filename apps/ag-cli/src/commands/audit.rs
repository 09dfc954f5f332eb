// audit.rs — Audit subcommands: verify, tail.

use std::path::PathBuf;

use ag_audit::{AuditError, AuditLog};
use ag_gate::GateConfig;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum AuditCommands {
    /// Verify the audit log hash chain.
    Verify {
        /// Path to audit log (defaults to .ag/audit.jsonl).
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Show recent verdicts.
    Tail {
        /// Path to audit log (defaults to .ag/audit.jsonl).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Number of events to show.
        #[arg(short, default_value = "10")]
        n: usize,
    },
}

pub fn execute(cmd: &AuditCommands, config: &GateConfig) -> anyhow::Result<()> {
    match cmd {
        AuditCommands::Verify { log } => {
            let path = log.clone().unwrap_or_else(|| config.audit_log.clone());
            if !path.exists() {
                println!("No audit log found at {}", path.display());
                return Ok(());
            }

            match AuditLog::verify_chain(&path) {
                Ok(count) => {
                    println!("Audit log verified: {} event(s), hash chain intact.", count);
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

            let recent = AuditLog::tail(&path, *n)?;
            if recent.is_empty() {
                println!("No audit events.");
                return Ok(());
            }

            println!(
                "{:<20} {:<8} {:<16} {:<24} PRINCIPAL",
                "TIMESTAMP", "VERDICT", "KIND", "RESOURCE"
            );
            println!("{}", "-".repeat(96));

            for event in &recent {
                let verdict = match (event.allowed, event.stage.as_deref()) {
                    (true, _) => "allow".to_string(),
                    (false, None) => "deny".to_string(),
                    (false, Some(stage)) => format!("error:{}", stage),
                };
                println!(
                    "{:<20} {:<8} {:<16} {:<24} {}",
                    event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    verdict,
                    event.action_kind.as_deref().unwrap_or("-"),
                    event.resource.as_deref().unwrap_or("-"),
                    event.principal,
                );
            }
        }
    }

    Ok(())
}

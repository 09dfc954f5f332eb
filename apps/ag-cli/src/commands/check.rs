// check.rs — Run one raw action through the gate and record the verdict.

use std::time::Duration;

use ag_audit::AuditLog;
use ag_gate::{EnforcementGate, EnforcementResult, GateConfig, GateError};
use ag_policy::EntityRef;

pub fn execute(
    config: &GateConfig,
    action: &str,
    json: bool,
    no_audit: bool,
    timeout_ms: Option<u64>,
) -> anyhow::Result<()> {
    let gate = EnforcementGate::from_config(config)?;

    let deadline = timeout_ms
        .map(Duration::from_millis)
        .or_else(|| config.evaluation_timeout());
    let outcome = match deadline {
        Some(deadline) => gate.check_with_deadline(action, deadline),
        None => gate.check(action),
    };

    if !no_audit {
        record(config, gate.principal(), &outcome)?;
    }

    match outcome {
        Ok(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
            if !result.allowed {
                anyhow::bail!("action denied by policy");
            }
            Ok(())
        }
        Err(e) => {
            println!("BLOCKED  {}", action);
            println!("  Stage: {}", e.stage());
            println!("  Error: {}", e);
            Err(e.into())
        }
    }
}

/// Append the outcome of a check to the configured audit log.
pub(crate) fn record(
    config: &GateConfig,
    principal: &EntityRef,
    outcome: &Result<EnforcementResult, GateError>,
) -> anyhow::Result<()> {
    let mut log = AuditLog::open(&config.audit_log)?;
    let mut event = match outcome {
        Ok(result) => result.audit_event(),
        Err(e) => e.audit_event(principal),
    };
    log.append(&mut event)?;
    tracing::debug!(path = %log.path().display(), event_id = %event.event_id, "verdict recorded");
    Ok(())
}

pub(crate) fn print_result(result: &EnforcementResult) {
    let verdict = if result.allowed { "ALLOWED" } else { "BLOCKED" };
    println!("{:<8} {}", verdict, result.raw_action);
    println!(
        "  Parsed:   {} on {}",
        result.action, result.request.resource
    );
    println!("  Decision: {}", result.decision);
}

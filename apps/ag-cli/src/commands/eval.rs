// eval.rs — Evaluate a hand-written request, bypassing classification.
//
// Useful when writing policies: shows exactly what the oracle decides for a
// given principal/action/resource triple.

use ag_gate::{EnforcementGate, GateConfig};
use ag_policy::{interpret, AuthorizationRequest, EntityRef};

pub fn execute(config: &GateConfig, action: &str, resource: &str) -> anyhow::Result<()> {
    let gate = EnforcementGate::from_config(config)?;

    let action: EntityRef = action.parse()?;
    let resource: EntityRef = resource.parse()?;
    let request = AuthorizationRequest::new(gate.principal().clone(), action, resource);

    let decision = gate.evaluate_request(&request)?;

    println!("Principal: {}", request.principal);
    println!("Action:    {}", request.action);
    println!("Resource:  {}", request.resource);
    println!("Decision:  {}", decision.effect);
    if !decision.diagnostics.reasons.is_empty() {
        println!("Reasons:   {}", decision.diagnostics.reasons.join(", "));
    }
    for error in &decision.diagnostics.errors {
        println!("Error:     {}", error);
    }
    println!(
        "Verdict:   {}",
        if interpret(&decision) { "ALLOWED" } else { "BLOCKED" }
    );

    Ok(())
}

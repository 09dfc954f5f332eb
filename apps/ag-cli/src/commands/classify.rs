// classify.rs — Show how raw actions map to intents, without touching policy.

use ag_classify::classify_with_rule;

pub fn execute(actions: &[String], json: bool) -> anyhow::Result<()> {
    let classifications: Vec<_> = actions.iter().map(|raw| (raw, classify_with_rule(raw))).collect();

    if json {
        let rows: Vec<_> = classifications
            .iter()
            .map(|(raw, c)| {
                serde_json::json!({
                    "raw_action": raw,
                    "intent": c.intent,
                    "rule": c.rule,
                    "trigger": c.trigger,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:<16} {:<24} {:<16} ACTION", "KIND", "RESOURCE", "RULE");
    println!("{}", "-".repeat(80));
    for (raw, c) in &classifications {
        println!(
            "{:<16} {:<24} {:<16} {}",
            c.intent.action_kind,
            format!("{}::{}", c.intent.resource_type, c.intent.resource_id),
            c.rule,
            raw,
        );
    }

    Ok(())
}

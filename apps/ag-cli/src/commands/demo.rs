// demo.rs — Check a fixed set of representative agent actions.

use ag_gate::{EnforcementGate, GateConfig};

use super::check;

/// Representative actions: harmless UI input mixed with shell access and
/// destructive commands.
const DEMO_ACTIONS: &[&str] = &[
    "pyautogui.click(500, 300)",
    r#"pyautogui.typewrite("hello world")"#,
    r#"subprocess.run(["rm", "-rf", "/home/user/Documents"])"#,
    r#"os.system("gnome-terminal")"#,
    r#"pyautogui.hotkey("ctrl", "t")"#,
];

pub fn execute(config: &GateConfig, no_audit: bool) -> anyhow::Result<()> {
    let gate = EnforcementGate::from_config(config)?;

    println!("{}", "=".repeat(60));
    println!("POLICY ENFORCEMENT DEMO");
    println!("  Principal: {}", gate.principal());
    println!("  Policy:    {}", config.policy_path.display());
    println!("  Entities:  {}", config.entities_path.display());
    println!("{}", "=".repeat(60));

    let mut blocked = 0;
    for action in DEMO_ACTIONS {
        println!();
        let outcome = gate.check(action);
        if !no_audit {
            check::record(config, gate.principal(), &outcome)?;
        }
        match &outcome {
            Ok(result) => {
                check::print_result(result);
                if !result.allowed {
                    blocked += 1;
                }
            }
            Err(e) => {
                blocked += 1;
                println!("BLOCKED  {}", action);
                println!("  Error:    {}", e);
            }
        }
    }

    println!();
    println!(
        "{} of {} action(s) blocked.",
        blocked,
        DEMO_ACTIONS.len()
    );

    Ok(())
}

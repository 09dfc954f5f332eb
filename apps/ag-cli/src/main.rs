//! # ag-cli
//!
//! Command-line driver for Agent Gate.
//!
//! - `ag classify <ACTION>...` — show how raw actions are classified
//! - `ag check <ACTION>` — run an action through the gate and record the verdict
//! - `ag demo` — check the demonstration actions
//! - `ag eval` — evaluate a hand-written request directly against the policy
//! - `ag audit verify/tail` — inspect the tamper-evident audit trail

mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ag_gate::GateConfig;
use ag_policy::EntityRef;

/// Agent Gate — policy enforcement for free-form agent actions.
#[derive(Parser)]
#[command(name = "ag", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, global = true, default_value = ".")]
    project_root: PathBuf,

    /// Policy file (overrides .ag/gate.toml).
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    /// Entity JSON file (overrides .ag/gate.toml).
    #[arg(long, global = true)]
    entities: Option<PathBuf>,

    /// Principal to check actions for, e.g. 'Agent::"osworld-agent"'.
    #[arg(long, global = true)]
    principal: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify raw actions without evaluating policy.
    Classify {
        /// Raw action strings.
        #[arg(required = true)]
        actions: Vec<String>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Check a raw action against policy.
    Check {
        /// The raw action string emitted by the agent.
        action: String,
        /// Print the full enforcement record as JSON.
        #[arg(long)]
        json: bool,
        /// Don't append the verdict to the audit log.
        #[arg(long)]
        no_audit: bool,
        /// Evaluation deadline in milliseconds (overrides config).
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Check the demonstration actions and print each verdict.
    Demo {
        /// Don't append verdicts to the audit log.
        #[arg(long)]
        no_audit: bool,
    },
    /// Evaluate a raw request against the loaded policy.
    Eval {
        /// Action entity, e.g. 'Action::"click"'.
        #[arg(long)]
        action: String,
        /// Resource entity, e.g. 'App::"chrome"'.
        #[arg(long)]
        resource: String,
    },
    /// Inspect the audit trail.
    Audit {
        #[command(subcommand)]
        command: commands::audit::AuditCommands,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't mix with command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("ag_gate=info".parse()?)
                .add_directive("ag=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let project_root = cli
        .project_root
        .canonicalize()
        .unwrap_or_else(|_| cli.project_root.clone());
    let config = resolve_config(&cli, &project_root)?;

    match &cli.command {
        Commands::Classify { actions, json } => commands::classify::execute(actions, *json),
        Commands::Check {
            action,
            json,
            no_audit,
            timeout_ms,
        } => commands::check::execute(&config, action, *json, *no_audit, *timeout_ms),
        Commands::Demo { no_audit } => commands::demo::execute(&config, *no_audit),
        Commands::Eval { action, resource } => commands::eval::execute(&config, action, resource),
        Commands::Audit { command } => commands::audit::execute(command, &config),
    }
}

/// Project config with command-line overrides applied.
fn resolve_config(cli: &Cli, project_root: &Path) -> anyhow::Result<GateConfig> {
    let mut config = GateConfig::load_or_default(project_root)?;
    if let Some(policy) = &cli.policy {
        config.policy_path = policy.clone();
    }
    if let Some(entities) = &cli.entities {
        config.entities_path = entities.clone();
    }
    if let Some(principal) = &cli.principal {
        config.principal = principal.parse::<EntityRef>()?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn overrides_apply_on_top_of_project_layout() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from([
            "ag",
            "--policy",
            "/etc/ag/policy.cedar",
            "--principal",
            r#"Agent::"reviewer""#,
            "classify",
            "pyautogui.click(1,1)",
        ]);

        let config = resolve_config(&cli, dir.path()).unwrap();
        assert_eq!(config.policy_path, PathBuf::from("/etc/ag/policy.cedar"));
        assert_eq!(config.entities_path, dir.path().join(".ag/entities.json"));
        assert_eq!(config.principal.id(), "reviewer");
    }

    #[test]
    fn project_root_accepted_after_subcommand() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".ag")).unwrap();
        std::fs::write(
            dir.path().join(".ag/gate.toml"),
            "policy_path = \"rules/agent.cedar\"\n",
        )
        .unwrap();

        let root = dir.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["ag", "check", "pyautogui.click(1,1)", "--project-root", root])
            .unwrap();
        assert_eq!(cli.project_root, dir.path());

        let config = resolve_config(&cli, &cli.project_root).unwrap();
        assert_eq!(config.policy_path, dir.path().join("rules/agent.cedar"));
    }

    #[test]
    fn malformed_principal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from(["ag", "--principal", "osworld-agent", "demo"]);
        assert!(resolve_config(&cli, dir.path()).is_err());
    }
}

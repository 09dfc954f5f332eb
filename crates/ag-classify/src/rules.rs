// rules.rs — Ordered classification rule table.
//
// Classification walks RULES top to bottom and stops at the first rule with
// a trigger contained in the lower-cased action string:
//
// 1. "subprocess" / "os.system"              → execute_command on App::terminal
// 2. "remove" / "delete" / "rm "             → delete_file     on App::filesystem
// 3. "terminal" / "bash" / "gnome-terminal"  → open_app        on App::terminal
// 4. "typewrite" / "write" / "hotkey"        → type_text       on App::chrome
// 5. (no match)                              → click           on App::chrome
//
// The order is part of the contract. Each rule must dominate every rule
// below it; reordering changes verdicts.

use crate::intent::{ActionKind, ParsedIntent};

/// One entry in the classifier's priority list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationRule {
    /// Short stable name, used in logs and diagnostics.
    pub name: &'static str,
    /// Lower-case substrings; any one of them triggers the rule.
    pub triggers: &'static [&'static str],
    pub action_kind: ActionKind,
    pub resource_type: &'static str,
    pub resource_id: &'static str,
}

impl ClassificationRule {
    /// Returns the first trigger contained in `lowered`, if any.
    pub fn matches(&self, lowered: &str) -> Option<&'static str> {
        self.triggers.iter().copied().find(|t| lowered.contains(t))
    }

    /// The intent this rule produces.
    pub fn intent(&self) -> ParsedIntent {
        ParsedIntent::new(self.action_kind, self.resource_type, self.resource_id)
    }
}

const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "shell_exec",
        triggers: &["subprocess", "os.system"],
        action_kind: ActionKind::ExecuteCommand,
        resource_type: "App",
        resource_id: "terminal",
    },
    ClassificationRule {
        name: "file_delete",
        triggers: &["remove", "delete", "rm "],
        action_kind: ActionKind::DeleteFile,
        resource_type: "App",
        resource_id: "filesystem",
    },
    ClassificationRule {
        name: "terminal_open",
        triggers: &["terminal", "bash", "gnome-terminal"],
        action_kind: ActionKind::OpenApp,
        resource_type: "App",
        resource_id: "terminal",
    },
    ClassificationRule {
        name: "text_input",
        triggers: &["typewrite", "write", "hotkey"],
        action_kind: ActionKind::TypeText,
        resource_type: "App",
        resource_id: "chrome",
    },
];

/// Fallback when no rule matches. Has no triggers.
const DEFAULT_RULE: ClassificationRule = ClassificationRule {
    name: "default_click",
    triggers: &[],
    action_kind: ActionKind::Click,
    resource_type: "App",
    resource_id: "chrome",
};

/// The trigger rules in priority order (the default rule is not included).
pub fn rules() -> &'static [ClassificationRule] {
    RULES
}

/// A classification together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub intent: ParsedIntent,
    /// Name of the matching rule, or "default_click" for the fallback.
    pub rule: &'static str,
    /// The trigger that fired. `None` for the fallback.
    pub trigger: Option<&'static str>,
}

/// Classify a raw action string into a structured intent.
///
/// Never fails: unmatched input falls through to a click on chrome.
pub fn classify(raw: &str) -> ParsedIntent {
    classify_with_rule(raw).intent
}

/// Classify and report which rule and trigger matched.
pub fn classify_with_rule(raw: &str) -> Classification {
    let lowered = raw.to_lowercase();

    for rule in RULES {
        if let Some(trigger) = rule.matches(&lowered) {
            tracing::debug!(rule = rule.name, trigger, "action classified");
            return Classification {
                intent: rule.intent(),
                rule: rule.name,
                trigger: Some(trigger),
            };
        }
    }

    tracing::debug!(rule = DEFAULT_RULE.name, "no trigger matched, using default");
    Classification {
        intent: DEFAULT_RULE.intent(),
        rule: DEFAULT_RULE.name,
        trigger: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_intent(raw: &str, kind: ActionKind, resource_id: &str) {
        let intent = classify(raw);
        assert_eq!(intent.action_kind, kind, "classifying {:?}", raw);
        assert_eq!(intent.resource_type, "App");
        assert_eq!(intent.resource_id, resource_id, "classifying {:?}", raw);
    }

    #[test]
    fn click_is_default() {
        assert_intent("pyautogui.click(500, 300)", ActionKind::Click, "chrome");
    }

    #[test]
    fn subprocess_beats_rm() {
        assert_intent(
            r#"subprocess.run(["rm", "-rf", "/home/user/Documents"])"#,
            ActionKind::ExecuteCommand,
            "terminal",
        );
    }

    #[test]
    fn os_system_beats_terminal_open() {
        assert_intent(
            r#"os.system("gnome-terminal")"#,
            ActionKind::ExecuteCommand,
            "terminal",
        );
    }

    #[test]
    fn hotkey_is_type_text() {
        assert_intent(
            r#"pyautogui.hotkey("ctrl", "t")"#,
            ActionKind::TypeText,
            "chrome",
        );
    }

    #[test]
    fn typewrite_is_type_text() {
        assert_intent(
            r#"pyautogui.typewrite("hello world")"#,
            ActionKind::TypeText,
            "chrome",
        );
    }

    #[test]
    fn delete_triggers() {
        assert_intent("os.remove('/tmp/x')", ActionKind::DeleteFile, "filesystem");
        assert_intent("press DELETE key", ActionKind::DeleteFile, "filesystem");
        assert_intent("rm /tmp/x", ActionKind::DeleteFile, "filesystem");
    }

    #[test]
    fn rm_requires_trailing_space() {
        // "rm" inside a word must not trigger the delete rule.
        assert_intent("pyautogui.click(confirm)", ActionKind::Click, "chrome");
        assert_intent("rm", ActionKind::Click, "chrome");
    }

    #[test]
    fn terminal_open_triggers() {
        assert_intent("launch bash", ActionKind::OpenApp, "terminal");
        assert_intent("open Terminal", ActionKind::OpenApp, "terminal");
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_intent("SUBPROCESS.Popen('x')", ActionKind::ExecuteCommand, "terminal");
        assert_intent("PyAutoGUI.HotKey('ctrl', 'c')", ActionKind::TypeText, "chrome");
    }

    #[test]
    fn total_on_odd_input() {
        let garbage = String::from_utf8_lossy(&[0xff, 0x00, 0xfe, 0x80, 0x41]).into_owned();
        for raw in ["", " ", "日本語のテキスト", "\u{0}\u{1}\n\t", garbage.as_str()] {
            let intent = classify(raw);
            assert_eq!(intent.action_kind, ActionKind::Click);
        }
    }

    #[test]
    fn earlier_rules_dominate_later_ones() {
        // Pair every trigger with every trigger of each later rule; the
        // earlier rule must always win.
        for (i, higher) in RULES.iter().enumerate() {
            for lower in &RULES[i + 1..] {
                for h in higher.triggers {
                    for l in lower.triggers {
                        for raw in [format!("{} {}", h, l), format!("{} {}", l, h)] {
                            assert_eq!(
                                classify(&raw).action_kind,
                                higher.action_kind,
                                "{:?} should classify as {}",
                                raw,
                                higher.name
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn classify_is_deterministic() {
        let raw = r#"subprocess.call("bash")"#;
        assert_eq!(classify(raw), classify(raw));
    }

    #[test]
    fn reports_matching_rule_and_trigger() {
        let c = classify_with_rule(r#"os.system("ls")"#);
        assert_eq!(c.rule, "shell_exec");
        assert_eq!(c.trigger, Some("os.system"));

        let c = classify_with_rule("pyautogui.moveTo(1, 2)");
        assert_eq!(c.rule, "default_click");
        assert_eq!(c.trigger, None);
    }

    #[test]
    fn rule_table_order() {
        let kinds: Vec<ActionKind> = rules().iter().map(|r| r.action_kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::ExecuteCommand,
                ActionKind::DeleteFile,
                ActionKind::OpenApp,
                ActionKind::TypeText,
            ]
        );
    }
}

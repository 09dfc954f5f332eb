// gate.rs — The enforcement gate.
//
// EnforcementGate owns the oracle and its loaded configuration (policy set,
// entity graph, principal). Configuration is read once at construction and
// is immutable afterwards. Each check is a single pass:
//
//   raw action → classify → build request → oracle.evaluate → interpret
//
// There is no per-call mutable state, so a gate can be cloned (cheaply,
// via Arc) and used from many threads at once without locking.
//
// The one shared counter is the number of deadline workers in flight. A
// worker that misses its deadline keeps running until the oracle returns,
// so the counter caps how many such threads can pile up behind a hung
// oracle. Once the cap is reached, bounded checks fail closed instead of
// spawning.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ag_audit::hasher;
use ag_classify::{classify, classify_with_rule, ParsedIntent};
use ag_policy::{
    build, default_principal, interpret, AuthorizationRequest, CedarOracle, Decision, EntityRef,
    PolicyError, PolicyOracle,
};

use crate::config::{GateConfig, DEFAULT_EVALUATION_WORKERS};
use crate::error::GateError;
use crate::result::EnforcementResult;

/// Immutable state shared by every clone of a gate.
///
/// Held behind an `Arc` (atomically reference-counted pointer): cloning the
/// gate bumps a counter instead of re-parsing policies, and the state is
/// freed when the last clone is dropped.
struct Loaded<O: PolicyOracle> {
    oracle: O,
    policies: O::PolicySet,
    entities: O::Entities,
    principal: EntityRef,
    config_digest: String,
}

/// Policy enforcement gate for free-form agent actions.
pub struct EnforcementGate<O: PolicyOracle = CedarOracle> {
    inner: Arc<Loaded<O>>,
    /// Deadline workers currently running, shared by every clone.
    in_flight: Arc<AtomicUsize>,
    max_workers: usize,
}

impl<O: PolicyOracle> Clone for EnforcementGate<O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            in_flight: Arc::clone(&self.in_flight),
            max_workers: self.max_workers,
        }
    }
}

/// A claimed worker slot. Released on drop, including when the worker
/// thread unwinds from a panicking oracle.
struct WorkerSlot(Arc<AtomicUsize>);

impl WorkerSlot {
    /// Take a slot if fewer than `max` are held.
    ///
    /// `fetch_update` retries the compare-and-swap until it wins, so two
    /// threads racing for the last slot cannot both get it.
    fn claim(counter: &Arc<AtomicUsize>, max: usize) -> Option<Self> {
        counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .ok()
            .map(|_| WorkerSlot(Arc::clone(counter)))
    }
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl EnforcementGate<CedarOracle> {
    /// Cedar-backed gate for the default principal.
    pub fn new(
        policy_path: impl AsRef<Path>,
        entities_path: impl AsRef<Path>,
    ) -> Result<Self, GateError> {
        Self::with_oracle(
            CedarOracle::new(),
            policy_path,
            entities_path,
            default_principal(),
        )
    }

    /// Cedar-backed gate from a [`GateConfig`].
    pub fn from_config(config: &GateConfig) -> Result<Self, GateError> {
        let gate = Self::with_oracle(
            CedarOracle::new(),
            &config.policy_path,
            &config.entities_path,
            config.principal.clone(),
        )?;
        Ok(gate.with_evaluation_workers(config.evaluation_workers))
    }
}

impl<O: PolicyOracle> EnforcementGate<O> {
    /// Read the policy and entity files and load them through `oracle`.
    pub fn with_oracle(
        oracle: O,
        policy_path: impl AsRef<Path>,
        entities_path: impl AsRef<Path>,
        principal: EntityRef,
    ) -> Result<Self, GateError> {
        let policy_path = policy_path.as_ref();
        let entities_path = entities_path.as_ref();

        // Read both files up front so the digest covers exactly the text the
        // oracle parsed.
        let policy_text = std::fs::read_to_string(policy_path)
            .map_err(|e| GateError::config_load(policy_path, e))?;
        let entity_text = std::fs::read_to_string(entities_path)
            .map_err(|e| GateError::config_load(entities_path, e))?;

        let policies = oracle
            .load_policies(&policy_text)
            .map_err(|e| GateError::config_load(policy_path, e))?;
        let entities = oracle
            .load_entities(&entity_text)
            .map_err(|e| GateError::config_load(entities_path, e))?;

        tracing::info!(
            oracle = oracle.name(),
            policies = %policy_path.display(),
            entities = %entities_path.display(),
            principal = %principal,
            "enforcement gate loaded"
        );

        Ok(Self::assemble(
            oracle,
            policies,
            entities,
            principal,
            &policy_text,
            &entity_text,
        ))
    }

    /// Build a gate from in-memory policy and entity sources.
    pub fn from_sources(
        oracle: O,
        policy_source: &str,
        entity_source: &str,
        principal: EntityRef,
    ) -> Result<Self, GateError> {
        let policies = oracle
            .load_policies(policy_source)
            .map_err(|e| GateError::config_load("<policy source>", e))?;
        let entities = oracle
            .load_entities(entity_source)
            .map_err(|e| GateError::config_load("<entity source>", e))?;
        Ok(Self::assemble(
            oracle,
            policies,
            entities,
            principal,
            policy_source,
            entity_source,
        ))
    }

    fn assemble(
        oracle: O,
        policies: O::PolicySet,
        entities: O::Entities,
        principal: EntityRef,
        policy_text: &str,
        entity_text: &str,
    ) -> Self {
        let config_digest = hasher::hash_parts(&[oracle.name(), policy_text, entity_text]);
        Self {
            inner: Arc::new(Loaded {
                oracle,
                policies,
                entities,
                principal,
                config_digest,
            }),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_workers: DEFAULT_EVALUATION_WORKERS,
        }
    }

    /// Cap concurrent deadline workers for this gate and its clones.
    ///
    /// A cap of zero makes every [`check_with_deadline`](Self::check_with_deadline)
    /// call fail closed.
    pub fn with_evaluation_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Deadline workers currently running, including ones whose caller has
    /// already timed out.
    pub fn evaluations_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Check a raw action against the loaded policy.
    ///
    /// `Ok` always carries a verdict; `Err` means no verdict could be
    /// reached and the action must be blocked.
    pub fn check(&self, raw_action: &str) -> Result<EnforcementResult, GateError> {
        let classification = classify_with_rule(raw_action);
        self.enforce(raw_action, classification.intent, classification.rule)
    }

    /// Steps after classification: build, evaluate, interpret.
    fn enforce(
        &self,
        raw_action: &str,
        intent: ParsedIntent,
        rule: &'static str,
    ) -> Result<EnforcementResult, GateError> {
        let request = build(&intent, &self.inner.principal).map_err(|source| {
            tracing::warn!(stage = "build", error = %source, "action blocked");
            GateError::InvalidIdentifier {
                raw_action: raw_action.to_string(),
                source,
            }
        })?;

        let decision = self.evaluate_request(&request).map_err(|source| {
            tracing::warn!(stage = "evaluate", error = %source, "action blocked");
            GateError::PolicyEvaluation {
                raw_action: raw_action.to_string(),
                source,
            }
        })?;

        let allowed = interpret(&decision);
        if allowed {
            tracing::debug!(
                action = %intent.action_kind,
                resource = %request.resource,
                rule,
                "action allowed"
            );
        } else {
            tracing::warn!(
                action = %intent.action_kind,
                resource = %request.resource,
                rule,
                effect = %decision.effect,
                "action denied"
            );
        }

        Ok(EnforcementResult {
            allowed,
            action: intent.action_kind,
            resource: intent.resource_id,
            decision,
            raw_action: raw_action.to_string(),
            request,
            config_digest: self.inner.config_digest.clone(),
        })
    }

    /// Fail-closed verdict: any error is `false`.
    pub fn is_allowed(&self, raw_action: &str) -> bool {
        verdict(self.check(raw_action))
    }

    /// Evaluate an already-built request against the loaded configuration.
    pub fn evaluate_request(&self, request: &AuthorizationRequest) -> Result<Decision, PolicyError> {
        let inner = &*self.inner;
        inner
            .oracle
            .evaluate(request, &inner.policies, &inner.entities)
    }

    /// Classify without evaluating.
    pub fn classify(&self, raw_action: &str) -> ParsedIntent {
        classify(raw_action)
    }

    pub fn principal(&self) -> &EntityRef {
        &self.inner.principal
    }

    /// Digest of the oracle name, policy text, and entity text.
    pub fn config_digest(&self) -> &str {
        &self.inner.config_digest
    }

    pub fn oracle_name(&self) -> &str {
        self.inner.oracle.name()
    }
}

impl<O> EnforcementGate<O>
where
    O: PolicyOracle + 'static,
    O::PolicySet: 'static,
    O::Entities: 'static,
{
    /// Like [`check`](Self::check), but gives up after `deadline`.
    ///
    /// Evaluation runs on a worker thread. On timeout the worker is left to
    /// finish in the background and its result is discarded; it keeps its
    /// worker slot until then. When every slot is taken the check fails
    /// with [`GateError::PolicyEvaluation`] without spawning.
    pub fn check_with_deadline(
        &self,
        raw_action: &str,
        deadline: Duration,
    ) -> Result<EnforcementResult, GateError> {
        let slot = WorkerSlot::claim(&self.in_flight, self.max_workers).ok_or_else(|| {
            tracing::warn!(
                max_workers = self.max_workers,
                "evaluation worker limit reached, action blocked"
            );
            GateError::PolicyEvaluation {
                raw_action: raw_action.to_string(),
                source: PolicyError::Evaluation(format!(
                    "evaluation worker limit reached ({} in flight)",
                    self.max_workers
                )),
            }
        })?;

        let (tx, rx) = mpsc::channel();
        let gate = self.clone();
        let owned = raw_action.to_string();

        thread::Builder::new()
            .name("ag-evaluate".to_string())
            .spawn(move || {
                let slot = slot;
                let outcome = gate.check(&owned);
                // Free the slot before reporting, so a caller that sees the
                // result also sees the worker gone.
                drop(slot);
                // The receiver may have timed out and gone away.
                let _ = tx.send(outcome);
            })
            .map_err(|e| GateError::PolicyEvaluation {
                raw_action: raw_action.to_string(),
                source: PolicyError::Evaluation(format!("failed to start evaluation worker: {}", e)),
            })?;

        match rx.recv_timeout(deadline) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(?deadline, "policy evaluation timed out, action blocked");
                Err(GateError::Timeout {
                    raw_action: raw_action.to_string(),
                    deadline,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(GateError::PolicyEvaluation {
                raw_action: raw_action.to_string(),
                source: PolicyError::Evaluation(
                    "evaluation worker exited without a result".to_string(),
                ),
            }),
        }
    }
}

/// Fail-closed reading of a check outcome.
fn verdict(outcome: Result<EnforcementResult, GateError>) -> bool {
    match outcome {
        Ok(result) => result.allowed,
        Err(e) => {
            tracing::warn!(stage = %e.stage(), error = %e, "check failed, treating as deny");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_classify::ActionKind;
    use ag_policy::{Effect, RequestError};

    use crate::error::Stage;

    /// Oracle that answers from the action id: "execute_command" → Deny,
    /// "delete_file" → Indeterminate, "open_app" → error, everything else
    /// Allow. Policy and entity sources are ignored.
    struct ScriptedOracle;

    impl PolicyOracle for ScriptedOracle {
        type PolicySet = ();
        type Entities = ();

        fn name(&self) -> &str {
            "scripted"
        }

        fn load_policies(&self, _source: &str) -> Result<(), PolicyError> {
            Ok(())
        }

        fn load_entities(&self, _source: &str) -> Result<(), PolicyError> {
            Ok(())
        }

        fn evaluate(
            &self,
            request: &AuthorizationRequest,
            _policies: &(),
            _entities: &(),
        ) -> Result<Decision, PolicyError> {
            match request.action.id() {
                "execute_command" => Ok(Decision::deny().with_reason("no-shell")),
                "delete_file" => Ok(Decision::indeterminate().with_error("attr missing")),
                "open_app" => Err(PolicyError::Evaluation("engine fault".to_string())),
                _ => Ok(Decision::allow().with_reason("disallow-nothing")),
            }
        }
    }

    fn gate() -> EnforcementGate<ScriptedOracle> {
        EnforcementGate::from_sources(ScriptedOracle, "", "", default_principal()).unwrap()
    }

    #[test]
    fn allow_produces_full_record() {
        let result = gate().check("pyautogui.click(500, 300)").unwrap();
        assert!(result.allowed);
        assert_eq!(result.action, ActionKind::Click);
        assert_eq!(result.resource, "chrome");
        assert_eq!(result.raw_action, "pyautogui.click(500, 300)");
        assert_eq!(result.request.action.to_string(), r#"Action::"click""#);
        assert_eq!(result.decision.effect, Effect::Allow);
    }

    #[test]
    fn deny_is_not_allowed() {
        let result = gate().check(r#"subprocess.run(["ls"])"#).unwrap();
        assert!(!result.allowed);
        assert_eq!(result.action, ActionKind::ExecuteCommand);
        assert_eq!(result.resource, "terminal");
    }

    #[test]
    fn indeterminate_fails_closed() {
        let result = gate().check("delete the file").unwrap();
        assert_eq!(result.decision.effect, Effect::Indeterminate);
        assert!(!result.allowed);
    }

    #[test]
    fn oracle_error_propagates_with_context() {
        let err = gate().check("open bash").unwrap_err();
        match &err {
            GateError::PolicyEvaluation { raw_action, .. } => assert_eq!(raw_action, "open bash"),
            other => panic!("expected PolicyEvaluation, got {:?}", other),
        }
        assert!(!gate().is_allowed("open bash"));
    }

    #[test]
    fn unencodable_intent_is_blocked_at_build() {
        let g = gate();
        let intent = ParsedIntent::new(ActionKind::Click, "App", r#"chrome" || true"#);
        let err = g.enforce("pyautogui.click(1,1)", intent, "custom").unwrap_err();

        match &err {
            GateError::InvalidIdentifier { raw_action, source } => {
                assert_eq!(raw_action, "pyautogui.click(1,1)");
                assert!(matches!(source, RequestError::InvalidIdentifier { .. }));
            }
            other => panic!("expected InvalidIdentifier, got {:?}", other),
        }
        assert_eq!(err.stage(), Stage::Build);
        assert_eq!(err.raw_action(), Some("pyautogui.click(1,1)"));

        let event = err.audit_event(g.principal());
        assert_eq!(event.stage.as_deref(), Some("build"));
        assert!(!event.allowed);

        assert!(!verdict(Err(err)));
    }

    #[test]
    fn bad_resource_type_is_blocked_at_build() {
        let intent = ParsedIntent::new(ActionKind::OpenApp, "not a type", "terminal");
        let err = gate().enforce("open it", intent, "custom").unwrap_err();
        assert!(matches!(err, GateError::InvalidIdentifier { .. }));
        assert_eq!(err.stage(), Stage::Build);
    }

    #[test]
    fn checks_are_deterministic() {
        let g = gate();
        for raw in ["pyautogui.click(1,1)", "os.system('x')", "delete", ""] {
            let a = g.check(raw).ok();
            let b = g.check(raw).ok();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn principal_is_constant_across_checks() {
        let principal = EntityRef::new("Agent", "tenant-b").unwrap();
        let g = EnforcementGate::from_sources(ScriptedOracle, "", "", principal.clone()).unwrap();
        for raw in ["pyautogui.click(1,1)", "subprocess.run('x')", "typewrite('a')"] {
            assert_eq!(g.check(raw).unwrap().request.principal, principal);
        }
        assert_eq!(g.principal(), &principal);
    }

    #[test]
    fn concurrent_checks_share_one_gate() {
        let g = gate();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let g = g.clone();
                thread::spawn(move || {
                    let raw = if i % 2 == 0 { "pyautogui.click(1,1)" } else { "os.system('ls')" };
                    g.check(raw).unwrap().allowed
                })
            })
            .collect();
        let verdicts: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for (i, allowed) in verdicts.into_iter().enumerate() {
            assert_eq!(allowed, i % 2 == 0);
        }
    }

    #[test]
    fn deadline_path_returns_same_result() {
        let g = gate();
        let direct = g.check("pyautogui.click(1,1)").unwrap();
        let bounded = g
            .check_with_deadline("pyautogui.click(1,1)", Duration::from_secs(5))
            .unwrap();
        assert_eq!(direct, bounded);
    }

    #[test]
    fn config_digest_tracks_sources() {
        let a = EnforcementGate::from_sources(ScriptedOracle, "p1", "e", default_principal()).unwrap();
        let b = EnforcementGate::from_sources(ScriptedOracle, "p2", "e", default_principal()).unwrap();
        assert_ne!(a.config_digest(), b.config_digest());
        assert_eq!(a.config_digest(), a.clone().config_digest());
    }
}

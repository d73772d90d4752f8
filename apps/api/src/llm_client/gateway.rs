//! Inference Gateway: drives the fallback cascade over the configured tiers.
//!
//! Flow: for each tier in order → invoke under its timeout budget →
//!       first Success wins → otherwise warn and advance → AllTiersExhausted.
//!
//! A tier is attempted at most once per dispatch. Nothing here retries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::{AdapterOutcome, BackendAdapter, MockAdapter, Prompt, ResponseEnvelope};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("tier '{tier}' unavailable: {reason}")]
    AdapterUnavailable { tier: String, reason: String },

    #[error("tier '{tier}' timed out after {budget_ms}ms")]
    AdapterTimeout { tier: String, budget_ms: u128 },

    #[error("all inference tiers exhausted ({} attempted)", failures.len())]
    AllTiersExhausted { failures: Vec<GatewayError> },
}

/// One backend in the cascade, with its timeout budget. `None` means the tier
/// runs until the backend answers (last-resort tiers only).
#[derive(Clone)]
pub struct Tier {
    pub adapter: Arc<dyn BackendAdapter>,
    pub timeout: Option<Duration>,
}

impl Tier {
    pub fn new(adapter: Arc<dyn BackendAdapter>, timeout: Option<Duration>) -> Self {
        Self { adapter, timeout }
    }
}

/// Process-wide cascade configuration. Built once at startup, read-only after.
#[derive(Clone, Default)]
pub struct GatewayConfig {
    pub tiers: Vec<Tier>,
    /// Disconnected/dev mode. When set, a `MockAdapter` tier runs after all real tiers.
    pub mock_enabled: bool,
}

impl GatewayConfig {
    pub fn new(tiers: Vec<Tier>, mock_enabled: bool) -> Self {
        Self {
            tiers,
            mock_enabled,
        }
    }
}

pub struct InferenceGateway {
    tiers: Vec<Tier>,
}

impl InferenceGateway {
    pub fn new(config: GatewayConfig) -> Self {
        let mut tiers = config.tiers;
        if config.mock_enabled {
            tiers.push(Tier::new(Arc::new(MockAdapter), None));
        }
        Self { tiers }
    }

    /// Tier labels in cascade order.
    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(|t| t.adapter.name()).collect()
    }

    /// Runs the cascade for one prompt. `preferred_model` overrides the prompt's
    /// own hint and is only forwarded to tiers that support model selection.
    pub async fn dispatch(
        &self,
        prompt: &Prompt,
        preferred_model: Option<&str>,
    ) -> Result<ResponseEnvelope, GatewayError> {
        let started = Instant::now();
        let hint = preferred_model.or(prompt.model_hint.as_deref());
        let mut failures = Vec::new();

        for tier in &self.tiers {
            let adapter = tier.adapter.as_ref();
            let model = hint.filter(|_| adapter.supports_model_selection());

            let outcome = match tier.timeout {
                Some(budget) => {
                    tokio::time::timeout(budget, adapter.invoke(prompt, model, Some(budget)))
                        .await
                        .unwrap_or(AdapterOutcome::Timeout)
                }
                None => adapter.invoke(prompt, model, None).await,
            };

            match outcome {
                AdapterOutcome::Success(content) => {
                    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                    let model_used = adapter.model_id(model);
                    info!(
                        "Tier '{}' answered with model {} in {:.0}ms",
                        adapter.name(),
                        model_used,
                        latency_ms
                    );
                    return Ok(ResponseEnvelope {
                        content,
                        model_used,
                        latency_ms: Some(latency_ms),
                    });
                }
                AdapterOutcome::Unavailable(reason) => {
                    warn!(
                        "Tier '{}' unavailable: {}. Falling back.",
                        adapter.name(),
                        reason
                    );
                    failures.push(GatewayError::AdapterUnavailable {
                        tier: adapter.name().to_string(),
                        reason,
                    });
                }
                AdapterOutcome::Timeout => {
                    let budget_ms = tier.timeout.map(|d| d.as_millis()).unwrap_or_default();
                    warn!(
                        "Tier '{}' timed out after {}ms. Falling back.",
                        adapter.name(),
                        budget_ms
                    );
                    failures.push(GatewayError::AdapterTimeout {
                        tier: adapter.name().to_string(),
                        budget_ms,
                    });
                }
            }
        }

        Err(GatewayError::AllTiersExhausted { failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behaviour {
        Succeed(&'static str),
        Fail,
        TimeOut,
        Sleep(Duration),
    }

    /// Scripted tier that counts its invocations.
    struct ScriptedAdapter {
        name: &'static str,
        behaviour: Behaviour,
        calls: AtomicUsize,
        selects_model: bool,
        seen_model: std::sync::Mutex<Option<String>>,
    }

    impl ScriptedAdapter {
        fn new(name: &'static str, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                name,
                behaviour,
                calls: AtomicUsize::new(0),
                selects_model: false,
                seen_model: std::sync::Mutex::new(None),
            })
        }

        fn with_model_selection(name: &'static str, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                name,
                behaviour,
                calls: AtomicUsize::new(0),
                selects_model: true,
                seen_model: std::sync::Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BackendAdapter for ScriptedAdapter {
        fn name(&self) -> &str {
            self.name
        }

        fn supports_model_selection(&self) -> bool {
            self.selects_model
        }

        fn model_id(&self, model: Option<&str>) -> String {
            model.unwrap_or(self.name).to_string()
        }

        async fn invoke(
            &self,
            _prompt: &Prompt,
            model: Option<&str>,
            _timeout: Option<Duration>,
        ) -> AdapterOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_model.lock().unwrap() = model.map(str::to_string);
            match &self.behaviour {
                Behaviour::Succeed(text) => AdapterOutcome::Success(text.to_string()),
                Behaviour::Fail => AdapterOutcome::Unavailable("connection refused".to_string()),
                Behaviour::TimeOut => AdapterOutcome::Timeout,
                Behaviour::Sleep(d) => {
                    tokio::time::sleep(*d).await;
                    AdapterOutcome::Success("too late".to_string())
                }
            }
        }
    }

    fn tier(adapter: Arc<ScriptedAdapter>) -> Tier {
        Tier::new(adapter, None)
    }

    fn prompt() -> Prompt {
        Prompt::new("system", "user")
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let primary = ScriptedAdapter::new("remote", Behaviour::Succeed("from remote"));
        let secondary = ScriptedAdapter::new("local", Behaviour::Succeed("from local"));
        let gateway = InferenceGateway::new(GatewayConfig::new(
            vec![tier(primary.clone()), tier(secondary.clone())],
            false,
        ));

        let envelope = gateway.dispatch(&prompt(), None).await.unwrap();
        assert_eq!(envelope.content, "from remote");
        assert_eq!(envelope.model_used, "remote");
        assert!(envelope.latency_ms.is_some());
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_falls_back_without_retrying_failed_tier() {
        let primary = ScriptedAdapter::new("remote", Behaviour::Fail);
        let secondary = ScriptedAdapter::new("local", Behaviour::Succeed("from local"));
        let gateway = InferenceGateway::new(GatewayConfig::new(
            vec![tier(primary.clone()), tier(secondary.clone())],
            false,
        ));

        let envelope = gateway.dispatch(&prompt(), None).await.unwrap();
        assert_eq!(envelope.content, "from local");
        assert_eq!(envelope.model_used, "local");
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_tiers_failing_is_exhaustion() {
        let primary = ScriptedAdapter::new("remote", Behaviour::Fail);
        let secondary = ScriptedAdapter::new("local", Behaviour::TimeOut);
        let gateway = InferenceGateway::new(GatewayConfig::new(
            vec![tier(primary), tier(secondary)],
            false,
        ));

        match gateway.dispatch(&prompt(), None).await {
            Err(GatewayError::AllTiersExhausted { failures }) => {
                assert_eq!(failures.len(), 2);
                assert!(matches!(
                    &failures[0],
                    GatewayError::AdapterUnavailable { tier, .. } if tier == "remote"
                ));
                assert!(matches!(
                    &failures[1],
                    GatewayError::AdapterTimeout { tier, .. } if tier == "local"
                ));
            }
            other => panic!("expected AllTiersExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_tiers_is_exhaustion() {
        let gateway = InferenceGateway::new(GatewayConfig::default());
        let err = gateway.dispatch(&prompt(), None).await.unwrap_err();
        assert!(matches!(err, GatewayError::AllTiersExhausted { ref failures } if failures.is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_primary_is_abandoned_at_budget() {
        let primary = ScriptedAdapter::new("remote", Behaviour::Sleep(Duration::from_secs(60)));
        let secondary = ScriptedAdapter::new("local", Behaviour::Succeed("from local"));
        let gateway = InferenceGateway::new(GatewayConfig::new(
            vec![
                Tier::new(primary.clone(), Some(Duration::from_secs(5))),
                tier(secondary.clone()),
            ],
            false,
        ));

        let started = tokio::time::Instant::now();
        let envelope = gateway.dispatch(&prompt(), None).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(envelope.content, "from local");
        assert!(elapsed >= Duration::from_secs(5));
        assert!(elapsed < Duration::from_secs(6), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn test_mock_tier_runs_last_when_enabled() {
        let primary = ScriptedAdapter::new("remote", Behaviour::Fail);
        let secondary = ScriptedAdapter::new("local", Behaviour::Fail);
        let gateway = InferenceGateway::new(GatewayConfig::new(
            vec![tier(primary), tier(secondary)],
            true,
        ));

        assert_eq!(gateway.tier_names(), vec!["remote", "local", "mock"]);
        let envelope = gateway.dispatch(&Prompt::new("s", "hello there"), None).await.unwrap();
        assert_eq!(envelope.model_used, "mock");
        assert_eq!(envelope.content, "[DEV MODE] Mock response for: hello there...");
    }

    #[tokio::test]
    async fn test_mock_tier_absent_when_disabled() {
        let primary = ScriptedAdapter::new("remote", Behaviour::Fail);
        let gateway = InferenceGateway::new(GatewayConfig::new(vec![tier(primary)], false));

        assert_eq!(gateway.tier_names(), vec!["remote"]);
        assert!(gateway.dispatch(&prompt(), None).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_not_reached_when_real_tier_succeeds() {
        let primary = ScriptedAdapter::new("remote", Behaviour::Succeed("real"));
        let gateway = InferenceGateway::new(GatewayConfig::new(vec![tier(primary)], true));

        let envelope = gateway.dispatch(&prompt(), None).await.unwrap();
        assert_eq!(envelope.content, "real");
    }

    #[tokio::test]
    async fn test_model_hint_only_reaches_selecting_tiers() {
        let primary = ScriptedAdapter::with_model_selection("remote", Behaviour::Fail);
        let secondary = ScriptedAdapter::new("local", Behaviour::Succeed("ok"));
        let gateway = InferenceGateway::new(GatewayConfig::new(
            vec![tier(primary.clone()), tier(secondary.clone())],
            false,
        ));

        let envelope = gateway.dispatch(&prompt(), Some("mistral")).await.unwrap();
        assert_eq!(primary.seen_model.lock().unwrap().as_deref(), Some("mistral"));
        assert_eq!(secondary.seen_model.lock().unwrap().as_deref(), None);
        assert_eq!(envelope.model_used, "local");
    }

    #[tokio::test]
    async fn test_preferred_model_overrides_prompt_hint() {
        let primary = ScriptedAdapter::with_model_selection("remote", Behaviour::Succeed("ok"));
        let gateway = InferenceGateway::new(GatewayConfig::new(vec![tier(primary.clone())], false));

        let prompt = prompt().with_model_hint(Some("phi3".to_string()));
        let envelope = gateway.dispatch(&prompt, None).await.unwrap();
        assert_eq!(envelope.model_used, "phi3");

        let envelope = gateway.dispatch(&prompt, Some("mistral")).await.unwrap();
        assert_eq!(envelope.model_used, "mistral");
    }

    #[test]
    fn test_exhaustion_message_counts_attempts() {
        let err = GatewayError::AllTiersExhausted {
            failures: vec![GatewayError::AdapterTimeout {
                tier: "remote".to_string(),
                budget_ms: 5000,
            }],
        };
        assert_eq!(err.to_string(), "all inference tiers exhausted (1 attempted)");
    }
}

//! Checkout scenario simulator.
//!
//! Every call to `/checkout` is turned into one of three outcomes:
//!
//! - **high latency** (10%): completes, but only after 1.6 to 2.1 seconds
//! - **error** (10% of the remaining 90%): inventory failure, HTTP 500,
//!   span marked as an error and tagged `issue_detected="true"`
//! - **normal** (the rest): completes in 0.1 to 0.4 seconds
//!
//! The two probability checks are independent draws made one after the
//! other, so seeded sources replay the same scenario sequence. A checkout is
//! split into [`plan_checkout`], which consumes every random draw up front,
//! and [`run_checkout`], which annotates the span and sleeps.

pub mod random;

pub use random::{RandomSource, ScriptedRandom};

use crate::core::types::{
    ATTR_CUSTOMER_ID, ATTR_ISSUE_DETECTED, ATTR_ORDER_ID, ATTR_SCENARIO, INVENTORY_FAILURE_MESSAGE,
    ISSUE_DETECTED_VALUE,
};
use crate::core::{CheckoutResponse, OrderIdentity, Result, Scenario};
use crate::telemetry::{SpanRecorder, SpanStatusCode};
use parking_lot::Mutex;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

/// Chance of the first draw selecting the high latency scenario.
pub const HIGH_LATENCY_PROBABILITY: f64 = 0.1;
/// Chance of the second draw selecting the error scenario.
pub const ERROR_PROBABILITY: f64 = 0.1;

/// Everything random about one checkout, decided before any side effect.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPlan {
    pub identity: OrderIdentity,
    pub scenario: Scenario,
    pub delay: Duration,
}

impl Scenario {
    /// Base delay and spread in seconds; the delay is `base + r * spread`.
    fn delay_profile(self) -> (f64, f64) {
        match self {
            Scenario::HighLatency => (1.6, 0.5),
            Scenario::Error => (0.1, 0.5),
            Scenario::Normal => (0.1, 0.3),
        }
    }

    fn delay_from(self, r: f64) -> Duration {
        let (base, spread) = self.delay_profile();
        Duration::from_secs_f64(base + r * spread)
    }
}

/// Draw identifiers, scenario and delay for one checkout.
///
/// Draw order: order number, customer number, high latency check, then
/// either the high latency delay or the error check followed by the delay
/// of whichever scenario it lands on.
pub fn plan_checkout<R: RandomSource + ?Sized>(rng: &mut R) -> CheckoutPlan {
    let order_number = rng.int_inclusive(OrderIdentity::ORDER_MIN, OrderIdentity::ORDER_MAX);
    let customer_number =
        rng.int_inclusive(OrderIdentity::CUSTOMER_MIN, OrderIdentity::CUSTOMER_MAX);
    let identity = OrderIdentity::new(order_number, customer_number);

    let scenario = if rng.fraction() < HIGH_LATENCY_PROBABILITY {
        Scenario::HighLatency
    } else if rng.fraction() < ERROR_PROBABILITY {
        Scenario::Error
    } else {
        Scenario::Normal
    };
    let delay = scenario.delay_from(rng.fraction());

    CheckoutPlan {
        identity,
        scenario,
        delay,
    }
}

/// Carry out a planned checkout against the request span.
///
/// Span failures are logged and otherwise ignored; the response is always
/// produced.
pub async fn run_checkout<S>(plan: CheckoutPlan, span: &mut S) -> CheckoutResponse
where
    S: SpanRecorder + ?Sized,
{
    let CheckoutPlan {
        identity,
        scenario,
        delay,
    } = plan;
    let order_id = identity.order_id;

    annotate(span.set_attribute(ATTR_ORDER_ID, order_id.clone()));
    annotate(span.set_attribute(ATTR_CUSTOMER_ID, identity.customer_id));

    match scenario {
        Scenario::HighLatency => {
            tracing::info!("Order {}: Processing slowly...", order_id);
            annotate(span.set_attribute(ATTR_SCENARIO, scenario.as_str().to_string()));
            tokio::time::sleep(delay).await;
            tracing::info!("Order {}: Completed with high latency", order_id);
        },
        Scenario::Error => {
            tracing::error!("Order {}: Failed to process!", order_id);
            annotate(span.set_attribute(ATTR_SCENARIO, scenario.as_str().to_string()));
            annotate(span.set_attribute(ATTR_ISSUE_DETECTED, ISSUE_DETECTED_VALUE.to_string()));
            annotate(span.set_status(SpanStatusCode::Error, INVENTORY_FAILURE_MESSAGE));
            tokio::time::sleep(delay).await;
        },
        Scenario::Normal => {
            tracing::info!("Order {}: Processing normally...", order_id);
            annotate(span.set_attribute(ATTR_SCENARIO, scenario.as_str().to_string()));
            tokio::time::sleep(delay).await;
            tracing::info!("Order {}: Completed successfully", order_id);
        },
    }

    tracing::debug!(
        order_id = %order_id,
        scenario = %scenario,
        delay_secs = delay.as_secs_f64(),
        "Checkout finished"
    );

    CheckoutResponse::for_scenario(order_id, scenario)
}

fn annotate(result: Result<()>) {
    if let Err(e) = result {
        tracing::warn!(category = e.category(), "Span annotation failed: {}", e);
    }
}

/// Random source shared by all requests of a server.
pub type SharedRandom = Arc<Mutex<Box<dyn RandomSource + Send>>>;

/// Checkout simulator with its random source.
#[derive(Clone)]
pub struct Simulator {
    rng: SharedRandom,
}

impl Simulator {
    /// Simulator drawing from an OS-seeded generator.
    pub fn from_entropy() -> Self {
        Self::with_source(StdRng::from_entropy())
    }

    /// Simulator drawing from `source`.
    pub fn with_source<R: RandomSource + Send + 'static>(source: R) -> Self {
        Self {
            rng: Arc::new(Mutex::new(Box::new(source))),
        }
    }

    /// Plan a checkout; the random source is only locked while drawing.
    pub fn plan(&self) -> CheckoutPlan {
        let mut rng = self.rng.lock();
        plan_checkout(&mut **rng)
    }

    /// Handle one `/checkout` request against the request span.
    pub async fn handle_checkout<S>(&self, span: &mut S) -> CheckoutResponse
    where
        S: SpanRecorder + ?Sized,
    {
        let plan = self.plan();
        run_checkout(plan, span).await
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CheckoutStatus, ServiceError};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tokio::time::Instant;

    /// Span double that remembers what was written to it.
    #[derive(Default)]
    struct RecordingSpan {
        attributes: HashMap<&'static str, String>,
        statuses: Vec<(SpanStatusCode, String)>,
        broken: bool,
    }

    impl SpanRecorder for RecordingSpan {
        fn set_attribute(&mut self, key: &'static str, value: String) -> Result<()> {
            if self.broken {
                return Err(ServiceError::telemetry("exporter unavailable"));
            }
            self.attributes.insert(key, value);
            Ok(())
        }

        fn set_status(&mut self, code: SpanStatusCode, message: &str) -> Result<()> {
            if self.broken {
                return Err(ServiceError::telemetry("exporter unavailable"));
            }
            self.statuses.push((code, message.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_high_latency_short_circuits() {
        let mut rng = ScriptedRandom::new([0.05, 0.05]);
        let plan = plan_checkout(&mut rng);

        assert_eq!(plan.scenario, Scenario::HighLatency);
        // Second scripted value feeds the delay, not an error check.
        assert_eq!(rng.fractions_drawn(), 2);
        assert_eq!(plan.delay, Duration::from_secs_f64(1.6 + 0.05 * 0.5));
    }

    #[test]
    fn test_second_draw_selects_error() {
        let mut rng = ScriptedRandom::new([0.5, 0.05, 0.2]);
        let plan = plan_checkout(&mut rng);

        assert_eq!(plan.scenario, Scenario::Error);
        assert_eq!(rng.fractions_drawn(), 3);
        assert_eq!(plan.delay, Duration::from_secs_f64(0.1 + 0.2 * 0.5));
    }

    #[test]
    fn test_both_draws_high_select_normal() {
        let mut rng = ScriptedRandom::new([0.5, 0.5, 0.5]);
        let plan = plan_checkout(&mut rng);

        assert_eq!(plan.scenario, Scenario::Normal);
        assert_eq!(plan.delay, Duration::from_secs_f64(0.1 + 0.5 * 0.3));
    }

    #[test]
    fn test_probability_boundaries() {
        // Checks are strict less-than.
        let plan = plan_checkout(&mut ScriptedRandom::new([0.1, 0.1]));
        assert_eq!(plan.scenario, Scenario::Normal);

        let plan = plan_checkout(&mut ScriptedRandom::new([0.0999, 0.0]));
        assert_eq!(plan.scenario, Scenario::HighLatency);
    }

    #[test]
    fn test_identity_uses_integer_draws() {
        let mut rng = ScriptedRandom::new([0.5, 0.5]).with_ints([99_999, 1_000]);
        let plan = plan_checkout(&mut rng);
        assert_eq!(plan.identity.order_id, "order-99999");
        assert_eq!(plan.identity.customer_id, "cust-1000");
    }

    #[test]
    fn test_scenario_rates_over_many_requests() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut counts: HashMap<Scenario, usize> = HashMap::new();
        let samples = 100_000;

        for _ in 0..samples {
            let plan = plan_checkout(&mut rng);

            let order: u32 = plan.identity.order_id["order-".len()..].parse().unwrap();
            assert!((10_000..=99_999).contains(&order));
            let customer: u32 = plan.identity.customer_id["cust-".len()..].parse().unwrap();
            assert!((1_000..=9_999).contains(&customer));

            let (low, high) = match plan.scenario {
                Scenario::HighLatency => (1.6, 2.1),
                Scenario::Error => (0.1, 0.6),
                Scenario::Normal => (0.1, 0.4),
            };
            let secs = plan.delay.as_secs_f64();
            assert!(secs >= low && secs < high, "{:?} delay {} out of range", plan.scenario, secs);

            *counts.entry(plan.scenario).or_default() += 1;
        }

        let rate = |s: Scenario| counts.get(&s).copied().unwrap_or(0) as f64 / samples as f64;
        assert!((rate(Scenario::HighLatency) - 0.10).abs() < 0.01);
        assert!((rate(Scenario::Error) - 0.09).abs() < 0.01);
        assert!((rate(Scenario::Normal) - 0.81).abs() < 0.01);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_run_annotates_span() {
        let plan = plan_checkout(&mut ScriptedRandom::new([0.5, 0.05, 0.0]).with_ints([12_345, 4_321]));
        let mut span = RecordingSpan::default();

        let start = Instant::now();
        let response = run_checkout(plan, &mut span).await;
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(100) && elapsed < Duration::from_millis(600));
        assert_eq!(response.http_status, 500);
        assert_eq!(response.result.status, CheckoutStatus::Failed);
        assert_eq!(response.result.order_id, "order-12345");
        assert_eq!(response.result.message, "Checkout failed: Inventory unavailable");

        assert_eq!(span.attributes["order.id"], "order-12345");
        assert_eq!(span.attributes["customer.id"], "cust-4321");
        assert_eq!(span.attributes["scenario"], "error");
        assert_eq!(span.attributes["issue_detected"], "true");
        assert_eq!(
            span.statuses,
            vec![(SpanStatusCode::Error, "Checkout failed: Inventory unavailable".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_high_latency_run_sleeps() {
        let plan = plan_checkout(&mut ScriptedRandom::new([0.05, 0.99]));
        let mut span = RecordingSpan::default();

        let start = Instant::now();
        let response = run_checkout(plan, &mut span).await;
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(1600) && elapsed < Duration::from_millis(2100));
        assert_eq!(response.http_status, 200);
        assert_eq!(response.result.message, "Checkout processed slowly");
        assert_eq!(span.attributes["scenario"], "high_latency");
        assert!(!span.attributes.contains_key("issue_detected"));
        assert!(span.statuses.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_normal_run() {
        let plan = plan_checkout(&mut ScriptedRandom::new([0.5, 0.5, 0.9]));
        let mut span = RecordingSpan::default();

        let start = Instant::now();
        let response = run_checkout(plan, &mut span).await;
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(100) && elapsed < Duration::from_millis(400));
        assert_eq!(response.http_status, 200);
        assert_eq!(response.result.status, CheckoutStatus::Completed);
        assert_eq!(response.result.message, "Checkout successful");
        assert_eq!(span.attributes["scenario"], "normal");
        assert!(span.statuses.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_span_failures_do_not_abort_checkout() {
        let simulator = Simulator::with_source(ScriptedRandom::new([0.5, 0.05]));
        let mut span = RecordingSpan {
            broken: true,
            ..RecordingSpan::default()
        };

        let response = simulator.handle_checkout(&mut span).await;

        assert_eq!(response.http_status, 500);
        assert_eq!(response.result.status, CheckoutStatus::Failed);
        assert!(span.attributes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_checkouts_do_not_serialize() {
        let simulator = Simulator::with_source(ScriptedRandom::new([
            0.05, 0.0, // high latency, 1.6s
            0.05, 0.0, // high latency, 1.6s
            0.05, 0.0, // high latency, 1.6s
        ]));

        let start = Instant::now();
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let simulator = simulator.clone();
                tokio::spawn(async move {
                    let mut span = RecordingSpan::default();
                    simulator.handle_checkout(&mut span).await
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().http_status, 200);
        }

        // Three sequential sleeps would take 4.8s.
        assert!(start.elapsed() < Duration::from_millis(2100));
    }
}

//! Per-request domain types for the checkout simulation.
//!
//! Everything here lives for exactly one request: it is created while
//! handling `/checkout`, serialized into the response, then dropped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Span attribute key carrying the generated order identifier.
pub const ATTR_ORDER_ID: &str = "order.id";
/// Span attribute key carrying the generated customer identifier.
pub const ATTR_CUSTOMER_ID: &str = "customer.id";
/// Span attribute key carrying the selected scenario name.
pub const ATTR_SCENARIO: &str = "scenario";
/// Span attribute key set on simulated failures.
///
/// The collector's sampling policy matches the string value `"true"`, so the
/// attribute is always written as a string, never as a boolean.
pub const ATTR_ISSUE_DETECTED: &str = "issue_detected";
/// Value written to [`ATTR_ISSUE_DETECTED`].
pub const ISSUE_DETECTED_VALUE: &str = "true";

/// Message used for the simulated inventory failure, both as the span
/// status description and the response message.
pub const INVENTORY_FAILURE_MESSAGE: &str = "Checkout failed: Inventory unavailable";

/// Simulated outcome class of a single checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Fast, successful checkout.
    Normal,
    /// Successful checkout that takes well over a second.
    HighLatency,
    /// Simulated business failure (inventory unavailable).
    Error,
}

impl Scenario {
    /// Value written to the `scenario` span attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Normal => "normal",
            Scenario::HighLatency => "high_latency",
            Scenario::Error => "error",
        }
    }

    /// Response status field for this scenario.
    pub fn checkout_status(&self) -> CheckoutStatus {
        match self {
            Scenario::Normal | Scenario::HighLatency => CheckoutStatus::Completed,
            Scenario::Error => CheckoutStatus::Failed,
        }
    }

    /// HTTP status code returned for this scenario.
    pub fn http_status(&self) -> u16 {
        match self {
            Scenario::Normal | Scenario::HighLatency => 200,
            Scenario::Error => 500,
        }
    }

    /// Human readable response message.
    pub fn message(&self) -> &'static str {
        match self {
            Scenario::Normal => "Checkout successful",
            Scenario::HighLatency => "Checkout processed slowly",
            Scenario::Error => INVENTORY_FAILURE_MESSAGE,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated identifiers for one simulated order.
///
/// Uniqueness is not guaranteed; this is demo data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIdentity {
    /// `order-NNNNN`
    pub order_id: String,
    /// `cust-NNNN`
    pub customer_id: String,
}

impl OrderIdentity {
    /// Lowest numeric part of an order id.
    pub const ORDER_MIN: u32 = 10_000;
    /// Highest numeric part of an order id.
    pub const ORDER_MAX: u32 = 99_999;
    /// Lowest numeric part of a customer id.
    pub const CUSTOMER_MIN: u32 = 1_000;
    /// Highest numeric part of a customer id.
    pub const CUSTOMER_MAX: u32 = 9_999;

    /// Build an identity from the two numeric draws.
    pub fn new(order_number: u32, customer_number: u32) -> Self {
        Self {
            order_id: format!("order-{}", order_number),
            customer_id: format!("cust-{}", customer_number),
        }
    }
}

/// Value of the `status` field in a checkout response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStatus {
    Completed,
    Failed,
}

/// JSON body returned by `/checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub order_id: String,
    pub status: CheckoutStatus,
    pub message: String,
}

/// Result body plus the HTTP status code it must be served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutResponse {
    pub result: CheckoutResult,
    pub http_status: u16,
}

impl CheckoutResponse {
    /// Build the response shape dictated by `scenario`.
    pub fn for_scenario(order_id: String, scenario: Scenario) -> Self {
        Self {
            result: CheckoutResult {
                order_id,
                status: scenario.checkout_status(),
                message: scenario.message().to_string(),
            },
            http_status: scenario.http_status(),
        }
    }
}

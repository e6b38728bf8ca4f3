//! Declarative processor definitions: converters described as data.
//!
//! A processor turns a set of inputs into a set of outputs at fixed rates.
//! Definitions come from JSON, are validated once at load, and produce a
//! fresh [`RequestLedger`] every tick.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::RequestLedger;
use crate::settlement::ProducerPolicy;

/// A resource name with a non-negative rate in units per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRate {
    pub resource: String,
    pub rate: f64,
}

impl ResourceRate {
    pub fn new(resource: impl Into<String>, rate: f64) -> Self {
        Self {
            resource: resource.into(),
            rate,
        }
    }
}

/// A converter definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorSpec {
    /// Display name; also the attribution label for every flow.
    pub label: String,
    #[serde(default)]
    pub inputs: Vec<ResourceRate>,
    #[serde(default)]
    pub outputs: Vec<ResourceRate>,
    #[serde(default)]
    pub producer_policy: ProducerPolicy,
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("processor label is empty")]
    EmptyLabel,
    #[error("processor '{label}': rate for '{resource}' is not finite")]
    NonFiniteRate { label: String, resource: String },
    #[error("processor '{label}': rate for '{resource}' is negative ({rate})")]
    NegativeRate {
        label: String,
        resource: String,
        rate: f64,
    },
    #[error("failed to parse processor definitions: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ProcessorSpec {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            producer_policy: ProducerPolicy::default(),
        }
    }

    pub fn input(mut self, resource: impl Into<String>, rate: f64) -> Self {
        self.inputs.push(ResourceRate::new(resource, rate));
        self
    }

    pub fn output(mut self, resource: impl Into<String>, rate: f64) -> Self {
        self.outputs.push(ResourceRate::new(resource, rate));
        self
    }

    pub fn producer_policy(mut self, policy: ProducerPolicy) -> Self {
        self.producer_policy = policy;
        self
    }

    /// Reject definitions that would put non-finite or negative rates in a ledger.
    pub fn validate(&self) -> Result<(), ProcessorError> {
        if self.label.trim().is_empty() {
            return Err(ProcessorError::EmptyLabel);
        }
        for entry in self.inputs.iter().chain(&self.outputs) {
            if !entry.rate.is_finite() {
                return Err(ProcessorError::NonFiniteRate {
                    label: self.label.clone(),
                    resource: entry.resource.clone(),
                });
            }
            if entry.rate < 0.0 {
                return Err(ProcessorError::NegativeRate {
                    label: self.label.clone(),
                    resource: entry.resource.clone(),
                    rate: entry.rate,
                });
            }
        }
        Ok(())
    }

    /// Build this tick's ledger: inputs consume, outputs produce.
    pub fn ledger(&self) -> RequestLedger {
        let mut ledger = RequestLedger::new();
        for input in &self.inputs {
            ledger.consume(input.resource.as_str(), input.rate);
        }
        for output in &self.outputs {
            ledger.produce(output.resource.as_str(), output.rate);
        }
        ledger
    }

    /// Parse and validate a JSON array of definitions.
    pub fn parse_list(json: &str) -> Result<Vec<ProcessorSpec>, ProcessorError> {
        let specs: Vec<ProcessorSpec> = serde_json::from_str(json)?;
        for spec in &specs {
            spec.validate()?;
        }
        Ok(specs)
    }
}

//! Unit converters: consumption records into emission and energy totals.
//!
//! Missing multipliers are read as zero (through `default_to_zero`), which
//! matches the upstream records but can understate totals. The quality
//! module reports the missing fields separately.

use serde::{Deserialize, Serialize};

use crate::types::{default_to_zero, Observation, Quantity};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// GHG Protocol emission scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Scope1,
    Scope2,
    Scope3,
}

impl Scope {
    pub fn label(&self) -> &'static str {
        match self {
            Scope::Scope1 => "scope1",
            Scope::Scope2 => "scope2",
            Scope::Scope3 => "scope3",
        }
    }
}

/// Field used to split a series into parallel sub-series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Scope,
    ResourceCategory,
    Resource,
    Facility,
}

/// One monthly consumption record for a facility resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    /// Consumption in the resource's native unit (t, kWh, m3, ...)
    #[serde(default)]
    pub consumption: Option<Quantity>,
    /// kgCO2e (or tCO2e) per unit of consumption
    #[serde(default)]
    pub emission_factor: Option<f64>,
    /// Energy per unit of consumption (GJ/t, MJ/kWh, ...)
    #[serde(default)]
    pub heat_content: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<String>,
}

impl EmissionRecord {
    pub fn emissions(&self) -> Quantity {
        emissions(self.consumption, self.emission_factor)
    }

    pub fn energy(&self) -> Quantity {
        energy_content(self.consumption, self.heat_content)
    }

    /// Label of this record along `dimension`, if the record carries it.
    pub fn dimension_label(&self, dimension: Dimension) -> Option<String> {
        match dimension {
            Dimension::Scope => self.scope.map(|s| s.label().to_string()),
            Dimension::ResourceCategory => self.resource_category.clone(),
            Dimension::Resource => self.resource_name.clone(),
            Dimension::Facility => self.facility_id.clone(),
        }
    }
}

/// One monthly production record for a facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default)]
    pub production: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<String>,
}

/// Emission and energy totals over a set of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionTotals {
    pub emissions: Quantity,
    pub energy: Quantity,
    pub records: usize,
}

// ---------------------------------------------------------------------------
// Converters
// ---------------------------------------------------------------------------

/// `consumption * factor`, missing operands read as zero.
pub fn emissions(consumption: Option<Quantity>, factor: Option<f64>) -> Quantity {
    default_to_zero(consumption) * default_to_zero(factor)
}

/// `consumption * heat_content`, missing operands read as zero.
pub fn energy_content(consumption: Option<Quantity>, heat_content: Option<f64>) -> Quantity {
    default_to_zero(consumption) * default_to_zero(heat_content)
}

pub fn total_emissions(records: &[EmissionRecord]) -> EmissionTotals {
    EmissionTotals {
        emissions: records.iter().map(EmissionRecord::emissions).sum(),
        energy: records.iter().map(EmissionRecord::energy).sum(),
        records: records.len(),
    }
}

/// Project records onto emission observations, optionally labelled by a
/// dimension for grouped aggregation.
pub fn emission_observations(
    records: &[EmissionRecord],
    dimension: Option<Dimension>,
) -> Vec<Observation> {
    records
        .iter()
        .map(|r| Observation {
            year: r.year,
            month: r.month,
            value: Some(r.emissions()),
            dimension: dimension.and_then(|d| r.dimension_label(d)),
        })
        .collect()
}

pub fn energy_observations(
    records: &[EmissionRecord],
    dimension: Option<Dimension>,
) -> Vec<Observation> {
    records
        .iter()
        .map(|r| Observation {
            year: r.year,
            month: r.month,
            value: Some(r.energy()),
            dimension: dimension.and_then(|d| r.dimension_label(d)),
        })
        .collect()
}

/// Production observations keep nulls as nulls so quality checks can see
/// them.
pub fn production_observations(records: &[ProductionRecord]) -> Vec<Observation> {
    records
        .iter()
        .map(|r| Observation {
            year: r.year,
            month: r.month,
            value: r.production,
            dimension: r.facility_id.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

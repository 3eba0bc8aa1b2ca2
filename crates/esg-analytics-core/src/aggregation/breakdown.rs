use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::conversion::units::EmissionRecord;
use crate::stats::ratio;
use crate::types::{default_to_zero, Percent, Quantity};

const UNASSIGNED: &str = "unassigned";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTotal {
    pub resource_name: String,
    pub resource_category: String,
    pub consumption: Quantity,
    pub emissions: Quantity,
    pub energy: Quantity,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub resource_category: String,
    pub emissions: Quantity,
    pub energy: Quantity,
    pub share_pct: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeCategoryTotal {
    pub scope: String,
    pub resource_category: String,
    pub emissions: Quantity,
    pub energy: Quantity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceBreakdown {
    pub by_resource: Vec<ResourceTotal>,
    pub by_category: Vec<CategoryTotal>,
    pub by_scope: Vec<ScopeCategoryTotal>,
    /// Largest emitters, at most `top_n` of them
    pub top_contributors: Vec<ResourceTotal>,
    pub total_emissions: Quantity,
    pub total_energy: Quantity,
}

/// Emissions and production attributed to one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub name: String,
    pub emissions: Quantity,
    #[serde(default)]
    pub production: Option<Quantity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceContribution {
    pub name: String,
    pub emissions: Quantity,
    pub contribution_pct: Percent,
    /// Emissions per unit of production, 0 without production
    pub intensity: f64,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Split records by resource, by category and by scope x category.
///
/// Records without a resource name or category land under `"unassigned"`;
/// scope-less records land under the `"unscoped"` scope.
pub fn resource_breakdown(records: &[EmissionRecord], top_n: usize) -> ResourceBreakdown {
    let mut resources: BTreeMap<(String, String), ResourceTotal> = BTreeMap::new();
    let mut categories: BTreeMap<String, (Quantity, Quantity)> = BTreeMap::new();
    let mut scopes: BTreeMap<(String, String), (Quantity, Quantity)> = BTreeMap::new();

    for record in records {
        let name = record
            .resource_name
            .clone()
            .unwrap_or_else(|| UNASSIGNED.to_string());
        let category = record
            .resource_category
            .clone()
            .unwrap_or_else(|| UNASSIGNED.to_string());
        let scope = record
            .scope
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| "unscoped".to_string());
        let emissions = record.emissions();
        let energy = record.energy();

        let entry = resources
            .entry((name.clone(), category.clone()))
            .or_insert_with(|| ResourceTotal {
                resource_name: name,
                resource_category: category.clone(),
                consumption: 0.0,
                emissions: 0.0,
                energy: 0.0,
                records: 0,
            });
        entry.consumption += default_to_zero(record.consumption);
        entry.emissions += emissions;
        entry.energy += energy;
        entry.records += 1;

        let cat = categories.entry(category.clone()).or_insert((0.0, 0.0));
        cat.0 += emissions;
        cat.1 += energy;

        let sc = scopes.entry((scope, category)).or_insert((0.0, 0.0));
        sc.0 += emissions;
        sc.1 += energy;
    }

    let by_resource: Vec<ResourceTotal> = resources.into_values().collect();
    let total_emissions: Quantity = by_resource.iter().map(|r| r.emissions).sum();
    let total_energy: Quantity = by_resource.iter().map(|r| r.energy).sum();

    let mut by_category: Vec<CategoryTotal> = categories
        .into_iter()
        .map(|(resource_category, (emissions, energy))| CategoryTotal {
            resource_category,
            emissions,
            energy,
            share_pct: ratio(emissions, total_emissions) * 100.0,
        })
        .collect();
    by_category.sort_by(|a, b| b.emissions.total_cmp(&a.emissions));

    let by_scope = scopes
        .into_iter()
        .map(|((scope, resource_category), (emissions, energy))| ScopeCategoryTotal {
            scope,
            resource_category,
            emissions,
            energy,
        })
        .collect();

    let mut top_contributors = by_resource.clone();
    top_contributors.sort_by(|a, b| b.emissions.total_cmp(&a.emissions));
    top_contributors.truncate(top_n);

    ResourceBreakdown {
        by_resource,
        by_category,
        by_scope,
        top_contributors,
        total_emissions,
        total_energy,
    }
}

/// Share of `total_emissions` per resource, largest first. A non-positive
/// total yields an empty list.
pub fn resource_contribution(
    resources: &[ResourceUsage],
    total_emissions: Quantity,
) -> Vec<ResourceContribution> {
    if total_emissions <= 0.0 {
        return Vec::new();
    }
    let mut out: Vec<ResourceContribution> = resources
        .iter()
        .map(|r| ResourceContribution {
            name: r.name.clone(),
            emissions: r.emissions,
            contribution_pct: ratio(r.emissions, total_emissions) * 100.0,
            intensity: ratio(r.emissions, default_to_zero(r.production)),
        })
        .collect();
    out.sort_by(|a, b| b.contribution_pct.total_cmp(&a.contribution_pct));
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::units::Scope;

    fn record(name: &str, category: &str, scope: Scope, consumption: f64, factor: f64) -> EmissionRecord {
        EmissionRecord {
            year: 2024,
            month: Some(1),
            consumption: Some(consumption),
            emission_factor: Some(factor),
            heat_content: Some(1.0),
            scope: Some(scope),
            resource_category: Some(category.into()),
            resource_name: Some(name.into()),
            facility_id: None,
        }
    }

    fn sample_records() -> Vec<EmissionRecord> {
        vec![
            record("Coal", "Fuel", Scope::Scope1, 100.0, 2.0),
            record("Coal", "Fuel", Scope::Scope1, 50.0, 2.0),
            record("Diesel", "Fuel", Scope::Scope1, 10.0, 3.0),
            record("Grid", "Electricity", Scope::Scope2, 400.0, 0.5),
        ]
    }

    #[test]
    fn test_breakdown_totals() {
        let b = resource_breakdown(&sample_records(), 10);
        // 300 + 30 + 200
        assert_eq!(b.total_emissions, 530.0);
        assert_eq!(b.total_energy, 560.0);
        assert_eq!(b.by_resource.len(), 3);
        let coal = b.by_resource.iter().find(|r| r.resource_name == "Coal").unwrap();
        assert_eq!(coal.emissions, 300.0);
        assert_eq!(coal.records, 2);
    }

    #[test]
    fn test_breakdown_categories_and_scopes() {
        let b = resource_breakdown(&sample_records(), 10);
        assert_eq!(b.by_category[0].resource_category, "Fuel");
        assert_eq!(b.by_category[0].emissions, 330.0);
        assert!((b.by_category[1].share_pct - 200.0 / 530.0 * 100.0).abs() < 1e-9);
        assert_eq!(b.by_scope.len(), 2);
        assert_eq!(b.by_scope[0].scope, "scope1");
    }

    #[test]
    fn test_top_contributors_truncated() {
        let b = resource_breakdown(&sample_records(), 2);
        let names: Vec<&str> = b
            .top_contributors
            .iter()
            .map(|r| r.resource_name.as_str())
            .collect();
        assert_eq!(names, vec!["Coal", "Grid"]);
    }

    #[test]
    fn test_unassigned_labels() {
        let mut r = record("x", "y", Scope::Scope3, 1.0, 1.0);
        r.resource_name = None;
        r.resource_category = None;
        r.scope = None;
        let b = resource_breakdown(&[r], 5);
        assert_eq!(b.by_resource[0].resource_name, "unassigned");
        assert_eq!(b.by_scope[0].scope, "unscoped");
    }

    #[test]
    fn test_resource_contribution() {
        let resources = vec![
            ResourceUsage {
                name: "Coal".into(),
                emissions: 25.0,
                production: Some(50.0),
            },
            ResourceUsage {
                name: "Gas".into(),
                emissions: 75.0,
                production: None,
            },
        ];
        let out = resource_contribution(&resources, 100.0);
        assert_eq!(out[0].name, "Gas");
        assert_eq!(out[0].contribution_pct, 75.0);
        assert_eq!(out[0].intensity, 0.0);
        assert_eq!(out[1].intensity, 0.5);
    }

    #[test]
    fn test_resource_contribution_zero_total() {
        let resources = vec![ResourceUsage {
            name: "Coal".into(),
            emissions: 25.0,
            production: None,
        }];
        assert!(resource_contribution(&resources, 0.0).is_empty());
    }
}

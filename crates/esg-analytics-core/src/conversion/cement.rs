//! Cement clinker calcination emissions.
//!
//! Process CO2 is derived from the oxide content of clinker, corrected for
//! oxides that entered through non-carbonate raw materials and silicates:
//!
//! - uncorrected = CaO_clinker / M(CaO) * M(CO2) + MgO_clinker / M(MgO) * M(CO2)
//! - non-carbonate correction uses the raw-material CaO/MgO amounts
//! - silicate correction uses elemental Ca/Mg with M(Ca), M(Mg)
//! - calcination factor = emissions / clinker production

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::EsgAnalyticsError;
use crate::stats::ratio;
use crate::types::{default_to_zero, with_metadata, ComputationOutput, Quantity};
use crate::EsgAnalyticsResult;

pub const MW_CAO: f64 = 56.0774;
pub const MW_MGO: f64 = 40.3044;
pub const MW_CO2: f64 = 44.01;
pub const MW_CA: f64 = 40.078;
pub const MW_MG: f64 = 24.305;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single material line from the plant's monthly data sheet.
///
/// Content lines carry a mass percentage of the referenced material tonnage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CementEntry {
    /// Total clinker produced (t)
    ClinkerProduction { tonnes: Option<Quantity> },
    /// CaO content of clinker, including free lime
    ClinkerCao {
        content_pct: Option<f64>,
        material_tonnes: Option<Quantity>,
    },
    ClinkerMgo {
        content_pct: Option<f64>,
        material_tonnes: Option<Quantity>,
    },
    RawMaterialCao {
        content_pct: Option<f64>,
        material_tonnes: Option<Quantity>,
    },
    RawMaterialMgo {
        content_pct: Option<f64>,
        material_tonnes: Option<Quantity>,
    },
    /// Ca content of Ca-silicate raw materials
    SilicateCa {
        content_pct: Option<f64>,
        material_tonnes: Option<Quantity>,
    },
    /// Mg content of Mg-silicate raw materials
    SilicateMg {
        content_pct: Option<f64>,
        material_tonnes: Option<Quantity>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CementEmissionsInput {
    pub entries: Vec<CementEntry>,
}

/// Material totals collected from the entries (t).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CementMaterialTotals {
    pub clinker_production: Quantity,
    pub cao_in_clinker: Quantity,
    pub mgo_in_clinker: Quantity,
    pub cao_in_raw_materials: Quantity,
    pub mgo_in_raw_materials: Quantity,
    pub ca_in_silicates: Quantity,
    pub mg_in_silicates: Quantity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CementEmissionsOutput {
    pub totals: CementMaterialTotals,
    /// tCO2 from clinker oxides before corrections
    pub uncorrected_co2: Quantity,
    pub non_carbonate_correction: Quantity,
    pub silicate_correction: Quantity,
    pub corrected_direct_co2: Quantity,
    /// tCO2 per t clinker
    pub uncorrected_calcination_factor: f64,
    pub corrected_calcination_factor: f64,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn calculate_cement_emissions(
    input: &CementEmissionsInput,
) -> EsgAnalyticsResult<ComputationOutput<CementEmissionsOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_entries(&input.entries)?;

    let totals = collect_totals(&input.entries);
    let output = process_emissions(totals);

    if output.totals.clinker_production == 0.0 {
        warnings.push(
            "No clinker production reported; calcination factors are reported as 0.".into(),
        );
    }
    if output.corrected_direct_co2 < 0.0 {
        warnings.push(
            "Corrections exceed uncorrected CO2; check raw-material oxide contents.".into(),
        );
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "molecular_weights": {
            "CaO": MW_CAO,
            "MgO": MW_MGO,
            "CO2": MW_CO2,
            "Ca": MW_CA,
            "Mg": MW_MG
        },
        "content_basis": "mass percent of referenced material tonnage",
        "missing_values": "read as 0"
    });

    Ok(with_metadata(
        "Clinker calcination CO2 (oxide method with non-carbonate and silicate corrections)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Sum the entries into material totals. Content lines contribute
/// `content_pct / 100 * material_tonnes`.
pub fn collect_totals(entries: &[CementEntry]) -> CementMaterialTotals {
    let mut totals = CementMaterialTotals::default();
    for entry in entries {
        match entry {
            CementEntry::ClinkerProduction { tonnes } => {
                totals.clinker_production += default_to_zero(*tonnes);
            }
            CementEntry::ClinkerCao {
                content_pct,
                material_tonnes,
            } => totals.cao_in_clinker += content_amount(*content_pct, *material_tonnes),
            CementEntry::ClinkerMgo {
                content_pct,
                material_tonnes,
            } => totals.mgo_in_clinker += content_amount(*content_pct, *material_tonnes),
            CementEntry::RawMaterialCao {
                content_pct,
                material_tonnes,
            } => totals.cao_in_raw_materials += content_amount(*content_pct, *material_tonnes),
            CementEntry::RawMaterialMgo {
                content_pct,
                material_tonnes,
            } => totals.mgo_in_raw_materials += content_amount(*content_pct, *material_tonnes),
            CementEntry::SilicateCa {
                content_pct,
                material_tonnes,
            } => totals.ca_in_silicates += content_amount(*content_pct, *material_tonnes),
            CementEntry::SilicateMg {
                content_pct,
                material_tonnes,
            } => totals.mg_in_silicates += content_amount(*content_pct, *material_tonnes),
        }
    }
    totals
}

pub fn process_emissions(totals: CementMaterialTotals) -> CementEmissionsOutput {
    let uncorrected_co2 =
        totals.cao_in_clinker / MW_CAO * MW_CO2 + totals.mgo_in_clinker / MW_MGO * MW_CO2;
    let non_carbonate_correction = totals.cao_in_raw_materials / MW_CAO * MW_CO2
        + totals.mgo_in_raw_materials / MW_MGO * MW_CO2;
    let silicate_correction =
        totals.ca_in_silicates / MW_CA * MW_CO2 + totals.mg_in_silicates / MW_MG * MW_CO2;
    let corrected_direct_co2 = uncorrected_co2 - non_carbonate_correction - silicate_correction;

    CementEmissionsOutput {
        uncorrected_calcination_factor: ratio(uncorrected_co2, totals.clinker_production),
        corrected_calcination_factor: ratio(corrected_direct_co2, totals.clinker_production),
        totals,
        uncorrected_co2,
        non_carbonate_correction,
        silicate_correction,
        corrected_direct_co2,
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn content_amount(content_pct: Option<f64>, material_tonnes: Option<Quantity>) -> Quantity {
    default_to_zero(content_pct) / 100.0 * default_to_zero(material_tonnes)
}

fn validate_entries(entries: &[CementEntry]) -> EsgAnalyticsResult<()> {
    if entries.is_empty() {
        return Err(EsgAnalyticsError::InsufficientData(
            "At least one cement material entry is required.".into(),
        ));
    }
    for (i, entry) in entries.iter().enumerate() {
        let (pct, tonnes) = match entry {
            CementEntry::ClinkerProduction { tonnes } => (None, *tonnes),
            CementEntry::ClinkerCao {
                content_pct,
                material_tonnes,
            }
            | CementEntry::ClinkerMgo {
                content_pct,
                material_tonnes,
            }
            | CementEntry::RawMaterialCao {
                content_pct,
                material_tonnes,
            }
            | CementEntry::RawMaterialMgo {
                content_pct,
                material_tonnes,
            }
            | CementEntry::SilicateCa {
                content_pct,
                material_tonnes,
            }
            | CementEntry::SilicateMg {
                content_pct,
                material_tonnes,
            } => (*content_pct, *material_tonnes),
        };
        if let Some(p) = pct {
            if !(0.0..=100.0).contains(&p) {
                return Err(EsgAnalyticsError::InvalidInput {
                    field: format!("entries[{i}].content_pct"),
                    reason: "Content must be a percentage between 0 and 100.".into(),
                });
            }
        }
        if let Some(t) = tonnes {
            if t < 0.0 {
                return Err(EsgAnalyticsError::InvalidInput {
                    field: format!("entries[{i}]"),
                    reason: "Material tonnage cannot be negative.".into(),
                });
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> CementEmissionsInput {
        CementEmissionsInput {
            entries: vec![
                CementEntry::ClinkerProduction {
                    tonnes: Some(100_000.0),
                },
                CementEntry::ClinkerCao {
                    content_pct: Some(65.0),
                    material_tonnes: Some(100_000.0),
                },
                CementEntry::ClinkerMgo {
                    content_pct: Some(2.0),
                    material_tonnes: Some(100_000.0),
                },
                CementEntry::RawMaterialCao {
                    content_pct: Some(1.0),
                    material_tonnes: Some(10_000.0),
                },
            ],
        }
    }

    #[test]
    fn test_totals_from_percentages() {
        let totals = collect_totals(&sample_input().entries);
        assert_eq!(totals.clinker_production, 100_000.0);
        assert!((totals.cao_in_clinker - 65_000.0).abs() < 1e-9);
        assert!((totals.mgo_in_clinker - 2_000.0).abs() < 1e-9);
        assert!((totals.cao_in_raw_materials - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_uncorrected_co2() {
        let out = calculate_cement_emissions(&sample_input()).unwrap().result;
        let expected = 65_000.0 / MW_CAO * MW_CO2 + 2_000.0 / MW_MGO * MW_CO2;
        assert!((out.uncorrected_co2 - expected).abs() < 1e-6);
    }

    #[test]
    fn test_calcination_factor_near_industry_default() {
        // 65% CaO clinker calcines to roughly 0.5 tCO2/t clinker
        let out = calculate_cement_emissions(&sample_input()).unwrap().result;
        assert!(out.uncorrected_calcination_factor > 0.5);
        assert!(out.uncorrected_calcination_factor < 0.56);
        assert!(out.corrected_calcination_factor < out.uncorrected_calcination_factor);
    }

    #[test]
    fn test_corrections_reduce_direct_co2() {
        let out = calculate_cement_emissions(&sample_input()).unwrap().result;
        let expected_correction = 100.0 / MW_CAO * MW_CO2;
        assert!((out.non_carbonate_correction - expected_correction).abs() < 1e-9);
        assert!(
            (out.corrected_direct_co2 - (out.uncorrected_co2 - expected_correction)).abs() < 1e-6
        );
    }

    #[test]
    fn test_zero_clinker_guards_factor() {
        let input = CementEmissionsInput {
            entries: vec![CementEntry::ClinkerCao {
                content_pct: Some(65.0),
                material_tonnes: Some(1_000.0),
            }],
        };
        let result = calculate_cement_emissions(&input).unwrap();
        assert_eq!(result.result.uncorrected_calcination_factor, 0.0);
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_invalid_percentage_rejected() {
        let input = CementEmissionsInput {
            entries: vec![CementEntry::SilicateCa {
                content_pct: Some(140.0),
                material_tonnes: Some(10.0),
            }],
        };
        let err = calculate_cement_emissions(&input).unwrap_err();
        match err {
            EsgAnalyticsError::InvalidInput { field, .. } => {
                assert_eq!(field, "entries[0].content_pct");
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_entry_deserializes_tagged() {
        let entry: CementEntry = serde_json::from_str(
            r#"{"type": "clinker_cao", "content_pct": 64.5, "material_tonnes": 1200}"#,
        )
        .unwrap();
        assert!(matches!(entry, CementEntry::ClinkerCao { .. }));
    }
}

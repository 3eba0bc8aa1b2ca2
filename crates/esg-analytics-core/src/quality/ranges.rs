use serde::{Deserialize, Serialize};

use crate::types::Percent;

const CARBON_INTENSITY_AVERAGE_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarbonIntensityRange {
    pub industry_average: f64,
    pub industry_worst: f64,
}

/// Reported values to range-check. Absent values are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeCheckInput {
    #[serde(default)]
    pub carbon_intensity: Option<f64>,
    #[serde(default)]
    pub capacity_utilization: Option<Percent>,
    #[serde(default)]
    pub carbon_intensity_range: Option<CarbonIntensityRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeCheck {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

/// Plausibility of reported utilisation and carbon intensity.
pub fn check_data_ranges(input: &RangeCheckInput) -> RangeCheck {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    if let (Some(intensity), Some(range)) = (input.carbon_intensity, input.carbon_intensity_range) {
        if intensity > range.industry_worst {
            issues.push("Carbon intensity exceeds industry worst performance".to_string());
        } else if intensity > range.industry_average * CARBON_INTENSITY_AVERAGE_FACTOR {
            warnings.push("Carbon intensity is significantly above industry average".to_string());
        }
    }

    if let Some(utilization) = input.capacity_utilization {
        if utilization > 100.0 {
            issues.push("Capacity utilization cannot exceed 100%".to_string());
        } else if utilization > 95.0 {
            warnings.push(
                "Very high capacity utilization (>95%) may indicate data entry error".to_string(),
            );
        } else if utilization < 10.0 {
            warnings.push(
                "Very low capacity utilization (<10%) may indicate operational issues or data error"
                    .to_string(),
            );
        }
    }

    RangeCheck {
        is_valid: issues.is_empty(),
        issues,
        warnings,
    }
}

//! District risk classification
//!
//! Risk tier and priority monitoring are both derived from the summed
//! cultivated area, each against its own threshold. Priority is not derived
//! from the tier: a MEDIUM district above 30 000 ha is flagged too.

use crate::dataset::DistrictAggregate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Area above which a district is HIGH risk
pub const HIGH_RISK_THRESHOLD_HA: i64 = 50_000;
/// Area above which a district is at least MEDIUM risk
pub const MEDIUM_RISK_THRESHOLD_HA: i64 = 20_000;
/// Area above which a district needs priority monitoring
pub const PRIORITY_THRESHOLD_HA: i64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub risk_level: RiskLevel,
    pub priority_monitoring: bool,
}

/// Risk assessment for one district, as served by `/safety/{district}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub district: String,
    pub total_area_ha: i64,
    pub risk_level: RiskLevel,
    pub priority_monitoring: bool,
    pub records_count: usize,
}

pub fn risk_level(total_area: i64) -> RiskLevel {
    if total_area > HIGH_RISK_THRESHOLD_HA {
        RiskLevel::High
    } else if total_area > MEDIUM_RISK_THRESHOLD_HA {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn needs_priority_monitoring(total_area: i64) -> bool {
    total_area > PRIORITY_THRESHOLD_HA
}

pub fn classify(total_area: i64) -> Classification {
    Classification {
        risk_level: risk_level(total_area),
        priority_monitoring: needs_priority_monitoring(total_area),
    }
}

pub fn assess(aggregate: &DistrictAggregate) -> RiskAssessment {
    let Classification {
        risk_level,
        priority_monitoring,
    } = classify(aggregate.total_area);

    RiskAssessment {
        district: aggregate.district.clone(),
        total_area_ha: aggregate.total_area,
        risk_level,
        priority_monitoring,
        records_count: aggregate.records_count,
    }
}

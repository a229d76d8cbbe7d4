use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenuePoint {
    pub bucket: NaiveDateTime,
    pub site: String,
    pub revenue: f64,
}

/// Monthly revenue of one tenant, as reported by the mall operator.
#[derive(Debug, Clone, PartialEq)]
pub struct TenantRevenueRecord {
    pub month: NaiveDate,
    pub mall_name: String,
    pub tenant_family: String,
    pub tenant_subfamily: String,
    pub monthly_revenue: f64,
    pub floor_area: Option<f64>,
}

impl TenantRevenueRecord {
    /// Revenue per square metre; a missing or zero floor area yields `0.0`.
    pub fn revenue_per_square_metre(&self) -> f64 {
        match self.floor_area {
            Some(area) if area != 0.0 => {
                let value = self.monthly_revenue / area;
                if value.is_finite() { value } else { 0.0 }
            }
            _ => 0.0,
        }
    }
}

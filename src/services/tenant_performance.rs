use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::calendar::DateWindow;
use crate::domain::revenue::TenantRevenueRecord;
use crate::services::kpi::{Kpi, mean};
use crate::services::period_comparison::preceding_span;

const TOP_FAMILIES: usize = 10;

/// Selection applied to the tenant revenue table. Empty lists select all.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceFilter {
    pub window: DateWindow,
    pub malls: Vec<String>,
    pub families: Vec<String>,
}

impl PerformanceFilter {
    fn selects(&self, record: &TenantRevenueRecord) -> bool {
        (self.malls.is_empty() || self.malls.contains(&record.mall_name))
            && (self.families.is_empty() || self.families.contains(&record.tenant_family))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RankedRevenue {
    pub name: String,
    pub average_revenue: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AreaYield {
    pub mall: String,
    pub family: String,
    pub revenue_per_square_metre: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CenterRevenue {
    pub mall: String,
    pub average_revenue: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MonthlyCenterRevenue {
    pub mall: String,
    pub month: NaiveDate,
    pub average_revenue: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FamilyRevenue {
    pub mall: String,
    pub family: String,
    pub average_revenue: f64,
}

/// Mean revenue next to the mean floor area of a family. Rows without a
/// floor area do not count towards the area mean.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FamilyFootprint {
    pub family: String,
    pub average_revenue: f64,
    pub average_floor_area: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TenantPerformance {
    pub window: DateWindow,
    pub previous_window: DateWindow,
    pub records: usize,
    pub total_revenue: Kpi,
    pub average_revenue_per_center: Kpi,
    pub average_revenue_per_family: Kpi,
    pub revenue_per_center: Vec<CenterRevenue>,
    pub monthly_revenue_per_center: Vec<MonthlyCenterRevenue>,
    pub revenue_per_center_and_family: Vec<FamilyRevenue>,
    pub revenue_per_square_metre: Vec<AreaYield>,
    pub top_families: Vec<RankedRevenue>,
    pub subfamilies: Vec<RankedRevenue>,
    pub family_footprints: Vec<FamilyFootprint>,
}

/// Revenue KPIs for the selected window, compared with the preceding span of
/// the same length.
///
/// The KPIs cover every mall and family of the window. The mall and family
/// selection only narrows the breakdown tables.
pub fn analyze(records: &[TenantRevenueRecord], filter: &PerformanceFilter) -> TenantPerformance {
    let window = filter.window;
    let previous_window = preceding_span(window.start_date, window.end_date);

    let windowed: Vec<&TenantRevenueRecord> = records
        .iter()
        .filter(|record| window.contains(record.month))
        .collect();
    let previous: Vec<&TenantRevenueRecord> = records
        .iter()
        .filter(|record| previous_window.contains(record.month))
        .collect();
    let current: Vec<&TenantRevenueRecord> = windowed
        .iter()
        .copied()
        .filter(|record| filter.selects(record))
        .collect();

    if current.is_empty() {
        tracing::info!(
            start_date = %window.start_date,
            end_date = %window.end_date,
            "no tenant revenue in the selected window"
        );
    }

    let revenue_per_center = mean_by(&current, |record| record.mall_name.clone())
        .into_iter()
        .map(|(mall, average_revenue)| CenterRevenue {
            mall,
            average_revenue,
        })
        .collect();

    let monthly_revenue_per_center = mean_by(&current, |record| (record.mall_name.clone(), record.month))
        .into_iter()
        .map(|((mall, month), average_revenue)| MonthlyCenterRevenue {
            mall,
            month,
            average_revenue,
        })
        .collect();

    let revenue_per_center_and_family = mean_by(&current, |record| {
        (record.mall_name.clone(), record.tenant_family.clone())
    })
    .into_iter()
    .map(|((mall, family), average_revenue)| FamilyRevenue {
        mall,
        family,
        average_revenue,
    })
    .collect();

    let revenue_per_square_metre = group(&current, |record| {
        (record.mall_name.clone(), record.tenant_family.clone())
    })
    .into_iter()
    .map(|((mall, family), rows)| AreaYield {
        mall,
        family,
        revenue_per_square_metre: mean(rows.iter().map(|record| record.revenue_per_square_metre())),
    })
    .collect();

    let mut top_families = ranked(mean_by(&current, |record| record.tenant_family.clone()));
    top_families.truncate(TOP_FAMILIES);

    let family_footprints = group(&current, |record| record.tenant_family.clone())
        .into_iter()
        .map(|(family, rows)| FamilyFootprint {
            family,
            average_revenue: mean(rows.iter().map(|record| record.monthly_revenue)),
            average_floor_area: mean(rows.iter().filter_map(|record| record.floor_area)),
        })
        .collect();

    TenantPerformance {
        window,
        previous_window,
        records: current.len(),
        total_revenue: Kpi::new(revenue_sum(&windowed), revenue_sum(&previous)),
        average_revenue_per_center: Kpi::new(
            average_of_group_means(&windowed, |record| record.mall_name.clone()),
            average_of_group_means(&previous, |record| record.mall_name.clone()),
        ),
        average_revenue_per_family: Kpi::new(
            average_of_group_means(&windowed, |record| record.tenant_family.clone()),
            average_of_group_means(&previous, |record| record.tenant_family.clone()),
        ),
        revenue_per_center,
        monthly_revenue_per_center,
        revenue_per_center_and_family,
        revenue_per_square_metre,
        top_families,
        subfamilies: ranked(mean_by(&current, |record| record.tenant_subfamily.clone())),
        family_footprints,
    }
}

fn group<'a, K, F>(
    rows: &[&'a TenantRevenueRecord],
    key: F,
) -> BTreeMap<K, Vec<&'a TenantRevenueRecord>>
where
    K: Ord,
    F: Fn(&TenantRevenueRecord) -> K,
{
    let mut groups: BTreeMap<K, Vec<&'a TenantRevenueRecord>> = BTreeMap::new();
    for &record in rows {
        groups.entry(key(record)).or_default().push(record);
    }
    groups
}

/// Mean monthly revenue per group.
fn mean_by<K, F>(rows: &[&TenantRevenueRecord], key: F) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&TenantRevenueRecord) -> K,
{
    group(rows, key)
        .into_iter()
        .map(|(key, rows)| (key, mean(rows.iter().map(|record| record.monthly_revenue))))
        .collect()
}

fn average_of_group_means<F>(rows: &[&TenantRevenueRecord], key: F) -> f64
where
    F: Fn(&TenantRevenueRecord) -> String,
{
    mean(mean_by(rows, key).into_values())
}

fn revenue_sum(rows: &[&TenantRevenueRecord]) -> f64 {
    rows.iter().map(|record| record.monthly_revenue).sum()
}

fn ranked(means: BTreeMap<String, f64>) -> Vec<RankedRevenue> {
    let mut ranked: Vec<RankedRevenue> = means
        .into_iter()
        .map(|(name, average_revenue)| RankedRevenue {
            name,
            average_revenue,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.average_revenue
            .partial_cmp(&a.average_revenue)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn record(
        on: NaiveDate,
        mall: &str,
        family: &str,
        subfamily: &str,
        revenue: f64,
        area: Option<f64>,
    ) -> TenantRevenueRecord {
        TenantRevenueRecord {
            month: on,
            mall_name: mall.to_string(),
            tenant_family: family.to_string(),
            tenant_subfamily: subfamily.to_string(),
            monthly_revenue: revenue,
            floor_area: area,
        }
    }

    fn filter(start: NaiveDate, end: NaiveDate) -> PerformanceFilter {
        PerformanceFilter {
            window: DateWindow::new(start, end),
            malls: Vec::new(),
            families: Vec::new(),
        }
    }

    fn sample() -> Vec<TenantRevenueRecord> {
        vec![
            record(month(2024, 1), "Site A", "Food", "Bakery", 1000.0, Some(50.0)),
            record(month(2024, 1), "Site A", "Fashion", "Shoes", 3000.0, Some(100.0)),
            record(month(2024, 1), "Site B", "Food", "Cafe", 500.0, None),
            record(month(2024, 2), "Site A", "Food", "Bakery", 2000.0, Some(50.0)),
            record(month(2023, 12), "Site A", "Food", "Bakery", 1500.0, Some(50.0)),
        ]
    }

    #[test]
    fn computes_kpis_against_the_preceding_span() {
        let performance = analyze(&sample(), &filter(month(2024, 1), month(2024, 2)));

        assert_eq!(performance.records, 4);
        assert_eq!(
            performance.previous_window,
            DateWindow::new(month(2023, 12), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())
        );
        assert_eq!(performance.total_revenue.current, 6500.0);
        assert_eq!(performance.total_revenue.previous, 1500.0);
        assert!((performance.total_revenue.variance_pct - 333.333_333).abs() < 1e-3);

        // Site A: (1000 + 3000 + 2000) / 3 = 2000, Site B: 500
        assert_eq!(performance.average_revenue_per_center.current, 1250.0);
        // Food: (1000 + 500 + 2000) / 3, Fashion: 3000
        let food = 3500.0 / 3.0;
        assert!((performance.average_revenue_per_family.current - (food + 3000.0) / 2.0).abs() < 1e-9);
        assert_eq!(performance.average_revenue_per_family.previous, 1500.0);
    }

    #[test]
    fn revenue_per_square_metre_ignores_missing_areas() {
        let performance = analyze(&sample(), &filter(month(2024, 1), month(2024, 2)));

        assert_eq!(
            performance.revenue_per_square_metre,
            vec![
                AreaYield {
                    mall: "Site A".to_string(),
                    family: "Fashion".to_string(),
                    revenue_per_square_metre: 30.0,
                },
                AreaYield {
                    mall: "Site A".to_string(),
                    family: "Food".to_string(),
                    revenue_per_square_metre: 30.0,
                },
                AreaYield {
                    mall: "Site B".to_string(),
                    family: "Food".to_string(),
                    revenue_per_square_metre: 0.0,
                },
            ]
        );
    }

    #[test]
    fn ranks_families_and_subfamilies_by_mean_revenue() {
        let performance = analyze(&sample(), &filter(month(2024, 1), month(2024, 2)));

        let families: Vec<&str> = performance.top_families.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(families, vec!["Fashion", "Food"]);
        let subfamilies: Vec<&str> = performance.subfamilies.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(subfamilies, vec!["Shoes", "Bakery", "Cafe"]);
        assert_eq!(performance.subfamilies[1].average_revenue, 1500.0);
    }

    #[test]
    fn keeps_only_the_ten_best_families() {
        let records: Vec<TenantRevenueRecord> = (0..12)
            .map(|i| record(month(2024, 1), "Site A", &format!("Family {i:02}"), "Sub", i as f64, None))
            .collect();
        let performance = analyze(&records, &filter(month(2024, 1), month(2024, 1)));

        assert_eq!(performance.top_families.len(), 10);
        assert_eq!(performance.top_families[0].name, "Family 11");
        assert_eq!(performance.subfamilies.len(), 1);
    }

    #[test]
    fn applies_mall_and_family_selection_to_breakdowns_only() {
        let mut selection = filter(month(2024, 1), month(2024, 2));
        selection.malls = vec!["Site A".to_string()];
        selection.families = vec!["Food".to_string()];

        let performance = analyze(&sample(), &selection);
        assert_eq!(performance.records, 2);
        assert_eq!(performance.total_revenue.current, 6500.0);
        assert_eq!(performance.average_revenue_per_center.current, 1250.0);
        let families: Vec<&str> = performance.top_families.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(families, vec!["Food"]);
        assert_eq!(performance.top_families[0].average_revenue, 1500.0);
        assert_eq!(performance.revenue_per_square_metre.len(), 1);
    }

    #[test]
    fn total_revenue_keeps_unselected_malls() {
        let records = vec![
            record(month(2024, 1), "Site A", "Food", "Bakery", 1000.0, None),
            record(month(2024, 1), "Site B", "Food", "Cafe", 500.0, None),
        ];
        let mut selection = filter(month(2024, 1), month(2024, 1));
        selection.malls = vec!["Site A".to_string()];

        let performance = analyze(&records, &selection);
        assert_eq!(performance.total_revenue.current, 1500.0);
        assert_eq!(performance.records, 1);
        assert_eq!(
            performance.revenue_per_center,
            vec![CenterRevenue {
                mall: "Site A".to_string(),
                average_revenue: 1000.0,
            }]
        );
    }

    #[test]
    fn averages_revenue_per_center_and_month() {
        let performance = analyze(&sample(), &filter(month(2024, 1), month(2024, 2)));

        assert_eq!(
            performance.revenue_per_center,
            vec![
                CenterRevenue {
                    mall: "Site A".to_string(),
                    average_revenue: 2000.0,
                },
                CenterRevenue {
                    mall: "Site B".to_string(),
                    average_revenue: 500.0,
                },
            ]
        );
        assert_eq!(
            performance.monthly_revenue_per_center,
            vec![
                MonthlyCenterRevenue {
                    mall: "Site A".to_string(),
                    month: month(2024, 1),
                    average_revenue: 2000.0,
                },
                MonthlyCenterRevenue {
                    mall: "Site A".to_string(),
                    month: month(2024, 2),
                    average_revenue: 2000.0,
                },
                MonthlyCenterRevenue {
                    mall: "Site B".to_string(),
                    month: month(2024, 1),
                    average_revenue: 500.0,
                },
            ]
        );
    }

    #[test]
    fn averages_revenue_per_center_and_family() {
        let performance = analyze(&sample(), &filter(month(2024, 1), month(2024, 2)));

        let rows: Vec<(&str, &str, f64)> = performance
            .revenue_per_center_and_family
            .iter()
            .map(|row| (row.mall.as_str(), row.family.as_str(), row.average_revenue))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Site A", "Fashion", 3000.0),
                ("Site A", "Food", 1500.0),
                ("Site B", "Food", 500.0),
            ]
        );
    }

    #[test]
    fn family_footprints_average_known_floor_areas() {
        let performance = analyze(&sample(), &filter(month(2024, 1), month(2024, 2)));

        assert_eq!(
            performance.family_footprints,
            vec![
                FamilyFootprint {
                    family: "Fashion".to_string(),
                    average_revenue: 3000.0,
                    average_floor_area: 100.0,
                },
                FamilyFootprint {
                    family: "Food".to_string(),
                    average_revenue: 3500.0 / 3.0,
                    average_floor_area: 50.0,
                },
            ]
        );
    }

    #[test]
    fn zero_previous_revenue_gives_zero_variation() {
        let records = vec![record(month(2024, 3), "Site A", "Food", "Bakery", 500.0, None)];
        let performance = analyze(&records, &filter(month(2024, 3), month(2024, 3)));

        assert_eq!(performance.total_revenue.current, 500.0);
        assert_eq!(performance.total_revenue.previous, 0.0);
        assert_eq!(performance.total_revenue.variance_pct, 0.0);
        assert_eq!(performance.average_revenue_per_center.variance_pct, 0.0);
    }
}

use meter_client::domain::{Bill, MeterReading};
use serde::Serialize;

/// Aggregates shown on the overview page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_meters: usize,
    pub read_meters: usize,
    pub reading_progress: f64,
    pub total_bills: usize,
    pub paid_bills: usize,
    pub collection_progress: f64,
    pub collected_lbp: f64,
    pub collected_usd: f64,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Sum of the USD amount over paid bills.
pub fn collected_usd(bills: &[Bill]) -> f64 {
    bills.iter().filter(|b| b.is_paid()).map(|b| b.bill_usd).sum()
}

pub fn collected_lbp(bills: &[Bill]) -> f64 {
    bills.iter().filter(|b| b.is_paid()).map(|b| b.bill_lbp).sum()
}

impl Overview {
    pub fn compute(readings: &[MeterReading], bills: &[Bill]) -> Self {
        let read_meters = readings.iter().filter(|r| r.is_complete()).count();
        let paid_bills = bills.iter().filter(|b| b.is_paid()).count();

        Self {
            total_meters: readings.len(),
            read_meters,
            reading_progress: percent(read_meters, readings.len()),
            total_bills: bills.len(),
            paid_bills,
            collection_progress: percent(paid_bills, bills.len()),
            collected_lbp: collected_lbp(bills),
            collected_usd: collected_usd(bills),
        }
    }
}

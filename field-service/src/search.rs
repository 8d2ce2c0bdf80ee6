use std::str::FromStr;

use meter_client::domain::{Bill, MeterReading};

/// Whitespace-separated, case-insensitive search terms. A record matches
/// when every term occurs somewhere in its searchable text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    tokens: Vec<String>,
}

impl SearchQuery {
    pub fn parse(query: &str) -> Self {
        Self {
            tokens: query
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn matches<T: Searchable + ?Sized>(&self, item: &T) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        let haystack = item.search_text().to_lowercase();
        self.tokens.iter().all(|t| haystack.contains(t.as_str()))
    }
}

pub trait Searchable {
    fn search_text(&self) -> String;
}

impl Searchable for MeterReading {
    fn search_text(&self) -> String {
        [
            self.name.as_str(),
            self.code.as_str(),
            self.installation_id.as_str(),
            self.branch_id.as_str(),
            self.compteur.as_str(),
        ]
        .join(" ")
    }
}

impl Searchable for Bill {
    fn search_text(&self) -> String {
        [
            self.name.as_str(),
            self.code.as_str(),
            self.installation_id.as_str(),
            self.branch_id.as_str(),
        ]
        .join(" ")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadingStatus {
    #[default]
    All,
    Read,
    Unread,
}

impl ReadingStatus {
    pub fn accepts(self, r: &MeterReading) -> bool {
        match self {
            Self::All => true,
            Self::Read => r.is_complete(),
            Self::Unread => !r.is_complete(),
        }
    }
}

impl FromStr for ReadingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "read" => Ok(Self::Read),
            "unread" => Ok(Self::Unread),
            other => Err(format!("unknown reading status '{other}' (all, read, unread)")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BillStatus {
    #[default]
    All,
    Paid,
    Unpaid,
}

impl BillStatus {
    pub fn accepts(self, b: &Bill) -> bool {
        match self {
            Self::All => true,
            Self::Paid => b.is_paid(),
            Self::Unpaid => !b.is_paid(),
        }
    }
}

impl FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "paid" => Ok(Self::Paid),
            "unpaid" => Ok(Self::Unpaid),
            other => Err(format!("unknown bill status '{other}' (all, paid, unpaid)")),
        }
    }
}

pub fn filter_readings<'a>(
    readings: &'a [MeterReading],
    query: &SearchQuery,
    status: ReadingStatus,
) -> Vec<&'a MeterReading> {
    readings
        .iter()
        .filter(|r| query.matches(*r) && status.accepts(r))
        .collect()
}

pub fn filter_bills<'a>(bills: &'a [Bill], query: &SearchQuery, status: BillStatus) -> Vec<&'a Bill> {
    bills
        .iter()
        .filter(|b| query.matches(*b) && status.accepts(b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use meter_client::domain::PaymentStatus;

    fn reading(name: &str, code: &str, value: Option<&str>) -> MeterReading {
        MeterReading {
            name: name.to_string(),
            code: code.to_string(),
            meter_value: value.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn tokens_are_conjunctive() {
        let readings = vec![reading("Jane Smith", "M1", None), reading("John Doe", "M2", None)];

        let hits = filter_readings(&readings, &SearchQuery::parse("jane smith"), ReadingStatus::All);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Jane Smith");

        let hits = filter_readings(&readings, &SearchQuery::parse("zz"), ReadingStatus::All);
        assert!(hits.is_empty());
    }

    #[test]
    fn tokens_may_span_fields_in_any_order() {
        let readings = vec![MeterReading {
            name: "Jane Smith".to_string(),
            branch_id: "B042".to_string(),
            compteur: "C998".to_string(),
            ..Default::default()
        }];

        let q = SearchQuery::parse("  c998   JANE b042 ");
        assert_eq!(filter_readings(&readings, &q, ReadingStatus::All).len(), 1);
    }

    #[test]
    fn empty_query_matches_everything() {
        let q = SearchQuery::parse("   ");
        assert!(q.is_empty());
        assert!(q.matches(&reading("Anyone", "M1", None)));
    }

    #[test]
    fn reading_status_filter() {
        let readings = vec![
            reading("A", "M1", Some("12")),
            reading("B", "M2", Some("")),
            reading("C", "M3", None),
        ];
        let all = SearchQuery::default();

        assert_eq!(filter_readings(&readings, &all, ReadingStatus::Read).len(), 1);
        assert_eq!(filter_readings(&readings, &all, ReadingStatus::Unread).len(), 2);
        assert_eq!(filter_readings(&readings, &all, ReadingStatus::All).len(), 3);
    }

    #[test]
    fn bill_search_and_status_filter() {
        let bills = vec![
            Bill {
                name: "Jane Smith".to_string(),
                installation_id: "INST1".to_string(),
                payment_status: PaymentStatus::Paid,
                ..Default::default()
            },
            Bill {
                name: "John Doe".to_string(),
                installation_id: "INST2".to_string(),
                ..Default::default()
            },
        ];

        let q = SearchQuery::parse("inst");
        assert_eq!(filter_bills(&bills, &q, BillStatus::All).len(), 2);
        assert_eq!(filter_bills(&bills, &q, BillStatus::Paid)[0].name, "Jane Smith");
        assert_eq!(filter_bills(&bills, &q, BillStatus::Unpaid)[0].name, "John Doe");
    }

    #[test]
    fn status_parsing() {
        assert_eq!("Unread".parse::<ReadingStatus>(), Ok(ReadingStatus::Unread));
        assert_eq!("paid".parse::<BillStatus>(), Ok(BillStatus::Paid));
        assert!("maybe".parse::<BillStatus>().is_err());
    }
}

use crate::utils::error::{EtlError, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// 所有輸出檔案共用的根目錄 / 物件前綴
pub const PARTITION_ROOT: &str = "piwik-data";

/// Piwik PRO API 的資料端點
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Sessions,
    Events,
    Query,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::Sessions, Endpoint::Events, Endpoint::Query];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Sessions => "sessions",
            Endpoint::Events => "events",
            Endpoint::Query => "query",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = EtlError;

    fn from_str(name: &str) -> Result<Self> {
        Endpoint::ALL
            .into_iter()
            .find(|endpoint| endpoint.as_str() == name)
            .ok_or_else(|| EtlError::InvalidConfigValueError {
                field: "endpoint".to_string(),
                value: name.to_string(),
                reason: format!(
                    "Unknown endpoint. Valid endpoints: {}",
                    Endpoint::ALL.map(|e| e.as_str()).join(", ")
                ),
            })
    }
}

/// 含頭含尾的日期區間，`start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(EtlError::InvalidConfigValueError {
                field: "date_range".to_string(),
                value: format!("{}..{}", start, end),
                reason: "start date must not be after end date".to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// 天數 (含頭含尾)
    pub fn num_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// 依序走訪區間內每一天
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// 儲存位置：`piwik-data/{YYYY}/{MM}/{DD}/{endpoint}.json`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn new(date: NaiveDate, endpoint: Endpoint) -> Self {
        Self(format!(
            "{}/{:04}/{:02}/{:02}/{}.json",
            PARTITION_ROOT,
            date.year(),
            date.month(),
            date.day(),
            endpoint
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 一次執行要處理的日期與端點
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    range: DateRange,
    endpoints: Vec<Endpoint>,
}

impl RunPlan {
    pub fn new(range: DateRange, endpoints: Vec<Endpoint>) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(EtlError::InvalidConfigValueError {
                field: "endpoints".to_string(),
                value: String::new(),
                reason: "at least one endpoint is required".to_string(),
            });
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = endpoints.iter().find(|e| !seen.insert(**e)) {
            return Err(EtlError::InvalidConfigValueError {
                field: "endpoints".to_string(),
                value: duplicate.to_string(),
                reason: "endpoint listed more than once".to_string(),
            });
        }

        Ok(Self { range, endpoints })
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn partition_count(&self) -> usize {
        self.range.num_days() * self.endpoints.len()
    }

    /// 依日期遞增、端點宣告順序產生 (date, endpoint)
    pub fn partitions(&self) -> impl Iterator<Item = (NaiveDate, Endpoint)> + '_ {
        self.range
            .days()
            .flat_map(move |day| self.endpoints.iter().map(move |endpoint| (day, *endpoint)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPartition {
    pub date: NaiveDate,
    pub endpoint: Endpoint,
    pub key: PartitionKey,
}

/// 執行結果摘要
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dates_processed: usize,
    pub persisted: Vec<PartitionKey>,
    pub skipped: Vec<SkippedPartition>,
}

impl RunSummary {
    pub fn partitions_written(&self) -> usize {
        self.persisted.len()
    }

    pub fn partitions_skipped(&self) -> usize {
        self.skipped.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_january_range_visits_each_day_once_in_order() {
        let range = DateRange::new(date(2021, 1, 1), date(2021, 1, 31)).unwrap();
        let days: Vec<NaiveDate> = range.days().collect();

        assert_eq!(range.num_days(), 31);
        assert_eq!(days.len(), 31);
        assert_eq!(days[0], date(2021, 1, 1));
        assert_eq!(days[30], date(2021, 1, 31));
        assert!(days.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_range_crossing_month_and_leap_day() {
        let range = DateRange::new(date(2020, 2, 28), date(2020, 3, 1)).unwrap();
        let days: Vec<NaiveDate> = range.days().collect();
        assert_eq!(days, vec![date(2020, 2, 28), date(2020, 2, 29), date(2020, 3, 1)]);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = DateRange::new(date(2021, 1, 2), date(2021, 1, 1)).unwrap_err();
        assert!(matches!(err, EtlError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::single(date(2021, 1, 1));
        assert_eq!(range.days().count(), 1);
        assert_eq!(range.start(), range.end());
    }

    #[test]
    fn test_partition_key_is_zero_padded() {
        let key = PartitionKey::new(date(2021, 3, 7), Endpoint::Sessions);
        assert_eq!(key.as_str(), "piwik-data/2021/03/07/sessions.json");

        let key = PartitionKey::new(date(987, 12, 25), Endpoint::Query);
        assert_eq!(key.as_str(), "piwik-data/0987/12/25/query.json");
    }

    #[test]
    fn test_partition_keys_do_not_collide() {
        let range = DateRange::new(date(2021, 1, 1), date(2021, 1, 31)).unwrap();
        let plan = RunPlan::new(range, Endpoint::ALL.to_vec()).unwrap();
        let keys: HashSet<PartitionKey> = plan
            .partitions()
            .map(|(day, endpoint)| PartitionKey::new(day, endpoint))
            .collect();
        assert_eq!(keys.len(), plan.partition_count());
        assert_eq!(keys.len(), 93);
    }

    #[test]
    fn test_endpoint_parsing() {
        assert_eq!("sessions".parse::<Endpoint>().unwrap(), Endpoint::Sessions);
        assert_eq!("events".parse::<Endpoint>().unwrap(), Endpoint::Events);
        assert_eq!("query".parse::<Endpoint>().unwrap(), Endpoint::Query);
        assert!("analytics".parse::<Endpoint>().is_err());
        assert!("Sessions".parse::<Endpoint>().is_err());
    }

    #[test]
    fn test_plan_rejects_empty_and_duplicate_endpoints() {
        let range = DateRange::single(date(2021, 1, 1));
        assert!(RunPlan::new(range, vec![]).is_err());
        assert!(RunPlan::new(range, vec![Endpoint::Events, Endpoint::Events]).is_err());
    }

    #[test]
    fn test_plan_order_is_date_major() {
        let range = DateRange::new(date(2021, 1, 1), date(2021, 1, 2)).unwrap();
        let plan = RunPlan::new(range, vec![Endpoint::Events, Endpoint::Sessions]).unwrap();
        let order: Vec<(NaiveDate, Endpoint)> = plan.partitions().collect();
        assert_eq!(
            order,
            vec![
                (date(2021, 1, 1), Endpoint::Events),
                (date(2021, 1, 1), Endpoint::Sessions),
                (date(2021, 1, 2), Endpoint::Events),
                (date(2021, 1, 2), Endpoint::Sessions),
            ]
        );
    }
}

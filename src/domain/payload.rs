// 各端點共用同一個請求外框，只有欄位清單不同

use crate::domain::model::Endpoint;
use crate::utils::error::Result;
use chrono::NaiveDate;
use serde::Serialize;

pub const DEFAULT_LIMIT: u32 = 10_000;

/// 欄位描述：原始欄位，或套用 transformation 的衍生欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ColumnDescriptor {
    Column {
        column_id: &'static str,
    },
    Transformed {
        transformation_id: &'static str,
        column_id: &'static str,
    },
}

impl ColumnDescriptor {
    pub const fn column(column_id: &'static str) -> Self {
        ColumnDescriptor::Column { column_id }
    }

    pub const fn transformed(transformation_id: &'static str, column_id: &'static str) -> Self {
        ColumnDescriptor::Transformed {
            transformation_id,
            column_id,
        }
    }

    pub fn column_id(&self) -> &'static str {
        match self {
            ColumnDescriptor::Column { column_id }
            | ColumnDescriptor::Transformed { column_id, .. } => column_id,
        }
    }
}

const SESSION_COLUMNS: &[ColumnDescriptor] = &[
    ColumnDescriptor::transformed("to_date", "timestamp"),
    ColumnDescriptor::column("session_id"),
    ColumnDescriptor::column("visitor_id"),
    ColumnDescriptor::column("visitor_returning"),
    ColumnDescriptor::column("source_medium"),
    ColumnDescriptor::column("referrer_type"),
    ColumnDescriptor::column("campaign_name"),
    ColumnDescriptor::column("device_type"),
    ColumnDescriptor::column("browser_name"),
    ColumnDescriptor::column("operating_system"),
    ColumnDescriptor::column("location_country_name"),
    ColumnDescriptor::column("session_entry_url"),
    ColumnDescriptor::column("session_total_page_views"),
    ColumnDescriptor::column("session_total_events"),
    ColumnDescriptor::column("session_total_time"),
    ColumnDescriptor::column("session_goals"),
];

const EVENT_COLUMNS: &[ColumnDescriptor] = &[
    ColumnDescriptor::transformed("to_date", "timestamp"),
    ColumnDescriptor::column("event_id"),
    ColumnDescriptor::column("session_id"),
    ColumnDescriptor::column("visitor_id"),
    ColumnDescriptor::column("event_type"),
    ColumnDescriptor::column("event_url"),
    ColumnDescriptor::column("event_title"),
    ColumnDescriptor::column("custom_event_category"),
    ColumnDescriptor::column("custom_event_action"),
    ColumnDescriptor::column("custom_event_name"),
    ColumnDescriptor::column("custom_event_value"),
    ColumnDescriptor::column("page_view_index"),
];

const QUERY_COLUMNS: &[ColumnDescriptor] = &[
    ColumnDescriptor::transformed("to_date", "timestamp"),
    ColumnDescriptor::column("source_medium"),
    ColumnDescriptor::column("device_type"),
    ColumnDescriptor::column("location_country_name"),
    ColumnDescriptor::column("visitors"),
    ColumnDescriptor::column("sessions"),
    ColumnDescriptor::column("page_views"),
    ColumnDescriptor::column("events"),
    ColumnDescriptor::column("bounce_rate"),
    ColumnDescriptor::column("avg_session_time"),
    ColumnDescriptor::column("goal_conversions"),
];

/// 每個端點對應的欄位清單
pub fn columns_for(endpoint: Endpoint) -> &'static [ColumnDescriptor] {
    match endpoint {
        Endpoint::Sessions => SESSION_COLUMNS,
        Endpoint::Events => EVENT_COLUMNS,
        Endpoint::Query => QUERY_COLUMNS,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub operator: &'static str,
    pub conditions: Vec<serde_json::Value>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            operator: "and",
            conditions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionRequest {
    pub website_id: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub filters: Filters,
    pub offset: u32,
    pub limit: u32,
    pub format: &'static str,
    pub columns: &'static [ColumnDescriptor],
}

impl ExtractionRequest {
    pub fn for_endpoint(
        endpoint: Endpoint,
        website_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Self {
        Self {
            website_id: website_id.to_string(),
            date_from,
            date_to,
            filters: Filters::default(),
            offset: 0,
            limit: DEFAULT_LIMIT,
            format: "json",
            columns: columns_for(endpoint),
        }
    }
}

/// 依端點名稱建立請求內容，未知端點直接回傳設定錯誤
pub fn build_payload(
    endpoint: &str,
    website_id: &str,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> Result<ExtractionRequest> {
    let endpoint: Endpoint = endpoint.parse()?;
    Ok(ExtractionRequest::for_endpoint(
        endpoint, website_id, date_from, date_to,
    ))
}

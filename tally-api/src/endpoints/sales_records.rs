use super::{MessageResponse, Page, RecordId, RecordQuery, SortOrder, StoreId, Won};
use crate::macros::query_setters;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{Method, Request, RequestData};

// Common

/// Takings for one day, split by sales channel
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesChannels {
    #[serde(default)]
    pub baemin: Won,
    #[serde(default)]
    pub baemin1: Won,
    #[serde(default)]
    pub coupang_eats: Won,
    #[serde(default)]
    pub yogiyo: Won,
    /// Older responses spell this platform `ttaenggeoyo`
    #[serde(default, alias = "ttaenggeoyo")]
    pub ddangyo: Won,
    #[serde(default)]
    pub brand_delivery: Won,
    #[serde(default)]
    pub takeout: Won,
    #[serde(default)]
    pub hall: Won,
}

impl SalesChannels {
    pub fn total(&self) -> Won {
        [
            self.baemin,
            self.baemin1,
            self.coupang_eats,
            self.yogiyo,
            self.ddangyo,
            self.brand_delivery,
            self.takeout,
            self.hall,
        ]
        .into_iter()
        .sum()
    }

    /// Everything sold through a delivery platform or the store's own delivery
    pub fn delivery_total(&self) -> Won {
        self.total() - self.takeout - self.hall
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    pub id: RecordId,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub channels: SalesChannels,
    #[serde(default)]
    pub total_sales: Won,
    #[serde(default)]
    pub etc: String,
}

/// Body for creating or replacing a sales record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecordForm {
    date: NaiveDate,
    #[serde(flatten)]
    channels: SalesChannels,
    total_sales: Won,
    etc: String,
}

impl SalesRecordForm {
    pub fn new(date: NaiveDate, channels: SalesChannels) -> Self {
        Self {
            date,
            channels,
            total_sales: channels.total(),
            etc: String::new(),
        }
    }

    pub fn etc(mut self, etc: impl Into<String>) -> Self {
        self.etc = etc.into();
        self
    }

    pub fn total_sales(&self) -> Won {
        self.total_sales
    }
}

impl From<&SalesRecord> for SalesRecordForm {
    fn from(record: &SalesRecord) -> Self {
        SalesRecordForm::new(record.date, record.channels).etc(record.etc.clone())
    }
}

// Requests

#[derive(Debug, Clone)]
pub struct ListSalesRecords {
    store_id: StoreId,
    query: RecordQuery,
}

impl ListSalesRecords {
    pub fn new(store_id: StoreId) -> Self {
        Self {
            store_id,
            query: RecordQuery::default(),
        }
    }

    query_setters!(page: u32, size: u32, sort_order: SortOrder);

    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.query.set_date_range(start, end);
        self
    }
}

impl Request for ListSalesRecords {
    type Data = RecordQuery;
    type Response = Page<SalesRecord>;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/stores/{}/sales-records", self.store_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(&self.query)
    }
}

#[derive(Debug, Clone)]
pub struct GetSalesRecord {
    record_id: RecordId,
}

impl GetSalesRecord {
    pub fn new(record_id: RecordId) -> Self {
        Self { record_id }
    }
}

impl Request for GetSalesRecord {
    type Data = ();
    type Response = SalesRecord;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/sales-records/{}", self.record_id).into()
    }
}

#[derive(Debug, Clone)]
pub struct CreateSalesRecord {
    store_id: StoreId,
    form: SalesRecordForm,
}

impl CreateSalesRecord {
    pub fn new(store_id: StoreId, form: SalesRecordForm) -> Self {
        Self { store_id, form }
    }
}

impl Request for CreateSalesRecord {
    type Data = SalesRecordForm;
    type Response = MessageResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/stores/{}/sales-records", self.store_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.form)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateSalesRecord {
    record_id: RecordId,
    form: SalesRecordForm,
}

impl UpdateSalesRecord {
    pub fn new(record_id: RecordId, form: SalesRecordForm) -> Self {
        Self { record_id, form }
    }
}

impl Request for UpdateSalesRecord {
    type Data = SalesRecordForm;
    type Response = MessageResponse;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/sales-records/{}", self.record_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.form)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteSalesRecord {
    record_id: RecordId,
}

impl DeleteSalesRecord {
    pub fn new(record_id: RecordId) -> Self {
        Self { record_id }
    }
}

impl Request for DeleteSalesRecord {
    type Data = ();
    type Response = MessageResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/sales-records/{}", self.record_id).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_totals_every_channel() {
        let channels = SalesChannels {
            baemin: Won::new(10_000),
            coupang_eats: Won::new(5_000),
            ddangyo: Won::new(2_000),
            hall: Won::new(30_000),
            takeout: Won::new(1_000),
            ..SalesChannels::default()
        };
        let form = SalesRecordForm::new(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), channels)
            .etc("rainy day");

        assert_eq!(form.total_sales(), Won::new(48_000));
        assert_eq!(channels.delivery_total(), Won::new(17_000));

        let body = serde_json::to_value(&form).unwrap();
        assert_eq!(body["totalSales"], 48_000);
        assert_eq!(body["coupangEats"], 5_000);
        assert_eq!(body["date"], "2025-03-01");
        assert_eq!(body["etc"], "rainy day");
    }

    #[test]
    fn test_record_accepts_legacy_platform_name() {
        let record: SalesRecord = serde_json::from_value(json!({
            "id": 7,
            "date": "2025-03-02",
            "baemin": 1000,
            "ttaenggeoyo": 2500,
            "hall": 4000,
            "totalSales": 7500
        }))
        .unwrap();

        assert_eq!(record.channels.ddangyo, Won::new(2500));
        assert_eq!(record.channels.total(), record.total_sales);
        assert_eq!(record.etc, "");
    }

    #[test]
    fn test_list_endpoint_and_query() {
        let req = ListSalesRecords::new(3)
            .page(2)
            .size(20)
            .sort_order(SortOrder::Asc);

        assert_eq!(req.endpoint(), "/stores/3/sales-records");
        assert_eq!(req.query.page, 2);
        assert_eq!(req.query.size, 20);
        assert_eq!(req.query.date_range(), None);
    }
}

use super::{MessageResponse, Page, RecordId, RecordQuery, SortOrder, StoreId, Won};
use crate::macros::query_setters;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{Method, Request, RequestData};

// Common

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    /// Row number within the current page
    pub no: Option<u64>,
    pub id: RecordId,
    pub amount: Won,
    pub date: NaiveDate,
    /// Expense category code, e.g. `INGREDIENTS`
    pub detail: String,
    pub detail_ko: Option<String>,
    /// Payment method code, e.g. `CARD`
    pub payment: String,
    pub payment_ko: Option<String>,
    #[serde(default)]
    pub etc: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecordForm {
    pub amount: Won,
    pub date: NaiveDate,
    pub detail: String,
    pub payment: String,
    pub etc: String,
}

impl ExpenseRecordForm {
    pub fn new(
        date: NaiveDate,
        amount: Won,
        detail: impl Into<String>,
        payment: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            date,
            detail: detail.into(),
            payment: payment.into(),
            etc: String::new(),
        }
    }

    pub fn etc(mut self, etc: impl Into<String>) -> Self {
        self.etc = etc.into();
        self
    }
}

impl From<&ExpenseRecord> for ExpenseRecordForm {
    fn from(record: &ExpenseRecord) -> Self {
        Self {
            amount: record.amount,
            date: record.date,
            detail: record.detail.clone(),
            payment: record.payment.clone(),
            etc: record.etc.clone(),
        }
    }
}

// Requests

#[derive(Debug, Clone)]
pub struct ListExpenseRecords {
    store_id: StoreId,
    query: RecordQuery,
}

impl ListExpenseRecords {
    pub fn new(store_id: StoreId) -> Self {
        Self {
            store_id,
            query: RecordQuery::default(),
        }
    }

    query_setters!(page: u32, size: u32, sort_order: SortOrder, opt payment: String);

    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.query.set_date_range(start, end);
        self
    }
}

impl Request for ListExpenseRecords {
    type Data = RecordQuery;
    type Response = Page<ExpenseRecord>;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/stores/{}/expense-records", self.store_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(&self.query)
    }
}

#[derive(Debug, Clone)]
pub struct GetExpenseRecord {
    record_id: RecordId,
}

impl GetExpenseRecord {
    pub fn new(record_id: RecordId) -> Self {
        Self { record_id }
    }
}

impl Request for GetExpenseRecord {
    type Data = ();
    type Response = ExpenseRecord;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/expense-records/{}", self.record_id).into()
    }
}

#[derive(Debug, Clone)]
pub struct CreateExpenseRecord {
    store_id: StoreId,
    form: ExpenseRecordForm,
}

impl CreateExpenseRecord {
    pub fn new(store_id: StoreId, form: ExpenseRecordForm) -> Self {
        Self { store_id, form }
    }
}

impl Request for CreateExpenseRecord {
    type Data = ExpenseRecordForm;
    type Response = MessageResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/stores/{}/expense-records", self.store_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.form)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateExpenseRecord {
    record_id: RecordId,
    form: ExpenseRecordForm,
}

impl UpdateExpenseRecord {
    pub fn new(record_id: RecordId, form: ExpenseRecordForm) -> Self {
        Self { record_id, form }
    }
}

impl Request for UpdateExpenseRecord {
    type Data = ExpenseRecordForm;
    type Response = MessageResponse;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/expense-records/{}", self.record_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.form)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteExpenseRecord {
    record_id: RecordId,
}

impl DeleteExpenseRecord {
    pub fn new(record_id: RecordId) -> Self {
        Self { record_id }
    }
}

impl Request for DeleteExpenseRecord {
    type Data = ();
    type Response = MessageResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/expense-records/{}", self.record_id).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_filter_is_optional() {
        let req = ListExpenseRecords::new(1);
        let query = serde_json::to_value(&req.query).unwrap();
        assert!(query.get("payment").is_none());

        let req = req.payment("CARD").between(
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
        );
        let query = serde_json::to_value(&req.query).unwrap();
        assert_eq!(query["payment"], "CARD");
        assert_eq!(query["startDate"], "2025-02-01");
    }

    #[test]
    fn test_form_round_trips_from_record() {
        let record: ExpenseRecord = serde_json::from_str(
            r#"{"id": 4, "amount": 32000, "date": "2025-02-03", "detail": "INGREDIENTS",
                "detailKo": "식자재", "payment": "CARD", "paymentKo": "카드", "etc": ""}"#,
        )
        .unwrap();

        let form = ExpenseRecordForm::from(&record);
        assert_eq!(form.amount, Won::new(32000));
        assert_eq!(form.detail, "INGREDIENTS");
        assert_eq!(record.no, None);
        assert_eq!(
            UpdateExpenseRecord::new(record.id, form).endpoint(),
            "/expense-records/4"
        );
    }
}

use super::{Period, StoreId, Summary, Won};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{Request, RequestData};

// Common

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesExpenseStats {
    pub sales_summary: Summary,
    pub expense_summary: Summary,
}

impl SalesExpenseStats {
    /// Sales minus expenses for each period in the sales series
    pub fn profit(&self) -> Vec<(String, Won)> {
        let labels: Vec<&str> = self.sales_summary.labels().collect();
        let expenses = self.expense_summary.aligned_to(labels.iter().copied());
        self.sales_summary
            .periods()
            .zip(expenses)
            .map(|(sales, expense)| (sales.label.clone(), sales.amount - expense))
            .collect()
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesTypeStats {
    pub hall_summary: Summary,
    pub pickup_summary: Summary,
    pub delivery_summary: Summary,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryPlatformStats {
    pub baemin_summary: Summary,
    pub baemin1_summary: Summary,
    pub coupang_eats_summary: Summary,
    pub yogiyo_summary: Summary,
    pub ddangyo_summary: Summary,
    pub brand_summary: Summary,
}

impl DeliveryPlatformStats {
    pub fn by_platform(&self) -> [(&'static str, &Summary); 6] {
        [
            ("baemin", &self.baemin_summary),
            ("baemin1", &self.baemin1_summary),
            ("coupangEats", &self.coupang_eats_summary),
            ("yogiyo", &self.yogiyo_summary),
            ("ddangyo", &self.ddangyo_summary),
            ("brand", &self.brand_summary),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionQuery {
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    pub exclude_delivery_commission: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFeeQuery {
    pub year: i32,
    pub exclude_delivery_fee: bool,
}

// Requests

#[derive(Debug, Clone)]
pub struct GetSalesExpenseStats {
    store_id: StoreId,
    period: Period,
    query: CommissionQuery,
}

impl GetSalesExpenseStats {
    pub fn new(store_id: StoreId, period: Period, year: i32) -> Self {
        Self {
            store_id,
            period,
            query: CommissionQuery {
                year,
                month: None,
                exclude_delivery_commission: false,
            },
        }
    }

    pub fn month(mut self, month: u32) -> Self {
        self.query.month = Some(month);
        self
    }

    pub fn exclude_delivery_commission(mut self, exclude: bool) -> Self {
        self.query.exclude_delivery_commission = exclude;
        self
    }
}

impl Request for GetSalesExpenseStats {
    type Data = CommissionQuery;
    type Response = SalesExpenseStats;

    fn endpoint(&self) -> Cow<'_, str> {
        format!(
            "/stores/{}/stats/sales-expense/{}",
            self.store_id, self.period
        )
        .into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(&self.query)
    }
}

#[derive(Debug, Clone)]
pub struct GetSalesTypeStats {
    store_id: StoreId,
    query: DeliveryFeeQuery,
}

impl GetSalesTypeStats {
    pub fn new(store_id: StoreId, year: i32) -> Self {
        Self {
            store_id,
            query: DeliveryFeeQuery {
                year,
                exclude_delivery_fee: false,
            },
        }
    }

    pub fn exclude_delivery_fee(mut self, exclude: bool) -> Self {
        self.query.exclude_delivery_fee = exclude;
        self
    }
}

impl Request for GetSalesTypeStats {
    type Data = DeliveryFeeQuery;
    type Response = SalesTypeStats;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/stores/{}/stats/sales-type", self.store_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(&self.query)
    }
}

#[derive(Debug, Clone)]
pub struct GetDeliveryPlatformStats {
    store_id: StoreId,
    period: Period,
    query: CommissionQuery,
}

impl GetDeliveryPlatformStats {
    pub fn new(store_id: StoreId, period: Period, year: i32) -> Self {
        Self {
            store_id,
            period,
            query: CommissionQuery {
                year,
                month: None,
                exclude_delivery_commission: false,
            },
        }
    }

    pub fn month(mut self, month: u32) -> Self {
        self.query.month = Some(month);
        self
    }

    pub fn exclude_delivery_commission(mut self, exclude: bool) -> Self {
        self.query.exclude_delivery_commission = exclude;
        self
    }
}

impl Request for GetDeliveryPlatformStats {
    type Data = CommissionQuery;
    type Response = DeliveryPlatformStats;

    fn endpoint(&self) -> Cow<'_, str> {
        format!(
            "/stores/{}/stats/delivery-platform/{}",
            self.store_id, self.period
        )
        .into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(&self.query)
    }
}

use super::{MessageResponse, StoreId};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{Method, Request, RequestData};

// Common

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub store_name: String,
    pub business_type: String,
    pub road_address: Option<String>,
    pub detail_address: Option<String>,
    #[serde(default)]
    pub description: String,
    pub zip_code: Option<String>,
    pub file_url: Option<String>,
}

/// A store profile without its id, as sent on create and update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreForm {
    pub store_name: String,
    pub business_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub road_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_address: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

impl StoreForm {
    pub fn new(store_name: impl Into<String>, business_type: impl Into<String>) -> Self {
        Self {
            store_name: store_name.into(),
            business_type: business_type.into(),
            road_address: None,
            detail_address: None,
            description: String::new(),
            zip_code: None,
        }
    }

    pub fn address(
        mut self,
        zip_code: impl Into<String>,
        road_address: impl Into<String>,
        detail_address: impl Into<String>,
    ) -> Self {
        self.zip_code = Some(zip_code.into());
        self.road_address = Some(road_address.into());
        self.detail_address = Some(detail_address.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl From<&Store> for StoreForm {
    fn from(store: &Store) -> Self {
        Self {
            store_name: store.store_name.clone(),
            business_type: store.business_type.clone(),
            road_address: store.road_address.clone(),
            detail_address: store.detail_address.clone(),
            description: store.description.clone(),
            zip_code: store.zip_code.clone(),
        }
    }
}

// Requests

#[derive(Debug, Clone)]
pub struct CreateStore {
    form: StoreForm,
}

impl CreateStore {
    pub fn new(form: StoreForm) -> Self {
        Self { form }
    }
}

impl Request for CreateStore {
    type Data = StoreForm;
    type Response = MessageResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/stores".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.form)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateStore {
    store_id: StoreId,
    form: StoreForm,
}

impl UpdateStore {
    pub fn new(store_id: StoreId, form: StoreForm) -> Self {
        Self { store_id, form }
    }
}

impl Request for UpdateStore {
    type Data = StoreForm;
    type Response = MessageResponse;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/stores/{}", self.store_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.form)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteStore {
    store_id: StoreId,
}

impl DeleteStore {
    pub fn new(store_id: StoreId) -> Self {
        Self { store_id }
    }
}

impl Request for DeleteStore {
    type Data = ();
    type Response = MessageResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/stores/{}", self.store_id).into()
    }
}

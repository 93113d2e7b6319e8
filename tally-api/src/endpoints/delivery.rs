use super::{MessageResponse, StoreId, Won};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{Method, Request, RequestData};

// Common

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    Beamin,
    Beamin1,
    Yogiyo,
    CoupangEats,
    Ddangyo,
    Brand,
}

impl Platform {
    pub const ALL: [Platform; 6] = [
        Platform::Beamin,
        Platform::Beamin1,
        Platform::Yogiyo,
        Platform::CoupangEats,
        Platform::Ddangyo,
        Platform::Brand,
    ];
}

/// Which delivery platforms a store sells through and what each one keeps.
///
/// Commission rates are percentages, e.g. `6.8` for 6.8%.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryPlatformSettings {
    pub beamin_enabled: bool,
    pub beamin1_enabled: bool,
    pub yogiyo_enabled: bool,
    pub coupang_eats_enabled: bool,
    pub ddangyo_enabled: bool,
    pub brand_enabled: bool,
    pub beamin_commission_rate: f64,
    pub beamin1_commission_rate: f64,
    pub yogiyo_commission_rate: f64,
    pub coupang_eats_commission_rate: f64,
    pub ddangyo_commission_rate: f64,
    pub brand_commission_rate: f64,
}

impl DeliveryPlatformSettings {
    pub fn is_enabled(&self, platform: Platform) -> bool {
        match platform {
            Platform::Beamin => self.beamin_enabled,
            Platform::Beamin1 => self.beamin1_enabled,
            Platform::Yogiyo => self.yogiyo_enabled,
            Platform::CoupangEats => self.coupang_eats_enabled,
            Platform::Ddangyo => self.ddangyo_enabled,
            Platform::Brand => self.brand_enabled,
        }
    }

    pub fn commission_rate(&self, platform: Platform) -> f64 {
        match platform {
            Platform::Beamin => self.beamin_commission_rate,
            Platform::Beamin1 => self.beamin1_commission_rate,
            Platform::Yogiyo => self.yogiyo_commission_rate,
            Platform::CoupangEats => self.coupang_eats_commission_rate,
            Platform::Ddangyo => self.ddangyo_commission_rate,
            Platform::Brand => self.brand_commission_rate,
        }
    }

    pub fn enabled_platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        Platform::ALL
            .into_iter()
            .filter(|platform| self.is_enabled(*platform))
    }

    /// What the store keeps from `gross` after the platform's commission
    pub fn net_of_commission(&self, platform: Platform, gross: Won) -> Won {
        let rate = self.commission_rate(platform).clamp(0.0, 100.0);
        Won::from(gross.inner() as f64 * (100.0 - rate) / 100.0)
    }
}

// Requests

#[derive(Debug, Clone)]
pub struct GetDeliverySettings {
    store_id: StoreId,
}

impl GetDeliverySettings {
    pub fn new(store_id: StoreId) -> Self {
        Self { store_id }
    }
}

impl Request for GetDeliverySettings {
    type Data = ();
    type Response = DeliveryPlatformSettings;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/stores/{}/delivery-platforms", self.store_id).into()
    }
}

#[derive(Debug, Clone)]
pub struct UpdateDeliverySettings {
    store_id: StoreId,
    settings: DeliveryPlatformSettings,
}

impl UpdateDeliverySettings {
    pub fn new(store_id: StoreId, settings: DeliveryPlatformSettings) -> Self {
        Self { store_id, settings }
    }
}

impl Request for UpdateDeliverySettings {
    type Data = DeliveryPlatformSettings;
    type Response = MessageResponse;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/stores/{}/delivery-platforms", self.store_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.settings)
    }
}

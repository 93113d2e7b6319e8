use crate::endpoints::{
    Period, RecordId, StoreId,
    delivery::{DeliveryPlatformSettings, GetDeliverySettings, UpdateDeliverySettings},
    expense_records::{
        CreateExpenseRecord, DeleteExpenseRecord, ExpenseRecordForm, GetExpenseRecord,
        ListExpenseRecords, UpdateExpenseRecord,
    },
    sales_records::{
        CreateSalesRecord, DeleteSalesRecord, GetSalesRecord, ListSalesRecords, SalesRecordForm,
        UpdateSalesRecord,
    },
    stats::{GetDeliveryPlatformStats, GetSalesExpenseStats, GetSalesTypeStats},
    stores::{CreateStore, DeleteStore, StoreForm, UpdateStore},
    users::{
        ChangePassword, GetCurrentUser, ProfileForm, Register, SignupForm, UpdateProfile,
    },
};
use secrecy::SecretString;

#[derive(Default)]
pub struct SalesRecordRepository {
    store_id: StoreId,
}

impl SalesRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, store_id: StoreId) -> Self {
        self.store_id = store_id;
        self
    }

    pub fn list(&self) -> ListSalesRecords {
        ListSalesRecords::new(self.store_id)
    }

    pub fn get(&self, record_id: RecordId) -> GetSalesRecord {
        GetSalesRecord::new(record_id)
    }

    pub fn create(&self, form: SalesRecordForm) -> CreateSalesRecord {
        CreateSalesRecord::new(self.store_id, form)
    }

    pub fn update(&self, record_id: RecordId, form: SalesRecordForm) -> UpdateSalesRecord {
        UpdateSalesRecord::new(record_id, form)
    }

    pub fn delete(&self, record_id: RecordId) -> DeleteSalesRecord {
        DeleteSalesRecord::new(record_id)
    }
}

#[derive(Default)]
pub struct ExpenseRecordRepository {
    store_id: StoreId,
}

impl ExpenseRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, store_id: StoreId) -> Self {
        self.store_id = store_id;
        self
    }

    pub fn list(&self) -> ListExpenseRecords {
        ListExpenseRecords::new(self.store_id)
    }

    pub fn get(&self, record_id: RecordId) -> GetExpenseRecord {
        GetExpenseRecord::new(record_id)
    }

    pub fn create(&self, form: ExpenseRecordForm) -> CreateExpenseRecord {
        CreateExpenseRecord::new(self.store_id, form)
    }

    pub fn update(&self, record_id: RecordId, form: ExpenseRecordForm) -> UpdateExpenseRecord {
        UpdateExpenseRecord::new(record_id, form)
    }

    pub fn delete(&self, record_id: RecordId) -> DeleteExpenseRecord {
        DeleteExpenseRecord::new(record_id)
    }
}

pub struct StoreRepository;

impl StoreRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn create(&self, form: StoreForm) -> CreateStore {
        CreateStore::new(form)
    }

    pub fn update(&self, store_id: StoreId, form: StoreForm) -> UpdateStore {
        UpdateStore::new(store_id, form)
    }

    pub fn delete(&self, store_id: StoreId) -> DeleteStore {
        DeleteStore::new(store_id)
    }

    pub fn delivery_settings(&self, store_id: StoreId) -> GetDeliverySettings {
        GetDeliverySettings::new(store_id)
    }

    pub fn update_delivery_settings(
        &self,
        store_id: StoreId,
        settings: DeliveryPlatformSettings,
    ) -> UpdateDeliverySettings {
        UpdateDeliverySettings::new(store_id, settings)
    }
}

#[derive(Default)]
pub struct StatsRepository {
    store_id: StoreId,
}

impl StatsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, store_id: StoreId) -> Self {
        self.store_id = store_id;
        self
    }

    pub fn sales_expense(&self, period: Period, year: i32) -> GetSalesExpenseStats {
        GetSalesExpenseStats::new(self.store_id, period, year)
    }

    pub fn sales_type(&self, year: i32) -> GetSalesTypeStats {
        GetSalesTypeStats::new(self.store_id, year)
    }

    pub fn delivery_platform(&self, period: Period, year: i32) -> GetDeliveryPlatformStats {
        GetDeliveryPlatformStats::new(self.store_id, period, year)
    }
}

pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn me(&self) -> GetCurrentUser {
        GetCurrentUser
    }

    pub fn update_profile(&self, form: ProfileForm) -> UpdateProfile {
        UpdateProfile::new(form)
    }

    pub fn change_password(
        &self,
        current_password: SecretString,
        new_password: SecretString,
    ) -> ChangePassword {
        ChangePassword::new(current_password, new_password)
    }

    pub fn register(&self, form: SignupForm) -> Register {
        Register::new(form)
    }
}

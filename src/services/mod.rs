pub mod audit;
pub mod customers;
pub mod expenses;
pub mod inventory;
pub mod invoicing;
pub mod jobs;
pub mod numbering;
pub mod reminders;
pub mod reports;
pub mod settings;
pub mod users;
pub mod vehicles;

use std::sync::Arc;

use crate::db::DbPool;

/// Services layer that encapsulates the business logic used by HTTP
/// handlers. All services share one connection pool and one audit
/// recorder.
#[derive(Clone)]
pub struct AppServices {
    pub audit: audit::AuditRecorder,
    pub customers: customers::CustomersService,
    pub vehicles: vehicles::VehiclesService,
    pub jobs: jobs::JobsService,
    pub inventory: inventory::InventoryService,
    pub invoicing: invoicing::InvoicingService,
    pub expenses: expenses::ExpensesService,
    pub reminders: reminders::RemindersService,
    pub settings: settings::SettingsService,
    pub users: users::UsersService,
    pub reports: reports::ReportsService,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>) -> Self {
        let audit = audit::AuditRecorder::new(db.clone());
        Self {
            customers: customers::CustomersService::new(db.clone(), audit.clone()),
            vehicles: vehicles::VehiclesService::new(db.clone(), audit.clone()),
            jobs: jobs::JobsService::new(db.clone(), audit.clone()),
            inventory: inventory::InventoryService::new(db.clone(), audit.clone()),
            invoicing: invoicing::InvoicingService::new(db.clone(), audit.clone()),
            expenses: expenses::ExpensesService::new(db.clone(), audit.clone()),
            reminders: reminders::RemindersService::new(db.clone(), audit.clone()),
            settings: settings::SettingsService::new(db.clone(), audit.clone()),
            users: users::UsersService::new(db.clone(), audit.clone()),
            reports: reports::ReportsService::new(db),
            audit,
        }
    }
}

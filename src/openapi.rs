use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::AppState;

/// OpenAPI document for the REST surface, served at `/docs`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Autoshop API",
        description = "Auto repair shop management backend: customers, vehicles, work orders, inventory, invoicing, and payments."
    ),
    paths(
        crate::handlers::auth::login,
        crate::handlers::customers::list_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::update_customer,
        crate::handlers::customers::delete_customer,
        crate::handlers::vehicles::list_vehicles,
        crate::handlers::vehicles::get_vehicle,
        crate::handlers::vehicles::create_vehicle,
        crate::handlers::vehicles::update_vehicle,
        crate::handlers::vehicles::delete_vehicle,
        crate::handlers::jobs::list_jobs,
        crate::handlers::jobs::get_job,
        crate::handlers::jobs::create_job,
        crate::handlers::jobs::update_job,
        crate::handlers::jobs::update_job_status,
        crate::handlers::jobs::add_service_item,
        crate::handlers::jobs::remove_service_item,
        crate::handlers::jobs::add_part,
        crate::handlers::jobs::remove_part,
        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::low_stock,
        crate::handlers::inventory::get_inventory_item,
        crate::handlers::inventory::list_movements,
        crate::handlers::inventory::create_inventory_item,
        crate::handlers::inventory::update_inventory_item,
        crate::handlers::inventory::adjust_stock,
        crate::handlers::inventory::delete_inventory_item,
        crate::handlers::invoices::list_invoices,
        crate::handlers::invoices::get_invoice,
        crate::handlers::invoices::create_ad_hoc_invoice,
        crate::handlers::invoices::create_invoice_from_job,
        crate::handlers::invoices::apply_payment,
        crate::handlers::invoices::list_payments,
        crate::handlers::expenses::list_expenses,
        crate::handlers::expenses::get_expense,
        crate::handlers::expenses::create_expense,
        crate::handlers::expenses::update_expense,
        crate::handlers::expenses::delete_expense,
        crate::handlers::reminders::list_reminders,
        crate::handlers::reminders::due_reminders,
        crate::handlers::reminders::create_reminder,
        crate::handlers::reminders::update_reminder,
        crate::handlers::reminders::delete_reminder,
        crate::handlers::reports::dashboard,
        crate::handlers::reports::revenue,
        crate::handlers::reports::outstanding,
        crate::handlers::settings::get_settings,
        crate::handlers::settings::update_settings,
        crate::handlers::users::list_users,
        crate::handlers::users::get_user,
        crate::handlers::users::create_user,
        crate::handlers::users::update_user,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Credential exchange"),
        (name = "Customers", description = "Customer records"),
        (name = "Vehicles", description = "Vehicles under management"),
        (name = "Jobs", description = "Work orders, costing, and the status state machine"),
        (name = "Inventory", description = "Stock levels and the movement ledger"),
        (name = "Invoices", description = "Billing documents and payment reconciliation"),
        (name = "Expenses", description = "Shop operating expenses"),
        (name = "Service reminders", description = "Upcoming service notifications"),
        (name = "Reports", description = "Read-only aggregates"),
        (name = "Settings", description = "Persisted shop settings"),
        (name = "Users", description = "Account management"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Swagger UI mounted at `/docs`, serving the document above.
pub fn swagger_routes() -> Router<AppState> {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

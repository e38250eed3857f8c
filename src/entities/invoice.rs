use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    #[sea_orm(string_value = "partial")]
    Partial,
    #[sea_orm(string_value = "paid")]
    Paid,
}

impl InvoiceStatus {
    /// Status is derived solely from the accumulated payments:
    /// `balance <= 0` means paid, any payment short of the total means
    /// partial, and no payment means unpaid.
    pub fn derive(amount_paid: Decimal, balance: Decimal) -> InvoiceStatus {
        if balance <= Decimal::ZERO {
            InvoiceStatus::Paid
        } else if amount_paid > Decimal::ZERO {
            InvoiceStatus::Partial
        } else {
            InvoiceStatus::Unpaid
        }
    }
}

/// A billing document, optionally derived from one job, always tied to
/// one customer.
///
/// `total == subtotal + tax_amount - discount` and
/// `balance == max(0, total - amount_paid)` hold after every mutation.
/// `amount_paid` only ever grows (payments append, never edit), and
/// `paid_at` is stamped once, on the first transition into `paid`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub customer_id: Uuid,
    pub job_id: Option<Uuid>,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub balance: Decimal,
    pub status: InvoiceStatus,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn status_derivation() {
        assert_eq!(
            InvoiceStatus::derive(dec!(0), dec!(5500)),
            InvoiceStatus::Unpaid
        );
        assert_eq!(
            InvoiceStatus::derive(dec!(3000), dec!(2500)),
            InvoiceStatus::Partial
        );
        assert_eq!(InvoiceStatus::derive(dec!(5500), dec!(0)), InvoiceStatus::Paid);
        // over-payment still reads as paid
        assert_eq!(InvoiceStatus::derive(dec!(6000), dec!(0)), InvoiceStatus::Paid);
        // zero-total invoice is born paid
        assert_eq!(InvoiceStatus::derive(dec!(0), dec!(0)), InvoiceStatus::Paid);
    }
}

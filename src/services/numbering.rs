//! Sequential human-readable document numbers, `{PREFIX}-{YYYY}-{NNNN}`.
//!
//! The counter restarts implicitly at year rollover: when no number
//! exists yet for the current year the sequence begins at 0001. The
//! read-then-increment scan is racy under concurrent creation, so the
//! generated columns carry UNIQUE constraints and the calling services
//! retry allocation on a conflict.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::{invoice, job};
use crate::errors::{ServiceError, ServiceResult};

/// Width of the zero-padded counter segment.
const COUNTER_WIDTH: usize = 4;

/// Next job number for `year`, scanning the jobs table.
pub async fn next_job_number<C: ConnectionTrait>(
    conn: &C,
    prefix: &str,
    year: i32,
) -> ServiceResult<String> {
    let pattern = format!("{prefix}-{year}-%");
    let last = job::Entity::find()
        .filter(job::Column::JobNumber.like(&pattern))
        .order_by_desc(job::Column::JobNumber)
        .one(conn)
        .await?
        .map(|j| j.job_number);

    bump(prefix, year, last.as_deref())
}

/// Next invoice number for `year`, scanning the invoices table.
pub async fn next_invoice_number<C: ConnectionTrait>(
    conn: &C,
    prefix: &str,
    year: i32,
) -> ServiceResult<String> {
    let pattern = format!("{prefix}-{year}-%");
    let last = invoice::Entity::find()
        .filter(invoice::Column::InvoiceNumber.like(&pattern))
        .order_by_desc(invoice::Column::InvoiceNumber)
        .one(conn)
        .await?
        .map(|i| i.invoice_number);

    bump(prefix, year, last.as_deref())
}

/// Parse the trailing counter of the last issued number and produce the
/// next one. `None` (no number yet this year) starts the sequence at 1.
fn bump(prefix: &str, year: i32, last: Option<&str>) -> ServiceResult<String> {
    let next = match last {
        None => 1,
        Some(number) => {
            let counter = number.rsplit('-').next().ok_or_else(|| {
                ServiceError::InternalError(format!("malformed document number: {number}"))
            })?;
            counter.parse::<u32>().map_err(|_| {
                ServiceError::InternalError(format!("malformed document number: {number}"))
            })? + 1
        }
    };
    Ok(format!("{prefix}-{year}-{next:0width$}", width = COUNTER_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_one_for_a_fresh_year() {
        assert_eq!(bump("KAW", 2025, None).unwrap(), "KAW-2025-0001");
        assert_eq!(bump("INV", 2026, None).unwrap(), "INV-2026-0001");
    }

    #[test]
    fn increments_and_keeps_padding() {
        assert_eq!(
            bump("KAW", 2025, Some("KAW-2025-0009")).unwrap(),
            "KAW-2025-0010"
        );
        assert_eq!(
            bump("INV", 2025, Some("INV-2025-0099")).unwrap(),
            "INV-2025-0100"
        );
    }

    #[test]
    fn grows_past_four_digits_without_wrapping() {
        assert_eq!(
            bump("KAW", 2025, Some("KAW-2025-9999")).unwrap(),
            "KAW-2025-10000"
        );
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert!(bump("KAW", 2025, Some("KAW-2025-abcd")).is_err());
    }
}

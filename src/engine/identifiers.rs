// ==========================================
// Procurement Engine - document identifiers
// ==========================================
// Folio:  RB-<YYYYMMDDHHMMSS>-<orderId>      (UTC)
// QR id:  REQ-<YYYYMM>-<8 uppercase hex>
// Ledger: POLIZA-DEVENGO-<year>-CARGO:<debit>/<folio>;ABONO:<credit>/<taxId>
// ==========================================

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::engine::error::{EngineError, EngineResult};

pub const FOLIO_PREFIX: &str = "RB";
pub const QR_PREFIX: &str = "REQ";

/// Receipt folio. Unique because an order reaches RECEIVED only once.
pub fn generate_folio(received_at: NaiveDateTime, order_id: i64) -> String {
    format!(
        "{}-{}-{}",
        FOLIO_PREFIX,
        received_at.format("%Y%m%d%H%M%S"),
        order_id
    )
}

/// Requirement id for `month` with a fresh random suffix.
pub fn generate_qr_id(month: NaiveDate) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    qr_id_with_suffix(month, &suffix[..8])
}

fn qr_id_with_suffix(month: NaiveDate, suffix: &str) -> String {
    format!(
        "{}-{}-{}",
        QR_PREFIX,
        month.format("%Y%m"),
        suffix.to_uppercase()
    )
}

/// Recover the target month (day 1) from a QR id.
pub fn parse_qr_month(qr_id: &str) -> EngineResult<NaiveDate> {
    let invalid = || EngineError::Validation(format!("malformed QR id '{}'", qr_id));

    let mut parts = qr_id.split('-');
    let (prefix, ym, suffix) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(p), Some(ym), Some(s), None) => (p, ym, s),
        _ => return Err(invalid()),
    };

    if prefix != QR_PREFIX
        || ym.len() != 6
        || !ym.bytes().all(|b| b.is_ascii_digit())
        || suffix.len() != 8
        || !suffix.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(invalid());
    }

    let year: i32 = ym[..4].parse().map_err(|_| invalid())?;
    let month: u32 = ym[4..].parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// Accrual ledger line for one posted receipt.
pub fn ledger_line(
    posted_at: NaiveDateTime,
    folio: &str,
    supplier_tax_id: &str,
    debit_account: &str,
    credit_account: &str,
) -> String {
    format!(
        "POLIZA-DEVENGO-{}-CARGO:{}/{};ABONO:{}/{}",
        posted_at.year(),
        debit_account,
        folio,
        credit_account,
        supplier_tax_id
    )
}

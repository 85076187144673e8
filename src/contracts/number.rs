use chrono::NaiveDate;

/// Human-readable contract number: `CTR-<YYYYMMDD>-<client id, 4 digits>`.
///
/// Ids above 9999 print wider; nothing truncates them.
pub fn contract_number(client_id: i64, issued_on: NaiveDate) -> String {
    format!("CTR-{}-{:04}", issued_on.format("%Y%m%d"), client_id)
}

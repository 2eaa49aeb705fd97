use once_cell::sync::Lazy;
use std::env;

/// Published spreadsheet backing the inventory. Absence is a configuration
/// failure: the ingestor serves an empty catalog and logs, it never crashes.
pub static SHEET_ID: Lazy<Option<String>> = Lazy::new(|| {
    env::var("INVENTORY_SHEET_ID")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
});

pub static GVIZ_ROOT: Lazy<String> = Lazy::new(|| {
    env::var("GVIZ_ROOT").unwrap_or_else(|_| "https://docs.google.com/spreadsheets/d".to_string())
});

pub static VPIC_ROOT: Lazy<String> = Lazy::new(|| {
    env::var("VPIC_ROOT").unwrap_or_else(|_| "https://vpic.nhtsa.dot.gov/api".to_string())
});

pub static MAIL_API_ROOT: Lazy<String> =
    Lazy::new(|| env::var("MAIL_API_ROOT").unwrap_or_else(|_| "https://api.resend.com".to_string()));

/// `sheet` (default) or `static` for the hand-maintained catalog.
pub static INVENTORY_SOURCE: Lazy<String> = Lazy::new(|| {
    env::var("INVENTORY_SOURCE")
        .map(|value| value.trim().to_lowercase())
        .unwrap_or_else(|_| "sheet".to_string())
});

pub static CACHE_TTL_SECS: Lazy<u64> = Lazy::new(|| {
    env::var("INVENTORY_CACHE_TTL_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(60)
});

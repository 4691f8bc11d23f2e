//! Currency display helpers. Lookup only; there is no conversion.

use std::collections::HashMap;

use once_cell::sync::Lazy;

static CURRENCY_SYMBOLS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("USD", "$"),
        ("EUR", "€"),
        ("GBP", "£"),
        ("JPY", "¥"),
        ("INR", "₹"),
        ("CNY", "¥"),
        ("CAD", "C$"),
        ("AUD", "A$"),
        ("CHF", "CHF"),
        ("SEK", "kr"),
        ("NOK", "kr"),
        ("DKK", "kr"),
        ("PLN", "zł"),
        ("CZK", "Kč"),
        ("HUF", "Ft"),
        ("RUB", "₽"),
        ("BRL", "R$"),
        ("KRW", "₩"),
        ("SGD", "S$"),
        ("HKD", "HK$"),
        ("MXN", "$"),
        ("ZAR", "R"),
        ("TRY", "₺"),
        ("ILS", "₪"),
        ("AED", "د.إ"),
        ("SAR", "﷼"),
        ("THB", "฿"),
        ("MYR", "RM"),
        ("IDR", "Rp"),
        ("PHP", "₱"),
        ("VND", "₫"),
        ("EGP", "E£"),
        ("NGN", "₦"),
        ("KES", "KSh"),
        ("GHS", "₵"),
        ("XOF", "CFA"),
        ("MAD", "DH"),
        ("ETB", "Br"),
        ("UGX", "USh"),
        ("TZS", "TSh"),
        ("RWF", "FRw"),
        ("ZMW", "ZK"),
        ("BWP", "P"),
        ("NAD", "N$"),
        ("SZL", "L"),
        ("LSL", "L"),
        ("MWK", "MK"),
        ("ZWL", "Z$"),
    ])
});

/// Returns the display symbol for a currency code.
///
/// Codes are matched case-insensitively. Unknown codes fall back to the code
/// itself; an empty code falls back to `₹`.
pub fn symbol_for(code: &str) -> String {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return "₹".to_string();
    }
    CURRENCY_SYMBOLS
        .get(trimmed.to_ascii_uppercase().as_str())
        .map(|symbol| (*symbol).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

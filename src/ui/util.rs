use alloy::primitives::U256;

pub fn short_hex(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() <= 10 {
        return trimmed.to_string();
    }
    let prefix_len = 6.min(trimmed.len());
    let suffix_len = 4.min(trimmed.len().saturating_sub(prefix_len));
    let prefix = &trimmed[..prefix_len];
    let suffix = &trimmed[trimmed.len() - suffix_len..];
    format!("{}...{}", prefix, suffix)
}

/// Groups an integer with `,` thousands separators for display.
pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Converts a base-unit balance into display units with exactly four decimal
/// places, rounding half-up at the fourth decimal.
pub fn format_display_units(value: U256, decimals: u8) -> String {
    let ten = U256::from(10u64);
    // Scale to units of 10^-4 before splitting into whole and fraction.
    let scaled = if decimals >= 4 {
        let divisor = ten.pow(U256::from(decimals - 4));
        (value + divisor / U256::from(2u64)) / divisor
    } else {
        value * ten.pow(U256::from(4 - decimals))
    };
    let base = U256::from(10_000u64);
    let whole = scaled / base;
    let frac = (scaled % base).to::<u64>();
    format!("{whole}.{frac:04}")
}

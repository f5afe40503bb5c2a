/// Rupee amount in lakh/crore grouping with two decimals: `₹1,500.00`,
/// `₹12,34,567.89`, `-₹320.50`.
pub fn inr(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let paise = (amount.abs() * 100.0).round() as u64;
    let whole = paise / 100;
    let frac = paise % 100;

    let digits = whole.to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        // Last three digits, then pairs.
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut out = String::with_capacity(digits.len() + digits.len() / 2);
        for (i, c) in head.chars().enumerate() {
            if i > 0 && (head.len() - i) % 2 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out.push(',');
        out.push_str(tail);
        out
    };
    format!("{}₹{}.{:02}", sign, grouped, frac)
}

/// Signed variant used in tables: `+₹1,500.00`.
pub fn inr_signed(amount: f64) -> String {
    if amount > 0.0 {
        format!("+{}", inr(amount))
    } else {
        inr(amount)
    }
}

pub fn pct(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Compact holding time: `45s`, `5m 30s`, `1h 15m`.
pub fn duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    match (h, m, s) {
        (0, 0, s) => format!("{}s", s),
        (0, m, 0) => format!("{}m", m),
        (0, m, s) => format!("{}m {}s", m, s),
        (h, 0, _) => format!("{}h", h),
        (h, m, _) => format!("{}h {}m", h, m),
    }
}

pub fn ratio(value: f64) -> String {
    if value.is_infinite() {
        "∞".to_string()
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rupees_are_grouped() {
        assert_eq!(inr(1500.0), "₹1,500.00");
        assert_eq!(inr(-320.5), "-₹320.50");
        assert_eq!(inr(1234567.891), "₹12,34,567.89");
        assert_eq!(inr(100000.0), "₹1,00,000.00");
        assert_eq!(inr(-98765432.1), "-₹9,87,65,432.10");
        assert_eq!(inr(999.0), "₹999.00");
        assert_eq!(inr(0.0), "₹0.00");
        assert_eq!(inr_signed(42.0), "+₹42.00");
    }

    #[test]
    fn durations_are_compact() {
        assert_eq!(duration(45.0), "45s");
        assert_eq!(duration(300.0), "5m");
        assert_eq!(duration(330.0), "5m 30s");
        assert_eq!(duration(4530.0), "1h 15m");
        assert_eq!(duration(7200.0), "2h");
    }
}

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Display helpers for the UI layers. These only shape values for reading;
/// nothing here feeds back into calculations.

pub fn currency_symbol(currency: &str) -> &'static str {
    match currency {
        "PKR" => "Rs ",
        "INR" => "₹",
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        _ => "",
    }
}

/// Renders an amount with the currency's symbol and digit grouping. PKR and
/// INR group the Indian way (last three digits, then pairs); the others use
/// western thousands.
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let indian = matches!(currency, "PKR" | "INR");
    format!(
        "{}{}",
        currency_symbol(currency),
        group_amount(amount, indian)
    )
}

/// `05 Jan 2024` style display dates.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

fn group_amount(amount: Decimal, indian: bool) -> String {
    let raw = amount.to_string();
    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let grouped = group_integer(integer, indian);
    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

fn group_integer(digits: &str, indian: bool) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(chars.len() + chars.len() / 2);
    let mut since_separator = 0;
    let mut group_size = 3;

    for ch in chars.iter().rev() {
        if since_separator == group_size {
            out.push(',');
            since_separator = 0;
            // Indian grouping switches to pairs after the first thousand.
            if indian {
                group_size = 2;
            }
        }
        out.push(*ch);
        since_separator += 1;
    }

    out.chars().rev().collect()
}

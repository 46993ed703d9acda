//! Display formatting for route options.
//!
//! All functions here are pure: they take a [`RouteResult`] (or one of its
//! fields) and a [`FormatLocale`] and return strings for the UI.

use super::types::{Money, RouteResult};

const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_MINUTE: u64 = 60;

/// Locale-dependent words and symbols used by the formatters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatLocale {
    pub hour_suffix: String,
    pub minute_suffix: String,
    pub free_label: String,
    pub currency_symbol: String,
}

impl FormatLocale {
    /// Turkish labels ("1 sa 30 dk", "Ücretsiz", "₺").
    pub fn turkish() -> Self {
        Self {
            hour_suffix: "sa".to_string(),
            minute_suffix: "dk".to_string(),
            free_label: "Ücretsiz".to_string(),
            currency_symbol: "₺".to_string(),
        }
    }

    /// English labels ("1 h 30 min", "Free").
    pub fn english() -> Self {
        Self {
            hour_suffix: "h".to_string(),
            minute_suffix: "min".to_string(),
            free_label: "Free".to_string(),
            currency_symbol: String::new(),
        }
    }

    /// Looks a locale up by name ("tr", "en").
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "tr" | "turkish" => Some(Self::turkish()),
            "en" | "english" => Some(Self::english()),
            _ => None,
        }
    }
}

impl Default for FormatLocale {
    fn default() -> Self {
        Self::turkish()
    }
}

/// How the cost column should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostLabel {
    /// A toll is due; the text carries the formatted amount.
    Toll(String),
    /// No toll price was returned; rendered with a distinct style.
    Free(String),
}

impl CostLabel {
    pub fn text(&self) -> &str {
        match self {
            CostLabel::Toll(text) | CostLabel::Free(text) => text,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, CostLabel::Free(_))
    }
}

/// Formats a duration: whole hours and remaining minutes at or above one
/// hour, minutes only below. Integer division, no rounding.
pub fn format_duration(seconds: u64, locale: &FormatLocale) -> String {
    if seconds >= SECONDS_PER_HOUR {
        format!(
            "{} {} {} {}",
            seconds / SECONDS_PER_HOUR,
            locale.hour_suffix,
            (seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
            locale.minute_suffix
        )
    } else {
        format!("{} {}", seconds / SECONDS_PER_MINUTE, locale.minute_suffix)
    }
}

/// Formats a distance in kilometers with exactly one decimal digit.
pub fn format_distance(meters: u64) -> String {
    format!("{:.1} km", meters as f64 / 1000.0)
}

/// Formats a monetary amount with two decimal digits.
pub fn format_money(money: &Money) -> String {
    format!("{:.2}", money.value())
}

/// Cost label for a route: the first toll estimate, or the free label.
pub fn format_cost(toll: Option<&Money>, locale: &FormatLocale) -> CostLabel {
    match toll {
        Some(money) => CostLabel::Toll(format!(
            "{}{}",
            locale.currency_symbol,
            format_money(money)
        )),
        None => CostLabel::Free(locale.free_label.clone()),
    }
}

/// A route result with every display field already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOption {
    pub label: String,
    pub duration: String,
    pub distance: String,
    pub cost: CostLabel,
}

impl RouteOption {
    pub fn new(result: &RouteResult, locale: &FormatLocale) -> Self {
        Self {
            label: result.label.clone(),
            duration: format_duration(result.duration_seconds, locale),
            distance: format_distance(result.distance_meters),
            cost: format_cost(result.toll_estimate.as_ref(), locale),
        }
    }

    /// `"{duration} • {distance}"`, the detail line under the label.
    pub fn details(&self) -> String {
        format!("{} • {}", self.duration, self.distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_with_hours() {
        let tr = FormatLocale::turkish();
        assert_eq!(format_duration(5400, &tr), "1 sa 30 dk");
        assert_eq!(format_duration(3600, &tr), "1 sa 0 dk");
        assert_eq!(format_duration(7259, &tr), "2 sa 0 dk");
    }

    #[test]
    fn test_duration_minutes_only() {
        let tr = FormatLocale::turkish();
        assert_eq!(format_duration(3599, &tr), "59 dk");
        assert_eq!(format_duration(59, &tr), "0 dk");
        assert_eq!(format_duration(0, &tr), "0 dk");
    }

    #[test]
    fn test_duration_english() {
        assert_eq!(format_duration(5400, &FormatLocale::english()), "1 h 30 min");
    }

    #[test]
    fn test_distance_one_decimal() {
        assert_eq!(format_distance(12500), "12.5 km");
        assert_eq!(format_distance(15400), "15.4 km");
        assert_eq!(format_distance(0), "0.0 km");
        assert_eq!(format_distance(1000), "1.0 km");
    }

    #[test]
    fn test_money_two_decimals() {
        assert_eq!(format_money(&Money::new("TRY", 215, 500_000_000)), "215.50");
        assert_eq!(format_money(&Money::new("TRY", 7, 0)), "7.00");
        assert_eq!(format_money(&Money::new("TRY", 0, 990_000_000)), "0.99");
    }

    #[test]
    fn test_cost_label() {
        let tr = FormatLocale::turkish();
        let toll = Money::new("TRY", 215, 500_000_000);
        assert_eq!(
            format_cost(Some(&toll), &tr),
            CostLabel::Toll("₺215.50".to_string())
        );

        let free = format_cost(None, &tr);
        assert!(free.is_free());
        assert_eq!(free.text(), "Ücretsiz");
    }

    #[test]
    fn test_route_option() {
        let result = RouteResult {
            label: "fastest".to_string(),
            duration_seconds: 5400,
            distance_meters: 12500,
            toll_estimate: None,
            route_labels: Vec::new(),
        };
        let option = RouteOption::new(&result, &FormatLocale::turkish());
        assert_eq!(option.details(), "1 sa 30 dk • 12.5 km");
        assert!(option.cost.is_free());
    }

    #[test]
    fn test_locale_from_name() {
        assert_eq!(FormatLocale::from_name("EN"), Some(FormatLocale::english()));
        assert_eq!(FormatLocale::from_name("tr"), Some(FormatLocale::turkish()));
        assert_eq!(FormatLocale::from_name("fr"), None);
    }
}

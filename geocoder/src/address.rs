use serde::{Deserialize, Serialize};

use crate::Location;

/// A structured address as returned by the geocoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    /// Street name.
    pub thoroughfare: Option<String>,
    /// City or town.
    pub locality: Option<String>,
    /// State, province or region.
    pub admin_area: Option<String>,
    /// Country name in the geocoder's locale.
    pub country_name: Option<String>,
}

impl Address {
    /// Collapse the address into one line.
    ///
    /// Present fields are joined with `", "` in the order thoroughfare,
    /// locality, admin area, country. Blank fields count as absent. Returns
    /// `None` if nothing is left.
    #[must_use]
    pub fn format(&self) -> Option<String> {
        let line = [
            &self.thoroughfare,
            &self.locality,
            &self.admin_area,
            &self.country_name,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref().map(str::trim))
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        let line = line.trim_end_matches([',', ' ']);
        (!line.is_empty()).then(|| line.to_owned())
    }
}

/// Render one coordinate the way the platform prints doubles.
///
/// Shortest round-trip digits, always with a fractional part. Magnitudes in
/// `[1e-3, 1e7)` are written as plain decimals (`10.0`, `-33.8688`), anything
/// else in computerized scientific notation (`-5.0E-4`, `1.0E7`).
#[must_use]
pub fn format_coordinate(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_owned()
        } else if value > 0.0 {
            "Infinity".to_owned()
        } else {
            "-Infinity".to_owned()
        };
    }

    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return with_fraction(value.to_string());
    }

    let scientific = format!("{value:e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) => {
            format!("{}E{exponent}", with_fraction(mantissa.to_owned()))
        }
        None => scientific,
    }
}

fn with_fraction(mut digits: String) -> String {
    if !digits.contains('.') {
        digits.push_str(".0");
    }
    digits
}

/// Render a location as `"<lat>, <lon>"`.
#[must_use]
pub fn format_coordinates(location: &Location) -> String {
    format!(
        "{}, {}",
        format_coordinate(location.latitude),
        format_coordinate(location.longitude)
    )
}

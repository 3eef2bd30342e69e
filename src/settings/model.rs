// src/settings/model.rs
// =============================================================================
// The two settings the admin panel stores for us: the Oh Dear API token and
// the id of the Oh Dear site that belongs to this installation.
//
// Rules (checked in this order, all of them, so the form can show every
// problem at once):
// 1. apiToken, when filled in, must be exactly 60 characters
// 2. selectedSiteId is required as soon as an apiToken is filled in
// 3. selectedSiteId, when filled in, must be a number
//
// Both fields are trimmed when the Settings value is built, and a missing
// value becomes "". Nothing here touches the network or the disk.
// =============================================================================

use crate::error::{FieldViolation, ValidationErrors};

/// Length of every token Oh Dear hands out
pub const API_TOKEN_LENGTH: usize = 60;

pub const API_TOKEN_FIELD: &str = "apiToken";
pub const SITE_ID_FIELD: &str = "selectedSiteId";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub api_token: String,
    pub selected_site_id: String,
}

impl Settings {
    // Builds settings from whatever the host handed us.
    // None and whitespace-only values both end up as "".
    pub fn new(api_token: Option<&str>, selected_site_id: Option<&str>) -> Self {
        Self {
            api_token: normalize(api_token),
            selected_site_id: normalize(selected_site_id),
        }
    }

    /// True when both a token and a site are configured.
    ///
    /// This is the cheap check the panel uses to decide whether to show the
    /// dashboard or the settings form; it does not run the field rules.
    pub fn is_valid(&self) -> bool {
        !self.api_token.is_empty() && !self.selected_site_id.is_empty()
    }

    // Runs every field rule and collects all violations
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut violations = Vec::new();

        if !self.api_token.is_empty() && self.api_token.chars().count() != API_TOKEN_LENGTH {
            violations.push(FieldViolation {
                field: API_TOKEN_FIELD,
                message: format!("Api Token should contain {} characters.", API_TOKEN_LENGTH),
            });
        }

        if !self.api_token.is_empty() && self.selected_site_id.is_empty() {
            violations.push(FieldViolation {
                field: SITE_ID_FIELD,
                message: "Selected Site Id cannot be blank.".to_string(),
            });
        }

        if !self.selected_site_id.is_empty() && !is_number(&self.selected_site_id) {
            violations.push(FieldViolation {
                field: SITE_ID_FIELD,
                message: "Selected Site Id must be a number.".to_string(),
            });
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { violations })
        }
    }

    // Field rules, plus the site id conversion once both fields are set.
    // "-3" and "1e30" pass the form rules but no gateway can use them.
    pub fn validate_for_use(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        if self.is_valid() {
            self.site_id()?;
        }
        Ok(())
    }

    // Turns the stored site id into the integer id the API wants.
    //
    // Fractional ids are truncated ("42.9" -> 42). Blank, non-numeric,
    // negative or out of range values are reported as a violation.
    pub fn site_id(&self) -> Result<u64, ValidationErrors> {
        let raw = self.selected_site_id.as_str();

        if raw.is_empty() {
            return Err(ValidationErrors::single(
                SITE_ID_FIELD,
                "Selected Site Id cannot be blank.",
            ));
        }

        if !is_number(raw) {
            return Err(ValidationErrors::single(
                SITE_ID_FIELD,
                "Selected Site Id must be a number.",
            ));
        }

        if let Ok(id) = raw.trim_start_matches('+').parse::<u64>() {
            return Ok(id);
        }

        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 && value < u64::MAX as f64 => {
                Ok(value.trunc() as u64)
            }
            _ => Err(ValidationErrors::single(
                SITE_ID_FIELD,
                "Selected Site Id must be a positive whole number.",
            )),
        }
    }
}

fn normalize(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

// Accepts what a form "number" field accepts:
//   [+-] digits [. digits] [e|E [+-] digits]
// with the integer part optional when there is a fractional part (".5").
fn is_number(value: &str) -> bool {
    let unsigned = strip_sign(value.trim());

    let (mantissa, exponent) = match unsigned.find(|c: char| c == 'e' || c == 'E') {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };

    let mantissa_ok = match mantissa.split_once('.') {
        Some((whole, fraction)) => all_digits(whole) && !fraction.is_empty() && all_digits(fraction),
        None => !mantissa.is_empty() && all_digits(mantissa),
    };

    let exponent_ok = match exponent {
        Some(exp) => {
            let exp = strip_sign(exp);
            !exp.is_empty() && all_digits(exp)
        }
        None => true,
    };

    mantissa_ok && exponent_ok
}

fn strip_sign(value: &str) -> &str {
    value
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(value)
}

fn all_digits(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_digit())
}

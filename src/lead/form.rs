//! Lead form data and validation.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LeadError, ValidationIssue};

/// Consultation slots offered when none are configured.
pub const DEFAULT_TIME_SLOTS: [&str; 5] = [
    "9:00 AM - 11:00 AM",
    "11:00 AM - 1:00 PM",
    "2:00 PM - 4:00 PM",
    "4:00 PM - 6:00 PM",
    "6:00 PM - 8:00 PM",
];

/// Ten digits, first digit 6-9.
static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").expect("valid regex"));

/// Returns [`DEFAULT_TIME_SLOTS`] as owned strings.
#[must_use]
pub fn default_time_slots() -> Vec<String> {
    DEFAULT_TIME_SLOTS.iter().map(ToString::to_string).collect()
}

/// Contact details entered by the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadForm {
    /// Full name
    pub name: String,
    /// Mobile number; non-digits are ignored
    pub mobile: String,
    /// `YYYY-MM-DD`
    pub preferred_date: String,
    /// One of the offered time slots
    pub preferred_slot: String,
}

impl LeadForm {
    /// Mobile number with everything but digits removed.
    #[must_use]
    pub fn normalized_mobile(&self) -> String {
        self.mobile.chars().filter(char::is_ascii_digit).collect()
    }

    /// Checks every field and reports all problems at once.
    ///
    /// `today` is the earliest acceptable date.
    #[must_use]
    pub fn issues(&self, time_slots: &[String], today: NaiveDate) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push(ValidationIssue::error("name", "Name is required"));
        }

        if !MOBILE_RE.is_match(&self.normalized_mobile()) {
            issues.push(ValidationIssue::error(
                "mobile",
                "Enter a valid 10-digit mobile number",
            ));
        }

        let date = self.preferred_date.trim();
        if date.is_empty() {
            issues.push(ValidationIssue::error("preferredDate", "Select a date"));
        } else {
            match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                Ok(d) if d < today => issues.push(ValidationIssue::error(
                    "preferredDate",
                    "Date cannot be in the past",
                )),
                Ok(_) => {}
                Err(_) => issues.push(ValidationIssue::error(
                    "preferredDate",
                    "Enter the date as YYYY-MM-DD",
                )),
            }
        }

        let slot = self.preferred_slot.trim();
        if slot.is_empty() {
            issues.push(ValidationIssue::error("preferredSlot", "Select a time slot"));
        } else if !time_slots.iter().any(|s| s == slot) {
            issues.push(ValidationIssue::error(
                "preferredSlot",
                "Select one of the available time slots",
            ));
        }

        issues
    }

    /// Validates the form.
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::Invalid`] listing every failing field.
    pub fn validate(&self, time_slots: &[String], today: NaiveDate) -> Result<(), LeadError> {
        let issues = self.issues(time_slots, today);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(LeadError::Invalid { issues })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn valid_form() -> LeadForm {
        LeadForm {
            name: "Asha Rao".to_string(),
            mobile: "98765 43210".to_string(),
            preferred_date: "2026-03-12".to_string(),
            preferred_slot: "2:00 PM - 4:00 PM".to_string(),
        }
    }

    fn paths(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn valid_form_passes() {
        assert!(valid_form().validate(&default_time_slots(), today()).is_ok());
    }

    #[test]
    fn empty_form_reports_every_field() {
        let issues = LeadForm::default().issues(&default_time_slots(), today());
        assert_eq!(
            paths(&issues),
            ["name", "mobile", "preferredDate", "preferredSlot"]
        );
    }

    #[test]
    fn mobile_rules() {
        let slots = default_time_slots();
        for bad in ["5876543210", "987654321", "98765432101", "abcdefghij"] {
            let form = LeadForm {
                mobile: bad.to_string(),
                ..valid_form()
            };
            assert_eq!(paths(&form.issues(&slots, today())), ["mobile"], "{bad}");
        }
        for good in ["6000000000", "9876543210", "98765-43210"] {
            let form = LeadForm {
                mobile: good.to_string(),
                ..valid_form()
            };
            assert!(form.issues(&slots, today()).is_empty(), "{good}");
        }
    }

    #[test]
    fn whitespace_name_is_rejected() {
        let form = LeadForm {
            name: "   ".to_string(),
            ..valid_form()
        };
        assert_eq!(paths(&form.issues(&default_time_slots(), today())), ["name"]);
    }

    #[test]
    fn date_rules() {
        let slots = default_time_slots();
        let past = LeadForm {
            preferred_date: "2026-03-09".to_string(),
            ..valid_form()
        };
        let issues = past.issues(&slots, today());
        assert_eq!(issues[0].message, "Date cannot be in the past");

        let same_day = LeadForm {
            preferred_date: "2026-03-10".to_string(),
            ..valid_form()
        };
        assert!(same_day.issues(&slots, today()).is_empty());

        let garbage = LeadForm {
            preferred_date: "next tuesday".to_string(),
            ..valid_form()
        };
        assert_eq!(paths(&garbage.issues(&slots, today())), ["preferredDate"]);
    }

    #[test]
    fn slot_must_be_offered() {
        let form = LeadForm {
            preferred_slot: "midnight".to_string(),
            ..valid_form()
        };
        let err = form.validate(&default_time_slots(), today()).unwrap_err();
        assert!(err.to_string().contains("available time slots"));
    }
}

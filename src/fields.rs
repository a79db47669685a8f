//! Positional field extraction for the auditor appointment form.
//!
//! The form's text layer comes out in a fixed order, so each value is found
//! by the literal labels (or neighbouring values) printed next to it. Every
//! field has exactly one rule; rules are independent of each other and are
//! evaluated in the order they are declared in [`FieldExtractor::new`].

use crate::{text, Result};
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

const DATE: &str = r"[0-9]{2}/[0-9]{2}/[0-9]{4}";

// ── Field / ExtractedFields ──────────────────────────────────────────────────

/// The 13 values read from the form, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CompanyName,
    Cin,
    RegisteredOffice,
    Email,
    AuditorName,
    AuditorAddress,
    AuditorFrnOrMembership,
    AppointmentType,
    AppointmentFrom,
    AppointmentTo,
    AppointmentDate,
    FinancialYearCount,
    AgmDate,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::CompanyName,
        Field::Cin,
        Field::RegisteredOffice,
        Field::Email,
        Field::AuditorName,
        Field::AuditorAddress,
        Field::AuditorFrnOrMembership,
        Field::AppointmentType,
        Field::AppointmentFrom,
        Field::AppointmentTo,
        Field::AppointmentDate,
        Field::FinancialYearCount,
        Field::AgmDate,
    ];

    /// The key this field is serialized under.
    pub fn name(self) -> &'static str {
        match self {
            Field::CompanyName => "company_name",
            Field::Cin => "cin",
            Field::RegisteredOffice => "registered_office",
            Field::Email => "email",
            Field::AuditorName => "auditor_name",
            Field::AuditorAddress => "auditor_address",
            Field::AuditorFrnOrMembership => "auditor_frn_or_membership",
            Field::AppointmentType => "appointment_type",
            Field::AppointmentFrom => "appointment_from",
            Field::AppointmentTo => "appointment_to",
            Field::AppointmentDate => "appointment_date",
            Field::FinancialYearCount => "financial_year_count",
            Field::AgmDate => "agm_date",
        }
    }
}

/// Values read from one filing. A field whose rule did not match is `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedFields {
    pub company_name: String,
    pub cin: String,
    pub registered_office: String,
    pub email: String,
    pub auditor_name: String,
    pub auditor_address: String,
    pub auditor_frn_or_membership: String,
    pub appointment_type: String,
    pub appointment_from: String,
    pub appointment_to: String,
    pub appointment_date: String,
    pub financial_year_count: String,
    pub agm_date: String,
}

impl ExtractedFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::CompanyName => &self.company_name,
            Field::Cin => &self.cin,
            Field::RegisteredOffice => &self.registered_office,
            Field::Email => &self.email,
            Field::AuditorName => &self.auditor_name,
            Field::AuditorAddress => &self.auditor_address,
            Field::AuditorFrnOrMembership => &self.auditor_frn_or_membership,
            Field::AppointmentType => &self.appointment_type,
            Field::AppointmentFrom => &self.appointment_from,
            Field::AppointmentTo => &self.appointment_to,
            Field::AppointmentDate => &self.appointment_date,
            Field::FinancialYearCount => &self.financial_year_count,
            Field::AgmDate => &self.agm_date,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::CompanyName => &mut self.company_name,
            Field::Cin => &mut self.cin,
            Field::RegisteredOffice => &mut self.registered_office,
            Field::Email => &mut self.email,
            Field::AuditorName => &mut self.auditor_name,
            Field::AuditorAddress => &mut self.auditor_address,
            Field::AuditorFrnOrMembership => &mut self.auditor_frn_or_membership,
            Field::AppointmentType => &mut self.appointment_type,
            Field::AppointmentFrom => &mut self.appointment_from,
            Field::AppointmentTo => &mut self.appointment_to,
            Field::AppointmentDate => &mut self.appointment_date,
            Field::FinancialYearCount => &mut self.financial_year_count,
            Field::AgmDate => &mut self.agm_date,
        }
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        Field::ALL.iter().map(move |f| (f.name(), self.get(*f)))
    }

    /// Returns `true` when no rule matched.
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, value)| value.is_empty())
    }
}

// ── LayoutAnchors ────────────────────────────────────────────────────────────

/// Literal tokens of one form layout that values are anchored on.
///
/// The defaults are the tokens printed on the reference ADT-1 filing. They are
/// matched literally (regex metacharacters are escaped).
#[derive(Debug, Clone)]
pub struct LayoutAnchors {
    /// Line that follows the registered office address block.
    pub office_city: String,
    /// Auditor firm registration number; the name precedes it and the
    /// address follows it.
    pub auditor_frn: String,
    /// Token on the line after the FRN / membership number.
    pub membership_suffix: String,
    /// Appointment type label, also the line after the financial year count.
    pub appointment_label: String,
    /// Line after the appointment from/to dates.
    pub tenure_marker: String,
    /// Label on the line after the AGM date.
    pub agm_marker: String,
}

impl Default for LayoutAnchors {
    fn default() -> Self {
        Self {
            office_city: "Udupi".into(),
            auditor_frn: "001955S".into(),
            membership_suffix: "29/2".into(),
            appointment_label: "Appointment/Re-appointment in AGM".into(),
            tenure_marker: "5".into(),
            agm_marker: "Attach".into(),
        }
    }
}

// ── Rules ────────────────────────────────────────────────────────────────────

enum Rule {
    /// First capture group, trimmed.
    Capture(Regex),
    /// First capture group, trimmed, with its inner line breaks turned into
    /// `", "`.
    CaptureLines(Regex),
    /// All capture groups trimmed and joined with `", "`; empty when the
    /// first group is blank.
    JoinGroups(Regex),
    /// A date line directly followed by a line starting with the same date.
    RepeatedDate(Regex),
}

impl Rule {
    fn apply(&self, text: &str) -> Option<String> {
        match self {
            Rule::Capture(re) => Some(re.captures(text)?.get(1)?.as_str().trim().to_string()),
            Rule::CaptureLines(re) => {
                let value = re.captures(text)?.get(1)?.as_str().trim();
                Some(value.replace('\n', ", "))
            }
            Rule::JoinGroups(re) => {
                let caps = re.captures(text)?;
                let parts: Vec<&str> = caps
                    .iter()
                    .skip(1)
                    .map(|g| g.map(|m| m.as_str().trim()).unwrap_or(""))
                    .collect();
                if parts.first().map_or(true, |p| p.is_empty()) {
                    return None;
                }
                Some(parts.join(", "))
            }
            Rule::RepeatedDate(date_line) => text
                .split('\n')
                .collect::<Vec<_>>()
                .windows(2)
                .enumerate()
                // index 0 has no preceding line break
                .filter(|(i, _)| *i > 0)
                .find(|(_, w)| date_line.is_match(w[0]) && w[1].starts_with(w[0]))
                .map(|(_, w)| w[0].to_string()),
        }
    }
}

// ── FieldExtractor ───────────────────────────────────────────────────────────

/// Compiled rule table for one form layout.
///
/// ```
/// use filingextract::FieldExtractor;
///
/// let extractor = FieldExtractor::with_default_layout().unwrap();
/// let fields = extractor.extract("Pre-fill\nACME CORP &CO\n");
/// assert_eq!(fields.company_name, "ACME CORP &CO");
/// assert_eq!(fields.email, "");
/// ```
pub struct FieldExtractor {
    rules: Vec<(Field, Rule)>,
}

impl FieldExtractor {
    /// Compile the rule table for the given anchors.
    pub fn new(anchors: &LayoutAnchors) -> Result<Self> {
        let city = regex::escape(&anchors.office_city);
        let frn = regex::escape(&anchors.auditor_frn);
        let suffix = regex::escape(&anchors.membership_suffix);
        let label = regex::escape(&anchors.appointment_label);
        let tenure = regex::escape(&anchors.tenure_marker);
        let agm = regex::escape(&anchors.agm_marker);

        let capture = |pattern: String| -> Result<Rule> { Ok(Rule::Capture(Regex::new(&pattern)?)) };

        let rules = vec![
            (Field::CompanyName, capture(r"Pre-fill\n([A-Z0-9 &]+)".into())?),
            (Field::Cin, capture(r"Pre-fill\n([A-Z0-9]+)".into())?),
            (
                Field::RegisteredOffice,
                Rule::CaptureLines(Regex::new(&format!(
                    r"Pre-fill\n[A-Z0-9 &]+\n([A-Z0-9 ,\-/\n]+)\n{city}"
                ))?),
            ),
            (Field::Email, capture(r"\n(mail@[\w.-]+)".into())?),
            (Field::AuditorName, capture(format!(r"\n([A-Z &]+)\n{frn}"))?),
            (
                Field::AuditorAddress,
                Rule::JoinGroups(Regex::new(&format!(
                    r"{frn}\n([^\n]+)\n([^\n]+)\n([^\n]+)\n([^\n]+)"
                ))?),
            ),
            (
                Field::AuditorFrnOrMembership,
                capture(format!(r"\n([0-9A-Z]{{6,}})\n{suffix}"))?,
            ),
            (Field::AppointmentType, capture(format!(r"\n({label})"))?),
            (
                Field::AppointmentFrom,
                capture(format!(r"\n({DATE})\n{DATE}\n{tenure}"))?,
            ),
            (
                Field::AppointmentTo,
                capture(format!(r"\n{DATE}\n({DATE})\n{tenure}"))?,
            ),
            (
                Field::AppointmentDate,
                Rule::RepeatedDate(Regex::new(&format!("^{DATE}$"))?),
            ),
            (Field::FinancialYearCount, capture(format!(r"\n([1-9])\n{label}"))?),
            (Field::AgmDate, capture(format!(r"\n({DATE})\n{agm}"))?),
        ];

        Ok(Self { rules })
    }

    /// Rule table for the reference form layout.
    pub fn with_default_layout() -> Result<Self> {
        Self::new(&LayoutAnchors::default())
    }

    /// Apply every rule to `text`. Never fails; unmatched fields stay `""`.
    pub fn extract(&self, text: &str) -> ExtractedFields {
        let mut fields = ExtractedFields::default();
        for (field, rule) in &self.rules {
            if let Some(value) = rule.apply(text) {
                debug!(field = field.name(), %value, "field matched");
                *fields.slot_mut(*field) = value;
            }
        }
        fields
    }
}

/// Read the text layer of the PDF at `path` and extract the fields with the
/// default layout.
pub fn extract_fields_from_pdf<P: AsRef<Path>>(path: P) -> Result<ExtractedFields> {
    let text = text::extract_text(path)?;
    Ok(FieldExtractor::with_default_layout()?.extract(&text))
}

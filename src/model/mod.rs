//! # Document Model
//!
//! The input representation for the report engine: one [`Document`] per
//! render request, carrying the patient, hospital and doctor records, the
//! medication advice, prior consultations, and optional logo/watermark image
//! sources.
//!
//! The JSON shape is the one the report service has always accepted
//! (`patient_data`, `hospital_data`, `advice_data`, ...). Every record field is
//! optional on the wire; the display default for a missing field lives in one
//! accessor next to the field instead of being repeated at each call site.

use crate::error::RenderError;
use serde::{Deserialize, Deserializer, Serialize};

/// Layout units are millimetres; PDF user space is points.
pub const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// A complete report request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "patient_data", default)]
    pub patient: Patient,

    #[serde(rename = "hospital_data", default)]
    pub hospital: Hospital,

    #[serde(rename = "doctor_data", default)]
    pub doctor: Doctor,

    /// Medication advice, one table row per item.
    #[serde(rename = "advice_data", default)]
    pub advice: Vec<AdviceItem>,

    #[serde(default)]
    pub previous_reports: Vec<PriorReport>,

    /// Logo image source: data URI, file path, or raw base64.
    #[serde(rename = "logo_data", default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    /// Source image for the main report's watermark.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark_logo: Option<String>,

    /// Additional titled tables printed after the advice table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_tables: Vec<ReportTable>,

    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    /// Parse a request body.
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every table before any drawing happens.
    pub fn validate(&self) -> Result<(), RenderError> {
        for table in &self.extra_tables {
            table.to_table()?;
        }
        Ok(())
    }

    /// The "Advice" table: serial number, medicine, dosage, details.
    pub fn advice_table(&self) -> Table {
        let header = ["S.No.", "Medicine Name", "Dosage", "Details"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = self
            .advice
            .iter()
            .enumerate()
            .map(|(i, item)| {
                vec![
                    (i + 1).to_string(),
                    item.name().to_string(),
                    item.dosage().to_string(),
                    item.details().to_string(),
                ]
            })
            .collect();
        Table {
            header,
            rows,
        }
    }
}

/// Document metadata embedded in the PDF Info dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// Accept strings, numbers and booleans for free-text fields.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

fn or_empty(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Patient {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub uhid: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sex: Option<String>,
    /// Pre-combined "age/sex", preferred over `age` + `sex` when present.
    #[serde(default, deserialize_with = "lenient_string")]
    pub age_sex: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub chief_complaints: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub aggravating_factor: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub present_illness: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub family_history: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub surgical_history: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub examination: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub clinical_impression: Option<String>,
}

impl Patient {
    pub fn name(&self) -> &str {
        or_empty(&self.name)
    }

    pub fn uhid(&self) -> &str {
        or_empty(&self.uhid)
    }

    /// Age as printed on the main report; `"N/A"` when missing.
    pub fn age(&self) -> &str {
        self.age.as_deref().unwrap_or("N/A")
    }

    /// Visit date as printed on the main report; `"N/A"` when missing.
    pub fn date(&self) -> &str {
        self.date.as_deref().unwrap_or("N/A")
    }

    pub fn age_sex(&self) -> String {
        match &self.age_sex {
            Some(combined) => combined.clone(),
            None => format!("{}/{}", or_empty(&self.age), or_empty(&self.sex)),
        }
    }

    /// The clinical findings in print order, with their labels.
    pub fn clinical_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("Chief Complaints:", or_empty(&self.chief_complaints)),
            ("Aggravating factor:", or_empty(&self.aggravating_factor)),
            ("Present Illness:", or_empty(&self.present_illness)),
            ("Family History:", or_empty(&self.family_history)),
            ("Surgical History:", or_empty(&self.surgical_history)),
            ("Examination:", or_empty(&self.examination)),
            ("Clinical Impression:", or_empty(&self.clinical_impression)),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hospital {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub emergency: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub website: Option<String>,
    #[serde(default)]
    pub footer: FooterContact,
}

impl Hospital {
    pub fn name(&self) -> &str {
        or_empty(&self.name)
    }

    pub fn address(&self) -> &str {
        or_empty(&self.address)
    }

    pub fn phone(&self) -> &str {
        or_empty(&self.phone)
    }

    pub fn emergency(&self) -> &str {
        or_empty(&self.emergency)
    }
}

/// Contact block printed in the main report's footer band.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FooterContact {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    /// Text encoded into the footer QR code. Without it the box shows "QR".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_payload: Option<String>,
}

impl FooterContact {
    pub fn address(&self) -> &str {
        or_empty(&self.address)
    }

    pub fn phone(&self) -> &str {
        or_empty(&self.phone)
    }

    pub fn email(&self) -> &str {
        or_empty(&self.email)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub speciality: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mobile: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pmc: Option<String>,
}

impl Doctor {
    pub fn name(&self) -> &str {
        or_empty(&self.name)
    }

    pub fn degree(&self) -> &str {
        or_empty(&self.degree)
    }

    pub fn speciality(&self) -> &str {
        or_empty(&self.speciality)
    }

    pub fn mobile(&self) -> &str {
        or_empty(&self.mobile)
    }

    pub fn pmc(&self) -> &str {
        or_empty(&self.pmc)
    }
}

/// One prescribed medicine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdviceItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dosage: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub details: Option<String>,
}

impl AdviceItem {
    pub fn name(&self) -> &str {
        or_empty(&self.name)
    }

    pub fn dosage(&self) -> &str {
        or_empty(&self.dosage)
    }

    pub fn details(&self) -> &str {
        or_empty(&self.details)
    }
}

/// A previous consultation, rendered as one card in the history report.
///
/// On the wire this is either a record or a bare string; a bare string is
/// taken as the consultation text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "PriorReportRepr")]
pub struct PriorReport {
    pub date: Option<String>,
    pub hospital: Option<String>,
    pub consultation: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriorReportRepr {
    Text(String),
    Record {
        #[serde(default, deserialize_with = "lenient_string")]
        date: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        hospital: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        consultation: Option<String>,
    },
}

impl From<PriorReportRepr> for PriorReport {
    fn from(repr: PriorReportRepr) -> Self {
        match repr {
            PriorReportRepr::Text(consultation) => PriorReport {
                date: None,
                hospital: None,
                consultation: Some(consultation),
            },
            PriorReportRepr::Record {
                date,
                hospital,
                consultation,
            } => PriorReport {
                date,
                hospital,
                consultation,
            },
        }
    }
}

impl PriorReport {
    /// Card title: `"{date} - {hospital}"`.
    pub fn title(&self) -> String {
        format!("{} - {}", or_empty(&self.date), or_empty(&self.hospital))
    }

    pub fn consultation(&self) -> &str {
        or_empty(&self.consultation)
    }
}

/// A table of pre-stringified cells. Every row has exactly as many cells as
/// the header; the constructors enforce it.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, RenderError> {
        Self::checked("table", header, rows)
    }

    fn checked(name: &str, header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, RenderError> {
        let expected = header.len();
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(RenderError::MalformedTable {
                table: name.to_string(),
                row: row + 1,
                expected,
                found: cells.len(),
            });
        }
        Ok(Self { header, rows })
    }

    /// Build a table from labelled columns. All columns must be the same
    /// length.
    pub fn from_columns(columns: Vec<TableColumn>) -> Result<Self, RenderError> {
        Self::transpose("table", columns)
    }

    fn transpose(name: &str, columns: Vec<TableColumn>) -> Result<Self, RenderError> {
        let height = columns.iter().map(|c| c.values.len()).min().unwrap_or(0);
        let longest = columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
        if height != longest {
            // The first row some column has no value for.
            return Err(RenderError::MalformedTable {
                table: name.to_string(),
                row: height + 1,
                expected: columns.len(),
                found: columns.iter().filter(|c| c.values.len() > height).count(),
            });
        }
        let header = columns.iter().map(|c| c.label.clone()).collect();
        let rows = (0..height)
            .map(|i| columns.iter().map(|c| c.values[i].clone()).collect())
            .collect();
        Ok(Self { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

/// A column in the column-oriented table form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableColumn {
    pub label: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// A titled table as it arrives in the request, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTable {
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub data: TableData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableData {
    Rows {
        header: Vec<String>,
        #[serde(default)]
        rows: Vec<Vec<String>>,
    },
    Columns {
        columns: Vec<TableColumn>,
    },
}

impl ReportTable {
    pub fn to_table(&self) -> Result<Table, RenderError> {
        let name = if self.title.is_empty() { "table" } else { self.title.as_str() };
        match &self.data {
            TableData::Rows { header, rows } => Table::checked(name, header.clone(), rows.clone()),
            TableData::Columns { columns } => Table::transpose(name, columns.clone()),
        }
    }
}

/// Page sizes in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in millimetres.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left), used for page margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }
}

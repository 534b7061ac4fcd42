//! # medrender CLI
//!
//! Usage:
//!   medrender request.json -o report.pdf
//!   echo '{ ... }' | medrender --report history -o history.pdf
//!   medrender --example > request.json

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};

use medrender::{render_report, Document, RenderError, RenderOptions, RenderTheme, ReportVariant};

#[derive(Parser)]
#[command(name = "medrender")]
#[command(version)]
#[command(about = "Render clinical report requests to paginated PDF", long_about = None)]
struct Cli {
    /// Request JSON (stdin if not specified)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output PDF file
    #[arg(short, long, value_name = "FILE", default_value = "output.pdf")]
    output: PathBuf,

    /// Which report to render
    #[arg(long, value_enum, default_value = "main")]
    report: Report,

    /// Theme JSON (colors as [r, g, b])
    #[arg(long, value_name = "FILE", env = "MEDRENDER_THEME")]
    theme: Option<PathBuf>,

    /// Render options JSON
    #[arg(long, value_name = "FILE", env = "MEDRENDER_OPTIONS")]
    options: Option<PathBuf>,

    /// Fail instead of placing elements taller than a page
    #[arg(long)]
    strict: bool,

    /// Repeat table headers on continuation pages
    #[arg(long)]
    repeat_header: bool,

    /// Print an example request and exit
    #[arg(long)]
    example: bool,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Report {
    /// Prescription with clinical findings and advice table
    Main,
    /// Prior consultations as cards
    History,
}

impl From<Report> for ReportVariant {
    fn from(report: Report) -> Self {
        match report {
            Report::Main => ReportVariant::Main,
            Report::History => ReportVariant::History,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if cli.example {
        print!("{}", example_request_json());
        return;
    }

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), RenderError> {
    let input = match &cli.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let document = Document::from_json(&input)?;

    let theme: RenderTheme = match &cli.theme {
        Some(path) => load_json(path)?,
        None => RenderTheme::default(),
    };
    let mut options: RenderOptions = match &cli.options {
        Some(path) => load_json(path)?,
        None => RenderOptions::default(),
    };
    options.strict_overflow |= cli.strict;
    options.table.repeat_header |= cli.repeat_header;

    let output = render_report(&document, &theme, cli.report.into(), &options)?;
    for warning in &output.warnings {
        eprintln!("warning: {}", warning);
    }
    fs::write(&cli.output, &output.pdf)?;
    eprintln!(
        "Written {} bytes ({} page(s)) to {}",
        output.pdf.len(),
        output.page_count,
        cli.output.display()
    );
    Ok(())
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RenderError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn example_request_json() -> &'static str {
    r##"{
  "metadata": { "title": "Prescription", "author": "City Hospital" },
  "patient_data": {
    "name": "John Doe",
    "uhid": "UH-20481",
    "age": "45",
    "sex": "M",
    "date": "2025-03-14",
    "chief_complaints": "Headache and dizziness for three days",
    "aggravating_factor": "Bright light",
    "present_illness": "Intermittent frontal headache, worse in the evening",
    "family_history": "Father hypertensive",
    "surgical_history": "Appendectomy 2010",
    "examination": "BP 140/90, pulse 82/min, no focal deficit",
    "clinical_impression": "Tension-type headache"
  },
  "hospital_data": {
    "name": "City Hospital",
    "address": "12 Main Street, Springfield",
    "phone": "+1 555 0100",
    "emergency": "+1 555 0199",
    "footer": {
      "address": "12 Main Street, Springfield",
      "phone": "+1 555 0100",
      "email": "care@cityhospital.example",
      "qr_payload": "https://cityhospital.example/reports/UH-20481"
    }
  },
  "doctor_data": {
    "name": "Dr. Jane Smith",
    "degree": "MBBS, FCPS",
    "speciality": "Neurology",
    "mobile": "+1 555 0142",
    "pmc": "PMC-55123"
  },
  "advice_data": [
    { "name": "Paracetamol 500mg", "dosage": "1 tablet", "details": "Three times a day after meals" },
    { "name": "Amitriptyline 10mg", "dosage": "1 tablet", "details": "At bedtime for two weeks" }
  ],
  "previous_reports": [
    { "date": "2025-01-20", "hospital": "City Hospital", "consultation": "Mild headache, advised rest and hydration." },
    { "date": "2024-11-02", "hospital": "Springfield Clinic", "consultation": "Routine check-up. No complaints." }
  ]
}
"##
}

//! Sample Booking Confirmation
//!
//! Writes a one-page booking confirmation to disk, exercising cells,
//! word-wrapped paragraphs, fills, borders and the page template.
//!
//! Usage:
//!   cargo run --release --bin sample_confirmation
//!   cargo run --release --bin sample_confirmation -- --output custom.pdf --config doc.json

use pdf_slate::config::DocumentConfig;
use pdf_slate::writer::{
    Align, Cell, Color, Destination, Document, HFStyle, HeaderFooter, LineFlow, PageTemplate,
};
use std::path::PathBuf;

struct SampleConfig {
    output: PathBuf,
    config: Option<PathBuf>,
}

impl SampleConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut output = PathBuf::from("confirmation.pdf");
        let mut config = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output" | "-o" => {
                    i += 1;
                    if i < args.len() {
                        output = PathBuf::from(&args[i]);
                    }
                },
                "--config" => {
                    i += 1;
                    if i < args.len() {
                        config = Some(PathBuf::from(&args[i]));
                    }
                },
                _ => {},
            }
            i += 1;
        }

        Self { output, config }
    }
}

const LINES: [(&str, &str); 5] = [
    ("Guest", "Jordan Example"),
    ("Arrival", "2024-07-12"),
    ("Departure", "2024-07-15"),
    ("Room", "Double, garden view"),
    ("Total", "412.50 EUR"),
];

const TERMS: &str = "Cancellation is free of charge until 48 hours before arrival. \
Later cancellations and no-shows are charged the first night. \
Check-in starts at 15:00, check-out is until 11:00.\n\
Please present this confirmation at the reception.";

fn build(config: DocumentConfig) -> pdf_slate::Result<Document> {
    let template = PageTemplate::new()
        .header(
            HeaderFooter::new()
                .with_left("Booking confirmation")
                .with_right("{title}")
                .with_style(HFStyle::new().bold().color(Color::gray(64)).with_separator()),
        )
        .footer(HeaderFooter::center("Page {page}/{pages}").with_style(HFStyle::new().italic()));

    let mut doc = Document::with_decorator(config, template)?;
    doc.set_title("Reservation #20417");
    doc.set_creator("sample_confirmation");
    doc.add_page()?;

    doc.set_font("helvetica", "B", 14.0)?;
    doc.cell(Cell::new(0.0, 10.0, "Your reservation is confirmed").ln(LineFlow::NextLine))?;
    doc.ln(Some(4.0));

    doc.set_font("helvetica", "", 11.0)?;
    doc.set_fill_color(Color::rgb(230, 236, 245));
    for (n, (label, value)) in LINES.iter().enumerate() {
        let shaded = n % 2 == 0;
        doc.cell(Cell::new(50.0, 8.0, *label).border("LTB").fill(shaded))?;
        doc.cell(
            Cell::new(0.0, 8.0, *value)
                .border("RTB")
                .align(Align::Right)
                .fill(shaded)
                .ln(LineFlow::NextLine),
        )?;
    }
    doc.ln(Some(6.0));

    doc.set_font("times", "", 10.0)?;
    doc.multi_cell(Cell::new(0.0, 5.0, TERMS).align(Align::Justify))?;
    doc.ln(Some(4.0));

    doc.set_text_color(Color::rgb(0, 0, 160));
    doc.set_font("helvetica", "U", 10.0)?;
    doc.cell(
        Cell::new(0.0, 6.0, "Manage your booking online")
            .link("https://example.com/booking/20417"),
    )?;

    Ok(doc)
}

fn main() {
    env_logger::init();
    let args = SampleConfig::from_args();

    let config = match &args.config {
        Some(path) => {
            let json = match std::fs::read_to_string(path) {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("Error: cannot read {}: {}", path.display(), e);
                    std::process::exit(1);
                },
            };
            match DocumentConfig::from_json(&json) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                },
            }
        },
        None => DocumentConfig::new(),
    };

    let result = build(config)
        .and_then(|mut doc| doc.output(Destination::File(&args.output)).map(|_| doc.page_no()));

    match result {
        Ok(pages) => println!("Wrote {} ({} page(s))", args.output.display(), pages),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        },
    }
}

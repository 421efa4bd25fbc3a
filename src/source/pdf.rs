//! Card details table printed in a PDF document
//!
//! Page text is rebuilt from the content stream rather than taken in drawing
//! order: every run of text is placed at its page position, runs sharing a
//! baseline form a row, and runs at different x positions are separate cells.

use super::Location;
use crate::client::ApiClient;
use crate::clean::{parse_date_lenient, parse_date_strict};
use crate::etl::Extractor;
use crate::table::{Table, Value};
use eyre::{Result, eyre};
use lopdf::content::Operation;
use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeMap;

/// Column names of the printed card table, in print order
pub const CARD_COLUMNS: [&str; 4] = [
    "card_number",
    "expiry_date",
    "card_provider",
    "date_payment_confirmed",
];

/// Separates cells within one line of extracted page text
pub const CELL_SEPARATOR: char = '\t';

/// Runs whose baselines differ by at most this many points share a row
const ROW_TOLERANCE: f32 = 2.0;

/// Extract the card details table from every page of a PDF
pub struct PdfExtractor {
    client: ApiClient,
    location: Location,
}

impl PdfExtractor {
    pub fn new(client: ApiClient, location: Location) -> Self {
        Self { client, location }
    }
}

impl Extractor for PdfExtractor {
    async fn extract(&self) -> Result<Table> {
        let bytes = self.location.read(&self.client).await?;
        let pages = extract_pages(&bytes)?;
        log::debug!("Read {} page(s) from {}", pages.len(), self.location);
        parse_card_lines(pages.iter().flat_map(|page| page.lines()))
    }
}

/// Text of every page, in page order
///
/// Each line is one row of text on the page, top to bottom, with its cells
/// left to right joined by [`CELL_SEPARATOR`].
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>> {
    let document = Document::load_mem(bytes).map_err(|e| eyre!("Failed to load PDF: {}", e))?;

    let mut pages = Vec::new();
    for (page_number, page_id) in document.get_pages() {
        match page_runs(&document, page_id) {
            Ok(runs) => pages.push(layout_rows(runs).join("\n")),
            Err(e) => log::warn!("Failed to extract text of page {}: {}", page_number, e),
        }
    }
    Ok(pages)
}

/// Affine transform `[a b c d e f]` as used by PDF content streams
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn from_operands(operands: &[Object]) -> Option<Self> {
        let values: Vec<f32> = operands
            .iter()
            .map(|o| o.as_float().ok())
            .collect::<Option<_>>()?;
        <[f32; 6]>::try_from(values).ok().map(Matrix)
    }

    /// `[1 0 0 1 tx ty] x self`
    fn translated(self, tx: f32, ty: f32) -> Self {
        let [a, b, c, d, e, f] = self.0;
        Matrix([a, b, c, d, tx * a + ty * c + e, tx * b + ty * d + f])
    }

    /// `self x other`
    fn concat(self, other: Matrix) -> Self {
        let [a, b, c, d, e, f] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a * a2 + b * c2,
            a * b2 + b * d2,
            c * a2 + d * c2,
            c * b2 + d * d2,
            e * a2 + f * c2 + e2,
            e * b2 + f * d2 + f2,
        ])
    }
}

/// Text drawn from one position, before the position moves again
#[derive(Debug, Clone, PartialEq)]
struct TextRun {
    x: f32,
    y: f32,
    text: String,
}

/// Tracks the graphics and text state needed to place text on the page
struct TextLayout<'a> {
    encodings: &'a BTreeMap<Vec<u8>, &'a str>,
    encoding: Option<&'a str>,
    ctm: Matrix,
    saved: Vec<Matrix>,
    line: Matrix,
    text: Matrix,
    leading: f32,
    current: Option<TextRun>,
    runs: Vec<TextRun>,
}

impl<'a> TextLayout<'a> {
    fn new(encodings: &'a BTreeMap<Vec<u8>, &'a str>) -> Self {
        Self {
            encodings,
            encoding: None,
            ctm: Matrix::IDENTITY,
            saved: Vec::new(),
            line: Matrix::IDENTITY,
            text: Matrix::IDENTITY,
            leading: 0.0,
            current: None,
            runs: Vec::new(),
        }
    }

    fn flush(&mut self) {
        if let Some(run) = self.current.take() {
            self.runs.push(run);
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.flush();
        self.line = self.line.translated(tx, ty);
        self.text = self.line;
    }

    fn show(&mut self, operand: &Object) {
        let mut shown = String::new();
        self.decode_into(&mut shown, operand);
        if shown.is_empty() {
            return;
        }
        let origin = self.text.concat(self.ctm).0;
        self.current
            .get_or_insert_with(|| TextRun {
                x: origin[4],
                y: origin[5],
                text: String::new(),
            })
            .text
            .push_str(&shown);
    }

    fn decode_into(&self, out: &mut String, operand: &Object) {
        match operand {
            Object::String(bytes, _) => out.push_str(&Document::decode_text(self.encoding, bytes)),
            Object::Array(items) => {
                for item in items {
                    match item {
                        Object::Integer(_) | Object::Real(_) => {
                            if item.as_float().is_ok_and(|gap| gap < -100.0) {
                                out.push(' ');
                            }
                        }
                        other => self.decode_into(out, other),
                    }
                }
            }
            _ => {}
        }
    }

    fn apply(&mut self, operation: &Operation) {
        let operands = operation.operands.as_slice();
        let number = |i: usize| operands.get(i).and_then(|o| o.as_float().ok());

        match operation.operator.as_str() {
            "q" => self.saved.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.saved.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.flush();
                    self.ctm = m.concat(self.ctm);
                }
            }
            "BT" => {
                self.flush();
                self.line = Matrix::IDENTITY;
                self.text = Matrix::IDENTITY;
            }
            "ET" => self.flush(),
            "Tf" => {
                self.encoding = operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .and_then(|name| self.encodings.get(name).copied());
            }
            "TL" => self.leading = number(0).unwrap_or(self.leading),
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (number(0), number(1)) {
                    if operation.operator == "TD" {
                        self.leading = -ty;
                    }
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.flush();
                    self.line = m;
                    self.text = m;
                }
            }
            "T*" => self.move_line(0.0, -self.leading),
            "Tj" | "TJ" => {
                for operand in operands {
                    self.show(operand);
                }
            }
            "'" => {
                self.move_line(0.0, -self.leading);
                if let Some(operand) = operands.first() {
                    self.show(operand);
                }
            }
            "\"" => {
                self.move_line(0.0, -self.leading);
                if let Some(operand) = operands.get(2) {
                    self.show(operand);
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<TextRun> {
        self.flush();
        self.runs
    }
}

fn page_runs(document: &Document, page_id: ObjectId) -> Result<Vec<TextRun>> {
    let encodings: BTreeMap<Vec<u8>, &str> = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect();
    let content = document
        .get_and_decode_page_content(page_id)
        .map_err(|e| eyre!("Failed to decode page content: {}", e))?;

    let mut layout = TextLayout::new(&encodings);
    for operation in &content.operations {
        layout.apply(operation);
    }
    Ok(layout.finish())
}

/// Group runs into rows by baseline, top to bottom, cells ordered by x
fn layout_rows(mut runs: Vec<TextRun>) -> Vec<String> {
    runs.retain(|run| !run.text.trim().is_empty());
    runs.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut rows: Vec<(f32, Vec<TextRun>)> = Vec::new();
    for run in runs {
        match rows.last_mut() {
            Some((y, cells)) if (*y - run.y).abs() <= ROW_TOLERANCE => cells.push(run),
            _ => rows.push((run.y, vec![run])),
        }
    }

    let separator = CELL_SEPARATOR.to_string();
    rows.into_iter()
        .map(|(_, mut cells)| {
            cells.sort_by(|a, b| a.x.total_cmp(&b.x));
            cells
                .iter()
                .map(|cell| cell.text.trim())
                .collect::<Vec<_>>()
                .join(&separator)
        })
        .collect()
}

fn is_header(line: &str) -> bool {
    line.contains("card_number") && line.contains("expiry_date")
}

fn is_date(text: &str) -> bool {
    parse_date_lenient(text).is_some() || parse_date_strict(text, "%y-%m-%d").is_some()
}

/// Split one printed row into the four card columns
///
/// A row laid out as exactly four cells is taken as is. Otherwise the row is
/// read as words: the number and expiry are the first two. The payment date
/// is the longest tail of up to three words that reads as a date, or the last
/// word otherwise; whatever lies between is the provider.
fn split_card_line(line: &str) -> Option<[String; 4]> {
    let cells: Vec<&str> = line
        .split(CELL_SEPARATOR)
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect();
    if let Ok(cells) = <[&str; 4]>::try_from(cells.as_slice()) {
        return Some(cells.map(String::from));
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    if words.len() < 4 {
        return None;
    }

    let rest = &words[2..];
    let date_words = (1..=(rest.len() - 1).min(3))
        .rev()
        .find(|&n| is_date(&rest[rest.len() - n..].join(" ")))
        .unwrap_or(1);
    let (provider, date) = rest.split_at(rest.len() - date_words);

    Some([
        words[0].to_string(),
        words[1].to_string(),
        provider.join(" "),
        date.join(" "),
    ])
}

/// Parse the text lines of the card table
///
/// Header lines (repeated on every page) are skipped. Lines that cannot be
/// read as a row are logged and skipped.
pub fn parse_card_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Table> {
    let mut table = Table::new(CARD_COLUMNS);
    for line in lines {
        let line = line.trim();
        if line.is_empty() || is_header(line) {
            continue;
        }
        match split_card_line(line) {
            Some(fields) => table.push_row(fields.into_iter().map(Value::from).collect())?,
            None => log::warn!("Skipping line that is not a card row: {:?}", line),
        }
    }
    Ok(table)
}

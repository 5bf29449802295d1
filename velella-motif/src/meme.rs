//! MEME minimal format reader and writer.
//!
//! The reader recognizes the handful of line kinds the format anchors at
//! column 0 (`MEME version`, `ALPHABET=`, `strands:`, background lines,
//! `MOTIF`, `letter-probability matrix:`) and is deliberately tolerant:
//! a block whose matrix cannot be parsed is dropped without aborting the
//! blocks that follow it. The writer mirrors the reader's expectations and
//! always emits the uniform background and both strands.

use velella_core::{Result, VelellaError};

use crate::pwm::Pwm;

/// A named motif, as read from or written to a MEME file.
#[derive(Debug, Clone, PartialEq)]
pub struct Motif {
    /// Motif name: the trimmed remainder of its `MOTIF` line.
    pub name: String,
    /// The probability matrix.
    pub pwm: Pwm,
}

impl Motif {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, pwm: Pwm) -> Self {
        Self {
            name: name.into(),
            pwm,
        }
    }
}

enum RowParse {
    Row([f64; 4]),
    WrongArity,
    NotNumeric,
}

/// Parse a candidate matrix row: exactly four whitespace-separated finite
/// floats. Lines with any non-numeric token (or no tokens) are not rows;
/// lines of floats with the wrong count poison the enclosing block.
fn parse_row(line: &str) -> RowParse {
    let mut vals = [0.0f64; 4];
    let mut n = 0usize;
    for tok in line.split_whitespace() {
        match tok.parse::<f64>() {
            Ok(v) if v.is_finite() => {
                if n < 4 {
                    vals[n] = v;
                }
                n += 1;
            }
            _ => return RowParse::NotNumeric,
        }
    }
    match n {
        0 => RowParse::NotNumeric,
        4 => RowParse::Row(vals),
        _ => RowParse::WrongArity,
    }
}

/// Extract the authoritative `w=` value from a matrix header line.
fn parse_width(line: &str) -> Option<usize> {
    let idx = line.find("w=")?;
    line[idx + 2..].split_whitespace().next()?.parse().ok()
}

/// Read motifs from MEME-formatted text, in file order.
///
/// `max_motifs` stops parsing after that many successful motifs. Blocks
/// whose matrix fails to parse (missing header within 10 lines, wrong row
/// arity, fewer rows than `w=` declares) are silently omitted.
///
/// # Errors
///
/// Returns [`VelellaError::InvalidInput`] if an `ALPHABET=` line declares
/// anything other than `ACGT`.
pub fn read_meme(input: &str, max_motifs: Option<usize>) -> Result<Vec<Motif>> {
    let lines: Vec<&str> = input.lines().collect();
    let mut motifs = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if let Some(cap) = max_motifs {
            if motifs.len() >= cap {
                break;
            }
        }
        let line = lines[i];

        if let Some(rest) = line.strip_prefix("ALPHABET=") {
            if rest.trim() != "ACGT" {
                return Err(VelellaError::InvalidInput(format!(
                    "read_meme: unsupported alphabet '{}'",
                    rest.trim()
                )));
            }
            i += 1;
        } else if line.starts_with("MOTIF") {
            let name = line["MOTIF".len()..].trim().to_string();

            // The matrix header must show up within the next 10 lines.
            let mut j = i + 1;
            let mut width = None;
            while j < lines.len() && j <= i + 10 {
                if lines[j].starts_with("MOTIF") {
                    break;
                }
                if lines[j].starts_with("letter-probability matrix:") {
                    width = parse_width(lines[j]);
                    j += 1;
                    break;
                }
                j += 1;
            }
            let Some(w) = width.filter(|&w| w > 0) else {
                i = j;
                continue;
            };

            // Collect exactly w rows, skipping interleaved non-numeric
            // lines; a float row with the wrong arity fails the block.
            let mut rows = Vec::with_capacity(w);
            let mut poisoned = false;
            while j < lines.len() && rows.len() < w {
                if lines[j].starts_with("MOTIF") {
                    break;
                }
                match parse_row(lines[j]) {
                    RowParse::Row(r) => {
                        rows.push(r);
                        j += 1;
                    }
                    RowParse::WrongArity => {
                        poisoned = true;
                        j += 1;
                        break;
                    }
                    RowParse::NotNumeric => j += 1,
                }
            }

            if !poisoned && rows.len() == w {
                if let Ok(pwm) = Pwm::new(rows) {
                    motifs.push(Motif { name, pwm });
                }
            }
            i = j;
        } else {
            i += 1;
        }
    }

    Ok(motifs)
}

/// Write motifs in MEME minimal format.
pub fn write_meme(motifs: &[Motif]) -> String {
    let mut out = String::new();
    out.push_str("MEME version 5\n\n");
    out.push_str("ALPHABET= ACGT\n\n");
    out.push_str("strands: + -\n\n");
    out.push_str("Background letter frequencies\n");
    out.push_str("A 0.25 C 0.25 G 0.25 T 0.25\n\n");

    for motif in motifs {
        out.push_str(&format!("MOTIF {}\n", motif.name));
        out.push_str(&format!(
            "letter-probability matrix: alength= 4 w= {}\n",
            motif.pwm.width()
        ));
        for row in motif.pwm.matrix() {
            out.push_str(&format!(
                " {:.6}  {:.6}  {:.6}  {:.6}\n",
                row[0], row[1], row[2], row[3]
            ));
        }
        out.push('\n');
    }

    out
}

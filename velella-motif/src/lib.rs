//! Motif scanning and comparison for the velella workspace.
//!
//! Implements the two classic motif algorithms on top of an exact
//! discretized score-distribution engine:
//!
//! - **One-hot encoding**: [`OneHot`] sequences over the fixed ACGT alphabet
//! - **PWMs**: [`Pwm`] probability matrices and their [`LogPwm`] log-odds form
//! - **MEME I/O**: [`read_meme`] / [`write_meme`] for the minimal text format
//! - **Score distributions**: [`ScoreDistribution`] survival functions for p-values
//! - **FIMO**: [`fimo`] scans sequences for motif occurrences on both strands
//! - **TOMTOM**: [`tomtom`] compares motif lists by best ungapped alignment
//!
//! # Example
//!
//! ```
//! use velella_motif::{fimo, read_meme, FimoOptions};
//!
//! let text = "\
//! MEME version 5
//!
//! MOTIF example
//! letter-probability matrix: alength= 4 w= 2
//!  0.900000  0.033000  0.034000  0.033000
//!  0.033000  0.900000  0.034000  0.033000
//! ";
//! let motifs = read_meme(text, None).unwrap();
//! let options = FimoOptions { threshold: 0.5, ..FimoOptions::default() };
//! let results = fimo(&motifs, &[b"TTACGT"], &options).unwrap();
//! assert_eq!(results[0].hits[0].start, 2);
//! ```

pub mod dist;
pub mod fimo;
pub mod meme;
pub mod onehot;
pub mod pwm;
pub mod tomtom;

pub use dist::{ScoreDistribution, DEFAULT_BIN_SIZE};
pub use fimo::{fimo, FimoOptions, Hit, MotifResult};
pub use meme::{read_meme, write_meme, Motif};
pub use onehot::OneHot;
pub use pwm::{consensus, LogPwm, Pwm, Strand, DEFAULT_EPSILON};
pub use tomtom::{tomtom, PValueMode, TomtomOptions, TomtomResults};

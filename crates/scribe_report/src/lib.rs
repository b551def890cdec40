//! # scribe_report
//!
//! Markdown solution design documents for Terraform configurations.
//!
//! A report is assembled from a classified model, its summary counts and
//! the two rendered diagrams:
//!
//! ```rust,no_run
//! use scribe_report::{report_file_name, ReportGenerator, ReportInput};
//! # fn input() -> ReportInput { unimplemented!() }
//!
//! let input = input();
//! let path = std::path::Path::new("docs").join(report_file_name(&input.provider_name));
//! ReportGenerator::new(input).write_to(&path).unwrap();
//! ```

pub mod document;
pub mod error;
pub mod summary;
pub mod table;

pub use document::{report_file_name, ReportGenerator, ReportInput};
pub use error::{ReportError, ReportResult};

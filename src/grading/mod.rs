//! Scoring submitted queries and keeping the best grade per student.

mod evaluator;
mod recorder;

pub use evaluator::{FULL_MARKS, PARTIAL_MARKS, evaluate, normalize};
pub use recorder::{RecordOutcome, Submission, current_grade, record_grade, submit};

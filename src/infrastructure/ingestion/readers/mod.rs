//! Document reader implementations

mod docx;
mod pdf;
mod plain_text;

pub use docx::DocxReader;
pub use pdf::PdfReader;
pub use plain_text::PlainTextReader;

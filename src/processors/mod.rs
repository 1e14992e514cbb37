//! Document import and export

pub mod docx;
pub mod epub;
pub mod export;
pub mod fonts;
pub mod format;
pub mod import;
pub mod pdf;

//! Single-pass XBRL fact extraction for UK Companies House bulk accounts
//! filings.
//!
//! [`extract`] is the only entry point a caller needs: hand it a filename
//! (used only for its `Prod<n>_<n>_<company>_<date>.<ext>` grammar) and the
//! raw document bytes, and get back the fixed 37-column row set. The
//! function is synchronous and holds no shared mutable state beyond a
//! process-wide, lazily-built, read-only matcher table, so it's safe to
//! call concurrently from multiple threads on distinct inputs.
//!
//! ```rust,no_run
//! let bytes = std::fs::read("Prod224_1_01234567_20221231.html")?;
//! let rows = ch_xbrl_core::extract("Prod224_1_01234567_20221231.html", &bytes)?;
//! for row in rows {
//!     println!("{} {:?}", row.company_id, row.debtors);
//! }
//! # Ok::<(), ch_xbrl_core::ExtractError>(())
//! ```

pub mod catalog;
pub mod context;
pub mod error;
pub mod extract;
pub mod row;
pub mod value;

#[cfg(test)]
mod extract_tests;

pub use error::{ExtractError, ExtractResult};
pub use row::Row;
pub use value::Value;

use roxmltree::Document;
use tracing::{debug, warn};

use crate::context::ContextIndex;
use crate::row::{parse_filename, taxonomy_for};

/// Extracts every fact row from one filing.
///
/// `filename` only needs to be the basename; any leading path components are
/// stripped before the grammar is applied. A malformed document or an
/// unrecognized filename is reported as an [`ExtractError`] rather than a
/// panic — callers processing a batch of filings are expected to catch one
/// bad filing and keep going.
pub fn extract(filename: &str, bytes: &[u8]) -> ExtractResult<Vec<Row>> {
    let core = parse_filename(filename)?;

    let text = decode_lossy(bytes);
    let doc = Document::parse(&text).map_err(|e| {
        warn!(filename, error = %e, "failed to parse XBRL document");
        ExtractError::MalformedInput(e.to_string())
    })?;

    let contexts = ContextIndex::build(&doc);
    debug!(filename, contexts = contexts.len(), "built context index");

    let facts = extract::extract_facts(&doc, &contexts);
    let taxonomy = taxonomy_for(&doc);
    let rows = row::assemble_rows(core, taxonomy, &facts);

    debug!(filename, rows = rows.len(), "assembled rows");
    Ok(rows)
}

/// Recovers from a leading UTF-8 BOM or junk bytes before the first `<`, and
/// from any invalid UTF-8 sequences, the way a tolerant bulk-ingest pipeline
/// must when the upstream filings aren't guaranteed well-formed.
fn decode_lossy(bytes: &[u8]) -> String {
    let start = bytes.iter().position(|b| *b == b'<').unwrap_or(0);
    String::from_utf8_lossy(&bytes[start..]).into_owned()
}

#[cfg(test)]
mod decode_tests {
    use super::*;

    #[test]
    fn strips_bom_and_leading_junk() {
        let bytes = b"\xEF\xBB\xBF<root/>";
        assert_eq!(decode_lossy(bytes), "<root/>");
    }
}

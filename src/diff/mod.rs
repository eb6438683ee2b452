mod expand;
mod segment;
mod span;

pub use expand::expand_diff;
pub use segment::{segment_diff, Segment};
pub use span::Span;

use span::parse_span;

/// Parse a hunk header line (`@@ -O[,C] +N[,C2] @@ ...`) into its two spans.
///
/// Returns `None` for anything that does not satisfy the header contract:
/// fewer than two whitespace-separated tokens between the first pair of `@@`
/// markers, a first token not starting with `-`, a second token not starting
/// with `+`, or unparseable span integers. Callers skip such lines instead of
/// failing the file.
pub(crate) fn parse_header(line: &str) -> Option<(Span, Span)> {
    let body = line.split("@@").nth(1)?.trim();
    let mut tokens = body.split_whitespace();
    let old_token = tokens.next()?;
    let new_token = tokens.next()?;
    // Tokens beyond the first two (e.g. section headings leaking into the
    // marker pair) are ignored.
    let old_span = parse_span(old_token.strip_prefix('-')?)?;
    let new_span = parse_span(new_token.strip_prefix('+')?)?;
    Some((old_span, new_span))
}

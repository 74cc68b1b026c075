use crate::model::Declaration;
use crate::services::ExtractError;
use crate::session::AnalyzerSession;

/// Return the exact source text of `declaration`.
///
/// The span is `[source_start, source_start + source_length)` in bytes of the
/// file at `absolute_path`, looked up through the session. Ranges past the end
/// of the file are an error; nothing is truncated.
pub fn extract_code<S>(session: &S, declaration: &Declaration) -> Result<String, ExtractError>
where
    S: AnalyzerSession + ?Sized,
{
    let path = &declaration.absolute_path;
    let text =
        session.source_text(path).ok_or_else(|| ExtractError::MissingSource(path.clone()))?;

    let start = declaration.source_start;
    let len = text.len();
    let end = match start.checked_add(declaration.source_length) {
        Some(end) if end <= len => end,
        overflowed => {
            return Err(ExtractError::OutOfRange {
                name: declaration.name.clone(),
                path: path.clone(),
                start,
                end: overflowed.unwrap_or(usize::MAX),
                len,
            })
        }
    };

    text.get(start..end).map(str::to_string).ok_or_else(|| ExtractError::SliceBoundary {
        name: declaration.name.clone(),
        start,
        end,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParseStage {
    FindingFirstBoundary,
    ReadingPartHeaders,
    ReadingPartData,
    DeterminingBoundaryType,
    Eof,
}

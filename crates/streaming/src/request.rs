/// Identifies one model load request.
///
/// Issued in strictly increasing order by [`crate::LoadTracker`], so a larger
/// value is always the more recent request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadRequest(pub u64);

impl std::fmt::Display for LoadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "load#{}", self.0)
    }
}

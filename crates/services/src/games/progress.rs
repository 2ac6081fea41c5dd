/// Aggregated view of game progress, useful for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub score: u32,
    pub is_complete: bool,
}

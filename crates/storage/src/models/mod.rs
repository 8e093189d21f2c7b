pub mod competition;
pub mod essay;
pub mod paragraph;

pub use competition::{Competition, CompetitionPhase};
pub use essay::{Essay, EssayStatus};
pub use paragraph::Paragraph;

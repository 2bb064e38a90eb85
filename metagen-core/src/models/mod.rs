pub mod chromosome;
pub mod interval;
pub mod storage;
pub mod window;

// re-export for cleaner imports
pub use self::chromosome::{Chromosome, ProjectChromosomes};
pub use self::interval::ScoredInterval;
pub use self::storage::{ListLayout, ScorePrecision, ScoreStore};
pub use self::window::GenomeWindow;

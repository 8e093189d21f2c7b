use chrono::Duration;
use storage::models::Essay;

/// Best values observed across a competition's completed essays, used as
/// normalization anchors for speed and length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompetitionExtremes {
    pub fastest_time: Duration,
    pub max_words: i32,
}

impl CompetitionExtremes {
    /// Extremes over one snapshot of essays. Essays without `completed_at`
    /// are ignored; `None` when no essay qualifies.
    pub fn from_essays<'a, I>(essays: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Essay>,
    {
        let mut extremes: Option<Self> = None;

        for essay in essays {
            let Some(elapsed) = essay.elapsed() else {
                continue;
            };

            extremes = Some(match extremes {
                None => Self {
                    fastest_time: elapsed,
                    max_words: essay.word_count,
                },
                Some(current) => Self {
                    fastest_time: current.fastest_time.min(elapsed),
                    max_words: current.max_words.max(essay.word_count),
                },
            });
        }

        extremes
    }

    pub fn fastest_time_seconds(&self) -> rust_decimal::Decimal {
        rust_decimal::Decimal::new(self.fastest_time.num_milliseconds(), 3)
    }
}

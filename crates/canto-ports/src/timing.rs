/// Tempo is treated as constant for the lifetime of a sentence.
pub trait SongTimingPort: Send + Sync {
    fn beats_per_second(&self) -> f64;
}

/// One planned time window of the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSpec {
    /// 1-based position in the plan.
    pub index: usize,
    pub start_seconds: f64,
    pub length_seconds: f64,
}

impl ChunkSpec {
    pub fn end_seconds(&self) -> f64 {
        self.start_seconds + self.length_seconds
    }
}

/// Plan fixed-length chunks covering `[0, total_seconds)`.
///
/// Every chunk is `chunk_minutes` long except the last, which takes the
/// remainder. Returns an empty plan when the file fits in a single chunk,
/// meaning the file should be left whole.
pub fn plan_chunks(total_seconds: f64, chunk_minutes: u32) -> Vec<ChunkSpec> {
    let chunk_seconds = f64::from(chunk_minutes) * 60.0;

    if !total_seconds.is_finite() || total_seconds <= 0.0 || chunk_seconds <= 0.0 {
        return Vec::new();
    }

    let whole = (total_seconds / chunk_seconds).floor() as usize;
    let remainder = total_seconds - whole as f64 * chunk_seconds;
    let count = whole + usize::from(remainder > 0.0);

    if count <= 1 {
        return Vec::new();
    }

    (1..=count)
        .map(|index| {
            let start_seconds = (index - 1) as f64 * chunk_seconds;
            let length_seconds = if index == count {
                total_seconds - start_seconds
            } else {
                chunk_seconds
            };
            ChunkSpec {
                index,
                start_seconds,
                length_seconds,
            }
        })
        .collect()
}

pub mod decomposition;
pub mod patterns;

/// Calendar month of the `index`-th point, falling back to the position in
/// a January-aligned monthly series when the point carries no month or a
/// month outside 1-12.
pub(crate) fn month_or_position(month: Option<u32>, index: usize) -> u32 {
    match month {
        Some(m) if (1..=12).contains(&m) => m,
        _ => (index % 12) as u32 + 1,
    }
}

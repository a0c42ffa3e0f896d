use crate::units::Pt;

/// The x position where each of `columns` equal-width columns starts, when
/// `page_width` is split evenly to the right of `margin_left`. Pass the
/// cursor's current x as `margin_left` to split the remaining space instead.
pub fn column_starts(page_width: Pt, margin_left: Pt, columns: usize) -> Vec<Pt> {
    if columns == 0 {
        return Vec::new();
    }
    let column_width = page_width / columns as f32;
    (0..columns)
        .map(|i| margin_left + column_width * i as f32)
        .collect()
}

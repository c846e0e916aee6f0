//! Label color palette.

/// Colors assigned to label slots, in slot order.
///
/// Sized to the maximum number of labels the settings accept; a longer label
/// list wraps around and reuses colors from the start.
pub const LABEL_PALETTE: [&str; 10] = [
    "#EF4444", // red
    "#FBBF24", // amber
    "#32A832", // green
    "#00CCCC", // cyan
    "#CC00CC", // magenta
    "#3366FF", // blue
    "#FF6600", // orange
    "#8B5CF6", // violet
    "#EC4899", // pink
    "#84CC16", // lime
];

/// Color for a label slot, wrapping when the slot exceeds the palette.
pub fn palette_color(slot: usize) -> &'static str {
    LABEL_PALETTE[slot % LABEL_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_wraps() {
        assert_eq!(palette_color(0), LABEL_PALETTE[0]);
        assert_eq!(palette_color(LABEL_PALETTE.len() + 2), LABEL_PALETTE[2]);
    }
}

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Width of one grapheme cluster in terminal cells. Tabs render as 4 cells.
pub(crate) fn cluster_width(cluster: &str) -> usize {
    if cluster == "\t" {
        4
    } else {
        UnicodeWidthStr::width(cluster)
    }
}

/// Display width of a string in terminal cells.
///
/// All column math in the TUI goes through this, so CJK vendor names,
/// emoji, and combining marks line up with what the terminal draws.
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(cluster_width).sum()
}

/// Clip a string to at most `max_cells` terminal cells, ending in `…` when
/// anything was cut. Never splits a grapheme cluster; a wide cluster that
/// straddles the limit is dropped, so the result can come up a cell short.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    let budget = max_cells - 1; // last cell belongs to the ellipsis
    let mut used = 0;
    let mut out = String::new();
    for cluster in s.graphemes(true) {
        let w = cluster_width(cluster);
        if used + w > budget {
            break;
        }
        used += w;
        out.push_str(cluster);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- display_width ---

    #[test]
    fn width_of_plain_ascii() {
        assert_eq!(display_width("Reconcile operating account"), 27);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn width_counts_wide_clusters_double() {
        assert_eq!(display_width("三菱"), 4);
        assert_eq!(display_width("Wire to 三菱 UFJ"), 16);
    }

    #[test]
    fn width_of_emoji() {
        assert_eq!(display_width("✅"), 2);
    }

    #[test]
    fn width_ignores_combining_marks() {
        // "Café Río" with combining accents spans 8 cells
        assert_eq!(display_width("Cafe\u{0301} Ri\u{0301}o"), 8);
    }

    #[test]
    fn width_of_zero_width_space() {
        assert_eq!(display_width("a\u{200B}b"), 2);
    }

    #[test]
    fn width_of_fullwidth_forms() {
        assert_eq!(display_width("ＡＢ"), 4);
    }

    #[test]
    fn width_counts_tab_as_four() {
        assert_eq!(display_width("\tamount"), 10);
        assert_eq!(display_width("a\tb"), 6);
    }

    #[test]
    fn width_of_box_drawing() {
        assert_eq!(display_width("│ ─"), 3);
    }

    // --- truncate_to_width ---

    #[test]
    fn truncate_leaves_fitting_text_alone() {
        assert_eq!(truncate_to_width("ACC001", 20), "ACC001");
        assert_eq!(truncate_to_width("$4,500.00", 9), "$4,500.00");
    }

    #[test]
    fn truncate_reserves_a_cell_for_the_ellipsis() {
        assert_eq!(
            truncate_to_width("Monthly account maintenance fee", 12),
            "Monthly acc…"
        );
    }

    #[test]
    fn truncate_never_splits_a_wide_cluster() {
        // 8 cells of CJK into 5: two clusters fit the 4-cell budget
        assert_eq!(truncate_to_width("商品売上高税", 5), "商品…");
        // Into 4: budget 3, second cluster would straddle it
        let clipped = truncate_to_width("商品売上高税", 4);
        assert_eq!(clipped, "商…");
        assert!(display_width(&clipped) <= 4);
    }

    #[test]
    fn truncate_emoji_row() {
        assert_eq!(truncate_to_width("✅✅✅", 4), "✅…");
    }

    #[test]
    fn truncate_degenerate_budgets() {
        assert_eq!(truncate_to_width("payment", 0), "");
        assert_eq!(truncate_to_width("payment", 1), "…");
    }
}

use std::collections::VecDeque;
use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

use crate::util::unicode::{self, cluster_width};

/// A run of grapheme clusters laid out as a unit: either a whitespace run
/// or a word fragment (words split after interior hyphens).
struct Token {
    start: usize,
    end: usize,
    width: usize,
    space: bool,
}

fn tokenize(line: &str, from: usize, to: usize) -> VecDeque<Token> {
    let mut tokens = VecDeque::new();
    let mut cur: Option<Token> = None;
    let mut after_hyphen = false;
    for (at, cluster) in line[from..to].grapheme_indices(true) {
        let at = from + at;
        let space = cluster.chars().all(char::is_whitespace);
        let starts_new = match &cur {
            None => true,
            Some(tok) => tok.space != space || (!space && after_hyphen),
        };
        if starts_new {
            tokens.extend(cur.take());
            cur = Some(Token {
                start: at,
                end: at + cluster.len(),
                width: cluster_width(cluster),
                space,
            });
        } else if let Some(tok) = cur.as_mut() {
            tok.end = at + cluster.len();
            tok.width += cluster_width(cluster);
        }
        after_hyphen = cluster == "-";
    }
    tokens.extend(cur);
    tokens
}

/// Byte offset after the last whole cluster of `tok` that fits in `budget`
/// cells. Returns `tok.start` when not even the first cluster fits.
fn fit_clusters(line: &str, tok: &Token, budget: usize) -> usize {
    let mut used = 0;
    let mut split = tok.start;
    for (at, cluster) in line[tok.start..tok.end].grapheme_indices(true) {
        let w = cluster_width(cluster);
        if used + w > budget {
            break;
        }
        used += w;
        split = tok.start + at + cluster.len();
    }
    split
}

/// Soft-wrap one logical line to `width` cells, returning the byte range of
/// each visual row. Always yields at least one row.
///
/// Breaks fall at whitespace or after a hyphen. The whitespace run at a
/// break is swallowed. A word that cannot fit even on a row of its own is
/// hard-wrapped cluster by cluster, and a row less than half full borrows
/// the head of the next word instead of breaking early.
pub fn wrap_line(line: &str, width: usize) -> Vec<Range<usize>> {
    if width == 0 || unicode::display_width(line) <= width {
        return vec![0..line.len()];
    }

    let mut rows: Vec<Range<usize>> = Vec::new();
    let mut row_start = 0;
    let mut col = 0;

    let mut pending = tokenize(line, 0, line.len());
    while let Some(tok) = pending.pop_front() {
        if col + tok.width <= width {
            col += tok.width;
            continue;
        }

        if tok.space {
            rows.push(row_start..tok.start);
            row_start = tok.end;
            col = 0;
            continue;
        }

        let remaining = width - col;
        if col > 0 && remaining * 2 > width {
            // Row is under half full: take the head of the word now.
            let split = fit_clusters(line, &tok, remaining);
            if split > tok.start {
                rows.push(row_start..split);
                row_start = split;
                col = 0;
                // The tail may itself contain hyphen break points.
                let mut tail = tokenize(line, split, tok.end);
                while let Some(t) = tail.pop_back() {
                    pending.push_front(t);
                }
                continue;
            }
        }

        if col > 0 {
            rows.push(row_start..tok.start);
            row_start = tok.start;
            col = 0;
        }
        if tok.width <= width {
            col = tok.width;
            continue;
        }

        // Word wider than the view: hard-wrap it, at least one cluster
        // per row so a cluster wider than `width` still makes progress.
        let mut seg_start = row_start;
        let mut seg_width = 0;
        for (at, cluster) in line[tok.start..tok.end].grapheme_indices(true) {
            let at = tok.start + at;
            let w = cluster_width(cluster);
            if seg_width + w > width && seg_width > 0 {
                rows.push(seg_start..at);
                seg_start = at;
                seg_width = 0;
            }
            seg_width += w;
        }
        row_start = seg_start;
        col = seg_width;
    }

    rows.push(row_start..line.len());
    rows
}

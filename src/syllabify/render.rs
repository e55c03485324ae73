use super::HYPHEN;

/// Syllable colors in colors mode, cycled in order.
pub const PALETTE: &[&str] = &["black", "red"];

const HYPHEN_OPEN: &str = "<span class=\"hyphen\">";
const HYPHENS_OPEN: &str = "<span class=\"hyphens\">";
const SPAN_CLOSE: &str = "</span>";

fn color_open(color: &str) -> String {
    format!("<span style=\"color: {color}\">")
}

/// Wraps each syllable in a colored span, cycling through [`PALETTE`].
pub fn colorize<'a>(syllables: impl IntoIterator<Item = &'a str>) -> String {
    syllables
        .into_iter()
        .zip(PALETTE.iter().cycle())
        .map(|(syllable, color)| format!("{}{syllable}{SPAN_CLOSE}", color_open(color)))
        .collect()
}

/// Markup for a single boundary in hyphen mode.
pub fn hyphen_markup() -> String {
    format!("{HYPHEN_OPEN}{HYPHEN}{SPAN_CLOSE}")
}

/// Surrounds `word` with `hyphen_count` hyphens, half in front (rounded up)
/// and the rest behind.
pub fn pad_with_hyphens(word: &str, hyphen_count: usize) -> String {
    let leading = (hyphen_count + 1) / 2;
    let trailing = hyphen_count - leading;
    let run = |n: usize| HYPHEN.to_string().repeat(n);

    format!(
        "{HYPHENS_OPEN}{}{SPAN_CLOSE}{word}{HYPHENS_OPEN}{}{SPAN_CLOSE}",
        run(leading),
        run(trailing)
    )
}

/// Removes the spans this module emits and the canonical hyphen. Any other
/// text, angle brackets included, is kept.
pub fn strip(text: &str) -> String {
    let mut out = text.replace(HYPHENS_OPEN, "").replace(HYPHEN_OPEN, "");
    for color in PALETTE {
        out = out.replace(&color_open(color), "");
    }
    out.replace(SPAN_CLOSE, "").replace(HYPHEN, "")
}

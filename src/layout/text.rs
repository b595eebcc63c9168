use crate::text_metrics;

const ELLIPSIS: char = '\u{2026}';

/// Width factor (relative to font size) for the heuristic measurer.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '|' | '!' | '\'' => 0.26,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '{' | '}' | '-' => 0.34,
        'm' | 'w' => 0.84,
        'M' | 'W' | '@' | '%' | '&' | '#' => 0.93,
        'A'..='Z' => 0.66,
        'a'..='z' | '0'..='9' => 0.57,
        _ if !ch.is_ascii() => 0.9,
        _ => 0.568,
    }
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

pub(crate) fn text_width(text: &str, font_size: f32, font_family: &str, fast_metrics: bool) -> f32 {
    if fast_metrics {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

/// Trim `text` with a trailing ellipsis until it fits in `max_width`.
pub(crate) fn fit_label(
    text: &str,
    max_width: f32,
    font_size: f32,
    font_family: &str,
    fast_metrics: bool,
) -> String {
    let text = text.trim();
    if text_width(text, font_size, font_family, fast_metrics) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let mut candidate: String = chars.iter().collect::<String>().trim_end().to_string();
        candidate.push(ELLIPSIS);
        if text_width(&candidate, font_size, font_family, fast_metrics) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_labels_are_untouched() {
        assert_eq!(fit_label("  Keep ", 200.0, 13.0, "sans-serif", true), "Keep");
    }

    #[test]
    fn long_labels_end_in_an_ellipsis() {
        let label = fit_label(
            "The Grand Cathedral of the Seven Moons",
            100.0,
            13.0,
            "sans-serif",
            true,
        );
        assert!(label.ends_with(ELLIPSIS));
        assert!(text_width(&label, 13.0, "sans-serif", true) <= 100.0);
    }

    #[test]
    fn hopeless_budget_keeps_only_the_ellipsis() {
        assert_eq!(fit_label("Moat", 1.0, 13.0, "sans-serif", true), "\u{2026}");
    }

    #[test]
    fn fallback_width_scales_with_font_size() {
        let w13 = fallback_text_width("Harbor", 13.0);
        let w26 = fallback_text_width("Harbor", 26.0);
        assert!((w26 - w13 * 2.0).abs() < 0.01);
    }
}

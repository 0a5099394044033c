//! Flat two-part SVG badges

use crate::utils::html_escape;

/// Hex values of the named badge colors
fn hex_color(color: &str) -> String {
    let hex = match color {
        "brightgreen" | "success" => "#4c1",
        "green" => "#97ca00",
        "yellowgreen" => "#a4a61d",
        "yellow" => "#dfb317",
        "orange" | "important" => "#fe7d37",
        "red" | "critical" => "#e05d44",
        "blue" | "informational" => "#007ec6",
        "lightgrey" | "inactive" => "#9f9f9f",
        other => return other.to_string(),
    };
    hex.to_string()
}

// Approximate advance widths of Verdana 11px
fn text_width(text: &str) -> u32 {
    text.chars()
        .map(|c| match c {
            'i' | 'j' | 'l' | '!' | '.' | ',' | ':' | ';' | '\'' | '|' => 4,
            ' ' | 'f' | 'r' | 't' | 'I' | '(' | ')' | '[' | ']' | '-' => 5,
            'm' | 'w' | 'M' | 'W' | '%' => 10,
            c if c.is_ascii_uppercase() => 8,
            _ => 7,
        })
        .sum()
}

/// Render a badge with `left` on grey and `right` on `color`
pub fn render(left: &str, right: &str, color: &str) -> String {
    let left_width = text_width(left) + 10;
    let right_width = text_width(right) + 10;
    let total = left_width + right_width;
    let left_x = left_width as f32 / 2.0;
    let right_x = left_width as f32 + right_width as f32 / 2.0;
    let fill = html_escape(&hex_color(color));
    let left = html_escape(left);
    let right = html_escape(right);

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{total}" height="20" role="img" aria-label="{left}: {right}">
<title>{left}: {right}</title>
<linearGradient id="s" x2="0" y2="100%"><stop offset="0" stop-color="#bbb" stop-opacity=".1"/><stop offset="1" stop-opacity=".1"/></linearGradient>
<clipPath id="r"><rect width="{total}" height="20" rx="3" fill="#fff"/></clipPath>
<g clip-path="url(#r)"><rect width="{left_width}" height="20" fill="#555"/><rect x="{left_width}" width="{right_width}" height="20" fill="{fill}"/><rect width="{total}" height="20" fill="url(#s)"/></g>
<g fill="#fff" text-anchor="middle" font-family="Verdana,Geneva,DejaVu Sans,sans-serif" font-size="11">
<text x="{left_x}" y="15" fill="#010101" fill-opacity=".3">{left}</text><text x="{left_x}" y="14">{left}</text>
<text x="{right_x}" y="15" fill="#010101" fill-opacity=".3">{right}</text><text x="{right_x}" y="14">{right}</text>
</g>
</svg>
"##
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_contains_labels_and_color() {
        let svg = render("test coverage", "93%", "yellow");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(">test coverage</text>"));
        assert!(svg.contains(">93%</text>"));
        assert!(svg.contains("fill=\"#dfb317\""));
    }

    #[test]
    fn test_custom_colors_pass_through() {
        assert_eq!(hex_color("#123456"), "#123456");
        assert_eq!(hex_color("brightgreen"), "#4c1");
    }

    #[test]
    fn test_labels_are_escaped() {
        let svg = render("a<b", "x&y", "red");
        assert!(svg.contains("a&lt;b"));
        assert!(svg.contains("x&amp;y"));
    }
}

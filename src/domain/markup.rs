// Markup helpers shared by the editor and legend renderers

/// Fill `{n}` placeholders by position. Placeholders without a matching value
/// are left in place.
pub fn fill_template(template: &str, values: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}');
        let index = close.and_then(|c| after[..c].parse::<usize>().ok());

        match (close, index) {
            (Some(c), Some(i)) if i < values.len() => {
                out.push_str(&values[i]);
                rest = &after[c + 1..];
            }
            (Some(c), _) => {
                out.push_str(&rest[open..open + c + 2]);
                rest = &after[c + 1..];
            }
            (None, _) => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Convert `#RRGGBB` to `rgb(r, g, b)`, or `rgba(r, g, b, a)` when a non-zero
/// alpha is given. Unparseable channels fall back to 0.
pub fn hex_to_css(hex: &str, alpha: Option<f64>) -> String {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    let (r, g, b) = (channel(0..2), channel(2..4), channel(4..6));

    match alpha {
        Some(a) if a != 0.0 => format!("rgba({}, {}, {}, {})", r, g, b, a),
        _ => format!("rgb({}, {}, {})", r, g, b),
    }
}

/// Escape text placed inside element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Legend sub-item used by the traffic speed and winter roads legends.
pub fn legend_sub_item(label: &str, color: &str) -> String {
    format!(
        "<li>{} <hr style=\"background-color: {}; margin-right: 15px; height: 6px;\"></li>",
        label, color
    )
}

pub fn checked_attr(checked: bool) -> &'static str {
    if checked { "checked" } else { "" }
}

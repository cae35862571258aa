/// Foreground choice for text painted over a custom background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contrast {
    Dark,
    Light,
}

impl Contrast {
    pub fn hex(&self) -> &'static str {
        match self {
            Contrast::Dark => "#000000",
            Contrast::Light => "#ffffff",
        }
    }
}

/// Parse `#rgb` or `#rrggbb` into channel bytes. Decodes per byte, so any
/// non-hex byte (including a multibyte char) is a `None`, never a panic.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    match value.trim().strip_prefix('#')?.as_bytes() {
        [r, g, b] => Some((
            hex_nibble(*r)? * 17,
            hex_nibble(*g)? * 17,
            hex_nibble(*b)? * 17,
        )),
        [r1, r0, g1, g0, b1, b0] => Some((
            (hex_nibble(*r1)? << 4) | hex_nibble(*r0)?,
            (hex_nibble(*g1)? << 4) | hex_nibble(*g0)?,
            (hex_nibble(*b1)? << 4) | hex_nibble(*b0)?,
        )),
        _ => None,
    }
}

fn hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Black-or-white foreground for the given background, using the perceived
/// luminance cut `0.299 r + 0.587 g + 0.114 b > 186`. Unparseable input gets
/// the dark foreground.
pub fn contrast_color(background: &str) -> Contrast {
    let Some((r, g, b)) = parse_hex_color(background) else {
        return Contrast::Dark;
    };
    let luminance = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
    if luminance > 186.0 {
        Contrast::Dark
    } else {
        Contrast::Light
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(parse_hex_color("#ff8000"), Some((255, 128, 0)));
        assert_eq!(parse_hex_color("#f80"), Some((255, 136, 0)));
        assert_eq!(parse_hex_color(" #1a2b3c "), Some((26, 43, 60)));
        assert_eq!(parse_hex_color("ff8000"), None);
        assert_eq!(parse_hex_color("#ff80"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn light_backgrounds_get_dark_text() {
        assert_eq!(contrast_color("#ffffff"), Contrast::Dark);
        assert_eq!(contrast_color("#ffe599"), Contrast::Dark);
    }

    #[test]
    fn dark_backgrounds_get_light_text() {
        assert_eq!(contrast_color("#000000"), Contrast::Light);
        assert_eq!(contrast_color("#1f3a5f"), Contrast::Light);
    }

    #[test]
    fn unparseable_background_defaults_to_dark() {
        assert_eq!(contrast_color("tomato"), Contrast::Dark);
    }

    #[test]
    fn non_ascii_input_is_rejected_without_panicking() {
        assert_eq!(parse_hex_color("#éa"), None);
        assert_eq!(parse_hex_color("#café1"), None);
        assert_eq!(contrast_color("#éa"), Contrast::Dark);
    }
}

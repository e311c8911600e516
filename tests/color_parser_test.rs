use crossterm::style::Color;
use gridwise::config::{ColorParser, ColoringConfig, Theme};
use gridwise::{rgb_to_256_color, rgb_to_basic_ansi, SeverityBucket};

fn true_color_parser() -> ColorParser {
    ColorParser::with_capabilities(true, true, false)
}

#[test]
fn test_parse_basic_ansi_colors() {
    let parser = true_color_parser();

    assert_eq!(parser.parse("black").unwrap(), Color::Black);
    assert_eq!(parser.parse("red").unwrap(), Color::DarkRed);
    assert_eq!(parser.parse("green").unwrap(), Color::DarkGreen);
    assert_eq!(parser.parse("cyan").unwrap(), Color::DarkCyan);
    assert_eq!(parser.parse("white").unwrap(), Color::Grey);
}

#[test]
fn test_parse_bright_and_gray_names() {
    let parser = true_color_parser();

    assert_eq!(parser.parse("bright_red").unwrap(), Color::Red);
    assert_eq!(parser.parse("bright red").unwrap(), Color::Red);
    assert_eq!(parser.parse("bright_white").unwrap(), Color::White);
    assert_eq!(parser.parse("dark_gray").unwrap(), Color::DarkGrey);
    assert_eq!(parser.parse("light_grey").unwrap(), Color::Grey);
}

#[test]
fn test_parse_case_insensitive() {
    let parser = true_color_parser();

    assert_eq!(parser.parse("RED").unwrap(), Color::DarkRed);
    assert_eq!(parser.parse("Bright_Cyan").unwrap(), Color::Cyan);
    assert_eq!(parser.parse("INDEXED(42)").unwrap(), Color::AnsiValue(42));
}

#[test]
fn test_parse_indexed_colors() {
    let parser = true_color_parser();

    assert_eq!(parser.parse("indexed(0)").unwrap(), Color::AnsiValue(0));
    assert_eq!(parser.parse("indexed(255)").unwrap(), Color::AnsiValue(255));
    assert!(parser.parse("indexed(256)").is_err());
    assert!(parser.parse("indexed(abc)").is_err());
}

#[test]
fn test_hex_downgrades_with_terminal_capabilities() {
    let rgb = ColorParser::with_capabilities(true, true, false);
    assert_eq!(
        rgb.parse("#ff0000").unwrap(),
        Color::Rgb { r: 255, g: 0, b: 0 }
    );

    let palette = ColorParser::with_capabilities(false, true, false);
    assert_eq!(
        palette.parse("#ff0000").unwrap(),
        Color::AnsiValue(rgb_to_256_color(255, 0, 0))
    );

    let basic = ColorParser::with_capabilities(false, false, false);
    assert_eq!(basic.parse("#ff0000").unwrap(), Color::DarkRed);
}

#[test]
fn test_invalid_colors() {
    let parser = true_color_parser();

    assert!(parser.parse("#ff00").is_err());
    assert!(parser.parse("#gg0000").is_err());
    assert!(parser.parse("tangerine").is_err());
}

#[test]
fn test_no_color_resets_everything() {
    let parser = ColorParser::with_capabilities(true, true, true);
    assert!(!parser.colors_enabled());
    assert_eq!(parser.parse("#ff0000").unwrap(), Color::Reset);
    assert_eq!(parser.parse("red").unwrap(), Color::Reset);
}

#[test]
fn test_never_mode_disables_color() {
    assert!(!ColorParser::for_mode("never").colors_enabled());
    assert!(ColorParser::for_mode("always").colors_enabled());
}

#[test]
fn test_rgb_conversions() {
    assert_eq!(rgb_to_256_color(0, 0, 0), 16);
    assert_eq!(rgb_to_256_color(255, 255, 255), 231);
    assert_eq!(rgb_to_256_color(255, 0, 0), 196);
    assert_eq!(rgb_to_basic_ansi(0, 200, 0), Color::DarkGreen);
    assert_eq!(rgb_to_basic_ansi(20, 20, 20), Color::Black);
}

#[test]
fn test_theme_maps_every_bucket() {
    let config = ColoringConfig::default();
    let theme = Theme::with_parser(&config, &true_color_parser()).unwrap();
    assert!(theme.enabled());
    assert_eq!(
        theme.bucket(SeverityBucket::DarkestGood),
        Color::Rgb {
            r: 0x1e,
            g: 0x7b,
            b: 0x34
        }
    );
    for bucket in SeverityBucket::ALL {
        assert_ne!(theme.bucket(bucket), Color::Reset);
    }
    assert_eq!(theme.get("header"), Color::DarkCyan);
}

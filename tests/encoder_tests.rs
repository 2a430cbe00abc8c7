//! # Encoder Golden Tests
//!
//! Byte-exact checks of the receipt encoder against hand-assembled ESC/POS
//! streams. Any change here changes what every printer prints.

use pretty_assertions::assert_eq;
use recibo::document::{self, FontSize, PrinterConfig, TextAlign};
use recibo::ir::{Op, TextEncoding};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Index of the first occurrence of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Footer and cut, identical on every receipt.
fn tail() -> Vec<u8> {
    let mut bytes = vec![0x1B, 0x61, 0x01, 0x1D, 0x21, 0x00];
    bytes.extend_from_slice(b"Thank you!");
    bytes.push(0x0A);
    bytes.extend_from_slice(&[0x0A; 4]);
    bytes.extend_from_slice(&[0x1D, 0x56, 0x00]);
    bytes
}

// ============================================================================
// GOLDEN STREAMS
// ============================================================================

#[test]
fn test_shop_receipt_bytes() {
    let config = PrinterConfig {
        header_text: "SHOP".into(),
        content: "Hello\nWorld".into(),
        text_align: TextAlign::Center,
        font_size: FontSize::Base,
        ..Default::default()
    };

    let mut expected = vec![0x1B, 0x40];
    expected.extend_from_slice(&[0x1B, 0x61, 0x01, 0x1B, 0x45, 0x01]);
    expected.extend_from_slice(b"SHOP");
    expected.extend_from_slice(&[0x0A, 0x0A, 0x1B, 0x45, 0x00]);
    expected.extend_from_slice(&[0x1B, 0x61, 0x01, 0x1D, 0x21, 0x00]);
    expected.extend_from_slice(b"Hello\nWorld\n\n");
    expected.extend(tail());

    assert_eq!(document::encode(&config), expected);
}

#[test]
fn test_empty_receipt_bytes() {
    let mut expected = vec![0x1B, 0x40, 0x1B, 0x61, 0x00, 0x1D, 0x21, 0x00, 0x0A, 0x0A];
    expected.extend(tail());

    assert_eq!(document::encode(&PrinterConfig::default()), expected);
}

#[test]
fn test_bold_body_bytes() {
    let config = PrinterConfig {
        content: "Hi".into(),
        bold: true,
        ..Default::default()
    };

    let mut expected = vec![0x1B, 0x40, 0x1B, 0x61, 0x00, 0x1D, 0x21, 0x00, 0x1B, 0x45, 0x01];
    expected.extend_from_slice(b"Hi\n\n");
    expected.extend_from_slice(&[0x1B, 0x45, 0x00]);
    expected.extend(tail());

    assert_eq!(document::encode(&config), expected);
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn test_encoding_is_deterministic() {
    let config = PrinterConfig {
        header_text: "Café".into(),
        content: "Line 1\r\nLine 2\n\u{2014} end".into(),
        font_size: FontSize::Xl,
        text_align: TextAlign::Right,
        bold: true,
        ..Default::default()
    };
    assert_eq!(document::encode(&config), document::encode(&config.clone()));
}

#[test]
fn test_empty_header_is_omitted() {
    let config = PrinterConfig {
        content: "body".into(),
        ..Default::default()
    };
    let bytes = document::encode(&config);

    // No bold-on anywhere and the body setup follows ESC @ directly.
    assert_eq!(find(&bytes, &[0x1B, 0x45, 0x01]), None);
    assert_eq!(&bytes[2..5], &[0x1B, 0x61, 0x00]);
}

#[test]
fn test_header_is_upper_cased() {
    let config = PrinterConfig {
        header_text: "corner shop".into(),
        ..Default::default()
    };
    let bytes = document::encode(&config);
    assert!(find(&bytes, b"CORNER SHOP").is_some());
    assert_eq!(find(&bytes, b"corner shop"), None);
}

#[test]
fn test_alignment_precedes_body() {
    for (align, code) in [
        (TextAlign::Left, 0x00),
        (TextAlign::Center, 0x01),
        (TextAlign::Right, 0x02),
    ] {
        let config = PrinterConfig {
            content: "BODY".into(),
            text_align: align,
            ..Default::default()
        };
        let bytes = document::encode(&config);
        let body = find(&bytes, b"BODY").unwrap();
        // ESC a n, GS ! n, then the body text.
        assert_eq!(&bytes[body - 6..body - 3], &[0x1B, 0x61, code], "{:?}", align);
    }
}

#[test]
fn test_size_mapping() {
    for (size, code) in [
        (FontSize::Sm, 0x00),
        (FontSize::Base, 0x00),
        (FontSize::Lg, 0x11),
        (FontSize::Xl, 0x33),
    ] {
        let config = PrinterConfig {
            content: "BODY".into(),
            font_size: size,
            ..Default::default()
        };
        let bytes = document::encode(&config);
        let body = find(&bytes, b"BODY").unwrap();
        assert_eq!(&bytes[body - 3..body], &[0x1D, 0x21, code], "{:?}", size);
    }
}

#[test]
fn test_header_image_never_reaches_the_stream() {
    let plain = PrinterConfig {
        content: "x".into(),
        ..Default::default()
    };
    let with_image = PrinterConfig {
        header_image: Some("data:image/png;base64,iVBORw0KGgo=".into()),
        header_image_name: "logo.png".into(),
        ..plain.clone()
    };
    assert_eq!(document::encode(&with_image), document::encode(&plain));
}

#[test]
fn test_text_encodings() {
    let config = PrinterConfig {
        content: "Café \u{201C}ok\u{201D}".into(),
        ..Default::default()
    };

    let cp437 = document::encode(&config);
    assert!(find(&cp437, &[b'C', b'a', b'f', 0x82, b' ', b'"', b'o', b'k', b'"']).is_some());

    let utf8 = document::encode_with(&config, TextEncoding::Utf8);
    assert!(find(&utf8, "Café \u{201C}ok\u{201D}".as_bytes()).is_some());
}

#[test]
fn test_body_control_bytes_cannot_cut_early() {
    let config = PrinterConfig {
        content: "Total 5\x1B@\x1DV\x00rest".into(),
        ..Default::default()
    };
    let cut = [0x1D, 0x56, 0x00];

    for encoding in [TextEncoding::Cp437, TextEncoding::Utf8] {
        let bytes = document::encode_with(&config, encoding);
        assert!(find(&bytes, b"Total 5?@?V?rest").is_some(), "{:?}", encoding);
        let cuts = bytes.windows(cut.len()).filter(|w| *w == cut).count();
        assert_eq!(cuts, 1, "{:?}", encoding);
        assert!(bytes.ends_with(&cut));
        // ESC @ appears only as the leading init.
        assert_eq!(find(&bytes[2..], &[0x1B, 0x40]), None, "{:?}", encoding);
    }
}

#[test]
fn test_tabs_print_as_spaces() {
    let config = PrinterConfig {
        content: "Coffee\t3.50".into(),
        ..Default::default()
    };
    let bytes = document::encode(&config);
    assert!(find(&bytes, b"Coffee 3.50").is_some());
    assert_eq!(find(&bytes, &[0x09]), None);
}

#[test]
fn test_compiled_program_shape() {
    let config = PrinterConfig {
        content: "a\nb".into(),
        ..Default::default()
    };
    let program = document::compile(&config);

    assert_eq!(program.ops.first(), Some(&Op::Init));
    assert_eq!(program.ops.last(), Some(&Op::Cut));
    assert_eq!(program.to_bytes(), document::encode(&config));
}

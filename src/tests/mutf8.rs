use crate::mod_utf8::{modified_utf8_to_string, string_to_modified_utf8};

#[test]
fn test_to_modified_utf8_supplementary() {
    // 00000001_11110110_00000000
    let emoji = "\u{1F600}";
    // 11101101 10100000 10111101 11101101 10111000 10000000
    assert_eq!(
        string_to_modified_utf8(emoji),
        vec![0b11101101, 0b10100000, 0b10111101, 0b11101101, 0b10111000, 0b10000000]
    );
}

#[test]
fn test_from_modified_utf8_supplementary() {
    assert_eq!(
        modified_utf8_to_string(&[
            0b11101101, 0b10100000, 0b10111101, 0b11101101, 0b10111000, 0b10000000
        ]),
        "\u{1F600}"
    )
}

#[test]
fn test_to_modified_utf8_3bytes() {
    // 11111111_00110100
    let full_width_t = "Ｔ";
    // 11101111 10111100 10110100
    assert_eq!(
        string_to_modified_utf8(full_width_t),
        vec![0b11101111, 0b10111100, 0b10110100]
    )
}

#[test]
fn test_from_modified_utf8_3bytes() {
    assert_eq!(
        modified_utf8_to_string(&[0b11101111, 0b10111100, 0b10110100]),
        "Ｔ"
    )
}

#[test]
fn test_to_modified_utf8_2bytes() {
    let null = "\u{0000}";
    assert_eq!(string_to_modified_utf8(null), vec![0b11000000, 0b10000000]);
    // 00000011_10101001
    let omega = "Ω";
    assert_eq!(string_to_modified_utf8(omega), vec![0b11001110, 0b10101001]);
}

#[test]
fn test_from_modified_utf8_2bytes() {
    assert_eq!(
        modified_utf8_to_string(&[0b11000000, 0b10000000]),
        "\u{0000}"
    );
    assert_eq!(modified_utf8_to_string(&[0b11001110, 0b10101001]), "Ω");
}

#[test]
fn test_to_modified_utf8_normal() {
    let alphabet = "abcde";
    assert_eq!(
        string_to_modified_utf8(alphabet),
        ['a', 'b', 'c', 'd', 'e']
            .iter()
            .map(|&c| c as u8)
            .collect::<Vec<u8>>()
    )
}

#[test]
fn test_round_trip() {
    for s in ["", "abcde", "a\u{0000}b", "Ω≠\u{1F600}", "läuft\u{FF34}"] {
        assert_eq!(modified_utf8_to_string(&string_to_modified_utf8(s)), s);
    }
}

#[test]
fn test_lenient_decoding_never_fails() {
    // A raw NUL never appears in valid MUTF-8.
    assert_eq!(modified_utf8_to_string(&[0x00]), "\u{FFFD}");
    // Stray continuation byte.
    assert_eq!(modified_utf8_to_string(&[0x80]), "\u{FFFD}");
    // 4-byte UTF-8 lead is not MUTF-8.
    assert_eq!(
        modified_utf8_to_string(&[0xF0, 0x9F, 0x98, 0x80]),
        "\u{FFFD}\u{FFFD}\u{FFFD}\u{FFFD}"
    );
    // Two-byte sequence cut off at the end of the buffer.
    assert_eq!(modified_utf8_to_string(&[b'a', 0xC3]), "a\u{FFFD}");
    // A high surrogate with no matching low surrogate is not a char.
    assert_eq!(modified_utf8_to_string(&[0xED, 0xA0, 0x80]), "\u{FFFD}");
}

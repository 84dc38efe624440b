//! Module for converting between Java's Modified UTF-8 and UTF-8.
//!
//! Rust uses UTF-8 natively, so a conversion is needed for every string in
//! a class file. A UTF-8 code point might be 1, 2, 3 or 4 bytes; in MUTF-8
//! it might be 1, 2, 3 or 6, the NUL character is encoded as the two-byte
//! sequence `C0 80`, and supplementary code points are encoded as a pair of
//! 3-byte surrogates.
//!
//! Decoding is lenient: any byte sequence that is not valid MUTF-8 decodes
//! to `U+FFFD` rather than failing, so arbitrary pool bytes always produce
//! a string.
//!
//! Refer to the [JVM Spec](https://docs.oracle.com/javase/specs/jvms/se16/html/jvms-4.html#jvms-4.4.7) for more info.

/// Converts a modified UTF-8 sequence to an owned Rust string.
pub fn modified_utf8_to_string(buf: &[u8]) -> String {
    let len = buf.len();
    let mut str = String::with_capacity(len);

    let mut count: usize = 0;
    while count < len {
        let c = buf[count];
        match c {
            0x01..=0x7F => {
                count += 1;
                str.push(c as char);
            }
            // 110xxxxx 10xxxxxx; C0 80 decodes to NUL here.
            0xC0..=0xDF => {
                if count + 1 < len && buf[count + 1] & 0xC0 == 0x80 {
                    let p = ((c as u32 & 0x1F) << 6) | (buf[count + 1] as u32 & 0x3F);
                    str.push(char::from_u32(p).unwrap_or(char::REPLACEMENT_CHARACTER));
                    count += 2;
                } else {
                    str.push(char::REPLACEMENT_CHARACTER);
                    count += 1;
                }
            }
            0xE0..=0xEF => {
                // A high surrogate opens a six-byte supplementary sequence:
                // 11101101 1010xxxx 10xxxxxx 11101101 1011xxxx 10xxxxxx
                if c == 0xED
                    && count + 5 < len
                    && buf[count + 1] & 0xF0 == 0xA0
                    && buf[count + 2] & 0xC0 == 0x80
                    && buf[count + 3] == 0xED
                    && buf[count + 4] & 0xF0 == 0xB0
                    && buf[count + 5] & 0xC0 == 0x80
                {
                    let p = 0x10000
                        + (((buf[count + 1] as u32 & 0x0F) << 16)
                            | ((buf[count + 2] as u32 & 0x3F) << 10)
                            | ((buf[count + 4] as u32 & 0x0F) << 6)
                            | (buf[count + 5] as u32 & 0x3F));
                    str.push(char::from_u32(p).unwrap_or(char::REPLACEMENT_CHARACTER));
                    count += 6;
                    continue;
                }
                // 1110xxxx 10xxxxxx 10xxxxxx
                if count + 2 < len
                    && buf[count + 1] & 0xC0 == 0x80
                    && buf[count + 2] & 0xC0 == 0x80
                {
                    let p = ((c as u32 & 0x0F) << 12)
                        | ((buf[count + 1] as u32 & 0x3F) << 6)
                        | (buf[count + 2] as u32 & 0x3F);
                    // A lone surrogate lands here and is not a char.
                    str.push(char::from_u32(p).unwrap_or(char::REPLACEMENT_CHARACTER));
                    count += 3;
                } else {
                    str.push(char::REPLACEMENT_CHARACTER);
                    count += 1;
                }
            }
            // Raw NUL, continuation bytes and 4-byte UTF-8 leads never
            // appear in valid MUTF-8.
            _ => {
                str.push(char::REPLACEMENT_CHARACTER);
                count += 1;
            }
        }
    }
    str.shrink_to_fit();
    str
}

/// Converts a string to modified UTF-8.
///
/// This cannot fail because `&str` is guaranteed to be valid UTF-8, and
/// every Unicode scalar value has a modified UTF-8 encoding.
pub fn string_to_modified_utf8(str: &str) -> Vec<u8> {
    let mut utflen: usize = 0;
    for c in str.chars() {
        utflen += match c as u32 {
            0x1..=0x7F => 1,
            0x0 | 0x80..=0x7FF => 2,
            0x800..=0xFFFF => 3,
            _ => 6,
        }
    }
    let mut vec = Vec::with_capacity(utflen);
    for c in str.chars() {
        let c = c as u32;
        match c {
            0x1..=0x7F => {
                vec.push(c as u8);
            }
            0x0 | 0x80..=0x7FF => {
                // 110xxxxx 10xxxxxx
                vec.push(((c >> 6) as u8 & 0x1F) | 0xC0);
                vec.push((c as u8 & 0x3F) | 0x80);
            }
            0x800..=0xFFFF => {
                // 1110xxxx 10xxxxxx 10xxxxxx
                vec.push(((c >> 12) as u8 & 0x0F) | 0xE0);
                vec.push(((c >> 6) as u8 & 0x3F) | 0x80);
                vec.push((c as u8 & 0x3F) | 0x80);
            }
            _ => {
                // 11101101 1010(xxxxx - 1) 10xxxxxx 11101101 1011xxxx 10xxxxxx
                vec.push(0xED);
                vec.push((((c >> 16) as u8 & 0x1F) - 1) | 0xA0);
                vec.push(((c >> 10) as u8 & 0x3F) | 0x80);
                vec.push(0xED);
                vec.push(((c >> 6) as u8 & 0x0F) | 0xB0);
                vec.push((c as u8 & 0x3F) | 0x80);
            }
        }
    }
    vec
}

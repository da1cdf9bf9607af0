//! Byte classification tables, evaluated at compile time.

/// `tchar` from RFC 7230 §3.2.6, indexed by byte.
///
/// ```text
/// tchar = "!" / "#" / "$" / "%" / "&" / "'" / "*" / "+" / "-" / "." /
///         "^" / "_" / "`" / "|" / "~" / DIGIT / ALPHA
/// ```
pub(crate) static TOKEN: [bool; 256] = build_token_table();

/// Hex digit value by byte, `-1` for anything that is not a hex digit.
pub(crate) static UNHEX: [i8; 256] = build_unhex_table();

const fn build_token_table() -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = matches!(
            i as u8,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
                | b'0'..=b'9'
                | b'a'..=b'z'
                | b'A'..=b'Z'
        );
        i += 1;
    }
    table
}

const fn build_unhex_table() -> [i8; 256] {
    let mut table = [-1i8; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        table[i] = match b {
            b'0'..=b'9' => (b - b'0') as i8,
            b'a'..=b'f' => (b - b'a' + 10) as i8,
            b'A'..=b'F' => (b - b'A' + 10) as i8,
            _ => -1,
        };
        i += 1;
    }
    table
}

#[inline]
pub(crate) fn is_token(b: u8) -> bool {
    TOKEN[b as usize]
}

/// Decoded value of a hex digit.
#[inline]
pub(crate) fn unhex(b: u8) -> Option<u8> {
    match UNHEX[b as usize] {
        -1 => None,
        v => Some(v as u8),
    }
}

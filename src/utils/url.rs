use anyhow::{bail, Context, Result};

/// Decode a percent-encoded query value into a string.
///
/// `+` becomes a space. Fails on truncated or non-hex escapes and on byte
/// sequences that are not UTF-8.
pub fn url_decode(encoded: &str) -> Result<String> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let digits = bytes
                    .get(i + 1..i + 3)
                    .context("Incomplete percent-encoding")?;
                if !digits.iter().all(u8::is_ascii_hexdigit) {
                    bail!("Invalid hex digits in percent-encoding");
                }
                let digits = std::str::from_utf8(digits)
                    .context("Invalid hex digits in percent-encoding")?;
                let byte = u8::from_str_radix(digits, 16)
                    .context("Invalid hex digits in percent-encoding")?;
                decoded.push(byte);
                i += 3;
            }
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            other => {
                decoded.push(other);
                i += 1;
            }
        }
    }

    String::from_utf8(decoded).context("Decoded value is not valid UTF-8")
}

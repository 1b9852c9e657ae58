//! UTF-8 sanitizer for text boundaries

/// Replacement emitted for each invalid UTF-8 sequence.
const REPLACEMENT: char = '❗';

/// Decode bytes into a string, replacing each invalid sequence with a single
/// `❗` and stripping NULs. Used at any boundary that must emit text (logs,
/// JSON). Idempotent: sanitizing already-sanitized text is a no-op.
pub fn sanitize_utf8(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                break;
            }
            Err(err) => {
                let valid_up_to = err.valid_up_to();
                if let Ok(valid) = std::str::from_utf8(&rest[..valid_up_to]) {
                    out.push_str(valid);
                }
                out.push(REPLACEMENT);
                let skip = err.error_len().unwrap_or(rest.len() - valid_up_to);
                rest = &rest[valid_up_to + skip..];
            }
        }
    }

    if out.contains('\0') {
        out = out.replace('\0', "");
    }
    out
}

/// Sanitize a string that may contain NULs.
pub fn sanitize_str(input: &str) -> String {
    sanitize_utf8(input.as_bytes())
}

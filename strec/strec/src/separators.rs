//! Separator descriptors and per-format defaults.
//!
//! On the command line a separator may be given as a named descriptor
//! (`--ifs tab`), or literally with standard backslash escapes (`--ifs '\t'`).

use crate::options::Format;

/// Named descriptors recognized anywhere a separator is accepted.
const DESCRIPTORS: &[(&str, &str)] = &[
    ("cr", "\r"),
    ("crcr", "\r\r"),
    ("newline", "\n"),
    ("lf", "\n"),
    ("lflf", "\n\n"),
    ("crlf", "\r\n"),
    ("crlfcrlf", "\r\n\r\n"),
    ("tab", "\t"),
    ("space", " "),
    ("comma", ","),
    ("pipe", "|"),
    ("slash", "/"),
    ("colon", ":"),
    ("semicolon", ";"),
    ("equals", "="),
];

/// Resolve a command-line separator argument: descriptor name, else the
/// argument itself after backslash decoding.
pub fn resolve(arg: &str) -> String {
    for (name, chars) in DESCRIPTORS {
        if *name == arg {
            return (*chars).to_string();
        }
    }
    unbackslash(arg)
}

/// Decode `\t`, `\n`, `\r`, `\\` and octal/hex escapes the way the shell
/// would not have.
pub fn unbackslash(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('x') => {
                let hi = chars.next();
                let lo = chars.next();
                match (hi, lo) {
                    (Some(h), Some(l)) if h.is_ascii_hexdigit() && l.is_ascii_hexdigit() => {
                        let byte =
                            (h.to_digit(16).unwrap() * 16 + l.to_digit(16).unwrap()) as u8;
                        out.push(byte as char);
                    }
                    _ => {
                        out.push_str("\\x");
                        if let Some(h) = hi {
                            out.push(h);
                        }
                        if let Some(l) = lo {
                            out.push(l);
                        }
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Environment variable overriding the CSV family's default record separator.
pub const CSV_DEFAULT_RS_ENV: &str = "STREC_CSV_DEFAULT_RS";

pub fn default_rs(format: Format) -> &'static str {
    match format {
        Format::Csv => "\r\n",
        _ => "\n",
    }
}

/// The CSV default honors [CSV_DEFAULT_RS_ENV]; resolved once at CLI setup.
pub fn default_rs_with_env(format: Format) -> String {
    if format == Format::Csv {
        if let Ok(v) = std::env::var(CSV_DEFAULT_RS_ENV) {
            if !v.is_empty() {
                return resolve(&v);
            }
        }
    }
    default_rs(format).to_string()
}

pub fn default_fs(format: Format) -> &'static str {
    match format {
        Format::Nidx | Format::Pprint => " ",
        Format::Xtab => "\n",
        _ => ",",
    }
}

pub fn default_ps(format: Format) -> &'static str {
    match format {
        Format::Xtab => " ",
        _ => "=",
    }
}

/// PPRINT collapses runs of the field separator on input by default.
pub fn default_repeat_ifs(format: Format) -> bool {
    format == Format::Pprint
}

/// XTAB aligns with repeated pair separators on input.
pub fn default_repeat_ips(format: Format) -> bool {
    format == Format::Xtab
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptors() {
        assert_eq!(resolve("tab"), "\t");
        assert_eq!(resolve("crlf"), "\r\n");
        assert_eq!(resolve("semicolon"), ";");
        assert_eq!(resolve("crlfcrlf"), "\r\n\r\n");
    }

    #[test]
    fn test_unbackslash() {
        assert_eq!(resolve(r"\t"), "\t");
        assert_eq!(resolve(r"a\nb"), "a\nb");
        assert_eq!(resolve(r"\x41"), "A");
        assert_eq!(resolve("::"), "::");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_rs(Format::Csv), "\r\n");
        assert_eq!(default_rs(Format::Dkvp), "\n");
        assert_eq!(default_fs(Format::Nidx), " ");
        assert_eq!(default_ps(Format::Xtab), " ");
        assert!(default_repeat_ifs(Format::Pprint));
        assert!(!default_repeat_ifs(Format::Csv));
    }
}

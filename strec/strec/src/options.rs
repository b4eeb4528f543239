//! Format selection and the reader/writer option bundles.
//!
//! The option structs are built once at CLI setup (or by tests) and passed
//! explicitly to readers, writers, verbs and DSL execution; there are no
//! process-global settings.

use strum_macros::{Display, EnumString};

use crate::separators;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    Dkvp,
    Nidx,
    Csv,
    #[strum(serialize = "csvlite")]
    CsvLite,
    Json,
    Pprint,
    Xtab,
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum QuoteMode {
    All,
    None,
    #[default]
    Minimal,
    Numeric,
    Original,
}

pub const DEFAULT_OFMT: &str = "%lf";
pub const DEFAULT_JSON_FLATTEN_SEPARATOR: &str = ":";
pub const DEFAULT_OOSVAR_FLATTEN_SEPARATOR: &str = ":";

#[derive(Debug, Clone)]
pub struct ReaderOpts {
    pub format: Format,
    pub irs: String,
    pub ifs: String,
    pub ips: String,
    pub allow_repeat_ifs: bool,
    pub allow_repeat_ips: bool,
    pub implicit_csv_header: bool,
    pub json_flatten_separator: String,
    /// Skip nested arrays in JSON input instead of failing.
    pub json_skip_arrays: bool,
}

#[derive(Debug, Clone)]
pub struct WriterOpts {
    pub format: Format,
    pub ors: String,
    pub ofs: String,
    pub ops: String,
    pub headerless_csv_output: bool,
    pub quote_mode: QuoteMode,
    pub ofmt: String,
    pub json_flatten_separator: String,
    pub oosvar_flatten_separator: String,
    pub json_list_wrap: bool,
    pub json_vertical_stack: bool,
    pub right_align: bool,
}

impl ReaderOpts {
    pub fn for_format(format: Format) -> ReaderOpts {
        ReaderOpts {
            format,
            irs: separators::default_rs_with_env(format).to_string(),
            ifs: separators::default_fs(format).to_string(),
            ips: separators::default_ps(format).to_string(),
            allow_repeat_ifs: separators::default_repeat_ifs(format),
            allow_repeat_ips: separators::default_repeat_ips(format),
            implicit_csv_header: false,
            json_flatten_separator: DEFAULT_JSON_FLATTEN_SEPARATOR.to_string(),
            json_skip_arrays: false,
        }
    }
}

impl Default for ReaderOpts {
    fn default() -> Self {
        ReaderOpts::for_format(Format::Dkvp)
    }
}

impl WriterOpts {
    pub fn for_format(format: Format) -> WriterOpts {
        WriterOpts {
            format,
            ors: separators::default_rs(format).to_string(),
            ofs: separators::default_fs(format).to_string(),
            ops: separators::default_ps(format).to_string(),
            headerless_csv_output: false,
            quote_mode: QuoteMode::default(),
            ofmt: DEFAULT_OFMT.to_string(),
            json_flatten_separator: DEFAULT_JSON_FLATTEN_SEPARATOR.to_string(),
            oosvar_flatten_separator: DEFAULT_OOSVAR_FLATTEN_SEPARATOR.to_string(),
            json_list_wrap: false,
            json_vertical_stack: false,
            right_align: false,
        }
    }
}

impl Default for WriterOpts {
    fn default() -> Self {
        WriterOpts::for_format(Format::Dkvp)
    }
}

/// Everything the pipeline needs besides the verbs themselves.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub reader: ReaderOpts,
    pub writer: WriterOpts,
    pub files: Vec<String>,
    /// `-n`: run the pipeline with no record input (begin/end blocks only).
    pub no_input: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_names() {
        assert_eq!(Format::from_str("csvlite").unwrap(), Format::CsvLite);
        assert_eq!(Format::from_str("dkvp").unwrap(), Format::Dkvp);
        assert_eq!(Format::Pprint.to_string(), "pprint");
        assert!(Format::from_str("yaml").is_err());
    }

    #[test]
    fn test_reader_defaults_follow_format() {
        let csv = ReaderOpts::for_format(Format::Csv);
        assert_eq!(csv.ifs, ",");
        let pprint = ReaderOpts::for_format(Format::Pprint);
        assert_eq!(pprint.ifs, " ");
        assert!(pprint.allow_repeat_ifs);
    }
}

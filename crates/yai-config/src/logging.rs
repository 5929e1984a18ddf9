//! Output formats for the dispatch server's stderr log stream.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How each `tracing` event is rendered on stderr.
///
/// Accepted spellings are `json` and `compact`, in any case, from the config
/// file, `YAI_LOG_FORMAT` or `--log-format`.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event with fields flattened to the top level.
    /// Connection, handler and listener events keep their `yai-core::*`
    /// target so collectors can split them.
    #[default]
    Json,
    /// One terse line per event, for running the server by hand.
    Compact,
}

/// Raised when a `--log-format` value names neither format.
pub type LogFormatParseError = strum::ParseError;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("COMPACT", LogFormat::Compact)]
    fn parses_case_insensitively(#[case] input: &str, #[case] expected: LogFormat) {
        assert_eq!(input.parse::<LogFormat>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_formats() {
        assert!("pretty".parse::<LogFormat>().is_err());
    }

    #[rstest]
    #[case(LogFormat::Json, "json")]
    #[case(LogFormat::Compact, "compact")]
    fn displays_the_accepted_spelling(#[case] format: LogFormat, #[case] expected: &str) {
        assert_eq!(format.to_string(), expected);
    }
}

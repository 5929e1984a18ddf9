//! Validation of imported consultant names.

/// A line of the import body that is not an acceptable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidName(pub String);

impl InvalidName {
    /// Message reported to the client.
    pub fn client_message(&self) -> String {
        format!("Invalid consultant name: {}", self.0)
    }
}

const ACCENTED: &str = "áéíóúñ";

fn is_name_char(character: char) -> bool {
    character.is_ascii_alphabetic() || character == ' ' || ACCENTED.contains(character)
}

/// Splits a newline-separated body into trimmed names, skipping blank lines.
///
/// # Errors
///
/// Returns every offending line when any name contains characters outside
/// ASCII letters, `áéíóúñ` and spaces.
pub fn parse_names(body: &str) -> Result<Vec<String>, Vec<InvalidName>> {
    let (valid, invalid): (Vec<&str>, Vec<&str>) = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .partition(|line| line.chars().all(is_name_char));

    if invalid.is_empty() {
        Ok(valid.into_iter().map(str::to_owned).collect())
    } else {
        Err(invalid
            .into_iter()
            .map(|line| InvalidName(line.to_owned()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::plain("Bruce Wayne\nClark Kent\n", &["Bruce Wayne", "Clark Kent"])]
    #[case::crlf("Diana Prince\r\nBarry Allen", &["Diana Prince", "Barry Allen"])]
    #[case::blank_lines("\n  \nArthur Curry\n\n", &["Arthur Curry"])]
    #[case::accents("José Núñez\nMaría Ríos", &["José Núñez", "María Ríos"])]
    #[case::empty("", &[])]
    fn accepts_valid_bodies(#[case] body: &str, #[case] expected: &[&str]) {
        assert_eq!(parse_names(body).expect("valid body"), expected);
    }

    #[rstest]
    fn reports_every_invalid_line() {
        let errors = parse_names("Bruce Wayne\nR2-D2\nAgent 47\n").expect_err("invalid body");
        assert_eq!(
            errors,
            vec![InvalidName("R2-D2".to_owned()), InvalidName("Agent 47".to_owned())]
        );
        assert_eq!(
            errors.first().map(InvalidName::client_message).as_deref(),
            Some("Invalid consultant name: R2-D2")
        );
    }

    #[rstest]
    #[case::tab("Bruce\tWayne")]
    #[case::uppercase_accent("ÁLVARO")]
    #[case::punctuation("O'Neil")]
    fn rejects_characters_outside_the_alphabet(#[case] name: &str) {
        assert!(parse_names(name).is_err());
    }
}

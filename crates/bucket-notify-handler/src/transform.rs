//! Content transformation applied to every new object

/// Transform the input object. Uppercases the whole text.
pub fn transform(contents: &str) -> String {
    contents.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases() {
        assert_eq!(transform("hello, World 1"), "HELLO, WORLD 1");
    }

    #[test]
    fn unicode_uppercase() {
        assert_eq!(transform("straße"), "STRASSE");
    }
}

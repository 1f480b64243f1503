/// Minimum strength for account passwords.
///
/// A password is allowed when it is longer than six characters and mixes
/// lowercase, uppercase, digits and at least one symbol. `_` is a word
/// character, not a symbol.
pub fn is_password_allowed(password: &str) -> bool {
    password.chars().count() > 6
        && password
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '_'))
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
}

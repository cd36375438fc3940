//! Keystroke filtering. This only shapes what the user can type; the gateway
//! still validates everything it receives.

use crate::application::Field;

/// Character class a field accepts while typing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    LettersAndSpaces,
    Digits,
    UppercaseLetters,
    Any,
}

impl CharClass {
    #[must_use]
    pub const fn for_field(field: Field) -> Self {
        match field {
            Field::NameFirst | Field::NameLast | Field::AddressCity => Self::LettersAndSpaces,
            Field::PhoneNumber | Field::DocumentSsn | Field::AddressPostalCode => Self::Digits,
            Field::AddressState => Self::UppercaseLetters,
            _ => Self::Any,
        }
    }

    fn admit(self, c: char) -> Option<char> {
        match self {
            Self::LettersAndSpaces => (c.is_ascii_alphabetic() || c == ' ').then_some(c),
            Self::Digits => c.is_ascii_digit().then_some(c),
            Self::UppercaseLetters => c
                .is_ascii_alphabetic()
                .then(|| c.to_ascii_uppercase()),
            Self::Any => Some(c),
        }
    }
}

/// Longest value a field accepts while typing.
#[must_use]
pub const fn max_len(field: Field) -> Option<usize> {
    match field {
        Field::PhoneNumber => Some(10),
        Field::DocumentSsn => Some(9),
        Field::AddressPostalCode => Some(5),
        Field::AddressState => Some(2),
        Field::BirthDate => Some(10),
        _ => None,
    }
}

/// Drop characters outside the field's class and cap its length.
///
/// Pasting `555-123-4567` into the phone field leaves `5551234567`; typing
/// `ny` into the state field leaves `NY`.
#[must_use]
pub fn filter_input(field: Field, raw: &str) -> String {
    let class = CharClass::for_field(field);
    let admitted = raw.chars().filter_map(|c| class.admit(c));
    match max_len(field) {
        Some(limit) => admitted.take(limit).collect(),
        None => admitted.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_keep_letters_and_spaces() {
        assert_eq!(filter_input(Field::NameFirst, "Mary-Ann 2"), "MaryAnn ");
        assert_eq!(filter_input(Field::AddressCity, "St. Louis"), "St Louis");
    }

    #[test]
    fn digit_fields_strip_separators_and_cap_length() {
        assert_eq!(filter_input(Field::PhoneNumber, "555-123-4567"), "5551234567");
        assert_eq!(filter_input(Field::PhoneNumber, "+1 555 123 4567"), "1555123456");
        assert_eq!(filter_input(Field::DocumentSsn, "123-45-6789"), "123456789");
        assert_eq!(filter_input(Field::AddressPostalCode, "10001-1234"), "10001");
    }

    #[test]
    fn state_is_uppercased() {
        assert_eq!(filter_input(Field::AddressState, "ny"), "NY");
        assert_eq!(filter_input(Field::AddressState, "n.y. state"), "NY");
    }

    #[test]
    fn free_text_fields_are_untouched() {
        assert_eq!(
            filter_input(Field::AddressLine1, "12 Main St, #4"),
            "12 Main St, #4"
        );
        assert_eq!(filter_input(Field::EmailAddress, "a+b@c.io"), "a+b@c.io");
    }
}

//! NI-FAKE enumerations.

lib_ivi_types::driver_enum! {
    /// Turtle reported by `GetEnumValue`.
    pub enum Turtle {
        Leonardo = 0,
        Donatello = 1,
        Raphael = 2,
        Michelangelo = 3,
    }
}

lib_ivi_types::driver_enum! {
    /// Value of the `read_write_color` attribute.
    pub enum Color {
        Red = 1,
        Blue = 2,
        Yellow = 5,
        Black = 42,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_ivi_types::{DriverEnum, EnumValue};

    #[test]
    fn test_turtle_catalog() {
        assert_eq!(Turtle::from_raw(0), Some(Turtle::Leonardo));
        assert_eq!(Turtle::from_raw(3), Some(Turtle::Michelangelo));
        assert_eq!(Turtle::from_raw(4), None);
        assert_eq!(Turtle::Raphael.to_raw(), 2);
    }

    #[test]
    fn test_color_gaps_are_unknown() {
        assert_eq!(EnumValue::<Color>::from_raw(42), EnumValue::Known(Color::Black));
        assert_eq!(EnumValue::<Color>::from_raw(3), EnumValue::Unknown(3));
        assert_eq!(EnumValue::from(Color::Yellow).to_string(), "Color::Yellow");
    }
}

//! Driver enumerations.
//!
//! Enumerations are static catalogs mapping named constants 1:1 to the
//! integers the driver exchanges. Values read back from a driver are wrapped
//! in [`EnumValue`] so that reserved or future integers survive instead of
//! failing the read.

use std::fmt;

/// A driver enumeration backed by an integer.
pub trait DriverEnum: Copy + Sized + 'static {
    /// Name of the enumeration, for diagnostics.
    const NAME: &'static str;

    /// Look up the member with the given raw value.
    fn from_raw(raw: i32) -> Option<Self>;

    /// Raw value passed to the driver.
    fn to_raw(self) -> i32;
}

/// An enumeration value as reported by a driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnumValue<E> {
    /// The raw value matches a catalog member.
    Known(E),
    /// The raw value is not in the catalog.
    Unknown(i32),
}

impl<E: DriverEnum> EnumValue<E> {
    /// Map a raw driver value, preserving unrecognized integers.
    pub fn from_raw(raw: i32) -> Self {
        match E::from_raw(raw) {
            Some(member) => Self::Known(member),
            None => Self::Unknown(raw),
        }
    }

    /// The raw value.
    pub fn raw(self) -> i32 {
        match self {
            Self::Known(member) => member.to_raw(),
            Self::Unknown(raw) => raw,
        }
    }

    /// The catalog member, if recognized.
    pub fn known(self) -> Option<E> {
        match self {
            Self::Known(member) => Some(member),
            Self::Unknown(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl<E: DriverEnum> From<E> for EnumValue<E> {
    fn from(member: E) -> Self {
        Self::Known(member)
    }
}

impl<E: DriverEnum + fmt::Debug> fmt::Display for EnumValue<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(member) => write!(f, "{}::{:?}", E::NAME, member),
            Self::Unknown(raw) => write!(f, "{}({raw})", E::NAME),
        }
    }
}

/// Declare a driver enumeration and its [`DriverEnum`] implementation.
///
/// ```
/// lib_ivi_types::driver_enum! {
///     /// Turtle selection.
///     pub enum Turtle {
///         Leonardo = 0,
///         Donatello = 1,
///     }
/// }
///
/// use lib_ivi_types::DriverEnum;
/// assert_eq!(Turtle::from_raw(1), Some(Turtle::Donatello));
/// ```
#[macro_export]
macro_rules! driver_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(i32)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $crate::DriverEnum for $name {
            const NAME: &'static str = stringify!($name);

            fn from_raw(raw: i32) -> Option<Self> {
                $( if raw == $value { return Some(Self::$variant); } )+
                None
            }

            fn to_raw(self) -> i32 {
                self as i32
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::driver_enum! {
        enum Shade {
            Light = 1,
            Dark = 42,
        }
    }

    #[test]
    fn test_known_value_maps_to_member() {
        assert_eq!(EnumValue::<Shade>::from_raw(42), EnumValue::Known(Shade::Dark));
        assert_eq!(Shade::Light.to_raw(), 1);
    }

    #[test]
    fn test_unknown_value_is_preserved() {
        let value = EnumValue::<Shade>::from_raw(7);
        assert_eq!(value, EnumValue::Unknown(7));
        assert_eq!(value.raw(), 7);
        assert!(!value.is_known());
        assert_eq!(value.to_string(), "Shade(7)");
    }
}

//! Declarative descriptions of subunit functions.
//!
//! A [`Function`] ties a wire name to a value converter and an access mode.
//! A [`FunctionFamily`] does the same for indexed functions whose number of
//! members is only known once the device answers, like `SCENE<n>NAME`.
//! Both are plain data meant to live in `static` tables, so adding a
//! property to a subunit is a new table entry.

use crate::error::{Result, YncaError};
use std::any::Any;
use std::sync::Arc;

/// A decoded value as kept in a subunit cache
pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// Whether a function can be read, written or both
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

impl Access {
    pub fn readable(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    pub fn writable(self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}

/// How a function gets its value during initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Init {
    /// GET the function itself
    Own,
    /// Covered by a GET on a group function (e.g. `BASIC`) that reports several
    Group(&'static str),
    /// Not queried
    Skip,
}

/// Conversion between wire strings and typed values
///
/// `decode` returns `None` for a wire value the converter does not accept;
/// the cache is left untouched in that case. `encode` returns the reason a
/// value was rejected.
pub struct Converter<T: 'static> {
    pub decode: fn(&str) -> Option<T>,
    pub encode: fn(&T) -> std::result::Result<String, String>,
}

impl<T> Converter<T> {
    pub const fn new(
        decode: fn(&str) -> Option<T>,
        encode: fn(&T) -> std::result::Result<String, String>,
    ) -> Self {
        Self { decode, encode }
    }
}

/// One named function of a subunit
pub struct Function<T: 'static> {
    pub name: &'static str,
    pub access: Access,
    pub init: Init,
    pub converter: Converter<T>,
}

impl<T> Function<T> {
    pub const fn new(name: &'static str, access: Access, init: Init, converter: Converter<T>) -> Self {
        Self {
            name,
            access,
            init,
            converter,
        }
    }

    pub fn decode(&self, raw: &str) -> Option<T> {
        (self.converter.decode)(raw)
    }

    /// Wire value for `value`, validated before anything is sent
    pub fn encode(&self, value: &T) -> Result<String> {
        if !self.access.writable() {
            return Err(YncaError::NotWritable(self.name));
        }
        (self.converter.encode)(value).map_err(|reason| YncaError::invalid_value(self.name, reason))
    }
}

/// A set of functions named `<prefix><key><suffix>`
pub struct FunctionFamily<T: 'static> {
    pub prefix: &'static str,
    pub suffix: &'static str,
    pub init: Init,
    /// Which keys belong to the family
    pub key_filter: fn(&str) -> bool,
    pub converter: Converter<T>,
}

impl<T> FunctionFamily<T> {
    pub const fn new(
        prefix: &'static str,
        suffix: &'static str,
        init: Init,
        key_filter: fn(&str) -> bool,
        converter: Converter<T>,
    ) -> Self {
        Self {
            prefix,
            suffix,
            init,
            key_filter,
            converter,
        }
    }

    /// The key of a member function, `None` if `function` is not a member
    pub fn key<'a>(&self, function: &'a str) -> Option<&'a str> {
        let key = function
            .strip_prefix(self.prefix)?
            .strip_suffix(self.suffix)?;
        (!key.is_empty() && (self.key_filter)(key)).then_some(key)
    }

    pub fn wire_name(&self, key: &str) -> String {
        format!("{}{}{}", self.prefix, key, self.suffix)
    }

    pub fn decode(&self, raw: &str) -> Option<T> {
        (self.converter.decode)(raw)
    }
}

/// Any key made of digits only
pub fn numeric_key(key: &str) -> bool {
    key.bytes().all(|b| b.is_ascii_digit())
}

/// Any non-empty key
pub fn any_key(_key: &str) -> bool {
    true
}

/// Type-erased view a subunit uses to route incoming reports
pub trait Descriptor: Send + Sync {
    /// Wire name, or the prefix for a family
    fn name(&self) -> &'static str;

    /// Whether this descriptor handles `function`
    fn accepts(&self, function: &str) -> bool;

    fn init(&self) -> Init;

    fn decode_cached(&self, raw: &str) -> Option<CachedValue>;

    /// Function to GET during initialization, if any
    fn init_query(&self) -> Option<&'static str> {
        match self.init() {
            Init::Own => Some(self.name()),
            Init::Group(group) => Some(group),
            Init::Skip => None,
        }
    }
}

impl<T: Send + Sync + 'static> Descriptor for Function<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn accepts(&self, function: &str) -> bool {
        self.access.readable() && function == self.name
    }

    fn init(&self) -> Init {
        self.init
    }

    fn decode_cached(&self, raw: &str) -> Option<CachedValue> {
        self.decode(raw).map(|value| Arc::new(value) as CachedValue)
    }
}

impl<T: Send + Sync + 'static> Descriptor for FunctionFamily<T> {
    fn name(&self) -> &'static str {
        self.prefix
    }

    fn accepts(&self, function: &str) -> bool {
        self.key(function).is_some()
    }

    fn init(&self) -> Init {
        self.init
    }

    fn decode_cached(&self, raw: &str) -> Option<CachedValue> {
        self.decode(raw).map(|value| Arc::new(value) as CachedValue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::{decode_int, decode_str, encode_int, encode_str};

    static LEVEL: Function<i32> = Function::new(
        "LEVEL",
        Access::ReadWrite,
        Init::Own,
        Converter::new(decode_int, encode_int),
    );

    static MODEL: Function<String> = Function::new(
        "MODEL",
        Access::Read,
        Init::Group("BASIC"),
        Converter::new(decode_str, encode_str),
    );

    static SCENE_NAME: FunctionFamily<String> = FunctionFamily::new(
        "SCENE",
        "NAME",
        Init::Group("SCENENAME"),
        numeric_key,
        Converter::new(decode_str, encode_str),
    );

    #[test]
    fn read_only_function_refuses_encode() {
        assert!(matches!(
            MODEL.encode(&"x".to_string()),
            Err(YncaError::NotWritable("MODEL"))
        ));
        assert_eq!(LEVEL.encode(&-3).unwrap(), "-3");
    }

    #[test]
    fn init_queries() {
        assert_eq!(LEVEL.init_query(), Some("LEVEL"));
        assert_eq!(MODEL.init_query(), Some("BASIC"));
        assert_eq!(SCENE_NAME.init_query(), Some("SCENENAME"));
    }

    #[test]
    fn family_keys() {
        assert_eq!(SCENE_NAME.key("SCENE12NAME"), Some("12"));
        assert_eq!(SCENE_NAME.key("SCENENAME"), None);
        assert_eq!(SCENE_NAME.key("SCENEXNAME"), None);
        assert_eq!(SCENE_NAME.key("SCENE1"), None);
        assert_eq!(SCENE_NAME.wire_name("3"), "SCENE3NAME");
        assert!(SCENE_NAME.accepts("SCENE3NAME"));
    }

    #[test]
    fn cached_value_downcasts_to_function_type() {
        let cached = LEVEL.decode_cached("42").unwrap();
        assert_eq!(cached.downcast_ref::<i32>(), Some(&42));
        assert!(LEVEL.decode_cached("loud").is_none());
    }
}

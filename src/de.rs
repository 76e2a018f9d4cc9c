use std::collections::hash_map;
use std::str::FromStr;

use serde::de::value::StrDeserializer;
use serde::de::{self, DeserializeOwned, DeserializeSeed, IntoDeserializer, MapAccess, Visitor};

use crate::error::{Error, Result};
use crate::section::{parse_bool, Section, Sections};

/// Deserialize a full configuration. Section names map to the fields
/// of `T` (or to the keys of a map), each section to a struct or map.
pub(crate) fn from_sections<T>(sections: &Sections) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(SectionsDeserializer { sections })
}

// Top level: a map of section name to section.
struct SectionsDeserializer<'a> {
    sections: &'a Sections,
}

impl<'de, 'a> de::Deserializer<'de> for SectionsDeserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        debug!("deserialize {} sections", self.sections.len());
        visitor.visit_map(SectionsAccess {
            iter: self.sections.iter(),
            value: None,
        })
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct SectionsAccess<'a> {
    iter: hash_map::Iter<'a, String, Section>,
    value: Option<(&'a str, &'a Section)>,
}

impl<'de, 'a> MapAccess<'de> for SectionsAccess<'a> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((name, section)) => {
                self.value = Some((name.as_str(), section));
                let name: StrDeserializer<Error> = name.as_str().into_deserializer();
                seed.deserialize(name).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some((name, section)) => seed.deserialize(SectionDeserializer::named(name, section)),
            None => Err(de::Error::custom("section requested before its name")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Deserializes one section: its keys map to struct fields or map keys.
pub(crate) struct SectionDeserializer<'a> {
    name: Option<&'a str>,
    section: &'a Section,
}

impl<'a> SectionDeserializer<'a> {
    pub fn new(section: &'a Section) -> Self {
        SectionDeserializer { name: None, section }
    }

    fn named(name: &'a str, section: &'a Section) -> Self {
        SectionDeserializer {
            name: Some(name),
            section,
        }
    }
}

impl<'de, 'a> de::Deserializer<'de> for SectionDeserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let access = SectionAccess {
            iter: self.section.raw_iter(),
            value: None,
        };
        let name = self.name;
        visitor.visit_map(access).map_err(|e| match name {
            Some(name) => e.in_section(name),
            None => e,
        })
    }

    // A section that is present is always Some. A missing section
    // never gets here; serde turns an absent Option field into None.
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct SectionAccess<'a> {
    iter: hash_map::Iter<'a, String, String>,
    value: Option<(&'a str, &'a str)>,
}

impl<'de, 'a> MapAccess<'de> for SectionAccess<'a> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some((key.as_str(), value.as_str()));
                let key: StrDeserializer<Error> = key.as_str().into_deserializer();
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some((key, value)) => seed.deserialize(ValueDeserializer { key, value }),
            None => Err(de::Error::custom("value requested before its key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

// A single raw value. Scalars are parsed from the string on demand.
struct ValueDeserializer<'a> {
    key: &'a str,
    value: &'a str,
}

impl<'a> ValueDeserializer<'a> {
    fn parse_value<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
    {
        self.value
            .parse()
            .map_err(|_| Error::invalid_value(self.key, name, self.value))
    }
}

impl<'de, 'a> de::Deserializer<'de> for ValueDeserializer<'a> {
    type Error = Error;

    // Without a type hint, a value is a string.
    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_str(self.value)
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match parse_bool(self.value) {
            Some(v) => visitor.visit_bool(v),
            None => Err(Error::invalid_value(self.key, "boolean", self.value)),
        }
    }

    // The `parse_value` function is generic over the type `T` so here
    // it is invoked with `T=i8`. The next 9 methods are similar.
    fn deserialize_i8<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_i8(self.parse_value("i8 integer")?)
    }

    fn deserialize_i16<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_i16(self.parse_value("i16 integer")?)
    }

    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_i32(self.parse_value("i32 integer")?)
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_i64(self.parse_value("i64 integer")?)
    }

    fn deserialize_u8<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_u8(self.parse_value("u8 integer")?)
    }

    fn deserialize_u16<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_u16(self.parse_value("u16 integer")?)
    }

    fn deserialize_u32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_u32(self.parse_value("u32 integer")?)
    }

    fn deserialize_u64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_u64(self.parse_value("u64 integer")?)
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_f32(self.parse_value("f32 float")?)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_f64(self.parse_value("f64 float")?)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_char(self.parse_value("single character")?)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_str(self.value)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_str(self.value)
    }

    // An empty value ("key =") is None.
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        if self.value.is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    // Only unit variants, matched by name.
    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let key = self.key;
        let variant: StrDeserializer<Error> = self.value.into_deserializer();
        visitor.visit_enum(variant).map_err(|e| e.for_key(key))
    }

    // Lists, tuples and nested maps are not part of the format; they
    // see a string and fail with an "invalid type" error.
    serde::forward_to_deserialize_any! {
        i128 u128 bytes byte_buf unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

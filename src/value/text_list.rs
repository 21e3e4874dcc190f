use core::fmt;
use std::io::{self, Write};

use faststr::FastStr;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

use super::text::format_input;
use crate::error::{Error, Result};
use crate::format::{CompactFormatter, Formatter};
use crate::input::Input;
use crate::raw::RawJson;
use crate::serde::Scalar;

/// A list of strings that is written as a bare string when it holds a single
/// element.
///
/// On the wire an empty list is `null`, one element is `"a"` and several are
/// `["a","b"]`. Decoding accepts all three forms, and `null` elements inside
/// an array become empty strings.
///
/// ```
/// use flexscalar::TextList;
///
/// let list = TextList::from_json(br#""solo""#).unwrap();
/// assert_eq!(list.get(0).unwrap(), "solo");
/// assert!(list.get(5).unwrap_err().is_index_out_of_bounds());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TextList {
    items: Vec<FastStr>,
}

impl TextList {
    pub(crate) const NAME: &'static str = "TextList";

    pub fn new(value: impl Into<Input>) -> TextList {
        let mut list = TextList::default();
        list.set(value);
        list
    }

    /// Replace the elements. A list input is taken as it is, `Input::Null`
    /// empties the list and any other input becomes a single element holding
    /// its textual form.
    pub fn set(&mut self, value: impl Into<Input>) {
        self.items = match value.into() {
            Input::List(items) => items,
            other => format_input(&other).into_iter().collect(),
        };
    }

    /// The element at `index`, or `IndexOutOfBounds`.
    pub fn get(&self, index: usize) -> Result<&str> {
        self.items
            .get(index)
            .map(|s| s.as_str())
            .ok_or_else(|| Error::index_out_of_bounds(index, self.items.len()))
    }

    pub fn push(&mut self, value: impl Into<FastStr>) {
        self.items.push(value.into());
    }

    /// The position of the first element equal to `value`.
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.items.iter().position(|s| s.as_str() == value)
    }

    /// Remove and return the element at `index`, shifting the rest down.
    pub fn remove(&mut self, index: usize) -> Result<FastStr> {
        if index >= self.items.len() {
            return Err(Error::index_out_of_bounds(index, self.items.len()));
        }
        Ok(self.items.remove(index))
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|s| s.as_str())
    }

    pub fn as_slice(&self) -> &[FastStr] {
        &self.items
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.to_writer(&mut buf)?;
        Ok(buf)
    }

    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        match self.items.as_slice() {
            [] => Scalar::Null.write(writer),
            [one] => Scalar::Str(one.clone()).write(writer),
            items => write_array(&mut writer, items).map_err(Error::io),
        }
    }

    /// Replace the elements with the ones decoded from raw JSON.
    pub fn read_json(&mut self, json: &[u8]) -> Result<()> {
        self.items.clear();
        let raw = RawJson::new(json).trimmed();
        if raw.is_array() && !raw.is_malformed() {
            let items: Vec<Option<FastStr>> = serde_json::from_slice(raw.as_bytes())
                .map_err(|_| Error::type_mismatch(TextList::NAME).with_context(json, TextList::NAME))?;
            self.items = items.into_iter().map(Option::unwrap_or_default).collect();
            return Ok(());
        }
        match Scalar::read(json, TextList::NAME)? {
            Scalar::Null => Ok(()),
            Scalar::Str(s) => {
                self.items.push(s);
                Ok(())
            }
            _ => Err(Error::type_mismatch(TextList::NAME).with_context(json, TextList::NAME)),
        }
    }

    pub fn from_json(json: &[u8]) -> Result<TextList> {
        let mut list = TextList::default();
        list.read_json(json)?;
        Ok(list)
    }
}

fn write_array<W>(writer: &mut W, items: &[FastStr]) -> io::Result<()>
where
    W: ?Sized + Write,
{
    let mut f = CompactFormatter;
    writer.write_all(b"[")?;
    for (i, s) in items.iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        f.write_string(writer, s)?;
    }
    writer.write_all(b"]")
}

impl From<Vec<FastStr>> for TextList {
    fn from(items: Vec<FastStr>) -> Self {
        TextList { items }
    }
}

impl From<Vec<String>> for TextList {
    fn from(items: Vec<String>) -> Self {
        items.into_iter().map(FastStr::from_string).collect()
    }
}

impl<S: Into<FastStr>> FromIterator<S> for TextList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        TextList {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for TextList {
    type Item = FastStr;
    type IntoIter = std::vec::IntoIter<FastStr>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl From<TextList> for Input {
    fn from(list: TextList) -> Self {
        Input::List(list.items)
    }
}

impl Serialize for TextList {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.items.as_slice() {
            [] => serializer.serialize_none(),
            [one] => serializer.serialize_str(one),
            items => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for s in items {
                    seq.serialize_element(s.as_str())?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for TextList {
    fn deserialize<D>(deserializer: D) -> core::result::Result<TextList, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TextListVisitor;

        impl<'de> Visitor<'de> for TextListVisitor {
            type Value = TextList;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, an array of strings or null")
            }

            fn visit_str<E>(self, v: &str) -> core::result::Result<TextList, E>
            where
                E: de::Error,
            {
                Ok(TextList {
                    items: vec![FastStr::new(v)],
                })
            }

            fn visit_string<E>(self, v: String) -> core::result::Result<TextList, E>
            where
                E: de::Error,
            {
                Ok(TextList {
                    items: vec![FastStr::from_string(v)],
                })
            }

            fn visit_unit<E>(self) -> core::result::Result<TextList, E>
            where
                E: de::Error,
            {
                Ok(TextList::default())
            }

            fn visit_none<E>(self) -> core::result::Result<TextList, E>
            where
                E: de::Error,
            {
                Ok(TextList::default())
            }

            fn visit_some<D>(self, deserializer: D) -> core::result::Result<TextList, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_any(self)
            }

            fn visit_seq<A>(self, mut seq: A) -> core::result::Result<TextList, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element::<Option<FastStr>>()? {
                    items.push(item.unwrap_or_default());
                }
                Ok(TextList { items })
            }
        }

        deserializer.deserialize_any(TextListVisitor)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_accessors() {
        let mut list = TextList::new("a");
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).unwrap(), "a");
        let err = list.get(5).unwrap_err();
        assert!(err.is_index_out_of_bounds());

        list.push("b");
        list.push(String::from("c"));
        assert_eq!(list.index_of("c"), Some(2));
        assert_eq!(list.index_of("z"), None);
        assert_eq!(list.remove(1).unwrap().as_str(), "b");
        assert_eq!(list.iter().collect::<Vec<_>>(), ["a", "c"]);
        assert!(list.remove(2).unwrap_err().is_index_out_of_bounds());

        list.set(());
        assert!(list.is_empty());
        list.set(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(list.len(), 2);
        list.set(12);
        assert_eq!(list.get(0).unwrap(), "12");
    }

    #[test]
    fn test_json_shapes() {
        assert_eq!(TextList::default().to_json().unwrap(), b"null");
        assert_eq!(TextList::new("a").to_json().unwrap(), br#""a""#);
        let list: TextList = ["a", "b\"c"].into_iter().collect();
        assert_eq!(list.to_json().unwrap(), br#"["a","b\"c"]"#);

        assert!(TextList::from_json(b"null").unwrap().is_empty());
        assert_eq!(TextList::from_json(br#""a""#).unwrap().len(), 1);
        let list = TextList::from_json(br#" ["a", null, "c"] "#).unwrap();
        assert_eq!(list.iter().collect::<Vec<_>>(), ["a", "", "c"]);

        for json in [&b"[1]"[..], b"12", b"{}", b"[\"a\"", b"true"] {
            let err = TextList::from_json(json).unwrap_err();
            assert!(err.is_type_mismatch(), "{:?}", json);
            assert_eq!(err.expected(), Some("TextList"));
        }
    }

    #[test]
    fn test_serde() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Scopes {
            scope: TextList,
        }
        let s: Scopes = serde_json::from_str(r#"{"scope":["read",null]}"#).unwrap();
        assert_eq!(s.scope.iter().collect::<Vec<_>>(), ["read", ""]);
        assert_eq!(
            serde_json::to_string(&s).unwrap(),
            r#"{"scope":["read",""]}"#
        );
        let s: Scopes = serde_json::from_str(r#"{"scope":"read"}"#).unwrap();
        assert_eq!(serde_json::to_string(&s).unwrap(), r#"{"scope":"read"}"#);
        assert!(serde_json::from_str::<Scopes>(r#"{"scope":[1]}"#).is_err());
    }
}

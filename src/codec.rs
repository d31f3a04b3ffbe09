//! Serde support for templates.
//!
//! Wire format:
//!
//! | Node                 | Serialized as                        |
//! |----------------------|--------------------------------------|
//! | `Null`/scalars       | the scalar                           |
//! | `List`, `Tuple`      | sequence                             |
//! | `Record`, `Map`      | map, keys rendered with `Display`    |
//! | `Candidates`         | `{ "$candidates": [ ... ] }`         |
//! | `Custom`             | sequence or map, by its shape        |
//! | `Opaque`             | error                                |
//!
//! Deserializing from any self-describing format yields scalars, lists and
//! maps. A map whose only entry is `$candidates` becomes a candidate set, and
//! goes through the same non-empty check as [`CandidateSet::new`].

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, Serialize, SerializeMap, Serializer};

use crate::candidates::{CandidateSet, CANDIDATES_KEY};
use crate::error::RealizeError;
use crate::node::{MapKey, Mapping, Node, Shape};

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Int(i) => serializer.serialize_i64(*i),
            Node::Float(f) => serializer.serialize_f64(*f),
            Node::Str(s) => serializer.serialize_str(s),
            Node::Opaque(handle) => Err(ser::Error::custom(format!(
                "opaque value of type {} cannot be serialized",
                handle.type_name()
            ))),
            Node::Record(record) => {
                let mut map = serializer.serialize_map(Some(record.len()))?;
                for (name, value) in record.fields() {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Node::List(items) | Node::Tuple(items) => serializer.collect_seq(items),
            Node::Map(entries) => {
                serializer.collect_map(entries.iter().map(|(key, value)| (key.to_string(), value)))
            }
            Node::Candidates(set) => set.serialize(serializer),
            Node::Custom(container) => {
                let children = container.children();
                match container.shape() {
                    Shape::Elements => {
                        serializer.collect_seq(children.into_iter().map(|(_, child)| child))
                    }
                    _ => serializer.collect_map(
                        children
                            .into_iter()
                            .map(|(step, child)| (step.to_string(), child)),
                    ),
                }
            }
        }
    }
}

impl Serialize for CandidateSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(CANDIDATES_KEY, self.values())?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a template node")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        i64::try_from(v)
            .map(Node::Int)
            .map_err(|_| E::custom(format!("integer {} does not fit in i64", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::Str(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Node>()? {
            items.push(item);
        }
        Ok(Node::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Node, A::Error> {
        let mut entries = Mapping::new();
        while let Some((key, value)) = access.next_entry::<MapKey, Node>()? {
            entries.insert(key, value);
        }

        if entries.len() == 1 {
            match entries.pop() {
                Some((MapKey::Str(key), Node::List(values))) if key == CANDIDATES_KEY => {
                    return CandidateSet::new(values)
                        .map(Node::Candidates)
                        .map_err(de::Error::custom);
                }
                Some((MapKey::Str(key), _)) if key == CANDIDATES_KEY => {
                    return Err(de::Error::custom(format!(
                        "{} must be a sequence of values",
                        CANDIDATES_KEY
                    )));
                }
                Some((key, value)) => {
                    entries.insert(key, value);
                }
                None => {}
            }
        }
        Ok(Node::Map(entries))
    }
}

impl<'de> Deserialize<'de> for MapKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MapKeyVisitor)
    }
}

struct MapKeyVisitor;

impl Visitor<'_> for MapKeyVisitor {
    type Value = MapKey;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, integer, or boolean map key")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<MapKey, E> {
        Ok(MapKey::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<MapKey, E> {
        Ok(MapKey::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<MapKey, E> {
        i64::try_from(v)
            .map(MapKey::Int)
            .map_err(|_| E::custom(format!("map key {} does not fit in i64", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<MapKey, E> {
        Ok(MapKey::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<MapKey, E> {
        Ok(MapKey::Str(v))
    }
}

impl Node {
    /// Parse a template from YAML (which also accepts JSON).
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RealizeError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, RealizeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert to a JSON value. Fails on opaque leaves.
    pub fn to_json(&self) -> Result<serde_json::Value, RealizeError> {
        Ok(serde_json::to_value(self)?)
    }
}

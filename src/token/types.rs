use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::access::{AccessSet, ActionSet, Resource};

/// Actions a token grants on one resource, as carried in the `access` claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceActions {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub name: String,
    #[serde(default)]
    pub actions: Vec<String>,
}

impl ResourceActions {
    pub fn resource(&self) -> Resource {
        Resource {
            resource_type: self.resource_type.clone(),
            class: self.class.clone(),
            name: self.name.clone(),
        }
    }
}

/// The `aud` claim. On the wire it is either a single string or an array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Audience(pub Vec<String>);

impl Audience {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, audience: &str) -> bool {
        self.0.iter().any(|aud| aud == audience)
    }

    pub fn intersects(&self, accepted: &HashSet<String>) -> bool {
        self.0.iter().any(|aud| accepted.contains(aud))
    }
}

impl From<&str> for Audience {
    fn from(value: &str) -> Self {
        Audience(vec![value.to_string()])
    }
}

impl From<Vec<String>> for Audience {
    fn from(value: Vec<String>) -> Self {
        Audience(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AudienceRepr {
    Single(String),
    Multiple(Vec<String>),
}

impl<'de> Deserialize<'de> for Audience {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match AudienceRepr::deserialize(deserializer)? {
            AudienceRepr::Single(value) => Audience(vec![value]),
            AudienceRepr::Multiple(values) => Audience(values),
        })
    }
}

impl Serialize for Audience {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let [single] = self.0.as_slice() {
            return serializer.serialize_str(single);
        }
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for aud in &self.0 {
            seq.serialize_element(aud)?;
        }
        seq.end()
    }
}

/// Payload of a registry token.
///
/// Values of this type handed out by the verifier have passed signature,
/// trust, issuer, audience and time-window checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    #[serde(rename = "iss", default)]
    pub issuer: String,
    #[serde(rename = "sub", default)]
    pub subject: String,
    #[serde(rename = "aud", default)]
    pub audience: Audience,
    #[serde(
        rename = "exp",
        default,
        deserialize_with = "numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration: Option<u64>,
    #[serde(
        rename = "nbf",
        default,
        deserialize_with = "numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub not_before: Option<u64>,
    #[serde(
        rename = "iat",
        default,
        deserialize_with = "numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub issued_at: Option<u64>,
    #[serde(rename = "jti", default, skip_serializing_if = "String::is_empty")]
    pub token_id: String,
    #[serde(default)]
    pub access: Vec<ResourceActions>,
}

impl ClaimSet {
    /// Granted actions per resource; entries naming the same type and name
    /// are merged.
    pub fn access_set(&self) -> AccessSet {
        let mut set = AccessSet::new();
        for entry in &self.access {
            let actions: ActionSet = entry.actions.iter().cloned().collect();
            set.add(&entry.resource(), &actions);
        }
        set
    }

    /// Every resource the token carries any access to, without duplicates.
    pub fn resources(&self) -> Vec<Resource> {
        let mut resources: Vec<Resource> = Vec::new();
        for entry in &self.access {
            let resource = entry.resource();
            if !resources.contains(&resource) {
                resources.push(resource);
            }
        }
        resources
    }
}

fn numeric_date<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct NumericDate;

    impl<'de> serde::de::Visitor<'de> for NumericDate {
        type Value = Option<u64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a numeric date representable as u64")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if value.is_finite() && value >= 0.0 && value < (u64::MAX as f64) {
                Ok(Some(value.round() as u64))
            } else {
                Err(serde::de::Error::custom(
                    "numeric date must be representable as u64",
                ))
            }
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            u64::try_from(value)
                .map(Some)
                .map_err(|_| serde::de::Error::custom("numeric date must not be negative"))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value))
        }
    }

    deserializer.deserialize_any(NumericDate)
}

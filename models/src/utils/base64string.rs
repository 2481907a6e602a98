use std::fmt::{self, Display, Formatter};

use base64::prelude::*;
use serde::{de::Error, Deserialize, Serialize};

/// A wrapper around a `Vec<u8>` that serializes as standard base64. Used for
/// binary protocol fields (device public keys, signed assertions) that
/// travel inside form-encoded or JSON bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Base64String(Vec<u8>);

impl Base64String {
	/// The raw bytes behind the wrapper
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	/// Consume the wrapper and return the raw bytes
	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	/// The number of raw (decoded) bytes
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether the wrapped data is empty
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Vec<u8>> for Base64String {
	fn from(data: Vec<u8>) -> Self {
		Self(data)
	}
}

impl From<&[u8]> for Base64String {
	fn from(data: &[u8]) -> Self {
		Self(data.to_vec())
	}
}

impl AsRef<[u8]> for Base64String {
	fn as_ref(&self) -> &[u8] {
		&self.0
	}
}

impl Display for Base64String {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}", BASE64_STANDARD.encode(&self.0))
	}
}

impl Serialize for Base64String {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(BASE64_STANDARD.encode(&self.0).as_str())
	}
}

impl<'de> Deserialize<'de> for Base64String {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let string = String::deserialize(deserializer)?;
		BASE64_STANDARD
			.decode(&string)
			.map(Self)
			.map_err(|_| Error::custom(format!("unable to decode `{}` as base64", string)))
	}
}

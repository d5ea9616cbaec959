use {
  crate::Error,
  serde::{de::DeserializeOwned, Serialize},
};

/// Encodes call input, call output and storage values.
///
/// Everything that crosses the boundary between the platform and
/// a contract program is MessagePack.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, Error> {
  rmp_serde::to_vec(value).map_err(|e| Error::Codec(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
  rmp_serde::from_slice(bytes).map_err(|e| Error::Codec(e.to_string()))
}

#[cfg(test)]
mod tests {
  use {super::*, fundme_primitives::Address};

  #[test]
  fn malformed_bytes_are_codec_errors() {
    assert!(matches!(decode::<Address>(&[0xc1]), Err(Error::Codec(_))));
  }
}

//! Field values and their on-page encoding.

use std::fmt;

use crate::common::config::STRING_LEN;

use super::Type;

/// A single typed value.
///
/// # Encoding
/// ```text
/// Int:    [i32 little-endian]                          4 bytes
/// String: [len u32 little-endian][payload, 0-padded]   4 + STRING_LEN bytes
/// ```
/// Strings longer than [`STRING_LEN`] bytes don't [`fit`](Field::fits) and
/// are refused by every schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Int(i32),
    Str(String),
}

impl Field {
    pub fn field_type(&self) -> Type {
        match self {
            Field::Int(_) => Type::Int,
            Field::Str(_) => Type::String,
        }
    }

    /// Whether the value can be encoded without losing bytes.
    pub fn fits(&self) -> bool {
        match self {
            Field::Int(_) => true,
            Field::Str(s) => s.len() <= STRING_LEN,
        }
    }

    /// Write this value into `buf`, which must be exactly `field_type().size()`
    /// bytes long. The value must [`fit`](Field::fits).
    pub(crate) fn encode(&self, buf: &mut [u8]) {
        debug_assert_eq!(buf.len(), self.field_type().size());
        debug_assert!(self.fits());
        match self {
            Field::Int(v) => buf.copy_from_slice(&v.to_le_bytes()),
            Field::Str(s) => {
                let len = s.len();
                buf[..4].copy_from_slice(&(len as u32).to_le_bytes());
                buf[4..4 + len].copy_from_slice(s.as_bytes());
                buf[4 + len..].fill(0);
            }
        }
    }

    /// Read a value of type `ty` from `buf`.
    ///
    /// Returns a description of what's wrong if the bytes can't be a `ty`.
    pub(crate) fn decode(ty: Type, buf: &[u8]) -> std::result::Result<Field, String> {
        if buf.len() != ty.size() {
            return Err(format!(
                "{} field needs {} bytes, got {}",
                ty,
                ty.size(),
                buf.len()
            ));
        }
        match ty {
            Type::Int => Ok(Field::Int(i32::from_le_bytes([
                buf[0], buf[1], buf[2], buf[3],
            ]))),
            Type::String => {
                let len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
                if len > STRING_LEN {
                    return Err(format!("string length {} exceeds {}", len, STRING_LEN));
                }
                String::from_utf8(buf[4..4 + len].to_vec())
                    .map(Field::Str)
                    .map_err(|e| format!("string is not UTF-8: {}", e))
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Int(v) => write!(f, "{}", v),
            Field::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for Field {
    fn from(v: i32) -> Self {
        Field::Int(v)
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::Str(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(field: &Field) -> Vec<u8> {
        let mut buf = vec![0xAAu8; field.field_type().size()];
        field.encode(&mut buf);
        buf
    }

    #[test]
    fn test_int_byte_layout() {
        let buf = encoded(&Field::Int(0x04030201));
        assert_eq!(buf, vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(Field::decode(Type::Int, &buf), Ok(Field::Int(0x04030201)));
    }

    #[test]
    fn test_string_is_zero_padded() {
        let buf = encoded(&Field::Str("hi".into()));
        assert_eq!(buf.len(), 4 + STRING_LEN);
        assert_eq!(&buf[..4], &2u32.to_le_bytes());
        assert_eq!(&buf[4..6], b"hi");
        assert!(buf[6..].iter().all(|&b| b == 0));
        assert_eq!(
            Field::decode(Type::String, &buf),
            Ok(Field::Str("hi".into()))
        );
    }

    #[test]
    fn test_full_width_string_roundtrips() {
        let s = format!("{}é", "a".repeat(STRING_LEN - 2));
        assert_eq!(s.len(), STRING_LEN);
        let field = Field::Str(s);
        assert!(field.fits());
        assert_eq!(Field::decode(Type::String, &encoded(&field)), Ok(field));
    }

    #[test]
    fn test_fits() {
        assert!(Field::Int(i32::MIN).fits());
        assert!(Field::Str(String::new()).fits());
        assert!(!Field::Str("a".repeat(STRING_LEN + 1)).fits());
        // 'é' is two bytes
        assert!(!Field::Str(format!("{}é", "a".repeat(STRING_LEN - 1))).fits());
    }

    #[test]
    fn test_decode_rejects_bad_length() {
        let mut buf = vec![0u8; Type::String.size()];
        buf[..4].copy_from_slice(&((STRING_LEN + 1) as u32).to_le_bytes());
        assert!(Field::decode(Type::String, &buf).is_err());
        assert!(Field::decode(Type::Int, &[0, 0]).is_err());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Field::from(5), Field::Int(5));
        assert_eq!(Field::from("x"), Field::Str("x".into()));
        assert_eq!(format!("{}", Field::Int(-3)), "-3");
    }
}

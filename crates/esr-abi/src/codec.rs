//! Encodes and decodes a single [`Value`] against a declared [`FieldType`],
//! using `esr-core`'s binary primitives. This is the one place the
//! protocol's generic value tree meets a concrete wire layout for
//! contract-defined data.

use esr_core::bytes::{Reader, Writer};
use esr_core::error::{EsrError, Result};
use esr_core::name::Name;
use esr_core::value::Value;

use crate::types::FieldType;

pub fn encode_value(w: &mut Writer, ty: &FieldType, value: &Value) -> Result<()> {
    match (ty, value) {
        (FieldType::Name, Value::Name(n)) => {
            w.put_u64(n.value());
            Ok(())
        }
        (FieldType::String, Value::String(s)) => {
            w.put_string(s);
            Ok(())
        }
        (FieldType::Bytes, Value::Bytes(b)) => {
            w.put_bytes(b);
            Ok(())
        }
        (FieldType::Bool, Value::Bool(b)) => {
            w.put_bool(*b);
            Ok(())
        }
        (FieldType::Uint8, Value::Int(i)) => {
            w.put_u8(u8::try_from(*i).map_err(|_| out_of_range("uint8", *i))?);
            Ok(())
        }
        (FieldType::Uint16, Value::Int(i)) => {
            w.put_u16(u16::try_from(*i).map_err(|_| out_of_range("uint16", *i))?);
            Ok(())
        }
        (FieldType::Uint32, Value::Int(i)) => {
            w.put_u32(u32::try_from(*i).map_err(|_| out_of_range("uint32", *i))?);
            Ok(())
        }
        (FieldType::Uint64, Value::Int(i)) => {
            w.put_u64(u64::try_from(*i).map_err(|_| out_of_range("uint64", *i))?);
            Ok(())
        }
        (FieldType::Int8, Value::Int(i)) => {
            w.put_u8(i8::try_from(*i).map_err(|_| out_of_range("int8", *i))? as u8);
            Ok(())
        }
        (FieldType::Int16, Value::Int(i)) => {
            w.put_u16(i16::try_from(*i).map_err(|_| out_of_range("int16", *i))? as u16);
            Ok(())
        }
        (FieldType::Int32, Value::Int(i)) => {
            w.put_u32(i32::try_from(*i).map_err(|_| out_of_range("int32", *i))? as u32);
            Ok(())
        }
        (FieldType::Int64, Value::Int(i)) => {
            w.put_u64(i64::try_from(*i).map_err(|_| out_of_range("int64", *i))? as u64);
            Ok(())
        }
        (FieldType::Asset, Value::String(s)) => encode_asset(w, s),
        (FieldType::PermissionLevel, Value::PermissionLevel(pl)) => {
            w.put_u64(pl.actor.value());
            w.put_u64(pl.permission.value());
            Ok(())
        }
        (FieldType::Optional(inner), Value::Bool(false)) => {
            let _ = inner;
            w.put_bool(false);
            Ok(())
        }
        (FieldType::Optional(inner), other) => {
            w.put_bool(true);
            encode_value(w, inner, other)
        }
        (ty, value) => Err(EsrError::DecodeError(format!(
            "value {value:?} does not match field type {ty:?}"
        ))),
    }
}

pub fn decode_value(r: &mut Reader, ty: &FieldType) -> Result<Value> {
    Ok(match ty {
        FieldType::Name => Value::Name(Name::new(r.get_u64()?)),
        FieldType::String => Value::String(r.get_string()?),
        FieldType::Bytes => Value::Bytes(r.get_bytes()?),
        FieldType::Bool => Value::Bool(r.get_bool()?),
        FieldType::Uint8 => Value::Int(r.get_u8()? as i128),
        FieldType::Uint16 => Value::Int(r.get_u16()? as i128),
        FieldType::Uint32 => Value::Int(r.get_u32()? as i128),
        FieldType::Uint64 => Value::Int(r.get_u64()? as i128),
        FieldType::Int8 => Value::Int(r.get_u8()? as i8 as i128),
        FieldType::Int16 => Value::Int(r.get_u16()? as i16 as i128),
        FieldType::Int32 => Value::Int(r.get_u32()? as i32 as i128),
        FieldType::Int64 => Value::Int(r.get_u64()? as i64 as i128),
        FieldType::Asset => decode_asset(r)?,
        FieldType::PermissionLevel => Value::PermissionLevel(esr_core::action::PermissionLevel {
            actor: Name::new(r.get_u64()?),
            permission: Name::new(r.get_u64()?),
        }),
        FieldType::Optional(inner) => {
            if r.get_bool()? {
                decode_value(r, inner)?
            } else {
                Value::Bool(false)
            }
        }
    })
}

fn out_of_range(ty: &str, value: i128) -> EsrError {
    EsrError::DecodeError(format!("{value} does not fit in {ty}"))
}

/// EOSIO's packed asset: 8-byte little-endian fixed-point amount, 1-byte
/// precision, 7-byte zero-padded uppercase symbol code.
fn encode_asset(w: &mut Writer, s: &str) -> Result<()> {
    let (amount_str, symbol) = s
        .trim()
        .split_once(' ')
        .ok_or_else(|| EsrError::DecodeError(format!("malformed asset string: {s:?}")))?;
    if symbol.is_empty() || symbol.len() > 7 || !symbol.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(EsrError::DecodeError(format!(
            "malformed asset symbol: {symbol:?}"
        )));
    }
    let (precision, amount) = match amount_str.split_once('.') {
        Some((whole, frac)) => {
            let precision = frac.len() as u8;
            let digits = format!("{whole}{frac}");
            let amount: i64 = digits
                .parse()
                .map_err(|_| EsrError::DecodeError(format!("malformed asset amount: {s:?}")))?;
            (precision, amount)
        }
        None => {
            let amount: i64 = amount_str
                .parse()
                .map_err(|_| EsrError::DecodeError(format!("malformed asset amount: {s:?}")))?;
            (0, amount)
        }
    };
    w.put_fixed_bytes(&amount.to_le_bytes());
    w.put_u8(precision);
    let mut symbol_bytes = [0u8; 7];
    symbol_bytes[..symbol.len()].copy_from_slice(symbol.as_bytes());
    w.put_fixed_bytes(&symbol_bytes);
    Ok(())
}

fn decode_asset(r: &mut Reader) -> Result<Value> {
    let amount_bytes = r.get_fixed_bytes(8)?;
    let amount = i64::from_le_bytes(amount_bytes.try_into().unwrap());
    let precision = r.get_u8()?;
    let symbol_bytes = r.get_fixed_bytes(7)?;
    let symbol_len = symbol_bytes.iter().take_while(|&&b| b != 0).count();
    let symbol = String::from_utf8(symbol_bytes[..symbol_len].to_vec())
        .map_err(|e| EsrError::DecodeError(e.to_string()))?;
    let rendered = if precision == 0 {
        format!("{amount} {symbol}")
    } else {
        let precision = precision as usize;
        let sign = if amount < 0 { "-" } else { "" };
        let digits = amount.unsigned_abs().to_string();
        let digits = format!("{digits:0>width$}", width = precision + 1);
        let split = digits.len() - precision;
        format!("{sign}{}.{} {symbol}", &digits[..split], &digits[split..])
    };
    Ok(Value::String(rendered))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_round_trips_fractional_amount() {
        let mut w = Writer::new();
        encode_asset(&mut w, "1.000 EOS").unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 16);
        let mut r = Reader::new(&bytes);
        assert_eq!(decode_asset(&mut r).unwrap(), Value::String("1.000 EOS".to_string()));
    }

    #[test]
    fn optional_field_round_trips_both_states() {
        let mut w = Writer::new();
        encode_value(&mut w, &FieldType::Optional(Box::new(FieldType::String)), &Value::Bool(false))
            .unwrap();
        encode_value(
            &mut w,
            &FieldType::Optional(Box::new(FieldType::String)),
            &Value::String("hi".into()),
        )
        .unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert_eq!(
            decode_value(&mut r, &FieldType::Optional(Box::new(FieldType::String))).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            decode_value(&mut r, &FieldType::Optional(Box::new(FieldType::String))).unwrap(),
            Value::String("hi".into())
        );
    }
}

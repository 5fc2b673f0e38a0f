#[cfg(test)]
mod tests {
    use keel_core::{AsValue, ErrorExt, OverflowError, Value, ValueKind};
    use rust_decimal::{Decimal, prelude::FromPrimitive};
    use std::str::FromStr;
    use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
    use uuid::Uuid;

    /// Every representation a driver could use to return `value` exactly.
    fn representations(value: i128) -> Vec<Value> {
        let mut result = Vec::new();
        if let Ok(v) = i8::try_from(value) {
            result.push(Value::Int8(Some(v)));
        }
        if let Ok(v) = i16::try_from(value) {
            result.push(Value::Int16(Some(v)));
        }
        if let Ok(v) = i32::try_from(value) {
            result.push(Value::Int32(Some(v)));
        }
        if let Ok(v) = i64::try_from(value) {
            result.push(Value::Int64(Some(v)));
        }
        if let Ok(v) = u8::try_from(value) {
            result.push(Value::UInt8(Some(v)));
        }
        if let Ok(v) = u16::try_from(value) {
            result.push(Value::UInt16(Some(v)));
        }
        if let Ok(v) = u32::try_from(value) {
            result.push(Value::UInt32(Some(v)));
        }
        if let Ok(v) = u64::try_from(value) {
            result.push(Value::UInt64(Some(v)));
        }
        if value as f64 as i128 == value {
            result.push(Value::Float64(Some(value as f64)));
        }
        result.push(Value::Decimal(Decimal::from_i128(value)));
        result.push(Value::Varchar(Some(value.to_string())));
        result.push(Value::Blob(Some(value.to_string().into_bytes().into())));
        result
    }

    macro_rules! check_boundaries {
        ($type:ty) => {{
            let min = <$type>::MIN as i128;
            let max = <$type>::MAX as i128;
            for expected in [min, max] {
                for value in representations(expected) {
                    let description = format!("{value:?}");
                    let result = <$type>::try_from_value(value).unwrap_or_else(|e| {
                        panic!("{description} should fit {}: {e:#}", stringify!($type))
                    });
                    assert_eq!(result as i128, expected, "{description}");
                }
            }
            for outside in [min - 1, max + 1] {
                for value in representations(outside) {
                    let description = format!("{value:?}");
                    let error = <$type>::try_from_value(value).expect_err(&format!(
                        "{description} should not fit {}",
                        stringify!($type)
                    ));
                    assert!(error.is_overflow(), "{description}: {error:#}");
                    let overflow = error.downcast_ref::<OverflowError>().unwrap();
                    assert_eq!(overflow.destination, stringify!($type));
                    assert_eq!(overflow.value, outside.to_string(), "{description}");
                }
            }
        }};
    }

    #[test]
    fn integer_boundaries() {
        check_boundaries!(i8);
        check_boundaries!(i16);
        check_boundaries!(i32);
        check_boundaries!(i64);
        check_boundaries!(u8);
        check_boundaries!(u16);
        check_boundaries!(u32);
        check_boundaries!(u64);
    }

    #[test]
    fn negative_to_unsigned() {
        for value in [
            Value::Int8(Some(-1)),
            Value::Int16(Some(-300)),
            Value::Int32(Some(i32::MIN)),
            Value::Int64(Some(-1)),
            Value::Varchar(Some("-1".into())),
        ] {
            assert!(u8::try_from_value(value.clone()).unwrap_err().is_overflow());
            assert!(u16::try_from_value(value.clone()).unwrap_err().is_overflow());
            assert!(u32::try_from_value(value.clone()).unwrap_err().is_overflow());
            assert!(u64::try_from_value(value).unwrap_err().is_overflow());
        }
    }

    #[test]
    fn overflow_message() {
        let error = u8::try_from_value(Value::Int16(Some(256))).unwrap_err();
        assert_eq!(
            error.to_string(),
            "keel: overflow: value 256 of type i16 does not fit into u8"
        );
        let error = i64::try_from_value(Value::UInt64(Some(u64::MAX))).unwrap_err();
        assert_eq!(
            error.to_string(),
            "keel: overflow: value 18446744073709551615 of type u64 does not fit into i64"
        );
    }

    #[test]
    fn integer_from_other_representations() {
        assert_eq!(i32::try_from_value(Value::Float64(Some(42.0))).unwrap(), 42);
        assert!(i32::try_from_value(Value::Float64(Some(42.5))).is_err());
        assert!(!i32::try_from_value(Value::Float64(Some(42.5))).unwrap_err().is_overflow());
        assert_eq!(
            u16::try_from_value(Value::Decimal(Some(Decimal::from_str("120.000").unwrap())))
                .unwrap(),
            120
        );
        assert!(u16::try_from_value(Value::Decimal(Some(Decimal::from_str("1.5").unwrap())))
            .is_err());
        assert_eq!(i64::try_from_value(Value::Varchar(Some(" 77 ".into()))).unwrap(), 77);
        assert_eq!(i8::try_from_value(Value::Blob(Some((*b"-12").into()))).unwrap(), -12);
        assert!(i32::try_from_value(Value::Varchar(Some("12a".into()))).is_err());
        assert!(i32::try_from_value(Value::Varchar(Some("".into()))).is_err());
        assert!(i32::try_from_value(Value::Varchar(Some("-".into()))).is_err());
        assert!(i32::try_from_value(Value::Boolean(Some(true))).is_err());
        assert!(i32::try_from_value(Value::Int32(None)).is_err());
        assert_eq!(<i16 as AsValue>::parse("-32768").unwrap(), i16::MIN);
        assert!(<i16 as AsValue>::parse("32768").unwrap_err().is_overflow());
        assert!(
            <u64 as AsValue>::parse("340282366920938463463374607431768211456")
                .unwrap_err()
                .is_overflow()
        );
    }

    #[test]
    fn value_bool() {
        let val = true.as_value();
        assert_eq!(val, Value::Boolean(Some(true)));
        assert_ne!(val, Value::Boolean(Some(false)));
        assert_ne!(val, Value::Boolean(None));
        assert_ne!(val, Value::Varchar(Some("true".into())));
        assert_eq!(bool::try_from_value(val).unwrap(), true);
        assert_eq!(bool::try_from_value(1_i8.as_value()).unwrap(), true);
        assert_eq!(bool::try_from_value(0_u64.as_value()).unwrap(), false);
        assert!(bool::try_from_value(0.5_f32.as_value()).is_err());
        assert_eq!(bool::parse("true").unwrap(), true);
        assert_eq!(bool::parse("F").unwrap(), false);
        assert!(bool::parse("false more").is_err());
        assert!(bool::parse("").is_err());
        assert!(false.is_zero());
        assert!(!true.is_zero());
    }

    #[test]
    fn value_floats() {
        assert_eq!(f64::try_from_value(Value::Int32(Some(-7))).unwrap(), -7.0);
        assert_eq!(f32::try_from_value(Value::Float64(Some(1.5))).unwrap(), 1.5);
        assert!(
            f32::try_from_value(Value::Float64(Some(1e300)))
                .unwrap_err()
                .is_overflow()
        );
        assert_eq!(f64::parse("2.25").unwrap(), 2.25);
        assert_eq!(
            f64::try_from_value(Value::Decimal(Some(Decimal::from_str("0.5").unwrap()))).unwrap(),
            0.5
        );
        assert!(0.0_f64.is_zero());
        assert!(!0.1_f32.is_zero());
    }

    #[test]
    fn value_decimal() {
        let value = Decimal::from_str("123.4500").unwrap();
        assert_eq!(Decimal::try_from_value(value.as_value()).unwrap(), value);
        assert_eq!(
            Decimal::try_from_value(Value::Int64(Some(-12))).unwrap(),
            Decimal::from(-12)
        );
        assert_eq!(
            Decimal::try_from_value(Value::Varchar(Some("0.001".into()))).unwrap(),
            Decimal::from_str("0.001").unwrap()
        );
        assert!(Decimal::try_from_value(Value::Varchar(Some("abc".into()))).is_err());
        assert!(AsValue::is_zero(&Decimal::ZERO));
    }

    #[test]
    fn value_text_and_bytes() {
        assert_eq!(
            String::try_from_value(Value::Blob(Some((*b"hello").into()))).unwrap(),
            "hello"
        );
        assert!(String::try_from_value(Value::Blob(Some(vec![0xff, 0xfe].into()))).is_err());
        assert!(String::try_from_value(Value::Int32(Some(1))).is_err());
        assert_eq!(
            Vec::<u8>::try_from_value(Value::Varchar(Some("ab".into()))).unwrap(),
            b"ab".to_vec()
        );
        assert!(String::new().is_zero());
        assert!(!"x".to_string().is_zero());
        assert!(Vec::<u8>::new().is_zero());
        assert_eq!(Value::from("John"), Value::Varchar(Some("John".into())));
    }

    #[test]
    fn value_uuid() {
        let id = Uuid::from_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(Uuid::try_from_value(id.as_value()).unwrap(), id);
        assert_eq!(
            Uuid::try_from_value(Value::Varchar(Some(id.to_string()))).unwrap(),
            id
        );
        assert_eq!(
            Uuid::try_from_value(Value::Blob(Some(id.as_bytes().to_vec().into()))).unwrap(),
            id
        );
        assert!(Uuid::nil().is_zero());
        assert!(!id.is_zero());
    }

    #[test]
    fn value_temporal() {
        let date = Date::from_calendar_date(2024, Month::February, 29).unwrap();
        assert_eq!(
            Date::try_from_value(Value::Varchar(Some("2024-02-29".into()))).unwrap(),
            date
        );
        let time = Time::from_hms_milli(13, 5, 7, 250).unwrap();
        assert_eq!(
            Time::try_from_value(Value::Varchar(Some("13:05:07.25".into()))).unwrap(),
            time
        );
        assert_eq!(
            Time::try_from_value(Value::Varchar(Some("13:05:07".into()))).unwrap(),
            Time::from_hms(13, 5, 7).unwrap()
        );
        let timestamp = PrimitiveDateTime::new(date, time);
        assert_eq!(
            PrimitiveDateTime::try_from_value(Value::Varchar(Some(
                "2024-02-29 13:05:07.25".into()
            )))
            .unwrap(),
            timestamp
        );
        assert_eq!(
            PrimitiveDateTime::try_from_value(Value::Varchar(Some(
                "2024-02-29T13:05:07.25".into()
            )))
            .unwrap(),
            timestamp
        );
        let with_offset = OffsetDateTime::try_from_value(Value::Varchar(Some(
            "2024-02-29T15:05:07.25+02:00".into(),
        )))
        .unwrap();
        assert_eq!(with_offset.offset(), UtcOffset::from_hms(2, 0, 0).unwrap());
        assert_eq!(
            PrimitiveDateTime::try_from_value(with_offset.as_value()).unwrap(),
            timestamp
        );
        assert!(!date.is_zero());
        assert!(Date::try_from_value(Value::Varchar(Some("29/02/2024".into()))).is_err());
    }

    #[test]
    fn value_option() {
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::try_from_value(Value::Int64(None)).unwrap(), None);
        assert_eq!(
            Option::<i32>::try_from_value(Value::Int64(Some(5))).unwrap(),
            Some(5)
        );
        assert_eq!(None::<String>.as_value(), Value::Varchar(None));
        assert!(None::<i32>.is_zero());
        assert!(!Some(0).is_zero());
        assert_eq!(<Option<u8> as AsValue>::KIND, ValueKind::UInt8);
        assert!(
            Option::<u8>::try_from_value(Value::Int32(Some(-1)))
                .unwrap_err()
                .is_overflow()
        );
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Int32(Some(5)).to_string(), "5");
        assert_eq!(Value::Varchar(Some("a".into())).to_string(), "\"a\"");
        assert_eq!(Value::Varchar(None).to_string(), "NULL");
        assert_eq!(Value::Blob(Some(vec![1, 2, 3].into())).to_string(), "<3 bytes>");
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::UInt16(None).type_name(), "u16");
        assert!(Value::Int8(None).is_null());
        assert_eq!(Value::Int8(None), Value::Int8(None));
        assert_ne!(Value::Int8(None), Value::Int16(None));
    }
}

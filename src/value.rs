//! Canonical Clarity value text: encoders, the owned text wrapper with its
//! assertions, and the bracket scanner behind list and tuple decoding.

pub mod encode;
pub mod scan;
mod text;

pub use text::ClarityText;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;

    #[test]
    fn test_scalar_round_trips() {
        for v in [true, false] {
            assert_eq!(ClarityText::from(encode::bool(v)).expect_bool(v).unwrap(), v);
        }
        for v in [0i128, -1, 42, i128::MIN, i128::MAX] {
            assert_eq!(ClarityText::from(encode::int(v)).expect_int(v).unwrap(), v);
        }
        for v in [0u128, 1, 20000, u128::MAX] {
            assert_eq!(ClarityText::from(encode::uint(v)).expect_uint(v).unwrap(), v);
        }
        for v in ["", "Test Campaign", "quote \" and \\ slash"] {
            assert_eq!(ClarityText::from(encode::ascii(v)).expect_ascii(v).unwrap(), v);
            assert_eq!(ClarityText::from(encode::utf8(v)).expect_utf8(v).unwrap(), v);
        }
        let buffers: [&[u8]; 3] = [b"", b"Crowdfunding", &[0, 255, 7]];
        for v in buffers {
            assert_eq!(ClarityText::from(encode::buff(v)).expect_buff(v).unwrap(), v.to_vec());
        }
        let addr = "ST1SJ3DTE5DN7X54YDH5D64R3BCB6A2AG2ZQ8YPD5";
        let quoted = encode::principal(addr);
        assert_eq!(ClarityText::from(quoted.as_str()).expect_principal(&quoted).unwrap(), quoted);
    }

    #[test]
    fn test_response_unwrap_is_not_double_wrapped() {
        for inner in ["u1", "(some u2)", "{ a: 1 }", ""] {
            let wrapped = ClarityText::from(encode::ok(inner));
            assert_eq!(wrapped.expect_ok().unwrap(), inner);
        }
        assert_eq!(ClarityText::from("(err u102)").expect_err().unwrap().expect_uint(102).unwrap(), 102);
        assert_eq!(ClarityText::from("(some 'ST1)").expect_some().unwrap(), "'ST1");
    }

    #[test]
    fn test_response_unwrap_rejects_wrong_token() {
        let err = ClarityText::from("(err u1)").expect_ok().unwrap_err();
        assert_eq!(err, HarnessError::mismatch("(ok ...)", "(err u1)"));
        assert!(ClarityText::from("(okay u1)").expect_ok().is_err());
        assert!(ClarityText::from("ok u1").expect_ok().is_err());
        assert!(ClarityText::from("(ok").expect_ok().is_err());
    }

    #[test]
    fn test_none_is_exact() {
        assert!(ClarityText::from("none").expect_none().is_ok());
        assert!(ClarityText::from("(some none)").expect_none().is_err());
    }

    #[test]
    fn test_uint_mismatch() {
        assert_eq!(ClarityText::from("u42").expect_uint(42).unwrap(), 42);
        let err = ClarityText::from("u42").expect_uint(43).unwrap_err();
        assert!(matches!(err, HarnessError::ParseMismatch { .. }));
        assert!(ClarityText::from("42").expect_uint(42).is_err());
    }

    #[test]
    fn test_expect_list() {
        let items = ClarityText::from("[u1, u2, u3]").expect_list().unwrap();
        assert_eq!(items, vec!["u1", "u2", "u3"]);
        assert!(ClarityText::from("[]").expect_list().unwrap().is_empty());

        let err = ClarityText::from("(list u1 u2)").expect_list().unwrap_err();
        assert_eq!(err, HarnessError::mismatch("(list ...)", "(list u1 u2)"));
    }

    #[test]
    fn test_expect_tuple_keeps_nested_raw() {
        let tuple = ClarityText::from("{ a: 1, b: { c: 2 } }").expect_tuple().unwrap();
        let keys: Vec<&str> = tuple.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(tuple["a"], "1");
        assert_eq!(tuple["b"], "{ c: 2 }");
    }

    #[test]
    fn test_expect_tuple_host_style() {
        let text = ClarityText::from(
            "(ok {campaignOwner: ST1SJ3DTE5DN7X54YDH5D64R3BCB6A2AG2ZQ8YPD5, claimed: false, fundGoal: u10000})",
        );
        let tuple = text.expect_ok().unwrap().expect_tuple().unwrap();
        tuple["claimed"].expect_bool(false).unwrap();
        tuple["fundGoal"].expect_uint(10000).unwrap();
        assert_eq!(tuple.len(), 3);
    }

    #[test]
    fn test_expect_tuple_rejects_unbalanced() {
        let err = ClarityText::from("{ a: (ok u1 }").expect_tuple().unwrap_err();
        assert!(matches!(err, HarnessError::UnbalancedStructure { .. }));
        assert!(ClarityText::from("{ a }").expect_tuple().is_err());
    }
}

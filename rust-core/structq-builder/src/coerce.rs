// SPDX-License-Identifier: PMPL-1.0-or-later
//! Scalar-or-collection coercion.
//!
//! Every one-or-many parameter of a constructor goes through here before it is
//! stored, so a node never holds a bare scalar where the grammar expects a
//! list. Sequences pass through unchanged and are never flattened further.

use serde_json::Value;

/// An argument that may be one value or an ordered collection of values.
///
/// `"a"` becomes `["a"]`, `vec!["a", "b"]` stays `["a", "b"]`, `None` becomes
/// `[]`. A nested collection is kept as one element, not spliced in.
pub trait IntoSequence<T> {
    fn into_sequence(self) -> Vec<T>;
}

impl IntoSequence<String> for &str {
    fn into_sequence(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoSequence<String> for String {
    fn into_sequence(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoSequence<String> for &String {
    fn into_sequence(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl IntoSequence<Value> for &str {
    fn into_sequence(self) -> Vec<Value> {
        vec![Value::from(self)]
    }
}

impl IntoSequence<Value> for String {
    fn into_sequence(self) -> Vec<Value> {
        vec![Value::from(self)]
    }
}

macro_rules! scalar_into_sequence {
    ($($ty:ty),*) => {
        $(
            impl IntoSequence<Value> for $ty {
                fn into_sequence(self) -> Vec<Value> {
                    vec![Value::from(self)]
                }
            }
        )*
    };
}

scalar_into_sequence!(i32, i64, u32, u64, f64, bool);

/// JSON arrays contribute their elements; any other value is a singleton.
impl IntoSequence<Value> for Value {
    fn into_sequence(self) -> Vec<Value> {
        coerce_value(self)
    }
}

impl<T, S: Into<T>> IntoSequence<T> for Vec<S> {
    fn into_sequence(self) -> Vec<T> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T, S: Into<T>, const N: usize> IntoSequence<T> for [S; N] {
    fn into_sequence(self) -> Vec<T> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T, S: Clone + Into<T>> IntoSequence<T> for &[S] {
    fn into_sequence(self) -> Vec<T> {
        self.iter().cloned().map(Into::into).collect()
    }
}

impl<T, S: IntoSequence<T>> IntoSequence<T> for Option<S> {
    fn into_sequence(self) -> Vec<T> {
        self.map(IntoSequence::into_sequence).unwrap_or_default()
    }
}

/// Coerce a variadic argument list.
///
/// No arguments give an empty list. A single array argument is returned as its
/// elements; a single scalar becomes a singleton. Two or more arguments are
/// returned in call order, arrays included as-is.
pub fn coerce_args(mut args: Vec<Value>) -> Vec<Value> {
    match args.len() {
        0 => Vec::new(),
        1 => coerce_value(args.remove(0)),
        _ => args,
    }
}

/// Coerce a single argument: arrays are unwrapped one level, scalars wrapped.
pub fn coerce_value(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_args_is_empty() {
        assert!(coerce_args(vec![]).is_empty());
    }

    #[test]
    fn test_single_scalar_is_wrapped() {
        assert_eq!(coerce_args(vec![json!("a")]), vec![json!("a")]);
        assert_eq!(coerce_args(vec![Value::Null]), vec![Value::Null]);
    }

    #[test]
    fn test_single_array_passes_through() {
        assert_eq!(coerce_args(vec![json!(["a", "b"])]), vec![json!("a"), json!("b")]);
    }

    #[test]
    fn test_many_args_keep_nested_arrays() {
        let out = coerce_args(vec![json!("a"), json!(["b", "c"])]);
        assert_eq!(out, vec![json!("a"), json!(["b", "c"])]);
    }

    #[test]
    fn test_array_is_unwrapped_only_once() {
        assert_eq!(coerce_value(json!([["x"]])), vec![json!(["x"])]);
    }

    #[test]
    fn test_typed_sequences() {
        let one: Vec<String> = "uri".into_sequence();
        assert_eq!(one, vec!["uri".to_string()]);

        let many: Vec<String> = vec!["a", "b"].into_sequence();
        assert_eq!(many, vec!["a".to_string(), "b".to_string()]);

        let arr: Vec<String> = ["x", "y", "z"].into_sequence();
        assert_eq!(arr.len(), 3);

        let none: Vec<String> = Option::<&str>::None.into_sequence();
        assert!(none.is_empty());

        let nums: Vec<Value> = vec![1i64, 2, 3].into_sequence();
        assert_eq!(nums, vec![json!(1), json!(2), json!(3)]);
    }
}

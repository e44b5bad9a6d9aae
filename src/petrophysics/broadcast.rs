//! Elementwise evaluation over curve-or-scalar inputs

use super::PetroError;
use crate::types::{Computed, LogValue};

/// Output length for a set of named inputs.
///
/// All curves must share one length; scalars broadcast. With no curve at
/// all the result is a single sample.
pub fn resolve_len(inputs: &[(&'static str, &LogValue)]) -> Result<usize, PetroError> {
    let mut reference: Option<(&'static str, usize)> = None;
    for &(name, value) in inputs {
        let Some(found) = value.len() else { continue };
        match reference {
            None => reference = Some((name, found)),
            Some((first, expected)) if expected != found => {
                return Err(PetroError::ShapeMismatch {
                    parameter: name.to_string(),
                    reference: first.to_string(),
                    expected,
                    found,
                });
            }
            Some(_) => {}
        }
    }
    Ok(reference.map_or(1, |(_, n)| n))
}

/// Evaluate `f` once per depth index with the broadcast samples of `inputs`.
///
/// `f` receives the output under construction so it can record warnings
/// for the sample it is producing.
pub(crate) fn evaluate<const N: usize, F>(
    inputs: [(&'static str, &LogValue); N],
    mut f: F,
) -> Result<Computed, PetroError>
where
    F: FnMut(&mut Computed, usize, [f64; N]) -> f64,
{
    let n = resolve_len(&inputs)?;
    let mut out = Computed {
        values: Vec::with_capacity(n),
        warnings: Vec::new(),
    };
    for i in 0..n {
        let samples = inputs.map(|(_, v)| v.at(i));
        let value = f(&mut out, i, samples);
        out.values.push(value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_scalars_is_one_sample() {
        let a = LogValue::from(1.0);
        let b = LogValue::from(2.0);
        assert_eq!(resolve_len(&[("a", &a), ("b", &b)]).unwrap(), 1);
    }

    #[test]
    fn test_curve_sets_length() {
        let a = LogValue::from(vec![1.0, 2.0, 3.0]);
        let b = LogValue::from(2.0);
        assert_eq!(resolve_len(&[("a", &a), ("b", &b)]).unwrap(), 3);
    }

    #[test]
    fn test_empty_curve_gives_empty_output() {
        let a = LogValue::from(Vec::new());
        let b = LogValue::from(2.0);
        let out = evaluate([("a", &a), ("b", &b)], |_, _, [x, y]| x + y).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_mismatch_names_both_inputs() {
        let a = LogValue::from(vec![1.0, 2.0, 3.0]);
        let b = LogValue::from(vec![1.0, 2.0]);
        let err = resolve_len(&[("rhob", &a), ("rhof", &b)]).unwrap_err();
        assert_eq!(
            err,
            PetroError::ShapeMismatch {
                parameter: "rhof".to_string(),
                reference: "rhob".to_string(),
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn test_evaluate_broadcasts() {
        let a = LogValue::from(vec![1.0, 2.0]);
        let b = LogValue::from(10.0);
        let out = evaluate([("a", &a), ("b", &b)], |_, _, [x, y]| x * y).unwrap();
        assert_eq!(out.values, vec![10.0, 20.0]);
    }
}

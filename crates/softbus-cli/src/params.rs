//! Module-parameter style bus argument parsing

use softbus_core::FIELD_COUNT;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParamError {
    /// More values than the eight defined parameters.
    #[error("too many parameters ({0} supplied, at most 8 accepted)")]
    TooManyValues(usize),
    /// A value was empty or not an unsigned integer.
    #[error("invalid parameter value `{0}`")]
    InvalidValue(String),
}

/// Parse a comma-separated bus parameter list into raw field values.
///
/// Accepts the module-parameter shape
/// `<id>,<sda>,<scl>[,<udelay>,<timeout>,<sda_od>,<scl_od>,<scl_oo>]`.
/// Whether enough values were supplied is judged during registration, so a
/// short list parses fine here.
pub fn parse_bus_params(arg: &str) -> Result<Vec<u32>, ParamError> {
    let values: Vec<&str> = arg.split(',').collect();
    if values.len() > FIELD_COUNT {
        return Err(ParamError::TooManyValues(values.len()));
    }
    values
        .iter()
        .map(|value| {
            let value = value.trim();
            value
                .parse::<u32>()
                .map_err(|_| ParamError::InvalidValue(value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_parameter_list() {
        let values = parse_bus_params("0,5,6,10,100,1,0,1").unwrap();
        assert_eq!(values, vec![0, 5, 6, 10, 100, 1, 0, 1]);
    }

    #[test]
    fn test_parse_required_only() {
        assert_eq!(parse_bus_params("2,7,8").unwrap(), vec![2, 7, 8]);
    }

    #[test]
    fn test_parse_tolerates_spaces() {
        assert_eq!(parse_bus_params("0, 5, 6").unwrap(), vec![0, 5, 6]);
    }

    #[test]
    fn test_parse_too_many_values() {
        let err = parse_bus_params("0,1,2,3,4,5,6,7,8").unwrap_err();
        assert_eq!(err, ParamError::TooManyValues(9));
    }

    #[test]
    fn test_parse_rejects_junk() {
        let err = parse_bus_params("0,sda,6").unwrap_err();
        assert_eq!(err, ParamError::InvalidValue("sda".to_string()));
        assert!(parse_bus_params("").is_err());
        assert!(parse_bus_params("0,,6").is_err());
    }
}

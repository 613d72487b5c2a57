//! Param Coercion (component E). A hand-rolled accessor over the raw
//! `params` JSON object rather than one `#[derive(Deserialize)]` struct
//! per action, because alias equality-or-conflict, trim/blank policy, and
//! cross-field exclusivity are cross-cutting rules that differ per field,
//! not something serde's built-in `#[serde(alias = ...)]` can express
//! (it silently takes the first match; it cannot detect a *conflicting*
//! second one).

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("missing required field '{0}'")]
    Missing(String),
    #[error("field '{0}' must not be blank")]
    Blank(String),
    #[error("conflicting values for aliases of '{0}': '{1}' vs '{2}'")]
    Conflict(String, String, String),
    #[error("field '{0}' must be numeric")]
    NotNumeric(String),
    #[error("field '{0}' has invalid value '{1}'")]
    InvalidEnum(String, String),
    #[error("field '{0}' and '{1}' may not both be supplied")]
    MutuallyExclusive(String, String),
    #[error("field '{0}' must be a positive integer")]
    NotPositiveInteger(String),
    #[error("field '{0}' must be strictly positive")]
    NotStrictlyPositive(String),
}

/// A field identified by its canonical name and the set of aliases
/// (including the canonical name itself) that may carry its value.
pub struct Field<'a> {
    pub canonical: &'a str,
    pub aliases: &'a [&'a str],
}

impl<'a> Field<'a> {
    pub const fn new(canonical: &'a str, aliases: &'a [&'a str]) -> Self {
        Field { canonical, aliases }
    }
}

pub struct ParamBag {
    value: Value,
}

impl ParamBag {
    pub fn new(value: Value) -> Self {
        let value = if value.is_object() { value } else { Value::Object(Default::default()) };
        ParamBag { value }
    }

    fn raw_str(v: &Value) -> Option<String> {
        match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Resolves a field across its aliases, enforcing equal-trimmed-value-or-
    /// conflict, and returns the trimmed raw string if any alias was present.
    fn resolve(&self, field: &Field) -> Result<Option<String>, ParamError> {
        let obj = self.value.as_object().expect("constructed as object");
        let mut found: Option<(&str, String)> = None;
        for alias in field.aliases {
            if let Some(v) = obj.get(*alias) {
                let Some(raw) = Self::raw_str(v) else {
                    continue;
                };
                let trimmed = raw.trim().to_string();
                match &found {
                    None => found = Some((alias, trimmed)),
                    Some((_, existing)) if existing == &trimmed => {}
                    Some((first_alias, existing)) => {
                        return Err(ParamError::Conflict(
                            field.canonical.to_string(),
                            format!("{first_alias}={existing}"),
                            format!("{alias}={trimmed}"),
                        ));
                    }
                }
            }
        }
        Ok(found.map(|(_, v)| v))
    }

    pub fn has_any(&self, field: &Field) -> bool {
        let obj = self.value.as_object().expect("constructed as object");
        field.aliases.iter().any(|a| obj.contains_key(*a))
    }

    pub fn required_str(&self, field: &Field) -> Result<String, ParamError> {
        match self.resolve(field)? {
            Some(v) if !v.is_empty() => Ok(v),
            Some(_) => Err(ParamError::Blank(field.canonical.to_string())),
            None => Err(ParamError::Missing(field.canonical.to_string())),
        }
    }

    pub fn optional_str(&self, field: &Field) -> Result<Option<String>, ParamError> {
        match self.resolve(field)? {
            Some(v) if !v.is_empty() => Ok(Some(v)),
            Some(_) => Err(ParamError::Blank(field.canonical.to_string())),
            None => Ok(None),
        }
    }

    /// Like [`Self::optional_str`] but a present-and-blank value is simply
    /// absent rather than an error (used for `select`, handled specially by
    /// the dispatcher's envelope layer instead).
    pub fn optional_str_allow_blank(&self, field: &Field) -> Result<Option<String>, ParamError> {
        self.resolve(field)
    }

    pub fn required_enum(&self, field: &Field, allowed: &[&str]) -> Result<String, ParamError> {
        let raw = self.required_str(field)?;
        allowed
            .iter()
            .find(|a| a.eq_ignore_ascii_case(&raw))
            .map(|a| a.to_string())
            .ok_or_else(|| ParamError::InvalidEnum(field.canonical.to_string(), raw))
    }

    pub fn optional_enum(&self, field: &Field, allowed: &[&str]) -> Result<Option<String>, ParamError> {
        match self.optional_str(field)? {
            None => Ok(None),
            Some(raw) => allowed
                .iter()
                .find(|a| a.eq_ignore_ascii_case(&raw))
                .map(|a| Some(a.to_string()))
                .ok_or(ParamError::InvalidEnum(field.canonical.to_string(), raw)),
        }
    }

    pub fn optional_bool(&self, field: &Field) -> Result<Option<bool>, ParamError> {
        let obj = self.value.as_object().expect("constructed as object");
        for alias in field.aliases {
            if let Some(v) = obj.get(*alias) {
                return Ok(Some(match v {
                    Value::Bool(b) => *b,
                    Value::String(s) => matches!(s.trim(), "1" | "true" | "True" | "TRUE"),
                    _ => false,
                }));
            }
        }
        Ok(None)
    }

    pub fn required_u64(&self, field: &Field) -> Result<u64, ParamError> {
        let raw = self.required_str(field)?;
        raw.parse::<u64>().map_err(|_| ParamError::NotNumeric(field.canonical.to_string()))
    }

    pub fn optional_u64(&self, field: &Field) -> Result<Option<u64>, ParamError> {
        match self.optional_str(field)? {
            None => Ok(None),
            Some(raw) => raw
                .parse::<u64>()
                .map(Some)
                .map_err(|_| ParamError::NotNumeric(field.canonical.to_string())),
        }
    }

    pub fn optional_f64(&self, field: &Field) -> Result<Option<f64>, ParamError> {
        match self.optional_str(field)? {
            None => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ParamError::NotNumeric(field.canonical.to_string())),
        }
    }

    /// A positive (non-zero), digits-only base-unit amount string.
    pub fn required_positive_integer_string(&self, field: &Field) -> Result<String, ParamError> {
        let raw = self.required_str(field)?;
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParamError::NotNumeric(field.canonical.to_string()));
        }
        if raw.bytes().all(|b| b == b'0') {
            return Err(ParamError::NotPositiveInteger(field.canonical.to_string()));
        }
        Ok(raw)
    }

    pub fn raw_value(&self, key: &str) -> Option<&Value> {
        self.value.as_object().expect("constructed as object").get(key)
    }

    pub fn assert_exclusive(&self, a: &Field, b: &Field) -> Result<(), ParamError> {
        if self.has_any(a) && self.has_any(b) {
            return Err(ParamError::MutuallyExclusive(
                a.canonical.to_string(),
                b.canonical.to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const AMOUNT: Field = Field::new("amount", &["amount", "amountIn", "amount_in"]);

    #[test]
    fn aliases_must_agree() {
        let bag = ParamBag::new(json!({"amount": "5", "amountIn": "5"}));
        assert_eq!(bag.required_str(&AMOUNT).unwrap(), "5");

        let bag = ParamBag::new(json!({"amount": "5", "amountIn": "6"}));
        assert!(matches!(bag.required_str(&AMOUNT), Err(ParamError::Conflict(..))));
    }

    #[test]
    fn trims_and_rejects_blank() {
        let bag = ParamBag::new(json!({"amount": "  5  "}));
        assert_eq!(bag.required_str(&AMOUNT).unwrap(), "5");

        let bag = ParamBag::new(json!({"amount": "   "}));
        assert!(matches!(bag.required_str(&AMOUNT), Err(ParamError::Blank(_))));

        let bag = ParamBag::new(json!({}));
        assert!(matches!(bag.required_str(&AMOUNT), Err(ParamError::Missing(_))));
    }

    #[test]
    fn positive_integer_string_rejects_non_digits_and_zero() {
        let field = Field::new("amount", &["amount"]);
        assert!(ParamBag::new(json!({"amount": "abc"})).required_positive_integer_string(&field).is_err());
        assert!(ParamBag::new(json!({"amount": "0"})).required_positive_integer_string(&field).is_err());
        assert_eq!(
            ParamBag::new(json!({"amount": " 1000000 "})).required_positive_integer_string(&field).unwrap(),
            "1000000"
        );
    }
}

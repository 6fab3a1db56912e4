use dimensional_model::{Attribute, Granularity};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{DataSchema, DataType, TranslationSettings};
use crate::{TranslationError, TranslationResult};

/// A factory call described as JSON, e.g.
/// `{"function": "filterFactory.members", "args": ["DM.Commerce.Gender", ["Female"]]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub function: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl FunctionCall {
    pub fn new(function: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            function: function.into(),
            args,
        }
    }

    /// Reads a nested call argument: an object with a string `function` member.
    pub fn from_json(value: &Value) -> Option<Self> {
        let function = value.get("function")?.as_str()?;
        let args = match value.get("args") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(args)) => args.clone(),
            Some(_) => return None,
        };
        Some(Self::new(function, args))
    }
}

/// Positional argument access for one call, reporting failures against that call.
pub(crate) struct Args<'a> {
    call: &'a FunctionCall,
    args: &'a [Value],
    pub(crate) schema: &'a DataSchema,
    pub(crate) settings: &'a TranslationSettings,
}

impl<'a> Args<'a> {
    /// Checks the argument count against `min..=max`.
    pub(crate) fn new(
        call: &'a FunctionCall,
        min: usize,
        max: usize,
        schema: &'a DataSchema,
        settings: &'a TranslationSettings,
    ) -> TranslationResult<Self> {
        let actual = call.args.len();
        let mut args = call.args.as_slice();
        if actual > max && settings.ignore_extra_args {
            log::warn!(
                "ignoring {} extra argument(s) of `{}`",
                actual - max,
                call.function
            );
            args = &args[..max];
        } else if actual < min || actual > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{min} to {max}")
            };
            return Err(TranslationError::WrongArity {
                function: call.function.clone(),
                expected,
                actual,
            });
        }
        Ok(Self {
            call,
            args,
            schema,
            settings,
        })
    }

    pub(crate) fn function(&self) -> &str {
        &self.call.function
    }

    pub(crate) fn len(&self) -> usize {
        self.args.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index).filter(|v| !v.is_null())
    }

    pub(crate) fn invalid(&self, index: usize, reason: impl Into<String>) -> TranslationError {
        TranslationError::InvalidArgument {
            function: self.call.function.clone(),
            index,
            reason: reason.into(),
        }
    }

    fn required(&self, index: usize) -> TranslationResult<&'a Value> {
        self.get(index)
            .ok_or_else(|| self.invalid(index, "missing value"))
    }

    pub(crate) fn string(&self, index: usize) -> TranslationResult<String> {
        self.required(index)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.invalid(index, "expected a string"))
    }

    pub(crate) fn optional_string(&self, index: usize) -> TranslationResult<Option<String>> {
        match self.get(index) {
            None => Ok(None),
            Some(_) => self.string(index).map(Some),
        }
    }

    pub(crate) fn number(&self, index: usize) -> TranslationResult<f64> {
        self.required(index)?
            .as_f64()
            .ok_or_else(|| self.invalid(index, "expected a number"))
    }

    pub(crate) fn integer(&self, index: usize) -> TranslationResult<i64> {
        self.required(index)?
            .as_i64()
            .ok_or_else(|| self.invalid(index, "expected an integer"))
    }

    pub(crate) fn count(&self, index: usize) -> TranslationResult<u32> {
        self.required(index)?
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| self.invalid(index, "expected a non-negative integer"))
    }

    /// A list of members. Numbers and booleans are accepted and stringified.
    pub(crate) fn members(&self, index: usize) -> TranslationResult<Vec<String>> {
        let Some(items) = self.required(index)?.as_array() else {
            return Err(self.invalid(index, "expected an array of members"));
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                Value::Bool(b) => Ok(b.to_string()),
                _ => Err(self.invalid(index, "members must be strings or numbers")),
            })
            .collect()
    }

    pub(crate) fn call(&self, index: usize) -> TranslationResult<FunctionCall> {
        FunctionCall::from_json(self.required(index)?)
            .ok_or_else(|| self.invalid(index, "expected a function call"))
    }

    pub(crate) fn calls(&self, index: usize) -> TranslationResult<Vec<FunctionCall>> {
        let Some(items) = self.required(index)?.as_array() else {
            return Err(self.invalid(index, "expected an array of function calls"));
        };
        items
            .iter()
            .map(|item| {
                FunctionCall::from_json(item)
                    .ok_or_else(|| self.invalid(index, "expected a function call"))
            })
            .collect()
    }

    pub(crate) fn attribute(&self, index: usize) -> TranslationResult<Attribute> {
        let path = self.string(index)?;
        resolve_attribute(&path, self.schema, self.settings)
    }
}

/// Resolves `<prefix>.<Table>.<Column>[.<Granularity>]` against `schema`. Names in the
/// result are the schema's spelling.
pub fn resolve_attribute(
    path: &str,
    schema: &DataSchema,
    settings: &TranslationSettings,
) -> TranslationResult<Attribute> {
    let unknown = || TranslationError::UnknownAttribute {
        path: path.to_string(),
    };

    let mut segments = path.split('.');
    if segments.next() != Some(settings.model_prefix.as_str()) {
        return Err(unknown());
    }
    let (Some(table), Some(column)) = (segments.next(), segments.next()) else {
        return Err(unknown());
    };
    let granularity = segments.next();
    if segments.next().is_some() {
        return Err(unknown());
    }

    let (table, column) = schema
        .find_column(table, column, settings)
        .ok_or_else(unknown)?;
    match (column.data_type, granularity) {
        (DataType::Text, None) => Ok(Attribute::text(&table.name, &column.name)),
        (DataType::Numeric, None) => Ok(Attribute::numeric(&table.name, &column.name)),
        (DataType::Datetime, Some(granularity)) => {
            let granularity: Granularity = granularity.parse()?;
            Ok(Attribute::date_level(&table.name, &column.name, granularity))
        }
        (DataType::Datetime, None) => Err(TranslationError::MissingGranularity {
            path: path.to_string(),
        }),
        (DataType::Text | DataType::Numeric, Some(_)) => Err(unknown()),
    }
}

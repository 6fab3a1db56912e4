use dimensional_model::{find_filter_by_guid, Filter, LogicalOperator};
use dimensional_relations::{FilterRelations, FilterRelationsNode, FiltersOrRelations};
use serde_json::Value;

use crate::call::{Args, FunctionCall};
use crate::config::{DataSchema, TranslationSettings};
use crate::filters::translate_filter;
use crate::{TranslationError, TranslationResult};

const LOGIC_AND: &str = "filterFactory.logic.and";
const LOGIC_OR: &str = "filterFactory.logic.or";

/// Translates a relations description into a public filter value.
///
/// `filterFactory.logic.and` / `filterFactory.logic.or` take two or more operands, folded
/// left to right. An operand is a nested logic call, a filter call, or the guid of one of
/// `filters`. A call that is not a logic call yields a single-filter list.
pub fn translate_filter_relations_json(
    call: &FunctionCall,
    filters: &[Filter],
    schema: &DataSchema,
    settings: &TranslationSettings,
) -> Result<FiltersOrRelations, Vec<TranslationError>> {
    let mut translator = RelationsTranslator {
        filters,
        schema,
        settings,
        errors: Vec::new(),
    };
    let node = translator.translate_call(call);
    if !translator.errors.is_empty() {
        return Err(translator.errors);
    }
    match node {
        Some(FilterRelationsNode::Relations(relations)) => {
            Ok(FiltersOrRelations::Relations(*relations))
        }
        Some(FilterRelationsNode::Filter(filter)) => Ok(FiltersOrRelations::Filters(vec![filter])),
        // Unreachable without an error having been recorded.
        None => Ok(FiltersOrRelations::default()),
    }
}

struct RelationsTranslator<'a> {
    filters: &'a [Filter],
    schema: &'a DataSchema,
    settings: &'a TranslationSettings,
    errors: Vec<TranslationError>,
}

impl RelationsTranslator<'_> {
    /// Translates one operand, recording its errors. Sibling operands are still visited so
    /// every error is reported.
    fn translate_call(&mut self, call: &FunctionCall) -> Option<FilterRelationsNode> {
        let operator = match call.function.as_str() {
            LOGIC_AND => LogicalOperator::And,
            LOGIC_OR => LogicalOperator::Or,
            _ => {
                return self
                    .record(translate_filter(call, self.schema, self.settings))
                    .map(FilterRelationsNode::Filter)
            }
        };

        let max = call.args.len().max(2);
        let args = self.record(Args::new(call, 2, max, self.schema, self.settings))?;
        let operands: Vec<Option<FilterRelationsNode>> = (0..args.len())
            .map(|index| self.translate_operand(&args, index))
            .collect();

        let mut operands = operands.into_iter().collect::<Option<Vec<_>>>()?.into_iter();
        let first = operands.next()?;
        Some(operands.fold(first, |left, right| {
            FilterRelations::new(left, right, operator).into()
        }))
    }

    fn translate_operand(&mut self, args: &Args<'_>, index: usize) -> Option<FilterRelationsNode> {
        match args.get(index) {
            Some(Value::String(guid)) => self
                .record(
                    find_filter_by_guid(self.filters, guid)
                        .cloned()
                        .ok_or_else(|| TranslationError::UnknownFilterReference {
                            guid: guid.clone(),
                        }),
                )
                .map(FilterRelationsNode::Filter),
            _ => {
                let call = self.record(args.call(index))?;
                self.translate_call(&call)
            }
        }
    }

    fn record<T>(&mut self, result: TranslationResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(err);
                None
            }
        }
    }
}

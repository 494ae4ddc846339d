//! engine facade: every operation with the configured language bound

use serde_json::{Map, Value};

use crate::command::{check_command, check_top_command, CommandType};
use crate::conditions::{
    check_condition, evaluate, parse_comparison, parse_condition, tag_to_value, Comparison, Condition,
    EvalContext, OpKind, Relation, Resolved, Root,
};
use crate::config::Settings;
use crate::error::Result;
use crate::i18n::Language;
use crate::query::{
    get_list_from_list, get_obj_from_list, get_obj_from_obj, get_value, get_values_from_list,
    parse_fields, parse_offset_and_limit, parse_order, FieldSpec, OrderSpec, PageSpec, RawFields,
    ValueField,
};

/// stateless entry point; cheap to copy and share between threads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engine {
    lang: Language,
}

impl Engine {
    pub fn new(settings: &Settings) -> Self {
        Self::with_language(settings.language)
    }

    pub fn with_language(lang: Language) -> Self {
        Self { lang }
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    /// evaluation context over `root` in this engine's language
    pub fn context<'a>(&self, root: &'a Root) -> EvalContext<'a> {
        EvalContext::new(root).with_language(self.lang)
    }

    pub fn parse_comparison(&self, kind: OpKind, key: &str, value: &Value) -> Result<Comparison> {
        parse_comparison(kind, key, value, self.lang)
    }

    pub fn parse_condition(&self, kind: OpKind, obj: &Value) -> Result<Condition> {
        parse_condition(kind, obj, Relation::And, self.lang)
    }

    pub fn parse_fields(&self, fields: Option<&Value>) -> Result<FieldSpec> {
        parse_fields(fields, self.lang)
    }

    pub fn parse_order(&self, order: Option<&Value>) -> Result<Vec<OrderSpec>> {
        parse_order(order, self.lang)
    }

    pub fn parse_offset_and_limit(&self, page: Option<&Value>, size: Option<&Value>) -> Result<PageSpec> {
        parse_offset_and_limit(page, size, self.lang)
    }

    pub fn tag_to_value(
        &self,
        tag: &str,
        root: &Root,
        parent: Option<&Value>,
        current: Option<&Value>,
    ) -> Result<Resolved> {
        let ctx = self.context(root).with_parent(parent).with_current(current);
        tag_to_value(tag, &ctx)
    }

    /// evaluate an already parsed condition
    pub fn evaluate(
        &self,
        condition: &Condition,
        root: &Root,
        parent: Option<&Value>,
        current: Option<&Value>,
    ) -> Result<bool> {
        let ctx = self.context(root).with_parent(parent).with_current(current);
        evaluate(condition, &ctx)
    }

    pub fn check_condition(
        &self,
        kind: OpKind,
        obj: &Value,
        relation: &str,
        root: &Root,
        parent: Option<&Value>,
        current: Option<&Value>,
    ) -> Result<bool> {
        let ctx = self.context(root).with_parent(parent).with_current(current);
        check_condition(kind, obj, relation, &ctx)
    }

    /// evaluate an `onlyIf` condition (compare vocabulary, `and` relation)
    pub fn only_if(&self, obj: &Value, root: &Root, parent: Option<&Value>) -> Result<bool> {
        self.check_condition(OpKind::Compare, obj, Relation::And.as_str(), root, parent, None)
    }

    pub fn get_value(&self, list: &[Value], field: &ValueField) -> Result<Value> {
        get_value(list, field, self.lang)
    }

    pub fn get_obj_from_obj(&self, record: &Value, raw: &RawFields) -> Result<Value> {
        get_obj_from_obj(record, raw, self.lang)
    }

    pub fn get_obj_from_list(
        &self,
        records: &[Value],
        query: Option<&Value>,
        raw: &RawFields,
        root: &Root,
        parent: Option<&Value>,
    ) -> Result<Value> {
        get_obj_from_list(records, query, raw, &self.context(root).with_parent(parent))
    }

    pub fn get_list_from_list(
        &self,
        records: &[Value],
        query: Option<&Value>,
        raw: &RawFields,
        root: &Root,
        parent: Option<&Value>,
    ) -> Result<Option<Vec<Value>>> {
        get_list_from_list(records, query, raw, &self.context(root).with_parent(parent))
    }

    pub fn get_values_from_list(&self, records: &[Value], values: &[ValueField]) -> Result<Map<String, Value>> {
        get_values_from_list(records, values, self.lang)
    }

    pub fn check_command(&self, cmd: &Value) -> Result<CommandType> {
        check_command(cmd, self.lang)
    }

    pub fn check_top_command(&self, cmd: &Value) -> Result<CommandType> {
        check_top_command(cmd, self.lang)
    }
}

//! engine error types
//!
//! errors are categorical. each layer (parser, resolver, comparator,
//! evaluator, materializer) wraps whatever it receives into its own kind and
//! keeps the original as `source`, so the innermost kind is always reachable
//! through [`Error::root_kind`].
//!
//! `TagRefNotFilled` is special: it is the signal that a cross-entity
//! reference points at an entity the scheduler has not fetched yet. the
//! missing entity name travels as structured data ([`Error::needs_ref`]) so
//! the caller can fetch it and retry.

use std::fmt;

use thiserror::Error;

/// error categories raised by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// malformed condition object or relation
    ConditionDef,
    /// unknown operator or operator not applicable to its operands
    OperatorDef,
    /// malformed tag or invalid path inside a tag
    TagDef,
    /// malformed `fields` definition
    FieldsDef,
    /// malformed `order` definition
    OrderDef,
    /// malformed `size`, or `page` without `size`
    SizeDef,
    /// malformed `page`
    PageDef,
    /// unsupported query parameter
    QueryDef,
    /// command-level definition problem (e.g. values query without fields)
    CmdDef,
    /// command shape check failed
    CommandDef,
    /// cross-entity reference to an entity that has not been fetched
    TagRefNotFilled,
    /// projected field missing from the record
    FieldNotExist,
    /// aggregation over values of the wrong type
    ValueCalculation,

    // layer wrappers
    ComparisonParser,
    FieldsParser,
    OrderParser,
    QueryParser,
    ConditionCal,
    Compare,
    TagToValue,
    ValuesCal,
    DealRef,
}

impl ErrorKind {
    /// stable error name, used in CLI output and logs
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::ConditionDef => "ConditionDefError",
            ErrorKind::OperatorDef => "OperatorDefError",
            ErrorKind::TagDef => "TagDefError",
            ErrorKind::FieldsDef => "FieldsDefError",
            ErrorKind::OrderDef => "OrderDefError",
            ErrorKind::SizeDef => "SizeDefError",
            ErrorKind::PageDef => "PageDefError",
            ErrorKind::QueryDef => "QueryDefError",
            ErrorKind::CmdDef => "CmdDefError",
            ErrorKind::CommandDef => "CommandError",
            ErrorKind::TagRefNotFilled => "TagRefNotFilled",
            ErrorKind::FieldNotExist => "FieldNotExistError",
            ErrorKind::ValueCalculation => "ValueCalculationError",
            ErrorKind::ComparisonParser => "ComparisonParserError",
            ErrorKind::FieldsParser => "FieldsParserError",
            ErrorKind::OrderParser => "OrderParserError",
            ErrorKind::QueryParser => "QueryParserError",
            ErrorKind::ConditionCal => "ConditionCalError",
            ErrorKind::Compare => "CompareError",
            ErrorKind::TagToValue => "Tag2ValueError",
            ErrorKind::ValuesCal => "ValuesCalError",
            ErrorKind::DealRef => "DealRefError",
        }
    }

    /// true for the per-layer wrapper kinds
    pub fn is_wrapper(&self) -> bool {
        matches!(
            self,
            ErrorKind::ComparisonParser
                | ErrorKind::FieldsParser
                | ErrorKind::OrderParser
                | ErrorKind::QueryParser
                | ErrorKind::ConditionCal
                | ErrorKind::Compare
                | ErrorKind::TagToValue
                | ErrorKind::ValuesCal
                | ErrorKind::DealRef
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// error returned by every engine operation
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    needs_ref: Option<String>,
    suggestions: Vec<String>,
    #[source]
    cause: Option<Box<Error>>,
}

/// result alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            needs_ref: None,
            suggestions: Vec::new(),
            cause: None,
        }
    }

    /// dependency signal: `entity` must be fetched before evaluation can continue
    pub fn ref_not_filled(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            needs_ref: Some(entity.into()),
            ..Self::new(ErrorKind::TagRefNotFilled, message)
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// wrap this error into an outer layer error of `kind`
    pub fn wrap(self, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            cause: Some(Box::new(self)),
            ..Self::new(kind, message)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_deref()
    }

    /// iterate from this error down to the innermost cause
    pub fn chain(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(Some(self), |e| e.cause())
    }

    /// the innermost (originating) error
    pub fn root(&self) -> &Error {
        self.chain().last().unwrap_or(self)
    }

    /// kind of the originating error, ignoring layer wrappers
    pub fn root_kind(&self) -> ErrorKind {
        self.root().kind
    }

    /// name of the entity that must be fetched before retrying, if any
    pub fn needs_ref(&self) -> Option<&str> {
        self.chain().find_map(|e| e.needs_ref.as_deref())
    }

    pub fn is_ref_not_filled(&self) -> bool {
        self.chain().any(|e| e.kind == ErrorKind::TagRefNotFilled)
    }

    /// suggestions from anywhere in the chain
    pub fn all_suggestions(&self) -> Vec<String> {
        self.chain()
            .flat_map(|e| e.suggestions.iter().cloned())
            .collect()
    }

    /// full message including every cause, outermost first
    pub fn full_message(&self) -> String {
        self.chain()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(" <= ")
    }
}

/// adds layer wrapping to engine results
pub(crate) trait ResultExt<T> {
    fn wrap_err<F>(self, kind: ErrorKind, message: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn wrap_err<F>(self, kind: ErrorKind, message: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.wrap(kind, message()))
    }
}

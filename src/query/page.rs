//! `page` / `size` to offset and limit

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, ErrorKind, Result, ResultExt};
use crate::i18n::Language;

/// slice of a record list; `limit == 0` means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PageSpec {
    pub offset: usize,
    pub limit: usize,
}

impl PageSpec {
    /// apply the slice; out of range indices are dropped
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.offset);
        if self.limit > 0 {
            iter.take(self.limit).collect()
        } else {
            iter.collect()
        }
    }
}

/// compute offset and limit from `page` and `size`
///
/// - neither: `{0, 0}`
/// - only `size`: `{0, size}`
/// - only `page`: error, a page needs a size
/// - both: `{(page - 1) * size, size}`
///
/// a JSON `null` counts as omitted.
pub fn parse_offset_and_limit(page: Option<&Value>, size: Option<&Value>, lang: Language) -> Result<PageSpec> {
    let page = page.filter(|v| !v.is_null());
    let size = size.filter(|v| !v.is_null());

    compute(page, size, lang).wrap_err(ErrorKind::QueryParser, || {
        lang.text("解析 page 和 size 出错", "Error occurred while parsing 'page' and 'size'")
    })
}

fn compute(page: Option<&Value>, size: Option<&Value>, lang: Language) -> Result<PageSpec> {
    match (page, size) {
        (None, None) => Ok(PageSpec::default()),
        (None, Some(size)) => Ok(PageSpec {
            offset: 0,
            limit: parse_size(size, lang)?,
        }),
        (Some(_), None) => Err(Error::new(
            ErrorKind::SizeDef,
            lang.text(
                "如果定义了 'page'，也必须定义 'size'",
                "If you have defined a 'page', one 'size' definition is required too",
            ),
        )),
        (Some(page), Some(size)) => {
            let size = parse_size(size, lang)?;
            let page = whole_number(page)
                .filter(|n| *n >= 1)
                .ok_or_else(|| {
                    Error::new(
                        ErrorKind::PageDef,
                        lang.text(
                            "'page' 参数必须是一个大于 0 的整数",
                            "'page' definition must be an Integer greater than 0",
                        ),
                    )
                })?;
            Ok(PageSpec {
                offset: (page - 1).saturating_mul(size),
                limit: size,
            })
        }
    }
}

/// a non-negative integer, written either as an integer or as a float with
/// no fractional part such as `2.0`
fn whole_number(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64 {
        Some(f as usize)
    } else {
        None
    }
}

fn parse_size(size: &Value, lang: Language) -> Result<usize> {
    whole_number(size)
        .ok_or_else(|| {
            Error::new(
                ErrorKind::SizeDef,
                lang.text(
                    "'size' 参数必须是一个非负整数",
                    "'size' definition must be a non-negative Integer",
                ),
            )
        })
}

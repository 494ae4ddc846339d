//! post-fetch materialization: projection, filtering, ordering, paging and
//! aggregation over records that are already in memory

mod fields;
mod order;
mod page;
mod reference;
mod values;

pub use fields::{parse_fields, FieldSpec, RawField, RawFields, ValueField};
pub use order::{parse_order, sort_records, Direction, OrderSpec};
pub use page::{parse_offset_and_limit, PageSpec};
pub use reference::{get_list_from_list, get_obj_from_list, get_obj_from_obj, get_values_from_list};
pub use values::get_value;

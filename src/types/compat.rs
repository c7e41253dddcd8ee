//! Type compatibility between an output port and an input port.

use super::TypeTag;

/// Targets each source type may connect to. This table is the whole rule set:
/// identity, `Any` on either side, and `int` widening into `float`.
pub fn compatible_targets(source: TypeTag) -> &'static [TypeTag] {
    use TypeTag::*;

    match source {
        Table => &[Table, Any],
        Int => &[Int, Float, Any],
        Float => &[Float, Any],
        Str => &[Str, Any],
        Bool => &[Bool, Any],
        TableList => &[TableList, Any],
        Any => &[Table, Int, Float, Str, Bool, TableList, Any],
    }
}

pub fn is_compatible(source: TypeTag, target: TypeTag) -> bool {
    compatible_targets(source).contains(&target)
}

//! Last-octet ordering of result lists.

use crate::types::Target;

/// Sort targets by the numeric value of their last octet.
///
/// The sort is stable: targets sharing a last octet keep their order.
pub fn sort_by_last_octet(targets: &mut [Target]) {
    targets.sort_by_key(Target::last_octet);
}

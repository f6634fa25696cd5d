//! Arena ids for analysis entities.

use serde::Serialize;

macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
            pub struct $name(pub u32);

            impl $name {
                #[inline]
                pub(crate) fn index(self) -> usize {
                    self.0 as usize
                }
            }
        )*
    };
}

define_id!(
    /// A lexical scope (program or function body).
    ScopeId,
    /// A binding, closure slot, return slot or shadow chain.
    VariableId,
    /// An assignment or use recorded on a chain.
    StatementId,
    /// A value snapshot or chain value.
    ValueId,
    /// A conditional branch.
    ConditionalId,
    /// Handle of a registered reduction rule.
    RuleId,
);

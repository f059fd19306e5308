//! Union and type-variable subtype checking.
//!
//! - A union source must fit the target member by member.
//! - A union target accepts a source that fits at least one member.
//! - A type variable stands for an unknown subtype of its bound, so it can
//!   be proven a subtype only through its bound (or by appearing in the
//!   target), and can never be proven a supertype of anything but itself.

use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{TypeData, TypeId, TypeListId, TypeParamInfo};

impl<'a> SubtypeChecker<'a> {
    /// `A | B <: T` iff `A <: T` and `B <: T`.
    pub(crate) fn check_union_source(
        &mut self,
        members: TypeListId,
        target: TypeId,
    ) -> SubtypeResult {
        let members = self.interner.type_list(members);
        let mut result = SubtypeResult::True;
        for &member in members.iter() {
            result = result.and(self.check(member, target));
            if result.is_false() {
                break;
            }
        }
        result
    }

    /// `S <: A | B` iff `S <: A` or `S <: B`.
    pub(crate) fn check_union_target(
        &mut self,
        source: TypeId,
        members: TypeListId,
    ) -> SubtypeResult {
        let members = self.interner.type_list(members);
        let mut result = SubtypeResult::False;
        for &member in members.iter() {
            result = result.or(self.check(source, member));
            if result.is_true() {
                break;
            }
        }
        result
    }

    /// A type variable on the left.
    ///
    /// `T <: U | T` holds through membership. Otherwise a bounded variable is
    /// a subtype of whatever its bound is a subtype of; an unbounded one
    /// cannot be decided.
    pub(crate) fn check_type_var_source(
        &mut self,
        source: TypeId,
        info: TypeParamInfo,
        target_data: TypeData,
        target: TypeId,
    ) -> SubtypeResult {
        let by_member = match target_data {
            TypeData::Union(members) => self.check_union_target(source, members),
            _ => SubtypeResult::False,
        };
        if by_member.is_true() {
            return by_member;
        }

        let by_bound = match info.bound {
            Some(bound) => self.check(bound, target),
            None => SubtypeResult::Unknown,
        };
        by_member.or(by_bound)
    }

    /// A type variable on the right, other than the source itself.
    ///
    /// The variable may be instantiated with anything inside its bound, so
    /// the best this can do is refute: a source that is not even a subtype
    /// of the bound is not a subtype of the variable.
    pub(crate) fn check_type_var_target(
        &mut self,
        source: TypeId,
        info: TypeParamInfo,
    ) -> SubtypeResult {
        match info.bound {
            Some(bound) if self.check(source, bound).is_false() => SubtypeResult::False,
            _ => SubtypeResult::Unknown,
        }
    }
}

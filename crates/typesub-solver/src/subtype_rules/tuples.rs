//! Tuple and callable subtype checking.
//!
//! Tuples come in two forms: fixed (`tuple[int, str]`, `tuple[()]`) and
//! variadic (`tuple[int, ...]`, a single `Variadic` argument).
//!
//! Callables are `[parameters, return]` where the parameters are either a
//! fixed `Params` list or `Variadic(Any)` for `...`.

use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{TypeData, TypeId, TypeListId};

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_tuples(&mut self, left: &[TypeId], right: &[TypeId]) -> SubtypeResult {
        match (self.variadic_element(left), self.variadic_element(right)) {
            (None, Some(element)) => self.check_all(left, element),
            (None, None) => {
                if left.len() != right.len() {
                    return SubtypeResult::False;
                }
                self.check_pairwise(left, right)
            }
            (Some(left_element), Some(right_element)) => self.check(left_element, right_element),
            // A tuple of unknown length is not a fixed-length tuple, unless
            // nothing is known about it at all.
            (Some(left_element), None) => {
                if left_element.is_any() {
                    SubtypeResult::Unknown
                } else {
                    SubtypeResult::False
                }
            }
        }
    }

    pub(crate) fn check_callables(&mut self, left: &[TypeId], right: &[TypeId]) -> SubtypeResult {
        let ([left_params, left_ret], [right_params, right_ret]) = (left, right) else {
            return SubtypeResult::Unknown;
        };

        let ret = self.check(*left_ret, *right_ret);
        if ret.is_false() {
            return ret;
        }

        let params = match (
            self.interner.lookup(*left_params),
            self.interner.lookup(*right_params),
        ) {
            (Some(TypeData::Variadic(_)), _) | (_, Some(TypeData::Variadic(_))) => {
                SubtypeResult::True
            }
            (Some(TypeData::Params(left_list)), Some(TypeData::Params(right_list))) => {
                self.check_params(left_list, right_list)
            }
            _ => SubtypeResult::Unknown,
        };
        ret.and(params)
    }

    /// Parameter lists are contravariant: every target parameter must be
    /// accepted by the source parameter in the same position.
    pub(crate) fn check_params(&mut self, left: TypeListId, right: TypeListId) -> SubtypeResult {
        let left = self.interner.type_list(left);
        let right = self.interner.type_list(right);
        if left.len() != right.len() {
            return SubtypeResult::False;
        }
        self.check_pairwise(&right, &left)
    }

    fn check_all(&mut self, elements: &[TypeId], target: TypeId) -> SubtypeResult {
        let mut result = SubtypeResult::True;
        for &element in elements {
            result = result.and(self.check(element, target));
            if result.is_false() {
                break;
            }
        }
        result
    }

    fn check_pairwise(&mut self, left: &[TypeId], right: &[TypeId]) -> SubtypeResult {
        let mut result = SubtypeResult::True;
        for (&l, &r) in left.iter().zip(right) {
            result = result.and(self.check(l, r));
            if result.is_false() {
                break;
            }
        }
        result
    }
}

//! Generic origin subtype checking.
//!
//! Two generic nodes are related when the target origin is the source origin
//! itself or one of its capabilities. Capability entries project the source
//! arguments onto the target's slots (`dict[K, V]` as `Iterable[K]`,
//! `Counter[T]` as `Mapping[T, int]`, `tuple[A, B]` as `Sequence[A | B]`);
//! the projected slots are then compared under the target origin's variance.
//!
//! An unparameterized origin compares as if every slot held `Any`.

use crate::origins::{ArgShape, OriginDef, Projection, Variance};
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{TypeData, TypeId, TypeListId};
use smallvec::{SmallVec, smallvec};
use tracing::trace;
use typesub_common::Atom;

pub(crate) type Args = SmallVec<[TypeId; 4]>;

/// One projected capability slot.
enum Slot {
    One(TypeId),
    /// Every element must fit the slot.
    AllOf(Args),
}

impl<'a> SubtypeChecker<'a> {
    /// A class on the left, a generic origin on the right.
    ///
    /// A class that nominally derives from the origin is compared as that
    /// origin with `Any` arguments.
    pub(crate) fn check_class_against_generic(
        &mut self,
        class: Atom,
        origin: Atom,
        args: Option<TypeListId>,
    ) -> SubtypeResult {
        let class_name = self.interner.resolve_atom_ref(class);
        let origin_name = self.interner.resolve_atom_ref(origin);
        match self.hierarchy.is_nominal_subtype(&class_name, &origin_name) {
            Some(true) => self.check_generics(origin, None, origin, args),
            Some(false) => SubtypeResult::False,
            None => SubtypeResult::Unknown,
        }
    }

    /// A generic origin on the left, a class on the right.
    pub(crate) fn check_generic_against_class(
        &mut self,
        origin: Atom,
        class: Atom,
    ) -> SubtypeResult {
        if origin == class {
            return SubtypeResult::True;
        }
        let origin_name = self.interner.resolve_atom_ref(origin);
        let class_name = self.interner.resolve_atom_ref(class);
        let has_capability = self
            .origins
            .get(&origin_name)
            .is_some_and(|def| def.capability(&class_name).is_some());
        if has_capability {
            return SubtypeResult::True;
        }
        self.check_nominal(origin, class)
    }

    /// Both sides generic (or unparameterized).
    pub(crate) fn check_generics(
        &mut self,
        left_origin: Atom,
        left_args: Option<TypeListId>,
        right_origin: Atom,
        right_args: Option<TypeListId>,
    ) -> SubtypeResult {
        let origins = self.origins;
        let left_name = self.interner.resolve_atom_ref(left_origin);
        let right_name = self.interner.resolve_atom_ref(right_origin);
        let (Some(left_def), Some(right_def)) = (origins.get(&left_name), origins.get(&right_name))
        else {
            return SubtypeResult::Unknown;
        };

        let left_args = self.slot_args(left_def, left_args);
        let right_args = self.slot_args(right_def, right_args);

        if left_origin == right_origin {
            return match right_def.shape {
                ArgShape::Fixed(_) => {
                    let slots = left_args.iter().map(|&arg| Slot::One(arg)).collect();
                    self.check_slots(right_def, slots, &right_args)
                }
                ArgShape::Tuple => self.check_tuples(&left_args, &right_args),
                ArgShape::Callable => self.check_callables(&left_args, &right_args),
            };
        }

        let Some(capability) = left_def.capability(&right_name) else {
            trace!(
                left = %left_name,
                right = %right_name,
                "origin has no such capability"
            );
            return SubtypeResult::False;
        };

        let slots = capability
            .args
            .iter()
            .map(|projection| self.project(projection, &left_args))
            .collect();
        self.check_slots(right_def, slots, &right_args)
    }

    /// Argument list of an origin, expanding the unparameterized form.
    fn slot_args(&self, def: &OriginDef, args: Option<TypeListId>) -> Args {
        if let Some(args) = args {
            return self.interner.type_list(args).iter().copied().collect();
        }
        match &def.shape {
            ArgShape::Fixed(variances) => smallvec![TypeId::ANY; variances.len()],
            ArgShape::Tuple => smallvec![self.interner.variadic(TypeId::ANY)],
            ArgShape::Callable => smallvec![self.interner.variadic(TypeId::ANY), TypeId::ANY],
        }
    }

    fn project(&self, projection: &Projection, args: &[TypeId]) -> Slot {
        match projection {
            Projection::Arg(index) => Slot::One(args.get(*index).copied().unwrap_or(TypeId::ANY)),
            Projection::Class(name) => Slot::One(self.interner.plain(name)),
            Projection::Elements => Slot::AllOf(self.tuple_elements(args)),
        }
    }

    /// Elements of a tuple argument list; a variadic tuple contributes its
    /// element type.
    pub(crate) fn tuple_elements(&self, args: &[TypeId]) -> Args {
        match self.variadic_element(args) {
            Some(element) => smallvec![element],
            None => args.iter().copied().collect(),
        }
    }

    pub(crate) fn variadic_element(&self, args: &[TypeId]) -> Option<TypeId> {
        match args {
            [single] => match self.interner.lookup(*single) {
                Some(TypeData::Variadic(element)) => Some(element),
                _ => None,
            },
            _ => None,
        }
    }

    fn check_slots(
        &mut self,
        target: &OriginDef,
        slots: Vec<Slot>,
        target_args: &[TypeId],
    ) -> SubtypeResult {
        if slots.len() != target_args.len() {
            return SubtypeResult::Unknown;
        }

        let mut result = SubtypeResult::True;
        for (index, (slot, &target_arg)) in slots.into_iter().zip(target_args).enumerate() {
            let variance = target.variance(index);
            let slot_result = match slot {
                Slot::One(arg) => self.check_variance(variance, arg, target_arg),
                Slot::AllOf(elements) => {
                    let mut all = SubtypeResult::True;
                    for element in elements {
                        all = all.and(self.check_variance(variance, element, target_arg));
                        if all.is_false() {
                            break;
                        }
                    }
                    all
                }
            };
            result = result.and(slot_result);
            if result.is_false() {
                break;
            }
        }
        result
    }

    fn check_variance(&mut self, variance: Variance, left: TypeId, right: TypeId) -> SubtypeResult {
        match variance {
            Variance::Covariant => self.check(left, right),
            Variance::Contravariant => self.check(right, left),
            Variance::Invariant if !self.policy.strict_invariance => self.check(left, right),
            Variance::Invariant => {
                if left == right {
                    SubtypeResult::True
                } else if left.is_any() || right.is_any() {
                    SubtypeResult::Unknown
                } else {
                    SubtypeResult::False
                }
            }
        }
    }
}

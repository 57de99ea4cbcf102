//! Comparator registry: one total-order comparison per value discriminant.
//!
//! A comparator is selected once, when a predicate is compiled, and stored in
//! the predicate node. Evaluation never re-dispatches on the discriminant.
//!
//! | discriminant          | order                                  |
//! |-----------------------|----------------------------------------|
//! | `string`              | lexicographic over UTF-8 bytes         |
//! | `int32`/`int64`       | signed numeric                         |
//! | `uint`                | unsigned numeric                       |
//! | `bool`                | as integers (`false` = 0, `true` = 1)  |
//! | `float`/`double`      | IEEE-754; NaN is unordered             |

use std::cmp::Ordering;
use std::fmt;

use triplex_dsl::{TypedValue, ValueType};

/// Comparison function for values of one discriminant.
///
/// `compare` returns `None` when the two values are unordered: either operand
/// is NaN, or the operands do not both carry `value_type()`. Callers treat
/// `None` as "no match".
pub trait ValueComparator: fmt::Debug + Send + Sync {
    fn value_type(&self) -> ValueType;

    fn compare(&self, lhs: &TypedValue, rhs: &TypedValue) -> Option<Ordering>;
}

// ============================================================================
// Per-discriminant comparators
// ============================================================================

#[derive(Debug)]
pub struct StringComparator;

impl ValueComparator for StringComparator {
    fn value_type(&self) -> ValueType {
        ValueType::String
    }

    fn compare(&self, lhs: &TypedValue, rhs: &TypedValue) -> Option<Ordering> {
        match (lhs, rhs) {
            (TypedValue::String(a), TypedValue::String(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct BoolComparator;

impl ValueComparator for BoolComparator {
    fn value_type(&self) -> ValueType {
        ValueType::Bool
    }

    fn compare(&self, lhs: &TypedValue, rhs: &TypedValue) -> Option<Ordering> {
        match (lhs, rhs) {
            (TypedValue::Bool(a), TypedValue::Bool(b)) => Some(u8::from(*a).cmp(&u8::from(*b))),
            _ => None,
        }
    }
}

macro_rules! ordered_comparator {
    ($name:ident, $variant:ident, $compare:path) => {
        #[derive(Debug)]
        pub struct $name;

        impl ValueComparator for $name {
            fn value_type(&self) -> ValueType {
                ValueType::$variant
            }

            fn compare(&self, lhs: &TypedValue, rhs: &TypedValue) -> Option<Ordering> {
                match (lhs, rhs) {
                    (TypedValue::$variant(a), TypedValue::$variant(b)) => $compare(a, b),
                    _ => None,
                }
            }
        }
    };
}

fn total_order<T: Ord>(a: &T, b: &T) -> Option<Ordering> {
    Some(a.cmp(b))
}

ordered_comparator!(Int32Comparator, Int32, total_order);
ordered_comparator!(Int64Comparator, Int64, total_order);
ordered_comparator!(UIntComparator, UInt, total_order);
ordered_comparator!(FloatComparator, Float, PartialOrd::partial_cmp);
ordered_comparator!(DoubleComparator, Double, PartialOrd::partial_cmp);

/// The comparator for `ty`. Total over every declared discriminant.
pub fn comparator_for(ty: ValueType) -> &'static dyn ValueComparator {
    match ty {
        ValueType::String => &StringComparator,
        ValueType::Int32 => &Int32Comparator,
        ValueType::Int64 => &Int64Comparator,
        ValueType::UInt => &UIntComparator,
        ValueType::Bool => &BoolComparator,
        ValueType::Float => &FloatComparator,
        ValueType::Double => &DoubleComparator,
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Discriminant → comparator table consulted by the filter compiler.
///
/// `standard()` is total. Reduced registries (`without`) exist for hosts that
/// want to refuse some value kinds at compile time.
#[derive(Clone)]
pub struct ComparatorRegistry {
    slots: [Option<&'static dyn ValueComparator>; ValueType::COUNT],
}

impl ComparatorRegistry {
    pub fn standard() -> Self {
        let mut slots: [Option<&'static dyn ValueComparator>; ValueType::COUNT] =
            [None; ValueType::COUNT];
        for ty in ValueType::ALL {
            slots[ty.index()] = Some(comparator_for(ty));
        }
        Self { slots }
    }

    pub fn empty() -> Self {
        Self {
            slots: [None; ValueType::COUNT],
        }
    }

    /// A copy of this registry with `ty` unregistered.
    pub fn without(mut self, ty: ValueType) -> Self {
        self.slots[ty.index()] = None;
        self
    }

    /// A copy of this registry with `comparator` registered for its discriminant.
    pub fn with(mut self, comparator: &'static dyn ValueComparator) -> Self {
        self.slots[comparator.value_type().index()] = Some(comparator);
        self
    }

    pub fn get(&self, ty: ValueType) -> Option<&'static dyn ValueComparator> {
        self.slots[ty.index()]
    }

    pub fn is_total(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }
}

impl Default for ComparatorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for ComparatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<ValueType> = ValueType::ALL
            .into_iter()
            .filter(|ty| self.get(*ty).is_some())
            .collect();
        f.debug_struct("ComparatorRegistry")
            .field("registered", &registered)
            .finish()
    }
}

//! Typed ancestor lists for [`BindingGraph::connect`](crate::BindingGraph::connect)

use smallvec::{smallvec, SmallVec};

use crate::binding::{Binding, BindingId};
use crate::value::{PropertyValue, Value};

/// A set of bindings a transform reads from, and the typed shape the
/// transform receives their values in
pub trait Ancestors: 'static {
    type Values;

    /// Ancestor ids, in the order the transform sees them
    fn ids(&self) -> SmallVec<[BindingId; 4]>;

    /// Convert raw ancestor values (same order as `ids`) into the typed shape
    fn values(values: &[Value]) -> Self::Values;
}

fn arg<T: PropertyValue>(values: &[Value], index: usize) -> T {
    values
        .get(index)
        .cloned()
        .map(T::coerce)
        .unwrap_or_else(T::default_value)
}

impl<A: PropertyValue> Ancestors for Binding<A> {
    type Values = A;

    fn ids(&self) -> SmallVec<[BindingId; 4]> {
        smallvec![self.id()]
    }

    fn values(values: &[Value]) -> A {
        arg(values, 0)
    }
}

impl<A: PropertyValue> Ancestors for Vec<Binding<A>> {
    type Values = Vec<A>;

    fn ids(&self) -> SmallVec<[BindingId; 4]> {
        self.iter().map(Binding::id).collect()
    }

    fn values(values: &[Value]) -> Vec<A> {
        values.iter().cloned().map(A::coerce).collect()
    }
}

macro_rules! impl_ancestors_tuple {
    ($($name:ident => $index:tt),+) => {
        impl<$($name: PropertyValue),+> Ancestors for ($(Binding<$name>,)+) {
            type Values = ($($name,)+);

            fn ids(&self) -> SmallVec<[BindingId; 4]> {
                smallvec![$(self.$index.id()),+]
            }

            fn values(values: &[Value]) -> Self::Values {
                ($(arg::<$name>(values, $index),)+)
            }
        }
    };
}

impl_ancestors_tuple!(A => 0);
impl_ancestors_tuple!(A => 0, B => 1);
impl_ancestors_tuple!(A => 0, B => 1, C => 2);
impl_ancestors_tuple!(A => 0, B => 1, C => 2, D => 3);

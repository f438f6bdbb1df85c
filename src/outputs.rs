//! Typed result tuples.
//!
//! A [`Request`](crate::request::Request) tracks the output types of its
//! aggregates as a tuple type that grows by one element per `add`. [`Append`]
//! computes the grown tuple type and [`Outputs`] reads a finished
//! [`Outcome`] back into that tuple, position by position. Both are
//! implemented for tuples of up to 16 elements; beyond that, use a
//! [`Plan`](crate::plan::Plan) and positional access directly.

use std::any::Any;

use crate::core::Result;
use crate::plan::Outcome;

/// Type-level append: `(A, B)` + `C` = `(A, B, C)`.
pub trait Append<Next> {
    type Output;
}

/// A tuple of aggregate outputs that can be read from an [`Outcome`].
pub trait Outputs: Sized {
    /// The same tuple with every element borrowed
    type Refs<'a>
    where
        Self: 'a;

    /// Borrow every result, in order; fails with the first failing slot.
    fn refs(outcome: &Outcome) -> Result<Self::Refs<'_>>;

    /// Move every result out, in order; fails with the first failing slot.
    fn take(outcome: Outcome) -> Result<Self>;
}

impl<Next> Append<Next> for () {
    type Output = (Next,);
}

impl Outputs for () {
    type Refs<'a> = ();

    fn refs(_outcome: &Outcome) -> Result<()> {
        Ok(())
    }

    fn take(_outcome: Outcome) -> Result<()> {
        Ok(())
    }
}

macro_rules! tuple_append {
    ($($name:ident),+) => {
        impl<$($name,)+ Next> Append<Next> for ($($name,)+) {
            type Output = ($($name,)+ Next,);
        }
    };
}

macro_rules! tuple_outputs {
    ($($name:ident $idx:tt),+) => {
        impl<$($name),+> Outputs for ($($name,)+)
        where
            $($name: Any + Send + Sync,)+
        {
            type Refs<'a> = ($(&'a $name,)+) where Self: 'a;

            fn refs(outcome: &Outcome) -> Result<Self::Refs<'_>> {
                Ok(($(outcome.get::<$name>($idx)?,)+))
            }

            fn take(mut outcome: Outcome) -> Result<Self> {
                Ok(($(outcome.take::<$name>($idx)?,)+))
            }
        }
    };
}

tuple_append!(A);
tuple_append!(A, B);
tuple_append!(A, B, C);
tuple_append!(A, B, C, D);
tuple_append!(A, B, C, D, E);
tuple_append!(A, B, C, D, E, F);
tuple_append!(A, B, C, D, E, F, G);
tuple_append!(A, B, C, D, E, F, G, H);
tuple_append!(A, B, C, D, E, F, G, H, I);
tuple_append!(A, B, C, D, E, F, G, H, I, J);
tuple_append!(A, B, C, D, E, F, G, H, I, J, K);
tuple_append!(A, B, C, D, E, F, G, H, I, J, K, L);
tuple_append!(A, B, C, D, E, F, G, H, I, J, K, L, M);
tuple_append!(A, B, C, D, E, F, G, H, I, J, K, L, M, N);
tuple_append!(A, B, C, D, E, F, G, H, I, J, K, L, M, N, O);

tuple_outputs!(A 0);
tuple_outputs!(A 0, B 1);
tuple_outputs!(A 0, B 1, C 2);
tuple_outputs!(A 0, B 1, C 2, D 3);
tuple_outputs!(A 0, B 1, C 2, D 3, E 4);
tuple_outputs!(A 0, B 1, C 2, D 3, E 4, F 5);
tuple_outputs!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
tuple_outputs!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
tuple_outputs!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8);
tuple_outputs!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9);
tuple_outputs!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10);
tuple_outputs!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11);
tuple_outputs!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11, M 12);
tuple_outputs!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11, M 12, N 13);
tuple_outputs!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11, M 12, N 13, O 14);
tuple_outputs!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11, M 12, N 13, O 14, P 15);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Plan;
    use crate::sinks::{Count, HasDuplicates, Min};

    fn assert_appends<T: Append<N, Output = R>, N, R>() {}

    #[test]
    fn append_grows_tuples() {
        assert_appends::<(), u8, (u8,)>();
        assert_appends::<(u8,), bool, (u8, bool)>();
        assert_appends::<(u8, bool), String, (u8, bool, String)>();
    }

    #[test]
    fn refs_and_take_read_in_order() {
        let outcome = Plan::new(vec![3, 1, 3])
            .with(HasDuplicates::<i32>::new())
            .with(Min::<i32>::new())
            .with(Count::<i32>::new())
            .execute()
            .unwrap();
        assert_eq!(
            <(bool, i32, usize)>::refs(&outcome).unwrap(),
            (&true, &1, &3)
        );
        assert_eq!(<(bool, i32, usize)>::take(outcome).unwrap(), (true, 1, 3));
    }

    #[test]
    fn first_failing_slot_fails_the_tuple() {
        let outcome = Plan::new(Vec::<i32>::new())
            .with(HasDuplicates::<i32>::new())
            .with(Min::<i32>::new())
            .execute()
            .unwrap();
        assert!(<(bool, i32)>::refs(&outcome)
            .unwrap_err()
            .is_empty_sequence());
    }
}

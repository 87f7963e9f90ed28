//! Steps that shape the forwarded values without doing any real work.

use crate::{Args, Next, Step};

/// Forward exactly `values`, ignoring whatever the previous step passed.
///
/// ```
/// # use std::{cell::RefCell, rc::Rc};
/// # use jam::{inject, Chain, ManualScheduler};
/// # use serde_json::json;
/// let scheduler = Rc::new(ManualScheduler::new());
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let s = seen.clone();
///
/// Chain::with_scheduler(scheduler.clone(), inject(vec![json!("one"), json!("two")]))
///     .then(move |next, args| {
///         *s.borrow_mut() = args;
///         next.done()
///     })?;
///
/// scheduler.run_until_idle();
/// assert_eq!(vec![json!("one"), json!("two")], *seen.borrow());
/// # Ok::<(), jam::ChainError>(())
/// ```
pub fn inject(values: Args) -> Step {
    Step::new(move |next, _| next.ok(values))
}

/// Step that discards everything it is given and forwards nothing.
///
/// Usable directly, `chain.then(absorb)`, or through [`make_absorb`].
pub fn absorb(next: Next, _args: Args) {
    next.done()
}

/// Build an [`absorb`] step.
pub fn make_absorb() -> Step {
    Step::new(absorb)
}

/// Step that forwards its input unchanged, one deferral later.
///
/// Useful to break up a long run of synchronous steps. Also exported as
/// `next_tick`.
pub fn identity(next: Next, args: Args) {
    let scheduler = next.scheduler();
    scheduler.defer(Box::new(move || next.ok(args)));
}

/// Build an [`identity`] step.
pub fn make_identity() -> Step {
    Step::new(identity)
}

/// Run a side effect on the forwarded values, then pass them on untouched.
pub fn tap<F>(f: F) -> Step
where
    F: FnOnce(&Args) + 'static,
{
    Step::new(move |next, args| {
        f(&args);
        next.ok(args)
    })
}

/// Replace the forwarded values with `f(values)`.
pub fn transform<F>(f: F) -> Step
where
    F: FnOnce(Args) -> Args + 'static,
{
    Step::new(move |next, args| next.ok(f(args)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Chain, ManualScheduler, Outcome};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn run(build: impl FnOnce(&Chain)) -> Vec<Outcome> {
        let scheduler = Rc::new(ManualScheduler::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let chain = Chain::with_scheduler(scheduler.clone(), |next: Next, _: Args| {
            next.ok(vec![json!(1), json!(2), json!(3)])
        });
        build(&chain);
        let s = seen.clone();
        chain.finally(move |outcome| s.borrow_mut().push(outcome)).unwrap();
        scheduler.run_until_idle();
        seen.take()
    }

    fn values(outcomes: Vec<Outcome>) -> Args {
        match outcomes.into_iter().next() {
            Some(Ok(values)) => values,
            other => panic!("Expected a single Ok outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_inject_replaces_previous_values() {
        let got = values(run(|chain| {
            chain.push(inject(vec![json!("a"), json!("b")])).unwrap();
        }));
        assert_eq!(vec![json!("a"), json!("b")], got);
    }

    #[test]
    fn test_inject_as_first_step() {
        let scheduler = Rc::new(ManualScheduler::new());
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        Chain::with_scheduler(scheduler.clone(), inject(vec![json!("hello")]))
            .finally(move |outcome| *s.borrow_mut() = outcome.ok())
            .unwrap();

        scheduler.run_until_idle();
        assert_eq!(Some(vec![json!("hello")]), *seen.borrow());
    }

    #[test]
    fn test_absorb_normal_form_forwards_nothing() {
        let got = values(run(|chain| {
            chain.then(absorb).unwrap();
        }));
        assert!(got.is_empty());
    }

    #[test]
    fn test_absorb_invoked_form_forwards_nothing() {
        let got = values(run(|chain| {
            chain.push(make_absorb()).unwrap();
        }));
        assert!(got.is_empty());
    }

    #[test]
    fn test_identity_both_forms_forward_values() {
        let normal = values(run(|chain| {
            chain.then(identity).unwrap();
        }));
        let invoked = values(run(|chain| {
            chain.push(make_identity()).unwrap();
        }));
        assert_eq!(vec![json!(1), json!(2), json!(3)], normal);
        assert_eq!(normal, invoked);
    }

    #[test]
    fn test_identity_defers_one_tick() {
        let scheduler = Rc::new(ManualScheduler::new());
        let hit = Rc::new(RefCell::new(false));
        let h = hit.clone();
        Chain::with_scheduler(scheduler.clone(), identity)
            .finally(move |_| *h.borrow_mut() = true)
            .unwrap();

        assert_eq!(1, scheduler.pending());
        assert_eq!(2, scheduler.run_ready());
        assert!(*hit.borrow());
    }

    #[test]
    fn test_identity_standalone_forwards_nothing() {
        let got = values(run(|chain| {
            chain.push(make_absorb()).unwrap();
            chain.then(identity).unwrap();
        }));
        assert!(got.is_empty());
    }

    #[test]
    fn test_tap_sees_values_and_forwards_them() {
        let seen = Rc::new(RefCell::new(0));
        let s = seen.clone();
        let got = values(run(move |chain| {
            chain.push(tap(move |args| *s.borrow_mut() = args.len())).unwrap();
        }));
        assert_eq!(3, *seen.borrow());
        assert_eq!(3, got.len());
    }

    #[test]
    fn test_transform_maps_values() {
        let got = values(run(|chain| {
            chain
                .push(transform(|args| {
                    vec![Value::from(args.iter().filter_map(Value::as_i64).sum::<i64>())]
                }))
                .unwrap();
        }));
        assert_eq!(vec![json!(6)], got);
    }
}

use crate::{Args, Callback, Step};

/// Turn a function written against an error-first [`Callback`] into a step.
///
/// The mode is fixed when the step is built:
///
/// - with `fixed` non-empty, `f(fixed, callback)` runs and the values
///   forwarded by the previous step are ignored;
/// - with `fixed` empty, `f(forwarded, callback)` runs with whatever the
///   previous step passed.
///
/// Whatever `f` reports through the callback continues the chain; an `Err`
/// fast-forwards to the terminal step.
///
/// ```
/// # use std::{cell::RefCell, rc::Rc};
/// # use jam::{adapt, Args, Callback, Chain, ManualScheduler};
/// # use serde_json::json;
/// fn shout(args: Args, done: Callback) {
///     match args.first().and_then(|v| v.as_str()) {
///         Some(word) => done(Ok(vec![json!(word.to_uppercase())])),
///         None => done(Err(anyhow::anyhow!("nothing to shout"))),
///     }
/// }
///
/// let scheduler = Rc::new(ManualScheduler::new());
/// let seen = Rc::new(RefCell::new(None));
/// let s = seen.clone();
/// Chain::with_scheduler(scheduler.clone(), adapt(shout, vec![json!("jam")]))
///     .finally(move |outcome| *s.borrow_mut() = outcome.ok())?;
///
/// scheduler.run_until_idle();
/// assert_eq!(Some(vec![json!("JAM")]), *seen.borrow());
/// # Ok::<(), jam::ChainError>(())
/// ```
pub fn adapt<F>(f: F, fixed: Args) -> Step
where
    F: FnOnce(Args, Callback) + 'static,
{
    if fixed.is_empty() {
        Step::new(move |next, forwarded| f(forwarded, next.into_callback()))
    } else {
        Step::new(move |next, _| f(fixed, next.into_callback()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{inject, Chain, ManualScheduler, Outcome};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Calls = Rc<RefCell<Vec<Args>>>;

    /// Records its arguments, then succeeds with nothing.
    fn spy(calls: &Calls) -> impl FnOnce(Args, Callback) + 'static {
        let calls = calls.clone();
        move |args, done| {
            calls.borrow_mut().push(args);
            done(Ok(Vec::new()))
        }
    }

    fn run(first: crate::Step, step: crate::Step) -> Option<Outcome> {
        let scheduler = Rc::new(ManualScheduler::new());
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        Chain::with_scheduler(scheduler.clone(), first)
            .push(step)
            .unwrap()
            .finally(move |outcome| *s.borrow_mut() = Some(outcome))
            .unwrap();
        scheduler.run_until_idle();
        seen.take()
    }

    #[test]
    fn test_adapt_calls_function_without_arguments() {
        let calls = Calls::default();
        let outcome = run(inject(Vec::new()), adapt(spy(&calls), Vec::new()));

        assert_eq!(vec![Vec::<Value>::new()], *calls.borrow());
        assert!(matches!(outcome, Some(Ok(v)) if v.is_empty()));
    }

    #[test]
    fn test_adapt_passes_fixed_arguments() {
        let calls = Calls::default();
        run(
            inject(vec![json!("ignored")]),
            adapt(spy(&calls), vec![json!("one")]),
        );

        assert_eq!(vec![vec![json!("one")]], *calls.borrow());
    }

    #[test]
    fn test_adapt_forwards_previous_values_when_no_fixed_arguments() {
        let calls = Calls::default();
        run(
            inject(vec![json!("one"), json!("two")]),
            adapt(spy(&calls), Vec::new()),
        );

        assert_eq!(vec![vec![json!("one"), json!("two")]], *calls.borrow());
    }

    #[test]
    fn test_adapt_results_continue_the_chain() {
        let outcome = run(
            inject(vec![json!(20)]),
            adapt(
                |args, done| done(Ok(vec![json!(args[0].as_i64().unwrap_or(0) + 1)])),
                Vec::new(),
            ),
        );
        assert!(matches!(outcome, Some(Ok(v)) if v == vec![json!(21)]));
    }

    #[test]
    fn test_adapt_error_fast_forwards() {
        let outcome = run(
            inject(Vec::new()),
            adapt(|_, done| done(Err(anyhow::anyhow!("ENOENT"))), Vec::new()),
        );
        match outcome {
            Some(Err(fault)) => assert_eq!("ENOENT", fault.to_string()),
            other => panic!("Expected Err, got {:?}", other),
        }
    }
}

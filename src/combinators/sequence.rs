//! Serial iteration over an array of values.
//!
//! Both combinators run `iterator(next, element, index)` once per element, in
//! index order, each call waiting for the previous one to report. Under the
//! hood they build an inner [`Chain`] with one step per element, so an error
//! from any element skips the rest and reaches the outer continuation.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::combinators::make_identity;
use crate::{Chain, ChainConfig, ChainError, Next, Step};

type Visitor = Rc<dyn Fn(Next, Value, usize)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Forward the input array once every element is done.
    Each,
    /// Forward the first value each element reported.
    Collect,
}

/// Run `iterator` over every element, then forward the original array.
///
/// With `sequence` set to `None`, the array is taken from the first value the
/// previous step forwarded.
///
/// ```
/// # use std::{cell::RefCell, rc::Rc};
/// # use jam::{each_of, inject, Chain, ManualScheduler};
/// # use serde_json::json;
/// let scheduler = Rc::new(ManualScheduler::new());
/// let visited = Rc::new(RefCell::new(Vec::new()));
/// let v = visited.clone();
///
/// Chain::with_scheduler(scheduler.clone(), inject(vec![json!(["a", "b"])]))
///     .push(each_of(None, move |next, element, index| {
///         v.borrow_mut().push(format!("{index}:{element}"));
///         next.done()
///     })?)?;
///
/// scheduler.run_until_idle();
/// assert_eq!(vec!["0:\"a\"", "1:\"b\""], *visited.borrow());
/// # Ok::<(), jam::ChainError>(())
/// ```
pub fn each_of<F>(sequence: Option<Value>, iterator: F) -> Result<Step, ChainError>
where
    F: Fn(Next, Value, usize) + 'static,
{
    serial(Mode::Each, sequence, Rc::new(iterator))
}

/// Run `iterator` over every element and forward an array of what each
/// element reported.
///
/// Position `i` of the result holds the first value element `i` passed to
/// its continuation, or `null` if it passed none.
pub fn collect<F>(sequence: Option<Value>, iterator: F) -> Result<Step, ChainError>
where
    F: Fn(Next, Value, usize) + 'static,
{
    serial(Mode::Collect, sequence, Rc::new(iterator))
}

fn serial(mode: Mode, sequence: Option<Value>, iterator: Visitor) -> Result<Step, ChainError> {
    if sequence.as_ref().is_some_and(|s| !s.is_array()) {
        return Err(ChainError::invalid("array", "an array"));
    }

    Ok(Step::new(move |next, args| {
        let elements = match sequence.or_else(|| args.into_iter().next()) {
            Some(Value::Array(elements)) => elements,
            _ => return next.fail(ChainError::invalid("array", "an array")),
        };
        run_inner(mode, next, elements, iterator)
    }))
}

fn run_inner(mode: Mode, outer: Next, elements: Vec<Value>, iterator: Visitor) {
    let results = Rc::new(RefCell::new(vec![Value::Null; elements.len()]));

    let mut steps = Vec::with_capacity(elements.len() + 2);
    steps.push(make_identity());
    for (index, element) in elements.iter().cloned().enumerate() {
        let iterator = iterator.clone();
        let results = results.clone();
        steps.push(Step::new(move |next, _| {
            let next = match mode {
                Mode::Each => next,
                Mode::Collect => next.inspect(move |outcome| {
                    if let Ok(values) = outcome {
                        results.borrow_mut()[index] = values.first().cloned().unwrap_or(Value::Null);
                    }
                }),
            };
            iterator(next, element, index)
        }));
    }

    let scheduler = outer.scheduler();
    steps.push(Step::handler(move |outcome| match outcome {
        Ok(_) => {
            let forwarded = match mode {
                Mode::Each => Value::Array(elements),
                Mode::Collect => Value::Array(results.take()),
            };
            outer.ok(vec![forwarded])
        }
        Err(fault) => outer.resume(Err(fault)),
    }));

    let label = match mode {
        Mode::Each => "each",
        Mode::Collect => "collect",
    };
    Chain::from_steps(ChainConfig::default().label(label).scheduler(scheduler), steps);
}

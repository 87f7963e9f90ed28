use std::time::Duration;

use serde_json::Value;

use crate::{ChainError, Step};

/// Pause the chain for `ms` milliseconds, then forward the input unchanged.
///
/// Negative values count as zero and values too large for a [`Duration`]
/// saturate to [`Duration::MAX`]. Fails with [`ChainError::InvalidArgument`]
/// unless `ms` is a number.
pub fn delay(ms: impl Into<Value>) -> Result<Step, ChainError> {
    let millis = ms
        .into()
        .as_f64()
        .filter(|ms| !ms.is_nan())
        .ok_or(ChainError::invalid("timeout", "a number"))?;
    let duration = Duration::try_from_secs_f64(millis.max(0.0) / 1000.0).unwrap_or(Duration::MAX);
    Ok(delay_for(duration))
}

/// Pause the chain for `duration`, then forward the input unchanged.
pub fn delay_for(duration: Duration) -> Step {
    Step::new(move |next, args| {
        let scheduler = next.scheduler();
        scheduler.defer_for(duration, Box::new(move || next.ok(args)));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{inject, Chain, ManualScheduler};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_delay_rejects_non_numbers() {
        for thing in [json!(null), json!("string"), json!({}), json!([]), json!(true)] {
            match delay(thing) {
                Err(ChainError::InvalidArgument { argument: "timeout", .. }) => {}
                other => panic!("Expected InvalidArgument, got {:?}", other.map(|_| ())),
            }
        }
        assert!(delay("x").is_err());
    }

    #[test]
    fn test_delay_accepts_integers_and_floats() {
        assert!(delay(0).is_ok());
        assert!(delay(15_u64).is_ok());
        assert!(delay(2.5).is_ok());
    }

    #[test]
    fn test_delay_saturates_out_of_range_numbers() {
        assert!(delay(1e30).is_ok());
        assert!(delay(f64::MAX).is_ok());
    }

    #[test]
    fn test_delay_treats_negative_as_zero() {
        let scheduler = Rc::new(ManualScheduler::new());
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        let clock = scheduler.clone();
        Chain::with_scheduler(scheduler.clone(), inject(vec![json!(1)]))
            .push(delay(-50).unwrap())
            .unwrap()
            .finally(move |outcome| *s.borrow_mut() = Some((clock.elapsed(), outcome.ok())))
            .unwrap();

        scheduler.run_until_idle();
        let (elapsed, values) = seen.take().expect("terminal handler never ran");
        assert_eq!(Duration::ZERO, elapsed);
        assert_eq!(Some(vec![json!(1)]), values);
    }

    #[test]
    fn test_delay_forwards_values_after_pause() {
        let scheduler = Rc::new(ManualScheduler::new());
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        let clock = scheduler.clone();
        Chain::with_scheduler(scheduler.clone(), inject(vec![json!("hello")]))
            .push(delay(25).unwrap())
            .unwrap()
            .finally(move |outcome| *s.borrow_mut() = Some((clock.elapsed(), outcome.ok())))
            .unwrap();

        scheduler.run_ready();
        assert!(seen.borrow().is_none());

        scheduler.run_until_idle();
        let (elapsed, values) = seen.take().expect("terminal handler never ran");
        assert!(elapsed >= Duration::from_millis(25));
        assert_eq!(Some(vec![json!("hello")]), values);
    }
}

// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![allow(clippy::unwrap_used)]
//! Property tests for advice ordering: same-kind advices always run newest
//! first, whatever their number.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use weft_intercept::prelude::*;

fn target() -> Object {
    let target = Object::named("Subject");
    target.define_method("call", |_, args| Ok(args.first().cloned().unwrap_or_default()));
    target
}

fn apply_own(target: &Object, advices: Vec<Advice>) {
    Aspect::new(advices)
        .with_selector(Selector::own_members())
        .apply([target])
        .unwrap();
}

proptest! {
    #[test]
    fn before_advices_run_in_reverse_registration_order(count in 1_usize..12) {
        let target = target();
        let order = Arc::new(Mutex::new(Vec::new()));
        let advices = (0..count)
            .map(|i| {
                let order = Arc::clone(&order);
                Advice::before(move |_, _| {
                    order.lock().unwrap().push(i);
                    Ok(())
                })
            })
            .collect();
        apply_own(&target, advices);

        target.invoke("call", &[]).unwrap();
        let expected: Vec<usize> = (0..count).rev().collect();
        prop_assert_eq!(order.lock().unwrap().clone(), expected);
    }

    #[test]
    fn around_advices_nest_newest_outermost(tags in proptest::collection::vec("[a-z]", 1..8)) {
        let target = target();
        let advices = tags
            .iter()
            .map(|tag| {
                let tag = tag.clone();
                Advice::around(move |ctx, next, args| {
                    let inner = next.proceed(ctx, args)?;
                    Ok(Value::from(format!("{tag}({})", inner.as_str().unwrap())))
                })
            })
            .collect();
        apply_own(&target, advices);

        // rN(...r2(r1(f)))
        let expected = tags
            .iter()
            .fold("x".to_owned(), |inner, tag| format!("{tag}({inner})"));
        prop_assert_eq!(target.invoke("call", &[Value::from("x")]).unwrap(), Value::from(expected));
    }

    #[test]
    fn after_returning_folds_from_newest(increments in proptest::collection::vec(-100_i64..100, 1..10)) {
        let target = target();
        let advices = increments
            .iter()
            .enumerate()
            .map(|(position, &increment)| {
                let weight = i64::try_from(position).unwrap() + 1;
                Advice::after_returning(move |_, value| {
                    Ok(Value::from(value.as_i64().unwrap() * weight + increment))
                })
            })
            .collect();
        apply_own(&target, advices);

        let expected = increments
            .iter()
            .enumerate()
            .rev()
            .fold(1_i64, |acc, (position, &increment)| {
                acc * (i64::try_from(position).unwrap() + 1) + increment
            });
        prop_assert_eq!(target.invoke("call", &[Value::from(1)]).unwrap(), Value::from(expected));
    }

    #[test]
    fn stop_at_any_before_position_skips_the_rest(count in 1_usize..10, stop_at in 0_usize..10) {
        let stop_at = stop_at % count;
        let target = target();
        let ran = Arc::new(Mutex::new(Vec::new()));
        let advices = (0..count)
            .map(|i| {
                let ran = Arc::clone(&ran);
                Advice::before(move |ctx, _| {
                    ran.lock().unwrap().push(i);
                    if i == stop_at {
                        ctx.stop();
                    }
                    Ok(())
                })
            })
            .collect();
        apply_own(&target, advices);

        prop_assert_eq!(target.invoke("call", &[Value::from(5)]).unwrap(), Value::Undefined);
        let expected: Vec<usize> = (stop_at..count).rev().collect();
        prop_assert_eq!(ran.lock().unwrap().clone(), expected);
    }
}

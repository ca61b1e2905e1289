use cache_key::{CacheKeyBuilder, DirectIdentity, Domain, build, fnv::hash_layout};
use proptest::{
    collection::vec,
    prelude::any,
    sample::Index,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

fn shuffled(ids: &[i64], rng: &mut ChaCha8Rng) -> Vec<i64> {
    let mut out = ids.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.next_u64() as usize % (i + 1);
        out.swap(i, j);
    }
    out
}

fn check_permutation_invariance(
    domain: Domain,
    ids: &[i64],
    shuffle_seed: u64,
) -> Result<(), String> {
    let mut rng = ChaCha8Rng::seed_from_u64(shuffle_seed);
    let other = [11_i64, -3];
    let place = |set: &[i64]| -> [Vec<i64>; 3] {
        match domain {
            Domain::All => [set.to_vec(), other.to_vec(), Vec::new()],
            Domain::Any => [other.to_vec(), set.to_vec(), Vec::new()],
            Domain::Exclude => [Vec::new(), other.to_vec(), set.to_vec()],
        }
    };

    let [all, any, exclude] = place(ids);
    let baseline = build(&all, &any, &exclude, &DirectIdentity);
    for _ in 0..4 {
        let [all, any, exclude] = place(&shuffled(ids, &mut rng));
        let key = build(&all, &any, &exclude, &DirectIdentity);
        if key != baseline {
            return Err(format!("{domain:?} permutation of {ids:?} changed the key"));
        }
    }
    Ok(())
}

#[test]
fn test_permutations_within_a_domain_share_a_key() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(64));
    let inputs = (vec(any::<i64>(), 0..12), any::<u64>());

    runner
        .run(&inputs, |(ids, shuffle_seed)| {
            for domain in Domain::ORDER {
                check_permutation_invariance(domain, &ids, shuffle_seed)
                    .map_err(TestCaseError::fail)?;
            }
            Ok(())
        })
        .expect("keys should not depend on element order within a domain");
}

#[test]
fn test_moving_a_set_between_domains_changes_the_key() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(64));

    runner
        .run(&vec(any::<i64>(), 1..8), |ids| {
            let none: &[i64] = &[];
            let in_all = build(&ids, none, none, &DirectIdentity);
            let in_any = build(none, &ids, none, &DirectIdentity);
            let in_exclude = build(none, none, &ids, &DirectIdentity);
            if in_all == in_any || in_all == in_exclude || in_any == in_exclude {
                return Err(TestCaseError::fail(format!("domain collision for {ids:?}")));
            }
            Ok(())
        })
        .expect("domain tags should separate otherwise identical sets");
}

#[test]
fn test_duplicating_an_element_changes_the_key() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(64));

    runner
        .run(&(vec(any::<i64>(), 1..8), any::<Index>()), |(ids, pick)| {
            let mut doubled = ids.clone();
            doubled.push(ids[pick.index(ids.len())]);
            if build(&ids, &[], &[], &DirectIdentity) == build(&doubled, &[], &[], &DirectIdentity) {
                return Err(TestCaseError::fail(format!("duplicate ignored for {ids:?}")));
            }
            Ok(())
        })
        .expect("duplicates should be counted");
}

#[test]
fn test_key_is_the_fnv_fold_of_the_layout() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(64));
    let inputs = (vec(any::<i64>(), 0..6), vec(any::<i64>(), 0..6), vec(any::<i64>(), 0..6));

    runner
        .run(&inputs, |(all, any, exclude)| {
            let mut builder = CacheKeyBuilder::new();
            let key = builder.build(&all, &any, &exclude, &DirectIdentity);

            let mut expected = Vec::new();
            for (domain, ids) in Domain::ORDER.into_iter().zip([&all, &any, &exclude]) {
                let mut sorted = ids.clone();
                sorted.sort();
                expected.push(domain.tag());
                expected.push(sorted.len() as i64);
                expected.extend(sorted);
            }

            if builder.last_layout() != expected.as_slice() {
                return Err(TestCaseError::fail("layout mismatch"));
            }
            if key.as_u64() != hash_layout(&expected) {
                return Err(TestCaseError::fail("key is not the layout hash"));
            }
            Ok(())
        })
        .expect("keys should follow the documented layout");
}

use crate::planner::PAIR_SPAN;

/// Single-table sieve over 0..=limit, is_prime[n] for every n
pub fn sieve(limit: u64) -> Vec<bool> {
    let limit = limit as usize;
    let mut is_prime = vec![true; limit + 1];
    is_prime[0] = false;
    if limit >= 1 {
        is_prime[1] = false;
    }

    let mut i = 2;
    while i * i <= limit {
        if is_prime[i] {
            for j in (i * i..=limit).step_by(i) {
                is_prime[j] = false;
            }
        }
        i += 1;
    }

    is_prime
}

/// Every pair (p, p + 6) of primes with p + 6 <= limit
pub fn sexy_pairs(limit: u64) -> Vec<(u64, u64)> {
    let is_prime = sieve(limit);
    let span = PAIR_SPAN as usize;

    (2..is_prime.len().saturating_sub(span))
        .filter(|&p| is_prime[p] && is_prime[p + span])
        .map(|p| (p as u64, (p + span) as u64))
        .collect()
}

/// Sequential reference count
pub fn count_sexy_pairs(limit: u64) -> u64 {
    sexy_pairs(limit).len() as u64
}
